use crate::types::GroundingChunk;

/// Keep only chunks that can be shown as a place card.
///
/// A chunk survives when it has a `maps` record whose `title` and `uri` are
/// both non-empty. Order is preserved and the function never fails.
pub fn shape_places(chunks: Vec<GroundingChunk>) -> Vec<GroundingChunk> {
    let before = chunks.len();
    let places: Vec<GroundingChunk> = chunks
        .into_iter()
        .filter(|c| c.title().is_some() && c.uri().is_some())
        .collect();
    tracing::debug!(
        chunks = before,
        places = places.len(),
        dropped = before - places.len(),
        "search.shape"
    );
    places
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MapsPlace, WebSource};

    fn maps(title: Option<&str>, uri: Option<&str>) -> GroundingChunk {
        GroundingChunk {
            maps: Some(MapsPlace {
                title: title.map(str::to_string),
                uri: uri.map(str::to_string),
                ..Default::default()
            }),
            web: None,
        }
    }

    #[test]
    fn keeps_only_titled_linked_maps_chunks() {
        let input = vec![
            GroundingChunk::default(),
            GroundingChunk::place("A", "u"),
            maps(Some(""), Some("u")),
        ];
        assert_eq!(shape_places(input), vec![GroundingChunk::place("A", "u")]);
    }

    #[test]
    fn preserves_service_order() {
        let input = vec![
            GroundingChunk::place("C", "u3"),
            maps(Some("skip"), None),
            GroundingChunk::place("A", "u1"),
            GroundingChunk::place("B", "u2"),
        ];
        let titles: Vec<_> = shape_places(input)
            .iter()
            .map(|c| c.title().unwrap_or_default().to_string())
            .collect();
        assert_eq!(titles, ["C", "A", "B"]);
    }

    #[test]
    fn drops_web_only_and_missing_fields() {
        let web = GroundingChunk {
            maps: None,
            web: Some(WebSource {
                uri: Some("https://x".into()),
                title: Some("X".into()),
            }),
        };
        let input = vec![web, maps(None, Some("u")), maps(Some("T"), Some(""))];
        assert!(shape_places(input).is_empty());
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(shape_places(Vec::new()).is_empty());
    }
}
