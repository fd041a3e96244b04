use serde::{Deserialize, Serialize};

/// Text used when the service answers without any narrative.
pub const NO_RESULTS_TEXT: &str = "No verified dog-friendly places found matching strict criteria.";

/// One citation unit returned by the grounding tool.
///
/// Only chunks carrying a titled, linked `maps` record are usable as places;
/// see [`crate::shape::shape_places`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps: Option<MapsPlace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsPlace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_answer_sources: Option<PlaceAnswerSources>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceAnswerSources {
    #[serde(default)]
    pub review_snippets: Vec<ReviewSnippet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSnippet {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|v| !v.is_empty())
}

impl GroundingChunk {
    /// Convenience constructor for a maps chunk with just a title and link.
    pub fn place(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            maps: Some(MapsPlace {
                title: Some(title.into()),
                uri: Some(uri.into()),
                ..Default::default()
            }),
            web: None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.maps.as_ref().and_then(|m| non_empty(&m.title))
    }

    pub fn uri(&self) -> Option<&str> {
        self.maps.as_ref().and_then(|m| non_empty(&m.uri))
    }

    pub fn place_id(&self) -> Option<&str> {
        self.maps.as_ref().and_then(|m| non_empty(&m.place_id))
    }

    /// Content of the first review snippet, if it has any text.
    pub fn first_review_snippet(&self) -> Option<&str> {
        self.maps
            .as_ref()?
            .place_answer_sources
            .as_ref()?
            .review_snippets
            .first()
            .map(|s| s.content.as_str())
            .filter(|c| !c.is_empty())
    }
}

/// What a search hands back to the view layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Narrative markdown; never empty.
    pub text: String,
    /// Usable places in service order.
    pub places: Vec<GroundingChunk>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_wire_chunk() {
        let chunk: GroundingChunk = serde_json::from_value(json!({
            "maps": {
                "title": "Bark Park",
                "uri": "https://maps.google.com/?cid=1",
                "placeId": "places/abc",
                "placeAnswerSources": {
                    "reviewSnippets": [
                        { "content": "Staff brought a water bowl", "author": "Sam" },
                        { "content": "Second" }
                    ]
                }
            }
        }))
        .unwrap();

        assert_eq!(chunk.title(), Some("Bark Park"));
        assert_eq!(chunk.place_id(), Some("places/abc"));
        assert_eq!(chunk.first_review_snippet(), Some("Staff brought a water bowl"));
    }

    #[test]
    fn empty_strings_read_as_absent() {
        let chunk: GroundingChunk = serde_json::from_value(json!({
            "maps": { "title": "", "uri": "u", "placeId": "",
                      "placeAnswerSources": { "reviewSnippets": [ { "content": "" } ] } }
        }))
        .unwrap();

        assert_eq!(chunk.title(), None);
        assert_eq!(chunk.uri(), Some("u"));
        assert_eq!(chunk.place_id(), None);
        assert_eq!(chunk.first_review_snippet(), None);
    }

    #[test]
    fn web_only_chunk_has_no_place_fields() {
        let chunk: GroundingChunk =
            serde_json::from_value(json!({ "web": { "uri": "https://x", "title": "X" } })).unwrap();
        assert!(chunk.maps.is_none());
        assert_eq!(chunk.title(), None);
    }
}
