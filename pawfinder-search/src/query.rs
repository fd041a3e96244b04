//! Prompt and tool-configuration construction for a dog-friendly search.
//!
//! [`build_query`] is pure: it only formats the prompt and describes which
//! grounding tool (and optional location bias) the request should carry.
//! [`SearchRequest::prepare`] applies the caller-side rules first: it rejects
//! a request with neither text nor coordinates, and defaults the text to
//! `places near me` when only coordinates are known.
use pawfinder_common::{Category, Coordinates, PawError, Result};
use serde::Serialize;

/// Query text used when the user only shared their position.
pub const NEAR_ME_QUERY: &str = "places near me";

const VERIFIER_INSTRUCTIONS: &str = r#"CRITICAL INSTRUCTION: You are a strict dog-friendly verifier.
Only return places where you can find EVIDENCE of them being dog-friendly (e.g., reviews mentioning "dogs", "pups", "water bowls", or "patio").

If a place usually doesn't allow dogs (like many indoor restaurants), DO NOT list it unless you find a specific "dog-friendly" attribute or review.

In your text summary, you MUST provide a verification status for each place found. Format it like this:
- **[Place Name]**: [Policy/Verification Details] (e.g., "Large dog-friendly patio", "Allowed inside", "Reviews mention water bowls provided").

If the search result is vague, assume it is NOT dog friendly. Quality over quantity."#;

/// Tool declaration; serializes as `{"googleMaps":{}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub google_maps: GoogleMaps,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GoogleMaps {}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub retrieval_config: RetrievalConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    pub lat_lng: LatLng,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// A fully formed request, ready for any [`crate::traits::PlaceSearch`] backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub prompt: String,
    pub tools: Vec<Tool>,
    /// Present only when a retrieval bias applies.
    pub tool_config: Option<ToolConfig>,
}

/// User input for one search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub category: Option<Category>,
    pub coordinates: Option<Coordinates>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn with_coordinates(mut self, coordinates: Option<Coordinates>) -> Self {
        self.coordinates = coordinates;
        self
    }

    /// Text that will actually be searched for, or `None` if the request
    /// carries no usable criteria.
    pub fn effective_query(&self) -> Option<&str> {
        let text = self.query.trim();
        match (text.is_empty(), self.coordinates) {
            (false, _) => Some(text),
            (true, Some(_)) => Some(NEAR_ME_QUERY),
            (true, None) => None,
        }
    }

    /// Validate and build. Fails with [`PawError::NoSearchCriteria`] when
    /// there is neither query text nor a position, whatever the category.
    pub fn prepare(&self) -> Result<BuiltQuery> {
        let query = self.effective_query().ok_or(PawError::NoSearchCriteria)?;
        Ok(build_query(query, self.category, self.coordinates))
    }
}

/// Build the prompt and tool configuration for one search.
///
/// ```
/// use pawfinder_common::{Category, Coordinates};
/// use pawfinder_search::query::build_query;
///
/// let q = build_query("Brisbane", Some(Category::Beaches), None);
/// assert!(q.prompt.contains("find verified dog-friendly Beaches in or near Brisbane"));
/// assert!(q.tool_config.is_none());
///
/// let q = build_query("quiet parks", None, Some(Coordinates::new(-27.47, 153.02)));
/// assert!(q.prompt.contains("quiet parks dog friendly"));
/// assert_eq!(q.tool_config.unwrap().retrieval_config.lat_lng.latitude, -27.47);
/// ```
pub fn build_query(
    query: &str,
    category: Option<Category>,
    coordinates: Option<Coordinates>,
) -> BuiltQuery {
    let base = match category {
        Some(category) => format!("find verified dog-friendly {category} in or near {query}"),
        None => format!("{query} dog friendly"),
    };

    let prompt = format!("{base}.\n\n{VERIFIER_INSTRUCTIONS}\n");

    let tool_config = coordinates.map(|c| ToolConfig {
        retrieval_config: RetrievalConfig {
            lat_lng: LatLng {
                latitude: c.latitude,
                longitude: c.longitude,
            },
        },
    });

    BuiltQuery {
        prompt,
        tools: vec![Tool::default()],
        tool_config,
    }
}
