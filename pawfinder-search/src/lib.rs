//! Grounded dog-friendly place search for Pawfinder.
//!
//! This crate turns user input into a verifier prompt ([`query`]), sends it
//! to a [`traits::PlaceSearch`] backend (Gemini with Google Maps grounding in
//! [`gemini`]), and shapes the grounding citations into place records
//! ([`shape`]).
//!
//! # Examples
//! ```no_run
//! use pawfinder_common::Result;
//! use pawfinder_config::GeminiSettings;
//! use pawfinder_search::{ensure_search_ready, query::SearchRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let settings = GeminiSettings {
//!     api_key: Some("my-key".into()),
//!     ..Default::default()
//! };
//! let client = ensure_search_ready(&settings)?;
//! let result = client.search_request(&SearchRequest::new("Brisbane")).await?;
//! println!("{} places", result.places.len());
//! # Ok(())
//! # }
//! ```
pub mod gemini;
pub mod query;
pub mod shape;
pub mod traits;
pub mod types;

use gemini::GeminiSearchClient;
use pawfinder_common::Result;
use pawfinder_config::GeminiSettings;
use std::sync::Arc;
use traits::PlaceSearch;

pub use query::{BuiltQuery, SearchRequest, build_query};
pub use types::{GroundingChunk, NO_RESULTS_TEXT, SearchResult};

/// Build the configured search backend, failing fast when the API key is
/// absent.
pub fn ensure_search_ready(
    settings: &GeminiSettings,
) -> Result<Arc<dyn PlaceSearch + Send + Sync + 'static>> {
    let client = GeminiSearchClient::from_settings(settings)?;
    tracing::info!(model = %client.model_name(), endpoint = %settings.endpoint, "search.ready");
    Ok(Arc::new(client))
}

/// Validate `request` and run it against `client`.
pub async fn search_dog_friendly_places(
    client: &dyn PlaceSearch,
    request: &SearchRequest,
) -> Result<SearchResult> {
    client.search_request(request).await
}
