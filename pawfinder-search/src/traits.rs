use crate::query::{BuiltQuery, SearchRequest};
use crate::types::SearchResult;
use async_trait::async_trait;
use pawfinder_common::Result;

#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Run one search. Implementations make exactly one outbound call and
    /// return already-shaped places.
    async fn search(&self, query: &BuiltQuery) -> Result<SearchResult>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// Validate `request`, then search. Requests without criteria fail
    /// before any backend call is made.
    async fn search_request(&self, request: &SearchRequest) -> Result<SearchResult> {
        let built = request.prepare()?;
        self.search(&built).await
    }
}
