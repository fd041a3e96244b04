//! Interactive search state.
//!
//! Every search bumps a generation counter and cancels the token of the
//! previous one. A result is applied only if its generation is still the
//! current one, so a slow earlier search can never overwrite a newer result.
use crate::location::LocationProvider;
use pawfinder_common::{Category, Coordinates, PawError, Result};
use pawfinder_search::traits::PlaceSearch;
use pawfinder_search::{SearchRequest, SearchResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Loading,
    Results(SearchResult),
    /// User-facing message.
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Applied,
    /// A newer search started before this one finished.
    Superseded,
}

struct Inner {
    query: String,
    category: Option<Category>,
    coordinates: Option<Coordinates>,
    state: SearchState,
    generation: u64,
    cancel: CancellationToken,
}

pub struct SearchSession {
    search: Arc<dyn PlaceSearch>,
    location: Arc<dyn LocationProvider>,
    inner: Mutex<Inner>,
}

impl SearchSession {
    pub fn new(search: Arc<dyn PlaceSearch>, location: Arc<dyn LocationProvider>) -> Self {
        Self {
            search,
            location,
            inner: Mutex::new(Inner {
                query: String::new(),
                category: None,
                coordinates: None,
                state: SearchState::Idle,
                generation: 0,
                cancel: CancellationToken::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SearchState {
        self.lock().state.clone()
    }

    pub fn category(&self) -> Option<Category> {
        self.lock().category
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.lock().coordinates
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.lock().query = query.into();
    }

    /// The request the current inputs describe.
    pub fn current_request(&self) -> SearchRequest {
        let inner = self.lock();
        SearchRequest::new(inner.query.clone())
            .with_category(inner.category)
            .with_coordinates(inner.coordinates)
    }

    /// Search with the current inputs.
    pub async fn search(&self) -> SearchOutcome {
        let request = self.current_request();
        self.run(request).await
    }

    /// Change the category filter. Choosing a category searches right away;
    /// clearing it does not.
    pub async fn select_category(&self, category: Option<Category>) -> Option<SearchOutcome> {
        self.lock().category = category;
        match category {
            Some(_) => Some(self.search().await),
            None => None,
        }
    }

    /// Ask the provider for a position. On success the coordinates are kept
    /// and, if a category is selected, a search follows.
    pub async fn locate(&self) -> Result<(Coordinates, Option<SearchOutcome>)> {
        debug!(provider = self.location.name(), "session.locate.start");
        let coordinates = match self.location.current_position().await {
            Ok(c) => c,
            Err(e) => {
                let err = PawError::from(e);
                warn!(provider = self.location.name(), error = %err, "session.locate.failed");
                self.lock().state = SearchState::Error(err.user_message());
                return Err(err);
            }
        };
        let has_category = {
            let mut inner = self.lock();
            inner.coordinates = Some(coordinates);
            inner.category.is_some()
        };
        info!(%coordinates, "session.locate.done");

        let chained = if has_category {
            Some(self.search().await)
        } else {
            None
        };
        Ok((coordinates, chained))
    }

    /// Run `request` as the newest search.
    pub async fn run(&self, request: SearchRequest) -> SearchOutcome {
        let (generation, token) = self.begin();
        debug!(generation, "session.search.start");

        let result = tokio::select! {
            _ = token.cancelled() => {
                debug!(generation, "session.search.cancelled");
                return SearchOutcome::Superseded;
            }
            res = self.search.search_request(&request) => res,
        };
        self.finish(generation, result)
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let mut inner = self.lock();
        inner.cancel.cancel();
        inner.generation += 1;
        inner.cancel = CancellationToken::new();
        inner.state = SearchState::Loading;
        (inner.generation, inner.cancel.clone())
    }

    fn finish(&self, generation: u64, result: Result<SearchResult>) -> SearchOutcome {
        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(generation, current = inner.generation, "session.search.stale");
            return SearchOutcome::Superseded;
        }
        inner.state = match result {
            Ok(result) => {
                info!(generation, places = result.places.len(), "session.search.done");
                SearchState::Results(result)
            }
            Err(e) => {
                warn!(generation, error = %e, "session.search.failed");
                SearchState::Error(e.user_message())
            }
        };
        SearchOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{FixedLocation, NoLocation};
    use async_trait::async_trait;
    use pawfinder_search::{BuiltQuery, GroundingChunk};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Answers with the prompt's first word as a single place. Prompts that
    /// start with "slow" take a while.
    #[derive(Default)]
    struct FakeSearch {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PlaceSearch for FakeSearch {
        async fn search(&self, query: &BuiltQuery) -> Result<SearchResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let word = query.prompt.split_whitespace().next().unwrap_or_default().to_string();
            if word == "slow" {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            if word == "broken" {
                return Err(PawError::SearchFailed("HTTP 500".into()));
            }
            Ok(SearchResult {
                text: word.clone(),
                places: vec![GroundingChunk::place(word, "u")],
            })
        }

        fn model_name(&self) -> &str {
            "fake"
        }
    }

    fn session(location: Arc<dyn LocationProvider>) -> (Arc<FakeSearch>, SearchSession) {
        let fake = Arc::new(FakeSearch::default());
        let session = SearchSession::new(fake.clone(), location);
        (fake, session)
    }

    fn text_of(state: SearchState) -> String {
        match state {
            SearchState::Results(r) => r.text,
            other => panic!("expected results, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_search_shows_criteria_message_without_calling_backend() {
        let (fake, session) = session(Arc::new(NoLocation));
        assert_eq!(session.search().await, SearchOutcome::Applied);
        assert_eq!(
            session.state(),
            SearchState::Error("Please enter a location or allow GPS access.".into())
        );
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stale_result_never_replaces_newer_one() {
        let (_fake, session) = session(Arc::new(NoLocation));
        let session = Arc::new(session);

        let slow = {
            let session = session.clone();
            tokio::spawn(async move { session.run(SearchRequest::new("slow")).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        let fast = session.run(SearchRequest::new("fast")).await;

        assert_eq!(fast, SearchOutcome::Applied);
        assert_eq!(slow.await.unwrap(), SearchOutcome::Superseded);
        assert_eq!(text_of(session.state()), "fast");
    }

    #[test]
    fn late_completion_for_old_generation_is_dropped() {
        let (_fake, session) = session(Arc::new(NoLocation));
        let (first, _) = session.begin();
        let (second, _) = session.begin();

        let ok = |t: &str| {
            Ok(SearchResult {
                text: t.into(),
                places: Vec::new(),
            })
        };
        assert_eq!(session.finish(second, ok("new")), SearchOutcome::Applied);
        assert_eq!(session.finish(first, ok("old")), SearchOutcome::Superseded);
        assert_eq!(text_of(session.state()), "new");
    }

    #[tokio::test]
    async fn search_failure_becomes_inline_message() {
        let (_fake, session) = session(Arc::new(NoLocation));
        session.set_query("broken");
        session.search().await;
        assert_eq!(
            session.state(),
            SearchState::Error("Failed to fetch dog-friendly places. Please try again.".into())
        );
    }

    #[tokio::test]
    async fn locating_with_a_category_chains_a_search() {
        let (fake, session) =
            session(Arc::new(FixedLocation(Coordinates::new(-33.86, 151.2))));
        session.lock().category = Some(Category::Parks);

        let (coords, chained) = session.locate().await.unwrap();
        assert_eq!(coords, Coordinates::new(-33.86, 151.2));
        assert_eq!(chained, Some(SearchOutcome::Applied));
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.coordinates(), Some(coords));
    }

    #[tokio::test]
    async fn locating_without_category_only_stores_position() {
        let (fake, session) = session(Arc::new(FixedLocation(Coordinates::new(1.0, 2.0))));
        let (_, chained) = session.locate().await.unwrap();
        assert_eq!(chained, None);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.state(), SearchState::Idle);
    }

    #[tokio::test]
    async fn unsupported_location_sets_error() {
        let (_fake, session) = session(Arc::new(NoLocation));
        assert!(session.locate().await.is_err());
        assert_eq!(
            session.state(),
            SearchState::Error("Geolocation is not supported by your browser.".into())
        );
    }

    #[tokio::test]
    async fn selecting_category_without_criteria_reports_missing_input() {
        let (fake, session) = session(Arc::new(NoLocation));
        let outcome = session.select_category(Some(Category::Beaches)).await;
        assert_eq!(outcome, Some(SearchOutcome::Applied));
        assert_eq!(
            session.state(),
            SearchState::Error("Please enter a location or allow GPS access.".into())
        );
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);

        assert_eq!(session.select_category(None).await, None);
        assert_eq!(session.category(), None);
    }
}
