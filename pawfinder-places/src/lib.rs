//! Place cards for Pawfinder: amenity tags, per-place ratings, and the
//! key/value stores ratings persist into.
//!
//! # Examples
//! ```
//! use pawfinder_places::{MemoryStore, PlaceCard, RatingBook};
//! use pawfinder_search::GroundingChunk;
//!
//! # #[tokio::main]
//! # async fn main() -> pawfinder_common::Result<()> {
//! let book = RatingBook::new(MemoryStore::new());
//! let place = GroundingChunk::place("Bark Park", "https://maps.google.com/?cid=1");
//! book.rate_place(&place, 4).await?;
//!
//! let card = PlaceCard::build(&place, &book).await;
//! assert_eq!(card.rating, 4);
//! assert_eq!(card.label, "Likely Dog Friendly");
//! # Ok(())
//! # }
//! ```
pub mod kv;
pub mod rating;
pub mod tags;

pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
pub use rating::{RatingBook, rating_key, rating_key_for};
pub use tags::PlaceTags;

use pawfinder_search::GroundingChunk;
use std::path::Path;
use std::sync::Arc;

pub const NO_SNIPPET_TEXT: &str = "No specific review snippet available.";
pub const RATED_THANKS: &str = "Thanks for ranking this place!";

/// Everything a view needs to draw one place.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCard {
    pub title: String,
    pub uri: String,
    pub rating_key: String,
    pub tags: PlaceTags,
    pub label: &'static str,
    pub snippet: Option<String>,
    /// 0 when unrated.
    pub rating: u8,
}

impl PlaceCard {
    pub async fn build<S: KeyValueStore>(place: &GroundingChunk, book: &RatingBook<S>) -> Self {
        let snippet = place.first_review_snippet();
        let tags = PlaceTags::from_snippet(snippet);
        let rating_key = rating_key(place);
        let rating = book.load_or_unrated(&rating_key).await;
        Self {
            title: place.title().unwrap_or_default().to_string(),
            uri: place.uri().unwrap_or_default().to_string(),
            rating_key,
            label: tags.dog_friendly_label(),
            tags,
            snippet: snippet.map(str::to_string),
            rating,
        }
    }

    pub fn snippet_or_placeholder(&self) -> &str {
        self.snippet.as_deref().unwrap_or(NO_SNIPPET_TEXT)
    }

    pub fn is_rated(&self) -> bool {
        self.rating > 0
    }
}

/// Open the rating store selected by configuration.
pub async fn open_store(sqlite_path: Option<&Path>) -> pawfinder_common::Result<Arc<dyn KeyValueStore>> {
    match sqlite_path {
        Some(path) => Ok(Arc::new(SqliteStore::connect(path).await?)),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}
