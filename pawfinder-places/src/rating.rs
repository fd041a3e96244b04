//! Per-place star ratings.
use crate::kv::KeyValueStore;
use pawfinder_common::{PawError, Result};
use pawfinder_search::GroundingChunk;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 5;

static WHITESPACE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());

/// Storage key for a place: `rating_<placeId>` when the place has an id,
/// otherwise `rating_` plus the title with whitespace runs collapsed to `_`,
/// lowercased.
///
/// ```
/// use pawfinder_places::rating::rating_key_for;
///
/// assert_eq!(rating_key_for(Some("places/abc"), "Ignored"), "rating_places/abc");
/// assert_eq!(rating_key_for(None, "Bark  Park Cafe"), "rating_bark_park_cafe");
/// ```
pub fn rating_key_for(place_id: Option<&str>, title: &str) -> String {
    match place_id.filter(|id| !id.is_empty()) {
        Some(id) => format!("rating_{id}"),
        None => {
            let joined = match WHITESPACE.as_ref() {
                Some(re) => re.replace_all(title, "_").into_owned(),
                None => title.split_whitespace().collect::<Vec<_>>().join("_"),
            };
            format!("rating_{}", joined.to_lowercase())
        }
    }
}

pub fn rating_key(place: &GroundingChunk) -> String {
    rating_key_for(place.place_id(), place.title().unwrap_or_default())
}

/// Whole integers only; "4.0" and "4abc" are unparsable.
fn parse_stars(raw: &str) -> Option<u8> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|n| (MIN_STARS..=MAX_STARS).contains(n))
}

/// Ratings over an injected [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct RatingBook<S> {
    store: S,
}

impl<S: KeyValueStore> RatingBook<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stored stars for `key`, or 0 when nothing valid is stored.
    pub async fn load(&self, key: &str) -> Result<u8> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(0);
        };
        match parse_stars(&raw) {
            Some(stars) => Ok(stars),
            None => {
                warn!(key, raw = %raw, "ratings.load.invalid");
                Ok(0)
            }
        }
    }

    /// Like [`RatingBook::load`] but a failing store also reads as unrated.
    pub async fn load_or_unrated(&self, key: &str) -> u8 {
        match self.load(key).await {
            Ok(stars) => stars,
            Err(e) => {
                warn!(key, error = %e, "ratings.load.failed");
                0
            }
        }
    }

    pub async fn load_for(&self, place: &GroundingChunk) -> u8 {
        self.load_or_unrated(&rating_key(place)).await
    }

    /// Persist `stars` (1..=5) under `key`, replacing any earlier rating.
    pub async fn rate(&self, key: &str, stars: u8) -> Result<()> {
        if !(MIN_STARS..=MAX_STARS).contains(&stars) {
            return Err(PawError::InvalidRating(stars));
        }
        self.store.set(key, &stars.to_string()).await?;
        info!(key, stars, "ratings.set");
        Ok(())
    }

    pub async fn rate_place(&self, place: &GroundingChunk, stars: u8) -> Result<()> {
        let key = rating_key(place);
        debug!(key = %key, "ratings.rate_place");
        self.rate(&key, stars).await
    }
}
