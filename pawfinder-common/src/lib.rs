//! Common types and utilities shared across Pawfinder crates.
//!
//! This crate defines the venue categories, coordinates, observability helpers,
//! and the shared error type used throughout the Pawfinder workspace. It is
//! kept lightweight so that every crate can depend on it without pulling in
//! the HTTP or storage stacks.
//!
//! # Overview
//!
//! - [`Category`]: the fixed set of venue kinds offered as search filters
//! - [`Coordinates`]: a latitude/longitude pair in degrees
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`PawError`] and [`Result`]: shared error handling, including the
//!   user-facing message for each failure
//!
//! # Examples
//!
//! ```rust
//! use pawfinder_common::{Category, PawError};
//!
//! let cat: Category = "walking tracks".parse().unwrap();
//! assert_eq!(cat.label(), "Walking Tracks");
//! assert_eq!(
//!     PawError::NoSearchCriteria.user_message(),
//!     "Please enter a location or allow GPS access."
//! );
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod observability;

/// Venue kinds a search can be narrowed to.
///
/// The serialized form is the display label, e.g. `"Walking Tracks"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Parks,
    Beaches,
    #[serde(rename = "Cafés")]
    Cafes,
    Restaurants,
    Shops,
    Hotels,
    Grooming,
    Vets,
    Daycare,
    Training,
    #[serde(rename = "Walking Tracks")]
    WalkingTracks,
    Attractions,
    #[serde(rename = "Pet Stores")]
    PetStores,
}

impl Category {
    /// Every category, in the order the filter bar presents them.
    pub const ALL: [Category; 13] = [
        Category::Parks,
        Category::Beaches,
        Category::Cafes,
        Category::Restaurants,
        Category::Shops,
        Category::Hotels,
        Category::Grooming,
        Category::Vets,
        Category::Daycare,
        Category::Training,
        Category::WalkingTracks,
        Category::Attractions,
        Category::PetStores,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Parks => "Parks",
            Category::Beaches => "Beaches",
            Category::Cafes => "Cafés",
            Category::Restaurants => "Restaurants",
            Category::Shops => "Shops",
            Category::Hotels => "Hotels",
            Category::Grooming => "Grooming",
            Category::Vets => "Vets",
            Category::Daycare => "Daycare",
            Category::Training => "Training",
            Category::WalkingTracks => "Walking Tracks",
            Category::Attractions => "Attractions",
            Category::PetStores => "Pet Stores",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = PawError;

    /// Case-insensitive; `cafes` is accepted for `Cafés`.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('é', "e");
        Category::ALL
            .into_iter()
            .find(|c| c.label().to_lowercase().replace('é', "e") == wanted)
            .ok_or_else(|| PawError::Config(format!("unknown category: {s}")))
    }
}

/// A geographic position in floating point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Why the current position could not be obtained.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// No location capability is available at all.
    #[error("geolocation is not supported")]
    Unsupported,

    /// The capability exists but the lookup was refused or failed.
    #[error("location lookup failed: {0}")]
    Failed(String),
}

/// Error types used across the Pawfinder system.
#[derive(thiserror::Error, Debug)]
pub enum PawError {
    /// Neither query text nor coordinates were supplied.
    #[error("no search criteria supplied")]
    NoSearchCriteria,

    /// The location provider could not produce coordinates.
    #[error("location unavailable: {0}")]
    LocationUnavailable(#[from] LocationError),

    /// The AI search call failed; the detail is for logs only.
    #[error("search failed: {0}")]
    SearchFailed(String),

    /// A rating outside 1..=5 was submitted.
    #[error("invalid rating {0}: expected 1-5")]
    InvalidRating(u8),

    /// The key/value backend reported an error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PawError {
    /// The inline message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            PawError::NoSearchCriteria => "Please enter a location or allow GPS access.".into(),
            PawError::LocationUnavailable(LocationError::Unsupported) => {
                "Geolocation is not supported by your browser.".into()
            }
            PawError::LocationUnavailable(LocationError::Failed(_)) => {
                "Unable to retrieve your location. Please check permissions.".into()
            }
            PawError::SearchFailed(_) => {
                "Failed to fetch dog-friendly places. Please try again.".into()
            }
            PawError::InvalidRating(_) => "Ratings must be between 1 and 5 stars.".into(),
            PawError::Storage(_) => "Unable to save your rating.".into(),
            PawError::Config(msg) => msg.clone(),
        }
    }
}

/// Convenient alias for results that use [`PawError`].
pub type Result<T> = std::result::Result<T, PawError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_labels_case_insensitively() {
        assert_eq!("parks".parse::<Category>().unwrap(), Category::Parks);
        assert_eq!("PET STORES".parse::<Category>().unwrap(), Category::PetStores);
        assert_eq!("Cafés".parse::<Category>().unwrap(), Category::Cafes);
        assert_eq!("cafes".parse::<Category>().unwrap(), Category::Cafes);
        assert!("zoos".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_string(&Category::WalkingTracks).unwrap();
        assert_eq!(json, "\"Walking Tracks\"");
        let back: Category = serde_json::from_str("\"Cafés\"").unwrap();
        assert_eq!(back, Category::Cafes);
    }

    #[test]
    fn every_category_round_trips_through_its_label() {
        for cat in Category::ALL {
            assert_eq!(cat.label().parse::<Category>().unwrap(), cat);
        }
    }

    #[test]
    fn coordinates_display_with_four_decimals() {
        let c = Coordinates::new(-33.868_82, 151.209_29);
        assert_eq!(c.to_string(), "-33.8688, 151.2093");
    }

    #[test]
    fn user_messages_match_inline_copy() {
        assert_eq!(
            PawError::from(LocationError::Unsupported).user_message(),
            "Geolocation is not supported by your browser."
        );
        assert_eq!(
            PawError::from(LocationError::Failed("denied".into())).user_message(),
            "Unable to retrieve your location. Please check permissions."
        );
        assert_eq!(
            PawError::SearchFailed("HTTP 500".into()).user_message(),
            "Failed to fetch dog-friendly places. Please try again."
        );
    }
}
