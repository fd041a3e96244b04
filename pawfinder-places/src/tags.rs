//! Amenity tags inferred from a place's first review snippet.
use regex::Regex;
use std::sync::LazyLock;

static PATIO: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)patio|terrace|outdoor|outside|garden|deck").ok());
static INDOOR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)inside|indoor|interior").ok());
static VERIFIED: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)dog|pup|pet|canine|four-legged|furry|water bowl|treats").ok()
});

fn matches(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(text))
}

pub const CONFIRMED_LABEL: &str = "Confirmed Dog Friendly";
pub const LIKELY_LABEL: &str = "Likely Dog Friendly";

/// Substring matches, not word matches: "puppy" and "deckchair" both hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceTags {
    pub patio: bool,
    pub indoor: bool,
    pub verified: bool,
}

impl PlaceTags {
    /// All false when there is no snippet.
    pub fn from_snippet(snippet: Option<&str>) -> Self {
        let Some(text) = snippet else {
            return Self::default();
        };
        Self {
            patio: matches(&PATIO, text),
            indoor: matches(&INDOOR, text),
            verified: matches(&VERIFIED, text),
        }
    }

    pub fn dog_friendly_label(&self) -> &'static str {
        if self.verified {
            CONFIRMED_LABEL
        } else {
            LIKELY_LABEL
        }
    }
}
