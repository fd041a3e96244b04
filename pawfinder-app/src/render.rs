//! Plain-text rendering of search results and place cards.
use pawfinder_common::{Category, Coordinates};
use pawfinder_places::{PlaceCard, RATED_THANKS};
use pawfinder_search::SearchResult;
use std::fmt::Write;
use textwrap::{Options, fill};

pub const DEFAULT_WIDTH: usize = 80;

pub const LOADING_TEXT: &str = "Sniffing out the best spots...";
const SUMMARY_HEADING: &str = "VERIFIED POLICY DETAILS";
const SUMMARY_DISCLAIMER: &str =
    "Policies are verified via AI analysis. Always confirm with the venue directly.";
const NO_PLACES_TEXT: &str = "No map locations returned.";
const NO_PLACES_HINT: &str = "Please check the text summary above for details.";

pub fn coordinates_line(c: Coordinates) -> String {
    format!("Using coordinates: {c}")
}

pub fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn wrap_block(text: &str, width: usize, indent: &str) -> String {
    let opts = Options::new(width.max(20))
        .initial_indent(indent)
        .subsequent_indent(indent);
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                fill(line, &opts)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_card(index: usize, card: &PlaceCard, width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{index}. {}", card.title);
    let _ = writeln!(out, "   {}", card.uri);

    let mut badges = vec![card.label];
    if card.tags.patio {
        badges.push("Patio");
    }
    if card.tags.indoor {
        badges.push("Indoor");
    }
    let _ = writeln!(out, "   [{}]", badges.join("] ["));

    let quoted = format!("\"{}\"", card.snippet_or_placeholder());
    let _ = writeln!(out, "{}", wrap_block(&quoted, width, "   "));

    let _ = write!(out, "   Your rating: {}", stars(card.rating));
    if card.is_rated() {
        let _ = write!(out, "  {RATED_THANKS}");
    }
    out.push('\n');
    out
}

/// Summary block followed by one card per place.
pub fn render_result(result: &SearchResult, cards: &[PlaceCard], width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {SUMMARY_HEADING} ==");
    let _ = writeln!(out, "{}", wrap_block(&result.text, width, ""));
    let _ = writeln!(out, "({SUMMARY_DISCLAIMER})");
    out.push('\n');

    let _ = writeln!(out, "== FOUND LOCATIONS ==");
    if cards.is_empty() {
        let _ = writeln!(out, "{NO_PLACES_TEXT}");
        let _ = writeln!(out, "{NO_PLACES_HINT}");
        return out;
    }
    for (i, card) in cards.iter().enumerate() {
        out.push_str(&render_card(i + 1, card, width));
        out.push('\n');
    }
    out
}

pub fn render_categories(selected: Option<Category>) -> String {
    Category::ALL
        .iter()
        .map(|c| {
            if Some(*c) == selected {
                format!("* {c}")
            } else {
                format!("  {c}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
