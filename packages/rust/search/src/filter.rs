//! Client-side facet + text filtering over rendered cards.
//!
//! The engine is pure: it takes the card facets, the current filter state,
//! and — when a full-text query is active — the matching-slug set computed
//! by the search step as an explicit argument. There is no ambient shared
//! match state; `None` means "no active full-text result set" and the
//! engine falls back to local substring matching.

use std::collections::{BTreeSet, HashSet};

use showcase_shared::DocKind;

/// Minimum query length for the full-text match set to apply.
const MIN_QUERY_LEN: usize = 2;

/// Facet attributes rendered onto one card.
#[derive(Debug, Clone)]
pub struct CardFacets {
    /// Corpus slug (team slug, or `event:<year>:<id>` for events).
    pub slug: String,
    pub kind: DocKind,
    /// Department facet; event cards carry none.
    pub department: Option<String>,
    /// Track facet; event cards carry none.
    pub track: Option<String>,
    pub tags: Vec<String>,
    pub title: String,
    pub summary: String,
}

/// The currently selected filters.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub department: Option<String>,
    pub track: Option<String>,
    /// Selected tags; a card must carry every one of them.
    pub tags: BTreeSet<String>,
    /// Live text query (matched case-insensitively).
    pub query: String,
}

/// Visible/hidden state per card plus the grid-level summary.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Visibility flag per card, same order as the input slice.
    pub visible: Vec<bool>,
    pub visible_count: usize,
    /// Whether the empty-state panel should be shown.
    pub empty: bool,
}

/// Apply the filter state to a set of cards.
///
/// `matches` is the slug set produced by the full-text search step for the
/// active query; it is honored only when the query is at least
/// [`MIN_QUERY_LEN`] characters. Facets combine with logical AND across
/// department, track, and all selected tags.
pub fn apply(
    cards: &[CardFacets],
    state: &FilterState,
    matches: Option<&HashSet<String>>,
) -> FilterOutcome {
    let visible: Vec<bool> = cards
        .iter()
        .map(|card| card_matches(card, state, matches))
        .collect();
    let visible_count = visible.iter().filter(|v| **v).count();
    FilterOutcome {
        visible,
        visible_count,
        empty: visible_count == 0,
    }
}

fn card_matches(
    card: &CardFacets,
    state: &FilterState,
    matches: Option<&HashSet<String>>,
) -> bool {
    if let Some(department) = &state.department {
        if card.department.as_deref() != Some(department.as_str()) {
            return false;
        }
    }
    if let Some(track) = &state.track {
        if card.track.as_deref() != Some(track.as_str()) {
            return false;
        }
    }
    if !state.tags.is_empty() {
        let has_all = state.tags.iter().all(|tag| card.tags.iter().any(|t| t == tag));
        if !has_all {
            return false;
        }
    }

    let query = state.query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    match matches {
        Some(set) if query.chars().count() >= MIN_QUERY_LEN => set.contains(&card.slug),
        _ => {
            card.title.to_lowercase().contains(&query)
                || card.summary.to_lowercase().contains(&query)
        }
    }
}
