//! Slug derivation and deterministic id collision resolution.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Normalize free text into a URL-safe identifier.
///
/// Lower-case, runs of non-alphanumerics collapse to a single hyphen,
/// leading/trailing hyphens trimmed. Pure and idempotent; empty input
/// yields an empty slug (callers treat that as a validation failure).
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let replaced = NON_SLUG_CHARS.replace_all(&lowered, "-");
    replaced.trim_matches('-').to_string()
}

/// Resolve id collisions within one submitted batch.
///
/// Walks candidates in submission order; the first occurrence of an id
/// keeps the bare name, later duplicates get `-2`, `-3`, ... (the first
/// unused suffix). Uniqueness holds within the batch only — the schedule
/// merge replaces the whole persisted list, so prior ids are irrelevant.
pub fn resolve_collisions<I, S>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut used: HashSet<String> = HashSet::new();
    let mut resolved = Vec::new();

    for candidate in candidates {
        let base = candidate.as_ref().to_string();
        let mut id = base.clone();
        let mut counter = 1u32;
        while used.contains(&id) {
            counter += 1;
            id = format!("{base}-{counter}");
        }
        used.insert(id.clone());
        resolved.push(id);
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Final Showcase!"), "final-showcase");
        assert_eq!(slugify("  Data & Dashboards  "), "data-dashboards");
        assert_eq!(slugify("2025 Kickoff"), "2025-kickoff");
    }

    #[test]
    fn slugify_is_idempotent() {
        for input in ["Final Showcase!", "a--b", "Ünïcode Name", "", "---"] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn slugify_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn no_duplicates_passes_through_unchanged() {
        let ids = ["kickoff", "midpoint", "final"];
        assert_eq!(resolve_collisions(ids), vec!["kickoff", "midpoint", "final"]);
    }

    #[test]
    fn first_occurrence_keeps_unsuffixed_name() {
        let resolved = resolve_collisions(["kickoff", "kickoff", "kickoff"]);
        assert_eq!(resolved, vec!["kickoff", "kickoff-2", "kickoff-3"]);
    }

    #[test]
    fn suffix_skips_ids_already_claimed() {
        // An explicit "demo-2" claims that name before the duplicate "demo"
        // needs a suffix, so the duplicate takes the next free one.
        let resolved = resolve_collisions(["demo", "demo-2", "demo"]);
        assert_eq!(resolved, vec!["demo", "demo-2", "demo-3"]);
    }

    #[test]
    fn outputs_are_unique_for_any_input() {
        let resolved = resolve_collisions(["a", "b", "a", "a", "b"]);
        let unique: std::collections::HashSet<_> = resolved.iter().collect();
        assert_eq!(unique.len(), resolved.len());
    }
}
