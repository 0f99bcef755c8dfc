//! Search corpus generation and client-side filtering.
//!
//! The corpus is derived state: every build regenerates `search.json` in
//! full from the published records. Team and event documents share one
//! namespace; event documents use the composite `event:<year>:<id>` key so
//! the two kinds can never collide (see
//! [`showcase_shared::event_corpus_slug`]).

pub mod filter;

use chrono::Utc;
use serde_yaml::Value;
use tracing::{debug, info, instrument, warn};

use showcase_forms::slugify;
use showcase_shared::{
    CohortYear, DocKind, Result, SearchDocument, SearchIndex, ShowcaseError, event_corpus_slug,
};
use showcase_store::RecordStore;
use showcase_store::frontmatter::FrontMatter;

/// Build the search corpus for every provisioned year in the store.
#[instrument(skip_all)]
pub fn build_index(store: &RecordStore) -> Result<SearchIndex> {
    let mut docs = Vec::new();
    for year in store.list_years()? {
        collect_year(store, &year, &mut docs)?;
    }
    info!(doc_count = docs.len(), "built search corpus");
    Ok(SearchIndex {
        generated_at: Utc::now(),
        docs,
    })
}

/// Serialize a corpus payload and write it to the store's index path.
pub fn write_index(store: &RecordStore, index: &SearchIndex) -> Result<()> {
    let path = store.search_index_path();
    let json = serde_json::to_string_pretty(index)
        .map_err(|e| ShowcaseError::Data(e.to_string()))?;
    store.write(&path, &json)
}

fn collect_year(
    store: &RecordStore,
    year: &CohortYear,
    docs: &mut Vec<SearchDocument>,
) -> Result<()> {
    for slug in store.list_team_slugs(year)? {
        match team_document(store, year, &slug) {
            Ok(Some(doc)) => docs.push(doc),
            Ok(None) => debug!(%year, slug, "record is not a published team, skipping"),
            Err(e) => warn!(%year, slug, error = %e, "unreadable team record, skipping"),
        }
    }
    for event_id in store.list_event_ids(year)? {
        match event_document(store, year, &event_id) {
            Ok(doc) => docs.push(doc),
            Err(e) => warn!(%year, event_id, error = %e, "unreadable event record, skipping"),
        }
    }
    Ok(())
}

fn team_document(
    store: &RecordStore,
    year: &CohortYear,
    slug: &str,
) -> Result<Option<SearchDocument>> {
    let content = store.read_to_string(&store.team_index_path(year, slug))?;
    let value = FrontMatter::split(&content)?.to_value()?;

    if value.get("layout").and_then(Value::as_str) != Some("team") {
        return Ok(None);
    }

    let title = str_field(&value, "title");
    let doc_slug = match value.get("slug").and_then(Value::as_str) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => slugify(&title),
    };

    Ok(Some(SearchDocument {
        slug: doc_slug,
        title,
        summary: str_field(&value, "summary"),
        tags: tags_field(&value),
        url: store.team_url(year, slug),
        kind: DocKind::Team,
    }))
}

fn event_document(
    store: &RecordStore,
    year: &CohortYear,
    event_id: &str,
) -> Result<SearchDocument> {
    let content = store.read_to_string(&store.event_index_path(year, event_id))?;
    let value = FrontMatter::split(&content)?.to_value()?;

    Ok(SearchDocument {
        slug: event_corpus_slug(year, event_id),
        title: str_field(&value, "title"),
        summary: str_field(&value, "summary"),
        tags: tags_field(&value),
        url: store.event_url(year, event_id),
        kind: DocKind::Event,
    })
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Space-joined tag list; the full-text indexer treats it as one field.
fn tags_field(value: &Value) -> String {
    value
        .get("tags")
        .and_then(Value::as_sequence)
        .map(|seq| {
            seq.iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_shared::SiteConfig;

    const TEAM_PAGE: &str = "---\n\
layout: team\n\
title: \"Team A\"\n\
slug: team-a\n\
summary: \"Diving into data.\"\n\
tags:
  - ml
  - dashboards\n\
---\nbody\n";

    const EVENT_PAGE: &str = "---\n\
layout: event\n\
title: \"Kickoff\"\n\
cohort: 2025\n\
event_id: kickoff\n\
summary: \"Season opener.\"\n\
---\nbody\n";

    fn populated_store() -> (tempfile::TempDir, RecordStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = RecordStore::open(tmp.path(), SiteConfig::default());
        let year: CohortYear = "2025".parse().unwrap();
        store
            .write(&store.team_index_path(&year, "team-a"), TEAM_PAGE)
            .unwrap();
        store
            .write(&store.event_index_path(&year, "kickoff"), EVENT_PAGE)
            .unwrap();
        (tmp, store)
    }

    #[test]
    fn corpus_contains_both_kinds_with_disjoint_slugs() {
        let (_tmp, store) = populated_store();
        let index = build_index(&store).unwrap();

        assert_eq!(index.docs.len(), 2);
        let team = index.docs.iter().find(|d| d.kind == DocKind::Team).unwrap();
        let event = index.docs.iter().find(|d| d.kind == DocKind::Event).unwrap();

        assert_eq!(team.slug, "team-a");
        assert_eq!(team.tags, "ml dashboards");
        assert_eq!(team.url, "/cohorts/2025/teams/team-a/");
        assert_eq!(event.slug, "event:2025:kickoff");
        assert_eq!(event.title, "Kickoff");
        assert_eq!(event.url, "/cohorts/2025/events/kickoff/");
    }

    #[test]
    fn non_team_layout_pages_are_skipped() {
        let (_tmp, store) = populated_store();
        let year: CohortYear = "2025".parse().unwrap();
        store
            .write(
                &store.team_index_path(&year, "draft"),
                "---\nlayout: draft\ntitle: \"WIP\"\n---\nbody\n",
            )
            .unwrap();

        let index = build_index(&store).unwrap();
        assert!(index.docs.iter().all(|d| d.slug != "wip"));
        assert_eq!(index.docs.len(), 2);
    }

    #[test]
    fn team_slug_falls_back_to_slugified_title() {
        let tmp = tempfile::tempdir().unwrap();
        let store = RecordStore::open(tmp.path(), SiteConfig::default());
        let year: CohortYear = "2025".parse().unwrap();
        store
            .write(
                &store.team_index_path(&year, "somewhere"),
                "---\nlayout: team\ntitle: \"Data Divers\"\n---\nbody\n",
            )
            .unwrap();

        let index = build_index(&store).unwrap();
        assert_eq!(index.docs[0].slug, "data-divers");
    }

    #[test]
    fn payload_round_trips_as_json() {
        let (_tmp, store) = populated_store();
        let index = build_index(&store).unwrap();
        write_index(&store, &index).unwrap();

        let raw = std::fs::read_to_string(store.search_index_path()).unwrap();
        let parsed: SearchIndex = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.docs.len(), index.docs.len());
        assert!(raw.contains("\"generated_at\""));
        assert!(raw.contains("\"kind\": \"event\""));
    }
}
