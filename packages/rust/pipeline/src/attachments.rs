//! Attachment merge: update one event record's attachment list in place.
//!
//! The merge edits exactly one section of the record's front matter. The
//! block is handled as raw lines so every other key and the body survive
//! byte-for-byte; only the `attachments:` section is removed and re-emitted.

use tracing::{info, instrument, warn};

use showcase_forms::FieldMap;
use showcase_shared::{Attachment, CohortYear, MergeOutcome, Result, ShowcaseError};
use showcase_store::RecordStore;
use showcase_store::frontmatter::FrontMatter;

/// How submitted attachments combine with the record's existing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Discard existing attachments, use only the submitted set.
    #[default]
    Replace,
    /// Union existing and submitted, existing first, de-duplicated by the
    /// case-insensitive (title, url) pair.
    Append,
}

impl MergeMode {
    /// Mode selection from the submission: APPEND anywhere in the value
    /// (case-insensitive) selects append, anything else replaces.
    pub fn from_field(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.to_uppercase().contains("APPEND") => Self::Append,
            _ => Self::Replace,
        }
    }
}

/// Merge submitted attachments into an existing event record.
#[instrument(skip_all)]
pub fn update_attachments(store: &RecordStore, fields: &FieldMap) -> Result<MergeOutcome> {
    let year: CohortYear = fields
        .get("cohort_year")
        .ok_or_else(|| ShowcaseError::validation("cohort year is required"))?
        .parse()?;
    let event_id = fields
        .get("event_id")
        .ok_or_else(|| ShowcaseError::validation("event id is required"))?
        .to_string();
    let mode = MergeMode::from_field(fields.get("mode"));

    // A merge with nothing usable to add is a no-op, not a failure: the
    // submitter gets "no changes" and the record is never opened.
    let new_items = parse_attachment_lines(fields.get_or_empty("attachments"));
    if new_items.is_empty() {
        return Ok(MergeOutcome::no_change(
            "no valid attachments parsed from the submission",
        ));
    }

    let path = store.event_index_path(&year, &event_id);
    if !path.is_file() {
        return Err(ShowcaseError::not_found(format!(
            "event record not found: {}",
            path.display()
        )));
    }

    let content = store.read_to_string(&path)?;
    let mut fm = FrontMatter::split(&content)?;
    let existing = fm.take_attachments();

    let merged = match mode {
        MergeMode::Replace => dedupe(new_items),
        MergeMode::Append => dedupe(existing.into_iter().chain(new_items).collect()),
    };
    if merged.is_empty() {
        return Ok(MergeOutcome::no_change("no attachments to write after merge"));
    }

    fm.push_attachments(&merged);
    store.write(&path, &fm.render())?;
    info!(%year, event_id, count = merged.len(), ?mode, "attachments updated");

    let summary = merged
        .iter()
        .map(|a| format!("- {} ({})", a.title, a.url))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(MergeOutcome {
        changed: true,
        slug: Some(format!("{year}-{event_id}")),
        branch: Some(format!(
            "event-attachments/{year}-{event_id}-{}",
            chrono::Utc::now().timestamp_millis()
        )),
        summary: Some(summary),
        message: format!("Updated attachments for {year}/events/{event_id}."),
    })
}

/// Parse attachment lines, one per line: `Title | URL` preferred,
/// `Title - URL` as a fallback. Lines with neither delimiter, or with an
/// empty title or url after splitting, are dropped.
pub fn parse_attachment_lines(block: &str) -> Vec<Attachment> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_attachment_line)
        .collect()
}

fn parse_attachment_line(line: &str) -> Option<Attachment> {
    let (title, url) = if let Some((title, url)) = line.split_once('|') {
        (title, url)
    } else if let Some((title, url)) = line.split_once(" - ") {
        (title, url)
    } else {
        warn!(line, "attachment line has no delimiter, dropping");
        return None;
    };

    let title = title.trim();
    let url = url.trim();
    if title.is_empty() || url.is_empty() {
        return None;
    }
    if url::Url::parse(url).is_err() && !url.starts_with('/') {
        warn!(url, "attachment url looks malformed, keeping as submitted");
    }
    Some(Attachment {
        title: title.to_string(),
        url: url.to_string(),
    })
}

/// Order-preserving case-insensitive de-duplication.
///
/// Front matter extraction is lenient about half-filled items so a broken
/// record can still be repaired, but an attachment needs both a title and
/// a url to be persisted; partial items are dropped here.
fn dedupe(items: Vec<Attachment>) -> Vec<Attachment> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| !item.title.is_empty() && !item.url.is_empty())
        .filter(|item| seen.insert(item.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_forms::parse_submission;
    use showcase_shared::SiteConfig;

    const EVENT_PAGE: &str = "---\n\
layout: event\n\
title: \"Kickoff\"\n\
cohort: 2025\n\
event_id: kickoff\n\
attachments:
  - title: \"Slides\"
    url: \"http://a\"\n\
---\n\
\n\
Kickoff details.\n";

    fn store_with_event() -> (tempfile::TempDir, RecordStore, CohortYear) {
        let tmp = tempfile::tempdir().unwrap();
        let store = RecordStore::open(tmp.path(), SiteConfig::default());
        let year: CohortYear = "2025".parse().unwrap();
        store
            .write(&store.event_index_path(&year, "kickoff"), EVENT_PAGE)
            .unwrap();
        (tmp, store, year)
    }

    fn submission(mode: &str, attachments: &str) -> FieldMap {
        parse_submission(&format!(
            "### Cohort Year\n2025\n### Event ID\nkickoff\n### Mode\n{mode}\n### Attachments\n{attachments}\n"
        ))
    }

    #[test]
    fn line_grammar_accepts_both_delimiters() {
        let items = parse_attachment_lines(
            "Slides | http://a\nRecording - http://b\nno delimiter here\n| http://c\nTitle |\n",
        );
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Slides");
        assert_eq!(items[1].title, "Recording");
        assert_eq!(items[1].url, "http://b");
    }

    #[test]
    fn pipe_url_keeps_extra_pipes_out_of_title() {
        let items = parse_attachment_lines("Dash | http://a?x=1|2");
        assert_eq!(items[0].title, "Dash");
        assert_eq!(items[0].url, "http://a?x=1|2");
    }

    #[test]
    fn mode_selection() {
        assert_eq!(MergeMode::from_field(None), MergeMode::Replace);
        assert_eq!(MergeMode::from_field(Some("append")), MergeMode::Append);
        assert_eq!(
            MergeMode::from_field(Some("APPEND to existing")),
            MergeMode::Append
        );
        assert_eq!(MergeMode::from_field(Some("REPLACE")), MergeMode::Replace);
    }

    #[test]
    fn replace_discards_existing_regardless_of_overlap() {
        let (_tmp, store, year) = store_with_event();
        let fields = submission("REPLACE", "Recording | http://b");

        let outcome = update_attachments(&store, &fields).unwrap();
        assert!(outcome.changed);

        let content = std::fs::read_to_string(store.event_index_path(&year, "kickoff")).unwrap();
        assert!(content.contains("Recording"));
        assert!(!content.contains("Slides"));
    }

    #[test]
    fn append_dedupes_case_insensitively() {
        let (_tmp, store, year) = store_with_event();
        let fields = submission("APPEND", "SLIDES | HTTP://A\nRecording | http://b");

        update_attachments(&store, &fields).unwrap();

        let content = std::fs::read_to_string(store.event_index_path(&year, "kickoff")).unwrap();
        // Existing entry wins; the case-variant duplicate is not added.
        assert_eq!(content.matches("http://a").count(), 1);
        assert!(!content.contains("HTTP://A"));
        assert!(content.contains("Recording"));
    }

    #[test]
    fn append_preserves_existing_then_new_order() {
        let (_tmp, store, year) = store_with_event();
        let fields = submission("APPEND", "Recording | http://b");

        update_attachments(&store, &fields).unwrap();

        let content = std::fs::read_to_string(store.event_index_path(&year, "kickoff")).unwrap();
        let slides = content.find("Slides").unwrap();
        let recording = content.find("Recording").unwrap();
        assert!(slides < recording);
    }

    #[test]
    fn other_front_matter_and_body_survive_verbatim() {
        let (_tmp, store, year) = store_with_event();
        let fields = submission("REPLACE", "Recording | http://b");

        update_attachments(&store, &fields).unwrap();

        let content = std::fs::read_to_string(store.event_index_path(&year, "kickoff")).unwrap();
        assert!(content.contains("layout: event"));
        assert!(content.contains("title: \"Kickoff\""));
        assert!(content.ends_with("\nKickoff details.\n"));
    }

    #[test]
    fn missing_event_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = RecordStore::open(tmp.path(), SiteConfig::default());
        let fields = submission("REPLACE", "Slides | http://a");
        let err = update_attachments(&store, &fields).unwrap_err();
        assert!(matches!(err, ShowcaseError::NotFound { .. }));
    }

    #[test]
    fn append_drops_half_filled_existing_items() {
        let page = "---\n\
layout: event\n\
title: \"Kickoff\"\n\
cohort: 2025\n\
event_id: kickoff\n\
attachments:
  - title: \"Slides\"
    url: \"http://a\"
  - title: \"Orphan\"\n\
---\n\
\n\
Kickoff details.\n";
        let tmp = tempfile::tempdir().unwrap();
        let store = RecordStore::open(tmp.path(), SiteConfig::default());
        let year: CohortYear = "2025".parse().unwrap();
        store
            .write(&store.event_index_path(&year, "kickoff"), page)
            .unwrap();

        let fields = submission("APPEND", "Recording | http://b");
        update_attachments(&store, &fields).unwrap();

        let content = std::fs::read_to_string(store.event_index_path(&year, "kickoff")).unwrap();
        // The title-only item is not re-emitted with a blank url; the
        // complete existing item and the new one both survive.
        assert!(!content.contains("Orphan"));
        assert!(!content.contains("url: \"\""));
        assert!(content.contains("Slides"));
        assert!(content.contains("Recording"));
    }

    #[test]
    fn submission_with_no_parseable_attachments_is_a_no_op() {
        let tmp = tempfile::tempdir().unwrap();
        let store = RecordStore::open(tmp.path(), SiteConfig::default());
        let fields = submission("REPLACE", "nothing useful");
        let outcome = update_attachments(&store, &fields).unwrap();
        assert!(!outcome.changed);
        assert!(outcome.branch.is_none());
    }
}
