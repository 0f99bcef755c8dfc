//! Core domain types for the showcase record store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CohortYear
// ---------------------------------------------------------------------------

/// A four-digit cohort year, the top-level partition of the record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CohortYear(String);

impl CohortYear {
    /// The year as a string slice (always four ASCII digits).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CohortYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CohortYear {
    type Err = crate::error::ShowcaseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(crate::error::ShowcaseError::validation(format!(
                "cohort year must be a four-digit year, got {trimmed:?}"
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// ScheduleEvent
// ---------------------------------------------------------------------------

/// One entry in a cohort's `events` list in the data file.
///
/// Field order here is the serialization order in the data file; merges
/// rely on it being stable so that unchanged submissions serialize to
/// identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    /// Unique id within the cohort's event list.
    pub id: String,
    /// Display name.
    pub name: String,
    /// ISO-8601 calendar date (`YYYY-MM-DD`).
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Event category (talk, workshop, deadline, ...).
    #[serde(
        default,
        rename = "type",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Parse and normalize an ISO-8601 calendar date to `YYYY-MM-DD`.
pub fn normalize_iso_date(value: &str) -> Option<String> {
    value
        .trim()
        .parse::<NaiveDate>()
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

/// A titled link attached to an event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub title: String,
    pub url: String,
}

impl Attachment {
    /// De-duplication identity: the case-insensitive (title, url) pair.
    pub fn dedup_key(&self) -> String {
        format!("{}|{}", self.title.to_lowercase(), self.url.to_lowercase())
    }
}

// ---------------------------------------------------------------------------
// Search corpus
// ---------------------------------------------------------------------------

/// Kind discriminator for documents sharing the corpus namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocKind {
    Team,
    Event,
}

/// One document in the generated search corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Corpus-wide unique reference. Team documents use the team slug;
    /// event documents use [`event_corpus_slug`] so the two kinds can
    /// never collide.
    pub slug: String,
    pub title: String,
    pub summary: String,
    /// Space-joined tag list (the full-text indexer treats it as one field).
    pub tags: String,
    pub url: String,
    pub kind: DocKind,
}

/// Composite corpus key for an event document.
///
/// Team slugs are plain slugified titles and can never contain `:`, so the
/// `event:` prefix keeps the shared namespace collision-free.
pub fn event_corpus_slug(year: &CohortYear, event_id: &str) -> String {
    format!("event:{year}:{event_id}")
}

/// Root payload of `search.json`, regenerated in full on every build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIndex {
    pub generated_at: DateTime<Utc>,
    pub docs: Vec<SearchDocument>,
}

// ---------------------------------------------------------------------------
// MergeOutcome
// ---------------------------------------------------------------------------

/// Result of one pipeline invocation that may or may not have written.
///
/// A no-op (computed state equals persisted state, or nothing to persist)
/// is reported with `changed = false` and no branch; it is distinct from
/// an error.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Whether a file was written.
    pub changed: bool,
    /// Slug / id of the affected record, when one exists.
    pub slug: Option<String>,
    /// Suggested branch name for downstream change management.
    pub branch: Option<String>,
    /// Human-readable multi-line summary of what changed.
    pub summary: Option<String>,
    /// One-line status message.
    pub message: String,
}

impl MergeOutcome {
    /// A no-op outcome: nothing was written.
    pub fn no_change(message: impl Into<String>) -> Self {
        Self {
            changed: false,
            slug: None,
            branch: None,
            summary: None,
            message: message.into(),
        }
    }
}
