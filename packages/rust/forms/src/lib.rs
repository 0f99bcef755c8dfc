//! Issue-form parsing: raw submission text → normalized field map.
//!
//! Submissions use markdown `### Heading` section delimiters. Each section
//! becomes one field: the heading line (normalized) is the key, the rest of
//! the section (trimmed) is the value. Absent fields are a concern for the
//! per-record-kind validator, not the parser.

mod slug;

pub use slug::{resolve_collisions, slugify};

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Normalized field key → trimmed string value for one submission.
///
/// Keys are lower-case `[a-z0-9_]`; unknown headings are retained under
/// their normalized key with no schema enforcement at parse time.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    fields: BTreeMap<String, String>,
}

impl FieldMap {
    /// Trimmed value for a key, or `None` if absent or blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Value for a key, defaulting to the empty string.
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// Number of parsed fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields were parsed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over (key, value) pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

static HEADING_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^###\s+").expect("valid regex"));

static NON_KEY_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Normalize a heading into a field key.
///
/// Lower-case, runs of non-alphanumerics collapse to a single underscore,
/// leading/trailing underscores trimmed. Returns an empty string for
/// headings with no alphanumeric content.
pub fn normalize_key(heading: &str) -> String {
    let lowered = heading.trim().to_lowercase();
    let replaced = NON_KEY_CHARS.replace_all(&lowered, "_");
    replaced.trim_matches('_').to_string()
}

/// Split a raw submission into a [`FieldMap`].
///
/// Text before the first `### ` heading is discarded. Sections whose
/// heading normalizes to an empty key are discarded. When the same key
/// appears twice the later section wins.
pub fn parse_submission(body: &str) -> FieldMap {
    let mut fields = BTreeMap::new();

    for section in HEADING_SPLIT.split(body).skip(1) {
        let (heading, rest) = match section.split_once('\n') {
            Some((h, r)) => (h, r),
            None => (section, ""),
        };
        let key = normalize_key(heading);
        if key.is_empty() {
            continue;
        }
        fields.insert(key, rest.trim().to_string());
    }

    debug!(field_count = fields.len(), "parsed submission");
    FieldMap { fields }
}
