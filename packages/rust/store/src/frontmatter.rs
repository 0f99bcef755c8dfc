//! Front matter splitting and surgical editing.
//!
//! A record is a delimited YAML metadata block followed by a free-text
//! body. The attachment merge edits exactly one section of that block,
//! so the block is modeled two ways at once: as an ordered sequence of
//! raw lines (what gets rewritten, preserving unrecognized keys and
//! formatting verbatim) and as a parsed [`serde_yaml::Value`] view
//! (read-only, for validation and indexing).

use std::sync::LazyLock;

use showcase_shared::{Attachment, Result, ShowcaseError};

/// A record split into its metadata block and body.
#[derive(Debug, Clone)]
pub struct FrontMatter {
    /// Raw lines between the `---` delimiters, order preserved.
    pub lines: Vec<String>,
    /// Everything after the closing delimiter, verbatim.
    pub body: String,
}

impl FrontMatter {
    /// Split record content into front matter lines and body.
    ///
    /// The content must start with a `---` line and contain a closing
    /// `---` line.
    pub fn split(content: &str) -> Result<Self> {
        let rest = content
            .strip_prefix("---\n")
            .or_else(|| content.strip_prefix("---\r\n"))
            .ok_or_else(|| {
                ShowcaseError::parse("front matter not found at top of file")
            })?;

        let (block, body) = find_closing_delimiter(rest)
            .ok_or_else(|| ShowcaseError::parse("front matter end not found"))?;

        Ok(Self {
            lines: block.lines().map(str::to_string).collect(),
            body: body.to_string(),
        })
    }

    /// Reassemble the record from (possibly modified) lines plus body.
    pub fn render(&self) -> String {
        format!("---\n{}\n---\n{}", self.lines.join("\n"), self.body)
    }

    /// Parsed read-only view of the whole metadata block.
    pub fn to_value(&self) -> Result<serde_yaml::Value> {
        serde_yaml::from_str(&self.lines.join("\n"))
            .map_err(|e| ShowcaseError::Data(format!("invalid front matter: {e}")))
    }

    /// Remove the `attachments:` section, returning the attachments it held.
    ///
    /// Every other line is kept verbatim. Structurally the section is the
    /// `attachments:` key line plus all following indented lines; items are
    /// `- ` entries carrying `title:` and `url:` scalars. Items missing
    /// both fields are discarded.
    pub fn take_attachments(&mut self) -> Vec<Attachment> {
        static SECTION_KEY: LazyLock<regex::Regex> =
            LazyLock::new(|| regex::Regex::new(r"^attachments\s*:\s*$").expect("valid regex"));

        let mut kept: Vec<String> = Vec::new();
        let mut existing: Vec<Attachment> = Vec::new();
        let mut i = 0;

        while i < self.lines.len() {
            let line = &self.lines[i];
            if !SECTION_KEY.is_match(line) {
                kept.push(line.clone());
                i += 1;
                continue;
            }

            // Consume the indented block that follows the key.
            i += 1;
            let mut current: Option<Attachment> = None;
            while i < self.lines.len() {
                let l = &self.lines[i];
                if !l.trim().is_empty() && !l.starts_with(' ') && !l.starts_with('\t') {
                    break; // next top-level key
                }
                let trimmed = l.trim_start();
                if let Some(rest) = trimmed.strip_prefix("- ") {
                    if let Some(item) = current.take().filter(attachment_is_usable) {
                        existing.push(item);
                    }
                    let mut item = Attachment {
                        title: String::new(),
                        url: String::new(),
                    };
                    assign_field(&mut item, rest);
                    current = Some(item);
                } else if let Some(item) = current.as_mut() {
                    assign_field(item, trimmed);
                }
                i += 1;
            }
            if let Some(item) = current.take().filter(attachment_is_usable) {
                existing.push(item);
            }
        }

        self.lines = kept;
        existing
    }

    /// Append an `attachments:` section at the end of the metadata block.
    pub fn push_attachments(&mut self, attachments: &[Attachment]) {
        self.lines.push("attachments:".to_string());
        for item in attachments {
            self.lines
                .push(format!("  - title: \"{}\"", yaml_escape(&item.title)));
            self.lines
                .push(format!("    url: \"{}\"", yaml_escape(&item.url)));
        }
    }
}

/// Find the closing `---` line; returns (block, body-after-delimiter).
fn find_closing_delimiter(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let block = rest[..offset].trim_end_matches(['\r', '\n']);
            let body = &rest[offset + line.len()..];
            return Some((block, body));
        }
        offset += line.len();
    }
    None
}

fn assign_field(item: &mut Attachment, field_line: &str) {
    if let Some(value) = field_line.strip_prefix("title:") {
        item.title = unquote(value);
    } else if let Some(value) = field_line.strip_prefix("url:") {
        item.url = unquote(value);
    }
}

fn attachment_is_usable(item: &Attachment) -> bool {
    !item.title.is_empty() || !item.url.is_empty()
}

fn unquote(value: &str) -> String {
    let trimmed = value.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .map(|v| v.replace("\\\"", "\"").replace("\\\\", "\\"))
        .unwrap_or_else(|| trimmed.to_string())
}

/// Escape a value for emission inside double quotes.
pub fn yaml_escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT_PAGE: &str = "---\n\
layout: event\n\
title: \"Kickoff\"\n\
cohort: 2025\n\
event_id: kickoff\n\
attachments:
  - title: \"Slides\"
    url: \"http://a\"
  - title: \"Recording\"
    url: \"http://b\"\n\
tags:
  - launch\n\
---\n\
\n\
Kickoff details.\n";

    #[test]
    fn split_and_render_round_trip() {
        let fm = FrontMatter::split(EVENT_PAGE).expect("split");
        assert_eq!(fm.body, "\nKickoff details.\n");
        assert_eq!(fm.render(), EVENT_PAGE);
    }

    #[test]
    fn split_rejects_missing_front_matter() {
        assert!(FrontMatter::split("no front matter here").is_err());
        assert!(FrontMatter::split("---\nunclosed: true\n").is_err());
    }

    #[test]
    fn take_attachments_extracts_and_removes_block() {
        let mut fm = FrontMatter::split(EVENT_PAGE).expect("split");
        let existing = fm.take_attachments();
        assert_eq!(existing.len(), 2);
        assert_eq!(existing[0].title, "Slides");
        assert_eq!(existing[0].url, "http://a");
        assert_eq!(existing[1].title, "Recording");

        let rendered = fm.render();
        assert!(!rendered.contains("attachments:"));
        // Keys before and after the removed block survive verbatim.
        assert!(rendered.contains("event_id: kickoff"));
        assert!(rendered.contains("tags:\n  - launch"));
        assert!(rendered.ends_with("\nKickoff details.\n"));
    }

    #[test]
    fn take_attachments_when_block_absent() {
        let mut fm = FrontMatter::split("---\ntitle: X\n---\nbody\n").expect("split");
        assert!(fm.take_attachments().is_empty());
        assert_eq!(fm.lines, vec!["title: X"]);
    }

    #[test]
    fn push_attachments_appends_quoted_block() {
        let mut fm = FrontMatter::split("---\ntitle: X\n---\nbody\n").expect("split");
        fm.push_attachments(&[Attachment {
            title: "Q4 \"final\" deck".into(),
            url: "http://a".into(),
        }]);
        let rendered = fm.render();
        assert!(rendered.contains("attachments:\n  - title: \"Q4 \\\"final\\\" deck\"\n    url: \"http://a\"\n"));
    }

    #[test]
    fn spliced_block_parses_as_yaml() {
        let mut fm = FrontMatter::split(EVENT_PAGE).expect("split");
        fm.take_attachments();
        fm.push_attachments(&[Attachment {
            title: "Slides".into(),
            url: "http://a".into(),
        }]);
        let value = fm.to_value().expect("valid yaml");
        let attachments = value.get("attachments").expect("attachments key");
        assert_eq!(attachments.as_sequence().map(|s| s.len()), Some(1));
        assert_eq!(value.get("layout").and_then(|v| v.as_str()), Some("event"));
    }

    #[test]
    fn unquoted_values_are_read_too() {
        let page = "---\nattachments:\n  - title: Slides\n    url: http://a\n---\nb\n";
        let mut fm = FrontMatter::split(page).expect("split");
        let existing = fm.take_attachments();
        assert_eq!(existing[0].title, "Slides");
        assert_eq!(existing[0].url, "http://a");
    }
}
