//! The per-year cohort data file (`<data_root>/cohorts/<year>.yml`).
//!
//! Holds `{year, events, materials, policies}`. The schedule merge replaces
//! only the `events` key; every other top-level key keeps its position and
//! value. Change detection is byte-exact against the original file, so
//! serialization must be format-stable (serde_yaml mappings preserve
//! insertion order and emit deterministically).

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use showcase_shared::{Result, ScheduleEvent, ShowcaseError};

use crate::EventSummary;

/// One loaded cohort data file, holding both the original bytes (for
/// no-op detection) and the parsed document.
#[derive(Debug, Clone)]
pub struct CohortDataFile {
    path: PathBuf,
    original: String,
    doc: Mapping,
}

impl CohortDataFile {
    /// Load the data file for a year. The file must already exist —
    /// years are pre-provisioned (see the year scaffolder).
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(ShowcaseError::not_found(format!(
                "cohort data file not found: {}",
                path.display()
            )));
        }
        let original =
            std::fs::read_to_string(&path).map_err(|e| ShowcaseError::io(&path, e))?;
        let doc: Value = serde_yaml::from_str(&original)
            .map_err(|e| ShowcaseError::Data(format!("{}: {e}", path.display())))?;
        let doc = match doc {
            Value::Mapping(m) => m,
            Value::Null => Mapping::new(),
            _ => {
                return Err(ShowcaseError::Data(format!(
                    "{}: expected a top-level mapping",
                    path.display()
                )));
            }
        };
        Ok(Self {
            path,
            original,
            doc,
        })
    }

    /// The file path this document was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the `events` key, leaving all other top-level keys untouched.
    pub fn replace_events(&mut self, events: &[ScheduleEvent]) -> Result<()> {
        let value = serde_yaml::to_value(events)
            .map_err(|e| ShowcaseError::Data(e.to_string()))?;
        self.doc
            .insert(Value::String("events".to_string()), value);
        Ok(())
    }

    /// Serialize the document with stable formatting.
    pub fn serialize(&self) -> Result<String> {
        serde_yaml::to_string(&self.doc).map_err(|e| ShowcaseError::Data(e.to_string()))
    }

    /// Whether serialized content matches the persisted bytes exactly.
    pub fn is_unchanged(&self, serialized: &str) -> bool {
        serialized == self.original
    }

    /// Write new content back to the file.
    pub fn write(&self, content: &str) -> Result<()> {
        std::fs::write(&self.path, content).map_err(|e| ShowcaseError::io(&self.path, e))
    }

    /// (id, name, date) of each event in list order, for listings and
    /// schedule previews of persisted state.
    pub fn event_summaries(&self) -> Vec<EventSummary> {
        let Some(events) = self.doc.get("events").and_then(Value::as_sequence) else {
            return Vec::new();
        };
        events
            .iter()
            .filter_map(|entry| {
                let map = entry.as_mapping()?;
                Some(EventSummary {
                    id: string_field(map, "id").unwrap_or_default(),
                    name: string_field(map, "name").unwrap_or_default(),
                    date: string_field(map, "date"),
                })
            })
            .collect()
    }
}

fn string_field(map: &Mapping, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = "year: 2025\n\
events:\n\
- id: kickoff
  name: Kickoff
  date: 2025-08-01\n\
materials:
  essentials:
  - title: Program Handbook
    type: guide
    url: /learning/2025/handbook.pdf\n\
policies:\n\
- No PII; publish only approved public data.\n";

    fn write_data(dir: &Path) -> PathBuf {
        let path = dir.join("2025.yml");
        std::fs::write(&path, DATA).unwrap();
        path
    }

    fn event(id: &str, name: &str, date: &str) -> ScheduleEvent {
        ScheduleEvent {
            id: id.into(),
            name: name.into(),
            date: date.into(),
            time: None,
            location: None,
            description: None,
            kind: None,
            state: None,
            icon: None,
        }
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let err = CohortDataFile::load("/nonexistent/2099.yml").unwrap_err();
        assert!(matches!(err, ShowcaseError::NotFound { .. }));
    }

    #[test]
    fn replace_events_preserves_other_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_data(tmp.path());
        let mut data = CohortDataFile::load(&path).unwrap();

        data.replace_events(&[event("midpoint", "Midpoint", "2025-10-01")])
            .unwrap();
        let out = data.serialize().unwrap();

        assert!(out.contains("year: 2025"));
        assert!(out.contains("Program Handbook"));
        assert!(out.contains("No PII"));
        assert!(out.contains("id: midpoint"));
        assert!(!out.contains("kickoff"));
    }

    #[test]
    fn serialization_is_stable_across_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_data(tmp.path());
        let mut data = CohortDataFile::load(&path).unwrap();
        let events = [event("kickoff", "Kickoff", "2025-08-01")];

        data.replace_events(&events).unwrap();
        let first = data.serialize().unwrap();
        data.write(&first).unwrap();

        let mut reloaded = CohortDataFile::load(&path).unwrap();
        reloaded.replace_events(&events).unwrap();
        let second = reloaded.serialize().unwrap();
        assert_eq!(first, second);
        assert!(reloaded.is_unchanged(&second));
    }

    #[test]
    fn event_summaries_in_list_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_data(tmp.path());
        let data = CohortDataFile::load(&path).unwrap();
        let summaries = data.event_summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "kickoff");
        assert_eq!(summaries[0].date.as_deref(), Some("2025-08-01"));
    }
}
