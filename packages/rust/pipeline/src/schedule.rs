//! Schedule merge: replace a cohort year's full event list, idempotently.
//!
//! A submission carries the cohort year and a YAML array of event entries.
//! Every entry is validated and normalized before anything is read or
//! written; one invalid entry rejects the whole batch. The merge then
//! rewrites only the `events` key of the year's data file and compares the
//! re-serialized document byte-for-byte against the persisted file, so a
//! resubmission of identical content is a reported no-op.

use chrono::Utc;
use serde_yaml::Value;
use tracing::{info, instrument};

use showcase_forms::{FieldMap, resolve_collisions, slugify};
use showcase_shared::{
    CohortYear, MergeOutcome, Result, ScheduleEvent, ShowcaseError, normalize_iso_date,
};
use showcase_store::RecordStore;
use showcase_store::datafile::CohortDataFile;

/// Replace the event list for one cohort year from a parsed submission.
///
/// The year's data file must already exist (years are pre-provisioned by
/// the year scaffolder); a missing file is a hard failure, not an implicit
/// create.
#[instrument(skip_all)]
pub fn update_schedule(store: &RecordStore, fields: &FieldMap) -> Result<MergeOutcome> {
    let year = require_year(fields)?;
    let events = parse_entries(require_entries(fields)?)?;

    let mut data = CohortDataFile::load(store.data_file_path(&year))?;
    data.replace_events(&events)?;
    let new_content = data.serialize()?;

    if data.is_unchanged(&new_content) {
        info!(%year, "schedule unchanged");
        return Ok(MergeOutcome::no_change(format!(
            "No schedule changes detected for cohort {year}."
        )));
    }

    data.write(&new_content)?;
    info!(%year, event_count = events.len(), "schedule updated");

    let summary = events
        .iter()
        .map(|e| format!("- {} ({})", e.name, e.date))
        .collect::<Vec<_>>()
        .join("\n");
    let stamp = Utc::now().format("%Y%m%d%H%M%S");

    Ok(MergeOutcome {
        changed: true,
        slug: Some(year.to_string()),
        branch: Some(format!("schedule/{year}-{stamp}")),
        summary: Some(summary),
        message: format!("Updated schedule for cohort {year}."),
    })
}

/// Non-writing preview of the event ids a submission would produce.
#[derive(Debug, Clone)]
pub struct SchedulePreview {
    pub year: String,
    /// One markdown bullet per event: `` - `id` — name (date) ``.
    pub markdown: String,
}

/// Report the normalized `(id, name, date)` list for a submission without
/// touching the store. Tolerant: a malformed YAML block previews as empty
/// rather than failing, so the preview can be posted back on any input.
pub fn preview_schedule(fields: &FieldMap) -> SchedulePreview {
    let year = fields.get_or_empty("cohort_year").to_string();
    let entries = fields
        .get("schedule_entries")
        .and_then(|text| serde_yaml::from_str::<Value>(text).ok())
        .and_then(|v| match v {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        })
        .unwrap_or_default();

    let mut names = Vec::new();
    let mut dates = Vec::new();
    let mut candidate_ids = Vec::new();
    for entry in &entries {
        let Some(map) = entry.as_mapping() else {
            continue;
        };
        let name = scalar_string(map.get("name")).unwrap_or_default();
        let id = scalar_string(map.get("id"))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| slugify(&name));
        candidate_ids.push(id);
        dates.push(scalar_string(map.get("date")));
        names.push(name);
    }

    let markdown = if names.is_empty() {
        "No events detected in the YAML block.".to_string()
    } else {
        resolve_collisions(&candidate_ids)
            .iter()
            .zip(names.iter().zip(dates.iter()))
            .map(|(id, (name, date))| match date {
                Some(date) => format!("- `{id}` — {name} ({date})"),
                None => format!("- `{id}` — {name}"),
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    SchedulePreview { year, markdown }
}

// ---------------------------------------------------------------------------
// Entry parsing & normalization
// ---------------------------------------------------------------------------

fn require_year(fields: &FieldMap) -> Result<CohortYear> {
    fields
        .get("cohort_year")
        .ok_or_else(|| ShowcaseError::validation("cohort year is required in the issue form"))?
        .parse()
}

fn require_entries(fields: &FieldMap) -> Result<&str> {
    fields
        .get("schedule_entries")
        .ok_or_else(|| ShowcaseError::validation("no schedule entries were provided"))
}

/// Parse the submitted YAML block into normalized, collision-free events.
pub fn parse_entries(yaml_text: &str) -> Result<Vec<ScheduleEvent>> {
    let parsed: Value = serde_yaml::from_str(yaml_text)
        .map_err(|e| ShowcaseError::parse(format!("schedule YAML could not be parsed: {e}")))?;
    let Value::Sequence(entries) = parsed else {
        return Err(ShowcaseError::parse(
            "schedule entries must be a YAML array of events",
        ));
    };

    let mut events = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let map = entry.as_mapping().ok_or_else(|| {
            ShowcaseError::parse(format!("event at index {index} is not a mapping"))
        })?;

        let name = scalar_string(map.get("name")).unwrap_or_default();
        let raw_date = scalar_string(map.get("date")).unwrap_or_default();
        if name.is_empty() || raw_date.is_empty() {
            return Err(ShowcaseError::validation(format!(
                "each event must include a name and date (index {index})"
            )));
        }

        let date = normalize_iso_date(&raw_date).ok_or_else(|| {
            ShowcaseError::validation(format!(
                "event '{name}' has an invalid date {raw_date:?}; expected YYYY-MM-DD"
            ))
        })?;

        let id = scalar_string(map.get("id"))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| slugify(&name));
        if id.is_empty() {
            return Err(ShowcaseError::validation(format!(
                "event '{name}' yields an empty id"
            )));
        }

        let optional = |key: &str| scalar_string(map.get(key)).filter(|v| !v.is_empty());

        events.push(ScheduleEvent {
            id,
            name,
            date,
            time: optional("time"),
            location: optional("location"),
            description: optional("description"),
            kind: optional("type"),
            state: optional("state"),
            icon: optional("icon"),
        });
    }

    // Deterministic ids: first occurrence in submission order keeps the
    // bare name, later duplicates get -2, -3, ...
    let resolved = resolve_collisions(events.iter().map(|e| e.id.as_str()));
    for (event, id) in events.iter_mut().zip(resolved) {
        event.id = id;
    }

    Ok(events)
}

fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
