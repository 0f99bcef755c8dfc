//! Per-record-kind validation and store-wide front matter checks.

use serde_yaml::Value;

use showcase_forms::FieldMap;
use showcase_shared::{CohortYear, Result, ShowcaseError, normalize_iso_date};
use showcase_store::RecordStore;
use showcase_store::frontmatter::FrontMatter;

/// Keys every published team record must carry in its front matter.
pub const TEAM_REQUIRED_KEYS: &[&str] = &[
    "title",
    "slug",
    "cohort",
    "department",
    "track",
    "coach",
    "members",
    "links",
    "summary",
    "methods",
    "tags",
    "thumbnail",
    "accessibility",
];

/// Required fields for a team submission: a title and a four-digit
/// cohort year.
pub fn require_team_submission(fields: &FieldMap, issue_title: &str) -> Result<(String, CohortYear)> {
    let title = fields
        .get("team_title")
        .unwrap_or(issue_title.trim())
        .to_string();
    if title.is_empty() {
        return Err(ShowcaseError::validation("team title is required"));
    }
    let year = fields
        .get("cohort_year")
        .ok_or_else(|| ShowcaseError::validation("cohort year is required"))?
        .parse::<CohortYear>()?;
    Ok((title, year))
}

/// Required fields for an event submission: a cohort year and a title.
/// When an event date is supplied it must be a valid ISO-8601 calendar
/// date (normalized form is returned).
pub fn require_event_submission(
    fields: &FieldMap,
    issue_title: &str,
) -> Result<(CohortYear, String, Option<String>)> {
    let year = fields
        .get("cohort_year")
        .ok_or_else(|| ShowcaseError::validation("cohort year is required"))?
        .parse::<CohortYear>()?;
    let title = fields
        .get("event_title")
        .unwrap_or(issue_title.trim())
        .to_string();
    if title.is_empty() {
        return Err(ShowcaseError::validation("event title is required"));
    }
    let date = match fields.get("event_date") {
        None => None,
        Some(raw) => Some(normalize_iso_date(raw).ok_or_else(|| {
            ShowcaseError::validation(format!(
                "event '{title}' has an invalid date {raw:?}; expected YYYY-MM-DD"
            ))
        })?),
    };
    Ok((year, title, date))
}

/// One failed record in a store-wide check.
#[derive(Debug, Clone)]
pub struct CheckFailure {
    /// Site-relative record description (year + slug).
    pub record: String,
    pub problem: String,
}

impl std::fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.record, self.problem)
    }
}

/// Validate the front matter of every persisted team record.
///
/// Collects all failures instead of stopping at the first, so one run
/// reports everything a resubmission needs to fix.
pub fn check_team_front_matter(store: &RecordStore) -> Result<Vec<CheckFailure>> {
    let mut failures = Vec::new();

    for year in store.list_years()? {
        for slug in store.list_team_slugs(&year)? {
            let record = format!("{year}/teams/{slug}");
            let path = store.team_index_path(&year, &slug);
            let content = store.read_to_string(&path)?;

            let value = match FrontMatter::split(&content).and_then(|fm| fm.to_value()) {
                Ok(v) => v,
                Err(e) => {
                    failures.push(CheckFailure {
                        record,
                        problem: e.to_string(),
                    });
                    continue;
                }
            };

            let missing: Vec<&str> = TEAM_REQUIRED_KEYS
                .iter()
                .copied()
                .filter(|key| value.get(key).is_none())
                .collect();
            if !missing.is_empty() {
                failures.push(CheckFailure {
                    record: record.clone(),
                    problem: format!("missing keys: {}", missing.join(", ")),
                });
            }

            if let Some(members) = value.get("members") {
                if !matches!(members, Value::Sequence(_)) {
                    failures.push(CheckFailure {
                        record: record.clone(),
                        problem: "members must be a list".into(),
                    });
                }
            }
            if let Some(links) = value.get("links") {
                if !matches!(links, Value::Mapping(_)) {
                    failures.push(CheckFailure {
                        record,
                        problem: "links must be a mapping".into(),
                    });
                }
            }
        }
    }

    Ok(failures)
}

/// Directories never scanned by the size check: build output and
/// vendored trees are not served from the repository.
const SIZE_CHECK_SKIP_DIRS: &[&str] = &[".git", "node_modules", "vendor", "_site"];

/// Walk the site tree and report every file over `max_bytes`.
///
/// Collects all offenders in one pass, like the front matter check,
/// so one run reports everything that has to be moved out of the repo.
pub fn check_file_sizes(site_root: &std::path::Path, max_bytes: u64) -> Result<Vec<CheckFailure>> {
    let mut failures = Vec::new();
    walk_for_oversize(site_root, site_root, max_bytes, &mut failures)?;
    Ok(failures)
}

fn walk_for_oversize(
    site_root: &std::path::Path,
    dir: &std::path::Path,
    max_bytes: u64,
    failures: &mut Vec<CheckFailure>,
) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| ShowcaseError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| ShowcaseError::io(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| ShowcaseError::io(&path, e))?;

        if meta.is_dir() {
            let name = entry.file_name();
            if SIZE_CHECK_SKIP_DIRS.iter().any(|skip| name == *skip) {
                continue;
            }
            walk_for_oversize(site_root, &path, max_bytes, failures)?;
        } else if meta.is_file() && meta.len() > max_bytes {
            let record = path
                .strip_prefix(site_root)
                .unwrap_or(&path)
                .display()
                .to_string();
            failures.push(CheckFailure {
                record,
                problem: format!(
                    "{} bytes exceeds the {} byte limit",
                    meta.len(),
                    max_bytes
                ),
            });
        }
    }
    Ok(())
}
