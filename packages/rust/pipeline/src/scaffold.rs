//! Content scaffolding: create new team/event records and provision years.
//!
//! Scaffolding is fail-closed everywhere: a create targeting a path that
//! already holds content reports a conflict and leaves the existing bytes
//! untouched. The year scaffolder is the one idempotent exception — it
//! skips any piece that already exists instead of failing, so it can be
//! re-run safely.

use serde_yaml::{Mapping, Value};
use tracing::{info, instrument};

use showcase_forms::{FieldMap, slugify};
use showcase_shared::{
    Attachment, CohortYear, MergeOutcome, Result, ScaffoldConfig, ShowcaseError,
};
use showcase_store::RecordStore;
use showcase_store::frontmatter::yaml_escape;

use crate::attachments::parse_attachment_lines;
use crate::validate::{require_event_submission, require_team_submission};

// ---------------------------------------------------------------------------
// Team scaffolding
// ---------------------------------------------------------------------------

/// Create a new team record at its canonical path.
///
/// The slug comes from an explicit `slug` field, else from the title.
/// Optional fields absent from the submission get placeholder defaults.
#[instrument(skip_all)]
pub fn new_team(
    store: &RecordStore,
    scaffold: &ScaffoldConfig,
    fields: &FieldMap,
    issue_title: &str,
) -> Result<MergeOutcome> {
    let (title, year) = require_team_submission(fields, issue_title)?;

    let slug = slugify(fields.get("slug").unwrap_or(&title));
    if slug.is_empty() {
        return Err(ShowcaseError::validation(format!(
            "team title {title:?} yields an empty slug"
        )));
    }

    let team_dir = store.team_dir(&year, &slug);
    if team_dir.exists() {
        return Err(ShowcaseError::conflict(format!(
            "team directory already exists at {}; refusing to overwrite curated content",
            team_dir.display()
        )));
    }

    let content = render_team_record(store, scaffold, fields, &year, &title, &slug);
    store.write(&store.team_index_path(&year, &slug), &content)?;
    info!(%year, slug, "scaffolded team record");

    Ok(MergeOutcome {
        changed: true,
        slug: Some(slug.clone()),
        branch: Some(format!("team/{slug}")),
        summary: None,
        message: format!("Scaffolded team at {year}/teams/{slug}."),
    })
}

fn render_team_record(
    store: &RecordStore,
    scaffold: &ScaffoldConfig,
    fields: &FieldMap,
    year: &CohortYear,
    title: &str,
    slug: &str,
) -> String {
    let q = |key: &str| yaml_escape(fields.get_or_empty(key));
    let asset = |file: &str| format!("{}{file}", store.team_url(year, slug));

    let members = list_block(
        fields
            .get_or_empty("team_members")
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|name| format!("  - name: \"{}\"", yaml_escape(name))),
        &format!("  - name: \"{}\"", yaml_escape(&scaffold.placeholder)),
    );
    let methods = comma_list_block(fields.get_or_empty("methods"), &scaffold.placeholder);
    let tags = comma_list_block(fields.get_or_empty("tags"), &scaffold.placeholder);

    let dashboard_title = fields.get("dashboard_title").unwrap_or(title);
    let body = fields
        .get("project_overview")
        .unwrap_or(&scaffold.team_body);

    format!(
        "---\n\
layout: team\n\
title: \"{title}\"\n\
slug: {slug}\n\
cohort: {year}\n\
department: \"{department}\"\n\
track: \"{track}\"\n\
coach:
  name: \"{coach_name}\"
  email: \"{coach_email}\"\n\
members:\n\
{members}\n\
links:
  dashboard_url: \"{dashboard_url}\"
  poster_pdf: \"{poster}\"
  idea_sheet_pdf: \"{idea_sheet}\"\n\
summary: \"{summary}\"\n\
methods:\n\
{methods}\n\
tags:\n\
{tags}\n\
thumbnail: \"{thumbnail}\"\n\
thumbnail_alt: \"Poster thumbnail for {title_esc}\"\n\
accessibility:
  dashboard_title: \"{dashboard_title}\"\n\
---\n\
\n\
{body}\n",
        title = yaml_escape(title),
        title_esc = yaml_escape(title),
        department = q("department"),
        track = q("track"),
        coach_name = q("coach_name"),
        coach_email = q("coach_email"),
        dashboard_url = q("dashboard_url"),
        poster = asset("poster.pdf"),
        idea_sheet = asset("idea-sheet.pdf"),
        summary = q("summary"),
        thumbnail = asset("thumb.jpg"),
        dashboard_title = yaml_escape(dashboard_title),
    )
}

fn list_block(items: impl Iterator<Item = String>, placeholder_line: &str) -> String {
    let lines: Vec<String> = items.collect();
    if lines.is_empty() {
        placeholder_line.to_string()
    } else {
        lines.join("\n")
    }
}

fn comma_list_block(raw: &str, placeholder: &str) -> String {
    list_block(
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| format!("  - \"{}\"", yaml_escape(item))),
        &format!("  - \"{}\"", yaml_escape(placeholder)),
    )
}

// ---------------------------------------------------------------------------
// Event scaffolding
// ---------------------------------------------------------------------------

/// Create a new event record at its canonical path.
#[instrument(skip_all)]
pub fn new_event(
    store: &RecordStore,
    scaffold: &ScaffoldConfig,
    fields: &FieldMap,
    issue_title: &str,
) -> Result<MergeOutcome> {
    let (year, title, date) = require_event_submission(fields, issue_title)?;

    let event_id = match fields.get("event_id") {
        Some(id) => id.to_string(),
        None => slugify(&title),
    };
    if event_id.is_empty() {
        return Err(ShowcaseError::validation(format!(
            "event title {title:?} yields an empty id"
        )));
    }

    let event_dir = store.event_dir(&year, &event_id);
    if event_dir.exists() {
        return Err(ShowcaseError::conflict(format!(
            "event directory already exists at {}; refusing to overwrite curated content",
            event_dir.display()
        )));
    }

    let mut lines = vec![
        "---".to_string(),
        "layout: event".to_string(),
        format!("title: \"{}\"", yaml_escape(&title)),
        format!("cohort: {year}"),
        format!("event_id: {event_id}"),
    ];
    let mut push_optional = |key: &str, value: Option<&str>| {
        if let Some(v) = value {
            lines.push(format!("{key}: \"{}\"", yaml_escape(v)));
        }
    };
    push_optional("summary", fields.get("event_summary"));
    push_optional("event_date", date.as_deref());
    push_optional("event_time", fields.get("event_time"));
    push_optional("event_location", fields.get("event_location"));

    let attachments = parse_attachment_lines(fields.get_or_empty("attachments"));
    if !attachments.is_empty() {
        lines.push("attachments:".to_string());
        for Attachment { title, url } in &attachments {
            lines.push(format!("  - title: \"{}\"", yaml_escape(title)));
            lines.push(format!("    url: \"{}\"", yaml_escape(url)));
        }
    }
    lines.push("---".to_string());

    let body = fields.get("details").unwrap_or(&scaffold.event_body);
    let content = format!("{}\n\n{body}\n", lines.join("\n"));

    store.write(&store.event_index_path(&year, &event_id), &content)?;
    info!(%year, event_id, "scaffolded event record");

    Ok(MergeOutcome {
        changed: true,
        slug: Some(event_id.clone()),
        branch: Some(format!("event/{year}-{event_id}")),
        summary: None,
        message: format!("Scaffolded event at {year}/events/{event_id}."),
    })
}

// ---------------------------------------------------------------------------
// Year provisioning
// ---------------------------------------------------------------------------

/// Provision a cohort year: cohort index page, teams directory, and the
/// seeded data file. Pieces that already exist are left alone.
#[instrument(skip_all, fields(%year))]
pub fn scaffold_year(store: &RecordStore, year: &CohortYear) -> Result<MergeOutcome> {
    let mut created = Vec::new();

    let teams_dir = store.teams_dir(year);
    std::fs::create_dir_all(&teams_dir).map_err(|e| ShowcaseError::io(&teams_dir, e))?;

    let index_path = store.cohort_index_path(year);
    if !index_path.exists() {
        store.write(&index_path, &cohort_index_template(year))?;
        created.push("cohort index");
    }

    let data_path = store.data_file_path(year);
    if !data_path.exists() {
        let template = data_file_template(year)?;
        store.write(&data_path, &template)?;
        created.push("data file");
    }

    if created.is_empty() {
        return Ok(MergeOutcome::no_change(format!(
            "Cohort {year} is already provisioned."
        )));
    }

    info!(%year, ?created, "scaffolded year");
    Ok(MergeOutcome {
        changed: true,
        slug: Some(year.to_string()),
        branch: Some(format!("cohort/{year}")),
        summary: Some(created.iter().map(|c| format!("- {c}")).collect::<Vec<_>>().join("\n")),
        message: format!("Scaffolded year {year}."),
    })
}

fn cohort_index_template(year: &CohortYear) -> String {
    format!(
        "---\n\
layout: cohort\n\
title: \"Cohort {year}\"\n\
year: {year}\n\
intro: \"Placeholder introduction for the {year} cohort. Update with program summary.\"\n\
---\n\
\n\
Content for the {year} cohort will be added here.\n"
    )
}

fn data_file_template(year: &CohortYear) -> Result<String> {
    let yaml = format!(
        "year: {year}\n\
events:\n\
- id: kickoff
  name: Kickoff
  date: {year}-08-01
  location: TBD\n\
- id: midpoint
  name: Midpoint Check-in
  date: {year}-10-01
  location: TBD\n\
- id: final
  name: Final Showcase
  date: {year}-11-01
  location: TBD\n\
materials:
  essentials:
  - title: Program Handbook
    type: guide
    url: /learning/{year}/handbook.pdf\n\
policies:\n\
- No PII; publish only approved public data.\n\
- 'Accessibility: WCAG 2.1 AA for posted assets.'\n"
    );
    // Round-trip through the same serializer the schedule merge uses, so
    // the first merge against a freshly scaffolded year can be a no-op.
    let value: Mapping = serde_yaml::from_str(&yaml)
        .map_err(|e| ShowcaseError::Data(format!("year template: {e}")))?;
    serde_yaml::to_string(&Value::Mapping(value))
        .map_err(|e| ShowcaseError::Data(e.to_string()))
}
