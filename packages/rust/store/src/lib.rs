//! Record-store access for the showcase site.
//!
//! Persisted layout (relative to the site root, directory names from
//! [`SiteConfig`]):
//!
//! ```text
//! <cohort_root>/<year>/index.md               cohort page
//! <cohort_root>/<year>/teams/<slug>/index.md  team record (front matter + body)
//! <cohort_root>/<year>/events/<id>/index.md   event record (front matter + body)
//! <data_root>/cohorts/<year>.yml              structured schedule data
//! ```
//!
//! This crate only knows paths, raw I/O, and the front matter / data file
//! formats; record semantics live in `showcase-pipeline`.

pub mod datafile;
pub mod frontmatter;

use std::path::{Path, PathBuf};

use tracing::debug;

use showcase_shared::{CohortYear, Result, ShowcaseError, SiteConfig};

/// Summary of one persisted schedule event, for listings.
#[derive(Debug, Clone)]
pub struct EventSummary {
    pub id: String,
    pub name: String,
    pub date: Option<String>,
}

/// Path and I/O access to one site's record store.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
    config: SiteConfig,
}

impl RecordStore {
    /// Open a store rooted at a site directory.
    pub fn open(root: impl Into<PathBuf>, config: SiteConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// The site root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // -- canonical paths ----------------------------------------------------

    pub fn cohort_dir(&self, year: &CohortYear) -> PathBuf {
        self.root
            .join(&self.config.paths.cohort_root)
            .join(year.as_str())
    }

    pub fn cohort_index_path(&self, year: &CohortYear) -> PathBuf {
        self.cohort_dir(year).join("index.md")
    }

    pub fn teams_dir(&self, year: &CohortYear) -> PathBuf {
        self.cohort_dir(year).join("teams")
    }

    pub fn team_dir(&self, year: &CohortYear, slug: &str) -> PathBuf {
        self.teams_dir(year).join(slug)
    }

    pub fn team_index_path(&self, year: &CohortYear, slug: &str) -> PathBuf {
        self.team_dir(year, slug).join("index.md")
    }

    pub fn events_dir(&self, year: &CohortYear) -> PathBuf {
        self.cohort_dir(year).join("events")
    }

    pub fn event_dir(&self, year: &CohortYear, event_id: &str) -> PathBuf {
        self.events_dir(year).join(event_id)
    }

    pub fn event_index_path(&self, year: &CohortYear, event_id: &str) -> PathBuf {
        self.event_dir(year, event_id).join("index.md")
    }

    pub fn data_file_path(&self, year: &CohortYear) -> PathBuf {
        self.root
            .join(&self.config.paths.data_root)
            .join("cohorts")
            .join(format!("{}.yml", year.as_str()))
    }

    pub fn search_index_path(&self) -> PathBuf {
        self.root.join(&self.config.paths.search_index)
    }

    // -- published URLs (site-relative) -------------------------------------

    pub fn team_url(&self, year: &CohortYear, slug: &str) -> String {
        format!("/{}/{year}/teams/{slug}/", self.config.paths.cohort_root)
    }

    pub fn event_url(&self, year: &CohortYear, event_id: &str) -> String {
        format!("/{}/{year}/events/{event_id}/", self.config.paths.cohort_root)
    }

    // -- raw I/O ------------------------------------------------------------

    /// Read a file to a string, wrapping I/O errors with the path.
    pub fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| ShowcaseError::io(path, e))
    }

    /// Write a file, creating parent directories as needed.
    pub fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ShowcaseError::io(parent, e))?;
        }
        std::fs::write(path, content).map_err(|e| ShowcaseError::io(path, e))?;
        debug!(path = %path.display(), bytes = content.len(), "wrote record");
        Ok(())
    }

    // -- listings -----------------------------------------------------------

    /// Cohort years present under the cohort root, ascending.
    pub fn list_years(&self) -> Result<Vec<CohortYear>> {
        let root = self.root.join(&self.config.paths.cohort_root);
        let mut years = Vec::new();
        if !root.exists() {
            return Ok(years);
        }
        for entry in std::fs::read_dir(&root).map_err(|e| ShowcaseError::io(&root, e))? {
            let entry = entry.map_err(|e| ShowcaseError::io(&root, e))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Ok(year) = entry.file_name().to_string_lossy().parse::<CohortYear>() {
                years.push(year);
            }
        }
        years.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(years)
    }

    /// Slugs of team records persisted for a year, sorted.
    pub fn list_team_slugs(&self, year: &CohortYear) -> Result<Vec<String>> {
        self.list_record_dirs(self.teams_dir(year))
    }

    /// Ids of event records persisted for a year, sorted.
    pub fn list_event_ids(&self, year: &CohortYear) -> Result<Vec<String>> {
        self.list_record_dirs(self.events_dir(year))
    }

    fn list_record_dirs(&self, dir: PathBuf) -> Result<Vec<String>> {
        let mut slugs = Vec::new();
        if !dir.exists() {
            return Ok(slugs);
        }
        for entry in std::fs::read_dir(&dir).map_err(|e| ShowcaseError::io(&dir, e))? {
            let entry = entry.map_err(|e| ShowcaseError::io(&dir, e))?;
            if entry.path().join("index.md").is_file() {
                slugs.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        slugs.sort();
        Ok(slugs)
    }

    /// Events persisted in a year's data file, in list order.
    pub fn list_events(&self, year: &CohortYear) -> Result<Vec<EventSummary>> {
        let data = datafile::CohortDataFile::load(self.data_file_path(year))?;
        Ok(data.event_summaries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RecordStore {
        RecordStore::open("/site", SiteConfig::default())
    }

    fn year() -> CohortYear {
        "2025".parse().unwrap()
    }

    #[test]
    fn canonical_paths() {
        let store = store();
        let year = year();
        assert_eq!(
            store.team_index_path(&year, "data-divers"),
            PathBuf::from("/site/cohorts/2025/teams/data-divers/index.md")
        );
        assert_eq!(
            store.event_index_path(&year, "kickoff"),
            PathBuf::from("/site/cohorts/2025/events/kickoff/index.md")
        );
        assert_eq!(
            store.data_file_path(&year),
            PathBuf::from("/site/_data/cohorts/2025.yml")
        );
    }

    #[test]
    fn published_urls() {
        let store = store();
        let year = year();
        assert_eq!(store.team_url(&year, "data-divers"), "/cohorts/2025/teams/data-divers/");
        assert_eq!(store.event_url(&year, "kickoff"), "/cohorts/2025/events/kickoff/");
    }

    #[test]
    fn listings_on_populated_store() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::open(tmp.path(), SiteConfig::default());
        let year = year();

        store
            .write(&store.team_index_path(&year, "team-a"), "---\ntitle: A\n---\n")
            .unwrap();
        store
            .write(&store.team_index_path(&year, "team-b"), "---\ntitle: B\n---\n")
            .unwrap();
        store
            .write(&store.event_index_path(&year, "kickoff"), "---\ntitle: K\n---\n")
            .unwrap();
        // A stray directory with no index.md is not a record.
        std::fs::create_dir_all(store.team_dir(&year, "scratch")).unwrap();

        assert_eq!(store.list_team_slugs(&year).unwrap(), vec!["team-a", "team-b"]);
        assert_eq!(store.list_event_ids(&year).unwrap(), vec!["kickoff"]);
        assert_eq!(store.list_years().unwrap(), vec![year]);
    }

    #[test]
    fn listings_on_missing_directories_are_empty() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::open(tmp.path(), SiteConfig::default());
        assert!(store.list_years().unwrap().is_empty());
        assert!(store.list_team_slugs(&year()).unwrap().is_empty());
    }
}
