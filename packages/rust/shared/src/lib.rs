//! Shared types, error model, and configuration for the showcase pipelines.
//!
//! This crate is the foundation depended on by all other showcase crates.
//! It provides:
//! - [`ShowcaseError`] — the unified error type
//! - Domain types ([`CohortYear`], [`ScheduleEvent`], [`Attachment`],
//!   [`SearchDocument`], [`MergeOutcome`])
//! - Configuration ([`SiteConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{PathsConfig, ScaffoldConfig, SiteConfig, config_file_path, load_config};
pub use error::{Result, ShowcaseError};
pub use types::{
    Attachment, CohortYear, DocKind, MergeOutcome, ScheduleEvent, SearchDocument, SearchIndex,
    event_corpus_slug, normalize_iso_date,
};
