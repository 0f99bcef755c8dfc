//! Issue-to-content pipelines: validated, collision-free record merges.
//!
//! Each pipeline takes one parsed submission, validates it fully, and then
//! touches exactly one file in the record store — or nothing at all. All
//! validation happens before any mutation; a failing submission never
//! leaves a record partially updated.
//!
//! - [`schedule`] — replace a cohort year's full event list, idempotently
//! - [`attachments`] — surgically merge an event record's attachment list
//! - [`scaffold`] — create new team/event records and provision years
//! - [`validate`] — per-record-kind field and store-wide checks

pub mod attachments;
pub mod scaffold;
pub mod schedule;
pub mod validate;
