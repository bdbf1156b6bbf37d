//! reviewgate core library.
//!
//! This crate decides who should review a pull request and whether it may
//! merge, from a declarative review policy and already-fetched pull request
//! state. The engine performs no I/O apart from loading files at the edges.
//!
//! High-level modules:
//! - `validate`: Policy document loading, validation, and normalization.
//! - `classify`: Changed-file classification into policy groups.
//! - `select`: Rule resolution and random-with-stickiness reviewer selection.
//! - `request_gate`: Whether reviewers should be requested at all.
//! - `reviews`: Latest decision per reviewer and state buckets.
//! - `gate`: Merge gate (CI checks, approvals) and merge preflight.
//! - `absence`: Absentee logins from HR roster e-mails.
//! - `comment`: Assignment comment rendering with a stable marker.
//! - `evaluate`: Per-pull-request pipelines and parallel batches.
//! - `config`: Discovery and effective configuration resolution.
//! - `models`: Policy, pull request, and output data models.
//! - `cli`, `output`, `utils`: Binary surface.
pub mod absence;
pub mod classify;
pub mod cli;
pub mod comment;
pub mod config;
pub mod errors;
pub mod evaluate;
pub mod gate;
pub mod models;
pub mod output;
pub mod request_gate;
pub mod reviews;
pub mod select;
pub mod utils;
pub mod validate;
