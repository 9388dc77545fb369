//! tasksched - Task Scheduler Library
//!
//! Core functionality for the tasksched CLI: a single-user task list kept in
//! a CSV file, ordered by priority and due date.
//!
//! # Core Concepts
//!
//! - **Task records**: id, title, due date-time, priority and status
//! - **Ordering**: High before Medium before Low, earlier due first within a rank
//! - **Urgency**: overdue and due-soon classification against a reference day
//! - **Edit session**: at most one task under edit at a time
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.tasksched.toml`
//! - `error`: Error types and result aliases
//! - `task`: Record types, field parsing and input validation
//! - `storage`: CSV record store
//! - `repository`: Task operations over a record store
//! - `ordering`: Display ordering and urgency classification
//! - `session`: Single edit-in-progress tracking
//! - `export`: Copy of the ordered list under `ExportData/`
//! - `atomic`: Atomic file replacement
//! - `ui`: Terminal task viewer

pub mod atomic;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod ordering;
pub mod output;
pub mod repository;
pub mod session;
pub mod storage;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
