//! # githerd - Batch Git Repository Runner
//!
//! `githerd` runs a fixed set of git operations (status, fetch, pull, push,
//! commit, log) across every git repository found directly under a root
//! directory, with live progress output, a durable per-run result log and a
//! per-repository success/failure report.
//!
//! ## Features
//!
//! - **One-level discovery**: every immediate subdirectory containing a
//!   `.git` entry joins the batch, in deterministic order
//! - **Bounded parallelism**: operations run concurrently up to a
//!   configurable subprocess cap
//! - **Connectivity precheck**: a single bounded TCP probe guards
//!   network-dependent batches, so a dead server costs one timeout instead
//!   of one per repository
//! - **Failure isolation**: one repository's failure never stops the rest;
//!   every repository yields exactly one result per run
//! - **Result logging**: one timestamped line per repository per run, with
//!   the five most recent run logs retained
//!
//! ## Quick Start
//!
//! ```bash
//! cd ~/repos
//! githerd status
//! githerd pull --remote gitea.local
//! githerd commit -m "sync config"
//! githerd summary
//! ```
//!
//! ## Architecture
//!
//! The crate is organized using clean architecture principles:
//!
//! - [`domain`]: Core business logic and entities
//! - [`application`]: Use cases and business workflows
//! - [`infrastructure`]: External dependencies and I/O operations
//! - [`presentation`]: CLI interface and user interaction
//! - [`common`]: Shared utilities and error handling
//!
//! ## Domain Model
//!
//! - [`domain::entities::repository::Repository`]: a discovered repository
//!   and its per-run state
//! - [`domain::entities::operation::Operation`]: the closed set of batch
//!   operations
//! - [`domain::entities::operation_result::OperationResult`]: the
//!   per-repository outcome record
//! - [`domain::value_objects::remote_host::RemoteHost`]: type-safe probe
//!   target
//!
//! ## Use Cases
//!
//! - [`application::use_cases::run_operation`]: execute one operation across
//!   the whole batch
//! - [`application::use_cases::repository_summary`]: branch/changes/drift
//!   overview
//!
//! ## Error Handling
//!
//! - [`common::error::GitherdError`]: crate-wide error type with detailed
//!   context
//! - [`common::result::GitherdResult`]: type alias for
//!   `Result<T, GitherdError>`

// Documentation attributes
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::GitherdError;
pub use crate::common::result::GitherdResult as Result;
