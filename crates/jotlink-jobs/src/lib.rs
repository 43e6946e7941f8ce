//! # jotlink-jobs
//!
//! Background job system for jotlink.
//!
//! This crate provides:
//! - A polling job worker with graceful shutdown
//! - The `JobHandler` trait and per-type handler registry
//! - The link-preview extraction handler (the one deferred job this system
//!   schedules today)
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use jotlink_db::{create_pool, Database};
//! use jotlink_jobs::{JobWorker, LinkPreviewHandler, WorkerConfig};
//!
//! let pool = create_pool("postgres://...").await?;
//! let db = Arc::new(Database::new(pool));
//!
//! let mut worker = JobWorker::new(db.clone(), WorkerConfig::from_env());
//! worker.register_handler(LinkPreviewHandler::new(Arc::new(
//!     jotlink_db::PgNoteRepository::new(db.pool.clone()),
//! )));
//!
//! let handle = worker.start();
//! // ...
//! handle.shutdown().await?;
//! ```

pub mod handler;
pub mod link_preview;
pub mod worker;

// Re-export core types
pub use jotlink_core::*;

pub use handler::{JobContext, JobHandler, JobResult, NoOpHandler};
pub use link_preview::{extract_metadata, LinkPreviewHandler};
pub use worker::{JobWorker, WorkerConfig, WorkerHandle};

/// Default polling interval for job processing (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = jotlink_core::defaults::JOB_POLL_INTERVAL_MS;
