//! Structured logging field name constants.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue (e.g. link fetch failed, job retried) |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values |

/// Subsystem originating the log event.
/// Values: "api", "db", "jobs", "inference"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "worker", "link_preview", "pool", "responder"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create_note", "claim_next", "ask_ai"
pub const OPERATION: &str = "op";

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Thread UUID being operated on.
pub const THREAD_ID: &str = "thread_id";

/// Job UUID being processed.
pub const JOB_ID: &str = "job_id";

/// Job type enum variant.
pub const JOB_TYPE: &str = "job_type";

/// URL being fetched for link-preview extraction.
pub const URL: &str = "url";

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a query.
pub const RESULT_COUNT: &str = "result_count";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
