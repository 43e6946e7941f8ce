//! # jotlink-core
//!
//! Core types, traits, and abstractions for the jotlink notes service.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other jotlink crates depend on: the note/thread/message data
//! model, the error taxonomy, and the port traits that turn the database,
//! object storage, job scheduler, identity provider, and chat backend into
//! injectable, testable seams.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
