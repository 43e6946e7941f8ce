//! # jotlink-inference
//!
//! Chat-completion backend abstraction for jotlink.
//!
//! This crate provides:
//! - An OpenAI-compatible HTTP backend implementing [`jotlink_core::ChatBackend`]
//! - A deterministic mock backend for tests (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use jotlink_core::ChatBackend;
//! use jotlink_inference::OpenAiBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAiBackend::from_env().unwrap();
//!     let answer = backend
//!         .chat("You are a helpful AI assistant.", "Summarize this note.")
//!         .await
//!         .unwrap();
//!     println!("{}", answer);
//! }
//! ```

pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use jotlink_core::*;

pub use openai::OpenAiBackend;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockChatBackend;
