//! HTTP handlers for the jotlink API.

pub mod files;
pub mod notes;
pub mod threads;
