//! Service layer for business logic.

pub mod responder;

pub use responder::AiResponder;
