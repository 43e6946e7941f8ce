//! Shared application state for the HTTP layer.

use std::sync::Arc;

use jotlink_db::Database;

use crate::services::AiResponder;
use crate::signing::UrlSigner;

/// State threaded through every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub signer: UrlSigner,
    pub responder: Arc<AiResponder>,
}
