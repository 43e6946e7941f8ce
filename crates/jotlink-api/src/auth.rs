//! Bearer-token authentication extractors.
//!
//! `Auth` resolves the `Authorization: Bearer` header to an actor id and
//! degrades to anonymous on missing or unknown tokens; read paths use it and
//! return empty/absent instead of an error. `RequireAuth` is the fail-closed
//! variant for write paths.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use uuid::Uuid;

use jotlink_core::IdentityRepository;

use crate::error::ApiError;
use crate::state::AppState;

/// Optional authentication. Unknown and absent tokens resolve to anonymous.
#[derive(Debug, Clone)]
pub struct Auth {
    pub user: Option<Uuid>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let user = match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                let token = header.trim_start_matches("Bearer ").trim();
                if token.is_empty() {
                    None
                } else {
                    state.db.identity.resolve_token(token).await?
                }
            }
            _ => None,
        };

        Ok(Auth { user })
    }
}

/// Required authentication for write paths.
#[derive(Debug, Clone)]
pub struct RequireAuth {
    pub user_id: Uuid,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = Auth::from_request_parts(parts, state).await?;

        let Some(user_id) = auth.user else {
            return Err(ApiError::Unauthorized(
                "Authentication required".to_string(),
            ));
        };

        Ok(RequireAuth { user_id })
    }
}
