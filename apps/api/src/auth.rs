//! Session identity. The caller's user id and role arrive as request headers;
//! this module only resolves and checks them, it does not authenticate.

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::models::history::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Candidate,
    Hr,
}

impl Role {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "candidate" => Some(Role::Candidate),
            "hr" => Some(Role::Hr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: Role,
}

impl CurrentUser {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let id = headers
            .get(USER_ID_HEADER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<UserId>()
            .ok()?;
        let role = match headers.get(USER_ROLE_HEADER) {
            Some(v) => Role::parse(v.to_str().ok()?)?,
            None => Role::Candidate,
        };
        Some(Self { id, role })
    }

    pub fn require_hr(&self) -> Result<(), AppError> {
        match self.role {
            Role::Hr => Ok(()),
            Role::Candidate => Err(AppError::Forbidden),
        }
    }
}

/// Resolves the current user and stores it as a request extension.
/// Requests without a usable identity are refused before reaching a handler.
pub async fn authenticate(mut request: Request, next: Next) -> Result<Response, AppError> {
    match CurrentUser::from_headers(request.headers()) {
        Some(user) => {
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        None => {
            warn!("identity missing or invalid, request denied");
            Err(AppError::Unauthorized)
        }
    }
}
