use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use inkwell_core::models::Plan;
use inkwell_core::AppError;
use serde::{Deserialize, Serialize};

/// Session token claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // user_id
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Plan name, e.g. `premium`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    /// Scoped plan slug, e.g. `u:premium`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pla: Option<String>,
}

impl SessionClaims {
    /// Plan carried by the token; missing claims mean the free plan.
    pub fn plan(&self) -> Plan {
        self.plan
            .as_deref()
            .or(self.pla.as_deref())
            .map(Plan::from_claim)
            .unwrap_or(Plan::Free)
    }
}

/// Verified caller, stored in request extensions by the auth middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
    pub plan: Plan,
}

impl From<SessionClaims> for AuthContext {
    fn from(claims: SessionClaims) -> Self {
        let plan = claims.plan();
        Self {
            user_id: claims.sub,
            plan,
        }
    }
}

// Extracted from parts so it composes with Multipart
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthenticated(
                    "Missing session context".to_string(),
                ))
            })
    }
}
