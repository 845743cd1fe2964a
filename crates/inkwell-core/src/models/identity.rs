use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

/// Subscription tier of an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Premium,
}

impl Plan {
    pub fn is_premium(&self) -> bool {
        matches!(self, Plan::Premium)
    }

    /// Interpret a plan claim issued by the identity provider.
    ///
    /// Accepts bare names (`premium`) as well as scoped plan slugs such as
    /// `u:premium` or `o:premium`. Anything unrecognised resolves to `Free`.
    pub fn from_claim(claim: &str) -> Plan {
        let slug = claim
            .rsplit_once(':')
            .map(|(_, slug)| slug)
            .unwrap_or(claim)
            .trim();
        if slug.eq_ignore_ascii_case("premium") {
            Plan::Premium
        } else {
            Plan::Free
        }
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Plan::Free => write!(f, "free"),
            Plan::Premium => write!(f, "premium"),
        }
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "premium" => Ok(Plan::Premium),
            other => Err(format!("Unknown plan: {}", other)),
        }
    }
}

/// Caller identity used for gating a single request.
///
/// `user_id` and `plan` come from the verified session; `free_usage` comes
/// from the usage ledger. Request payloads never contribute to either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub plan: Plan,
    pub free_usage: i32,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, plan: Plan, free_usage: i32) -> Self {
        Self {
            user_id: user_id.into(),
            plan,
            free_usage,
        }
    }
}
