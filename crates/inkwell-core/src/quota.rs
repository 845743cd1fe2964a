//! Plan and free-tier quota rules.
//!
//! `check_quota` is the pure decision. Stores that hold the counter enforce
//! the same threshold atomically when a slot is reserved, so a decision made
//! here can never be raced into oversubscription.

use crate::constants::FREE_USAGE_LIMIT;
use crate::error::AppError;
use crate::models::Identity;

/// Plan requirement of a generation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanGate {
    /// Any plan; non-premium callers consume free-tier quota
    FreeWithQuota,
    /// Premium subscribers only
    Premium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    PremiumRequired,
    LimitReached { used: i32, limit: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allow,
    Deny(DenyReason),
}

/// Decide whether `identity` may run a generation.
pub fn check_quota(identity: &Identity, requires_premium: bool) -> QuotaDecision {
    if identity.plan.is_premium() {
        return QuotaDecision::Allow;
    }
    if requires_premium {
        return QuotaDecision::Deny(DenyReason::PremiumRequired);
    }
    if identity.free_usage >= FREE_USAGE_LIMIT {
        return QuotaDecision::Deny(DenyReason::LimitReached {
            used: identity.free_usage,
            limit: FREE_USAGE_LIMIT,
        });
    }
    QuotaDecision::Allow
}

impl PlanGate {
    pub fn requires_premium(&self) -> bool {
        matches!(self, PlanGate::Premium)
    }
}

impl DenyReason {
    pub fn into_error(self, feature: &str) -> AppError {
        match self {
            DenyReason::PremiumRequired => AppError::SubscriptionRequired(format!(
                "{} is only available for premium subscriptions",
                feature
            )),
            DenyReason::LimitReached { used, limit } => {
                AppError::UsageLimitExceeded { used, limit }
            }
        }
    }
}
