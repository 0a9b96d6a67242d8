//! Tenant client quota guard

use serde::Serialize;

use crate::account::TenantPlan;

/// Hard ceiling for `STARTER` tenants, regardless of any configured maximum.
pub const STARTER_CLIENT_LIMIT: usize = 20;

/// Ceiling for other tiers when the tenant has no configured maximum.
pub const DEFAULT_CLIENT_LIMIT: usize = 1000;

/// Inputs the guard needs about a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantQuota {
    pub plan: TenantPlan,
    pub max_clients: Option<u32>,
}

impl TenantQuota {
    pub fn new(plan: TenantPlan, max_clients: Option<u32>) -> Self {
        Self { plan, max_clients }
    }

    pub fn limit(&self) -> usize {
        effective_limit(self.plan, self.max_clients)
    }

    pub fn check(&self, current_count: usize) -> QuotaDecision {
        check_quota(current_count, self.plan, self.max_clients)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaDecision {
    Allow,
    Deny { reason: String },
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Snapshot of a tenant's quota consumption.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaUsage {
    pub plan: TenantPlan,
    pub client_limit: usize,
    pub client_count: usize,
    pub remaining: usize,
}

impl QuotaUsage {
    pub fn new(quota: TenantQuota, client_count: usize) -> Self {
        let client_limit = quota.limit();
        Self {
            plan: quota.plan,
            client_limit,
            client_count,
            remaining: client_limit.saturating_sub(client_count),
        }
    }
}

pub fn effective_limit(plan: TenantPlan, configured_max: Option<u32>) -> usize {
    match plan {
        TenantPlan::Starter => STARTER_CLIENT_LIMIT,
        _ => configured_max
            .map(|max| max as usize)
            .unwrap_or(DEFAULT_CLIENT_LIMIT),
    }
}

pub fn check_quota(
    current_count: usize,
    plan: TenantPlan,
    configured_max: Option<u32>,
) -> QuotaDecision {
    if current_count >= effective_limit(plan, configured_max) {
        QuotaDecision::Deny {
            reason: format!("client limit reached for plan {}", plan),
        }
    } else {
        QuotaDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_is_capped_at_twenty_regardless_of_max() {
        assert!(check_quota(19, TenantPlan::Starter, None).is_allowed());
        assert!(!check_quota(20, TenantPlan::Starter, None).is_allowed());
        assert!(!check_quota(20, TenantPlan::Starter, Some(500)).is_allowed());
        assert!(check_quota(5, TenantPlan::Starter, Some(1)).is_allowed());
    }

    #[test]
    fn other_tiers_use_configured_max_or_default() {
        assert_eq!(effective_limit(TenantPlan::Professional, Some(200)), 200);
        assert_eq!(effective_limit(TenantPlan::Enterprise, None), DEFAULT_CLIENT_LIMIT);
        assert!(check_quota(199, TenantPlan::Professional, Some(200)).is_allowed());
        assert!(!check_quota(200, TenantPlan::Professional, Some(200)).is_allowed());
        assert!(!check_quota(1000, TenantPlan::Enterprise, None).is_allowed());
    }

    #[test]
    fn denial_names_the_plan() {
        match check_quota(20, TenantPlan::Starter, None) {
            QuotaDecision::Deny { reason } => assert!(reason.contains("STARTER")),
            QuotaDecision::Allow => panic!("expected denial"),
        }
    }

    #[test]
    fn decision_is_monotonic_in_count() {
        for (plan, max) in [
            (TenantPlan::Starter, None),
            (TenantPlan::Professional, Some(7)),
            (TenantPlan::Enterprise, Some(0)),
        ] {
            let limit = effective_limit(plan, max);
            let first_denied = (0..limit + 5)
                .find(|count| !check_quota(*count, plan, max).is_allowed())
                .unwrap();
            assert_eq!(first_denied, limit);
            assert!((0..first_denied).all(|count| check_quota(count, plan, max).is_allowed()));
            assert!((first_denied..limit + 5).all(|count| !check_quota(count, plan, max).is_allowed()));
        }
    }

    #[test]
    fn usage_reports_remaining_slots() {
        let usage = QuotaUsage::new(TenantQuota::new(TenantPlan::Starter, None), 12);
        assert_eq!(usage.client_limit, 20);
        assert_eq!(usage.remaining, 8);

        let over = QuotaUsage::new(TenantQuota::new(TenantPlan::Professional, Some(3)), 5);
        assert_eq!(over.remaining, 0);
    }
}
