//! Pure aggregation over portal payloads: ordering, grouping and claim metrics.

use super::entities::{
    CatalogPolicy, Claim, ClaimStatus, PendingUser, Policyholder, PremiumPlan, VerificationStatus,
};
use std::collections::HashSet;
use std::ops::AddAssign;

/// Claim counts by outcome. `accepted` counts claims in the `approved` state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimMetrics {
    pub pending: usize,
    pub rejected: usize,
    pub accepted: usize,
}

impl ClaimMetrics {
    pub fn from_claims<'a>(claims: impl IntoIterator<Item = &'a Claim>) -> Self {
        let mut m = Self::default();
        for claim in claims {
            match claim.status {
                ClaimStatus::Pending => m.pending += 1,
                ClaimStatus::Rejected => m.rejected += 1,
                ClaimStatus::Approved => m.accepted += 1,
                ClaimStatus::Unknown => {}
            }
        }
        m
    }
}

impl AddAssign for ClaimMetrics {
    fn add_assign(&mut self, rhs: Self) {
        self.pending += rhs.pending;
        self.rejected += rhs.rejected;
        self.accepted += rhs.accepted;
    }
}

/// A verified policyholder with the claims filed under their username.
#[derive(Debug, Clone)]
pub struct PolicyholderClaims {
    pub holder: Policyholder,
    pub claims: Vec<Claim>,
    pub metrics: ClaimMetrics,
}

/// Admin claim overview: verified policyholders only, plus totals across them.
#[derive(Debug, Clone, Default)]
pub struct ClaimsOverview {
    pub holders: Vec<PolicyholderClaims>,
    pub totals: ClaimMetrics,
}

impl ClaimsOverview {
    /// Claims whose `policyholder_id` matches no verified policyholder are
    /// left out of both the per-holder lists and the totals.
    pub fn build(policyholders: Vec<Policyholder>, claims: &[Claim]) -> Self {
        let mut totals = ClaimMetrics::default();
        let holders: Vec<PolicyholderClaims> = policyholders
            .into_iter()
            .filter(|p| p.status == VerificationStatus::Accepted)
            .map(|holder| {
                let own: Vec<Claim> = claims
                    .iter()
                    .filter(|c| c.policyholder_id == holder.username)
                    .cloned()
                    .collect();
                let metrics = ClaimMetrics::from_claims(&own);
                totals += metrics;
                PolicyholderClaims {
                    holder,
                    claims: own,
                    metrics,
                }
            })
            .collect();
        Self { holders, totals }
    }

    pub fn find(&self, username: &str) -> Option<&PolicyholderClaims> {
        self.holders.iter().find(|h| h.holder.username == username)
    }
}

/// Stable sort: pending, then accepted, then rejected, then anything else.
pub fn sort_by_verification(users: &mut [PendingUser]) {
    users.sort_by_key(|u| u.status.rank());
}

/// Distinct categories in first-seen order.
pub fn distinct_categories<'a>(categories: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    categories
        .into_iter()
        .filter(|c| seen.insert(*c))
        .map(str::to_string)
        .collect()
}

/// Plans of the catalog entry with the same category and name; empty when the
/// policy is no longer sold.
pub fn available_plans<'a>(
    catalog: &'a [CatalogPolicy],
    category: &str,
    policy_name: &str,
) -> &'a [PremiumPlan] {
    catalog
        .iter()
        .find(|p| p.category == category && p.name == policy_name)
        .map(|p| p.premium_plans.as_slice())
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder(username: &str, status: VerificationStatus) -> Policyholder {
        Policyholder {
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            status,
            policies: vec![],
        }
    }

    fn claim(id: &str, owner: &str, status: ClaimStatus) -> Claim {
        Claim {
            id: id.into(),
            policyholder_id: owner.into(),
            policy_id: "1".into(),
            amount: 100.0,
            status,
            reason: None,
        }
    }

    #[test]
    fn test_claims_overview_metrics() {
        let holders = vec![
            holder("jane", VerificationStatus::Accepted),
            holder("omar", VerificationStatus::Accepted),
            holder("alice", VerificationStatus::Pending),
        ];
        let claims = vec![
            claim("c1", "jane", ClaimStatus::Pending),
            claim("c2", "jane", ClaimStatus::Approved),
            claim("c3", "jane", ClaimStatus::Approved),
            claim("c4", "omar", ClaimStatus::Rejected),
            claim("c5", "alice", ClaimStatus::Pending),
        ];
        let overview = ClaimsOverview::build(holders, &claims);

        assert_eq!(overview.holders.len(), 2);
        let jane = overview.find("jane").unwrap();
        assert_eq!(jane.claims.len(), 3);
        assert_eq!(
            jane.metrics,
            ClaimMetrics {
                pending: 1,
                rejected: 0,
                accepted: 2
            }
        );
        assert!(overview.find("alice").is_none());
        assert_eq!(
            overview.totals,
            ClaimMetrics {
                pending: 1,
                rejected: 1,
                accepted: 2
            }
        );
    }

    #[test]
    fn test_sort_by_verification() {
        let user = |name: &str, status| PendingUser {
            username: name.into(),
            first_name: String::new(),
            last_name: String::new(),
            status,
        };
        let mut users = vec![
            user("r", VerificationStatus::Rejected),
            user("a1", VerificationStatus::Accepted),
            user("p", VerificationStatus::Pending),
            user("a2", VerificationStatus::Accepted),
        ];
        sort_by_verification(&mut users);
        let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["p", "a1", "a2", "r"]);
    }

    #[test]
    fn test_distinct_categories_first_seen_order() {
        let cats = distinct_categories(["Health", "Life", "Health", "Vehicle", "Life"]);
        assert_eq!(cats, ["Health", "Life", "Vehicle"]);
    }

    #[test]
    fn test_available_plans() {
        let catalog = vec![CatalogPolicy {
            name: "Family Shield".into(),
            category: "Health".into(),
            sum_assured: 50_000.0,
            premium_plans: vec![PremiumPlan {
                duration: 5,
                premium: 1200.0,
            }],
        }];
        assert_eq!(available_plans(&catalog, "Health", "Family Shield").len(), 1);
        assert!(available_plans(&catalog, "Life", "Family Shield").is_empty());
    }
}
