//! Plain-text rendering of portal records for the prompts.

use crate::domain::{Claim, HeldPolicy, PendingUser, Policyholder, PremiumPlan};
use crate::domain::portfolio::ClaimMetrics;

/// Money with two decimals.
pub fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}

pub fn plan_line(plan: &PremiumPlan) -> String {
    format!("{} years, premium {}", plan.duration, money(plan.premium))
}

pub fn pending_user_line(user: &PendingUser) -> String {
    format!(
        "{:<16} {} {} [{}]",
        user.username, user.first_name, user.last_name, user.status
    )
}

pub fn policyholder_line(holder: &Policyholder) -> String {
    format!(
        "{:<16} {} {} [{}] {} {}",
        holder.username,
        holder.first_name,
        holder.last_name,
        holder.status,
        holder.policies.len(),
        if holder.policies.len() == 1 { "policy" } else { "policies" }
    )
}

pub fn held_policy_line(policy: &HeldPolicy) -> String {
    format!(
        "#{} {} / {} (left {})",
        policy.policy_id,
        policy.category,
        policy.policy_name,
        money(policy.left_amount)
    )
}

/// Multi-line detail block for one held policy.
pub fn held_policy_details(policy: &HeldPolicy) -> String {
    let claimed = if policy.claimed_amounts.is_empty() {
        "none".to_string()
    } else {
        policy
            .claimed_amounts
            .iter()
            .map(|a| money(*a))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "Policy #{}\n  Category:     {}\n  Name:         {}\n  Sum assured:  {}\n  Plan:         {} years, premium {}\n  Remaining:    {}\n  Claimed:      {}",
        policy.policy_id,
        policy.category,
        policy.policy_name,
        money(policy.sum_assured),
        policy.duration,
        money(policy.premium),
        money(policy.left_amount),
        claimed
    )
}

pub fn claim_line(claim: &Claim) -> String {
    let reason = claim.reason.as_deref().unwrap_or("-");
    format!(
        "{} policy #{} amount {} [{}] {}",
        claim.id,
        claim.policy_id,
        money(claim.amount),
        claim.status,
        reason
    )
}

pub fn metrics_line(metrics: &ClaimMetrics) -> String {
    format!(
        "pending {}, accepted {}, rejected {}",
        metrics.pending, metrics.accepted, metrics.rejected
    )
}
