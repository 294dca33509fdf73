//! User dashboard use cases: buying, changing and dropping policies, and
//! filing claims against them.

use crate::domain::portfolio::{available_plans, distinct_categories};
use crate::domain::{
    CatalogPolicy, ClaimApplication, DomainError, HeldPolicy, PolicyEnrollment, Policyholder,
    PremiumPlan,
};
use crate::ports::ClaimsApi;
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use tracing::info;

/// Upper bound of generated policy ids.
pub const MAX_POLICY_ID: u32 = 100_000;

/// Own record and catalog, fetched together for the update panel.
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub record: Policyholder,
    pub catalog: Vec<CatalogPolicy>,
}

impl UpdateOptions {
    /// Categories of the policies the user already holds.
    pub fn categories(&self) -> Vec<String> {
        distinct_categories(self.record.policies.iter().map(|p| p.category.as_str()))
    }

    pub fn policies_in(&self, category: &str) -> Vec<&HeldPolicy> {
        self.record
            .policies
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }

    /// Plans currently sold for a held policy. Empty once it left the catalog.
    pub fn plans_for(&self, policy: &HeldPolicy) -> &[PremiumPlan] {
        available_plans(&self.catalog, &policy.category, &policy.policy_name)
    }
}

pub fn catalog_categories(catalog: &[CatalogPolicy]) -> Vec<String> {
    distinct_categories(catalog.iter().map(|p| p.category.as_str()))
}

pub fn catalog_in<'a>(catalog: &'a [CatalogPolicy], category: &str) -> Vec<&'a CatalogPolicy> {
    catalog.iter().filter(|p| p.category == category).collect()
}

pub struct PolicyholderService {
    api: Arc<dyn ClaimsApi>,
}

impl PolicyholderService {
    pub fn new(api: Arc<dyn ClaimsApi>) -> Self {
        Self { api }
    }

    pub async fn own_record(&self, username: &str) -> Result<Policyholder, DomainError> {
        self.api.policyholder(username).await
    }

    pub async fn catalog(&self) -> Result<Vec<CatalogPolicy>, DomainError> {
        self.api.policy_catalog().await
    }

    /// Enroll in a catalog policy under a freshly drawn id. Nothing is
    /// claimed yet, so the remaining amount starts at the sum assured.
    pub async fn add_policy(
        &self,
        username: &str,
        policy: &CatalogPolicy,
        plan: PremiumPlan,
    ) -> Result<PolicyEnrollment, DomainError> {
        let policy_id = rand::thread_rng().gen_range(1..=MAX_POLICY_ID).to_string();
        let enrollment = PolicyEnrollment {
            policy_id,
            category: policy.category.clone(),
            policy_name: policy.name.clone(),
            sum_assured: policy.sum_assured,
            duration: plan.duration,
            premium: plan.premium,
            left_amount: policy.sum_assured,
        };
        self.api.upsert_policy(username, &enrollment).await?;
        info!(username, policy_id = %enrollment.policy_id, policy = %enrollment.policy_name, "policy added");
        Ok(enrollment)
    }

    pub async fn update_options(&self, username: &str) -> Result<UpdateOptions, DomainError> {
        let (record, catalog) =
            tokio::try_join!(self.api.policyholder(username), self.api.policy_catalog())?;
        Ok(UpdateOptions { record, catalog })
    }

    /// Switch a held policy to another plan. Id and remaining amount stay.
    pub async fn update_policy(
        &self,
        username: &str,
        policy: &HeldPolicy,
        plan: PremiumPlan,
    ) -> Result<Policyholder, DomainError> {
        let enrollment = PolicyEnrollment {
            policy_id: policy.policy_id.clone(),
            category: policy.category.clone(),
            policy_name: policy.policy_name.clone(),
            sum_assured: policy.sum_assured,
            duration: plan.duration,
            premium: plan.premium,
            left_amount: policy.left_amount,
        };
        self.api.upsert_policy(username, &enrollment).await?;
        info!(username, policy_id = %policy.policy_id, duration = plan.duration, "policy updated");
        self.own_record(username).await
    }

    pub async fn delete_policy(
        &self,
        username: &str,
        policy_id: &str,
    ) -> Result<Policyholder, DomainError> {
        self.api.delete_policy(username, policy_id).await?;
        info!(username, policy_id, "policy deleted");
        self.own_record(username).await
    }

    /// File a claim dated today. Checked locally against the remaining amount
    /// before anything is sent.
    pub async fn apply_claim(
        &self,
        username: &str,
        policy: &HeldPolicy,
        amount: f64,
        reason: &str,
    ) -> Result<ClaimApplication, DomainError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(DomainError::Validation(
                "Claim amount must be greater than zero".into(),
            ));
        }
        if amount > policy.left_amount {
            return Err(DomainError::Validation(format!(
                "Claim amount exceeds the remaining {:.2}",
                policy.left_amount
            )));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::Validation("Please enter a reason".into()));
        }
        let application = ClaimApplication {
            policyholder_id: username.to_string(),
            policy_id: policy.policy_id.clone(),
            amount,
            reason: reason.to_string(),
            claim_date: Utc::now().date_naive(),
        };
        self.api.apply_claim(&application).await?;
        info!(username, policy_id = %policy.policy_id, amount, "claim submitted");
        Ok(application)
    }
}
