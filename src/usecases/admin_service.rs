//! Admin dashboard use cases: user verification and claim adjudication.
//!
//! Every mutation awaits its response before the refetch is issued, so the
//! returned list always reflects the mutation (when the server applied it).

use crate::domain::portfolio::sort_by_verification;
use crate::domain::{ClaimsOverview, DomainError, PendingUser, Policyholder};
use crate::ports::ClaimsApi;
use std::sync::Arc;
use tracing::info;

/// Verification actions offered for one listed user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Approve,
    Reject,
    View,
    Delete,
}

impl UserAction {
    /// Actions by status: pending can be approved or rejected, accepted can be
    /// viewed or rejected, rejected can be accepted again or deleted.
    pub fn available(status: crate::domain::VerificationStatus) -> &'static [UserAction] {
        use crate::domain::VerificationStatus::*;
        match status {
            Pending => &[Self::Approve, Self::Reject],
            Accepted => &[Self::View, Self::Reject],
            Rejected => &[Self::Approve, Self::Delete],
            Unknown => &[],
        }
    }
}

pub struct AdminService {
    api: Arc<dyn ClaimsApi>,
}

impl AdminService {
    pub fn new(api: Arc<dyn ClaimsApi>) -> Self {
        Self { api }
    }

    /// Users awaiting (or past) verification: pending, accepted, rejected.
    pub async fn verification_queue(&self) -> Result<Vec<PendingUser>, DomainError> {
        let mut users = self.api.pending_users().await?;
        sort_by_verification(&mut users);
        Ok(users)
    }

    pub async fn approve_user(&self, username: &str) -> Result<Vec<PendingUser>, DomainError> {
        self.api.confirm_user(username).await?;
        info!(username, "user approved");
        self.verification_queue().await
    }

    pub async fn reject_user(&self, username: &str) -> Result<Vec<PendingUser>, DomainError> {
        self.api.reject_user(username).await?;
        info!(username, "user rejected");
        self.verification_queue().await
    }

    pub async fn delete_user(&self, username: &str) -> Result<Vec<PendingUser>, DomainError> {
        self.api.delete_policyholder(username).await?;
        info!(username, "policyholder deleted");
        self.verification_queue().await
    }

    pub async fn view_user(&self, username: &str) -> Result<Policyholder, DomainError> {
        self.api.policyholder(username).await
    }

    pub async fn policyholders(&self) -> Result<Vec<Policyholder>, DomainError> {
        self.api.policyholders().await
    }

    /// Policyholders and claims fetched in parallel. Either failure fails both.
    pub async fn claims_overview(&self) -> Result<ClaimsOverview, DomainError> {
        let (holders, claims) = tokio::try_join!(self.api.policyholders(), self.api.claims())?;
        let overview = ClaimsOverview::build(holders, &claims);
        info!(
            holders = overview.holders.len(),
            pending = overview.totals.pending,
            "claims overview loaded"
        );
        Ok(overview)
    }

    pub async fn confirm_claim(&self, claim_id: &str) -> Result<ClaimsOverview, DomainError> {
        let claim_id = non_empty_claim_id(claim_id)?;
        self.api.confirm_claim(claim_id).await?;
        info!(claim_id, "claim confirmed");
        self.claims_overview().await
    }

    pub async fn reject_claim(&self, claim_id: &str) -> Result<ClaimsOverview, DomainError> {
        let claim_id = non_empty_claim_id(claim_id)?;
        self.api.reject_claim(claim_id).await?;
        info!(claim_id, "claim rejected");
        self.claims_overview().await
    }
}

fn non_empty_claim_id(claim_id: &str) -> Result<&str, DomainError> {
    let trimmed = claim_id.trim();
    if trimmed.is_empty() {
        Err(DomainError::Validation("Claim ID is undefined".into()))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::MockClaimsApi;
    use crate::adapters::storage::{MemoryTabStorage, TabSessionStore};
    use crate::domain::{ClaimStatus, Credentials, VerificationStatus};
    use crate::ports::SessionStorePort;

    async fn admin() -> (Arc<dyn SessionStorePort>, AdminService) {
        let store: Arc<dyn SessionStorePort> =
            Arc::new(TabSessionStore::new(Arc::new(MemoryTabStorage::new())));
        let api = Arc::new(MockClaimsApi::seeded(Arc::clone(&store)));
        let grant = api
            .login(&Credentials {
                username: "admin".into(),
                password: "admin123".into(),
            })
            .await
            .unwrap();
        store.save("admin", &grant.access_token, true).unwrap();
        (store, AdminService::new(api))
    }

    fn status_of(users: &[PendingUser], name: &str) -> Option<VerificationStatus> {
        users.iter().find(|u| u.username == name).map(|u| u.status)
    }

    #[tokio::test]
    async fn test_queue_is_sorted_by_status() {
        let (_, svc) = admin().await;
        let users = svc.verification_queue().await.unwrap();
        let ranks: Vec<u8> = users.iter().map(|u| u.status.rank()).collect();
        let mut sorted = ranks.clone();
        sorted.sort();
        assert_eq!(ranks, sorted);
        assert_eq!(users[0].username, "alice");
    }

    #[tokio::test]
    async fn test_approve_alice_leaves_pending_list() {
        let (_, svc) = admin().await;
        let before = svc.verification_queue().await.unwrap();
        assert_eq!(status_of(&before, "alice"), Some(VerificationStatus::Pending));

        let after = svc.approve_user("alice").await.unwrap();
        let pending: Vec<&str> = after
            .iter()
            .filter(|u| u.status == VerificationStatus::Pending)
            .map(|u| u.username.as_str())
            .collect();
        assert!(!pending.contains(&"alice"));
        assert_eq!(status_of(&after, "alice"), Some(VerificationStatus::Accepted));
    }

    #[tokio::test]
    async fn test_reject_then_delete() {
        let (_, svc) = admin().await;
        let users = svc.reject_user("omar").await.unwrap();
        assert_eq!(status_of(&users, "omar"), Some(VerificationStatus::Rejected));
        let users = svc.delete_user("omar").await.unwrap();
        assert_eq!(status_of(&users, "omar"), None);
    }

    #[tokio::test]
    async fn test_claims_overview_and_confirm() {
        let (_, svc) = admin().await;
        let overview = svc.claims_overview().await.unwrap();
        assert_eq!(overview.totals.pending, 1);
        assert_eq!(overview.totals.accepted, 1);
        assert!(overview.find("alice").is_none());

        let overview = svc.confirm_claim("claim-902").await.unwrap();
        assert_eq!(overview.totals.pending, 0);
        assert_eq!(overview.totals.accepted, 2);
        let jane = overview.find("jane").unwrap();
        assert!(jane.claims.iter().all(|c| c.status == ClaimStatus::Approved));
    }

    #[tokio::test]
    async fn test_empty_claim_id_rejected_locally() {
        let (_, svc) = admin().await;
        let err = svc.reject_claim("  ").await.unwrap_err();
        assert_eq!(err.user_message("x"), "Claim ID is undefined");
    }

    #[tokio::test]
    async fn test_parallel_fetch_fails_together() {
        let (store, svc) = admin().await;
        store.clear().unwrap();
        let err = svc.claims_overview().await.unwrap_err();
        assert!(err.forces_logout());
    }

    #[test]
    fn test_actions_by_status() {
        assert_eq!(
            UserAction::available(VerificationStatus::Pending),
            &[UserAction::Approve, UserAction::Reject]
        );
        assert_eq!(
            UserAction::available(VerificationStatus::Rejected),
            &[UserAction::Approve, UserAction::Delete]
        );
    }
}
