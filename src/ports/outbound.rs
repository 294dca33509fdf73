//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    CatalogPolicy, Claim, ClaimApplication, Credentials, DomainError, LoginGrant, PendingUser,
    PolicyEnrollment, Policyholder, Registration, Session, UserProfile,
};

/// Tab-scoped key/value storage. Lives as long as the tab (process) does.
///
/// Multi-key operations happen under one lock so readers never see half of a
/// write.
pub trait TabStorage: Send + Sync {
    /// Values for `keys`, in order, read from one consistent snapshot.
    fn get_items(&self, keys: &[&str]) -> Result<Vec<Option<String>>, DomainError>;

    /// Sets every pair in one step.
    fn set_items(&self, items: &[(&str, &str)]) -> Result<(), DomainError>;

    /// Removes every key in one step. Missing keys are ignored.
    fn remove_items(&self, keys: &[&str]) -> Result<(), DomainError>;
}

/// Session store. The only mutation surface for the current session.
pub trait SessionStorePort: Send + Sync {
    /// Current session, or `None` when any of its fields is absent.
    fn load(&self) -> Result<Option<Session>, DomainError>;

    /// Overwrites the session with all three fields at once.
    fn save(&self, username: &str, token: &str, is_admin: bool) -> Result<(), DomainError>;

    /// Removes the session. No-op when already absent.
    fn clear(&self) -> Result<(), DomainError>;
}

/// Remote portal API. One method per endpoint; every call except `login` and
/// `register` carries the bearer token of the current session and fails with
/// `DomainError::MissingSession` when there is none.
#[async_trait::async_trait]
pub trait ClaimsApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, DomainError>;

    /// `POST /auth/register`
    async fn register(&self, registration: &Registration) -> Result<(), DomainError>;

    /// `GET /api/user/details`
    async fn user_details(&self) -> Result<UserProfile, DomainError>;

    /// `GET /api/user/tempusers`
    async fn pending_users(&self) -> Result<Vec<PendingUser>, DomainError>;

    /// `POST /api/user/confirm`
    async fn confirm_user(&self, username: &str) -> Result<(), DomainError>;

    /// `POST /api/user/reject`
    async fn reject_user(&self, username: &str) -> Result<(), DomainError>;

    /// `GET /api/policyholder`
    async fn policyholders(&self) -> Result<Vec<Policyholder>, DomainError>;

    /// `GET /api/policyholder/{username}`
    async fn policyholder(&self, username: &str) -> Result<Policyholder, DomainError>;

    /// `PUT /api/policyholder/{username}`
    async fn upsert_policy(
        &self,
        username: &str,
        enrollment: &PolicyEnrollment,
    ) -> Result<(), DomainError>;

    /// `DELETE /api/policyholder/{username}`
    async fn delete_policyholder(&self, username: &str) -> Result<(), DomainError>;

    /// `DELETE /api/delete_policy`
    async fn delete_policy(&self, username: &str, policy_id: &str) -> Result<(), DomainError>;

    /// `GET /api/policy`
    async fn policy_catalog(&self) -> Result<Vec<CatalogPolicy>, DomainError>;

    /// `GET /api/claim`
    async fn claims(&self) -> Result<Vec<Claim>, DomainError>;

    /// `POST /api/claim`
    async fn apply_claim(&self, application: &ClaimApplication) -> Result<(), DomainError>;

    /// `PUT /api/confirmclaim/{id}`
    async fn confirm_claim(&self, claim_id: &str) -> Result<(), DomainError>;

    /// `PUT /api/rejectclaim/{id}`
    async fn reject_claim(&self, claim_id: &str) -> Result<(), DomainError>;
}
