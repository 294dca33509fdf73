//! In-memory portal for offline runs and tests. Implements `ClaimsApi`.
//!
//! Behaves like the remote API as far as the client can observe it: bearer
//! tokens issued at login, admin-only endpoints, `{msg}`-style failures
//! surfaced as the same `DomainError` variants the HTTP adapter produces.

use crate::domain::{
    CatalogPolicy, Claim, ClaimApplication, ClaimStatus, Credentials, DomainError, HeldPolicy,
    LoginGrant, PendingUser, PolicyEnrollment, Policyholder, PremiumPlan, Registration,
    UserProfile, VerificationStatus,
};
use crate::ports::{ClaimsApi, SessionStorePort};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::info;

struct Account {
    profile: UserProfile,
    password: String,
    is_admin: bool,
    status: VerificationStatus,
    policies: Vec<HeldPolicy>,
}

impl Account {
    fn new(username: &str, password: &str, first: &str, last: &str) -> Self {
        Self {
            profile: UserProfile {
                username: username.into(),
                first_name: first.into(),
                last_name: last.into(),
                email: Some(format!("{}@example.com", username)),
                mobile: None,
                age: None,
            },
            password: password.into(),
            is_admin: false,
            status: VerificationStatus::Pending,
            policies: Vec::new(),
        }
    }

    fn as_policyholder(&self) -> Policyholder {
        Policyholder {
            username: self.profile.username.clone(),
            first_name: self.profile.first_name.clone(),
            last_name: self.profile.last_name.clone(),
            status: self.status,
            policies: self.policies.clone(),
        }
    }
}

#[derive(Default)]
struct PortalState {
    accounts: BTreeMap<String, Account>,
    catalog: Vec<CatalogPolicy>,
    claims: Vec<Claim>,
    /// token -> username
    tokens: HashMap<String, String>,
    next_id: u64,
}

impl PortalState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn account_mut(&mut self, username: &str) -> Result<&mut Account, DomainError> {
        self.accounts
            .get_mut(username)
            .ok_or_else(|| server(404, "User not found"))
    }
}

fn server(status: u16, msg: &str) -> DomainError {
    DomainError::Server {
        status,
        message: Some(msg.to_string()),
    }
}

/// Authenticated caller of one request.
struct Caller {
    username: String,
    is_admin: bool,
}

impl Caller {
    fn require_admin(&self) -> Result<(), DomainError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(server(403, "Admin access required"))
        }
    }

    fn require_self_or_admin(&self, username: &str) -> Result<(), DomainError> {
        if self.is_admin || self.username == username {
            Ok(())
        } else {
            Err(server(403, "Not allowed to access another policyholder"))
        }
    }
}

/// Mock portal. Shares the session store with the UI, like the HTTP adapter.
pub struct MockClaimsApi {
    state: Mutex<PortalState>,
    session: Arc<dyn SessionStorePort>,
    /// Simulated network delay.
    delay: Duration,
}

impl MockClaimsApi {
    /// Empty portal with a single admin account.
    pub fn new(session: Arc<dyn SessionStorePort>) -> Self {
        let mut state = PortalState::default();
        let mut admin = Account::new("admin", "admin123", "Ada", "Admin");
        admin.is_admin = true;
        admin.status = VerificationStatus::Accepted;
        state.accounts.insert("admin".into(), admin);
        Self {
            state: Mutex::new(state),
            session,
            delay: Duration::ZERO,
        }
    }

    /// Portal with demo data: an admin, verified/pending/rejected
    /// policyholders, a small catalog and a few claims.
    pub fn seeded(session: Arc<dyn SessionStorePort>) -> Self {
        let api = Self::new(session);
        if let Ok(mut state) = api.state.lock() {
            seed(&mut state);
        }
        api
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, PortalState>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Storage("mock portal state poisoned".into()))
    }

    async fn latency(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn caller(&self, state: &PortalState) -> Result<Caller, DomainError> {
        let session = self.session.load()?.ok_or(DomainError::MissingSession)?;
        let username = state
            .tokens
            .get(&session.token)
            .ok_or_else(|| DomainError::Unauthorized {
                message: Some("Invalid or expired token".into()),
            })?;
        let is_admin = state
            .accounts
            .get(username)
            .map(|a| a.is_admin)
            .unwrap_or(false);
        Ok(Caller {
            username: username.clone(),
            is_admin,
        })
    }

    fn set_status(&self, username: &str, status: VerificationStatus) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        self.caller(&state)?.require_admin()?;
        state.account_mut(username)?.status = status;
        info!(username, %status, "[MOCK] verification status changed");
        Ok(())
    }

    fn settle_claim(&self, claim_id: &str, outcome: ClaimStatus) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        self.caller(&state)?.require_admin()?;
        let claim = state
            .claims
            .iter_mut()
            .find(|c| c.id == claim_id)
            .ok_or_else(|| server(404, "Claim not found"))?;
        if claim.status != ClaimStatus::Pending {
            return Err(server(400, "Claim already settled"));
        }
        claim.status = outcome;
        let (owner, policy_id, amount) =
            (claim.policyholder_id.clone(), claim.policy_id.clone(), claim.amount);
        if outcome == ClaimStatus::Approved {
            if let Some(policy) = state
                .accounts
                .get_mut(&owner)
                .and_then(|a| a.policies.iter_mut().find(|p| p.policy_id == policy_id))
            {
                policy.left_amount -= amount;
                policy.claimed_amounts.push(amount);
            }
        }
        info!(claim_id, %outcome, "[MOCK] claim settled");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ClaimsApi for MockClaimsApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, DomainError> {
        self.latency().await;
        let mut state = self.lock()?;
        let (is_admin, status) = match state.accounts.get(&credentials.username) {
            Some(a) if a.password == credentials.password => (a.is_admin, a.status),
            _ => {
                return Err(DomainError::Unauthorized {
                    message: Some("Invalid username or password".into()),
                });
            }
        };
        match status {
            VerificationStatus::Accepted => {}
            VerificationStatus::Rejected => return Err(server(403, "Account was rejected")),
            _ => return Err(server(403, "Account is pending verification")),
        }
        let token = state.next_id("mock-token");
        state
            .tokens
            .insert(token.clone(), credentials.username.clone());
        Ok(LoginGrant {
            access_token: token,
            is_admin,
        })
    }

    async fn register(&self, registration: &Registration) -> Result<(), DomainError> {
        self.latency().await;
        let mut state = self.lock()?;
        if state.accounts.contains_key(&registration.username) {
            return Err(server(400, "User already exists"));
        }
        let mut account = Account::new(
            &registration.username,
            &registration.password,
            &registration.first_name,
            &registration.last_name,
        );
        account.profile.email = Some(registration.email.clone());
        account.profile.mobile = Some(registration.mobile.clone());
        account.profile.age = Some(registration.age);
        state
            .accounts
            .insert(registration.username.clone(), account);
        Ok(())
    }

    async fn user_details(&self) -> Result<UserProfile, DomainError> {
        self.latency().await;
        let state = self.lock()?;
        let caller = self.caller(&state)?;
        state
            .accounts
            .get(&caller.username)
            .map(|a| a.profile.clone())
            .ok_or_else(|| server(404, "User not found"))
    }

    async fn pending_users(&self) -> Result<Vec<PendingUser>, DomainError> {
        self.latency().await;
        let state = self.lock()?;
        self.caller(&state)?.require_admin()?;
        Ok(state
            .accounts
            .values()
            .filter(|a| !a.is_admin)
            .map(|a| PendingUser {
                username: a.profile.username.clone(),
                first_name: a.profile.first_name.clone(),
                last_name: a.profile.last_name.clone(),
                status: a.status,
            })
            .collect())
    }

    async fn confirm_user(&self, username: &str) -> Result<(), DomainError> {
        self.latency().await;
        self.set_status(username, VerificationStatus::Accepted)
    }

    async fn reject_user(&self, username: &str) -> Result<(), DomainError> {
        self.latency().await;
        self.set_status(username, VerificationStatus::Rejected)
    }

    async fn policyholders(&self) -> Result<Vec<Policyholder>, DomainError> {
        self.latency().await;
        let state = self.lock()?;
        self.caller(&state)?.require_admin()?;
        Ok(state
            .accounts
            .values()
            .filter(|a| !a.is_admin)
            .map(Account::as_policyholder)
            .collect())
    }

    async fn policyholder(&self, username: &str) -> Result<Policyholder, DomainError> {
        self.latency().await;
        let state = self.lock()?;
        self.caller(&state)?.require_self_or_admin(username)?;
        state
            .accounts
            .get(username)
            .map(Account::as_policyholder)
            .ok_or_else(|| server(404, "User not found"))
    }

    async fn upsert_policy(
        &self,
        username: &str,
        enrollment: &PolicyEnrollment,
    ) -> Result<(), DomainError> {
        self.latency().await;
        let mut state = self.lock()?;
        self.caller(&state)?.require_self_or_admin(username)?;
        let account = state.account_mut(username)?;
        match account
            .policies
            .iter_mut()
            .find(|p| p.policy_id == enrollment.policy_id)
        {
            Some(existing) => {
                existing.duration = enrollment.duration;
                existing.premium = enrollment.premium;
                existing.left_amount = enrollment.left_amount;
            }
            None => account.policies.push(HeldPolicy {
                policy_id: enrollment.policy_id.clone(),
                category: enrollment.category.clone(),
                policy_name: enrollment.policy_name.clone(),
                sum_assured: enrollment.sum_assured,
                duration: enrollment.duration,
                premium: enrollment.premium,
                left_amount: enrollment.left_amount,
                claimed_amounts: Vec::new(),
            }),
        }
        Ok(())
    }

    async fn delete_policyholder(&self, username: &str) -> Result<(), DomainError> {
        self.latency().await;
        let mut state = self.lock()?;
        self.caller(&state)?.require_admin()?;
        if state.accounts.remove(username).is_none() {
            return Err(server(404, "User not found"));
        }
        state.claims.retain(|c| c.policyholder_id != username);
        state.tokens.retain(|_, owner| owner.as_str() != username);
        Ok(())
    }

    async fn delete_policy(&self, username: &str, policy_id: &str) -> Result<(), DomainError> {
        self.latency().await;
        let mut state = self.lock()?;
        self.caller(&state)?.require_self_or_admin(username)?;
        let account = state.account_mut(username)?;
        let before = account.policies.len();
        account.policies.retain(|p| p.policy_id != policy_id);
        if account.policies.len() == before {
            return Err(server(404, "Policy not found"));
        }
        Ok(())
    }

    async fn policy_catalog(&self) -> Result<Vec<CatalogPolicy>, DomainError> {
        self.latency().await;
        let state = self.lock()?;
        self.caller(&state)?;
        Ok(state.catalog.clone())
    }

    async fn claims(&self) -> Result<Vec<Claim>, DomainError> {
        self.latency().await;
        let state = self.lock()?;
        let caller = self.caller(&state)?;
        Ok(state
            .claims
            .iter()
            .filter(|c| caller.is_admin || c.policyholder_id == caller.username)
            .cloned()
            .collect())
    }

    async fn apply_claim(&self, application: &ClaimApplication) -> Result<(), DomainError> {
        self.latency().await;
        let mut state = self.lock()?;
        self.caller(&state)?
            .require_self_or_admin(&application.policyholder_id)?;
        let left = state
            .account_mut(&application.policyholder_id)?
            .policies
            .iter()
            .find(|p| p.policy_id == application.policy_id)
            .map(|p| p.left_amount)
            .ok_or_else(|| server(404, "Policy not found"))?;
        if application.amount > left {
            return Err(server(400, "Claim exceeds remaining amount"));
        }
        let id = state.next_id("claim");
        state.claims.push(Claim {
            id,
            policyholder_id: application.policyholder_id.clone(),
            policy_id: application.policy_id.clone(),
            amount: application.amount,
            status: ClaimStatus::Pending,
            reason: Some(application.reason.clone()),
        });
        Ok(())
    }

    async fn confirm_claim(&self, claim_id: &str) -> Result<(), DomainError> {
        self.latency().await;
        self.settle_claim(claim_id, ClaimStatus::Approved)
    }

    async fn reject_claim(&self, claim_id: &str) -> Result<(), DomainError> {
        self.latency().await;
        self.settle_claim(claim_id, ClaimStatus::Rejected)
    }
}

fn plan(duration: u32, premium: f64) -> PremiumPlan {
    PremiumPlan { duration, premium }
}

fn catalog_entry(name: &str, category: &str, sum_assured: f64, plans: Vec<PremiumPlan>) -> CatalogPolicy {
    CatalogPolicy {
        name: name.into(),
        category: category.into(),
        sum_assured,
        premium_plans: plans,
    }
}

fn seed(state: &mut PortalState) {
    state.catalog = vec![
        catalog_entry("Family Shield", "Health", 50_000.0, vec![plan(5, 1200.0), plan(10, 1000.0)]),
        catalog_entry("Senior Care", "Health", 30_000.0, vec![plan(5, 1500.0)]),
        catalog_entry("Term Secure", "Life", 100_000.0, vec![plan(10, 900.0), plan(20, 700.0)]),
        catalog_entry("Auto Guard", "Vehicle", 20_000.0, vec![plan(1, 450.0)]),
    ];

    let mut jane = Account::new("jane", "jane123", "Jane", "Doe");
    jane.status = VerificationStatus::Accepted;
    jane.policies.push(HeldPolicy {
        policy_id: "10482".into(),
        category: "Health".into(),
        policy_name: "Family Shield".into(),
        sum_assured: 50_000.0,
        duration: 5,
        premium: 1200.0,
        left_amount: 48_500.0,
        claimed_amounts: vec![1500.0],
    });

    let mut omar = Account::new("omar", "omar123", "Omar", "Haddad");
    omar.status = VerificationStatus::Accepted;

    let alice = Account::new("alice", "alice123", "Alice", "Liddell");

    let mut bob = Account::new("bob", "bob123", "Bob", "Stone");
    bob.status = VerificationStatus::Rejected;

    for account in [jane, omar, alice, bob] {
        state
            .accounts
            .insert(account.profile.username.clone(), account);
    }

    state.claims = vec![
        Claim {
            id: "claim-901".into(),
            policyholder_id: "jane".into(),
            policy_id: "10482".into(),
            amount: 1500.0,
            status: ClaimStatus::Approved,
            reason: Some("Hospital stay".into()),
        },
        Claim {
            id: "claim-902".into(),
            policyholder_id: "jane".into(),
            policy_id: "10482".into(),
            amount: 800.0,
            status: ClaimStatus::Pending,
            reason: Some("Physiotherapy".into()),
        },
    ];
}
