//! Role dashboard state: mount-time session check, the selected panel, and the
//! mount generation used to drop responses for panels that are gone.

use crate::domain::{AdminSection, AuthorizationState, DomainError, Session, UserProfile};
use crate::ports::{ClaimsApi, SessionStorePort};
use std::fmt;
use tracing::{debug, info};

/// A sidebar entry of one dashboard.
pub trait Panel: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Every panel in sidebar order.
    const ALL: &'static [Self];

    fn label(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminPanel {
    Details,
    ConfirmUser,
    ApproveClaim,
    Policyholders,
}

impl Panel for AdminPanel {
    const ALL: &'static [Self] = &[
        Self::Details,
        Self::ConfirmUser,
        Self::ApproveClaim,
        Self::Policyholders,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Details => "Admin Details",
            Self::ConfirmUser => "Confirm User",
            Self::ApproveClaim => "Approve Claim",
            Self::Policyholders => "All Policyholders",
        }
    }
}

/// Deep links under `/admin/...` open the matching panel.
impl From<AdminSection> for AdminPanel {
    fn from(section: AdminSection) -> Self {
        match section {
            AdminSection::ConfirmUser => Self::ConfirmUser,
            AdminSection::ConfirmClaim => Self::ApproveClaim,
            AdminSection::Policyholders => Self::Policyholders,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserPanel {
    Details,
    AddPolicy,
    UpdatePolicy,
    DeletePolicy,
    ViewPolicy,
    ApplyClaim,
}

impl Panel for UserPanel {
    const ALL: &'static [Self] = &[
        Self::Details,
        Self::AddPolicy,
        Self::UpdatePolicy,
        Self::DeletePolicy,
        Self::ViewPolicy,
        Self::ApplyClaim,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Details => "User Details",
            Self::AddPolicy => "Add Policy",
            Self::UpdatePolicy => "Update Policy",
            Self::DeletePolicy => "Delete Policy",
            Self::ViewPolicy => "View Policy",
            Self::ApplyClaim => "Apply for Claim",
        }
    }
}

/// Proof of which panel mount issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountTicket(u64);

/// A mounted dashboard. Exactly one panel (or none) is selected at a time.
#[derive(Debug)]
pub struct Dashboard<P: Panel> {
    session: Session,
    profile: UserProfile,
    selected: Option<P>,
    generation: u64,
}

impl<P: Panel> Dashboard<P> {
    /// Mount: re-check the session instead of trusting the gate, then load
    /// the caller's profile for the welcome line.
    ///
    /// Any error means the caller must force a logout. That includes
    /// transport failures on the profile fetch, which cannot be told apart
    /// from a dead session here.
    pub async fn mount(
        store: &dyn SessionStorePort,
        api: &dyn ClaimsApi,
        expected: AuthorizationState,
    ) -> Result<Self, DomainError> {
        let session = store.load()?.ok_or(DomainError::MissingSession)?;
        if AuthorizationState::from_session(Some(&session)) != expected {
            return Err(DomainError::Unauthorized {
                message: Some("Session role changed; please login again.".into()),
            });
        }
        let profile = api.user_details().await?;
        info!(username = %session.username, role = %expected, "dashboard mounted");
        Ok(Self {
            session,
            profile,
            selected: None,
            generation: 0,
        })
    }

    pub fn username(&self) -> &str {
        &self.session.username
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn selected(&self) -> Option<P> {
        self.selected
    }

    /// Welcome line shown above the panels.
    pub fn greeting(&self) -> String {
        let name = if self.profile.first_name.is_empty() {
            &self.session.username
        } else {
            &self.profile.first_name
        };
        format!("Welcome, {}!", name)
    }

    /// Select a panel from the sidebar. Unmounts whatever was shown before,
    /// even when the same panel is selected again.
    pub fn select(&mut self, panel: P) -> MountTicket {
        self.generation += 1;
        self.selected = Some(panel);
        debug!(panel = panel.label(), generation = self.generation, "panel selected");
        MountTicket(self.generation)
    }

    /// Unmount the current panel without selecting another.
    pub fn deselect(&mut self) {
        self.generation += 1;
        self.selected = None;
    }

    pub fn is_current(&self, ticket: MountTicket) -> bool {
        self.selected.is_some() && ticket.0 == self.generation
    }

    /// Keep a response only if the panel that asked for it is still mounted.
    ///
    /// The terminal loop runs one panel at a time and holds `&Dashboard` for
    /// the whole run, so its tickets are always current and this returns
    /// `Some`. It returns `None` only for a driver that calls `select` or
    /// `deselect` while a request issued under an older ticket is in flight.
    pub fn accept<T>(&self, ticket: MountTicket, response: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(response)
        } else {
            debug!(ticket = ticket.0, generation = self.generation, "discarding stale response");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::MockClaimsApi;
    use crate::adapters::storage::{MemoryTabStorage, TabSessionStore};
    use crate::domain::Credentials;
    use std::sync::Arc;

    fn setup() -> (Arc<dyn SessionStorePort>, MockClaimsApi) {
        let store: Arc<dyn SessionStorePort> =
            Arc::new(TabSessionStore::new(Arc::new(MemoryTabStorage::new())));
        let api = MockClaimsApi::seeded(Arc::clone(&store));
        (store, api)
    }

    async fn login(store: &Arc<dyn SessionStorePort>, api: &MockClaimsApi, user: &str, pass: &str) {
        let grant = api
            .login(&Credentials {
                username: user.into(),
                password: pass.into(),
            })
            .await
            .unwrap();
        store.save(user, &grant.access_token, grant.is_admin).unwrap();
    }

    #[tokio::test]
    async fn test_mount_without_session_fails() {
        let (store, api) = setup();
        let err = Dashboard::<UserPanel>::mount(
            store.as_ref(),
            &api,
            AuthorizationState::AuthenticatedUser,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::MissingSession));
    }

    #[tokio::test]
    async fn test_mount_loads_profile() {
        let (store, api) = setup();
        login(&store, &api, "jane", "jane123").await;
        let dash = Dashboard::<UserPanel>::mount(
            store.as_ref(),
            &api,
            AuthorizationState::AuthenticatedUser,
        )
        .await
        .unwrap();
        assert_eq!(dash.greeting(), "Welcome, Jane!");
        assert_eq!(dash.username(), "jane");
        assert_eq!(dash.selected(), None);
    }

    #[tokio::test]
    async fn test_mount_rejects_wrong_role() {
        let (store, api) = setup();
        login(&store, &api, "jane", "jane123").await;
        let err = Dashboard::<AdminPanel>::mount(
            store.as_ref(),
            &api,
            AuthorizationState::AuthenticatedAdmin,
        )
        .await
        .unwrap_err();
        assert!(err.forces_logout());
    }

    #[tokio::test]
    async fn test_stale_responses_are_discarded() {
        let (store, api) = setup();
        login(&store, &api, "admin", "admin123").await;
        let mut dash = Dashboard::<AdminPanel>::mount(
            store.as_ref(),
            &api,
            AuthorizationState::AuthenticatedAdmin,
        )
        .await
        .unwrap();

        let first = dash.select(AdminPanel::ConfirmUser);
        assert_eq!(dash.accept(first, 1), Some(1));
        let second = dash.select(AdminPanel::ApproveClaim);
        assert_eq!(dash.accept(first, 1), None);
        assert_eq!(dash.accept(second, 2), Some(2));
        dash.deselect();
        assert_eq!(dash.accept(second, 2), None);
    }

    #[tokio::test]
    async fn test_reselect_during_request_discards_response() {
        let (store, api) = setup();
        login(&store, &api, "admin", "admin123").await;
        let mut dash = Dashboard::<AdminPanel>::mount(
            store.as_ref(),
            &api,
            AuthorizationState::AuthenticatedAdmin,
        )
        .await
        .unwrap();

        let ticket = dash.select(AdminPanel::ConfirmUser);
        let in_flight = api.pending_users();
        dash.select(AdminPanel::ApproveClaim);
        let pending = in_flight.await.unwrap();
        assert!(!pending.is_empty());
        assert!(dash.accept(ticket, pending).is_none());
        assert_eq!(dash.selected(), Some(AdminPanel::ApproveClaim));
    }

    #[test]
    fn test_sidebar_labels() {
        let labels: Vec<&str> = AdminPanel::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(
            labels,
            ["Admin Details", "Confirm User", "Approve Claim", "All Policyholders"]
        );
        assert_eq!(UserPanel::ALL.len(), 6);
        assert_eq!(
            AdminPanel::from(AdminSection::ConfirmClaim),
            AdminPanel::ApproveClaim
        );
    }
}
