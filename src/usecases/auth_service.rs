//! Login and registration. Writes the session store on successful login only.

use crate::domain::{AuthorizationState, Credentials, DomainError, RegistrationForm, Session};
use crate::ports::{ClaimsApi, SessionStorePort};
use std::sync::Arc;
use tracing::{info, warn};

pub struct AuthService {
    api: Arc<dyn ClaimsApi>,
    store: Arc<dyn SessionStorePort>,
}

impl AuthService {
    pub fn new(api: Arc<dyn ClaimsApi>, store: Arc<dyn SessionStorePort>) -> Self {
        Self { api, store }
    }

    /// Exchange credentials for a token and store the session. The role comes
    /// from the server's admin flag. On failure the store is left untouched.
    pub async fn login(&self, credentials: Credentials) -> Result<AuthorizationState, DomainError> {
        let grant = self.api.login(&credentials).await.inspect_err(|e| {
            warn!(username = %credentials.username, error = %e, "login failed");
        })?;
        if grant.access_token.is_empty() {
            return Err(DomainError::Decode("login response without access token".into()));
        }
        self.store
            .save(&credentials.username, &grant.access_token, grant.is_admin)?;
        let session = Session {
            token: grant.access_token,
            username: credentials.username,
            is_admin: grant.is_admin,
        };
        let state = AuthorizationState::from_session(Some(&session));
        info!(username = %session.username, role = %state, "logged in");
        Ok(state)
    }

    /// Validate the form locally, then create a pending account. Nothing is
    /// sent when validation fails.
    pub async fn register(&self, form: RegistrationForm) -> Result<(), DomainError> {
        let registration = form.validate()?;
        self.api.register(&registration).await?;
        info!(username = %registration.username, "registration submitted; pending verification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::MockClaimsApi;
    use crate::adapters::storage::{MemoryTabStorage, TabSessionStore};

    fn service() -> (Arc<dyn SessionStorePort>, AuthService) {
        let store: Arc<dyn SessionStorePort> =
            Arc::new(TabSessionStore::new(Arc::new(MemoryTabStorage::new())));
        let api = Arc::new(MockClaimsApi::seeded(Arc::clone(&store)));
        (Arc::clone(&store), AuthService::new(api, store))
    }

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_admin_login_stores_admin_session() {
        let (store, auth) = service();
        let state = auth.login(creds("admin", "admin123")).await.unwrap();
        assert_eq!(state, AuthorizationState::AuthenticatedAdmin);
        let session = store.load().unwrap().unwrap();
        assert_eq!(session.username, "admin");
        assert!(session.is_admin);
    }

    #[tokio::test]
    async fn test_failed_login_leaves_store_empty() {
        let (store, auth) = service();
        let err = auth.login(creds("jane", "wrong")).await.unwrap_err();
        assert_eq!(err.user_message("x"), "Invalid username or password");
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_register_validates_before_sending() {
        let (_, auth) = service();
        let form = RegistrationForm {
            username: "kid".into(),
            password: "pw".into(),
            age: "12".into(),
            ..Default::default()
        };
        let err = auth.register(form).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        // The rejected form never reached the portal, so the name is still free.
        let form = RegistrationForm {
            username: "kid".into(),
            password: "pw".into(),
            age: "21".into(),
            ..Default::default()
        };
        auth.register(form).await.unwrap();
    }

    #[tokio::test]
    async fn test_register_duplicate_surfaces_server_message() {
        let (_, auth) = service();
        let form = RegistrationForm {
            username: "jane".into(),
            age: "30".into(),
            ..Default::default()
        };
        let err = auth.register(form).await.unwrap_err();
        assert_eq!(err.user_message("fallback"), "User already exists");
    }
}
