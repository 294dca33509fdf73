//! Implements SessionStorePort over tab storage.
//!
//! Keys: `access_token`, `username`, `isAdmin` (`"true"` / `"false"`).
//! Presence in storage is the only validity signal; there is no expiry check.

use crate::domain::{DomainError, Session};
use crate::ports::{SessionStorePort, TabStorage};
use std::sync::Arc;
use tracing::{debug, warn};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USERNAME_KEY: &str = "username";
pub const IS_ADMIN_KEY: &str = "isAdmin";

const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, USERNAME_KEY, IS_ADMIN_KEY];

/// Session store backed by tab-scoped storage.
pub struct TabSessionStore {
    storage: Arc<dyn TabStorage>,
}

impl TabSessionStore {
    pub fn new(storage: Arc<dyn TabStorage>) -> Self {
        Self { storage }
    }
}

impl SessionStorePort for TabSessionStore {
    fn load(&self) -> Result<Option<Session>, DomainError> {
        let mut values = self.storage.get_items(&SESSION_KEYS)?.into_iter();
        let token = values.next().flatten().filter(|t| !t.is_empty());
        let username = values.next().flatten().filter(|u| !u.is_empty());
        let is_admin = values.next().flatten().as_deref() == Some("true");
        match (token, username) {
            (Some(token), Some(username)) => Ok(Some(Session {
                token,
                username,
                is_admin,
            })),
            (None, None) => Ok(None),
            _ => {
                warn!("partial session in tab storage; treating as logged out");
                Ok(None)
            }
        }
    }

    fn save(&self, username: &str, token: &str, is_admin: bool) -> Result<(), DomainError> {
        let flag = if is_admin { "true" } else { "false" };
        self.storage.set_items(&[
            (ACCESS_TOKEN_KEY, token),
            (USERNAME_KEY, username),
            (IS_ADMIN_KEY, flag),
        ])?;
        debug!(username, is_admin, "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), DomainError> {
        self.storage.remove_items(&SESSION_KEYS)?;
        debug!("session cleared");
        Ok(())
    }
}

/// Clears the session when dropped. Held by `main` for the whole run so the
/// session never outlives the process, whatever way it ends.
pub struct UnloadGuard {
    store: Arc<dyn SessionStorePort>,
}

impl UnloadGuard {
    pub fn new(store: Arc<dyn SessionStorePort>) -> Self {
        Self { store }
    }
}

impl Drop for UnloadGuard {
    fn drop(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear session on unload");
        }
    }
}
