//! Authorization gate: `Loading → {Unauthenticated, AuthenticatedUser,
//! AuthenticatedAdmin}` plus the navigation history the dashboards move through.
//!
//! The state is recomputed from the session store after every session
//! mutation and never carried across one. Role changes require a full
//! logout/login cycle.

use crate::domain::routes::{self, Route, Screen};
use crate::domain::{AuthorizationState, DomainError};
use crate::ports::SessionStorePort;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Process start, before the single read of the session store.
    Loading,
    Ready(AuthorizationState),
}

/// Result of asking the gate to show a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Still loading: show a spinner, decide nothing.
    Pending,
    /// `path` is permitted and renders `screen`.
    Render { path: String, screen: Screen },
    /// `requested` was not permitted; the history entry now holds `path`.
    Redirected {
        requested: String,
        path: &'static str,
        screen: Screen,
    },
}

pub struct AuthorizationGate {
    store: Arc<dyn SessionStorePort>,
    state: GateState,
    history: Vec<String>,
}

impl AuthorizationGate {
    pub fn new(store: Arc<dyn SessionStorePort>) -> Self {
        Self {
            store,
            state: GateState::Loading,
            history: Vec::new(),
        }
    }

    /// Leave `Loading` with one synchronous read of the store. Later calls
    /// return the current state without reading again.
    pub fn initialize(&mut self) -> Result<AuthorizationState, DomainError> {
        if let GateState::Ready(state) = self.state {
            return Ok(state);
        }
        let session = self.store.load()?;
        let state = AuthorizationState::from_session(session.as_ref());
        self.state = GateState::Ready(state);
        info!(role = %state, "authorization gate initialized");
        Ok(state)
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// `None` while loading.
    pub fn authorization(&self) -> Option<AuthorizationState> {
        match self.state {
            GateState::Loading => None,
            GateState::Ready(state) => Some(state),
        }
    }

    /// Current history entry.
    pub fn current_path(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Re-evaluate after a successful login. Only valid from
    /// `Unauthenticated`: switching roles without logging out is refused.
    pub fn on_login(&mut self) -> Result<AuthorizationState, DomainError> {
        match self.state {
            GateState::Ready(AuthorizationState::Unauthenticated) => {}
            GateState::Loading => {
                return Err(DomainError::Validation(
                    "authorization gate not initialized".into(),
                ));
            }
            GateState::Ready(_) => {
                return Err(DomainError::Validation(
                    "already signed in; log out before signing in again".into(),
                ));
            }
        }
        let state = AuthorizationState::from_session(self.store.load()?.as_ref());
        self.state = GateState::Ready(state);
        info!(role = %state, "authorization state after login");
        Ok(state)
    }

    /// Explicit logout: clear the session and land on `/login`.
    pub fn logout(&mut self) -> Result<(), DomainError> {
        self.store.clear()?;
        self.state = GateState::Ready(AuthorizationState::Unauthenticated);
        self.replace_top(routes::LOGIN);
        info!("logged out");
        Ok(())
    }

    /// Logout caused by an authorization failure reported by a panel.
    pub fn force_logout(&mut self, reason: &DomainError) -> Result<(), DomainError> {
        warn!(error = %reason, "forcing logout");
        self.logout()
    }

    /// Apply the routing policy. Permitted paths are pushed; disallowed ones
    /// are replaced by the canonical path of the current state.
    pub fn navigate(&mut self, path: &str) -> Navigation {
        let state = match self.state {
            GateState::Loading => return Navigation::Pending,
            GateState::Ready(state) => state,
        };
        match routes::resolve(state, path) {
            Route::Render(screen) => {
                let path = routes::normalize(path).to_string();
                if self.current_path() != Some(path.as_str()) {
                    self.history.push(path.clone());
                }
                Navigation::Render { path, screen }
            }
            Route::Redirect(target) => {
                self.replace_top(target);
                let screen = match routes::resolve(state, target) {
                    Route::Render(screen) => screen,
                    // Canonical paths always render under their own state.
                    Route::Redirect(_) => Screen::Login,
                };
                Navigation::Redirected {
                    requested: path.to_string(),
                    path: target,
                    screen,
                }
            }
        }
    }

    fn replace_top(&mut self, path: &str) {
        match self.history.last_mut() {
            Some(top) => *top = path.to_string(),
            None => self.history.push(path.to_string()),
        }
    }
}
