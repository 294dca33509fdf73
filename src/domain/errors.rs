//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. Nothing here is fatal: every
//! variant resolves to an inline message or a forced return to the login screen.

use thiserror::Error;

/// Shown when the remote API never answered.
pub const NO_RESPONSE_MESSAGE: &str = "No response received from the server";

#[derive(Error, Debug)]
pub enum DomainError {
    /// No token in the session store at call time.
    #[error("No access token found. Please login again.")]
    MissingSession,

    /// Request was sent but no response came back (connect, timeout, reset).
    #[error("No response received from the server: {0}")]
    Transport(String),

    /// Request could not be built (bad base URL, unserializable body).
    #[error("Error setting up the request: {0}")]
    Request(String),

    /// Server answered 401: the token is missing, expired or revoked.
    #[error("Authorization rejected by server{}", fmt_msg(.message))]
    Unauthorized { message: Option<String> },

    /// Any other non-success status. `message` is the body's `msg`, if any.
    #[error("Server error {status}{}", fmt_msg(.message))]
    Server { status: u16, message: Option<String> },

    /// Success status but the body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Client-side input check failed; message is shown verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Prompt failed: {0}")]
    Ui(String),
}

fn fmt_msg(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

impl DomainError {
    /// True when the error means the session is unusable and the viewer must
    /// go back to the login screen.
    pub fn forces_logout(&self) -> bool {
        matches!(self, Self::MissingSession | Self::Unauthorized { .. })
    }

    /// User-visible text. Server messages are surfaced verbatim; `fallback`
    /// covers failures that carry none.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::MissingSession => self.to_string(),
            Self::Transport(_) => NO_RESPONSE_MESSAGE.to_string(),
            Self::Request(_) => "Error setting up the request".to_string(),
            Self::Unauthorized { message } | Self::Server { message, .. } => message
                .clone()
                .unwrap_or_else(|| fallback.to_string()),
            Self::Validation(msg) => msg.clone(),
            Self::Decode(_) | Self::Storage(_) | Self::Ui(_) => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_server_verbatim() {
        let err = DomainError::Server {
            status: 400,
            message: Some("User already exists".into()),
        };
        assert_eq!(err.user_message("fallback"), "User already exists");
    }

    #[test]
    fn test_user_message_fallbacks() {
        let err = DomainError::Server {
            status: 500,
            message: None,
        };
        assert_eq!(
            err.user_message("An error occurred during login"),
            "An error occurred during login"
        );
        assert_eq!(
            DomainError::Transport("connection refused".into()).user_message("x"),
            NO_RESPONSE_MESSAGE
        );
        assert_eq!(
            DomainError::Request("relative URL".into()).user_message("x"),
            "Error setting up the request"
        );
        assert_eq!(
            DomainError::MissingSession.user_message("x"),
            "No access token found. Please login again."
        );
    }

    #[test]
    fn test_forces_logout() {
        assert!(DomainError::MissingSession.forces_logout());
        assert!(DomainError::Unauthorized { message: None }.forces_logout());
        assert!(!DomainError::Transport("reset".into()).forces_logout());
        assert!(
            !DomainError::Server {
                status: 403,
                message: None
            }
            .forces_logout()
        );
    }

    #[test]
    fn test_display_includes_message() {
        let err = DomainError::Unauthorized {
            message: Some("Token has expired".into()),
        };
        assert_eq!(
            err.to_string(),
            "Authorization rejected by server: Token has expired"
        );
    }
}
