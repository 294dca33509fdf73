//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: the terminal UI drives the gate and dashboards from here.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Evaluate the authorization gate, navigate to `start_path` and run the
    /// interactive loop until the user quits.
    async fn run(&self, start_path: &str) -> Result<(), DomainError>;
}
