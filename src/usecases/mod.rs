//! Application use cases. Orchestrate domain logic via ports.

pub mod admin_service;
pub mod auth_service;
pub mod dashboard;
pub mod gate;
pub mod policyholder_service;

pub use admin_service::{AdminService, UserAction};
pub use auth_service::AuthService;
pub use dashboard::{AdminPanel, Dashboard, MountTicket, Panel, UserPanel};
pub use gate::{AuthorizationGate, GateState, Navigation};
pub use policyholder_service::{PolicyholderService, UpdateOptions};
