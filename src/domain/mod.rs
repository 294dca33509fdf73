//! Core domain layer. No external I/O dependencies.
//!
//! Entities, the routing policy and claim aggregation live here.

pub mod entities;
pub mod errors;
pub mod portfolio;
pub mod routes;

pub use entities::{
    AuthorizationState, CatalogPolicy, Claim, ClaimApplication, ClaimStatus, Credentials,
    HeldPolicy, LoginGrant, PendingUser, PolicyEnrollment, Policyholder, PremiumPlan,
    Registration, RegistrationForm, Session, UserProfile, VerificationStatus,
};
pub use errors::DomainError;
pub use portfolio::{ClaimMetrics, ClaimsOverview, PolicyholderClaims};
pub use routes::{AdminSection, Route, Screen};
