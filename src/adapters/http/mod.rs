//! Portal API adapters. Implement `ClaimsApi`.
//!
//! The reqwest gateway talks to the real portal; the mock portal keeps the
//! same contract in memory for offline runs and tests.

pub mod api_client;
pub mod mock_portal;

pub use api_client::HttpClaimsApi;
pub use mock_portal::MockClaimsApi;
