//! Infrastructure adapters. Implement outbound ports.
//!
//! Portal HTTP client (and its in-memory stand-in), tab-scoped session
//! storage, terminal UI. Map errors to DomainError.

pub mod http;
pub mod storage;
pub mod ui;
