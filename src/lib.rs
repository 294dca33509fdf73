//! claims-portal: role-gated terminal client for the insurance claims portal, with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
