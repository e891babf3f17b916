//! Task management for taskhub.
//!
//! Tasks are created, listed with filters and pagination, partially updated
//! along a validated status lifecycle, soft-deleted, restored and erased. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
