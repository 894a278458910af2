//! Task tracking and background processing.
//!
//! Tasks carry a title, optional description, priority and status, plus an
//! append-only log of status changes. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
