//! Adapter implementations for task repository and work ports.

pub mod memory;
pub mod postgres;

mod work;

pub use work::SimulatedWork;
