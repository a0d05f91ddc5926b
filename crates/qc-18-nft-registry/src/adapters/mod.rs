//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the outbound ports.
//!
//! - Clocks: wall clock for production, manual clock for tests and simulations
//! - Event log: in-memory append-only log with broadcast fan-out

pub mod clock;
pub mod event_log;

pub use clock::*;
pub use event_log::*;
