//! # Domain Layer (Inner Hexagon)
//!
//! Pure business logic for the registry.
//! NO I/O, NO async. The clock and the event sink live behind ports.
//!
//! ## Architecture Compliance
//!
//! - This is the **inner layer** of the hexagonal architecture.
//! - All types here are pure domain concepts.
//! - Dependencies point INWARD only (adapters depend on this, not vice versa).

pub mod entities;
pub mod invariants;
pub mod registry;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use invariants::*;
pub use registry::*;
pub use services::*;
pub use value_objects::*;
