//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for the registry.
//! These are the interfaces between the domain and the outside world.
//!
//! - **Driving Port (Inbound)**: `RegistryApi`
//! - **Driven Ports (Outbound)**: `Clock`, `EventSink`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
