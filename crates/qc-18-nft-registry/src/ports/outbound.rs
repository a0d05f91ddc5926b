//! # Driven Ports (SPI - Outbound)
//!
//! Collaborators the registry depends on but does not own:
//! - a clock that can be advanced by the execution environment
//! - a sink that records emitted events

use crate::domain::value_objects::Timestamp;
use crate::events::{LoggedEvent, RegistryEvent};
use async_trait::async_trait;
use uuid::Uuid;

// =============================================================================
// CLOCK
// =============================================================================

/// Source of the current time for lock-window decisions.
///
/// Production clocks should not move backwards. Lock checks compare against
/// whatever the clock reads, so a clock that is moved back (see
/// `ManualClock::set`) re-locks tokens until it catches up again.
pub trait Clock: Send + Sync {
    /// Current time in seconds since the UNIX epoch.
    fn now(&self) -> Timestamp;
}

// =============================================================================
// EVENT SINK
// =============================================================================

/// Receiver of events emitted by committed calls.
///
/// Events of one call are published together, in emission order, under the
/// call's correlation ID.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Record the events of one committed call.
    ///
    /// # Returns
    ///
    /// The logged events with their assigned sequence numbers.
    async fn publish(&self, correlation_id: Uuid, events: &[RegistryEvent]) -> Vec<LoggedEvent>;

    /// Total number of events recorded so far.
    fn events_published(&self) -> u64;
}
