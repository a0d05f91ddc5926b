//! # Event Schema
//!
//! Events emitted by registry calls. Events are the only observable side
//! channel besides state reads; a call either commits and emits all of its
//! events, or reverts and emits none.
//!
//! | Event | Fields | Emitted by |
//! |-------|--------|------------|
//! | `OwnershipTransferred` | previous_owner, new_owner | `transferOwnership`, `renounceOwnership` |
//! | `WhiteListUpdated` | account, status | `addWhiteList`, `removeWhiteList` |
//! | `BlackListUpdated` | account, status | `addBlackList`, `removeBlackList` |
//! | `Transfer` | from, to, token_id | `safeMint`, `mintWithSignature`, `transferFrom` |
//! | `SignerUpdated` | previous_signer, new_signer | `setSigner` |

use crate::domain::value_objects::{Address, TokenId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event names, as published on the sink.
pub mod topics {
    /// Owner changed or was renounced.
    pub const OWNERSHIP_TRANSFERRED: &str = "OwnershipTransferred";
    /// Whitelist membership written.
    pub const WHITE_LIST_UPDATED: &str = "WhiteListUpdated";
    /// Blacklist membership written.
    pub const BLACK_LIST_UPDATED: &str = "BlackListUpdated";
    /// Token minted or moved.
    pub const TRANSFER: &str = "Transfer";
    /// Mint signer changed.
    pub const SIGNER_UPDATED: &str = "SignerUpdated";
}

/// An event emitted by a committed registry call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum RegistryEvent {
    /// Owner changed. `new_owner` is zero after renouncement.
    OwnershipTransferred {
        /// Owner before the call.
        previous_owner: Address,
        /// Owner after the call.
        new_owner: Address,
    },
    /// Whitelist membership written (emitted even when unchanged).
    WhiteListUpdated {
        /// Account written.
        account: Address,
        /// New membership flag.
        status: bool,
    },
    /// Blacklist membership written (emitted even when unchanged).
    BlackListUpdated {
        /// Account written.
        account: Address,
        /// New membership flag.
        status: bool,
    },
    /// Token moved. `from` is zero for mints.
    Transfer {
        /// Previous holder, zero for mints.
        from: Address,
        /// New holder.
        to: Address,
        /// Token moved.
        token_id: TokenId,
    },
    /// Mint signer changed.
    SignerUpdated {
        /// Signer before the call.
        previous_signer: Address,
        /// Signer after the call.
        new_signer: Address,
    },
}

impl RegistryEvent {
    /// Event name (see [`topics`]).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::OwnershipTransferred { .. } => topics::OWNERSHIP_TRANSFERRED,
            Self::WhiteListUpdated { .. } => topics::WHITE_LIST_UPDATED,
            Self::BlackListUpdated { .. } => topics::BLACK_LIST_UPDATED,
            Self::Transfer { .. } => topics::TRANSFER,
            Self::SignerUpdated { .. } => topics::SIGNER_UPDATED,
        }
    }

    /// Returns the minted token id if this is a mint (`Transfer` from zero).
    #[must_use]
    pub fn minted_token(&self) -> Option<TokenId> {
        match self {
            Self::Transfer { from, token_id, .. } if from.is_zero() => Some(*token_id),
            _ => None,
        }
    }
}

/// An event as recorded by an [`EventSink`](crate::ports::outbound::EventSink).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Position in the sink's log, starting at 0.
    pub sequence: u64,
    /// Correlation ID of the call that emitted it.
    pub correlation_id: Uuid,
    /// The event.
    pub event: RegistryEvent,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let event = RegistryEvent::WhiteListUpdated {
            account: Address::ZERO,
            status: true,
        };
        assert_eq!(event.name(), "WhiteListUpdated");

        let event = RegistryEvent::OwnershipTransferred {
            previous_owner: Address::new([1u8; 20]),
            new_owner: Address::ZERO,
        };
        assert_eq!(event.name(), topics::OWNERSHIP_TRANSFERRED);
    }

    #[test]
    fn test_minted_token_only_for_mints() {
        let user = Address::new([2u8; 20]);
        let mint = RegistryEvent::Transfer {
            from: Address::ZERO,
            to: user,
            token_id: TokenId::from(1),
        };
        assert_eq!(mint.minted_token(), Some(TokenId::from(1)));

        let transfer = RegistryEvent::Transfer {
            from: user,
            to: Address::new([3u8; 20]),
            token_id: TokenId::from(1),
        };
        assert_eq!(transfer.minted_token(), None);
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = RegistryEvent::BlackListUpdated {
            account: Address::new([9u8; 20]),
            status: false,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "BlackListUpdated");
        assert_eq!(json["status"], false);
        assert_eq!(json["account"], format!("0x{}", "09".repeat(20)));

        let back: RegistryEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
