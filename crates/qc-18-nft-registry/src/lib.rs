//! # QC-18 NFT Registry - Access-Controlled Token Registry
//!
//! **Subsystem ID:** 18
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! A single-owner registry that keeps a whitelist and a blacklist of
//! addresses and mints sequentially numbered non-fungible tokens. The owner
//! administers both lists and may hand over or renounce ownership. Minted
//! tokens stay locked for a configurable window; a configured signer can
//! authorize mints off-line.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Owner-only administration | `domain/registry.rs` - `ensure_owner()` |
//! | Counter advances by exactly one per mint | `domain/invariants.rs` - `check_counter_invariant()` |
//! | Token ids unique, within `(base, counter]` | `domain/invariants.rs` - `check_token_id_invariant()` |
//! | One holder per token, balances consistent | `domain/invariants.rs` - `check_single_holder_invariant()` |
//! | No state change or event on failure | `domain/invariants.rs` - `check_revert_rollback_invariant()` |
//! | Signed request ids are single-use | `domain/registry.rs` - `mint_with_signature()` |
//!
//! ## Revert Reasons
//!
//! | Error | Reason string |
//! |-------|---------------|
//! | `NotOwner` | `Ownable: caller is not the owner` |
//! | `ZeroNewOwner` | `Ownable: new owner is the zero address` |
//! | `SignatureInvalid` | `DP: signer invalid` |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose | Adapters |
//! |-------|---------|----------|
//! | `Clock` | Mint stamps and lock checks | `SystemClock`, `ManualClock` |
//! | `EventSink` | Record emitted events | `InMemoryEventLog` |
//!
//! ## Usage Example
//!
//! ```ignore
//! use qc_18_nft_registry::prelude::*;
//!
//! let service = create_test_service();
//! service.add_white_list(TEST_DEPLOYER, user).await?;
//! let receipt = service.safe_mint(TEST_DEPLOYER, user).await?;
//! assert_eq!(receipt.minted_token(), Some(TokenId::one()));
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;
pub mod telemetry;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        BlacklistPolicy, MintAuthority, MintReceipt, MintRequest, RegistryConfig, TokenRecord,
        DEFAULT_LOCK_TIME_SECS, DEFAULT_NAME, DEFAULT_SIGNATURE_PREFIX, DEFAULT_SYMBOL,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        Address, AddressParseError, EcdsaSignature, Hash, Timestamp, TokenId, U256,
    };

    // Registry state machine
    pub use crate::domain::registry::{Registry, Transition};

    // Domain services
    pub use crate::domain::services::{
        address_from_pubkey, keccak256, mint_request_digest, mint_signing_hash,
        personal_message_hash, recover_signer, verify_signer,
    };

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, CallOutcome, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::{RegistryApi, TransactionReceipt};
    pub use crate::ports::outbound::{Clock, EventSink};

    // Events
    pub use crate::events::{topics, LoggedEvent, RegistryEvent};

    // Errors
    pub use crate::errors::{ConfigError, ErrorKind, RegistryError, TelemetryError};

    // Adapters
    pub use crate::adapters::{InMemoryEventLog, ManualClock, SystemClock};

    // Service
    pub use crate::service::{
        create_test_service, RegistryService, ServiceConfig, ServiceStats, TEST_DEPLOYER,
        TEST_GENESIS_TIME,
    };

    // Logging
    pub use crate::telemetry::{init_logging, TelemetryConfig};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 18;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "NFT Registry";

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_id() {
        assert_eq!(SUBSYSTEM_ID, 18);
    }

    #[test]
    fn test_prelude_exports() {
        use prelude::*;
        let _ = RegistryConfig::default();
        let _ = Address::ZERO;
        let _ = TelemetryConfig::default();
    }
}
