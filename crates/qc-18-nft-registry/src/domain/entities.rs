//! # Core Domain Entities
//!
//! Registry configuration, policy switches and per-token records.

use crate::domain::value_objects::{Address, EcdsaSignature, Timestamp, TokenId};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// DEFAULTS
// =============================================================================

/// Collection name of the DePIN subnet node collection.
pub const DEFAULT_NAME: &str = "U2U DePIN Subnet Node";

/// Collection symbol of the DePIN subnet node collection.
pub const DEFAULT_SYMBOL: &str = "DEPIN";

/// One week in seconds.
pub const WEEK_SECS: u64 = 7 * 24 * 60 * 60;

/// Default lock time: 6 * 4 weeks.
pub const DEFAULT_LOCK_TIME_SECS: u64 = 6 * 4 * WEEK_SECS;

/// Prefix mixed into every signed mint request digest.
pub const DEFAULT_SIGNATURE_PREFIX: &str = "DP_NFT_GENERATE";

// =============================================================================
// POLICIES
// =============================================================================

/// Whether blacklisted addresses may take part in mints and transfers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlacklistPolicy {
    /// Reject blacklisted callers, recipients and senders.
    #[default]
    Enforce,
    /// Blacklist is informational only.
    Ignore,
}

/// Who may call `safeMint`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MintAuthority {
    /// Only the current owner.
    Owner,
    /// The owner or any whitelisted address.
    #[default]
    OwnerOrWhitelisted,
    /// Any caller.
    Anyone,
}

// =============================================================================
// REGISTRY CONFIG
// =============================================================================

/// Deployment parameters of a registry instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Collection name.
    pub name: String,
    /// Collection symbol.
    pub symbol: String,
    /// Seconds a freshly minted token stays locked.
    pub lock_time_secs: u64,
    /// Base value of the token counter; the first minted id is one above it.
    pub initial_token_id: u64,
    /// Blacklist enforcement on mint and transfer.
    pub blacklist_policy: BlacklistPolicy,
    /// Who may call `safeMint`.
    pub mint_authority: MintAuthority,
    /// Prefix for signed mint request digests.
    pub signature_prefix: String,
    /// Initial mint signer. Zero disables signature minting.
    pub signer: Address,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            lock_time_secs: DEFAULT_LOCK_TIME_SECS,
            initial_token_id: 0,
            blacklist_policy: BlacklistPolicy::default(),
            mint_authority: MintAuthority::default(),
            signature_prefix: DEFAULT_SIGNATURE_PREFIX.to_string(),
            signer: Address::ZERO,
        }
    }
}

impl RegistryConfig {
    /// Rejects values the registry cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an empty name, symbol or signature prefix.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".to_string()));
        }
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".to_string()));
        }
        if self.signature_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "signature_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TOKEN RECORD
// =============================================================================

/// Ownership entry for a minted token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Current holder.
    pub owner: Address,
    /// Clock reading at mint time.
    pub minted_at: Timestamp,
}

impl TokenRecord {
    /// First instant at which the token may move freely.
    #[must_use]
    pub fn unlocks_at(&self, lock_time_secs: u64) -> Timestamp {
        self.minted_at.saturating_add(lock_time_secs)
    }

    /// Whether the token is still inside its lock window at `now`.
    #[must_use]
    pub fn is_locked(&self, lock_time_secs: u64, now: Timestamp) -> bool {
        now < self.unlocks_at(lock_time_secs)
    }
}

// =============================================================================
// SIGNED MINT REQUEST
// =============================================================================

/// A mint authorized off-line by the configured signer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    /// Address receiving the token.
    pub recipient: Address,
    /// One-shot request id.
    pub request_id: Uuid,
    /// Signer's signature over the request digest.
    pub signature: EcdsaSignature,
}

/// Outcome of a successful mint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintReceipt {
    /// Newly minted id.
    pub token_id: TokenId,
    /// Holder of the new token.
    pub recipient: Address,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_deployment() {
        let config = RegistryConfig::default();
        assert_eq!(config.name, "U2U DePIN Subnet Node");
        assert_eq!(config.symbol, "DEPIN");
        assert_eq!(config.lock_time_secs, 14_515_200);
        assert_eq!(config.initial_token_id, 0);
        assert_eq!(config.blacklist_policy, BlacklistPolicy::Enforce);
        assert_eq!(config.mint_authority, MintAuthority::OwnerOrWhitelisted);
        assert!(config.signer.is_zero());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let mut config = RegistryConfig::default();
        config.symbol = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = RegistryConfig::default();
        config.signature_prefix.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_lock_window() {
        let record = TokenRecord {
            owner: Address::new([1u8; 20]),
            minted_at: 1_000,
        };
        assert_eq!(record.unlocks_at(500), 1_500);
        assert!(record.is_locked(500, 1_499));
        assert!(!record.is_locked(500, 1_500));
        assert!(!record.is_locked(0, 1_000));
        assert_eq!(record.unlocks_at(u64::MAX), u64::MAX);
    }
}
