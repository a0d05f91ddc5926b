//! # Error Types
//!
//! All error types for the registry.
//!
//! Every `RegistryError` aborts the call that produced it: no state is mutated
//! and no event is emitted. Callers distinguish failures by `kind()` or by the
//! revert `reason()` string.

use crate::domain::value_objects::{Address, Timestamp, TokenId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// REGISTRY ERRORS
// =============================================================================

/// Broad failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Caller lacks the privilege the operation requires.
    Unauthorized,
    /// The zero sentinel (or another unusable value) was passed where a real one is required.
    InvalidArgument,
    /// A signature-gated call carried a signature not made by the configured signer.
    SignatureInvalid,
    /// A registry rule (blacklist, lock time, token ownership, replay) rejected the call.
    PolicyViolation,
}

/// Errors that can occur when applying a registry call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Owner-gated operation invoked by someone other than the owner.
    #[error("unauthorized: {caller:?} is not the owner")]
    NotOwner {
        /// Rejected caller.
        caller: Address,
    },

    /// Caller does not satisfy the configured mint authority.
    #[error("unauthorized: {caller:?} is not allowed to mint")]
    MintNotAllowed {
        /// Rejected caller.
        caller: Address,
    },

    /// `transferOwnership` to the zero address.
    #[error("invalid argument: new owner is the zero address")]
    ZeroNewOwner,

    /// Mint to the zero address.
    #[error("invalid argument: mint to the zero address")]
    MintToZero,

    /// Transfer to the zero address.
    #[error("invalid argument: transfer to the zero address")]
    TransferToZero,

    /// Recovered signer does not match, or the signature is malformed.
    #[error("signature invalid: {0}")]
    SignatureInvalid(String),

    /// A blacklisted address took part in a mint or transfer.
    #[error("address is blacklisted: {0:?}")]
    Blacklisted(Address),

    /// Token cannot move yet.
    #[error("token {token_id} is locked until {unlocks_at}")]
    TokenLocked {
        /// Locked token.
        token_id: TokenId,
        /// First instant the token may move.
        unlocks_at: Timestamp,
    },

    /// No token with this id was minted.
    #[error("token not found: {0}")]
    TokenNotFound(TokenId),

    /// Caller or `from` is not the current holder of the token.
    #[error("{caller:?} is not the holder of token {token_id}")]
    NotTokenOwner {
        /// Rejected caller.
        caller: Address,
        /// Token the caller tried to move.
        token_id: TokenId,
    },

    /// Signed mint request id was already consumed.
    #[error("mint request already used: {0}")]
    RequestAlreadyUsed(uuid::Uuid),
}

impl RegistryError {
    /// Failure category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner { .. } | Self::MintNotAllowed { .. } => ErrorKind::Unauthorized,
            Self::ZeroNewOwner | Self::MintToZero | Self::TransferToZero => {
                ErrorKind::InvalidArgument
            }
            Self::SignatureInvalid(_) => ErrorKind::SignatureInvalid,
            Self::Blacklisted(_)
            | Self::TokenLocked { .. }
            | Self::TokenNotFound(_)
            | Self::NotTokenOwner { .. }
            | Self::RequestAlreadyUsed(_) => ErrorKind::PolicyViolation,
        }
    }

    /// Revert reason string surfaced to external callers.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotOwner { .. } => "Ownable: caller is not the owner",
            Self::MintNotAllowed { .. } => "DP: caller is not allowed to mint",
            Self::ZeroNewOwner => "Ownable: new owner is the zero address",
            Self::MintToZero => "ERC721: mint to the zero address",
            Self::TransferToZero => "ERC721: transfer to the zero address",
            Self::SignatureInvalid(_) => "DP: signer invalid",
            Self::Blacklisted(_) => "DP: address is blacklisted",
            Self::TokenLocked { .. } => "DP: token is locked",
            Self::TokenNotFound(_) => "ERC721: invalid token ID",
            Self::NotTokenOwner { .. } => "ERC721: caller is not token owner",
            Self::RequestAlreadyUsed(_) => "DP: request already used",
        }
    }

    /// Returns true for `ErrorKind::Unauthorized`.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that failed to load.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML did not parse into `RegistryConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("invalid value for {var}: {value}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Raw value found.
        value: String,
    },

    /// A field holds a value the registry cannot run with.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// =============================================================================
// TELEMETRY ERRORS
// =============================================================================

/// Errors from installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Log filter directive did not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed.
    #[error("subscriber init failed: {0}")]
    Init(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_error_reason() {
        let err = RegistryError::NotOwner {
            caller: Address::new([7u8; 20]),
        };
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.reason(), "Ownable: caller is not the owner");
        assert!(err.is_unauthorized());
        assert!(err.to_string().contains("not the owner"));
    }

    #[test]
    fn test_invalid_argument_kinds() {
        for err in [
            RegistryError::ZeroNewOwner,
            RegistryError::MintToZero,
            RegistryError::TransferToZero,
        ] {
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
            assert!(!err.is_unauthorized());
        }
    }

    #[test]
    fn test_signature_reason_matches_deployed_contract() {
        let err = RegistryError::SignatureInvalid("signer mismatch".to_string());
        assert_eq!(err.kind(), ErrorKind::SignatureInvalid);
        assert_eq!(err.reason(), "DP: signer invalid");
    }

    #[test]
    fn test_policy_violations() {
        let locked = RegistryError::TokenLocked {
            token_id: TokenId::from(3),
            unlocks_at: 1_000,
        };
        assert_eq!(locked.kind(), ErrorKind::PolicyViolation);
        assert_eq!(locked.to_string(), "token 3 is locked until 1000");

        let blacklisted = RegistryError::Blacklisted(Address::new([1u8; 20]));
        assert_eq!(blacklisted.kind(), ErrorKind::PolicyViolation);
    }

    #[test]
    fn test_reasons_are_distinct() {
        let errors = [
            RegistryError::NotOwner {
                caller: Address::ZERO,
            },
            RegistryError::MintNotAllowed {
                caller: Address::ZERO,
            },
            RegistryError::ZeroNewOwner,
            RegistryError::MintToZero,
            RegistryError::TransferToZero,
            RegistryError::SignatureInvalid(String::new()),
            RegistryError::Blacklisted(Address::ZERO),
            RegistryError::TokenLocked {
                token_id: TokenId::one(),
                unlocks_at: 0,
            },
            RegistryError::TokenNotFound(TokenId::one()),
            RegistryError::NotTokenOwner {
                caller: Address::ZERO,
                token_id: TokenId::one(),
            },
            RegistryError::RequestAlreadyUsed(uuid::Uuid::nil()),
        ];
        let reasons: std::collections::HashSet<_> = errors.iter().map(RegistryError::reason).collect();
        assert_eq!(reasons.len(), errors.len());
    }
}
