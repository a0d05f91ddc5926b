//! # Driving Ports (API - Inbound)
//!
//! The public API of the registry subsystem. External callers (the execution
//! environment, tests) drive the registry exclusively through `RegistryApi`.
//!
//! Every mutating call takes the caller's address explicitly; the registry
//! never infers identity. A call returns either a `TransactionReceipt` with
//! all emitted events or a `RegistryError`, in which case nothing changed.

use crate::domain::entities::MintRequest;
use crate::domain::value_objects::{Address, Timestamp, TokenId};
use crate::errors::RegistryError;
use crate::events::{LoggedEvent, RegistryEvent};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// TRANSACTION RECEIPT
// =============================================================================

/// Receipt of a committed call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Correlation ID assigned to the call.
    pub correlation_id: Uuid,
    /// Caller that submitted the call.
    pub caller: Address,
    /// Clock reading when the call was applied.
    pub timestamp: Timestamp,
    /// Events emitted, in order.
    pub logs: Vec<LoggedEvent>,
}

impl TransactionReceipt {
    /// Emitted events without log metadata.
    pub fn events(&self) -> impl Iterator<Item = &RegistryEvent> {
        self.logs.iter().map(|log| &log.event)
    }

    /// Token minted by this call, if any.
    #[must_use]
    pub fn minted_token(&self) -> Option<TokenId> {
        self.events().find_map(RegistryEvent::minted_token)
    }
}

// =============================================================================
// REGISTRY API (Primary Driving Port)
// =============================================================================

/// Primary API of the registry.
///
/// ## Usage
///
/// ```ignore
/// let receipt = api.add_white_list(owner, user).await?;
/// assert!(api.whitelist(user).await);
/// ```
#[async_trait]
pub trait RegistryApi: Send + Sync {
    // -------------------------------------------------------------------------
    // Owner-gated
    // -------------------------------------------------------------------------

    /// Hand ownership to `new_owner`. Emits `OwnershipTransferred(old, new)`.
    async fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<TransactionReceipt, RegistryError>;

    /// Renounce ownership irreversibly. Emits `OwnershipTransferred(old, zero)`.
    async fn renounce_ownership(&self, caller: Address)
        -> Result<TransactionReceipt, RegistryError>;

    /// Emits `WhiteListUpdated(account, true)`.
    async fn add_white_list(
        &self,
        caller: Address,
        account: Address,
    ) -> Result<TransactionReceipt, RegistryError>;

    /// Emits `WhiteListUpdated(account, false)`.
    async fn remove_white_list(
        &self,
        caller: Address,
        account: Address,
    ) -> Result<TransactionReceipt, RegistryError>;

    /// Emits `BlackListUpdated(account, true)`.
    async fn add_black_list(
        &self,
        caller: Address,
        account: Address,
    ) -> Result<TransactionReceipt, RegistryError>;

    /// Emits `BlackListUpdated(account, false)`.
    async fn remove_black_list(
        &self,
        caller: Address,
        account: Address,
    ) -> Result<TransactionReceipt, RegistryError>;

    /// Replace the mint signer. Emits `SignerUpdated(old, new)`.
    async fn set_signer(
        &self,
        caller: Address,
        signer: Address,
    ) -> Result<TransactionReceipt, RegistryError>;

    // -------------------------------------------------------------------------
    // Minting and transfer
    // -------------------------------------------------------------------------

    /// Mint the next id to `recipient`. Emits `Transfer(zero, recipient, id)`.
    async fn safe_mint(
        &self,
        caller: Address,
        recipient: Address,
    ) -> Result<TransactionReceipt, RegistryError>;

    /// Mint on a signer-authorized request. Emits `Transfer(zero, recipient, id)`.
    async fn mint_with_signature(
        &self,
        caller: Address,
        request: MintRequest,
    ) -> Result<TransactionReceipt, RegistryError>;

    /// Move a token. Emits `Transfer(from, to, id)`.
    async fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<TransactionReceipt, RegistryError>;

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Current owner (zero after renouncement).
    async fn owner(&self) -> Address;

    /// Whitelist membership.
    async fn whitelist(&self, account: Address) -> bool;

    /// Blacklist membership.
    async fn is_black_listed(&self, account: Address) -> bool;

    /// Current token counter.
    async fn id_generate(&self) -> TokenId;

    /// Current mint signer.
    async fn signer(&self) -> Address;

    /// Holder of `token_id`.
    async fn owner_of(&self, token_id: TokenId) -> Result<Address, RegistryError>;

    /// Tokens held by `account`.
    async fn balance_of(&self, account: Address) -> u64;

    /// Clock reading when `token_id` was minted.
    async fn minted_at(&self, token_id: TokenId) -> Result<Timestamp, RegistryError>;

    /// Whether `token_id` is still inside its lock window.
    async fn is_locked(&self, token_id: TokenId) -> Result<bool, RegistryError>;

    /// Collection name.
    async fn name(&self) -> String;

    /// Collection symbol.
    async fn symbol(&self) -> String;

    /// Lock window in seconds.
    async fn lock_time(&self) -> u64;
}
