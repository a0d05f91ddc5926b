//! # Registry State Machine
//!
//! The owned, access-controlled registry. Every mutating operation is a single
//! atomic transition: all preconditions are checked before the first write,
//! so a returned error implies no state change and no emitted event.
//!
//! Owner gating is an explicit guard (`ensure_owner`) at the top of each
//! administrative operation rather than inherited middleware.

use crate::domain::entities::{
    BlacklistPolicy, MintAuthority, MintReceipt, MintRequest, RegistryConfig, TokenRecord,
};
use crate::domain::services::{mint_signing_hash, verify_signer};
use crate::domain::value_objects::{Address, Timestamp, TokenId};
use crate::errors::RegistryError;
use crate::events::RegistryEvent;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

/// Result of a committed transition: the events it emitted.
pub type Transition<T = ()> = Result<(T, Vec<RegistryEvent>), RegistryError>;

/// Owned registry of whitelist/blacklist membership and sequentially minted tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registry {
    config: RegistryConfig,
    owner: Address,
    signer: Address,
    whitelist: HashSet<Address>,
    blacklist: HashSet<Address>,
    token_counter: TokenId,
    tokens: BTreeMap<TokenId, TokenRecord>,
    balances: HashMap<Address, u64>,
    used_requests: HashSet<Uuid>,
}

impl Registry {
    /// Deploy a registry owned by `deployer`.
    ///
    /// The whitelist and blacklist start empty; the token counter starts at
    /// `config.initial_token_id`.
    #[must_use]
    pub fn new(deployer: Address, config: RegistryConfig) -> Self {
        Self {
            owner: deployer,
            signer: config.signer,
            whitelist: HashSet::new(),
            blacklist: HashSet::new(),
            token_counter: TokenId::from(config.initial_token_id),
            tokens: BTreeMap::new(),
            balances: HashMap::new(),
            used_requests: HashSet::new(),
            config,
        }
    }

    // =========================================================================
    // GUARDS
    // =========================================================================

    fn ensure_owner(&self, caller: Address) -> Result<(), RegistryError> {
        // A renounced (zero) owner matches no one, the zero caller included.
        if self.owner.is_zero() || caller != self.owner {
            return Err(RegistryError::NotOwner { caller });
        }
        Ok(())
    }

    fn ensure_not_blacklisted(&self, account: Address) -> Result<(), RegistryError> {
        if self.config.blacklist_policy == BlacklistPolicy::Enforce
            && self.blacklist.contains(&account)
        {
            return Err(RegistryError::Blacklisted(account));
        }
        Ok(())
    }

    fn ensure_may_mint(&self, caller: Address) -> Result<(), RegistryError> {
        let allowed = match self.config.mint_authority {
            MintAuthority::Owner => self.is_owner(caller),
            MintAuthority::OwnerOrWhitelisted => {
                self.is_owner(caller) || self.whitelist.contains(&caller)
            }
            MintAuthority::Anyone => true,
        };
        if allowed {
            Ok(())
        } else {
            Err(RegistryError::MintNotAllowed { caller })
        }
    }

    fn is_owner(&self, caller: Address) -> bool {
        !self.owner.is_zero() && caller == self.owner
    }

    // =========================================================================
    // OWNERSHIP
    // =========================================================================

    /// Hand the registry to `new_owner`.
    ///
    /// # Errors
    ///
    /// `NotOwner` if `caller` is not the owner, `ZeroNewOwner` if `new_owner` is zero.
    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Transition {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(RegistryError::ZeroNewOwner);
        }
        let previous_owner = std::mem::replace(&mut self.owner, new_owner);
        Ok((
            (),
            vec![RegistryEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            }],
        ))
    }

    /// Give up ownership for good. Owner-gated operations become unreachable.
    ///
    /// # Errors
    ///
    /// `NotOwner` if `caller` is not the owner.
    pub fn renounce_ownership(&mut self, caller: Address) -> Transition {
        self.ensure_owner(caller)?;
        let previous_owner = std::mem::replace(&mut self.owner, Address::ZERO);
        Ok((
            (),
            vec![RegistryEvent::OwnershipTransferred {
                previous_owner,
                new_owner: Address::ZERO,
            }],
        ))
    }

    // =========================================================================
    // MEMBERSHIP
    // =========================================================================

    /// Mark `account` as whitelisted.
    ///
    /// # Errors
    ///
    /// `NotOwner` if `caller` is not the owner.
    pub fn add_white_list(&mut self, caller: Address, account: Address) -> Transition {
        self.set_white_list(caller, account, true)
    }

    /// Clear `account`'s whitelist flag.
    ///
    /// # Errors
    ///
    /// `NotOwner` if `caller` is not the owner.
    pub fn remove_white_list(&mut self, caller: Address, account: Address) -> Transition {
        self.set_white_list(caller, account, false)
    }

    /// Mark `account` as blacklisted.
    ///
    /// # Errors
    ///
    /// `NotOwner` if `caller` is not the owner.
    pub fn add_black_list(&mut self, caller: Address, account: Address) -> Transition {
        self.set_black_list(caller, account, true)
    }

    /// Clear `account`'s blacklist flag.
    ///
    /// # Errors
    ///
    /// `NotOwner` if `caller` is not the owner.
    pub fn remove_black_list(&mut self, caller: Address, account: Address) -> Transition {
        self.set_black_list(caller, account, false)
    }

    // The event is emitted even when the flag does not change.
    fn set_white_list(&mut self, caller: Address, account: Address, status: bool) -> Transition {
        self.ensure_owner(caller)?;
        set_membership(&mut self.whitelist, account, status);
        Ok(((), vec![RegistryEvent::WhiteListUpdated { account, status }]))
    }

    fn set_black_list(&mut self, caller: Address, account: Address, status: bool) -> Transition {
        self.ensure_owner(caller)?;
        set_membership(&mut self.blacklist, account, status);
        Ok(((), vec![RegistryEvent::BlackListUpdated { account, status }]))
    }

    /// Replace the mint signer. Zero disables signature minting.
    ///
    /// # Errors
    ///
    /// `NotOwner` if `caller` is not the owner.
    pub fn set_signer(&mut self, caller: Address, new_signer: Address) -> Transition {
        self.ensure_owner(caller)?;
        let previous_signer = std::mem::replace(&mut self.signer, new_signer);
        Ok((
            (),
            vec![RegistryEvent::SignerUpdated {
                previous_signer,
                new_signer,
            }],
        ))
    }

    // =========================================================================
    // MINTING
    // =========================================================================

    /// Mint the next sequential id to `recipient`.
    ///
    /// # Errors
    ///
    /// - `MintNotAllowed` if `caller` fails the mint authority policy
    /// - `MintToZero` if `recipient` is zero
    /// - `Blacklisted` if caller or recipient is blacklisted under `Enforce`
    pub fn safe_mint(
        &mut self,
        caller: Address,
        recipient: Address,
        now: Timestamp,
    ) -> Transition<MintReceipt> {
        self.ensure_may_mint(caller)?;
        self.check_mint_parties(caller, recipient)?;
        Ok(self.mint(recipient, now))
    }

    /// Mint on the strength of a signature from the configured signer.
    ///
    /// Any caller may submit; each request id is accepted once.
    ///
    /// # Errors
    ///
    /// - `MintToZero` if the recipient is zero
    /// - `Blacklisted` if caller or recipient is blacklisted under `Enforce`
    /// - `RequestAlreadyUsed` if the request id was consumed before
    /// - `SignatureInvalid` if the signature was not made by the signer
    pub fn mint_with_signature(
        &mut self,
        caller: Address,
        request: &MintRequest,
        now: Timestamp,
    ) -> Transition<MintReceipt> {
        self.check_mint_parties(caller, request.recipient)?;
        if self.used_requests.contains(&request.request_id) {
            return Err(RegistryError::RequestAlreadyUsed(request.request_id));
        }
        let hash = mint_signing_hash(
            &self.config.signature_prefix,
            request.recipient,
            request.request_id,
        );
        verify_signer(&hash, &request.signature, self.signer)?;

        self.used_requests.insert(request.request_id);
        Ok(self.mint(request.recipient, now))
    }

    fn check_mint_parties(&self, caller: Address, recipient: Address) -> Result<(), RegistryError> {
        if recipient.is_zero() {
            return Err(RegistryError::MintToZero);
        }
        self.ensure_not_blacklisted(caller)?;
        self.ensure_not_blacklisted(recipient)
    }

    // Infallible: all checks happen before this point.
    fn mint(&mut self, recipient: Address, now: Timestamp) -> (MintReceipt, Vec<RegistryEvent>) {
        self.token_counter += TokenId::one();
        let token_id = self.token_counter;
        self.tokens.insert(
            token_id,
            TokenRecord {
                owner: recipient,
                minted_at: now,
            },
        );
        *self.balances.entry(recipient).or_insert(0) += 1;
        (
            MintReceipt {
                token_id,
                recipient,
            },
            vec![RegistryEvent::Transfer {
                from: Address::ZERO,
                to: recipient,
                token_id,
            }],
        )
    }

    // =========================================================================
    // TRANSFER
    // =========================================================================

    /// Move `token_id` from `from` to `to`.
    ///
    /// While the token is locked only a whitelisted `from` may move it.
    ///
    /// # Errors
    ///
    /// - `TokenNotFound` for an unknown id
    /// - `NotTokenOwner` if `caller` is not `from` or `from` does not hold the token
    /// - `TransferToZero` if `to` is zero
    /// - `Blacklisted` if `from` or `to` is blacklisted under `Enforce`
    /// - `TokenLocked` inside the lock window
    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
        now: Timestamp,
    ) -> Transition {
        let record = *self
            .tokens
            .get(&token_id)
            .ok_or(RegistryError::TokenNotFound(token_id))?;
        if caller != from || record.owner != from {
            return Err(RegistryError::NotTokenOwner { caller, token_id });
        }
        if to.is_zero() {
            return Err(RegistryError::TransferToZero);
        }
        self.ensure_not_blacklisted(from)?;
        self.ensure_not_blacklisted(to)?;
        if record.is_locked(self.config.lock_time_secs, now) && !self.whitelist.contains(&from) {
            return Err(RegistryError::TokenLocked {
                token_id,
                unlocks_at: record.unlocks_at(self.config.lock_time_secs),
            });
        }

        if let Some(entry) = self.tokens.get_mut(&token_id) {
            entry.owner = to;
        }
        if let Some(balance) = self.balances.get_mut(&from) {
            *balance = balance.saturating_sub(1);
            if *balance == 0 {
                self.balances.remove(&from);
            }
        }
        *self.balances.entry(to).or_insert(0) += 1;

        Ok(((), vec![RegistryEvent::Transfer { from, to, token_id }]))
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Current owner; zero after renouncement.
    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Whitelist membership.
    #[must_use]
    pub fn whitelist(&self, account: Address) -> bool {
        self.whitelist.contains(&account)
    }

    /// Blacklist membership.
    #[must_use]
    pub fn is_black_listed(&self, account: Address) -> bool {
        self.blacklist.contains(&account)
    }

    /// Current token counter, i.e. the most recently minted id (or the base).
    #[must_use]
    pub fn id_generate(&self) -> TokenId {
        self.token_counter
    }

    /// Current mint signer.
    #[must_use]
    pub fn signer(&self) -> Address {
        self.signer
    }

    /// Collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Collection symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    /// Lock window applied to freshly minted tokens, in seconds.
    #[must_use]
    pub fn lock_time(&self) -> u64 {
        self.config.lock_time_secs
    }

    /// Deployment config.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Holder of `token_id`.
    ///
    /// # Errors
    ///
    /// `TokenNotFound` for an unknown id.
    pub fn owner_of(&self, token_id: TokenId) -> Result<Address, RegistryError> {
        self.token(token_id).map(|record| record.owner)
    }

    /// Full ownership record of `token_id`.
    ///
    /// # Errors
    ///
    /// `TokenNotFound` for an unknown id.
    pub fn token(&self, token_id: TokenId) -> Result<TokenRecord, RegistryError> {
        self.tokens
            .get(&token_id)
            .copied()
            .ok_or(RegistryError::TokenNotFound(token_id))
    }

    /// Whether `token_id` is inside its lock window at `now`.
    ///
    /// # Errors
    ///
    /// `TokenNotFound` for an unknown id.
    pub fn is_locked(&self, token_id: TokenId, now: Timestamp) -> Result<bool, RegistryError> {
        self.token(token_id)
            .map(|record| record.is_locked(self.config.lock_time_secs, now))
    }

    /// Number of tokens held by `account`.
    #[must_use]
    pub fn balance_of(&self, account: Address) -> u64 {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    /// Number of minted tokens.
    #[must_use]
    pub fn total_minted(&self) -> usize {
        self.tokens.len()
    }

    /// Iterate over minted tokens in id order.
    pub fn tokens(&self) -> impl Iterator<Item = (&TokenId, &TokenRecord)> {
        self.tokens.iter()
    }

    /// Iterate over non-zero balances.
    pub fn balances(&self) -> impl Iterator<Item = (&Address, &u64)> {
        self.balances.iter()
    }

    /// Whether a signed mint request id has been consumed.
    #[must_use]
    pub fn is_request_used(&self, request_id: Uuid) -> bool {
        self.used_requests.contains(&request_id)
    }
}

fn set_membership(set: &mut HashSet<Address>, account: Address, status: bool) {
    if status {
        set.insert(account);
    } else {
        set.remove(&account);
    }
}

// =============================================================================
// TESTS
// =============================================================================
