//! # Registry Service
//!
//! Async facade over the domain `Registry`. Serializes calls behind a write
//! lock, stamps them with the clock, publishes emitted events to the sink and
//! keeps call statistics.
//!
//! ## Call Lifecycle
//!
//! 1. Assign a correlation ID
//! 2. Take the write lock and read the clock
//! 3. Snapshot the registry (when invariant checking is on)
//! 4. Apply the domain transition
//! 5. Check invariants against the snapshot
//! 6. Publish events under the lock, so log order matches state order
//! 7. Return a `TransactionReceipt` or the `RegistryError`

use crate::adapters::{InMemoryEventLog, ManualClock};
use crate::domain::entities::{MintRequest, RegistryConfig};
use crate::domain::invariants::{check_all_invariants, CallOutcome, InvariantCheckResult};
use crate::domain::registry::{Registry, Transition};
use crate::domain::value_objects::{Address, Timestamp, TokenId};
use crate::errors::RegistryError;
use crate::ports::inbound::{RegistryApi, TransactionReceipt};
use crate::ports::outbound::{Clock, EventSink};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Registry service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Deployment parameters.
    pub registry: RegistryConfig,
    /// Run the invariant checker after every call.
    ///
    /// Each call then clones the full registry under the write lock, which is
    /// linear in the number of minted tokens. Off by default in release builds.
    pub check_invariants: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            check_invariants: cfg!(debug_assertions),
        }
    }
}

/// Statistics for the registry service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Calls that committed.
    pub calls_committed: u64,
    /// Calls that reverted.
    pub calls_reverted: u64,
    /// Tokens minted through any path.
    pub tokens_minted: u64,
    /// Events handed to the sink.
    pub events_emitted: u64,
    /// Invariant violations detected.
    pub invariant_violations: u64,
}

/// The registry service.
pub struct RegistryService<C: Clock, E: EventSink> {
    /// Service configuration.
    config: ServiceConfig,
    /// Registry state.
    registry: Arc<RwLock<Registry>>,
    /// Time source for mint stamps and lock checks.
    clock: Arc<C>,
    /// Destination of emitted events.
    sink: Arc<E>,
    /// Service statistics.
    stats: Arc<RwLock<ServiceStats>>,
}

impl<C: Clock, E: EventSink> RegistryService<C, E> {
    /// Deploy a registry owned by `deployer`.
    pub fn new(deployer: Address, clock: C, sink: E, config: ServiceConfig) -> Self {
        info!(
            deployer = %deployer,
            name = %config.registry.name,
            symbol = %config.registry.symbol,
            lock_time_secs = config.registry.lock_time_secs,
            "Registry deployed"
        );
        Self {
            registry: Arc::new(RwLock::new(Registry::new(
                deployer,
                config.registry.clone(),
            ))),
            config,
            clock: Arc::new(clock),
            sink: Arc::new(sink),
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        }
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Copy of the current registry state.
    pub async fn snapshot(&self) -> Registry {
        self.registry.read().await.clone()
    }

    /// The service clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The event sink.
    pub fn sink(&self) -> &E {
        &self.sink
    }

    /// Service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run one transition as an atomic call.
    #[instrument(
        name = "registry_call",
        skip(self, transition),
        fields(correlation_id = %correlation_id, caller = %caller)
    )]
    async fn execute<T, F>(
        &self,
        op: &'static str,
        correlation_id: Uuid,
        caller: Address,
        transition: F,
    ) -> Result<TransactionReceipt, RegistryError>
    where
        F: FnOnce(&mut Registry, Timestamp) -> Transition<T> + Send,
        T: Send,
    {
        let mut registry = self.registry.write().await;
        let now = self.clock.now();
        let before = self.config.check_invariants.then(|| registry.clone());

        let result = transition(&mut *registry, now);

        if let Some(before) = &before {
            let outcome = match &result {
                Ok((_, events)) => CallOutcome::Committed(events.as_slice()),
                Err(_) => CallOutcome::Reverted,
            };
            if let InvariantCheckResult::Invalid(violations) =
                check_all_invariants(before, &*registry, outcome)
            {
                for violation in &violations {
                    error!(op, violation = %violation, "Registry invariant violated");
                }
                self.stats.write().await.invariant_violations += violations.len() as u64;
            }
        }

        let events = match result {
            Ok((_, events)) => events,
            Err(e) => {
                drop(registry);
                warn!(op, reason = e.reason(), error = %e, "Call reverted");
                self.stats.write().await.calls_reverted += 1;
                return Err(e);
            }
        };

        let logs = self.sink.publish(correlation_id, &events).await;
        drop(registry);

        let minted = events.iter().filter(|e| e.minted_token().is_some()).count() as u64;
        {
            let mut stats = self.stats.write().await;
            stats.calls_committed += 1;
            stats.tokens_minted += minted;
            stats.events_emitted += logs.len() as u64;
        }

        for log in &logs {
            debug!(sequence = log.sequence, event = log.event.name(), "Event emitted");
        }
        info!(op, events = logs.len(), minted, timestamp = now, "Call committed");

        Ok(TransactionReceipt {
            correlation_id,
            caller,
            timestamp: now,
            logs,
        })
    }
}

/// Deployer of the service built by [`create_test_service`].
pub const TEST_DEPLOYER: Address = Address([0x01; 20]);

/// Clock reading of the service built by [`create_test_service`].
pub const TEST_GENESIS_TIME: Timestamp = 1_700_000_000;

/// Create a service for testing: manual clock, in-memory event log,
/// default deployment parameters and invariant checking on.
pub fn create_test_service() -> RegistryService<ManualClock, InMemoryEventLog> {
    RegistryService::new(
        TEST_DEPLOYER,
        ManualClock::new(TEST_GENESIS_TIME),
        InMemoryEventLog::new(),
        ServiceConfig {
            registry: RegistryConfig::default(),
            check_invariants: true,
        },
    )
}

// =============================================================================
// RegistryApi Implementation
// =============================================================================

#[async_trait]
impl<C: Clock, E: EventSink> RegistryApi for RegistryService<C, E> {
    async fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<TransactionReceipt, RegistryError> {
        self.execute("transfer_ownership", Uuid::new_v4(), caller, |r, _| {
            r.transfer_ownership(caller, new_owner)
        })
        .await
    }

    async fn renounce_ownership(
        &self,
        caller: Address,
    ) -> Result<TransactionReceipt, RegistryError> {
        self.execute("renounce_ownership", Uuid::new_v4(), caller, |r, _| {
            r.renounce_ownership(caller)
        })
        .await
    }

    async fn add_white_list(
        &self,
        caller: Address,
        account: Address,
    ) -> Result<TransactionReceipt, RegistryError> {
        self.execute("add_white_list", Uuid::new_v4(), caller, |r, _| {
            r.add_white_list(caller, account)
        })
        .await
    }

    async fn remove_white_list(
        &self,
        caller: Address,
        account: Address,
    ) -> Result<TransactionReceipt, RegistryError> {
        self.execute("remove_white_list", Uuid::new_v4(), caller, |r, _| {
            r.remove_white_list(caller, account)
        })
        .await
    }

    async fn add_black_list(
        &self,
        caller: Address,
        account: Address,
    ) -> Result<TransactionReceipt, RegistryError> {
        self.execute("add_black_list", Uuid::new_v4(), caller, |r, _| {
            r.add_black_list(caller, account)
        })
        .await
    }

    async fn remove_black_list(
        &self,
        caller: Address,
        account: Address,
    ) -> Result<TransactionReceipt, RegistryError> {
        self.execute("remove_black_list", Uuid::new_v4(), caller, |r, _| {
            r.remove_black_list(caller, account)
        })
        .await
    }

    async fn set_signer(
        &self,
        caller: Address,
        signer: Address,
    ) -> Result<TransactionReceipt, RegistryError> {
        self.execute("set_signer", Uuid::new_v4(), caller, |r, _| {
            r.set_signer(caller, signer)
        })
        .await
    }

    async fn safe_mint(
        &self,
        caller: Address,
        recipient: Address,
    ) -> Result<TransactionReceipt, RegistryError> {
        self.execute("safe_mint", Uuid::new_v4(), caller, |r, now| {
            r.safe_mint(caller, recipient, now)
        })
        .await
    }

    async fn mint_with_signature(
        &self,
        caller: Address,
        request: MintRequest,
    ) -> Result<TransactionReceipt, RegistryError> {
        self.execute("mint_with_signature", Uuid::new_v4(), caller, |r, now| {
            r.mint_with_signature(caller, &request, now)
        })
        .await
    }

    async fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<TransactionReceipt, RegistryError> {
        self.execute("transfer_from", Uuid::new_v4(), caller, |r, now| {
            r.transfer_from(caller, from, to, token_id, now)
        })
        .await
    }

    async fn owner(&self) -> Address {
        self.registry.read().await.owner()
    }

    async fn whitelist(&self, account: Address) -> bool {
        self.registry.read().await.whitelist(account)
    }

    async fn is_black_listed(&self, account: Address) -> bool {
        self.registry.read().await.is_black_listed(account)
    }

    async fn id_generate(&self) -> TokenId {
        self.registry.read().await.id_generate()
    }

    async fn signer(&self) -> Address {
        self.registry.read().await.signer()
    }

    async fn owner_of(&self, token_id: TokenId) -> Result<Address, RegistryError> {
        self.registry.read().await.owner_of(token_id)
    }

    async fn balance_of(&self, account: Address) -> u64 {
        self.registry.read().await.balance_of(account)
    }

    async fn minted_at(&self, token_id: TokenId) -> Result<Timestamp, RegistryError> {
        Ok(self.registry.read().await.token(token_id)?.minted_at)
    }

    async fn is_locked(&self, token_id: TokenId) -> Result<bool, RegistryError> {
        let now = self.clock.now();
        self.registry.read().await.is_locked(token_id, now)
    }

    async fn name(&self) -> String {
        self.registry.read().await.name().to_string()
    }

    async fn symbol(&self) -> String {
        self.registry.read().await.symbol().to_string()
    }

    async fn lock_time(&self) -> u64 {
        self.registry.read().await.lock_time()
    }
}

// =============================================================================
// TESTS
// =============================================================================
