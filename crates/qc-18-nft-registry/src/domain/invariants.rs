//! # Domain Invariants
//!
//! Properties that must hold across every registry transition. They are
//! checked by comparing the registry before and after a call.
//!
//! - Counter advances by exactly the number of mints and never moves back
//! - Token ids are unique and lie in `(base, counter]`
//! - Every token has exactly one holder and balances agree with holdings
//! - A failed call leaves the registry untouched and emits nothing

use crate::domain::registry::Registry;
use crate::domain::value_objects::TokenId;
use crate::events::RegistryEvent;
use std::collections::HashMap;

// =============================================================================
// CALL OUTCOME
// =============================================================================

/// What a call reported, independent of its return type.
#[derive(Clone, Copy, Debug)]
pub enum CallOutcome<'a> {
    /// Call committed with these events.
    Committed(&'a [RegistryEvent]),
    /// Call reverted.
    Reverted,
}

impl CallOutcome<'_> {
    fn mints(&self) -> usize {
        match self {
            Self::Committed(events) => events
                .iter()
                .filter(|event| event.minted_token().is_some())
                .count(),
            Self::Reverted => 0,
        }
    }
}

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Counter moves forward by exactly one per mint.
#[must_use]
pub fn check_counter_invariant(before: &Registry, after: &Registry, outcome: CallOutcome<'_>) -> bool {
    after.id_generate() == before.id_generate() + TokenId::from(outcome.mints())
}

/// Every token id is unique and was issued by the counter.
///
/// Uniqueness follows from the map keys; this checks the id range and that
/// the number of tokens matches the counter's distance from its base.
#[must_use]
pub fn check_token_id_invariant(registry: &Registry) -> bool {
    let base = TokenId::from(registry.config().initial_token_id);
    let counter = registry.id_generate();
    let in_range = registry
        .tokens()
        .all(|(id, _)| *id > base && *id <= counter);
    in_range && counter.checked_sub(base) == Some(TokenId::from(registry.total_minted()))
}

/// Each token has a non-zero holder and balances match holdings.
#[must_use]
pub fn check_single_holder_invariant(registry: &Registry) -> bool {
    let mut held: HashMap<_, u64> = HashMap::new();
    for (_, record) in registry.tokens() {
        if record.owner.is_zero() {
            return false;
        }
        *held.entry(record.owner).or_insert(0) += 1;
    }
    let non_zero_balances = registry.balances().filter(|(_, count)| **count > 0).count();
    non_zero_balances == held.len()
        && held
            .iter()
            .all(|(holder, count)| registry.balance_of(*holder) == *count)
}

/// A reverted call changes nothing.
#[must_use]
pub fn check_revert_rollback_invariant(
    before: &Registry,
    after: &Registry,
    outcome: CallOutcome<'_>,
) -> bool {
    match outcome {
        CallOutcome::Reverted => before == after,
        CallOutcome::Committed(_) => true,
    }
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(
    before: &Registry,
    after: &Registry,
    outcome: CallOutcome<'_>,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_counter_invariant(before, after, outcome) {
        violations.push(InvariantViolation::CounterMismatch {
            before: before.id_generate(),
            after: after.id_generate(),
            mints: outcome.mints(),
        });
    }

    if !check_token_id_invariant(after) {
        violations.push(InvariantViolation::TokenIdOutOfRange);
    }

    if !check_single_holder_invariant(after) {
        violations.push(InvariantViolation::HolderMismatch);
    }

    if !check_revert_rollback_invariant(before, after, outcome) {
        violations.push(InvariantViolation::StateNotRolledBack);
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Counter did not advance by the number of mints.
    CounterMismatch {
        /// Counter before the call.
        before: TokenId,
        /// Counter after the call.
        after: TokenId,
        /// Mints the call reported.
        mints: usize,
    },
    /// A token id lies outside `(base, counter]` or ids were skipped.
    TokenIdOutOfRange,
    /// Balances disagree with token holders.
    HolderMismatch,
    /// Reverted call left state changes behind.
    StateNotRolledBack,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CounterMismatch {
                before,
                after,
                mints,
            } => write!(
                f,
                "token counter moved from {before} to {after} across {mints} mints"
            ),
            Self::TokenIdOutOfRange => write!(f, "token id outside issued range"),
            Self::HolderMismatch => write!(f, "balances disagree with token holders"),
            Self::StateNotRolledBack => write!(f, "state not rolled back on revert"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
