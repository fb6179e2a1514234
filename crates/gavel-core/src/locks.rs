//! Logical lock resolution.
//!
//! The kernel never performs language understanding. It validates a
//! candidate lock id delivered by the judgment oracle and flips the lock
//! at most once. Rejected candidates (unknown id, already broken) are a
//! tolerated oracle-output defect: silent no-ops, never errors.
//!
//! The token-overlap matcher is a pre-filter only. It biases which locks
//! get surfaced to the oracle for consideration; it never breaks a lock
//! itself.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

use crate::case::LogicalLock;

lazy_static! {
    static ref WORD_PATTERN: Regex = Regex::new(r"[a-z0-9']+").unwrap();
}

/// Why a candidate was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No lock with that id exists in the case
    Unknown,
    /// The lock was already broken
    AlreadyBroken,
}

/// Result of validating a candidate lock id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    /// The lock transitioned to broken in this call.
    Broken { lock_id: String },
    /// The candidate was rejected; nothing changed.
    Ignored {
        lock_id: String,
        reason: IgnoreReason,
    },
}

impl LockOutcome {
    pub fn is_broken(&self) -> bool {
        matches!(self, LockOutcome::Broken { .. })
    }
}

/// Validate and apply a candidate lock id.
///
/// Accepts only if the id exists and the lock is currently unbroken;
/// the flip is idempotent within and across calls.
pub fn resolve_candidate(locks: &mut [LogicalLock], candidate: &str) -> LockOutcome {
    let Some(lock) = locks.iter_mut().find(|l| l.id == candidate) else {
        tracing::debug!(lock_id = %candidate, "Ignoring unknown lock candidate");
        return LockOutcome::Ignored {
            lock_id: candidate.to_string(),
            reason: IgnoreReason::Unknown,
        };
    };

    if !lock.break_lock() {
        tracing::debug!(lock_id = %candidate, "Ignoring already-broken lock candidate");
        return LockOutcome::Ignored {
            lock_id: candidate.to_string(),
            reason: IgnoreReason::AlreadyBroken,
        };
    }

    tracing::info!(lock_id = %candidate, "Logical lock broken");
    LockOutcome::Broken {
        lock_id: candidate.to_string(),
    }
}

/// Strategy for pre-filtering which unbroken locks a player statement
/// plausibly touches. Replaceable without touching the state machine.
pub trait LockMatcher: Send + Sync {
    /// Ids of unbroken locks worth surfacing to the oracle for this
    /// statement, in case order.
    fn candidates<'a>(&self, statement: &str, locks: &'a [LogicalLock]) -> Vec<&'a str>;
}

/// Content-agnostic token-overlap heuristic.
///
/// A lock is a candidate when the player's statement shares at least
/// `min_shared` tokens with the lock's surface claim or hidden truth,
/// after trivial words are filtered by length.
#[derive(Debug, Clone)]
pub struct TokenOverlapMatcher {
    /// Shared-token threshold
    pub min_shared: usize,

    /// Tokens shorter than this are trivial and dropped
    pub min_token_len: usize,
}

impl Default for TokenOverlapMatcher {
    fn default() -> Self {
        Self {
            min_shared: 2,
            min_token_len: 4,
        }
    }
}

impl TokenOverlapMatcher {
    fn tokenize(&self, text: &str) -> BTreeSet<String> {
        let lower = text.to_lowercase();
        WORD_PATTERN
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .filter(|t| t.len() >= self.min_token_len)
            .collect()
    }
}

impl LockMatcher for TokenOverlapMatcher {
    fn candidates<'a>(&self, statement: &str, locks: &'a [LogicalLock]) -> Vec<&'a str> {
        let statement_tokens = self.tokenize(statement);
        if statement_tokens.is_empty() {
            return Vec::new();
        }

        locks
            .iter()
            .filter(|lock| !lock.is_broken)
            .filter(|lock| {
                let mut lock_tokens = self.tokenize(&lock.surface_claim);
                lock_tokens.extend(self.tokenize(&lock.hidden_truth));
                let shared = statement_tokens.intersection(&lock_tokens).count();
                shared >= self.min_shared
            })
            .map(|lock| lock.id.as_str())
            .collect()
    }
}
