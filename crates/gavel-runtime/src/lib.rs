//! # gavel-runtime
//!
//! Async oracle runtime for the gavel trial kernel.
//!
//! `gavel-core` is deterministic and synchronous; this crate supplies
//! everything nondeterministic around it: the [`CourtroomOracle`] trait,
//! a scripted oracle for demos and tests, an Anthropic-backed oracle
//! behind the `anthropic` feature, and the [`TrialDirector`] that runs
//! the snapshot / call / stale-check / commit cycle for every player
//! action.
//!
//! ## Key Guarantees
//!
//! 1. **One entry per failure**: an oracle error or timeout costs exactly
//!    one system transcript entry; nothing else changes
//! 2. **Stale responses are discarded**: a response issued against an
//!    older state generation never commits
//! 3. **Deadline-bounded**: every oracle call runs under a configurable
//!    timeout

pub mod config;
pub mod director;
pub mod oracle;
pub mod prompts;

pub use config::{ConfigError, RuntimeConfig};
pub use director::{DirectorError, DirectorOutcome, TrialDirector};
pub use oracle::scripted::ScriptedOracle;
pub use oracle::{CourtroomOracle, JudgmentRequest, OracleError, VerdictRequest};

#[cfg(feature = "anthropic")]
pub use oracle::anthropic::AnthropicOracle;
