//! # gavel-core
//!
//! Deterministic courtroom trial kernel.
//!
//! This crate owns every rule of the trial: the phase machine, the
//! transcript, jury sentiment, logical locks, the verdict and the
//! investigation economy. It never talks to a language model; judgments
//! arrive from the outside (see `gavel-runtime`) already structured, and
//! the kernel validates, clamps and applies them.
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: the same case and judgment sequence always
//!    produces the same trial state
//! 2. **No LLM calls**: all language understanding happens upstream
//! 3. **Atomic operations**: a rejected operation leaves no partial state
//! 4. **Monotone flags**: broken locks, broken witnesses and discovered
//!    evidence never revert
//!
//! ## Example
//!
//! ```rust,ignore
//! use gavel_core::{Case, Judgment, SpeakerRole, TrialConfig, TrialSession};
//!
//! let case = Case::from_yaml_file("cases/warehouse-fire.yaml")?;
//! let mut session = TrialSession::new(case, TrialConfig::default())?;
//!
//! session.record_opening(SpeakerRole::Judge, "Court is in session.")?;
//! session.record_opening(SpeakerRole::Prosecutor, "The state will prove arson.")?;
//!
//! let judgment: Judgment = serde_json::from_str(oracle_response)?;
//! session.submit_statement("Where were you at midnight?", &judgment)?;
//! ```

pub mod case;
pub mod investigation;
pub mod locks;
pub mod sentiment;
pub mod transcript;
pub mod trial;
pub mod verdict;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export main types at crate root
pub use case::{
    Case, CaseError, CaseView, Clue, ClueTier, EmotionState, Evidence, EvidenceKind, LogicalLock,
    RewardSchedule, Witness,
};
pub use investigation::{Investigation, InvestigationError, PurchaseReceipt};
pub use locks::{LockMatcher, LockOutcome, TokenOverlapMatcher};
pub use sentiment::{juror_expression, CourtroomSentiment, JurorExpression};
pub use transcript::{CourtroomMessage, MessageDraft, SpeakerRole, Transcript};
pub use trial::{
    ActionKind, Judgment, TrialConfig, TrialError, TrialPhase, TrialSession, TrialSnapshot,
};
pub use verdict::{PlayerProgress, Rating, Reward, TrialVerdict, VerdictJudgment, VerdictOutcome};
