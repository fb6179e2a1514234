//! The judgment oracle boundary.
//!
//! Everything nondeterministic lives behind [`CourtroomOracle`]. The
//! kernel hands the oracle a fully assembled request (including material
//! hidden from the player) and gets back a structured [`Judgment`] or
//! [`VerdictJudgment`]; the kernel then validates and clamps whatever
//! came back. An oracle is free to be an LLM, a script, or anything else.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use gavel_core::case::Personality;
use gavel_core::trial::{ActionKind, TrialSession};
use gavel_core::transcript::SpeakerRole;
use gavel_core::{Judgment, LockMatcher, VerdictJudgment};

pub mod scripted;

#[cfg(feature = "anthropic")]
pub mod anthropic;

/// Errors from oracle calls. All of them leave the trial untouched; the
/// director records a failure entry and the operation may be retried.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("oracle call failed: {0}")]
    Call(String),

    #[error("oracle response was not a valid judgment: {0}")]
    Parse(String),

    #[error("oracle timed out after {0:?}")]
    Timeout(Duration),

    #[error("oracle rate limited")]
    RateLimited { retry_after: Option<Duration> },

    #[error("oracle API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("oracle not configured: {0}")]
    NotConfigured(String),
}

impl OracleError {
    /// Transient errors are worth retrying before giving up.
    pub fn is_transient(&self) -> bool {
        match self {
            OracleError::RateLimited { .. } | OracleError::Timeout(_) => true,
            OracleError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// The witness on the stand, including material hidden from the player.
#[derive(Debug, Clone, Serialize)]
pub struct WitnessBrief {
    pub id: String,
    pub name: String,
    pub role: String,
    pub testimony: String,
    pub secret: String,
    pub weak_points: Vec<String>,
    pub personality: Personality,
    pub emotion: gavel_core::EmotionState,
    pub has_broken: bool,
}

/// An unbroken lock as the oracle sees it: both faces.
#[derive(Debug, Clone, Serialize)]
pub struct LockBrief {
    pub id: String,
    pub surface_claim: String,
    pub hidden_truth: String,
    pub difficulty: u8,
}

/// One transcript line for the oracle's context window.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptLine {
    pub role: SpeakerRole,
    pub speaker: String,
    pub content: String,
}

/// Everything the oracle needs to adjudicate one player action.
#[derive(Debug, Clone, Serialize)]
pub struct JudgmentRequest {
    pub case_id: String,
    pub summary: String,
    pub hidden_truth: String,
    pub guilty_party: String,
    pub action: ActionKind,
    pub player_input: String,
    pub current_witness: Option<WitnessBrief>,
    pub unbroken_locks: Vec<LockBrief>,
    /// Lock ids the pre-filter flagged as plausibly touched by the input
    pub candidate_locks: Vec<String>,
    pub transcript_window: Vec<TranscriptLine>,
    pub jury_sentiment: i32,
    pub judge_patience: i32,
}

impl JudgmentRequest {
    /// Assemble a request from the live session. The matcher narrows the
    /// lock list to candidates; the oracle still sees every unbroken lock.
    pub fn from_session(
        session: &TrialSession,
        action: ActionKind,
        player_input: &str,
        window: usize,
        matcher: &dyn LockMatcher,
    ) -> Self {
        let case = session.case();
        let current_witness = session
            .current_witness()
            .and_then(|id| case.witness(id))
            .map(|w| WitnessBrief {
                id: w.id.clone(),
                name: w.name.clone(),
                role: w.role.clone(),
                testimony: w.testimony.clone(),
                secret: w.secret.clone(),
                weak_points: w.weak_points.clone(),
                personality: w.personality,
                emotion: w.emotion,
                has_broken: w.has_broken,
            });

        let unbroken_locks = case
            .locks
            .iter()
            .filter(|l| !l.is_broken)
            .map(|l| LockBrief {
                id: l.id.clone(),
                surface_claim: l.surface_claim.clone(),
                hidden_truth: l.hidden_truth.clone(),
                difficulty: l.difficulty,
            })
            .collect();

        let candidate_locks = matcher
            .candidates(player_input, &case.locks)
            .into_iter()
            .map(str::to_string)
            .collect();

        let transcript_window = session
            .transcript()
            .recent(window)
            .iter()
            .map(|m| TranscriptLine {
                role: m.role,
                speaker: m.speaker.clone(),
                content: m.content.clone(),
            })
            .collect();

        Self {
            case_id: case.id.clone(),
            summary: case.summary.clone(),
            hidden_truth: case.hidden_truth.clone(),
            guilty_party: case.guilty_party.clone(),
            action,
            player_input: player_input.to_string(),
            current_witness,
            unbroken_locks,
            candidate_locks,
            transcript_window,
            jury_sentiment: session.sentiment().aggregate(),
            judge_patience: session.sentiment().judge_patience(),
        }
    }
}

/// Everything the verdict oracle needs to grade the finished trial.
#[derive(Debug, Clone, Serialize)]
pub struct VerdictRequest {
    pub case_id: String,
    pub summary: String,
    pub hidden_truth: String,
    pub guilty_party: String,
    pub broken_locks: Vec<String>,
    pub total_locks: usize,
    pub jury_sentiment: i32,
    pub judge_patience: i32,
    pub key_moments: Vec<TranscriptLine>,
    pub base_experience: u32,
    pub base_currency: u32,
    pub max_experience: u32,
    pub max_currency: u32,
    /// (name, condition) pairs the oracle may award by name
    pub bonuses: Vec<(String, String)>,
}

impl VerdictRequest {
    pub fn from_session(session: &TrialSession) -> Self {
        let case = session.case();
        Self {
            case_id: case.id.clone(),
            summary: case.summary.clone(),
            hidden_truth: case.hidden_truth.clone(),
            guilty_party: case.guilty_party.clone(),
            broken_locks: case.broken_lock_ids(),
            total_locks: case.locks.len(),
            jury_sentiment: session.sentiment().aggregate(),
            judge_patience: session.sentiment().judge_patience(),
            key_moments: session
                .transcript()
                .key_moments()
                .map(|m| TranscriptLine {
                    role: m.role,
                    speaker: m.speaker.clone(),
                    content: m.content.clone(),
                })
                .collect(),
            base_experience: case.rewards.base_experience,
            base_currency: case.rewards.base_currency,
            max_experience: case.rewards.max_experience(),
            max_currency: case.rewards.max_currency(),
            bonuses: case
                .rewards
                .bonuses
                .iter()
                .map(|b| (b.name.clone(), b.description.clone()))
                .collect(),
        }
    }
}

/// The adjudicating collaborator for one trial.
///
/// # Contract
/// - Implementations are side-effect free with respect to trial state
/// - A returned error means "nothing happened"; the director records it
/// - Responses are structured; free text goes inside `response` fields
#[async_trait]
pub trait CourtroomOracle: Send + Sync {
    /// Adjudicate one player action.
    async fn judge(&self, request: &JudgmentRequest) -> Result<Judgment, OracleError>;

    /// Grade the finished trial.
    async fn decide_verdict(&self, request: &VerdictRequest)
        -> Result<VerdictJudgment, OracleError>;

    /// Short implementation name for logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(OracleError::Timeout(Duration::from_secs(30)).is_transient());
        assert!(OracleError::RateLimited { retry_after: None }.is_transient());
        assert!(OracleError::Api {
            status: 503,
            message: "overloaded".to_string()
        }
        .is_transient());
        assert!(!OracleError::Api {
            status: 400,
            message: "bad request".to_string()
        }
        .is_transient());
        assert!(!OracleError::Parse("not json".to_string()).is_transient());
    }
}
