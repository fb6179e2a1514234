//! Trial orchestration.
//!
//! `TrialDirector` sits between the player and the kernel: it snapshots
//! the state generation, asks the oracle under a deadline, discards
//! responses that arrive against an older generation, and commits the
//! judgment through a single kernel operation. An oracle failure costs
//! exactly one system transcript entry and nothing else.

use gavel_core::case::{Case, CaseError};
use gavel_core::transcript::SpeakerRole;
use gavel_core::trial::{ActionKind, TrialConfig, TrialError, TrialSession};
use gavel_core::verdict::TrialVerdict;
use gavel_core::{Judgment, TokenOverlapMatcher};
use thiserror::Error;

use crate::config::RuntimeConfig;
use crate::oracle::{CourtroomOracle, JudgmentRequest, OracleError, VerdictRequest};

#[derive(Error, Debug)]
pub enum DirectorError {
    #[error(transparent)]
    Trial(#[from] TrialError),

    #[error(transparent)]
    Case(#[from] CaseError),
}

/// What became of one oracle-backed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorOutcome {
    /// The judgment was applied.
    Committed,
    /// The oracle failed or timed out; one system entry records it and
    /// the operation may be retried.
    Failed,
    /// The response arrived against an older state generation and was
    /// discarded without effect.
    Superseded,
}

pub struct TrialDirector<O: CourtroomOracle> {
    session: TrialSession,
    oracle: O,
    config: RuntimeConfig,
    matcher: TokenOverlapMatcher,
}

impl<O: CourtroomOracle> TrialDirector<O> {
    pub fn new(case: Case, oracle: O, config: RuntimeConfig) -> Result<Self, DirectorError> {
        let session = TrialSession::new(case, TrialConfig::default())?;
        Ok(Self {
            session,
            oracle,
            config,
            matcher: TokenOverlapMatcher::default(),
        })
    }

    pub fn session(&self) -> &TrialSession {
        &self.session
    }

    /// Scripted openings go straight to the kernel; no oracle involved.
    pub fn record_opening(&mut self, role: SpeakerRole, text: &str) -> Result<(), DirectorError> {
        self.session.record_opening(role, text)?;
        Ok(())
    }

    pub async fn statement(&mut self, text: &str) -> Result<DirectorOutcome, DirectorError> {
        self.adjudicate(ActionKind::Statement, text, |session, input, judgment| {
            session.submit_statement(input, judgment)
        })
        .await
    }

    pub async fn call_witness(
        &mut self,
        witness_id: &str,
    ) -> Result<DirectorOutcome, DirectorError> {
        self.adjudicate(
            ActionKind::CallWitness,
            witness_id,
            |session, input, judgment| session.call_witness(input, judgment),
        )
        .await
    }

    pub async fn present_evidence(
        &mut self,
        evidence_id: &str,
    ) -> Result<DirectorOutcome, DirectorError> {
        self.adjudicate(
            ActionKind::PresentEvidence,
            evidence_id,
            |session, input, judgment| session.present_evidence(input, judgment),
        )
        .await
    }

    pub async fn request_hint(&mut self) -> Result<DirectorOutcome, DirectorError> {
        self.adjudicate(ActionKind::Hint, "", |session, _input, judgment| {
            session.request_hint(judgment)
        })
        .await
    }

    pub fn request_closing(&mut self) -> Result<(), DirectorError> {
        self.session.request_closing()?;
        Ok(())
    }

    /// Ask the verdict oracle and finalize. A failed verdict call does
    /// not fail the trial; the kernel's deterministic default applies.
    pub async fn finalize(&mut self) -> Result<&TrialVerdict, DirectorError> {
        let request = VerdictRequest::from_session(&self.session);
        let judgment = match self.call_with_deadline(self.oracle.decide_verdict(&request)).await {
            Ok(judgment) => Some(judgment),
            Err(err) => {
                tracing::warn!(oracle = %self.oracle.name(), error = %err, "Verdict oracle failed, using default verdict");
                None
            }
        };
        Ok(self.session.finalize(judgment)?)
    }

    /// Shared oracle round-trip: validate via the kernel commit closure,
    /// never mutate on failure, discard stale responses.
    async fn adjudicate<F>(
        &mut self,
        action: ActionKind,
        input: &str,
        commit: F,
    ) -> Result<DirectorOutcome, DirectorError>
    where
        F: FnOnce(&mut TrialSession, &str, &Judgment) -> Result<(), TrialError>,
    {
        let issued_generation = self.session.generation();
        let request = JudgmentRequest::from_session(
            &self.session,
            action,
            input,
            self.config.transcript_window,
            &self.matcher,
        );

        match self.call_with_deadline(self.oracle.judge(&request)).await {
            Err(err) => {
                self.session.record_failure(&err.to_string());
                Ok(DirectorOutcome::Failed)
            }
            Ok(judgment) => {
                if self.is_stale(issued_generation) {
                    tracing::warn!(
                        issued_generation,
                        current = self.session.generation(),
                        "Discarding stale oracle response"
                    );
                    return Ok(DirectorOutcome::Superseded);
                }
                commit(&mut self.session, input, &judgment)?;
                Ok(DirectorOutcome::Committed)
            }
        }
    }

    async fn call_with_deadline<T>(
        &self,
        call: impl std::future::Future<Output = Result<T, OracleError>>,
    ) -> Result<T, OracleError> {
        match tokio::time::timeout(self.config.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout(self.config.timeout)),
        }
    }

    /// A response is stale when the state generation moved past the one
    /// the call was issued against.
    fn is_stale(&self, issued_generation: u64) -> bool {
        self.session.generation() != issued_generation
    }
}
