//! Trial state machine.
//!
//! `TrialSession` exclusively owns one trial's state for the session's
//! duration. All flag mutation on the case (evidence discovery, witness
//! breakdown, lock breaks) goes through session operations, never
//! directly.
//!
//! Operations are synchronous and atomic: the oracle call that produces a
//! `Judgment` happens in the runtime *before* the session commits, so a
//! failed or malformed judgment never leaves a partial transcript append
//! or a partial sentiment update behind.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::case::{Case, CaseError, CaseView, EmotionState};
use crate::locks::{self, LockOutcome};
use crate::sentiment::CourtroomSentiment;
use crate::transcript::{MessageDraft, SpeakerRole, Transcript};
use crate::verdict::{self, TrialVerdict, VerdictJudgment};

/// Jury-impact clamp for witness and lock events.
pub const WITNESS_IMPACT_LIMIT: i32 = 10;
/// Jury-impact clamp for scripted prosecutor/judge/system lines.
pub const SCRIPTED_IMPACT_LIMIT: i32 = 5;
/// Applied when the oracle breaks a lock without naming an impact, so a
/// break is never sentiment-neutral.
pub const LOCK_BREAK_IMPACT: i32 = 8;
/// Default patience cost of asking the court for guidance.
pub const HINT_PATIENCE_COST: i32 = -5;

/// Courtroom phase. `Examination` and `Cross` are interchangeable
/// sub-phases accepting the same operation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialPhase {
    Opening,
    Examination,
    Cross,
    Closing,
    Verdict,
}

/// Which player operation a judgment answers. Carried in oracle requests
/// and used to pick clamp bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Statement,
    CallWitness,
    PresentEvidence,
    Hint,
}

fn default_judgment_speaker() -> SpeakerRole {
    SpeakerRole::Witness
}

/// Structured per-action result from the judgment oracle.
///
/// Every numeric field is clamped by the kernel regardless of what the
/// oracle returned; an invalid `broken_lock` id is silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Judgment {
    /// Responding speaker
    #[serde(default = "default_judgment_speaker")]
    pub speaker: SpeakerRole,

    /// Natural-language response line
    pub response: String,

    /// Emotion change for the witness on the stand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<EmotionState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jury_impact: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patience_impact: Option<i32>,

    /// Candidate lock id the oracle judged broken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broken_lock: Option<String>,

    /// Whether the witness on the stand breaks down
    #[serde(default)]
    pub witness_broken: bool,

    /// Hint text, for hint requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Judgment {
    /// A plain response line with no side effects.
    pub fn line(speaker: SpeakerRole, response: impl Into<String>) -> Self {
        Self {
            speaker,
            response: response.into(),
            emotion: None,
            jury_impact: None,
            patience_impact: None,
            broken_lock: None,
            witness_broken: false,
            hint: None,
        }
    }
}

/// Errors from trial operations. These reject the operation up front;
/// none of them leaves partial state behind.
#[derive(Error, Debug)]
pub enum TrialError {
    #[error("{operation} is not allowed in the {phase:?} phase")]
    PhaseViolation {
        phase: TrialPhase,
        operation: &'static str,
    },

    #[error("unknown witness: {0}")]
    UnknownWitness(String),

    #[error("unknown evidence: {0}")]
    UnknownEvidence(String),

    #[error("closing arguments were already requested")]
    ClosingAlreadyRequested,

    #[error("opening statement for {0:?} was already recorded")]
    DuplicateOpening(SpeakerRole),

    #[error("{0:?} does not give opening statements")]
    NotAnOpeningSpeaker(SpeakerRole),

    #[error("judgment names a witness speaker but no witness is on the stand")]
    NoWitnessOnStand,
}

/// Session tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Size of the jury panel
    pub juror_count: usize,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self { juror_count: 6 }
    }
}

/// Read-only snapshot of the trial state for presentation and tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialSnapshot {
    pub phase: TrialPhase,
    pub aggregate_sentiment: i32,
    pub judge_patience: i32,
    pub broken_locks: Vec<String>,
    pub current_witness: Option<String>,
    pub closing_requested: bool,
    pub message_count: usize,
}

/// One trial in flight. Exactly one operation may be outstanding at a
/// time; ownership is `&mut self` and there is no shared mutable state
/// across sessions.
#[derive(Debug)]
pub struct TrialSession {
    case: Case,
    phase: TrialPhase,
    transcript: Transcript,
    sentiment: CourtroomSentiment,
    current_witness: Option<String>,
    closing_requested: bool,
    opening_judge_done: bool,
    opening_prosecutor_done: bool,
    generation: u64,
    verdict: Option<TrialVerdict>,
}

impl TrialSession {
    /// Start a session over a validated case.
    ///
    /// The shape check runs again here so a hand-constructed case cannot
    /// bypass it; a failure is a configuration error, fatal to session
    /// creation only.
    pub fn new(case: Case, config: TrialConfig) -> Result<Self, CaseError> {
        case.validate()?;
        Ok(Self {
            case,
            phase: TrialPhase::Opening,
            transcript: Transcript::new(),
            sentiment: CourtroomSentiment::new(config.juror_count),
            current_witness: None,
            closing_requested: false,
            opening_judge_done: false,
            opening_prosecutor_done: false,
            generation: 0,
            verdict: None,
        })
    }

    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn sentiment(&self) -> &CourtroomSentiment {
        &self.sentiment
    }

    /// State generation, bumped on every committed mutation. The runtime
    /// tags outbound oracle calls with this and discards stale responses.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_witness(&self) -> Option<&str> {
        self.current_witness.as_deref()
    }

    pub fn case(&self) -> &Case {
        &self.case
    }

    /// Player-facing case snapshot (hidden truths excluded).
    pub fn case_view(&self) -> CaseView {
        CaseView::of(&self.case)
    }

    pub fn verdict(&self) -> Option<&TrialVerdict> {
        self.verdict.as_ref()
    }

    pub fn snapshot(&self) -> TrialSnapshot {
        TrialSnapshot {
            phase: self.phase,
            aggregate_sentiment: self.sentiment.aggregate(),
            judge_patience: self.sentiment.judge_patience(),
            broken_locks: self.case.broken_lock_ids(),
            current_witness: self.current_witness.clone(),
            closing_requested: self.closing_requested,
            message_count: self.transcript.len(),
        }
    }

    /// Record a judge or prosecutor opening statement. Once both are in
    /// the transcript the trial advances to Examination automatically.
    pub fn record_opening(&mut self, role: SpeakerRole, text: &str) -> Result<(), TrialError> {
        self.require_phase(&[TrialPhase::Opening], "record_opening")?;

        let done = match role {
            SpeakerRole::Judge => &mut self.opening_judge_done,
            SpeakerRole::Prosecutor => &mut self.opening_prosecutor_done,
            other => return Err(TrialError::NotAnOpeningSpeaker(other)),
        };
        if *done {
            return Err(TrialError::DuplicateOpening(role));
        }
        *done = true;

        let speaker = self.speaker_name(role);
        self.transcript.append(MessageDraft::new(role, speaker, text));

        if self.opening_judge_done && self.opening_prosecutor_done {
            self.phase = TrialPhase::Examination;
            tracing::info!(case_id = %self.case.id, "Opening statements complete, examination begins");
        }
        self.generation += 1;
        Ok(())
    }

    /// Submit a player statement together with the oracle's judgment of
    /// it. Appends the player's line and the responding party's line.
    pub fn submit_statement(&mut self, text: &str, judgment: &Judgment) -> Result<(), TrialError> {
        self.require_questioning_phase("submit_statement")?;
        self.require_witness_for(judgment)?;

        let player = self.speaker_name(SpeakerRole::Player);
        self.transcript
            .append(MessageDraft::new(SpeakerRole::Player, player, text));
        self.commit_judgment(judgment);
        self.generation += 1;
        Ok(())
    }

    /// Call a witness to the stand. Enters the Examination sub-phase.
    pub fn call_witness(&mut self, witness_id: &str, judgment: &Judgment) -> Result<(), TrialError> {
        self.require_questioning_phase("call_witness")?;
        let name = self
            .case
            .witness(witness_id)
            .map(|w| w.name.clone())
            .ok_or_else(|| TrialError::UnknownWitness(witness_id.to_string()))?;

        self.current_witness = Some(witness_id.to_string());
        self.phase = TrialPhase::Examination;

        let player = self.speaker_name(SpeakerRole::Player);
        self.transcript.append(MessageDraft::new(
            SpeakerRole::Player,
            player,
            format!("The defense calls {} to the stand.", name),
        ));
        self.commit_judgment(judgment);
        self.generation += 1;
        Ok(())
    }

    /// Present an evidence item, revealing it if it was undiscovered.
    /// Enters the Cross sub-phase.
    pub fn present_evidence(
        &mut self,
        evidence_id: &str,
        judgment: &Judgment,
    ) -> Result<(), TrialError> {
        self.require_questioning_phase("present_evidence")?;
        self.require_witness_for(judgment)?;

        // Reveal is monotone; presenting already-discovered evidence is fine.
        let description = {
            let Some(evidence) = self.case.evidence_mut(evidence_id) else {
                return Err(TrialError::UnknownEvidence(evidence_id.to_string()));
            };
            evidence.reveal();
            evidence.description.clone()
        };
        self.phase = TrialPhase::Cross;

        let player = self.speaker_name(SpeakerRole::Player);
        self.transcript.append(MessageDraft::new(
            SpeakerRole::Player,
            player,
            format!("The defense presents: {}.", description),
        ));
        self.commit_judgment(judgment);
        self.generation += 1;
        Ok(())
    }

    /// Ask the court for guidance. Costs judge patience; the hint text
    /// comes from the oracle, falling back to the easiest unbroken lock's
    /// authored hint.
    pub fn request_hint(&mut self, judgment: &Judgment) -> Result<(), TrialError> {
        self.require_questioning_phase("request_hint")?;

        let hint = judgment
            .hint
            .clone()
            .or_else(|| {
                self.case
                    .locks
                    .iter()
                    .filter(|l| !l.is_broken)
                    .min_by_key(|l| l.difficulty)
                    .map(|l| l.hint.clone())
            })
            .unwrap_or_else(|| "No further guidance is available.".to_string());

        let cost = judgment
            .patience_impact
            .unwrap_or(HINT_PATIENCE_COST)
            .clamp(-SCRIPTED_IMPACT_LIMIT, SCRIPTED_IMPACT_LIMIT);

        self.transcript.append(MessageDraft::system(hint));
        self.sentiment.apply_patience_impact(cost);
        self.generation += 1;
        Ok(())
    }

    /// Request closing arguments. Guarded: at most once per trial.
    pub fn request_closing(&mut self) -> Result<(), TrialError> {
        self.require_questioning_phase("request_closing")?;
        if self.closing_requested {
            return Err(TrialError::ClosingAlreadyRequested);
        }

        self.closing_requested = true;
        self.phase = TrialPhase::Closing;
        self.current_witness = None;
        self.transcript.append(MessageDraft::system(
            "The defense rests. The court moves to closing arguments.",
        ));
        self.generation += 1;
        Ok(())
    }

    /// Record an oracle failure. This is the only side effect permitted
    /// on an error path: one system-authored transcript entry, nothing
    /// else mutated. The failed operation may be retried.
    pub fn record_failure(&mut self, reason: &str) -> u64 {
        tracing::warn!(case_id = %self.case.id, reason = %reason, "Oracle call failed; state unchanged");
        let id = self.transcript.append(MessageDraft::system(format!(
            "The court reporter notes an interruption: {}",
            reason
        )));
        self.generation += 1;
        id
    }

    /// Produce the verdict and enter the terminal phase.
    ///
    /// `None` means the verdict oracle failed entirely; the deterministic
    /// default applies (guilty, rating C, base reward, no bonuses).
    pub fn finalize(
        &mut self,
        judgment: Option<VerdictJudgment>,
    ) -> Result<&TrialVerdict, TrialError> {
        self.require_phase(&[TrialPhase::Closing], "finalize")?;

        let reward_id = format!("{}:verdict", self.case.id);
        let decided = verdict::decide(&self.case.rewards, &reward_id, judgment);

        let judge = self.speaker_name(SpeakerRole::Judge);
        self.transcript.append(
            MessageDraft::new(
                SpeakerRole::Judge,
                judge,
                format!("{} {}", decided.outcome.announcement(), decided.reasoning),
            )
            .key_moment(),
        );

        self.phase = TrialPhase::Verdict;
        self.generation += 1;
        Ok(&*self.verdict.insert(decided))
    }

    fn require_phase(
        &self,
        allowed: &[TrialPhase],
        operation: &'static str,
    ) -> Result<(), TrialError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(TrialError::PhaseViolation {
                phase: self.phase,
                operation,
            })
        }
    }

    fn require_questioning_phase(&self, operation: &'static str) -> Result<(), TrialError> {
        self.require_phase(&[TrialPhase::Examination, TrialPhase::Cross], operation)
    }

    /// A judgment spoken by a witness is malformed when nobody is on the
    /// stand; rejected before any mutation.
    fn require_witness_for(&self, judgment: &Judgment) -> Result<(), TrialError> {
        if judgment.speaker == SpeakerRole::Witness && self.current_witness.is_none() {
            return Err(TrialError::NoWitnessOnStand);
        }
        Ok(())
    }

    fn speaker_name(&self, role: SpeakerRole) -> String {
        match role {
            SpeakerRole::Player => "Defense".to_string(),
            SpeakerRole::Witness => self
                .current_witness
                .as_deref()
                .and_then(|id| self.case.witness(id))
                .map(|w| w.name.clone())
                .unwrap_or_else(|| "Witness".to_string()),
            SpeakerRole::Prosecutor => self.case.prosecutor.name.clone(),
            SpeakerRole::Judge => self.case.judge.name.clone(),
            SpeakerRole::System => "Court".to_string(),
        }
    }

    /// Apply a validated judgment. Infallible by construction: every
    /// check that could reject has already run.
    fn commit_judgment(&mut self, judgment: &Judgment) {
        let lock_result = judgment
            .broken_lock
            .as_deref()
            .map(|id| locks::resolve_candidate(&mut self.case.locks, id));
        let lock_broken = lock_result.as_ref().map(LockOutcome::is_broken).unwrap_or(false);

        let limit = if lock_broken || judgment.speaker == SpeakerRole::Witness {
            WITNESS_IMPACT_LIMIT
        } else {
            SCRIPTED_IMPACT_LIMIT
        };
        let jury_impact = judgment
            .jury_impact
            .or(if lock_broken {
                Some(LOCK_BREAK_IMPACT)
            } else {
                None
            })
            .map(|v| v.clamp(-limit, limit));

        let mut witness_broke_now = false;
        if let Some(witness_id) = self.current_witness.clone() {
            if let Some(witness) = self.case.witness_mut(&witness_id) {
                if judgment.witness_broken {
                    witness_broke_now = witness.break_down();
                } else if judgment.speaker == SpeakerRole::Witness {
                    if let Some(emotion) = judgment.emotion {
                        witness.emotion = emotion;
                    }
                }
            }
        }

        let speaker = self.speaker_name(judgment.speaker);
        let mut draft = MessageDraft::new(judgment.speaker, speaker, judgment.response.clone());
        if let Some(emotion) = judgment.emotion {
            draft = draft.with_emotion(emotion);
        }
        if let Some(impact) = jury_impact {
            draft = draft.with_jury_impact(impact);
        }
        if witness_broke_now {
            draft = draft.key_moment();
        }
        self.transcript.append(draft);

        if let Some(LockOutcome::Broken { lock_id }) = &lock_result {
            let claim = self
                .case
                .lock(lock_id)
                .map(|l| l.surface_claim.clone())
                .unwrap_or_default();
            self.transcript.append(
                MessageDraft::system(format!("Contradiction exposed: {}", claim)).key_moment(),
            );
        }

        if let Some(impact) = jury_impact {
            self.sentiment.apply_jury_impact(impact);
        }
        if let Some(patience) = judgment.patience_impact {
            self.sentiment.apply_patience_impact(patience);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_case;
    use crate::verdict::{Rating, VerdictOutcome};

    fn session() -> TrialSession {
        TrialSession::new(sample_case(), TrialConfig::default()).unwrap()
    }

    /// Session advanced past the opening statements, guard on the stand.
    fn session_in_examination() -> TrialSession {
        let mut s = session();
        s.record_opening(SpeakerRole::Judge, "Court is in session.").unwrap();
        s.record_opening(SpeakerRole::Prosecutor, "The state will prove arson.")
            .unwrap();
        s.call_witness(
            "wit_guard",
            &Judgment::line(SpeakerRole::Witness, "I swear to tell the truth."),
        )
        .unwrap();
        s
    }

    #[test]
    fn test_opening_auto_advances_after_both_statements() {
        let mut s = session();
        assert_eq!(s.phase(), TrialPhase::Opening);

        s.record_opening(SpeakerRole::Judge, "Court is in session.").unwrap();
        assert_eq!(s.phase(), TrialPhase::Opening);

        s.record_opening(SpeakerRole::Prosecutor, "The state will prove arson.")
            .unwrap();
        assert_eq!(s.phase(), TrialPhase::Examination);
        assert_eq!(s.transcript().len(), 2);
    }

    #[test]
    fn test_duplicate_opening_rejected() {
        let mut s = session();
        s.record_opening(SpeakerRole::Judge, "Court is in session.").unwrap();
        let result = s.record_opening(SpeakerRole::Judge, "Again.");
        assert!(matches!(result, Err(TrialError::DuplicateOpening(_))));
        assert_eq!(s.transcript().len(), 1);
    }

    #[test]
    fn test_operations_rejected_before_examination() {
        let mut s = session();
        let judgment = Judgment::line(SpeakerRole::Prosecutor, "Objection!");
        let result = s.submit_statement("Where were you?", &judgment);
        assert!(matches!(result, Err(TrialError::PhaseViolation { .. })));
        assert_eq!(s.transcript().len(), 0);
    }

    // Spec scenario: 2 locks, 6 jurors, initial sentiment 0, patience 100.
    // Oracle breaks lock_timeline with jury impact 8.
    #[test]
    fn test_lock_break_scenario() {
        let mut s = session_in_examination();
        let before = s.transcript().len();

        let judgment = Judgment {
            jury_impact: Some(8),
            broken_lock: Some("lock_timeline".to_string()),
            ..Judgment::line(SpeakerRole::Witness, "I... I may have gone back, once.")
        };
        s.submit_statement("Your keycard shows you returned at 2am.", &judgment)
            .unwrap();

        assert!(s.case().lock("lock_timeline").unwrap().is_broken);
        assert!(!s.case().lock("lock_ledger").unwrap().is_broken);
        assert_eq!(s.sentiment().aggregate(), 8);
        assert_eq!(s.sentiment().judge_patience(), 100);

        // Player line, witness line, lock-break system line.
        assert_eq!(s.transcript().len(), before + 3);
        assert_eq!(s.transcript().key_moments().count(), 1);
    }

    #[test]
    fn test_lock_break_without_impact_gets_fixed_bonus() {
        let mut s = session_in_examination();
        let judgment = Judgment {
            broken_lock: Some("lock_timeline".to_string()),
            ..Judgment::line(SpeakerRole::Witness, "Fine. I went back.")
        };
        s.submit_statement("The log says otherwise.", &judgment).unwrap();
        assert_eq!(s.sentiment().aggregate(), LOCK_BREAK_IMPACT);
    }

    #[test]
    fn test_jury_impact_clamped_per_speaker() {
        let mut s = session_in_examination();

        let witness = Judgment {
            jury_impact: Some(50),
            ..Judgment::line(SpeakerRole::Witness, "It wasn't me!")
        };
        s.submit_statement("Who was it then?", &witness).unwrap();
        assert_eq!(s.sentiment().aggregate(), WITNESS_IMPACT_LIMIT);

        let prosecutor = Judgment {
            jury_impact: Some(-50),
            ..Judgment::line(SpeakerRole::Prosecutor, "Speculation, your honor.")
        };
        s.submit_statement("I suggest a theory.", &prosecutor).unwrap();
        assert_eq!(
            s.sentiment().aggregate(),
            WITNESS_IMPACT_LIMIT - SCRIPTED_IMPACT_LIMIT
        );
    }

    #[test]
    fn test_unknown_lock_candidate_tolerated() {
        let mut s = session_in_examination();
        let judgment = Judgment {
            broken_lock: Some("lock_invented".to_string()),
            jury_impact: Some(3),
            ..Judgment::line(SpeakerRole::Witness, "I don't follow.")
        };
        s.submit_statement("What about the ledger?", &judgment).unwrap();

        assert!(s.case().locks.iter().all(|l| !l.is_broken));
        assert_eq!(s.sentiment().aggregate(), 3);
        assert_eq!(s.transcript().key_moments().count(), 0);
    }

    #[test]
    fn test_witness_breakdown_is_key_moment_and_monotone() {
        let mut s = session_in_examination();
        let breaking = Judgment {
            witness_broken: true,
            emotion: Some(EmotionState::Broken),
            ..Judgment::line(SpeakerRole::Witness, "Stop! I moved the stock, alright!")
        };
        s.submit_statement("You were stealing, weren't you?", &breaking)
            .unwrap();
        assert!(s.case().witness("wit_guard").unwrap().has_broken);
        assert_eq!(s.transcript().key_moments().count(), 1);

        // A second breakdown claim does not produce another key moment.
        let again = Judgment {
            witness_broken: true,
            ..Judgment::line(SpeakerRole::Witness, "I already told you everything.")
        };
        s.submit_statement("Tell us again.", &again).unwrap();
        assert_eq!(s.transcript().key_moments().count(), 1);
    }

    #[test]
    fn test_witness_judgment_without_stand_rejected() {
        let mut s = session();
        s.record_opening(SpeakerRole::Judge, "In session.").unwrap();
        s.record_opening(SpeakerRole::Prosecutor, "Opening.").unwrap();

        let snapshot = s.snapshot();
        let judgment = Judgment::line(SpeakerRole::Witness, "Who, me?");
        let result = s.submit_statement("Answer the question.", &judgment);
        assert!(matches!(result, Err(TrialError::NoWitnessOnStand)));
        assert_eq!(s.snapshot(), snapshot);
    }

    #[test]
    fn test_present_evidence_reveals_and_enters_cross() {
        let mut s = session_in_examination();
        assert!(!s.case().evidence("ev_ledger").unwrap().discovered);

        let judgment = Judgment::line(SpeakerRole::Prosecutor, "Where did you get that?");
        s.present_evidence("ev_ledger", &judgment).unwrap();

        assert!(s.case().evidence("ev_ledger").unwrap().discovered);
        assert_eq!(s.phase(), TrialPhase::Cross);

        // Calling a witness flips back to examination.
        s.call_witness(
            "wit_guard",
            &Judgment::line(SpeakerRole::Witness, "Yes, your honor."),
        )
        .unwrap();
        assert_eq!(s.phase(), TrialPhase::Examination);
    }

    #[test]
    fn test_unknown_evidence_rejected_without_side_effects() {
        let mut s = session_in_examination();
        let snapshot = s.snapshot();
        let judgment = Judgment::line(SpeakerRole::Prosecutor, "Objection.");
        let result = s.present_evidence("ev_invented", &judgment);
        assert!(matches!(result, Err(TrialError::UnknownEvidence(_))));
        assert_eq!(s.snapshot(), snapshot);
    }

    #[test]
    fn test_hint_costs_patience() {
        let mut s = session_in_examination();
        let judgment = Judgment {
            hint: Some("Look at the access log timestamps.".to_string()),
            ..Judgment::line(SpeakerRole::System, "")
        };
        s.request_hint(&judgment).unwrap();
        assert_eq!(s.sentiment().judge_patience(), 100 + HINT_PATIENCE_COST);

        let last = s.transcript().entries().last().unwrap();
        assert_eq!(last.role, SpeakerRole::System);
        assert!(last.content.contains("access log"));
    }

    #[test]
    fn test_hint_falls_back_to_easiest_unbroken_lock() {
        let mut s = session_in_examination();
        let judgment = Judgment::line(SpeakerRole::System, "");
        s.request_hint(&judgment).unwrap();

        // lock_timeline has difficulty 2, lock_ledger 3.
        let expected = s.case().lock("lock_timeline").unwrap().hint.clone();
        let last = s.transcript().entries().last().unwrap();
        assert_eq!(last.content, expected);
    }

    #[test]
    fn test_request_closing_at_most_once() {
        let mut s = session_in_examination();
        s.request_closing().unwrap();
        assert_eq!(s.phase(), TrialPhase::Closing);

        let snapshot = s.snapshot();
        let result = s.request_closing();
        assert!(matches!(result, Err(TrialError::PhaseViolation { .. })));
        assert_eq!(s.snapshot(), snapshot);
    }

    #[test]
    fn test_closing_flag_guard_direct() {
        // Even if the phase were somehow re-entered, the flag guards the
        // second request.
        let mut s = session_in_examination();
        s.closing_requested = true;
        s.phase = TrialPhase::Examination;
        let result = s.request_closing();
        assert!(matches!(result, Err(TrialError::ClosingAlreadyRequested)));
    }

    // Spec scenario: a collaborator timeout leaves the state equal to the
    // pre-call snapshot except for one system failure entry.
    #[test]
    fn test_failure_record_leaves_snapshot_unchanged() {
        let mut s = session_in_examination();
        let before = s.snapshot();

        s.record_failure("the judgment service timed out");

        let after = s.snapshot();
        assert_eq!(after.message_count, before.message_count + 1);
        assert_eq!(after.phase, before.phase);
        assert_eq!(after.aggregate_sentiment, before.aggregate_sentiment);
        assert_eq!(after.judge_patience, before.judge_patience);
        assert_eq!(after.broken_locks, before.broken_locks);
        assert_eq!(after.closing_requested, before.closing_requested);

        let last = s.transcript().entries().last().unwrap();
        assert_eq!(last.role, SpeakerRole::System);
        assert!(last.content.contains("timed out"));
    }

    #[test]
    fn test_finalize_requires_closing_phase() {
        let mut s = session_in_examination();
        let result = s.finalize(None);
        assert!(matches!(result, Err(TrialError::PhaseViolation { .. })));
    }

    #[test]
    fn test_finalize_with_fallback_default() {
        let mut s = session_in_examination();
        s.request_closing().unwrap();

        let verdict = s.finalize(None).unwrap().clone();
        assert_eq!(verdict.outcome, VerdictOutcome::Guilty);
        assert_eq!(verdict.rating, Rating::C);
        assert_eq!(verdict.reward.experience, 100);
        assert_eq!(verdict.reward.currency, 50);
        assert!(verdict.reward.bonuses.is_empty());
        assert_eq!(s.phase(), TrialPhase::Verdict);

        // Terminal: no further operations.
        let result = s.request_closing();
        assert!(matches!(result, Err(TrialError::PhaseViolation { .. })));
    }

    #[test]
    fn test_generation_bumps_on_commit_only() {
        let mut s = session_in_examination();
        let generation = s.generation();

        // Rejected operation leaves the generation untouched.
        let bad = s.present_evidence("ev_invented", &Judgment::line(SpeakerRole::Judge, "?"));
        assert!(bad.is_err());
        assert_eq!(s.generation(), generation);

        s.submit_statement(
            "Let the record show the time.",
            &Judgment::line(SpeakerRole::Judge, "Noted."),
        )
        .unwrap();
        assert_eq!(s.generation(), generation + 1);
    }
}
