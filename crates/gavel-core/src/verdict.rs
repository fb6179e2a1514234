//! Verdict resolution and reward accounting.
//!
//! The verdict oracle proposes an outcome and a score; this module clamps
//! the numbers against the case's authored reward schedule and supplies a
//! deterministic default when the oracle produced nothing usable. Reward
//! application is idempotent per reward id.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::case::RewardSchedule;

/// Final disposition of the trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictOutcome {
    NotGuilty,
    Guilty,
    Mistrial,
}

impl VerdictOutcome {
    /// Judge's announcement line for this outcome.
    pub fn announcement(&self) -> &'static str {
        match self {
            VerdictOutcome::NotGuilty => "The court finds the defendant not guilty.",
            VerdictOutcome::Guilty => "The court finds the defendant guilty.",
            VerdictOutcome::Mistrial => "The court declares a mistrial.",
        }
    }
}

/// Performance grade for the defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rating {
    S,
    A,
    B,
    C,
    D,
    F,
}

/// Raw result from the verdict oracle, before clamping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictJudgment {
    pub outcome: VerdictOutcome,
    pub reasoning: String,
    pub experience: u32,
    pub currency: u32,
    #[serde(default)]
    pub bonuses: Vec<String>,
    pub rating: Rating,
}

/// A clamped, claimable reward grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Claim key, unique per trial
    pub id: String,
    pub experience: u32,
    pub currency: u32,
    pub bonuses: Vec<String>,
}

/// The final record of a decided trial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialVerdict {
    pub outcome: VerdictOutcome,
    pub reasoning: String,
    pub rating: Rating,
    pub reward: Reward,
}

/// Deterministic default when the verdict oracle fails entirely: the
/// defense did not carry its case.
fn fallback(schedule: &RewardSchedule, reward_id: &str) -> TrialVerdict {
    TrialVerdict {
        outcome: VerdictOutcome::Guilty,
        reasoning: "The defense did not overcome the weight of the evidence.".to_string(),
        rating: Rating::C,
        reward: Reward {
            id: reward_id.to_string(),
            experience: schedule.base_experience,
            currency: schedule.base_currency,
            bonuses: Vec::new(),
        },
    }
}

/// Resolve a trial verdict from an oracle judgment, or the fallback.
///
/// Scores are clamped to the schedule maximum (base plus every authored
/// bonus); bonus names not present in the schedule are dropped.
pub fn decide(
    schedule: &RewardSchedule,
    reward_id: &str,
    judgment: Option<VerdictJudgment>,
) -> TrialVerdict {
    let Some(judgment) = judgment else {
        tracing::warn!(reward_id = %reward_id, "Verdict oracle unavailable, applying default verdict");
        return fallback(schedule, reward_id);
    };

    let bonuses: Vec<String> = judgment
        .bonuses
        .into_iter()
        .filter(|name| schedule.bonuses.iter().any(|b| b.name == *name))
        .collect();

    let verdict = TrialVerdict {
        outcome: judgment.outcome,
        reasoning: judgment.reasoning,
        rating: judgment.rating,
        reward: Reward {
            id: reward_id.to_string(),
            experience: judgment.experience.min(schedule.max_experience()),
            currency: judgment.currency.min(schedule.max_currency()),
            bonuses,
        },
    };
    tracing::info!(
        reward_id = %reward_id,
        outcome = ?verdict.outcome,
        rating = ?verdict.rating,
        "Verdict decided"
    );
    verdict
}

/// Cross-trial player progress. Reward ids already claimed are remembered
/// so the same grant can be applied at most once.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub experience: u64,
    pub currency: u64,
    claimed: BTreeSet<String>,
}

impl PlayerProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a reward grant. Returns false (and changes nothing) when the
    /// reward id was already claimed.
    pub fn apply_reward(&mut self, reward: &Reward) -> bool {
        if !self.claimed.insert(reward.id.clone()) {
            tracing::debug!(reward_id = %reward.id, "Reward already claimed, skipping");
            return false;
        }
        self.experience += u64::from(reward.experience);
        self.currency += u64::from(reward.currency);
        true
    }

    pub fn has_claimed(&self, reward_id: &str) -> bool {
        self.claimed.contains(reward_id)
    }
}
