//! Case parsing from YAML/JSON.
//!
//! A case is the immutable-at-session-start record of facts the kernel
//! consumes from the case-authoring collaborator. The only mutable parts
//! are the `discovered`/`has_broken`/`is_broken` flags, and those are only
//! mutated through session-mediated operations.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading a case.
///
/// All of these are configuration errors: they are fatal to session
/// creation and can never occur once a trial is running.
#[derive(Error, Debug)]
pub enum CaseError {
    #[error("Failed to read case file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Case validation failed: {0}")]
    ValidationError(String),

    #[error("Case schema validation failed: {0}")]
    SchemaError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// A named party to the trial (defendant, prosecutor, judge).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Display name
    pub name: String,

    /// Optional background used when briefing the oracle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// Classification of a piece of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Physical,
    Testimonial,
    Documentary,
    Digital,
}

/// A piece of evidence in the case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    /// Unique identifier within the case
    pub id: String,

    /// Classification
    pub kind: EvidenceKind,

    /// Player-visible description
    pub description: String,

    /// Full content, revealed once discovered
    pub content: String,

    /// Whether the player has found this item. Transitions false -> true
    /// exactly once, via investigation or an in-trial reveal.
    #[serde(default)]
    pub discovered: bool,

    /// Whether this item hides a contradiction
    #[serde(default)]
    pub has_contradiction: bool,

    /// Authoring-side hint for the contradiction. Never shown to the player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contradiction_hint: Option<String>,

    /// Scoring/UI emphasis only
    #[serde(default)]
    pub is_key_evidence: bool,
}

impl Evidence {
    /// Mark the evidence discovered. Returns true on the first reveal,
    /// false if it was already discovered (the flag is monotone).
    pub fn reveal(&mut self) -> bool {
        if self.discovered {
            return false;
        }
        self.discovered = true;
        true
    }
}

/// Emotional state of a witness on the stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionState {
    Calm,
    Nervous,
    Agitated,
    Defensive,
    Fearful,
    Broken,
}

impl Default for EmotionState {
    fn default() -> Self {
        EmotionState::Calm
    }
}

/// Bounded personality scalars (0..=100 each, checked at load).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Personality {
    pub honesty: u8,
    pub stability: u8,
    pub aggression: u8,
    pub intelligence: u8,
}

impl Personality {
    fn in_range(&self) -> bool {
        [self.honesty, self.stability, self.aggression, self.intelligence]
            .iter()
            .all(|v| *v <= 100)
    }
}

/// A witness the player can call and question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Witness {
    /// Unique identifier within the case
    pub id: String,

    /// Display name
    pub name: String,

    /// Relationship to the case (e.g. "night guard", "business partner")
    pub role: String,

    /// Personality vector, each component 0..=100
    pub personality: Personality,

    /// Initial testimony as authored
    pub testimony: String,

    /// What the witness is hiding. Never surfaced directly.
    pub secret: String,

    /// Pressure points the oracle may lean on
    #[serde(default)]
    pub weak_points: Vec<String>,

    /// Current emotional state, mutated during trial
    #[serde(default)]
    pub emotion: EmotionState,

    /// Set at most once when the witness breaks down; never cleared
    #[serde(default)]
    pub has_broken: bool,
}

impl Witness {
    /// Record a breakdown. Returns true the first time, false afterwards.
    pub fn break_down(&mut self) -> bool {
        if self.has_broken {
            return false;
        }
        self.has_broken = true;
        self.emotion = EmotionState::Broken;
        true
    }
}

/// Category of the contradiction a lock encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionKind {
    Time,
    Location,
    Physical,
    Motive,
    Testimony,
}

/// A designed contradiction between a surface claim and a hidden truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalLock {
    /// Unique identifier within the case
    pub id: String,

    /// What appears to be true
    pub surface_claim: String,

    /// What is actually true
    pub hidden_truth: String,

    /// Contradiction category
    pub kind: ContradictionKind,

    /// Player-facing hint, surfaced only through hint requests
    pub hint: String,

    /// Evidence ids this lock hangs on
    pub related_evidence: Vec<String>,

    /// Witness ids this lock hangs on
    pub related_witnesses: Vec<String>,

    /// Difficulty 1..=5
    pub difficulty: u8,

    /// Monotone: false -> true, never reversed. A broken lock no longer
    /// contributes sentiment or patience impact.
    #[serde(default)]
    pub is_broken: bool,
}

impl LogicalLock {
    /// Flip the lock to broken. Returns true on the transition, false if
    /// it was already broken.
    pub fn break_lock(&mut self) -> bool {
        if self.is_broken {
            return false;
        }
        self.is_broken = true;
        true
    }
}

/// A bonus line in the reward schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusCondition {
    /// Stable key the verdict oracle awards the bonus by
    pub name: String,

    /// Human-readable condition text
    pub description: String,

    #[serde(default)]
    pub experience: u32,

    #[serde(default)]
    pub currency: u32,
}

/// Reward figures authored with the case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardSchedule {
    pub base_experience: u32,

    pub base_currency: u32,

    #[serde(default)]
    pub bonuses: Vec<BonusCondition>,
}

impl RewardSchedule {
    /// Largest experience figure the case author declared possible.
    pub fn max_experience(&self) -> u32 {
        self.base_experience + self.bonuses.iter().map(|b| b.experience).sum::<u32>()
    }

    /// Largest currency figure the case author declared possible.
    pub fn max_currency(&self) -> u32 {
        self.base_currency + self.bonuses.iter().map(|b| b.currency).sum::<u32>()
    }
}

/// Pricing tier of a purchasable clue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueTier {
    Basic,
    Advanced,
    Premium,
}

/// A purchasable pre-trial clue pointing at one evidence item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clue {
    pub id: String,

    pub tier: ClueTier,

    pub price: u32,

    /// Evidence item this clue discovers when purchased
    pub evidence_id: String,

    pub description: String,

    #[serde(default)]
    pub purchased: bool,
}

/// A complete courtroom case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    /// Stable case identifier
    pub id: String,

    /// Public summary of the charges
    pub summary: String,

    /// What actually happened. Never exposed in player-facing views.
    pub hidden_truth: String,

    /// The actually guilty party
    pub guilty_party: String,

    pub defendant: Principal,

    pub prosecutor: Principal,

    pub judge: Principal,

    pub evidence: Vec<Evidence>,

    pub witnesses: Vec<Witness>,

    pub locks: Vec<LogicalLock>,

    pub rewards: RewardSchedule,

    /// Optional investigation shop seeded from the case file
    #[serde(default)]
    pub clues: Vec<Clue>,
}

impl Case {
    /// Parse a case from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, CaseError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a case from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CaseError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Validate the raw document against the embedded schema, then
    /// deserialize and run the shape check. Schema first: serde would
    /// silently drop fields the schema forbids.
    fn from_value(value: serde_json::Value) -> Result<Self, CaseError> {
        super::schema::validate_case_schema(&value)
            .map_err(|errors| CaseError::SchemaError(errors.join("; ")))?;
        let case: Case = serde_json::from_value(value)?;
        case.validate()?;
        Ok(case)
    }

    /// Parse a case from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CaseError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a case from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CaseError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Look up evidence by id.
    pub fn evidence(&self, id: &str) -> Option<&Evidence> {
        self.evidence.iter().find(|e| e.id == id)
    }

    /// Look up evidence by id, mutably.
    pub fn evidence_mut(&mut self, id: &str) -> Option<&mut Evidence> {
        self.evidence.iter_mut().find(|e| e.id == id)
    }

    /// Look up a witness by id.
    pub fn witness(&self, id: &str) -> Option<&Witness> {
        self.witnesses.iter().find(|w| w.id == id)
    }

    /// Look up a witness by id, mutably.
    pub fn witness_mut(&mut self, id: &str) -> Option<&mut Witness> {
        self.witnesses.iter_mut().find(|w| w.id == id)
    }

    /// Look up a lock by id.
    pub fn lock(&self, id: &str) -> Option<&LogicalLock> {
        self.locks.iter().find(|l| l.id == id)
    }

    /// Ids of all broken locks, in case order.
    pub fn broken_lock_ids(&self) -> Vec<String> {
        self.locks
            .iter()
            .filter(|l| l.is_broken)
            .map(|l| l.id.clone())
            .collect()
    }

    /// Validate the case shape.
    ///
    /// The kernel requires at least one evidence item, one witness and one
    /// lock, and every lock must reference existing entities. A case
    /// failing these checks is rejected before a session begins.
    pub fn validate(&self) -> Result<(), CaseError> {
        if self.id.is_empty() {
            return Err(CaseError::MissingField("id".to_string()));
        }
        if self.summary.is_empty() {
            return Err(CaseError::MissingField("summary".to_string()));
        }
        if self.hidden_truth.is_empty() {
            return Err(CaseError::MissingField("hidden_truth".to_string()));
        }

        if self.evidence.is_empty() {
            return Err(CaseError::ValidationError(
                "case requires at least one evidence item".to_string(),
            ));
        }
        if self.witnesses.is_empty() {
            return Err(CaseError::ValidationError(
                "case requires at least one witness".to_string(),
            ));
        }
        if self.locks.is_empty() {
            return Err(CaseError::ValidationError(
                "case requires at least one logical lock".to_string(),
            ));
        }

        self.validate_unique_ids()?;

        for witness in &self.witnesses {
            if !witness.personality.in_range() {
                return Err(CaseError::ValidationError(format!(
                    "witness {} has a personality scalar outside 0..=100",
                    witness.id
                )));
            }
        }

        for lock in &self.locks {
            if !(1..=5).contains(&lock.difficulty) {
                return Err(CaseError::ValidationError(format!(
                    "lock {} difficulty must be 1..=5, got {}",
                    lock.id, lock.difficulty
                )));
            }

            // A lock that names no evidence or witness cannot be triggered.
            if lock.related_evidence.is_empty() && lock.related_witnesses.is_empty() {
                return Err(CaseError::ValidationError(format!(
                    "lock {} references no evidence and no witnesses",
                    lock.id
                )));
            }

            for evidence_id in &lock.related_evidence {
                if self.evidence(evidence_id).is_none() {
                    return Err(CaseError::ValidationError(format!(
                        "lock {} references unknown evidence {}",
                        lock.id, evidence_id
                    )));
                }
            }
            for witness_id in &lock.related_witnesses {
                if self.witness(witness_id).is_none() {
                    return Err(CaseError::ValidationError(format!(
                        "lock {} references unknown witness {}",
                        lock.id, witness_id
                    )));
                }
            }
        }

        for clue in &self.clues {
            if self.evidence(&clue.evidence_id).is_none() {
                return Err(CaseError::ValidationError(format!(
                    "clue {} references unknown evidence {}",
                    clue.id, clue.evidence_id
                )));
            }
        }

        Ok(())
    }

    /// Ensure ids are unique within each collection.
    fn validate_unique_ids(&self) -> Result<(), CaseError> {
        let mut seen = std::collections::HashSet::new();

        let all_ids = self
            .evidence
            .iter()
            .map(|e| &e.id)
            .chain(self.witnesses.iter().map(|w| &w.id))
            .chain(self.locks.iter().map(|l| &l.id))
            .chain(self.clues.iter().map(|c| &c.id));

        for id in all_ids {
            if !seen.insert(id) {
                return Err(CaseError::ValidationError(format!("Duplicate id: {}", id)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::SAMPLE_CASE_YAML as VALID_CASE;

    #[test]
    fn test_parse_valid_case() {
        let case = Case::from_yaml(VALID_CASE).unwrap();
        assert_eq!(case.id, "warehouse-fire");
        assert_eq!(case.evidence.len(), 2);
        assert_eq!(case.witnesses.len(), 1);
        assert_eq!(case.locks.len(), 2);
        assert_eq!(case.clues.len(), 1);
        assert!(!case.locks[0].is_broken);
    }

    #[test]
    fn test_json_round_trip() {
        let case = Case::from_yaml(VALID_CASE).unwrap();
        let json = serde_json::to_string(&case).unwrap();
        let reparsed = Case::from_json(&json).unwrap();
        assert_eq!(reparsed.id, case.id);
        assert_eq!(reparsed.locks.len(), case.locks.len());
    }

    #[test]
    fn test_case_without_locks_rejected() {
        let yaml = VALID_CASE.replace(
            "locks:",
            "locks: []\nunused:",
        );
        let result = Case::from_yaml(&yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_dangling_lock_reference_rejected() {
        let yaml = VALID_CASE.replace("ev_keycard\"]", "ev_missing\"]");
        let result = Case::from_yaml(&yaml);
        assert!(matches!(result, Err(CaseError::ValidationError(_))));
    }

    #[test]
    fn test_personality_out_of_range_rejected() {
        // The schema rejects the scalar in the raw document.
        let yaml = VALID_CASE.replace("honesty: 30", "honesty: 130");
        let result = Case::from_yaml(&yaml);
        assert!(matches!(result, Err(CaseError::SchemaError(_))));

        // The shape check catches the same thing on a constructed case.
        let mut case = Case::from_yaml(VALID_CASE).unwrap();
        case.witnesses[0].personality.honesty = 130;
        assert!(matches!(case.validate(), Err(CaseError::ValidationError(_))));
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let yaml = format!("{VALID_CASE}\nnot_in_schema: \"extra\"\n");
        let result = Case::from_yaml(&yaml);
        assert!(matches!(result, Err(CaseError::SchemaError(_))));
    }

    #[test]
    fn test_unknown_witness_key_rejected() {
        let yaml = VALID_CASE.replace("role:", "alignment: \"lawful\"\n    role:");
        let result = Case::from_yaml(&yaml);
        assert!(matches!(result, Err(CaseError::SchemaError(_))));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = VALID_CASE.replace("id: \"ev_keycard\"", "id: \"ev_ledger\"");
        let result = Case::from_yaml(&yaml);
        assert!(matches!(result, Err(CaseError::ValidationError(_))));
    }

    #[test]
    fn test_evidence_reveal_is_monotone() {
        let mut case = Case::from_yaml(VALID_CASE).unwrap();
        let evidence = case.evidence_mut("ev_ledger").unwrap();
        assert!(evidence.reveal());
        assert!(!evidence.reveal());
        assert!(evidence.discovered);
    }

    #[test]
    fn test_witness_break_is_monotone() {
        let mut case = Case::from_yaml(VALID_CASE).unwrap();
        let witness = case.witness_mut("wit_guard").unwrap();
        assert!(witness.break_down());
        assert!(!witness.break_down());
        assert!(witness.has_broken);
        assert_eq!(witness.emotion, EmotionState::Broken);
    }

    #[test]
    fn test_lock_break_is_monotone() {
        let mut case = Case::from_yaml(VALID_CASE).unwrap();
        assert!(case.locks[0].break_lock());
        assert!(!case.locks[0].break_lock());
        assert!(case.locks[0].is_broken);
    }

    #[test]
    fn test_reward_schedule_maximums() {
        let case = Case::from_yaml(VALID_CASE).unwrap();
        assert_eq!(case.rewards.max_experience(), 140);
        assert_eq!(case.rewards.max_currency(), 70);
    }
}
