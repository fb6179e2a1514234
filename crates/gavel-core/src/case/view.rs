//! Player-facing case snapshots.
//!
//! Hidden-truth fields (the case's hidden truth, witness secrets, lock
//! hidden truths, contradiction hints) never appear in these views. The
//! presentation layer and the oracle briefing both consume `CaseView`.

use serde::Serialize;

use super::parser::{Case, ContradictionKind, EmotionState, EvidenceKind};

/// Discovered evidence as the player sees it.
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceView {
    pub id: String,
    pub kind: EvidenceKind,
    pub description: String,
    /// Full content is only present once discovered.
    pub content: String,
    pub is_key_evidence: bool,
}

/// A witness as the player sees them.
#[derive(Debug, Clone, Serialize)]
pub struct WitnessView {
    pub id: String,
    pub name: String,
    pub role: String,
    pub testimony: String,
    pub emotion: EmotionState,
    pub has_broken: bool,
}

/// A lock's public face: the claim that appears true, and whether the
/// player has already cracked it.
#[derive(Debug, Clone, Serialize)]
pub struct LockView {
    pub id: String,
    pub surface_claim: String,
    pub kind: ContradictionKind,
    pub difficulty: u8,
    pub is_broken: bool,
}

/// Read-only case snapshot with all concealed material stripped.
#[derive(Debug, Clone, Serialize)]
pub struct CaseView {
    pub id: String,
    pub summary: String,
    pub defendant: String,
    pub prosecutor: String,
    pub judge: String,
    /// Discovered evidence only.
    pub evidence: Vec<EvidenceView>,
    pub witnesses: Vec<WitnessView>,
    pub locks: Vec<LockView>,
}

impl CaseView {
    /// Build a view from the current case state.
    pub fn of(case: &Case) -> Self {
        Self {
            id: case.id.clone(),
            summary: case.summary.clone(),
            defendant: case.defendant.name.clone(),
            prosecutor: case.prosecutor.name.clone(),
            judge: case.judge.name.clone(),
            evidence: case
                .evidence
                .iter()
                .filter(|e| e.discovered)
                .map(|e| EvidenceView {
                    id: e.id.clone(),
                    kind: e.kind,
                    description: e.description.clone(),
                    content: e.content.clone(),
                    is_key_evidence: e.is_key_evidence,
                })
                .collect(),
            witnesses: case
                .witnesses
                .iter()
                .map(|w| WitnessView {
                    id: w.id.clone(),
                    name: w.name.clone(),
                    role: w.role.clone(),
                    testimony: w.testimony.clone(),
                    emotion: w.emotion,
                    has_broken: w.has_broken,
                })
                .collect(),
            locks: case
                .locks
                .iter()
                .map(|l| LockView {
                    id: l.id.clone(),
                    surface_claim: l.surface_claim.clone(),
                    kind: l.kind,
                    difficulty: l.difficulty,
                    is_broken: l.is_broken,
                })
                .collect(),
        }
    }
}
