//! Case model: parsing, validation and player-facing views.

mod parser;
mod schema;
mod view;

pub use parser::{
    BonusCondition, Case, CaseError, Clue, ClueTier, ContradictionKind, EmotionState, Evidence,
    EvidenceKind, LogicalLock, Personality, Principal, RewardSchedule, Witness,
};
pub use schema::{is_valid_case, validate_case_schema, SchemaError};
pub use view::{CaseView, EvidenceView, LockView, WitnessView};
