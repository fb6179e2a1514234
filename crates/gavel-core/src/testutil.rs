//! Shared test fixtures.

use crate::case::Case;

/// A small but complete case used across module tests.
pub(crate) const SAMPLE_CASE_YAML: &str = r#"
id: "warehouse-fire"
summary: "The defendant is accused of setting fire to the Hartley warehouse."
hidden_truth: "The night guard started the fire to cover up his theft."
guilty_party: "night guard"
defendant:
  name: "Ada Hartley"
prosecutor:
  name: "R. Voss"
judge:
  name: "Judge Calloway"
evidence:
  - id: "ev_ledger"
    kind: documentary
    description: "Warehouse inventory ledger"
    content: "Pages for the week of the fire are missing."
    has_contradiction: true
    contradiction_hint: "The missing pages match the guard's shift."
    is_key_evidence: true
  - id: "ev_keycard"
    kind: digital
    description: "Keycard access log"
    content: "Guard badge used at 02:14, after his claimed departure."
witnesses:
  - id: "wit_guard"
    name: "Tom Brandt"
    role: "night guard"
    personality:
      honesty: 30
      stability: 45
      aggression: 60
      intelligence: 55
    testimony: "I locked up at midnight and went straight home."
    secret: "He returned at 2am to move stolen stock."
    weak_points:
      - "timeline of his departure"
locks:
  - id: "lock_timeline"
    surface_claim: "The guard locked the warehouse at midnight and went home."
    hidden_truth: "The keycard log shows the guard returned at 02:14."
    kind: time
    hint: "Compare his departure story against the access log."
    related_evidence: ["ev_keycard"]
    related_witnesses: ["wit_guard"]
    difficulty: 2
  - id: "lock_ledger"
    surface_claim: "The inventory records were destroyed in the fire."
    hidden_truth: "The ledger pages were removed before the fire started."
    kind: physical
    hint: "Ask who had the ledger last."
    related_evidence: ["ev_ledger"]
    related_witnesses: ["wit_guard"]
    difficulty: 3
rewards:
  base_experience: 100
  base_currency: 50
  bonuses:
    - name: all_locks
      description: "All contradictions exposed"
      experience: 40
      currency: 20
clues:
  - id: "clue_keycard"
    tier: advanced
    price: 60
    evidence_id: "ev_keycard"
    description: "A contact in building security offers the access log."
"#;

/// Parse the sample case, panicking on fixture rot.
pub(crate) fn sample_case() -> Case {
    Case::from_yaml(SAMPLE_CASE_YAML).unwrap()
}
