//! Prompts for the courtroom oracle.
//!
//! Two prompt families: per-action judgment and end-of-trial verdict.
//! The system prompts are static and cacheable; the user prompts carry
//! the per-request state assembled by the oracle module.
//!
//! Key terminology:
//! - Judgment = the structured adjudication of one player action
//! - Lock = an authored contradiction the player is trying to expose
//! - The oracle roleplays the courtroom; the kernel enforces the rules

use crate::oracle::{JudgmentRequest, VerdictRequest};

/// System prompt for per-action judgments.
///
/// The framing matters: the oracle proposes, the kernel disposes. Every
/// number it returns is clamped downstream and an invalid lock id is
/// ignored, so the prompt pushes for honesty over drama.
pub const JUDGMENT_SYSTEM_PROMPT: &str = r#"
You adjudicate one action in a courtroom trial simulation.

You receive the full case, including material hidden from the player:
the hidden truth, witness secrets, and both faces of every logical lock.
The player sees none of this. Roleplay the responding party faithfully
and judge only what the player's action actually accomplishes.

## Rules
1. A lock breaks ONLY when the player's action genuinely exposes its
   contradiction. Weak or unrelated statements break nothing.
2. A witness breaks down ONLY under sustained, well-aimed pressure on
   their secret or weak points.
3. jury_impact reflects how persuasive this single action was to a lay
   jury. Witness reactions and lock breaks may reach -10..10; routine
   exchanges stay within -5..5.
4. patience_impact reflects the judge's tolerance. Stalling, badgering
   and irrelevance cost patience; sharp lawyering can restore a little.
5. Stay in character. The response text is spoken aloud in court.

## Output Format (strict JSON, nothing else)
{
  "speaker": "witness" | "prosecutor" | "judge",
  "response": "what the speaker says",
  "emotion": "calm" | "nervous" | "agitated" | "defensive" | "fearful" | "broken",
  "jury_impact": -10..10,
  "patience_impact": -10..10,
  "broken_lock": "lock id, or omit if nothing broke",
  "witness_broken": true | false,
  "hint": "only for hint requests"
}
"#;

/// System prompt for the end-of-trial verdict.
pub const VERDICT_SYSTEM_PROMPT: &str = r#"
You deliver the verdict for a finished courtroom trial simulation.

Weigh what the defense actually proved: how many logical locks were
broken, the final jury sentiment, the judge's remaining patience, and
the key moments of the trial. Award bonuses only by their listed names
and only when their conditions were met. Scores above the listed
maximums will be clamped.

## Output Format (strict JSON, nothing else)
{
  "outcome": "not_guilty" | "guilty" | "mistrial",
  "reasoning": "the judge's summation, spoken aloud",
  "experience": 0..max_experience,
  "currency": 0..max_currency,
  "bonuses": ["bonus names earned"],
  "rating": "S" | "A" | "B" | "C" | "D" | "F"
}
"#;

/// Render the per-request payload for a judgment call.
pub fn judgment_user_prompt(request: &JudgmentRequest) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(&format!("## Case: {}\n{}\n\n", request.case_id, request.summary));
    prompt.push_str(&format!("Hidden truth: {}\n", request.hidden_truth));
    prompt.push_str(&format!("Guilty party: {}\n\n", request.guilty_party));

    if let Some(witness) = &request.current_witness {
        prompt.push_str(&format!(
            "## Witness on the stand: {} ({})\nTestimony: {}\nSecret: {}\nEmotion: {:?}\n",
            witness.name, witness.role, witness.testimony, witness.secret, witness.emotion
        ));
        if !witness.weak_points.is_empty() {
            prompt.push_str(&format!("Weak points: {}\n", witness.weak_points.join("; ")));
        }
        prompt.push('\n');
    } else {
        prompt.push_str("## No witness is on the stand.\n\n");
    }

    prompt.push_str("## Unbroken locks\n");
    for lock in &request.unbroken_locks {
        prompt.push_str(&format!(
            "- {} (difficulty {}): claim \"{}\" / truth \"{}\"\n",
            lock.id, lock.difficulty, lock.surface_claim, lock.hidden_truth
        ));
    }
    if !request.candidate_locks.is_empty() {
        prompt.push_str(&format!(
            "Locks plausibly touched by this action: {}\n",
            request.candidate_locks.join(", ")
        ));
    }

    prompt.push_str("\n## Recent transcript\n");
    for line in &request.transcript_window {
        prompt.push_str(&format!("{}: {}\n", line.speaker, line.content));
    }

    prompt.push_str(&format!(
        "\n## Courtroom state\nJury sentiment: {}\nJudge patience: {}\n",
        request.jury_sentiment, request.judge_patience
    ));
    prompt.push_str(&format!(
        "\n## Player action ({:?})\n{}\n",
        request.action, request.player_input
    ));

    prompt
}

/// Render the per-request payload for the verdict call.
pub fn verdict_user_prompt(request: &VerdictRequest) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str(&format!("## Case: {}\n{}\n\n", request.case_id, request.summary));
    prompt.push_str(&format!("Hidden truth: {}\n", request.hidden_truth));
    prompt.push_str(&format!("Guilty party: {}\n\n", request.guilty_party));

    prompt.push_str(&format!(
        "Locks broken: {} of {}\n",
        request.broken_locks.len(),
        request.total_locks
    ));
    if !request.broken_locks.is_empty() {
        prompt.push_str(&format!("Broken: {}\n", request.broken_locks.join(", ")));
    }
    prompt.push_str(&format!(
        "Final jury sentiment: {}\nJudge patience remaining: {}\n\n",
        request.jury_sentiment, request.judge_patience
    ));

    if !request.key_moments.is_empty() {
        prompt.push_str("## Key moments\n");
        for line in &request.key_moments {
            prompt.push_str(&format!("{}: {}\n", line.speaker, line.content));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "## Reward schedule\nBase: {} experience, {} currency\nMaximum: {} experience, {} currency\n",
        request.base_experience, request.base_currency, request.max_experience, request.max_currency
    ));
    for (name, description) in &request.bonuses {
        prompt.push_str(&format!("Bonus \"{}\": {}\n", name, description));
    }

    prompt
}
