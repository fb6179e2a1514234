//! Command-line entry points: validate case files and run scripted
//! demo trials without a live oracle.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use gavel_core::case::Case;
use gavel_core::transcript::SpeakerRole;
use gavel_core::{Investigation, Judgment, PlayerProgress, VerdictJudgment};
use gavel_runtime::{DirectorOutcome, RuntimeConfig, ScriptedOracle, TrialDirector};

#[derive(Parser)]
#[command(name = "gavel", about = "Courtroom trial simulation kernel", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a case file against the schema and the shape rules
    Validate {
        /// Case file (.yaml or .json)
        case: PathBuf,
    },
    /// Run a trial end to end from a scripted oracle
    Demo {
        /// Case file (.yaml or .json)
        case: PathBuf,

        /// Demo script with openings, steps and the verdict
        #[arg(long)]
        script: PathBuf,
    },
}

/// A pre-authored trial for offline runs.
#[derive(Debug, Deserialize)]
struct DemoScript {
    #[serde(default)]
    investigation: Option<InvestigationScript>,
    openings: Openings,
    steps: Vec<DemoStep>,
    #[serde(default)]
    verdict: Option<VerdictJudgment>,
}

#[derive(Debug, Deserialize)]
struct InvestigationScript {
    balance: u32,
    #[serde(default)]
    purchases: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Openings {
    judge: String,
    prosecutor: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum DemoStep {
    CallWitness { witness: String, judgment: Judgment },
    Statement { input: String, judgment: Judgment },
    PresentEvidence { evidence: String, judgment: Judgment },
    Hint { judgment: Judgment },
}

impl DemoStep {
    fn judgment(&self) -> &Judgment {
        match self {
            DemoStep::CallWitness { judgment, .. }
            | DemoStep::Statement { judgment, .. }
            | DemoStep::PresentEvidence { judgment, .. }
            | DemoStep::Hint { judgment } => judgment,
        }
    }
}

fn load_case(path: &Path) -> Result<Case> {
    let case = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Case::from_json_file(path),
        _ => Case::from_yaml_file(path),
    }
    .with_context(|| format!("failed to load case from {}", path.display()))?;
    Ok(case)
}

fn validate(path: &Path) -> Result<()> {
    // Loading already runs the schema and shape checks on the raw document.
    let case = load_case(path)?;

    println!(
        "{}: ok ({} evidence, {} witnesses, {} locks, {} clues)",
        case.id,
        case.evidence.len(),
        case.witnesses.len(),
        case.locks.len(),
        case.clues.len()
    );
    Ok(())
}

async fn demo(case_path: &Path, script_path: &Path) -> Result<()> {
    let mut case = load_case(case_path)?;
    let raw = std::fs::read_to_string(script_path)
        .with_context(|| format!("failed to read script {}", script_path.display()))?;
    let script: DemoScript = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse script {}", script_path.display()))?;

    if let Some(plan) = &script.investigation {
        let mut investigation = Investigation::new(plan.balance);
        for clue_id in &plan.purchases {
            let receipt = investigation.purchase_clue(&mut case, clue_id)?;
            println!(
                "Purchased {} for {} (discovered {}, {} remaining)",
                receipt.clue_id, receipt.price, receipt.evidence_id, receipt.remaining_balance
            );
        }
    }

    let oracle = ScriptedOracle::new(
        script.steps.iter().map(|s| s.judgment().clone()),
        script.verdict.clone(),
    );
    let mut director = TrialDirector::new(case, oracle, RuntimeConfig::default())?;

    director.record_opening(SpeakerRole::Judge, &script.openings.judge)?;
    director.record_opening(SpeakerRole::Prosecutor, &script.openings.prosecutor)?;

    for (index, step) in script.steps.iter().enumerate() {
        let outcome = match step {
            DemoStep::CallWitness { witness, .. } => director.call_witness(witness).await?,
            DemoStep::Statement { input, .. } => director.statement(input).await?,
            DemoStep::PresentEvidence { evidence, .. } => {
                director.present_evidence(evidence).await?
            }
            DemoStep::Hint { .. } => director.request_hint().await?,
        };
        if outcome != DirectorOutcome::Committed {
            bail!("step {} did not commit: {:?}", index + 1, outcome);
        }
    }

    director.request_closing()?;
    let verdict = director.finalize().await?.clone();

    println!("\n=== Transcript ===");
    for entry in director.session().transcript().entries() {
        let marker = if entry.is_key_moment { " *" } else { "" };
        println!("[{:?}] {}: {}{}", entry.role, entry.speaker, entry.content, marker);
    }

    let sentiment = director.session().sentiment();
    println!("\n=== Outcome ===");
    println!(
        "Jury sentiment: {} ({:?}), judge patience: {}",
        sentiment.aggregate(),
        sentiment.jury_expression(),
        sentiment.judge_patience()
    );
    println!("Verdict: {:?} (rating {:?})", verdict.outcome, verdict.rating);
    println!("Reasoning: {}", verdict.reasoning);

    let mut progress = PlayerProgress::new();
    if progress.apply_reward(&verdict.reward) {
        println!(
            "Reward: {} experience, {} currency, bonuses: {:?}",
            progress.experience, progress.currency, verdict.reward.bonuses
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Validate { case } => validate(&case),
        Command::Demo { case, script } => demo(&case, &script).await,
    }
}
