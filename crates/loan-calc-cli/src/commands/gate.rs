use clap::{Args, Subcommand};
use serde_json::{json, Value};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use loan_calc_core::gate::{GateDecision, KeyValueStore, UsageGate};
use loan_calc_core::leads::{submit_lead, LeadForm, LeadSink, LeadSubmission};
use loan_calc_core::{LoanCalcError, LoanCalcResult};

use crate::config::CliConfig;

/// Usage quota management
#[derive(Args)]
pub struct GateArgs {
    #[command(subcommand)]
    pub action: GateAction,
}

#[derive(Subcommand)]
pub enum GateAction {
    /// Record one entry into a gated calculator and print the decision
    Enter,
    /// Show the gate state without recording an entry
    Status,
    /// Leave contact details to lift the quota permanently
    Unlock(UnlockArgs),
}

#[derive(Args)]
pub struct UnlockArgs {
    /// First name and surname
    #[arg(long)]
    pub name: String,
    /// Phone number (at least 9 digits)
    #[arg(long)]
    pub phone: String,
    /// Email address
    #[arg(long)]
    pub email: String,
    /// Free-text message
    #[arg(long, default_value = "")]
    pub message: String,
    /// Where the lead came from
    #[arg(long, default_value = "Calculator quota unlock")]
    pub context: String,
}

/// Appends leads as JSON lines for the back office to pick up.
struct OutboxSink {
    path: PathBuf,
}

impl LeadSink for OutboxSink {
    fn submit(&self, submission: &LeadSubmission) -> LoanCalcResult<()> {
        let line = serde_json::to_string(submission)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                LoanCalcError::Submission(format!("{}: {}", self.path.display(), e))
            })?;
        writeln!(file, "{line}").map_err(|e| LoanCalcError::Submission(e.to_string()))
    }
}

fn summary<S: KeyValueStore>(gate: &UsageGate<S>) -> Value {
    json!({
        "state": gate.state(),
        "attempt_count": gate.attempt_count().ok(),
        "free_limit": gate.config().free_limit,
    })
}

pub fn run_gate(args: GateArgs, config: &CliConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let gate = config.open_gate();

    match args.action {
        GateAction::Enter => {
            let decision = gate.check_and_record_entry();
            let mut out = summary(&gate);
            out["decision"] = json!(decision);
            Ok(out)
        }
        GateAction::Status => {
            let mut out = summary(&gate);
            out["state_path"] = json!(gate.store().path());
            Ok(out)
        }
        GateAction::Unlock(args) => {
            let form = LeadForm {
                name: args.name,
                phone: args.phone,
                email: args.email,
                message: args.message,
                context: args.context,
            };
            let sink = OutboxSink {
                path: config.outbox_path(),
            };
            let submission = submit_lead(form, &sink, &gate)?;
            let mut out = summary(&gate);
            out["submitted_at"] = json!(submission.submitted_at);
            out["outbox"] = json!(sink.path);
            Ok(out)
        }
    }
}

/// Record a calculator run against the quota; refuse it once locked.
pub fn enforce(config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    match config.open_gate().check_and_record_entry() {
        GateDecision::Allowed => Ok(()),
        GateDecision::Locked => Err(format!(
            "free limit of {} calculations reached; run `lcalc gate unlock` to continue",
            config.gate.free_limit
        )
        .into()),
    }
}
