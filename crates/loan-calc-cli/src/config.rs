use serde::Deserialize;
use std::path::PathBuf;

use loan_calc_core::gate::{FileStore, GateConfig, UsageGate};

use crate::input;

const DEFAULT_STATE_PATH: &str = ".lcalc-state.json";
const DEFAULT_OUTBOX_PATH: &str = ".lcalc-leads.jsonl";
pub const STATE_ENV: &str = "LCALC_STORE";

/// Settings read from `--config` (YAML or JSON).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Where gate counters persist between runs.
    pub state_path: Option<PathBuf>,
    /// Where validated leads are queued for the back office.
    pub lead_outbox: Option<PathBuf>,
    pub gate: GateConfig,
}

impl CliConfig {
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config: CliConfig = match path {
            Some(path) => input::read_file(path)?,
            None => CliConfig::default(),
        };
        if let Ok(from_env) = std::env::var(STATE_ENV) {
            if !from_env.is_empty() {
                config.state_path = Some(PathBuf::from(from_env));
            }
        }
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH))
    }

    pub fn outbox_path(&self) -> PathBuf {
        self.lead_outbox
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTBOX_PATH))
    }

    pub fn open_gate(&self) -> UsageGate<FileStore> {
        UsageGate::with_config(FileStore::open(self.state_path()), self.gate.clone())
    }
}
