//! Configuration for the Midnight wallet simulator

pub mod assistant;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::wallet::TransferStage;
use crate::{Error, Result};

// Re-export assistant config
pub use assistant::{AssistantConfig, AssistantSettings, GEMINI_API_KEY_ENV};

/// Midnight networks a session can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Devnet,
    Testnet,
    Mainnet,
}

impl Network {
    pub fn name(&self) -> &'static str {
        match self {
            Network::Devnet => "Devnet",
            Network::Testnet => "Testnet",
            Network::Mainnet => "Mainnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Simulated latency of every suspension point, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageDelays {
    pub connect_ms: u64,
    pub balance_ms: u64,
    pub build_ms: u64,
    pub prove_ms: u64,
    pub nullifiers_ms: u64,
    pub sign_ms: u64,
    pub submit_ms: u64,
}

impl StageDelays {
    /// All delays disabled. Stage order and results are unchanged.
    pub fn zero() -> Self {
        Self {
            connect_ms: 0,
            balance_ms: 0,
            build_ms: 0,
            prove_ms: 0,
            nullifiers_ms: 0,
            sign_ms: 0,
            submit_ms: 0,
        }
    }

    /// Delay applied after the given transfer stage is announced
    pub fn for_stage(&self, stage: TransferStage) -> Duration {
        let ms = match stage {
            TransferStage::Build => self.build_ms,
            TransferStage::GenerateProof => self.prove_ms,
            TransferStage::AddNullifiers => self.nullifiers_ms,
            TransferStage::Sign => self.sign_ms,
            TransferStage::Submit => self.submit_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub fn balance(&self) -> Duration {
        Duration::from_millis(self.balance_ms)
    }

    /// Pacing of script steps that do not touch the wallet
    pub fn script_step(&self) -> Duration {
        Duration::from_millis(self.build_ms)
    }
}

impl Default for StageDelays {
    fn default() -> Self {
        Self {
            connect_ms: 1_000,
            balance_ms: 500,
            build_ms: 600,
            prove_ms: 2_500,
            nullifiers_ms: 800,
            sign_ms: 1_000,
            submit_ms: 1_200,
        }
    }
}

/// Which value wins when balances are refreshed after local debits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BalanceSource {
    /// The local ledger is authoritative; refresh never overwrites it
    #[default]
    Ledger,
    /// The simulated fetch is authoritative; refresh overwrites local debits
    Simulator,
}

/// Deliberate failures for exercising error paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultInjection {
    /// Fail `connect` after its delay
    #[serde(default)]
    pub fail_connect: bool,
    /// Fail `get_balance` after its delay
    #[serde(default)]
    pub fail_balance: bool,
    /// Fail a transfer once this stage has been announced
    #[serde(default)]
    pub fail_transfer_at: Option<TransferStage>,
}

impl FaultInjection {
    pub fn is_active(&self) -> bool {
        self.fail_connect || self.fail_balance || self.fail_transfer_at.is_some()
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network reported by `connect`
    #[serde(default)]
    pub network: Network,
    /// Per-stage simulated latency
    #[serde(default)]
    pub delays: StageDelays,
    /// Source of truth for balance refreshes
    #[serde(default)]
    pub balance_source: BalanceSource,
    /// Injected failures (off by default)
    #[serde(default)]
    pub faults: FaultInjection,
    /// Maximum number of console entries kept in memory
    #[serde(default = "default_console_capacity")]
    pub console_capacity: usize,
    /// Path to audit log file (JSONL)
    #[serde(default)]
    pub audit_log_path: Option<String>,
    /// Developer assistant settings
    #[serde(default)]
    pub assistant: AssistantSettings,
}

fn default_console_capacity() -> usize {
    200
}

impl Config {
    /// Load a JSON config file; missing fields fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::Devnet,
            delays: StageDelays::default(),
            balance_source: BalanceSource::Ledger,
            faults: FaultInjection::default(),
            console_capacity: default_console_capacity(),
            audit_log_path: None,
            assistant: AssistantSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_deserializes_to_defaults() {
        let parsed: Config = serde_json::from_value(serde_json::json!({})).expect("parse config");
        assert_eq!(parsed.network, Network::Devnet);
        assert_eq!(parsed.delays, StageDelays::default());
        assert_eq!(parsed.balance_source, BalanceSource::Ledger);
        assert!(!parsed.faults.is_active());
        assert_eq!(parsed.console_capacity, 200);
    }

    #[test]
    fn explicit_settings_deserialize() {
        let value = serde_json::json!({
            "network": "testnet",
            "balance_source": "simulator",
            "faults": { "fail_transfer_at": "generate_proof" },
            "console_capacity": 16,
            "audit_log_path": "audit.jsonl"
        });
        let parsed: Config = serde_json::from_value(value).expect("parse config");
        assert_eq!(parsed.network, Network::Testnet);
        assert_eq!(parsed.balance_source, BalanceSource::Simulator);
        assert_eq!(
            parsed.faults.fail_transfer_at,
            Some(TransferStage::GenerateProof)
        );
        assert!(parsed.faults.is_active());
        assert_eq!(parsed.console_capacity, 16);
        assert_eq!(parsed.audit_log_path.as_deref(), Some("audit.jsonl"));
    }

    #[test]
    fn partial_delays_keep_remaining_defaults() {
        let value = serde_json::json!({ "delays": { "prove_ms": 100 } });
        let parsed: Config = serde_json::from_value(value).expect("parse config");
        assert_eq!(
            parsed.delays,
            StageDelays {
                prove_ms: 100,
                ..StageDelays::default()
            }
        );
        assert_eq!(parsed.delays.connect_ms, 1_000);
    }

    #[test]
    fn stage_delays_follow_the_pipeline_defaults() {
        let delays = StageDelays::default();
        assert_eq!(delays.for_stage(TransferStage::Build), Duration::from_millis(600));
        assert_eq!(
            delays.for_stage(TransferStage::GenerateProof),
            Duration::from_millis(2_500)
        );
        assert_eq!(delays.for_stage(TransferStage::Sign), Duration::from_millis(1_000));
        assert_eq!(StageDelays::zero().connect(), Duration::ZERO);
    }

    #[test]
    fn from_file_reports_missing_file_as_config_error() {
        let err = Config::from_file(Path::new("/nonexistent/midnight.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
