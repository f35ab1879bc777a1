//! Canned wallet scripts
//!
//! Each script is a short, fixed sequence of wallet operations that writes
//! its narrative to the service console. A failing step stops the script,
//! is logged as an error line, and is returned to the caller.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::service::WalletService;
use crate::wallet::TransferRecord;
use crate::{Error, Result};

/// Recipient used by the transfer scripts
pub const TEST_RECIPIENT: &str = "midnight1test_recipient_address_001";
/// Amount sent by the shielded transfer script
pub const SHIELDED_TEST_AMOUNT: f64 = 10.0;
/// Amount sent by the smoke test
pub const SMOKE_TEST_AMOUNT: f64 = 50.5;

const COMPACT_STEPS: [&str; 4] = [
    "Compiling contract.compact with compactc...",
    "Generating circuit prover/verifier keys...",
    "Writing managed/contract artifacts...",
    "Running contract simulator against local ledger state...",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    Balance,
    TransferShielded,
    CompactSim,
    Smoke,
}

impl ScriptKind {
    pub fn all() -> &'static [ScriptKind] {
        &[
            ScriptKind::Balance,
            ScriptKind::TransferShielded,
            ScriptKind::CompactSim,
            ScriptKind::Smoke,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            ScriptKind::Balance => "balance",
            ScriptKind::TransferShielded => "transfer_shielded",
            ScriptKind::CompactSim => "compact_sim",
            ScriptKind::Smoke => "smoke",
        }
    }

    /// Command line shown for the script
    pub fn label(&self) -> &'static str {
        match self {
            ScriptKind::Balance => "pnpm test:balance",
            ScriptKind::TransferShielded => "pnpm test:shielded",
            ScriptKind::CompactSim => "pnpm exec compact-sim",
            ScriptKind::Smoke => "npx ts-node test-script.ts",
        }
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ScriptKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        ScriptKind::all()
            .iter()
            .copied()
            .find(|kind| kind.id() == needle || kind.label() == needle)
            .ok_or_else(|| Error::UnknownScript(s.to_string()))
    }
}

/// Summary of one script run
#[derive(Debug, Clone, Serialize)]
pub struct ScriptReport {
    pub script: ScriptKind,
    pub duration_ms: u64,
    /// Transfer produced by the script, if any
    pub transfer: Option<TransferRecord>,
}

/// Runs canned scripts against a wallet service
pub struct ScriptRunner {
    service: Arc<WalletService>,
    step_delay: Duration,
}

impl ScriptRunner {
    /// `step_delay` paces the non-wallet steps (compact simulation)
    pub fn new(service: Arc<WalletService>, step_delay: Duration) -> Self {
        Self {
            service,
            step_delay,
        }
    }

    pub async fn run(&self, kind: ScriptKind) -> Result<ScriptReport> {
        let console = self.service.console();
        let started = Instant::now();
        console.info(format!("$ {}", kind.label()));
        tracing::info!(script = %kind, "Running script");

        let result = match kind {
            ScriptKind::Balance => self.run_balance().await.map(|()| None),
            ScriptKind::TransferShielded => self.run_transfer_shielded().await.map(Some),
            ScriptKind::CompactSim => self.run_compact_sim().await.map(|()| None),
            ScriptKind::Smoke => self.run_smoke().await.map(Some),
        };

        match result {
            Ok(transfer) => {
                console.success(format!("{} finished", kind.label()));
                Ok(ScriptReport {
                    script: kind,
                    duration_ms: started.elapsed().as_millis() as u64,
                    transfer,
                })
            }
            Err(e) => {
                console.error(format!("Test failed: {}", e));
                Err(e)
            }
        }
    }

    async fn ensure_connected(&self) -> Result<()> {
        if !self.service.store().is_connected().await {
            self.service.connect().await?;
        }
        Ok(())
    }

    async fn run_balance(&self) -> Result<()> {
        self.ensure_connected().await?;
        let session = self.service.refresh_balances().await?;
        let console = self.service.console();
        console.info(format!("Shielded: {} DUST", session.shielded_balance));
        console.info(format!("Unshielded: {} DUST", session.public_balance));
        Ok(())
    }

    async fn run_transfer_shielded(&self) -> Result<TransferRecord> {
        self.ensure_connected().await?;
        self.service
            .transfer(TEST_RECIPIENT, SHIELDED_TEST_AMOUNT, true, None)
            .await
    }

    async fn run_compact_sim(&self) -> Result<()> {
        let console = self.service.console();
        for step in COMPACT_STEPS {
            console.info(step);
            sleep(self.step_delay).await;
        }
        console.info("Contract simulation passed: 0 constraint violations");
        Ok(())
    }

    /// Connect, refresh, and send one unshielded transfer
    async fn run_smoke(&self) -> Result<TransferRecord> {
        let console = self.service.console();
        console.info("--- Midnight Wallet Script Test ---");

        let session = self.service.connect().await?;
        console.info(format!("Connected Address: {}", session.public_address));
        console.info(format!("Shielded Balance: {} DUST", session.shielded_balance));

        console.info("Refreshing balances...");
        let session = self.service.refresh_balances().await?;
        console.info(format!("Unshielded: {}", session.public_balance));

        let record = self
            .service
            .transfer(TEST_RECIPIENT, SMOKE_TEST_AMOUNT, false, None)
            .await?;
        console.info("--- Test Suite Completed ---");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FaultInjection, Network, StageDelays};
    use crate::console::{ConsoleLog, LogLevel};
    use crate::wallet::{Channel, MidnightSimulator};

    fn runner_with(backend: MidnightSimulator) -> (ScriptRunner, Arc<WalletService>) {
        let service = Arc::new(WalletService::new(Arc::new(backend), ConsoleLog::new(100)));
        (
            ScriptRunner::new(Arc::clone(&service), Duration::ZERO),
            service,
        )
    }

    fn fast_runner() -> (ScriptRunner, Arc<WalletService>) {
        runner_with(MidnightSimulator::new(Network::Devnet, StageDelays::zero()))
    }

    #[test]
    fn test_parse_by_id_or_label() {
        assert_eq!("balance".parse::<ScriptKind>().unwrap(), ScriptKind::Balance);
        assert_eq!(
            "pnpm test:shielded".parse::<ScriptKind>().unwrap(),
            ScriptKind::TransferShielded
        );
        assert!(matches!(
            "rm -rf".parse::<ScriptKind>(),
            Err(Error::UnknownScript(_))
        ));
    }

    #[tokio::test]
    async fn test_balance_script_connects_and_logs() {
        let (runner, service) = fast_runner();
        let report = runner.run(ScriptKind::Balance).await.unwrap();
        assert!(report.transfer.is_none());
        assert!(service.session().await.is_some());

        let messages: Vec<String> = service
            .console()
            .entries()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert!(messages.contains(&"Shielded: 5000 DUST".to_string()));
        assert!(messages.contains(&"Unshielded: 1250.75 DUST".to_string()));
    }

    #[tokio::test]
    async fn test_shielded_script_debits_shielded_balance() {
        let (runner, service) = fast_runner();
        let report = runner.run(ScriptKind::TransferShielded).await.unwrap();

        let record = report.transfer.unwrap();
        assert_eq!(record.channel, Channel::Shielded);
        assert_eq!(record.recipient, TEST_RECIPIENT);
        assert_eq!(service.session().await.unwrap().shielded_balance, 4990.0);
    }

    #[tokio::test]
    async fn test_compact_sim_does_not_touch_wallet() {
        let (runner, service) = fast_runner();
        runner.run(ScriptKind::CompactSim).await.unwrap();
        assert!(service.session().await.is_none());
        assert!(service.history(None).await.is_empty());
        assert!(service.console().len() >= COMPACT_STEPS.len());
    }

    #[tokio::test]
    async fn test_smoke_script_matches_example_scenario() {
        let (runner, service) = fast_runner();
        let report = runner.run(ScriptKind::Smoke).await.unwrap();

        let record = report.transfer.unwrap();
        assert_eq!(record.channel, Channel::Unshielded);
        assert_eq!(record.amount, 50.5);

        let session = service.session().await.unwrap();
        assert_eq!(session.public_balance, 1200.25);
        assert_eq!(session.shielded_balance, 5000.00);

        let last = service.console().entries().pop().unwrap();
        assert_eq!(last.level, LogLevel::Success);
    }

    #[tokio::test]
    async fn test_failing_step_is_logged_and_returned() {
        let (runner, service) = runner_with(
            MidnightSimulator::new(Network::Devnet, StageDelays::zero()).with_faults(
                FaultInjection {
                    fail_connect: true,
                    ..FaultInjection::default()
                },
            ),
        );

        let result = runner.run(ScriptKind::Smoke).await;
        assert!(matches!(result, Err(Error::Simulation(_))));

        let last = service.console().entries().pop().unwrap();
        assert_eq!(last.level, LogLevel::Error);
        assert!(last.message.starts_with("Test failed"));
    }
}
