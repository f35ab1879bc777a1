//! Simulated Midnight network backend
//!
//! Every operation is a fixed, time-delayed script:
//! - `connect` returns the demo session after a short wait
//! - `get_balance` returns a per-channel constant and ignores the address
//! - `transfer` walks a fixed stage list and returns a successful record
//!
//! NOTE:
//! - No cryptography happens here; the proof hash is random
//! - No network I/O happens here; delays only model latency

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::progress::{ProgressEvent, ProgressObserver, PROGRESS_BUFFER};
use super::types::{TransferRecord, TransferRequest, TransferStatus, WalletSession};
use crate::config::{Config, FaultInjection, Network, StageDelays};
use crate::{Error, Result};

/// Demo unshielded address returned by `connect`
pub const DEMO_PUBLIC_ADDRESS: &str = "unshielded_midnight1q8y9u2...";
/// Demo shielded address returned by `connect`
pub const DEMO_SHIELDED_ADDRESS: &str = "shielded_mn1zxp9...";
/// Starting unshielded balance (DUST)
pub const DEMO_PUBLIC_BALANCE: f64 = 1250.75;
/// Starting shielded balance (DUST)
pub const DEMO_SHIELDED_BALANCE: f64 = 5000.00;

const TRANSFER_ID_LEN: usize = 8;

/// One step of the simulated transfer pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStage {
    Build,
    GenerateProof,
    AddNullifiers,
    Sign,
    Submit,
}

const SHIELDED_STAGES: [TransferStage; 4] = [
    TransferStage::Build,
    TransferStage::GenerateProof,
    TransferStage::AddNullifiers,
    TransferStage::Submit,
];

const UNSHIELDED_STAGES: [TransferStage; 3] = [
    TransferStage::Build,
    TransferStage::Sign,
    TransferStage::Submit,
];

impl TransferStage {
    /// Stage sequence for a channel, in execution order
    pub fn sequence(shielded: bool) -> &'static [TransferStage] {
        if shielded {
            &SHIELDED_STAGES
        } else {
            &UNSHIELDED_STAGES
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TransferStage::Build => "Building transaction components...",
            TransferStage::GenerateProof => "Generating ZK-Proof (Compact contract)...",
            TransferStage::AddNullifiers => "Proof generated. Adding nullifiers to state...",
            TransferStage::Sign => "Signing public transaction...",
            TransferStage::Submit => "Submitting to Midnight Devnet...",
        }
    }
}

/// Wallet operations as seen by the session layer
#[async_trait]
pub trait WalletBackend: Send + Sync {
    /// Open a session
    async fn connect(&self) -> Result<WalletSession>;

    /// Fetch the balance of one channel of `address`
    async fn get_balance(&self, address: &str, shielded: bool) -> Result<f64>;

    /// Execute a transfer, announcing each stage before it runs
    async fn transfer(
        &self,
        request: &TransferRequest,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<TransferRecord>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Scripted stand-in for a Midnight wallet client
pub struct MidnightSimulator {
    network: Network,
    delays: StageDelays,
    faults: FaultInjection,
    events: broadcast::Sender<ProgressEvent>,
}

impl MidnightSimulator {
    /// Create a simulator for a network with the given stage delays
    pub fn new(network: Network, delays: StageDelays) -> Self {
        let (events, _rx) = broadcast::channel(PROGRESS_BUFFER);
        Self {
            network,
            delays,
            faults: FaultInjection::default(),
            events,
        }
    }

    /// Create a simulator from the main config
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.network, config.delays.clone()).with_faults(config.faults.clone())
    }

    /// Enable deliberate failures
    pub fn with_faults(mut self, faults: FaultInjection) -> Self {
        if faults.is_active() {
            warn!(?faults, "Simulator fault injection enabled");
        }
        self.faults = faults;
        self
    }

    /// Stream of every stage announced by any transfer on this simulator
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.events.subscribe()
    }

    pub fn network(&self) -> Network {
        self.network
    }

    fn announce(&self, event: &ProgressEvent, observer: Option<&dyn ProgressObserver>) {
        if let Some(observer) = observer {
            observer.on_stage(event);
        }
        // No subscribers is fine; the stream is best-effort.
        let _ = self.events.send(event.clone());
    }
}

#[async_trait]
impl WalletBackend for MidnightSimulator {
    async fn connect(&self) -> Result<WalletSession> {
        sleep(self.delays.connect()).await;

        if self.faults.fail_connect {
            return Err(Error::Simulation("connect: injected failure".to_string()));
        }

        info!(network = %self.network, "Simulated wallet connected");
        Ok(WalletSession {
            public_address: DEMO_PUBLIC_ADDRESS.to_string(),
            shielded_address: DEMO_SHIELDED_ADDRESS.to_string(),
            public_balance: DEMO_PUBLIC_BALANCE,
            shielded_balance: DEMO_SHIELDED_BALANCE,
            network: self.network,
        })
    }

    async fn get_balance(&self, address: &str, shielded: bool) -> Result<f64> {
        sleep(self.delays.balance()).await;

        if self.faults.fail_balance {
            return Err(Error::Simulation("get_balance: injected failure".to_string()));
        }

        debug!(address = address, shielded = shielded, "Simulated balance lookup");
        Ok(if shielded {
            DEMO_SHIELDED_BALANCE
        } else {
            DEMO_PUBLIC_BALANCE
        })
    }

    async fn transfer(
        &self,
        request: &TransferRequest,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<TransferRecord> {
        let transfer_id = generate_transfer_id();
        let stages = TransferStage::sequence(request.shielded);

        info!(
            transfer_id = %transfer_id,
            to = %request.to,
            amount = request.amount,
            shielded = request.shielded,
            "Starting simulated transfer"
        );

        for (index, &stage) in stages.iter().enumerate() {
            let event = ProgressEvent::new(&transfer_id, stage, index, stages.len());
            self.announce(&event, observer);
            debug!(transfer_id = %transfer_id, ?stage, "{}", stage.description());

            if self.faults.fail_transfer_at == Some(stage) {
                warn!(transfer_id = %transfer_id, ?stage, "Injected transfer failure");
                return Err(Error::Simulation(format!(
                    "transfer {} failed during stage '{}'",
                    transfer_id,
                    stage.description()
                )));
            }

            sleep(self.delays.for_stage(stage)).await;
        }

        let record = TransferRecord {
            proof_hash: generate_proof_hash(&transfer_id, request),
            id: transfer_id,
            created_at: Utc::now(),
            channel: request.channel(),
            amount: request.amount,
            recipient: request.to.clone(),
            status: TransferStatus::Success,
        };

        info!(
            transfer_id = %record.id,
            proof_hash = %record.short_hash(),
            "Simulated transfer complete"
        );
        Ok(record)
    }

    fn name(&self) -> &'static str {
        "MidnightSimulator"
    }
}

/// Short random base-36 token
fn generate_transfer_id() -> String {
    let entropy = Uuid::new_v4().as_u128() as u64;
    encode_base36(entropy, TRANSFER_ID_LEN)
}

fn encode_base36(mut value: u64, len: usize) -> String {
    const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// `0x` + 64 lowercase hex digits. Random: the request only salts the digest.
fn generate_proof_hash(transfer_id: &str, request: &TransferRequest) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(transfer_id.as_bytes());
    hasher.update(request.from.as_bytes());
    hasher.update(request.to.as_bytes());
    hasher.update(&request.amount.to_le_bytes());
    format!("0x{}", hasher.finalize().to_hex())
}
