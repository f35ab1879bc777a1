//! Wallet session store
//!
//! Holds the single active session (or none) and the transfer history.
//! Mutated only in response to completed operations:
//! - `set_session` on connect / disconnect
//! - `apply_transfer` when a transfer completes (append + debit)
//!
//! State is in-memory only and resets with the process.

mod ledger;

pub use ledger::WalletLedger;

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::wallet::{Channel, TransferRecord, WalletSession};
use crate::Result;

/// Thread-safe handle to the wallet ledger
#[derive(Clone, Default)]
pub struct SessionStore {
    ledger: Arc<RwLock<WalletLedger>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session (snapshot)
    pub async fn session(&self) -> Option<WalletSession> {
        self.ledger.read().await.session.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.ledger.read().await.is_connected()
    }

    /// Replace the session; `None` disconnects
    pub async fn set_session(&self, session: Option<WalletSession>) {
        let mut ledger = self.ledger.write().await;
        ledger.set_session(session);
    }

    /// Validate a debit against the current balance
    pub async fn check_debit(&self, channel: Channel, amount: f64) -> Result<()> {
        self.ledger.read().await.check_debit(channel, amount)
    }

    /// Append a completed transfer and debit its channel
    pub async fn apply_transfer(&self, record: TransferRecord) -> Result<()> {
        let mut ledger = self.ledger.write().await;
        ledger.apply_transfer(record)
    }

    /// Overwrite one channel's balance
    pub async fn set_balance(&self, channel: Channel, value: f64) -> Result<()> {
        let mut ledger = self.ledger.write().await;
        ledger.set_balance(channel, value)
    }

    /// Get recent transfers, newest first
    pub async fn history(&self, limit: Option<usize>) -> Vec<TransferRecord> {
        let ledger = self.ledger.read().await;
        match limit {
            Some(n) => ledger.history.iter().take(n).cloned().collect(),
            None => ledger.history.clone(),
        }
    }
}
