//! In-memory wallet ledger
//!
//! Tracks the active session and the transfer history (most recent first).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::wallet::{Channel, TransferRecord, WalletSession};
use crate::{Error, Result};

/// Plain, single-owner wallet state
#[derive(Debug, Clone, Default, Serialize)]
pub struct WalletLedger {
    /// Active session, if connected
    pub session: Option<WalletSession>,
    /// Completed transfers, newest first
    pub history: Vec<TransferRecord>,
    /// Timestamp of last mutation
    pub updated_at: Option<DateTime<Utc>>,
}

impl WalletLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Replace the session wholesale (`None` disconnects). History is kept.
    pub fn set_session(&mut self, session: Option<WalletSession>) {
        self.session = session;
        self.touch();
    }

    /// Check that `amount` can be debited from `channel` without going negative
    pub fn check_debit(&self, channel: Channel, amount: f64) -> Result<()> {
        let session = self.session.as_ref().ok_or(Error::NotConnected)?;
        let available = session.balance(channel);
        if amount > available {
            return Err(Error::InsufficientBalance {
                channel: channel.to_string(),
                available,
                requested: amount,
            });
        }
        Ok(())
    }

    /// Record a completed transfer and debit the channel that funded it
    pub fn apply_transfer(&mut self, record: TransferRecord) -> Result<()> {
        self.check_debit(record.channel, record.amount)?;

        if let Some(session) = self.session.as_mut() {
            *session.balance_mut(record.channel) -= record.amount;
        }
        self.history.insert(0, record);
        self.touch();
        Ok(())
    }

    /// Overwrite one channel's balance (used when the simulated fetch is authoritative)
    pub fn set_balance(&mut self, channel: Channel, value: f64) -> Result<()> {
        let session = self.session.as_mut().ok_or(Error::NotConnected)?;
        *session.balance_mut(channel) = value;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
