//! Session and transfer records shared by the simulator and the session store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Network;

/// An active wallet connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSession {
    /// Unshielded (public) address
    pub public_address: String,
    /// Shielded address
    pub shielded_address: String,
    /// Unshielded balance (DUST)
    pub public_balance: f64,
    /// Shielded balance (DUST)
    pub shielded_balance: f64,
    /// Network the session is attached to
    pub network: Network,
}

impl WalletSession {
    /// Balance of the channel that funds a transfer
    pub fn balance(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Shielded => self.shielded_balance,
            Channel::Unshielded => self.public_balance,
        }
    }

    pub(crate) fn balance_mut(&mut self, channel: Channel) -> &mut f64 {
        match channel {
            Channel::Shielded => &mut self.shielded_balance,
            Channel::Unshielded => &mut self.public_balance,
        }
    }
}

/// Which side of the wallet funds a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Shielded,
    Unshielded,
}

impl Channel {
    pub fn from_shielded(shielded: bool) -> Self {
        if shielded {
            Channel::Shielded
        } else {
            Channel::Unshielded
        }
    }

    pub fn is_shielded(&self) -> bool {
        matches!(self, Channel::Shielded)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Shielded => f.write_str("Shielded"),
            Channel::Unshielded => f.write_str("Unshielded"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    Pending,
    Success,
    Failed,
}

/// A completed transfer. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Short random base-36 token
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub channel: Channel,
    pub amount: f64,
    pub recipient: String,
    pub status: TransferStatus,
    /// `0x` followed by 64 lowercase hex digits
    pub proof_hash: String,
}

impl TransferRecord {
    /// First 16 characters of the proof hash, as shown in activity lists
    pub fn short_hash(&self) -> &str {
        self.proof_hash.get(..16).unwrap_or(&self.proof_hash)
    }
}

/// Input for a transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub shielded: bool,
}

impl TransferRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: f64, shielded: bool) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            shielded,
        }
    }

    pub fn channel(&self) -> Channel {
        Channel::from_shielded(self.shielded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_from_flag() {
        assert_eq!(Channel::from_shielded(true), Channel::Shielded);
        assert_eq!(Channel::from_shielded(false), Channel::Unshielded);
        assert!(Channel::Shielded.is_shielded());
        assert_eq!(Channel::Unshielded.to_string(), "Unshielded");
    }

    #[test]
    fn test_session_balance_by_channel() {
        let mut session = WalletSession {
            public_address: "pub".to_string(),
            shielded_address: "shd".to_string(),
            public_balance: 10.0,
            shielded_balance: 20.0,
            network: Network::Devnet,
        };
        assert_eq!(session.balance(Channel::Unshielded), 10.0);
        assert_eq!(session.balance(Channel::Shielded), 20.0);

        *session.balance_mut(Channel::Shielded) -= 5.0;
        assert_eq!(session.shielded_balance, 15.0);
        assert_eq!(session.public_balance, 10.0);
    }

    #[test]
    fn test_record_serializes_channel_names() {
        let record = TransferRecord {
            id: "k3j2h1".to_string(),
            created_at: Utc::now(),
            channel: Channel::Shielded,
            amount: 10.0,
            recipient: "midnight1abc".to_string(),
            status: TransferStatus::Success,
            proof_hash: format!("0x{}", "ab".repeat(32)),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["channel"], "Shielded");
        assert_eq!(json["status"], "Success");
        assert_eq!(record.short_hash(), "0xababababababab");
    }

    #[test]
    fn test_short_hash_of_deserialized_record() {
        let mut json = serde_json::json!({
            "id": "k3j2h1",
            "created_at": "2024-01-01T00:00:00Z",
            "channel": "Unshielded",
            "amount": 1.0,
            "recipient": "midnight1abc",
            "status": "Success",
            "proof_hash": "0x1234567890123\u{e9}ff"
        });
        // Byte 16 falls inside the two-byte character
        let record: TransferRecord = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(record.short_hash(), record.proof_hash);

        json["proof_hash"] = serde_json::json!("0xabc");
        let record: TransferRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.short_hash(), "0xabc");
    }
}
