//! Simulated Midnight wallet
//!
//! This module holds the wallet-facing contract: the session and transfer
//! records, the staged transfer pipeline, and its progress side-channel.
//! Nothing here touches real keys or a real network.

mod progress;
mod simulator;
mod types;

pub use progress::{ObserverSet, ProgressEvent, ProgressObserver};
pub use simulator::{
    MidnightSimulator, TransferStage, WalletBackend, DEMO_PUBLIC_ADDRESS, DEMO_PUBLIC_BALANCE,
    DEMO_SHIELDED_ADDRESS, DEMO_SHIELDED_BALANCE,
};
pub use types::{Channel, TransferRecord, TransferRequest, TransferStatus, WalletSession};
