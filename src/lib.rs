//! Midnight Wallet Simulator
//!
//! A scripted stand-in for a Midnight privacy wallet:
//! - Connect, balance lookup, and transfers with staged, delayed progress
//! - Shielded transfers walk a proof-generation pipeline, public ones a signing step
//! - An in-memory session ledger with most-recent-first transfer history
//! - A console log, an optional JSONL audit trail, and canned scripts
//! - A developer assistant backed by a generative-language API
//!
//! # Simulation Model
//!
//! - No keys, proofs, or network calls are real; hashes are random
//! - At most one mutating wallet operation runs at a time per service
//! - Wallet state lives in memory and resets with the process

pub mod assistant;
pub mod audit;
pub mod config;
pub mod console;
pub mod scripts;
pub mod service;
pub mod session;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use config::{BalanceSource, Config, Network, StageDelays};
pub use console::{ConsoleLog, LogEntry, LogLevel};
pub use error::{Error, Result};
pub use scripts::{ScriptKind, ScriptRunner};
pub use service::WalletService;
pub use session::SessionStore;
