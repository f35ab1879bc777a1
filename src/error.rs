//! Error types for the Midnight wallet simulator

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Wallet not connected")]
    NotConnected,

    #[error("Another wallet operation is already in flight")]
    Busy,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Insufficient {channel} balance: have {available} but need {requested}")]
    InsufficientBalance {
        channel: String,
        available: f64,
        requested: f64,
    },

    #[error("Simulated operation failed: {0}")]
    Simulation(String),

    #[error("Assistant error: {0}")]
    Assistant(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown script: {0}")]
    UnknownScript(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
