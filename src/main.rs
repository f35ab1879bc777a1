//! Midnight Wallet CLI
//!
//! Command-line front-end for the simulated Midnight wallet.

use clap::{Parser, Subcommand};
use midnight_wallet_sim::assistant::{AssistantClient, GeminiClient};
use midnight_wallet_sim::config::AssistantConfig;
use midnight_wallet_sim::wallet::{ProgressEvent, WalletBackend};
use midnight_wallet_sim::{
    Config, Result, ScriptKind, ScriptRunner, StageDelays, WalletService,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "midnight-wallet")]
#[command(about = "Simulated Midnight privacy wallet")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip all simulated delays
    #[arg(long, global = true)]
    fast: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect and show the demo session
    Connect,

    /// Connect and show balances
    Balance,

    /// Connect and send a transfer
    Transfer {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Amount in DUST
        #[arg(long)]
        amount: f64,

        /// Use the public (unshielded) channel instead of the shielded one
        #[arg(long)]
        public: bool,
    },

    /// Run a canned script (balance, transfer_shielded, compact_sim, smoke)
    Script {
        /// Script id or label
        name: String,
    },

    /// List available scripts
    Scripts,

    /// Ask the Midnight developer assistant
    Ask {
        /// Question text
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Load config
    let mut config = match cli.config {
        Some(ref path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if cli.fast {
        config.delays = StageDelays::zero();
    }

    match cli.command {
        Commands::Connect => run_connect(&config).await?,
        Commands::Balance => run_balance(&config).await?,
        Commands::Transfer { to, amount, public } => {
            run_transfer(&config, &to, amount, !public).await?;
        }
        Commands::Script { name } => run_script(&config, &name).await?,
        Commands::Scripts => {
            for kind in ScriptKind::all() {
                println!("{:<18} {}", kind.id(), kind.label());
            }
        }
        Commands::Ask { question } => run_ask(&config, &question.join(" ")).await?,
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

async fn run_connect(config: &Config) -> Result<()> {
    let service = WalletService::from_config(config);
    tracing::info!(backend = service.backend().name(), network = %config.network, "Connecting");
    let session = service.connect().await?;
    println!("{}", serde_json::to_string_pretty(&session)?);
    Ok(())
}

async fn run_balance(config: &Config) -> Result<()> {
    let service = WalletService::from_config(config);
    service.connect().await?;
    let session = service.refresh_balances().await?;
    println!("Shielded balance:   {} DUST", session.shielded_balance);
    println!("Unshielded balance: {} DUST", session.public_balance);
    Ok(())
}

async fn run_transfer(config: &Config, to: &str, amount: f64, shielded: bool) -> Result<()> {
    let service = WalletService::from_config(config);
    service.connect().await?;

    let progress = |event: &ProgressEvent| {
        println!("  [{}/{}] {}", event.index + 1, event.total, event.message);
        if event.is_last() {
            println!("  Awaiting confirmation...");
        }
    };
    let record = service.transfer(to, amount, shielded, Some(&progress)).await?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    if let Some(session) = service.session().await {
        println!(
            "Balances now: {} DUST shielded, {} DUST unshielded",
            session.shielded_balance, session.public_balance
        );
    }
    Ok(())
}

async fn run_script(config: &Config, name: &str) -> Result<()> {
    let kind: ScriptKind = name.parse()?;
    let service = Arc::new(WalletService::from_config(config));
    let runner = ScriptRunner::new(Arc::clone(&service), config.delays.script_step());

    let result = runner.run(kind).await;
    for entry in service.console().entries() {
        println!("{}", entry);
    }

    let report = result?;
    tracing::info!(
        script = %report.script,
        duration_ms = report.duration_ms,
        "Script finished"
    );
    Ok(())
}

async fn run_ask(config: &Config, question: &str) -> Result<()> {
    let assistant_config = AssistantConfig::from_env(&config.assistant)?;
    let client = GeminiClient::new(assistant_config)?;

    tracing::info!(client = client.name(), "Asking developer assistant");
    match client.ask(question).await {
        Ok(answer) => {
            println!("{}", answer);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: Failed to fetch response from assistant.");
            Err(e)
        }
    }
}
