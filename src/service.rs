//! Wallet service
//!
//! Drives a [`WalletBackend`] and applies its results to the [`SessionStore`].
//! The service is the only caller that mutates the store, and it allows at
//! most one mutating operation (connect, refresh, transfer, disconnect) in
//! flight at a time; a concurrent call fails fast with [`Error::Busy`].

use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::audit::AuditLog;
use crate::config::{BalanceSource, Config};
use crate::console::ConsoleLog;
use crate::session::SessionStore;
use crate::wallet::{
    Channel, MidnightSimulator, ObserverSet, ProgressObserver, TransferRecord, TransferRequest,
    WalletBackend, WalletSession,
};
use crate::{Error, Result};

/// Coordinates the simulator, the session store, and the operation logs
pub struct WalletService {
    backend: Arc<dyn WalletBackend>,
    store: SessionStore,
    console: ConsoleLog,
    audit: Option<AuditLog>,
    balance_source: BalanceSource,
    in_flight: Mutex<()>,
}

impl WalletService {
    /// Create a service over any backend
    pub fn new(backend: Arc<dyn WalletBackend>, console: ConsoleLog) -> Self {
        Self {
            backend,
            store: SessionStore::new(),
            console,
            audit: None,
            balance_source: BalanceSource::default(),
            in_flight: Mutex::new(()),
        }
    }

    /// Build the simulator-backed service described by `config`
    pub fn from_config(config: &Config) -> Self {
        let backend = Arc::new(MidnightSimulator::from_config(config));
        let mut service = Self::new(backend, ConsoleLog::new(config.console_capacity))
            .with_balance_source(config.balance_source);
        if let Some(ref path) = config.audit_log_path {
            service = service.with_audit(AuditLog::new(path));
        }
        service
    }

    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_balance_source(mut self, source: BalanceSource) -> Self {
        self.balance_source = source;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn console(&self) -> &ConsoleLog {
        &self.console
    }

    pub fn backend(&self) -> &Arc<dyn WalletBackend> {
        &self.backend
    }

    /// Whether a mutating operation is currently in flight
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    pub async fn session(&self) -> Option<WalletSession> {
        self.store.session().await
    }

    pub async fn history(&self, limit: Option<usize>) -> Vec<TransferRecord> {
        self.store.history(limit).await
    }

    /// Connect and store the new session (replacing any previous one)
    pub async fn connect(&self) -> Result<WalletSession> {
        let _guard = self.in_flight.try_lock().map_err(|_| Error::Busy)?;
        let started = Instant::now();
        self.audit_start("connect", json!({ "backend": self.backend.name() }));
        self.console.info("Connecting to Midnight wallet...");

        let result = self.backend.connect().await;
        self.audit_complete("connect", json!({}), result.as_ref().err(), started);

        match result {
            Ok(session) => {
                self.store.set_session(Some(session.clone())).await;
                info!(
                    address = %session.public_address,
                    network = %session.network,
                    "Wallet session stored"
                );
                self.console.success(format!(
                    "Connected to Midnight {} as {}",
                    session.network, session.public_address
                ));
                Ok(session)
            }
            Err(e) => {
                self.console.error(format!("Connection failed: {}", e));
                Err(e)
            }
        }
    }

    /// Drop the active session. Transfer history is kept.
    pub async fn disconnect(&self) -> Result<()> {
        let _guard = self.in_flight.try_lock().map_err(|_| Error::Busy)?;
        if !self.store.is_connected().await {
            return Err(Error::NotConnected);
        }
        let started = Instant::now();
        self.audit_start("disconnect", json!({}));
        self.store.set_session(None).await;
        self.audit_complete("disconnect", json!({}), None, started);
        self.console.info("Wallet disconnected");
        Ok(())
    }

    /// Refresh balances according to the configured [`BalanceSource`]
    pub async fn refresh_balances(&self) -> Result<WalletSession> {
        let _guard = self.in_flight.try_lock().map_err(|_| Error::Busy)?;
        let session = self.store.session().await.ok_or(Error::NotConnected)?;

        match self.balance_source {
            BalanceSource::Ledger => {
                self.console.info(format!(
                    "Balances (local ledger): {} DUST shielded, {} DUST unshielded",
                    session.shielded_balance, session.public_balance
                ));
                Ok(session)
            }
            BalanceSource::Simulator => {
                let started = Instant::now();
                self.audit_start("refresh_balances", json!({}));
                let result = self.fetch_balances(&session).await;
                self.audit_complete("refresh_balances", json!({}), result.as_ref().err(), started);

                let (shielded, public) = match result {
                    Ok(balances) => balances,
                    Err(e) => {
                        self.console.error(format!("Balance refresh failed: {}", e));
                        return Err(e);
                    }
                };

                if shielded != session.shielded_balance || public != session.public_balance {
                    warn!(
                        ledger_shielded = session.shielded_balance,
                        ledger_public = session.public_balance,
                        fetched_shielded = shielded,
                        fetched_public = public,
                        "Fetched balances overwrite local ledger"
                    );
                    self.console
                        .warn("Fetched balances differ from local ledger; local debits discarded");
                }

                self.store.set_balance(Channel::Shielded, shielded).await?;
                self.store.set_balance(Channel::Unshielded, public).await?;
                self.console.info(format!(
                    "Balances (fetched): {} DUST shielded, {} DUST unshielded",
                    shielded, public
                ));
                self.store.session().await.ok_or(Error::NotConnected)
            }
        }
    }

    async fn fetch_balances(&self, session: &WalletSession) -> Result<(f64, f64)> {
        let shielded = self
            .backend
            .get_balance(&session.shielded_address, true)
            .await?;
        let public = self
            .backend
            .get_balance(&session.public_address, false)
            .await?;
        Ok((shielded, public))
    }

    /// Run a transfer from the active session and apply it on success
    ///
    /// Stage announcements go to the console, the audit log, and `observer`
    /// (if given), in that order. On any failure the session and the history
    /// are left untouched.
    pub async fn transfer(
        &self,
        to: &str,
        amount: f64,
        shielded: bool,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<TransferRecord> {
        let _guard = self.in_flight.try_lock().map_err(|_| Error::Busy)?;
        let session = self.store.session().await.ok_or(Error::NotConnected)?;

        let to = to.trim();
        if to.is_empty() {
            return Err(Error::InvalidArgument("recipient address is empty".to_string()));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "amount must be a positive number, got {}",
                amount
            )));
        }

        let channel = Channel::from_shielded(shielded);
        if let Err(e) = self.store.check_debit(channel, amount).await {
            self.console.error(format!("Transfer rejected: {}", e));
            return Err(e);
        }

        let from = if channel.is_shielded() {
            session.shielded_address.clone()
        } else {
            session.public_address.clone()
        };
        let request = TransferRequest::new(from, to, amount, shielded);
        let details = json!({
            "to": request.to,
            "amount": request.amount,
            "channel": channel,
        });

        let started = Instant::now();
        self.audit_start("transfer", details.clone());
        self.console.info(format!(
            "Initiating {} transfer of {} DUST to {}",
            channel.to_string().to_lowercase(),
            amount,
            request.to
        ));

        let mut observers = ObserverSet::new().with(&self.console);
        if let Some(ref audit) = self.audit {
            observers = observers.with(audit);
        }
        observers.push_optional(observer);

        let result = match self.backend.transfer(&request, Some(&observers)).await {
            Ok(record) => self
                .store
                .apply_transfer(record.clone())
                .await
                .map(|()| record),
            Err(e) => Err(e),
        };
        self.audit_complete("transfer", details, result.as_ref().err(), started);

        match result {
            Ok(record) => {
                self.console.success(format!(
                    "Transaction Success! Hash: {}",
                    record.proof_hash
                ));
                Ok(record)
            }
            Err(e) => {
                self.console.error(format!("Transfer failed: {}", e));
                Err(e)
            }
        }
    }

    fn audit_start(&self, operation: &str, details: serde_json::Value) {
        if let Some(ref audit) = self.audit {
            audit.record_start(operation, details);
        }
    }

    fn audit_complete(
        &self,
        operation: &str,
        details: serde_json::Value,
        error: Option<&Error>,
        started: Instant,
    ) {
        if let Some(ref audit) = self.audit {
            audit.record_complete(
                operation,
                details,
                error.map(|e| e.to_string()),
                started.elapsed().as_millis() as u64,
            );
        }
    }
}
