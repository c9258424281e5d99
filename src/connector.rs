//! Wallet connection.
//!
//! One `request_accounts` round trip, bounded by a deadline; the first
//! account becomes the session's active account.

use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::WalletProvider;
use crate::observability::metrics;
use crate::resilience::with_deadline;
use crate::session::{Account, Session};

/// Why a wallet connection attempt failed.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// No wallet is available in this environment.
    #[error("No Ethereum wallet found. Configure a wallet key to continue.")]
    NoProviderFound,

    /// The user declined or the wallet reported an error.
    #[error("Failed to connect wallet: {0}")]
    RequestRejectedOrFailed(String),

    /// The wallet did not answer in time.
    #[error("Wallet did not respond within {0} seconds")]
    TimedOut(u64),
}

impl ConnectionError {
    /// Whether asking again could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ConnectionError::NoProviderFound)
    }
}

/// Requests account access from the configured wallet provider.
pub struct WalletConnector {
    provider: Option<Arc<dyn WalletProvider>>,
    request_timeout_secs: u64,
}

impl WalletConnector {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, request_timeout_secs: u64) -> Self {
        Self {
            provider,
            request_timeout_secs,
        }
    }

    /// Connect and store the active account in `session`.
    ///
    /// On failure the session keeps whatever account it already had.
    pub async fn connect(&self, session: &Session) -> Result<Account, ConnectionError> {
        let result = self.request_account().await;

        match &result {
            Ok(account) => {
                session.set_account(*account);
                metrics::record_wallet_connect("connected");
                tracing::info!(account = %account, "Wallet connected");
            }
            Err(e) => {
                metrics::record_wallet_connect(match e {
                    ConnectionError::NoProviderFound => "no_provider",
                    ConnectionError::RequestRejectedOrFailed(_) => "rejected",
                    ConnectionError::TimedOut(_) => "timed_out",
                });
                tracing::warn!(error = %e, "Wallet connection failed");
            }
        }

        result
    }

    /// Forget the connected account.
    pub fn disconnect(&self, session: &Session) {
        if let Some(account) = session.account() {
            tracing::info!(account = %account, "Wallet disconnected");
        }
        session.disconnect();
    }

    async fn request_account(&self) -> Result<Account, ConnectionError> {
        let provider = self.provider.as_ref().ok_or(ConnectionError::NoProviderFound)?;

        let accounts = with_deadline(self.request_timeout_secs, provider.request_accounts())
            .await
            .map_err(|e| ConnectionError::TimedOut(e.secs))?
            .map_err(|e| ConnectionError::RequestRejectedOrFailed(e.to_string()))?;

        accounts
            .first()
            .copied()
            .map(Account::from)
            .ok_or_else(|| ConnectionError::RequestRejectedOrFailed("wallet returned no accounts".to_string()))
    }
}

impl std::fmt::Debug for WalletConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConnector")
            .field("has_provider", &self.provider.is_some())
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
