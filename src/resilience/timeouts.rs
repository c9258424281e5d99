//! Deadlines for calls that wait on a user or the chain.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// The wrapped operation did not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineExceeded {
    pub secs: u64,
}

/// Run `fut`, giving up after `secs` seconds.
pub async fn with_deadline<F, T>(secs: u64, fut: F) -> Result<T, DeadlineExceeded>
where
    F: Future<Output = T>,
{
    timeout(Duration::from_secs(secs), fut)
        .await
        .map_err(|_| DeadlineExceeded { secs })
}
