//! Scoped `PolicyCreated` event subscriptions.
//!
//! A [`PolicySubscription`] owns both ends of its event source: dropping it
//! closes the channel and aborts the log watcher task, so nothing outlives
//! the purchase that opened it.

use alloy::primitives::Address;
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use crate::blockchain::abi::PolicyCreated;
use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::PolicyCreatedEvent;

/// Buffered events per subscription.
const SUBSCRIPTION_CAPACITY: usize = 8;

/// Receiving end of a `PolicyCreated` event stream.
#[derive(Debug)]
pub struct PolicySubscription {
    events: mpsc::Receiver<PolicyCreatedEvent>,
    watcher: Option<JoinHandle<()>>,
}

impl PolicySubscription {
    /// Wrap a channel fed by an external source.
    pub fn from_channel(events: mpsc::Receiver<PolicyCreatedEvent>) -> Self {
        Self {
            events,
            watcher: None,
        }
    }

    /// Create a bounded channel and the subscription reading from it.
    pub fn channel() -> (mpsc::Sender<PolicyCreatedEvent>, Self) {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        (tx, Self::from_channel(rx))
    }

    /// Wait up to `wait` for the next event.
    ///
    /// Returns `None` on timeout or when the source has gone away.
    pub async fn next_event(&mut self, wait: Duration) -> Option<PolicyCreatedEvent> {
        timeout(wait, self.events.recv()).await.ok().flatten()
    }

    /// Whether a background watcher task is attached.
    pub fn has_watcher(&self) -> bool {
        self.watcher.is_some()
    }
}

impl Drop for PolicySubscription {
    fn drop(&mut self) {
        self.events.close();
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
            tracing::debug!("PolicyCreated watcher released");
        }
    }
}

/// Decode a raw log into a `PolicyCreated` event, if it is one.
pub fn decode_policy_created(log: &Log) -> Option<PolicyCreatedEvent> {
    let decoded = log.log_decode::<PolicyCreated>().ok()?;
    let event = &decoded.inner.data;

    Some(PolicyCreatedEvent {
        policy_id: event.policyId,
        holder: event.policyHolder,
        premium: event.premium,
        coverage: event.coverage,
        policy_type: event.policyType,
        tx_hash: log.transaction_hash,
        block_number: log.block_number,
    })
}

/// Start polling `contract` for `PolicyCreated` logs addressed to `holder`.
///
/// Logs are read from `from_block` onward. The watcher stops by itself once
/// the subscription is dropped.
pub fn watch_policy_created(
    client: BlockchainClient,
    contract: Address,
    holder: Address,
    from_block: u64,
    poll_interval: Duration,
) -> PolicySubscription {
    let (tx, mut subscription) = PolicySubscription::channel();

    let watcher = tokio::spawn(async move {
        let mut next_block = from_block;

        while !tx.is_closed() {
            sleep(poll_interval).await;

            let current_block = match client.get_block_number().await {
                Ok(block) => block,
                Err(e) => {
                    tracing::warn!(error = %e, "PolicyCreated watcher could not read block number");
                    continue;
                }
            };
            if current_block < next_block {
                continue;
            }

            let filter = Filter::new()
                .address(contract)
                .from_block(next_block)
                .to_block(current_block)
                .event_signature(PolicyCreated::SIGNATURE_HASH)
                .topic2(holder.into_word());

            let logs = match client.get_logs(&filter).await {
                Ok(logs) => logs,
                Err(e) => {
                    tracing::warn!(error = %e, "PolicyCreated watcher failed to fetch logs");
                    continue;
                }
            };

            for event in logs.iter().filter_map(decode_policy_created) {
                if event.holder != holder {
                    continue;
                }
                if tx.send(event).await.is_err() {
                    return;
                }
            }

            next_block = current_block + 1;
        }
    });

    subscription.watcher = Some(watcher);
    subscription
}
