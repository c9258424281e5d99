//! Transaction building and confirmation monitoring.
//!
//! # Responsibilities
//! - Build contract call requests under the configured gas ceiling
//! - Poll receipts with jittered exponential backoff
//! - Bound every confirmation wait with a deadline

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus};
use crate::resilience::backoff::calculate_backoff;

/// Transaction builder for contract calls.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    client: BlockchainClient,
}

impl TxBuilder {
    /// Create a new transaction builder.
    pub fn new(client: BlockchainClient) -> Self {
        Self { client }
    }

    /// Build a transaction request with a gas price check.
    ///
    /// Nonce and gas limit are left to the signing wallet.
    ///
    /// # Arguments
    /// * `to` - Destination address
    /// * `value` - Amount of native token to send
    /// * `data` - Call data
    pub async fn build(
        &self,
        to: Address,
        value: U256,
        data: Bytes,
    ) -> BlockchainResult<TransactionRequest> {
        let gas_price = self.client.get_gas_price().await?;
        let gas_price_gwei = gas_price / 1_000_000_000;

        let config = self.client.config();
        if gas_price_gwei > config.max_gas_price_gwei as u128 {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei: config.max_gas_price_gwei,
            });
        }

        // Apply multiplier for safety margin
        let adjusted_gas_price = (gas_price as f64 * config.gas_price_multiplier) as u128;

        let tx = TransactionRequest::default()
            .with_to(to)
            .with_value(value)
            .with_input(data)
            .with_gas_price(adjusted_gas_price)
            .with_chain_id(config.chain_id);

        Ok(tx)
    }

    /// Wait for a transaction to be confirmed.
    ///
    /// # Arguments
    /// * `tx_hash` - Transaction hash to monitor
    /// * `timeout_secs` - Maximum time to wait for confirmation
    pub async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        timeout_secs: u64,
    ) -> BlockchainResult<ConfirmationStatus> {
        let required_confirmations = self.client.confirmation_blocks();
        let config = self.client.config();
        let (base_ms, max_ms) = (config.poll_base_ms, config.poll_max_ms);

        let result = timeout(Duration::from_secs(timeout_secs), async {
            let mut attempt = 0u32;

            loop {
                attempt = attempt.saturating_add(1);
                sleep(calculate_backoff(attempt, base_ms, max_ms)).await;

                let receipt = match self.client.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, attempt, "Transaction pending");
                        continue;
                    }
                };

                let current_block = self.client.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);
                let status = evaluate_receipt(
                    receipt.status(),
                    tx_block,
                    current_block,
                    required_confirmations,
                );

                match status {
                    ConfirmationStatus::Confirming { current, required } => {
                        tracing::debug!(
                            tx_hash = %tx_hash,
                            confirmations = current,
                            required,
                            "Waiting for confirmations"
                        );
                    }
                    done => return Ok::<_, BlockchainError>(done),
                }
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(_) => Err(BlockchainError::ConfirmationTimeout(timeout_secs)),
        }
    }
}

/// Classify a mined receipt against the required confirmation depth.
///
/// The inclusion block counts as the first confirmation.
pub fn evaluate_receipt(
    succeeded: bool,
    tx_block: u64,
    current_block: u64,
    required: u32,
) -> ConfirmationStatus {
    if !succeeded {
        return ConfirmationStatus::Failed("Transaction reverted".to_string());
    }

    let confirmations = current_block.saturating_sub(tx_block).saturating_add(1);
    let confirmations = u32::try_from(confirmations).unwrap_or(u32::MAX);

    if confirmations >= required {
        ConfirmationStatus::Confirmed {
            block_number: tx_block,
        }
    } else {
        ConfirmationStatus::Confirming {
            current: confirmations,
            required,
        }
    }
}
