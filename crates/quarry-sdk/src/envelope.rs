// crates/quarry-sdk/src/envelope.rs
//
// TransactionEnvelope: unsigned instructions plus the signers they need.
//
// Envelopes from different wrappers can be combined into one transaction so
// that related updates land atomically. `send` signs and submits, returning a
// PendingTransaction; its `confirm` waits for finality with the SDK's
// timeout. A timeout does not mean the transaction failed: the receipt can
// still be confirmed later.

use std::sync::Arc;

use quarry_core::crypto::Keypair;
use quarry_core::error::QuarryError;
use quarry_core::events::ProgramEvent;
use quarry_core::transaction::{Instruction, Receipt, Transaction};
use quarry_ledger::Ledger;

use crate::sdk::QuarrySdk;

#[derive(Debug, Clone)]
pub struct TransactionEnvelope {
    sdk: QuarrySdk,
    instructions: Vec<Instruction>,
    /// Signers in addition to the SDK wallet.
    signers: Vec<Arc<Keypair>>,
}

impl TransactionEnvelope {
    pub fn new(sdk: QuarrySdk, instructions: Vec<Instruction>) -> Self {
        Self {
            sdk,
            instructions,
            signers: Vec::new(),
        }
    }

    fn has_signer(&self, signer: &Keypair) -> bool {
        let key = signer.pubkey();
        self.sdk.wallet_key() == key || self.signers.iter().any(|s| s.pubkey() == key)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Append `other`'s instructions and signers. The wallet of `self` pays.
    pub fn combine(mut self, other: TransactionEnvelope) -> Self {
        self.instructions.extend(other.instructions);
        let other_wallet = other.sdk.wallet();
        if !self.has_signer(other_wallet) {
            self.signers.push(Arc::clone(other_wallet));
        }
        for signer in other.signers {
            if !self.has_signer(&signer) {
                self.signers.push(signer);
            }
        }
        self
    }

    /// Sign with the wallet (fee payer) and every extra signer.
    pub fn build(&self) -> Result<Transaction, QuarryError> {
        let wallet = self.sdk.wallet();
        let mut signers: Vec<&Keypair> = vec![wallet.as_ref()];
        signers.extend(self.signers.iter().map(|s| s.as_ref()));
        Transaction::new_signed(self.instructions.clone(), &signers)
    }

    /// Sign and submit. Transient ledger errors are retried per `SdkConfig`.
    pub async fn send(&self) -> Result<PendingTransaction, QuarryError> {
        let tx = self.build()?;
        let retries = self.sdk.config().send_retries;
        let mut attempt = 0;
        loop {
            match self.sdk.ledger().submit(tx.clone()).await {
                Ok(receipt) => {
                    tracing::debug!(
                        "Sent transaction {} ({} instructions)",
                        receipt.id,
                        self.instructions.len()
                    );
                    return Ok(PendingTransaction {
                        ledger: Arc::clone(self.sdk.ledger()),
                        receipt,
                        timeout: self.sdk.config().confirm_timeout,
                    });
                }
                Err(e @ (QuarryError::Ledger(_) | QuarryError::Timeout(_))) if attempt < retries => {
                    attempt += 1;
                    tracing::warn!("Submit failed ({}), retry {} of {}", e, attempt, retries);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send and wait for confirmation.
    pub async fn confirm(&self) -> Result<ConfirmedTransaction, QuarryError> {
        self.send().await?.confirm().await
    }
}

/// A submitted transaction awaiting confirmation.
pub struct PendingTransaction {
    ledger: Arc<dyn Ledger>,
    receipt: Receipt,
    timeout: std::time::Duration,
}

impl PendingTransaction {
    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    /// Wait for finality. Program failures surface as the program's error.
    ///
    /// # Errors
    /// `Timeout` if the ledger does not answer in time; the receipt stays
    /// confirmable.
    pub async fn confirm(&self) -> Result<ConfirmedTransaction, QuarryError> {
        let confirmation = tokio::time::timeout(self.timeout, self.ledger.confirm(&self.receipt))
            .await
            .map_err(|_| {
                QuarryError::Timeout(format!(
                    "Transaction {} not confirmed within {:?}",
                    self.receipt.id, self.timeout
                ))
            })??;
        let (slot, events) = confirmation.into_result()?;
        tracing::info!("Confirmed transaction {} at slot {}", self.receipt.id, slot);
        Ok(ConfirmedTransaction {
            receipt: self.receipt.clone(),
            slot,
            events,
        })
    }
}

/// A transaction that landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedTransaction {
    pub receipt: Receipt,
    pub slot: u64,
    pub events: Vec<ProgramEvent>,
}
