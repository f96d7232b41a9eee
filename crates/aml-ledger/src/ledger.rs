use std::sync::Arc;

use aml_crypto::SigningKey;
use aml_store::ChainStore;
use aml_types::{Block, EvaluationRecord};
use tracing::info;

use crate::error::LedgerError;
use crate::seal::{BlockSealer, SealerConfig};
use crate::validation::ChainValidator;

/// How much of the persisted chain is re-validated on open.
#[derive(Clone, Debug, Default)]
pub struct RecoveryConfig {
    /// Validate only the last K blocks; `None` validates the full chain.
    pub tail_blocks: Option<u64>,
}

/// The assembled ledger: store, sealer, and validator behind one handle.
///
/// Opening re-validates the persisted tail before any new append is
/// accepted. A validation failure here is fatal and surfaced to the
/// operator — the chain is never silently truncated or repaired.
pub struct Ledger {
    store: Arc<dyn ChainStore>,
    sealer: BlockSealer,
    validator: ChainValidator,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger").finish_non_exhaustive()
    }
}

impl Ledger {
    pub fn open(
        store: Arc<dyn ChainStore>,
        signing_key: SigningKey,
        sealer_config: SealerConfig,
        recovery: RecoveryConfig,
    ) -> Result<Self, LedgerError> {
        let validator = ChainValidator::new(signing_key.verifying_key());

        let len = store.len()?;
        if len > 0 {
            let start = recovery
                .tail_blocks
                .map_or(0, |k| len.saturating_sub(k));
            validator.validate_range(store.as_ref(), start, len - 1)?;
            info!(blocks = len, validated_from = start, "ledger recovered");
        }

        let sealer = BlockSealer::new(store.clone(), signing_key, sealer_config);
        Ok(Self {
            store,
            sealer,
            validator,
        })
    }

    /// Queue a record for sealing; see [`BlockSealer::submit`].
    pub fn submit(&self, record: EvaluationRecord) -> Result<Option<Block>, LedgerError> {
        self.sealer.submit(record)
    }

    /// Seal whatever is pending immediately.
    pub fn flush(&self) -> Result<Option<Block>, LedgerError> {
        self.sealer.flush()
    }

    /// Seal the pending batch if the time threshold elapsed.
    pub fn seal_if_due(&self) -> Result<Option<Block>, LedgerError> {
        self.sealer.seal_if_due()
    }

    /// Validate the full stored chain.
    pub fn validate(&self) -> Result<(), LedgerError> {
        self.validator.validate_chain(self.store.as_ref())
    }

    /// Shared read handle; queries run concurrently with appends.
    pub fn reader(&self) -> Arc<dyn ChainStore> {
        self.store.clone()
    }

    pub fn validator(&self) -> &ChainValidator {
        &self.validator
    }

    pub fn sealer(&self) -> &BlockSealer {
        &self.sealer
    }
}
