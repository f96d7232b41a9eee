use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use aml_types::{now_ms, AnchoredEvaluation};

use crate::error::{AnchorError, AnchorResult};

/// Write/read interface of the external anchoring network.
///
/// The external contract is keyed by `external_id` and is latest-write-wins:
/// a second `store_evaluation` for the same id overwrites the first. There is
/// no deletion.
#[async_trait]
pub trait AnchorNetwork: Send + Sync {
    async fn store_evaluation(
        &self,
        external_id: &str,
        amount: u64,
        fraud_probability: u16,
        is_fraud: bool,
    ) -> AnchorResult<()>;

    async fn get_evaluation(&self, external_id: &str) -> AnchorResult<Option<AnchoredEvaluation>>;
}

/// In-process anchoring network backed by a map.
///
/// Used as the default network in tests and single-node deployments. Supports
/// failure injection so publisher retry behavior can be exercised.
#[derive(Default)]
pub struct MemoryAnchorNetwork {
    entries: Mutex<HashMap<String, AnchoredEvaluation>>,
    // Number of upcoming store_evaluation calls that should fail.
    fail_next: AtomicU32,
}

impl MemoryAnchorNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` store attempts fail with a network error.
    pub fn fail_next(&self, n: u32) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AnchorNetwork for MemoryAnchorNetwork {
    async fn store_evaluation(
        &self,
        external_id: &str,
        amount: u64,
        fraud_probability: u16,
        is_fraud: bool,
    ) -> AnchorResult<()> {
        if self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(AnchorError::Network("injected failure".into()));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AnchorError::Network("entry map lock poisoned".into()))?;
        entries.insert(
            external_id.to_owned(),
            AnchoredEvaluation {
                timestamp: now_ms(),
                amount,
                fraud_probability,
                is_fraud,
            },
        );
        Ok(())
    }

    async fn get_evaluation(&self, external_id: &str) -> AnchorResult<Option<AnchoredEvaluation>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AnchorError::Network("entry map lock poisoned".into()))?;
        Ok(entries.get(external_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_overwrites_by_external_id() {
        let net = MemoryAnchorNetwork::new();
        net.store_evaluation("tx-1", 100, 500, false).await.unwrap();
        net.store_evaluation("tx-1", 100, 9_500, true).await.unwrap();

        assert_eq!(net.len(), 1);
        let read = net.get_evaluation("tx-1").await.unwrap().unwrap();
        assert_eq!(read.fraud_probability, 9_500);
        assert!(read.is_fraud);
    }

    #[tokio::test]
    async fn missing_key_reads_none() {
        let net = MemoryAnchorNetwork::new();
        assert!(net.get_evaluation("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let net = MemoryAnchorNetwork::new();
        net.fail_next(2);
        assert!(net.store_evaluation("a", 1, 1, false).await.is_err());
        assert!(net.store_evaluation("a", 1, 1, false).await.is_err());
        assert!(net.store_evaluation("a", 1, 1, false).await.is_ok());
    }
}
