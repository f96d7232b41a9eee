use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aml_types::{AnchorCommitment, AnchorStatus, Block};
use tracing::{debug, info, warn};

use crate::error::{AnchorError, AnchorResult};
use crate::network::AnchorNetwork;

/// Retry and timeout policy for anchoring attempts.
#[derive(Clone, Debug)]
pub struct PublisherConfig {
    /// Attempts per record before the commitment is marked Failed.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub initial_backoff: Duration,
    /// Upper bound on a single network call.
    pub attempt_timeout: Duration,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            attempt_timeout: Duration::from_secs(5),
        }
    }
}

/// Outcome of a [`AnchorPublisher::reconcile`] sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Submitted commitments whose external entry matched.
    pub confirmed: usize,
    /// Submitted commitments that were missing or diverged and got re-anchored.
    pub resubmitted: usize,
}

/// Pushes sealed records to the external anchoring network, best effort.
///
/// Anchoring never blocks or fails sealing: the chain is the source of truth
/// and the external side is a secondary commitment. Each record gets one
/// commitment keyed by `external_id`; the external write contract is
/// latest-write-wins on that key, so re-anchoring is always safe.
pub struct AnchorPublisher {
    network: Arc<dyn AnchorNetwork>,
    config: PublisherConfig,
    commitments: Mutex<HashMap<String, AnchorCommitment>>,
}

impl AnchorPublisher {
    pub fn new(network: Arc<dyn AnchorNetwork>, config: PublisherConfig) -> Self {
        Self {
            network,
            config,
            commitments: Mutex::new(HashMap::new()),
        }
    }

    /// Anchor every record of a sealed block.
    ///
    /// Creates a Pending commitment per record, then drives each through the
    /// retry loop. Returns the number of records that reached Submitted;
    /// exhausted records are left as Failed commitments, never dropped.
    pub async fn submit(&self, block: &Block) -> usize {
        let ids: Vec<String> = {
            let mut map = match self.commitments.lock() {
                Ok(map) => map,
                Err(poisoned) => poisoned.into_inner(),
            };
            block
                .records
                .iter()
                .map(|record| {
                    let commitment = AnchorCommitment::pending(record, block.hash);
                    map.insert(record.external_id.clone(), commitment);
                    record.external_id.clone()
                })
                .collect()
        };

        let mut submitted = 0;
        for id in &ids {
            if self.drive(id).await {
                submitted += 1;
            }
        }
        info!(
            block_index = block.index,
            records = ids.len(),
            submitted,
            "anchoring pass complete"
        );
        submitted
    }

    /// Compare every Submitted commitment against the external network.
    ///
    /// Matching entries become Confirmed. Missing or diverged entries are
    /// re-anchored and stay Submitted until a later sweep confirms them.
    pub async fn reconcile(&self) -> ReconcileReport {
        let submitted: Vec<AnchorCommitment> = self
            .snapshot()
            .into_iter()
            .filter(|c| c.status == AnchorStatus::Submitted)
            .collect();

        let mut report = ReconcileReport::default();
        for commitment in submitted {
            match self.network.get_evaluation(&commitment.external_id).await {
                Ok(Some(anchored)) if anchored.matches(&commitment) => {
                    self.update(&commitment.external_id, |c| {
                        c.status = AnchorStatus::Confirmed;
                        c.last_error = None;
                    });
                    report.confirmed += 1;
                }
                Ok(other) => {
                    warn!(
                        external_id = %commitment.external_id,
                        found = other.is_some(),
                        "anchored entry missing or diverged, re-anchoring"
                    );
                    self.update(&commitment.external_id, |c| {
                        c.status = AnchorStatus::Pending;
                    });
                    self.drive(&commitment.external_id).await;
                    report.resubmitted += 1;
                }
                Err(err) => {
                    warn!(
                        external_id = %commitment.external_id,
                        error = %err,
                        "reconciliation read failed, leaving commitment Submitted"
                    );
                }
            }
        }
        report
    }

    /// Re-drive every Failed commitment with a fresh attempt budget.
    pub async fn resubmit_failed(&self) -> usize {
        let failed: Vec<String> = self
            .snapshot()
            .into_iter()
            .filter(|c| c.status == AnchorStatus::Failed)
            .map(|c| c.external_id)
            .collect();

        let mut submitted = 0;
        for id in &failed {
            self.update(id, |c| {
                c.status = AnchorStatus::Pending;
                c.attempts = 0;
            });
            if self.drive(id).await {
                submitted += 1;
            }
        }
        submitted
    }

    pub fn commitment(&self, external_id: &str) -> Option<AnchorCommitment> {
        match self.commitments.lock() {
            Ok(map) => map.get(external_id).cloned(),
            Err(poisoned) => poisoned.into_inner().get(external_id).cloned(),
        }
    }

    /// All commitments, settled or not.
    pub fn snapshot(&self) -> Vec<AnchorCommitment> {
        match self.commitments.lock() {
            Ok(map) => map.values().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().values().cloned().collect(),
        }
    }

    /// Commitments that still need network work.
    pub fn unsettled(&self) -> Vec<AnchorCommitment> {
        self.snapshot()
            .into_iter()
            .filter(|c| !c.is_settled())
            .collect()
    }

    // Retry loop for one commitment. Returns true on Submitted.
    async fn drive(&self, external_id: &str) -> bool {
        let Some(commitment) = self.commitment(external_id) else {
            return false;
        };
        let mut backoff = self.config.initial_backoff;
        for attempt in 1..=self.config.max_attempts {
            self.update(external_id, |c| c.attempts += 1);
            match self.attempt(&commitment).await {
                Ok(()) => {
                    debug!(external_id, attempt, "record anchored");
                    self.update(external_id, |c| {
                        c.status = AnchorStatus::Submitted;
                        c.last_error = None;
                    });
                    return true;
                }
                Err(err) => {
                    warn!(external_id, attempt, error = %err, "anchoring attempt failed");
                    self.update(external_id, |c| c.last_error = Some(err.to_string()));
                }
            }
            if attempt < self.config.max_attempts {
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
        }
        warn!(
            external_id,
            attempts = self.config.max_attempts,
            "anchoring attempts exhausted, commitment marked Failed"
        );
        self.update(external_id, |c| c.status = AnchorStatus::Failed);
        false
    }

    async fn attempt(&self, commitment: &AnchorCommitment) -> AnchorResult<()> {
        let write = self.network.store_evaluation(
            &commitment.external_id,
            commitment.amount,
            commitment.fraud_probability,
            commitment.is_fraud,
        );
        match tokio::time::timeout(self.config.attempt_timeout, write).await {
            Ok(result) => result,
            Err(_) => Err(AnchorError::Timeout(self.config.attempt_timeout)),
        }
    }

    fn update(&self, external_id: &str, apply: impl FnOnce(&mut AnchorCommitment)) {
        let mut map = match self.commitments.lock() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(commitment) = map.get_mut(external_id) {
            apply(commitment);
        }
    }
}
