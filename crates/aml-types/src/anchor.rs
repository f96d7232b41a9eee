use serde::{Deserialize, Serialize};

use crate::hash::BlockHash;
use crate::record::EvaluationRecord;

/// Lifecycle state of an external anchoring commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorStatus {
    /// Created locally, no submission attempted yet.
    Pending,
    /// Handed to the external network; awaiting reconciliation.
    Submitted,
    /// Reconciliation observed a matching entry on the external side.
    Confirmed,
    /// Retries exhausted. Kept for audit and manual re-submission.
    Failed,
}

/// Per-record external anchoring state.
///
/// Keyed by the record's `external_id` (the external write contract is
/// latest-write-wins on that key). Commitments are never deleted; a Failed
/// commitment stays visible until an operator or sweep re-submits it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorCommitment {
    /// The anchored record's external id.
    pub external_id: String,
    /// Hash of the local block containing the record.
    pub block_hash: BlockHash,
    /// Current lifecycle state.
    pub status: AnchorStatus,
    /// Total submission attempts so far.
    pub attempts: u32,
    /// Error from the most recent failed attempt, if any.
    pub last_error: Option<String>,
    /// Payload fields mirrored for re-submission.
    pub amount: u64,
    pub fraud_probability: u16,
    pub is_fraud: bool,
}

impl AnchorCommitment {
    /// A fresh Pending commitment for a record sealed into `block_hash`.
    pub fn pending(record: &EvaluationRecord, block_hash: BlockHash) -> Self {
        Self {
            external_id: record.external_id.clone(),
            block_hash,
            status: AnchorStatus::Pending,
            attempts: 0,
            last_error: None,
            amount: record.amount,
            fraud_probability: record.fraud_probability,
            is_fraud: record.is_fraud,
        }
    }

    /// Returns `true` if the commitment still needs network work.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, AnchorStatus::Confirmed | AnchorStatus::Failed)
    }
}

/// An evaluation as read back from the external anchoring network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchoredEvaluation {
    /// External-side write time, epoch milliseconds.
    pub timestamp: u64,
    pub amount: u64,
    pub fraud_probability: u16,
    pub is_fraud: bool,
}

impl AnchoredEvaluation {
    /// Returns `true` if the anchored payload matches a local commitment.
    pub fn matches(&self, commitment: &AnchorCommitment) -> bool {
        self.amount == commitment.amount
            && self.fraud_probability == commitment.fraud_probability
            && self.is_fraud == commitment.is_fraud
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn record() -> EvaluationRecord {
        EvaluationRecord {
            external_id: "tx-9".into(),
            amount: 42_000,
            fraud_probability: 9_100,
            is_fraud: true,
            rule_flags: BTreeSet::new(),
            submitted_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn pending_commitment_mirrors_record() {
        let c = AnchorCommitment::pending(&record(), BlockHash::new([5; 32]));
        assert_eq!(c.status, AnchorStatus::Pending);
        assert_eq!(c.attempts, 0);
        assert_eq!(c.external_id, "tx-9");
        assert_eq!(c.amount, 42_000);
        assert!(c.last_error.is_none());
        assert!(!c.is_settled());
    }

    #[test]
    fn settled_states() {
        let mut c = AnchorCommitment::pending(&record(), BlockHash::zero());
        c.status = AnchorStatus::Submitted;
        assert!(!c.is_settled());
        c.status = AnchorStatus::Confirmed;
        assert!(c.is_settled());
        c.status = AnchorStatus::Failed;
        assert!(c.is_settled());
    }

    #[test]
    fn anchored_evaluation_match() {
        let c = AnchorCommitment::pending(&record(), BlockHash::zero());
        let mut anchored = AnchoredEvaluation {
            timestamp: 1,
            amount: 42_000,
            fraud_probability: 9_100,
            is_fraud: true,
        };
        assert!(anchored.matches(&c));
        anchored.is_fraud = false;
        assert!(!anchored.matches(&c));
    }
}
