use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Fixed-point scale for fraud probabilities: 10000 represents 1.0000.
///
/// Probabilities are integers so that record hashing is deterministic across
/// platforms; floating point never enters the hashed field set.
pub const PROBABILITY_SCALE: u16 = 10_000;

/// One scored transaction, as produced by the fraud-scoring collaborator.
///
/// Immutable once produced: the sealer consumes a record exactly once and
/// embeds it read-only inside a block. `rule_flags` is a `BTreeSet` so the
/// serialized (and therefore hashed) flag order is deterministic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Unique id per logical transaction; the external anchoring key.
    pub external_id: String,
    /// Transaction amount in fixed-point minor units.
    pub amount: u64,
    /// Fraud probability in `0..=10000` (10^-4 fixed point).
    pub fraud_probability: u16,
    /// Whether the scoring collaborator flagged the transaction as fraud.
    pub is_fraud: bool,
    /// Heuristic rule flags raised during evaluation. May be empty.
    pub rule_flags: BTreeSet<String>,
    /// Submission time, epoch milliseconds.
    pub submitted_at: u64,
}

impl EvaluationRecord {
    /// Check structural validity. Malformed records must never be sealed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.external_id.is_empty() {
            return Err(ValidationError::EmptyExternalId);
        }
        if self.fraud_probability > PROBABILITY_SCALE {
            return Err(ValidationError::ProbabilityOutOfRange {
                value: self.fraud_probability,
            });
        }
        if self.rule_flags.iter().any(|flag| flag.is_empty()) {
            return Err(ValidationError::EmptyRuleFlag);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> EvaluationRecord {
        EvaluationRecord {
            external_id: "tx-1".into(),
            amount: 10_000,
            fraud_probability: 8_200,
            is_fraud: true,
            rule_flags: BTreeSet::from(["high_amount".to_string()]),
            submitted_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn valid_record_passes() {
        assert!(record().validate().is_ok());
    }

    #[test]
    fn empty_external_id_rejected() {
        let mut r = record();
        r.external_id.clear();
        assert_eq!(r.validate(), Err(ValidationError::EmptyExternalId));
    }

    #[test]
    fn probability_above_scale_rejected() {
        let mut r = record();
        r.fraud_probability = PROBABILITY_SCALE + 1;
        assert_eq!(
            r.validate(),
            Err(ValidationError::ProbabilityOutOfRange { value: 10_001 })
        );
    }

    #[test]
    fn probability_at_scale_allowed() {
        let mut r = record();
        r.fraud_probability = PROBABILITY_SCALE;
        assert!(r.validate().is_ok());
    }

    #[test]
    fn empty_rule_flag_rejected() {
        let mut r = record();
        r.rule_flags.insert(String::new());
        assert_eq!(r.validate(), Err(ValidationError::EmptyRuleFlag));
    }

    #[test]
    fn flag_order_is_deterministic_in_json() {
        let mut r = record();
        r.rule_flags.insert("cross_border".into());
        r.rule_flags.insert("fast_transfer".into());
        let a = serde_json::to_string(&r).unwrap();
        let b = serde_json::to_string(&r).unwrap();
        assert_eq!(a, b);
        // BTreeSet serializes in lexicographic order.
        assert!(a.find("cross_border").unwrap() < a.find("fast_transfer").unwrap());
    }

    #[test]
    fn serde_roundtrip() {
        let r = record();
        let json = serde_json::to_string(&r).unwrap();
        let parsed: EvaluationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(r, parsed);
    }
}
