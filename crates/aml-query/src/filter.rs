use aml_types::EvaluationRecord;
use serde::{Deserialize, Serialize};

/// Record-level predicate for reporting reads.
///
/// Every field is optional; an unset field matches everything, so the
/// default filter selects the whole chain. Time bounds are inclusive and
/// compare against `submitted_at` (epoch milliseconds).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RecordFilter {
    pub is_fraud: Option<bool>,
    pub external_id_prefix: Option<String>,
    pub submitted_after: Option<u64>,
    pub submitted_before: Option<u64>,
}

impl RecordFilter {
    pub fn matches(&self, record: &EvaluationRecord) -> bool {
        if let Some(is_fraud) = self.is_fraud {
            if record.is_fraud != is_fraud {
                return false;
            }
        }
        if let Some(prefix) = &self.external_id_prefix {
            if !record.external_id.starts_with(prefix.as_str()) {
                return false;
            }
        }
        if let Some(after) = self.submitted_after {
            if record.submitted_at < after {
                return false;
            }
        }
        if let Some(before) = self.submitted_before {
            if record.submitted_at > before {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn record(id: &str, is_fraud: bool, submitted_at: u64) -> EvaluationRecord {
        EvaluationRecord {
            external_id: id.into(),
            amount: 900,
            fraud_probability: if is_fraud { 8_000 } else { 200 },
            is_fraud,
            rule_flags: BTreeSet::new(),
            submitted_at,
        }
    }

    #[test]
    fn default_filter_matches_everything() {
        let f = RecordFilter::default();
        assert!(f.matches(&record("a", true, 0)));
        assert!(f.matches(&record("b", false, u64::MAX)));
    }

    #[test]
    fn fraud_flag_and_prefix() {
        let f = RecordFilter {
            is_fraud: Some(true),
            external_id_prefix: Some("tx-".into()),
            ..Default::default()
        };
        assert!(f.matches(&record("tx-1", true, 5)));
        assert!(!f.matches(&record("tx-1", false, 5)));
        assert!(!f.matches(&record("order-1", true, 5)));
    }

    #[test]
    fn time_bounds_are_inclusive() {
        let f = RecordFilter {
            submitted_after: Some(100),
            submitted_before: Some(200),
            ..Default::default()
        };
        assert!(!f.matches(&record("a", false, 99)));
        assert!(f.matches(&record("a", false, 100)));
        assert!(f.matches(&record("a", false, 200)));
        assert!(!f.matches(&record("a", false, 201)));
    }
}
