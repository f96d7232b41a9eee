use std::sync::Arc;

use aml_types::{now_ms, EvaluationRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::kyc::KycRegistry;
use crate::rules::assess_risk;
use crate::score::FraudScorer;
use crate::transaction::Transaction;

/// Pipeline thresholds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Amounts above this are rejected outright, before scoring.
    pub high_value_threshold: u64,
    /// Probability (0..=10000) at or above which a record is marked fraud.
    pub fraud_threshold: u16,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            high_value_threshold: 25_000,
            fraud_threshold: 5_000,
        }
    }
}

/// The evaluation path in front of the sealer.
///
/// Stages run in order: KYC, compliance rules, risk heuristics, scoring.
/// A rejection at any stage returns a [`PipelineError`] tagged with that
/// stage and nothing reaches the chain.
pub struct Pipeline {
    scorer: Arc<dyn FraudScorer>,
    kyc: KycRegistry,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(scorer: Arc<dyn FraudScorer>, kyc: KycRegistry, config: PipelineConfig) -> Self {
        Self { scorer, kyc, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Evaluate one transaction into a sealable record.
    pub fn evaluate(
        &self,
        tx: &Transaction,
        external_id: &str,
    ) -> Result<EvaluationRecord, PipelineError> {
        for party in [&tx.sender_id, &tx.receiver_id] {
            if !self.kyc.is_verified(party) {
                return Err(PipelineError::Kyc {
                    party: party.clone(),
                });
            }
        }

        if tx.amount > self.config.high_value_threshold {
            return Err(PipelineError::Rules {
                reason: format!(
                    "amount {} exceeds high-value threshold {}",
                    tx.amount, self.config.high_value_threshold
                ),
            });
        }

        let (risk, rule_flags) = assess_risk(tx);
        let score = self.scorer.evaluate(tx)?;
        // The configured threshold can only escalate the scorer's verdict.
        let is_fraud = score.is_fraud || score.fraud_probability >= self.config.fraud_threshold;
        debug!(
            external_id,
            risk,
            fraud_probability = score.fraud_probability,
            is_fraud,
            "transaction scored"
        );

        let record = EvaluationRecord {
            external_id: external_id.to_owned(),
            amount: tx.amount,
            fraud_probability: score.fraud_probability,
            is_fraud,
            rule_flags,
            submitted_at: now_ms(),
        };
        record.validate()?;
        if is_fraud {
            info!(external_id, amount = tx.amount, "transaction flagged as fraud");
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoreError;
    use crate::rules::{FLAG_CROSS_BORDER, FLAG_HIGH_AMOUNT};
    use crate::score::Score;

    struct FixedScorer(u16);

    impl FraudScorer for FixedScorer {
        fn evaluate(&self, _tx: &Transaction) -> Result<Score, ScoreError> {
            Ok(Score {
                fraud_probability: self.0,
                is_fraud: false,
            })
        }
    }

    struct BrokenScorer;

    impl FraudScorer for BrokenScorer {
        fn evaluate(&self, _tx: &Transaction) -> Result<Score, ScoreError> {
            Err(ScoreError("model host unreachable".into()))
        }
    }

    fn registry() -> KycRegistry {
        KycRegistry::new(["IN12345", "US67890", "SG34567"])
    }

    fn tx(amount: u64) -> Transaction {
        Transaction {
            sender_id: "IN12345".into(),
            receiver_id: "US67890".into(),
            amount,
            sender_balance: 90_000,
            receiver_balance: 40_000,
            speed_seconds: 3,
            sender_country: "IN".into(),
            receiver_country: "US".into(),
        }
    }

    fn pipeline(prob: u16) -> Pipeline {
        Pipeline::new(Arc::new(FixedScorer(prob)), registry(), PipelineConfig::default())
    }

    #[test]
    fn clean_transaction_produces_record_with_flags() {
        let record = pipeline(400).evaluate(&tx(12_000), "tx-1").unwrap();
        assert_eq!(record.external_id, "tx-1");
        assert_eq!(record.amount, 12_000);
        assert_eq!(record.fraud_probability, 400);
        assert!(!record.is_fraud);
        assert!(record.rule_flags.contains(FLAG_HIGH_AMOUNT));
        assert!(record.rule_flags.contains(FLAG_CROSS_BORDER));
        assert!(record.validate().is_ok());
    }

    #[test]
    fn unverified_party_is_rejected_at_kyc() {
        let mut t = tx(500);
        t.receiver_id = "XX00000".into();
        let err = pipeline(0).evaluate(&t, "tx-2").unwrap_err();
        assert!(matches!(err, PipelineError::Kyc { party } if party == "XX00000"));
    }

    #[test]
    fn high_value_is_rejected_before_scoring() {
        // BrokenScorer proves the scorer is never consulted.
        let p = Pipeline::new(Arc::new(BrokenScorer), registry(), PipelineConfig::default());
        let err = p.evaluate(&tx(25_001), "tx-3").unwrap_err();
        assert!(matches!(err, PipelineError::Rules { .. }));

        // Exactly at the threshold passes the rule stage.
        let err = p.evaluate(&tx(25_000), "tx-4").unwrap_err();
        assert!(matches!(err, PipelineError::Scoring(_)));
    }

    #[test]
    fn threshold_escalates_verdict() {
        let approved = pipeline(4_999).evaluate(&tx(100), "tx-5").unwrap();
        assert!(!approved.is_fraud);

        let flagged = pipeline(5_000).evaluate(&tx(100), "tx-6").unwrap();
        assert!(flagged.is_fraud);
    }

    #[test]
    fn scorer_failure_maps_to_scoring_stage() {
        let p = Pipeline::new(Arc::new(BrokenScorer), registry(), PipelineConfig::default());
        let err = p.evaluate(&tx(100), "tx-7").unwrap_err();
        assert!(err.to_string().contains("model host unreachable"));
    }
}
