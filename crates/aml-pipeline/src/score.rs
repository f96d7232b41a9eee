use aml_types::PROBABILITY_SCALE;

use crate::error::ScoreError;
use crate::rules::{assess_risk, MAX_RISK_SCORE};
use crate::transaction::Transaction;

/// A scorer's verdict on one transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Score {
    /// Fraud probability, fixed point in 0..=10000.
    pub fraud_probability: u16,
    /// The scorer's own verdict; the pipeline may additionally flag on its
    /// configured threshold but never downgrades this.
    pub is_fraud: bool,
}

/// Scoring collaborator seam.
///
/// Implementations wrap whatever model the institution runs; the pipeline
/// consumes them synchronously before sealing. A scorer must be pure with
/// respect to the ledger: it sees only the transaction.
pub trait FraudScorer: Send + Sync {
    fn evaluate(&self, tx: &Transaction) -> Result<Score, ScoreError>;
}

/// Deterministic scorer derived from the additive risk heuristics.
///
/// Maps the 0..=4 risk score linearly onto the probability scale. Useful
/// as a baseline and wherever a model host is not available.
#[derive(Clone, Copy, Debug, Default)]
pub struct RiskWeightScorer;

impl FraudScorer for RiskWeightScorer {
    fn evaluate(&self, tx: &Transaction) -> Result<Score, ScoreError> {
        let (risk, _) = assess_risk(tx);
        let fraud_probability =
            (u32::from(risk) * u32::from(PROBABILITY_SCALE) / u32::from(MAX_RISK_SCORE)) as u16;
        Ok(Score {
            fraud_probability,
            is_fraud: risk >= MAX_RISK_SCORE,
        })
    }
}
