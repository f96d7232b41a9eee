//! Evaluation pipeline for incoming transactions.
//!
//! Runs KYC, compliance rules, risk heuristics, and the fraud scorer in
//! order, producing an [`EvaluationRecord`] ready for sealing or a
//! stage-tagged rejection that never reaches the chain.
//!
//! [`EvaluationRecord`]: aml_types::EvaluationRecord

pub mod error;
pub mod kyc;
pub mod pipeline;
pub mod rules;
pub mod score;
pub mod transaction;

pub use error::{PipelineError, ScoreError};
pub use kyc::KycRegistry;
pub use pipeline::{Pipeline, PipelineConfig};
pub use rules::{
    assess_risk, FLAG_CROSS_BORDER, FLAG_FAST_TRANSFER, FLAG_HIGH_AMOUNT, MAX_RISK_SCORE,
};
pub use score::{FraudScorer, RiskWeightScorer, Score};
pub use transaction::Transaction;
