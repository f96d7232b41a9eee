use std::collections::BTreeSet;

use crate::transaction::Transaction;

/// Amount above which a transfer is flagged as high risk (not rejected).
pub const RISK_AMOUNT_THRESHOLD: u64 = 10_000;
/// Transfers settling faster than this many seconds are flagged.
pub const FAST_TRANSFER_SECONDS: u32 = 2;

pub const FLAG_HIGH_AMOUNT: &str = "high_amount";
pub const FLAG_FAST_TRANSFER: &str = "fast_transfer";
pub const FLAG_CROSS_BORDER: &str = "cross_border";

/// Heuristic risk assessment, run on every compliant transaction.
///
/// Returns a 0..=4 additive risk score and the set of triggered flags.
/// Flags annotate the sealed record; they never reject on their own.
pub fn assess_risk(tx: &Transaction) -> (u8, BTreeSet<String>) {
    let mut score = 0u8;
    let mut flags = BTreeSet::new();

    if tx.amount > RISK_AMOUNT_THRESHOLD {
        score += 2;
        flags.insert(FLAG_HIGH_AMOUNT.to_owned());
    }
    if tx.speed_seconds < FAST_TRANSFER_SECONDS {
        score += 1;
        flags.insert(FLAG_FAST_TRANSFER.to_owned());
    }
    if tx.is_cross_border() {
        score += 1;
        flags.insert(FLAG_CROSS_BORDER.to_owned());
    }

    (score, flags)
}

/// Maximum value [`assess_risk`] can return.
pub const MAX_RISK_SCORE: u8 = 4;
