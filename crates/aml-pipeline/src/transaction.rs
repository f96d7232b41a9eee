use serde::{Deserialize, Serialize};

/// An incoming transfer to be evaluated.
///
/// Amounts and balances are integer minor units. `speed_seconds` is the
/// elapsed time between initiation and settlement; very fast transfers are
/// a structuring signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: u64,
    pub sender_balance: u64,
    pub receiver_balance: u64,
    pub speed_seconds: u32,
    pub sender_country: String,
    pub receiver_country: String,
}

impl Transaction {
    pub fn is_cross_border(&self) -> bool {
        self.sender_country != self.receiver_country
    }
}
