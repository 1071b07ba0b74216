pub mod currency;
pub mod statistics;
pub mod totals;
pub mod transaction;

pub use currency::{convert_to_usd, Currency};
pub use statistics::{DailyWagerVolume, GrossGamingRevenue, UserWagerPercentile};
pub use totals::{CurrencyTypeTotal, DailyTotal, UserCurrencyTotal};
pub use transaction::{RawTransaction, RecordError, Transaction};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Kind of ledger entry. A round produces one Wager and, later, one Payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Wager,
    Payout,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Wager => "Wager",
            TransactionType::Payout => "Payout",
        }
    }

    /// Parse the stored representation. Matching is exact: the ledger writes
    /// `Wager` / `Payout` and anything else is treated as corrupt.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Wager" => Some(TransactionType::Wager),
            "Payout" => Some(TransactionType::Payout),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
