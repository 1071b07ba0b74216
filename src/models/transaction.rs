use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Currency, TransactionType};

/// A ledger row exactly as stored. `type` and `currency` are free text in the
/// store, so a row may not describe a valid transaction.
#[derive(Debug, Clone)]
pub struct RawTransaction {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub round_id: String,
    pub kind: String,
    pub amount: Decimal,
    pub currency: String,
    pub usd_amount: Decimal,
}

/// A validated ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub round_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    pub currency: Currency,
    pub usd_amount: Decimal,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("unknown transaction type {0:?}")]
    UnknownType(String),

    #[error("unknown currency {0:?}")]
    UnknownCurrency(String),

    #[error("undecodable column {column}: {reason}")]
    Decode { column: &'static str, reason: String },
}

impl From<&Transaction> for RawTransaction {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            created_at: tx.created_at,
            user_id: tx.user_id,
            round_id: tx.round_id.clone(),
            kind: tx.kind.as_str().to_string(),
            amount: tx.amount,
            currency: tx.currency.code().to_string(),
            usd_amount: tx.usd_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            user_id: Uuid::new_v4(),
            round_id: "round_1".into(),
            kind: TransactionType::Wager,
            amount: Decimal::new(5, 1),
            currency: Currency::Usdt,
            usd_amount: Decimal::new(5, 1),
        }
    }

    #[test]
    fn test_raw_form_uses_stored_codes() {
        let tx = sample();
        let raw = RawTransaction::from(&tx);
        assert_eq!(raw.kind, "Wager");
        assert_eq!(raw.currency, "USDT");
        assert_eq!(raw.amount, tx.amount);
        assert_eq!(raw.round_id, tx.round_id);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], "Wager");
        assert_eq!(json["currency"], "USDT");
        assert!(json.get("usdAmount").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
