//! First-stage groups returned by the transaction store.
//!
//! Stores group by the raw `type` / `currency` text and hand each group to one
//! of the `decode` constructors here. A group whose text does not name a known
//! type or currency comes back as a [`RecordError`] and is dropped by the
//! caller.

use uuid::Uuid;

use super::{Currency, RecordError, TransactionType};

fn parse_kind(raw: &str) -> Result<TransactionType, RecordError> {
    TransactionType::from_db_str(raw).ok_or_else(|| RecordError::UnknownType(raw.to_string()))
}

fn parse_currency(raw: &str) -> Result<Currency, RecordError> {
    Currency::from_code(raw).ok_or_else(|| RecordError::UnknownCurrency(raw.to_string()))
}

/// Sums for one `(currency, type)` bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyTypeTotal {
    pub currency: Currency,
    pub kind: TransactionType,
    pub amount: f64,
    pub usd_amount: f64,
}

impl CurrencyTypeTotal {
    pub fn decode(
        currency: &str,
        kind: &str,
        amount: f64,
        usd_amount: f64,
    ) -> Result<Self, RecordError> {
        Ok(Self {
            currency: parse_currency(currency)?,
            kind: parse_kind(kind)?,
            amount,
            usd_amount,
        })
    }
}

/// Wager sums for one `(UTC day, currency)` bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotal {
    pub date: String,
    pub currency: Currency,
    pub amount: f64,
    pub usd_amount: f64,
}

impl DailyTotal {
    pub fn decode(
        date: String,
        currency: &str,
        amount: f64,
        usd_amount: f64,
    ) -> Result<Self, RecordError> {
        Ok(Self {
            date,
            currency: parse_currency(currency)?,
            amount,
            usd_amount,
        })
    }
}

/// Wagered USD for one `(user, currency)` bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct UserCurrencyTotal {
    pub user_id: Uuid,
    pub currency: Currency,
    pub usd_amount: f64,
}

impl UserCurrencyTotal {
    pub fn decode(user_id: Uuid, currency: &str, usd_amount: f64) -> Result<Self, RecordError> {
        Ok(Self {
            user_id,
            currency: parse_currency(currency)?,
            usd_amount,
        })
    }
}
