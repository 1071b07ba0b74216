use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger currencies. Variant order matches the lexicographic order of the
/// codes, so the derived `Ord` sorts the same way as the code strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Btc,
    Eth,
    Usdt,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Btc, Currency::Eth, Currency::Usdt];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Btc => "BTC",
            Currency::Eth => "ETH",
            Currency::Usdt => "USDT",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "BTC" => Some(Currency::Btc),
            "ETH" => Some(Currency::Eth),
            "USDT" => Some(Currency::Usdt),
            _ => None,
        }
    }

    /// Static USD price per unit.
    pub fn usd_rate(&self) -> f64 {
        match self {
            Currency::Btc => 45_000.0,
            Currency::Eth => 3_000.0,
            Currency::Usdt => 1.0,
        }
    }

    /// Inclusive-exclusive range of a single synthetic wager, in native units.
    pub fn wager_range(&self) -> (f64, f64) {
        match self {
            Currency::Btc => (0.001, 0.1),
            Currency::Eth => (0.01, 1.0),
            Currency::Usdt => (10.0, 1_000.0),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Convert `amount` of the currency with the given code to USD.
/// Unknown codes convert to 0.
pub fn convert_to_usd(amount: f64, code: &str) -> f64 {
    match Currency::from_code(code) {
        Some(currency) => amount * currency.usd_rate(),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        assert_eq!(convert_to_usd(2.0, "BTC"), 90_000.0);
        assert_eq!(convert_to_usd(0.5, "ETH"), 1_500.0);
        assert_eq!(convert_to_usd(250.0, "USDT"), 250.0);
    }

    #[test]
    fn test_unknown_currency_converts_to_zero() {
        assert_eq!(convert_to_usd(10.0, "DOGE"), 0.0);
        assert_eq!(convert_to_usd(10.0, "btc"), 0.0);
    }

    #[test]
    fn test_ord_matches_code_order() {
        let mut by_variant = Currency::ALL.to_vec();
        by_variant.sort();
        let mut by_code = Currency::ALL.to_vec();
        by_code.sort_by_key(|c| c.code());
        assert_eq!(by_variant, by_code);
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Currency::Usdt).unwrap(), "\"USDT\"");
        let parsed: Currency = serde_json::from_str("\"ETH\"").unwrap();
        assert_eq!(parsed, Currency::Eth);
    }
}
