//! Second-stage reductions over the store's first-stage groups.
//!
//! The store sums rows into small groups (per currency and type, per day and
//! currency, per user and currency); the folds here re-group, rank and shape
//! them into report rows. Amounts arrive already widened to `f64`, so totals
//! carry ordinary floating-point error.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::errors::StatsError;
use crate::models::{
    Currency, CurrencyTypeTotal, DailyTotal, DailyWagerVolume, GrossGamingRevenue,
    TransactionType, UserCurrencyTotal, UserWagerPercentile,
};

#[derive(Debug, Default)]
struct RevenueBucket {
    wagers: f64,
    payouts: f64,
    wagers_usd: f64,
    payouts_usd: f64,
}

// ---------------------------------------------------------------------------
// Gross gaming revenue
// ---------------------------------------------------------------------------

/// Net revenue per currency: sum of wagers minus sum of payouts.
///
/// Re-buckets the `(currency, type)` groups by currency alone. Currencies
/// with no activity are absent.
pub fn gross_gaming_revenue<'a, I>(totals: I) -> Vec<GrossGamingRevenue>
where
    I: IntoIterator<Item = &'a CurrencyTypeTotal>,
{
    let mut by_currency: BTreeMap<Currency, RevenueBucket> = BTreeMap::new();
    for total in totals {
        let bucket = by_currency.entry(total.currency).or_default();
        match total.kind {
            TransactionType::Wager => {
                bucket.wagers += total.amount;
                bucket.wagers_usd += total.usd_amount;
            }
            TransactionType::Payout => {
                bucket.payouts += total.amount;
                bucket.payouts_usd += total.usd_amount;
            }
        }
    }

    by_currency
        .into_iter()
        .map(|(currency, b)| GrossGamingRevenue {
            currency,
            amount: b.wagers - b.payouts,
            usd_value: b.wagers_usd - b.payouts_usd,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Daily wager volume
// ---------------------------------------------------------------------------

/// One row per (UTC day, currency), sorted by day then currency code.
pub fn daily_wager_volume<'a, I>(totals: I) -> Vec<DailyWagerVolume>
where
    I: IntoIterator<Item = &'a DailyTotal>,
{
    let mut groups: BTreeMap<(&'a str, Currency), (f64, f64)> = BTreeMap::new();
    for total in totals {
        let sums = groups.entry((total.date.as_str(), total.currency)).or_default();
        sums.0 += total.amount;
        sums.1 += total.usd_amount;
    }

    groups
        .into_iter()
        .map(|((date, currency), (amount, usd_value))| DailyWagerVolume {
            date: date.to_string(),
            currency,
            amount,
            usd_value,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Wager ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserTotal {
    pub user_id: Uuid,
    pub total_usd: f64,
}

/// Every wagering user with their USD total across currencies, largest first.
///
/// Users are collected in order of first appearance and the sort is stable,
/// so equal totals keep that order. No further tie-break is applied.
pub fn rank_wagerers<'a, I>(totals: I) -> Vec<UserTotal>
where
    I: IntoIterator<Item = &'a UserCurrencyTotal>,
{
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut ranking: Vec<UserTotal> = Vec::new();

    for total in totals {
        let slot = *index.entry(total.user_id).or_insert_with(|| {
            ranking.push(UserTotal {
                user_id: total.user_id,
                total_usd: 0.0,
            });
            ranking.len() - 1
        });
        ranking[slot].total_usd += total.usd_amount;
    }

    ranking.sort_by(|a, b| b.total_usd.total_cmp(&a.total_usd));
    ranking
}

/// Inverse-rank percentile: rank 1 of N is 100, rank N of N is 100/N.
pub fn inverse_rank_percentile(rank: usize, total_users: usize) -> f64 {
    (total_users - rank + 1) as f64 / total_users as f64 * 100.0
}

/// Find `user_id` in a ranking produced by [`rank_wagerers`].
pub fn locate_user(
    ranking: &[UserTotal],
    user_id: Uuid,
) -> Result<UserWagerPercentile, StatsError> {
    if ranking.is_empty() {
        return Err(StatsError::NoDataInPeriod);
    }

    let (position, entry) = ranking
        .iter()
        .enumerate()
        .find(|(_, u)| u.user_id == user_id)
        .ok_or(StatsError::UserNotFound)?;

    let rank = position + 1;
    let total_users = ranking.len();

    Ok(UserWagerPercentile {
        user_id: user_id.to_string(),
        total_wagered: entry.total_usd,
        percentile: inverse_rank_percentile(rank, total_users),
        rank,
        total_users,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(currency: Currency, kind: TransactionType, amount: f64, usd: f64) -> CurrencyTypeTotal {
        CurrencyTypeTotal {
            currency,
            kind,
            amount,
            usd_amount: usd,
        }
    }

    fn day(date: &str, currency: Currency, usd: f64) -> DailyTotal {
        DailyTotal {
            date: date.into(),
            currency,
            amount: usd / currency.usd_rate(),
            usd_amount: usd,
        }
    }

    fn wagered(user_id: Uuid, currency: Currency, usd: f64) -> UserCurrencyTotal {
        UserCurrencyTotal {
            user_id,
            currency,
            usd_amount: usd,
        }
    }

    #[test]
    fn test_ggr_nets_payouts_per_currency() {
        let totals = vec![
            bucket(Currency::Usdt, TransactionType::Wager, 100.0, 100.0),
            bucket(Currency::Btc, TransactionType::Payout, 0.01, 450.0),
            bucket(Currency::Btc, TransactionType::Wager, 0.05, 2250.0),
        ];

        let ggr = gross_gaming_revenue(&totals);
        assert_eq!(ggr.len(), 2);

        let btc = ggr.iter().find(|r| r.currency == Currency::Btc).unwrap();
        assert!((btc.amount - 0.04).abs() < 1e-12);
        assert_eq!(btc.usd_value, 1800.0);

        let usdt = ggr.iter().find(|r| r.currency == Currency::Usdt).unwrap();
        assert_eq!(usdt.amount, 100.0);
        assert_eq!(usdt.usd_value, 100.0);
    }

    #[test]
    fn test_ggr_can_go_negative() {
        let totals = vec![
            bucket(Currency::Eth, TransactionType::Wager, 1.0, 3000.0),
            bucket(Currency::Eth, TransactionType::Payout, 2.0, 6000.0),
        ];
        let ggr = gross_gaming_revenue(&totals);
        assert_eq!(ggr[0].amount, -1.0);
        assert_eq!(ggr[0].usd_value, -3000.0);
    }

    #[test]
    fn test_ggr_payout_only_currency_is_emitted() {
        let totals = vec![bucket(Currency::Eth, TransactionType::Payout, 1.0, 3000.0)];
        let ggr = gross_gaming_revenue(&totals);
        assert_eq!(ggr.len(), 1);
        assert_eq!(ggr[0].amount, -1.0);
    }

    #[test]
    fn test_ggr_empty() {
        assert!(gross_gaming_revenue(&[]).is_empty());
    }

    #[test]
    fn test_daily_volume_sorts_by_day_then_currency() {
        let totals = vec![
            day("2024-01-02", Currency::Usdt, 15.0),
            day("2024-01-02", Currency::Btc, 45.0),
            day("2024-01-01", Currency::Eth, 30.0),
        ];

        let daily = daily_wager_volume(&totals);
        let keys: Vec<(&str, Currency)> = daily.iter().map(|d| (d.date.as_str(), d.currency)).collect();
        assert_eq!(
            keys,
            vec![
                ("2024-01-01", Currency::Eth),
                ("2024-01-02", Currency::Btc),
                ("2024-01-02", Currency::Usdt),
            ]
        );
        assert_eq!(daily[2].amount, 15.0);
        assert_eq!(daily[2].usd_value, 15.0);
    }

    #[test]
    fn test_daily_volume_merges_repeated_groups() {
        let totals = vec![day("2024-01-05", Currency::Usdt, 10.0), day("2024-01-05", Currency::Usdt, 5.0)];
        let daily = daily_wager_volume(&totals);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].usd_value, 15.0);
    }

    #[test]
    fn test_rank_wagerers_sums_currencies_and_sorts_descending() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let totals = vec![
            wagered(a, Currency::Usdt, 50.0),
            wagered(b, Currency::Usdt, 300.0),
            wagered(c, Currency::Usdt, 120.0),
            wagered(a, Currency::Btc, 100.0),
        ];

        let ranking = rank_wagerers(&totals);
        let order: Vec<Uuid> = ranking.iter().map(|u| u.user_id).collect();
        assert_eq!(order, vec![b, a, c]);
        assert_eq!(ranking[1].total_usd, 150.0);
        assert_eq!(ranking[2].total_usd, 120.0);
    }

    #[test]
    fn test_rank_ties_keep_first_appearance_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let totals = vec![wagered(a, Currency::Usdt, 10.0), wagered(b, Currency::Eth, 10.0)];
        let ranking = rank_wagerers(&totals);
        assert_eq!(ranking[0].user_id, a);
        assert_eq!(ranking[1].user_id, b);
    }

    #[test]
    fn test_percentile_formula() {
        assert_eq!(inverse_rank_percentile(1, 1), 100.0);
        assert_eq!(inverse_rank_percentile(1, 4), 100.0);
        assert_eq!(inverse_rank_percentile(4, 4), 25.0);
        assert_eq!(inverse_rank_percentile(2, 5), 80.0);
    }

    #[test]
    fn test_percentile_non_increasing_with_rank() {
        let n = 37;
        let values: Vec<f64> = (1..=n).map(|r| inverse_rank_percentile(r, n)).collect();
        assert!(values.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_locate_user() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let totals = vec![
            wagered(a, Currency::Usdt, 10.0),
            wagered(b, Currency::Usdt, 30.0),
            wagered(c, Currency::Usdt, 20.0),
        ];
        let ranking = rank_wagerers(&totals);

        let result = locate_user(&ranking, c).unwrap();
        assert_eq!(result.rank, 2);
        assert_eq!(result.total_users, 3);
        assert_eq!(result.total_wagered, 20.0);
        assert!((result.percentile - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(result.user_id, c.to_string());
    }

    #[test]
    fn test_locate_user_errors() {
        assert!(matches!(locate_user(&[], Uuid::new_v4()), Err(StatsError::NoDataInPeriod)));

        let ranking = rank_wagerers(&[wagered(Uuid::new_v4(), Currency::Eth, 10.0)]);
        assert!(matches!(locate_user(&ranking, Uuid::new_v4()), Err(StatsError::UserNotFound)));
    }
}
