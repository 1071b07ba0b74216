use serde::{Deserialize, Serialize};

use super::Currency;

/// Net revenue (wagers minus payouts) for one currency over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrossGamingRevenue {
    pub currency: Currency,
    pub amount: f64,
    pub usd_value: f64,
}

/// Total wagered for one (UTC day, currency) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyWagerVolume {
    pub date: String,
    pub currency: Currency,
    pub amount: f64,
    pub usd_value: f64,
}

/// Where one user's USD wager total ranks among every user who wagered in
/// the window. `rank` 1 is the largest total; `percentile` 100 is the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWagerPercentile {
    pub user_id: String,
    pub total_wagered: f64,
    pub percentile: f64,
    pub rank: usize,
    pub total_users: usize,
}
