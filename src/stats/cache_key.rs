use std::fmt;

use uuid::Uuid;

use super::window::QueryWindow;

/// The three cached queries. Each owns a distinct key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    GrossGamingRevenue,
    DailyWagerVolume,
    UserPercentile,
}

impl QueryKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            QueryKind::GrossGamingRevenue => "ggr",
            QueryKind::DailyWagerVolume => "daily_wager",
            QueryKind::UserPercentile => "user_percentile",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Cache key for a window-only query: `<prefix>:<from_secs>:<to_secs>`.
pub fn window_key(kind: QueryKind, window: &QueryWindow) -> String {
    format!(
        "{}:{}:{}",
        kind.prefix(),
        window.from().timestamp(),
        window.to().timestamp()
    )
}

/// Cache key for the percentile query: `user_percentile:<user>:<from_secs>:<to_secs>`.
pub fn user_key(window: &QueryWindow, user_id: Uuid) -> String {
    format!(
        "{}:{}:{}:{}",
        QueryKind::UserPercentile.prefix(),
        user_id.simple(),
        window.from().timestamp(),
        window.to().timestamp()
    )
}
