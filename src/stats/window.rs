use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::errors::StatsError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of "now" for window validation.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Strict `YYYY-MM-DD`: chrono alone also accepts unpadded months and days.
fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, StatsError> {
    let well_formed = raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(StatsError::InvalidWindow(format!(
            "invalid {field} date {raw:?}: expected YYYY-MM-DD"
        )));
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| StatsError::InvalidWindow(format!("invalid {field} date {raw:?}: {e}")))
}

/// Closed interval `[from, to]` over `created_at`.
///
/// Only constructible through validation: `from <= to` and neither bound is
/// later than the clock's "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl QueryWindow {
    pub fn new(
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, StatsError> {
        if from > to {
            return Err(StatsError::InvalidWindow(
                "from date cannot be after to date".into(),
            ));
        }
        if from > now || to > now {
            return Err(StatsError::InvalidWindow(
                "dates cannot be in the future".into(),
            ));
        }
        Ok(Self { from, to })
    }

    /// Window covering whole calendar days: `from` at 00:00:00 UTC through
    /// 23:59:59 UTC of `to`.
    pub fn from_dates(
        from: NaiveDate,
        to: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Self, StatsError> {
        let start = from.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        let end = to
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc() + Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59));

        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end, now),
            _ => Err(StatsError::InvalidWindow("date out of range".into())),
        }
    }

    /// Parse `YYYY-MM-DD` bounds and build a whole-day window.
    pub fn parse(from: &str, to: &str, now: DateTime<Utc>) -> Result<Self, StatsError> {
        let from = parse_date("from", from)?;
        let to = parse_date("to", to)?;
        Self::from_dates(from, to, now)
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && at <= self.to
    }
}
