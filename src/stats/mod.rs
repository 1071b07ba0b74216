pub mod aggregate;
pub mod cache_key;
pub mod service;
pub mod window;

pub use cache_key::QueryKind;
pub use service::{StatsService, CACHE_TTL};
pub use window::{Clock, FixedClock, QueryWindow, SystemClock};
