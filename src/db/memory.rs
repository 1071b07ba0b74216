use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    CurrencyTypeTotal, DailyTotal, RawTransaction, Transaction, TransactionType, UserCurrencyTotal,
};
use crate::stats::window::DATE_FORMAT;
use crate::stats::QueryWindow;

use super::{Grouped, TransactionStore};

/// Ledger held in process memory. Used by tests and local experiments; it
/// can hold rows that do not decode and can be switched into a failing mode.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<RawTransaction>>,
    unavailable: AtomicBool,
    scans: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(transactions: &[Transaction]) -> Self {
        let store = Self::new();
        store.insert_all(transactions);
        store
    }

    pub fn insert_all(&self, transactions: &[Transaction]) {
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        rows.extend(transactions.iter().map(RawTransaction::from));
    }

    /// Insert a row without validating it.
    pub fn insert_raw(&self, row: RawTransaction) {
        self.rows
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(row);
    }

    /// Make every subsequent query and ping fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of grouping queries served so far, failed ones included.
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> anyhow::Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            anyhow::bail!("transaction store unavailable");
        }
        Ok(())
    }

    /// Rows inside `window`, optionally only one type, in `created_at` order.
    fn matching(
        &self,
        window: &QueryWindow,
        kind: Option<TransactionType>,
    ) -> anyhow::Result<Vec<RawTransaction>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        let mut matching: Vec<RawTransaction> = rows
            .iter()
            .filter(|r| window.contains(r.created_at))
            .filter(|r| kind.map_or(true, |k| r.kind == k.as_str()))
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.created_at);
        Ok(matching)
    }
}

fn widen(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn totals_by_currency_and_type(
        &self,
        window: &QueryWindow,
    ) -> anyhow::Result<Vec<Grouped<CurrencyTypeTotal>>> {
        let mut groups: BTreeMap<(String, String), (f64, f64)> = BTreeMap::new();
        for row in self.matching(window, None)? {
            let sums = groups.entry((row.currency, row.kind)).or_default();
            sums.0 += widen(row.amount);
            sums.1 += widen(row.usd_amount);
        }

        Ok(groups
            .into_iter()
            .map(|((currency, kind), (amount, usd))| {
                CurrencyTypeTotal::decode(&currency, &kind, amount, usd)
            })
            .collect())
    }

    async fn daily_wager_totals(
        &self,
        window: &QueryWindow,
    ) -> anyhow::Result<Vec<Grouped<DailyTotal>>> {
        let mut groups: BTreeMap<(String, String), (f64, f64)> = BTreeMap::new();
        for row in self.matching(window, Some(TransactionType::Wager))? {
            let day = row.created_at.format(DATE_FORMAT).to_string();
            let sums = groups.entry((day, row.currency)).or_default();
            sums.0 += widen(row.amount);
            sums.1 += widen(row.usd_amount);
        }

        Ok(groups
            .into_iter()
            .map(|((day, currency), (amount, usd))| DailyTotal::decode(day, &currency, amount, usd))
            .collect())
    }

    async fn wager_totals_by_user(
        &self,
        window: &QueryWindow,
    ) -> anyhow::Result<Vec<Grouped<UserCurrencyTotal>>> {
        // Groups in order of first appearance, which is earliest-wager order
        // because rows arrive sorted by `created_at`.
        let mut index: HashMap<(Uuid, String), usize> = HashMap::new();
        let mut groups: Vec<(Uuid, String, f64)> = Vec::new();
        for row in self.matching(window, Some(TransactionType::Wager))? {
            let slot = *index
                .entry((row.user_id, row.currency.clone()))
                .or_insert_with(|| {
                    groups.push((row.user_id, row.currency.clone(), 0.0));
                    groups.len() - 1
                });
            groups[slot].2 += widen(row.usd_amount);
        }

        Ok(groups
            .into_iter()
            .map(|(user_id, currency, usd)| UserCurrencyTotal::decode(user_id, &currency, usd))
            .collect())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.check_available()
    }
}
