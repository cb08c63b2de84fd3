//! The operation surface outer layers call into.
//!
//! A [`Ledger`] owns one [`Storage`] backend, chosen at construction, and a
//! clock. Store operations delegate directly; analytics read a fresh snapshot
//! on every call and hand it to the pure functions in [`crate::analytics`].
//! Input is expected to be validated already (see [`crate::validate`]).

use anyhow::Result;
use chrono::NaiveDateTime;

use crate::analytics::{
    self,
    period::{DateRange, MonthBucket},
    BudgetPerformance, CategoryAmount, ForecastPoint, MonthlyAmount, SummaryStats, TrendPoint,
};
use crate::models::*;
use crate::store::Storage;

type Clock = Box<dyn Fn() -> NaiveDateTime>;

pub struct Ledger {
    store: Box<dyn Storage>,
    clock: Clock,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger").field("now", &self.now()).finish()
    }
}

impl Ledger {
    pub fn new(store: Box<dyn Storage>) -> Self {
        Self {
            store,
            clock: Box::new(|| chrono::Local::now().naive_local()),
        }
    }

    /// Replace the wall clock, e.g. to pin "now" in tests.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    pub fn seed_default_categories(&mut self) -> Result<usize> {
        self.store.seed_default_categories()
    }

    // ── Categories ────────────────────────────────────────────

    pub fn categories(&self) -> Result<Vec<Category>> {
        self.store.categories()
    }

    pub fn categories_by_kind(&self, kind: EntryKind) -> Result<Vec<Category>> {
        let mut categories = self.store.categories()?;
        categories.retain(|c| c.kind == kind);
        Ok(categories)
    }

    pub fn category(&self, id: i64) -> Result<Option<Category>> {
        self.store.category_by_id(id)
    }

    pub fn create_category(&mut self, category: NewCategory) -> Result<Category> {
        let category = self.store.insert_category(category)?;
        tracing::info!(id = category.id, name = %category.name, "created category");
        Ok(category)
    }

    // ── Transactions ──────────────────────────────────────────

    /// All transactions, newest first.
    pub fn transactions(&self) -> Result<Vec<Transaction>> {
        self.store.transactions()
    }

    pub fn transaction(&self, id: i64) -> Result<Option<Transaction>> {
        self.store.transaction_by_id(id)
    }

    pub fn create_transaction(&mut self, txn: NewTransaction) -> Result<Transaction> {
        let txn = self.store.insert_transaction(txn)?;
        tracing::info!(id = txn.id, kind = %txn.kind, amount = %txn.amount, "created transaction");
        Ok(txn)
    }

    pub fn update_transaction(
        &mut self,
        id: i64,
        patch: TransactionPatch,
    ) -> Result<Option<Transaction>> {
        let updated = self.store.update_transaction(id, patch)?;
        match &updated {
            Some(_) => tracing::info!(id, "updated transaction"),
            None => tracing::debug!(id, "update skipped, transaction not found"),
        }
        Ok(updated)
    }

    pub fn delete_transaction(&mut self, id: i64) -> Result<bool> {
        let removed = self.store.delete_transaction(id)?;
        if removed {
            tracing::info!(id, "deleted transaction");
        }
        Ok(removed)
    }

    /// Transactions matching every set field of `filter`, newest first.
    pub fn transactions_filtered(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut txns = self.store.transactions()?;
        txns.retain(|t| filter.matches(t));
        Ok(txns)
    }

    /// Transactions in the inclusive date range joined with their category,
    /// newest first.
    pub fn transactions_for_export(&self, range: DateRange) -> Result<Vec<TransactionWithCategory>> {
        let filter = TransactionFilter {
            start: range.start,
            end: range.end,
            ..Default::default()
        };
        let categories = self.store.categories()?;
        Ok(self
            .transactions_filtered(&filter)?
            .into_iter()
            .map(|transaction| TransactionWithCategory {
                category: CategoryLabel::resolve(&categories, transaction.category_id),
                transaction,
            })
            .collect())
    }

    // ── Budgets ───────────────────────────────────────────────

    pub fn budgets(&self) -> Result<Vec<BudgetWithCategory>> {
        let categories = self.store.categories()?;
        Ok(self
            .store
            .budgets()?
            .into_iter()
            .map(|budget| BudgetWithCategory {
                category: CategoryLabel::resolve(&categories, budget.category_id),
                budget,
            })
            .collect())
    }

    pub fn budget(&self, id: i64) -> Result<Option<Budget>> {
        self.store.budget_by_id(id)
    }

    pub fn create_budget(&mut self, budget: NewBudget) -> Result<Budget> {
        let budget = self.store.insert_budget(budget)?;
        tracing::info!(
            id = budget.id,
            category_id = budget.category_id,
            month = budget.month,
            year = budget.year,
            "created budget"
        );
        Ok(budget)
    }

    pub fn update_budget(&mut self, id: i64, patch: BudgetPatch) -> Result<Option<Budget>> {
        let updated = self.store.update_budget(id, patch)?;
        if updated.is_some() {
            tracing::info!(id, "updated budget");
        }
        Ok(updated)
    }

    pub fn delete_budget(&mut self, id: i64) -> Result<bool> {
        let removed = self.store.delete_budget(id)?;
        if removed {
            tracing::info!(id, "deleted budget");
        }
        Ok(removed)
    }

    // ── Analytics ─────────────────────────────────────────────

    pub fn monthly_expenses(&self, months: u32) -> Result<Vec<MonthlyAmount>> {
        let txns = self.store.transactions()?;
        Ok(analytics::monthly_expenses(&txns, months, self.now()))
    }

    pub fn category_expenses(&self, range: Option<DateRange>) -> Result<Vec<CategoryAmount>> {
        let txns = self.store.transactions()?;
        let categories = self.store.categories()?;
        Ok(analytics::category_expenses(&txns, &categories, range))
    }

    pub fn summary_stats(&self) -> Result<SummaryStats> {
        let txns = self.store.transactions()?;
        Ok(analytics::summary_stats(&txns, self.now()))
    }

    pub fn spending_trends(&self, months: u32) -> Result<Vec<TrendPoint>> {
        let txns = self.store.transactions()?;
        Ok(analytics::spending_trends(&txns, months, self.now()))
    }

    pub fn spending_forecast(&self, months: u32) -> Result<Vec<ForecastPoint>> {
        let txns = self.store.transactions()?;
        Ok(analytics::spending_forecast(&txns, months, self.now()))
    }

    pub fn budget_performance(&self) -> Result<Vec<BudgetPerformance>> {
        let txns = self.store.transactions()?;
        let categories = self.store.categories()?;
        let budgets = self.store.budgets()?;
        Ok(analytics::budget_performance(
            &txns,
            &categories,
            &budgets,
            self.now(),
        ))
    }

    /// The calendar month analytics currently treat as "this month".
    pub fn current_month(&self) -> MonthBucket {
        MonthBucket::containing(self.now())
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
