//! Keyed storage for categories, transactions and budgets.
//!
//! [`Storage`] is the capability set every backend provides. Absence is a
//! value (`None` / `false`), never an error; `Err` is reserved for backend
//! failures such as SQLite I/O.

mod memory;
mod schema;
mod sqlite;

use anyhow::Result;

use crate::models::*;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub trait Storage {
    // ── Categories ────────────────────────────────────────────

    fn categories(&self) -> Result<Vec<Category>>;
    fn category_by_id(&self, id: i64) -> Result<Option<Category>>;
    fn insert_category(&mut self, category: NewCategory) -> Result<Category>;

    // ── Transactions ──────────────────────────────────────────

    /// All transactions, newest first by date.
    fn transactions(&self) -> Result<Vec<Transaction>>;
    fn transaction_by_id(&self, id: i64) -> Result<Option<Transaction>>;
    fn insert_transaction(&mut self, txn: NewTransaction) -> Result<Transaction>;
    fn update_transaction(&mut self, id: i64, patch: TransactionPatch)
        -> Result<Option<Transaction>>;
    fn delete_transaction(&mut self, id: i64) -> Result<bool>;

    // ── Budgets ───────────────────────────────────────────────

    fn budgets(&self) -> Result<Vec<Budget>>;
    fn budget_by_id(&self, id: i64) -> Result<Option<Budget>>;
    fn insert_budget(&mut self, budget: NewBudget) -> Result<Budget>;
    fn update_budget(&mut self, id: i64, patch: BudgetPatch) -> Result<Option<Budget>>;
    fn delete_budget(&mut self, id: i64) -> Result<bool>;

    /// Insert the default category set if the store has no categories yet.
    /// Returns how many were inserted.
    fn seed_default_categories(&mut self) -> Result<usize> {
        if !self.categories()?.is_empty() {
            return Ok(0);
        }
        let defaults = default_categories();
        let count = defaults.len();
        for category in defaults {
            self.insert_category(category)?;
        }
        tracing::info!(count, "seeded default categories");
        Ok(count)
    }
}

/// Newest first; ties broken by id so the order is stable.
pub(crate) fn sort_newest_first(txns: &mut [Transaction]) {
    txns.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}
