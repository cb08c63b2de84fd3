use anyhow::Result;
use std::collections::BTreeMap;

use super::{sort_newest_first, Storage};
use crate::models::*;

/// Process-lifetime storage in plain maps. One id counter is shared by all
/// three collections, so an id is never handed out twice.
#[derive(Debug)]
pub struct MemoryStore {
    categories: BTreeMap<i64, Category>,
    transactions: BTreeMap<i64, Transaction>,
    budgets: BTreeMap<i64, Budget>,
    next_id: i64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            categories: BTreeMap::new(),
            transactions: BTreeMap::new(),
            budgets: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn with_default_categories() -> Result<Self> {
        let mut store = Self::new();
        store.seed_default_categories()?;
        Ok(store)
    }

    fn generate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Storage for MemoryStore {
    // ── Categories ────────────────────────────────────────────

    fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.values().cloned().collect())
    }

    fn category_by_id(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.categories.get(&id).cloned())
    }

    fn insert_category(&mut self, category: NewCategory) -> Result<Category> {
        let id = self.generate_id();
        let category = category.with_id(id);
        self.categories.insert(id, category.clone());
        tracing::debug!(id, name = %category.name, "category created");
        Ok(category)
    }

    // ── Transactions ──────────────────────────────────────────

    fn transactions(&self) -> Result<Vec<Transaction>> {
        let mut txns: Vec<Transaction> = self.transactions.values().cloned().collect();
        sort_newest_first(&mut txns);
        Ok(txns)
    }

    fn transaction_by_id(&self, id: i64) -> Result<Option<Transaction>> {
        Ok(self.transactions.get(&id).cloned())
    }

    fn insert_transaction(&mut self, txn: NewTransaction) -> Result<Transaction> {
        let id = self.generate_id();
        let txn = txn.with_id(id);
        self.transactions.insert(id, txn.clone());
        tracing::debug!(id, "transaction created");
        Ok(txn)
    }

    fn update_transaction(
        &mut self,
        id: i64,
        patch: TransactionPatch,
    ) -> Result<Option<Transaction>> {
        let Some(txn) = self.transactions.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(txn);
        tracing::debug!(id, "transaction updated");
        Ok(Some(txn.clone()))
    }

    fn delete_transaction(&mut self, id: i64) -> Result<bool> {
        Ok(self.transactions.remove(&id).is_some())
    }

    // ── Budgets ───────────────────────────────────────────────

    fn budgets(&self) -> Result<Vec<Budget>> {
        Ok(self.budgets.values().cloned().collect())
    }

    fn budget_by_id(&self, id: i64) -> Result<Option<Budget>> {
        Ok(self.budgets.get(&id).cloned())
    }

    fn insert_budget(&mut self, budget: NewBudget) -> Result<Budget> {
        let id = self.generate_id();
        let budget = budget.with_id(id);
        self.budgets.insert(id, budget.clone());
        tracing::debug!(id, "budget created");
        Ok(budget)
    }

    fn update_budget(&mut self, id: i64, patch: BudgetPatch) -> Result<Option<Budget>> {
        let Some(budget) = self.budgets.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(budget);
        tracing::debug!(id, "budget updated");
        Ok(Some(budget.clone()))
    }

    fn delete_budget(&mut self, id: i64) -> Result<bool> {
        Ok(self.budgets.remove(&id).is_some())
    }
}
