use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use super::schema::{self, DATE_FORMAT};
use super::Storage;
use crate::models::*;

const CATEGORY_COLUMNS: &str = "id, name, color, icon, kind";
const TRANSACTION_COLUMNS: &str = "id, description, amount, category_id, date, kind";
const BUDGET_COLUMNS: &str = "id, category_id, amount, month, year";

/// Relational backend. Amounts are stored as decimal text so no precision
/// is lost to SQLite's REAL affinity.
pub struct SqliteStore {
    conn: Connection,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut store = Self { conn };
        store.migrate().context("Database migration failed")?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Create the schema on a fresh database; refuse one written by a newer
    /// schema version.
    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(version = schema::CURRENT_VERSION, "created database schema");
            return Ok(());
        }

        let version: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .context("Failed to read schema version")?;
        if version > schema::CURRENT_VERSION {
            anyhow::bail!(
                "Database schema version {version} is newer than supported version {}",
                schema::CURRENT_VERSION
            );
        }
        Ok(())
    }

    fn write_transaction(&self, txn: &Transaction) -> Result<()> {
        self.conn.execute(
            "UPDATE transactions
             SET description = ?1, amount = ?2, category_id = ?3, date = ?4, kind = ?5
             WHERE id = ?6",
            params![
                txn.description,
                txn.amount.to_string(),
                txn.category_id,
                txn.date.format(DATE_FORMAT).to_string(),
                txn.kind.as_str(),
                txn.id,
            ],
        )?;
        Ok(())
    }

    fn write_budget(&self, budget: &Budget) -> Result<()> {
        self.conn.execute(
            "UPDATE budgets SET category_id = ?1, amount = ?2, month = ?3, year = ?4 WHERE id = ?5",
            params![
                budget.category_id,
                budget.amount.to_string(),
                budget.month,
                budget.year,
                budget.id,
            ],
        )?;
        Ok(())
    }
}

// ── Row mapping ───────────────────────────────────────────────

fn parse_kind(row: &Row, idx: usize) -> rusqlite::Result<EntryKind> {
    let raw: String = row.get(idx)?;
    EntryKind::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown entry kind '{raw}'").into(),
        )
    })
}

fn parse_date(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_amount(row: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn category_from_row(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        icon: row.get(3)?,
        kind: parse_kind(row, 4)?,
    })
}

fn transaction_from_row(row: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: parse_amount(row, 2)?,
        category_id: row.get(3)?,
        date: parse_date(row, 4)?,
        kind: parse_kind(row, 5)?,
    })
}

fn budget_from_row(row: &Row) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        category_id: row.get(1)?,
        amount: parse_amount(row, 2)?,
        month: row.get(3)?,
        year: row.get(4)?,
    })
}

fn optional<T>(result: rusqlite::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Storage for SqliteStore {
    // ── Categories ────────────────────────────────────────────

    fn categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY id"))?;
        let rows = stmt.query_map([], category_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn category_by_id(&self, id: i64) -> Result<Option<Category>> {
        optional(self.conn.query_row(
            &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"),
            params![id],
            category_from_row,
        ))
    }

    fn insert_category(&mut self, category: NewCategory) -> Result<Category> {
        self.conn.execute(
            "INSERT INTO categories (name, color, icon, kind) VALUES (?1, ?2, ?3, ?4)",
            params![
                category.name,
                category.color,
                category.icon,
                category.kind.as_str()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, name = %category.name, "category created");
        Ok(category.with_id(id))
    }

    // ── Transactions ──────────────────────────────────────────

    fn transactions(&self) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY date DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], transaction_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn transaction_by_id(&self, id: i64) -> Result<Option<Transaction>> {
        optional(self.conn.query_row(
            &format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1"),
            params![id],
            transaction_from_row,
        ))
    }

    fn insert_transaction(&mut self, txn: NewTransaction) -> Result<Transaction> {
        self.conn.execute(
            "INSERT INTO transactions (description, amount, category_id, date, kind)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                txn.description,
                txn.amount.to_string(),
                txn.category_id,
                txn.date.format(DATE_FORMAT).to_string(),
                txn.kind.as_str(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, "transaction created");
        Ok(txn.with_id(id))
    }

    fn update_transaction(
        &mut self,
        id: i64,
        patch: TransactionPatch,
    ) -> Result<Option<Transaction>> {
        let Some(mut txn) = self.transaction_by_id(id)? else {
            return Ok(None);
        };
        patch.apply(&mut txn);
        self.write_transaction(&txn)
            .with_context(|| format!("Failed to update transaction {id}"))?;
        tracing::debug!(id, "transaction updated");
        Ok(Some(txn))
    }

    fn delete_transaction(&mut self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    // ── Budgets ───────────────────────────────────────────────

    fn budgets(&self) -> Result<Vec<Budget>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {BUDGET_COLUMNS} FROM budgets ORDER BY id"))?;
        let rows = stmt.query_map([], budget_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn budget_by_id(&self, id: i64) -> Result<Option<Budget>> {
        optional(self.conn.query_row(
            &format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = ?1"),
            params![id],
            budget_from_row,
        ))
    }

    fn insert_budget(&mut self, budget: NewBudget) -> Result<Budget> {
        self.conn.execute(
            "INSERT INTO budgets (category_id, amount, month, year) VALUES (?1, ?2, ?3, ?4)",
            params![
                budget.category_id,
                budget.amount.to_string(),
                budget.month,
                budget.year,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, "budget created");
        Ok(budget.with_id(id))
    }

    fn update_budget(&mut self, id: i64, patch: BudgetPatch) -> Result<Option<Budget>> {
        let Some(mut budget) = self.budget_by_id(id)? else {
            return Ok(None);
        };
        patch.apply(&mut budget);
        self.write_budget(&budget)
            .with_context(|| format!("Failed to update budget {id}"))?;
        tracing::debug!(id, "budget updated");
        Ok(Some(budget))
    }

    fn delete_budget(&mut self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM budgets WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}
