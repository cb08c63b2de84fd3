use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CategoryLabel, EntryKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub description: String,
    /// Always a non-negative magnitude.
    pub amount: Decimal,
    pub category_id: i64,
    /// Local wall-clock time.
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == EntryKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == EntryKind::Expense
    }

    /// The amount with the direction applied: negative for expenses.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            EntryKind::Income => self.amount,
            EntryKind::Expense => -self.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub description: String,
    pub amount: Decimal,
    pub category_id: i64,
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl NewTransaction {
    pub(crate) fn with_id(self, id: i64) -> Transaction {
        Transaction {
            id,
            description: self.description,
            amount: self.amount,
            category_id: self.category_id,
            date: self.date,
            kind: self.kind,
        }
    }
}

/// A partial update: only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category_id: Option<i64>,
    pub date: Option<NaiveDateTime>,
    pub kind: Option<EntryKind>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.category_id.is_none()
            && self.date.is_none()
            && self.kind.is_none()
    }

    pub fn apply(self, txn: &mut Transaction) {
        if let Some(description) = self.description {
            txn.description = description;
        }
        if let Some(amount) = self.amount {
            txn.amount = amount;
        }
        if let Some(category_id) = self.category_id {
            txn.category_id = category_id;
        }
        if let Some(date) = self.date {
            txn.date = date;
        }
        if let Some(kind) = self.kind {
            txn.kind = kind;
        }
    }
}

/// Filters for listing transactions. Bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub category_id: Option<i64>,
    pub kind: Option<EntryKind>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl TransactionFilter {
    pub fn matches(&self, txn: &Transaction) -> bool {
        self.category_id.map_or(true, |id| txn.category_id == id)
            && self.kind.map_or(true, |k| txn.kind == k)
            && self.start.map_or(true, |s| txn.date >= s)
            && self.end.map_or(true, |e| txn.date <= e)
            && self.min_amount.map_or(true, |m| txn.amount >= m)
            && self.max_amount.map_or(true, |m| txn.amount <= m)
    }
}

/// A transaction joined with its category's display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionWithCategory {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: CategoryLabel,
}
