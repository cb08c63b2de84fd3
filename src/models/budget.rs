use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CategoryLabel;

/// A spending ceiling for one category in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    /// 1-12
    pub month: u32,
    pub year: i32,
}

impl Budget {
    pub fn covers(&self, month: u32, year: i32) -> bool {
        self.month == month && self.year == year
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub category_id: i64,
    pub amount: Decimal,
    pub month: u32,
    pub year: i32,
}

impl NewBudget {
    pub fn new(category_id: i64, amount: Decimal, month: u32, year: i32) -> Self {
        Self {
            category_id,
            amount,
            month,
            year,
        }
    }

    pub(crate) fn with_id(self, id: i64) -> Budget {
        Budget {
            id,
            category_id: self.category_id,
            amount: self.amount,
            month: self.month,
            year: self.year,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetPatch {
    pub category_id: Option<i64>,
    pub amount: Option<Decimal>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl BudgetPatch {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.amount.is_none()
            && self.month.is_none()
            && self.year.is_none()
    }

    pub fn apply(self, budget: &mut Budget) {
        if let Some(category_id) = self.category_id {
            budget.category_id = category_id;
        }
        if let Some(amount) = self.amount {
            budget.amount = amount;
        }
        if let Some(month) = self.month {
            budget.month = month;
        }
        if let Some(year) = self.year {
            budget.year = year;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetWithCategory {
    #[serde(flatten)]
    pub budget: Budget,
    pub category: CategoryLabel,
}
