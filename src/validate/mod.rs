//! Turns raw, untyped input into store records.
//!
//! Mirrors the insert schemas of the outer layer: every required field must
//! be present and well-formed before anything reaches the [`Ledger`].
//! Partial forms validate only the fields they carry.
//!
//! [`Ledger`]: crate::ledger::Ledger

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use crate::models::*;

/// Lowest year a budget may target.
pub const MIN_BUDGET_YEAR: i32 = 2000;

/// Largest amount a single transaction or budget may carry.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Amount must be positive")]
    NonPositiveAmount,
    #[error("Amount must not exceed 1,000,000,000")]
    AmountTooLarge,
    #[error("Invalid amount: '{0}'")]
    InvalidAmount(String),
    #[error("Invalid date: '{0}'")]
    InvalidDate(String),
    #[error("Type must be 'income' or 'expense', got '{0}'")]
    InvalidKind(String),
    #[error("Month must be between 1 and 12, got '{0}'")]
    InvalidMonth(String),
    #[error("Year must be 2000 or later, got '{0}'")]
    InvalidYear(String),
    #[error("Invalid {field} id: '{value}'")]
    InvalidId { field: &'static str, value: String },
}

type Validated<T> = Result<T, ValidationError>;

// ── Field parsers ─────────────────────────────────────────────

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Validated<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// Parse a strictly positive amount no larger than [`MAX_AMOUNT`]. Accepts
/// `$` and thousands separators.
pub fn parse_amount(s: &str) -> Validated<Decimal> {
    let cleaned = s.replace(['$', ','], "");
    let amount = Decimal::from_str(cleaned.trim())
        .map_err(|_| ValidationError::InvalidAmount(s.to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge);
    }
    Ok(amount)
}

/// Parse a transaction date into local wall-clock time.
///
/// Accepts RFC 3339 (converted to local time), `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD HH:MM:SS`, and date-only forms (`YYYY-MM-DD`, `MM/DD/YYYY`),
/// which land at midnight.
pub fn parse_date(s: &str) -> Validated<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d.and_time(NaiveTime::MIN));
        }
    }
    Err(ValidationError::InvalidDate(s.to_string()))
}

pub fn parse_kind(s: &str) -> Validated<EntryKind> {
    EntryKind::parse(s).ok_or_else(|| ValidationError::InvalidKind(s.to_string()))
}

pub fn parse_id(s: &str, field: &'static str) -> Validated<i64> {
    s.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidId {
            field,
            value: s.to_string(),
        })
}

pub fn parse_month(s: &str) -> Validated<u32> {
    match s.trim().parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => Ok(m),
        _ => Err(ValidationError::InvalidMonth(s.to_string())),
    }
}

pub fn parse_year(s: &str) -> Validated<i32> {
    match s.trim().parse::<i32>() {
        Ok(y) if y >= MIN_BUDGET_YEAR => Ok(y),
        _ => Err(ValidationError::InvalidYear(s.to_string())),
    }
}

// ── Forms ─────────────────────────────────────────────────────

/// Raw category input.
#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub kind: Option<String>,
}

impl CategoryForm {
    pub fn validate(&self) -> Validated<NewCategory> {
        Ok(NewCategory {
            name: required(self.name.as_deref(), "Name")?.to_string(),
            color: required(self.color.as_deref(), "Color")?.to_string(),
            icon: required(self.icon.as_deref(), "Icon")?.to_string(),
            kind: parse_kind(required(self.kind.as_deref(), "Type")?)?,
        })
    }
}

/// Raw transaction input, as received from a request body or command line.
#[derive(Debug, Clone, Default)]
pub struct TransactionForm {
    pub description: Option<String>,
    pub amount: Option<String>,
    pub category_id: Option<String>,
    pub date: Option<String>,
    pub kind: Option<String>,
}

impl TransactionForm {
    /// Full validation for creation: every field is required.
    pub fn validate(&self) -> Validated<NewTransaction> {
        Ok(NewTransaction {
            description: required(self.description.as_deref(), "Description")?.to_string(),
            amount: parse_amount(required(self.amount.as_deref(), "Amount")?)?,
            category_id: parse_id(required(self.category_id.as_deref(), "Category")?, "category")?,
            date: parse_date(required(self.date.as_deref(), "Date")?)?,
            kind: parse_kind(required(self.kind.as_deref(), "Type")?)?,
        })
    }

    /// Partial validation for updates: absent fields stay unchanged, present
    /// ones must still be well-formed.
    pub fn validate_patch(&self) -> Validated<TransactionPatch> {
        Ok(TransactionPatch {
            description: self
                .description
                .as_deref()
                .map(|d| required(Some(d), "Description").map(str::to_string))
                .transpose()?,
            amount: self.amount.as_deref().map(parse_amount).transpose()?,
            category_id: self
                .category_id
                .as_deref()
                .map(|id| parse_id(id, "category"))
                .transpose()?,
            date: self.date.as_deref().map(parse_date).transpose()?,
            kind: self.kind.as_deref().map(parse_kind).transpose()?,
        })
    }
}

/// Raw budget input.
#[derive(Debug, Clone, Default)]
pub struct BudgetForm {
    pub category_id: Option<String>,
    pub amount: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
}

impl BudgetForm {
    pub fn validate(&self) -> Validated<NewBudget> {
        Ok(NewBudget {
            category_id: parse_id(required(self.category_id.as_deref(), "Category")?, "category")?,
            amount: parse_amount(required(self.amount.as_deref(), "Amount")?)?,
            month: parse_month(required(self.month.as_deref(), "Month")?)?,
            year: parse_year(required(self.year.as_deref(), "Year")?)?,
        })
    }

    pub fn validate_patch(&self) -> Validated<BudgetPatch> {
        Ok(BudgetPatch {
            category_id: self
                .category_id
                .as_deref()
                .map(|id| parse_id(id, "category"))
                .transpose()?,
            amount: self.amount.as_deref().map(parse_amount).transpose()?,
            month: self.month.as_deref().map(parse_month).transpose()?,
            year: self.year.as_deref().map(parse_year).transpose()?,
        })
    }
}
