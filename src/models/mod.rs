mod budget;
mod category;
mod kind;
mod transaction;

pub use budget::{Budget, BudgetPatch, BudgetWithCategory, NewBudget};
pub use category::{
    default_categories, Category, CategoryLabel, NewCategory, FALLBACK_CATEGORY_COLOR,
    FALLBACK_CATEGORY_ICON, FALLBACK_CATEGORY_NAME,
};
pub use kind::EntryKind;
pub use transaction::{
    NewTransaction, Transaction, TransactionFilter, TransactionPatch, TransactionWithCategory,
};
