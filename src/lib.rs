//! fintrack: personal finance tracking over a pluggable store.
//!
//! [`store`] persists categories, transactions and budgets; [`analytics`]
//! derives summaries, trends, forecasts and budget performance from a
//! snapshot; [`ledger::Ledger`] ties the two together behind one surface.

pub mod analytics;
pub mod export;
pub mod ledger;
pub mod models;
pub mod run;
pub mod settings;
pub mod store;
pub mod validate;

pub use ledger::Ledger;
