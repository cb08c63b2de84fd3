//! Command-line front end over a [`Ledger`](crate::ledger::Ledger).

mod cli;
mod util;

pub use cli::{as_cli, print_usage, run_command};
pub(crate) use util::shellexpand;
