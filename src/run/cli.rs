use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveTime};
use rust_decimal::Decimal;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use super::util::{format_amount, format_percent, shellexpand, truncate};
use crate::analytics::{
    self,
    period::{DateFilter, DateRange},
    MAX_SERIES_MONTHS,
};
use crate::export::{self, ExportFormat};
use crate::ledger::Ledger;
use crate::models::*;
use crate::validate::{self, BudgetForm, CategoryForm, TransactionForm};

const DEFAULT_SERIES_MONTHS: u32 = 6;
const DEFAULT_FORECAST_MONTHS: u32 = 3;

/// Run one command, printing to stdout. `args[0]` is the command name.
pub fn as_cli(args: &[String], ledger: &mut Ledger) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_command(args, ledger, &mut out)
}

pub fn run_command(args: &[String], ledger: &mut Ledger, out: &mut dyn Write) -> Result<()> {
    let Some(command) = args.first() else {
        print_usage(out)?;
        return Ok(());
    };
    let rest = &args[1..];
    tracing::debug!(command = %command, "running command");
    match command.as_str() {
        "summary" | "s" => cli_summary(ledger, out),
        "monthly" => cli_monthly(rest, ledger, out),
        "trends" => cli_trends(rest, ledger, out),
        "forecast" => cli_forecast(rest, ledger, out),
        "breakdown" => cli_breakdown(rest, ledger, out),
        "budgets" => cli_budgets(ledger, out),
        "performance" => cli_performance(ledger, out),
        "categories" => cli_categories(rest, ledger, out),
        "add-category" => cli_add_category(rest, ledger, out),
        "list" | "ls" => cli_list(rest, ledger, out),
        "add" => cli_add(rest, ledger, out),
        "update" => cli_update(rest, ledger, out),
        "delete" | "rm" => cli_delete(rest, ledger, out),
        "add-budget" => cli_add_budget(rest, ledger, out),
        "update-budget" => cli_update_budget(rest, ledger, out),
        "delete-budget" => cli_delete_budget(rest, ledger, out),
        "export" => cli_export(rest, ledger, out),
        "--help" | "-h" | "help" => print_usage(out),
        "--version" | "-V" | "version" => {
            writeln!(out, "fintrack {}", env!("CARGO_PKG_VERSION"))?;
            Ok(())
        }
        other => {
            print_usage(out)?;
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

pub fn print_usage(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "fintrack - personal finance tracker")?;
    writeln!(out)?;
    writeln!(out, "Usage: fintrack [--memory] <command>")?;
    writeln!(out)?;
    writeln!(out, "Analytics:")?;
    writeln!(out, "  summary                       Balance, this month's income/expenses, savings rate")?;
    writeln!(out, "  monthly [N]                   Expenses for the last N months (default 6)")?;
    writeln!(out, "  trends [N]                    Income, expenses and savings per month (default 6)")?;
    writeln!(out, "  forecast [N]                  Projected expenses for the next N months (default 3)")?;
    writeln!(out, "  breakdown [--filter F]        Expenses by category; F is one of:")?;
    let presets: Vec<&str> = DateFilter::all().iter().map(|f| f.as_str()).collect();
    writeln!(out, "                                {}", presets.join(", "))?;
    writeln!(out, "  performance                   This month's budgets against actual spending")?;
    writeln!(out)?;
    writeln!(out, "Records:")?;
    writeln!(out, "  list                          List transactions, newest first")?;
    writeln!(out, "    --category <id|name> --type <income|expense>")?;
    writeln!(out, "    --from <date> --to <date> --min <amount> --max <amount>")?;
    writeln!(out, "  add                           Record a transaction")?;
    writeln!(out, "    --description <text> --amount <n> --category <id|name>")?;
    writeln!(out, "    --type <income|expense> [--date <date>] (default: now)")?;
    writeln!(out, "  update <id> [fields]          Change fields of a transaction")?;
    writeln!(out, "  delete <id>                   Delete a transaction")?;
    writeln!(out, "  categories [income|expense]   List categories")?;
    writeln!(out, "  add-category                  --name --color --icon --type")?;
    writeln!(out, "  budgets                       List budgets")?;
    writeln!(out, "  add-budget                    --category --amount [--month] [--year]")?;
    writeln!(out, "  update-budget <id> [fields]   Change fields of a budget")?;
    writeln!(out, "  delete-budget <id>            Delete a budget")?;
    writeln!(out, "  export [path]                 Export transactions")?;
    writeln!(out, "    --format <csv|json> --from <date> --to <date>")?;
    writeln!(out)?;
    writeln!(out, "  --memory                      Use a throwaway in-memory store")?;
    writeln!(out, "  --help, -h                    Show this help")?;
    writeln!(out, "  --version, -V                 Show version")?;
    Ok(())
}

// ── Argument helpers ─────────────────────────────────────────

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn positional(args: &[String]) -> Option<&str> {
    args.first()
        .filter(|a| !a.starts_with('-'))
        .map(String::as_str)
}

fn count_arg(args: &[String], default: u32) -> Result<u32> {
    match positional(args) {
        Some(n) => n
            .parse::<u32>()
            .ok()
            .filter(|n| (1..=MAX_SERIES_MONTHS).contains(n))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Expected a number of months from 1 to {MAX_SERIES_MONTHS}, got '{n}'"
                )
            }),
        None => Ok(default),
    }
}

fn id_arg(args: &[String], usage: &str) -> Result<i64> {
    let raw = positional(args).ok_or_else(|| anyhow::anyhow!("Usage: fintrack {usage}"))?;
    Ok(validate::parse_id(raw, "record")?)
}

/// `--category` accepts either an id or a (case-insensitive) category name.
fn category_ref(args: &[String], ledger: &Ledger) -> Result<Option<String>> {
    let Some(raw) = flag(args, "--category") else {
        return Ok(None);
    };
    if raw.trim().parse::<i64>().is_ok() {
        return Ok(Some(raw.to_string()));
    }
    let categories = ledger.categories()?;
    let category = Category::find_by_name(&categories, raw)
        .ok_or_else(|| anyhow::anyhow!("Category '{raw}' not found"))?;
    Ok(Some(category.id.to_string()))
}

/// Upper date bound. A date without a time covers the whole day.
fn upper_bound(raw: &str) -> Result<chrono::NaiveDateTime> {
    let at = validate::parse_date(raw)?;
    let date_only = !raw.contains(':');
    if date_only && at.time() == NaiveTime::MIN {
        return Ok(at + Duration::days(1) - Duration::seconds(1));
    }
    Ok(at)
}

fn date_range_args(args: &[String]) -> Result<DateRange> {
    let start = flag(args, "--from").map(validate::parse_date).transpose()?;
    let end = flag(args, "--to").map(upper_bound).transpose()?;
    Ok(DateRange::new(start, end))
}

fn decimal_flag(args: &[String], name: &str) -> Result<Option<Decimal>> {
    flag(args, name)
        .map(|raw| {
            Decimal::from_str(raw.replace(['$', ','], "").trim())
                .with_context(|| format!("Invalid amount for {name}: '{raw}'"))
        })
        .transpose()
}

fn transaction_form(args: &[String], ledger: &Ledger) -> Result<TransactionForm> {
    Ok(TransactionForm {
        description: flag(args, "--description").map(str::to_string),
        amount: flag(args, "--amount").map(str::to_string),
        category_id: category_ref(args, ledger)?,
        date: flag(args, "--date").map(str::to_string),
        kind: flag(args, "--type").map(str::to_string),
    })
}

fn budget_form(args: &[String], ledger: &Ledger) -> Result<BudgetForm> {
    Ok(BudgetForm {
        category_id: category_ref(args, ledger)?,
        amount: flag(args, "--amount").map(str::to_string),
        month: flag(args, "--month").map(str::to_string),
        year: flag(args, "--year").map(str::to_string),
    })
}

// ── Analytics ────────────────────────────────────────────────

fn cli_summary(ledger: &Ledger, out: &mut dyn Write) -> Result<()> {
    let stats = ledger.summary_stats()?;
    let month = ledger.current_month();
    writeln!(out, "fintrack - {} {}", month.label(), month.year)?;
    writeln!(out, "{}", "─".repeat(40))?;
    writeln!(out, "  Balance:       {}", format_amount(stats.total_balance))?;
    writeln!(out, "  Income:        {}", format_amount(stats.monthly_income))?;
    writeln!(out, "  Expenses:      {}", format_amount(stats.monthly_expenses))?;
    writeln!(out, "  Savings Rate:  {}", format_percent(stats.savings_rate))?;
    Ok(())
}

fn cli_monthly(args: &[String], ledger: &Ledger, out: &mut dyn Write) -> Result<()> {
    let months = count_arg(args, DEFAULT_SERIES_MONTHS)?;
    for point in ledger.monthly_expenses(months)? {
        writeln!(out, "  {:<5} {:>14}", point.month, format_amount(point.amount))?;
    }
    Ok(())
}

fn cli_trends(args: &[String], ledger: &Ledger, out: &mut dyn Write) -> Result<()> {
    let months = count_arg(args, DEFAULT_SERIES_MONTHS)?;
    writeln!(
        out,
        "  {:<5} {:>14} {:>14} {:>14}",
        "Month", "Income", "Expenses", "Savings"
    )?;
    for point in ledger.spending_trends(months)? {
        writeln!(
            out,
            "  {:<5} {:>14} {:>14} {:>14}",
            point.month,
            format_amount(point.income),
            format_amount(point.expenses),
            format_amount(point.savings),
        )?;
    }
    Ok(())
}

fn cli_forecast(args: &[String], ledger: &Ledger, out: &mut dyn Write) -> Result<()> {
    let months = count_arg(args, DEFAULT_FORECAST_MONTHS)?;
    writeln!(out, "  {:<5} {:>14} {:>11}", "Month", "Predicted", "Confidence")?;
    for point in ledger.spending_forecast(months)? {
        writeln!(
            out,
            "  {:<5} {:>14} {:>11}",
            point.month,
            format_amount(point.predicted),
            format_percent(point.confidence * Decimal::ONE_HUNDRED),
        )?;
    }
    Ok(())
}

fn cli_breakdown(args: &[String], ledger: &Ledger, out: &mut dyn Write) -> Result<()> {
    let filter = match flag(args, "--filter") {
        Some(raw) => {
            DateFilter::parse(raw).ok_or_else(|| anyhow::anyhow!("Unknown filter: {raw}"))?
        }
        None => DateFilter::All,
    };
    let range = match filter {
        DateFilter::All => None,
        preset => Some(preset.range(ledger.now())),
    };
    let breakdown = ledger.category_expenses(range)?;
    if breakdown.is_empty() {
        writeln!(out, "No expenses ({filter})")?;
        return Ok(());
    }
    let total = breakdown
        .iter()
        .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.amount));
    for entry in &breakdown {
        let share = analytics::percentage(entry.amount, total);
        writeln!(
            out,
            "  {:<24} {:>14} {:>8}",
            truncate(&entry.category, 24),
            format_amount(entry.amount),
            format_percent(share),
        )?;
    }
    Ok(())
}

fn cli_performance(ledger: &Ledger, out: &mut dyn Write) -> Result<()> {
    let performance = ledger.budget_performance()?;
    if performance.is_empty() {
        let month = ledger.current_month();
        writeln!(out, "No budgets for {} {}", month.label(), month.year)?;
        return Ok(());
    }
    writeln!(
        out,
        "  {:<24} {:>12} {:>12} {:>12} {:>8}",
        "Category", "Budget", "Actual", "Variance", "Used"
    )?;
    for p in &performance {
        writeln!(
            out,
            "  {:<24} {:>12} {:>12} {:>12} {:>8}",
            truncate(&p.category_name, 24),
            format_amount(p.budget_amount),
            format_amount(p.actual_amount),
            format_amount(p.variance),
            format_percent(p.percentage_used),
        )?;
    }
    Ok(())
}

// ── Categories ───────────────────────────────────────────────

fn cli_categories(args: &[String], ledger: &Ledger, out: &mut dyn Write) -> Result<()> {
    let categories = match positional(args) {
        Some(kind) => ledger.categories_by_kind(validate::parse_kind(kind)?)?,
        None => ledger.categories()?,
    };
    writeln!(out, "{:<4} {:<24} {:<8} {:<8} Icon", "ID", "Name", "Type", "Color")?;
    writeln!(out, "{}", "─".repeat(60))?;
    for c in &categories {
        writeln!(
            out,
            "{:<4} {:<24} {:<8} {:<8} {}",
            c.id,
            c.name,
            c.kind.as_str(),
            c.color,
            c.icon
        )?;
    }
    Ok(())
}

fn cli_add_category(args: &[String], ledger: &mut Ledger, out: &mut dyn Write) -> Result<()> {
    let form = CategoryForm {
        name: flag(args, "--name").map(str::to_string),
        color: flag(args, "--color").map(str::to_string),
        icon: flag(args, "--icon").map(str::to_string),
        kind: flag(args, "--type").map(str::to_string),
    };
    let category = ledger.create_category(form.validate()?)?;
    writeln!(out, "Created category {} ({})", category.id, category.name)?;
    Ok(())
}

// ── Transactions ─────────────────────────────────────────────

fn cli_list(args: &[String], ledger: &Ledger, out: &mut dyn Write) -> Result<()> {
    let range = date_range_args(args)?;
    let filter = TransactionFilter {
        category_id: category_ref(args, ledger)?
            .map(|id| validate::parse_id(&id, "category"))
            .transpose()?,
        kind: flag(args, "--type").map(validate::parse_kind).transpose()?,
        start: range.start,
        end: range.end,
        min_amount: decimal_flag(args, "--min")?,
        max_amount: decimal_flag(args, "--max")?,
    };
    let txns = ledger.transactions_filtered(&filter)?;
    if txns.is_empty() {
        writeln!(out, "No transactions")?;
        return Ok(());
    }
    let categories = ledger.categories()?;
    writeln!(
        out,
        "{:<5} {:<10} {:<30} {:>12} {:<8} Category",
        "ID", "Date", "Description", "Amount", "Type"
    )?;
    writeln!(out, "{}", "─".repeat(86))?;
    for t in &txns {
        let category = CategoryLabel::resolve(&categories, t.category_id);
        writeln!(
            out,
            "{:<5} {:<10} {:<30} {:>12} {:<8} {}",
            t.id,
            t.date.format("%Y-%m-%d"),
            truncate(&t.description, 30),
            format_amount(t.signed_amount()),
            t.kind.as_str(),
            category.name,
        )?;
    }
    Ok(())
}

fn cli_add(args: &[String], ledger: &mut Ledger, out: &mut dyn Write) -> Result<()> {
    let mut form = transaction_form(args, ledger)?;
    if form.date.is_none() {
        form.date = Some(ledger.now().format("%Y-%m-%dT%H:%M:%S").to_string());
    }
    let txn = ledger.create_transaction(form.validate()?)?;
    writeln!(
        out,
        "Created transaction {}: {} {} on {}",
        txn.id,
        txn.kind,
        format_amount(txn.amount),
        txn.date.format("%Y-%m-%d")
    )?;
    Ok(())
}

fn cli_update(args: &[String], ledger: &mut Ledger, out: &mut dyn Write) -> Result<()> {
    let id = id_arg(args, "update <id> [--description ..] [--amount ..] ...")?;
    let patch = transaction_form(&args[1..], ledger)?.validate_patch()?;
    if patch.is_empty() {
        anyhow::bail!("Nothing to update");
    }
    match ledger.update_transaction(id, patch)? {
        Some(txn) => writeln!(out, "Updated transaction {}", txn.id)?,
        None => anyhow::bail!("Transaction {id} not found"),
    }
    Ok(())
}

fn cli_delete(args: &[String], ledger: &mut Ledger, out: &mut dyn Write) -> Result<()> {
    let id = id_arg(args, "delete <id>")?;
    if ledger.delete_transaction(id)? {
        writeln!(out, "Deleted transaction {id}")?;
    } else {
        writeln!(out, "Transaction {id} not found")?;
    }
    Ok(())
}

// ── Budgets ──────────────────────────────────────────────────

fn cli_budgets(ledger: &Ledger, out: &mut dyn Write) -> Result<()> {
    let budgets = ledger.budgets()?;
    if budgets.is_empty() {
        writeln!(out, "No budgets")?;
        return Ok(());
    }
    writeln!(out, "{:<4} {:<24} {:>12} Period", "ID", "Category", "Amount")?;
    writeln!(out, "{}", "─".repeat(52))?;
    for b in &budgets {
        writeln!(
            out,
            "{:<4} {:<24} {:>12} {}-{:02}",
            b.budget.id,
            truncate(&b.category.name, 24),
            format_amount(b.budget.amount),
            b.budget.year,
            b.budget.month,
        )?;
    }
    Ok(())
}

fn cli_add_budget(args: &[String], ledger: &mut Ledger, out: &mut dyn Write) -> Result<()> {
    let mut form = budget_form(args, ledger)?;
    let now = ledger.now();
    form.month.get_or_insert_with(|| now.month().to_string());
    form.year.get_or_insert_with(|| now.year().to_string());
    let budget = ledger.create_budget(form.validate()?)?;
    writeln!(
        out,
        "Created budget {}: {} for {}-{:02}",
        budget.id,
        format_amount(budget.amount),
        budget.year,
        budget.month
    )?;
    Ok(())
}

fn cli_update_budget(args: &[String], ledger: &mut Ledger, out: &mut dyn Write) -> Result<()> {
    let id = id_arg(args, "update-budget <id> [--amount ..] [--month ..] ...")?;
    let patch = budget_form(&args[1..], ledger)?.validate_patch()?;
    if patch.is_empty() {
        anyhow::bail!("Nothing to update");
    }
    match ledger.update_budget(id, patch)? {
        Some(budget) => writeln!(out, "Updated budget {}", budget.id)?,
        None => anyhow::bail!("Budget {id} not found"),
    }
    Ok(())
}

fn cli_delete_budget(args: &[String], ledger: &mut Ledger, out: &mut dyn Write) -> Result<()> {
    let id = id_arg(args, "delete-budget <id>")?;
    if ledger.delete_budget(id)? {
        writeln!(out, "Deleted budget {id}")?;
    } else {
        writeln!(out, "Budget {id} not found")?;
    }
    Ok(())
}

// ── Export ───────────────────────────────────────────────────

fn cli_export(args: &[String], ledger: &Ledger, out: &mut dyn Write) -> Result<()> {
    let format = match flag(args, "--format") {
        Some(raw) => {
            ExportFormat::parse(raw).ok_or_else(|| anyhow::anyhow!("Unknown format: {raw}"))?
        }
        None => ExportFormat::Csv,
    };
    let range = date_range_args(args)?;

    // Output path is the first non-flag argument
    let output_path = positional(args).map(shellexpand).unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let stamp = ledger.now().format("%Y-%m-%d");
        format!("{home}/fintrack-export-{stamp}.{}", format.extension())
    });

    let rows = ledger.transactions_for_export(range)?;
    let count = export::export_to_path(&rows, &PathBuf::from(&output_path), format)?;
    if count == 0 {
        writeln!(out, "No transactions to export; wrote empty file {output_path}")?;
    } else {
        writeln!(out, "Exported {count} transactions to {output_path}")?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
