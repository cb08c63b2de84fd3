#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{CategoryLabel, EntryKind, NewCategory, NewTransaction};

fn row(id: i64, description: &str, amount: Decimal, kind: EntryKind) -> TransactionWithCategory {
    let category = NewCategory::new("Food & Dining", "#f97316", "fas fa-utensils", kind).with_id(1);
    TransactionWithCategory {
        transaction: NewTransaction {
            description: description.into(),
            amount,
            category_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 7, 2)
                .unwrap()
                .and_hms_opt(18, 45, 0)
                .unwrap(),
            kind,
        }
        .with_id(id),
        category: CategoryLabel::from(&category),
    }
}

fn csv_text(rows: &[TransactionWithCategory]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    Ok(String::from_utf8(buf).unwrap())
}

#[test]
fn test_format_parse() {
    assert_eq!(ExportFormat::parse("CSV"), Some(ExportFormat::Csv));
    assert_eq!(ExportFormat::parse("json"), Some(ExportFormat::Json));
    assert_eq!(ExportFormat::parse("xlsx"), None);
    assert_eq!(ExportFormat::default().extension(), "csv");
}

#[test]
fn test_csv_header_and_rows() {
    let rows = vec![
        row(1, "Whole Foods", dec!(125.50), EntryKind::Expense),
        row(2, "Dinner, with friends", dec!(40), EntryKind::Expense),
    ];
    let out = csv_text(&rows).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Date,Description,Amount,Type,Category");
    assert_eq!(lines[1], "2025-07-02,Whole Foods,125.50,expense,Food & Dining");
    assert_eq!(lines[2], "2025-07-02,\"Dinner, with friends\",40,expense,Food & Dining");
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_csv_empty_has_header_only() {
    let out = csv_text(&[]).unwrap();
    assert_eq!(out.trim_end(), "Date,Description,Amount,Type,Category");
}

#[test]
fn test_csv_uses_fallback_category_name() {
    let mut r = row(1, "Mystery", dec!(9.99), EntryKind::Expense);
    r.category = CategoryLabel::unknown();
    let out = csv_text(&[r]).unwrap();
    assert!(out.lines().nth(1).unwrap().ends_with(",Unknown"));
}

#[test]
fn test_json_nests_category() {
    let mut buf = Vec::new();
    write_json(&[row(7, "Paycheck", dec!(5200), EntryKind::Income)], &mut buf).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(value[0]["id"], 7);
    assert_eq!(value[0]["type"], "income");
    assert_eq!(value[0]["category"]["name"], "Food & Dining");
}

#[test]
fn test_export_to_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let rows = vec![row(1, "Coffee", dec!(4.25), EntryKind::Expense)];
    assert_eq!(export_to_path(&rows, &path, ExportFormat::Csv).unwrap(), 1);
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("2025-07-02,Coffee,4.25,expense,Food & Dining"));

    let json_path = dir.path().join("out.json");
    export_to_path(&rows, &json_path, ExportFormat::Json).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);
}

#[test]
fn test_export_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope").join("out.csv");
    assert!(export_to_path(&[], &path, ExportFormat::Csv).is_err());
}
