// category_id columns deliberately carry no REFERENCES clause: a transaction
// or budget may point at a category that does not exist.
pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    name   TEXT NOT NULL,
    color  TEXT NOT NULL DEFAULT '',
    icon   TEXT NOT NULL DEFAULT '',
    kind   TEXT NOT NULL DEFAULT 'expense'
);

CREATE TABLE IF NOT EXISTS transactions (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    description  TEXT NOT NULL,
    amount       TEXT NOT NULL,
    category_id  INTEGER NOT NULL,
    date         TEXT NOT NULL,
    kind         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);

CREATE TABLE IF NOT EXISTS budgets (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id  INTEGER NOT NULL,
    amount       TEXT NOT NULL,
    month        INTEGER NOT NULL,
    year         INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_budgets_period ON budgets(year, month);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Dates are stored as sortable local wall-clock text; `%.f` keeps any
/// fractional seconds and is omitted when there are none.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
