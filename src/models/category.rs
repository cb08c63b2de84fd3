use serde::{Deserialize, Serialize};

use super::EntryKind;

/// Display name used when a referenced category cannot be resolved.
pub const FALLBACK_CATEGORY_NAME: &str = "Unknown";
/// Neutral color used when a referenced category cannot be resolved.
pub const FALLBACK_CATEGORY_COLOR: &str = "#64748b";
pub const FALLBACK_CATEGORY_ICON: &str = "fas fa-question";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub icon: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl Category {
    /// Find a category by name (case-insensitive) in a slice.
    pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        let lower = name.to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }

    /// Find a category by ID in a slice.
    pub fn find_by_id(categories: &[Category], id: i64) -> Option<&Category> {
        categories.iter().find(|c| c.id == id)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
    pub icon: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl NewCategory {
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        icon: impl Into<String>,
        kind: EntryKind,
    ) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            icon: icon.into(),
            kind,
        }
    }

    pub(crate) fn with_id(self, id: i64) -> Category {
        Category {
            id,
            name: self.name,
            color: self.color,
            icon: self.icon,
            kind: self.kind,
        }
    }
}

/// The display side of a category as seen from a transaction or budget.
/// Built from a resolved [`Category`] or from the fallback values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLabel {
    pub id: Option<i64>,
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl CategoryLabel {
    pub fn unknown() -> Self {
        Self {
            id: None,
            name: FALLBACK_CATEGORY_NAME.to_string(),
            color: FALLBACK_CATEGORY_COLOR.to_string(),
            icon: FALLBACK_CATEGORY_ICON.to_string(),
        }
    }

    /// Resolve `id` against `categories`, degrading to [`CategoryLabel::unknown`].
    pub fn resolve(categories: &[Category], id: i64) -> Self {
        match Category::find_by_id(categories, id) {
            Some(c) => Self::from(c),
            None => {
                tracing::warn!(category_id = id, "category not found, using fallback");
                Self::unknown()
            }
        }
    }
}

impl From<&Category> for CategoryLabel {
    fn from(c: &Category) -> Self {
        Self {
            id: Some(c.id),
            name: c.name.clone(),
            color: c.color.clone(),
            icon: c.icon.clone(),
        }
    }
}

/// Categories seeded into an empty store.
pub fn default_categories() -> Vec<NewCategory> {
    use EntryKind::{Expense, Income};
    [
        ("Food & Dining", "#f97316", "fas fa-utensils", Expense),
        ("Transportation", "#eab308", "fas fa-car", Expense),
        ("Housing", "#8b5cf6", "fas fa-home", Expense),
        ("Entertainment", "#3b82f6", "fas fa-gamepad", Expense),
        ("Shopping", "#ef4444", "fas fa-shopping-bag", Expense),
        ("Healthcare", "#06b6d4", "fas fa-heartbeat", Expense),
        ("Other Expense", "#64748b", "fas fa-ellipsis-h", Expense),
        ("Salary", "#059669", "fas fa-money-bill", Income),
        ("Business", "#10b981", "fas fa-briefcase", Income),
        ("Investment", "#34d399", "fas fa-chart-line", Income),
        ("Gift", "#6ee7b7", "fas fa-gift", Income),
        ("Other Income", "#a7f3d0", "fas fa-plus-circle", Income),
    ]
    .into_iter()
    .map(|(name, color, icon, kind)| NewCategory::new(name, color, icon, kind))
    .collect()
}
