use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Label applied wherever a transaction has no resolvable category, or a
/// category carries an empty parent/sub label.
pub const UNCATEGORIZED_LABEL: &str = "Non catégorisé";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A leaf category. `parent_category` and `sub_category` are denormalized
/// grouping labels, not foreign keys; the (parent, sub, name) triple is not
/// required to be unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent_category: String,
    pub sub_category: String,
}

/// Resolution step from a transaction's category reference to the canonical
/// grouping labels. Built once from the catalog per query, so aggregation
/// never re-derives labels ad hoc.
#[derive(Debug, Default)]
pub struct CategoryIndex {
    by_id: HashMap<CategoryId, Category>,
}

impl CategoryIndex {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            by_id: categories.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.by_id.get(&id)
    }

    pub fn name_of(&self, id: CategoryId) -> Option<&str> {
        self.by_id.get(&id).map(|c| c.name.as_str())
    }

    /// (parent, sub) labels for a category reference, with the
    /// uncategorized fallback filling any hole.
    pub fn labels_for(&self, id: Option<CategoryId>) -> (&str, &str) {
        match id.and_then(|id| self.by_id.get(&id)) {
            Some(cat) => (
                non_empty_or_default(&cat.parent_category),
                non_empty_or_default(&cat.sub_category),
            ),
            None => (UNCATEGORIZED_LABEL, UNCATEGORIZED_LABEL),
        }
    }
}

fn non_empty_or_default(label: &str) -> &str {
    if label.trim().is_empty() {
        UNCATEGORIZED_LABEL
    } else {
        label
    }
}
