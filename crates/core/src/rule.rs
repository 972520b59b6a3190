use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::category::CategoryId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("rule keyword must not be empty")]
    EmptyKeyword,
    #[error("unknown match field: '{0}'")]
    UnknownMatchField(String),
}

/// Which transaction text field a rule's keyword is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Description,
    Merchant,
}

impl MatchField {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchField::Description => "description",
            MatchField::Merchant => "merchant",
        }
    }
}

impl std::str::FromStr for MatchField {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "description" => Ok(MatchField::Description),
            "merchant" => Ok(MatchField::Merchant),
            other => Err(RuleError::UnknownMatchField(other.to_string())),
        }
    }
}

/// A keyword-to-category binding. Rules fire oldest-first; the engine in
/// the import crate carries the matching algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizationRule {
    pub id: i64,
    pub keyword: String,
    pub category_id: CategoryId,
    pub match_field: MatchField,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl CategorizationRule {
    /// An empty keyword would be contained in every string, so it is
    /// rejected at the creation boundary.
    pub fn validate_keyword(keyword: &str) -> Result<(), RuleError> {
        if keyword.trim().is_empty() {
            Err(RuleError::EmptyKeyword)
        } else {
            Ok(())
        }
    }
}
