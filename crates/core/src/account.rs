use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bank account transactions are imported into. The balance is read for
/// display only; nothing in the core reconciles it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub account_type: Option<String>,
    pub balance: Money,
    pub is_active: bool,
}

/// Seeded at first startup so a fresh database is immediately usable.
pub const DEFAULT_ACCOUNTS: &[(&str, &str)] = &[
    ("BoursoBank", "checking"),
    ("Livret A", "savings"),
    ("PEA", "investment"),
];
