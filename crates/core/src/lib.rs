pub mod account;
pub mod aggregate;
pub mod category;
pub mod money;
pub mod period;
pub mod rule;
pub mod transaction;

pub use account::{Account, AccountId, DEFAULT_ACCOUNTS};
pub use aggregate::{
    build_tree, is_internal_transfer, monthly_cashflow, summarize, CashflowBucket, CategoryTree,
    ParentNode, SubNode, Summary, INTERNAL_TRANSFER_PARENTS,
};
pub use category::{Category, CategoryId, CategoryIndex, UNCATEGORIZED_LABEL};
pub use money::Money;
pub use period::DateRange;
pub use rule::{CategorizationRule, MatchField, RuleError};
pub use transaction::{Transaction, TransactionType};
