pub mod accounts;
pub mod categories;
pub mod db;
pub mod rules;
pub mod transactions;

pub use accounts::{get_account, get_all_accounts};
pub use categories::{get_all_categories, get_category, insert_category};
pub use db::{create_db, seed_default_accounts, DbPool};
pub use rules::{get_active_rules, get_all_rules, insert_rule};
pub use transactions::{
    get_transaction, get_transactions_in_range, get_uncategorized_transactions,
    insert_transaction, set_transaction_category, transaction_exists, NewTransaction,
};
