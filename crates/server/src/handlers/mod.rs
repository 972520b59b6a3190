pub mod accounts;
pub mod analytics;
pub mod categories;
pub mod import;
pub mod rules;
pub mod transactions;
