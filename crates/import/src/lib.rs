pub mod csv;
pub mod rules;

pub use csv::{
    parse_statement, BankProfile, CsvError, ImportStats, ParsedRow, RowError, RowOutcome,
};
pub use rules::RuleEngine;
