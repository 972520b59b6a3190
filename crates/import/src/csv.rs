use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use centime_core::{Money, TransactionType};

/// Per-source-bank parsing parameters. Bank exports disagree on delimiter,
/// date format, decimal convention, and column naming, so the parser never
/// hard-codes any of them. The built-in default is the Boursorama export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BankProfile {
    pub name: String,
    pub delimiter: String,
    pub has_header: bool,
    pub date_format: String,
    /// `true` when the source writes `-42,50` instead of `-42.50`.
    pub decimal_comma: bool,
    pub date_header: String,
    pub description_header: String,
    pub amount_header: String,
    pub merchant_header: String,
    pub category_header: String,
}

impl Default for BankProfile {
    fn default() -> Self {
        Self::boursorama()
    }
}

impl BankProfile {
    pub fn boursorama() -> Self {
        Self {
            name: "boursorama".to_string(),
            delimiter: ";".to_string(),
            has_header: true,
            date_format: "%Y-%m-%d".to_string(),
            decimal_comma: true,
            date_header: "dateOp".to_string(),
            description_header: "label".to_string(),
            amount_header: "amount".to_string(),
            merchant_header: "supplierFound".to_string(),
            category_header: "categoryParent".to_string(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, CsvError> {
        toml::from_str(content).map_err(|e| CsvError::InvalidProfile(e.to_string()))
    }

    fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b';')
    }
}

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column: {0}")]
    MissingColumn(String),
    #[error("invalid bank profile: {0}")]
    InvalidProfile(String),
}

/// Failure of a single data row. Row errors are collected, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("invalid amount: '{0}'")]
    InvalidAmount(String),
    #[error("invalid date: '{0}'")]
    InvalidDate(String),
    #[error("unreadable row: {0}")]
    Unreadable(String),
}

/// A successfully parsed statement row, not yet checked for duplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub date: NaiveDate,
    /// Signed amount as written in the export.
    pub amount: Money,
    /// Derived from the amount sign at parse time; textual hints in the
    /// source row are ignored.
    pub transaction_type: TransactionType,
    pub description: String,
    pub merchant: Option<String>,
    pub category_parent: Option<String>,
}

/// One data row's outcome, 1-based over data rows (the header is excluded
/// from numbering and counts).
#[derive(Debug, Clone)]
pub struct RowOutcome {
    pub row: usize,
    pub result: Result<ParsedRow, RowError>,
}

/// Result of one ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportStats {
    pub total_rows: usize,
    pub imported: usize,
    pub duplicates: usize,
    pub errors: usize,
    pub error_details: Vec<String>,
}

struct ColumnMap {
    date: usize,
    description: Option<usize>,
    amount: usize,
    merchant: Option<usize>,
    category: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord, profile: &BankProfile) -> Result<Self, CsvError> {
        let position = |name: &str| headers.iter().position(|h| h == name);
        Ok(ColumnMap {
            date: position(&profile.date_header)
                .ok_or_else(|| CsvError::MissingColumn(profile.date_header.clone()))?,
            amount: position(&profile.amount_header)
                .ok_or_else(|| CsvError::MissingColumn(profile.amount_header.clone()))?,
            description: position(&profile.description_header),
            merchant: position(&profile.merchant_header),
            category: position(&profile.category_header),
        })
    }

    /// Positional fallback for headerless exports: date, description,
    /// amount, merchant, category.
    fn positional() -> Self {
        ColumnMap {
            date: 0,
            description: Some(1),
            amount: 2,
            merchant: Some(3),
            category: Some(4),
        }
    }
}

/// Parses a raw statement payload into per-row outcomes. A malformed row
/// becomes a `RowError` in its slot; only a payload whose required columns
/// cannot be identified fails as a whole.
pub fn parse_statement(data: &[u8], profile: &BankProfile) -> Result<Vec<RowOutcome>, CsvError> {
    // Boursorama exports lead with a UTF-8 BOM that would otherwise glue
    // itself onto the first header name.
    let data = data.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(data);
    let text = String::from_utf8_lossy(data);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(profile.delimiter_byte())
        .has_headers(profile.has_header)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns = if profile.has_header {
        ColumnMap::from_headers(reader.headers()?, profile)?
    } else {
        ColumnMap::positional()
    };

    let mut outcomes = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let row = idx + 1;
        let result = match record {
            Ok(record) => parse_row(&record, &columns, profile),
            Err(e) => Err(RowError::Unreadable(e.to_string())),
        };
        outcomes.push(RowOutcome { row, result });
    }
    Ok(outcomes)
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &ColumnMap,
    profile: &BankProfile,
) -> Result<ParsedRow, RowError> {
    let field = |idx: usize| record.get(idx).map(clean_field).filter(|s| !s.is_empty());

    let date_field = field(columns.date).ok_or(RowError::MissingField("date"))?;
    let date = parse_date(&date_field, &profile.date_format)?;

    let amount_field = field(columns.amount).ok_or(RowError::MissingField("amount"))?;
    let amount = parse_amount(&amount_field, profile)?;

    let description = columns
        .description
        .and_then(field)
        .unwrap_or_default();
    let merchant = columns.merchant.and_then(field);
    let category_parent = columns.category.and_then(field);

    Ok(ParsedRow {
        date,
        amount,
        transaction_type: TransactionType::from_amount(amount),
        description,
        merchant,
        category_parent,
    })
}

/// Strips surviving quote characters and surrounding whitespace.
fn clean_field(s: &str) -> String {
    s.trim().trim_matches('"').trim().to_string()
}

fn parse_date(s: &str, format: &str) -> Result<NaiveDate, RowError> {
    NaiveDate::parse_from_str(s, format).map_err(|_| RowError::InvalidDate(s.to_string()))
}

fn parse_amount(s: &str, profile: &BankProfile) -> Result<Money, RowError> {
    // Boursorama pads thousands with regular or non-breaking spaces.
    let mut cleaned = s.replace(['\u{a0}', ' '], "");
    if profile.decimal_comma {
        cleaned = cleaned.replace(',', ".");
    } else {
        cleaned = cleaned.replace(',', "");
    }
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    if cleaned.is_empty() {
        return Err(RowError::MissingField("amount"));
    }
    let dec =
        Decimal::from_str(cleaned).map_err(|_| RowError::InvalidAmount(s.to_string()))?;
    Ok(Money::from_decimal(dec))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BankProfile {
        BankProfile::boursorama()
    }

    // ── parse_amount ──────────────────────────────────────────────────────────

    #[test]
    fn amount_decimal_comma_negative() {
        let m = parse_amount("-42,50", &profile()).unwrap();
        assert_eq!(m.to_cents(), -4250);
    }

    #[test]
    fn amount_explicit_plus_sign() {
        let m = parse_amount("+100,00", &profile()).unwrap();
        assert_eq!(m.to_cents(), 10000);
    }

    #[test]
    fn amount_thousands_with_nbsp() {
        let m = parse_amount("1\u{a0}234,56", &profile()).unwrap();
        assert_eq!(m.to_cents(), 123456);
        let m = parse_amount("1 234,56", &profile()).unwrap();
        assert_eq!(m.to_cents(), 123456);
    }

    #[test]
    fn amount_dot_decimal_profile() {
        let mut p = profile();
        p.decimal_comma = false;
        assert_eq!(parse_amount("1,234.56", &p).unwrap().to_cents(), 123456);
    }

    #[test]
    fn amount_invalid() {
        assert!(matches!(
            parse_amount("abc", &profile()),
            Err(RowError::InvalidAmount(_))
        ));
    }

    // ── parse_date ────────────────────────────────────────────────────────────

    #[test]
    fn date_profile_format() {
        let d = parse_date("2025-06-15", "%Y-%m-%d").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
    }

    #[test]
    fn date_wrong_format_is_row_error() {
        assert!(matches!(
            parse_date("15/06/2025", "%Y-%m-%d"),
            Err(RowError::InvalidDate(_))
        ));
    }

    // ── parse_statement ───────────────────────────────────────────────────────

    const HEADER: &str = "dateOp;dateVal;label;category;categoryParent;supplierFound;amount\n";

    fn statement(rows: &[&str]) -> Vec<u8> {
        let mut s = String::from(HEADER);
        for r in rows {
            s.push_str(r);
            s.push('\n');
        }
        s.into_bytes()
    }

    #[test]
    fn statement_basic_rows() {
        let data = statement(&[
            "2025-06-15;2025-06-15;CARREFOUR MARKET;;Alimentation;Carrefour;-50,00",
            "2025-06-16;2025-06-16;VIR SALAIRE;;Revenus;;+2 500,00",
        ]);
        let outcomes = parse_statement(&data, &profile()).unwrap();
        assert_eq!(outcomes.len(), 2);

        let first = outcomes[0].result.as_ref().unwrap();
        assert_eq!(first.description, "CARREFOUR MARKET");
        assert_eq!(first.amount.to_cents(), -5000);
        assert_eq!(first.transaction_type, TransactionType::Debit);
        assert_eq!(first.merchant.as_deref(), Some("Carrefour"));
        assert_eq!(first.category_parent.as_deref(), Some("Alimentation"));

        let second = outcomes[1].result.as_ref().unwrap();
        assert_eq!(second.amount.to_cents(), 250_000);
        assert_eq!(second.transaction_type, TransactionType::Credit);
        assert_eq!(second.merchant, None);
    }

    #[test]
    fn statement_strips_bom() {
        let mut data = b"\xEF\xBB\xBF".to_vec();
        data.extend_from_slice(&statement(&[
            "2025-06-15;2025-06-15;CAFE;;Sorties;;-4,50",
        ]));
        let outcomes = parse_statement(&data, &profile()).unwrap();
        assert!(outcomes[0].result.is_ok());
    }

    #[test]
    fn statement_quoted_fields() {
        let data = statement(&[
            "\"2025-06-15\";\"2025-06-15\";\"CARREFOUR; MARKET\";\"\";\"Alimentation\";\"\";\"-50,00\"",
        ]);
        let outcomes = parse_statement(&data, &profile()).unwrap();
        let row = outcomes[0].result.as_ref().unwrap();
        assert_eq!(row.description, "CARREFOUR; MARKET");
        assert_eq!(row.amount.to_cents(), -5000);
    }

    #[test]
    fn statement_bad_rows_do_not_abort() {
        let data = statement(&[
            "2025-06-15;2025-06-15;OK;;A;;-1,00",
            "2025-06-16;2025-06-16;BAD AMOUNT;;A;;quarante",
            ";;NO DATE;;A;;-3,00",
            "2025-06-18;2025-06-18;ALSO OK;;A;;-4,00",
        ]);
        let outcomes = parse_statement(&data, &profile()).unwrap();
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].result.is_ok());
        assert_eq!(
            outcomes[1].result,
            Err(RowError::InvalidAmount("quarante".to_string()))
        );
        assert_eq!(outcomes[1].row, 2);
        assert_eq!(outcomes[2].result, Err(RowError::MissingField("date")));
        assert!(outcomes[3].result.is_ok());
    }

    #[test]
    fn statement_missing_amount_column_fails_whole_file() {
        let data = b"dateOp;label\n2025-06-15;CAFE\n";
        assert!(matches!(
            parse_statement(data, &profile()),
            Err(CsvError::MissingColumn(col)) if col == "amount"
        ));
    }

    #[test]
    fn statement_blank_lines_skipped() {
        let data = statement(&[
            "2025-06-15;2025-06-15;A;;X;;-1,00",
            "",
            "2025-06-16;2025-06-16;B;;X;;-2,00",
        ]);
        let outcomes = parse_statement(&data, &profile()).unwrap();
        assert_eq!(outcomes.len(), 2);
    }

    // ── profile ───────────────────────────────────────────────────────────────

    #[test]
    fn profile_from_toml_overrides_defaults() {
        let p = BankProfile::from_toml(
            r#"
            name = "generic"
            delimiter = ","
            date_format = "%d/%m/%Y"
            decimal_comma = false
            "#,
        )
        .unwrap();
        assert_eq!(p.name, "generic");
        assert_eq!(p.delimiter_byte(), b',');
        assert_eq!(p.date_format, "%d/%m/%Y");
        // Unset keys keep the Boursorama defaults.
        assert_eq!(p.date_header, "dateOp");
        assert!(p.has_header);
    }

    #[test]
    fn profile_rejects_bad_toml() {
        assert!(matches!(
            BankProfile::from_toml("delimiter = 7"),
            Err(CsvError::InvalidProfile(_))
        ));
    }
}
