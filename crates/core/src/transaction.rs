use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::account::AccountId;
use super::category::CategoryId;
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl TransactionType {
    /// Direction derived from the parsed amount sign. A zero amount is a
    /// debit, matching the bank export convention.
    pub fn from_amount(amount: Money) -> Self {
        if amount > Money::zero() {
            TransactionType::Credit
        } else {
            TransactionType::Debit
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Debit => "debit",
            TransactionType::Credit => "credit",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(TransactionType::Debit),
            "credit" => Ok(TransactionType::Credit),
            other => Err(format!("unknown transaction type: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: AccountId,
    pub category_id: Option<CategoryId>,
    pub transaction_type: TransactionType,
    /// Signed amount exactly as parsed from the source row. The sign is
    /// incidental; `transaction_type` is the authoritative direction.
    pub amount: Money,
    pub description: String,
    pub merchant: Option<String>,
    /// Raw parent-category label from the bank CSV, kept only for
    /// internal-transfer detection.
    pub category_parent_csv: Option<String>,
    pub date: NaiveDate,
    pub import_batch: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Magnitude used by every aggregate and display path.
    pub fn magnitude(&self) -> Money {
        self.amount.abs()
    }

    /// Absolute value re-signed by the authoritative direction.
    pub fn signed_by_type(&self) -> Money {
        match self.transaction_type {
            TransactionType::Debit => -self.amount.abs(),
            TransactionType::Credit => self.amount.abs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_from_amount_sign() {
        assert_eq!(
            TransactionType::from_amount(Money::from_cents(-4250)),
            TransactionType::Debit
        );
        assert_eq!(
            TransactionType::from_amount(Money::from_cents(10000)),
            TransactionType::Credit
        );
        assert_eq!(
            TransactionType::from_amount(Money::zero()),
            TransactionType::Debit
        );
    }

    #[test]
    fn type_round_trips_through_str() {
        assert_eq!("debit".parse::<TransactionType>(), Ok(TransactionType::Debit));
        assert_eq!("credit".parse::<TransactionType>(), Ok(TransactionType::Credit));
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionType::Debit).unwrap(),
            "\"debit\""
        );
    }

    fn tx(amount_cents: i64, tx_type: TransactionType) -> Transaction {
        Transaction {
            id: 1,
            account_id: AccountId(1),
            category_id: None,
            transaction_type: tx_type,
            amount: Money::from_cents(amount_cents),
            description: "TEST".to_string(),
            merchant: None,
            category_parent_csv: None,
            date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            import_batch: None,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    #[test]
    fn signed_by_type_ignores_stored_sign() {
        // A debit stored with a positive amount still displays negative.
        let t = tx(4250, TransactionType::Debit);
        assert_eq!(t.signed_by_type(), Money::from_cents(-4250));
        let t = tx(-4250, TransactionType::Credit);
        assert_eq!(t.signed_by_type(), Money::from_cents(4250));
    }

    #[test]
    fn magnitude_is_absolute() {
        assert_eq!(
            tx(-4250, TransactionType::Debit).magnitude(),
            Money::from_cents(4250)
        );
    }
}
