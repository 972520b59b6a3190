//! Derived views over a categorized transaction set: the two-level
//! category tree, the monthly cashflow buckets, and the income/expense
//! summary. Everything here is rebuilt from scratch on every query, so a
//! mutation anywhere invalidates nothing.

use serde::Serialize;
use std::collections::BTreeMap;

use super::category::CategoryIndex;
use super::money::Money;
use super::transaction::{Transaction, TransactionType};

/// Raw CSV parent labels denoting money moved between the user's own
/// accounts. Matching transactions are excluded from every aggregate.
pub const INTERNAL_TRANSFER_PARENTS: [&str; 2] = [
    "Mouvements internes débiteurs",
    "Mouvements internes créditeurs",
];

pub fn is_internal_transfer(tx: &Transaction) -> bool {
    tx.category_parent_csv
        .as_deref()
        .is_some_and(|label| INTERNAL_TRANSFER_PARENTS.contains(&label))
}

#[derive(Debug, Clone, Serialize)]
pub struct SubNode {
    pub label: String,
    pub total: Money,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParentNode {
    pub label: String,
    pub total: Money,
    pub subs: Vec<SubNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTree {
    pub direction: TransactionType,
    pub parents: Vec<ParentNode>,
}

impl CategoryTree {
    pub fn grand_total(&self) -> Money {
        self.parents
            .iter()
            .fold(Money::zero(), |acc, p| acc + p.total)
    }
}

/// Folds one direction of the (non-internal) transaction set into the
/// parent → sub → transactions tree. Totals are magnitudes; the sign is
/// implied by `direction`. Ordering is deterministic: parents and subs by
/// total descending (label ascending on ties), transactions by date
/// descending (id ascending on ties).
pub fn build_tree(
    transactions: &[Transaction],
    index: &CategoryIndex,
    direction: TransactionType,
) -> CategoryTree {
    let mut grouped: BTreeMap<String, BTreeMap<String, Vec<Transaction>>> = BTreeMap::new();

    for tx in transactions
        .iter()
        .filter(|t| !is_internal_transfer(t) && t.transaction_type == direction)
    {
        let (parent, sub) = index.labels_for(tx.category_id);
        grouped
            .entry(parent.to_string())
            .or_default()
            .entry(sub.to_string())
            .or_default()
            .push(tx.clone());
    }

    let mut parents: Vec<ParentNode> = grouped
        .into_iter()
        .map(|(label, subs)| {
            let mut subs: Vec<SubNode> = subs
                .into_iter()
                .map(|(label, mut transactions)| {
                    transactions.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
                    let total = transactions
                        .iter()
                        .fold(Money::zero(), |acc, t| acc + t.magnitude());
                    SubNode {
                        label,
                        total,
                        transactions,
                    }
                })
                .collect();
            subs.sort_by(|a, b| b.total.cmp(&a.total).then(a.label.cmp(&b.label)));
            let total = subs.iter().fold(Money::zero(), |acc, s| acc + s.total);
            ParentNode { label, total, subs }
        })
        .collect();
    parents.sort_by(|a, b| b.total.cmp(&a.total).then(a.label.cmp(&b.label)));

    CategoryTree { direction, parents }
}

/// One calendar month of cashflow: a single income total plus one expense
/// total per parent category.
#[derive(Debug, Clone, Serialize)]
pub struct CashflowBucket {
    /// `YYYY-MM` of the transaction dates in this bucket.
    pub month: String,
    pub income: Money,
    pub expenses: BTreeMap<String, Money>,
}

/// Buckets the (non-internal) set by calendar month, ascending. Months
/// with no transactions are not emitted.
pub fn monthly_cashflow(
    transactions: &[Transaction],
    index: &CategoryIndex,
) -> Vec<CashflowBucket> {
    let mut buckets: BTreeMap<String, (Money, BTreeMap<String, Money>)> = BTreeMap::new();

    for tx in transactions.iter().filter(|t| !is_internal_transfer(t)) {
        let month = tx.date.format("%Y-%m").to_string();
        let (income, expenses) = buckets
            .entry(month)
            .or_insert_with(|| (Money::zero(), BTreeMap::new()));
        match tx.transaction_type {
            TransactionType::Credit => *income = *income + tx.magnitude(),
            TransactionType::Debit => {
                let (parent, _) = index.labels_for(tx.category_id);
                let slot = expenses.entry(parent.to_string()).or_insert_with(Money::zero);
                *slot = *slot + tx.magnitude();
            }
        }
    }

    buckets
        .into_iter()
        .map(|(month, (income, expenses))| CashflowBucket {
            month,
            income,
            expenses,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Summary {
    pub income: Money,
    pub expenses: Money,
    /// income − expenses, signed.
    pub available: Money,
}

/// Grand totals over the (non-internal) set, one per direction.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut income = Money::zero();
    let mut expenses = Money::zero();
    for tx in transactions.iter().filter(|t| !is_internal_transfer(t)) {
        match tx.transaction_type {
            TransactionType::Credit => income = income + tx.magnitude(),
            TransactionType::Debit => expenses = expenses + tx.magnitude(),
        }
    }
    Summary {
        income,
        expenses,
        available: income - expenses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountId;
    use crate::category::{Category, CategoryId, UNCATEGORIZED_LABEL};
    use chrono::{DateTime, NaiveDate, Utc};

    fn cat(id: i64, name: &str, parent: &str, sub: &str) -> Category {
        Category {
            id: CategoryId(id),
            name: name.to_string(),
            parent_category: parent.to_string(),
            sub_category: sub.to_string(),
        }
    }

    fn index() -> CategoryIndex {
        CategoryIndex::new(vec![
            cat(1, "Épicerie", "BesoinsEssentiels", "Alimentation"),
            cat(2, "Restaurant", "LoisirsDivertissement", "Sorties"),
            cat(3, "Salaire", "Revenus", "Salaire"),
            cat(4, "Essence", "Transport", "Auto"),
        ])
    }

    fn tx(
        id: i64,
        date: (i32, u32, u32),
        cents: i64,
        tx_type: TransactionType,
        category: Option<i64>,
        csv_parent: Option<&str>,
    ) -> Transaction {
        Transaction {
            id,
            account_id: AccountId(1),
            category_id: category.map(CategoryId),
            transaction_type: tx_type,
            amount: Money::from_cents(cents),
            description: format!("TX {id}"),
            merchant: None,
            category_parent_csv: csv_parent.map(|s| s.to_string()),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            import_batch: None,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    fn debit(id: i64, date: (i32, u32, u32), cents: i64, category: Option<i64>) -> Transaction {
        tx(id, date, -cents, TransactionType::Debit, category, None)
    }

    fn credit(id: i64, date: (i32, u32, u32), cents: i64, category: Option<i64>) -> Transaction {
        tx(id, date, cents, TransactionType::Credit, category, None)
    }

    #[test]
    fn tree_totals_are_consistent() {
        let txs = vec![
            debit(1, (2025, 6, 1), 5000, Some(1)),
            debit(2, (2025, 6, 2), 3000, Some(1)),
            debit(3, (2025, 6, 3), 2000, Some(2)),
            credit(4, (2025, 6, 4), 100_000, Some(3)),
        ];
        let tree = build_tree(&txs, &index(), TransactionType::Debit);

        // Σ parent totals == Σ |amount| over included transactions.
        assert_eq!(tree.grand_total(), Money::from_cents(10_000));
        for parent in &tree.parents {
            let sub_sum = parent
                .subs
                .iter()
                .fold(Money::zero(), |acc, s| acc + s.total);
            assert_eq!(parent.total, sub_sum);
        }
    }

    #[test]
    fn tree_only_contains_requested_direction() {
        let txs = vec![
            debit(1, (2025, 6, 1), 5000, Some(1)),
            credit(2, (2025, 6, 2), 100_000, Some(3)),
        ];
        let debits = build_tree(&txs, &index(), TransactionType::Debit);
        let credits = build_tree(&txs, &index(), TransactionType::Credit);
        assert_eq!(debits.grand_total(), Money::from_cents(5000));
        assert_eq!(credits.grand_total(), Money::from_cents(100_000));
        assert_eq!(credits.parents[0].label, "Revenus");
    }

    #[test]
    fn internal_transfers_never_surface() {
        let txs = vec![
            debit(1, (2025, 6, 1), 5000, Some(1)),
            tx(
                2,
                (2025, 6, 2),
                -50_000,
                TransactionType::Debit,
                None,
                Some("Mouvements internes débiteurs"),
            ),
            tx(
                3,
                (2025, 6, 3),
                50_000,
                TransactionType::Credit,
                None,
                Some("Mouvements internes créditeurs"),
            ),
        ];
        let tree = build_tree(&txs, &index(), TransactionType::Debit);
        assert_eq!(tree.grand_total(), Money::from_cents(5000));

        let summary = summarize(&txs);
        assert_eq!(summary.income, Money::zero());
        assert_eq!(summary.expenses, Money::from_cents(5000));

        let cashflow = monthly_cashflow(&txs, &index());
        assert_eq!(cashflow.len(), 1);
        assert_eq!(cashflow[0].income, Money::zero());
    }

    #[test]
    fn uncategorized_falls_back_to_default_labels() {
        let txs = vec![debit(1, (2025, 6, 1), 1500, None)];
        let tree = build_tree(&txs, &index(), TransactionType::Debit);
        assert_eq!(tree.parents[0].label, UNCATEGORIZED_LABEL);
        assert_eq!(tree.parents[0].subs[0].label, UNCATEGORIZED_LABEL);
    }

    #[test]
    fn parents_sorted_by_total_descending() {
        let txs = vec![
            debit(1, (2025, 6, 1), 1000, Some(1)),  // BesoinsEssentiels
            debit(2, (2025, 6, 2), 9000, Some(4)),  // Transport
            debit(3, (2025, 6, 3), 4000, Some(2)),  // LoisirsDivertissement
        ];
        let tree = build_tree(&txs, &index(), TransactionType::Debit);
        let labels: Vec<&str> = tree.parents.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Transport", "LoisirsDivertissement", "BesoinsEssentiels"]
        );
    }

    #[test]
    fn leaf_transactions_sorted_by_date_descending_then_id() {
        let txs = vec![
            debit(1, (2025, 6, 1), 1000, Some(1)),
            debit(2, (2025, 6, 10), 1000, Some(1)),
            debit(3, (2025, 6, 10), 1000, Some(1)),
        ];
        let tree = build_tree(&txs, &index(), TransactionType::Debit);
        let ids: Vec<i64> = tree.parents[0].subs[0]
            .transactions
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn cashflow_buckets_by_month_ascending() {
        let txs = vec![
            debit(1, (2025, 7, 5), 2000, Some(1)),
            credit(2, (2025, 6, 28), 100_000, Some(3)),
            debit(3, (2025, 6, 15), 3000, Some(4)),
        ];
        let cashflow = monthly_cashflow(&txs, &index());
        assert_eq!(cashflow.len(), 2);
        assert_eq!(cashflow[0].month, "2025-06");
        assert_eq!(cashflow[0].income, Money::from_cents(100_000));
        assert_eq!(
            cashflow[0].expenses.get("Transport"),
            Some(&Money::from_cents(3000))
        );
        assert_eq!(cashflow[1].month, "2025-07");
        assert_eq!(
            cashflow[1].expenses.get("BesoinsEssentiels"),
            Some(&Money::from_cents(2000))
        );
    }

    #[test]
    fn cashflow_emits_no_empty_months() {
        let txs = vec![
            debit(1, (2025, 1, 5), 2000, Some(1)),
            debit(2, (2025, 4, 5), 2000, Some(1)),
        ];
        let months: Vec<String> = monthly_cashflow(&txs, &index())
            .into_iter()
            .map(|b| b.month)
            .collect();
        assert_eq!(months, vec!["2025-01", "2025-04"]);
    }

    #[test]
    fn summary_available_is_signed() {
        let txs = vec![
            credit(1, (2025, 6, 1), 50_000, Some(3)),
            debit(2, (2025, 6, 2), 80_000, Some(1)),
        ];
        let summary = summarize(&txs);
        assert_eq!(summary.available, Money::from_cents(-30_000));
    }
}
