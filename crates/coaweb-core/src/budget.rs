//! Budget versus realisasi
//!
//! Realisasi for an account is its displayed balance. Variance is budget
//! minus realisasi, and the absorption percentage is realisasi over budget.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use coaweb_utils::{percentage, saturating_add, saturating_sub};

use crate::hierarchy::AccountIndex;
use crate::models::{AccountId, BudgetLine};

/// One budgeted account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceRow {
    pub account_id: AccountId,
    pub code: String,
    pub name: String,
    pub depth: u32,
    pub budget: Decimal,
    pub realisasi: Decimal,
    pub variance: Decimal,
    /// `None` when the budget is zero
    pub percentage: Option<Decimal>,
    /// False when an ancestor is budgeted too; such rows stay out of totals
    pub counted: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VarianceReport {
    pub rows: Vec<VarianceRow>,
    pub total_budget: Decimal,
    pub total_realisasi: Decimal,
    pub total_variance: Decimal,
    pub total_percentage: Option<Decimal>,
    /// Budget lines naming accounts that are not in the snapshot
    pub unmatched: Vec<AccountId>,
    /// Some amount left the decimal range and was clamped
    pub clamped: bool,
}

/// Compare budget lines against displayed balances.
///
/// Rows follow tree order. Several lines for one account are added up.
pub fn variance_report(index: &AccountIndex, budget_lines: &[BudgetLine]) -> VarianceReport {
    let mut budgets: HashMap<AccountId, Decimal> = HashMap::new();
    let mut unmatched = Vec::new();
    let mut clamped = false;
    let mut add = |a: Decimal, b: Decimal| {
        let (sum, over) = saturating_add(a, b);
        clamped |= over;
        sum
    };
    for line in budget_lines {
        if index.get(line.account_id).is_none() {
            if !unmatched.contains(&line.account_id) {
                unmatched.push(line.account_id);
            }
            continue;
        }
        let entry = budgets.entry(line.account_id).or_insert(Decimal::ZERO);
        *entry = add(*entry, line.amount);
    }
    if !unmatched.is_empty() {
        log::warn!("Budget lines for unknown accounts ignored: {:?}", unmatched);
    }

    let balances = index.displayed_balances();
    let mut report = VarianceReport {
        unmatched,
        ..VarianceReport::default()
    };
    // budgeted accounts on the current root-to-node path, by depth
    let mut budgeted_path: Vec<Option<AccountId>> = Vec::new();
    let mut covered: HashSet<AccountId> = HashSet::new();

    for (account, depth) in index.tree_order() {
        budgeted_path.truncate(depth as usize - 1);
        let ancestor_budgeted = budgeted_path.iter().any(|b| b.is_some());

        let Some(budget) = budgets.get(&account.id).copied() else {
            budgeted_path.push(None);
            continue;
        };
        budgeted_path.push(Some(account.id));

        let realisasi = balances.get(&account.id).copied().unwrap_or(Decimal::ZERO);
        let counted = !ancestor_budgeted && covered.insert(account.id);
        if counted {
            report.total_budget = add(report.total_budget, budget);
            report.total_realisasi = add(report.total_realisasi, realisasi);
        }
        let (variance, over) = saturating_sub(budget, realisasi);
        report.clamped |= over;

        report.rows.push(VarianceRow {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            depth,
            budget,
            realisasi,
            variance,
            percentage: percentage(realisasi, budget),
            counted,
        });
    }

    let (total_variance, over) = saturating_sub(report.total_budget, report.total_realisasi);
    report.total_variance = total_variance;
    report.clamped |= over || clamped;
    if report.clamped {
        log::warn!("Variance amounts out of range were clamped");
    }
    report.total_percentage = percentage(report.total_realisasi, report.total_budget);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Account;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(account_id: AccountId, amount: &str) -> BudgetLine {
        BudgetLine { account_id, amount: dec(amount) }
    }

    fn index() -> AccountIndex {
        AccountIndex::new(vec![
            Account::new(1, None, true, Decimal::ZERO).with_code("5000"),
            Account::new(2, Some(1), false, dec("300")).with_code("5101"),
            Account::new(3, Some(1), false, dec("150")).with_code("5102"),
            Account::new(4, None, false, dec("80")).with_code("6000"),
        ])
    }

    #[test]
    fn test_variance_for_leaf_and_parent() {
        let report = variance_report(&index(), &[line(1, "500"), line(4, "100")]);

        assert_eq!(report.rows.len(), 2);
        let parent = &report.rows[0];
        assert_eq!(parent.account_id, 1);
        assert_eq!(parent.realisasi, dec("450"));
        assert_eq!(parent.variance, dec("50"));
        assert_eq!(parent.percentage, Some(dec("90")));

        assert_eq!(report.total_budget, dec("600"));
        assert_eq!(report.total_realisasi, dec("530"));
        assert_eq!(report.total_variance, dec("70"));
    }

    #[test]
    fn test_zero_budget_has_no_percentage() {
        let report = variance_report(&index(), &[line(4, "0")]);
        assert_eq!(report.rows[0].percentage, None);
        assert_eq!(report.rows[0].variance, dec("-80"));
        assert_eq!(report.total_percentage, None);
    }

    #[test]
    fn test_nested_budget_not_double_counted() {
        let report = variance_report(&index(), &[line(1, "500"), line(2, "350")]);

        assert_eq!(report.rows.len(), 2);
        assert!(report.rows[0].counted);
        assert!(!report.rows[1].counted);
        assert_eq!(report.rows[1].depth, 2);
        assert_eq!(report.total_budget, dec("500"));
        assert_eq!(report.total_realisasi, dec("450"));
    }

    #[test]
    fn test_sibling_budget_is_counted_after_nested_branch() {
        let report = variance_report(&index(), &[line(2, "100"), line(3, "100")]);
        assert!(report.rows.iter().all(|r| r.counted));
        assert_eq!(report.total_realisasi, dec("450"));
    }

    #[test]
    fn test_repeated_and_unknown_lines() {
        let report = variance_report(&index(), &[line(3, "100"), line(3, "50"), line(99, "10")]);

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].budget, dec("150"));
        assert_eq!(report.rows[0].percentage, Some(dec("100")));
        assert_eq!(report.unmatched, vec![99]);
    }

    #[test]
    fn test_out_of_range_amounts_are_clamped() {
        let index = AccountIndex::new(vec![
            Account::new(1, None, false, Decimal::MIN),
            Account::new(2, None, false, Decimal::MAX),
        ]);
        let report = variance_report(
            &index,
            &[
                BudgetLine { account_id: 1, amount: Decimal::MAX },
                BudgetLine { account_id: 2, amount: Decimal::MAX },
                BudgetLine { account_id: 2, amount: Decimal::MAX },
            ],
        );

        assert!(report.clamped);
        assert_eq!(report.rows[0].variance, Decimal::MAX);
        assert_eq!(report.rows[1].budget, Decimal::MAX);
        assert_eq!(report.total_budget, Decimal::MAX);
        assert!(!variance_report(&index, &[]).clamped);
    }

    #[test]
    fn test_empty_budget() {
        let report = variance_report(&index(), &[]);
        assert!(report.rows.is_empty());
        assert_eq!(report.total_budget, Decimal::ZERO);
        assert_eq!(report.total_percentage, None);
    }
}
