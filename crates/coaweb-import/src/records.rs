//! Record shapes produced by the loaders

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One chart-of-accounts row as delivered by an account source.
///
/// Every loader produces this shape, whatever the file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: u64,
    pub parent_id: Option<u64>,
    /// Depth in the hierarchy, root = 1
    pub level: u32,
    pub is_parent: bool,
    pub balance: Decimal,
    pub suspended: bool,
    /// Account number, e.g. "1101.001"
    pub code: String,
    pub name: String,
    /// Source account type label, if the source has one
    pub account_type: Option<String>,
}

/// Budget allocation for one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecord {
    #[serde(alias = "accountId")]
    pub account_id: u64,
    pub amount: Decimal,
}

/// Account row before derived fields are filled in
#[derive(Debug, Clone, Default)]
pub(crate) struct PartialRecord {
    pub id: u64,
    pub parent_id: Option<u64>,
    pub level: Option<u32>,
    pub is_parent: Option<bool>,
    pub balance: Decimal,
    pub suspended: bool,
    pub code: String,
    pub name: String,
    pub account_type: Option<String>,
}

/// Fill in `is_parent` and `level` where the source left them out.
///
/// `is_parent` becomes true when another row names this row as parent.
/// `level` counts resolvable ancestors; a parent chain that loops stops
/// counting once it revisits a row.
pub(crate) fn complete_records(partial: Vec<PartialRecord>) -> Vec<AccountRecord> {
    let parents: HashMap<u64, Option<u64>> = partial
        .iter()
        .map(|r| (r.id, r.parent_id))
        .collect();
    let referenced: HashSet<u64> = partial
        .iter()
        .filter_map(|r| r.parent_id.filter(|p| *p != r.id))
        .collect();

    partial
        .into_iter()
        .map(|r| {
            let is_parent = r.is_parent.unwrap_or_else(|| referenced.contains(&r.id));
            let level = r.level.unwrap_or_else(|| chain_depth(r.id, &parents));
            AccountRecord {
                id: r.id,
                parent_id: r.parent_id,
                level,
                is_parent,
                balance: r.balance,
                suspended: r.suspended,
                code: r.code,
                name: r.name,
                account_type: r.account_type,
            }
        })
        .collect()
}

fn chain_depth(id: u64, parents: &HashMap<u64, Option<u64>>) -> u32 {
    let mut depth = 1;
    let mut seen = HashSet::from([id]);
    let mut current = id;
    while let Some(Some(parent)) = parents.get(&current) {
        if !parents.contains_key(parent) || !seen.insert(*parent) {
            break;
        }
        depth += 1;
        current = *parent;
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(id: u64, parent_id: Option<u64>) -> PartialRecord {
        PartialRecord {
            id,
            parent_id,
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_records_derives_parent_flag_and_level() {
        let records = complete_records(vec![
            partial(1, None),
            partial(2, Some(1)),
            partial(3, Some(2)),
        ]);

        assert!(records[0].is_parent);
        assert!(records[1].is_parent);
        assert!(!records[2].is_parent);
        assert_eq!(records.iter().map(|r| r.level).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_complete_records_keeps_explicit_values() {
        let mut row = partial(1, None);
        row.is_parent = Some(true);
        row.level = Some(4);
        let records = complete_records(vec![row]);

        assert!(records[0].is_parent);
        assert_eq!(records[0].level, 4);
    }

    #[test]
    fn test_complete_records_survives_cycles_and_dangling_parents() {
        let records = complete_records(vec![
            partial(1, Some(2)),
            partial(2, Some(1)),
            partial(3, Some(3)),
            partial(4, Some(99)),
        ]);

        assert_eq!(records[0].level, 2);
        assert_eq!(records[1].level, 2);
        // self-reference does not make an account its own parent
        assert!(!records[2].is_parent);
        assert_eq!(records[2].level, 1);
        assert_eq!(records[3].level, 1);
    }
}
