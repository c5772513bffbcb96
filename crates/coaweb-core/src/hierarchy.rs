//! Account hierarchy aggregation and tree visibility
//!
//! Accounts arrive as a flat list linked by `parent_id`. [`AccountIndex`]
//! resolves those links once per snapshot and answers two questions per
//! account:
//!
//! - its displayed balance: the own balance for a leaf, the recursive sum
//!   of its children's displayed balances for a parent;
//! - its visibility: roots are always visible, any other account is
//!   visible when every ancestor on its chain is expanded.
//!
//! Broken links never fail. A parent that is missing, the account itself,
//! or part of a cycle is ignored and the account sits at root level. Such
//! cases are kept as [`HierarchyAnomaly`] values for reporting.

use rust_decimal::Decimal;
use coaweb_utils::saturating_add;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::models::{Account, AccountId};

// ==================== Expanded Set ====================

/// Parent accounts currently expanded in a tree view.
///
/// An id is either present (expanded) or absent (collapsed). The empty set
/// shows only root-level accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpandedSet(BTreeSet<AccountId>);

impl ExpandedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`; returns true if it is now expanded
    pub fn toggle(&mut self, id: AccountId) -> bool {
        if self.0.remove(&id) {
            false
        } else {
            self.0.insert(id);
            true
        }
    }

    pub fn is_expanded(&self, id: AccountId) -> bool {
        self.0.contains(&id)
    }

    pub fn expand(&mut self, id: AccountId) {
        self.0.insert(id);
    }

    pub fn collapse(&mut self, id: AccountId) {
        self.0.remove(&id);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Keep only the ids for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(AccountId) -> bool) {
        self.0.retain(|id| keep(*id));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AccountId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<AccountId> for ExpandedSet {
    fn from_iter<I: IntoIterator<Item = AccountId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ==================== Anomalies ====================

/// Data-quality findings from building an index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HierarchyAnomaly {
    /// `parent_id` does not resolve within the set
    MissingParent { id: AccountId, parent_id: AccountId },
    /// `parent_id` equals the account's own id
    SelfParent { id: AccountId },
    /// The account is part of a parent cycle
    Cycle { id: AccountId },
    /// Flagged as parent but has no children; displays zero
    ChildlessParent { id: AccountId },
    /// Has children but is not flagged as parent; displays its own balance
    UnflaggedParent { id: AccountId },
    /// Another account already uses this id
    DuplicateId { id: AccountId },
    /// The roll-up left the decimal range and was clamped
    BalanceOverflow { id: AccountId },
}

impl std::fmt::Display for HierarchyAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HierarchyAnomaly::MissingParent { id, parent_id } => {
                write!(f, "account {} references missing parent {}", id, parent_id)
            }
            HierarchyAnomaly::SelfParent { id } => write!(f, "account {} is its own parent", id),
            HierarchyAnomaly::Cycle { id } => write!(f, "account {} is part of a parent cycle", id),
            HierarchyAnomaly::ChildlessParent { id } => {
                write!(f, "account {} is flagged as parent but has no children", id)
            }
            HierarchyAnomaly::UnflaggedParent { id } => {
                write!(f, "account {} has children but is not flagged as parent", id)
            }
            HierarchyAnomaly::DuplicateId { id } => write!(f, "account id {} appears more than once", id),
            HierarchyAnomaly::BalanceOverflow { id } => {
                write!(f, "displayed balance of account {} is out of range and was clamped", id)
            }
        }
    }
}

// ==================== Tree Rows ====================

/// One visible row of the account tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRow {
    pub id: AccountId,
    /// Resolved parent (broken links are `None`)
    pub parent_id: Option<AccountId>,
    /// Depth in the resolved tree, root = 1
    pub depth: u32,
    /// Level as recorded by the source
    pub level: u32,
    pub code: String,
    pub name: String,
    pub displayed_balance: Decimal,
    pub is_parent: bool,
    pub has_children: bool,
    pub expanded: bool,
    pub suspended: bool,
}

// ==================== Index ====================

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    New,
    OnPath,
    Done,
}

/// Resolved hierarchy over one account snapshot
#[derive(Debug, Clone, Default)]
pub struct AccountIndex {
    accounts: Vec<Account>,
    positions: HashMap<AccountId, usize>,
    /// Resolved parent position per account
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    /// Displayed balance per position
    balances: Vec<Decimal>,
    anomalies: Vec<HierarchyAnomaly>,
}

impl AccountIndex {
    /// Build the index. Never fails; broken links become roots.
    pub fn new(accounts: Vec<Account>) -> Self {
        let n = accounts.len();
        let mut anomalies = Vec::new();

        let mut positions = HashMap::with_capacity(n);
        for (pos, account) in accounts.iter().enumerate() {
            if positions.insert(account.id, pos).is_some() {
                anomalies.push(HierarchyAnomaly::DuplicateId { id: account.id });
            }
        }
        // first occurrence wins
        for (pos, account) in accounts.iter().enumerate().rev() {
            positions.insert(account.id, pos);
        }

        let mut parents: Vec<Option<usize>> = accounts
            .iter()
            .map(|account| {
                let parent_id = account.parent_id?;
                if parent_id == account.id {
                    anomalies.push(HierarchyAnomaly::SelfParent { id: account.id });
                    return None;
                }
                match positions.get(&parent_id) {
                    Some(pos) => Some(*pos),
                    None => {
                        anomalies.push(HierarchyAnomaly::MissingParent { id: account.id, parent_id });
                        None
                    }
                }
            })
            .collect();

        for pos in Self::cycle_members(&parents) {
            anomalies.push(HierarchyAnomaly::Cycle { id: accounts[pos].id });
            parents[pos] = None;
        }

        let mut children = vec![Vec::new(); n];
        let mut roots = Vec::new();
        for (pos, parent) in parents.iter().enumerate() {
            match parent {
                Some(p) => children[*p].push(pos),
                None => roots.push(pos),
            }
        }

        let by_code = |a: &usize, b: &usize| {
            let (x, y) = (&accounts[*a], &accounts[*b]);
            x.code.cmp(&y.code).then(x.id.cmp(&y.id))
        };
        roots.sort_by(by_code);
        for list in children.iter_mut() {
            list.sort_by(by_code);
        }

        for (pos, account) in accounts.iter().enumerate() {
            match (account.is_parent, children[pos].is_empty()) {
                (true, true) => anomalies.push(HierarchyAnomaly::ChildlessParent { id: account.id }),
                (false, false) => anomalies.push(HierarchyAnomaly::UnflaggedParent { id: account.id }),
                _ => {}
            }
        }

        let (balances, overflowed) = Self::roll_up(&accounts, &children, &roots);
        for pos in overflowed {
            anomalies.push(HierarchyAnomaly::BalanceOverflow { id: accounts[pos].id });
        }

        Self {
            accounts,
            positions,
            parents,
            children,
            roots,
            balances,
            anomalies,
        }
    }

    /// Displayed balance of every position, children before parents.
    /// Sums that leave the decimal range are clamped; their positions are
    /// returned alongside.
    fn roll_up(accounts: &[Account], children: &[Vec<usize>], roots: &[usize]) -> (Vec<Decimal>, Vec<usize>) {
        // pre-order from the roots; walking it backwards sees children first
        let mut order = Vec::with_capacity(accounts.len());
        let mut stack: Vec<usize> = roots.to_vec();
        while let Some(pos) = stack.pop() {
            order.push(pos);
            stack.extend_from_slice(&children[pos]);
        }

        let mut values = vec![Decimal::ZERO; accounts.len()];
        let mut overflowed = Vec::new();
        for pos in order.into_iter().rev() {
            let account = &accounts[pos];
            if !account.is_parent {
                values[pos] = account.balance;
                continue;
            }
            let mut total = Decimal::ZERO;
            let mut clamped = false;
            for child in &children[pos] {
                let (sum, over) = saturating_add(total, values[*child]);
                total = sum;
                clamped |= over;
            }
            if clamped {
                overflowed.push(pos);
            }
            values[pos] = total;
        }

        overflowed.sort_unstable();
        (values, overflowed)
    }

    /// Positions of accounts lying on a parent cycle
    fn cycle_members(parents: &[Option<usize>]) -> Vec<usize> {
        let mut state = vec![Visit::New; parents.len()];
        let mut members = Vec::new();

        for start in 0..parents.len() {
            let mut path = Vec::new();
            let mut current = Some(start);
            while let Some(pos) = current {
                match state[pos] {
                    Visit::New => {
                        state[pos] = Visit::OnPath;
                        path.push(pos);
                        current = parents[pos];
                    }
                    Visit::OnPath => {
                        if let Some(from) = path.iter().position(|p| *p == pos) {
                            members.extend_from_slice(&path[from..]);
                        }
                        break;
                    }
                    Visit::Done => break,
                }
            }
            for pos in path {
                state[pos] = Visit::Done;
            }
        }

        members.sort_unstable();
        members
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn anomalies(&self) -> &[HierarchyAnomaly] {
        &self.anomalies
    }

    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.positions.get(&id).map(|pos| &self.accounts[*pos])
    }

    /// Resolved parent of `id`
    pub fn parent_of(&self, id: AccountId) -> Option<&Account> {
        let pos = *self.positions.get(&id)?;
        self.parents[pos].map(|p| &self.accounts[p])
    }

    pub fn children_of(&self, id: AccountId) -> impl Iterator<Item = &Account> + '_ {
        self.positions
            .get(&id)
            .map(|pos| self.children[*pos].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|c| &self.accounts[*c])
    }

    pub fn roots(&self) -> impl Iterator<Item = &Account> + '_ {
        self.roots.iter().map(|r| &self.accounts[*r])
    }

    /// Depth in the resolved tree, root = 1
    pub fn depth(&self, id: AccountId) -> Option<u32> {
        let mut current = *self.positions.get(&id)?;
        let mut depth = 1;
        while let Some(parent) = self.parents[current] {
            depth += 1;
            current = parent;
        }
        Some(depth)
    }

    /// Every account with its depth, parents before children
    pub fn tree_order(&self) -> Vec<(&Account, u32)> {
        let mut order = Vec::with_capacity(self.accounts.len());
        let mut stack: Vec<(usize, u32)> = self.roots.iter().rev().map(|r| (*r, 1)).collect();
        while let Some((pos, depth)) = stack.pop() {
            order.push((&self.accounts[pos], depth));
            stack.extend(self.children[pos].iter().rev().map(|c| (*c, depth + 1)));
        }
        order
    }

    /// Displayed balance of `id`, `None` if the id is unknown
    pub fn displayed_balance(&self, id: AccountId) -> Option<Decimal> {
        self.positions.get(&id).map(|pos| self.balances[*pos])
    }

    /// Displayed balance of every account, in one pass
    pub fn displayed_balances(&self) -> HashMap<AccountId, Decimal> {
        let mut result = HashMap::with_capacity(self.accounts.len());
        for (id, pos) in &self.positions {
            result.insert(*id, self.balances[*pos]);
        }
        result
    }

    fn visible_at(&self, pos: usize, expanded: &ExpandedSet) -> bool {
        let mut current = pos;
        while let Some(parent) = self.parents[current] {
            if !expanded.is_expanded(self.accounts[parent].id) {
                return false;
            }
            current = parent;
        }
        true
    }

    /// Visibility of `id` under `expanded`, `None` if the id is unknown
    pub fn is_visible(&self, id: AccountId, expanded: &ExpandedSet) -> Option<bool> {
        self.positions.get(&id).map(|pos| self.visible_at(*pos, expanded))
    }

    /// Visible rows in display order: parents before their children,
    /// siblings ordered by code.
    pub fn visible_rows(&self, expanded: &ExpandedSet) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<(usize, u32)> = self.roots.iter().rev().map(|r| (*r, 1)).collect();

        while let Some((pos, depth)) = stack.pop() {
            let account = &self.accounts[pos];
            let is_expanded = expanded.is_expanded(account.id);
            rows.push(TreeRow {
                id: account.id,
                parent_id: self.parents[pos].map(|p| self.accounts[p].id),
                depth,
                level: account.level,
                code: account.code.clone(),
                name: account.name.clone(),
                displayed_balance: self.balances[pos],
                is_parent: account.is_parent,
                has_children: !self.children[pos].is_empty(),
                expanded: is_expanded,
                suspended: account.suspended,
            });
            if is_expanded {
                stack.extend(self.children[pos].iter().rev().map(|c| (*c, depth + 1)));
            }
        }

        rows
    }
}

// ==================== Free Functions ====================

/// Displayed balance of `account` within `all_accounts`.
///
/// A leaf shows its own balance. A parent shows the sum of its children's
/// displayed balances, so only leaf balances are ever added up; a parent
/// with no children shows zero.
pub fn displayed_balance(account: &Account, all_accounts: &[Account]) -> Decimal {
    if !account.is_parent {
        return account.balance;
    }
    let index = AccountIndex::new(all_accounts.to_vec());
    match index.positions.get(&account.id) {
        Some(pos) if index.accounts[*pos] == *account => index.balances[*pos],
        _ => index
            .accounts
            .iter()
            .enumerate()
            .filter(|(_, a)| a.parent_id == Some(account.id) && a.id != account.id)
            .fold(Decimal::ZERO, |total, (pos, _)| saturating_add(total, index.balances[pos]).0),
    }
}

/// Whether `account` is visible given the expanded parents.
///
/// Root-level accounts, including those whose parent cannot be resolved,
/// are always visible.
pub fn is_visible(account: &Account, all_accounts: &[Account], expanded: &ExpandedSet) -> bool {
    let index = AccountIndex::new(all_accounts.to_vec());
    match index.positions.get(&account.id) {
        Some(pos) if index.accounts[*pos] == *account => index.visible_at(*pos, expanded),
        _ => match account.parent_id.filter(|p| *p != account.id) {
            Some(parent_id) => match index.positions.get(&parent_id) {
                Some(parent) => expanded.is_expanded(parent_id) && index.visible_at(*parent, expanded),
                None => true,
            },
            None => true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn leaf(id: AccountId, parent: Option<AccountId>, balance: &str) -> Account {
        Account::new(id, parent, false, dec(balance))
    }

    fn parent(id: AccountId, parent: Option<AccountId>) -> Account {
        Account::new(id, parent, true, Decimal::ZERO)
    }

    fn chain() -> Vec<Account> {
        vec![parent(1, None), parent(2, Some(1)), leaf(3, Some(2), "500")]
    }

    #[test]
    fn test_parent_sums_children() {
        let accounts = vec![parent(1, None), leaf(2, Some(1), "100"), leaf(3, Some(1), "250")];
        assert_eq!(displayed_balance(&accounts[0], &accounts), dec("350"));

        let index = AccountIndex::new(accounts);
        assert_eq!(index.displayed_balance(1), Some(dec("350")));
    }

    #[test]
    fn test_leaf_shows_own_balance() {
        let accounts = vec![parent(1, None), leaf(2, Some(1), "-12.34")];
        assert_eq!(displayed_balance(&accounts[1], &accounts), dec("-12.34"));
        assert_eq!(AccountIndex::new(accounts).displayed_balance(2), Some(dec("-12.34")));
    }

    #[test]
    fn test_nested_parents_sum_leaves_only() {
        let mut stale = parent(2, Some(1));
        stale.balance = dec("9999");
        let accounts = vec![
            parent(1, None),
            stale,
            leaf(3, Some(2), "10.10"),
            leaf(4, Some(2), "20.20"),
            leaf(5, Some(1), "0.01"),
        ];

        let index = AccountIndex::new(accounts.clone());
        assert_eq!(index.displayed_balance(2), Some(dec("30.30")));
        assert_eq!(index.displayed_balance(1), Some(dec("30.31")));
        assert_eq!(displayed_balance(&accounts[0], &accounts), dec("30.31"));
    }

    #[test]
    fn test_childless_parent_is_zero() {
        let mut lonely = parent(1, None);
        lonely.balance = dec("75");
        let accounts = vec![lonely];

        assert_eq!(displayed_balance(&accounts[0], &accounts), Decimal::ZERO);
        let index = AccountIndex::new(accounts);
        assert_eq!(index.displayed_balance(1), Some(Decimal::ZERO));
        assert_eq!(index.anomalies(), &[HierarchyAnomaly::ChildlessParent { id: 1 }]);
    }

    #[test]
    fn test_balance_is_order_independent() {
        let accounts = vec![
            parent(1, None),
            parent(2, Some(1)),
            leaf(3, Some(2), "1.1"),
            leaf(4, Some(1), "2.2"),
            leaf(5, Some(2), "3.3"),
        ];
        let mut reversed = accounts.clone();
        reversed.reverse();
        let mut rotated = accounts.clone();
        rotated.rotate_left(2);

        let expected = AccountIndex::new(accounts).displayed_balances();
        assert_eq!(AccountIndex::new(reversed).displayed_balances(), expected);
        assert_eq!(AccountIndex::new(rotated).displayed_balances(), expected);
        assert_eq!(expected[&1], dec("6.6"));
    }

    #[test]
    fn test_decimal_sum_has_no_drift() {
        let mut accounts = vec![parent(1, None)];
        for id in 2..=11 {
            accounts.push(leaf(id, Some(1), "0.1"));
        }
        let index = AccountIndex::new(accounts);
        for _ in 0..3 {
            assert_eq!(index.displayed_balance(1), Some(Decimal::ONE));
        }
    }

    #[test]
    fn test_displayed_balances_match_single_queries() {
        let accounts = vec![
            parent(1, None),
            parent(2, Some(1)),
            leaf(3, Some(2), "7"),
            parent(4, Some(1)),
            leaf(5, None, "1"),
        ];
        let index = AccountIndex::new(accounts);
        let all = index.displayed_balances();
        for account in index.accounts() {
            assert_eq!(Some(all[&account.id]), index.displayed_balance(account.id));
        }
    }

    #[test]
    fn test_visibility_follows_expanded_chain() {
        let accounts = chain();
        let mut expanded = ExpandedSet::new();

        assert!(is_visible(&accounts[0], &accounts, &expanded));
        assert!(!is_visible(&accounts[1], &accounts, &expanded));
        assert!(!is_visible(&accounts[2], &accounts, &expanded));

        expanded.toggle(1);
        assert!(is_visible(&accounts[1], &accounts, &expanded));
        assert!(!is_visible(&accounts[2], &accounts, &expanded));

        expanded.toggle(2);
        assert!(accounts.iter().all(|a| is_visible(a, &accounts, &expanded)));
    }

    #[test]
    fn test_grandchild_hidden_when_grandparent_collapsed() {
        let index = AccountIndex::new(chain());
        let expanded: ExpandedSet = [2].into_iter().collect();
        assert_eq!(index.is_visible(2, &expanded), Some(false));
        assert_eq!(index.is_visible(3, &expanded), Some(false));
        assert_eq!(index.is_visible(42, &expanded), None);
    }

    #[test]
    fn test_missing_parent_behaves_as_root() {
        let accounts = vec![leaf(5, Some(99), "10"), parent(1, None), leaf(2, Some(1), "1")];
        for expanded in [ExpandedSet::new(), [1, 99].into_iter().collect()] {
            assert!(is_visible(&accounts[0], &accounts, &expanded));
        }
        assert_eq!(displayed_balance(&accounts[0], &accounts), dec("10"));

        let index = AccountIndex::new(accounts);
        assert!(index.parent_of(5).is_none());
        assert_eq!(index.depth(5), Some(1));
        assert!(index.anomalies().contains(&HierarchyAnomaly::MissingParent { id: 5, parent_id: 99 }));
    }

    #[test]
    fn test_self_parent_is_root() {
        let accounts = vec![leaf(7, Some(7), "3")];
        assert!(is_visible(&accounts[0], &accounts, &ExpandedSet::new()));

        let index = AccountIndex::new(accounts);
        assert_eq!(index.roots().count(), 1);
        assert_eq!(index.anomalies(), &[HierarchyAnomaly::SelfParent { id: 7 }]);
    }

    #[test]
    fn test_cycle_terminates_and_members_are_roots() {
        let accounts = vec![
            Account::new(1, Some(2), true, Decimal::ZERO),
            Account::new(2, Some(1), true, Decimal::ZERO),
            leaf(3, Some(2), "4"),
        ];
        let index = AccountIndex::new(accounts.clone());

        assert!(index.parent_of(1).is_none());
        assert!(index.parent_of(2).is_none());
        assert_eq!(index.parent_of(3).map(|a| a.id), Some(2));
        assert_eq!(index.displayed_balance(2), Some(dec("4")));
        assert_eq!(index.displayed_balance(1), Some(Decimal::ZERO));
        assert_eq!(index.is_visible(1, &ExpandedSet::new()), Some(true));
        assert_eq!(index.is_visible(2, &ExpandedSet::new()), Some(true));
        assert!(index.anomalies().contains(&HierarchyAnomaly::Cycle { id: 1 }));
        assert!(index.anomalies().contains(&HierarchyAnomaly::Cycle { id: 2 }));

        assert!(is_visible(&accounts[0], &accounts, &ExpandedSet::new()));
        assert_eq!(displayed_balance(&accounts[1], &accounts), dec("4"));
    }

    #[test]
    fn test_unflagged_parent_keeps_own_balance() {
        let accounts = vec![leaf(1, None, "8"), leaf(2, Some(1), "100")];
        let index = AccountIndex::new(accounts);
        assert_eq!(index.displayed_balance(1), Some(dec("8")));
        assert_eq!(index.anomalies(), &[HierarchyAnomaly::UnflaggedParent { id: 1 }]);
    }

    #[test]
    fn test_duplicate_id_first_wins() {
        let accounts = vec![leaf(1, None, "1"), leaf(1, None, "2")];
        let index = AccountIndex::new(accounts);
        assert_eq!(index.get(1).map(|a| a.balance), Some(dec("1")));
        assert_eq!(index.anomalies(), &[HierarchyAnomaly::DuplicateId { id: 1 }]);
    }

    #[test]
    fn test_overflowing_roll_up_is_clamped() {
        let accounts = vec![
            parent(1, None),
            Account::new(2, Some(1), false, Decimal::MAX),
            Account::new(3, Some(1), false, Decimal::MAX),
            parent(4, None),
            Account::new(5, Some(4), false, Decimal::MIN),
            Account::new(6, Some(4), false, Decimal::MIN),
        ];
        let index = AccountIndex::new(accounts.clone());

        assert_eq!(index.displayed_balance(1), Some(Decimal::MAX));
        assert_eq!(index.displayed_balance(4), Some(Decimal::MIN));
        assert_eq!(index.displayed_balances()[&1], Decimal::MAX);
        assert_eq!(index.visible_rows(&ExpandedSet::new())[0].displayed_balance, Decimal::MAX);
        assert_eq!(displayed_balance(&accounts[0], &accounts), Decimal::MAX);
        assert_eq!(
            index.anomalies(),
            &[
                HierarchyAnomaly::BalanceOverflow { id: 1 },
                HierarchyAnomaly::BalanceOverflow { id: 4 },
            ]
        );
    }

    #[test]
    fn test_overflow_in_child_propagates_clamped_value() {
        let accounts = vec![
            parent(1, None),
            parent(2, Some(1)),
            Account::new(3, Some(2), false, Decimal::MAX),
            Account::new(4, Some(2), false, Decimal::ONE),
            leaf(5, Some(1), "-1"),
        ];
        let index = AccountIndex::new(accounts);

        assert_eq!(index.displayed_balance(2), Some(Decimal::MAX));
        assert_eq!(index.displayed_balance(1), Some(Decimal::MAX - Decimal::ONE));
        assert_eq!(index.anomalies(), &[HierarchyAnomaly::BalanceOverflow { id: 2 }]);
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut expanded: ExpandedSet = [4].into_iter().collect();

        assert!(expanded.toggle(1));
        assert!(!expanded.toggle(1));
        assert!(!expanded.is_expanded(1));

        assert!(!expanded.toggle(4));
        assert!(expanded.toggle(4));
        assert_eq!(expanded.iter().collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_visible_rows_order_and_depth() {
        let accounts = vec![
            leaf(12, Some(10), "5").with_code("1102"),
            parent(10, None).with_code("1100"),
            leaf(11, Some(10), "7").with_code("1101"),
            parent(20, None).with_code("2100"),
            leaf(21, Some(20), "1").with_code("2101"),
        ];
        let index = AccountIndex::new(accounts);

        let collapsed = index.visible_rows(&ExpandedSet::new());
        assert_eq!(collapsed.iter().map(|r| r.id).collect::<Vec<_>>(), vec![10, 20]);
        assert_eq!(collapsed[0].displayed_balance, dec("12"));
        assert!(collapsed[0].has_children);
        assert!(!collapsed[0].expanded);

        let expanded: ExpandedSet = [10].into_iter().collect();
        let rows = index.visible_rows(&expanded);
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![10, 11, 12, 20]);
        assert_eq!(rows[1].depth, 2);
        assert_eq!(rows[1].parent_id, Some(10));
        assert!(rows[0].expanded);

        let index_ids: Vec<_> = rows.iter().map(|r| r.id).collect();
        for id in index_ids {
            assert_eq!(index.is_visible(id, &expanded), Some(true));
        }
    }

    #[test]
    fn test_expanded_set_serializes_as_list() {
        let expanded: ExpandedSet = [3, 1].into_iter().collect();
        assert_eq!(serde_json::to_string(&expanded).unwrap(), "[1,3]");
    }
}
