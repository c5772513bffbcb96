//! Core data models for the chart of accounts

use coaweb_import::{AccountRecord, BudgetRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{AccountStatus, AccountType};

/// Account identifier, unique within one entity's account set
pub type AccountId = u64;

/// Account information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Parent account; `None` means root level
    pub parent_id: Option<AccountId>,
    /// Depth in the hierarchy (root = 1), used for indentation
    pub level: u32,
    /// True if the account has child accounts
    pub is_parent: bool,
    /// Own recorded balance. Superseded by the roll-up for parents.
    pub balance: Decimal,
    /// Administrative inactive flag, display only
    pub suspended: bool,
    /// Account number (e.g., "1101.001")
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
}

impl Account {
    /// Create an account with empty descriptive fields
    pub fn new(id: AccountId, parent_id: Option<AccountId>, is_parent: bool, balance: Decimal) -> Self {
        Self {
            id,
            parent_id,
            level: 1,
            is_parent,
            balance,
            suspended: false,
            code: String::new(),
            name: String::new(),
            account_type: AccountType::Other,
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = code.to_string();
        self.account_type = AccountType::from_code(code);
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }

    pub fn status(&self) -> AccountStatus {
        if self.suspended {
            AccountStatus::Suspended
        } else {
            AccountStatus::Active
        }
    }

    /// Code and name joined for display, e.g. "1101 Kas"
    pub fn label(&self) -> String {
        match (self.code.is_empty(), self.name.is_empty()) {
            (false, false) => format!("{} {}", self.code, self.name),
            (false, true) => self.code.clone(),
            (true, false) => self.name.clone(),
            (true, true) => self.id.to_string(),
        }
    }
}

impl From<AccountRecord> for Account {
    fn from(record: AccountRecord) -> Self {
        let account_type = AccountType::resolve(record.account_type.as_deref(), &record.code);
        Self {
            id: record.id,
            parent_id: record.parent_id,
            level: record.level,
            is_parent: record.is_parent,
            balance: record.balance,
            suspended: record.suspended,
            code: record.code,
            name: record.name,
            account_type,
        }
    }
}

/// Budget allocation for one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub account_id: AccountId,
    pub amount: Decimal,
}

impl From<BudgetRecord> for BudgetLine {
    fn from(record: BudgetRecord) -> Self {
        Self {
            account_id: record.account_id,
            amount: record.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_from_record_infers_type() {
        let record = AccountRecord {
            id: 10,
            parent_id: Some(1),
            level: 2,
            is_parent: false,
            balance: Decimal::from(5),
            suspended: true,
            code: "5101".to_string(),
            name: "Beban Gaji".to_string(),
            account_type: None,
        };

        let account = Account::from(record);
        assert_eq!(account.account_type, AccountType::Expense);
        assert_eq!(account.status(), AccountStatus::Suspended);
        assert_eq!(account.label(), "5101 Beban Gaji");
    }

    #[test]
    fn test_account_label_fallbacks() {
        assert_eq!(Account::new(7, None, false, Decimal::ZERO).label(), "7");
        assert_eq!(Account::new(7, None, false, Decimal::ZERO).with_name("Kas").label(), "Kas");
        assert_eq!(Account::new(7, None, false, Decimal::ZERO).with_code("1101").label(), "1101");
    }
}
