//! Basic types for the chart of accounts

use serde::{Deserialize, Serialize};

/// Account type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Cash, bank, receivables, inventory, fixed assets
    Asset,
    /// Payables, loans
    Liability,
    /// Owner's equity, retained earnings
    Equity,
    /// Sales and other income
    Revenue,
    /// Cost of goods sold and operating expenses
    Expense,
    /// Anything the source does not classify
    #[default]
    Other,
}

impl AccountType {
    /// Infer the type from an account code's leading digit.
    ///
    /// Follows the usual Indonesian COA numbering: 1 asset, 2 liability,
    /// 3 equity, 4 revenue, 5-9 cost and expense groups.
    pub fn from_code(code: &str) -> Self {
        match code.trim().chars().next() {
            Some('1') => AccountType::Asset,
            Some('2') => AccountType::Liability,
            Some('3') => AccountType::Equity,
            Some('4') => AccountType::Revenue,
            Some('5'..='9') => AccountType::Expense,
            _ => AccountType::Other,
        }
    }

    /// Resolve a source label, falling back to the code prefix
    pub fn resolve(label: Option<&str>, code: &str) -> Self {
        label
            .and_then(|l| l.parse().ok())
            .filter(|t| *t != AccountType::Other)
            .unwrap_or_else(|| Self::from_code(code))
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accurate labels (CASH_BANK, ACCOUNT_PAYABLE, ...) plus plain names
        match s.trim().to_uppercase().replace(&[' ', '-'][..], "_").as_str() {
            "ASSET" | "ASSETS" | "ASET" | "CASH_BANK" | "ACCOUNT_RECEIVABLE" | "INVENTORY"
            | "OTHER_CURRENT_ASSET" | "FIXED_ASSET" | "ACCUMULATED_DEPRECIATION"
            | "OTHER_ASSET" => Ok(AccountType::Asset),
            "LIABILITY" | "LIABILITIES" | "KEWAJIBAN" | "ACCOUNT_PAYABLE"
            | "OTHER_CURRENT_LIABILITY" | "LONG_TERM_LIABILITY" => Ok(AccountType::Liability),
            "EQUITY" | "MODAL" | "EKUITAS" => Ok(AccountType::Equity),
            "REVENUE" | "INCOME" | "PENDAPATAN" | "OTHER_INCOME" => Ok(AccountType::Revenue),
            "EXPENSE" | "EXPENSES" | "BEBAN" | "COGS" | "OTHER_EXPENSE" => Ok(AccountType::Expense),
            "OTHER" => Ok(AccountType::Other),
            _ => Err(format!("Invalid account type: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountType::Asset => write!(f, "asset"),
            AccountType::Liability => write!(f, "liability"),
            AccountType::Equity => write!(f, "equity"),
            AccountType::Revenue => write!(f, "revenue"),
            AccountType::Expense => write!(f, "expense"),
            AccountType::Other => write!(f, "other"),
        }
    }
}

/// Administrative status, display only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Suspended,
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Suspended => write!(f, "suspended"),
        }
    }
}
