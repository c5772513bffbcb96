//! Report structures for API responses

use coaweb_config::CurrencyConfig;
use coaweb_utils::format_amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::budget::{VarianceReport, VarianceRow};
use crate::hierarchy::{ExpandedSet, TreeRow};
use crate::models::{Account, AccountId};
use crate::types::{AccountStatus, AccountType};

/// Amount formatting taken from the currency settings
#[derive(Debug, Clone, PartialEq)]
pub struct AmountFormat {
    pub currency: String,
    pub decimal_places: u32,
    pub thousands_separator: String,
    pub decimal_separator: String,
}

impl AmountFormat {
    pub fn from_config(config: &CurrencyConfig) -> Self {
        Self {
            currency: config.default_currency.clone(),
            decimal_places: config.decimal_places,
            thousands_separator: config.thousands_separator.clone(),
            decimal_separator: config.decimal_separator.clone(),
        }
    }

    pub fn format(&self, value: Decimal) -> String {
        format_amount(
            value,
            self.decimal_places,
            &self.thousands_separator,
            &self.decimal_separator,
        )
    }
}

impl Default for AmountFormat {
    fn default() -> Self {
        Self::from_config(&CurrencyConfig::default())
    }
}

/// Entity list entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySummary {
    pub id: String,
    pub name: String,
    pub loaded: bool,
    pub account_count: usize,
    pub anomaly_count: usize,
}

/// Flat account entry with its displayed balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountView {
    pub id: AccountId,
    pub parent_id: Option<AccountId>,
    pub level: u32,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub status: AccountStatus,
    pub is_parent: bool,
    /// Balance as recorded by the source
    pub balance: Decimal,
    pub displayed_balance: Decimal,
    /// Displayed balance, formatted
    pub display: String,
}

impl AccountView {
    pub fn new(account: &Account, displayed_balance: Decimal, format: &AmountFormat) -> Self {
        Self {
            id: account.id,
            parent_id: account.parent_id,
            level: account.level,
            code: account.code.clone(),
            name: account.name.clone(),
            account_type: account.account_type,
            status: account.status(),
            is_parent: account.is_parent,
            balance: account.balance,
            displayed_balance,
            display: format.format(displayed_balance),
        }
    }
}

/// Accounts list response for API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsResponse {
    pub entity: String,
    pub currency: String,
    pub accounts: Vec<AccountView>,
    pub total_count: usize,
}

/// Tree row with formatted balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeRowView {
    #[serde(flatten)]
    pub row: TreeRow,
    pub display: String,
}

/// Visible tree for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResponse {
    pub entity: String,
    pub session: String,
    pub currency: String,
    pub expanded: ExpandedSet,
    pub rows: Vec<TreeRowView>,
}

/// Result of a toggle command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub id: AccountId,
    /// Membership after the toggle
    pub expanded: bool,
    pub tree: TreeResponse,
}

/// Variance row with formatted amounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceRowView {
    #[serde(flatten)]
    pub row: VarianceRow,
    pub budget_display: String,
    pub realisasi_display: String,
    pub variance_display: String,
    pub percentage_display: Option<String>,
}

/// Budget vs realisasi response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceResponse {
    pub entity: String,
    pub currency: String,
    pub rows: Vec<VarianceRowView>,
    pub total_budget: String,
    pub total_realisasi: String,
    pub total_variance: String,
    pub total_percentage: Option<String>,
    pub unmatched: Vec<AccountId>,
    /// Some amount was out of range and clamped
    pub clamped: bool,
}

impl VarianceResponse {
    pub fn new(entity: &str, report: VarianceReport, format: &AmountFormat) -> Self {
        let percent = |p: Option<Decimal>| p.map(|v| format!("{}%", format.format(v)));
        Self {
            entity: entity.to_string(),
            currency: format.currency.clone(),
            total_budget: format.format(report.total_budget),
            total_realisasi: format.format(report.total_realisasi),
            total_variance: format.format(report.total_variance),
            total_percentage: percent(report.total_percentage),
            unmatched: report.unmatched,
            clamped: report.clamped,
            rows: report
                .rows
                .into_iter()
                .map(|row| VarianceRowView {
                    budget_display: format.format(row.budget),
                    realisasi_display: format.format(row.realisasi),
                    variance_display: format.format(row.variance),
                    percentage_display: percent(row.percentage),
                    row,
                })
                .collect(),
        }
    }
}

/// Outcome of reloading every entity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReloadSummary {
    pub loaded: Vec<String>,
    pub failed: Vec<ReloadFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadFailure {
    pub entity: String,
    pub error: String,
}
