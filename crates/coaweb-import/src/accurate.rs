//! Accurate chart-of-accounts JSON export
//!
//! Accepts either a bare array of account objects or the API envelope
//! `{"s": true, "d": [...]}`. Field names follow the Accurate API
//! (`parentId`, `lvl`, `isParent`, `no`, `accountType`); snake_case
//! spellings are accepted as well.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ImportError;
use crate::records::{complete_records, AccountRecord, BudgetRecord, PartialRecord};

#[derive(Debug, Deserialize)]
struct AccurateAccount {
    id: u64,
    #[serde(default, rename = "parentId", alias = "parent_id")]
    parent_id: Option<u64>,
    #[serde(default, rename = "lvl", alias = "level")]
    level: Option<u32>,
    #[serde(default, rename = "isParent", alias = "is_parent")]
    is_parent: Option<bool>,
    #[serde(default)]
    balance: Option<Decimal>,
    #[serde(default)]
    suspended: bool,
    #[serde(default, rename = "no", alias = "code")]
    code: String,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "accountType", alias = "account_type")]
    account_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Envelope { d: Vec<T> },
    List(Vec<T>),
}

impl<T> Payload<T> {
    fn into_rows(self) -> Vec<T> {
        match self {
            Payload::Envelope { d } => d,
            Payload::List(rows) => rows,
        }
    }
}

/// Parse an Accurate account export
pub fn parse_accounts(content: &str, source_name: &str) -> Result<Vec<AccountRecord>, ImportError> {
    let payload: Payload<AccurateAccount> = serde_json::from_str(content)
        .map_err(|e| ImportError::InvalidJson {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;

    let partial = payload
        .into_rows()
        .into_iter()
        .map(|a| PartialRecord {
            id: a.id,
            parent_id: a.parent_id,
            level: a.level,
            is_parent: a.is_parent,
            balance: a.balance.unwrap_or_default(),
            suspended: a.suspended,
            code: a.code,
            name: a.name,
            account_type: a.account_type,
        })
        .collect();

    Ok(complete_records(partial))
}

/// Parse a budget file: a list of `{account_id, amount}` objects
pub fn parse_budget(content: &str, source_name: &str) -> Result<Vec<BudgetRecord>, ImportError> {
    let payload: Payload<BudgetRecord> = serde_json::from_str(content)
        .map_err(|e| ImportError::InvalidJson {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
    Ok(payload.into_rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_accurate_envelope() {
        let content = r#"{"s": true, "d": [
            {"id": 50, "no": "1000", "name": "ASET", "lvl": 1, "isParent": true, "balance": "0", "accountType": "CASH_BANK"},
            {"id": 51, "parentId": 50, "no": "1101", "name": "Kas", "lvl": 2, "isParent": false, "balance": "1500000.25", "accountType": "CASH_BANK", "suspended": true}
        ]}"#;

        let records = parse_accounts(content, "pt.json").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].parent_id, Some(50));
        assert_eq!(records[1].balance, Decimal::from_str("1500000.25").unwrap());
        assert!(records[1].suspended);
        assert_eq!(records[1].code, "1101");
        assert_eq!(records[0].account_type.as_deref(), Some("CASH_BANK"));
    }

    #[test]
    fn test_parse_snake_case_list_derives_missing_fields() {
        let content = r#"[
            {"id": 1, "code": "4", "name": "Pendapatan"},
            {"id": 2, "parent_id": 1, "code": "4101", "name": "Penjualan", "balance": 250}
        ]"#;

        let records = parse_accounts(content, "cv.json").unwrap();
        assert!(records[0].is_parent);
        assert_eq!(records[0].level, 1);
        assert_eq!(records[0].balance, Decimal::ZERO);
        assert!(!records[1].is_parent);
        assert_eq!(records[1].level, 2);
        assert_eq!(records[1].balance, Decimal::from(250));
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_accounts("{not json", "broken.json").unwrap_err();
        assert!(matches!(err, ImportError::InvalidJson { ref source_name, .. } if source_name == "broken.json"));
    }

    #[test]
    fn test_parse_budget() {
        let content = r#"[{"account_id": 51, "amount": "2000000"}, {"accountId": 52, "amount": 10}]"#;
        let budget = parse_budget(content, "pt.budget.json").unwrap();
        assert_eq!(budget.len(), 2);
        assert_eq!(budget[0].account_id, 51);
        assert_eq!(budget[1].amount, Decimal::from(10));
    }
}
