//! Spreadsheet exports (CSV / TSV)
//!
//! The header row is matched loosely: case, spacing and punctuation are
//! ignored, and both Indonesian and English column names are recognised.
//! Cell values must already be plain numbers; locale-formatted cells are
//! not interpreted.

use csv::{ReaderBuilder, StringRecord, Trim};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ImportError;
use crate::records::{complete_records, AccountRecord, PartialRecord};

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Columns the importer knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    ParentId,
    Level,
    IsParent,
    Balance,
    Suspended,
    Code,
    Name,
    AccountType,
}

impl Column {
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Id => &["id", "accountid", "idakun"],
            Column::ParentId => &["parentid", "parent", "idinduk", "induk", "parentaccountid"],
            Column::Level => &["level", "lvl", "tingkat"],
            Column::IsParent => &["isparent", "parentflag", "akuninduk", "header"],
            Column::Balance => &["balance", "saldo", "saldoakhir", "amount", "nilai"],
            Column::Suspended => &["suspended", "nonaktif", "inactive", "suspend"],
            Column::Code => &["code", "no", "noakun", "kodeakun", "kode", "accountno", "accountnumber"],
            Column::Name => &["name", "nama", "namaakun", "accountname"],
            Column::AccountType => &["accounttype", "tipeakun", "jenisakun", "tipe", "type"],
        }
    }

    const ALL: [Column; 9] = [
        Column::Id,
        Column::ParentId,
        Column::Level,
        Column::IsParent,
        Column::Balance,
        Column::Suspended,
        Column::Code,
        Column::Name,
        Column::AccountType,
    ];
}

/// Lowercase and strip everything but letters and digits
pub fn normalize_header(header: &str) -> String {
    NON_ALNUM.replace_all(&header.to_lowercase(), "").into_owned()
}

/// Map a header cell to a known column
pub fn match_header(header: &str) -> Option<Column> {
    let key = normalize_header(header);
    if key.is_empty() {
        return None;
    }
    Column::ALL
        .into_iter()
        .find(|c| c.aliases().contains(&key.as_str()))
}

/// Pick the delimiter that splits the header line into the most cells
pub fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    [b'\t', b';', b',']
        .into_iter()
        .max_by_key(|d| header.matches(*d as char).count())
        .filter(|d| header.contains(*d as char))
        .unwrap_or(b',')
}

#[derive(Debug, Default)]
struct ColumnMap {
    positions: Vec<(Column, usize)>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut positions: Vec<(Column, usize)> = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(column) = match_header(header) {
                if !positions.iter().any(|(c, _)| *c == column) {
                    positions.push((column, idx));
                }
            }
        }
        Self { positions }
    }

    fn get<'r>(&self, column: Column, row: &'r StringRecord) -> Option<&'r str> {
        self.positions
            .iter()
            .find(|(c, _)| *c == column)
            .and_then(|(_, idx)| row.get(*idx))
            .filter(|v| !v.is_empty())
    }

    fn has(&self, column: Column) -> bool {
        self.positions.iter().any(|(c, _)| *c == column)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "ya" | "x"
    )
}

/// Parse a delimited account sheet
pub fn parse_accounts(content: &str, source_name: &str) -> Result<Vec<AccountRecord>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(detect_delimiter(content))
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let columns = ColumnMap::from_headers(reader.headers()?);
    for required in [Column::Id, Column::Balance] {
        if !columns.has(required) {
            return Err(ImportError::MissingColumn {
                column: format!("{:?}", required).to_lowercase(),
                source_name: source_name.to_string(),
            });
        }
    }
    log::debug!(
        "Sheet {} columns: {:?}",
        source_name,
        columns.positions.iter().map(|(c, _)| *c).collect::<Vec<_>>()
    );

    let mut partial = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        // header is row 1
        let row_number = idx + 2;
        let bad_row = |message: String| ImportError::BadRow {
            source_name: source_name.to_string(),
            row: row_number,
            message,
        };

        let Some(id) = columns.get(Column::Id, &record) else {
            // blank trailing lines
            if record.iter().all(|v| v.is_empty()) {
                continue;
            }
            return Err(bad_row("missing id".to_string()));
        };
        let id = id.parse::<u64>()
            .map_err(|e| bad_row(format!("id '{}': {}", id, e)))?;

        let parent_id = match columns.get(Column::ParentId, &record) {
            Some(v) => Some(v.parse::<u64>()
                .map_err(|e| bad_row(format!("parent id '{}': {}", v, e)))?),
            None => None,
        };
        let level = match columns.get(Column::Level, &record) {
            Some(v) => Some(v.parse::<u32>()
                .map_err(|e| bad_row(format!("level '{}': {}", v, e)))?),
            None => None,
        };
        let balance = match columns.get(Column::Balance, &record) {
            Some(v) => Decimal::from_str(v)
                .map_err(|e| bad_row(format!("balance '{}': {}", v, e)))?,
            None => Decimal::ZERO,
        };

        partial.push(PartialRecord {
            id,
            parent_id,
            level,
            is_parent: columns.get(Column::IsParent, &record).map(parse_flag),
            balance,
            suspended: columns.get(Column::Suspended, &record).map(parse_flag).unwrap_or(false),
            code: columns.get(Column::Code, &record).unwrap_or_default().to_string(),
            name: columns.get(Column::Name, &record).unwrap_or_default().to_string(),
            account_type: columns.get(Column::AccountType, &record).map(str::to_string),
        });
    }

    Ok(complete_records(partial))
}
