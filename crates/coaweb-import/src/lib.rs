//! Account and budget loaders
//!
//! Chart-of-accounts snapshots arrive either as Accurate JSON exports or as
//! spreadsheet exports (CSV/TSV). Both are turned into [`AccountRecord`]s.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

pub mod accurate;
pub mod error;
pub mod records;
pub mod sheet;

pub use error::ImportError;
pub use records::{AccountRecord, BudgetRecord};

/// Snapshot formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Sheet,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(SnapshotFormat::Json),
            "csv" | "tsv" | "txt" => Ok(SnapshotFormat::Sheet),
            _ => Err(ImportError::UnsupportedFormat { extension }),
        }
    }
}

/// Parse snapshot content in the given format
pub fn parse_accounts(content: &str, format: SnapshotFormat, source_name: &str) -> Result<Vec<AccountRecord>, ImportError> {
    match format {
        SnapshotFormat::Json => accurate::parse_accounts(content, source_name),
        SnapshotFormat::Sheet => sheet::parse_accounts(content, source_name),
    }
}

// ==================== Source Trait ====================

/// Source reference type
pub type SourceRef = Arc<dyn AccountSource>;

/// Where account snapshots and budgets come from
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Load the full account set stored at `path`
    async fn load_accounts(&self, path: PathBuf) -> Result<Vec<AccountRecord>, ImportError>;

    /// Load budget lines stored at `path`
    async fn load_budget(&self, path: PathBuf) -> Result<Vec<BudgetRecord>, ImportError>;
}

/// Reads snapshots from the filesystem
#[derive(Debug, Default)]
pub struct FileAccountSource;

async fn read_file(path: &Path) -> Result<String, ImportError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ImportError::NotFound {
            path: path.to_string_lossy().to_string(),
        }),
        Err(e) => Err(ImportError::IoError(e)),
    }
}

#[async_trait]
impl AccountSource for FileAccountSource {
    async fn load_accounts(&self, path: PathBuf) -> Result<Vec<AccountRecord>, ImportError> {
        let format = SnapshotFormat::from_path(&path)?;
        let content = read_file(&path).await?;
        let source_name = path.to_string_lossy().to_string();

        let records = parse_accounts(&content, format, &source_name)?;
        log::debug!("Loaded {} accounts from {}", records.len(), source_name);
        Ok(records)
    }

    async fn load_budget(&self, path: PathBuf) -> Result<Vec<BudgetRecord>, ImportError> {
        if SnapshotFormat::from_path(&path)? != SnapshotFormat::Json {
            return Err(ImportError::UnsupportedFormat {
                extension: "budget files must be .json".to_string(),
            });
        }
        let content = read_file(&path).await?;
        accurate::parse_budget(&content, &path.to_string_lossy())
    }
}

/// Holds snapshots in memory, keyed by path.
///
/// Useful for embedding and tests; contents can be replaced between loads.
#[derive(Debug, Default)]
pub struct MemoryAccountSource {
    accounts: RwLock<HashMap<PathBuf, Vec<AccountRecord>>>,
    budgets: RwLock<HashMap<PathBuf, Vec<BudgetRecord>>>,
}

impl MemoryAccountSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_accounts(&self, path: impl Into<PathBuf>, records: Vec<AccountRecord>) {
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), records);
    }

    pub fn set_budget(&self, path: impl Into<PathBuf>, records: Vec<BudgetRecord>) {
        self.budgets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), records);
    }
}

#[async_trait]
impl AccountSource for MemoryAccountSource {
    async fn load_accounts(&self, path: PathBuf) -> Result<Vec<AccountRecord>, ImportError> {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&path)
            .cloned()
            .ok_or_else(|| ImportError::NotFound {
                path: path.to_string_lossy().to_string(),
            })
    }

    async fn load_budget(&self, path: PathBuf) -> Result<Vec<BudgetRecord>, ImportError> {
        self.budgets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&path)
            .cloned()
            .ok_or_else(|| ImportError::NotFound {
                path: path.to_string_lossy().to_string(),
            })
    }
}
