//! Chart-of-accounts processing and business logic
//!
//! [`AccountBook`] keeps one [`EntitySnapshot`] per configured entity and
//! the per-session expanded sets used by the tree view.

pub mod budget;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod reports;
pub mod types;

use coaweb_config::{Config, EntityConfig};
use coaweb_import::SourceRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

pub use budget::{variance_report, VarianceReport, VarianceRow};
pub use error::{CoreError, CoreResult, ErrorSeverity};
pub use hierarchy::{displayed_balance, is_visible, AccountIndex, ExpandedSet, HierarchyAnomaly, TreeRow};
pub use models::{Account, AccountId, BudgetLine};
pub use reports::*;
pub use types::{AccountStatus, AccountType};

use error::{DefaultErrorLogger, ErrorLogger};

/// One consistent account set for an entity
#[derive(Debug)]
pub struct EntitySnapshot {
    pub entity: String,
    /// Increases with every load across all entities
    pub generation: u64,
    pub index: AccountIndex,
    pub budget: Vec<BudgetLine>,
}

impl EntitySnapshot {
    pub fn accounts(&self) -> &[Account] {
        self.index.accounts()
    }
}

/// Sent after a snapshot has been replaced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSetChanged {
    pub entity: String,
    pub account_count: usize,
    pub generation: u64,
}

type SessionKey = (String, String);

/// Sessions kept before the least recently used one is dropped
pub const MAX_SESSIONS: usize = 1024;

#[derive(Default)]
struct Sessions {
    entries: HashMap<SessionKey, (ExpandedSet, u64)>,
    clock: u64,
}

impl Sessions {
    fn get(&self, key: &SessionKey) -> Option<&ExpandedSet> {
        self.entries.get(key).map(|(expanded, _)| expanded)
    }

    fn touch(&mut self, key: SessionKey) -> &mut ExpandedSet {
        self.clock += 1;
        if !self.entries.contains_key(&key) && self.entries.len() >= MAX_SESSIONS {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (_, used))| *used)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                log::debug!("Dropping session {} {}", oldest.0, oldest.1);
                self.entries.remove(&oldest);
            }
        }
        let entry = self.entries.entry(key).or_default();
        entry.1 = self.clock;
        &mut entry.0
    }

    fn remove(&mut self, key: &SessionKey) {
        self.entries.remove(key);
    }

    /// Forget ids missing from a new snapshot and drop emptied sessions
    fn prune(&mut self, snapshot: &EntitySnapshot) {
        self.entries.retain(|(_, entity), (expanded, _)| {
            if *entity == snapshot.entity {
                expanded.retain(|id| snapshot.index.get(id).is_some());
                !expanded.is_empty()
            } else {
                true
            }
        });
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Snapshot store and tree-view sessions
pub struct AccountBook {
    config: Config,
    source: SourceRef,
    snapshots: RwLock<HashMap<String, Arc<EntitySnapshot>>>,
    sessions: RwLock<Sessions>,
    generation: AtomicU64,
    events: broadcast::Sender<AccountSetChanged>,
    format: AmountFormat,
}

impl AccountBook {
    /// Create an empty book; nothing is loaded until [`load_entity`](Self::load_entity)
    pub fn new(config: Config, source: SourceRef) -> Self {
        let (events, _) = broadcast::channel(32);
        let format = AmountFormat::from_config(&config.currency);
        Self {
            config,
            source,
            snapshots: RwLock::new(HashMap::new()),
            sessions: RwLock::new(Sessions::default()),
            generation: AtomicU64::new(0),
            events,
            format,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Receive [`AccountSetChanged`] after every snapshot swap
    pub fn subscribe(&self) -> broadcast::Receiver<AccountSetChanged> {
        self.events.subscribe()
    }

    fn entity_config(&self, entity: &str) -> CoreResult<&EntityConfig> {
        self.config.entity(entity).ok_or_else(|| CoreError::EntityNotFound {
            entity: entity.to_string(),
        })
    }

    // ==================== Loading ====================

    /// Load an entity's accounts and budget and swap in the new snapshot
    pub async fn load_entity(&self, entity: &str) -> CoreResult<Arc<EntitySnapshot>> {
        let entity_config = self.entity_config(entity)?;

        let records = self
            .source
            .load_accounts(self.config.accounts_path(entity_config))
            .await
            .map_err(|e| CoreError::import(entity, e))?;

        let budget = match self.source.load_budget(self.config.budget_path(entity_config)).await {
            Ok(lines) => lines.into_iter().map(BudgetLine::from).collect(),
            Err(e) if e.is_not_found() => {
                log::debug!("No budget for {}", entity);
                Vec::new()
            }
            Err(e) => return Err(CoreError::import(entity, e)),
        };

        let index = AccountIndex::new(records.into_iter().map(Account::from).collect());
        for anomaly in index.anomalies() {
            log::warn!(target: "coaweb::hierarchy", "{}: {}", entity, anomaly);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(EntitySnapshot {
            entity: entity.to_string(),
            generation,
            index,
            budget,
        });
        if let Err(current) = self.install(snapshot.clone()) {
            log::debug!(
                "Discarding load {} of {}; generation {} is newer",
                generation,
                entity,
                current.generation
            );
            return Ok(current);
        }

        log::info!(
            "Loaded {} accounts and {} budget lines for {}",
            snapshot.index.len(),
            snapshot.budget.len(),
            entity
        );
        // no receivers is fine
        let _ = self.events.send(AccountSetChanged {
            entity: entity.to_string(),
            account_count: snapshot.index.len(),
            generation,
        });

        Ok(snapshot)
    }

    /// Swap in `snapshot` unless a newer one is already stored.
    ///
    /// Returns the stored snapshot on rejection.
    fn install(&self, snapshot: Arc<EntitySnapshot>) -> Result<(), Arc<EntitySnapshot>> {
        let mut snapshots = write(&self.snapshots);
        if let Some(current) = snapshots.get(&snapshot.entity) {
            if current.generation >= snapshot.generation {
                return Err(current.clone());
            }
        }
        write(&self.sessions).prune(&snapshot);
        snapshots.insert(snapshot.entity.clone(), snapshot);
        Ok(())
    }

    /// Reload every configured entity. Failures keep the previous snapshot.
    pub async fn reload(&self) -> ReloadSummary {
        let logger = DefaultErrorLogger;
        let mut summary = ReloadSummary::default();

        for entity in &self.config.data.entities {
            match self.load_entity(&entity.id).await {
                Ok(_) => summary.loaded.push(entity.id.clone()),
                Err(e) => {
                    logger.log_error(&e, "reload");
                    summary.failed.push(ReloadFailure {
                        entity: entity.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        summary
    }

    // ==================== Read Queries ====================

    /// Current snapshot of an entity
    pub fn snapshot(&self, entity: &str) -> CoreResult<Arc<EntitySnapshot>> {
        self.entity_config(entity)?;
        read(&self.snapshots)
            .get(entity)
            .cloned()
            .ok_or_else(|| CoreError::NotLoaded {
                entity: entity.to_string(),
            })
    }

    /// Full account set of an entity
    pub fn accounts(&self, entity: &str) -> CoreResult<Vec<Account>> {
        Ok(self.snapshot(entity)?.accounts().to_vec())
    }

    /// Configured entities, in configuration order
    pub fn entities(&self) -> Vec<EntitySummary> {
        let snapshots = read(&self.snapshots);
        self.config
            .data
            .entities
            .iter()
            .map(|entity| {
                let snapshot = snapshots.get(&entity.id);
                EntitySummary {
                    id: entity.id.clone(),
                    name: entity.display_name().to_string(),
                    loaded: snapshot.is_some(),
                    account_count: snapshot.map(|s| s.index.len()).unwrap_or(0),
                    anomaly_count: snapshot.map(|s| s.index.anomalies().len()).unwrap_or(0),
                }
            })
            .collect()
    }

    /// Flat account list with displayed balances, in tree order
    pub fn account_views(&self, entity: &str) -> CoreResult<AccountsResponse> {
        let snapshot = self.snapshot(entity)?;
        let balances = snapshot.index.displayed_balances();
        let accounts: Vec<AccountView> = snapshot
            .index
            .tree_order()
            .into_iter()
            .map(|(account, _)| {
                let displayed = balances.get(&account.id).copied().unwrap_or(account.balance);
                AccountView::new(account, displayed, &self.format)
            })
            .collect();

        Ok(AccountsResponse {
            entity: entity.to_string(),
            currency: self.format.currency.clone(),
            total_count: accounts.len(),
            accounts,
        })
    }

    pub fn anomalies(&self, entity: &str) -> CoreResult<Vec<HierarchyAnomaly>> {
        Ok(self.snapshot(entity)?.index.anomalies().to_vec())
    }

    pub fn variance(&self, entity: &str) -> CoreResult<VarianceResponse> {
        let snapshot = self.snapshot(entity)?;
        let report = variance_report(&snapshot.index, &snapshot.budget);
        Ok(VarianceResponse::new(entity, report, &self.format))
    }

    // ==================== Tree Sessions ====================

    fn session_key(session: &str, entity: &str) -> SessionKey {
        (session.to_string(), entity.to_string())
    }

    /// Expanded set of a session; empty if the session is new
    pub fn expanded(&self, session: &str, entity: &str) -> ExpandedSet {
        read(&self.sessions)
            .get(&Self::session_key(session, entity))
            .cloned()
            .unwrap_or_default()
    }

    /// Flip one account between expanded and collapsed
    pub fn toggle(&self, session: &str, entity: &str, id: AccountId) -> CoreResult<bool> {
        let snapshot = self.snapshot(entity)?;
        if snapshot.index.get(id).is_none() {
            return Err(CoreError::AccountNotFound {
                entity: entity.to_string(),
                id,
            });
        }

        let expanded = write(&self.sessions)
            .touch(Self::session_key(session, entity))
            .toggle(id);
        log::debug!("Session {} {} account {} -> {}", session, entity, id, expanded);
        Ok(expanded)
    }

    /// Collapse everything in a session
    pub fn collapse_all(&self, session: &str, entity: &str) -> CoreResult<()> {
        self.entity_config(entity)?;
        write(&self.sessions).remove(&Self::session_key(session, entity));
        Ok(())
    }

    /// Visible rows for a session
    pub fn tree(&self, session: &str, entity: &str) -> CoreResult<TreeResponse> {
        let snapshot = self.snapshot(entity)?;
        let expanded = self.expanded(session, entity);

        let mut rows = snapshot.index.visible_rows(&expanded);
        if !self.config.view.show_suspended {
            // children follow their parent, so a hidden parent hides the subtree
            let mut hidden = std::collections::HashSet::new();
            rows.retain(|row| {
                let hide = row.suspended || row.parent_id.map_or(false, |p| hidden.contains(&p));
                if hide {
                    hidden.insert(row.id);
                }
                !hide
            });
        }

        Ok(TreeResponse {
            entity: entity.to_string(),
            session: session.to_string(),
            currency: self.format.currency.clone(),
            expanded,
            rows: rows
                .into_iter()
                .map(|row| TreeRowView {
                    display: self.format.format(row.displayed_balance),
                    row,
                })
                .collect(),
        })
    }

    /// Toggle and return the resulting tree
    pub fn toggle_tree(&self, session: &str, entity: &str, id: AccountId) -> CoreResult<ToggleResponse> {
        let expanded = self.toggle(session, entity, id)?;
        Ok(ToggleResponse {
            id,
            expanded,
            tree: self.tree(session, entity)?,
        })
    }
}
