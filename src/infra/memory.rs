//! In-memory table store shared by every unit of work of a process.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::snapshot;
use crate::config::{Config, FIRST_ENTITY_ID};
use crate::domain::{Entity, EntityId};
use crate::errors::{StoreError, StoreResult};

/// Rows of one table plus its identity counter
#[derive(Debug)]
pub(crate) struct TableState<T> {
    pub rows: BTreeMap<EntityId, T>,
    pub next_id: EntityId,
}

impl<T> Default for TableState<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: FIRST_ENTITY_ID,
        }
    }
}

/// Shared handle to the rows of entity type `T`.
pub struct Table<T> {
    state: Arc<RwLock<TableState<T>>>,
    snapshot: Option<PathBuf>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            snapshot: self.snapshot.clone(),
        }
    }
}

impl<T: Entity> Table<T> {
    fn open(snapshot_dir: Option<&Path>) -> StoreResult<Self> {
        let snapshot_path = snapshot_dir.map(|dir| snapshot::path_for(dir, T::TABLE));

        let saved = match snapshot_path.as_deref() {
            Some(path) => snapshot::load::<T>(path)?,
            None => None,
        };

        let state = match saved {
            Some(saved) => {
                let rows: BTreeMap<_, _> = saved.rows.into_iter().map(|e| (e.id(), e)).collect();
                // Never hand out an identity that is already stored. When the
                // last stored identity is the maximum, the counter stays on it
                // and additions fail as exhausted.
                let after_last = match rows.keys().next_back() {
                    Some(last) => last.checked_add(1).unwrap_or(EntityId::MAX),
                    None => FIRST_ENTITY_ID,
                };
                TableState {
                    next_id: saved.next_id.max(after_last),
                    rows,
                }
            }
            None => TableState::default(),
        };

        tracing::debug!(table = T::TABLE, rows = state.rows.len(), "Opened table");

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            snapshot: snapshot_path,
        })
    }

    pub(crate) fn read(&self) -> StoreResult<RwLockReadGuard<'_, TableState<T>>> {
        self.state
            .read()
            .map_err(|_| StoreError::LockPoisoned(T::TABLE))
    }

    pub(crate) fn write(&self) -> StoreResult<RwLockWriteGuard<'_, TableState<T>>> {
        self.state
            .write()
            .map_err(|_| StoreError::LockPoisoned(T::TABLE))
    }

    /// Snapshot file, when the database persists tables
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.rows.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[derive(Default)]
struct DatabaseInner {
    tables: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
    snapshot_dir: Option<PathBuf>,
}

/// Process-wide set of tables, one per entity type.
///
/// Cloning shares the same tables. Units of work opened on the same database
/// see each other's commits.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    inner: Arc<DatabaseInner>,
}

impl MemoryDatabase {
    /// Purely in-memory database
    pub fn new() -> Self {
        Self::default()
    }

    /// Database whose tables are loaded from and written to `dir`
    pub fn with_snapshot_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DatabaseInner {
                tables: RwLock::new(HashMap::new()),
                snapshot_dir: Some(dir.into()),
            }),
        }
    }

    pub fn open(config: &Config) -> Self {
        match &config.data_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "Using snapshot directory");
                Self::with_snapshot_dir(dir.clone())
            }
            None => Self::new(),
        }
    }

    pub fn snapshot_dir(&self) -> Option<&Path> {
        self.inner.snapshot_dir.as_deref()
    }

    /// Table of entity type `T`, opened (and loaded) on first use.
    pub fn table<T: Entity>(&self) -> StoreResult<Table<T>> {
        let key = TypeId::of::<T>();

        {
            let tables = self
                .inner
                .tables
                .read()
                .map_err(|_| StoreError::LockPoisoned("tables"))?;
            if let Some(table) = tables.get(&key).and_then(|t| t.downcast_ref::<Table<T>>()) {
                return Ok(table.clone());
            }
        }

        let mut tables = self
            .inner
            .tables
            .write()
            .map_err(|_| StoreError::LockPoisoned("tables"))?;

        // Another thread may have opened it between the two locks.
        if let Some(table) = tables.get(&key).and_then(|t| t.downcast_ref::<Table<T>>()) {
            return Ok(table.clone());
        }

        let table = Table::<T>::open(self.snapshot_dir())?;
        tables.insert(key, Box::new(table.clone()));
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Product;
    use chrono::NaiveDate;

    #[test]
    fn test_same_table_is_shared() {
        let db = MemoryDatabase::new();
        let a = db.table::<Product>().unwrap();
        let b = db.clone().table::<Product>().unwrap();

        let mut product = Product::new("PS4", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        product.set_id(1);
        a.write().unwrap().rows.insert(1, product);

        assert_eq!(b.len().unwrap(), 1);
        assert!(db.snapshot_dir().is_none());
        assert!(b.snapshot_path().is_none());
    }

    #[test]
    fn test_fresh_table_starts_at_first_id() {
        let table = MemoryDatabase::new().table::<Product>().unwrap();
        assert!(table.is_empty().unwrap());
        assert_eq!(table.read().unwrap().next_id, FIRST_ENTITY_ID);
    }

    #[test]
    fn test_loads_snapshot_and_repairs_counter() {
        let dir = tempfile::tempdir().unwrap();
        let mut product = Product::new("PS4", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        product.set_id(7);
        snapshot::write(&snapshot::path_for(dir.path(), "products"), 2, [&product]).unwrap();

        let table = MemoryDatabase::with_snapshot_dir(dir.path())
            .table::<Product>()
            .unwrap();
        let state = table.read().unwrap();
        assert_eq!(state.rows.len(), 1);
        assert_eq!(state.next_id, 8);
    }

    #[test]
    fn test_snapshot_at_max_identity_opens() {
        let dir = tempfile::tempdir().unwrap();
        let mut product = Product::new("PS4", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        product.set_id(EntityId::MAX);
        snapshot::write(&snapshot::path_for(dir.path(), "products"), 1, [&product]).unwrap();

        let table = MemoryDatabase::with_snapshot_dir(dir.path())
            .table::<Product>()
            .unwrap();
        assert_eq!(table.read().unwrap().next_id, EntityId::MAX);
        assert_eq!(table.len().unwrap(), 1);
    }
}
