//! Unit of Work pattern implementation.
//!
//! The Unit of Work:
//! - Commits a batch of additions, modifications and removals of one entity type
//! - Validates every entity of the batch before touching the table
//! - Applies a whole batch or nothing
//! - Answers identity and predicate queries against committed state

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use validator::Validate;

use super::memory::{MemoryDatabase, Table, TableState};
use super::snapshot;
use crate::domain::{Entity, EntityId, Predicate, ValidationFailure};
use crate::errors::{StoreError, StoreResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Outcome of a successful commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    /// Identities given to added entities, in batch order
    pub assigned: Vec<EntityId>,
    /// Rows inserted, replaced or removed
    pub affected: usize,
}

/// One mutation of a commit batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<T> {
    /// Insert under a fresh identity
    Added(T),
    /// Replace the stored entity with the same identity
    Modified(T),
    Removed(EntityId),
}

impl<T: Entity> Change<T> {
    /// Removals of `entities`, one per distinct identity, in input order
    pub fn removals(entities: impl IntoIterator<Item = T>) -> Vec<Self> {
        let mut seen = HashSet::new();
        entities
            .into_iter()
            .map(|entity| entity.id())
            .filter(|id| seen.insert(*id))
            .map(Change::Removed)
            .collect()
    }
}

/// Persistence contract consumed by repositories.
///
/// `commit`/`commit_async` apply one caller's batch atomically and are what
/// repositories use. The staging calls collect a batch on the unit of work
/// itself for `save`/`save_async`; that batch belongs to whoever owns the
/// unit of work and is not isolated between callers.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UnitOfWork<T: Entity>: Send + Sync {
    /// Apply `changes` as one all-or-nothing batch.
    ///
    /// Fails with [`StoreError::Validation`] carrying every field error of the
    /// batch when any added or modified entity is invalid.
    fn commit(&self, changes: Vec<Change<T>>) -> StoreResult<Commit>;

    async fn commit_async(&self, changes: Vec<Change<T>>) -> StoreResult<Commit>;

    /// Stage a new entity; its identity is assigned on save
    fn add(&self, entity: T);

    fn add_range(&self, entities: Vec<T>);

    /// Stage new values for the stored entity with the same identity
    fn update(&self, entity: T);

    /// Stage removal of the stored entity with the same identity
    fn remove(&self, entity: T);

    fn remove_range(&self, entities: Vec<T>);

    fn find_by_id(&self, id: EntityId) -> StoreResult<Option<T>>;

    async fn find_by_id_async(&self, id: EntityId) -> StoreResult<Option<T>>;

    fn all(&self) -> StoreResult<Vec<T>>;

    async fn all_async(&self) -> StoreResult<Vec<T>>;

    fn count(&self) -> StoreResult<usize>;

    async fn count_async(&self) -> StoreResult<usize>;

    /// The only entity matching `predicate`.
    ///
    /// Fails with [`StoreError::NonUnique`] when several match.
    fn single(&self, predicate: &Predicate<T>) -> StoreResult<Option<T>>;

    async fn single_async(&self, predicate: &Predicate<T>) -> StoreResult<Option<T>>;

    fn filter(&self, predicate: &Predicate<T>) -> StoreResult<Vec<T>>;

    async fn filter_async(&self, predicate: &Predicate<T>) -> StoreResult<Vec<T>>;

    /// Commit everything staged since the previous save.
    fn save(&self) -> StoreResult<Commit>;

    async fn save_async(&self) -> StoreResult<Commit>;
}

/// Prior contents of a row touched by a batch
enum Undo<T> {
    Inserted(EntityId),
    Replaced(T),
    Deleted(T),
}

/// Unit of work over a [`MemoryDatabase`] table.
///
/// Committed rows are shared with every other unit of work on the same
/// database. Each commit holds the table write lock until its snapshot is
/// written, so commits on one table are serialized.
/// The in-memory engine never suspends, so the async forms complete
/// immediately.
pub struct Persistence<T: Entity> {
    table: Table<T>,
    pending: Mutex<Vec<Change<T>>>,
}

impl<T: Entity> Persistence<T> {
    pub fn new(db: &MemoryDatabase) -> StoreResult<Self> {
        Ok(Self {
            table: db.table::<T>()?,
            pending: Mutex::new(Vec::new()),
        })
    }

    /// Number of changes waiting for the next save
    pub fn pending(&self) -> usize {
        self.staged().len()
    }

    fn staged(&self) -> MutexGuard<'_, Vec<Change<T>>> {
        // A panic mid-push leaves the list intact, so a poisoned lock is still usable.
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn stage(&self, changes: impl IntoIterator<Item = Change<T>>) {
        self.staged().extend(changes);
    }

    fn validate(changes: &[Change<T>]) -> StoreResult<()> {
        let mut failure = ValidationFailure::new();
        for change in changes {
            if let Change::Added(entity) | Change::Modified(entity) = change {
                if let Err(errors) = entity.validate() {
                    failure.record(T::TABLE, &errors);
                }
            }
        }

        if failure.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(failure))
        }
    }

    /// Apply `changes` in place, recording how to undo each step.
    fn apply_changes(
        state: &mut TableState<T>,
        changes: Vec<Change<T>>,
        undo: &mut Vec<Undo<T>>,
    ) -> StoreResult<Commit> {
        let mut commit = Commit::default();

        for change in changes {
            match change {
                Change::Added(mut entity) => {
                    let id = state.next_id;
                    let exhausted = StoreError::IdentityExhausted {
                        table: T::TABLE,
                        last: id,
                    };
                    if state.rows.contains_key(&id) {
                        return Err(exhausted);
                    }
                    let next_id = id.checked_add(1).ok_or(exhausted)?;
                    entity.set_id(id);
                    state.rows.insert(id, entity);
                    state.next_id = next_id;
                    undo.push(Undo::Inserted(id));
                    commit.assigned.push(id);
                }
                Change::Modified(entity) => {
                    let id = entity.id();
                    let slot = state
                        .rows
                        .get_mut(&id)
                        .ok_or(StoreError::NotTracked { table: T::TABLE, id })?;
                    undo.push(Undo::Replaced(std::mem::replace(slot, entity)));
                }
                Change::Removed(id) => {
                    let previous = state
                        .rows
                        .remove(&id)
                        .ok_or(StoreError::NotTracked { table: T::TABLE, id })?;
                    undo.push(Undo::Deleted(previous));
                }
            }
            commit.affected += 1;
        }

        Ok(commit)
    }

    fn rollback(state: &mut TableState<T>, undo: Vec<Undo<T>>, next_id: EntityId) {
        for step in undo.into_iter().rev() {
            match step {
                Undo::Inserted(id) => {
                    state.rows.remove(&id);
                }
                Undo::Replaced(entity) | Undo::Deleted(entity) => {
                    state.rows.insert(entity.id(), entity);
                }
            }
        }
        state.next_id = next_id;
    }

    fn apply(&self, changes: Vec<Change<T>>) -> StoreResult<Commit> {
        if changes.is_empty() {
            return Ok(Commit::default());
        }

        Self::validate(&changes)?;

        let mut state = self.table.write()?;
        let first_id = state.next_id;
        let mut undo = Vec::with_capacity(changes.len());

        let outcome = Self::apply_changes(&mut state, changes, &mut undo).and_then(|commit| {
            match self.table.snapshot_path() {
                Some(path) => snapshot::write(path, state.next_id, state.rows.values()).map(|_| commit),
                None => Ok(commit),
            }
        });

        match outcome {
            Ok(commit) => {
                tracing::debug!(
                    table = T::TABLE,
                    affected = commit.affected,
                    added = commit.assigned.len(),
                    "Committed"
                );
                Ok(commit)
            }
            Err(err) => {
                Self::rollback(&mut state, undo, first_id);
                Err(err)
            }
        }
    }

    fn matching(&self, predicate: &Predicate<T>) -> StoreResult<Vec<T>> {
        Ok(self
            .table
            .read()?
            .rows
            .values()
            .filter(|entity| predicate.matches(entity))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl<T: Entity> UnitOfWork<T> for Persistence<T> {
    fn commit(&self, changes: Vec<Change<T>>) -> StoreResult<Commit> {
        self.apply(changes)
    }

    async fn commit_async(&self, changes: Vec<Change<T>>) -> StoreResult<Commit> {
        self.apply(changes)
    }

    fn add(&self, entity: T) {
        self.stage([Change::Added(entity)]);
    }

    fn add_range(&self, entities: Vec<T>) {
        self.stage(entities.into_iter().map(Change::Added));
    }

    fn update(&self, entity: T) {
        self.stage([Change::Modified(entity)]);
    }

    fn remove(&self, entity: T) {
        self.stage([Change::Removed(entity.id())]);
    }

    fn remove_range(&self, entities: Vec<T>) {
        self.stage(Change::removals(entities));
    }

    fn find_by_id(&self, id: EntityId) -> StoreResult<Option<T>> {
        Ok(self.table.read()?.rows.get(&id).cloned())
    }

    async fn find_by_id_async(&self, id: EntityId) -> StoreResult<Option<T>> {
        self.find_by_id(id)
    }

    fn all(&self) -> StoreResult<Vec<T>> {
        Ok(self.table.read()?.rows.values().cloned().collect())
    }

    async fn all_async(&self) -> StoreResult<Vec<T>> {
        self.all()
    }

    fn count(&self) -> StoreResult<usize> {
        self.table.len()
    }

    async fn count_async(&self) -> StoreResult<usize> {
        self.count()
    }

    fn single(&self, predicate: &Predicate<T>) -> StoreResult<Option<T>> {
        let mut matches = self.matching(predicate)?;
        if matches.len() > 1 {
            return Err(StoreError::NonUnique {
                table: T::TABLE,
                predicate: predicate.label().to_string(),
                count: matches.len(),
            });
        }
        Ok(matches.pop())
    }

    async fn single_async(&self, predicate: &Predicate<T>) -> StoreResult<Option<T>> {
        self.single(predicate)
    }

    fn filter(&self, predicate: &Predicate<T>) -> StoreResult<Vec<T>> {
        self.matching(predicate)
    }

    async fn filter_async(&self, predicate: &Predicate<T>) -> StoreResult<Vec<T>> {
        self.filter(predicate)
    }

    fn save(&self) -> StoreResult<Commit> {
        // The staged batch is consumed by the attempt, whatever its outcome.
        let changes = std::mem::take(&mut *self.staged());
        self.apply(changes)
    }

    async fn save_async(&self) -> StoreResult<Commit> {
        self.save()
    }
}
