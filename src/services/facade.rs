//! Facade - Shared entry point per entity type.
//!
//! Holds no state of its own. Every method forwards to the repository with
//! the same arguments and returns its result untouched, errors included.

use std::sync::Arc;

use crate::domain::{Entity, EntityId, Predicate};
use crate::errors::AppResult;
use crate::infra::{
    DeleteRepository, GenericRepository, MemoryDatabase, ReadRepository, Repository, WriteRepository,
};

/// Pass-through to the one repository instance of `T`.
///
/// Clones share that instance.
pub struct Facade<T: Entity> {
    repo: Arc<dyn Repository<T>>,
}

impl<T: Entity> std::fmt::Debug for Facade<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Facade").finish_non_exhaustive()
    }
}

impl<T: Entity> Clone for Facade<T> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<T: Entity> Facade<T> {
    pub fn new(repo: Arc<dyn Repository<T>>) -> Self {
        Self { repo }
    }

    /// Facade over a new in-memory repository on `db`
    pub fn in_memory(db: &MemoryDatabase) -> AppResult<Self> {
        let repo = GenericRepository::<T, _>::in_memory(db)?;
        Ok(Self::new(Arc::new(repo)))
    }

    /// Whether two facades route to the same repository instance
    pub fn shares_repository(&self, other: &Facade<T>) -> bool {
        Arc::ptr_eq(&self.repo, &other.repo)
    }

    // =========================================================================
    // Create
    // =========================================================================

    pub fn create(&self, entity: Option<T>) -> AppResult<Option<T>> {
        self.repo.create(entity)
    }

    pub async fn create_async(&self, entity: Option<T>) -> AppResult<Option<T>> {
        self.repo.create_async(entity).await
    }

    pub fn add_range(&self, entities: Option<Vec<T>>) -> AppResult<Option<Vec<T>>> {
        self.repo.add_range(entities)
    }

    pub async fn add_range_async(&self, entities: Option<Vec<T>>) -> AppResult<Option<Vec<T>>> {
        self.repo.add_range_async(entities).await
    }

    // =========================================================================
    // Read
    // =========================================================================

    pub fn read(&self) -> AppResult<Vec<T>> {
        self.repo.read()
    }

    pub async fn read_async(&self) -> AppResult<Vec<T>> {
        self.repo.read_async().await
    }

    // =========================================================================
    // Update
    // =========================================================================

    pub fn update(&self, entity: Option<T>, id: EntityId) -> AppResult<Option<T>> {
        self.repo.update(entity, id)
    }

    pub async fn update_async(&self, entity: Option<T>, id: EntityId) -> AppResult<Option<T>> {
        self.repo.update_async(entity, id).await
    }

    // =========================================================================
    // Delete
    // =========================================================================

    pub fn delete(&self, entity: Option<T>, id: EntityId) -> AppResult<Option<T>> {
        self.repo.delete(entity, id)
    }

    pub async fn delete_async(&self, entity: Option<T>, id: EntityId) -> AppResult<Option<T>> {
        self.repo.delete_async(entity, id).await
    }

    pub fn delete_range(&self, entities: Option<Vec<T>>) -> AppResult<Option<Vec<T>>> {
        self.repo.delete_range(entities)
    }

    pub async fn delete_range_async(&self, entities: Option<Vec<T>>) -> AppResult<Option<Vec<T>>> {
        self.repo.delete_range_async(entities).await
    }

    // =========================================================================
    // Count / Exist / Find / Get
    // =========================================================================

    pub fn count(&self) -> AppResult<usize> {
        self.repo.count()
    }

    pub async fn count_async(&self) -> AppResult<usize> {
        self.repo.count_async().await
    }

    pub fn exist(&self, predicate: &Predicate<T>) -> AppResult<bool> {
        self.repo.exist(predicate)
    }

    pub async fn exist_async(&self, predicate: &Predicate<T>) -> AppResult<bool> {
        self.repo.exist_async(predicate).await
    }

    pub fn find(&self, predicate: &Predicate<T>) -> AppResult<Option<T>> {
        self.repo.find(predicate)
    }

    pub async fn find_async(&self, predicate: &Predicate<T>) -> AppResult<Option<T>> {
        self.repo.find_async(predicate).await
    }

    pub fn find_all(&self, predicate: &Predicate<T>) -> AppResult<Vec<T>> {
        self.repo.find_all(predicate)
    }

    pub async fn find_all_async(&self, predicate: &Predicate<T>) -> AppResult<Vec<T>> {
        self.repo.find_all_async(predicate).await
    }

    pub fn get(&self, id: EntityId) -> AppResult<Option<T>> {
        self.repo.get(id)
    }

    pub async fn get_async(&self, id: EntityId) -> AppResult<Option<T>> {
        self.repo.get_async(id).await
    }
}
