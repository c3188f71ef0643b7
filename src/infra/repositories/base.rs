//! Base repository traits following Interface Segregation Principle (ISP).
//!
//! Every operation comes in a blocking form and an `_async` form with the
//! same semantics. Absent input (`None`) to a mutating operation is a no-op,
//! never an error.

use async_trait::async_trait;

use crate::domain::{Entity, EntityId, Predicate};
use crate::errors::AppResult;

/// Read operations (Query) - never mutate state
#[async_trait]
pub trait ReadRepository<T: Entity>: Send + Sync {
    /// All stored entities, ascending identity
    fn read(&self) -> AppResult<Vec<T>>;

    async fn read_async(&self) -> AppResult<Vec<T>>;

    fn count(&self) -> AppResult<usize>;

    async fn count_async(&self) -> AppResult<usize>;

    /// True iff exactly one entity matches; errors when several do
    fn exist(&self, predicate: &Predicate<T>) -> AppResult<bool>;

    async fn exist_async(&self, predicate: &Predicate<T>) -> AppResult<bool>;

    /// The single entity matching `predicate`; errors when several do
    fn find(&self, predicate: &Predicate<T>) -> AppResult<Option<T>>;

    async fn find_async(&self, predicate: &Predicate<T>) -> AppResult<Option<T>>;

    /// Every entity matching `predicate`
    fn find_all(&self, predicate: &Predicate<T>) -> AppResult<Vec<T>>;

    async fn find_all_async(&self, predicate: &Predicate<T>) -> AppResult<Vec<T>>;

    fn get(&self, id: EntityId) -> AppResult<Option<T>>;

    async fn get_async(&self, id: EntityId) -> AppResult<Option<T>>;
}

/// Write operations (Command)
#[async_trait]
pub trait WriteRepository<T: Entity>: Send + Sync {
    /// Persist `entity`; returns it with the identity the store assigned
    fn create(&self, entity: Option<T>) -> AppResult<Option<T>>;

    async fn create_async(&self, entity: Option<T>) -> AppResult<Option<T>>;

    /// Persist every entity in one commit
    fn add_range(&self, entities: Option<Vec<T>>) -> AppResult<Option<Vec<T>>>;

    async fn add_range_async(&self, entities: Option<Vec<T>>) -> AppResult<Option<Vec<T>>>;

    /// Merge `entity`'s values into the record stored under `id`.
    ///
    /// Returns the stored record, or the input untouched when `id` is unknown.
    fn update(&self, entity: Option<T>, id: EntityId) -> AppResult<Option<T>>;

    async fn update_async(&self, entity: Option<T>, id: EntityId) -> AppResult<Option<T>>;
}

/// Delete operations
#[async_trait]
pub trait DeleteRepository<T: Entity>: Send + Sync {
    /// Remove the record stored under `id`; always returns the input
    fn delete(&self, entity: Option<T>, id: EntityId) -> AppResult<Option<T>>;

    async fn delete_async(&self, entity: Option<T>, id: EntityId) -> AppResult<Option<T>>;

    /// Remove every entity in one commit
    fn delete_range(&self, entities: Option<Vec<T>>) -> AppResult<Option<Vec<T>>>;

    async fn delete_range_async(&self, entities: Option<Vec<T>>) -> AppResult<Option<Vec<T>>>;
}

/// Full repository - Combines all operations
/// Follows Open/Closed Principle: extend by implementing individual traits
pub trait Repository<T: Entity>: ReadRepository<T> + WriteRepository<T> + DeleteRepository<T> {}

// Auto-implement Repository for types implementing all traits
impl<R, T> Repository<T> for R
where
    T: Entity,
    R: ReadRepository<T> + WriteRepository<T> + DeleteRepository<T>,
{
}
