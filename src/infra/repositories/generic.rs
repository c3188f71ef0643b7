//! Generic repository over any [`UnitOfWork`].

use async_trait::async_trait;
use std::marker::PhantomData;

use super::base::{DeleteRepository, ReadRepository, WriteRepository};
use crate::domain::{Entity, EntityId, Gate, Predicate};
use crate::errors::{AppError, AppResult, StoreError, StoreResult};
use crate::infra::memory::MemoryDatabase;
use crate::infra::unit_of_work::{Change, Commit, Persistence, UnitOfWork};

/// Repository for entity type `T`, owning its unit of work exclusively.
pub struct GenericRepository<T, U> {
    uow: U,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> GenericRepository<T, Persistence<T>> {
    /// Repository backed by a fresh unit of work on `db`
    pub fn in_memory(db: &MemoryDatabase) -> StoreResult<Self> {
        Ok(Self::new(Persistence::new(db)?))
    }
}

impl<T, U> GenericRepository<T, U>
where
    T: Entity,
    U: UnitOfWork<T>,
{
    pub fn new(uow: U) -> Self {
        Self {
            uow,
            _entity: PhantomData,
        }
    }

    pub fn unit_of_work(&self) -> &U {
        &self.uow
    }

    /// Map a commit failure, reporting rejected fields.
    fn rejected(op: &'static str) -> impl Fn(StoreError) -> AppError + Send {
        move |err| {
            if let StoreError::Validation(failure) = &err {
                tracing::warn!(
                    table = T::TABLE,
                    op,
                    fields = ?failure.fields(),
                    "Commit rejected by store validation"
                );
            }
            AppError::from(err)
        }
    }

    fn skipped(op: &'static str) {
        tracing::debug!(table = T::TABLE, op, "No entity supplied, nothing persisted");
    }

    fn missing(op: &'static str, id: EntityId) {
        tracing::debug!(table = T::TABLE, op, id, "No stored entity, returning input");
    }
}

fn additions<T: Entity>(entities: &[T]) -> Vec<Change<T>> {
    entities.iter().cloned().map(Change::Added).collect()
}

/// Write the identities of a commit back onto the entities that were added.
fn assign<T: Entity>(entities: &mut [T], commit: &Commit) {
    for (entity, id) in entities.iter_mut().zip(&commit.assigned) {
        entity.set_id(*id);
    }
}

#[async_trait]
impl<T, U> ReadRepository<T> for GenericRepository<T, U>
where
    T: Entity,
    U: UnitOfWork<T>,
{
    fn read(&self) -> AppResult<Vec<T>> {
        Ok(self.uow.all()?)
    }

    async fn read_async(&self) -> AppResult<Vec<T>> {
        Ok(self.uow.all_async().await?)
    }

    fn count(&self) -> AppResult<usize> {
        Ok(self.uow.count()?)
    }

    async fn count_async(&self) -> AppResult<usize> {
        Ok(self.uow.count_async().await?)
    }

    fn exist(&self, predicate: &Predicate<T>) -> AppResult<bool> {
        Ok(self.uow.single(predicate)?.is_some())
    }

    async fn exist_async(&self, predicate: &Predicate<T>) -> AppResult<bool> {
        Ok(self.uow.single_async(predicate).await?.is_some())
    }

    fn find(&self, predicate: &Predicate<T>) -> AppResult<Option<T>> {
        Ok(self.uow.single(predicate)?)
    }

    async fn find_async(&self, predicate: &Predicate<T>) -> AppResult<Option<T>> {
        Ok(self.uow.single_async(predicate).await?)
    }

    fn find_all(&self, predicate: &Predicate<T>) -> AppResult<Vec<T>> {
        Ok(self.uow.filter(predicate)?)
    }

    async fn find_all_async(&self, predicate: &Predicate<T>) -> AppResult<Vec<T>> {
        Ok(self.uow.filter_async(predicate).await?)
    }

    fn get(&self, id: EntityId) -> AppResult<Option<T>> {
        Ok(self.uow.find_by_id(id)?)
    }

    async fn get_async(&self, id: EntityId) -> AppResult<Option<T>> {
        Ok(self.uow.find_by_id_async(id).await?)
    }
}

#[async_trait]
impl<T, U> WriteRepository<T> for GenericRepository<T, U>
where
    T: Entity,
    U: UnitOfWork<T>,
{
    fn create(&self, entity: Option<T>) -> AppResult<Option<T>> {
        match Gate::check(entity) {
            Gate::Absent => {
                Self::skipped("create");
                Ok(None)
            }
            Gate::Present(mut entity) => {
                let commit = self
                    .uow
                    .commit(vec![Change::Added(entity.clone())])
                    .map_err(Self::rejected("create"))?;
                assign(std::slice::from_mut(&mut entity), &commit);
                Ok(Some(entity))
            }
        }
    }

    async fn create_async(&self, entity: Option<T>) -> AppResult<Option<T>> {
        match Gate::check(entity) {
            Gate::Absent => {
                Self::skipped("create");
                Ok(None)
            }
            Gate::Present(mut entity) => {
                let commit = self
                    .uow
                    .commit_async(vec![Change::Added(entity.clone())])
                    .await
                    .map_err(Self::rejected("create"))?;
                assign(std::slice::from_mut(&mut entity), &commit);
                Ok(Some(entity))
            }
        }
    }

    fn add_range(&self, entities: Option<Vec<T>>) -> AppResult<Option<Vec<T>>> {
        match Gate::check(entities) {
            Gate::Absent => {
                Self::skipped("add_range");
                Ok(None)
            }
            Gate::Present(mut entities) => {
                let commit = self
                    .uow
                    .commit(additions(&entities))
                    .map_err(Self::rejected("add_range"))?;
                assign(&mut entities, &commit);
                Ok(Some(entities))
            }
        }
    }

    async fn add_range_async(&self, entities: Option<Vec<T>>) -> AppResult<Option<Vec<T>>> {
        match Gate::check(entities) {
            Gate::Absent => {
                Self::skipped("add_range");
                Ok(None)
            }
            Gate::Present(mut entities) => {
                let commit = self
                    .uow
                    .commit_async(additions(&entities))
                    .await
                    .map_err(Self::rejected("add_range"))?;
                assign(&mut entities, &commit);
                Ok(Some(entities))
            }
        }
    }

    fn update(&self, entity: Option<T>, id: EntityId) -> AppResult<Option<T>> {
        let Some(mut existing) = self.uow.find_by_id(id)? else {
            Self::missing("update", id);
            return Ok(entity);
        };

        match Gate::check(entity) {
            Gate::Absent => {
                Self::skipped("update");
                Ok(Some(existing))
            }
            Gate::Present(values) => {
                existing.set_values(&values);
                self.uow
                    .commit(vec![Change::Modified(existing.clone())])
                    .map_err(Self::rejected("update"))?;
                Ok(Some(existing))
            }
        }
    }

    async fn update_async(&self, entity: Option<T>, id: EntityId) -> AppResult<Option<T>> {
        let Some(mut existing) = self.uow.find_by_id_async(id).await? else {
            Self::missing("update", id);
            return Ok(entity);
        };

        match Gate::check(entity) {
            Gate::Absent => {
                Self::skipped("update");
                Ok(Some(existing))
            }
            Gate::Present(values) => {
                existing.set_values(&values);
                self.uow
                    .commit_async(vec![Change::Modified(existing.clone())])
                    .await
                    .map_err(Self::rejected("update"))?;
                Ok(Some(existing))
            }
        }
    }
}

#[async_trait]
impl<T, U> DeleteRepository<T> for GenericRepository<T, U>
where
    T: Entity,
    U: UnitOfWork<T>,
{
    fn delete(&self, entity: Option<T>, id: EntityId) -> AppResult<Option<T>> {
        let Some(existing) = self.uow.find_by_id(id)? else {
            Self::missing("delete", id);
            return Ok(entity);
        };

        self.uow
            .commit(vec![Change::Removed(existing.id())])
            .map_err(Self::rejected("delete"))?;
        Ok(entity)
    }

    async fn delete_async(&self, entity: Option<T>, id: EntityId) -> AppResult<Option<T>> {
        let Some(existing) = self.uow.find_by_id_async(id).await? else {
            Self::missing("delete", id);
            return Ok(entity);
        };

        self.uow
            .commit_async(vec![Change::Removed(existing.id())])
            .await
            .map_err(Self::rejected("delete"))?;
        Ok(entity)
    }

    fn delete_range(&self, entities: Option<Vec<T>>) -> AppResult<Option<Vec<T>>> {
        match Gate::check(entities) {
            Gate::Absent => {
                Self::skipped("delete_range");
                Ok(None)
            }
            Gate::Present(entities) => {
                self.uow
                    .commit(Change::removals(entities.iter().cloned()))
                    .map_err(Self::rejected("delete_range"))?;
                Ok(Some(entities))
            }
        }
    }

    async fn delete_range_async(&self, entities: Option<Vec<T>>) -> AppResult<Option<Vec<T>>> {
        match Gate::check(entities) {
            Gate::Absent => {
                Self::skipped("delete_range");
                Ok(None)
            }
            Gate::Present(entities) => {
                self.uow
                    .commit_async(Change::removals(entities.iter().cloned()))
                    .await
                    .map_err(Self::rejected("delete_range"))?;
                Ok(Some(entities))
            }
        }
    }
}
