//! Repository Registry - One shared facade per entity type.
//!
//! Built once at process start and passed explicitly to whoever needs a
//! facade. Also hosts small helpers for running independent async calls
//! concurrently.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use super::Facade;
use crate::domain::Entity;
use crate::errors::{AppError, AppResult};
use crate::infra::{GenericRepository, MemoryDatabase, Repository};

/// Process-scoped container of facades
pub struct Registry {
    db: MemoryDatabase,
    facades: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl Registry {
    pub fn new(db: MemoryDatabase) -> Self {
        Self {
            db,
            facades: RwLock::new(HashMap::new()),
        }
    }

    pub fn database(&self) -> &MemoryDatabase {
        &self.db
    }

    /// Register `T` with an in-memory repository on this registry's database.
    ///
    /// Registering an already registered type returns the existing facade.
    pub fn register<T: Entity>(&self) -> AppResult<Facade<T>> {
        if let Some(existing) = self.lookup::<T>()? {
            return Ok(existing);
        }
        let repo = GenericRepository::<T, _>::in_memory(&self.db)?;
        self.insert(Arc::new(repo))
    }

    /// Register `T` with an externally built repository; the first registration wins.
    pub fn register_with<T: Entity>(&self, repo: Arc<dyn Repository<T>>) -> AppResult<Facade<T>> {
        self.insert(repo)
    }

    /// The shared facade of `T`
    pub fn facade<T: Entity>(&self) -> AppResult<Facade<T>> {
        self.lookup::<T>()?.ok_or(AppError::NotRegistered(T::TABLE))
    }

    /// Number of registered entity types
    pub fn len(&self) -> AppResult<usize> {
        Ok(self.entries()?.len())
    }

    pub fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len()? == 0)
    }

    fn entries(&self) -> AppResult<RwLockReadGuard<'_, HashMap<TypeId, Box<dyn Any + Send + Sync>>>> {
        self.facades
            .read()
            .map_err(|_| AppError::internal("Registry lock poisoned"))
    }

    fn lookup<T: Entity>(&self) -> AppResult<Option<Facade<T>>> {
        Ok(self
            .entries()?
            .get(&TypeId::of::<T>())
            .and_then(|f| f.downcast_ref::<Facade<T>>())
            .cloned())
    }

    fn insert<T: Entity>(&self, repo: Arc<dyn Repository<T>>) -> AppResult<Facade<T>> {
        let mut facades = self
            .facades
            .write()
            .map_err(|_| AppError::internal("Registry lock poisoned"))?;

        let facade = facades
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                tracing::debug!(table = T::TABLE, "Registered repository");
                Box::new(Facade::new(repo))
            })
            .downcast_ref::<Facade<T>>()
            .cloned()
            .ok_or_else(|| AppError::internal(format!("Registry entry for {} has the wrong type", T::TABLE)))?;

        Ok(facade)
    }
}

/// Parallel execution utilities for running independent operations concurrently.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// If either operation fails, the error is returned immediately.
    ///
    /// # Example
    /// ```ignore
    /// let (count, rows) = parallel::join2(
    ///     products.count_async(),
    ///     products.read_async(),
    /// ).await?;
    /// ```
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }

    /// Execute a collection of homogeneous async operations in parallel.
    ///
    /// Results are returned in the same order as the input futures.
    pub async fn join_all<F, T>(futures: Vec<F>) -> AppResult<Vec<T>>
    where
        F: Future<Output = AppResult<T>>,
    {
        let results = futures::future::join_all(futures).await;
        results.into_iter().collect()
    }
}
