//! Repository integration tests against the in-memory unit of work.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use entity_repository::domain::{Entity, EntityId, Predicate, Product};
use entity_repository::errors::{AppError, StoreError, StoreResult};
use entity_repository::infra::{
    Change, Commit, DeleteRepository, GenericRepository, MemoryDatabase, Persistence, ReadRepository,
    UnitOfWork, WriteRepository,
};
use entity_repository::services::Facade;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn product(name: &str) -> Product {
    Product::new(name, date())
}

fn named(name: &'static str) -> Predicate<Product> {
    Predicate::labeled(format!("name == {}", name), move |p: &Product| p.name == name)
}

/// Test unit of work that counts commit and save calls made through the real store
struct CountingUnitOfWork {
    inner: Persistence<Product>,
    commits: Arc<AtomicUsize>,
}

impl CountingUnitOfWork {
    fn new(db: &MemoryDatabase) -> (Self, Arc<AtomicUsize>) {
        let commits = Arc::new(AtomicUsize::new(0));
        let uow = Self {
            inner: Persistence::new(db).unwrap(),
            commits: commits.clone(),
        };
        (uow, commits)
    }
}

#[async_trait]
impl UnitOfWork<Product> for CountingUnitOfWork {
    fn commit(&self, changes: Vec<Change<Product>>) -> StoreResult<Commit> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.inner.commit(changes)
    }

    async fn commit_async(&self, changes: Vec<Change<Product>>) -> StoreResult<Commit> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.inner.commit_async(changes).await
    }

    fn add(&self, entity: Product) {
        self.inner.add(entity)
    }

    fn add_range(&self, entities: Vec<Product>) {
        self.inner.add_range(entities)
    }

    fn update(&self, entity: Product) {
        self.inner.update(entity)
    }

    fn remove(&self, entity: Product) {
        self.inner.remove(entity)
    }

    fn remove_range(&self, entities: Vec<Product>) {
        self.inner.remove_range(entities)
    }

    fn find_by_id(&self, id: EntityId) -> StoreResult<Option<Product>> {
        self.inner.find_by_id(id)
    }

    async fn find_by_id_async(&self, id: EntityId) -> StoreResult<Option<Product>> {
        self.inner.find_by_id_async(id).await
    }

    fn all(&self) -> StoreResult<Vec<Product>> {
        self.inner.all()
    }

    async fn all_async(&self) -> StoreResult<Vec<Product>> {
        self.inner.all_async().await
    }

    fn count(&self) -> StoreResult<usize> {
        self.inner.count()
    }

    async fn count_async(&self) -> StoreResult<usize> {
        self.inner.count_async().await
    }

    fn single(&self, predicate: &Predicate<Product>) -> StoreResult<Option<Product>> {
        self.inner.single(predicate)
    }

    async fn single_async(&self, predicate: &Predicate<Product>) -> StoreResult<Option<Product>> {
        self.inner.single_async(predicate).await
    }

    fn filter(&self, predicate: &Predicate<Product>) -> StoreResult<Vec<Product>> {
        self.inner.filter(predicate)
    }

    async fn filter_async(&self, predicate: &Predicate<Product>) -> StoreResult<Vec<Product>> {
        self.inner.filter_async(predicate).await
    }

    fn save(&self) -> StoreResult<Commit> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.inner.save()
    }

    async fn save_async(&self) -> StoreResult<Commit> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.inner.save_async().await
    }
}

type Products = GenericRepository<Product, Persistence<Product>>;

fn repository() -> Products {
    GenericRepository::in_memory(&MemoryDatabase::new()).unwrap()
}

#[test]
fn test_create_then_get_round_trips() {
    let repo = repository();
    let created = repo.create(Some(product("PS4"))).unwrap().unwrap();
    assert!(!created.is_transient());

    let stored = repo.get(created.id).unwrap().unwrap();
    assert_eq!(stored, created);
    assert_eq!(stored.name, "PS4");
    assert_eq!(stored.date, date());
}

#[test]
fn test_create_absent_is_a_no_op() {
    let db = MemoryDatabase::new();
    let (uow, commits) = CountingUnitOfWork::new(&db);
    let repo = GenericRepository::<Product, _>::new(uow);

    assert!(repo.create(None).unwrap().is_none());
    assert!(repo.add_range(None).unwrap().is_none());
    assert!(repo.delete_range(None).unwrap().is_none());
    assert_eq!(commits.load(Ordering::SeqCst), 0);
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn test_update_unknown_id_returns_input_without_commit() {
    let db = MemoryDatabase::new();
    let (uow, commits) = CountingUnitOfWork::new(&db);
    let repo = GenericRepository::<Product, _>::new(uow);

    let input = product("PS5");
    let result = repo.update(Some(input.clone()), 42).unwrap();

    assert_eq!(result, Some(input));
    assert_eq!(commits.load(Ordering::SeqCst), 0);
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn test_update_changes_only_the_target() {
    let repo = repository();
    repo.add_range(Some(vec![product("PS4"), product("XBOX ONE")])).unwrap();

    let updated = repo.update(Some(product("UPDATE")), 1).unwrap().unwrap();
    assert_eq!(updated.id, 1);
    assert_eq!(updated.name, "UPDATE");

    assert_eq!(repo.get(1).unwrap().unwrap().name, "UPDATE");
    assert_eq!(repo.get(2).unwrap().unwrap().name, "XBOX ONE");
}

#[test]
fn test_delete_unknown_id_returns_input() {
    let repo = repository();
    repo.create(Some(product("PS4"))).unwrap();

    let input = product("XBOX ONE");
    assert_eq!(repo.delete(Some(input.clone()), 9).unwrap(), Some(input));
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn test_delete_with_absent_entity_removes_record() {
    let repo = repository();
    let created = repo.create(Some(product("PS4"))).unwrap().unwrap();

    assert!(repo.delete(None, created.id).unwrap().is_none());
    assert!(repo.get(created.id).unwrap().is_none());
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn test_delete_with_present_entity_removes_record() {
    let db = MemoryDatabase::new();
    let (uow, commits) = CountingUnitOfWork::new(&db);
    let repo = GenericRepository::<Product, _>::new(uow);
    let created = repo.create(Some(product("PS4"))).unwrap().unwrap();
    let kept = repo.create(Some(product("Wii"))).unwrap().unwrap();
    commits.store(0, Ordering::SeqCst);

    let input = product("anything");
    let result = repo.delete(Some(input.clone()), created.id).unwrap();

    assert_eq!(result, Some(input));
    assert!(repo.get(created.id).unwrap().is_none());
    assert_eq!(repo.read().unwrap(), vec![kept]);
    assert_eq!(commits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_delete_range_with_repeated_entity() {
    let repo = repository();
    let added = repo
        .add_range(Some(vec![product("PS4"), product("Wii")]))
        .unwrap()
        .unwrap();

    let first = added[0].clone();
    repo.delete_range(Some(vec![first.clone(), first])).unwrap();

    assert_eq!(repo.read().unwrap(), vec![added[1].clone()]);
}

#[test]
fn test_create_is_not_affected_by_foreign_staged_changes() {
    let repo = repository();
    repo.unit_of_work().add(product(""));

    let created = repo.create(Some(product("PS4"))).unwrap().unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(repo.count().unwrap(), 1);

    // The staged entity stays with the unit of work's own save
    let err = repo.unit_of_work().save().unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn test_shared_facade_keeps_concurrent_callers_apart() {
    const ROUNDS: usize = 500;

    let facade = Facade::<Product>::in_memory(&MemoryDatabase::new()).unwrap();
    let valid = {
        let facade = facade.clone();
        std::thread::spawn(move || {
            (0..ROUNDS)
                .map(|i| facade.create(Some(product(&format!("valid {i}")))))
                .collect::<Vec<_>>()
        })
    };
    let invalid = {
        let facade = facade.clone();
        std::thread::spawn(move || {
            (0..ROUNDS)
                .map(|_| facade.create(Some(product(""))))
                .collect::<Vec<_>>()
        })
    };

    let valid = valid.join().unwrap();
    let invalid = invalid.join().unwrap();

    for created in valid {
        let created = created.unwrap().unwrap();
        assert!(!created.is_transient());
        assert!(created.name.starts_with("valid"));
    }
    for rejected in invalid {
        let failure = rejected.unwrap_err();
        assert_eq!(failure.validation_failure().unwrap().fields(), vec!["name"]);
    }

    let stored = facade.read().unwrap();
    assert_eq!(stored.len(), ROUNDS);
    assert!(stored.iter().all(|p| p.name.starts_with("valid")));
}

#[test]
fn test_ranges_change_count_by_batch_size() {
    let repo = repository();
    repo.create(Some(product("Switch"))).unwrap();
    let before = repo.count().unwrap();

    let added = repo
        .add_range(Some(vec![product("PS4"), product("XBOX ONE"), product("Wii")]))
        .unwrap()
        .unwrap();
    assert_eq!(repo.count().unwrap(), before + 3);
    assert!(added.iter().all(|p| !p.is_transient()));

    repo.delete_range(Some(added)).unwrap();
    assert_eq!(repo.count().unwrap(), before);
}

#[test]
fn test_exist_errors_on_several_matches() {
    let repo = repository();
    repo.add_range(Some(vec![product("PS4"), product("PS4"), product("Wii")])).unwrap();

    let err = repo.exist(&named("PS4")).unwrap_err();
    assert!(err.is_non_unique());

    assert!(repo.exist(&named("Wii")).unwrap());
    assert!(!repo.exist(&named("Switch")).unwrap());
}

#[test]
fn test_find_all_returns_exactly_the_matches() {
    let repo = repository();
    repo.add_range(Some(vec![
        product("PS4"),
        product("PS5").with_status(0),
        product("XBOX ONE"),
    ]))
    .unwrap();

    let ps = Predicate::labeled("name starts with PS", |p: &Product| p.name.starts_with("PS"));
    let names: Vec<_> = repo.find_all(&ps).unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["PS4", "PS5"]);

    let inactive = repo.find_all(&Predicate::new(|p: &Product| !p.is_active())).unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(repo.find(&named("PS5")).unwrap().unwrap().status, 0);
}

#[test]
fn test_two_rule_violation_names_both_fields() {
    let repo = repository();
    let invalid = Product::new("", date()).with_status(7);

    let err = repo.create(Some(invalid)).unwrap_err();
    let AppError::Validation(failure) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(failure.fields(), vec!["name", "status"]);
    assert_eq!(err.to_string().lines().count(), 2);
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn test_failed_batch_leaves_table_unchanged() {
    let repo = repository();
    repo.create(Some(product("PS4"))).unwrap();

    let err = repo
        .add_range(Some(vec![product("XBOX ONE"), product("")]))
        .unwrap_err();
    assert!(err.validation_failure().is_some());
    assert_eq!(repo.count().unwrap(), 1);

    // The rejected batch is not retried by the next commit
    repo.create(Some(product("Wii"))).unwrap();
    assert_eq!(repo.count().unwrap(), 2);
}

#[test]
fn test_read_is_ordered_by_identity() {
    let repo = repository();
    repo.add_range(Some(vec![product("c"), product("a"), product("b")])).unwrap();

    let ids: Vec<_> = repo.read().unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_async_forms_match_blocking_forms() {
    let repo = repository();
    let created = repo.create_async(Some(product("PS4"))).await.unwrap().unwrap();
    repo.add_range_async(Some(vec![product("XBOX ONE"), product("Wii")]))
        .await
        .unwrap();

    assert_eq!(repo.count_async().await.unwrap(), 3);
    assert_eq!(repo.get_async(created.id).await.unwrap(), Some(created.clone()));
    assert!(repo.exist_async(&named("Wii")).await.unwrap());
    assert_eq!(repo.find_async(&named("PS4")).await.unwrap(), Some(created.clone()));
    assert_eq!(repo.find_all_async(&Predicate::any()).await.unwrap(), repo.read().unwrap());

    let updated = repo
        .update_async(Some(product("PS5")), created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "PS5");

    repo.delete_async(None, created.id).await.unwrap();
    let rest = repo.read_async().await.unwrap();
    assert_eq!(rest.len(), 2);

    repo.delete_range_async(Some(rest)).await.unwrap();
    assert_eq!(repo.count_async().await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_async_unknown_id_issues_no_commit() {
    let db = MemoryDatabase::new();
    let (uow, commits) = CountingUnitOfWork::new(&db);
    let repo = GenericRepository::<Product, _>::new(uow);

    let input = product("PS5");
    assert_eq!(repo.update_async(Some(input.clone()), 3).await.unwrap(), Some(input));
    assert_eq!(commits.load(Ordering::SeqCst), 0);
}
