//! Entity contract shared by every repository.

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

use crate::config::UNSAVED_ID;

/// Integer identity assigned by the store on first commit.
pub type EntityId = i32;

/// A record managed by a repository.
///
/// The repository only ever looks at identity. Shape, serialization and
/// store-level validation rules belong to the implementing type.
pub trait Entity: Validate + Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Table (entity set) name, used for snapshots and logs
    const TABLE: &'static str;

    fn id(&self) -> EntityId;

    fn set_id(&mut self, id: EntityId);

    /// Overwrite every value of `self` with the values of `source`.
    ///
    /// Identity is not a value: the stored record keeps its own id.
    fn set_values(&mut self, source: &Self) {
        let id = self.id();
        *self = source.clone();
        self.set_id(id);
    }

    /// Whether the entity has never been committed.
    fn is_transient(&self) -> bool {
        self.id() == UNSAVED_ID
    }
}
