//! JSON snapshot files for in-memory tables.
//!
//! One file per table, `<dir>/<table>.json`. Writes go to a temporary file
//! first and are renamed into place, so a reader never sees half a table.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{SNAPSHOT_EXTENSION, SNAPSHOT_TMP_SUFFIX};
use crate::domain::{Entity, EntityId};
use crate::errors::StoreResult;

/// On-disk table layout
#[derive(Debug, Deserialize)]
pub struct TableSnapshot<T> {
    pub next_id: EntityId,
    pub rows: Vec<T>,
}

#[derive(Serialize)]
struct TableSnapshotRef<'a, T> {
    next_id: EntityId,
    rows: Vec<&'a T>,
}

/// Snapshot file of `table` inside `dir`.
pub fn path_for(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{}.{}", table, SNAPSHOT_EXTENSION))
}

/// Read a snapshot; a missing file is an empty result, not an error.
pub fn load<T: Entity>(path: &Path) -> StoreResult<Option<TableSnapshot<T>>> {
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(path)?;
    let snapshot = serde_json::from_slice(&bytes)?;
    tracing::debug!(path = %path.display(), "Loaded table snapshot");
    Ok(Some(snapshot))
}

/// Replace the snapshot at `path` with `rows`.
pub fn write<'a, T, I>(path: &Path, next_id: EntityId, rows: I) -> StoreResult<()>
where
    T: Entity,
    I: IntoIterator<Item = &'a T>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let snapshot = TableSnapshotRef {
        next_id,
        rows: rows.into_iter().collect(),
    };
    let json = serde_json::to_vec_pretty(&snapshot)?;

    let tmp = path.with_extension(format!("{}.{}", SNAPSHOT_EXTENSION, SNAPSHOT_TMP_SUFFIX));
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
