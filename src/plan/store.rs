//! Plan persistence: pretty-printed JSON, read back unchanged.

use std::path::Path;

use crate::error::StoreError;
use crate::plan::Plan;

/// Write `plan` to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`StoreError::Encode`] on serialization failure and
/// [`StoreError::Write`] when the file cannot be written.
pub fn write_plan(path: &Path, plan: &Plan) -> Result<(), StoreError> {
    let data = serde_json::to_vec_pretty(plan).map_err(|e| StoreError::Encode { source: e })?;
    std::fs::write(path, data).map_err(|e| StoreError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read a plan previously written with [`write_plan`].
///
/// # Errors
///
/// Returns [`StoreError::Read`] when the file cannot be read and
/// [`StoreError::Parse`] (with the path attached) when its contents are not
/// a valid plan.
pub fn read_plan(path: &Path) -> Result<Plan, StoreError> {
    let data = std::fs::read(path).map_err(|e| StoreError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_slice(&data).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}
