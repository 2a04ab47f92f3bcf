//! Leaf writes into the JSON device tree.

use serde_json::Value;

use nestkit_domain::snapshot::{PropertyPath, Snapshot};

use crate::error::VirtualError;

/// Set the leaf at `path`, creating it if the owning node exists.
pub(crate) fn set_leaf(tree: &mut Value, path: &PropertyPath, value: Value) -> Result<(), VirtualError> {
    let invalid = || VirtualError::InvalidPath {
        path: path.to_string(),
    };
    let segments = path.segments();
    let Some((leaf, parents)) = segments.split_last() else {
        return Err(invalid());
    };

    let mut node = tree;
    for segment in parents {
        node = node.get_mut(*segment).ok_or_else(invalid)?;
    }
    let object = node.as_object_mut().ok_or_else(invalid)?;
    object.insert((*leaf).to_string(), value);
    Ok(())
}

pub(crate) fn snapshot(tree: &Value) -> Result<Snapshot, VirtualError> {
    serde_json::from_value(tree.clone()).map_err(VirtualError::Parse)
}
