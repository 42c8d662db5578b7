//! Model patch engine
//!
//! Upstream service descriptions carry known small inconsistencies —
//! duplicate error codes, inconsistent casing, type mismatches — that
//! must be fixed deterministically before resolution. Each correction
//! targets a value through a path of field hops (at most four deep) on
//! the raw JSON document and verifies what it finds: a replace checks
//! the current value against the one it was authored against, and the
//! collection operations check that their target exists. If the source
//! document drifted, the patch fails loudly instead of applying a
//! now-wrong fix.

use serde_json::Value;
use stratus_common::{Error, Result};
use tracing::debug;

/// Deepest allowed patch path.
const MAX_HOPS: usize = 4;

/// A named correction against a raw service model.
#[derive(Debug, Clone)]
pub struct Patch {
    /// Short label naming the inconsistency being corrected.
    pub name: String,
    /// Field hops from the document root to the target value.
    pub path: Vec<String>,
    pub op: PatchOp,
}

impl Patch {
    pub fn new(name: &str, path: &[&str], op: PatchOp) -> Self {
        Self {
            name: name.to_string(),
            path: path.iter().map(|s| s.to_string()).collect(),
            op,
        }
    }
}

/// What a correction does at its target.
#[derive(Debug, Clone)]
pub enum PatchOp {
    /// Replace the value at the path, requiring the current value to
    /// equal `expect`.
    Replace { expect: Value, with: Value },
    /// Remove one value equal to `value` from the list at the path.
    RemoveFromList { value: Value },
    /// Append a value to the list at the path.
    AddToList { value: Value },
    /// Insert a key into the object at the path.
    InsertIntoMap { key: String, value: Value },
}

/// Apply corrections in list order. The model is only mutated by a
/// correction whose checks pass; the first failure aborts with the
/// document as the previous corrections left it.
pub fn apply(model: &mut Value, patches: &[Patch]) -> Result<()> {
    for patch in patches {
        apply_one(model, patch)?;
        debug!(patch = patch.name.as_str(), "applied model patch");
    }
    Ok(())
}

fn apply_one(model: &mut Value, patch: &Patch) -> Result<()> {
    assert!(
        patch.path.len() <= MAX_HOPS,
        "patch {:?} exceeds {MAX_HOPS} hops",
        patch.name
    );

    match &patch.op {
        PatchOp::Replace { expect, with } => {
            let target = navigate(model, patch)?;
            if target != expect {
                return Err(Error::PatchPrecondition {
                    patch: patch.name.clone(),
                    expected: render(expect),
                    actual: render(target),
                });
            }
            *target = with.clone();
        }
        PatchOp::RemoveFromList { value } => {
            let name = patch.name.clone();
            let path = patch.path.join(".");
            let target = navigate(model, patch)?;
            let list = target
                .as_array_mut()
                .ok_or_else(|| Error::PatchTarget {
                    patch: name.clone(),
                    path: path.clone(),
                })?;
            let position = list
                .iter()
                .position(|v| v == value)
                .ok_or(Error::PatchTarget { patch: name, path })?;
            list.remove(position);
        }
        PatchOp::AddToList { value } => {
            let name = patch.name.clone();
            let path = patch.path.join(".");
            let target = navigate(model, patch)?;
            let list = target
                .as_array_mut()
                .ok_or(Error::PatchTarget { patch: name, path })?;
            list.push(value.clone());
        }
        PatchOp::InsertIntoMap { key, value } => {
            let name = patch.name.clone();
            let path = patch.path.join(".");
            let target = navigate(model, patch)?;
            let map = target
                .as_object_mut()
                .ok_or(Error::PatchTarget { patch: name, path })?;
            map.insert(key.clone(), value.clone());
        }
    }
    Ok(())
}

/// Walk the hop chain. Any absent hop is a loud failure: a missing
/// target means the document no longer looks like the one the
/// correction was authored against.
fn navigate<'a>(model: &'a mut Value, patch: &Patch) -> Result<&'a mut Value> {
    let mut current = model;
    for (depth, segment) in patch.path.iter().enumerate() {
        current = current
            .as_object_mut()
            .and_then(|map| map.get_mut(segment))
            .ok_or_else(|| Error::PatchTarget {
                patch: patch.name.clone(),
                path: patch.path[..=depth].join("."),
            })?;
    }
    Ok(current)
}

/// Values render bare in error messages; quoting strings would make
/// `expected "Foo"` read like the quotes are part of the value.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
