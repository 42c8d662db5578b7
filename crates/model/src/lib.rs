//! Service model ingestion for Stratus
//!
//! This crate owns everything between a service's raw JSON document set
//! and a fully resolved, internally consistent model:
//!
//! - raw document types for the model, documentation, pagination,
//!   wait-condition, and endpoints documents ([`raw`], [`docs`],
//!   [`pagination`], [`waiters`], [`endpoints`])
//! - the patch engine that repairs known inconsistencies in the raw
//!   document before anything is typed ([`patch`], [`patches`])
//! - the shape graph and resolution engine that links string references
//!   into arena handles and derives usage/recursion facts ([`api`],
//!   [`resolve`])
//!
//! Each service is one independent unit of work: load, patch, resolve,
//! read, discard. Nothing here holds state across services.

pub mod api;
pub mod docs;
pub mod endpoints;
pub mod pagination;
pub mod patch;
pub mod patches;
pub mod raw;
pub mod resolve;
pub mod waiters;

pub use api::{Api, DerivedFlags, Location, Member, Operation, Protocol, Shape, ShapeGraph, ShapeId, ShapeKind};
pub use resolve::resolve;

use serde_json::Value;
use stratus_common::Result;

/// Patch a raw model document in place and resolve it.
///
/// This is the canonical front door: the built-in correction table for
/// `service_name` is applied to the raw JSON before the document is
/// typed, so corrections may fix things the typed layer would reject.
pub fn patch_and_resolve(service_name: &str, model: &mut Value) -> Result<Api> {
    patch::apply(model, &patches::patches_for(service_name))?;
    let raw: raw::RawApi = serde_json::from_value(model.clone())?;
    resolve(service_name, &raw)
}
