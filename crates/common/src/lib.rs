//! Common types and utilities for Stratus
//!
//! This crate contains the shared error taxonomy and the identifier
//! naming utilities used across the model, codegen, and CLI components.

pub mod naming;

use thiserror::Error;

/// Errors that can occur while resolving a service model or building
/// generation contexts
#[derive(Error, Debug)]
pub enum Error {
    /// A member, operation binding, or error entry names a shape that is
    /// not present in the shape map.
    #[error("shape {shape:?} does not exist (referenced by {referenced_by})")]
    MissingShape { shape: String, referenced_by: String },

    /// An enum-marked structure declares required members or members
    /// bound outside the message body.
    #[error("enum shape {shape:?} is illegal: {reason}")]
    IllegalEnumShape { shape: String, reason: String },

    /// An input member is bound to the body under a protocol that only
    /// binds parameters to headers, the query string, or the URI.
    #[error(
        "operation {operation:?}: member {member:?} is bound to the body, \
         which protocol {protocol:?} does not allow"
    )]
    BodyMemberForbidden {
        operation: String,
        member: String,
        protocol: String,
    },

    /// A dotted-path expression cannot be followed through the shape
    /// graph.
    #[error("illegal path {path:?}: {reason}")]
    IllegalPath { path: String, reason: String },

    /// A wait-condition acceptor cannot be translated.
    #[error("untranslatable acceptor in waiter {waiter:?}: {reason}")]
    UntranslatableAcceptor { waiter: String, reason: String },

    /// A patch navigated to a hop that is absent from the raw model.
    #[error("patch {patch:?}: target {path:?} does not exist in the model")]
    PatchTarget { patch: String, path: String },

    /// A replace patch found something other than the value it was
    /// authored against.
    #[error("patch {patch:?}: unexpected value: expected {expected}, got {actual}")]
    PatchPrecondition {
        patch: String,
        expected: String,
        actual: String,
    },

    /// The model metadata names a protocol this tool does not know.
    #[error("unknown protocol {0:?}")]
    UnknownProtocol(String),

    #[error("invalid model document: {0}")]
    InvalidModel(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Stratus operations
pub type Result<T> = std::result::Result<T, Error>;

/// A failure scoped to a single service's unit of work.
///
/// One service failing never halts the others; the runner collects one
/// of these per failed service and keeps going.
#[derive(Error, Debug)]
#[error("service {service:?}: {source}")]
pub struct ServiceError {
    pub service: String,
    #[source]
    pub source: Error,
}

impl ServiceError {
    pub fn new(service: impl Into<String>, source: Error) -> Self {
        Self {
            service: service.into(),
            source,
        }
    }
}
