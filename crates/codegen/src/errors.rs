//! Error-shape context assembly

use serde::Serialize;
use stratus_common::naming;
use stratus_model::api::Api;
use stratus_model::docs::ServiceDocs;

/// One distinct error shape reachable from some operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorShapeContext {
    pub name: String,
    pub wire_name: String,
    /// Wire error code: the declared code, else the shape's own name.
    pub code: String,
    pub http_status: Option<u16>,
    pub sender_fault: bool,
    pub documentation: Option<String>,
}

/// Collect the distinct error shapes declared by any operation,
/// deduplicated by name, in first-appearance order.
pub fn build_error_contexts(api: &Api, docs: &ServiceDocs) -> Vec<ErrorShapeContext> {
    let mut seen = std::collections::HashSet::new();
    let mut contexts = Vec::new();

    for op in &api.operations {
        for &error_id in &op.errors {
            let shape = api.shapes.get(error_id);
            if !seen.insert(shape.name.clone()) {
                continue;
            }
            let meta = shape.error.as_ref();
            contexts.push(ErrorShapeContext {
                name: naming::type_name(&shape.name),
                wire_name: shape.name.clone(),
                code: meta
                    .and_then(|m| m.code.clone())
                    .unwrap_or_else(|| shape.name.clone()),
                http_status: meta.and_then(|m| m.http_status),
                sender_fault: meta.is_some_and(|m| m.sender_fault),
                documentation: docs.shape(&shape.name).map(str::to_string),
            });
        }
    }

    contexts
}
