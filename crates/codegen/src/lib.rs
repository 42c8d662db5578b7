//! Generation-context assembly for Stratus
//!
//! Consumes a resolved service model plus its side tables and produces
//! one context object per artifact family — service/operations, data
//! shapes, errors, paginators, wait conditions — ready for the external
//! template engine. Path expressions from the pagination and
//! wait-condition tables are translated here ([`paths`]).

pub mod endpoints;
pub mod errors;
pub mod handoff;
pub mod paginators;
pub mod paths;
pub mod service;
pub mod shapes;
pub mod waiters;

use serde::Serialize;
use serde_json::Value;
use stratus_common::ServiceError;
use stratus_model::docs::{DocModel, ServiceDocs};
use stratus_model::endpoints::EndpointsModel;
use stratus_model::pagination::PaginationModel;
use stratus_model::waiters::WaiterModel;

pub use errors::ErrorShapeContext;
pub use paginators::PaginatorContext;
pub use service::ServiceContext;
pub use shapes::ShapeContext;
pub use waiters::WaiterContext;

/// The raw document set of one service, as loaded from disk.
#[derive(Debug)]
pub struct ServiceDocuments {
    pub name: String,
    /// Raw model document; patched in place before resolution.
    pub model: Value,
    pub docs: Option<DocModel>,
    pub pagination: Option<PaginationModel>,
    pub waiters: Option<WaiterModel>,
}

/// Everything the template engine needs for one service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSet {
    pub service: ServiceContext,
    pub shapes: Vec<ShapeContext>,
    pub errors: Vec<ErrorShapeContext>,
    pub paginators: Vec<PaginatorContext>,
    pub waiters: Vec<WaiterContext>,
}

/// Run one service's unit of work: patch, resolve, and build every
/// context family. Reference and legality failures abort the service;
/// untranslatable paginators and waiters are dropped individually.
pub fn assemble(
    mut documents: ServiceDocuments,
    endpoints: Option<&EndpointsModel>,
) -> std::result::Result<GenerationSet, ServiceError> {
    let service_name = documents.name.clone();
    let api = stratus_model::patch_and_resolve(&service_name, &mut documents.model)
        .map_err(|e| ServiceError::new(service_name.clone(), e))?;

    let docs = documents
        .docs
        .as_ref()
        .map(ServiceDocs::from_model)
        .unwrap_or_default();

    let endpoint_table = match (endpoints, api.metadata.endpoint_prefix.as_deref()) {
        (Some(model), Some(prefix)) => endpoints::resolve_endpoints(prefix, model),
        _ => endpoints::EndpointTable::default(),
    };

    let paginators = documents
        .pagination
        .as_ref()
        .map(|p| paginators::build_paginator_contexts(&api, p))
        .unwrap_or_default();

    let waiters = documents
        .waiters
        .as_ref()
        .map(|w| waiters::build_waiter_contexts(&api, w))
        .unwrap_or_default();

    Ok(GenerationSet {
        shapes: shapes::build_shape_contexts(&api, &docs),
        errors: errors::build_error_contexts(&api, &docs),
        service: service::build_service_context(&api, &docs, endpoint_table),
        paginators,
        waiters,
    })
}
