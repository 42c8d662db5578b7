//! Service and operation context assembly

use crate::endpoints::EndpointTable;
use serde::Serialize;
use stratus_common::naming;
use stratus_model::api::Api;
use stratus_model::docs::ServiceDocs;

/// Generation-ready facts about the service and its operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContext {
    pub name: String,
    pub protocol: ProtocolContext,
    pub api_version: Option<String>,
    pub full_name: Option<String>,
    pub endpoint_prefix: Option<String>,
    pub signing_name: Option<String>,
    pub signature_version: Option<String>,
    pub target_prefix: Option<String>,
    pub json_version: Option<String>,
    pub uid: Option<String>,
    pub documentation: Option<String>,
    pub operations: Vec<OperationContext>,
    pub endpoints: EndpointTable,
}

/// Protocol descriptor handed through to the templates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolContext {
    pub name: String,
    /// Collections need explicit element/entry names on the wire.
    pub explicit_collection_names: bool,
    /// Input members may travel in the request body.
    pub supports_body: bool,
}

/// One operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationContext {
    /// Derived method identifier.
    pub name: String,
    /// Operation name as it appears in the model.
    pub wire_name: String,
    pub http_method: String,
    pub request_uri: String,
    pub input: Option<String>,
    pub output: Option<String>,
    pub errors: Vec<String>,
    pub deprecated: bool,
    pub deprecated_message: Option<String>,
    pub streaming: bool,
    pub event_stream: bool,
    pub auth_type: Option<String>,
    pub host_prefix: Option<String>,
    pub documentation: Option<String>,
    pub documentation_url: Option<String>,
}

pub fn build_service_context(
    api: &Api,
    docs: &ServiceDocs,
    endpoints: EndpointTable,
) -> ServiceContext {
    let protocol = api.metadata.protocol;
    ServiceContext {
        name: api.name.clone(),
        protocol: ProtocolContext {
            name: protocol.tag().to_string(),
            explicit_collection_names: protocol.explicit_collection_names(),
            supports_body: protocol.allows_body_input(),
        },
        api_version: api.metadata.api_version.clone(),
        full_name: api.metadata.service_full_name.clone(),
        endpoint_prefix: api.metadata.endpoint_prefix.clone(),
        signing_name: api.metadata.signing_name.clone(),
        signature_version: api.metadata.signature_version.clone(),
        target_prefix: api.metadata.target_prefix.clone(),
        json_version: api.metadata.json_version.clone(),
        uid: api.metadata.uid.clone(),
        documentation: docs.service().map(str::to_string),
        operations: api
            .operations
            .iter()
            .map(|op| OperationContext {
                name: naming::field_name(&op.name),
                wire_name: op.name.clone(),
                http_method: op.http_method.clone(),
                request_uri: op.request_uri.clone(),
                input: op
                    .input
                    .as_ref()
                    .map(|b| naming::type_name(&api.shapes.get(b.shape).name)),
                output: op
                    .output
                    .as_ref()
                    .map(|b| naming::type_name(&api.shapes.get(b.shape).name)),
                errors: op
                    .errors
                    .iter()
                    .map(|&e| naming::type_name(&api.shapes.get(e).name))
                    .collect(),
                deprecated: op.deprecated,
                deprecated_message: op.deprecated_message.clone(),
                streaming: op.streaming,
                event_stream: op.event_stream,
                auth_type: op.auth_type.clone(),
                host_prefix: op.host_prefix.clone(),
                documentation: docs.operation(&op.name).map(str::to_string),
                documentation_url: op.documentation_url.clone(),
            })
            .collect(),
        endpoints,
    }
}
