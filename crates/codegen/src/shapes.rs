//! Data-shape context assembly

use serde::Serialize;
use stratus_common::naming;
use stratus_model::api::{Api, Field, Location, Member, Protocol, Shape, ShapeId, ShapeKind};
use stratus_model::docs::ServiceDocs;

/// Generation-ready facts about one data shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeContext {
    /// Derived type identifier.
    pub name: String,
    /// Shape name as it appears in the model.
    pub wire_name: String,
    pub used_in_input: bool,
    pub used_in_output: bool,
    /// The in-memory representation must be heap-backed to avoid an
    /// infinite-size value layout.
    pub requires_indirection: bool,
    pub exception: bool,
    pub event_stream: bool,
    pub sensitive: bool,
    pub payload_field: Option<String>,
    pub documentation: Option<String>,
    pub fields: Vec<FieldContext>,
    /// Populated for enumerations of string literals; empty otherwise.
    pub enum_values: Vec<EnumValueContext>,
}

/// One data-model field, in declaration order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldContext {
    pub name: String,
    pub wire_name: String,
    /// Derived type identifier of the target shape.
    pub shape: String,
    pub location: &'static str,
    pub required: bool,
    pub streaming: bool,
    pub idempotency_token: bool,
    pub host_label: bool,
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionEncoding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationContext>,
    pub documentation: Option<String>,
}

/// One literal of an enumeration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValueContext {
    pub name: String,
    pub value: String,
}

/// Explicit element/entry naming for protocols whose codec does not
/// handle collection naming implicitly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEncoding {
    pub flattened: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
}

/// Constraint facts for one field, nested one container level deep.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Element (or map value) constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Box<ValidationContext>>,
}

/// Build shape contexts for every structure and enumeration in the
/// graph, in declaration order.
pub fn build_shape_contexts(api: &Api, docs: &ServiceDocs) -> Vec<ShapeContext> {
    let mut contexts = Vec::new();
    for (id, shape) in api.shapes.iter() {
        match &shape.kind {
            ShapeKind::Structure(structure) => {
                let flags = api.flags(id);
                contexts.push(ShapeContext {
                    name: naming::type_name(&shape.name),
                    wire_name: shape.name.clone(),
                    used_in_input: flags.used_in_input,
                    used_in_output: flags.used_in_output,
                    requires_indirection: flags.self_referential,
                    exception: shape.exception,
                    event_stream: shape.event_stream,
                    sensitive: shape.sensitive,
                    payload_field: shape.payload.clone(),
                    documentation: docs.shape(&shape.name).map(str::to_string),
                    fields: structure
                        .fields
                        .iter()
                        .map(|f| build_field(api, docs, shape, f))
                        .collect(),
                    enum_values: Vec::new(),
                });
            }
            ShapeKind::Enum(values) => {
                let flags = api.flags(id);
                contexts.push(ShapeContext {
                    name: naming::type_name(&shape.name),
                    wire_name: shape.name.clone(),
                    used_in_input: flags.used_in_input,
                    used_in_output: flags.used_in_output,
                    requires_indirection: false,
                    exception: false,
                    event_stream: false,
                    sensitive: shape.sensitive,
                    payload_field: None,
                    documentation: docs.shape(&shape.name).map(str::to_string),
                    fields: Vec::new(),
                    enum_values: values
                        .iter()
                        .map(|v| EnumValueContext {
                            name: naming::variant_name(v),
                            value: v.clone(),
                        })
                        .collect(),
                });
            }
            _ => {}
        }
    }
    contexts
}

fn build_field(api: &Api, docs: &ServiceDocs, owner: &Shape, field: &Field) -> FieldContext {
    let member = &field.member;
    let target = api.shapes.get(member.target);

    FieldContext {
        name: naming::field_name(&field.name),
        wire_name: member
            .wire_name
            .clone()
            .unwrap_or_else(|| field.name.clone()),
        shape: naming::type_name(&target.name),
        location: location_tag(member.location),
        required: member.required,
        streaming: member.streaming || target.streaming,
        idempotency_token: member.idempotency_token,
        host_label: member.host_label,
        default_value: default_value(member),
        collection: collection_encoding(api.metadata.protocol, member, target),
        validation: validation_for(api, member.target, 0),
        documentation: docs.member(&owner.name, &field.name).map(str::to_string),
    }
}

fn location_tag(location: Location) -> &'static str {
    match location {
        Location::Body => "body",
        Location::Header => "header",
        Location::QueryString => "querystring",
        Location::Uri => "uri",
        Location::StatusCode => "statusCode",
    }
}

/// Default-value text: members flagged as idempotency tokens default to
/// a generated token; other non-required members default to the absent
/// value. Required members have no default.
fn default_value(member: &Member) -> Option<String> {
    if member.idempotency_token {
        Some("idempotencyToken()".to_string())
    } else if !member.required {
        Some("null".to_string())
    } else {
        None
    }
}

/// Element/entry naming is only materialized for protocols that encode
/// collections with explicit wire names; JSON codecs get nothing.
fn collection_encoding(
    protocol: Protocol,
    member: &Member,
    target: &Shape,
) -> Option<CollectionEncoding> {
    if !protocol.explicit_collection_names() {
        return None;
    }
    match &target.kind {
        ShapeKind::List(element) => Some(CollectionEncoding {
            flattened: member.flattened || target.flattened,
            element_name: Some(
                element
                    .wire_name
                    .clone()
                    .unwrap_or_else(|| "member".to_string()),
            ),
            key_name: None,
            value_name: None,
        }),
        ShapeKind::Map { key, value } => Some(CollectionEncoding {
            flattened: member.flattened || target.flattened,
            element_name: None,
            key_name: Some(key.wire_name.clone().unwrap_or_else(|| "key".to_string())),
            value_name: Some(
                value
                    .wire_name
                    .clone()
                    .unwrap_or_else(|| "value".to_string()),
            ),
        }),
        _ => None,
    }
}

/// Constraints of the target shape, descending into container elements.
/// Containers inside containers are validated one level deep at most;
/// anything deeper is skipped, matching what the source documents can
/// actually express.
fn validation_for(api: &Api, target: ShapeId, nesting: u8) -> Option<ValidationContext> {
    let shape = api.shapes.get(target);

    let item = match &shape.kind {
        ShapeKind::List(element) => nested_validation(api, element.target, nesting),
        ShapeKind::Map { value, .. } => nested_validation(api, value.target, nesting),
        _ => None,
    };

    if shape.min.is_none() && shape.max.is_none() && shape.pattern.is_none() && item.is_none() {
        return None;
    }

    Some(ValidationContext {
        min: shape.min,
        max: shape.max,
        pattern: shape.pattern.clone(),
        item: item.map(Box::new),
    })
}

fn nested_validation(api: &Api, element: ShapeId, nesting: u8) -> Option<ValidationContext> {
    if api.shapes.get(element).is_container() && nesting >= 1 {
        return None;
    }
    validation_for(api, element, nesting + 1)
}
