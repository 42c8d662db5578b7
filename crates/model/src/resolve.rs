//! Shape graph construction and reference resolution
//!
//! Turns a [`RawApi`](crate::raw::RawApi) into a fully linked
//! [`Api`](crate::api::Api). The build has two phases: phase one seeds
//! the arena with stubs, links every member reference by name, applies
//! required-flag propagation, enum-shape legality, deprecated-member
//! pruning, and payload extraction; phase two computes the derived-flag
//! overlay (usage direction, self-reference) by traversal, leaving the
//! linked graph untouched.

use crate::api::{
    Api, DerivedFlags, ErrorMeta, Field, Location, Member, Operation, OperationBinding, Protocol,
    ServiceMetadata, Shape, ShapeGraph, ShapeId, ShapeKind, Structure, TimestampFormat,
    XmlNamespace,
};
use crate::raw::{RawApi, RawMember, RawOperationRef, RawShape, RawXmlNamespace};
use stratus_common::{Error, Result};
use tracing::debug;

/// Resolve a raw (already patched) service model.
pub fn resolve(service_name: &str, raw: &RawApi) -> Result<Api> {
    let protocol = Protocol::parse(&raw.metadata.protocol)?;
    let metadata = ServiceMetadata {
        protocol,
        api_version: raw.metadata.api_version.clone(),
        endpoint_prefix: raw.metadata.endpoint_prefix.clone(),
        json_version: raw.metadata.json_version.clone(),
        service_full_name: raw.metadata.service_full_name.clone(),
        service_id: raw.metadata.service_id.clone(),
        signature_version: raw.metadata.signature_version.clone(),
        signing_name: raw.metadata.signing_name.clone(),
        target_prefix: raw.metadata.target_prefix.clone(),
        uid: raw.metadata.uid.clone(),
    };

    let mut graph = seed_arena(raw);
    link_shapes(raw, &mut graph)?;
    extract_payloads(&mut graph);

    let operations = link_operations(raw, &graph)?;
    check_body_members(protocol, &operations, &graph)?;

    let flags = derive_flags(&graph, &operations);
    debug!(
        service = service_name,
        shapes = graph.len(),
        operations = operations.len(),
        "resolved service model"
    );

    Ok(Api::new(
        service_name.to_string(),
        metadata,
        operations,
        graph,
        flags,
    ))
}

/// Allocate an arena slot per declared shape so forward references
/// resolve before their targets are linked.
fn seed_arena(raw: &RawApi) -> ShapeGraph {
    let mut graph = ShapeGraph::default();
    for name in raw.shapes.keys() {
        graph.push(Shape {
            name: name.clone(),
            kind: ShapeKind::Stub,
            payload: None,
            xml_namespace: None,
            error: None,
            exception: false,
            streaming: false,
            event_stream: false,
            sensitive: false,
            flattened: false,
            min: None,
            max: None,
            pattern: None,
        });
    }
    graph
}

fn link_shapes(raw: &RawApi, graph: &mut ShapeGraph) -> Result<()> {
    for (name, raw_shape) in &raw.shapes {
        let id = graph
            .lookup(name)
            .unwrap_or_else(|| unreachable!("arena was seeded from the same map"));
        let shape = link_shape(name, raw_shape, graph)?;
        graph.replace(id, shape);
    }
    Ok(())
}

fn link_shape(name: &str, raw: &RawShape, graph: &ShapeGraph) -> Result<Shape> {
    let kind = match raw.kind.as_str() {
        "string" => {
            if raw.enum_values.is_empty() {
                ShapeKind::String
            } else {
                ShapeKind::Enum(raw.enum_values.clone())
            }
        }
        "integer" => ShapeKind::Integer,
        "long" => ShapeKind::Long,
        "double" => ShapeKind::Double,
        "float" => ShapeKind::Float,
        "boolean" => ShapeKind::Boolean,
        "blob" => ShapeKind::Blob,
        "timestamp" => ShapeKind::Timestamp(TimestampFormat::parse(
            raw.timestamp_format.as_deref(),
        )?),
        "structure" => ShapeKind::Structure(link_structure(name, raw, graph)?),
        "list" => {
            let element = raw.member.as_deref().ok_or_else(|| {
                Error::InvalidModel(format!("list shape {name:?} has no member"))
            })?;
            ShapeKind::List(link_member(name, "member", element, false, graph)?)
        }
        "map" => {
            let key = raw.key.as_deref().ok_or_else(|| {
                Error::InvalidModel(format!("map shape {name:?} has no key"))
            })?;
            let value = raw.value.as_deref().ok_or_else(|| {
                Error::InvalidModel(format!("map shape {name:?} has no value"))
            })?;
            ShapeKind::Map {
                key: link_member(name, "key", key, false, graph)?,
                value: link_member(name, "value", value, false, graph)?,
            }
        }
        other => {
            return Err(Error::InvalidModel(format!(
                "shape {name:?} has unknown type {other:?}"
            )))
        }
    };

    Ok(Shape {
        name: name.to_string(),
        kind,
        payload: raw.payload.clone(),
        xml_namespace: raw.xml_namespace.as_ref().map(convert_namespace),
        error: raw.error.as_ref().map(|e| ErrorMeta {
            code: e.code.clone(),
            http_status: e.http_status_code,
            sender_fault: e.sender_fault,
        }),
        exception: raw.exception || raw.fault,
        streaming: raw.streaming,
        event_stream: raw.eventstream,
        sensitive: raw.sensitive,
        flattened: raw.flattened,
        min: raw.min,
        max: raw.max,
        pattern: raw.pattern.clone(),
    })
}

fn link_structure(name: &str, raw: &RawShape, graph: &ShapeGraph) -> Result<Structure> {
    let is_enum = !raw.enum_values.is_empty();

    // Enum-shape legality is a link-time contract: an enumeration-shaped
    // structure must be a plain, fully-optional value bag.
    if is_enum && !raw.required.is_empty() {
        return Err(Error::IllegalEnumShape {
            shape: name.to_string(),
            reason: "declares required members".to_string(),
        });
    }

    let mut fields = Vec::with_capacity(raw.members.len());
    for (member_name, raw_member) in &raw.members {
        let required = raw.required.iter().any(|r| r == member_name);
        let member = link_member(name, member_name, raw_member, required, graph)?;

        if is_enum && member.location != Location::Body {
            return Err(Error::IllegalEnumShape {
                shape: name.to_string(),
                reason: format!("member {member_name:?} is bound outside the body"),
            });
        }

        // Deprecated members are linked (a dangling reference is still an
        // error) and then pruned; they must not appear in output.
        if raw_member.deprecated {
            debug!(shape = name, member = member_name.as_str(), "pruning deprecated member");
            continue;
        }

        fields.push(Field {
            name: member_name.clone(),
            member,
        });
    }

    Ok(Structure { fields, is_enum })
}

fn link_member(
    owner: &str,
    member_name: &str,
    raw: &RawMember,
    required: bool,
    graph: &ShapeGraph,
) -> Result<Member> {
    let target = graph.lookup(&raw.shape).ok_or_else(|| Error::MissingShape {
        shape: raw.shape.clone(),
        referenced_by: format!("{owner}.{member_name}"),
    })?;

    Ok(Member {
        target,
        location: Location::parse(raw.location.as_deref())?,
        wire_name: raw.location_name.clone(),
        query_name: raw.query_name.clone(),
        required,
        flattened: raw.flattened,
        streaming: raw.streaming,
        idempotency_token: raw.idempotency_token,
        host_label: raw.host_label,
        xml_namespace: raw.xml_namespace.as_ref().map(convert_namespace),
        xml_attribute: raw.xml_attribute,
    })
}

fn convert_namespace(raw: &RawXmlNamespace) -> XmlNamespace {
    XmlNamespace {
        prefix: raw.prefix().map(str::to_string),
        uri: raw.uri().map(str::to_string),
    }
}

/// Replace blob payload fields with a synthetic raw-payload shape.
///
/// A structure whose declared payload field is a blob models a wire body
/// that is an opaque byte stream. The synthetic shape keeps the blob's
/// size constraints and streaming flag. Runs before the usage traversal
/// so the synthetic shape carries correct direction flags.
fn extract_payloads(graph: &mut ShapeGraph) {
    let ids: Vec<ShapeId> = graph.iter().map(|(id, _)| id).collect();
    for id in ids {
        let shape = graph.get(id);
        let Some(payload_name) = shape.payload.clone() else {
            continue;
        };
        let Some(structure) = shape.as_structure() else {
            continue;
        };
        let Some(field) = structure.field(&payload_name) else {
            continue;
        };
        let target = field.member.target;
        let blob = graph.get(target);
        if !matches!(blob.kind, ShapeKind::Blob) {
            continue;
        }

        let synthetic = Shape {
            name: format!("{}Payload", graph.get(id).name),
            kind: ShapeKind::Payload,
            payload: None,
            xml_namespace: None,
            error: None,
            exception: false,
            streaming: blob.streaming || field.member.streaming,
            event_stream: false,
            sensitive: blob.sensitive,
            flattened: false,
            min: blob.min,
            max: blob.max,
            pattern: None,
        };
        let synthetic_id = graph.push(synthetic);

        let mut shape = graph.get(id).clone();
        if let ShapeKind::Structure(structure) = &mut shape.kind {
            if let Some(field) = structure
                .fields
                .iter_mut()
                .find(|f| f.name == payload_name)
            {
                field.member.target = synthetic_id;
            }
        }
        graph.replace(id, shape);
    }
}

fn link_operations(raw: &RawApi, graph: &ShapeGraph) -> Result<Vec<Operation>> {
    let mut operations = Vec::with_capacity(raw.operations.len());
    for (op_name, raw_op) in &raw.operations {
        let name = raw_op.name.clone().unwrap_or_else(|| op_name.clone());

        let input = raw_op
            .input
            .as_ref()
            .map(|r| link_binding(&name, r, graph))
            .transpose()?;
        let output = raw_op
            .output
            .as_ref()
            .map(|r| link_binding(&name, r, graph))
            .transpose()?;

        let mut errors = Vec::with_capacity(raw_op.errors.len());
        for error_ref in &raw_op.errors {
            errors.push(graph.lookup(&error_ref.shape).ok_or_else(|| {
                Error::MissingShape {
                    shape: error_ref.shape.clone(),
                    referenced_by: format!("{name} errors"),
                }
            })?);
        }

        let streaming = binding_streams(input.as_ref(), graph)
            || binding_streams(output.as_ref(), graph);
        let event_stream = binding_event_streams(input.as_ref(), graph)
            || binding_event_streams(output.as_ref(), graph);

        operations.push(Operation {
            name,
            http_method: raw_op.http.method.clone().unwrap_or_else(|| "POST".to_string()),
            request_uri: raw_op.http.request_uri.clone().unwrap_or_else(|| "/".to_string()),
            input,
            output,
            errors,
            auth_type: raw_op.authtype.clone(),
            deprecated: raw_op.deprecated,
            deprecated_message: raw_op.deprecated_message.clone(),
            documentation_url: raw_op.documentation_url.clone(),
            host_prefix: raw_op
                .endpoint
                .as_ref()
                .and_then(|e| e.host_prefix.clone()),
            streaming,
            event_stream,
        });
    }
    Ok(operations)
}

fn link_binding(
    op_name: &str,
    raw: &RawOperationRef,
    graph: &ShapeGraph,
) -> Result<OperationBinding> {
    let shape = graph.lookup(&raw.shape).ok_or_else(|| Error::MissingShape {
        shape: raw.shape.clone(),
        referenced_by: op_name.to_string(),
    })?;
    Ok(OperationBinding {
        shape,
        wire_name: raw.location_name.clone(),
        xml_namespace: raw.xml_namespace.as_ref().map(convert_namespace),
        payload: raw.payload.clone(),
    })
}

fn binding_streams(binding: Option<&OperationBinding>, graph: &ShapeGraph) -> bool {
    let Some(binding) = binding else { return false };
    let shape = graph.get(binding.shape);
    shape.streaming
        || shape.as_structure().is_some_and(|s| {
            s.fields
                .iter()
                .any(|f| f.member.streaming || graph.get(f.member.target).streaming)
        })
}

fn binding_event_streams(binding: Option<&OperationBinding>, graph: &ShapeGraph) -> bool {
    let Some(binding) = binding else { return false };
    let shape = graph.get(binding.shape);
    shape.event_stream
        || shape.as_structure().is_some_and(|s| {
            s.fields
                .iter()
                .any(|f| graph.get(f.member.target).event_stream)
        })
}

/// A protocol that binds parameters exclusively to headers, the query
/// string, and the URI cannot carry body members; a model that declares
/// one contradicts itself.
fn check_body_members(
    protocol: Protocol,
    operations: &[Operation],
    graph: &ShapeGraph,
) -> Result<()> {
    if protocol.allows_body_input() {
        return Ok(());
    }
    for op in operations {
        let Some(input) = &op.input else { continue };
        let Some(structure) = graph.get(input.shape).as_structure() else {
            continue;
        };
        for field in &structure.fields {
            if field.member.location == Location::Body {
                return Err(Error::BodyMemberForbidden {
                    operation: op.name.clone(),
                    member: field.name.clone(),
                    protocol: protocol.tag().to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Phase two: compute the derived-flag overlay by traversal.
fn derive_flags(graph: &ShapeGraph, operations: &[Operation]) -> Vec<DerivedFlags> {
    let mut flags = vec![DerivedFlags::default(); graph.len()];

    for op in operations {
        if let Some(input) = &op.input {
            mark_usage(graph, &mut flags, input.shape, Direction::Input);
        }
        if let Some(output) = &op.output {
            mark_usage(graph, &mut flags, output.shape, Direction::Output);
        }
    }

    for (id, shape) in graph.iter() {
        if let Some(structure) = shape.as_structure() {
            flags[id.index()].self_referential = is_self_referential(graph, id, structure);
        }
    }

    flags
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Input,
    Output,
}

/// Mark one direction flag and recurse. The "already set" check is the
/// monotonic guard that terminates the walk over cyclic graphs.
fn mark_usage(graph: &ShapeGraph, flags: &mut [DerivedFlags], id: ShapeId, dir: Direction) {
    let entry = &mut flags[id.index()];
    let seen = match dir {
        Direction::Input => std::mem::replace(&mut entry.used_in_input, true),
        Direction::Output => std::mem::replace(&mut entry.used_in_output, true),
    };
    if seen {
        return;
    }

    match &graph.get(id).kind {
        ShapeKind::Structure(structure) => {
            for field in &structure.fields {
                mark_usage(graph, flags, field.member.target, dir);
            }
        }
        ShapeKind::List(element) => mark_usage(graph, flags, element.target, dir),
        ShapeKind::Map { key, value } => {
            mark_usage(graph, flags, key.target, dir);
            mark_usage(graph, flags, value.target, dir);
        }
        _ => {}
    }
}

/// Direct self-reference, or self through exactly one level of list or
/// structure indirection. Anything deeper keeps a flat layout.
fn is_self_referential(graph: &ShapeGraph, id: ShapeId, structure: &Structure) -> bool {
    for field in &structure.fields {
        let target = field.member.target;
        if target == id {
            return true;
        }
        match &graph.get(target).kind {
            ShapeKind::List(element) if element.target == id => return true,
            ShapeKind::Structure(inner) => {
                if inner.fields.iter().any(|f| f.member.target == id) {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(json: &str) -> RawApi {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_missing_shape_reference_fails() {
        let raw = model(
            r#"{
                "metadata": { "protocol": "json" },
                "operations": {},
                "shapes": {
                    "Widget": {
                        "type": "structure",
                        "members": { "Tag": { "shape": "NoSuchShape" } }
                    }
                }
            }"#,
        );
        let err = resolve("widgets", &raw).unwrap_err();
        assert!(matches!(err, Error::MissingShape { ref shape, .. } if shape == "NoSuchShape"));
    }

    #[test]
    fn test_deprecated_member_is_pruned_after_linking() {
        let raw = model(
            r#"{
                "metadata": { "protocol": "json" },
                "operations": {},
                "shapes": {
                    "Widget": {
                        "type": "structure",
                        "members": {
                            "Keep": { "shape": "Tag" },
                            "Drop": { "shape": "Tag", "deprecated": true }
                        }
                    },
                    "Tag": { "type": "string" }
                }
            }"#,
        );
        let api = resolve("widgets", &raw).unwrap();
        let widget = api.shapes.get(api.shapes.lookup("Widget").unwrap());
        let structure = widget.as_structure().unwrap();
        assert_eq!(structure.fields.len(), 1);
        assert_eq!(structure.fields[0].name, "Keep");
    }

    #[test]
    fn test_deprecated_member_with_dangling_reference_still_fails() {
        let raw = model(
            r#"{
                "metadata": { "protocol": "json" },
                "operations": {},
                "shapes": {
                    "Widget": {
                        "type": "structure",
                        "members": {
                            "Drop": { "shape": "Gone", "deprecated": true }
                        }
                    }
                }
            }"#,
        );
        assert!(matches!(
            resolve("widgets", &raw).unwrap_err(),
            Error::MissingShape { .. }
        ));
    }

    #[test]
    fn test_unknown_protocol_is_rejected() {
        let raw = model(r#"{ "metadata": { "protocol": "carrier-pigeon" }, "shapes": {} }"#);
        assert!(matches!(
            resolve("x", &raw).unwrap_err(),
            Error::UnknownProtocol(_)
        ));
    }
}
