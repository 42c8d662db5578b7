//! Integration tests for shape graph resolution

use stratus_common::Error;
use stratus_model::api::ShapeKind;
use stratus_model::raw::RawApi;
use stratus_model::resolve;

fn model(json: &str) -> RawApi {
    serde_json::from_str(json).unwrap()
}

/// A small service with a self-referential tree structure reachable
/// from input, and a plain response shape reachable from output.
const TREE_SERVICE: &str = r#"{
    "metadata": { "protocol": "json", "targetPrefix": "Tree" },
    "operations": {
        "PutNode": {
            "name": "PutNode",
            "http": { "method": "POST", "requestUri": "/" },
            "input": { "shape": "Node" },
            "output": { "shape": "PutNodeResponse" }
        }
    },
    "shapes": {
        "Node": {
            "type": "structure",
            "required": ["Name"],
            "members": {
                "Name": { "shape": "NodeName" },
                "Parent": { "shape": "Node" },
                "Children": { "shape": "NodeList" }
            }
        },
        "NodeList": {
            "type": "list",
            "member": { "shape": "Node" }
        },
        "NodeName": { "type": "string", "min": 1, "max": 128 },
        "PutNodeResponse": {
            "type": "structure",
            "members": { "Version": { "shape": "Version" } }
        },
        "Version": { "type": "long" }
    }
}"#;

#[test]
fn test_self_reference_terminates_and_sets_flags() {
    let api = resolve("tree", &model(TREE_SERVICE)).unwrap();

    let node = api.shapes.lookup("Node").unwrap();
    let flags = api.flags(node);
    assert!(flags.used_in_input);
    assert!(!flags.used_in_output);
    assert!(flags.self_referential);

    // The list of Node is reachable from input through the cycle too.
    let list = api.shapes.lookup("NodeList").unwrap();
    assert!(api.flags(list).used_in_input);

    let response = api.shapes.lookup("PutNodeResponse").unwrap();
    assert!(api.flags(response).used_in_output);
    assert!(!api.flags(response).used_in_input);
    assert!(!api.flags(response).self_referential);
}

#[test]
fn test_resolution_is_deterministic() {
    let first = resolve("tree", &model(TREE_SERVICE)).unwrap();
    let second = resolve("tree", &model(TREE_SERVICE)).unwrap();

    assert_eq!(first.shapes.len(), second.shapes.len());
    for (id, shape) in first.shapes.iter() {
        let other = second.shapes.lookup(&shape.name).unwrap();
        assert_eq!(first.flags(id), second.flags(other), "flags differ for {}", shape.name);
    }
}

#[test]
fn test_self_reference_through_intermediate_structure() {
    let api = resolve(
        "wrap",
        &model(
            r#"{
                "metadata": { "protocol": "json" },
                "operations": {},
                "shapes": {
                    "Outer": {
                        "type": "structure",
                        "members": { "Wrapped": { "shape": "Holder" } }
                    },
                    "Holder": {
                        "type": "structure",
                        "members": { "Back": { "shape": "Outer" } }
                    }
                }
            }"#,
        ),
    )
    .unwrap();

    // Outer reaches itself through one structure hop; Holder reaches
    // itself through one structure hop as well (Outer.Wrapped).
    let outer = api.shapes.lookup("Outer").unwrap();
    let holder = api.shapes.lookup("Holder").unwrap();
    assert!(api.flags(outer).self_referential);
    assert!(api.flags(holder).self_referential);
}

#[test]
fn test_two_level_indirection_is_not_self_reference() {
    let api = resolve(
        "deep",
        &model(
            r#"{
                "metadata": { "protocol": "json" },
                "operations": {},
                "shapes": {
                    "A": {
                        "type": "structure",
                        "members": { "Next": { "shape": "B" } }
                    },
                    "B": {
                        "type": "structure",
                        "members": { "Next": { "shape": "C" } }
                    },
                    "C": {
                        "type": "structure",
                        "members": { "Next": { "shape": "A" } }
                    }
                }
            }"#,
        ),
    )
    .unwrap();

    // The cycle spans two intermediate structures; detection only looks
    // one level deep, so none of the three is flagged.
    let a = api.shapes.lookup("A").unwrap();
    assert!(!api.flags(a).self_referential);
}

#[test]
fn test_required_flag_applies_to_direct_children_only() {
    let api = resolve("tree", &model(TREE_SERVICE)).unwrap();
    let node = api.shapes.get(api.shapes.lookup("Node").unwrap());
    let structure = node.as_structure().unwrap();

    assert!(structure.field("Name").unwrap().member.required);
    assert!(!structure.field("Parent").unwrap().member.required);
    assert!(!structure.field("Children").unwrap().member.required);
}

#[test]
fn test_enum_structure_with_required_member_fails() {
    let err = resolve(
        "bad",
        &model(
            r#"{
                "metadata": { "protocol": "json" },
                "operations": {},
                "shapes": {
                    "Mode": {
                        "type": "structure",
                        "enum": ["ON", "OFF"],
                        "required": ["Value"],
                        "members": { "Value": { "shape": "ModeValue" } }
                    },
                    "ModeValue": { "type": "string" }
                }
            }"#,
        ),
    )
    .unwrap_err();

    assert!(matches!(err, Error::IllegalEnumShape { ref shape, .. } if shape == "Mode"));
}

#[test]
fn test_enum_structure_with_header_member_fails() {
    let err = resolve(
        "bad",
        &model(
            r#"{
                "metadata": { "protocol": "rest-json" },
                "operations": {},
                "shapes": {
                    "Mode": {
                        "type": "structure",
                        "enum": ["ON", "OFF"],
                        "members": {
                            "Value": { "shape": "ModeValue", "location": "header", "locationName": "x-mode" }
                        }
                    },
                    "ModeValue": { "type": "string" }
                }
            }"#,
        ),
    )
    .unwrap_err();

    assert!(matches!(err, Error::IllegalEnumShape { .. }));
}

#[test]
fn test_no_body_protocol_rejects_body_member() {
    let err = resolve(
        "gateway",
        &model(
            r#"{
                "metadata": { "protocol": "rest" },
                "operations": {
                    "GetItem": {
                        "name": "GetItem",
                        "http": { "method": "GET", "requestUri": "/items/{id}" },
                        "input": { "shape": "GetItemRequest" }
                    }
                },
                "shapes": {
                    "GetItemRequest": {
                        "type": "structure",
                        "required": ["Id"],
                        "members": {
                            "Id": { "shape": "ItemId", "location": "uri", "locationName": "id" },
                            "Hint": { "shape": "ItemId" }
                        }
                    },
                    "ItemId": { "type": "string" }
                }
            }"#,
        ),
    )
    .unwrap_err();

    match err {
        Error::BodyMemberForbidden {
            operation, member, ..
        } => {
            assert_eq!(operation, "GetItem");
            assert_eq!(member, "Hint");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_no_body_protocol_accepts_fully_bound_input() {
    let api = resolve(
        "gateway",
        &model(
            r#"{
                "metadata": { "protocol": "rest" },
                "operations": {
                    "GetItem": {
                        "name": "GetItem",
                        "http": { "method": "GET", "requestUri": "/items/{id}" },
                        "input": { "shape": "GetItemRequest" }
                    }
                },
                "shapes": {
                    "GetItemRequest": {
                        "type": "structure",
                        "required": ["Id"],
                        "members": {
                            "Id": { "shape": "ItemId", "location": "uri", "locationName": "id" },
                            "Limit": { "shape": "ItemId", "location": "querystring", "locationName": "limit" }
                        }
                    },
                    "ItemId": { "type": "string" }
                }
            }"#,
        ),
    )
    .unwrap();
    assert_eq!(api.operations.len(), 1);
}

#[test]
fn test_blob_payload_member_becomes_raw_payload_shape() {
    let api = resolve(
        "store",
        &model(
            r#"{
                "metadata": { "protocol": "rest-json" },
                "operations": {
                    "PutObject": {
                        "name": "PutObject",
                        "http": { "method": "PUT", "requestUri": "/{key}" },
                        "input": { "shape": "PutObjectRequest" }
                    }
                },
                "shapes": {
                    "PutObjectRequest": {
                        "type": "structure",
                        "payload": "Body",
                        "members": {
                            "Key": { "shape": "Key", "location": "uri", "locationName": "key" },
                            "Body": { "shape": "Body", "streaming": true }
                        }
                    },
                    "Key": { "type": "string" },
                    "Body": { "type": "blob", "streaming": true, "max": 5368709120 }
                }
            }"#,
        ),
    )
    .unwrap();

    let request = api
        .shapes
        .get(api.shapes.lookup("PutObjectRequest").unwrap());
    let body = request.as_structure().unwrap().field("Body").unwrap();
    let payload = api.shapes.get(body.member.target);

    assert!(matches!(payload.kind, ShapeKind::Payload));
    assert!(payload.streaming);
    assert_eq!(payload.max, Some(5368709120.0));
    // The synthetic shape carries the streaming flag into the operation.
    assert!(api.operation("PutObject").unwrap().streaming);
    // And it is marked as input-reachable like anything else.
    assert!(api.flags(body.member.target).used_in_input);
}

#[test]
fn test_operation_error_list_is_resolved() {
    let api = resolve(
        "ledger",
        &model(
            r#"{
                "metadata": { "protocol": "json" },
                "operations": {
                    "GetLedger": {
                        "name": "GetLedger",
                        "http": { "method": "POST", "requestUri": "/" },
                        "input": { "shape": "GetLedgerRequest" },
                        "errors": [
                            { "shape": "NotFound" },
                            { "shape": "Throttled" }
                        ]
                    }
                },
                "shapes": {
                    "GetLedgerRequest": { "type": "structure", "members": {} },
                    "NotFound": {
                        "type": "structure", "members": {},
                        "exception": true,
                        "error": { "code": "ResourceNotFound", "httpStatusCode": 404 }
                    },
                    "Throttled": {
                        "type": "structure", "members": {},
                        "exception": true
                    }
                }
            }"#,
        ),
    )
    .unwrap();

    let op = api.operation("GetLedger").unwrap();
    assert_eq!(op.errors.len(), 2);
    let not_found = api.shapes.get(op.errors[0]);
    assert_eq!(
        not_found.error.as_ref().unwrap().code.as_deref(),
        Some("ResourceNotFound")
    );
}
