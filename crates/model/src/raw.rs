//! Raw service model document types
//!
//! These types mirror the JSON layout of a service's `api` document: a
//! `metadata` block, a map of operations, and a map of shape
//! definitions whose members reference other shapes by name. Nothing is
//! resolved at this stage; shape references are plain strings.
//!
//! Member maps use `IndexMap` so the declaration order of the source
//! document survives into the resolved graph.

use indexmap::IndexMap;
use serde::Deserialize;

/// Root of a service model document.
#[derive(Debug, Clone, Deserialize)]
pub struct RawApi {
    pub metadata: RawMetadata,
    #[serde(default)]
    pub operations: IndexMap<String, RawOperation>,
    #[serde(default)]
    pub shapes: IndexMap<String, RawShape>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
}

/// Service metadata block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadata {
    #[serde(default)]
    pub api_version: Option<String>,
    /// Protocol family tag, e.g. `"rest-json"` or `"query"`.
    pub protocol: String,
    #[serde(default)]
    pub endpoint_prefix: Option<String>,
    #[serde(default)]
    pub json_version: Option<String>,
    #[serde(default)]
    pub service_abbreviation: Option<String>,
    #[serde(default)]
    pub service_full_name: Option<String>,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub signature_version: Option<String>,
    #[serde(default)]
    pub signing_name: Option<String>,
    #[serde(default)]
    pub target_prefix: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
}

/// One operation entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub http: RawHttp,
    #[serde(default)]
    pub input: Option<RawOperationRef>,
    #[serde(default)]
    pub output: Option<RawOperationRef>,
    #[serde(default)]
    pub errors: Vec<RawOperationRef>,
    #[serde(default)]
    pub authtype: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub deprecated_message: Option<String>,
    #[serde(default)]
    pub documentation_url: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub endpoint: Option<RawEndpointTrait>,
}

/// HTTP binding of an operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHttp {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub request_uri: Option<String>,
    #[serde(default)]
    pub response_code: Option<u16>,
}

/// Reference from an operation to its input/output/error shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperationRef {
    pub shape: String,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub xml_namespace: Option<RawXmlNamespace>,
    #[serde(default)]
    pub payload: Option<String>,
}

/// Host prefix injected ahead of the endpoint for some operations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEndpointTrait {
    #[serde(default)]
    pub host_prefix: Option<String>,
}

/// One shape definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawShape {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub members: IndexMap<String, RawMember>,
    /// List element.
    #[serde(default)]
    pub member: Option<Box<RawMember>>,
    /// Map key.
    #[serde(default)]
    pub key: Option<Box<RawMember>>,
    /// Map value.
    #[serde(default)]
    pub value: Option<Box<RawMember>>,
    #[serde(default, rename = "enum")]
    pub enum_values: Vec<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub pattern: Option<String>,
    /// Name of the member carrying the wire body, if any.
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub flattened: bool,
    #[serde(default)]
    pub exception: bool,
    #[serde(default)]
    pub fault: bool,
    #[serde(default)]
    pub error: Option<RawErrorInfo>,
    #[serde(default)]
    pub streaming: bool,
    #[serde(default)]
    pub eventstream: bool,
    #[serde(default)]
    pub event: bool,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub timestamp_format: Option<String>,
    #[serde(default)]
    pub xml_namespace: Option<RawXmlNamespace>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default, rename = "box")]
    pub boxed: bool,
}

/// A member edge inside a structure, list, or map.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMember {
    pub shape: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub query_name: Option<String>,
    #[serde(default)]
    pub flattened: bool,
    #[serde(default)]
    pub streaming: bool,
    #[serde(default)]
    pub idempotency_token: bool,
    #[serde(default)]
    pub host_label: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub deprecated_message: Option<String>,
    #[serde(default)]
    pub xml_namespace: Option<RawXmlNamespace>,
    #[serde(default)]
    pub xml_attribute: bool,
    #[serde(default)]
    pub eventpayload: bool,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default, rename = "box")]
    pub boxed: bool,
}

/// XML namespace annotation. Some documents spell it as a bare URI
/// string, others as `{prefix, uri}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawXmlNamespace {
    Uri(String),
    Full {
        #[serde(default)]
        prefix: Option<String>,
        #[serde(default)]
        uri: Option<String>,
    },
}

impl RawXmlNamespace {
    /// The namespace URI regardless of spelling.
    pub fn uri(&self) -> Option<&str> {
        match self {
            RawXmlNamespace::Uri(uri) => Some(uri),
            RawXmlNamespace::Full { uri, .. } => uri.as_deref(),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        match self {
            RawXmlNamespace::Uri(_) => None,
            RawXmlNamespace::Full { prefix, .. } => prefix.as_deref(),
        }
    }
}

/// Wire error metadata on an exception shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawErrorInfo {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub http_status_code: Option<u16>,
    #[serde(default)]
    pub sender_fault: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_model() {
        let json = r#"{
            "metadata": {
                "apiVersion": "2019-09-01",
                "protocol": "rest-json",
                "endpointPrefix": "ledger",
                "serviceFullName": "Example Ledger Service",
                "signatureVersion": "v4"
            },
            "operations": {
                "GetLedger": {
                    "name": "GetLedger",
                    "http": { "method": "GET", "requestUri": "/ledgers/{name}" },
                    "input": { "shape": "GetLedgerRequest" },
                    "output": { "shape": "GetLedgerResponse" },
                    "errors": [ { "shape": "NotFoundException" } ]
                }
            },
            "shapes": {
                "GetLedgerRequest": {
                    "type": "structure",
                    "required": ["Name"],
                    "members": {
                        "Name": { "shape": "LedgerName", "location": "uri", "locationName": "name" }
                    }
                },
                "GetLedgerResponse": {
                    "type": "structure",
                    "members": { "Arn": { "shape": "Arn" } }
                },
                "LedgerName": { "type": "string", "min": 1, "max": 32, "pattern": "(?!^.*--)[A-Za-z0-9]+" },
                "Arn": { "type": "string" },
                "NotFoundException": {
                    "type": "structure",
                    "members": {},
                    "error": { "httpStatusCode": 404 },
                    "exception": true
                }
            }
        }"#;

        let api: RawApi = serde_json::from_str(json).unwrap();
        assert_eq!(api.metadata.protocol, "rest-json");
        assert_eq!(api.operations.len(), 1);
        assert_eq!(api.shapes.len(), 5);

        let request = &api.shapes["GetLedgerRequest"];
        assert_eq!(request.kind, "structure");
        assert_eq!(request.required, vec!["Name"]);
        assert_eq!(request.members["Name"].location.as_deref(), Some("uri"));

        let error = &api.shapes["NotFoundException"];
        assert!(error.exception);
        assert_eq!(error.error.as_ref().unwrap().http_status_code, Some(404));
    }

    #[test]
    fn test_member_declaration_order_is_preserved() {
        let json = r#"{
            "type": "structure",
            "members": {
                "Zulu": { "shape": "S" },
                "Alpha": { "shape": "S" },
                "Mike": { "shape": "S" }
            }
        }"#;
        let shape: RawShape = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = shape.members.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Zulu", "Alpha", "Mike"]);
    }

    #[test]
    fn test_xml_namespace_both_spellings() {
        let bare: RawXmlNamespace = serde_json::from_str(r#""http://example.com/doc""#).unwrap();
        assert_eq!(bare.uri(), Some("http://example.com/doc"));

        let full: RawXmlNamespace =
            serde_json::from_str(r#"{ "prefix": "xsi", "uri": "http://example.com/doc" }"#)
                .unwrap();
        assert_eq!(full.prefix(), Some("xsi"));
        assert_eq!(full.uri(), Some("http://example.com/doc"));
    }
}
