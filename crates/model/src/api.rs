//! Resolved service model
//!
//! The typed intermediate representation the context builder consumes.
//! Shapes live in a per-service arena ([`ShapeGraph`]) and reference
//! each other through [`ShapeId`] handles, so a self-referential
//! structure is just a member whose handle equals its container's — no
//! cycle-breaking references needed. The graph is immutable once
//! linked; derived per-shape facts live in a separate overlay
//! ([`DerivedFlags`]) computed by a second traversal phase.

use stratus_common::{Error, Result};

/// Stable handle to a shape in its service's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub(crate) u32);

impl ShapeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena of all shapes belonging to one service.
#[derive(Debug, Default)]
pub struct ShapeGraph {
    shapes: Vec<Shape>,
    by_name: indexmap::IndexMap<String, ShapeId>,
}

impl ShapeGraph {
    pub(crate) fn push(&mut self, shape: Shape) -> ShapeId {
        let id = ShapeId(self.shapes.len() as u32);
        self.by_name.insert(shape.name.clone(), id);
        self.shapes.push(shape);
        id
    }

    pub(crate) fn replace(&mut self, id: ShapeId, shape: Shape) {
        self.shapes[id.index()] = shape;
    }

    pub fn get(&self, id: ShapeId) -> &Shape {
        &self.shapes[id.index()]
    }

    pub fn lookup(&self, name: &str) -> Option<ShapeId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Iterate shapes in declaration order (synthetic shapes last).
    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.shapes
            .iter()
            .enumerate()
            .map(|(i, s)| (ShapeId(i as u32), s))
    }
}

/// A named node in the type graph.
#[derive(Debug, Clone)]
pub struct Shape {
    pub name: String,
    pub kind: ShapeKind,
    /// Name of the member carrying the wire body, if declared.
    pub payload: Option<String>,
    pub xml_namespace: Option<XmlNamespace>,
    pub error: Option<ErrorMeta>,
    pub exception: bool,
    pub streaming: bool,
    pub event_stream: bool,
    pub sensitive: bool,
    pub flattened: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<String>,
}

impl Shape {
    pub fn as_structure(&self) -> Option<&Structure> {
        match &self.kind {
            ShapeKind::Structure(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, ShapeKind::List(_) | ShapeKind::Map { .. })
    }
}

/// Tagged payload of a shape.
#[derive(Debug, Clone)]
pub enum ShapeKind {
    String,
    Integer,
    Long,
    Double,
    Float,
    Boolean,
    Blob,
    /// Closed enumeration of string literals.
    Enum(Vec<String>),
    Structure(Structure),
    List(Member),
    Map {
        key: Member,
        value: Member,
    },
    /// Opaque byte-stream body, synthesized during payload extraction.
    Payload,
    Timestamp(TimestampFormat),
    /// Placeholder used while the arena is being wired. Never observable
    /// after resolution succeeds.
    Stub,
}

/// An ordered field bag, possibly flagged as representing an
/// enumeration of literal values.
#[derive(Debug, Clone)]
pub struct Structure {
    pub fields: Vec<Field>,
    pub is_enum: bool,
}

impl Structure {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A named member of a structure.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub member: Member,
}

/// A typed, located edge to a target shape.
#[derive(Debug, Clone)]
pub struct Member {
    pub target: ShapeId,
    pub location: Location,
    /// Wire name override (`locationName`).
    pub wire_name: Option<String>,
    pub query_name: Option<String>,
    pub required: bool,
    pub flattened: bool,
    pub streaming: bool,
    pub idempotency_token: bool,
    pub host_label: bool,
    pub xml_namespace: Option<XmlNamespace>,
    pub xml_attribute: bool,
}

/// Where a member travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Body,
    Header,
    QueryString,
    Uri,
    StatusCode,
}

impl Location {
    pub(crate) fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            None => Ok(Location::Body),
            Some("header") | Some("headers") => Ok(Location::Header),
            Some("querystring") => Ok(Location::QueryString),
            Some("uri") => Ok(Location::Uri),
            Some("statusCode") => Ok(Location::StatusCode),
            Some(other) => Err(Error::InvalidModel(format!(
                "unknown member location {other:?}"
            ))),
        }
    }
}

/// Timestamp encoding variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    Iso8601,
    Rfc822,
    UnixTimestamp,
    /// No explicit format; the protocol's default applies.
    Default,
}

impl TimestampFormat {
    pub(crate) fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            None => Ok(TimestampFormat::Default),
            Some("iso8601") => Ok(TimestampFormat::Iso8601),
            Some("rfc822") => Ok(TimestampFormat::Rfc822),
            Some("unixTimestamp") => Ok(TimestampFormat::UnixTimestamp),
            Some(other) => Err(Error::InvalidModel(format!(
                "unknown timestamp format {other:?}"
            ))),
        }
    }
}

/// XML namespace annotation carried into the resolved graph.
#[derive(Debug, Clone)]
pub struct XmlNamespace {
    pub prefix: Option<String>,
    pub uri: Option<String>,
}

/// Wire error metadata of an exception shape.
#[derive(Debug, Clone)]
pub struct ErrorMeta {
    pub code: Option<String>,
    pub http_status: Option<u16>,
    pub sender_fault: bool,
}

/// Protocol family of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Json,
    RestJson,
    RestXml,
    Query,
    Ec2,
    /// Bare REST: every input parameter is bound to the URI, query
    /// string, or headers; request bodies are not modeled.
    Rest,
}

impl Protocol {
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "json" => Ok(Protocol::Json),
            "rest-json" => Ok(Protocol::RestJson),
            "rest-xml" => Ok(Protocol::RestXml),
            "query" => Ok(Protocol::Query),
            "ec2" => Ok(Protocol::Ec2),
            "rest" => Ok(Protocol::Rest),
            other => Err(Error::UnknownProtocol(other.to_string())),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Protocol::Json => "json",
            Protocol::RestJson => "rest-json",
            Protocol::RestXml => "rest-xml",
            Protocol::Query => "query",
            Protocol::Ec2 => "ec2",
            Protocol::Rest => "rest",
        }
    }

    /// Whether list elements and map entries need explicit wire names.
    /// JSON codecs handle collection naming implicitly.
    pub fn explicit_collection_names(self) -> bool {
        matches!(self, Protocol::RestXml | Protocol::Query | Protocol::Ec2)
    }

    /// Whether input members may travel in the request body.
    pub fn allows_body_input(self) -> bool {
        !matches!(self, Protocol::Rest)
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Typed service metadata.
#[derive(Debug, Clone)]
pub struct ServiceMetadata {
    pub protocol: Protocol,
    pub api_version: Option<String>,
    pub endpoint_prefix: Option<String>,
    pub json_version: Option<String>,
    pub service_full_name: Option<String>,
    pub service_id: Option<String>,
    pub signature_version: Option<String>,
    pub signing_name: Option<String>,
    pub target_prefix: Option<String>,
    pub uid: Option<String>,
}

/// A resolved operation.
#[derive(Debug, Clone)]
pub struct Operation {
    pub name: String,
    pub http_method: String,
    pub request_uri: String,
    pub input: Option<OperationBinding>,
    pub output: Option<OperationBinding>,
    pub errors: Vec<ShapeId>,
    pub auth_type: Option<String>,
    pub deprecated: bool,
    pub deprecated_message: Option<String>,
    pub documentation_url: Option<String>,
    pub host_prefix: Option<String>,
    /// Derived after linking: some bound member streams.
    pub streaming: bool,
    /// Derived after linking: input or output is an event stream.
    pub event_stream: bool,
}

/// Binding of an operation to its input or output shape.
#[derive(Debug, Clone)]
pub struct OperationBinding {
    pub shape: ShapeId,
    pub wire_name: Option<String>,
    pub xml_namespace: Option<XmlNamespace>,
    pub payload: Option<String>,
}

/// Derived facts about one shape, kept outside the immutable graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedFlags {
    /// Reachable from some operation's input root.
    pub used_in_input: bool,
    /// Reachable from some operation's output root.
    pub used_in_output: bool,
    /// Contains itself directly or through one level of list/structure
    /// indirection; the in-memory representation needs indirection.
    pub self_referential: bool,
}

/// A fully resolved service model.
#[derive(Debug)]
pub struct Api {
    pub name: String,
    pub metadata: ServiceMetadata,
    pub operations: Vec<Operation>,
    pub shapes: ShapeGraph,
    /// Overlay indexed by [`ShapeId`].
    flags: Vec<DerivedFlags>,
}

impl Api {
    pub(crate) fn new(
        name: String,
        metadata: ServiceMetadata,
        operations: Vec<Operation>,
        shapes: ShapeGraph,
        flags: Vec<DerivedFlags>,
    ) -> Self {
        debug_assert_eq!(shapes.len(), flags.len());
        Self {
            name,
            metadata,
            operations,
            shapes,
            flags,
        }
    }

    pub fn flags(&self, id: ShapeId) -> DerivedFlags {
        self.flags[id.index()]
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.name == name)
    }
}
