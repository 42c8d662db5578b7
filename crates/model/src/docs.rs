//! Documentation side table
//!
//! The docs document keys member text as `"ShapeName$fieldName"`; those
//! keys are split and redistributed into a per-shape, per-field lookup
//! so the context builder never parses `$` joins itself.

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;

/// Root of a documentation document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocModel {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub operations: IndexMap<String, Option<String>>,
    #[serde(default)]
    pub shapes: IndexMap<String, DocShape>,
}

/// Documentation entry for one shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocShape {
    #[serde(default)]
    pub base: Option<String>,
    /// Keys are `"ShapeName$fieldName"` in the source document.
    #[serde(default)]
    pub refs: IndexMap<String, Option<String>>,
}

/// Per-shape, per-field documentation with the `$` joins resolved.
#[derive(Debug, Default)]
pub struct ServiceDocs {
    service: Option<String>,
    operations: HashMap<String, String>,
    shapes: HashMap<String, String>,
    members: HashMap<String, HashMap<String, String>>,
}

impl ServiceDocs {
    pub fn from_model(model: &DocModel) -> Self {
        let mut members: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut shapes = HashMap::new();

        for (shape_name, doc_shape) in &model.shapes {
            if let Some(base) = &doc_shape.base {
                shapes.insert(shape_name.clone(), base.clone());
            }
            for (ref_key, text) in &doc_shape.refs {
                let Some(text) = text else { continue };
                // "ShapeName$fieldName"; keys without a field part
                // document the shape itself.
                match ref_key.split_once('$') {
                    Some((owner, field)) => {
                        members
                            .entry(owner.to_string())
                            .or_default()
                            .insert(field.to_string(), text.clone());
                    }
                    None => {
                        shapes.entry(ref_key.clone()).or_insert_with(|| text.clone());
                    }
                }
            }
        }

        Self {
            service: model.service.clone(),
            operations: model
                .operations
                .iter()
                .filter_map(|(name, text)| Some((name.clone(), text.clone()?)))
                .collect(),
            shapes,
            members,
        }
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn operation(&self, name: &str) -> Option<&str> {
        self.operations.get(name).map(String::as_str)
    }

    pub fn shape(&self, name: &str) -> Option<&str> {
        self.shapes.get(name).map(String::as_str)
    }

    pub fn member(&self, shape: &str, field: &str) -> Option<&str> {
        self.members.get(shape)?.get(field).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_keys_are_split_and_redistributed() {
        let json = r#"{
            "service": "<p>A ledger service.</p>",
            "operations": {
                "GetLedger": "<p>Returns a ledger.</p>",
                "Undocumented": null
            },
            "shapes": {
                "Ledger": {
                    "base": "<p>A ledger.</p>",
                    "refs": {
                        "Ledger$Name": "<p>The ledger name.</p>",
                        "Ledger$Arn": "<p>The ledger ARN.</p>",
                        "CreateLedgerRequest$Name": "<p>The name to create.</p>"
                    }
                }
            }
        }"#;
        let model: DocModel = serde_json::from_str(json).unwrap();
        let docs = ServiceDocs::from_model(&model);

        assert_eq!(docs.operation("GetLedger"), Some("<p>Returns a ledger.</p>"));
        assert_eq!(docs.operation("Undocumented"), None);
        assert_eq!(docs.shape("Ledger"), Some("<p>A ledger.</p>"));
        assert_eq!(docs.member("Ledger", "Name"), Some("<p>The ledger name.</p>"));
        assert_eq!(
            docs.member("CreateLedgerRequest", "Name"),
            Some("<p>The name to create.</p>")
        );
        assert_eq!(docs.member("Ledger", "Missing"), None);
    }
}
