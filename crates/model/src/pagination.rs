//! Pagination side table
//!
//! The `input_token`, `output_token`, and `result_key` fields may be a
//! single string or an array in the source; both encodings are
//! accepted and normalized to a list.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// Root of a pagination document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationModel {
    #[serde(default)]
    pub pagination: IndexMap<String, PaginationRule>,
}

/// Pagination rules of one operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationRule {
    #[serde(default, deserialize_with = "one_or_many")]
    pub input_token: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub output_token: Vec<String>,
    #[serde(default)]
    pub more_results: Option<String>,
    #[serde(default)]
    pub limit_key: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub result_key: Vec<String>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}
