//! Paginator context assembly
//!
//! Token paths are resolved against the shape graph with the
//! dotted-path translator. A paginator with any untranslatable path is
//! dropped — visibly, never silently — and the rest of the service's
//! paginators continue.

use crate::paths::{translate_dotted, PathStep, TranslatedPath};
use serde::Serialize;
use stratus_common::{naming, Result};
use stratus_model::api::{Api, Operation, ShapeId, ShapeKind};
use stratus_model::pagination::{PaginationModel, PaginationRule};
use tracing::warn;

/// Pagination facts for one operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatorContext {
    pub operation: String,
    pub input_tokens: Vec<TokenPath>,
    pub output_tokens: Vec<TokenPath>,
    pub more_results: Option<TokenPath>,
    pub limit_key: Option<String>,
    pub result_keys: Vec<TokenPath>,
    /// How to build the next page's input from the current input and
    /// the freshly observed output tokens.
    pub next_page_input: Vec<NextPageBinding>,
}

/// A translated token path plus the shape it lands on.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPath {
    pub steps: Vec<PathStep>,
    /// Derived type identifier of the shape at the end of the chain.
    pub shape: String,
}

/// One field of the reconstructed next-page input.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "source")]
pub enum NextPageBinding {
    /// Copied verbatim from the current request.
    Request { field: String },
    /// Replaced with the new value of the numbered output token.
    Token { field: String, index: usize },
}

/// Build paginator contexts for every operation with pagination rules.
pub fn build_paginator_contexts(api: &Api, pagination: &PaginationModel) -> Vec<PaginatorContext> {
    let mut contexts = Vec::new();
    for (op_name, rule) in &pagination.pagination {
        match build_one(api, op_name, rule) {
            Ok(Some(context)) => contexts.push(context),
            Ok(None) => {}
            Err(err) => {
                warn!(
                    operation = op_name.as_str(),
                    error = %err,
                    "dropping untranslatable paginator"
                );
            }
        }
    }
    contexts
}

fn build_one(api: &Api, op_name: &str, rule: &PaginationRule) -> Result<Option<PaginatorContext>> {
    let Some(op) = api.operation(op_name) else {
        warn!(operation = op_name, "paginator names an unknown operation");
        return Ok(None);
    };
    let (Some(input), Some(output)) = (&op.input, &op.output) else {
        warn!(operation = op_name, "paginated operation lacks input or output");
        return Ok(None);
    };

    let input_tokens = translate_all(api, input.shape, &rule.input_token)?;
    let output_tokens = translate_all(api, output.shape, &rule.output_token)?;
    let more_results = rule
        .more_results
        .as_deref()
        .map(|expr| translate_dotted(api, output.shape, expr))
        .transpose()?
        .map(|path| token_path(api, path));
    let result_keys = translate_all(api, output.shape, &rule.result_key)?;

    Ok(Some(PaginatorContext {
        operation: op.name.clone(),
        next_page_input: next_page_bindings(api, op, rule),
        input_tokens,
        output_tokens,
        more_results,
        limit_key: rule.limit_key.as_deref().map(naming::field_name),
        result_keys,
    }))
}

fn translate_all(api: &Api, root: ShapeId, exprs: &[String]) -> Result<Vec<TokenPath>> {
    exprs
        .iter()
        .map(|expr| translate_dotted(api, root, expr).map(|path| token_path(api, path)))
        .collect()
}

fn token_path(api: &Api, path: TranslatedPath) -> TokenPath {
    TokenPath {
        steps: path.steps,
        shape: naming::type_name(&api.shapes.get(path.target).name),
    }
}

/// Substitute every non-token field from the current input; token
/// fields take the new token value instead. Only single-segment input
/// tokens name an input field directly.
fn next_page_bindings(api: &Api, op: &Operation, rule: &PaginationRule) -> Vec<NextPageBinding> {
    let Some(input) = &op.input else {
        return Vec::new();
    };
    let ShapeKind::Structure(structure) = &api.shapes.get(input.shape).kind else {
        return Vec::new();
    };

    structure
        .fields
        .iter()
        .map(|field| {
            let token = rule
                .input_token
                .iter()
                .position(|t| t == &field.name);
            let name = naming::field_name(&field.name);
            match token {
                Some(index) => NextPageBinding::Token { field: name, index },
                None => NextPageBinding::Request { field: name },
            }
        })
        .collect()
}
