//! Wait-condition context assembly
//!
//! Each acceptor translates independently; a wait condition is only
//! emitted if every one of its declared acceptors translated. Partial
//! translation discards the whole wait condition rather than emitting
//! an incomplete one.

use crate::paths::rewrite_embedded;
use serde::Serialize;
use serde_json::Value;
use stratus_common::{Error, Result};
use stratus_model::api::Api;
use stratus_model::waiters::{RawAcceptor, WaiterModel, WaiterRule};
use tracing::warn;

/// One wait condition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiterContext {
    pub name: String,
    pub operation: String,
    pub delay_seconds: u32,
    pub max_attempts: u32,
    pub acceptors: Vec<AcceptorContext>,
}

/// One acceptor: target state plus matcher.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptorContext {
    pub state: AcceptorState,
    pub matcher: MatcherContext,
}

/// Terminal or retry decision an acceptor selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AcceptorState {
    Success,
    Failure,
    Retry,
}

/// Matcher variant.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MatcherContext {
    /// HTTP status comparison; `success` records which side of the 2xx
    /// boundary the expected code falls on.
    Status { code: u16, success: bool },
    /// Wire error code comparison.
    ErrorCode { code: String },
    /// JMESPath match over the response.
    Path { expression: String, expected: Value },
    /// JMESPath match required over every element.
    PathAll { expression: String, expected: Value },
    /// JMESPath match required over at least one element.
    PathAny { expression: String, expected: Value },
}

/// Build waiter contexts, dropping any wait condition with an
/// untranslatable acceptor.
pub fn build_waiter_contexts(api: &Api, model: &WaiterModel) -> Vec<WaiterContext> {
    let mut contexts = Vec::new();
    for (name, rule) in &model.waiters {
        match build_one(api, name, rule) {
            Ok(context) => contexts.push(context),
            Err(err) => {
                warn!(waiter = name.as_str(), error = %err, "dropping wait condition");
            }
        }
    }
    contexts
}

fn build_one(api: &Api, name: &str, rule: &WaiterRule) -> Result<WaiterContext> {
    let Some(op) = api.operation(&rule.operation) else {
        return Err(Error::UntranslatableAcceptor {
            waiter: name.to_string(),
            reason: format!("unknown operation {:?}", rule.operation),
        });
    };

    let acceptors = rule
        .acceptors
        .iter()
        .map(|acceptor| translate_acceptor(name, acceptor))
        .collect::<Result<Vec<_>>>()?;

    Ok(WaiterContext {
        name: name.to_string(),
        operation: op.name.clone(),
        delay_seconds: rule.delay,
        max_attempts: rule.max_attempts,
        acceptors,
    })
}

fn translate_acceptor(waiter: &str, raw: &RawAcceptor) -> Result<AcceptorContext> {
    let untranslatable = |reason: String| Error::UntranslatableAcceptor {
        waiter: waiter.to_string(),
        reason,
    };

    let state = match raw.state.as_str() {
        "success" => AcceptorState::Success,
        "failure" => AcceptorState::Failure,
        "retry" => AcceptorState::Retry,
        other => return Err(untranslatable(format!("unknown state {other:?}"))),
    };

    let matcher = match raw.matcher.as_str() {
        "status" => {
            let code = raw
                .expected
                .as_u64()
                .and_then(|c| u16::try_from(c).ok())
                .ok_or_else(|| {
                    untranslatable(format!("status matcher expects a code, got {}", raw.expected))
                })?;
            MatcherContext::Status {
                code,
                success: (200..300).contains(&code),
            }
        }
        "error" => {
            let code = raw.expected.as_str().ok_or_else(|| {
                untranslatable(format!("error matcher expects a code, got {}", raw.expected))
            })?;
            MatcherContext::ErrorCode {
                code: code.to_string(),
            }
        }
        "path" | "pathAll" | "pathAny" => {
            let argument = raw
                .argument
                .as_deref()
                .filter(|a| !a.trim().is_empty())
                .ok_or_else(|| {
                    untranslatable(format!("{} matcher has no argument", raw.matcher))
                })?;
            let expression = rewrite_embedded(argument);
            match raw.matcher.as_str() {
                "path" => MatcherContext::Path {
                    expression,
                    expected: raw.expected.clone(),
                },
                "pathAll" => MatcherContext::PathAll {
                    expression,
                    expected: raw.expected.clone(),
                },
                _ => MatcherContext::PathAny {
                    expression,
                    expected: raw.expected.clone(),
                },
            }
        }
        other => return Err(untranslatable(format!("unknown matcher {other:?}"))),
    };

    Ok(AcceptorContext { state, matcher })
}
