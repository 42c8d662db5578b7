//! Path expression translation
//!
//! Two translators over a constrained subset of a JMESPath-style query
//! language. The dotted-path mode resolves pagination token paths
//! against the shape graph into typed field-access chains; the
//! embedded-field rewrite is a purely lexical pass over wait-condition
//! matcher expressions, which may reference values that are not simple
//! member paths and therefore cannot be resolved against the graph.

use serde::Serialize;
use stratus_common::{naming, Error, Result};
use stratus_model::api::{Api, ShapeId, ShapeKind};

/// One step of a translated field-access chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PathStep {
    /// Access a named field. `optional` means the chain continues
    /// behind an absence check.
    Field { name: String, optional: bool },
    /// Take the last element of a list.
    Last { optional: bool },
}

/// A fully translated dotted path.
#[derive(Debug, Clone)]
pub struct TranslatedPath {
    pub steps: Vec<PathStep>,
    /// Shape reached at the end of the chain.
    pub target: ShapeId,
}

/// Translate a dot-separated path, starting from `root`.
///
/// Each segment may carry a literal `[-1]` suffix, recorded as a
/// take-last step. A step is marked optional only while further
/// segments follow it: a non-required member mid-chain continues
/// optionally, but a last, solitary segment is never optional
/// regardless of required-ness.
pub fn translate_dotted(api: &Api, root: ShapeId, expr: &str) -> Result<TranslatedPath> {
    let illegal = |reason: String| Error::IllegalPath {
        path: expr.to_string(),
        reason,
    };

    let segments: Vec<&str> = expr.split('.').collect();
    let mut steps = Vec::new();
    let mut owner = root;
    let mut current = root;

    for (i, raw_segment) in segments.iter().enumerate() {
        let owner_shape = api.shapes.get(owner);
        let Some(structure) = owner_shape.as_structure() else {
            return Err(illegal(format!(
                "cannot descend into {:?}, which is not a structure",
                owner_shape.name
            )));
        };

        let more = i + 1 < segments.len();
        let (segment, take_last) = match raw_segment.strip_suffix("[-1]") {
            Some(stripped) => (stripped, true),
            None => (*raw_segment, false),
        };

        let field = structure.field(segment).ok_or_else(|| {
            illegal(format!(
                "{:?} is not a member of {:?}",
                segment, owner_shape.name
            ))
        })?;

        steps.push(PathStep::Field {
            name: naming::field_name(segment),
            optional: !field.member.required && more,
        });
        current = field.member.target;

        if take_last {
            let ShapeKind::List(element) = &api.shapes.get(current).kind else {
                return Err(illegal(format!(
                    "last-element marker on {:?}, which is not a list",
                    segment
                )));
            };
            steps.push(PathStep::Last { optional: more });
            current = element.target;
        }

        if more {
            if let ShapeKind::List(element) = &api.shapes.get(current).kind {
                current = element.target;
            }
            match api.shapes.get(current).kind {
                ShapeKind::Structure(_) => owner = current,
                _ => {
                    return Err(illegal(format!(
                        "cannot follow the path past {:?}",
                        segment
                    )))
                }
            }
        }
    }

    Ok(TranslatedPath {
        steps,
        target: current,
    })
}

/// Rewrite field names embedded in an arbitrary matcher expression.
///
/// A maximal run of letters not immediately followed by `(` is a field
/// name and gets the field-naming convention applied; a run followed by
/// `(` is a function-call name and passes through; quoted literals and
/// everything else pass through unmodified. This is a lexical rewrite —
/// nothing is resolved against the shape graph.
pub fn rewrite_embedded(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut word = String::new();
    let mut chars = expr.chars();

    while let Some(c) = chars.next() {
        if c.is_ascii_alphabetic() {
            word.push(c);
            continue;
        }
        if !word.is_empty() {
            if c == '(' {
                out.push_str(&word);
            } else {
                out.push_str(&naming::field_name(&word));
            }
            word.clear();
        }
        out.push(c);
        if c == '"' || c == '\'' || c == '`' {
            // Literal: copy verbatim up to the closing quote.
            for inner in chars.by_ref() {
                out.push(inner);
                if inner == c {
                    break;
                }
            }
        }
    }

    // A trailing run has nothing after it, so it can never be a
    // function call; it is flushed as a field name.
    if !word.is_empty() {
        out.push_str(&naming::field_name(&word));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_fields_and_functions() {
        assert_eq!(
            rewrite_embedded(r#"Status == "RUNNING" && contains(Tags, "prod")"#),
            r#"status == "RUNNING" && contains(tags, "prod")"#
        );
    }

    #[test]
    fn test_rewrite_leaves_operators_untouched() {
        assert_eq!(
            rewrite_embedded("length(Reservations[]) > `0`"),
            "length(reservations[]) > `0`"
        );
    }

    #[test]
    fn test_rewrite_trailing_field() {
        assert_eq!(rewrite_embedded("!PendingDeletion"), "!pendingDeletion");
        assert_eq!(rewrite_embedded("State"), "state");
    }

    #[test]
    fn test_rewrite_nested_paths() {
        assert_eq!(
            rewrite_embedded("Table.TableStatus == 'ACTIVE'"),
            "table.tableStatus == 'ACTIVE'"
        );
    }
}
