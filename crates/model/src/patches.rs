//! Built-in correction table
//!
//! One entry per service whose published model is known to be
//! inconsistent. Corrections are applied in list order before
//! resolution; a service without an entry is untouched. Keep entries
//! precise: a correction that no longer matches the document must fail,
//! not guess.

use crate::patch::{Patch, PatchOp};
use serde_json::json;

/// Corrections for one service, by model service name.
pub fn patches_for(service: &str) -> Vec<Patch> {
    match service {
        "messaging" => vec![
            // The 2019-11 model shipped QueueLimitExceeded twice in the
            // CreateQueue error list.
            Patch::new(
                "drop duplicate CreateQueue error entry",
                &["operations", "CreateQueue", "errors"],
                PatchOp::RemoveFromList {
                    value: json!({ "shape": "QueueLimitExceeded" }),
                },
            ),
        ],
        "objectstore" => vec![
            // Size is documented and served as a long; the model still
            // says integer.
            Patch::new(
                "ObjectSize is a long",
                &["shapes", "ObjectSize", "type"],
                PatchOp::Replace {
                    expect: json!("integer"),
                    with: json!("long"),
                },
            ),
            // The GLACIER_IR storage class is live but missing from the
            // published enumeration.
            Patch::new(
                "add missing storage class",
                &["shapes", "StorageClass", "enum"],
                PatchOp::AddToList {
                    value: json!("GLACIER_IR"),
                },
            ),
        ],
        "compute" => vec![
            // The wire sends lower-case "instanceId"; the model's
            // locationName disagrees with every recorded response.
            Patch::new(
                "fix InstanceId locationName casing",
                &[
                    "shapes",
                    "Instance",
                    "members",
                    "InstanceId",
                ],
                PatchOp::InsertIntoMap {
                    key: "locationName".to_string(),
                    value: json!("instanceId"),
                },
            ),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpatched_services_have_no_entries() {
        assert!(patches_for("ledger").is_empty());
    }

    #[test]
    fn test_every_entry_is_at_most_four_hops_deep() {
        for service in ["messaging", "objectstore", "compute"] {
            for patch in patches_for(service) {
                assert!(patch.path.len() <= 4, "{} is too deep", patch.name);
            }
        }
    }
}
