//! Endpoint table resolution
//!
//! Flattens the global endpoints document into a per-service table:
//! partition defaults, per-region endpoints, and the partition-wide
//! endpoint where one is declared. Only regions that are known region
//! identifiers of their partition, or that are explicitly enumerated as
//! the partition endpoint, survive the filter.

use serde::Serialize;
use stratus_model::endpoints::{EndpointDef, EndpointsModel, Partition};

/// Resolved endpoint facts for one service.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointTable {
    pub endpoints: Vec<EndpointContext>,
}

/// One concrete endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointContext {
    pub partition: String,
    pub region: String,
    pub hostname: Option<String>,
    /// Region to sign with when it differs from the endpoint's region.
    pub signing_region: Option<String>,
    /// Service name to sign with when it differs from the model's.
    pub signing_service: Option<String>,
    /// True for the entry that serves the whole partition.
    pub partition_default: bool,
}

/// Build the endpoint table for the service with the given endpoint
/// prefix. A missing endpoints document yields an empty table.
pub fn resolve_endpoints(prefix: &str, model: &EndpointsModel) -> EndpointTable {
    let mut table = EndpointTable::default();

    for partition in &model.partitions {
        let Some(service) = partition.services.get(prefix) else {
            continue;
        };

        for (region, def) in &service.endpoints {
            let partition_default = service.partition_endpoint.as_deref() == Some(region.as_str());
            if !partition.regions.contains_key(region) && !partition_default {
                continue;
            }

            let hostname = def
                .hostname
                .clone()
                .or_else(|| service.defaults.as_ref().and_then(|d| d.hostname.clone()))
                .or_else(|| partition.defaults.hostname.clone())
                .map(|pattern| substitute(&pattern, prefix, region, partition));

            let scope = def
                .credential_scope
                .as_ref()
                .or_else(|| scope_of(service.defaults.as_ref()))
                .or_else(|| partition.defaults.credential_scope.as_ref());

            table.endpoints.push(EndpointContext {
                partition: partition.partition.clone(),
                region: region.clone(),
                hostname,
                signing_region: scope.and_then(|s| s.region.clone()),
                signing_service: scope.and_then(|s| s.service.clone()),
                partition_default,
            });
        }
    }

    table
}

fn scope_of(def: Option<&EndpointDef>) -> Option<&stratus_model::endpoints::CredentialScope> {
    def.and_then(|d| d.credential_scope.as_ref())
}

fn substitute(pattern: &str, service: &str, region: &str, partition: &Partition) -> String {
    pattern
        .replace("{service}", service)
        .replace("{region}", region)
        .replace("{dnsSuffix}", partition.dns_suffix.as_deref().unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> EndpointsModel {
        serde_json::from_str(
            r#"{
                "partitions": [
                    {
                        "partition": "cloud",
                        "dnsSuffix": "example.com",
                        "defaults": { "hostname": "{service}.{region}.{dnsSuffix}" },
                        "regions": {
                            "north-1": { "description": "North 1" },
                            "south-1": { "description": "South 1" }
                        },
                        "services": {
                            "ledger": {
                                "endpoints": {
                                    "north-1": {},
                                    "south-1": { "hostname": "ledger.alt.example.com" },
                                    "museum-9": {}
                                }
                            },
                            "accounts": {
                                "partitionEndpoint": "cloud-global",
                                "isRegionalized": false,
                                "endpoints": {
                                    "cloud-global": {
                                        "hostname": "accounts.example.com",
                                        "credentialScope": { "region": "north-1" }
                                    }
                                }
                            }
                        }
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_regions_are_filtered() {
        let table = resolve_endpoints("ledger", &model());
        let regions: Vec<&str> = table.endpoints.iter().map(|e| e.region.as_str()).collect();
        // "museum-9" is neither a known region nor a partition endpoint.
        assert_eq!(regions, vec!["north-1", "south-1"]);
    }

    #[test]
    fn test_default_hostname_pattern_is_substituted() {
        let table = resolve_endpoints("ledger", &model());
        assert_eq!(
            table.endpoints[0].hostname.as_deref(),
            Some("ledger.north-1.example.com")
        );
        assert_eq!(
            table.endpoints[1].hostname.as_deref(),
            Some("ledger.alt.example.com")
        );
    }

    #[test]
    fn test_partition_endpoint_survives_the_filter() {
        let table = resolve_endpoints("accounts", &model());
        assert_eq!(table.endpoints.len(), 1);
        let global = &table.endpoints[0];
        assert!(global.partition_default);
        assert_eq!(global.signing_region.as_deref(), Some("north-1"));
    }

    #[test]
    fn test_service_absent_from_partition() {
        assert!(resolve_endpoints("unknown", &model()).endpoints.is_empty());
    }
}
