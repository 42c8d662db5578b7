//! Endpoint side table
//!
//! The endpoints document is global (not per-service): a list of
//! partitions, each with partition-wide defaults, a region description
//! map, and per-service endpoint maps.

use indexmap::IndexMap;
use serde::Deserialize;

/// Root of an endpoints document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointsModel {
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub partitions: Vec<Partition>,
}

/// One partition (a disjoint region universe).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    #[serde(default)]
    pub partition: String,
    #[serde(default)]
    pub partition_name: Option<String>,
    #[serde(default)]
    pub dns_suffix: Option<String>,
    #[serde(default)]
    pub defaults: EndpointDef,
    #[serde(default)]
    pub regions: IndexMap<String, RegionInfo>,
    #[serde(default)]
    pub services: IndexMap<String, ServiceEndpoints>,
}

/// Human description of a region.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionInfo {
    #[serde(default)]
    pub description: Option<String>,
}

/// Endpoint facts of one service inside one partition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoints {
    #[serde(default)]
    pub defaults: Option<EndpointDef>,
    #[serde(default)]
    pub endpoints: IndexMap<String, EndpointDef>,
    #[serde(default)]
    pub is_regionalized: Option<bool>,
    /// Name of the endpoint entry that serves the whole partition.
    #[serde(default)]
    pub partition_endpoint: Option<String>,
}

/// One endpoint description.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDef {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub protocols: Vec<String>,
    #[serde(default)]
    pub credential_scope: Option<CredentialScope>,
    #[serde(default)]
    pub signature_versions: Vec<String>,
}

/// Region/service override for request signing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialScope {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoints_document() {
        let json = r#"{
            "version": 3,
            "partitions": [
                {
                    "partition": "cloud",
                    "partitionName": "Cloud Standard",
                    "dnsSuffix": "example.com",
                    "defaults": {
                        "hostname": "{service}.{region}.{dnsSuffix}",
                        "protocols": ["https"]
                    },
                    "regions": {
                        "north-1": { "description": "North 1" },
                        "south-1": { "description": "South 1" }
                    },
                    "services": {
                        "ledger": {
                            "endpoints": {
                                "north-1": {},
                                "south-1": { "hostname": "ledger.south-1.alt.example.com" }
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
        }"#;
        let model: EndpointsModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.partitions.len(), 1);
        let partition = &model.partitions[0];
        assert_eq!(partition.regions.len(), 2);
        let accounts = &partition.services["accounts"];
        assert_eq!(accounts.partition_endpoint.as_deref(), Some("cloud-global"));
        assert_eq!(accounts.is_regionalized, Some(false));
    }
}
