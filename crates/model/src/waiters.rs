//! Wait-condition side table

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Root of a wait-condition document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaiterModel {
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub waiters: IndexMap<String, WaiterRule>,
}

/// One named wait condition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiterRule {
    #[serde(default)]
    pub delay: u32,
    #[serde(default)]
    pub max_attempts: u32,
    pub operation: String,
    #[serde(default)]
    pub acceptors: Vec<RawAcceptor>,
}

/// One acceptor: a target state plus the condition that selects it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAcceptor {
    pub state: String,
    pub matcher: String,
    #[serde(default)]
    pub argument: Option<String>,
    #[serde(default)]
    pub expected: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_waiter_document() {
        let json = r#"{
            "version": 2,
            "waiters": {
                "LedgerActive": {
                    "delay": 10,
                    "maxAttempts": 36,
                    "operation": "DescribeLedger",
                    "acceptors": [
                        { "state": "success", "matcher": "path", "argument": "State", "expected": "ACTIVE" },
                        { "state": "failure", "matcher": "error", "expected": "ResourceNotFoundException" },
                        { "state": "retry", "matcher": "status", "expected": 404 }
                    ]
                }
            }
        }"#;
        let model: WaiterModel = serde_json::from_str(json).unwrap();
        let waiter = &model.waiters["LedgerActive"];
        assert_eq!(waiter.delay, 10);
        assert_eq!(waiter.max_attempts, 36);
        assert_eq!(waiter.acceptors.len(), 3);
        assert_eq!(waiter.acceptors[2].expected, serde_json::json!(404));
    }
}
