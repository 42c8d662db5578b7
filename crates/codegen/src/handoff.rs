//! Template hand-off boundary
//!
//! The context objects stay fully typed inside this crate; the template
//! renderer wants dynamic values. The projection is mechanical — one
//! serialization — and lives here so nothing dynamic leaks into the
//! core's logic.

use crate::GenerationSet;
use tera::Context;

/// Project a generation set into template values.
pub fn template_values(set: &GenerationSet) -> tera::Result<Context> {
    Context::from_serialize(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble;
    use crate::ServiceDocuments;

    #[test]
    fn test_generation_set_projects_into_template_values() {
        let model = serde_json::json!({
            "metadata": { "protocol": "json", "apiVersion": "2020-01-01" },
            "operations": {
                "Ping": {
                    "name": "Ping",
                    "http": { "method": "POST", "requestUri": "/" },
                    "input": { "shape": "PingRequest" }
                }
            },
            "shapes": {
                "PingRequest": { "type": "structure", "members": {} }
            }
        });
        let set = assemble(
            ServiceDocuments {
                name: "ping".to_string(),
                model,
                docs: None,
                pagination: None,
                waiters: None,
            },
            None,
        )
        .unwrap();

        let values = template_values(&set).unwrap();
        let json = values.into_json();
        assert_eq!(json["service"]["name"], "ping");
        assert_eq!(json["service"]["operations"][0]["wireName"], "Ping");
    }
}
