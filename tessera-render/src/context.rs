//! Render context assembly.

use serde_json::{Map, Value};

use tessera_core::{ComponentConfig, SharedContext, VariantRecord};

use crate::error::RenderError;

/// Shallow-merge the shared context, the component record's `context` and
/// the variant's `context`, later layers winning on key collisions.
pub fn build_context(
    shared: Option<&SharedContext>,
    component: &ComponentConfig,
    variant: &VariantRecord,
) -> Result<Value, RenderError> {
    let mut merged = Map::new();
    if let Some(shared) = shared {
        merge_into(&mut merged, serde_json::to_value(shared)?);
    }
    merge_into(&mut merged, serde_json::to_value(&component.context)?);
    merge_into(&mut merged, serde_json::to_value(&variant.context)?);
    Ok(Value::Object(merged))
}

fn merge_into(target: &mut Map<String, Value>, layer: Value) {
    if let Value::Object(map) = layer {
        target.extend(map);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> ComponentConfig {
        serde_json::from_value(json!({
            "title": "Button",
            "context": {"type": "component", "config": {"tone": "base"}, "resources": []},
            "variants": [{
                "name": "default",
                "label": "Button",
                "order": 0,
                "context": {
                    "config": {"tone": "loud"},
                    "parameters": {"size": "l"},
                    "request": null,
                    "component": "Vendor\\Button"
                }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn variant_layer_wins() {
        let config = record();
        let shared = SharedContext {
            source: "/var/www".into(),
            source_kind: "cli".into(),
        };
        let context = build_context(Some(&shared), &config, &config.variants[0]).unwrap();

        assert_eq!(context["source"], json!("/var/www"));
        assert_eq!(context["sourceKind"], json!("cli"));
        assert_eq!(context["type"], json!("component"));
        assert_eq!(context["config"], json!({"tone": "loud"}));
        assert_eq!(context["parameters"], json!({"size": "l"}));
        assert_eq!(context["component"], json!("Vendor\\Button"));
        assert_eq!(context["resources"], json!([]));
    }

    #[test]
    fn shared_layer_is_optional() {
        let config = record();
        let context = build_context(None, &config, &config.variants[0]).unwrap();
        assert!(context.get("source").is_none());
    }
}
