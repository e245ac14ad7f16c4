//! Test-only stand-in for the story server's form handling.

use std::collections::BTreeSet;

use serde_json::{Map, Value, json};

const TYPED_FIELDS: [&str; 3] = ["text", "count", "chart"];

/// Rebuild a story document from posted form pairs using the story server's
/// rules. Fields of unrecognized kinds are dropped, and such elements come
/// back without a `type`.
pub(crate) fn rebuild_story(pairs: &[(String, String)]) -> Value {
    let mut story = Map::new();
    let mut positions = BTreeSet::new();
    let mut colors: Vec<Value> = Vec::new();

    for (key, value) in pairs {
        if key.contains("__") {
            if let Some(pos) = element_position(key) {
                positions.insert(pos);
            }
        } else if key.contains("_color") {
            colors.insert(0, Value::String(value.clone()));
        } else {
            story.insert(key.clone(), Value::String(value.clone()));
        }
    }
    story.insert("color_code".into(), Value::Array(colors));

    let elements: Vec<Value> = positions
        .into_iter()
        .map(|pos| {
            let mut element = Map::new();
            element.insert("position".into(), json!(pos));
            let mut operations = Vec::new();
            for (key, value) in pairs {
                if element_position(key) != Some(pos) {
                    continue;
                }
                let Some((_, field)) = key.split_once("__") else { continue };
                if let Some(kind) = TYPED_FIELDS.into_iter().find(|t| key.contains(t)) {
                    element.insert("type".into(), json!(kind));
                    element.insert(field.to_owned(), json!(value));
                } else if key.contains("action") {
                    let param = match value.as_str() {
                        "count" => json!("label"),
                        "sort" => json!("another"),
                        _ => Value::Null,
                    };
                    let mut op = Map::new();
                    op.insert("action".into(), json!(value));
                    if !param.is_null() {
                        op.insert("param".into(), param);
                    }
                    operations.push(Value::Object(op));
                }
            }
            element.insert("operations".into(), Value::Array(operations));
            Value::Object(element)
        })
        .collect();
    story.insert("dynamic_elements".into(), Value::Array(elements));

    Value::Object(story)
}

fn element_position(key: &str) -> Option<usize> {
    key.split_once("__").and_then(|(pos, _)| pos.parse().ok())
}
