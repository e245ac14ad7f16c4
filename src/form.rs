//! Form encoding of a story for the background save endpoint.
//!
//! The story server parses the editing form field by field:
//! - `{position}__{field}` keys belong to the component at `position`
//! - a component's `type` is the kind named inside its field keys (`text`,
//!   `count`, `chart`); the last such key wins, and other fields are dropped
//! - `{position}__action*` values rebuild the component's `operations`
//! - keys containing `_color` are palette entries, prepended in arrival order
//! - any other key is a top-level story field

use serde_json::Value;

use crate::story::{DynamicElement, StoryState};

const OPERATIONS_KEY: &str = "operations";

/// Ordered form fields, posted as `application/x-www-form-urlencoded`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormState {
    pairs: Vec<(String, String)>,
}

impl FormState {
    #[must_use]
    pub fn from_story(story: &StoryState) -> Self {
        let mut form = Self::default();

        let top_level = [
            ("title", &story.title),
            ("section_name", &story.section_name),
            ("template_mode", &story.template_mode),
            ("sparql_endpoint", &story.sparql_endpoint),
        ];
        for (key, value) in top_level {
            if let Some(value) = value {
                form.push(key, value.clone());
            }
        }
        for (key, value) in &story.extra {
            if let Some(text) = scalar_text(value) {
                form.push(key, text);
            }
        }

        // Server prepends each color, so emit back to front.
        if let Some(code) = &story.color_code {
            let colors = code.colors();
            for (i, color) in colors.iter().enumerate().rev() {
                form.push(&format!("{i}_color"), (*color).to_owned());
            }
        }

        for el in &story.dynamic_elements {
            form.push_element(el);
        }

        form
    }

    fn push_element(&mut self, el: &DynamicElement) {
        let prefix = el.position;
        for (key, value) in &el.payload {
            if *key == el.kind {
                continue;
            }
            if key == OPERATIONS_KEY {
                if let Value::Array(ops) = value {
                    let actions = ops.iter().filter_map(|op| op.get("action").and_then(Value::as_str));
                    for (i, action) in actions.enumerate() {
                        self.push(&format!("{prefix}__action_{i}"), action.to_owned());
                    }
                    continue;
                }
            }
            let text = scalar_text(value).unwrap_or_else(|| value.to_string());
            self.push(&format!("{prefix}__{key}"), text);
        }

        // Field named after the kind goes last so it decides the type.
        if !el.kind.is_empty() {
            let value = el.payload.get(&el.kind).and_then(scalar_text).unwrap_or_default();
            self.push(&format!("{prefix}__{}", el.kind), value);
        }
    }

    pub fn push(&mut self, key: &str, value: String) {
        self.pairs.push((key.to_owned(), value));
    }

    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Text for scalar JSON values; `None` for null, arrays and objects.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
#[path = "form_test.rs"]
mod tests;
