//! Built-in executables
//!
//! | category  | name         | params                          |
//! |-----------|--------------|---------------------------------|
//! | validator | `required`   | `message?`                      |
//! | validator | `min_length` | `min`, `message?`               |
//! | validator | `max_length` | `max`, `message?`               |
//! | hint      | `when`       | `path`, `equals?`, `hint?`      |
//! | disabler  | `when`       | `path`, `equals?`               |
//! | trigger   | `mirror`     | `path`                          |
//! | extra     | `static`     | any object, published as is     |
//! | messager  | `message`    | `message`, `code?`, any details |
//!
//! Paths are dotted and relative to the control's parent; a leading `/`
//! makes them relative to the root. Without `equals`, `when` tests the
//! target value for truthiness.

use crate::control::{Control, Validator};
use crate::registry::ExecutableRegistry;
use crate::stream::{empty, just, Source};
use form_types::{ControlConfig, ControlPath, Extras, Message, MessageMap};
use futures::StreamExt;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Registry holding every built-in executable
pub fn registry() -> ExecutableRegistry {
    ExecutableRegistry::new()
        .with_validator("required", required)
        .with_validator("min_length", min_length)
        .with_validator("max_length", max_length)
        .with_hinter("when", when)
        .with_disabler("when", when)
        .with_trigger("mirror", mirror)
        .with_extra("static", static_extras)
        .with_messager("message", message)
}

/// Resolve a builtin path from `control`
pub fn locate(control: &Control, path: &str) -> Option<Control> {
    match path.strip_prefix('/') {
        Some(absolute) => control.root().get(ControlPath::parse(absolute)),
        None => control
            .parent()
            .unwrap_or_else(|| control.clone())
            .get(ControlPath::parse(path)),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

fn length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn text_param(params: &Value, fallback: impl FnOnce() -> String) -> String {
    params
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(fallback)
}

fn required(_config: &ControlConfig, _control: &Control, params: &Value) -> Validator {
    let text = text_param(params, || "This field is required".to_string());
    Arc::new(move |control: &Control| {
        let errors = is_blank(&control.value())
            .then(|| Message::new(text.clone()).into_map("required"));
        just(errors)
    })
}

fn min_length(_config: &ControlConfig, _control: &Control, params: &Value) -> Validator {
    let min = params.get("min").and_then(Value::as_u64).unwrap_or(0) as usize;
    let text = text_param(params, || format!("Must be at least {} long", min));
    Arc::new(move |control: &Control| {
        let errors = length(&control.value())
            .filter(|&actual| actual > 0 && actual < min)
            .map(|actual| {
                Message::new(text.clone())
                    .with_detail("min", min)
                    .with_detail("actual", actual)
                    .into_map("min_length")
            });
        just(errors)
    })
}

fn max_length(_config: &ControlConfig, _control: &Control, params: &Value) -> Validator {
    let max = params.get("max").and_then(Value::as_u64).unwrap_or(u64::MAX) as usize;
    let text = text_param(params, || format!("Must be at most {} long", max));
    Arc::new(move |control: &Control| {
        let errors = length(&control.value())
            .filter(|&actual| actual > max)
            .map(|actual| {
                Message::new(text.clone())
                    .with_detail("max", max)
                    .with_detail("actual", actual)
                    .into_map("max_length")
            });
        just(errors)
    })
}

fn when(_config: &ControlConfig, control: &Control, params: &Value) -> Source<bool> {
    let Some(path) = params.get("path").and_then(Value::as_str) else {
        return just(false);
    };
    let Some(target) = locate(control, path) else {
        tracing::debug!(control_id = %control.id(), path, "Condition target not found");
        return just(false);
    };
    let expected = params.get("equals").cloned();
    target
        .value_changes()
        .map(move |value| match &expected {
            Some(expected) => &value == expected,
            None => is_truthy(&value),
        })
        .boxed()
}

fn mirror(_config: &ControlConfig, control: &Control, params: &Value) -> Source<()> {
    let Some(path) = params.get("path").and_then(Value::as_str) else {
        return empty();
    };
    let path = path.to_string();
    let this = control.downgrade();
    control
        .value_changes()
        .skip(1)
        .map(move |value| {
            let Some(target) = this.upgrade().and_then(|c| locate(&c, &path)) else {
                return;
            };
            if target.value() != value {
                if let Err(err) = target.set_value(value) {
                    tracing::debug!(control_id = %target.id(), error = %err, "Mirror rejected");
                }
            }
        })
        .boxed()
}

fn static_extras(_config: &ControlConfig, _control: &Control, params: &Value) -> Source<Extras> {
    just(params.as_object().cloned().unwrap_or_default())
}

fn message(
    _config: &ControlConfig,
    _control: &Control,
    params: &Value,
) -> Source<Option<MessageMap>> {
    let Some(text) = params.get("message").and_then(Value::as_str) else {
        return just(None);
    };
    let code = params.get("code").and_then(Value::as_str).unwrap_or("info");
    let details: Map<String, Value> = params
        .as_object()
        .map(|entries| {
            entries
                .iter()
                .filter(|(key, _)| !matches!(key.as_str(), "message" | "code"))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default();
    let message = Message {
        message: text.to_string(),
        details,
    };
    just(Some(message.into_map(code)))
}
