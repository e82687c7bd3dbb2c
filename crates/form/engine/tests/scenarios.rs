//! End-to-end scenarios: configs compiled through the bundler and driven
//! through the public control surface.

use form_engine::{deferred, just, Bundler, BundlerConfig, Control, ExecutableRegistry, Validator};
use form_types::{ControlConfig, ExecutableDefinition, FormError, Message};
use futures::StreamExt;
use serde_json::json;
use std::sync::{Arc, Once};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn builtins() -> Bundler {
    init_tracing();
    Bundler::new(Arc::new(ExecutableRegistry::with_builtins()))
}

fn required() -> ExecutableDefinition {
    ExecutableDefinition::new("required")
}

async fn wait_for<T, F>(mut changes: form_engine::Source<T>, mut done: F)
where
    F: FnMut(&T) -> bool,
{
    tokio::time::timeout(Duration::from_secs(1), async {
        while let Some(value) = changes.next().await {
            if done(&value) {
                return;
            }
        }
        panic!("stream ended before the expected value");
    })
    .await
    .expect("expected value within a second");
}

// ---------------------------------------------------------------------------
// Required field in a group
// ---------------------------------------------------------------------------

#[test]
fn test_required_field_group() {
    let config = ControlConfig::layout(vec![ControlConfig::field("name").with_validator(required())]);
    let form = builtins()
        .compile_with_value(&config, json!({"name": ""}))
        .unwrap();

    let name = form.get("name").unwrap();
    assert!(!form.status().valid);
    assert!(!name.status().valid);
    assert!(name.errors().unwrap().contains_key("required"));
    assert!(form.get_error("required", Some("name".into())).is_some());

    name.set_value(json!("x")).unwrap();
    name.validate();

    assert!(name.errors().is_none());
    assert!(name.status().valid);
    assert!(form.status().valid);
    assert!(form.status().dirty);
}

// ---------------------------------------------------------------------------
// Array resize
// ---------------------------------------------------------------------------

#[test]
fn test_array_resize_drops_items() {
    let config = ControlConfig::layout(vec![ControlConfig::array(
        "people",
        ControlConfig::layout(vec![ControlConfig::field("name").with_validator(required())]),
    )]);
    let form = builtins()
        .compile_with_value(&config, json!({"people": [{"name": "Ada"}, {"name": "Grace"}]}))
        .unwrap();

    let people = form.get("people").unwrap();
    assert_eq!(people.value().as_array().unwrap().len(), 2);

    people.as_array().unwrap().resize(1).unwrap();
    assert_eq!(people.raw_value().as_array().unwrap().len(), 1);
    assert_eq!(people.value().as_array().unwrap().len(), 1);
    assert_eq!(form.value(), json!({"people": [{"name": "Ada"}]}));
    assert!(form.get("people.1").is_none());
}

#[test]
fn test_array_growth_is_unseeded() {
    let config = ControlConfig::layout(vec![ControlConfig::array(
        "people",
        ControlConfig::layout(vec![ControlConfig::field("name").with_validator(required())]),
    )
    .with_value(json!([{"name": "Ada"}]))]);
    let form = builtins().compile(&config).unwrap();
    assert!(form.status().valid);

    form.get("people")
        .unwrap()
        .as_array()
        .unwrap()
        .resize(2)
        .unwrap();
    assert_eq!(
        form.value(),
        json!({"people": [{"name": "Ada"}, {"name": null}]})
    );
    assert!(!form.status().valid);
    assert!(form
        .get_error("required", Some("people.1.name".into()))
        .is_some());
}

// ---------------------------------------------------------------------------
// Missing registry entries
// ---------------------------------------------------------------------------

#[test]
fn test_missing_validator_is_skipped() {
    init_tracing();
    let bundler = Bundler::new(Arc::new(ExecutableRegistry::new())).with_config(BundlerConfig {
        warn_on_missing_executable: true,
        ..BundlerConfig::default()
    });
    let config = ControlConfig::layout(vec![ControlConfig::field("name").with_validator(required())]);
    let form = bundler.compile(&config).unwrap();

    let name = form.get("name").unwrap();
    assert!(name.errors().is_none());
    assert!(name.status().valid);
    assert!(form.status().valid);
}

// ---------------------------------------------------------------------------
// Config faults and shapes
// ---------------------------------------------------------------------------

#[test]
fn test_config_from_json() {
    let config: ControlConfig = serde_json::from_value(json!({
        "fields": [
            {"name": "title", "value": "Dr", "validators": [{"name": "required"}]},
            {"text": "Address"},
            {"fields": [{"name": "street"}, {"name": "city", "disabled": true}]},
            {"name": "tags", "item": {"fields": [{"name": "tag"}]}, "value": [{"tag": "a"}]}
        ]
    }))
    .unwrap();
    let form = builtins().compile(&config).unwrap();

    assert_eq!(
        form.value(),
        json!({"title": "Dr", "street": null, "tags": [{"tag": "a"}]})
    );
    assert_eq!(
        form.raw_value(),
        json!({"title": "Dr", "street": null, "city": null, "tags": [{"tag": "a"}]})
    );
    assert!(form.status().disabled);
    assert_eq!(form.as_group().unwrap().items().len(), 2);
}

#[test]
fn test_group_without_fields_fails() {
    let config: ControlConfig = serde_json::from_value(json!({
        "fields": [{"name": "nested", "kind": "group"}]
    }))
    .unwrap();
    let err = builtins().compile(&config).unwrap_err();
    match err {
        FormError::MissingFields(id) => assert_eq!(id.as_str(), "root:group/nested:group"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_group_set_value_shape() {
    let form = builtins()
        .compile(&ControlConfig::layout(vec![ControlConfig::field("a")]))
        .unwrap();
    assert!(matches!(
        form.set_value(json!(1)),
        Err(FormError::ValueShape { .. })
    ));
    assert!(form.patch_value(json!(1)).is_ok());
    assert_eq!(form.value(), json!({"a": null}));
}

// ---------------------------------------------------------------------------
// Asynchronous behaviors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_async_validator_pending_propagates() {
    init_tracing();
    let registry = ExecutableRegistry::new().with_validator("unique", |_, _, _| -> Validator {
        Arc::new(|control: &Control| {
            let taken = control.value() == json!("admin");
            deferred(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                taken.then(|| Message::new("Already taken").into_map("unique"))
            })
        })
    });
    let config = ControlConfig::layout(vec![ControlConfig::field("user")
        .with_value(json!("admin"))
        .with_validator(ExecutableDefinition::new("unique"))]);
    let form = Bundler::new(Arc::new(registry)).compile(&config).unwrap();

    assert!(form.status().pending);
    wait_for(form.status_changes(), |status| !status.pending).await;
    assert!(!form.status().valid);
    assert!(form.get_error("unique", Some("user".into())).is_some());
}

#[tokio::test]
async fn test_when_hint_follows_sibling() {
    let config = ControlConfig::layout(vec![
        ControlConfig::field("has_company").with_value(json!(false)),
        ControlConfig::field("company").with_hint(
            ExecutableDefinition::new("when")
                .with_params(json!({"path": "has_company", "equals": false, "hint": "hidden"})),
        ),
    ]);
    let form = builtins().compile(&config).unwrap();
    let company = form.get("company").unwrap();
    assert!(company.item().is_hidden());

    form.get("has_company").unwrap().set_value(json!(true)).unwrap();
    wait_for(company.flag_changes(), |flags| flags.get("hidden") == Some(&false)).await;
    assert!(!company.item().is_hidden());
}

#[tokio::test]
async fn test_when_disabler_updates_group_value() {
    let config = ControlConfig::layout(vec![
        ControlConfig::field("subscribe").with_value(json!(false)),
        ControlConfig::field("email")
            .with_value(json!("a@b.c"))
            .with_disabler(
                ExecutableDefinition::new("when")
                    .with_params(json!({"path": "/subscribe", "equals": false})),
            ),
    ]);
    let form = builtins().compile(&config).unwrap();
    assert_eq!(form.value(), json!({"subscribe": false}));

    form.get("subscribe").unwrap().set_value(json!(true)).unwrap();
    wait_for(form.value_changes(), |value| value.get("email").is_some()).await;
    assert_eq!(form.value(), json!({"subscribe": true, "email": "a@b.c"}));
}

#[tokio::test]
async fn test_dispose_completes_streams() {
    let form = builtins()
        .compile(&ControlConfig::layout(vec![ControlConfig::field("a")]))
        .unwrap();
    let a = form.get("a").unwrap();
    let mut values = a.value_changes();
    let mut flags = a.flag_changes();
    assert!(values.next().await.is_some());
    assert!(flags.next().await.is_some());

    form.dispose();
    assert!(values.next().await.is_none());
    assert!(flags.next().await.is_none());
}

#[test]
fn test_switching_hints_replaces_pipeline() {
    let form = builtins()
        .compile(&ControlConfig::layout(vec![ControlConfig::field("a")]))
        .unwrap();
    let a = form.get("a").unwrap();
    a.item()
        .set_hints(vec![just(("readonly".to_string(), true))]);
    assert_eq!(a.flags().get("readonly"), Some(&true));

    a.item().set_hints(Vec::new());
    assert!(a.flags().get("readonly").is_none());
    assert_eq!(a.flags().get("hidden"), Some(&false));
}
