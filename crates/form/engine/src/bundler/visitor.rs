//! Visitor: how config nodes become controls and how behaviors attach

use super::ConfigBundle;
use crate::control::{
    ArrayControl, Control, FieldControl, GroupChildren, GroupControl, ItemControl, ItemFactory,
    WeakControl,
};
use form_types::{ControlConfig, ControlId};
use serde_json::Value;
use std::sync::Arc;

/// Inputs to an init hook
#[derive(Clone, Copy, Debug)]
pub struct InitContext<'a> {
    pub id: &'a ControlId,
    pub config: &'a ControlConfig,
    /// Value supplied from outside the config (array items, compile seeds)
    pub seed: Option<&'a Value>,
}

impl InitContext<'_> {
    /// The seed if given, else the config value, else `Null`
    pub fn initial_value(&self) -> Value {
        self.seed
            .or(self.config.value.as_ref())
            .cloned()
            .unwrap_or(Value::Null)
    }
}

/// Strategy for both compilation passes.
///
/// Init hooks run bottom-up in the first pass and build controls; complete
/// hooks run after every child of a node has completed and wire behaviors.
/// Every hook has a default; override the ones that need to differ.
pub trait Visitor: Send + Sync {
    fn item_init(&self, cx: &InitContext<'_>) -> Arc<ItemControl> {
        ItemControl::create(cx.id.clone())
    }

    fn field_init(&self, cx: &InitContext<'_>) -> Arc<FieldControl> {
        FieldControl::create(cx.id.clone(), cx.initial_value(), cx.config.disabled)
    }

    fn group_init(&self, cx: &InitContext<'_>, children: GroupChildren) -> Arc<GroupControl> {
        GroupControl::create(cx.id.clone(), children, cx.config.disabled)
    }

    fn array_init(
        &self,
        cx: &InitContext<'_>,
        factory: ItemFactory,
        items: Vec<Control>,
    ) -> Arc<ArrayControl> {
        ArrayControl::create(cx.id.clone(), factory, items, cx.config.disabled)
    }

    fn item_complete(&self, bundle: &ConfigBundle<'_>, parent: Option<&WeakControl>) {
        link_parent(bundle, parent);
        install_item_behaviors(bundle);
    }

    fn field_complete(&self, bundle: &ConfigBundle<'_>, parent: Option<&WeakControl>) {
        link_parent(bundle, parent);
        install_field_behaviors(bundle);
    }

    fn group_complete(&self, bundle: &ConfigBundle<'_>, parent: Option<&WeakControl>) {
        link_parent(bundle, parent);
        install_field_behaviors(bundle);
    }

    fn array_complete(&self, bundle: &ConfigBundle<'_>, parent: Option<&WeakControl>) {
        link_parent(bundle, parent);
        install_field_behaviors(bundle);
    }
}

/// Visitor using every default hook
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultVisitor;

impl Visitor for DefaultVisitor {}

/// Link the bundle's control to `parent` unless already linked
pub fn link_parent(bundle: &ConfigBundle<'_>, parent: Option<&WeakControl>) {
    if let Some(parent) = parent {
        bundle.control.link_parent(parent.clone());
    }
}

/// Install hints, extras, messagers and triggers
pub fn install_item_behaviors(bundle: &ConfigBundle<'_>) {
    let ConfigBundle {
        registry,
        control,
        config,
        ..
    } = bundle;
    let item = control.item();
    item.set_hints(registry.hints_for(config, control));
    item.set_extras(registry.extras_for(config, control));
    item.set_messagers(registry.messagers_for(config, control));
    item.set_triggers(registry.triggers_for(config, control));
    tracing::debug!(control_id = %bundle.id, "Item behaviors installed");
}

/// Install hints, extras, messagers, validators, disablers and triggers
pub fn install_field_behaviors(bundle: &ConfigBundle<'_>) {
    let ConfigBundle {
        registry,
        control,
        config,
        ..
    } = bundle;
    let Some(field) = control.as_field() else {
        install_item_behaviors(bundle);
        return;
    };
    let item = control.item();
    item.set_hints(registry.hints_for(config, control));
    item.set_extras(registry.extras_for(config, control));
    item.set_messagers(registry.messagers_for(config, control));
    field.set_validators(registry.validators_for(config, control));
    field.set_disablers(registry.disablers_for(config, control));
    item.set_triggers(registry.triggers_for(config, control));
    tracing::debug!(control_id = %bundle.id, "Field behaviors installed");
}
