//! Group node: named children

use super::{Control, FieldControl, WeakControl};
use form_types::{ControlId, FormError, FormResult, Status};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Children handed to a group at construction
#[derive(Clone, Default)]
pub struct GroupChildren {
    /// Value-bearing children, in declaration order
    pub controls: IndexMap<String, Control>,
    /// Display items and flattened layout nodes
    pub items: Vec<Control>,
}

impl GroupChildren {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_control(mut self, key: impl Into<String>, control: impl Into<Control>) -> Self {
        self.controls.insert(key.into(), control.into());
        self
    }

    pub fn with_item(mut self, item: impl Into<Control>) -> Self {
        self.items.push(item.into());
        self
    }
}

/// A node whose value is an object keyed by its children.
///
/// A child is left out of the value while its own disabled flag is set,
/// unless the group itself is disabled, in which case every child counts.
/// The published status is the group's local status merged with every
/// child's published status.
pub struct GroupControl {
    pub(crate) field: FieldControl,
    controls: IndexMap<String, Control>,
    items: Vec<Control>,
}

impl GroupControl {
    pub fn create(id: ControlId, children: GroupChildren, disabled: bool) -> Arc<Self> {
        tracing::debug!(
            control_id = %id,
            controls = children.controls.len(),
            items = children.items.len(),
            "Group control created"
        );
        let group = Arc::new_cyclic(|weak| Self {
            field: FieldControl::new(id, Value::Null, disabled, WeakControl::Group(weak.clone())),
            controls: children.controls,
            items: children.items,
        });

        let this = WeakControl::Group(Arc::downgrade(&group));
        for child in group.controls.values().chain(&group.items) {
            child.link_parent(this.clone());
        }

        let value = group.reduce();
        group.field.set_initial_value(value.clone());
        group.field.publish_value(value);
        group.field.open_gate();
        group
    }

    pub fn as_field(&self) -> &FieldControl {
        &self.field
    }

    pub fn id(&self) -> &ControlId {
        self.field.id()
    }

    pub fn control(&self, key: &str) -> Option<&Control> {
        self.controls.get(key)
    }

    pub fn controls(&self) -> &IndexMap<String, Control> {
        &self.controls
    }

    pub fn items(&self) -> &[Control] {
        &self.items
    }

    /// Whether `key` names a child whose own disabled flag is clear
    pub fn contains(&self, key: &str) -> bool {
        self.controls.get(key).is_some_and(Control::is_enabled)
    }

    pub fn value(&self) -> Value {
        self.field.value()
    }

    /// Every child's raw value, disabled children included
    pub fn raw_value(&self) -> Value {
        Value::Object(
            self.controls
                .iter()
                .map(|(key, child)| (key.clone(), child.raw_value()))
                .collect(),
        )
    }

    fn reduce(&self) -> Value {
        let include_all = !self.field.is_enabled();
        let entries: Map<String, Value> = self
            .controls
            .iter()
            .filter(|(_, child)| include_all || child.is_enabled())
            .map(|(key, child)| (key.clone(), child.value()))
            .collect();
        Value::Object(entries)
    }

    /// Route each key of `value` to the matching child.
    ///
    /// Unknown keys are ignored, as are children without a key in `value`.
    pub fn set_value(&self, value: Value) -> FormResult<()> {
        let Value::Object(entries) = value else {
            return Err(FormError::ValueShape {
                id: self.id().clone(),
                expected: "object",
            });
        };
        for (key, child_value) in entries {
            if let Some(child) = self.controls.get(&key) {
                child.set_value(child_value)?;
            }
        }
        self.field.refresh();
        Ok(())
    }

    /// Like `set_value`, patching children. A non-object value is ignored.
    pub fn patch_value(&self, value: Value) -> FormResult<()> {
        let Value::Object(entries) = value else {
            return Ok(());
        };
        for (key, child_value) in entries {
            if let Some(child) = self.controls.get(&key) {
                child.patch_value(child_value)?;
            }
        }
        self.field.refresh();
        Ok(())
    }

    pub fn reset(&self) -> FormResult<()> {
        for child in self.controls.values() {
            child.reset()?;
        }
        self.field.clear_interaction();
        self.field.refresh();
        Ok(())
    }

    pub(crate) fn update(&self) {
        if !self.field.is_initialized() {
            return;
        }
        self.field.publish_value(self.reduce());
        let children: Vec<Status> = self.controls.values().map(Control::status).collect();
        self.field
            .publish_status(Status::aggregate(self.field.local_status(), &children));
        self.field.item.bubble();
    }

    pub(crate) fn dispose(&self) {
        for child in self.controls.values().chain(&self.items) {
            child.dispose();
        }
        self.field.dispose();
        tracing::debug!(control_id = %self.id(), "Group disposed");
    }
}
