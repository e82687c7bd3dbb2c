//! Array node: indexed children built by a factory

use super::{Control, FieldControl, WeakControl};
use form_types::{ControlId, FormError, FormResult, Status};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

/// What an item factory is asked to build
#[derive(Clone, Debug)]
pub struct ItemSeed {
    /// Position the new child will take
    pub index: usize,
    /// Initial value, if any
    pub value: Option<Value>,
    /// The array the child belongs to
    pub parent: WeakControl,
}

/// Builds array children
pub type ItemFactory = Arc<dyn Fn(ItemSeed) -> FormResult<Control> + Send + Sync>;

/// A node whose value is the list of its children's values
pub struct ArrayControl {
    pub(crate) field: FieldControl,
    children: RwLock<Vec<Control>>,
    factory: ItemFactory,
    /// Raw values of the children at creation, disabled descendants included
    initial_items: Vec<Value>,
}

impl ArrayControl {
    pub fn create(
        id: ControlId,
        factory: ItemFactory,
        children: Vec<Control>,
        disabled: bool,
    ) -> Arc<Self> {
        tracing::debug!(control_id = %id, len = children.len(), "Array control created");
        let initial_items = children.iter().map(Control::raw_value).collect();
        let array = Arc::new_cyclic(|weak| Self {
            field: FieldControl::new(id, Value::Null, disabled, WeakControl::Array(weak.clone())),
            children: RwLock::new(children),
            factory,
            initial_items,
        });

        let this = array.this();
        for child in array.controls() {
            child.link_parent(this.clone());
        }

        let value = array.reduce();
        array.field.set_initial_value(value.clone());
        array.field.publish_value(value);
        array.field.open_gate();
        array
    }

    fn this(&self) -> WeakControl {
        self.field.item.this().clone()
    }

    pub fn as_field(&self) -> &FieldControl {
        &self.field
    }

    pub fn id(&self) -> &ControlId {
        self.field.id()
    }

    pub fn len(&self) -> usize {
        self.children.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.read().is_empty()
    }

    pub fn at(&self, index: usize) -> Option<Control> {
        self.children.read().get(index).cloned()
    }

    /// Snapshot of the children
    pub fn controls(&self) -> Vec<Control> {
        self.children.read().clone()
    }

    pub fn value(&self) -> Value {
        self.field.value()
    }

    pub fn raw_value(&self) -> Value {
        Value::Array(self.controls().iter().map(Control::raw_value).collect())
    }

    fn reduce(&self) -> Value {
        Value::Array(self.controls().iter().map(Control::value).collect())
    }

    fn make(&self, index: usize, value: Option<Value>) -> FormResult<Control> {
        let parent = self.this();
        let child = (self.factory)(ItemSeed {
            index,
            value,
            parent: parent.clone(),
        })?;
        child.link_parent(parent);
        Ok(child)
    }

    /// Append a child built from `value`
    pub fn push(&self, value: Option<Value>) -> FormResult<Control> {
        let child = self.make(self.len(), value)?;
        self.children.write().push(child.clone());
        self.field.refresh();
        Ok(child)
    }

    pub fn insert(&self, index: usize, value: Option<Value>) -> FormResult<Control> {
        let len = self.len();
        if index > len {
            return Err(FormError::IndexOutOfBounds {
                id: self.id().clone(),
                index,
                len,
            });
        }
        let child = self.make(index, value)?;
        {
            let mut children = self.children.write();
            let at = index.min(children.len());
            children.insert(at, child.clone());
        }
        self.field.refresh();
        Ok(child)
    }

    /// Remove and dispose the child at `index`
    pub fn remove_at(&self, index: usize) -> FormResult<()> {
        let removed = {
            let mut children = self.children.write();
            if index >= children.len() {
                return Err(FormError::IndexOutOfBounds {
                    id: self.id().clone(),
                    index,
                    len: children.len(),
                });
            }
            children.remove(index)
        };
        removed.dispose();
        self.field.refresh();
        Ok(())
    }

    /// Rebuild every child from the factory.
    ///
    /// Positions that existed before are seeded with their current raw value,
    /// so disabled descendants keep theirs; new positions get no seed. The
    /// old children are disposed.
    pub fn resize(&self, len: usize) -> FormResult<()> {
        let current = self.controls();
        let seeds = (0..len)
            .map(|index| current.get(index).map(Control::raw_value))
            .collect();
        self.rebuild(seeds)
    }

    /// Replace the children with one fresh child per seed
    fn rebuild(&self, seeds: Vec<Option<Value>>) -> FormResult<()> {
        let len = seeds.len();
        let mut fresh = Vec::with_capacity(len);
        for (index, seed) in seeds.into_iter().enumerate() {
            match self.make(index, seed) {
                Ok(child) => fresh.push(child),
                Err(err) => {
                    fresh.iter().for_each(Control::dispose);
                    return Err(err);
                }
            }
        }

        let old = std::mem::replace(&mut *self.children.write(), fresh);
        for child in &old {
            child.dispose();
        }
        tracing::trace!(control_id = %self.id(), from = old.len(), to = len, "Array rebuilt");
        self.field.refresh();
        Ok(())
    }

    /// Resize to the length of `value`, then set each child
    pub fn set_value(&self, value: Value) -> FormResult<()> {
        let Value::Array(elements) = value else {
            return Err(FormError::ValueShape {
                id: self.id().clone(),
                expected: "array",
            });
        };
        self.resize(elements.len())?;
        for (child, element) in self.controls().iter().zip(elements) {
            child.set_value(element)?;
        }
        self.field.refresh();
        Ok(())
    }

    /// Resize to the length of `value`, then patch each child. A non-array
    /// value is ignored.
    pub fn patch_value(&self, value: Value) -> FormResult<()> {
        let Value::Array(elements) = value else {
            return Ok(());
        };
        self.resize(elements.len())?;
        for (child, element) in self.controls().iter().zip(elements) {
            child.patch_value(element)?;
        }
        self.field.refresh();
        Ok(())
    }

    /// Rebuild the children the array was created with, then reset them
    pub fn reset(&self) -> FormResult<()> {
        self.rebuild(self.initial_items.iter().cloned().map(Some).collect())?;
        for child in self.controls() {
            child.reset()?;
        }
        self.field.clear_interaction();
        self.field.refresh();
        Ok(())
    }

    /// Remove every child
    pub fn clear(&self) {
        let old = std::mem::take(&mut *self.children.write());
        for child in &old {
            child.dispose();
        }
        self.field.mark_interaction();
        self.field.refresh();
    }

    pub(crate) fn update(&self) {
        if !self.field.is_initialized() {
            return;
        }
        let children = self.controls();
        self.field
            .publish_value(Value::Array(children.iter().map(Control::value).collect()));
        let statuses: Vec<Status> = children.iter().map(Control::status).collect();
        self.field
            .publish_status(Status::aggregate(self.field.local_status(), &statuses));
        self.field.item.bubble();
    }

    pub(crate) fn dispose(&self) {
        let children = std::mem::take(&mut *self.children.write());
        for child in &children {
            child.dispose();
        }
        self.field.dispose();
        tracing::debug!(control_id = %self.id(), "Array disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{GroupChildren, GroupControl};
    use form_types::{ControlKind, PathSegment};
    use serde_json::json;

    fn array_id() -> ControlId {
        ControlId::root("root", ControlKind::Array)
    }

    /// Items are `{name}` groups; unseeded items start empty
    fn factory() -> ItemFactory {
        Arc::new(|seed: ItemSeed| {
            let id = array_id().child(&PathSegment::Index(seed.index), ControlKind::Group);
            let name = seed
                .value
                .as_ref()
                .and_then(|v| v.get("name"))
                .cloned()
                .unwrap_or_else(|| json!(""));
            let field = FieldControl::create(
                id.child(&PathSegment::from("name"), ControlKind::Field),
                name,
                false,
            );
            let children = GroupChildren::new().with_control("name", field);
            Ok(Control::Group(GroupControl::create(id, children, false)))
        })
    }

    /// Items are `{name, note}` groups with `note` disabled
    fn noted_factory() -> ItemFactory {
        Arc::new(|seed: ItemSeed| {
            let id = array_id().child(&PathSegment::Index(seed.index), ControlKind::Group);
            let seeded = |key: &str, default: Value| {
                seed.value
                    .as_ref()
                    .and_then(|v| v.get(key))
                    .cloned()
                    .unwrap_or(default)
            };
            let name = FieldControl::create(
                id.child(&PathSegment::from("name"), ControlKind::Field),
                seeded("name", json!("")),
                false,
            );
            let note = FieldControl::create(
                id.child(&PathSegment::from("note"), ControlKind::Field),
                seeded("note", json!("default")),
                true,
            );
            let children = GroupChildren::new()
                .with_control("name", name)
                .with_control("note", note);
            Ok(Control::Group(GroupControl::create(id, children, false)))
        })
    }

    fn people(names: &[&str]) -> Control {
        build(factory(), names)
    }

    fn notes(names: &[&str]) -> Control {
        build(noted_factory(), names)
    }

    fn build(factory: ItemFactory, names: &[&str]) -> Control {
        let children = names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                factory(ItemSeed {
                    index,
                    value: Some(json!({ "name": name })),
                    parent: WeakControl::Item(std::sync::Weak::new()),
                })
                .unwrap()
            })
            .collect();
        Control::Array(ArrayControl::create(array_id(), factory, children, false))
    }

    #[test]
    fn test_initial_value() {
        let array = people(&["a", "b"]);
        assert_eq!(array.value(), json!([{"name": "a"}, {"name": "b"}]));
        let a = array.as_array().unwrap();
        assert_eq!(a.len(), 2);
        assert!(a.at(0).unwrap().parent().unwrap().ptr_eq(&array));
    }

    #[test]
    fn test_resize_truncates_and_grows() {
        let array = people(&["a", "b"]);
        let a = array.as_array().unwrap();

        a.resize(1).unwrap();
        assert_eq!(array.value(), json!([{"name": "a"}]));

        a.resize(3).unwrap();
        assert_eq!(
            array.value(),
            json!([{"name": "a"}, {"name": ""}, {"name": ""}])
        );
        assert!(a.at(2).unwrap().parent().unwrap().ptr_eq(&array));
    }

    #[test]
    fn test_push_insert_remove() {
        let array = people(&["a"]);
        let a = array.as_array().unwrap();

        a.push(Some(json!({"name": "c"}))).unwrap();
        a.insert(1, Some(json!({"name": "b"}))).unwrap();
        assert_eq!(
            array.value(),
            json!([{"name": "a"}, {"name": "b"}, {"name": "c"}])
        );

        let err = a.insert(5, None).unwrap_err();
        assert!(matches!(err, FormError::IndexOutOfBounds { index: 5, len: 3, .. }));

        let removed = a.at(0).unwrap();
        a.remove_at(0).unwrap();
        assert_eq!(array.value(), json!([{"name": "b"}, {"name": "c"}]));
        assert!(removed.get("name").unwrap().set_value(json!("x")).is_ok());
        assert_eq!(removed.get("name").unwrap().value(), json!("a"));

        assert!(a.remove_at(2).is_err());
    }

    #[test]
    fn test_set_value_resizes() {
        let array = people(&["a", "b"]);
        array
            .set_value(json!([{"name": "x"}, {"name": "y"}, {"name": "z"}]))
            .unwrap();
        assert_eq!(
            array.value(),
            json!([{"name": "x"}, {"name": "y"}, {"name": "z"}])
        );
        assert!(array.status().dirty);

        let err = array.set_value(json!({"name": "x"})).unwrap_err();
        assert!(matches!(err, FormError::ValueShape { expected: "array", .. }));

        array.patch_value(json!(null)).unwrap();
        assert_eq!(array.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_reset_restores_length() {
        let array = people(&["a", "b"]);
        let a = array.as_array().unwrap();
        a.push(None).unwrap();
        a.at(0).unwrap().get("name").unwrap().set_value(json!("changed")).unwrap();

        array.reset().unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(array.value(), array.initial_value());
        assert_eq!(array.value(), json!([{"name": "a"}, {"name": "b"}]));
        assert!(!array.status().dirty);
        assert!(!array.status().touched);
    }

    #[test]
    fn test_resize_keeps_disabled_children() {
        let array = notes(&["a", "b"]);
        let a = array.as_array().unwrap();
        a.at(0).unwrap().get("note").unwrap().set_value(json!("kept")).unwrap();

        a.resize(1).unwrap();
        let first = a.at(0).unwrap();
        assert_eq!(first.get("note").unwrap().value(), json!("kept"));
        assert_eq!(first.raw_value(), json!({"name": "a", "note": "kept"}));
        assert_eq!(array.value(), json!([{"name": "a"}]));
    }

    #[test]
    fn test_reset_restores_disabled_children() {
        let array = notes(&["a"]);
        let a = array.as_array().unwrap();
        a.at(0).unwrap().get("note").unwrap().set_value(json!("changed")).unwrap();
        a.push(None).unwrap();

        array.reset().unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a.at(0).unwrap().get("note").unwrap().value(), json!("default"));
        assert_eq!(array.value(), array.initial_value());
    }

    #[test]
    fn test_clear_marks_interaction() {
        let array = people(&["a", "b"]);
        array.as_array().unwrap().clear();
        assert_eq!(array.value(), json!([]));
        assert!(array.status().dirty && array.status().touched);
    }

    #[test]
    fn test_get_by_index() {
        let array = people(&["a", "b"]);
        assert_eq!(array.get("1.name").unwrap().value(), json!("b"));
        assert!(array.get("2.name").is_none());
        assert!(array.get("x").is_none());
    }
}
