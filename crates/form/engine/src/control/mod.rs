//! The control tree
//!
//! [`Control`] is the handle every node is reached through. It wraps one of
//! the four node types in an `Arc` and dispatches the polymorphic
//! operations (`update`, `set_value`, `reset`, `dispose`, ...) to it.
//! Parents own their children; a child points back at its parent through a
//! [`WeakControl`] that is set once and never reassigned.

mod array;
mod field;
mod group;
mod item;

pub use array::*;
pub use field::*;
pub use group::*;
pub use item::*;

use crate::stream::{just, Source};
use form_types::{
    ControlId, ControlKind, ControlPath, Extras, Flags, FormError, FormResult, Message,
    MessageMap, Status,
};
use serde_json::Value;
use std::sync::{Arc, Weak};

/// Handle to a node of the control tree
#[derive(Clone)]
pub enum Control {
    Item(Arc<ItemControl>),
    Field(Arc<FieldControl>),
    Group(Arc<GroupControl>),
    Array(Arc<ArrayControl>),
}

/// Non-owning handle to a node
#[derive(Clone)]
pub enum WeakControl {
    Item(Weak<ItemControl>),
    Field(Weak<FieldControl>),
    Group(Weak<GroupControl>),
    Array(Weak<ArrayControl>),
}

impl WeakControl {
    pub fn upgrade(&self) -> Option<Control> {
        match self {
            WeakControl::Item(w) => w.upgrade().map(Control::Item),
            WeakControl::Field(w) => w.upgrade().map(Control::Field),
            WeakControl::Group(w) => w.upgrade().map(Control::Group),
            WeakControl::Array(w) => w.upgrade().map(Control::Array),
        }
    }
}

impl std::fmt::Debug for WeakControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.upgrade() {
            Some(control) => write!(f, "WeakControl({})", control.id()),
            None => f.write_str("WeakControl(<dropped>)"),
        }
    }
}

impl Control {
    /// The item layer every node shares
    pub fn item(&self) -> &ItemControl {
        match self {
            Control::Item(c) => c,
            Control::Field(c) => &c.item,
            Control::Group(c) => &c.field.item,
            Control::Array(c) => &c.field.item,
        }
    }

    /// The value layer, absent for items
    pub fn as_field(&self) -> Option<&FieldControl> {
        match self {
            Control::Item(_) => None,
            Control::Field(c) => Some(c),
            Control::Group(c) => Some(&c.field),
            Control::Array(c) => Some(&c.field),
        }
    }

    pub fn as_group(&self) -> Option<&Arc<GroupControl>> {
        match self {
            Control::Group(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Arc<ArrayControl>> {
        match self {
            Control::Array(c) => Some(c),
            _ => None,
        }
    }

    pub fn downgrade(&self) -> WeakControl {
        match self {
            Control::Item(c) => WeakControl::Item(Arc::downgrade(c)),
            Control::Field(c) => WeakControl::Field(Arc::downgrade(c)),
            Control::Group(c) => WeakControl::Group(Arc::downgrade(c)),
            Control::Array(c) => WeakControl::Array(Arc::downgrade(c)),
        }
    }

    /// Whether two handles point at the same node
    pub fn ptr_eq(&self, other: &Control) -> bool {
        match (self, other) {
            (Control::Item(a), Control::Item(b)) => Arc::ptr_eq(a, b),
            (Control::Field(a), Control::Field(b)) => Arc::ptr_eq(a, b),
            (Control::Group(a), Control::Group(b)) => Arc::ptr_eq(a, b),
            (Control::Array(a), Control::Array(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn id(&self) -> &ControlId {
        self.item().id()
    }

    pub fn kind(&self) -> ControlKind {
        match self {
            Control::Item(_) => ControlKind::Item,
            Control::Field(_) => ControlKind::Field,
            Control::Group(_) => ControlKind::Group,
            Control::Array(_) => ControlKind::Array,
        }
    }

    pub fn parent(&self) -> Option<Control> {
        self.item().parent()
    }

    /// Set the parent link. Returns `false` if it was already set.
    pub fn link_parent(&self, parent: WeakControl) -> bool {
        self.item().link_parent(parent)
    }

    pub fn root(&self) -> Control {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Current value; `Null` for items
    pub fn value(&self) -> Value {
        self.as_field().map(FieldControl::value).unwrap_or(Value::Null)
    }

    pub fn value_changes(&self) -> Source<Value> {
        match self.as_field() {
            Some(field) => field.value_changes(),
            None => just(Value::Null),
        }
    }

    pub fn initial_value(&self) -> Value {
        self.as_field()
            .map(FieldControl::initial_value)
            .unwrap_or(Value::Null)
    }

    /// Value of every descendant, disabled ones included
    pub fn raw_value(&self) -> Value {
        match self {
            Control::Item(_) => Value::Null,
            Control::Field(c) => c.value(),
            Control::Group(c) => c.raw_value(),
            Control::Array(c) => c.raw_value(),
        }
    }

    /// Published status; the default status for items
    pub fn status(&self) -> Status {
        self.as_field()
            .map(FieldControl::status)
            .unwrap_or_default()
    }

    pub fn status_changes(&self) -> Source<Status> {
        match self.as_field() {
            Some(field) => field.status_changes(),
            None => just(Status::default()),
        }
    }

    /// Whether the node's own disabled flag is clear
    pub fn is_enabled(&self) -> bool {
        self.as_field().map_or(true, FieldControl::is_enabled)
    }

    pub fn errors(&self) -> Option<MessageMap> {
        self.as_field().and_then(FieldControl::errors)
    }

    pub fn error_changes(&self) -> Source<Option<MessageMap>> {
        match self.as_field() {
            Some(field) => field.error_changes(),
            None => just(None),
        }
    }

    pub fn flags(&self) -> Flags {
        self.item().flags()
    }

    pub fn flag_changes(&self) -> Source<Flags> {
        self.item().flag_changes()
    }

    pub fn messages(&self) -> Option<MessageMap> {
        self.item().messages()
    }

    pub fn message_changes(&self) -> Source<Option<MessageMap>> {
        self.item().message_changes()
    }

    pub fn extras(&self) -> Extras {
        self.item().extras()
    }

    pub fn extra_changes(&self) -> Source<Extras> {
        self.item().extra_changes()
    }

    /// Descendant at `path`. Group children are matched by key, array
    /// children by index; reaching a leaf early is a miss.
    pub fn get(&self, path: impl Into<ControlPath>) -> Option<Control> {
        let path = path.into();
        let mut current = self.clone();
        for segment in path.segments() {
            current = match &current {
                Control::Group(group) => group.control(&segment.as_key())?.clone(),
                Control::Array(array) => array.at(segment.as_index()?)?,
                Control::Item(_) | Control::Field(_) => return None,
            };
        }
        Some(current)
    }

    /// Error `code` on this node, or on the node at `path`
    pub fn get_error(&self, code: &str, path: Option<ControlPath>) -> Option<Message> {
        let target = match path {
            Some(path) => self.get(path)?,
            None => self.clone(),
        };
        target.errors()?.remove(code)
    }

    pub fn set_value(&self, value: Value) -> FormResult<()> {
        match self {
            Control::Item(c) => Err(FormError::NoValue(c.id().clone())),
            Control::Field(c) => {
                c.set_value(value);
                Ok(())
            }
            Control::Group(c) => c.set_value(value),
            Control::Array(c) => c.set_value(value),
        }
    }

    pub fn patch_value(&self, value: Value) -> FormResult<()> {
        match self {
            Control::Item(c) => Err(FormError::NoValue(c.id().clone())),
            Control::Field(c) => {
                c.set_value(value);
                Ok(())
            }
            Control::Group(c) => c.patch_value(value),
            Control::Array(c) => c.patch_value(value),
        }
    }

    pub fn reset(&self) -> FormResult<()> {
        match self {
            Control::Item(_) => Ok(()),
            Control::Field(c) => {
                c.reset();
                Ok(())
            }
            Control::Group(c) => c.reset(),
            Control::Array(c) => c.reset(),
        }
    }

    /// Mutate the local status, then update
    pub fn set_status(&self, f: impl FnOnce(&mut Status)) {
        if let Some(field) = self.as_field() {
            field.set_status(f);
        }
    }

    pub fn validate(&self) {
        if let Some(field) = self.as_field() {
            field.validate();
        }
    }

    /// Recompute this node from its children, then bubble to the parent
    pub fn update(&self) {
        match self {
            Control::Item(_) => {}
            Control::Field(c) => c.update(),
            Control::Group(c) => c.update(),
            Control::Array(c) => c.update(),
        }
    }

    /// Release every stream resource held by this node and its descendants
    pub fn dispose(&self) {
        match self {
            Control::Item(c) => c.dispose(),
            Control::Field(c) => c.dispose(),
            Control::Group(c) => c.dispose(),
            Control::Array(c) => c.dispose(),
        }
    }
}

impl std::fmt::Debug for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Control")
            .field("id", self.id())
            .field("value", &self.value())
            .field("status", &self.status())
            .finish()
    }
}

impl From<Arc<ItemControl>> for Control {
    fn from(control: Arc<ItemControl>) -> Self {
        Control::Item(control)
    }
}

impl From<Arc<FieldControl>> for Control {
    fn from(control: Arc<FieldControl>) -> Self {
        Control::Field(control)
    }
}

impl From<Arc<GroupControl>> for Control {
    fn from(control: Arc<GroupControl>) -> Self {
        Control::Group(control)
    }
}

impl From<Arc<ArrayControl>> for Control {
    fn from(control: Arc<ArrayControl>) -> Self {
        Control::Array(control)
    }
}
