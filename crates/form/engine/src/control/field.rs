//! Value-bearing node: value, status, errors, validation, disablement

use super::{Control, ItemControl, WeakControl};
use crate::stream::{combine_latest, deferred, just, Source, State, Switch};
use form_types::{merge_messages, ControlId, MessageMap, Status};
use futures::stream::StreamExt;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::{Arc, OnceLock};

/// Validation function. Only the first value of the returned source counts.
pub type Validator = Arc<dyn Fn(&Control) -> Source<Option<MessageMap>> + Send + Sync>;

/// A scalar value node, and the value layer of groups and arrays.
pub struct FieldControl {
    pub(crate) item: ItemControl,
    value: State<Value>,
    initial: RwLock<Value>,
    pub(crate) local: RwLock<Status>,
    status: State<Status>,
    errors: State<Option<MessageMap>>,
    validators: RwLock<Vec<Validator>>,
    validation: Switch,
    disabling: Switch,
    gate: OnceLock<()>,
}

impl FieldControl {
    pub(crate) fn new(id: ControlId, value: Value, disabled: bool, this: WeakControl) -> Self {
        let local = Status::default().with_disabled(disabled);
        Self {
            item: ItemControl::new(id, this),
            value: State::new(value.clone()),
            initial: RwLock::new(value),
            local: RwLock::new(local),
            status: State::new(local),
            errors: State::new(None),
            validators: RwLock::new(Vec::new()),
            validation: Switch::default(),
            disabling: Switch::default(),
            gate: OnceLock::new(),
        }
    }

    /// Create a leaf field; its gate is open on return
    pub fn create(id: ControlId, value: Value, disabled: bool) -> Arc<Self> {
        tracing::debug!(control_id = %id, "Field control created");
        let field = Arc::new_cyclic(|weak| {
            Self::new(id, value, disabled, WeakControl::Field(weak.clone()))
        });
        field.open_gate();
        field
    }

    pub fn item(&self) -> &ItemControl {
        &self.item
    }

    pub fn id(&self) -> &ControlId {
        self.item.id()
    }

    pub fn value(&self) -> Value {
        self.value.get()
    }

    pub fn value_changes(&self) -> Source<Value> {
        self.value.changes()
    }

    pub fn initial_value(&self) -> Value {
        self.initial.read().clone()
    }

    pub(crate) fn set_initial_value(&self, value: Value) {
        *self.initial.write() = value;
    }

    pub(crate) fn publish_value(&self, value: Value) {
        self.value.set(value);
    }

    pub fn status(&self) -> Status {
        self.status.get()
    }

    pub fn status_changes(&self) -> Source<Status> {
        self.status.changes()
    }

    /// The node's own status, before children are merged in
    pub fn local_status(&self) -> Status {
        *self.local.read()
    }

    pub(crate) fn publish_status(&self, status: Status) {
        self.status.set(status);
    }

    pub fn is_enabled(&self) -> bool {
        !self.local.read().disabled
    }

    pub fn errors(&self) -> Option<MessageMap> {
        self.errors.get()
    }

    pub fn error_changes(&self) -> Source<Option<MessageMap>> {
        self.errors.changes()
    }

    pub fn is_initialized(&self) -> bool {
        self.gate.get().is_some()
    }

    /// Open the initialization gate and run the first validation
    pub(crate) fn open_gate(&self) {
        if self.gate.set(()).is_ok() {
            tracing::trace!(control_id = %self.id(), "Initialization gate opened");
            self.validate();
        }
    }

    /// Update through the owning node so composites recompute
    pub(crate) fn refresh(&self) {
        if let Some(control) = self.item.control() {
            control.update();
        }
    }

    pub fn set_value(&self, value: Value) {
        self.value.set(value);
        {
            let mut local = self.local.write();
            local.dirty = true;
            local.touched = true;
        }
        self.refresh();
    }

    /// Restore the initial value and clear `dirty` and `touched`
    pub fn reset(&self) {
        self.value.set(self.initial_value());
        self.clear_interaction();
        self.refresh();
    }

    pub(crate) fn clear_interaction(&self) {
        let mut local = self.local.write();
        *local = local.pristine();
    }

    pub(crate) fn mark_interaction(&self) {
        let mut local = self.local.write();
        local.dirty = true;
        local.touched = true;
    }

    pub fn set_status(&self, f: impl FnOnce(&mut Status)) {
        f(&mut *self.local.write());
        self.refresh();
    }

    /// Replace the validators and validate once
    pub fn set_validators(&self, validators: Vec<Validator>) {
        tracing::trace!(control_id = %self.id(), count = validators.len(), "Validators replaced");
        *self.validators.write() = validators;
        self.validate();
    }

    /// Run every validator and publish the merged outcome.
    ///
    /// Each validator contributes its first value; the first complete
    /// combination is published. Validators that end without a value count
    /// as passing. A previous run still in flight is cancelled. Does nothing
    /// before the gate opens.
    pub fn validate(&self) {
        if !self.is_initialized() {
            return;
        }
        let Some(control) = self.item.control() else {
            return;
        };

        let validators = self.validators.read().clone();
        let outcome = if validators.is_empty() {
            just(None)
        } else {
            let runs = validators
                .iter()
                .map(|validator| validator(&control).take(1).boxed())
                .collect();
            let mut combined = combine_latest(runs).map(merge_messages);
            deferred(async move { combined.next().await.unwrap_or(None) })
        };

        self.local.write().pending = true;
        let this = self.item.this().clone();
        self.validation.switch_to(outcome, move |errors| {
            if let Some(control) = this.upgrade() {
                if let Some(field) = control.as_field() {
                    field.finish_validation(errors);
                }
            }
        });

        if !self.local.read().pending {
            return;
        }
        if !self.validation.is_active() {
            tracing::warn!(control_id = %self.id(), "Validation dropped before it finished");
            self.local.write().pending = false;
            return;
        }
        tracing::trace!(control_id = %self.id(), "Validation pending");
        self.refresh();
    }

    fn finish_validation(&self, errors: Option<MessageMap>) {
        let valid = errors.is_none();
        self.errors.set(errors);
        {
            let mut local = self.local.write();
            local.valid = valid;
            local.pending = false;
        }
        tracing::trace!(control_id = %self.id(), valid, "Validation finished");
        self.refresh();
    }

    /// Replace the disable sources.
    ///
    /// The node is disabled while any source's latest value is `true`. An
    /// empty list stops the pipeline and keeps the current flag.
    pub fn set_disablers(&self, sources: Vec<Source<bool>>) {
        if sources.is_empty() {
            self.disabling.cancel();
            return;
        }
        let this = self.item.this().clone();
        let any = combine_latest(sources)
            .map(|flags| flags.into_iter().any(|disabled| disabled))
            .boxed();
        self.disabling.switch_to(any, move |disabled| {
            if let Some(control) = this.upgrade() {
                if let Some(field) = control.as_field() {
                    field.local.write().disabled = disabled;
                }
                control.update();
            }
        });
    }

    /// Leaf update: republish, then bubble
    pub(crate) fn update(&self) {
        if !self.is_initialized() {
            return;
        }
        self.status.set(self.local_status());
        self.value.notify();
        self.errors.notify();
        self.item.bubble();
    }

    pub(crate) fn dispose(&self) {
        self.validation.cancel();
        self.disabling.cancel();
        self.value.close();
        self.status.close();
        self.errors.close();
        self.item.dispose();
    }
}
