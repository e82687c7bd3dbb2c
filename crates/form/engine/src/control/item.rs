//! Base node: hints, messages, extras and triggers

use super::{Control, WeakControl};
use crate::stream::{combine_latest, just, Source, State, Switch};
use form_types::{
    baseline_flags, merge_extras, merge_flags, merge_messages, ControlId, Extras, Flags,
    MessageMap, HIDDEN,
};
use futures::stream::{self, StreamExt};
use std::sync::{Arc, OnceLock};

/// A node without a value.
///
/// Every other node type embeds one. It owns four independently replaceable
/// pipelines; each setter cancels the previous pipeline of its kind.
pub struct ItemControl {
    id: ControlId,
    this: WeakControl,
    parent: OnceLock<WeakControl>,
    flags: State<Flags>,
    messages: State<Option<MessageMap>>,
    extras: State<Extras>,
    hinting: Switch,
    messaging: Switch,
    extending: Switch,
    triggering: Switch,
}

impl ItemControl {
    pub(crate) fn new(id: ControlId, this: WeakControl) -> Self {
        Self {
            id,
            this,
            parent: OnceLock::new(),
            flags: State::new(baseline_flags()),
            messages: State::new(None),
            extras: State::new(Extras::new()),
            hinting: Switch::default(),
            messaging: Switch::default(),
            extending: Switch::default(),
            triggering: Switch::default(),
        }
    }

    /// Create a standalone item
    pub fn create(id: ControlId) -> Arc<Self> {
        tracing::debug!(control_id = %id, "Item control created");
        Arc::new_cyclic(|weak| Self::new(id, WeakControl::Item(weak.clone())))
    }

    pub fn id(&self) -> &ControlId {
        &self.id
    }

    /// Handle to the node this item layer belongs to
    pub fn control(&self) -> Option<Control> {
        self.this.upgrade()
    }

    pub(crate) fn this(&self) -> &WeakControl {
        &self.this
    }

    pub fn parent(&self) -> Option<Control> {
        self.parent.get().and_then(WeakControl::upgrade)
    }

    pub fn link_parent(&self, parent: WeakControl) -> bool {
        let linked = self.parent.set(parent).is_ok();
        if !linked {
            tracing::trace!(control_id = %self.id, "Parent already linked, keeping the first");
        }
        linked
    }

    pub(crate) fn bubble(&self) {
        if let Some(parent) = self.parent() {
            parent.update();
        }
    }

    pub fn flags(&self) -> Flags {
        self.flags.get()
    }

    pub fn flag_changes(&self) -> Source<Flags> {
        self.flags.changes()
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.with(form_types::is_hidden)
    }

    pub fn messages(&self) -> Option<MessageMap> {
        self.messages.get()
    }

    pub fn message_changes(&self) -> Source<Option<MessageMap>> {
        self.messages.changes()
    }

    pub fn extras(&self) -> Extras {
        self.extras.get()
    }

    pub fn extra_changes(&self) -> Source<Extras> {
        self.extras.changes()
    }

    /// Replace the hint sources.
    ///
    /// A `("hidden", false)` source always comes first; the latest pairs are
    /// OR-merged per name.
    pub fn set_hints(&self, sources: Vec<Source<(String, bool)>>) {
        let mut all = Vec::with_capacity(sources.len() + 1);
        all.push(just((HIDDEN.to_string(), false)));
        all.extend(sources);
        tracing::trace!(control_id = %self.id, sources = all.len(), "Hint pipeline replaced");

        let flags = self.flags.clone();
        self.hinting
            .switch_to(combine_latest(all).map(merge_flags).boxed(), move |merged| {
                flags.set(merged)
            });
    }

    /// Replace the message sources. Later sources win on duplicate codes.
    pub fn set_messagers(&self, sources: Vec<Source<Option<MessageMap>>>) {
        let messages = self.messages.clone();
        if sources.is_empty() {
            self.messaging.cancel();
            messages.set(None);
            return;
        }
        self.messaging.switch_to(
            combine_latest(sources).map(merge_messages).boxed(),
            move |merged| messages.set(merged),
        );
    }

    /// Replace the extra sources. Later sources win on duplicate keys.
    pub fn set_extras(&self, sources: Vec<Source<Extras>>) {
        let extras = self.extras.clone();
        if sources.is_empty() {
            self.extending.cancel();
            extras.set(Extras::new());
            return;
        }
        self.extending.switch_to(
            combine_latest(sources).map(merge_extras).boxed(),
            move |merged| extras.set(merged),
        );
    }

    /// Replace the trigger sources. They run for their side effects only.
    pub fn set_triggers(&self, sources: Vec<Source<()>>) {
        if sources.is_empty() {
            self.triggering.cancel();
            return;
        }
        self.triggering
            .switch_to(stream::select_all(sources).boxed(), |()| {});
    }

    pub fn dispose(&self) {
        self.hinting.cancel();
        self.messaging.cancel();
        self.extending.cancel();
        self.triggering.cancel();
        self.flags.close();
        self.messages.close();
        self.extras.close();
        tracing::trace!(control_id = %self.id, "Item disposed");
    }
}
