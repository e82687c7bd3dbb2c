//! Status records published by value-bearing controls

use serde::{Deserialize, Serialize};

/// Status of a control.
///
/// For a leaf this is its own (local) state. For a composite the published
/// status is the local status merged with every child's published status:
/// one invalid child makes the composite invalid, and one pending, dirty,
/// touched or disabled child sets that flag on the composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub valid: bool,
    pub pending: bool,
    pub dirty: bool,
    pub touched: bool,
    pub disabled: bool,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            valid: true,
            pending: false,
            dirty: false,
            touched: false,
            disabled: false,
        }
    }
}

impl Status {
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Merge a child's status into this one
    pub fn absorb(&mut self, child: &Status) {
        self.valid &= child.valid;
        self.pending |= child.pending;
        self.dirty |= child.dirty;
        self.touched |= child.touched;
        self.disabled |= child.disabled;
    }

    /// Local status merged with every child status
    pub fn aggregate<'a>(local: Status, children: impl IntoIterator<Item = &'a Status>) -> Status {
        children.into_iter().fold(local, |mut acc, child| {
            acc.absorb(child);
            acc
        })
    }

    pub fn invalid(&self) -> bool {
        !self.valid
    }

    pub fn enabled(&self) -> bool {
        !self.disabled
    }

    /// Clear the interaction flags, leaving validity and disablement alone
    pub fn pristine(mut self) -> Self {
        self.dirty = false;
        self.touched = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_status() {
        let status = Status::default();
        assert!(status.valid);
        assert!(status.enabled());
        assert!(!status.dirty && !status.touched && !status.pending);
    }

    #[test]
    fn test_single_child_propagates() {
        let invalid = Status {
            valid: false,
            ..Status::default()
        };
        let dirty = Status {
            dirty: true,
            ..Status::default()
        };
        let merged = Status::aggregate(Status::default(), [&invalid, &dirty]);
        assert!(merged.invalid());
        assert!(merged.dirty);
        assert!(!merged.touched);
        assert!(!merged.disabled);
    }

    #[test]
    fn test_pristine_keeps_validity() {
        let status = Status {
            valid: false,
            pending: true,
            dirty: true,
            touched: true,
            disabled: true,
        }
        .pristine();
        assert!(!status.dirty && !status.touched);
        assert!(status.invalid() && status.pending && status.disabled);
    }

    fn arb_status() -> impl Strategy<Value = Status> {
        any::<[bool; 5]>().prop_map(|[valid, pending, dirty, touched, disabled]| Status {
            valid,
            pending,
            dirty,
            touched,
            disabled,
        })
    }

    proptest! {
        #[test]
        fn property_aggregate_is_field_wise(
            local in arb_status(),
            children in prop::collection::vec(arb_status(), 0..8),
        ) {
            let merged = Status::aggregate(local, children.iter());
            prop_assert_eq!(merged.valid, local.valid && children.iter().all(|c| c.valid));
            prop_assert_eq!(merged.pending, local.pending || children.iter().any(|c| c.pending));
            prop_assert_eq!(merged.dirty, local.dirty || children.iter().any(|c| c.dirty));
            prop_assert_eq!(merged.touched, local.touched || children.iter().any(|c| c.touched));
            prop_assert_eq!(merged.disabled, local.disabled || children.iter().any(|c| c.disabled));
        }
    }
}
