//! Property tests: composite status always equals the local status merged
//! with every child's published status.

use form_engine::{Control, FieldControl, GroupChildren, GroupControl};
use form_types::{ControlId, ControlKind, PathSegment, Status};
use proptest::prelude::*;
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
enum Mutation {
    Valid(usize, bool),
    Disabled(usize, bool),
    Touch(usize),
    Reset(usize),
    GroupDisabled(bool),
}

fn arb_mutation(children: usize) -> impl Strategy<Value = Mutation> {
    prop_oneof![
        (0..children, any::<bool>()).prop_map(|(i, v)| Mutation::Valid(i, v)),
        (0..children, any::<bool>()).prop_map(|(i, v)| Mutation::Disabled(i, v)),
        (0..children).prop_map(Mutation::Touch),
        (0..children).prop_map(Mutation::Reset),
        any::<bool>().prop_map(Mutation::GroupDisabled),
    ]
}

fn group(children: usize) -> Control {
    let root = ControlId::root("root", ControlKind::Group);
    let mut members = GroupChildren::new();
    for i in 0..children {
        let key = format!("f{}", i);
        let id = root.child(&PathSegment::from(key.as_str()), ControlKind::Field);
        members = members.with_control(key, FieldControl::create(id, json!(i), false));
    }
    Control::Group(GroupControl::create(root, members, false))
}

fn apply(group: &Control, mutation: &Mutation) {
    let child = |i: usize| group.get(format!("f{}", i).as_str()).unwrap();
    match mutation {
        Mutation::Valid(i, v) => child(*i).set_status(|s| s.valid = *v),
        Mutation::Disabled(i, v) => child(*i).set_status(|s| s.disabled = *v),
        Mutation::Touch(i) => child(*i).set_value(json!("touched")).unwrap(),
        Mutation::Reset(i) => child(*i).reset().unwrap(),
        Mutation::GroupDisabled(v) => group.set_status(|s| s.disabled = *v),
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn property_group_status_is_aggregate(
        mutations in prop::collection::vec(arb_mutation(4), 1..24),
    ) {
        let group = group(4);
        for mutation in &mutations {
            apply(&group, mutation);

            let g = group.as_group().unwrap();
            let children: Vec<Status> = g.controls().values().map(Control::status).collect();
            let expected = Status::aggregate(g.as_field().local_status(), &children);
            prop_assert_eq!(group.status(), expected);
        }
    }

    #[test]
    fn property_group_value_excludes_disabled(
        mutations in prop::collection::vec(arb_mutation(4), 1..24),
    ) {
        let group = group(4);
        for mutation in &mutations {
            apply(&group, mutation);
        }

        let g = group.as_group().unwrap();
        let group_enabled = g.as_field().is_enabled();
        let value = group.value();
        let raw = group.raw_value();
        for (key, child) in g.controls() {
            let included = value.get(key).is_some();
            prop_assert_eq!(included, !group_enabled || child.is_enabled());
            prop_assert_eq!(raw.get(key), Some(&child.value()));
        }
    }
}
