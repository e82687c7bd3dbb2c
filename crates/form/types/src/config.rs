//! Declarative control configuration

use crate::{ControlId, ExecutableCategory, ExecutableDefinition, FormError, FormResult, PathSegment};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Kind of control a config node compiles to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    /// Display-only node without a value
    Item,
    /// Scalar value
    Field,
    /// Named children
    Group,
    /// Indexed children built from a template
    Array,
}

impl ControlKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlKind::Item => "item",
            ControlKind::Field => "field",
            ControlKind::Group => "group",
            ControlKind::Array => "array",
        }
    }

    /// Whether controls of this kind carry a value
    pub fn has_value(&self) -> bool {
        !matches!(self, ControlKind::Item)
    }
}

impl std::fmt::Display for ControlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declarative control node.
///
/// The node kind is inferred from its shape unless `kind` is given, see
/// [`ControlConfig::kind`]. Any key not listed here lands in `props` and is
/// carried through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ControlKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Initial value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<ControlConfig>>,
    /// Array item template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Box<ControlConfig>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<ExecutableDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<ExecutableDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messagers: Vec<ExecutableDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ExecutableDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disablers: Vec<ExecutableDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<ExecutableDefinition>,
    /// Opaque field-level descriptors
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

/// A group member after layout flattening
#[derive(Clone, Copy, Debug)]
pub enum Member<'a> {
    /// Named value-bearing child
    Keyed(&'a str, &'a ControlConfig),
    /// Anonymous group nested in a group
    Layout(&'a ControlConfig),
    /// Display item
    Display(&'a ControlConfig),
    /// Field or array without a name
    Unnamed(&'a ControlConfig),
}

impl ControlConfig {
    pub fn item() -> Self {
        Self {
            kind: Some(ControlKind::Item),
            ..Default::default()
        }
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn group(name: impl Into<String>, fields: Vec<ControlConfig>) -> Self {
        Self {
            name: Some(name.into()),
            fields: Some(fields),
            ..Default::default()
        }
    }

    /// Anonymous group; flattened into the enclosing group
    pub fn layout(fields: Vec<ControlConfig>) -> Self {
        Self {
            fields: Some(fields),
            ..Default::default()
        }
    }

    pub fn array(name: impl Into<String>, item: ControlConfig) -> Self {
        Self {
            name: Some(name.into()),
            item: Some(Box::new(item)),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: ControlKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_hint(mut self, def: ExecutableDefinition) -> Self {
        self.hints.push(def);
        self
    }

    pub fn with_extra(mut self, def: ExecutableDefinition) -> Self {
        self.extras.push(def);
        self
    }

    pub fn with_messager(mut self, def: ExecutableDefinition) -> Self {
        self.messagers.push(def);
        self
    }

    pub fn with_validator(mut self, def: ExecutableDefinition) -> Self {
        self.validators.push(def);
        self
    }

    pub fn with_disabler(mut self, def: ExecutableDefinition) -> Self {
        self.disablers.push(def);
        self
    }

    pub fn with_trigger(mut self, def: ExecutableDefinition) -> Self {
        self.triggers.push(def);
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }

    /// Definitions attached for `category`
    pub fn definitions(&self, category: ExecutableCategory) -> &[ExecutableDefinition] {
        match category {
            ExecutableCategory::Hint => &self.hints,
            ExecutableCategory::Extra => &self.extras,
            ExecutableCategory::Messager => &self.messagers,
            ExecutableCategory::Validator => &self.validators,
            ExecutableCategory::Disabler => &self.disablers,
            ExecutableCategory::Trigger => &self.triggers,
        }
    }

    /// Classify the node: an explicit `kind` wins, then an `item` template
    /// means array, `fields` means group, a `name` means field.
    pub fn kind(&self) -> ControlKind {
        if let Some(kind) = self.kind {
            return kind;
        }
        if self.item.is_some() {
            ControlKind::Array
        } else if self.fields.is_some() {
            ControlKind::Group
        } else if self.name.is_some() {
            ControlKind::Field
        } else {
            ControlKind::Item
        }
    }

    /// Anonymous group. Only meaningful below the root.
    pub fn is_layout(&self) -> bool {
        self.name.is_none() && self.kind() == ControlKind::Group
    }

    /// Members of a group in document order, with layouts flattened.
    ///
    /// A layout is listed before its own members.
    pub fn members(&self) -> Vec<Member<'_>> {
        let mut out = Vec::new();
        collect_members(self.fields.as_deref().unwrap_or_default(), &mut out);
        out
    }

    /// Structural check of this node and everything below it
    pub fn check(&self, id: &ControlId) -> FormResult<()> {
        match self.kind() {
            ControlKind::Group => self.check_group(id),
            ControlKind::Array => {
                let template = self
                    .item
                    .as_deref()
                    .filter(|t| t.kind() == ControlKind::Group)
                    .ok_or_else(|| FormError::InvalidArrayTemplate(id.clone()))?;
                template.check(&id.child(&PathSegment::Index(0), ControlKind::Group))
            }
            ControlKind::Field | ControlKind::Item => Ok(()),
        }
    }

    fn check_group(&self, id: &ControlId) -> FormResult<()> {
        if self.fields.is_none() {
            return Err(FormError::MissingFields(id.clone()));
        }
        let mut keys = HashSet::new();
        for member in self.members() {
            match member {
                Member::Keyed(key, config) => {
                    if !keys.insert(key) {
                        return Err(FormError::DuplicateKey {
                            id: id.clone(),
                            key: key.to_string(),
                        });
                    }
                    config.check(&id.child(&PathSegment::from(key), config.kind()))?;
                }
                Member::Layout(config) if config.fields.is_none() => {
                    return Err(FormError::MissingFields(id.clone()));
                }
                Member::Unnamed(config) => {
                    return Err(FormError::UnnamedControl(
                        id.child(&PathSegment::Key(String::new()), config.kind()),
                    ));
                }
                Member::Layout(_) | Member::Display(_) => {}
            }
        }
        Ok(())
    }
}

fn collect_members<'a>(fields: &'a [ControlConfig], out: &mut Vec<Member<'a>>) {
    for config in fields {
        let kind = config.kind();
        match (config.name.as_deref(), kind) {
            (_, ControlKind::Item) => out.push(Member::Display(config)),
            (Some(name), _) => out.push(Member::Keyed(name, config)),
            (None, ControlKind::Group) => {
                out.push(Member::Layout(config));
                collect_members(config.fields.as_deref().unwrap_or_default(), out);
            }
            (None, _) => out.push(Member::Unnamed(config)),
        }
    }
}
