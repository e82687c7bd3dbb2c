//! Executable registry: named behavior constructors, by category

use crate::control::{Control, Validator};
use crate::stream::Source;
use form_types::{ControlConfig, ExecutableCategory, ExecutableDefinition, Extras, MessageMap};
use futures::StreamExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a hint source. The flag name comes from the definition.
pub type HintFn = Arc<dyn Fn(&ControlConfig, &Control, &Value) -> Source<bool> + Send + Sync>;
pub type ExtraFn = Arc<dyn Fn(&ControlConfig, &Control, &Value) -> Source<Extras> + Send + Sync>;
pub type MessagerFn =
    Arc<dyn Fn(&ControlConfig, &Control, &Value) -> Source<Option<MessageMap>> + Send + Sync>;
pub type ValidatorFn = Arc<dyn Fn(&ControlConfig, &Control, &Value) -> Validator + Send + Sync>;
pub type DisablerFn = Arc<dyn Fn(&ControlConfig, &Control, &Value) -> Source<bool> + Send + Sync>;
pub type TriggerFn = Arc<dyn Fn(&ControlConfig, &Control, &Value) -> Source<()> + Send + Sync>;

/// A registered behavior constructor
#[derive(Clone)]
pub enum Executable {
    Hint(HintFn),
    Extra(ExtraFn),
    Messager(MessagerFn),
    Validator(ValidatorFn),
    Disabler(DisablerFn),
    Trigger(TriggerFn),
}

impl Executable {
    pub fn category(&self) -> ExecutableCategory {
        match self {
            Executable::Hint(_) => ExecutableCategory::Hint,
            Executable::Extra(_) => ExecutableCategory::Extra,
            Executable::Messager(_) => ExecutableCategory::Messager,
            Executable::Validator(_) => ExecutableCategory::Validator,
            Executable::Disabler(_) => ExecutableCategory::Disabler,
            Executable::Trigger(_) => ExecutableCategory::Trigger,
        }
    }
}

impl std::fmt::Debug for Executable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Executable::{}", self.category())
    }
}

/// Lookup table from `(category, name)` to executables.
///
/// A name may be registered once per category. Lookups that miss return
/// `None`; callers skip the definition.
#[derive(Clone, Default)]
pub struct ExecutableRegistry {
    entries: HashMap<ExecutableCategory, HashMap<String, Executable>>,
}

impl ExecutableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in executables
    pub fn with_builtins() -> Self {
        crate::builtins::registry()
    }

    /// Register `executable` under its category, replacing any entry with
    /// the same name
    pub fn register(&mut self, name: impl Into<String>, executable: Executable) {
        let name = name.into();
        let category = executable.category();
        tracing::debug!(%category, name = %name, "Executable registered");
        self.entries
            .entry(category)
            .or_default()
            .insert(name, executable);
    }

    pub fn with(mut self, name: impl Into<String>, executable: Executable) -> Self {
        self.register(name, executable);
        self
    }

    pub fn with_hinter<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ControlConfig, &Control, &Value) -> Source<bool> + Send + Sync + 'static,
    {
        self.with(name, Executable::Hint(Arc::new(f)))
    }

    pub fn with_extra<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ControlConfig, &Control, &Value) -> Source<Extras> + Send + Sync + 'static,
    {
        self.with(name, Executable::Extra(Arc::new(f)))
    }

    pub fn with_messager<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ControlConfig, &Control, &Value) -> Source<Option<MessageMap>>
            + Send
            + Sync
            + 'static,
    {
        self.with(name, Executable::Messager(Arc::new(f)))
    }

    pub fn with_validator<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ControlConfig, &Control, &Value) -> Validator + Send + Sync + 'static,
    {
        self.with(name, Executable::Validator(Arc::new(f)))
    }

    pub fn with_disabler<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ControlConfig, &Control, &Value) -> Source<bool> + Send + Sync + 'static,
    {
        self.with(name, Executable::Disabler(Arc::new(f)))
    }

    pub fn with_trigger<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ControlConfig, &Control, &Value) -> Source<()> + Send + Sync + 'static,
    {
        self.with(name, Executable::Trigger(Arc::new(f)))
    }

    pub fn resolve(&self, category: ExecutableCategory, name: &str) -> Option<&Executable> {
        self.entries.get(&category)?.get(name)
    }

    pub fn contains(&self, category: ExecutableCategory, name: &str) -> bool {
        self.resolve(category, name).is_some()
    }

    /// Registered names in `category`, sorted
    pub fn names(&self, category: ExecutableCategory) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entries
            .get(&category)
            .map(|entries| entries.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy every entry of `other` into this registry; `other` wins on
    /// name clashes
    pub fn merge(&mut self, other: &ExecutableRegistry) {
        for (category, entries) in &other.entries {
            let target = self.entries.entry(*category).or_default();
            for (name, executable) in entries {
                target.insert(name.clone(), executable.clone());
            }
        }
    }

    pub fn merged(mut self, other: &ExecutableRegistry) -> Self {
        self.merge(other);
        self
    }

    /// Definitions of `config` that have no registered executable
    pub fn missing<'c>(
        &self,
        config: &'c ControlConfig,
    ) -> Vec<(ExecutableCategory, &'c ExecutableDefinition)> {
        ExecutableCategory::ALL
            .iter()
            .flat_map(|&category| {
                config
                    .definitions(category)
                    .iter()
                    .filter(move |def| !self.contains(category, &def.name))
                    .map(move |def| (category, def))
            })
            .collect()
    }

    /// Hint sources for `config`, paired with their flag names.
    ///
    /// The flag name is the `hint` parameter when given, else the
    /// definition name.
    pub fn hints_for(
        &self,
        config: &ControlConfig,
        control: &Control,
    ) -> Vec<Source<(String, bool)>> {
        config
            .hints
            .iter()
            .filter_map(|def| match self.resolve(ExecutableCategory::Hint, &def.name)? {
                Executable::Hint(f) => {
                    let flag = def.param_str("hint").unwrap_or(&def.name).to_string();
                    Some(
                        f(config, control, &def.params)
                            .map(move |on| (flag.clone(), on))
                            .boxed(),
                    )
                }
                _ => None,
            })
            .collect()
    }

    pub fn extras_for(&self, config: &ControlConfig, control: &Control) -> Vec<Source<Extras>> {
        self.defined(config, ExecutableCategory::Extra)
            .filter_map(|(def, executable)| match executable {
                Executable::Extra(f) => Some(f(config, control, &def.params)),
                _ => None,
            })
            .collect()
    }

    pub fn messagers_for(
        &self,
        config: &ControlConfig,
        control: &Control,
    ) -> Vec<Source<Option<MessageMap>>> {
        self.defined(config, ExecutableCategory::Messager)
            .filter_map(|(def, executable)| match executable {
                Executable::Messager(f) => Some(f(config, control, &def.params)),
                _ => None,
            })
            .collect()
    }

    pub fn validators_for(&self, config: &ControlConfig, control: &Control) -> Vec<Validator> {
        self.defined(config, ExecutableCategory::Validator)
            .filter_map(|(def, executable)| match executable {
                Executable::Validator(f) => Some(f(config, control, &def.params)),
                _ => None,
            })
            .collect()
    }

    pub fn disablers_for(&self, config: &ControlConfig, control: &Control) -> Vec<Source<bool>> {
        self.defined(config, ExecutableCategory::Disabler)
            .filter_map(|(def, executable)| match executable {
                Executable::Disabler(f) => Some(f(config, control, &def.params)),
                _ => None,
            })
            .collect()
    }

    pub fn triggers_for(&self, config: &ControlConfig, control: &Control) -> Vec<Source<()>> {
        self.defined(config, ExecutableCategory::Trigger)
            .filter_map(|(def, executable)| match executable {
                Executable::Trigger(f) => Some(f(config, control, &def.params)),
                _ => None,
            })
            .collect()
    }

    fn defined<'a>(
        &'a self,
        config: &'a ControlConfig,
        category: ExecutableCategory,
    ) -> impl Iterator<Item = (&'a ExecutableDefinition, &'a Executable)> + 'a {
        config
            .definitions(category)
            .iter()
            .filter_map(move |def| Some((def, self.resolve(category, &def.name)?)))
    }
}

impl std::fmt::Debug for ExecutableRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for category in ExecutableCategory::ALL {
            let names = self.names(category);
            if !names.is_empty() {
                map.entry(&category.as_str(), &names);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{FieldControl, ItemControl};
    use crate::stream::just;
    use form_types::{ControlId, ControlKind};
    use serde_json::json;

    fn control() -> Control {
        Control::Field(FieldControl::create(
            ControlId::root("root", ControlKind::Field),
            json!(null),
            false,
        ))
    }

    fn registry() -> ExecutableRegistry {
        ExecutableRegistry::new()
            .with_hinter("always", |_, _, _| just(true))
            .with_disabler("always", |_, _, _| just(true))
            .with_trigger("noop", |_, _, _| just(()))
    }

    #[test]
    fn test_resolve_by_category() {
        let registry = registry();
        assert!(matches!(
            registry.resolve(ExecutableCategory::Hint, "always"),
            Some(Executable::Hint(_))
        ));
        assert!(matches!(
            registry.resolve(ExecutableCategory::Disabler, "always"),
            Some(Executable::Disabler(_))
        ));
        assert!(registry.resolve(ExecutableCategory::Validator, "always").is_none());
        assert!(registry.resolve(ExecutableCategory::Trigger, "missing").is_none());
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(ExecutableCategory::Hint), ["always"]);
    }

    #[test]
    fn test_merge_other_wins() {
        let mut base = registry();
        let other = ExecutableRegistry::new()
            .with_hinter("always", |_, _, _| just(false))
            .with_extra("empty", |_, _, _| just(Extras::new()));
        base.merge(&other);
        assert_eq!(base.len(), 4);

        let config = ControlConfig::field("x").with_hint(ExecutableDefinition::new("always"));
        let control = control();
        let sources = base.hints_for(&config, &control);
        assert_eq!(sources.len(), 1);
        control.item().set_hints(sources);
        assert_eq!(control.flags().get("always"), Some(&false));
    }

    #[test]
    fn test_hint_flag_name_from_params() {
        let registry = registry();
        let config = ControlConfig::field("x").with_hint(
            ExecutableDefinition::new("always").with_param("hint", "readonly"),
        );
        let control = control();
        control.item().set_hints(registry.hints_for(&config, &control));
        assert_eq!(control.flags().get("readonly"), Some(&true));
        assert!(control.flags().get("always").is_none());
    }

    #[test]
    fn test_missing_definitions() {
        let registry = registry();
        let config = ControlConfig::field("x")
            .with_hint(ExecutableDefinition::new("always"))
            .with_validator(ExecutableDefinition::new("nonexistent"))
            .with_trigger(ExecutableDefinition::new("noop"));
        let missing = registry.missing(&config);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].0, ExecutableCategory::Validator);
        assert_eq!(missing[0].1.name, "nonexistent");

        let item = Control::Item(ItemControl::create(ControlId::new("item")));
        assert!(registry.validators_for(&config, &item).is_empty());
    }
}
