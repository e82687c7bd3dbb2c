//! Config bundler: compiles a config tree into a control tree
//!
//! Compilation runs in two passes. The first walks the config bottom-up,
//! building every control through the visitor's init hooks and recording a
//! [`ConfigBundle`] per node. The second walks the bundles in post-order and
//! lets the visitor's complete hooks link parents and install behaviors
//! resolved from the registry. Bundles are dropped once compilation ends.

mod visitor;

pub use visitor::*;

use crate::config::BundlerConfig;
use crate::control::{Control, GroupChildren, ItemFactory, ItemSeed, WeakControl};
use crate::registry::ExecutableRegistry;
use form_types::{
    ControlConfig, ControlId, ControlKind, FormError, FormResult, Member, PathSegment,
};
use serde_json::Value;
use std::sync::Arc;

/// A config node paired with the control built for it
pub struct ConfigBundle<'a> {
    pub id: ControlId,
    pub registry: &'a ExecutableRegistry,
    pub control: Control,
    pub config: &'a ControlConfig,
    pub children: Vec<ConfigBundle<'a>>,
}

impl std::fmt::Debug for ConfigBundle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigBundle")
            .field("id", &self.id)
            .field("children", &self.children)
            .finish()
    }
}

/// Compiles configs against a registry
#[derive(Clone)]
pub struct Bundler {
    registry: Arc<ExecutableRegistry>,
    visitor: Arc<dyn Visitor>,
    config: BundlerConfig,
}

impl Bundler {
    pub fn new(registry: Arc<ExecutableRegistry>) -> Self {
        Self {
            registry,
            visitor: Arc::new(DefaultVisitor),
            config: BundlerConfig::default(),
        }
    }

    pub fn with_visitor(mut self, visitor: impl Visitor + 'static) -> Self {
        self.visitor = Arc::new(visitor);
        self
    }

    pub fn with_config(mut self, config: BundlerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &ExecutableRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BundlerConfig {
        &self.config
    }

    /// Build the control tree for `config`
    pub fn compile(&self, config: &ControlConfig) -> FormResult<Control> {
        self.compile_seeded(config, None)
    }

    /// Build the control tree for `config`, seeding it with `value`
    pub fn compile_with_value(&self, config: &ControlConfig, value: Value) -> FormResult<Control> {
        self.compile_seeded(config, Some(&value))
    }

    fn compile_seeded(&self, config: &ControlConfig, seed: Option<&Value>) -> FormResult<Control> {
        let id = ControlId::root(&self.config.root_name, config.kind());
        config.check(&id)?;

        let bundle = self.bundle(config, id, seed)?;
        self.complete(&bundle, None);

        tracing::info!(control_id = %bundle.id, "Control tree compiled");
        Ok(bundle.control)
    }

    /// First pass: build `config` and everything below it
    pub fn bundle<'a>(
        &'a self,
        config: &'a ControlConfig,
        id: ControlId,
        seed: Option<&Value>,
    ) -> FormResult<ConfigBundle<'a>> {
        match config.kind() {
            ControlKind::Item => {
                let cx = InitContext {
                    id: &id,
                    config,
                    seed,
                };
                let control = Control::Item(self.visitor.item_init(&cx));
                Ok(self.leaf(id, control, config))
            }
            ControlKind::Field => {
                let cx = InitContext {
                    id: &id,
                    config,
                    seed,
                };
                let control = Control::Field(self.visitor.field_init(&cx));
                Ok(self.leaf(id, control, config))
            }
            ControlKind::Group => self.bundle_group(config, id, seed),
            ControlKind::Array => self.bundle_array(config, id, seed),
        }
    }

    fn leaf<'a>(
        &'a self,
        id: ControlId,
        control: Control,
        config: &'a ControlConfig,
    ) -> ConfigBundle<'a> {
        ConfigBundle {
            id,
            registry: &self.registry,
            control,
            config,
            children: Vec::new(),
        }
    }

    fn bundle_group<'a>(
        &'a self,
        config: &'a ControlConfig,
        id: ControlId,
        seed: Option<&Value>,
    ) -> FormResult<ConfigBundle<'a>> {
        if config.fields.is_none() {
            return Err(FormError::MissingFields(id));
        }
        let entries = seed.or(config.value.as_ref()).and_then(Value::as_object);

        let mut children = Vec::new();
        let mut group_children = GroupChildren::new();
        for (position, member) in config.members().into_iter().enumerate() {
            match member {
                Member::Keyed(key, child) => {
                    if group_children.controls.contains_key(key) {
                        return Err(FormError::DuplicateKey {
                            id,
                            key: key.to_string(),
                        });
                    }
                    let child_id = id.child(&PathSegment::from(key), child.kind());
                    let bundle = self.bundle(child, child_id, entries.and_then(|e| e.get(key)))?;
                    group_children
                        .controls
                        .insert(key.to_string(), bundle.control.clone());
                    children.push(bundle);
                }
                Member::Layout(child) | Member::Display(child) => {
                    let child_id =
                        id.child(&PathSegment::Key(format!("#{}", position)), ControlKind::Item);
                    let cx = InitContext {
                        id: &child_id,
                        config: child,
                        seed: None,
                    };
                    let control = Control::Item(self.visitor.item_init(&cx));
                    group_children.items.push(control.clone());
                    children.push(self.leaf(child_id, control, child));
                }
                Member::Unnamed(child) => {
                    return Err(FormError::UnnamedControl(
                        id.child(&PathSegment::Key(format!("#{}", position)), child.kind()),
                    ));
                }
            }
        }

        let cx = InitContext {
            id: &id,
            config,
            seed,
        };
        let control = Control::Group(self.visitor.group_init(&cx, group_children));
        Ok(ConfigBundle {
            id,
            registry: &self.registry,
            control,
            config,
            children,
        })
    }

    fn bundle_array<'a>(
        &'a self,
        config: &'a ControlConfig,
        id: ControlId,
        seed: Option<&Value>,
    ) -> FormResult<ConfigBundle<'a>> {
        let template = config
            .item
            .as_deref()
            .filter(|template| template.kind() == ControlKind::Group)
            .ok_or_else(|| FormError::InvalidArrayTemplate(id.clone()))?;
        template.check(&id.child(&PathSegment::Index(0), ControlKind::Group))?;

        let initial: &[Value] = match seed.or(config.value.as_ref()) {
            None | Some(Value::Null) => &[],
            Some(Value::Array(elements)) => elements,
            Some(_) => {
                return Err(FormError::ValueShape {
                    id,
                    expected: "array",
                })
            }
        };

        let mut children = Vec::with_capacity(initial.len());
        for (index, element) in initial.iter().enumerate() {
            let item_id = id.child(&PathSegment::Index(index), ControlKind::Group);
            children.push(self.bundle(template, item_id, Some(element))?);
        }
        let items = children.iter().map(|b| b.control.clone()).collect();

        let factory = self.item_factory(id.clone(), Arc::new(template.clone()));
        let cx = InitContext {
            id: &id,
            config,
            seed,
        };
        let control = Control::Array(self.visitor.array_init(&cx, factory, items));
        Ok(ConfigBundle {
            id,
            registry: &self.registry,
            control,
            config,
            children,
        })
    }

    /// Factory running both passes for array items created after compilation
    fn item_factory(&self, array_id: ControlId, template: Arc<ControlConfig>) -> ItemFactory {
        let bundler = self.clone();
        Arc::new(move |seed: ItemSeed| {
            let id = array_id.child(&PathSegment::Index(seed.index), ControlKind::Group);
            let bundle = bundler.bundle(&template, id, seed.value.as_ref())?;
            bundle.control.link_parent(seed.parent.clone());
            bundler.complete(&bundle, Some(&seed.parent));
            tracing::debug!(control_id = %bundle.id, "Array item built");
            Ok(bundle.control)
        })
    }

    /// Second pass: complete children first, then `bundle` itself
    pub fn complete(&self, bundle: &ConfigBundle<'_>, parent: Option<&WeakControl>) {
        let inherited = match &bundle.control {
            Control::Group(_) | Control::Array(_) => Some(bundle.control.downgrade()),
            Control::Item(_) | Control::Field(_) => parent.cloned(),
        };
        for child in &bundle.children {
            self.complete(child, inherited.as_ref());
        }

        self.report_missing(bundle);
        match &bundle.control {
            Control::Item(_) => self.visitor.item_complete(bundle, parent),
            Control::Field(_) => self.visitor.field_complete(bundle, parent),
            Control::Group(_) => self.visitor.group_complete(bundle, parent),
            Control::Array(_) => self.visitor.array_complete(bundle, parent),
        }
    }

    fn report_missing(&self, bundle: &ConfigBundle<'_>) {
        for (category, def) in bundle.registry.missing(bundle.config) {
            if self.config.warn_on_missing_executable {
                tracing::warn!(
                    control_id = %bundle.id,
                    %category,
                    name = %def.name,
                    "Executable not registered, skipping"
                );
            } else {
                tracing::debug!(
                    control_id = %bundle.id,
                    %category,
                    name = %def.name,
                    "Executable not registered, skipping"
                );
            }
        }
    }
}

impl std::fmt::Debug for Bundler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundler")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
