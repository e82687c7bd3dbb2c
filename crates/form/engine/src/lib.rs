//! Reactive Form Control Engine
//!
//! Turns a declarative [`ControlConfig`](form_types::ControlConfig) tree into
//! a live tree of controls that track value, validity, disablement,
//! interaction state, hints, messages and extra metadata, and keep every
//! composite in sync with its children.
//!
//! # Architecture
//!
//! - [`Control`] - Handle to a node: an item, field, group or array
//! - [`ExecutableRegistry`] - Named behavior constructors, by category
//! - [`Bundler`] - Two-pass compiler from configs to controls
//! - [`Visitor`] - Pluggable strategy for both compilation passes
//! - [`State`] / [`Source`] - The stream primitives behaviors are built from
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use form_engine::{Bundler, ExecutableRegistry};
//! use form_types::{ControlConfig, ExecutableDefinition};
//! use serde_json::json;
//!
//! let config = ControlConfig::layout(vec![
//!     ControlConfig::field("name").with_validator(ExecutableDefinition::new("required")),
//!     ControlConfig::field("email"),
//! ]);
//!
//! let bundler = Bundler::new(Arc::new(ExecutableRegistry::with_builtins()));
//! let form = bundler.compile(&config).unwrap();
//! assert!(!form.status().valid);
//!
//! form.set_value(json!({"name": "Ada"})).unwrap();
//! form.get("name").unwrap().validate();
//! assert!(form.status().valid);
//! assert_eq!(form.value(), json!({"name": "Ada", "email": null}));
//! ```

#![deny(unsafe_code)]

pub mod builtins;
mod bundler;
mod config;
mod control;
mod registry;
pub mod stream;

pub use bundler::*;
pub use config::*;
pub use control::*;
pub use registry::*;
pub use stream::{combine_latest, deferred, drive, just, Source, State, Subscription};
