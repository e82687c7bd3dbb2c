//! Form Domain Types
//!
//! Plain data shared by the form engine and by the code that integrates it.
//! Nothing in this crate is reactive; the engine turns these descriptions
//! into a live control tree.
//!
//! # Key Concepts
//!
//! - **ControlConfig**: A declarative node (item, field, group or array)
//!   carrying the behavior definitions that should be attached to it.
//! - **ExecutableDefinition**: A `{name, params}` reference into an
//!   executable registry, grouped by [`ExecutableCategory`].
//! - **Status**: The `{valid, pending, dirty, touched, disabled}` record
//!   every value-bearing control publishes.
//! - **Flags**: Boolean hints (`hidden` is always present).
//! - **MessageMap**: Code-keyed messages, used both for informational
//!   messages and for validation errors.
//! - **ControlPath / ControlId**: Addressing for lookups and diagnostics.

#![deny(unsafe_code)]

mod config;
mod errors;
mod executable;
mod flags;
mod ids;
mod messages;
mod path;
mod status;

pub use config::*;
pub use errors::*;
pub use executable::*;
pub use flags::*;
pub use ids::*;
pub use messages::*;
pub use path::*;
pub use status::*;
