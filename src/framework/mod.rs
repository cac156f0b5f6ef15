//! Generic resource reflection framework.
//!
//! This module provides the building blocks every addressable node in the
//! daemon is made of: resources with typed, access-controlled properties,
//! Creator/Deleter capabilities, and property reflectors that serialize
//! through a [`Formatter`].
//!
//! # Main Components
//!
//! - [`Resource`] - A named node with CRUD over its properties and children
//! - [`ResourceKind`] - Property table and capabilities shared by a kind
//! - [`Creator`] / [`Deleter`] - Pluggable strategies for create and delete
//! - [`Property`] - Reflector exposing one property of a target resource
//! - [`ReturnCode`] / [`ResourceError`] - Stable result codes and typed errors
//! - [`Batch`] - Ordered per-item outcomes of multi-property read/update
//!
//! # Testing
//!
//! See the [`mock`] module for scripted capabilities and a recording formatter.

pub mod batch;
pub mod capability;
pub mod error;
pub mod format;
pub mod kind;
pub mod mock;
pub mod property;
pub mod reflector;
pub mod resource;
pub mod value;

pub use batch::{Batch, Outcome};
pub use capability::{Creator, Deleter, NoCreator, NoDeleter};
pub use error::{ResourceError, ResourceResult, ReturnCode};
pub use format::{Formatter, JsonFormatter};
pub use kind::{KindRegistry, ResourceKind, ResourceKindBuilder, NAME_PROPERTY};
pub use property::{
    Access, DefaultRenderer, PropertySpec, PropertyTable, Slots, TypedRenderer, ValueRenderer,
};
pub use reflector::Property;
pub use resource::{Resource, DEFAULT_NAME};
pub use value::{TypeTag, Value};
