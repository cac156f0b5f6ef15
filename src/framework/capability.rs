//! # Capabilities
//!
//! A resource kind opts into being creatable or deletable by attaching a
//! [`Creator`] and/or [`Deleter`] when the kind is built. Kinds that attach
//! neither get [`NoCreator`] / [`NoDeleter`], which always refuse. The
//! dispatch core therefore never asks "does this kind support creation?": it
//! always calls the capability and inspects the result.

use super::error::{ResourceError, ResourceResult};
use super::resource::Resource;
use std::sync::Arc;
use tracing::error;

/// Strategy that instantiates new resources of a kind.
pub trait Creator: Send + Sync {
    /// Builds a new resource called `name` from a free-form `description`.
    ///
    /// Failures must be reported as [`ResourceError::NoCreate`].
    fn create(&self, name: &str, description: &str) -> ResourceResult<Arc<Resource>>;
}

/// Strategy that tears down resources of a kind.
pub trait Deleter: Send + Sync {
    /// Releases the state owned by `resource`.
    fn delete(&self, resource: &Resource) -> ResourceResult<()>;
}

/// Creator for kinds that cannot be instantiated remotely.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCreator;

impl Creator for NoCreator {
    fn create(&self, name: &str, _description: &str) -> ResourceResult<Arc<Resource>> {
        error!(resource = name, "Unable to create on this resource");
        Err(ResourceError::NoCreate(name.to_string()))
    }
}

/// Deleter for kinds that cannot be torn down remotely.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDeleter;

impl Deleter for NoDeleter {
    fn delete(&self, resource: &Resource) -> ResourceResult<()> {
        let name = resource.name();
        error!(resource = %name, "Unable to delete this resource");
        Err(ResourceError::NoDelete(name))
    }
}
