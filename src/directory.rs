//! URI resolution.
//!
//! A [`Directory`] turns the URI of a command into the resource it addresses.
//! [`ResourceTree`] resolves slash separated paths by walking the children of
//! composite resources from a root.

use crate::framework::{Resource, ResourceError, ResourceResult};
use std::sync::Arc;
use tracing::debug;

/// The target of a resolved URI.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub resource: Arc<Resource>,
    /// Set when the last path segment named a property rather than a child.
    pub property: Option<String>,
}

/// Looks up resources by URI.
pub trait Directory: Send + Sync {
    /// Fails with `NO_RESOURCE` when the URI addresses nothing.
    fn resolve(&self, uri: &str) -> ResourceResult<Resolved>;
}

/// A [`Directory`] over a tree of resources.
///
/// All segments but the last must name children. The last one may name a
/// child or a property of the resource reached so far. Under a composite
/// resource it must be a declared property, so a missing child is reported
/// as `NO_RESOURCE` instead of being read as a property name.
#[derive(Debug, Clone)]
pub struct ResourceTree {
    root: Arc<Resource>,
}

impl ResourceTree {
    pub fn new(root: Arc<Resource>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Arc<Resource> {
        &self.root
    }
}

impl Directory for ResourceTree {
    fn resolve(&self, uri: &str) -> ResourceResult<Resolved> {
        if uri.is_empty() {
            return Err(ResourceError::NullArgument("uri".into()));
        }

        let segments: Vec<&str> = uri.split('/').filter(|s| !s.is_empty()).collect();
        let mut current = Arc::clone(&self.root);

        for (i, segment) in segments.iter().enumerate() {
            if let Some(child) = current.child(segment) {
                current = child;
                continue;
            }
            let last = i + 1 == segments.len();
            if last && (!current.is_composite() || current.kind().properties().contains(segment)) {
                debug!(uri, resource = %current.name(), property = segment, "Resolved property");
                return Ok(Resolved {
                    resource: current,
                    property: Some(segment.to_string()),
                });
            }
            return Err(ResourceError::NoResource(uri.to_string()));
        }

        debug!(uri, resource = %current.name(), "Resolved resource");
        Ok(Resolved {
            resource: current,
            property: None,
        })
    }
}
