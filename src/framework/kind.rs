//! # Resource Kinds
//!
//! A [`ResourceKind`] is everything a concrete kind plugs into the framework:
//! its property table and its Creator/Deleter capabilities. Adding a kind
//! never touches the dispatch core, it only builds one of these and, if it
//! should be discoverable by name, registers it in a [`KindRegistry`].

use super::capability::{Creator, Deleter, NoCreator, NoDeleter};
use super::error::{ResourceError, ResourceResult};
use super::property::{Access, PropertySpec, PropertyTable};
use super::value::{TypeTag, Value};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Name of the built-in property every kind exposes.
pub const NAME_PROPERTY: &str = "name";

/// Capability and property tables shared by every resource of one kind.
pub struct ResourceKind {
    name: String,
    properties: PropertyTable,
    creator: Arc<dyn Creator>,
    deleter: Arc<dyn Deleter>,
    composite: bool,
}

impl ResourceKind {
    pub fn builder(name: impl Into<String>) -> ResourceKindBuilder {
        ResourceKindBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    pub fn creator(&self) -> &dyn Creator {
        self.creator.as_ref()
    }

    pub fn deleter(&self) -> &dyn Deleter {
        self.deleter.as_ref()
    }

    /// Whether resources of this kind hold children.
    pub fn is_composite(&self) -> bool {
        self.composite
    }
}

impl fmt::Debug for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceKind")
            .field("name", &self.name)
            .field("properties", &self.properties.len())
            .field("composite", &self.composite)
            .finish()
    }
}

/// Builder for [`ResourceKind`].
pub struct ResourceKindBuilder {
    name: String,
    properties: PropertyTable,
    creator: Arc<dyn Creator>,
    deleter: Arc<dyn Deleter>,
    composite: bool,
}

impl ResourceKindBuilder {
    fn new(name: impl Into<String>) -> Self {
        let mut properties = PropertyTable::new();
        properties.insert(PropertySpec::computed(
            NAME_PROPERTY,
            "The name of the resource",
            TypeTag::String,
            Access::READ | Access::WRITE | Access::CONSTRUCT_ONLY,
            |resource, _| Value::Str(resource.name()),
        ));
        Self {
            name: name.into(),
            properties,
            creator: Arc::new(NoCreator),
            deleter: Arc::new(NoDeleter),
            composite: false,
        }
    }

    pub fn property(mut self, spec: PropertySpec) -> Self {
        self.properties.insert(spec);
        self
    }

    pub fn creator(mut self, creator: impl Creator + 'static) -> Self {
        self.creator = Arc::new(creator);
        self
    }

    pub fn deleter(mut self, deleter: impl Deleter + 'static) -> Self {
        self.deleter = Arc::new(deleter);
        self
    }

    /// Resources of this kind hold named children.
    pub fn composite(mut self) -> Self {
        self.composite = true;
        self
    }

    pub fn build(self) -> Arc<ResourceKind> {
        Arc::new(ResourceKind {
            name: self.name,
            properties: self.properties,
            creator: self.creator,
            deleter: self.deleter,
            composite: self.composite,
        })
    }
}

/// Kinds known to the daemon, keyed by name.
#[derive(Default)]
pub struct KindRegistry {
    kinds: RwLock<HashMap<String, Arc<ResourceKind>>>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a kind. A name can only be registered once.
    pub fn register(&self, kind: Arc<ResourceKind>) -> ResourceResult<()> {
        let mut kinds = self.kinds.write();
        if kinds.contains_key(kind.name()) {
            warn!(kind = kind.name(), "Kind already registered");
            return Err(ResourceError::NoCreate(format!("kind {}", kind.name())));
        }
        info!(kind = kind.name(), properties = kind.properties().len(), "Registered kind");
        kinds.insert(kind.name().to_string(), kind);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<ResourceKind>> {
        self.kinds.read().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.kinds.read().keys().cloned().collect();
        names.sort();
        names
    }
}
