//! # Property Tables
//!
//! Each resource kind declares its properties up front, when the kind is
//! registered: `name → {getter, setter, access, type}`. Read and update look
//! names up in this table instead of discovering fields at runtime.
//!
//! Most properties are *stored*: their value lives in the resource's slot map
//! and the table only supplies the default. *Computed* properties supply their
//! own getter (e.g. the built-in `name` property, which reflects the
//! resource's name).

use super::error::{ResourceError, ResourceResult};
use super::format::Formatter;
use super::resource::Resource;
use super::value::{TypeTag, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

/// Per-instance storage for stored properties.
pub type Slots = HashMap<String, Value>;

/// Reads a property value from a resource and its slots.
pub type Getter = Arc<dyn Fn(&Resource, &Slots) -> Value + Send + Sync>;

/// Marshals an (already type-checked) value into the slots.
pub type Setter = Arc<dyn Fn(&mut Slots, Value) -> ResourceResult<()> + Send + Sync>;

/// Access rights of a property.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Access(u8);

impl Access {
    pub const NONE: Access = Access(0);
    pub const READ: Access = Access(1);
    pub const WRITE: Access = Access(1 << 1);
    /// Settable only when the resource is constructed.
    pub const CONSTRUCT_ONLY: Access = Access(1 << 2);
    /// The property may be removed from its owner.
    pub const DELETE: Access = Access(1 << 3);

    pub const READ_WRITE: Access = Access(Self::READ.0 | Self::WRITE.0);

    pub fn contains(&self, other: Access) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_readable(&self) -> bool {
        self.contains(Self::READ)
    }

    /// Writable and not construct-only.
    pub fn is_updatable(&self) -> bool {
        self.contains(Self::WRITE) && !self.contains(Self::CONSTRUCT_ONLY)
    }

    pub fn is_removable(&self) -> bool {
        self.contains(Self::DELETE)
    }
}

impl BitOr for Access {
    type Output = Access;

    fn bitor(self, rhs: Access) -> Access {
        Access(self.0 | rhs.0)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::READ, "READ"),
            (Self::WRITE, "WRITE"),
            (Self::CONSTRUCT_ONLY, "CONSTRUCT_ONLY"),
            (Self::DELETE, "DELETE"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            f.write_str("NONE")
        } else {
            f.write_str(&set.join(" | "))
        }
    }
}

impl fmt::Debug for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Access({self})")
    }
}

/// Renders a property value into a formatter during serialization.
///
/// This is the one type-specific extension point of the reflection layer:
/// property kinds that want richer output than a plain string attach their
/// own renderer to their [`PropertySpec`].
pub trait ValueRenderer: Send + Sync {
    fn add_value(&self, formatter: &mut dyn Formatter, value: &Value);
}

/// Renders the human-readable form of the value as a string.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRenderer;

impl ValueRenderer for DefaultRenderer {
    fn add_value(&self, formatter: &mut dyn Formatter, value: &Value) {
        formatter.set_string_value(&value.to_string());
    }
}

/// Renders the value with its native type (numbers stay numbers).
#[derive(Debug, Default, Clone, Copy)]
pub struct TypedRenderer;

impl ValueRenderer for TypedRenderer {
    fn add_value(&self, formatter: &mut dyn Formatter, value: &Value) {
        formatter.set_value(value);
    }
}

/// Declaration of a single property in a kind's table.
#[derive(Clone)]
pub struct PropertySpec {
    name: String,
    blurb: String,
    type_tag: TypeTag,
    access: Access,
    default: Value,
    stored: bool,
    getter: Getter,
    setter: Setter,
    renderer: Arc<dyn ValueRenderer>,
}

impl PropertySpec {
    /// A property whose value lives in the resource's slots.
    pub fn stored(
        name: impl Into<String>,
        blurb: impl Into<String>,
        default: impl Into<Value>,
        access: Access,
    ) -> Self {
        let name = name.into();
        let default = default.into();
        let get_key = name.clone();
        let get_default = default.clone();
        let set_key = name.clone();
        Self {
            type_tag: default.type_tag(),
            blurb: blurb.into(),
            access,
            getter: Arc::new(move |_: &Resource, slots: &Slots| {
                slots.get(&get_key).cloned().unwrap_or_else(|| get_default.clone())
            }),
            setter: Arc::new(move |slots: &mut Slots, value: Value| {
                slots.insert(set_key.clone(), value);
                Ok(())
            }),
            renderer: Arc::new(DefaultRenderer),
            stored: true,
            default,
            name,
        }
    }

    /// A property whose value is produced by `getter`. Not updatable unless a
    /// setter is attached with [`PropertySpec::with_setter`].
    pub fn computed(
        name: impl Into<String>,
        blurb: impl Into<String>,
        type_tag: TypeTag,
        access: Access,
        getter: impl Fn(&Resource, &Slots) -> Value + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let setter_name = name.clone();
        Self {
            default: getter_default(type_tag),
            blurb: blurb.into(),
            type_tag,
            access,
            getter: Arc::new(getter),
            setter: Arc::new(move |_: &mut Slots, _: Value| {
                Err(ResourceError::NoUpdate(setter_name.clone()))
            }),
            renderer: Arc::new(DefaultRenderer),
            stored: false,
            name,
        }
    }

    pub fn with_setter(
        mut self,
        setter: impl Fn(&mut Slots, Value) -> ResourceResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.setter = Arc::new(setter);
        self
    }

    pub fn with_renderer(mut self, renderer: impl ValueRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blurb(&self) -> &str {
        &self.blurb
    }

    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn renderer(&self) -> &dyn ValueRenderer {
        self.renderer.as_ref()
    }

    pub(crate) fn get(&self, resource: &Resource, slots: &Slots) -> Value {
        (self.getter)(resource, slots)
    }

    /// Type-checks `value` against the declared type, then runs the setter.
    pub(crate) fn set(&self, slots: &mut Slots, value: Value) -> ResourceResult<()> {
        let value = value.coerce(self.type_tag).ok_or_else(|| {
            ResourceError::NoUpdate(format!("{} (expected {})", self.name, self.type_tag))
        })?;
        (self.setter)(slots, value)
    }
}

impl fmt::Debug for PropertySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySpec")
            .field("name", &self.name)
            .field("type", &self.type_tag)
            .field("access", &self.access)
            .finish()
    }
}

fn getter_default(tag: TypeTag) -> Value {
    match tag {
        TypeTag::Bool => Value::Bool(false),
        TypeTag::Int => Value::Int(0),
        TypeTag::UInt => Value::UInt(0),
        TypeTag::Double => Value::Double(0.0),
        TypeTag::String => Value::Str(String::new()),
    }
}

/// The property registry of one resource kind.
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    specs: BTreeMap<String, Arc<PropertySpec>>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a property, replacing any previous declaration of the same name.
    pub fn insert(&mut self, spec: PropertySpec) {
        self.specs.insert(spec.name.clone(), Arc::new(spec));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<PropertySpec>> {
        self.specs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PropertySpec>> {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Initial slot contents: the default of every stored property.
    pub(crate) fn default_slots(&self) -> Slots {
        self.specs
            .values()
            .filter(|spec| spec.stored)
            .map(|spec| (spec.name.clone(), spec.default.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_flags() {
        let access = Access::READ | Access::WRITE | Access::CONSTRUCT_ONLY;
        assert!(access.is_readable());
        assert!(!access.is_updatable());
        assert!(!access.is_removable());
        assert_eq!(access.to_string(), "READ | WRITE | CONSTRUCT_ONLY");
        assert_eq!(Access::NONE.to_string(), "NONE");
        assert!(Access::READ_WRITE.is_updatable());
    }

    #[test]
    fn test_stored_property_type_checks_on_set() {
        let spec = PropertySpec::stored("latency", "Latency in ms", 20u64, Access::READ_WRITE);
        let mut slots = Slots::new();

        assert!(spec.set(&mut slots, Value::from("abc")).is_err());
        assert!(slots.is_empty());

        spec.set(&mut slots, Value::Int(40)).unwrap();
        assert_eq!(slots.get("latency"), Some(&Value::UInt(40)));
    }

    #[test]
    fn test_table_default_slots() {
        let mut table = PropertyTable::new();
        table.insert(PropertySpec::stored("state", "", "null", Access::READ));
        table.insert(PropertySpec::stored("eos", "", false, Access::WRITE));

        let slots = table.default_slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots.get("state"), Some(&Value::from("null")));
    }
}
