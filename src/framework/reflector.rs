//! # Property Reflector
//!
//! A [`Property`] reflects one named attribute of a target [`Resource`] so it
//! can be addressed, read and serialized like any other node. The reflector
//! holds a strong reference to its target for its whole lifetime; dropping the
//! reflector releases it exactly once.

use super::error::{ResourceError, ResourceResult, ReturnCode};
use super::format::Formatter;
use super::kind::ResourceKind;
use super::property::PropertySpec;
use super::resource::Resource;
use super::value::Value;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

fn property_kind() -> Arc<ResourceKind> {
    static KIND: OnceLock<Arc<ResourceKind>> = OnceLock::new();
    Arc::clone(KIND.get_or_init(|| ResourceKind::builder("property").build()))
}

/// Reflector for a single property of a target resource.
#[derive(Debug)]
pub struct Property {
    base: Resource,
    target: Arc<Resource>,
}

impl Property {
    /// Creates a reflector for `target`'s property called `name`.
    pub fn new(name: &str, target: Arc<Resource>) -> ResourceResult<Self> {
        if name.is_empty() {
            return Err(ResourceError::NullArgument("property".into()));
        }
        debug!(property = name, target = %target.name(), "Initializing property");
        Ok(Self {
            base: Resource::new(name, property_kind()),
            target,
        })
    }

    pub fn name(&self) -> String {
        self.base.name()
    }

    pub fn target(&self) -> &Arc<Resource> {
        &self.target
    }

    pub fn code(&self) -> ReturnCode {
        self.base.code()
    }

    /// The target's declaration of the reflected property, if it still has one.
    pub fn spec(&self) -> ResourceResult<Arc<PropertySpec>> {
        let name = self.name();
        self.target
            .kind()
            .properties()
            .get(&name)
            .cloned()
            .ok_or(ResourceError::NoResource(name))
    }

    /// Reads the reflected value from the target.
    pub fn read(&self) -> ResourceResult<Value> {
        let result = self.target.read_one(&self.name());
        self.base.set_code(ReturnCode::from(&result));
        result
    }

    /// Writes the reflected value on the target.
    pub fn update(&self, value: Value) -> ResourceResult<()> {
        let result = self.target.update_one(&self.name(), value);
        self.base.set_code(ReturnCode::from(&result));
        result
    }

    /// A property has no children to create.
    pub fn create(&self, name: &str, description: &str) -> ResourceResult<Arc<Resource>> {
        self.base.create(name, description)
    }

    /// A property is a leaf; deleting beneath it always succeeds.
    pub fn delete(&self, name: &str) -> ResourceResult<()> {
        self.base.delete(name)
    }

    /// Serializes the property's current value and metadata through
    /// `formatter` and returns the generated document.
    ///
    /// Fails with `NO_RESOURCE` when the target no longer declares the
    /// property, and with `NO_READ` when it is not readable.
    pub fn serialize(&self, formatter: &mut dyn Formatter) -> ResourceResult<String> {
        let result = self.serialize_inner(formatter);
        if let Err(e) = &result {
            warn!(property = %self.name(), target = %self.target.name(), error = %e, "Serialize failed");
        }
        self.base.set_code(ReturnCode::from(&result));
        result
    }

    fn serialize_inner(&self, formatter: &mut dyn Formatter) -> ResourceResult<String> {
        let spec = self.spec()?;
        let value = self.target.read_one(spec.name())?;

        formatter.begin_object();
        formatter.set_member_name("name");
        formatter.set_string_value(spec.name());
        formatter.set_member_name("value");
        self.add_value(&spec, formatter, &value);

        formatter.set_member_name("param");
        formatter.begin_object();
        formatter.set_member_name("description");
        formatter.set_string_value(spec.blurb());
        formatter.set_member_name("type");
        formatter.set_string_value(spec.type_tag().name());
        formatter.set_member_name("access");
        formatter.set_string_value(&spec.access().to_string());
        formatter.set_member_name("removable");
        formatter.set_value(&Value::Bool(spec.access().is_removable()));
        formatter.end_object();

        formatter.end_object();
        Ok(formatter.generate())
    }

    /// Renders `value` through the renderer the property declares.
    pub fn add_value(&self, spec: &PropertySpec, formatter: &mut dyn Formatter, value: &Value) {
        spec.renderer().add_value(formatter, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::RecordingFormatter;
    use crate::framework::{Access, JsonFormatter, TypedRenderer};

    fn target() -> Arc<Resource> {
        let kind = ResourceKind::builder("pipeline")
            .property(PropertySpec::stored("state", "Pipeline state", "null", Access::READ_WRITE))
            .property(
                PropertySpec::stored("latency", "Latency", 20u64, Access::READ_WRITE)
                    .with_renderer(TypedRenderer),
            )
            .property(PropertySpec::stored("eos", "Send EOS", false, Access::WRITE | Access::DELETE))
            .build();
        Arc::new(Resource::new("p0", kind))
    }

    #[test]
    fn test_serialize_value_and_metadata() {
        let property = Property::new("state", target()).unwrap();
        let mut formatter = JsonFormatter::new();
        let text = property.serialize(&mut formatter).unwrap();

        let json = formatter.into_value().unwrap();
        assert_eq!(json["name"], "state");
        assert_eq!(json["value"], "\"null\"");
        assert_eq!(json["param"]["description"], "Pipeline state");
        assert_eq!(json["param"]["type"], "gchararray");
        assert_eq!(json["param"]["access"], "READ | WRITE");
        assert_eq!(json["param"]["removable"], false);
        assert!(text.contains("Pipeline state"));
        assert_eq!(property.code(), ReturnCode::Ok);
    }

    #[test]
    fn test_custom_renderer_keeps_native_type() {
        let property = Property::new("latency", target()).unwrap();
        let mut formatter = JsonFormatter::new();
        property.serialize(&mut formatter).unwrap();
        assert_eq!(formatter.into_value().unwrap()["value"], 20);
    }

    #[test]
    fn test_serialize_undeclared_property() {
        let property = Property::new("bogus", target()).unwrap();
        let mut formatter = RecordingFormatter::new();
        let err = property.serialize(&mut formatter).unwrap_err();

        assert_eq!(err.code(), ReturnCode::NoResource);
        assert_eq!(property.code(), ReturnCode::NoResource);
        assert!(formatter.events().is_empty());
    }

    #[test]
    fn test_serialize_unreadable_property() {
        let property = Property::new("eos", target()).unwrap();
        let mut formatter = JsonFormatter::new();
        assert_eq!(property.serialize(&mut formatter).unwrap_err().code(), ReturnCode::NoRead);
        assert!(formatter.value().is_none());
    }

    #[test]
    fn test_reflector_crud() {
        let target = target();
        let property = Property::new("state", Arc::clone(&target)).unwrap();

        property.update(Value::from("playing")).unwrap();
        assert_eq!(property.read().unwrap(), Value::from("playing"));
        assert_eq!(target.read_one("state").unwrap(), Value::from("playing"));

        assert_eq!(property.create("x", "").unwrap_err().code(), ReturnCode::NoCreate);
        assert!(property.delete("x").is_ok());
    }

    #[test]
    fn test_reflector_releases_target_once() {
        let target = target();
        let reflectors: Vec<Property> = (0..3)
            .map(|_| Property::new("state", Arc::clone(&target)).unwrap())
            .collect();
        assert_eq!(Arc::strong_count(&target), 4);

        drop(reflectors);
        assert_eq!(Arc::strong_count(&target), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(Property::new("", target()).unwrap_err().code(), ReturnCode::NullArgument);
    }
}
