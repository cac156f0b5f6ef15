//! # Structured Output
//!
//! [`Formatter`] is the sink property reflectors serialize into. The caller
//! owns the formatter and hands it to `serialize`; the reflector only drives
//! it. [`JsonFormatter`] is the implementation used by the protocol front end.

use super::value::Value;
use serde_json::{Map, Value as JsonValue};

/// Event-style builder for a structured document.
pub trait Formatter: Send {
    fn begin_object(&mut self);
    fn end_object(&mut self);
    fn set_member_name(&mut self, name: &str);
    fn set_string_value(&mut self, value: &str);
    fn set_value(&mut self, value: &Value);
    fn generate(&self) -> String;
}

#[derive(Debug, Default)]
struct Frame {
    members: Map<String, JsonValue>,
    key: Option<String>,
}

/// A [`Formatter`] producing JSON through `serde_json`.
#[derive(Debug, Default)]
pub struct JsonFormatter {
    frames: Vec<Frame>,
    root: Option<JsonValue>,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The completed document, if one was produced.
    pub fn value(&self) -> Option<&JsonValue> {
        self.root.as_ref()
    }

    pub fn into_value(self) -> Option<JsonValue> {
        self.root
    }

    fn put(&mut self, value: JsonValue) {
        match self.frames.last_mut() {
            Some(frame) => {
                let key = frame.key.take().unwrap_or_default();
                frame.members.insert(key, value);
            }
            None => self.root = Some(value),
        }
    }
}

impl Formatter for JsonFormatter {
    fn begin_object(&mut self) {
        self.frames.push(Frame::default());
    }

    fn end_object(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.put(JsonValue::Object(frame.members));
        }
    }

    fn set_member_name(&mut self, name: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.key = Some(name.to_string());
        }
    }

    fn set_string_value(&mut self, value: &str) {
        self.put(JsonValue::String(value.to_string()));
    }

    fn set_value(&mut self, value: &Value) {
        self.put(serde_json::to_value(value).unwrap_or(JsonValue::Null));
    }

    fn generate(&self) -> String {
        match &self.root {
            Some(root) => serde_json::to_string_pretty(root).unwrap_or_default(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_objects() {
        let mut f = JsonFormatter::new();
        f.begin_object();
        f.set_member_name("name");
        f.set_string_value("state");
        f.set_member_name("param");
        f.begin_object();
        f.set_member_name("removable");
        f.set_value(&Value::Bool(false));
        f.end_object();
        f.end_object();

        let value = f.value().unwrap();
        assert_eq!(value["name"], "state");
        assert_eq!(value["param"]["removable"], false);
        assert!(f.generate().contains("\"state\""));
    }

    #[test]
    fn test_empty_formatter_generates_nothing() {
        let f = JsonFormatter::new();
        assert_eq!(f.generate(), "");
        assert!(f.into_value().is_none());
    }
}
