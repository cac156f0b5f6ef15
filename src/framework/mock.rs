//! # Mock Capabilities
//!
//! Test doubles for the framework's collaborator seams.
//!
//! - [`MockCreator`] returns queued responses and records every call.
//! - [`MockDeleter`] records every resource it is asked to delete and can be
//!   told to refuse.
//! - [`RecordingFormatter`] records formatter events instead of building a
//!   document.
//!
//! # Example
//! ```ignore
//! let creator = MockCreator::new();
//! creator.expect_create().return_err(ResourceError::NoCreate("p0".into()));
//! let kind = ResourceKind::builder("pipelines").creator(creator.clone()).composite().build();
//! // ... drive the resource ...
//! creator.verify(); // all queued responses were consumed
//! ```

use super::capability::{Creator, Deleter};
use super::error::{ResourceError, ResourceResult};
use super::format::Formatter;
use super::kind::ResourceKind;
use super::resource::Resource;
use super::value::Value;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

// =============================================================================
// CREATOR
// =============================================================================

/// Response queued for the next `create` call.
enum Expectation {
    Ok,
    Err(ResourceError),
}

#[derive(Default)]
struct CreatorState {
    expectations: VecDeque<Expectation>,
    calls: Vec<(String, String)>,
}

/// A [`Creator`] whose responses are scripted by the test.
///
/// With no queued expectation, `create` succeeds and builds a leaf resource
/// of the creator's child kind.
#[derive(Clone)]
pub struct MockCreator {
    state: Arc<Mutex<CreatorState>>,
    child_kind: Arc<ResourceKind>,
}

impl MockCreator {
    pub fn new() -> Self {
        Self::with_kind(ResourceKind::builder("mock").build())
    }

    /// A creator that builds resources of `child_kind`.
    pub fn with_kind(child_kind: Arc<ResourceKind>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CreatorState::default())),
            child_kind,
        }
    }

    /// Queues the response to the next `create` call.
    pub fn expect_create(&self) -> CreateExpectationBuilder {
        CreateExpectationBuilder {
            state: Arc::clone(&self.state),
        }
    }

    /// `(name, description)` of every call so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.state.lock().calls.clone()
    }

    /// Panics if queued expectations were not consumed.
    pub fn verify(&self) {
        let remaining = self.state.lock().expectations.len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

impl Default for MockCreator {
    fn default() -> Self {
        Self::new()
    }
}

impl Creator for MockCreator {
    fn create(&self, name: &str, description: &str) -> ResourceResult<Arc<Resource>> {
        let expectation = {
            let mut state = self.state.lock();
            state.calls.push((name.to_string(), description.to_string()));
            state.expectations.pop_front()
        };
        match expectation {
            Some(Expectation::Err(e)) => Err(e),
            Some(Expectation::Ok) | None => {
                Ok(Arc::new(Resource::new(name, Arc::clone(&self.child_kind))))
            }
        }
    }
}

/// Builder for `create` expectations.
pub struct CreateExpectationBuilder {
    state: Arc<Mutex<CreatorState>>,
}

impl CreateExpectationBuilder {
    /// The call succeeds with a fresh resource.
    pub fn return_ok(self) {
        self.state.lock().expectations.push_back(Expectation::Ok);
    }

    /// The call fails with `error`.
    pub fn return_err(self, error: ResourceError) {
        self.state.lock().expectations.push_back(Expectation::Err(error));
    }
}

// =============================================================================
// DELETER
// =============================================================================

/// A [`Deleter`] that records what it deleted.
#[derive(Clone, Default)]
pub struct MockDeleter {
    deleted: Arc<Mutex<Vec<String>>>,
    refuse: Arc<Mutex<bool>>,
}

impl MockDeleter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `delete` fail with `NO_DELETE`.
    pub fn refuse(&self) {
        *self.refuse.lock() = true;
    }

    /// Names of the resources deleted so far, in order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }
}

impl Deleter for MockDeleter {
    fn delete(&self, resource: &Resource) -> ResourceResult<()> {
        if *self.refuse.lock() {
            return Err(ResourceError::NoDelete(resource.name()));
        }
        self.deleted.lock().push(resource.name());
        Ok(())
    }
}

// =============================================================================
// FORMATTER
// =============================================================================

/// One call made on a [`RecordingFormatter`].
#[derive(Debug, Clone, PartialEq)]
pub enum FormatEvent {
    BeginObject,
    EndObject,
    MemberName(String),
    StringValue(String),
    Value(Value),
}

/// A [`Formatter`] that records the calls it receives.
#[derive(Debug, Default)]
pub struct RecordingFormatter {
    events: Vec<FormatEvent>,
}

impl RecordingFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[FormatEvent] {
        &self.events
    }
}

impl Formatter for RecordingFormatter {
    fn begin_object(&mut self) {
        self.events.push(FormatEvent::BeginObject);
    }

    fn end_object(&mut self) {
        self.events.push(FormatEvent::EndObject);
    }

    fn set_member_name(&mut self, name: &str) {
        self.events.push(FormatEvent::MemberName(name.to_string()));
    }

    fn set_string_value(&mut self, value: &str) {
        self.events.push(FormatEvent::StringValue(value.to_string()));
    }

    fn set_value(&mut self, value: &Value) {
        self.events.push(FormatEvent::Value(value.clone()));
    }

    fn generate(&self) -> String {
        format!("{} events", self.events.len())
    }
}
