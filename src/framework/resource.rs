//! # Resource
//!
//! [`Resource`] is the single concrete type behind every addressable node in
//! the daemon. What a resource *is* comes from its [`ResourceKind`]: the
//! property table drives `read`/`update`, the Creator drives `create` and the
//! Deleter drives `delete`.
//!
//! ## Locking
//!
//! Each resource holds independent locks for its name, its children, its
//! property slots and its last result code. The slot lock serializes CRUD on
//! the same resource (a batch update holds it exclusively for the whole
//! batch); the code lock only guards the status field so status queries never
//! wait behind a long batch. Locks are taken in the order
//! children → slots → code, and none is held while a capability runs.

use super::batch::Batch;
use super::error::{ResourceError, ResourceResult, ReturnCode};
use super::format::Formatter;
use super::kind::ResourceKind;
use super::property::{Access, Slots};
use super::value::Value;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name given to resources constructed without one.
pub const DEFAULT_NAME: &str = "resource";

/// A named, introspectable resource.
pub struct Resource {
    name: RwLock<String>,
    kind: Arc<ResourceKind>,
    code: Mutex<ReturnCode>,
    slots: RwLock<Slots>,
    children: RwLock<BTreeMap<String, Arc<Resource>>>,
}

impl Resource {
    /// Creates a resource with default property values. An empty name is
    /// replaced by [`DEFAULT_NAME`].
    pub fn new(name: &str, kind: Arc<ResourceKind>) -> Self {
        let name = if name.is_empty() { DEFAULT_NAME } else { name };
        debug!(resource = name, kind = kind.name(), "Initializing resource");
        Self {
            name: RwLock::new(name.to_string()),
            slots: RwLock::new(kind.properties().default_slots()),
            code: Mutex::new(ReturnCode::Ok),
            children: RwLock::new(BTreeMap::new()),
            kind,
        }
    }

    /// Creates a resource and applies construction-time values.
    ///
    /// Unlike [`Resource::update`], construct-only properties may be set here.
    pub fn with_values<I, K>(name: &str, kind: Arc<ResourceKind>, values: I) -> ResourceResult<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let resource = Self::new(name, kind);
        {
            let mut slots = resource.slots.write();
            for (key, value) in values {
                let key = key.as_ref();
                let spec = resource
                    .kind
                    .properties()
                    .get(key)
                    .ok_or_else(|| ResourceError::NoResource(key.to_string()))?;
                if !spec.access().contains(Access::WRITE) {
                    return Err(ResourceError::NoUpdate(key.to_string()));
                }
                spec.set(&mut slots, value)?;
            }
        }
        Ok(resource)
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    /// Renames the resource. Empty names are rejected.
    pub fn set_name(&self, name: &str) -> ResourceResult<()> {
        if name.is_empty() {
            return Err(ResourceError::NullArgument("name".into()));
        }
        let mut current = self.name.write();
        info!(from = %current, to = name, "Changed resource name");
        *current = name.to_string();
        Ok(())
    }

    pub fn kind(&self) -> &Arc<ResourceKind> {
        &self.kind
    }

    /// Result of the most recently completed operation.
    pub fn code(&self) -> ReturnCode {
        *self.code.lock()
    }

    pub fn set_code(&self, code: ReturnCode) {
        tracing::trace!(resource = %self.name(), %code, "Setting return code");
        *self.code.lock() = code;
    }

    fn finish<T>(&self, result: ResourceResult<T>) -> ResourceResult<T> {
        self.set_code(ReturnCode::from(&result));
        result
    }

    // --- Children ---

    pub fn is_composite(&self) -> bool {
        self.kind.is_composite()
    }

    pub fn child(&self, name: &str) -> Option<Arc<Resource>> {
        self.children.read().get(name).cloned()
    }

    /// Names of the children, sorted.
    pub fn children(&self) -> Vec<String> {
        self.children.read().keys().cloned().collect()
    }

    /// Attaches an existing resource as a child, keyed by its name.
    pub fn add_child(&self, child: Arc<Resource>) -> ResourceResult<()> {
        let name = child.name();
        if !self.is_composite() {
            warn!(resource = %self.name(), child = %name, "Resource cannot hold children");
            return Err(ResourceError::NoCreate(name));
        }
        let mut children = self.children.write();
        if children.contains_key(&name) {
            warn!(resource = %self.name(), child = %name, "Child already exists");
            return Err(ResourceError::NoCreate(name));
        }
        children.insert(name, child);
        Ok(())
    }

    // --- CRUD ---

    /// Creates a new resource called `name` through the kind's Creator.
    ///
    /// Composite resources attach the new resource as a child.
    pub fn create(&self, name: &str, description: &str) -> ResourceResult<Arc<Resource>> {
        let result = self.create_inner(name, description);
        self.finish(result)
    }

    fn create_inner(&self, name: &str, description: &str) -> ResourceResult<Arc<Resource>> {
        if name.is_empty() {
            return Err(ResourceError::NullArgument("name".into()));
        }
        debug!(resource = %self.name(), child = name, description, "Create");
        if self.children.read().contains_key(name) {
            warn!(resource = %self.name(), child = name, "Child already exists");
            return Err(ResourceError::NoCreate(name.to_string()));
        }

        let created = self.kind.creator().create(name, description)?;
        if self.is_composite() {
            if let Err(e) = self.add_child(Arc::clone(&created)) {
                // Lost a race with a concurrent create of the same name.
                if let Err(release) = self.kind.deleter().delete(&created) {
                    warn!(resource = %self.name(), child = name, error = %release, "Unable to release duplicate child");
                }
                return Err(e);
            }
        }
        info!(resource = %self.name(), child = name, "Created");
        Ok(created)
    }

    /// Reads one or more properties in order.
    ///
    /// Stops at the first unknown (`NO_RESOURCE`) or unreadable (`NO_READ`)
    /// name; values read before the failure stay in the batch.
    pub fn read(&self, names: &[&str]) -> Batch<Value> {
        if names.is_empty() {
            let batch = Batch::rejected("", ResourceError::NullArgument("property".into()));
            self.set_code(batch.code());
            return batch;
        }

        let mut batch = Batch::new();
        {
            let slots = self.slots.read();
            for &name in names {
                let result = self.read_slot(&slots, name);
                let failed = result.is_err();
                batch.push(name, result);
                if failed {
                    break;
                }
            }
        }

        match batch.error() {
            Some(e) => warn!(resource = %self.name(), error = %e, "Read failed"),
            None => debug!(resource = %self.name(), count = batch.len(), "Read"),
        }
        self.set_code(batch.code());
        batch
    }

    fn read_slot(&self, slots: &Slots, name: &str) -> ResourceResult<Value> {
        if name.is_empty() {
            return Err(ResourceError::NullArgument("property".into()));
        }
        let spec = self
            .kind
            .properties()
            .get(name)
            .ok_or_else(|| ResourceError::NoResource(name.to_string()))?;
        if !spec.access().is_readable() {
            return Err(ResourceError::NoRead(name.to_string()));
        }
        Ok(spec.get(self, slots))
    }

    /// Reads a single property.
    pub fn read_one(&self, name: &str) -> ResourceResult<Value> {
        self.read(&[name])
            .into_result()
            .map(|mut values| values.remove(0).1)
    }

    /// Updates one or more properties in order.
    ///
    /// Unknown, read-only and construct-only names fail with `NO_UPDATE`, as
    /// does a value that does not fit the declared type. Processing stops at
    /// the first failure and earlier writes are kept.
    pub fn update<I, K>(&self, values: I) -> Batch<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let values: Vec<(K, Value)> = values.into_iter().collect();
        if values.is_empty() {
            let batch = Batch::rejected("", ResourceError::NullArgument("property".into()));
            self.set_code(batch.code());
            return batch;
        }

        let mut batch = Batch::new();
        {
            let mut slots = self.slots.write();
            for (name, value) in values {
                let name = name.as_ref();
                let result = self.write_slot(&mut slots, name, value);
                let failed = result.is_err();
                batch.push(name, result);
                if failed {
                    break;
                }
            }
        }

        match batch.error() {
            Some(e) => warn!(resource = %self.name(), error = %e, "Update failed"),
            None => info!(resource = %self.name(), count = batch.len(), "Updated"),
        }
        self.set_code(batch.code());
        batch
    }

    fn write_slot(&self, slots: &mut Slots, name: &str, value: Value) -> ResourceResult<()> {
        if name.is_empty() {
            return Err(ResourceError::NullArgument("property".into()));
        }
        debug!(resource = %self.name(), property = name, %value, "Update");
        let spec = self
            .kind
            .properties()
            .get(name)
            .filter(|spec| spec.access().is_updatable())
            .ok_or_else(|| ResourceError::NoUpdate(name.to_string()))?;
        spec.set(slots, value)
    }

    /// Updates a single property.
    pub fn update_one(&self, name: &str, value: Value) -> ResourceResult<()> {
        self.update([(name, value)]).into_result().map(|_| ())
    }

    /// Deletes the child called `name`.
    ///
    /// Leaf resources have nothing to release and always succeed. Composite
    /// resources cascade the deletion through the child's own children before
    /// handing the child to the kind's Deleter.
    pub fn delete(&self, name: &str) -> ResourceResult<()> {
        let result = self.delete_inner(name);
        self.finish(result)
    }

    fn delete_inner(&self, name: &str) -> ResourceResult<()> {
        if name.is_empty() {
            return Err(ResourceError::NullArgument("name".into()));
        }
        if !self.is_composite() {
            return Ok(());
        }

        // Detach first so concurrent deletes of the same name cannot both
        // reach the Deleter.
        let child = self
            .children
            .write()
            .remove(name)
            .ok_or_else(|| ResourceError::NoResource(name.to_string()))?;
        debug!(resource = %self.name(), child = name, "Delete");

        let released = child
            .children()
            .iter()
            .try_for_each(|grandchild| child.delete(grandchild))
            .and_then(|_| self.kind.deleter().delete(&child));
        if let Err(e) = released {
            self.restore_child(name, child);
            return Err(e);
        }
        info!(resource = %self.name(), child = name, size = self.children.read().len(), "Deleted");
        Ok(())
    }

    /// Re-attaches a child whose deletion failed.
    fn restore_child(&self, name: &str, child: Arc<Resource>) {
        let mut children = self.children.write();
        if children.contains_key(name) {
            warn!(resource = %self.name(), child = name, "Name reused while delete failed, dropping child");
            return;
        }
        children.insert(name.to_string(), child);
    }

    /// Writes a summary of the resource into `formatter`: its name, kind,
    /// readable properties and children.
    pub fn describe(&self, formatter: &mut dyn Formatter) {
        formatter.begin_object();
        formatter.set_member_name("name");
        formatter.set_string_value(&self.name());
        formatter.set_member_name("kind");
        formatter.set_string_value(self.kind.name());

        formatter.set_member_name("properties");
        formatter.begin_object();
        {
            let slots = self.slots.read();
            for spec in self.kind.properties().iter() {
                if spec.access().is_readable() {
                    formatter.set_member_name(spec.name());
                    spec.renderer().add_value(formatter, &spec.get(self, &slots));
                }
            }
        }
        formatter.end_object();

        if self.is_composite() {
            formatter.set_member_name("children");
            formatter.begin_object();
            for (name, child) in self.children.read().iter() {
                formatter.set_member_name(name);
                formatter.set_string_value(child.kind.name());
            }
            formatter.end_object();
        }
        formatter.end_object();
        self.set_code(ReturnCode::Ok);
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &*self.name.read())
            .field("kind", &self.kind.name())
            .field("code", &self.code())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{MockCreator, MockDeleter};
    use crate::framework::{Creator, Deleter, JsonFormatter, PropertySpec};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    fn element_kind() -> Arc<ResourceKind> {
        ResourceKind::builder("element")
            .property(PropertySpec::stored("state", "Current state", "null", Access::READ_WRITE))
            .property(PropertySpec::stored("latency", "Latency", 20u64, Access::READ_WRITE))
            .property(PropertySpec::stored("eos", "Send EOS", false, Access::WRITE))
            .property(PropertySpec::stored("caps", "Negotiated caps", "ANY", Access::READ))
            .property(PropertySpec::stored(
                "description",
                "Launch description",
                "",
                Access::READ | Access::WRITE | Access::CONSTRUCT_ONLY,
            ))
            .build()
    }

    #[test]
    fn test_fresh_resource_reports_ok() {
        let resource = Resource::new("e0", element_kind());
        assert_eq!(resource.code(), ReturnCode::Ok);
        assert_eq!(resource.name(), "e0");
    }

    #[test]
    fn test_empty_name_defaults() {
        let resource = Resource::new("", element_kind());
        assert_eq!(resource.name(), DEFAULT_NAME);
        assert!(resource.set_name("").is_err());
        resource.set_name("renamed").unwrap();
        assert_eq!(resource.read_one("name").unwrap(), Value::from("renamed"));
    }

    #[test]
    fn test_read_in_order() {
        let resource = Resource::new("e0", element_kind());
        let batch = resource.read(&["state", "latency"]);
        assert!(batch.is_ok());
        let values = batch.into_result().unwrap();
        assert_eq!(values[0], ("state".to_string(), Value::from("null")));
        assert_eq!(values[1], ("latency".to_string(), Value::UInt(20)));
    }

    #[test]
    fn test_read_unknown_stops_batch() {
        let resource = Resource::new("e0", element_kind());
        let batch = resource.read(&["state", "bogus", "latency"]);

        assert_eq!(batch.code(), ReturnCode::NoResource);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.successes().next(), Some(("state", &Value::from("null"))));
        assert_eq!(resource.code(), ReturnCode::NoResource);
    }

    #[test]
    fn test_read_write_only_property() {
        let resource = Resource::new("e0", element_kind());
        assert_eq!(resource.read_one("eos").unwrap_err().code(), ReturnCode::NoRead);
    }

    #[test]
    fn test_empty_arguments_rejected() {
        let resource = Resource::new("e0", element_kind());
        assert_eq!(resource.read(&[]).code(), ReturnCode::NullArgument);
        assert_eq!(resource.read(&[""]).code(), ReturnCode::NullArgument);
        let none: Vec<(&str, Value)> = Vec::new();
        assert_eq!(resource.update(none).code(), ReturnCode::NullArgument);
        assert_eq!(resource.create("", "").unwrap_err().code(), ReturnCode::NullArgument);
        assert_eq!(resource.delete("").unwrap_err().code(), ReturnCode::NullArgument);
    }

    #[test]
    fn test_update_read_only_keeps_value() {
        let resource = Resource::new("e0", element_kind());
        let batch = resource.update([("caps", Value::from("video/x-raw"))]);
        assert_eq!(batch.code(), ReturnCode::NoUpdate);
        assert_eq!(resource.read_one("caps").unwrap(), Value::from("ANY"));

        let err = resource.update_one("description", Value::from("fakesrc")).unwrap_err();
        assert_eq!(err.code(), ReturnCode::NoUpdate);
        assert_eq!(resource.update_one("bogus", Value::Int(1)).unwrap_err().code(), ReturnCode::NoUpdate);
    }

    #[test]
    fn test_update_has_no_rollback() {
        let resource = Resource::new("e0", element_kind());
        let batch = resource.update([
            ("state", Value::from("playing")),
            ("latency", Value::from("not-a-number")),
            ("eos", Value::Bool(true)),
        ]);

        assert_eq!(batch.code(), ReturnCode::NoUpdate);
        assert_eq!(batch.len(), 2);
        assert_eq!(resource.read_one("state").unwrap(), Value::from("playing"));
        assert_eq!(resource.read_one("latency").unwrap(), Value::UInt(20));
    }

    #[test]
    fn test_construct_time_values() {
        let resource = Resource::with_values(
            "p0",
            element_kind(),
            [("description", Value::from("videotestsrc ! fakesink"))],
        )
        .unwrap();
        assert_eq!(resource.read_one("description").unwrap(), Value::from("videotestsrc ! fakesink"));

        let err = Resource::with_values("p1", element_kind(), [("caps", Value::from("x"))]).unwrap_err();
        assert_eq!(err.code(), ReturnCode::NoUpdate);
    }

    #[test]
    fn test_base_create_fails_and_leaf_delete_succeeds() {
        let resource = Resource::new("e0", element_kind());
        assert_eq!(resource.create("child", "").unwrap_err().code(), ReturnCode::NoCreate);
        assert_eq!(resource.code(), ReturnCode::NoCreate);

        assert!(resource.delete("anything").is_ok());
        assert_eq!(resource.code(), ReturnCode::Ok);
    }

    #[test]
    fn test_describe() {
        let resource = Resource::new("e0", element_kind());
        let mut formatter = JsonFormatter::new();
        resource.describe(&mut formatter);

        let json = formatter.into_value().unwrap();
        assert_eq!(json["name"], "e0");
        assert_eq!(json["kind"], "element");
        assert_eq!(json["properties"]["latency"], "20");
        assert!(json["properties"].get("eos").is_none());
        assert!(json.get("children").is_none());
    }

    /// Counts deletions and holds each one long enough for callers to overlap.
    #[derive(Default)]
    struct SlowDeleter {
        calls: AtomicUsize,
    }

    impl Deleter for Arc<SlowDeleter> {
        fn delete(&self, _: &Resource) -> ResourceResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(100));
            Ok(())
        }
    }

    fn collection(deleter: Arc<SlowDeleter>) -> Resource {
        let kind = ResourceKind::builder("collection")
            .creator(MockCreator::with_kind(element_kind()))
            .deleter(deleter)
            .composite()
            .build();
        Resource::new("pipelines", kind)
    }

    #[test]
    fn test_concurrent_delete_releases_once() {
        let deleter = Arc::new(SlowDeleter::default());
        let pipelines = collection(Arc::clone(&deleter));
        pipelines.create("p0", "").unwrap();

        let barrier = Barrier::new(2);
        let (barrier, pipelines) = (&barrier, &pipelines);
        let results: Vec<ResourceResult<()>> = thread::scope(|s| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    s.spawn(move || {
                        barrier.wait();
                        pipelines.delete("p0")
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(deleter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| r.as_ref().err().map(ResourceError::code) == Some(ReturnCode::NoResource)));
        assert!(pipelines.children().is_empty());
    }

    #[test]
    fn test_concurrent_create_same_name() {
        let deleter = Arc::new(SlowDeleter::default());
        let pipelines = collection(deleter);

        let barrier = Barrier::new(8);
        let (barrier, pipelines) = (&barrier, &pipelines);
        let created = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(move || {
                        barrier.wait();
                        pipelines.create("p0", "").is_ok()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count()
        });
        assert_eq!(created, 1);
        assert_eq!(pipelines.children(), vec!["p0".to_string()]);
    }

    /// Holds each create until `parties` creates are in flight.
    struct RendezvousCreator {
        barrier: Barrier,
    }

    impl Creator for RendezvousCreator {
        fn create(&self, name: &str, _: &str) -> ResourceResult<Arc<Resource>> {
            self.barrier.wait();
            Ok(Arc::new(Resource::new(name, element_kind())))
        }
    }

    fn lose_create_race(deleter: &MockDeleter) -> (Resource, Vec<ResourceResult<Arc<Resource>>>) {
        let kind = ResourceKind::builder("collection")
            .creator(RendezvousCreator { barrier: Barrier::new(2) })
            .deleter(deleter.clone())
            .composite()
            .build();
        let pipelines = Resource::new("pipelines", kind);
        let results = thread::scope(|s| {
            let pipelines = &pipelines;
            let handles: Vec<_> = (0..2).map(|_| s.spawn(move || pipelines.create("p0", ""))).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        (pipelines, results)
    }

    #[test]
    fn test_lost_create_race_releases_duplicate() {
        let deleter = MockDeleter::new();
        let (pipelines, results) = lose_create_race(&deleter);

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(deleter.deleted(), vec!["p0"]);
        assert_eq!(pipelines.children(), vec!["p0".to_string()]);
    }

    #[test]
    fn test_lost_create_race_with_refusing_deleter() {
        let deleter = MockDeleter::new();
        deleter.refuse();
        let (pipelines, results) = lose_create_race(&deleter);

        let codes: Vec<ReturnCode> = results
            .iter()
            .map(|r| r.as_ref().map_or_else(ResourceError::code, |_| ReturnCode::Ok))
            .collect();
        assert!(codes.contains(&ReturnCode::Ok));
        assert!(codes.contains(&ReturnCode::NoCreate));
        assert_eq!(pipelines.children(), vec!["p0".to_string()]);
    }

    #[test]
    fn test_concurrent_batches_never_interleave() {
        let resource = Resource::new("e0", element_kind());
        let batches = [
            [("state", Value::from("playing")), ("latency", Value::UInt(1))],
            [("state", Value::from("paused")), ("latency", Value::UInt(2))],
        ];
        let consistent = |state: &Value, latency: &Value| {
            matches!(
                (state.as_str(), latency),
                (Some("null"), Value::UInt(20)) | (Some("playing"), Value::UInt(1)) | (Some("paused"), Value::UInt(2))
            )
        };

        thread::scope(|s| {
            for batch in &batches {
                let resource = &resource;
                s.spawn(move || {
                    for _ in 0..200 {
                        assert!(resource.update(batch.clone()).is_ok());
                        assert_eq!(resource.code(), ReturnCode::Ok);
                    }
                });
            }
            let (resource, consistent) = (&resource, &consistent);
            s.spawn(move || {
                for _ in 0..200 {
                    let values = resource.read(&["state", "latency"]).into_result().unwrap();
                    assert!(consistent(&values[0].1, &values[1].1), "{values:?}");
                }
            });
        });

        let state = resource.read_one("state").unwrap();
        let latency = resource.read_one("latency").unwrap();
        assert!(consistent(&state, &latency));
        assert_eq!(resource.code(), ReturnCode::Ok);
    }
}
