//! Creator and Deleter for pipelines.

use super::kind::{element_names, DESCRIPTION, STATE};
use super::state::PipelineState;
use crate::framework::{Creator, Deleter, Resource, ResourceError, ResourceKind, ResourceResult, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builds `pipeline` resources from a launch description.
#[derive(Debug, Clone)]
pub struct PipelineCreator {
    kind: Arc<ResourceKind>,
}

impl PipelineCreator {
    pub fn new(kind: Arc<ResourceKind>) -> Self {
        Self { kind }
    }
}

impl Creator for PipelineCreator {
    fn create(&self, name: &str, description: &str) -> ResourceResult<Arc<Resource>> {
        let segments = description.split('!').count();
        if element_names(description).count() != segments {
            warn!(pipeline = name, description, "Invalid pipeline description");
            return Err(ResourceError::NoCreate(name.to_string()));
        }

        let pipeline = Resource::with_values(
            name,
            Arc::clone(&self.kind),
            [(DESCRIPTION, Value::from(description))],
        )
        .map_err(|e| {
            warn!(pipeline = name, error = %e, "Unable to build pipeline");
            ResourceError::NoCreate(name.to_string())
        })?;
        debug!(pipeline = name, elements = segments, "Built pipeline");
        Ok(Arc::new(pipeline))
    }
}

/// Brings a pipeline back to `null` before it is released.
#[derive(Debug, Default, Clone, Copy)]
pub struct PipelineDeleter;

impl Deleter for PipelineDeleter {
    fn delete(&self, resource: &Resource) -> ResourceResult<()> {
        let null = PipelineState::Null.as_str();
        if resource.read_one(STATE)? != Value::from(null) {
            resource
                .update_one(STATE, Value::from(null))
                .map_err(|_| ResourceError::NoDelete(resource.name()))?;
        }
        info!(pipeline = %resource.name(), "Released pipeline");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::ReturnCode;
    use crate::pipeline::kind::pipeline_kind;

    #[test]
    fn test_create_rejects_bad_descriptions() {
        let creator = PipelineCreator::new(pipeline_kind());
        for description in ["", "videotestsrc !", "! fakesink", "a ! ! b"] {
            let err = creator.create("p0", description).unwrap_err();
            assert_eq!(err.code(), ReturnCode::NoCreate, "{description}");
        }
        let pipeline = creator.create("p0", "videotestsrc ! fakesink").unwrap();
        assert_eq!(pipeline.read_one(DESCRIPTION).unwrap(), Value::from("videotestsrc ! fakesink"));
    }

    #[test]
    fn test_delete_resets_state() {
        let pipeline = PipelineCreator::new(pipeline_kind()).create("p0", "fakesrc ! fakesink").unwrap();
        pipeline.update_one(STATE, Value::from("playing")).unwrap();

        PipelineDeleter.delete(&pipeline).unwrap();
        assert_eq!(pipeline.read_one(STATE).unwrap(), Value::from("null"));
    }
}
