//! Pipeline resource kinds.
//!
//! A `pipelines` collection creates and deletes `pipeline` resources. A
//! pipeline carries its launch description, a state, a latency and a
//! write-only end-of-stream trigger. These kinds hold no media; they give the
//! daemon a real tree to serve.

pub mod capability;
pub mod kind;
pub mod state;

pub use capability::{PipelineCreator, PipelineDeleter};
pub use kind::{collection_kind, pipeline_kind, COLLECTION_KIND, PIPELINE_KIND};
pub use state::PipelineState;

use crate::framework::{KindRegistry, ResourceKind, ResourceResult};
use std::sync::Arc;

/// Registers the pipeline kinds and returns the collection kind.
pub fn register(registry: &KindRegistry) -> ResourceResult<Arc<ResourceKind>> {
    let pipeline = pipeline_kind();
    registry.register(Arc::clone(&pipeline))?;
    let collection = collection_kind(pipeline);
    registry.register(Arc::clone(&collection))?;
    Ok(collection)
}
