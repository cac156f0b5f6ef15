//! Property tables for the pipeline kinds.

use super::capability::{PipelineCreator, PipelineDeleter};
use super::state::PipelineState;
use crate::framework::{
    Access, PropertySpec, Resource, ResourceError, ResourceKind, ResourceResult, Slots, TypeTag,
    TypedRenderer, Value,
};
use std::sync::Arc;
use tracing::warn;

pub const PIPELINE_KIND: &str = "pipeline";
pub const COLLECTION_KIND: &str = "pipelines";

pub const DESCRIPTION: &str = "description";
pub const STATE: &str = "state";
pub const LATENCY: &str = "latency";
pub const EOS: &str = "eos";
pub const ELEMENTS: &str = "elements";

/// Default pipeline latency in milliseconds.
pub const DEFAULT_LATENCY: u64 = 20;

/// Builds the `pipeline` kind.
pub fn pipeline_kind() -> Arc<ResourceKind> {
    ResourceKind::builder(PIPELINE_KIND)
        .property(PropertySpec::stored(
            DESCRIPTION,
            "The launch description the pipeline was built from",
            "",
            Access::READ | Access::WRITE | Access::CONSTRUCT_ONLY,
        ))
        .property(
            PropertySpec::stored(
                STATE,
                "The current state of the pipeline",
                PipelineState::Null.as_str(),
                Access::READ_WRITE,
            )
            .with_setter(set_state),
        )
        .property(
            PropertySpec::stored(LATENCY, "Pipeline latency in milliseconds", DEFAULT_LATENCY, Access::READ_WRITE)
                .with_renderer(TypedRenderer),
        )
        .property(PropertySpec::stored(EOS, "Send an end-of-stream event", false, Access::WRITE))
        .property(
            PropertySpec::computed(
                ELEMENTS,
                "Number of elements in the description",
                TypeTag::UInt,
                Access::READ,
                element_count,
            )
            .with_renderer(TypedRenderer),
        )
        .build()
}

/// Builds the `pipelines` collection kind, whose children are `pipeline`.
pub fn collection_kind(pipeline: Arc<ResourceKind>) -> Arc<ResourceKind> {
    ResourceKind::builder(COLLECTION_KIND)
        .creator(PipelineCreator::new(pipeline))
        .deleter(PipelineDeleter)
        .composite()
        .build()
}

fn set_state(slots: &mut Slots, value: Value) -> ResourceResult<()> {
    let text = value.as_str().unwrap_or_default();
    let state: PipelineState = text.parse().map_err(|e: String| {
        warn!(error = %e, "Rejected state change");
        ResourceError::NoUpdate(format!("{STATE} ({e})"))
    })?;
    slots.insert(STATE.to_string(), Value::from(state.as_str()));
    Ok(())
}

fn element_count(_: &Resource, slots: &Slots) -> Value {
    let count = slots
        .get(DESCRIPTION)
        .and_then(Value::as_str)
        .map(|description| element_names(description).count())
        .unwrap_or(0);
    Value::UInt(count as u64)
}

/// Names of the elements in a `a ! b ! c` style description.
pub fn element_names(description: &str) -> impl Iterator<Item = &str> {
    description
        .split('!')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}
