//! Domain models shared across the pipeline stages.

pub mod event;
pub mod fault;

pub use event::{EnrichedEvent, Event};
pub use fault::{CoordPayload, FaultFeature, GeometryType, PropertyValue};
