//! Model snapshot capability and persistence
//!
//! The monitor never sees a concrete model type. It depends on the
//! [`Snapshot`] capability (current parameters + identity) and asks
//! [`SnapshotWriter`] to persist the two artifacts per save event.

mod model;
mod writer;

pub use model::{Model, ModelMetadata, ModelState, ParameterInfo, Snapshot, TensorData};
pub use writer::SnapshotWriter;
