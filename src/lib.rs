//! vigilar — early stopping and best-model checkpointing for training loops
//!
//! The crate provides one stateful monitor, [`EarlyStopping`], driven once
//! per epoch by an external training loop. It tracks the best validation
//! loss seen so far, persists a snapshot of the best-performing model (a
//! parameters-only SafeTensors file plus a full-model JSON file), and trips
//! a terminal stop flag after `patience` consecutive non-improving epochs.
//!
//! The monitor depends only on the [`Snapshot`] capability, not a concrete
//! model type; implement it on whatever owns the weights, or use the
//! bundled [`Model`] container. The [`callback`] module carries the
//! [`TrainerCallback`] trait and [`CallbackManager`] through which a
//! training loop dispatches epoch events.
//!
//! # Example
//!
//! ```no_run
//! use vigilar::{EarlyStopping, EarlyStoppingConfig, Model, ModelMetadata, TensorData};
//!
//! let config = EarlyStoppingConfig::new("data/model")
//!     .with_patience(5)
//!     .with_tolerance(1e-4)
//!     .with_suffix("run1");
//! let mut monitor = EarlyStopping::new(config)?;
//!
//! let model = Model::new(
//!     ModelMetadata::new("mlp", "feedforward"),
//!     vec![TensorData::new("w", vec![2], vec![0.1, 0.2])],
//! );
//!
//! for _epoch in 0..100 {
//!     // ... train one epoch, compute validation loss ...
//!     let val_loss = 0.5;
//!     monitor.update(val_loss, &model)?;
//!     if monitor.should_stop() {
//!         break;
//!     }
//! }
//! # Ok::<(), vigilar::Error>(())
//! ```

pub mod callback;
mod error;
pub mod snapshot;

pub use callback::{
    CallbackAction, CallbackContext, CallbackManager, EarlyStopping, EarlyStoppingConfig,
    TrainerCallback,
};
pub use error::{Error, Result};
pub use snapshot::{
    Model, ModelMetadata, ModelState, ParameterInfo, Snapshot, SnapshotWriter, TensorData,
};
