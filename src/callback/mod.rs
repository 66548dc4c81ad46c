//! Callback system for training events
//!
//! Provides the hooks an external training loop drives:
//! - `on_train_begin` / `on_train_end`
//! - `on_epoch_end` (receives the epoch's validation loss and the model
//!   snapshot capability)
//!
//! # Example
//!
//! ```rust
//! use vigilar::callback::{TrainerCallback, CallbackContext, CallbackAction};
//! use vigilar::snapshot::Snapshot;
//!
//! struct PrintCallback;
//!
//! impl TrainerCallback for PrintCallback {
//!     fn on_epoch_end(
//!         &mut self,
//!         ctx: &CallbackContext,
//!         _model: &dyn Snapshot,
//!     ) -> vigilar::Result<CallbackAction> {
//!         println!("Epoch {} finished with val_loss {:.4}", ctx.epoch, ctx.val_loss);
//!         Ok(CallbackAction::Continue)
//!     }
//! }
//! ```

mod early_stopping;
mod manager;
mod traits;

pub use early_stopping::{EarlyStopping, EarlyStoppingConfig};
pub use manager::CallbackManager;
pub use traits::{CallbackAction, CallbackContext, TrainerCallback};
