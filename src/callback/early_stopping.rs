//! Early stopping monitor that checkpoints the best model and halts
//! training when validation loss stops improving

use std::path::{Path, PathBuf};

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};
use crate::snapshot::{Snapshot, SnapshotWriter};
use crate::{Error, Result};

/// Configuration for [`EarlyStopping`]
///
/// Immutable after the monitor is constructed. Numeric fields are
/// validated eagerly: `patience` must be at least 1 and `tolerance`
/// must be finite and non-negative.
#[derive(Clone, Debug)]
pub struct EarlyStoppingConfig {
    /// Directory snapshots are written to
    pub output_dir: PathBuf,
    /// Consecutive non-improving epochs tolerated before stopping
    pub patience: usize,
    /// Log a message for each validation loss
    pub verbose: bool,
    /// Whether snapshots are actually written to disk
    pub checkpoint: bool,
    /// Minimum decrease in validation loss that counts as improvement
    pub tolerance: f32,
    /// Suffix appended to artifact names to distinguish runs
    pub suffix: String,
}

impl Default for EarlyStoppingConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data/model"),
            patience: 10,
            verbose: false,
            checkpoint: true,
            tolerance: 1e-4,
            suffix: String::new(),
        }
    }
}

impl EarlyStoppingConfig {
    /// Create a configuration writing snapshots to `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into(), ..Self::default() }
    }

    /// Set the number of non-improving epochs tolerated before stopping
    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = patience;
        self
    }

    /// Enable per-epoch log messages
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enable or disable snapshot writes (state updates are unaffected)
    pub fn with_checkpoint(mut self, checkpoint: bool) -> Self {
        self.checkpoint = checkpoint;
        self
    }

    /// Set the minimum decrease that counts as improvement
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the artifact name suffix
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Validate numeric fields
    pub fn validate(&self) -> Result<()> {
        if self.patience < 1 {
            return Err(Error::InvalidPatience(self.patience));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

/// Early stopping monitor with best-model checkpointing
///
/// Tracks the best validation loss seen so far. An epoch whose loss drops
/// below `best - tolerance` persists a snapshot (two artifacts: parameters
/// and full model state) and resets the stall counter; any other epoch
/// increments it. Once `patience` consecutive epochs pass without
/// improvement the stop flag trips and stays set.
///
/// # Example
///
/// ```no_run
/// use vigilar::{EarlyStopping, EarlyStoppingConfig};
///
/// let config = EarlyStoppingConfig::new("data/model")
///     .with_patience(5)
///     .with_tolerance(1e-4);
/// let monitor = EarlyStopping::new(config).unwrap();
/// ```
#[derive(Debug)]
pub struct EarlyStopping {
    config: EarlyStoppingConfig,
    writer: SnapshotWriter,
    /// Best validation loss seen so far
    best_loss: Option<f32>,
    /// Consecutive epochs without improvement
    stall_count: usize,
    /// Terminal stop flag
    stopped: bool,
}

impl EarlyStopping {
    /// Create a monitor, validating the configuration
    pub fn new(config: EarlyStoppingConfig) -> Result<Self> {
        config.validate()?;
        let writer = SnapshotWriter::new(&config.output_dir, config.suffix.clone());
        Ok(Self { config, writer, best_loss: None, stall_count: 0, stopped: false })
    }

    /// Record this epoch's validation loss
    ///
    /// The first call always persists a snapshot and establishes the
    /// baseline. Later calls persist and reset the stall counter on
    /// improvement beyond the tolerance, or increment it otherwise.
    /// Persistence happens before state is recorded, so a failed save
    /// returns `Err` with the comparison state unchanged.
    pub fn update(&mut self, val_loss: f32, model: &dyn Snapshot) -> Result<()> {
        match self.best_loss {
            None => {
                self.save_snapshot(None, val_loss, model)?;
                self.best_loss = Some(val_loss);
            }
            Some(best) if val_loss < best - self.config.tolerance => {
                self.save_snapshot(Some(best), val_loss, model)?;
                self.best_loss = Some(val_loss);
                self.stall_count = 0;
            }
            Some(best) => {
                if !self.stopped {
                    self.stall_count += 1;
                    if self.config.verbose {
                        log::info!(
                            "no improvement: stall_count={} patience={} val_loss={:.6} best_loss={:.6}",
                            self.stall_count,
                            self.config.patience,
                            val_loss,
                            best
                        );
                    }
                    if self.stall_count >= self.config.patience {
                        self.stopped = true;
                        log::info!(
                            "early stopping: no improvement for {} epochs (best_loss={:.6})",
                            self.config.patience,
                            best
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether patience is exhausted and training should halt
    pub fn should_stop(&self) -> bool {
        self.stopped
    }

    /// Best validation loss seen so far
    pub fn best_loss(&self) -> Option<f32> {
        self.best_loss
    }

    /// Consecutive epochs since the last qualifying improvement
    pub fn stall_count(&self) -> usize {
        self.stall_count
    }

    /// Path of the parameters-only artifact
    pub fn parameters_path(&self) -> PathBuf {
        self.writer.parameters_path()
    }

    /// Path of the full-model artifact
    pub fn model_path(&self) -> PathBuf {
        self.writer.model_path()
    }

    /// Directory snapshots are written to
    pub fn output_dir(&self) -> &Path {
        self.writer.output_dir()
    }

    /// Reset internal state for a fresh run
    pub fn reset(&mut self) {
        self.best_loss = None;
        self.stall_count = 0;
        self.stopped = false;
    }

    fn save_snapshot(
        &mut self,
        previous: Option<f32>,
        val_loss: f32,
        model: &dyn Snapshot,
    ) -> Result<()> {
        if self.config.verbose {
            match previous {
                Some(best) => log::info!(
                    "validation loss decreased: best_loss={best:.6} val_loss={val_loss:.6}, saving snapshot"
                ),
                None => log::info!("first validation loss: val_loss={val_loss:.6}, saving snapshot"),
            }
        }
        if self.config.checkpoint {
            self.writer.write(model)?;
        }
        Ok(())
    }
}

impl TrainerCallback for EarlyStopping {
    fn on_epoch_end(
        &mut self,
        ctx: &CallbackContext,
        model: &dyn Snapshot,
    ) -> Result<CallbackAction> {
        self.update(ctx.val_loss, model)?;
        if self.stopped {
            Ok(CallbackAction::Stop)
        } else {
            Ok(CallbackAction::Continue)
        }
    }

    fn name(&self) -> &'static str {
        "EarlyStopping"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Model, ModelMetadata, TensorData};
    use tempfile::TempDir;

    fn make_model() -> Model {
        let params = vec![
            TensorData::new("weight", vec![2], vec![1.0, 2.0]),
            TensorData::new("bias", vec![1], vec![0.5]),
        ];
        Model::new(ModelMetadata::new("test-model", "linear"), params)
    }

    fn make_monitor(dir: &TempDir, patience: usize, tolerance: f32) -> EarlyStopping {
        let config =
            EarlyStoppingConfig::new(dir.path()).with_patience(patience).with_tolerance(tolerance);
        EarlyStopping::new(config).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = EarlyStoppingConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("data/model"));
        assert_eq!(config.patience, 10);
        assert!(!config.verbose);
        assert!(config.checkpoint);
        assert_eq!(config.tolerance, 1e-4);
        assert!(config.suffix.is_empty());
    }

    #[test]
    fn test_config_rejects_zero_patience() {
        let config = EarlyStoppingConfig::new("/tmp/x").with_patience(0);
        assert!(matches!(EarlyStopping::new(config), Err(Error::InvalidPatience(0))));
    }

    #[test]
    fn test_config_rejects_negative_tolerance() {
        let config = EarlyStoppingConfig::new("/tmp/x").with_tolerance(-1e-3);
        assert!(matches!(EarlyStopping::new(config), Err(Error::InvalidTolerance(_))));
    }

    #[test]
    fn test_config_rejects_non_finite_tolerance() {
        let config = EarlyStoppingConfig::new("/tmp/x").with_tolerance(f32::NAN);
        assert!(matches!(EarlyStopping::new(config), Err(Error::InvalidTolerance(_))));

        let config = EarlyStoppingConfig::new("/tmp/x").with_tolerance(f32::INFINITY);
        assert!(matches!(EarlyStopping::new(config), Err(Error::InvalidTolerance(_))));
    }

    #[test]
    fn test_first_update_saves_and_sets_baseline() {
        let dir = TempDir::new().unwrap();
        let mut es = make_monitor(&dir, 3, 0.0);
        let model = make_model();

        es.update(42.0, &model).unwrap();

        // First loss is recorded regardless of magnitude
        assert_eq!(es.best_loss(), Some(42.0));
        assert_eq!(es.stall_count(), 0);
        assert!(!es.should_stop());
        assert!(es.parameters_path().exists());
        assert!(es.model_path().exists());
    }

    #[test]
    fn test_improvement_saves_and_resets_counter() {
        let dir = TempDir::new().unwrap();
        let mut es = make_monitor(&dir, 3, 0.0);
        let model = make_model();

        es.update(1.0, &model).unwrap();
        es.update(1.1, &model).unwrap();
        assert_eq!(es.stall_count(), 1);

        es.update(0.5, &model).unwrap();
        assert_eq!(es.best_loss(), Some(0.5));
        assert_eq!(es.stall_count(), 0);
    }

    #[test]
    fn test_improvement_within_tolerance_counts_as_stall() {
        let dir = TempDir::new().unwrap();
        let mut es = make_monitor(&dir, 3, 0.01);
        let model = make_model();

        es.update(1.000, &model).unwrap();
        // Improvement of 0.005 is below the 0.01 tolerance
        es.update(0.995, &model).unwrap();

        assert_eq!(es.best_loss(), Some(1.000));
        assert_eq!(es.stall_count(), 1);
    }

    #[test]
    fn test_patience_exhaustion_scenario() {
        let dir = TempDir::new().unwrap();
        let mut es = make_monitor(&dir, 3, 0.0);
        let model = make_model();

        // losses = [1.0, 0.9, 0.95, 0.95, 0.95], patience = 3
        es.update(1.0, &model).unwrap();
        assert_eq!(es.best_loss(), Some(1.0));
        assert_eq!(es.stall_count(), 0);

        es.update(0.9, &model).unwrap();
        assert_eq!(es.best_loss(), Some(0.9));
        assert_eq!(es.stall_count(), 0);

        es.update(0.95, &model).unwrap();
        assert_eq!(es.stall_count(), 1);
        assert!(!es.should_stop());

        es.update(0.95, &model).unwrap();
        assert_eq!(es.stall_count(), 2);
        assert!(!es.should_stop());

        es.update(0.95, &model).unwrap();
        assert_eq!(es.stall_count(), 3);
        assert!(es.should_stop());
    }

    #[test]
    fn test_stop_is_terminal() {
        let dir = TempDir::new().unwrap();
        let mut es = make_monitor(&dir, 1, 0.0);
        let model = make_model();

        es.update(1.0, &model).unwrap();
        es.update(1.0, &model).unwrap();
        assert!(es.should_stop());

        // Further updates never clear the flag, even improvements
        es.update(0.1, &model).unwrap();
        assert!(es.should_stop());
        assert_eq!(es.best_loss(), Some(0.1));

        es.update(2.0, &model).unwrap();
        assert!(es.should_stop());
    }

    #[test]
    fn test_stall_count_saturates_at_patience() {
        let dir = TempDir::new().unwrap();
        let mut es = make_monitor(&dir, 2, 0.0);
        let model = make_model();

        es.update(1.0, &model).unwrap();
        for _ in 0..5 {
            es.update(1.0, &model).unwrap();
        }
        assert_eq!(es.stall_count(), 2);
        assert!(es.should_stop());
    }

    #[test]
    fn test_checkpoint_disabled_updates_state_without_artifacts() {
        let dir = TempDir::new().unwrap();
        let config = EarlyStoppingConfig::new(dir.path())
            .with_patience(3)
            .with_tolerance(0.0)
            .with_checkpoint(false);
        let mut es = EarlyStopping::new(config).unwrap();
        let model = make_model();

        es.update(1.0, &model).unwrap();
        es.update(0.5, &model).unwrap();
        es.update(0.6, &model).unwrap();

        assert_eq!(es.best_loss(), Some(0.5));
        assert_eq!(es.stall_count(), 1);
        assert!(!es.parameters_path().exists());
        assert!(!es.model_path().exists());
    }

    #[test]
    fn test_failed_save_leaves_state_unchanged() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, b"file, not dir").unwrap();

        let config = EarlyStoppingConfig::new(&blocker).with_patience(3);
        let mut es = EarlyStopping::new(config).unwrap();
        let model = make_model();

        assert!(es.update(1.0, &model).is_err());
        assert_eq!(es.best_loss(), None);
        assert_eq!(es.stall_count(), 0);
    }

    #[test]
    fn test_suffix_in_artifact_names() {
        let dir = TempDir::new().unwrap();
        let config = EarlyStoppingConfig::new(dir.path()).with_suffix("fold2");
        let es = EarlyStopping::new(config).unwrap();

        assert_eq!(es.output_dir(), dir.path());
        assert_eq!(es.parameters_path(), dir.path().join("checkpoint_fold2.safetensors"));
        assert_eq!(es.model_path(), dir.path().join("model_fold2.json"));
    }

    #[test]
    fn test_reset() {
        let dir = TempDir::new().unwrap();
        let mut es = make_monitor(&dir, 1, 0.0);
        let model = make_model();

        es.update(1.0, &model).unwrap();
        es.update(1.0, &model).unwrap();
        assert!(es.should_stop());

        es.reset();
        assert_eq!(es.best_loss(), None);
        assert_eq!(es.stall_count(), 0);
        assert!(!es.should_stop());
    }

    #[test]
    fn test_nan_loss_counts_as_stall() {
        let dir = TempDir::new().unwrap();
        let mut es = make_monitor(&dir, 3, 0.0);
        let model = make_model();

        es.update(1.0, &model).unwrap();
        es.update(f32::NAN, &model).unwrap();
        assert_eq!(es.best_loss(), Some(1.0));
        assert_eq!(es.stall_count(), 1);
    }

    #[test]
    fn test_callback_impl_stops_at_patience() {
        let dir = TempDir::new().unwrap();
        let mut es = make_monitor(&dir, 2, 0.0);
        let model = make_model();

        let mut ctx = CallbackContext { epoch: 0, max_epochs: 10, val_loss: 1.0 };
        assert_eq!(es.on_epoch_end(&ctx, &model).unwrap(), CallbackAction::Continue);

        ctx.epoch = 1;
        assert_eq!(es.on_epoch_end(&ctx, &model).unwrap(), CallbackAction::Continue);

        ctx.epoch = 2;
        assert_eq!(es.on_epoch_end(&ctx, &model).unwrap(), CallbackAction::Stop);
    }

    #[test]
    fn test_name() {
        let dir = TempDir::new().unwrap();
        let es = make_monitor(&dir, 3, 0.0);
        assert_eq!(es.name(), "EarlyStopping");
    }
}
