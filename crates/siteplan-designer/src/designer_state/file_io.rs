//! Snapshot export/import, the snapshot store and scene conversion for
//! designer state.

use std::path::Path;

use siteplan_core::error::{ConversionError, PersistenceError, SnapshotError};
use siteplan_core::event_bus::{ConversionEvent, PlanEvent, SnapshotEvent};

use super::DesignerState;
use crate::canvas::DrawingMode;
use crate::conversion::{ConversionProgress, SceneConverter};
use crate::persistence::{PlanStore, StoredPlan};
use crate::serialization::{DecodeReport, PlanningSnapshot};

impl DesignerState {
    /// Flushes pending input and encodes the model.
    pub fn snapshot(&mut self) -> PlanningSnapshot {
        self.flush_frame();
        let snapshot = PlanningSnapshot::from_canvas(&self.canvas);
        self.emit(PlanEvent::Snapshot(SnapshotEvent::Flushed {
            empty: snapshot.is_empty(),
        }));
        snapshot
    }

    /// Replaces the model with a snapshot. Drafts and sessions are
    /// discarded; the model is untouched on error.
    pub fn load_snapshot(
        &mut self,
        snapshot: &PlanningSnapshot,
    ) -> Result<DecodeReport, SnapshotError> {
        snapshot.check_version()?;
        self.pending = Default::default();
        self.cancel();
        let report = snapshot.apply_to(&mut self.canvas)?;
        if !self.mode.allowed_on(self.canvas.active_layer().kind) {
            self.mode = DrawingMode::Select;
        }
        self.hover = None;
        self.is_modified = false;
        self.emit(PlanEvent::Snapshot(SnapshotEvent::Loaded {
            features: report.features,
        }));
        self.emit_view();
        Ok(report)
    }

    /// Saves the current model to a store. An empty model writes the
    /// cleared marker.
    pub fn save_to_store(&mut self, store: &PlanStore) -> Result<StoredPlan, PersistenceError> {
        let snapshot = self.snapshot();
        let stored = store.save(&snapshot)?;
        self.is_modified = false;
        Ok(stored)
    }

    /// Loads from a store. A cleared store empties the model; a store never
    /// saved leaves it as is.
    pub fn load_from_store(&mut self, store: &PlanStore) -> siteplan_core::Result<StoredPlan> {
        let stored = store.load()?;
        match &stored {
            StoredPlan::NeverSaved => {
                tracing::debug!("No saved plan at {}", store.path().display());
            }
            StoredPlan::Cleared { saved_at } => {
                tracing::info!("Plan was cleared at {}", saved_at);
                self.cancel();
                self.canvas.clear_features();
                self.is_modified = false;
                self.emit(PlanEvent::Snapshot(SnapshotEvent::Loaded { features: 0 }));
            }
            StoredPlan::Saved { snapshot, .. } => {
                self.load_snapshot(snapshot)?;
            }
        }
        Ok(stored)
    }

    /// Hands a flushed snapshot to the scene converter. Progress is
    /// published as conversion events; the model is never modified.
    pub fn convert_scene(
        &mut self,
        converter: &mut dyn SceneConverter,
        overwrite: bool,
    ) -> Result<(), ConversionError> {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            let err = ConversionError::Rejected {
                reason: "the plan has no features".to_string(),
            };
            self.emit(PlanEvent::Conversion(ConversionEvent::Failed {
                message: err.to_string(),
            }));
            return Err(err);
        }

        let events = self.events.clone();
        let mut report = |progress: ConversionProgress| {
            let progress = progress.clamped();
            events.publish(PlanEvent::Conversion(ConversionEvent::Progress {
                step: progress.step,
                percent: progress.percent,
            }));
        };

        tracing::info!(
            "Converting plan with {} features (overwrite: {})",
            snapshot.feature_count(),
            overwrite
        );
        match converter.convert(&snapshot, overwrite, &mut report) {
            Ok(()) => {
                self.emit(PlanEvent::Conversion(ConversionEvent::Finished));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Scene conversion failed: {}", e);
                self.emit(PlanEvent::Conversion(ConversionEvent::Failed {
                    message: e.to_string(),
                }));
                Err(e)
            }
        }
    }

    /// Save the plan to a snapshot file.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let snapshot = self.snapshot();
        snapshot.save_to_file(path)?;
        self.is_modified = false;
        Ok(())
    }

    /// Load a plan from a snapshot file.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<DecodeReport> {
        let snapshot = PlanningSnapshot::load_from_file(path)?;
        Ok(self.load_snapshot(&snapshot)?)
    }
}
