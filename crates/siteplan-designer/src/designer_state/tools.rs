//! Tool modes, layer management, deletion and keyboard shortcuts.

use siteplan_core::error::ModelError;
use siteplan_core::event_bus::{FeatureKind, ModelEvent};

use super::{feature_kind, DesignerState, Key};
use crate::canvas::DrawingMode;
use crate::model::{FeatureRef, Layer, LayerKind, LayerParams, PlanningImage, ScatterAssignment};

impl DesignerState {
    /// Switches the tool. Tools the active layer forbids are refused.
    /// Pending drafts are committed before the switch.
    pub fn set_mode(&mut self, mode: DrawingMode) -> Result<(), ModelError> {
        let kind = self.canvas.active_layer().kind;
        if !mode.allowed_on(kind) {
            return Err(ModelError::ToolNotAllowed {
                tool: mode.to_string(),
                kind: kind.to_string(),
            });
        }
        if mode == self.mode {
            return Ok(());
        }
        self.flush_frame();
        self.commit_drafts();
        self.cancel_session();
        tracing::debug!("Tool {} -> {}", self.mode, mode);
        self.mode = mode;
        Ok(())
    }

    /// Makes `id` the active layer. Drafts are committed to the previous
    /// layer first; a tool the new layer forbids falls back to select.
    pub fn set_active_layer(&mut self, id: &str) -> Result<(), ModelError> {
        if self.canvas.layer(id).is_none() {
            return Err(ModelError::LayerNotFound { id: id.to_string() });
        }
        if self.canvas.active_layer_id() == id {
            return Ok(());
        }
        self.flush_frame();
        self.commit_drafts();
        self.cancel_session();

        let had_selection = self.canvas.selected().is_some();
        self.canvas.set_active_layer(id)?;
        self.after_active_layer_change(had_selection);
        Ok(())
    }

    fn after_active_layer_change(&mut self, had_selection: bool) {
        if !self.mode.allowed_on(self.canvas.active_layer().kind) {
            tracing::debug!("{} not allowed on new layer; switching to select", self.mode);
            self.mode = DrawingMode::Select;
        }
        if had_selection && self.canvas.selected().is_none() {
            self.emit_selection();
        }
        self.emit_model(ModelEvent::ActiveLayerChanged {
            id: self.canvas.active_layer_id().to_string(),
        });
    }

    /// Adds a layer of `kind` with default name, color and parameters.
    pub fn add_layer(&mut self, kind: LayerKind) -> String {
        let id = self.canvas.add_layer(kind);
        self.is_modified = true;
        self.emit_model(ModelEvent::LayerAdded { id: id.clone() });
        id
    }

    /// Removes a layer with its features. The last layer is kept.
    pub fn remove_layer(&mut self, id: &str) -> Result<Layer, ModelError> {
        self.flush_frame();
        self.commit_drafts();
        self.cancel_session();

        let previous_active = self.canvas.active_layer_id().to_string();
        let had_selection = self.canvas.selected().is_some();
        let layer = self.canvas.remove_layer(id)?;
        self.is_modified = true;
        self.emit_model(ModelEvent::LayerRemoved { id: layer.id.clone() });
        if previous_active != self.canvas.active_layer_id() {
            self.after_active_layer_change(had_selection);
        } else if had_selection && self.canvas.selected().is_none() {
            self.emit_selection();
        }
        tracing::info!("Removed layer {} ({})", layer.name, layer.kind);
        Ok(layer)
    }

    /// Edits a layer in place. Parameters are reset to the kind defaults if
    /// the edit changed the kind.
    pub fn update_layer<F>(&mut self, id: &str, edit: F) -> Result<(), ModelError>
    where
        F: FnOnce(&mut Layer),
    {
        let layer = self
            .canvas
            .layer_mut(id)
            .ok_or_else(|| ModelError::LayerNotFound { id: id.to_string() })?;
        edit(layer);
        if !layer.set_params(layer.params()) {
            layer.set_params(LayerParams::defaults_for(layer.kind));
        }
        self.is_modified = true;
        self.emit_model(ModelEvent::LayerUpdated { id: id.to_string() });

        let active_kind = self.canvas.active_layer().kind;
        if id == self.canvas.active_layer_id() && !self.mode.allowed_on(active_kind) {
            self.commit_drafts();
            self.cancel_session();
            self.mode = DrawingMode::Select;
        }
        Ok(())
    }

    pub fn set_layer_visible(&mut self, id: &str, visible: bool) -> Result<(), ModelError> {
        self.update_layer(id, |layer| layer.visible = visible)
    }

    pub fn set_layer_locked(&mut self, id: &str, locked: bool) -> Result<(), ModelError> {
        self.update_layer(id, |layer| layer.locked = locked)
    }

    /// Adds a planning image on top of the stack.
    pub fn add_image(&mut self, image: PlanningImage) -> String {
        let id = self.canvas.add_image(image);
        self.is_modified = true;
        self.emit_committed(FeatureKind::Image, &id);
        id
    }

    /// Deletes the selected feature. Returns `Ok(false)` without a selection.
    pub fn delete_selected(&mut self) -> Result<bool, ModelError> {
        let Some(feature) = self.canvas.selected().cloned() else {
            return Ok(false);
        };
        self.delete_feature(&feature)?;
        Ok(true)
    }

    pub fn delete_feature(&mut self, feature: &FeatureRef) -> Result<(), ModelError> {
        let was_selected = self.canvas.selected() == Some(feature);
        self.canvas.delete_feature(feature)?;
        self.is_modified = true;
        self.emit_model(ModelEvent::FeatureDeleted {
            kind: feature_kind(feature),
            id: feature.id().to_string(),
        });
        if was_selected {
            self.emit_selection();
        }
        tracing::info!("Deleted {}", feature.id());
        Ok(())
    }

    /// Assigns or clears a scatter preset on a polygon or polyline.
    pub fn set_scatter(
        &mut self,
        feature: &FeatureRef,
        scatter: Option<ScatterAssignment>,
    ) -> Result<(), ModelError> {
        self.canvas.set_scatter(feature, scatter)?;
        self.is_modified = true;
        self.emit_updated(feature_kind(feature), feature.id());
        Ok(())
    }

    /// Aligns every other marked image to the reference image's marker.
    pub fn align_images_to(&mut self, reference_id: &str) -> Result<usize, ModelError> {
        let moved = self.canvas.align_images_to(reference_id)?;
        if moved > 0 {
            self.is_modified = true;
            let ids: Vec<String> = self
                .canvas
                .images()
                .iter()
                .filter(|i| i.id != reference_id && !i.locked && i.align_marker.is_some())
                .map(|i| i.id.clone())
                .collect();
            for id in ids {
                self.emit_updated(FeatureKind::Image, &id);
            }
        }
        Ok(moved)
    }

    /// Handles a key press. Returns whether the key had an effect.
    pub fn on_key(&mut self, key: Key) -> bool {
        match key {
            Key::Enter => {
                self.flush_frame();
                self.commit_drafts()
            }
            Key::Escape => {
                let active = self.has_draft() || !self.session.is_idle();
                self.cancel();
                active
            }
            Key::Delete | Key::Backspace => match self.delete_selected() {
                Ok(deleted) => deleted,
                Err(e) => {
                    tracing::debug!("Delete ignored: {}", e);
                    false
                }
            },
        }
    }
}
