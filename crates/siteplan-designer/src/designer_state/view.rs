//! View operations (fit, zoom, pan, viewport size) for designer state.

use super::DesignerState;
use crate::model::Point;
use crate::viewport::GroundSizeProvider;

impl DesignerState {
    /// Sets the viewport size in pixels.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.canvas.viewport_mut().set_viewport_size(width, height);
        self.emit_view();
    }

    /// Takes the content extent from a ground provider and refits the view.
    pub fn apply_ground(&mut self, provider: &dyn GroundSizeProvider) {
        self.canvas.viewport_mut().apply_ground(provider);
        self.fit_to_view();
    }

    /// Fits the content into the viewport. Returns the new scale.
    pub fn fit_to_view(&mut self) -> f64 {
        let padding = self.view_settings.fit_padding_px;
        let scale = self.canvas.viewport_mut().fit_to_content(padding);
        self.emit_view();
        scale
    }

    /// Zooms to `scale` keeping the world point under `anchor` fixed.
    pub fn zoom_at(&mut self, scale: f64, anchor: Point) -> f64 {
        let scale = self.canvas.viewport_mut().zoom_at_anchor(scale, anchor);
        self.emit_view();
        scale
    }

    pub fn zoom_in_at(&mut self, anchor: Point) -> f64 {
        let scale = self.canvas.viewport_mut().zoom_in_at(anchor);
        self.emit_view();
        scale
    }

    pub fn zoom_out_at(&mut self, anchor: Point) -> f64 {
        let scale = self.canvas.viewport_mut().zoom_out_at(anchor);
        self.emit_view();
        scale
    }

    /// Pans by a screen-space delta, e.g. from a wheel or keyboard.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.canvas.viewport_mut().pan_by_screen(dx, dy);
        self.emit_view();
    }
}
