//! Boundary to the external 3D scene converter.
//!
//! The converter receives a fully flushed snapshot. Progress is reported as a
//! step label plus a percentage; a failure never touches the planning model.

use siteplan_core::error::ConversionError;

use crate::serialization::PlanningSnapshot;

/// One progress report from a converter.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionProgress {
    pub step: String,
    /// Completion in percent. Values outside `0..=100` are clamped before
    /// they are published.
    pub percent: f64,
}

impl ConversionProgress {
    pub fn new(step: impl Into<String>, percent: f64) -> Self {
        Self {
            step: step.into(),
            percent: clamp_percent(percent),
        }
    }

    /// Returns the report with `percent` forced into `0..=100`.
    pub fn clamped(self) -> Self {
        Self {
            percent: clamp_percent(self.percent),
            ..self
        }
    }
}

fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

/// External service turning a planning snapshot into 3D scene content.
pub trait SceneConverter {
    /// Converts `snapshot`. `overwrite` asks the service to replace scene
    /// content generated by an earlier conversion.
    fn convert(
        &mut self,
        snapshot: &PlanningSnapshot,
        overwrite: bool,
        progress: &mut dyn FnMut(ConversionProgress),
    ) -> Result<(), ConversionError>;
}
