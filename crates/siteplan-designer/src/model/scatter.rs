use serde::{Deserialize, Serialize};
use siteplan_core::constants::{clamp_to, DENSITY_RANGE, MIN_FOOTPRINT_AREA, SPACING_RANGE};

/// A vegetation/prop preset assigned to a region.
///
/// Only green-layer polygons turn this into placement points; on other
/// layers it is carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterAssignment {
    #[serde(default)]
    pub provider_asset_id: String,
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default = "default_density")]
    pub density_percent: f64,
    #[serde(default)]
    pub min_spacing_meters: f64,
    #[serde(rename = "footprintAreaM2", default = "default_footprint")]
    pub footprint_area_m2: f64,
}

fn default_density() -> f64 {
    50.0
}

fn default_footprint() -> f64 {
    1.0
}

impl ScatterAssignment {
    pub fn new(asset_id: impl Into<String>, category: impl Into<String>) -> Self {
        let asset_id = asset_id.into();
        Self {
            provider_asset_id: asset_id.clone(),
            asset_id,
            category: category.into(),
            name: String::new(),
            thumbnail: String::new(),
            density_percent: default_density(),
            min_spacing_meters: 0.0,
            footprint_area_m2: default_footprint(),
        }
    }

    pub fn set_density(&mut self, percent: f64) {
        self.density_percent = clamp_to(percent, DENSITY_RANGE);
    }

    pub fn set_min_spacing(&mut self, meters: f64) {
        self.min_spacing_meters = clamp_to(meters, SPACING_RANGE);
    }

    pub fn set_footprint_area(&mut self, area_m2: f64) {
        self.footprint_area_m2 = if area_m2.is_finite() {
            area_m2.max(MIN_FOOTPRINT_AREA)
        } else {
            MIN_FOOTPRINT_AREA
        };
    }

    /// Returns a copy with all numeric fields coerced into range.
    pub fn clamped(mut self) -> Self {
        let (density, spacing, footprint) = (
            self.density_percent,
            self.min_spacing_meters,
            self.footprint_area_m2,
        );
        self.set_density(density);
        self.set_min_spacing(spacing);
        self.set_footprint_area(footprint);
        self
    }
}
