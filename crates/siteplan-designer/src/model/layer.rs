use serde::{Deserialize, Serialize};
use siteplan_core::constants::{
    clamp_to, ROAD_WIDTH_RANGE, SMOOTHING_RANGE, WALL_HEIGHT_RANGE, WALL_THICKNESS_RANGE,
};
use siteplan_core::ids::{new_id, prefix};

/// Semantic kind of a planning layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Terrain,
    Building,
    Road,
    Green,
    Wall,
    Floor,
    Water,
}

impl LayerKind {
    pub const ALL: [LayerKind; 7] = [
        LayerKind::Terrain,
        LayerKind::Building,
        LayerKind::Road,
        LayerKind::Green,
        LayerKind::Wall,
        LayerKind::Floor,
        LayerKind::Water,
    ];

    /// Parses a lowercase kind name as written in snapshots.
    pub fn parse(name: &str) -> Option<LayerKind> {
        LayerKind::ALL
            .into_iter()
            .find(|kind| kind.to_string().eq_ignore_ascii_case(name.trim()))
    }

    /// Road and wall layers are drawn with the line tool only.
    pub fn is_linear(&self) -> bool {
        matches!(self, LayerKind::Road | LayerKind::Wall)
    }

    pub fn default_color(&self) -> &'static str {
        match self {
            LayerKind::Terrain => "#8d6e63",
            LayerKind::Building => "#90a4ae",
            LayerKind::Road => "#616161",
            LayerKind::Green => "#66bb6a",
            LayerKind::Wall => "#a1887f",
            LayerKind::Floor => "#d7ccc8",
            LayerKind::Water => "#4fc3f7",
        }
    }

    pub fn default_name(&self) -> &'static str {
        match self {
            LayerKind::Terrain => "Terrain",
            LayerKind::Building => "Buildings",
            LayerKind::Road => "Roads",
            LayerKind::Green => "Green",
            LayerKind::Wall => "Walls",
            LayerKind::Floor => "Floors",
            LayerKind::Water => "Water",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LayerKind::Terrain => "terrain",
            LayerKind::Building => "building",
            LayerKind::Road => "road",
            LayerKind::Green => "green",
            LayerKind::Wall => "wall",
            LayerKind::Floor => "floor",
            LayerKind::Water => "water",
        };
        f.write_str(name)
    }
}

/// Kind-specific layer parameters. The variant always matches the layer kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerParams {
    None,
    Road { width_m: f64, smoothing: f64 },
    Water { smoothing: f64 },
    Floor { smoothing: f64 },
    Wall { height_m: f64, thickness_m: f64 },
}

impl LayerParams {
    pub fn defaults_for(kind: LayerKind) -> Self {
        match kind {
            LayerKind::Road => LayerParams::Road {
                width_m: 4.0,
                smoothing: 0.5,
            },
            LayerKind::Water => LayerParams::Water { smoothing: 0.5 },
            LayerKind::Floor => LayerParams::Floor { smoothing: 0.0 },
            LayerKind::Wall => LayerParams::Wall {
                height_m: 3.0,
                thickness_m: 0.2,
            },
            LayerKind::Terrain | LayerKind::Building | LayerKind::Green => LayerParams::None,
        }
    }

    /// Returns a copy with every value clamped to its valid range.
    pub fn clamped(self) -> Self {
        match self {
            LayerParams::None => LayerParams::None,
            LayerParams::Road { width_m, smoothing } => LayerParams::Road {
                width_m: clamp_to(width_m, ROAD_WIDTH_RANGE),
                smoothing: clamp_to(smoothing, SMOOTHING_RANGE),
            },
            LayerParams::Water { smoothing } => LayerParams::Water {
                smoothing: clamp_to(smoothing, SMOOTHING_RANGE),
            },
            LayerParams::Floor { smoothing } => LayerParams::Floor {
                smoothing: clamp_to(smoothing, SMOOTHING_RANGE),
            },
            LayerParams::Wall {
                height_m,
                thickness_m,
            } => LayerParams::Wall {
                height_m: clamp_to(height_m, WALL_HEIGHT_RANGE),
                thickness_m: clamp_to(thickness_m, WALL_THICKNESS_RANGE),
            },
        }
    }

    /// Corner smoothing applied to this layer's geometry (0 = sharp).
    pub fn smoothing(&self) -> f64 {
        match self {
            LayerParams::Road { smoothing, .. }
            | LayerParams::Water { smoothing }
            | LayerParams::Floor { smoothing } => *smoothing,
            LayerParams::None | LayerParams::Wall { .. } => 0.0,
        }
    }
}

/// A drawing layer. Features always belong to exactly one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub kind: LayerKind,
    pub visible: bool,
    pub locked: bool,
    pub color: String,
    params: LayerParams,
}

impl Layer {
    pub fn new(kind: LayerKind) -> Self {
        Self::with_id(new_id(prefix::LAYER), kind)
    }

    pub fn with_id(id: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            name: kind.default_name().to_string(),
            kind,
            visible: true,
            locked: false,
            color: kind.default_color().to_string(),
            params: LayerParams::defaults_for(kind),
        }
    }

    pub fn params(&self) -> LayerParams {
        self.params
    }

    /// Replaces the parameters. A variant that does not match the layer kind
    /// is ignored; values are clamped.
    pub fn set_params(&mut self, params: LayerParams) -> bool {
        if std::mem::discriminant(&params)
            != std::mem::discriminant(&LayerParams::defaults_for(self.kind))
        {
            tracing::debug!("Ignoring {:?} for {} layer {}", params, self.kind, self.id);
            return false;
        }
        self.params = params.clamped();
        true
    }

    pub fn road_width(&self) -> Option<f64> {
        match self.params {
            LayerParams::Road { width_m, .. } => Some(width_m),
            _ => None,
        }
    }

    pub fn set_road_width(&mut self, width_m: f64) {
        if let LayerParams::Road { smoothing, .. } = self.params {
            self.params = LayerParams::Road { width_m, smoothing }.clamped();
        }
    }

    pub fn set_smoothing(&mut self, smoothing: f64) {
        let params = match self.params {
            LayerParams::Road { width_m, .. } => LayerParams::Road { width_m, smoothing },
            LayerParams::Water { .. } => LayerParams::Water { smoothing },
            LayerParams::Floor { .. } => LayerParams::Floor { smoothing },
            other => other,
        };
        self.params = params.clamped();
    }

    pub fn set_wall_dimensions(&mut self, height_m: f64, thickness_m: f64) {
        if let LayerParams::Wall { .. } = self.params {
            self.params = LayerParams::Wall {
                height_m,
                thickness_m,
            }
            .clamped();
        }
    }
}
