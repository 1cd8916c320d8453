//! File-backed planning snapshot store.
//!
//! Empty snapshots are not stored; a `cleared` marker is written instead so a
//! load can tell "never saved" from "intentionally cleared".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use siteplan_core::error::PersistenceError;

use crate::serialization::PlanningSnapshot;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreEnvelope {
    saved_at: DateTime<Utc>,
    #[serde(default)]
    cleared: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    snapshot: Option<PlanningSnapshot>,
}

/// Result of loading from a [`PlanStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoredPlan {
    NeverSaved,
    Cleared { saved_at: DateTime<Utc> },
    Saved {
        saved_at: DateTime<Utc>,
        snapshot: PlanningSnapshot,
    },
}

impl StoredPlan {
    pub fn snapshot(&self) -> Option<&PlanningSnapshot> {
        match self {
            StoredPlan::Saved { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }
}

/// Snapshot store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct PlanStore {
    path: PathBuf,
}

impl PlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saves a snapshot. Empty snapshots write the cleared marker. Returns
    /// the stored state.
    pub fn save(&self, snapshot: &PlanningSnapshot) -> Result<StoredPlan, PersistenceError> {
        let saved_at = Utc::now();
        let envelope = if snapshot.is_empty() {
            StoreEnvelope {
                saved_at,
                cleared: true,
                snapshot: None,
            }
        } else {
            StoreEnvelope {
                saved_at,
                cleared: false,
                snapshot: Some(snapshot.clone()),
            }
        };
        self.write(&envelope)?;
        tracing::info!(
            "Saved plan to {} ({} features)",
            self.path.display(),
            snapshot.feature_count()
        );
        Ok(match envelope.snapshot {
            Some(snapshot) => StoredPlan::Saved { saved_at, snapshot },
            None => StoredPlan::Cleared { saved_at },
        })
    }

    /// Writes the cleared marker regardless of any previous content.
    pub fn clear(&self) -> Result<(), PersistenceError> {
        self.write(&StoreEnvelope {
            saved_at: Utc::now(),
            cleared: true,
            snapshot: None,
        })
    }

    pub fn load(&self) -> Result<StoredPlan, PersistenceError> {
        if !self.path.exists() {
            return Ok(StoredPlan::NeverSaved);
        }
        let json = std::fs::read_to_string(&self.path).map_err(|source| PersistenceError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        let envelope: StoreEnvelope = serde_json::from_str(&json)?;
        Ok(match envelope.snapshot {
            Some(snapshot) if !envelope.cleared => StoredPlan::Saved {
                saved_at: envelope.saved_at,
                snapshot,
            },
            _ => StoredPlan::Cleared {
                saved_at: envelope.saved_at,
            },
        })
    }

    fn write(&self, envelope: &StoreEnvelope) -> Result<(), PersistenceError> {
        let io_error = |source| PersistenceError::Io {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(envelope)?;
        std::fs::write(&self.path, json).map_err(io_error)
    }
}
