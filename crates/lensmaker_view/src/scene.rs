//! Serializable scene model.

use std::path::Path;

use glam::DMat4;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write scene: {0}")]
    Io(#[from] std::io::Error),

    #[error("scene contains a non-finite value in a {0} group")]
    NonFinite(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SceneMode {
    #[serde(rename = "2D")]
    TwoD,
    #[serde(rename = "3D")]
    ThreeD,
}

/// One surface drawn by the viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceEntry {
    /// Homogeneous local-to-global matrix, row major
    pub matrix: [[f64; 4]; 4],
    /// Profile curve samples `(x, r)` in the local frame
    pub samples: Vec<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_length: Option<f64>,
}

impl SurfaceEntry {
    pub fn new(matrix: DMat4, samples: Vec<[f64; 2]>, side_length: Option<f64>) -> Self {
        Self {
            matrix: matrix.transpose().to_cols_array_2d(),
            samples,
            side_length,
        }
    }

    fn is_finite(&self) -> bool {
        self.matrix.iter().flatten().all(|v| v.is_finite())
            && self.samples.iter().flatten().all(|v| v.is_finite())
            && self.side_length.map_or(true, f64::is_finite)
    }
}

/// A group of drawable items sharing a type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Group {
    Points {
        data: Vec<Vec<f64>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Surfaces {
        data: Vec<SurfaceEntry>,
    },
    /// Segments as `[start..., end...]` rows
    Rays {
        data: Vec<Vec<f64>>,
        color: String,
    },
}

impl Group {
    pub fn kind(&self) -> &'static str {
        match self {
            Group::Points { .. } => "points",
            Group::Surfaces { .. } => "surfaces",
            Group::Rays { .. } => "rays",
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            Group::Points { data, .. } | Group::Rays { data, .. } => {
                data.iter().flatten().all(|v| v.is_finite())
            }
            Group::Surfaces { data } => data.iter().all(SurfaceEntry::is_finite),
        }
    }
}

/// A full scene: viewer mode plus drawable groups in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub mode: SceneMode,
    pub data: Vec<Group>,
}

impl Scene {
    /// Empty scene for a 2D or 3D sampling.
    pub fn new(dim: usize) -> Self {
        let mode = if dim == 2 {
            SceneMode::TwoD
        } else {
            SceneMode::ThreeD
        };
        Self {
            mode,
            data: Vec::new(),
        }
    }

    pub fn push(&mut self, group: Group) {
        self.data.push(group);
    }

    pub fn count(&self, kind: &str) -> usize {
        self.data.iter().filter(|g| g.kind() == kind).count()
    }

    /// Serialize to JSON. Fails on NaN or infinite values, which JSON
    /// cannot represent.
    pub fn to_json(&self) -> Result<String, ExportError> {
        if let Some(group) = self.data.iter().find(|g| !g.is_finite()) {
            return Err(ExportError::NonFinite(group.kind()));
        }
        Ok(serde_json::to_string(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), ExportError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Wrote scene with {} groups to {}", self.data.len(), path.display());
        Ok(())
    }
}
