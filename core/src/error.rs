//! Error taxonomy shared by the engine crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BubbleId, CellCoord};

/// A cell lies outside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum GeometryError {
    /// The cell is outside `0..max_height` rows or its row's column range.
    #[error("cell {cell:?} is outside the grid")]
    OutOfBounds {
        /// Offending cell.
        cell: CellCoord,
    },
}

/// Reasons a bubble cannot be written into a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell is outside the grid.
    #[error("cell is outside the grid")]
    OutOfBounds,
    /// The requested cell already holds a bubble.
    #[error("cell is already occupied")]
    Occupied,
}

impl From<GeometryError> for PlacementError {
    fn from(_: GeometryError) -> Self {
        PlacementError::OutOfBounds
    }
}

/// Every snap candidate around the touched bubble is occupied or off the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("no vacant cell next to bubble {target:?}")]
pub struct NoVacantCellError {
    /// Bubble the projectile touched.
    pub target: BubbleId,
}

/// The ascent-time quadratic has no real root for the requested height.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
#[error("trajectory never reaches height {height} (discriminant {discriminant})")]
pub struct DegenerateTrajectoryError {
    /// Height that was requested.
    pub height: f32,
    /// Negative discriminant of the quadratic.
    pub discriminant: f32,
}

/// The bubble budget and the claim queue are both empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("bubble budget exhausted")]
pub struct BudgetExhaustedError;

/// Configuration problems that must block play.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The grid has no room below the initially filled rows.
    #[error("grid max_height ({max_height}) must exceed height ({height})")]
    MaxHeightNotAboveHeight {
        /// Configured number of filled rows.
        height: u32,
        /// Configured number of grid rows.
        max_height: u32,
    },
    /// The grid needs at least one column in short rows.
    #[error("grid width must be at least 2, got {0}")]
    NarrowGrid(u32),
    /// Cell spacing must be a positive finite number.
    #[error("grid interval must be positive, got {0}")]
    InvalidInterval(f32),
    /// The palette must contain at least one variant.
    #[error("palette must contain at least one variant")]
    EmptyPalette,
    /// The launcher could never be loaded.
    #[error("claim queue capacity must be positive")]
    EmptyClaim,
    /// Matches need a positive threshold.
    #[error("match count must be positive")]
    ZeroMatchCount,
    /// Launch speed divides by the bubble mass.
    #[error("bubble mass must be positive, got {0}")]
    InvalidMass(f32),
    /// Preview sampling needs a positive step.
    #[error("preview time stamp must be positive, got {0}")]
    InvalidTimeStamp(f32),
    /// Opposing walls are swapped or coincide.
    #[error("field walls are inverted")]
    InvertedField,
    /// The TOML document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
