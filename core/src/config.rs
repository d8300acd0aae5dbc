//! Tunable parameters of a game session.
//!
//! Every section falls back to its defaults for missing keys, so partial TOML
//! documents are accepted.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, geometry::GridGeometry};

/// Complete configuration of a game session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Grid layout and palette.
    pub grid: GridConfig,
    /// Scoring and termination rules.
    pub rules: RulesConfig,
    /// Launcher aim and power limits.
    pub launcher: LauncherConfig,
    /// Walls bounding the flight area.
    pub field: FieldConfig,
    /// Trajectory preview sampling.
    pub preview: PreviewConfig,
    /// Deferred task delays.
    pub timing: TimingConfig,
}

impl GameConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that would corrupt the grid or stall the simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        if grid.max_height <= grid.height {
            return Err(ConfigError::MaxHeightNotAboveHeight {
                height: grid.height,
                max_height: grid.max_height,
            });
        }
        if grid.width < 2 {
            return Err(ConfigError::NarrowGrid(grid.width));
        }
        if !(grid.interval.is_finite() && grid.interval > 0.0) {
            return Err(ConfigError::InvalidInterval(grid.interval));
        }
        if grid.palette_size == 0 {
            return Err(ConfigError::EmptyPalette);
        }
        if self.rules.match_count == 0 {
            return Err(ConfigError::ZeroMatchCount);
        }
        if self.rules.claim_capacity == 0 {
            return Err(ConfigError::EmptyClaim);
        }
        if !(self.launcher.bubble_mass > 0.0) {
            return Err(ConfigError::InvalidMass(self.launcher.bubble_mass));
        }
        if !(self.preview.time_stamp > 0.0) {
            return Err(ConfigError::InvalidTimeStamp(self.preview.time_stamp));
        }
        let field = &self.field;
        if !(field.left < field.right && field.bottom < field.top) {
            return Err(ConfigError::InvertedField);
        }
        Ok(())
    }

    /// Geometry described by the grid section.
    #[must_use]
    pub fn geometry(&self) -> GridGeometry {
        GridGeometry::new(
            self.grid.origin,
            self.grid.interval,
            self.grid.width,
            self.grid.max_height,
        )
    }
}

/// Grid layout and palette.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Columns in a long row.
    pub width: u32,
    /// Rows filled when a level starts.
    pub height: u32,
    /// Rows the grid can hold.
    pub max_height: u32,
    /// Spacing between neighbouring anchors.
    pub interval: f32,
    /// Top-left corner of the grid frame.
    pub origin: Vec2,
    /// Number of bubble variants drawn at random.
    pub palette_size: u8,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 6,
            max_height: 14,
            interval: 0.5,
            origin: Vec2::new(-2.5, 4.5),
            palette_size: 4,
        }
    }
}

/// Scoring and termination rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Same-variant group size that bursts.
    pub match_count: u32,
    /// Top row fill percentage below which the level is won.
    pub empty_cells_percentage: f32,
    /// Bubbles that may be created for the launcher.
    pub bubble_budget: u32,
    /// Bubbles the claim queue may hold.
    pub claim_capacity: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            match_count: 3,
            empty_cells_percentage: 30.0,
            bubble_budget: 40,
            claim_capacity: 2,
        }
    }
}

/// Launcher aim and power limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Pivot the rail rotates around.
    pub anchor: Vec2,
    /// Where bubbles wait in the claim queue.
    pub claim_position: Vec2,
    /// Largest rail deflection from the vertical, in degrees.
    pub angle_limit: f32,
    /// Shortest pull-back.
    pub lower_stroke: f32,
    /// Longest pull-back.
    pub upper_stroke: f32,
    /// Impulse applied at full power.
    pub max_impulse: f32,
    /// Mass of a bubble.
    pub bubble_mass: f32,
    /// Angle between the halves of a split shot and its heading, in degrees.
    pub spread_angle: f32,
    /// Flight time after which a maximum power shot splits.
    pub spread_delay_secs: f32,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            anchor: Vec2::new(0.0, -3.5),
            claim_position: Vec2::new(-1.75, -4.5),
            angle_limit: 70.0,
            lower_stroke: 0.5,
            upper_stroke: 1.5,
            max_impulse: 16.0,
            bubble_mass: 1.0,
            spread_angle: 5.0,
            spread_delay_secs: 0.15,
        }
    }
}

/// Walls bounding the flight area.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// X coordinate of the left wall.
    pub left: f32,
    /// X coordinate of the right wall.
    pub right: f32,
    /// Y coordinate of the top wall.
    pub top: f32,
    /// Y coordinate of the bottom edge.
    pub bottom: f32,
    /// Radius of a bubble.
    pub bubble_radius: f32,
    /// Centre distance at which a projectile touches an anchored bubble.
    pub contact_distance: f32,
}

impl FieldConfig {
    /// Left boundary for bubble centres.
    #[must_use]
    pub fn left_border(&self) -> f32 {
        self.left + self.bubble_radius
    }

    /// Right boundary for bubble centres.
    #[must_use]
    pub fn right_border(&self) -> f32 {
        self.right - self.bubble_radius
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            left: -2.5,
            right: 2.5,
            top: 4.5,
            bottom: -6.5,
            bubble_radius: 0.25,
            contact_distance: 0.45,
        }
    }
}

/// Trajectory preview sampling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Flight time between consecutive preview points.
    pub time_stamp: f32,
    /// Path legs drawn, counting the first one.
    pub max_bounces: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            time_stamp: 0.05,
            max_bounces: 3,
        }
    }
}

/// Deferred task delays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay before the launcher reloads after a shot.
    pub reload_delay_secs: f32,
    /// Delay before the launcher reloads after a hanging cluster dropped.
    pub reload_delay_after_drop_secs: f32,
    /// Delay between a burst cue and the removal of the bubble.
    pub burst_delay_secs: f32,
}

impl TimingConfig {
    /// Reload delay for a shot, longer when a cluster dropped.
    #[must_use]
    pub fn reload_delay(&self, dropped: bool) -> Duration {
        let secs = if dropped {
            self.reload_delay_after_drop_secs
        } else {
            self.reload_delay_secs
        };
        Duration::try_from_secs_f32(secs).unwrap_or_default()
    }

    /// Delay between a burst cue and removal.
    #[must_use]
    pub fn burst_delay(&self) -> Duration {
        Duration::try_from_secs_f32(self.burst_delay_secs).unwrap_or_default()
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reload_delay_secs: 0.3,
            reload_delay_after_drop_secs: 0.8,
            burst_delay_secs: 0.1,
        }
    }
}
