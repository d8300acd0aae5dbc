#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the bubble shooter engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. The pure trajectory model lives in
//! [`trajectory`] and the staggered grid mapping in [`geometry`].

pub mod config;
pub mod error;
pub mod geometry;
pub mod trajectory;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use config::{
    FieldConfig, GameConfig, GridConfig, LauncherConfig, PreviewConfig, RulesConfig, TimingConfig,
};
pub use error::{
    BudgetExhaustedError, ConfigError, DegenerateTrajectoryError, GeometryError,
    NoVacantCellError, PlacementError,
};
pub use geometry::GridGeometry;
pub use trajectory::{Root, TrajectorySegment, GRAVITY};

/// Unique identifier assigned to every bubble created by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BubbleId(u32);

impl BubbleId {
    /// Creates a new bubble identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a single release of the launcher.
///
/// A maximum power shot may split, so several bubbles can share one shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShotId(u32);

impl ShotId {
    /// Creates a new shot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Palette index describing the colour of a bubble.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BubbleVariant(u8);

impl BubbleVariant {
    /// Creates a variant from its palette index.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Palette index of the variant.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Location of a cell within the staggered bubble grid.
///
/// Rows grow downward from the top wall. Odd rows are "short" rows: they are
/// shifted right by half an interval and hold one column fewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: i32,
    column: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Reports whether the cell lies in a short (odd) row.
    #[must_use]
    pub const fn is_short_row(&self) -> bool {
        self.row.rem_euclid(2) == 1
    }

    /// Returns the cell reached by following `direction` from this cell.
    ///
    /// The result is not bounds checked.
    #[must_use]
    pub const fn neighbor(self, direction: LinkDirection) -> Self {
        let Self { row, column } = self;
        let short = self.is_short_row();
        match direction {
            LinkDirection::Up => Self::new(row - 2, column),
            LinkDirection::UpRight => {
                if short {
                    Self::new(row - 1, column + 1)
                } else {
                    Self::new(row - 1, column)
                }
            }
            LinkDirection::Right => Self::new(row, column + 1),
            LinkDirection::DownRight => {
                if short {
                    Self::new(row + 1, column + 1)
                } else {
                    Self::new(row + 1, column)
                }
            }
            LinkDirection::Down => Self::new(row + 2, column),
            LinkDirection::DownLeft => {
                if short {
                    Self::new(row + 1, column)
                } else {
                    Self::new(row + 1, column - 1)
                }
            }
            LinkDirection::Left => Self::new(row, column - 1),
            LinkDirection::UpLeft => {
                if short {
                    Self::new(row - 1, column)
                } else {
                    Self::new(row - 1, column - 1)
                }
            }
        }
    }
}

/// Named links between grid cells.
///
/// `Up` and `Down` skip a row so they stay in the same column; the diagonals
/// move a single row and shift the column according to row parity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkDirection {
    /// Two rows up, same column.
    Up,
    /// One row up, towards the right.
    UpRight,
    /// Same row, next column.
    Right,
    /// One row down, towards the right.
    DownRight,
    /// Two rows down, same column.
    Down,
    /// One row down, towards the left.
    DownLeft,
    /// Same row, previous column.
    Left,
    /// One row up, towards the left.
    UpLeft,
}

impl LinkDirection {
    /// Every named direction in clockwise order starting at `Up`.
    pub const ALL: [LinkDirection; 8] = [
        LinkDirection::Up,
        LinkDirection::UpRight,
        LinkDirection::Right,
        LinkDirection::DownRight,
        LinkDirection::Down,
        LinkDirection::DownLeft,
        LinkDirection::Left,
        LinkDirection::UpLeft,
    ];

    /// The six directions that touch a cell in the hexagonal packing.
    pub const HEXAGONAL: [LinkDirection; 6] = [
        LinkDirection::UpLeft,
        LinkDirection::UpRight,
        LinkDirection::Right,
        LinkDirection::DownRight,
        LinkDirection::DownLeft,
        LinkDirection::Left,
    ];

    /// Returns the direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            LinkDirection::Up => LinkDirection::Down,
            LinkDirection::UpRight => LinkDirection::DownLeft,
            LinkDirection::Right => LinkDirection::Left,
            LinkDirection::DownRight => LinkDirection::UpLeft,
            LinkDirection::Down => LinkDirection::Up,
            LinkDirection::DownLeft => LinkDirection::UpRight,
            LinkDirection::Left => LinkDirection::Right,
            LinkDirection::UpLeft => LinkDirection::DownRight,
        }
    }
}

/// How a grid probe treats cells outside the grid bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgePolicy {
    /// Cells outside the grid count as empty.
    Permissive,
    /// Cells outside the grid count as unavailable.
    Strict,
}

/// Bubble stored in a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occupant {
    /// Identifier of the anchored bubble.
    pub bubble: BubbleId,
    /// Colour of the anchored bubble.
    pub variant: BubbleVariant,
}

/// Flight status tracked for every bubble.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightState {
    /// Bubble waits in the claim queue or on the launcher rail.
    Idle,
    /// Bubble travels along a trajectory.
    Flying,
    /// Bubble is pinned to a grid anchor.
    Anchored,
}

/// States a launched projectile moves through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileState {
    /// Projectile sits on the launcher rail and follows aim input.
    Aiming,
    /// Projectile follows its trajectory.
    Flying,
    /// Projectile touched a grid bubble and waits for snap resolution.
    Colliding,
    /// Projectile was snapped into the grid.
    Anchored,
    /// Projectile hit the bottom wall and plays its burst cue.
    Bursting,
    /// Projectile left the simulation.
    Removed,
}

impl ProjectileState {
    /// Reports whether the state machine permits moving to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: ProjectileState) -> bool {
        matches!(
            (self, next),
            (ProjectileState::Aiming, ProjectileState::Flying)
                | (ProjectileState::Flying, ProjectileState::Flying)
                | (ProjectileState::Flying, ProjectileState::Colliding)
                | (ProjectileState::Flying, ProjectileState::Bursting)
                | (ProjectileState::Colliding, ProjectileState::Anchored)
                | (ProjectileState::Bursting, ProjectileState::Removed)
        ) || matches!(next, ProjectileState::Removed)
    }
}

/// Walls bounding the playing field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Wall {
    /// Left side wall.
    Left,
    /// Right side wall.
    Right,
    /// Top wall above row zero.
    Top,
    /// Bottom edge where projectiles burst.
    Bottom,
}

impl Wall {
    /// Unit normal of the wall pointing into the field.
    #[must_use]
    pub const fn normal(self) -> Vec2 {
        match self {
            Wall::Left => Vec2::X,
            Wall::Right => Vec2::NEG_X,
            Wall::Top => Vec2::NEG_Y,
            Wall::Bottom => Vec2::Y,
        }
    }
}

/// Reason a game ended without a win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossReason {
    /// A projectile found no vacant cell around the bubble it touched.
    NoVacantCell,
    /// The launcher asked for a bubble after the budget was spent.
    BudgetExhausted,
}

/// Terminal result of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Enough of the top row was cleared.
    Won,
    /// The game ended in a loss.
    Lost(LossReason),
}

impl GameOutcome {
    /// Reports whether the outcome is a win.
    #[must_use]
    pub const fn is_win(&self) -> bool {
        matches!(self, GameOutcome::Won)
    }
}

/// Visual style of a trajectory preview path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PreviewStyle {
    /// Ordinary shot guidance.
    Single,
    /// One of the two paths drawn for a maximum power shot.
    Spread,
}

/// Polyline predicted for a prospective shot.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewPath {
    /// Sampled points in flight order.
    pub points: Vec<Vec2>,
    /// Style the path should be drawn with.
    pub style: PreviewStyle,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Clears the board and fills the initial rows from the random palette.
    StartLevel {
        /// Seed driving the variant generator.
        seed: u64,
    },
    /// Places a single bubble directly into the grid.
    PlaceBubble {
        /// Cell that should receive the bubble.
        cell: CellCoord,
        /// Colour of the bubble.
        variant: BubbleVariant,
    },
    /// Tops up the claim queue and moves its oldest bubble onto the launcher.
    ReloadLauncher,
    /// Marks the loaded bubble as launched.
    LaunchProjectile {
        /// Bubble leaving the launcher.
        bubble: BubbleId,
        /// Shot the launch belongs to.
        shot: ShotId,
        /// Position the bubble leaves the rail from.
        origin: Vec2,
    },
    /// Records the position a flying projectile reached.
    MoveProjectile {
        /// Projectile that moved.
        bubble: BubbleId,
        /// Position along its current trajectory.
        position: Vec2,
    },
    /// Splits a maximum power projectile into two.
    SplitProjectile {
        /// Projectile that should spawn a twin.
        bubble: BubbleId,
        /// Shot the projectile belongs to.
        shot: ShotId,
    },
    /// Resolves a projectile touching an anchored bubble.
    ResolveCollision {
        /// Projectile that touched the grid.
        bubble: BubbleId,
        /// Anchored bubble that was touched.
        target: BubbleId,
        /// Projectile position at the moment of contact.
        position: Vec2,
        /// Whether the projectile may replace the target.
        allow_swap: bool,
    },
    /// Bursts a projectile that reached the bottom wall.
    BurstProjectile {
        /// Projectile that reached the bottom wall.
        bubble: BubbleId,
    },
    /// Removes a burst bubble from the world.
    DestroyBubble {
        /// Bubble to remove.
        bubble: BubbleId,
    },
}

/// Events broadcast by the world and systems after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a level was filled.
    LevelStarted {
        /// Number of bubbles placed in the grid.
        bubbles: u32,
    },
    /// Confirms that a bubble was created.
    BubbleSpawned {
        /// Identifier assigned to the bubble.
        bubble: BubbleId,
        /// Colour of the bubble.
        variant: BubbleVariant,
        /// World position the bubble appears at.
        position: Vec2,
    },
    /// Reports the new position of a moving bubble.
    ProjectileMoved {
        /// Bubble that moved.
        bubble: BubbleId,
        /// Updated world position.
        position: Vec2,
    },
    /// Confirms that a bubble moved from the claim queue onto the launcher.
    ProjectileLoaded {
        /// Bubble now sitting on the launcher.
        bubble: BubbleId,
        /// Colour of the bubble.
        variant: BubbleVariant,
    },
    /// Reports the remaining bubble budget.
    RemainingShotsChanged {
        /// Bubbles that may still be created.
        remaining: u32,
    },
    /// Confirms that a bubble left the launcher.
    ProjectileLaunched {
        /// Bubble in flight.
        bubble: BubbleId,
        /// Shot the launch belongs to.
        shot: ShotId,
    },
    /// Confirms that a projectile produced a twin.
    ProjectileSplit {
        /// Projectile that split.
        source: BubbleId,
        /// Newly created twin.
        twin: BubbleId,
        /// Shot both projectiles belong to.
        shot: ShotId,
    },
    /// Confirms that a bubble was pinned to a grid cell.
    BubbleAnchored {
        /// Bubble that was anchored.
        bubble: BubbleId,
        /// Cell that now holds the bubble.
        cell: CellCoord,
        /// Anchor position of the cell.
        anchor: Vec2,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Cell the request targeted.
        cell: CellCoord,
        /// Reason for the rejection.
        reason: PlacementError,
    },
    /// Cue that a bubble bursts and will be destroyed shortly.
    BubbleBurst {
        /// Bubble that burst.
        bubble: BubbleId,
    },
    /// Confirms that a bubble was removed from the world.
    BubbleDestroyed {
        /// Bubble that was removed.
        bubble: BubbleId,
    },
    /// Reports a same-colour group that reached the match threshold.
    BubblesMatched {
        /// Bubbles removed by the match.
        bubbles: Vec<BubbleId>,
        /// Points awarded for the match.
        awarded: u64,
    },
    /// Reports a cluster that lost its connection to the top row.
    ClusterDropped {
        /// Bubbles removed with the cluster.
        bubbles: Vec<BubbleId>,
        /// Points awarded for the cluster.
        awarded: u64,
    },
    /// Reports the accumulated score.
    ScoreChanged {
        /// Current score.
        score: u64,
    },
    /// Confirms that a projectile finished its part of a shot.
    ShotResolved {
        /// Projectile that finished.
        bubble: BubbleId,
        /// Whether a hanging cluster was pruned while resolving it.
        dropped: bool,
    },
    /// Reports the launcher power after an aim update.
    PowerChanged {
        /// Normalised pull-back in `[0, 1]`.
        power: f32,
    },
    /// Publishes the predicted paths for the current aim.
    TrajectoryPreviewed {
        /// Paths to draw.
        paths: Vec<PreviewPath>,
    },
    /// Requests that any drawn preview is cleared.
    PreviewCleared,
    /// Announces the end of the game.
    GameOver {
        /// Final result.
        outcome: GameOutcome,
        /// Final score.
        score: u64,
    },
}

/// Read-only snapshot describing a bubble.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BubbleSnapshot {
    /// Identifier of the bubble.
    pub id: BubbleId,
    /// Colour of the bubble.
    pub variant: BubbleVariant,
    /// Last known world position.
    pub position: Vec2,
    /// Grid cell holding the bubble, unset while it is not anchored.
    pub cell: Option<CellCoord>,
    /// Flight status of the bubble.
    pub flight: FlightState,
    /// Whether wall contacts still apply to the bubble.
    pub collision_enabled: bool,
}

/// Read-only view over the bubble grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [Option<Occupant>],
    geometry: GridGeometry,
}

impl<'a> GridView<'a> {
    /// Captures a view backed by the provided row-major cell slice.
    #[must_use]
    pub const fn new(cells: &'a [Option<Occupant>], geometry: GridGeometry) -> Self {
        Self { cells, geometry }
    }

    /// Geometry used to map between cells and world space.
    #[must_use]
    pub const fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Returns the bubble anchored at `cell`, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<Occupant> {
        self.geometry
            .index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether `cell` holds no bubble, resolving out of bounds cells by `edge`.
    #[must_use]
    pub fn is_vacant(&self, cell: CellCoord, edge: EdgePolicy) -> bool {
        if !self.geometry.in_bounds(cell) {
            return matches!(edge, EdgePolicy::Permissive);
        }
        self.occupant(cell).is_none()
    }

    /// Reports whether the cell containing `position` is empty.
    #[must_use]
    pub fn is_vacant_at(&self, position: Vec2) -> bool {
        self.is_vacant(self.geometry.world_to_cell(position), EdgePolicy::Permissive)
    }

    /// Iterates occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (CellCoord, Occupant)> + 'a {
        let cells = self.cells;
        let geometry = self.geometry;
        geometry.cells().filter_map(move |cell| {
            geometry
                .index(cell)
                .and_then(|index| cells.get(index).copied().flatten())
                .map(|occupant| (cell, occupant))
        })
    }

    /// Counts occupied cells in `row`.
    #[must_use]
    pub fn occupied_in_row(&self, row: i32) -> usize {
        (0..self.geometry.row_len(row))
            .filter(|&column| self.occupant(CellCoord::new(row, column)).is_some())
            .count()
    }
}
