//! Mapping between world space and the staggered bubble grid.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{error::GeometryError, CellCoord};

/// Describes how grid cells are laid out in world space.
///
/// `origin` is the top-left corner of the grid frame. Rows advance downward by
/// `interval` and short rows are shifted right by half an interval. Anchors
/// sit at cell centres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    origin: Vec2,
    interval: f32,
    width: u32,
    max_height: u32,
}

impl GridGeometry {
    /// Creates a geometry with `width` columns in long rows and `max_height` rows.
    #[must_use]
    pub const fn new(origin: Vec2, interval: f32, width: u32, max_height: u32) -> Self {
        Self {
            origin,
            interval,
            width,
            max_height,
        }
    }

    /// Top-left corner of the grid frame.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Distance between neighbouring anchors in a row.
    #[must_use]
    pub const fn interval(&self) -> f32 {
        self.interval
    }

    /// Number of columns in a long row.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows the grid can hold.
    #[must_use]
    pub const fn max_height(&self) -> u32 {
        self.max_height
    }

    /// Number of slots reserved for the grid storage.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.width as usize * self.max_height as usize
    }

    /// Maps a world position onto the cell whose frame contains it.
    ///
    /// The result may lie outside the grid bounds.
    #[must_use]
    pub fn world_to_cell(&self, position: Vec2) -> CellCoord {
        let row = ((self.origin.y - position.y) / self.interval).ceil() as i32 - 1;
        let shift = row.rem_euclid(2) as f32 * self.interval / 2.0;
        let column = ((position.x - self.origin.x - shift) / self.interval).ceil() as i32 - 1;
        CellCoord::new(row, column)
    }

    /// Returns the anchor (cell centre) of `cell` in world space.
    #[must_use]
    pub fn cell_to_anchor(&self, cell: CellCoord) -> Vec2 {
        let half = self.interval / 2.0;
        let shift = cell.row().rem_euclid(2) as f32 * half;
        Vec2::new(
            self.origin.x + half + shift + cell.column() as f32 * self.interval,
            self.origin.y - half - cell.row() as f32 * self.interval,
        )
    }

    /// Number of columns available in `row`.
    #[must_use]
    pub fn row_len(&self, row: i32) -> i32 {
        i32::try_from(self.width).unwrap_or(i32::MAX) - row.rem_euclid(2)
    }

    /// Reports whether `cell` addresses a slot of the grid.
    #[must_use]
    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        let rows = i32::try_from(self.max_height).unwrap_or(i32::MAX);
        (0..rows).contains(&cell.row()) && (0..self.row_len(cell.row())).contains(&cell.column())
    }

    /// Rejects cells outside the grid.
    pub fn check_bounds(&self, cell: CellCoord) -> Result<(), GeometryError> {
        if self.in_bounds(cell) {
            Ok(())
        } else {
            Err(GeometryError::OutOfBounds { cell })
        }
    }

    /// Row-major storage index of `cell`, if it is in bounds.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        Some(row * self.width as usize + column)
    }

    /// Iterates every in-bounds cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let rows = i32::try_from(self.max_height).unwrap_or(i32::MAX);
        let geometry = *self;
        (0..rows).flat_map(move |row| {
            (0..geometry.row_len(row)).map(move |column| CellCoord::new(row, column))
        })
    }
}
