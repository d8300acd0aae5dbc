use std::collections::VecDeque;

use bubble_shooter_core::{
    CellCoord, EdgePolicy, GridGeometry, GridView, LinkDirection, Occupant, PlacementError,
};
use glam::Vec2;

/// Dense storage of anchored bubbles, `max_height` rows of `width` slots.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    geometry: GridGeometry,
    cells: Vec<Option<Occupant>>,
}

impl Grid {
    pub(crate) fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            cells: vec![None; geometry.capacity()],
        }
    }

    pub(crate) fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.geometry)
    }

    pub(crate) fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub(crate) fn clear(&mut self) {
        self.cells.iter_mut().for_each(|slot| *slot = None);
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<Occupant> {
        self.view().occupant(cell)
    }

    pub(crate) fn place(
        &mut self,
        cell: CellCoord,
        occupant: Occupant,
    ) -> Result<(), PlacementError> {
        let index = self
            .geometry
            .index(cell)
            .ok_or(PlacementError::OutOfBounds)?;
        let slot = self
            .cells
            .get_mut(index)
            .ok_or(PlacementError::OutOfBounds)?;
        if slot.is_some() {
            return Err(PlacementError::Occupied);
        }
        *slot = Some(occupant);
        Ok(())
    }

    pub(crate) fn vacate(&mut self, cell: CellCoord) -> Option<Occupant> {
        let index = self.geometry.index(cell)?;
        self.cells.get_mut(index).and_then(Option::take)
    }

    /// Picks the vacant cell next to `target` closest to the projectile.
    ///
    /// Candidates come from the quadrant the projectile approached from.
    pub(crate) fn snap_cell(&self, target: CellCoord, projectile: Vec2) -> Option<CellCoord> {
        let anchor = self.geometry.cell_to_anchor(target);
        let view = self.view();
        snap_directions(projectile, anchor)
            .into_iter()
            .map(|direction| target.neighbor(direction))
            .filter(|&cell| view.is_vacant(cell, EdgePolicy::Strict))
            .map(|cell| {
                let distance = self.geometry.cell_to_anchor(cell).distance(projectile);
                (cell, distance)
            })
            .min_by(|left, right| left.1.total_cmp(&right.1))
            .map(|(cell, _)| cell)
    }

    /// Collects the same-variant group connected to `pivot`, pivot first.
    pub(crate) fn matched_group(&self, pivot: CellCoord) -> Vec<CellCoord> {
        let Some(origin) = self.occupant(pivot) else {
            return Vec::new();
        };
        self.flood(pivot, |occupant| occupant.variant == origin.variant)
    }

    /// Finds every occupied component that has no path to row zero.
    ///
    /// A component is examined from the first member found whose upper
    /// diagonal neighbours are both empty; off-grid neighbours count as empty.
    pub(crate) fn hanging_clusters(&self) -> Vec<Vec<CellCoord>> {
        let view = self.view();
        let mut classified = vec![false; self.cells.len()];
        let mut clusters = Vec::new();

        for cell in self.geometry.cells().filter(|cell| cell.row() > 0) {
            let Some(index) = self.geometry.index(cell) else {
                continue;
            };
            if classified[index] || view.occupant(cell).is_none() {
                continue;
            }
            let unsupported = [LinkDirection::UpLeft, LinkDirection::UpRight]
                .into_iter()
                .all(|direction| view.is_vacant(cell.neighbor(direction), EdgePolicy::Permissive));
            if !unsupported {
                continue;
            }

            let component = self.flood(cell, |_| true);
            for member in &component {
                if let Some(member_index) = self.geometry.index(*member) {
                    classified[member_index] = true;
                }
            }
            if component.iter().all(|member| member.row() > 0) {
                clusters.push(component);
            }
        }

        clusters
    }

    pub(crate) fn occupied_in_row(&self, row: i32) -> usize {
        self.view().occupied_in_row(row)
    }

    fn flood<F>(&self, start: CellCoord, accept: F) -> Vec<CellCoord>
    where
        F: Fn(Occupant) -> bool,
    {
        let mut visited = vec![false; self.cells.len()];
        let mut frontier = VecDeque::new();
        let mut members = Vec::new();

        if let Some(index) = self.geometry.index(start) {
            visited[index] = true;
            frontier.push_back(start);
        }

        while let Some(cell) = frontier.pop_front() {
            members.push(cell);
            for direction in LinkDirection::HEXAGONAL {
                let next = cell.neighbor(direction);
                let Some(index) = self.geometry.index(next) else {
                    continue;
                };
                if visited[index] {
                    continue;
                }
                if self.occupant(next).is_some_and(&accept) {
                    visited[index] = true;
                    frontier.push_back(next);
                }
            }
        }

        members
    }
}

/// Candidate directions around a target, chosen by the side the projectile came from.
pub(crate) fn snap_directions(projectile: Vec2, target: Vec2) -> [LinkDirection; 3] {
    let above = projectile.y >= target.y;
    if projectile.x >= target.x {
        if above {
            [LinkDirection::Right, LinkDirection::Up, LinkDirection::UpRight]
        } else {
            [LinkDirection::Right, LinkDirection::DownRight, LinkDirection::Down]
        }
    } else if above {
        [LinkDirection::Left, LinkDirection::Up, LinkDirection::UpLeft]
    } else {
        [LinkDirection::Left, LinkDirection::DownLeft, LinkDirection::Down]
    }
}
