#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Trajectory preview drawn while the player aims.
//!
//! The preview replays the flight analytically instead of stepping it. Each
//! leg ends at the first occupied row the shot would cross, at the top wall,
//! at the bottom edge, or at a side wall where it reflects into the next leg.

use bubble_shooter_core::{
    trajectory::{self, Root},
    CellCoord, Event, FieldConfig, GridView, PreviewConfig, PreviewPath, PreviewStyle, Wall,
};
use glam::Vec2;

/// Upper bound on the points sampled for a single leg.
pub const MAX_POINTS_PER_LEG: usize = 4096;

/// Builds preview paths for the current aim.
#[derive(Clone, Debug)]
pub struct Preview {
    config: PreviewConfig,
    field: FieldConfig,
    spread_angle: f32,
}

impl Preview {
    /// Creates a preview builder; full power shots fan out by `spread_angle` degrees.
    #[must_use]
    pub fn new(config: PreviewConfig, field: FieldConfig, spread_angle: f32) -> Self {
        Self {
            config,
            field,
            spread_angle,
        }
    }

    /// Publishes the paths for a shot from `source` as a `TrajectoryPreviewed` event.
    pub fn show(
        &self,
        source: Vec2,
        speed: f32,
        angle: f32,
        max_power: bool,
        grid: GridView<'_>,
        out: &mut Vec<Event>,
    ) {
        out.push(Event::TrajectoryPreviewed {
            paths: self.paths(source, speed, angle, max_power, grid),
        });
    }

    /// Requests that the drawn preview is removed.
    pub fn clear(&self, out: &mut Vec<Event>) {
        out.push(Event::PreviewCleared);
    }

    /// Predicts the paths of a shot; full power shots yield one path per split half.
    #[must_use]
    pub fn paths(
        &self,
        source: Vec2,
        speed: f32,
        angle: f32,
        max_power: bool,
        grid: GridView<'_>,
    ) -> Vec<PreviewPath> {
        if max_power {
            [angle + self.spread_angle, angle - self.spread_angle]
                .into_iter()
                .map(|angle| PreviewPath {
                    points: self.trajectory(source, speed, angle, grid),
                    style: PreviewStyle::Spread,
                })
                .collect()
        } else {
            vec![PreviewPath {
                points: self.trajectory(source, speed, angle, grid),
                style: PreviewStyle::Single,
            }]
        }
    }

    /// Samples one predicted path, following up to `max_bounces` legs.
    #[must_use]
    pub fn trajectory(
        &self,
        source: Vec2,
        speed: f32,
        angle: f32,
        grid: GridView<'_>,
    ) -> Vec<Vec2> {
        let mut points = Vec::new();
        self.build(source, speed, angle, self.config.max_bounces, grid, &mut points);
        points
    }

    fn build(
        &self,
        source: Vec2,
        speed: f32,
        angle: f32,
        legs: u32,
        grid: GridView<'_>,
        points: &mut Vec<Vec2>,
    ) {
        if legs == 0 {
            return;
        }

        let left = self.field.left_border();
        let right = self.field.right_border();
        let ceiling = self.field.top - self.field.bubble_radius;
        let floor = self.field.bottom + self.field.bubble_radius;
        let apex = source.y + trajectory::max_height(speed, angle);

        if angle > 0.0 {
            if let Some(time) = first_obstruction(source, speed, angle, left, right, grid) {
                self.sample(source, speed, angle, time, points);
                return;
            }

            if apex > ceiling {
                if let Ok(time) =
                    trajectory::ascent_time(speed, angle, ceiling - source.y, Root::Lower)
                {
                    self.sample(source, speed, angle, time, points);
                    return;
                }
            }
        }

        let wall = if angle.abs() > 90.0 {
            Wall::Left
        } else {
            Wall::Right
        };
        let wall_x = if wall == Wall::Left { left } else { right };
        let time = (wall_x - source.x) / trajectory::speed_x_projection(speed, angle);
        let wall_y = source.y + trajectory::y_position(speed, angle, time);

        if !time.is_finite() || time <= 0.0 || wall_y < floor {
            let descent = trajectory::ascent_time(speed, angle, floor - source.y, Root::Upper);
            if let Ok(time) = descent {
                self.sample(source, speed, angle, time, points);
            }
            return;
        }

        self.sample(source, speed, angle, time, points);
        let reflected = trajectory::reflect_trajectory(speed, angle, time, wall.normal());
        let speed = trajectory::current_speed(speed, angle, time);
        self.build(
            Vec2::new(wall_x, wall_y),
            speed,
            reflected,
            legs - 1,
            grid,
            points,
        );
    }

    /// Appends points from the launch up to `time`, spaced one time stamp apart
    /// and aligned so the last one lands exactly at `time`.
    fn sample(&self, source: Vec2, speed: f32, angle: f32, time: f32, points: &mut Vec<Vec2>) {
        if !time.is_finite() {
            return;
        }
        let start = points.len();
        let mut elapsed = time;
        while elapsed > 0.0 && points.len() - start < MAX_POINTS_PER_LEG {
            points.push(
                source
                    + Vec2::new(
                        trajectory::x_position(speed, angle, elapsed),
                        trajectory::y_position(speed, angle, elapsed),
                    ),
            );
            elapsed -= self.config.time_stamp;
        }
        points[start..].reverse();
    }
}

/// Time at which an ascending shot first crosses a row whose cell under the
/// crossing point is occupied, scanning from the launch row upward.
fn first_obstruction(
    source: Vec2,
    speed: f32,
    angle: f32,
    left: f32,
    right: f32,
    grid: GridView<'_>,
) -> Option<f32> {
    let geometry = grid.geometry();
    let last_row = i32::try_from(geometry.max_height()).unwrap_or(i32::MAX) - 1;
    let start_row = geometry.world_to_cell(source).row().min(last_row);
    let apex = source.y + trajectory::max_height(speed, angle);

    for row in (0..=start_row).rev() {
        let row_y = geometry.cell_to_anchor(CellCoord::new(row, 0)).y;
        if apex < row_y {
            break;
        }
        let crossing = trajectory::ascent_time(speed, angle, row_y - source.y, Root::Lower);
        let Ok(time) = crossing else {
            break;
        };
        if time <= 0.0 {
            continue;
        }
        let x = source.x + trajectory::x_position(speed, angle, time);
        if x > left && x < right && !grid.is_vacant_at(Vec2::new(x, row_y)) {
            return Some(time);
        }
    }
    None
}
