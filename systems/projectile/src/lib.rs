#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile system that flies launched bubbles along parabolic segments.
//!
//! Every flight is sampled in short sub-steps. Side and top walls reflect the
//! trajectory, the bottom edge bursts the projectile and touching an anchored
//! bubble hands the projectile to the world for snapping.

use std::{collections::BTreeMap, time::Duration};

use bubble_shooter_core::{
    BubbleId, Command, Event, FieldConfig, GridView, ProjectileState, ShotId, TrajectorySegment,
    Wall,
};
use glam::Vec2;
use tracing::{debug, trace};

/// Longest simulated interval between two collision probes, in seconds.
pub const MAX_STEP_SECS: f32 = 1.0 / 240.0;

/// Something a projectile touched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Contact {
    /// An anchored bubble.
    Bubble(BubbleId),
    /// A wall, with the projectile moved back onto its border.
    Wall {
        /// Wall that was touched.
        wall: Wall,
        /// Point on the border where the flight continues.
        at: Vec2,
    },
}

/// Detects contacts for a projectile sampled at `position` moving with `velocity`.
pub trait CollisionProbe {
    /// Returns the first contact, bubbles before walls.
    ///
    /// Walls only register while the projectile moves toward them.
    fn contact(&self, position: Vec2, velocity: Vec2) -> Option<Contact>;
}

/// Probe backed by the playing field walls and the anchored grid.
#[derive(Clone, Copy, Debug)]
pub struct FieldProbe<'a> {
    field: &'a FieldConfig,
    grid: GridView<'a>,
}

impl<'a> FieldProbe<'a> {
    /// Creates a probe over `field` and the anchored bubbles in `grid`.
    #[must_use]
    pub const fn new(field: &'a FieldConfig, grid: GridView<'a>) -> Self {
        Self { field, grid }
    }

    fn nearest_bubble(&self, position: Vec2) -> Option<BubbleId> {
        let geometry = *self.grid.geometry();
        self.grid
            .occupied()
            .map(|(cell, occupant)| {
                let distance = geometry.cell_to_anchor(cell).distance(position);
                (occupant.bubble, distance)
            })
            .filter(|(_, distance)| *distance <= self.field.contact_distance)
            .min_by(|left, right| left.1.total_cmp(&right.1))
            .map(|(bubble, _)| bubble)
    }
}

impl CollisionProbe for FieldProbe<'_> {
    fn contact(&self, position: Vec2, velocity: Vec2) -> Option<Contact> {
        if let Some(bubble) = self.nearest_bubble(position) {
            return Some(Contact::Bubble(bubble));
        }

        let field = self.field;
        if position.x <= field.left_border() && velocity.x < 0.0 {
            return Some(Contact::Wall {
                wall: Wall::Left,
                at: Vec2::new(field.left_border(), position.y),
            });
        }
        if position.x >= field.right_border() && velocity.x > 0.0 {
            return Some(Contact::Wall {
                wall: Wall::Right,
                at: Vec2::new(field.right_border(), position.y),
            });
        }
        let ceiling = field.top - field.bubble_radius;
        if position.y >= ceiling && velocity.y > 0.0 {
            return Some(Contact::Wall {
                wall: Wall::Top,
                at: Vec2::new(position.x, ceiling),
            });
        }
        if position.y - field.bubble_radius <= field.bottom && velocity.y < 0.0 {
            return Some(Contact::Wall {
                wall: Wall::Bottom,
                at: position,
            });
        }
        None
    }
}

/// Read-only view of a tracked projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Bubble being flown.
    pub bubble: BubbleId,
    /// Shot the projectile belongs to.
    pub shot: ShotId,
    /// Current state.
    pub state: ProjectileState,
    /// Last sampled position.
    pub position: Vec2,
    /// Velocity at the last sample.
    pub velocity: Vec2,
}

#[derive(Clone, Debug)]
struct Flight {
    shot: ShotId,
    state: ProjectileState,
    segment: TrajectorySegment,
    clock: f32,
    max_power: bool,
}

impl Flight {
    fn transition(&mut self, bubble: BubbleId, next: ProjectileState) -> bool {
        if !self.state.can_transition_to(next) {
            debug!(?bubble, from = ?self.state, to = ?next, "projectile transition rejected");
            return false;
        }
        self.state = next;
        true
    }

    fn position(&self) -> Vec2 {
        self.segment.position_at(self.clock)
    }
}

/// Tracks every projectile between launch and resolution.
#[derive(Debug)]
pub struct Projectiles {
    spread_angle: f32,
    flights: BTreeMap<BubbleId, Flight>,
}

impl Projectiles {
    /// Creates an empty tracker; split twins diverge by `spread_angle` degrees.
    #[must_use]
    pub fn new(spread_angle: f32) -> Self {
        Self {
            spread_angle,
            flights: BTreeMap::new(),
        }
    }

    /// Starts flying `bubble` along `segment`.
    pub fn launch(
        &mut self,
        bubble: BubbleId,
        shot: ShotId,
        segment: TrajectorySegment,
        max_power: bool,
    ) {
        let mut flight = Flight {
            shot,
            state: ProjectileState::Aiming,
            clock: segment.start_time(),
            segment,
            max_power,
        };
        if flight.transition(bubble, ProjectileState::Flying) {
            let _ = self.flights.insert(bubble, flight);
        }
    }

    /// Number of tracked projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    /// Reports whether no projectile is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Snapshot of a tracked projectile.
    #[must_use]
    pub fn projectile(&self, bubble: BubbleId) -> Option<ProjectileSnapshot> {
        self.flights.get(&bubble).map(|flight| ProjectileSnapshot {
            bubble,
            shot: flight.shot,
            state: flight.state,
            position: flight.position(),
            velocity: flight.segment.velocity_at(flight.clock),
        })
    }

    /// Advances every flying projectile by `dt`.
    ///
    /// Emits a `MoveProjectile` command per moved projectile, followed by a
    /// command for each projectile that touched a bubble or the bottom edge.
    pub fn advance<P>(&mut self, dt: Duration, probe: &P, out_commands: &mut Vec<Command>)
    where
        P: CollisionProbe,
    {
        let total = dt.as_secs_f32();
        if total <= 0.0 {
            return;
        }

        for (&bubble, flight) in &mut self.flights {
            if flight.state != ProjectileState::Flying {
                continue;
            }

            let mut contact = None;
            let mut remaining = total;
            while remaining > 0.0 && flight.state == ProjectileState::Flying {
                let step = remaining.min(MAX_STEP_SECS);
                remaining -= step;
                flight.clock += step;

                let position = flight.position();
                let velocity = flight.segment.velocity_at(flight.clock);
                match probe.contact(position, velocity) {
                    None => {}
                    Some(Contact::Bubble(target)) => {
                        if flight.transition(bubble, ProjectileState::Colliding) {
                            trace!(?bubble, ?target, "projectile touched the grid");
                            contact = Some(Command::ResolveCollision {
                                bubble,
                                target,
                                position,
                                allow_swap: flight.max_power,
                            });
                        }
                    }
                    Some(Contact::Wall {
                        wall: Wall::Bottom, ..
                    }) => {
                        if flight.transition(bubble, ProjectileState::Bursting) {
                            trace!(?bubble, "projectile reached the bottom");
                            contact = Some(Command::BurstProjectile { bubble });
                        }
                    }
                    Some(Contact::Wall { wall, at }) => {
                        if flight.transition(bubble, ProjectileState::Flying) {
                            trace!(?bubble, ?wall, "projectile bounced");
                            flight.segment = flight.segment.reflect(flight.clock, at, wall.normal());
                        }
                    }
                }
            }

            out_commands.push(Command::MoveProjectile {
                bubble,
                position: flight.position(),
            });
            out_commands.extend(contact);
        }
    }

    /// Reacts to world events that finish, split or clear projectiles.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::BubbleAnchored { bubble, .. } => {
                    self.finish(*bubble, ProjectileState::Anchored);
                }
                Event::BubbleBurst { bubble } => {
                    let bursting = self
                        .flights
                        .get(bubble)
                        .is_some_and(|flight| flight.state == ProjectileState::Bursting);
                    if bursting {
                        self.finish(*bubble, ProjectileState::Removed);
                    }
                }
                Event::ProjectileSplit {
                    source,
                    twin,
                    shot,
                } => self.split(*source, *twin, *shot),
                Event::LevelStarted { .. } | Event::GameOver { .. } => self.flights.clear(),
                _ => {}
            }
        }
    }

    fn finish(&mut self, bubble: BubbleId, state: ProjectileState) {
        let Some(flight) = self.flights.get_mut(&bubble) else {
            return;
        };
        if flight.transition(bubble, state) {
            let _ = self.flights.remove(&bubble);
        }
    }

    fn split(&mut self, source: BubbleId, twin: BubbleId, shot: ShotId) {
        let Some(flight) = self
            .flights
            .get_mut(&source)
            .filter(|flight| flight.state == ProjectileState::Flying)
        else {
            return;
        };
        let clock = flight.clock;
        let twin_segment = flight.segment.turned(clock, self.spread_angle);
        flight.segment = flight.segment.turned(clock, -self.spread_angle);
        let max_power = flight.max_power;
        debug!(?source, ?twin, "projectile split in flight");
        self.launch(twin, shot, twin_segment, max_power);
    }
}
