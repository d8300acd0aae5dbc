#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Launcher system that turns pointer drags into launch parameters.
//!
//! The player drags the loaded bubble away from the launcher anchor. The
//! deflection sets the rail angle and the drag length sets the shot power.
//! Deflections steeper than the angle limit keep the previous rail angle and
//! only project the drag length onto it.

use bubble_shooter_core::{trajectory, BubbleId, Command, Event, LauncherConfig, TimingConfig};
use bubble_shooter_system_sequencing::{CancellationToken, Scheduler};
use glam::Vec2;
use tracing::{debug, warn};

/// Parameters of a shot that just left the rail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaunchOrder {
    /// Bubble leaving the launcher.
    pub bubble: BubbleId,
    /// Position the bubble leaves the rail from.
    pub origin: Vec2,
    /// Launch speed, impulse over mass.
    pub speed: f32,
    /// Launch angle in degrees.
    pub angle: f32,
    /// Whether the shot was released at full power.
    pub max_power: bool,
}

/// Aim state after a drag update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aim {
    /// Bubble sitting on the rail.
    pub bubble: BubbleId,
    /// Position of the bubble on the rail.
    pub position: Vec2,
    /// Normalised pull-back.
    pub power: f32,
    /// Speed the bubble would leave the rail with.
    pub speed: f32,
    /// Angle the bubble would leave the rail at, in degrees.
    pub angle: f32,
}

impl Aim {
    /// Reports whether a release now would fire a full power shot.
    #[must_use]
    pub fn is_max_power(&self) -> bool {
        self.power >= 1.0
    }
}

/// Launch controller owning the rail, the power and the reload timer.
#[derive(Debug)]
pub struct Launcher {
    config: LauncherConfig,
    timing: TimingConfig,
    loaded: Option<BubbleId>,
    rail_angle: f32,
    fire_direction: Vec2,
    stroke: f32,
    reload: Option<CancellationToken>,
}

impl Launcher {
    /// Creates an empty launcher.
    #[must_use]
    pub fn new(config: LauncherConfig, timing: TimingConfig) -> Self {
        if config.lower_stroke > config.upper_stroke {
            warn!(
                lower = config.lower_stroke,
                upper = config.upper_stroke,
                "launcher strokes are inverted"
            );
        }
        let stroke = config.lower_stroke;
        Self {
            config,
            timing,
            loaded: None,
            rail_angle: 0.0,
            fire_direction: Vec2::Y,
            stroke,
            reload: None,
        }
    }

    /// Bubble currently on the rail.
    #[must_use]
    pub fn loaded(&self) -> Option<BubbleId> {
        self.loaded
    }

    /// Normalised pull-back of the current aim.
    #[must_use]
    pub fn power(&self) -> f32 {
        if self.config.upper_stroke > 0.0 {
            self.stroke / self.config.upper_stroke
        } else {
            0.0
        }
    }

    /// Rail rotation from the vertical, in degrees.
    #[must_use]
    pub fn rail_angle(&self) -> f32 {
        self.rail_angle
    }

    /// Position of the loaded bubble on the rail.
    #[must_use]
    pub fn bubble_position(&self) -> Vec2 {
        self.config.anchor + rotate(Vec2::new(0.0, -self.stroke), self.rail_angle)
    }

    /// Launch speed for the current power.
    #[must_use]
    pub fn launch_speed(&self) -> f32 {
        self.power() * self.config.max_impulse / self.config.bubble_mass
    }

    /// Launch angle for the current rail, in degrees.
    #[must_use]
    pub fn launch_angle(&self) -> f32 {
        trajectory::heading(self.fire_direction)
    }

    /// Reacts to world events that load or retire the launcher.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        for event in events {
            match event {
                Event::ProjectileLoaded { bubble, .. } => {
                    self.loaded = Some(*bubble);
                    self.reload = None;
                    self.reset_rail();
                    out.push(Event::ProjectileMoved {
                        bubble: *bubble,
                        position: self.bubble_position(),
                    });
                    out.push(Event::PowerChanged {
                        power: self.power(),
                    });
                }
                Event::GameOver { .. } => {
                    self.loaded = None;
                    self.cancel_reload();
                }
                _ => {}
            }
        }
    }

    /// Moves the loaded bubble toward the pointer at `position`.
    ///
    /// Returns `None` while nothing is loaded.
    pub fn aim(&mut self, position: Vec2, out: &mut Vec<Event>) -> Option<Aim> {
        let bubble = self.loaded?;
        let anchor = self.config.anchor;
        let deflection = position - anchor;
        let below = position.y < anchor.y;
        let reference = if below { Vec2::NEG_Y } else { Vec2::Y };
        let deflection_angle = unsigned_angle(reference, deflection);
        let limit = self.config.angle_limit;

        let mut stroke = deflection.length();
        if deflection_angle <= limit {
            self.rail_angle = sign(position.x - anchor.x) * deflection_angle;
            self.fire_direction = rotate(Vec2::Y, self.rail_angle);
            if position.y > anchor.y {
                stroke = self.config.lower_stroke;
            }
        } else if below {
            stroke *= (deflection_angle - limit).to_radians().cos();
        } else {
            stroke *= (180.0 - limit - deflection_angle).to_radians().cos();
        }
        self.stroke = clamp_stroke(stroke, self.config.lower_stroke, self.config.upper_stroke);

        let aim = Aim {
            bubble,
            position: self.bubble_position(),
            power: self.power(),
            speed: self.launch_speed(),
            angle: self.launch_angle(),
        };
        out.push(Event::ProjectileMoved {
            bubble,
            position: aim.position,
        });
        out.push(Event::PowerChanged { power: aim.power });
        Some(aim)
    }

    /// Releases the loaded bubble and resets the rail.
    pub fn release(&mut self) -> Option<LaunchOrder> {
        let bubble = self.loaded.take()?;
        let order = LaunchOrder {
            bubble,
            origin: self.bubble_position(),
            speed: self.launch_speed(),
            angle: self.launch_angle(),
            max_power: self.power() >= 1.0,
        };
        debug!(?bubble, speed = order.speed, angle = order.angle, "launcher released");
        self.reset_rail();
        Some(order)
    }

    /// Schedules the next reload, replacing any pending one.
    pub fn schedule_reload(&mut self, dropped: bool, scheduler: &mut Scheduler<Command>) {
        self.cancel_reload();
        let delay = self.timing.reload_delay(dropped);
        debug!(?delay, dropped, "reload scheduled");
        self.reload = Some(scheduler.schedule(delay, Command::ReloadLauncher));
    }

    /// Cancels a pending reload.
    pub fn cancel_reload(&mut self) {
        if let Some(token) = self.reload.take() {
            token.cancel();
        }
    }

    fn reset_rail(&mut self) {
        self.rail_angle = 0.0;
        self.fire_direction = Vec2::Y;
        self.stroke = self.config.lower_stroke;
    }
}

/// Rotates `vector` counter-clockwise by `degrees`.
fn rotate(vector: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(vector)
}

fn unsigned_angle(from: Vec2, to: Vec2) -> f32 {
    if to.length_squared() == 0.0 {
        return 0.0;
    }
    from.angle_between(to).abs().to_degrees()
}

/// Sign that treats zero as positive.
fn sign(value: f32) -> f32 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}

// Inverted strokes must not panic, so `f32::clamp` is avoided.
fn clamp_stroke(stroke: f32, lower: f32, upper: f32) -> f32 {
    if stroke < lower {
        lower
    } else if stroke > upper {
        upper
    } else {
        stroke
    }
}
