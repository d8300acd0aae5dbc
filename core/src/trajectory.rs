//! Parabolic flight under constant gravity.
//!
//! Angles are measured in degrees from the positive X axis, speeds in world
//! units per second and times in seconds since the start of a segment.

use glam::Vec2;

use crate::error::DegenerateTrajectoryError;

/// Gravitational acceleration pulling projectiles toward negative Y.
pub const GRAVITY: f32 = 9.8;

/// Root of the ascent-time quadratic to return.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Root {
    /// Earlier crossing of the height.
    Lower,
    /// Later crossing of the height.
    Upper,
}

/// Horizontal displacement after `time`.
#[must_use]
pub fn x_position(speed: f32, angle: f32, time: f32) -> f32 {
    speed * angle.to_radians().cos() * time
}

/// Vertical displacement after `time`.
#[must_use]
pub fn y_position(speed: f32, angle: f32, time: f32) -> f32 {
    speed * angle.to_radians().sin() * time - GRAVITY * time * time / 2.0
}

/// Horizontal velocity, constant over the flight.
#[must_use]
pub fn speed_x_projection(speed: f32, angle: f32) -> f32 {
    speed * angle.to_radians().cos()
}

/// Vertical velocity after `time`.
#[must_use]
pub fn speed_y_projection(speed: f32, angle: f32, time: f32) -> f32 {
    speed * angle.to_radians().sin() - GRAVITY * time
}

/// Velocity vector after `time`.
#[must_use]
pub fn velocity(speed: f32, angle: f32, time: f32) -> Vec2 {
    Vec2::new(
        speed_x_projection(speed, angle),
        speed_y_projection(speed, angle, time),
    )
}

/// Speed magnitude after `time`.
#[must_use]
pub fn current_speed(speed: f32, angle: f32, time: f32) -> f32 {
    velocity(speed, angle, time).length()
}

/// Apex height above the launch point.
#[must_use]
pub fn max_height(speed: f32, angle: f32) -> f32 {
    let sin = angle.to_radians().sin();
    speed * speed * sin * sin / (2.0 * GRAVITY)
}

/// Time needed to reach the apex.
#[must_use]
pub fn full_ascent_time(speed: f32, angle: f32) -> f32 {
    speed * angle.to_radians().sin() / GRAVITY
}

/// Solves `g·t² − 2·v·sign(a)·t + 2·h = 0` for the time the flight reaches `height`.
///
/// The linear term uses the sign of the angle rather than its sine, so for
/// upward shots the result is the crossing time of a vertical throw with the
/// same speed.
pub fn ascent_time(
    speed: f32,
    angle: f32,
    height: f32,
    root: Root,
) -> Result<f32, DegenerateTrajectoryError> {
    let a = GRAVITY;
    let b = -2.0 * speed * angle.to_radians().signum();
    let c = 2.0 * height;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant.is_nan() || discriminant < 0.0 {
        return Err(DegenerateTrajectoryError {
            height,
            discriminant,
        });
    }
    let offset = match root {
        Root::Lower => -discriminant.sqrt(),
        Root::Upper => discriminant.sqrt(),
    };
    Ok((-b + offset) / (2.0 * a))
}

/// Heading of `direction` in degrees, signed by its vertical component.
#[must_use]
pub fn heading(direction: Vec2) -> f32 {
    let unsigned = Vec2::X.angle_between(direction).abs().to_degrees();
    direction.y.signum() * unsigned
}

/// Reflects the velocity at `time` about `normal` and returns the new launch angle.
#[must_use]
pub fn reflect_trajectory(speed: f32, angle: f32, time: f32, normal: Vec2) -> f32 {
    let incoming = velocity(speed, angle, time);
    let reflected = incoming - 2.0 * incoming.dot(normal) * normal;
    heading(reflected)
}

/// One parabolic leg of a flight, valid from `start_time` onward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectorySegment {
    origin: Vec2,
    speed: f32,
    angle: f32,
    start_time: f32,
}

impl TrajectorySegment {
    /// Creates a segment starting at `origin` when the flight clock reads `start_time`.
    #[must_use]
    pub const fn new(origin: Vec2, speed: f32, angle: f32, start_time: f32) -> Self {
        Self {
            origin,
            speed,
            angle,
            start_time,
        }
    }

    /// Launch point of the segment.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Launch speed of the segment.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Launch angle of the segment in degrees.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Flight clock value at which the segment begins.
    #[must_use]
    pub const fn start_time(&self) -> f32 {
        self.start_time
    }

    /// Position when the flight clock reads `time`.
    #[must_use]
    pub fn position_at(&self, time: f32) -> Vec2 {
        let elapsed = time - self.start_time;
        self.origin
            + Vec2::new(
                x_position(self.speed, self.angle, elapsed),
                y_position(self.speed, self.angle, elapsed),
            )
    }

    /// Velocity when the flight clock reads `time`.
    #[must_use]
    pub fn velocity_at(&self, time: f32) -> Vec2 {
        velocity(self.speed, self.angle, time - self.start_time)
    }

    /// Heading in degrees when the flight clock reads `time`.
    #[must_use]
    pub fn heading_at(&self, time: f32) -> f32 {
        heading(self.velocity_at(time))
    }

    /// Speed magnitude when the flight clock reads `time`.
    #[must_use]
    pub fn speed_at(&self, time: f32) -> f32 {
        current_speed(self.speed, self.angle, time - self.start_time)
    }

    /// Opens a new segment at `time` from `position` with the velocity reflected about `normal`.
    #[must_use]
    pub fn reflect(&self, time: f32, position: Vec2, normal: Vec2) -> Self {
        let elapsed = time - self.start_time;
        Self::new(
            position,
            current_speed(self.speed, self.angle, elapsed),
            reflect_trajectory(self.speed, self.angle, elapsed, normal),
            time,
        )
    }

    /// Opens a new segment at `time` from the current point, turned by `delta` degrees.
    #[must_use]
    pub fn turned(&self, time: f32, delta: f32) -> Self {
        Self::new(
            self.position_at(time),
            self.speed_at(time),
            self.heading_at(time) + delta,
            time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apex_matches_reference_values() {
        assert!((max_height(15.0, 45.0) - 5.74).abs() < 0.01);
        assert!((full_ascent_time(15.0, 45.0) - 1.083).abs() < 0.001);
    }

    #[test]
    fn height_peaks_at_full_ascent_time() {
        for &(speed, angle) in &[(15.0f32, 45.0f32), (8.0, 30.0), (20.0, 80.0), (3.0, 5.0)] {
            let apex = full_ascent_time(speed, angle);
            assert_eq!(y_position(speed, angle, 0.0), 0.0);
            let peak = y_position(speed, angle, apex);
            assert!((peak - max_height(speed, angle)).abs() < 1e-3);
            assert!(y_position(speed, angle, apex * 0.5) < peak);
            assert!(y_position(speed, angle, apex * 1.5) < peak);
            assert!(speed_y_projection(speed, angle, apex).abs() < 1e-4);
        }
    }

    #[test]
    fn ascent_time_uses_angle_sign() {
        let speed = 10.0;
        let lower = ascent_time(speed, 60.0, 2.0, Root::Lower).expect("reachable");
        let upper = ascent_time(speed, 60.0, 2.0, Root::Upper).expect("reachable");
        let vertical = |t: f32| speed * t - GRAVITY * t * t / 2.0;
        assert!(lower < upper);
        assert!((vertical(lower) - 2.0).abs() < 1e-3);
        assert!((vertical(upper) - 2.0).abs() < 1e-3);
    }

    #[test]
    fn unreachable_height_is_degenerate() {
        let error = ascent_time(2.0, 45.0, 10.0, Root::Lower).expect_err("too high");
        assert!(error.discriminant < 0.0);
    }

    #[test]
    fn reflection_preserves_speed() {
        let normals = [
            Vec2::X,
            Vec2::NEG_X,
            Vec2::NEG_Y,
            Vec2::new(1.0, 1.0).normalize(),
            Vec2::new(-0.3, 0.8).normalize(),
        ];
        for normal in normals {
            for &(speed, angle, time) in &[(12.0f32, 70.0f32, 0.3f32), (6.0, 120.0, 0.1)] {
                let before = current_speed(speed, angle, time);
                let reflected = reflect_trajectory(speed, angle, time, normal);
                let after = current_speed(before, reflected, 0.0);
                assert!((before - after).abs() < 1e-3, "normal {normal:?}");
            }
        }
    }

    #[test]
    fn side_wall_mirrors_the_heading() {
        let reflected = reflect_trajectory(10.0, 60.0, 0.0, Vec2::NEG_X);
        assert!((reflected - 120.0).abs() < 1e-3);
        let reflected = reflect_trajectory(10.0, 120.0, 0.0, Vec2::X);
        assert!((reflected - 60.0).abs() < 1e-3);
    }

    #[test]
    fn segment_continues_from_reflection_point() {
        let segment = TrajectorySegment::new(Vec2::new(0.0, -3.0), 10.0, 60.0, 0.5);
        let contact = segment.position_at(0.8);
        let next = segment.reflect(0.8, contact, Vec2::NEG_X);
        assert_eq!(next.position_at(0.8), contact);
        assert!((next.speed() - segment.speed_at(0.8)).abs() < 1e-5);
        assert!(next.velocity_at(0.8).x < 0.0);
    }
}
