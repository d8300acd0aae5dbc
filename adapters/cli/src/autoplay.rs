use bubble_shooter_core::LauncherConfig;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded stand-in for a player dragging the loaded bubble.
#[derive(Debug)]
pub(crate) struct Autoplayer {
    rng: ChaCha8Rng,
}

impl Autoplayer {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Picks a pointer position below the launcher anchor.
    ///
    /// The pull may overshoot the upper stroke slightly so full power shots
    /// show up in a session.
    pub(crate) fn next_pull(&mut self, launcher: &LauncherConfig) -> Vec2 {
        let limit = launcher.angle_limit.abs().max(f32::EPSILON);
        let deflection = self.rng.gen_range(-limit..=limit).to_radians();
        let shortest = launcher.lower_stroke.min(launcher.upper_stroke).max(0.0);
        let longest = (launcher.upper_stroke.max(launcher.lower_stroke) * 1.1).max(shortest);
        let length = self.rng.gen_range(shortest..=longest);
        launcher.anchor + Vec2::new(deflection.sin(), -deflection.cos()) * length
    }
}

#[cfg(test)]
mod tests {
    use super::Autoplayer;
    use bubble_shooter_core::LauncherConfig;

    #[test]
    fn pulls_stay_below_the_anchor_within_reach() {
        let launcher = LauncherConfig::default();
        let mut player = Autoplayer::new(9);
        for _ in 0..200 {
            let pull = player.next_pull(&launcher) - launcher.anchor;
            assert!(pull.y < 0.0, "pull {pull:?} points upward");
            assert!(pull.length() <= launcher.upper_stroke * 1.1 + 1e-4);
            assert!(pull.length() >= launcher.lower_stroke - 1e-4);
        }
    }

    #[test]
    fn equal_seeds_pick_equal_pulls() {
        let launcher = LauncherConfig::default();
        let mut first = Autoplayer::new(4);
        let mut second = Autoplayer::new(4);
        for _ in 0..10 {
            assert_eq!(first.next_pull(&launcher), second.next_pull(&launcher));
        }
    }
}
