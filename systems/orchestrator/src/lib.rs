#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-driven wiring of the world and the pure systems.
//!
//! Adapters feed pointer input through [`Orchestrator::aim`] and
//! [`Orchestrator::release`] and advance time with [`Orchestrator::tick`].
//! Every world command runs to completion before the next one starts, and
//! every resulting event is forwarded to the caller for presentation.

mod shots;

use std::time::Duration;

use bubble_shooter_core::{
    Command, ConfigError, Event, GameConfig, GameOutcome, ShotId, TrajectorySegment,
};
use bubble_shooter_system_launcher::Launcher;
use bubble_shooter_system_preview::Preview;
use bubble_shooter_system_projectile::{FieldProbe, Projectiles};
use bubble_shooter_system_sequencing::Scheduler;
use bubble_shooter_world::{self as world, query, World};
use glam::Vec2;
use tracing::{debug, info};

use crate::shots::ShotTable;

/// Owns a game session and routes commands and events between its parts.
#[derive(Debug)]
pub struct Orchestrator {
    world: World,
    launcher: Launcher,
    projectiles: Projectiles,
    preview: Preview,
    scheduler: Scheduler<Command>,
    shots: ShotTable,
    next_shot: u32,
    split_delay: Duration,
    burst_delay: Duration,
}

impl Orchestrator {
    /// Validates `config` and assembles an idle session.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let spread_angle = config.launcher.spread_angle;
        let split_delay =
            Duration::try_from_secs_f32(config.launcher.spread_delay_secs).unwrap_or_default();
        let burst_delay = config.timing.burst_delay();
        let launcher = Launcher::new(config.launcher.clone(), config.timing.clone());
        let projectiles = Projectiles::new(spread_angle);
        let preview = Preview::new(config.preview.clone(), config.field.clone(), spread_angle);
        let world = World::new(config)?;
        Ok(Self {
            world,
            launcher,
            projectiles,
            preview,
            scheduler: Scheduler::new(),
            shots: ShotTable::default(),
            next_shot: 0,
            split_delay,
            burst_delay,
        })
    }

    /// Read access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Final result once the game ended.
    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        query::outcome(&self.world)
    }

    /// Reports whether a bubble waits on the launcher.
    #[must_use]
    pub fn ready_to_fire(&self) -> bool {
        self.outcome().is_none() && self.launcher.loaded().is_some()
    }

    /// Number of shots whose projectiles have not all resolved.
    #[must_use]
    pub fn shots_in_flight(&self) -> usize {
        self.shots.open_shots()
    }

    /// Number of projectiles currently tracked.
    #[must_use]
    pub fn projectiles_in_flight(&self) -> usize {
        self.projectiles.len()
    }

    /// Launcher pivot in world space.
    #[must_use]
    pub fn launcher_anchor(&self) -> Vec2 {
        query::config(&self.world).launcher.anchor
    }

    /// Fills a new level from `seed` and loads the first bubble.
    pub fn start(&mut self, seed: u64, out: &mut Vec<Event>) {
        self.scheduler.clear();
        self.shots.cancel_all();
        self.launcher.cancel_reload();
        info!(seed, "starting level");
        self.execute(Command::StartLevel { seed }, out);
        self.execute(Command::ReloadLauncher, out);
    }

    /// Moves the loaded bubble toward the pointer and refreshes the preview.
    pub fn aim(&mut self, pointer: Vec2, out: &mut Vec<Event>) {
        if self.outcome().is_some() {
            return;
        }
        let Some(aim) = self.launcher.aim(pointer, out) else {
            return;
        };
        self.preview.show(
            aim.position,
            aim.speed,
            aim.angle,
            aim.is_max_power(),
            query::grid_view(&self.world),
            out,
        );
    }

    /// Fires the loaded bubble with the current aim.
    pub fn release(&mut self, out: &mut Vec<Event>) {
        if self.outcome().is_some() {
            return;
        }
        let Some(order) = self.launcher.release() else {
            return;
        };
        self.preview.clear(out);

        let shot = ShotId::new(self.next_shot);
        self.next_shot = self.next_shot.wrapping_add(1);
        self.shots.cancel_all();
        let scope = self.shots.open(shot, order.bubble);

        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::LaunchProjectile {
                bubble: order.bubble,
                shot,
                origin: order.origin,
            },
            &mut events,
        );
        let launched = events
            .iter()
            .any(|event| matches!(event, Event::ProjectileLaunched { .. }));
        self.react(&events, out);
        if !launched {
            return;
        }

        self.projectiles.launch(
            order.bubble,
            shot,
            TrajectorySegment::new(order.origin, order.speed, order.angle, 0.0),
            order.max_power,
        );
        if order.max_power {
            debug!(?shot, "split scheduled");
            self.scheduler.schedule_with(
                self.split_delay,
                Command::SplitProjectile {
                    bubble: order.bubble,
                    shot,
                },
                &scope,
            );
        }
    }

    /// Advances the session by `dt`: deferred tasks first, then projectile flight.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let mut due = Vec::new();
        self.scheduler.advance(dt, &mut due);
        for command in due {
            self.execute(command, out);
        }

        let mut commands = Vec::new();
        {
            let probe = FieldProbe::new(
                &query::config(&self.world).field,
                query::grid_view(&self.world),
            );
            self.projectiles.advance(dt, &probe, &mut commands);
        }
        for command in commands {
            self.execute(command, out);
        }
    }

    fn execute(&mut self, command: Command, out: &mut Vec<Event>) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.react(&events, out);
    }

    fn react(&mut self, events: &[Event], out: &mut Vec<Event>) {
        out.extend_from_slice(events);
        self.projectiles.handle(events);
        self.launcher.handle(events, out);

        for event in events {
            match event {
                Event::BubbleBurst { bubble } => {
                    let _ = self
                        .scheduler
                        .schedule(self.burst_delay, Command::DestroyBubble { bubble: *bubble });
                }
                Event::ProjectileSplit { twin, shot, .. } => self.shots.join(*shot, *twin),
                Event::ShotResolved { bubble, dropped } => {
                    if let Some(dropped) = self.shots.resolve(*bubble, *dropped) {
                        self.launcher.schedule_reload(dropped, &mut self.scheduler);
                    }
                }
                Event::GameOver { .. } => self.shots.cancel_all(),
                _ => {}
            }
        }
    }
}
