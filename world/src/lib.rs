#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the bubble shooter.
//!
//! The world owns the bubble grid, the claim queue, the score and the shot
//! budget. It changes only through [`apply`], which resolves every command
//! atomically and reports the outcome as events. Read access goes through the
//! [`query`] module.

mod claim;
mod grid;

use std::collections::BTreeMap;

use bubble_shooter_core::{
    BubbleId, BubbleSnapshot, BubbleVariant, BudgetExhaustedError, CellCoord, Command,
    ConfigError, EdgePolicy, Event, FlightState, GameConfig, GameOutcome, LossReason,
    NoVacantCellError, Occupant, PlacementError, ShotId,
};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::{claim::ClaimQueue, grid::Grid};

#[derive(Clone, Debug)]
struct Bubble {
    id: BubbleId,
    variant: BubbleVariant,
    position: Vec2,
    cell: Option<CellCoord>,
    flight: FlightState,
    collision_enabled: bool,
    bursting: bool,
}

impl Bubble {
    fn snapshot(&self) -> BubbleSnapshot {
        BubbleSnapshot {
            id: self.id,
            variant: self.variant,
            position: self.position,
            cell: self.cell,
            flight: self.flight,
            collision_enabled: self.collision_enabled,
        }
    }

    fn is_flying(&self) -> bool {
        self.flight == FlightState::Flying && !self.bursting
    }
}

/// Represents the authoritative bubble shooter world state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    grid: Grid,
    bubbles: BTreeMap<BubbleId, Bubble>,
    claim: ClaimQueue,
    loaded: Option<BubbleId>,
    score: u64,
    remaining: u32,
    next_bubble: u32,
    outcome: Option<GameOutcome>,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates an empty world after validating `config`.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let claim_capacity = usize::try_from(config.rules.claim_capacity).unwrap_or(usize::MAX);
        Ok(Self {
            grid: Grid::new(config.geometry()),
            bubbles: BTreeMap::new(),
            claim: ClaimQueue::new(claim_capacity),
            loaded: None,
            score: 0,
            remaining: config.rules.bubble_budget,
            next_bubble: 0,
            outcome: None,
            rng: ChaCha8Rng::seed_from_u64(0),
            config,
        })
    }

    fn spawn(
        &mut self,
        variant: BubbleVariant,
        position: Vec2,
        flight: FlightState,
        out_events: &mut Vec<Event>,
    ) -> BubbleId {
        let id = BubbleId::new(self.next_bubble);
        self.next_bubble = self.next_bubble.saturating_add(1);
        let _ = self.bubbles.insert(
            id,
            Bubble {
                id,
                variant,
                position,
                cell: None,
                flight,
                collision_enabled: flight == FlightState::Flying,
                bursting: false,
            },
        );
        out_events.push(Event::BubbleSpawned {
            bubble: id,
            variant,
            position,
        });
        id
    }

    fn random_variant(&mut self) -> BubbleVariant {
        BubbleVariant::new(self.rng.gen_range(0..self.config.grid.palette_size))
    }

    fn anchor(
        &mut self,
        bubble: BubbleId,
        variant: BubbleVariant,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), PlacementError> {
        self.grid.place(cell, Occupant { bubble, variant })?;
        let anchor = self.grid.geometry().cell_to_anchor(cell);
        if let Some(entry) = self.bubbles.get_mut(&bubble) {
            entry.cell = Some(cell);
            entry.position = anchor;
            entry.flight = FlightState::Anchored;
            entry.collision_enabled = false;
        }
        out_events.push(Event::BubbleAnchored {
            bubble,
            cell,
            anchor,
        });
        Ok(())
    }

    fn burst(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) -> Option<BubbleId> {
        let occupant = self.grid.vacate(cell)?;
        if let Some(entry) = self.bubbles.get_mut(&occupant.bubble) {
            entry.cell = None;
            entry.flight = FlightState::Idle;
            entry.collision_enabled = false;
            entry.bursting = true;
        }
        out_events.push(Event::BubbleBurst {
            bubble: occupant.bubble,
        });
        Some(occupant.bubble)
    }

    fn award(&mut self, points: u64, out_events: &mut Vec<Event>) {
        self.score = self.score.saturating_add(points);
        out_events.push(Event::ScoreChanged { score: self.score });
    }

    fn finish(&mut self, outcome: GameOutcome, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        info!(?outcome, score = self.score, "game over");
        out_events.push(Event::GameOver {
            outcome,
            score: self.score,
        });
    }

    fn start_level(&mut self, seed: u64, out_events: &mut Vec<Event>) {
        for bubble in self.bubbles.keys() {
            out_events.push(Event::BubbleDestroyed { bubble: *bubble });
        }
        self.bubbles.clear();
        self.grid.clear();
        self.claim.clear();
        self.loaded = None;
        self.score = 0;
        self.remaining = self.config.rules.bubble_budget;
        self.outcome = None;
        self.rng = ChaCha8Rng::seed_from_u64(seed);

        let height = i32::try_from(self.config.grid.height).unwrap_or(i32::MAX);
        let cells: Vec<CellCoord> = self
            .grid
            .geometry()
            .cells()
            .filter(|cell| cell.row() < height)
            .collect();
        let mut placed = 0;
        for cell in cells {
            let variant = self.random_variant();
            let anchor = self.grid.geometry().cell_to_anchor(cell);
            let bubble = self.spawn(variant, anchor, FlightState::Idle, out_events);
            match self.anchor(bubble, variant, cell, out_events) {
                Ok(()) => placed += 1,
                Err(reason) => out_events.push(Event::PlacementRejected { cell, reason }),
            }
        }

        info!(seed, bubbles = placed, "level started");
        out_events.push(Event::LevelStarted { bubbles: placed });
        out_events.push(Event::ScoreChanged { score: 0 });
        out_events.push(Event::RemainingShotsChanged {
            remaining: self.remaining,
        });
        self.top_up_claim(out_events);
    }

    fn place_bubble(
        &mut self,
        cell: CellCoord,
        variant: BubbleVariant,
        out_events: &mut Vec<Event>,
    ) {
        if let Err(error) = self.grid.geometry().check_bounds(cell) {
            out_events.push(Event::PlacementRejected {
                cell,
                reason: error.into(),
            });
            return;
        }
        if self.grid.occupant(cell).is_some() {
            out_events.push(Event::PlacementRejected {
                cell,
                reason: PlacementError::Occupied,
            });
            return;
        }
        let anchor = self.grid.geometry().cell_to_anchor(cell);
        let bubble = self.spawn(variant, anchor, FlightState::Idle, out_events);
        if let Err(reason) = self.anchor(bubble, variant, cell, out_events) {
            out_events.push(Event::PlacementRejected { cell, reason });
        }
    }

    fn top_up_claim(&mut self, out_events: &mut Vec<Event>) {
        if self.remaining == 0 || self.claim.is_full() {
            return;
        }
        self.remaining -= 1;
        let variant = self.random_variant();
        let position = self.config.launcher.claim_position;
        let bubble = self.spawn(variant, position, FlightState::Idle, out_events);
        let _ = self.claim.push(bubble);
        out_events.push(Event::RemainingShotsChanged {
            remaining: self.remaining,
        });
    }

    fn reload(&mut self, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() || self.loaded.is_some() {
            return;
        }
        self.top_up_claim(out_events);
        let Some(bubble) = self.claim.pop() else {
            warn!("{}", BudgetExhaustedError);
            self.finish(GameOutcome::Lost(LossReason::BudgetExhausted), out_events);
            return;
        };
        let anchor = self.config.launcher.anchor;
        if let Some(entry) = self.bubbles.get_mut(&bubble) {
            entry.position = anchor;
            self.loaded = Some(bubble);
            out_events.push(Event::ProjectileLoaded {
                bubble,
                variant: entry.variant,
            });
        }
    }

    fn split(&mut self, bubble: BubbleId, shot: ShotId, out_events: &mut Vec<Event>) {
        let Some(source) = self.bubbles.get(&bubble).filter(|entry| entry.is_flying()) else {
            return;
        };
        let (variant, position) = (source.variant, source.position);
        let twin = self.spawn(variant, position, FlightState::Flying, out_events);
        debug!(?bubble, ?twin, "projectile split");
        out_events.push(Event::ProjectileSplit {
            source: bubble,
            twin,
            shot,
        });
    }

    /// Pins a flying bubble next to `target`, or into its cell when swapping.
    fn snap(
        &mut self,
        bubble: BubbleId,
        variant: BubbleVariant,
        target: BubbleId,
        position: Vec2,
        allow_swap: bool,
        out_events: &mut Vec<Event>,
    ) -> Result<CellCoord, NoVacantCellError> {
        let target_cell = self.bubbles.get(&target).and_then(|entry| entry.cell);
        let cell = match target_cell {
            Some(cell) if allow_swap => {
                let _ = self.burst(cell, out_events);
                cell
            }
            Some(cell) => self
                .grid
                .snap_cell(cell, position)
                .ok_or(NoVacantCellError { target })?,
            None => {
                // The target burst earlier in the frame; settle where the projectile is.
                let cell = self.grid.geometry().world_to_cell(position);
                if !self.grid.view().is_vacant(cell, EdgePolicy::Strict) {
                    return Err(NoVacantCellError { target });
                }
                cell
            }
        };
        self.anchor(bubble, variant, cell, out_events)
            .map_err(|_| NoVacantCellError { target })?;
        debug!(?bubble, ?cell, allow_swap, "projectile snapped");
        Ok(cell)
    }

    fn burst_matches(&mut self, pivot: CellCoord, out_events: &mut Vec<Event>) -> bool {
        let group = self.grid.matched_group(pivot);
        if group.len() < usize::try_from(self.config.rules.match_count).unwrap_or(usize::MAX) {
            return false;
        }
        let bubbles: Vec<BubbleId> = group
            .into_iter()
            .filter_map(|cell| self.burst(cell, out_events))
            .collect();
        let awarded = cluster_award(bubbles.len());
        debug!(size = bubbles.len(), awarded, "matched bubbles burst");
        out_events.push(Event::BubblesMatched { bubbles, awarded });
        self.award(awarded, out_events);
        true
    }

    fn prune_hanging(&mut self, out_events: &mut Vec<Event>) -> bool {
        let clusters = self.grid.hanging_clusters();
        let pruned = !clusters.is_empty();
        for cluster in clusters {
            let bubbles: Vec<BubbleId> = cluster
                .into_iter()
                .filter_map(|cell| self.burst(cell, out_events))
                .collect();
            let awarded = cluster_award(bubbles.len());
            info!(size = bubbles.len(), awarded, "hanging cluster dropped");
            out_events.push(Event::ClusterDropped { bubbles, awarded });
            self.award(awarded, out_events);
        }
        pruned
    }

    fn check_win(&mut self, out_events: &mut Vec<Event>) -> bool {
        let occupied = self.grid.occupied_in_row(0) as f32;
        let width = self.grid.geometry().width() as f32;
        if occupied / width * 100.0 >= self.config.rules.empty_cells_percentage {
            return false;
        }
        let bonus = power_of_two(u64::from(self.remaining));
        self.award(bonus, out_events);
        self.finish(GameOutcome::Won, out_events);
        true
    }

    fn resolve_collision(
        &mut self,
        bubble: BubbleId,
        target: BubbleId,
        position: Vec2,
        allow_swap: bool,
        out_events: &mut Vec<Event>,
    ) {
        let Some(variant) = self
            .bubbles
            .get(&bubble)
            .filter(|entry| entry.is_flying())
            .map(|entry| entry.variant)
        else {
            return;
        };

        let cell = match self.snap(bubble, variant, target, position, allow_swap, out_events) {
            Ok(cell) => cell,
            Err(error) => {
                warn!(%error, "snap failed");
                self.finish(GameOutcome::Lost(LossReason::NoVacantCell), out_events);
                return;
            }
        };

        let _ = self.burst_matches(cell, out_events);
        let dropped = self.prune_hanging(out_events);
        if self.check_win(out_events) {
            return;
        }
        out_events.push(Event::ShotResolved { bubble, dropped });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartLevel { seed } => world.start_level(seed, out_events),
        Command::PlaceBubble { cell, variant } => world.place_bubble(cell, variant, out_events),
        Command::DestroyBubble { bubble } => {
            let removable = world
                .bubbles
                .get(&bubble)
                .is_some_and(|entry| entry.cell.is_none() && entry.bursting);
            if removable {
                let _ = world.bubbles.remove(&bubble);
                out_events.push(Event::BubbleDestroyed { bubble });
            }
        }
        _ if world.outcome.is_some() => {}
        Command::ReloadLauncher => world.reload(out_events),
        Command::LaunchProjectile {
            bubble,
            shot,
            origin,
        } => {
            if world.loaded != Some(bubble) {
                return;
            }
            world.loaded = None;
            if let Some(entry) = world.bubbles.get_mut(&bubble) {
                entry.flight = FlightState::Flying;
                entry.collision_enabled = true;
                entry.position = origin;
                out_events.push(Event::ProjectileLaunched { bubble, shot });
            }
        }
        Command::MoveProjectile { bubble, position } => {
            if let Some(entry) = world.bubbles.get_mut(&bubble).filter(|entry| entry.is_flying()) {
                entry.position = position;
                out_events.push(Event::ProjectileMoved { bubble, position });
            }
        }
        Command::SplitProjectile { bubble, shot } => world.split(bubble, shot, out_events),
        Command::ResolveCollision {
            bubble,
            target,
            position,
            allow_swap,
        } => world.resolve_collision(bubble, target, position, allow_swap, out_events),
        Command::BurstProjectile { bubble } => {
            let Some(entry) = world.bubbles.get_mut(&bubble).filter(|entry| entry.is_flying())
            else {
                return;
            };
            entry.flight = FlightState::Idle;
            entry.collision_enabled = false;
            entry.bursting = true;
            out_events.push(Event::BubbleBurst { bubble });
            out_events.push(Event::ShotResolved {
                bubble,
                dropped: false,
            });
        }
    }
}

/// Points for a cluster of `size` bubbles, `2^(size - 1)`.
fn cluster_award(size: usize) -> u64 {
    match size {
        0 => 0,
        size => power_of_two(size as u64 - 1),
    }
}

fn power_of_two(exponent: u64) -> u64 {
    u32::try_from(exponent)
        .ok()
        .and_then(|exponent| 1u64.checked_shl(exponent))
        .unwrap_or(u64::MAX)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use bubble_shooter_core::{BubbleId, BubbleSnapshot, GameConfig, GameOutcome, GridView};

    use super::World;

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Read-only view of the grid.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        world.grid.view()
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(world: &World) -> u64 {
        world.score
    }

    /// Bubbles that may still be created for the launcher.
    #[must_use]
    pub fn remaining_budget(world: &World) -> u32 {
        world.remaining
    }

    /// Result of the game once it ended.
    #[must_use]
    pub fn outcome(world: &World) -> Option<GameOutcome> {
        world.outcome
    }

    /// Bubble waiting on the launcher, if any.
    #[must_use]
    pub fn loaded(world: &World) -> Option<BubbleId> {
        world.loaded
    }

    /// Bubbles in the claim queue, oldest first.
    #[must_use]
    pub fn claim(world: &World) -> Vec<BubbleId> {
        world.claim.iter().collect()
    }

    /// Snapshot of a single bubble.
    #[must_use]
    pub fn bubble(world: &World, bubble: BubbleId) -> Option<BubbleSnapshot> {
        world.bubbles.get(&bubble).map(super::Bubble::snapshot)
    }

    /// Snapshots of every live bubble ordered by identifier.
    #[must_use]
    pub fn bubbles(world: &World) -> Vec<BubbleSnapshot> {
        world.bubbles.values().map(super::Bubble::snapshot).collect()
    }
}
