use bubble_shooter_core::{
    BubbleId, BubbleVariant, CellCoord, Command, Event, FlightState, GameConfig, GameOutcome,
    LossReason, ShotId,
};
use bubble_shooter_world::{self as world, query, World};
use glam::Vec2;

fn config() -> GameConfig {
    let mut config = GameConfig::default();
    config.grid.width = 4;
    config.grid.height = 1;
    config.grid.max_height = 6;
    config.grid.interval = 1.0;
    config.grid.origin = Vec2::ZERO;
    config.grid.palette_size = 3;
    config.rules.match_count = 3;
    config.rules.empty_cells_percentage = 30.0;
    config.rules.bubble_budget = 5;
    config
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn place(world: &mut World, row: i32, column: i32, variant: u8) -> BubbleId {
    let cell = CellCoord::new(row, column);
    let _ = run(
        world,
        Command::PlaceBubble {
            cell,
            variant: BubbleVariant::new(variant),
        },
    );
    query::grid_view(world)
        .occupant(cell)
        .expect("bubble placed")
        .bubble
}

/// Loads and launches a projectile, returning it with its colour.
fn launch(world: &mut World) -> (BubbleId, u8) {
    let _ = run(world, Command::ReloadLauncher);
    let bubble = query::loaded(world).expect("launcher loaded");
    let variant = query::bubble(world, bubble)
        .expect("bubble exists")
        .variant
        .get();
    let events = run(
        world,
        Command::LaunchProjectile {
            bubble,
            shot: ShotId::new(0),
            origin: Vec2::new(2.0, -5.0),
        },
    );
    assert!(matches!(
        events.as_slice(),
        [Event::ProjectileLaunched { .. }]
    ));
    (bubble, variant)
}

fn other(variant: u8) -> u8 {
    (variant + 1) % 3
}

#[test]
fn snap_failure_ends_the_game() {
    let mut world = World::new(config()).expect("valid config");
    let (projectile, variant) = launch(&mut world);
    let target = place(&mut world, 2, 1, other(variant));
    let _ = place(&mut world, 2, 2, other(variant));
    let _ = place(&mut world, 3, 1, other(variant));
    let _ = place(&mut world, 4, 1, other(variant));

    let anchor = query::grid_view(&world)
        .geometry()
        .cell_to_anchor(CellCoord::new(2, 1));
    let events = run(
        &mut world,
        Command::ResolveCollision {
            bubble: projectile,
            target,
            position: anchor + Vec2::new(0.2, -0.4),
            allow_swap: false,
        },
    );

    assert_eq!(
        events,
        vec![Event::GameOver {
            outcome: GameOutcome::Lost(LossReason::NoVacantCell),
            score: 0,
        }]
    );
    assert_eq!(
        query::outcome(&world),
        Some(GameOutcome::Lost(LossReason::NoVacantCell))
    );
    let ignored = run(&mut world, Command::ReloadLauncher);
    assert!(ignored.is_empty(), "commands after game over are ignored");
}

#[test]
fn clearing_the_top_row_wins_with_budget_bonus() {
    let mut world = World::new(config()).expect("valid config");
    let (projectile, variant) = launch(&mut world);
    let _ = place(&mut world, 0, 0, variant);
    let target = place(&mut world, 0, 1, variant);
    let _ = place(&mut world, 0, 3, other(variant));

    let anchor = query::grid_view(&world)
        .geometry()
        .cell_to_anchor(CellCoord::new(0, 1));
    let events = run(
        &mut world,
        Command::ResolveCollision {
            bubble: projectile,
            target,
            position: anchor + Vec2::new(-0.3, -0.8),
            allow_swap: false,
        },
    );

    assert!(events.contains(&Event::BubbleAnchored {
        bubble: projectile,
        cell: CellCoord::new(1, 0),
        anchor: Vec2::new(1.0, -1.5),
    }));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::BubblesMatched { bubbles, awarded: 4 } if bubbles.len() == 3)));
    // Budget of five minus the bubble created for this shot.
    assert_eq!(query::score(&world), 4 + 16);
    assert_eq!(
        events.last(),
        Some(&Event::GameOver {
            outcome: GameOutcome::Won,
            score: 20,
        })
    );
}

#[test]
fn unmatched_shot_resolves_without_winning() {
    let mut world = World::new(config()).expect("valid config");
    let (projectile, variant) = launch(&mut world);
    let _ = place(&mut world, 0, 0, other(variant));
    let target = place(&mut world, 0, 1, other(variant));
    let _ = place(&mut world, 0, 2, variant);

    let anchor = query::grid_view(&world)
        .geometry()
        .cell_to_anchor(CellCoord::new(0, 1));
    let events = run(
        &mut world,
        Command::ResolveCollision {
            bubble: projectile,
            target,
            position: anchor + Vec2::new(0.1, -0.9),
            allow_swap: false,
        },
    );

    assert_eq!(
        events.last(),
        Some(&Event::ShotResolved {
            bubble: projectile,
            dropped: false,
        })
    );
    let snapshot = query::bubble(&world, projectile).expect("projectile kept");
    assert_eq!(snapshot.flight, FlightState::Anchored);
    assert!(!snapshot.collision_enabled);
    assert_eq!(snapshot.cell, Some(CellCoord::new(1, 1)));
    assert_eq!(query::outcome(&world), None);
}

#[test]
fn swap_replaces_the_target() {
    let mut world = World::new(config()).expect("valid config");
    let (projectile, variant) = launch(&mut world);
    let _ = place(&mut world, 0, 0, other(variant));
    let target = place(&mut world, 0, 1, other(variant));
    let _ = place(&mut world, 0, 2, other(variant));

    let anchor = query::grid_view(&world)
        .geometry()
        .cell_to_anchor(CellCoord::new(0, 1));
    let events = run(
        &mut world,
        Command::ResolveCollision {
            bubble: projectile,
            target,
            position: anchor + Vec2::new(0.0, -0.5),
            allow_swap: true,
        },
    );

    assert_eq!(events[0], Event::BubbleBurst { bubble: target });
    assert_eq!(
        query::grid_view(&world)
            .occupant(CellCoord::new(0, 1))
            .map(|occupant| occupant.bubble),
        Some(projectile)
    );
    let destroyed = run(&mut world, Command::DestroyBubble { bubble: target });
    assert_eq!(destroyed, vec![Event::BubbleDestroyed { bubble: target }]);
    let anchored = run(&mut world, Command::DestroyBubble { bubble: projectile });
    assert!(anchored.is_empty(), "anchored bubbles are not destroyed");
}

#[test]
fn dropped_clusters_lengthen_the_resolution() {
    let mut world = World::new(config()).expect("valid config");
    let (projectile, variant) = launch(&mut world);
    let _ = place(&mut world, 0, 0, variant);
    let _ = place(&mut world, 0, 2, other(variant));
    let _ = place(&mut world, 0, 3, other(variant));
    let target = place(&mut world, 1, 0, variant);
    let _ = place(&mut world, 2, 1, other(variant));
    let _ = place(&mut world, 3, 1, other(variant));

    let anchor = query::grid_view(&world)
        .geometry()
        .cell_to_anchor(CellCoord::new(1, 0));
    // Approaching from below-left snaps into (2, 0) and matches the column.
    let events = run(
        &mut world,
        Command::ResolveCollision {
            bubble: projectile,
            target,
            position: anchor + Vec2::new(-0.4, -0.7),
            allow_swap: false,
        },
    );

    let dropped: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::ClusterDropped { bubbles, awarded } => Some((bubbles.len(), *awarded)),
            _ => None,
        })
        .collect();
    assert_eq!(dropped, vec![(2, 2)]);
    assert_eq!(query::score(&world), 4 + 2);
    assert_eq!(
        events.last(),
        Some(&Event::ShotResolved {
            bubble: projectile,
            dropped: true,
        })
    );
}

#[test]
fn level_fill_is_seeded() {
    let mut config = config();
    config.grid.height = 3;
    let mut first = World::new(config.clone()).expect("valid config");
    let mut second = World::new(config).expect("valid config");
    let first_events = run(&mut first, Command::StartLevel { seed: 11 });
    let second_events = run(&mut second, Command::StartLevel { seed: 11 });

    assert_eq!(first_events, second_events);
    assert!(first_events.contains(&Event::LevelStarted { bubbles: 4 + 3 + 4 }));
    assert_eq!(query::grid_view(&first).occupied_in_row(1), 3);
    assert_eq!(query::claim(&first).len(), 1);
    assert_eq!(query::remaining_budget(&first), 4);
}

#[test]
fn placement_outside_the_grid_is_rejected() {
    let mut world = World::new(config()).expect("valid config");
    let events = run(
        &mut world,
        Command::PlaceBubble {
            cell: CellCoord::new(1, 3),
            variant: BubbleVariant::new(0),
        },
    );
    assert!(matches!(
        events.as_slice(),
        [Event::PlacementRejected { .. }]
    ));
    assert!(query::bubbles(&world).is_empty());
}

#[test]
fn split_twins_appear_where_the_projectile_flew() {
    let mut world = World::new(config()).expect("valid config");
    let (projectile, variant) = launch(&mut world);
    let midair = Vec2::new(1.5, -1.25);

    let events = run(
        &mut world,
        Command::MoveProjectile {
            bubble: projectile,
            position: midair,
        },
    );
    assert_eq!(
        events,
        vec![Event::ProjectileMoved {
            bubble: projectile,
            position: midair,
        }]
    );
    assert_eq!(
        query::bubble(&world, projectile).map(|snapshot| snapshot.position),
        Some(midair)
    );

    let events = run(
        &mut world,
        Command::SplitProjectile {
            bubble: projectile,
            shot: ShotId::new(0),
        },
    );
    let spawned = events.iter().find_map(|event| match event {
        Event::BubbleSpawned {
            variant: twin_variant,
            position,
            ..
        } => Some((twin_variant.get(), *position)),
        _ => None,
    });
    assert_eq!(spawned, Some((variant, midair)));
}

#[test]
fn anchored_bubbles_ignore_flight_updates() {
    let mut world = World::new(config()).expect("valid config");
    let anchored = place(&mut world, 2, 1, 0);
    let before = query::bubble(&world, anchored).expect("placed").position;

    let events = run(
        &mut world,
        Command::MoveProjectile {
            bubble: anchored,
            position: Vec2::new(9.0, 9.0),
        },
    );
    assert!(events.is_empty());
    assert_eq!(
        query::bubble(&world, anchored).map(|snapshot| snapshot.position),
        Some(before)
    );
}
