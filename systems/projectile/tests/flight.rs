use std::time::Duration;

use bubble_shooter_core::{
    trajectory, BubbleId, BubbleVariant, CellCoord, Command, Event, FieldConfig, GameOutcome,
    GridGeometry, GridView, LossReason, Occupant, ProjectileState, ShotId, TrajectorySegment,
};
use bubble_shooter_system_projectile::{FieldProbe, Projectiles};
use glam::Vec2;

const PROJECTILE: BubbleId = BubbleId::new(1);
const SHOT: ShotId = ShotId::new(0);

fn geometry() -> GridGeometry {
    GridGeometry::new(Vec2::new(-2.5, 4.5), 0.5, 10, 14)
}

fn empty_cells() -> Vec<Option<Occupant>> {
    vec![None; geometry().capacity()]
}

fn step(
    projectiles: &mut Projectiles,
    field: &FieldConfig,
    cells: &[Option<Occupant>],
    millis: u64,
) -> Vec<Command> {
    let probe = FieldProbe::new(field, GridView::new(cells, geometry()));
    let mut commands = Vec::new();
    projectiles.advance(Duration::from_millis(millis), &probe, &mut commands);
    commands
}

fn moved_to(commands: &[Command], projectile: BubbleId) -> Option<Vec2> {
    commands.iter().find_map(|command| match command {
        Command::MoveProjectile { bubble, position } if *bubble == projectile => Some(*position),
        _ => None,
    })
}

#[test]
fn free_flight_follows_the_parabola() {
    let field = FieldConfig::default();
    let cells = empty_cells();
    let mut projectiles = Projectiles::new(5.0);
    projectiles.launch(
        PROJECTILE,
        SHOT,
        TrajectorySegment::new(Vec2::new(0.0, -3.0), 5.0, 90.0, 0.0),
        false,
    );

    let commands = step(&mut projectiles, &field, &cells, 100);
    let expected = Vec2::new(0.0, -3.0 + 0.5 - 0.049);
    match commands.as_slice() {
        [Command::MoveProjectile { bubble, position }] => {
            assert_eq!(*bubble, PROJECTILE);
            assert!((*position - expected).length() < 1e-3, "{position:?}");
        }
        other => panic!("unexpected commands {other:?}"),
    }
}

#[test]
fn side_wall_sends_the_projectile_back() {
    let field = FieldConfig::default();
    let cells = empty_cells();
    let mut projectiles = Projectiles::new(5.0);
    projectiles.launch(
        PROJECTILE,
        SHOT,
        TrajectorySegment::new(Vec2::new(2.0, -3.0), 10.0, 30.0, 0.0),
        false,
    );

    let commands = step(&mut projectiles, &field, &cells, 200);
    assert_eq!(commands.len(), 1, "bouncing needs no world command");
    let snapshot = projectiles.projectile(PROJECTILE).expect("still flying");
    assert_eq!(snapshot.state, ProjectileState::Flying);
    assert!(snapshot.velocity.x < 0.0);
    assert!(snapshot.position.x < field.right_border());
    assert!(snapshot.position.x > 0.5);
}

#[test]
fn bottom_edge_bursts_the_projectile() {
    let field = FieldConfig::default();
    let cells = empty_cells();
    let mut projectiles = Projectiles::new(5.0);
    projectiles.launch(
        PROJECTILE,
        SHOT,
        TrajectorySegment::new(Vec2::new(0.0, -6.1), 2.0, -90.0, 0.0),
        false,
    );

    let commands = step(&mut projectiles, &field, &cells, 100);
    let snapshot = projectiles.projectile(PROJECTILE).expect("bursting");
    assert_eq!(snapshot.state, ProjectileState::Bursting);
    assert_eq!(
        commands,
        vec![
            Command::MoveProjectile {
                bubble: PROJECTILE,
                position: snapshot.position,
            },
            Command::BurstProjectile { bubble: PROJECTILE },
        ]
    );

    let commands = step(&mut projectiles, &field, &cells, 100);
    assert!(commands.is_empty(), "bursting projectiles no longer fly");

    projectiles.handle(&[Event::BubbleBurst { bubble: PROJECTILE }]);
    assert!(projectiles.is_empty());
}

#[test]
fn touching_the_grid_requests_resolution() {
    let field = FieldConfig::default();
    let mut cells = empty_cells();
    let target = CellCoord::new(0, 4);
    let index = geometry().index(target).expect("cell in bounds");
    cells[index] = Some(Occupant {
        bubble: BubbleId::new(40),
        variant: BubbleVariant::new(2),
    });
    let anchor = geometry().cell_to_anchor(target);

    let mut projectiles = Projectiles::new(5.0);
    projectiles.launch(
        PROJECTILE,
        SHOT,
        TrajectorySegment::new(Vec2::new(anchor.x, 2.0), 8.0, 90.0, 0.0),
        true,
    );

    let commands = step(&mut projectiles, &field, &cells, 1000);
    match commands.as_slice() {
        [Command::MoveProjectile { position: moved, .. }, Command::ResolveCollision {
            bubble,
            target,
            position,
            allow_swap,
        }] => {
            assert_eq!(*bubble, PROJECTILE);
            assert_eq!(moved, position, "the world sees the contact point");
            assert_eq!(*target, BubbleId::new(40));
            assert!(position.distance(anchor) <= field.contact_distance);
            assert!(*allow_swap, "full power shots may swap");
        }
        other => panic!("unexpected commands {other:?}"),
    }
    assert_eq!(
        projectiles.projectile(PROJECTILE).map(|snapshot| snapshot.state),
        Some(ProjectileState::Colliding)
    );

    projectiles.handle(&[Event::BubbleAnchored {
        bubble: PROJECTILE,
        cell: CellCoord::new(1, 4),
        anchor,
    }]);
    assert!(projectiles.is_empty());
}

#[test]
fn split_turns_both_halves_apart() {
    let field = FieldConfig::default();
    let cells = empty_cells();
    let mut projectiles = Projectiles::new(5.0);
    projectiles.launch(
        PROJECTILE,
        SHOT,
        TrajectorySegment::new(Vec2::new(0.0, -4.0), 10.0, 90.0, 0.0),
        true,
    );
    let before = step(&mut projectiles, &field, &cells, 100);
    let split_point = moved_to(&before, PROJECTILE).expect("source moved");

    let twin = BubbleId::new(2);
    projectiles.handle(&[Event::ProjectileSplit {
        source: PROJECTILE,
        twin,
        shot: SHOT,
    }]);

    let source = projectiles.projectile(PROJECTILE).expect("source flying");
    let copy = projectiles.projectile(twin).expect("twin flying");
    assert_eq!(copy.shot, SHOT);
    assert_eq!(copy.state, ProjectileState::Flying);
    assert!((source.position - copy.position).length() < 1e-5);
    assert!((copy.position - split_point).length() < 1e-5);
    assert!((trajectory::heading(source.velocity) - 85.0).abs() < 1e-2);
    assert!((trajectory::heading(copy.velocity) - 95.0).abs() < 1e-2);
    assert!((source.velocity.length() - copy.velocity.length()).abs() < 1e-4);

    let commands = step(&mut projectiles, &field, &cells, 100);
    assert!(moved_to(&commands, PROJECTILE).is_some());
    assert!(moved_to(&commands, twin).is_some());
}

#[test]
fn game_over_drops_every_flight() {
    let mut projectiles = Projectiles::new(5.0);
    projectiles.launch(
        PROJECTILE,
        SHOT,
        TrajectorySegment::new(Vec2::ZERO, 3.0, 45.0, 0.0),
        false,
    );
    assert_eq!(projectiles.len(), 1);
    projectiles.handle(&[Event::GameOver {
        outcome: GameOutcome::Lost(LossReason::NoVacantCell),
        score: 0,
    }]);
    assert!(projectiles.is_empty());
}

#[test]
fn a_new_level_drops_stale_flights() {
    let mut projectiles = Projectiles::new(5.0);
    projectiles.launch(
        PROJECTILE,
        SHOT,
        TrajectorySegment::new(Vec2::ZERO, 3.0, 45.0, 0.0),
        true,
    );
    projectiles.handle(&[Event::LevelStarted { bubbles: 57 }]);
    assert!(projectiles.is_empty());
}
