use bubble_shooter_core::{
    BubbleId, BubbleVariant, CellCoord, Event, FieldConfig, GridGeometry, GridView, Occupant,
    PreviewConfig, PreviewStyle,
};
use bubble_shooter_system_preview::Preview;
use glam::Vec2;

const SOURCE: Vec2 = Vec2::new(0.0, -4.0);

fn geometry() -> GridGeometry {
    GridGeometry::new(Vec2::new(-2.5, 4.5), 0.5, 10, 14)
}

fn preview(max_bounces: u32) -> Preview {
    let config = PreviewConfig {
        time_stamp: 0.05,
        max_bounces,
    };
    Preview::new(config, FieldConfig::default(), 5.0)
}

fn cells_with(occupied: &[CellCoord]) -> Vec<Option<Occupant>> {
    let geometry = geometry();
    let mut cells = vec![None; geometry.capacity()];
    for (index, cell) in occupied.iter().enumerate() {
        let slot = geometry.index(*cell).expect("cell in bounds");
        cells[slot] = Some(Occupant {
            bubble: BubbleId::new(index as u32),
            variant: BubbleVariant::new(0),
        });
    }
    cells
}

#[test]
fn vertical_shot_stops_at_the_ceiling() {
    let cells = cells_with(&[]);
    let points = preview(3).trajectory(SOURCE, 16.0, 90.0, GridView::new(&cells, geometry()));

    assert_eq!(points.len(), 13);
    let last = *points.last().expect("points sampled");
    assert!((last.y - 4.25).abs() < 1e-3, "{last:?}");
    assert!(points.windows(2).all(|pair| pair[0].y < pair[1].y));
    assert!(points.iter().all(|point| point.x.abs() < 1e-4));
}

#[test]
fn occupied_row_ends_the_path_early() {
    let cells = cells_with(&[CellCoord::new(5, 4)]);
    let points = preview(3).trajectory(SOURCE, 16.0, 90.0, GridView::new(&cells, geometry()));

    let last = *points.last().expect("points sampled");
    assert!((last.y - 1.75).abs() < 1e-3, "{last:?}");
}

#[test]
fn side_walls_fold_the_path_back() {
    let cells = cells_with(&[]);
    let view = GridView::new(&cells, geometry());
    let field = FieldConfig::default();

    let single_leg = preview(1).trajectory(SOURCE, 10.0, 60.0, view);
    let wall_hit = *single_leg.last().expect("points sampled");
    assert!((wall_hit - Vec2::new(field.right_border(), -1.0951)).length() < 1e-3);

    let bounced = preview(3).trajectory(SOURCE, 10.0, 60.0, view);
    assert!(bounced.len() > single_leg.len());
    assert!(bounced
        .iter()
        .any(|point| (point.x - field.left_border()).abs() < 1e-3));
    assert!(bounced.iter().all(|point| {
        point.x >= field.left_border() - 1e-3 && point.x <= field.right_border() + 1e-3
    }));
}

#[test]
fn zero_bounces_draw_nothing() {
    let cells = cells_with(&[]);
    let points = preview(0).trajectory(SOURCE, 10.0, 60.0, GridView::new(&cells, geometry()));
    assert!(points.is_empty());
}

#[test]
fn full_power_fans_out_into_two_paths() {
    let cells = cells_with(&[]);
    let view = GridView::new(&cells, geometry());

    let single = preview(3).paths(SOURCE, 16.0, 90.0, false, view);
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].style, PreviewStyle::Single);

    let spread = preview(3).paths(SOURCE, 16.0, 90.0, true, view);
    assert_eq!(spread.len(), 2);
    assert!(spread.iter().all(|path| path.style == PreviewStyle::Spread));
    let ends: Vec<Vec2> = spread
        .iter()
        .map(|path| *path.points.last().expect("points sampled"))
        .collect();
    assert!(ends[0].x < 0.0, "first half leans left");
    assert!(ends[1].x > 0.0, "second half leans right");
}

#[test]
fn show_and_clear_publish_events() {
    let cells = cells_with(&[]);
    let view = GridView::new(&cells, geometry());
    let preview = preview(3);
    let mut out = Vec::new();

    preview.show(SOURCE, 10.0, 60.0, false, view, &mut out);
    preview.clear(&mut out);

    assert!(matches!(
        out.as_slice(),
        [Event::TrajectoryPreviewed { paths }, Event::PreviewCleared] if paths.len() == 1
    ));
}
