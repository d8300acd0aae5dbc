#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation contract for Bubble Shooter adapters.
//!
//! The simulation never draws or plays anything itself. Adapters implement
//! [`Presentation`] and feed every batch of world events through
//! [`dispatch`], which translates them into presentation calls and picks
//! their colors from a [`Palette`].

use anyhow::{Context, Result as AnyResult};
use bubble_shooter_core::{BubbleId, BubbleVariant, Event, PreviewStyle};
use glam::Vec2;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Colors handed to the presentation.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    bubbles: Vec<Color>,
    preview: Color,
}

impl Palette {
    /// Creates a palette from per-variant bubble colors and the preview color.
    #[must_use]
    pub fn new(bubbles: Vec<Color>, preview: Color) -> Self {
        Self { bubbles, preview }
    }

    /// Color of bubbles of `variant`, cycling when the palette is shorter than the variant range.
    #[must_use]
    pub fn bubble(&self, variant: BubbleVariant) -> Color {
        if self.bubbles.is_empty() {
            return self.preview;
        }
        self.bubbles[usize::from(variant.get()) % self.bubbles.len()]
    }

    /// Color a preview path of `style` is drawn with.
    #[must_use]
    pub fn preview(&self, style: PreviewStyle) -> Color {
        match style {
            PreviewStyle::Single => self.preview,
            PreviewStyle::Spread => self.preview.lighten(0.4),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(
            vec![
                Color::from_rgb_u8(0xd6, 0x45, 0x45),
                Color::from_rgb_u8(0x45, 0x9a, 0xd6),
                Color::from_rgb_u8(0x5c, 0xbf, 0x60),
                Color::from_rgb_u8(0xe8, 0xc5, 0x3a),
            ],
            Color::from_rgb_u8(0xf0, 0xf0, 0xf0),
        )
    }
}

/// Output surface driven by the simulation.
///
/// Bubble handles are the world's [`BubbleId`]s.
pub trait Presentation {
    /// Creates the visual for a new bubble drawn in `color`.
    fn spawn_bubble(
        &mut self,
        bubble: BubbleId,
        variant: BubbleVariant,
        position: Vec2,
        color: Color,
    );

    /// Moves an existing bubble visual.
    fn move_bubble(&mut self, bubble: BubbleId, position: Vec2);

    /// Removes a bubble visual.
    fn destroy_bubble(&mut self, bubble: BubbleId);

    /// Starts the burst animation of a bubble.
    fn play_burst_animation(&mut self, bubble: BubbleId);

    /// Plays the burst sound.
    fn play_burst_sound(&mut self);

    /// Draws one predicted path.
    fn render_trajectory_preview(&mut self, points: &[Vec2], color: Color);

    /// Erases every drawn predicted path.
    fn clear_trajectory_preview(&mut self);

    /// Shows the current score.
    fn update_score_display(&mut self, score: u64);

    /// Shows how many bubbles may still be created.
    fn update_remaining_counter(&mut self, remaining: u32);

    /// Shows the launcher power; `percent` is the rounded indicator text value.
    fn update_power_indicator(&mut self, power: f32, percent: u32);

    /// Stores a best score entry keyed by a Unix timestamp.
    fn persist_best_score(&mut self, key: u64, score: u64) -> AnyResult<()>;

    /// Announces the end of the game.
    fn on_game_over(&mut self, won: bool);
}

/// Indicator text value for a normalised launcher power.
#[must_use]
pub fn power_percent(power: f32) -> u32 {
    let percent = (power.clamp(0.0, 1.0) * 100.0).round();
    percent as u32
}

/// Forwards `events` to `presentation` in order.
///
/// A won game persists its final score under `timestamp` after
/// [`Presentation::on_game_over`] ran.
pub fn dispatch<P>(
    events: &[Event],
    palette: &Palette,
    timestamp: u64,
    presentation: &mut P,
) -> AnyResult<()>
where
    P: Presentation + ?Sized,
{
    for event in events {
        match event {
            Event::BubbleSpawned {
                bubble,
                variant,
                position,
            } => {
                let color = palette.bubble(*variant);
                presentation.spawn_bubble(*bubble, *variant, *position, color);
            }
            Event::ProjectileMoved { bubble, position } => {
                presentation.move_bubble(*bubble, *position);
            }
            Event::BubbleAnchored { bubble, anchor, .. } => {
                presentation.move_bubble(*bubble, *anchor);
            }
            Event::BubbleBurst { bubble } => {
                presentation.play_burst_animation(*bubble);
                presentation.play_burst_sound();
            }
            Event::BubbleDestroyed { bubble } => presentation.destroy_bubble(*bubble),
            Event::TrajectoryPreviewed { paths } => {
                presentation.clear_trajectory_preview();
                for path in paths {
                    let color = palette.preview(path.style);
                    presentation.render_trajectory_preview(&path.points, color);
                }
            }
            Event::PreviewCleared => presentation.clear_trajectory_preview(),
            Event::ScoreChanged { score } => presentation.update_score_display(*score),
            Event::RemainingShotsChanged { remaining } => {
                presentation.update_remaining_counter(*remaining);
            }
            Event::PowerChanged { power } => {
                presentation.update_power_indicator(*power, power_percent(*power));
            }
            Event::GameOver { outcome, score } => {
                presentation.on_game_over(outcome.is_win());
                if outcome.is_win() {
                    presentation
                        .persist_best_score(timestamp, *score)
                        .with_context(|| format!("failed to persist best score {score}"))?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}
