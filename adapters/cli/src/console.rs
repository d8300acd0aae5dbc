use std::path::PathBuf;

use anyhow::Result;
use bubble_shooter_core::{BubbleId, BubbleVariant};
use bubble_shooter_rendering::{Color, Presentation};
use glam::Vec2;
use tracing::{debug, info, trace};

use crate::best_scores::BestScores;

/// Presentation that reports every call through `tracing`.
#[derive(Debug)]
pub(crate) struct ConsolePresentation {
    scores: BestScores,
    scores_path: Option<PathBuf>,
    score: u64,
    remaining: u32,
    finished: Option<bool>,
}

impl ConsolePresentation {
    pub(crate) fn new(scores: BestScores, scores_path: Option<PathBuf>) -> Self {
        Self {
            scores,
            scores_path,
            score: 0,
            remaining: 0,
            finished: None,
        }
    }

    pub(crate) fn score(&self) -> u64 {
        self.score
    }

    pub(crate) fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether the game ended in a win, `None` while it is running.
    pub(crate) fn finished(&self) -> Option<bool> {
        self.finished
    }

    pub(crate) fn best_score(&self) -> Option<u64> {
        self.scores.best()
    }
}

impl Presentation for ConsolePresentation {
    fn spawn_bubble(
        &mut self,
        bubble: BubbleId,
        variant: BubbleVariant,
        position: Vec2,
        color: Color,
    ) {
        let Color {
            red, green, blue, ..
        } = color;
        debug!(?bubble, variant = variant.get(), ?position, red, green, blue, "spawn bubble");
    }

    fn move_bubble(&mut self, bubble: BubbleId, position: Vec2) {
        trace!(?bubble, ?position, "move bubble");
    }

    fn destroy_bubble(&mut self, bubble: BubbleId) {
        debug!(?bubble, "destroy bubble");
    }

    fn play_burst_animation(&mut self, bubble: BubbleId) {
        debug!(?bubble, "burst animation");
    }

    fn play_burst_sound(&mut self) {
        trace!("burst sound");
    }

    fn render_trajectory_preview(&mut self, points: &[Vec2], color: Color) {
        trace!(points = points.len(), alpha = color.alpha, end = ?points.last(), "preview");
    }

    fn clear_trajectory_preview(&mut self) {
        trace!("preview cleared");
    }

    fn update_score_display(&mut self, score: u64) {
        self.score = score;
        info!(score, "score");
    }

    fn update_remaining_counter(&mut self, remaining: u32) {
        self.remaining = remaining;
        debug!(remaining, "remaining bubbles");
    }

    fn update_power_indicator(&mut self, power: f32, percent: u32) {
        trace!(power, "power {percent}%");
    }

    fn persist_best_score(&mut self, key: u64, score: u64) -> Result<()> {
        self.scores.record(key, score);
        let Some(path) = &self.scores_path else {
            return Ok(());
        };
        self.scores.save(path)?;
        info!(key, score, path = %path.display(), "best score saved");
        Ok(())
    }

    fn on_game_over(&mut self, won: bool) {
        self.finished = Some(won);
        info!(won, score = self.score, "game over");
    }
}
