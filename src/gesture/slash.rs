//! Directional slash detection
//!
//! Same temporal discipline as the jab detector, but on the absolute wrist
//! position: a hook or uppercut swings the whole forearm, so the elbow moves
//! with it. The emitted direction is the raw wrist displacement across the
//! window; the battle grades its angle.

use super::{
    still_cooling_down, Detection, Gesture, GestureDetector, HandGesture, LandmarkFrame,
    RejectReason, SkipReason, SlidingWindow, MIN_WINDOW_COVERAGE,
};
use crate::core::config::SlashConfig;
use crate::core::error::Result;
use crate::core::types::{Hand, Timestamp};
use glam::Vec2;

#[derive(Debug, Clone)]
pub struct SlashClassifier {
    hand: Hand,
    config: SlashConfig,
    history: SlidingWindow<Vec2>,
    suspended_until: Option<Timestamp>,
}

impl SlashClassifier {
    pub fn new(hand: Hand, config: SlashConfig) -> Result<Self> {
        config.validate()?;
        let history = SlidingWindow::new(config.window)?;
        Ok(Self {
            hand,
            config,
            history,
            suspended_until: None,
        })
    }

    pub fn sample_count(&self) -> usize {
        self.history.count()
    }
}

impl GestureDetector for SlashClassifier {
    fn hand(&self) -> Hand {
        self.hand
    }

    fn observe(&mut self, frame: &LandmarkFrame, now: Timestamp) -> Result<Detection> {
        if still_cooling_down(&mut self.suspended_until, now) {
            return Ok(Detection::Skipped(SkipReason::CoolingDown));
        }

        let Some(wrist) = frame.wrist else {
            return Ok(Detection::Skipped(SkipReason::LandmarkUnavailable));
        };
        if !frame.has_scale() {
            return Ok(Detection::Skipped(SkipReason::LandmarkUnavailable));
        }

        self.history.add(wrist, now);
        if self.history.count() < 2 {
            return Ok(Detection::Rejected(RejectReason::InsufficientSamples));
        }

        let elapsed = self.history.elapsed()?;
        if elapsed < MIN_WINDOW_COVERAGE * self.config.window || elapsed <= 0.0 {
            return Ok(Detection::Rejected(RejectReason::WindowTooShort { elapsed }));
        }

        let direction = self.history.latest()?.value - self.history.earliest()?.value;
        let speed = direction.length() / elapsed as f32 / frame.pixels_per_inch;
        if speed < self.config.speed_threshold {
            return Ok(Detection::Rejected(RejectReason::TooSlow { speed }));
        }

        self.history.clear();
        self.suspended_until = Some(now + self.config.cooldown);
        tracing::debug!(
            "{} slash toward ({:.2}, {:.2}), {:.1} in/s",
            self.hand.name(),
            direction.normalize_or_zero().x,
            direction.normalize_or_zero().y,
            speed
        );

        Ok(Detection::Detected(HandGesture {
            hand: self.hand,
            gesture: Gesture::Slash { direction },
            at: now,
        }))
    }

    fn reset(&mut self) {
        self.history.clear();
        self.suspended_until = None;
    }
}
