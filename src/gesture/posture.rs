//! Defensive posture detection
//!
//! Blocks are read straight from the pose each tick: a wrist raised above the
//! nose on its own side. Crouching is latched: the nose has to drop well below
//! the standing baseline to start a crouch, and come back most of the way up
//! to end it, so jitter around a single threshold never flickers the state.

use super::PositionFeed;
use crate::core::config::PostureConfig;
use crate::core::types::Hand;
use serde::{Deserialize, Serialize};

/// Sign of the vertical nose signal relative to the standing baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalPolarity {
    Negative,
    #[default]
    Neutral,
    Positive,
}

/// Player's defensive state at one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Posture {
    pub blocking_left: bool,
    pub blocking_right: bool,
    pub crouching: bool,
}

impl Posture {
    pub fn blocking_both(&self) -> bool {
        self.blocking_left && self.blocking_right
    }
}

#[derive(Debug, Clone)]
pub struct PostureDetector {
    config: PostureConfig,
    /// Standing nose height, in inches
    baseline: Option<f32>,
    crouching: bool,
    current: Posture,
}

impl PostureDetector {
    pub fn new(config: PostureConfig) -> Self {
        Self {
            config,
            baseline: None,
            crouching: false,
            current: Posture::default(),
        }
    }

    /// Set the standing nose height explicitly (inches)
    pub fn calibrate(&mut self, standing_nose_height: f32) {
        self.baseline = Some(standing_nose_height);
        self.crouching = false;
    }

    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }

    /// Last computed posture
    pub fn posture(&self) -> Posture {
        self.current
    }

    /// Sample the feed and return the posture for this tick
    ///
    /// The first tick with a visible nose becomes the standing baseline unless
    /// `calibrate` was called first.
    pub fn update(&mut self, feed: &impl PositionFeed) -> Posture {
        let polarity = self.vertical_polarity(feed);
        if !self.crouching && polarity == SignalPolarity::Negative {
            tracing::debug!("Crouch started");
            self.crouching = true;
        } else if self.crouching && polarity == SignalPolarity::Positive {
            tracing::debug!("Crouch ended");
            self.crouching = false;
        }

        self.current = Posture {
            blocking_left: is_blocking(feed, Hand::Left),
            blocking_right: is_blocking(feed, Hand::Right),
            crouching: self.crouching,
        };
        self.current
    }

    fn vertical_polarity(&mut self, feed: &impl PositionFeed) -> SignalPolarity {
        let frame = feed.frame(Hand::Left);
        let Some(nose) = frame.nose else {
            return SignalPolarity::Neutral;
        };
        if !frame.has_scale() {
            return SignalPolarity::Neutral;
        }

        let height = nose.y / frame.pixels_per_inch;
        let baseline = *self.baseline.get_or_insert(height);
        let offset = height - baseline;

        if offset < -self.config.crouch_drop {
            SignalPolarity::Negative
        } else if offset > -self.config.crouch_release {
            SignalPolarity::Positive
        } else {
            SignalPolarity::Neutral
        }
    }
}

/// Wrist above the nose and out on its own side
fn is_blocking(feed: &impl PositionFeed, hand: Hand) -> bool {
    let frame = feed.frame(hand);
    let (Some(wrist), Some(nose)) = (frame.wrist, frame.nose) else {
        tracing::debug!("{} block check skipped: wrist or nose not tracked", hand.name());
        return false;
    };

    let above = wrist.y > nose.y;
    let outside = match hand {
        Hand::Left => wrist.x < nose.x,
        Hand::Right => wrist.x > nose.x,
    };
    above && outside
}
