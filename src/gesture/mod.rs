//! Gesture classification
//!
//! Detectors consume one hand's landmark frame per tick and report at most one
//! discrete gesture per evaluation. Each detector owns its own sliding window
//! and cooldown deadline.

pub mod feed;
pub mod history;
pub mod jab;
pub mod posture;
pub mod slash;

pub use feed::{BodyPose, LandmarkFrame, PositionFeed};
pub use history::{SlidingWindow, TimestampedSample};
pub use jab::JabClassifier;
pub use posture::{Posture, PostureDetector, SignalPolarity};
pub use slash::SlashClassifier;

use crate::core::error::Result;
use crate::core::types::{Hand, Timestamp};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A discrete gesture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gesture {
    /// Short straight punch, at the absolute wrist position
    Jab { position: Vec2 },
    /// Directional swing; direction is the wrist displacement (y up)
    Slash { direction: Vec2 },
}

/// A gesture together with the hand that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandGesture {
    pub hand: Hand,
    pub gesture: Gesture,
    pub at: Timestamp,
}

/// Why a tick was not evaluated at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A required landmark (or the frame scale) was missing this tick
    LandmarkUnavailable,
    /// Still inside the post-detection cooldown
    CoolingDown,
}

/// Why an evaluated window did not produce a gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    InsufficientSamples,
    /// Window spans less than 90% of the configured duration
    WindowTooShort { elapsed: f64 },
    TooSlow { speed: f32 },
    TooFarFromElbow { distance: f32 },
}

/// Outcome of a single detector evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Detection {
    Skipped(SkipReason),
    Rejected(RejectReason),
    Detected(HandGesture),
}

impl Detection {
    pub fn gesture(&self) -> Option<HandGesture> {
        match self {
            Detection::Detected(gesture) => Some(*gesture),
            _ => None,
        }
    }
}

/// Fraction of the window that must be covered before classifying
pub const MIN_WINDOW_COVERAGE: f64 = 0.9;

/// A per-hand gesture detector driven once per tick
pub trait GestureDetector {
    fn hand(&self) -> Hand;

    fn observe(&mut self, frame: &LandmarkFrame, now: Timestamp) -> Result<Detection>;

    /// Drop buffered samples and any pending cooldown
    fn reset(&mut self);
}

/// True while `now` is before the suspension deadline; clears it once passed
pub(crate) fn still_cooling_down(suspended_until: &mut Option<Timestamp>, now: Timestamp) -> bool {
    match *suspended_until {
        Some(until) if now < until => true,
        Some(_) => {
            *suspended_until = None;
            false
        }
        None => false,
    }
}
