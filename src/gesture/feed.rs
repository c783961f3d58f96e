//! Landmark position feed
//!
//! The pose tracker is an external collaborator. Per tick it yields optional
//! 2D positions (pixels, y up) for the landmarks we care about plus the
//! pixel-to-inch scale of the current frame. A missing landmark is a normal,
//! transient condition.

use crate::core::types::Hand;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Landmarks relevant to one hand for a single tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub wrist: Option<Vec2>,
    pub elbow: Option<Vec2>,
    pub nose: Option<Vec2>,
    pub pixels_per_inch: f32,
}

impl LandmarkFrame {
    /// Wrist relative to elbow, when both are tracked
    pub fn wrist_from_elbow(&self) -> Option<Vec2> {
        Some(self.wrist? - self.elbow?)
    }

    pub fn has_scale(&self) -> bool {
        self.pixels_per_inch.is_finite() && self.pixels_per_inch > 0.0
    }
}

/// Source of per-hand landmark frames
pub trait PositionFeed {
    fn frame(&self, hand: Hand) -> LandmarkFrame;
}

/// Full upper-body pose for a single tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BodyPose {
    pub left_wrist: Option<Vec2>,
    pub left_elbow: Option<Vec2>,
    pub right_wrist: Option<Vec2>,
    pub right_elbow: Option<Vec2>,
    pub nose: Option<Vec2>,
    pub pixels_per_inch: f32,
}

impl BodyPose {
    pub fn wrist(&self, hand: Hand) -> Option<Vec2> {
        match hand {
            Hand::Left => self.left_wrist,
            Hand::Right => self.right_wrist,
        }
    }

    pub fn elbow(&self, hand: Hand) -> Option<Vec2> {
        match hand {
            Hand::Left => self.left_elbow,
            Hand::Right => self.right_elbow,
        }
    }
}

impl PositionFeed for BodyPose {
    fn frame(&self, hand: Hand) -> LandmarkFrame {
        LandmarkFrame {
            wrist: self.wrist(hand),
            elbow: self.elbow(hand),
            nose: self.nose,
            pixels_per_inch: self.pixels_per_inch,
        }
    }
}
