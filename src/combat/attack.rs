//! Attack paths, incoming attacks and slash grading
//!
//! Each offensive path is a gate on the slash that lands it: an optional
//! required hand, a required sign of horizontal/vertical motion, and an
//! angular window split into "good" and a narrower "perfect" band around a
//! reference angle. Angles are degrees counter-clockwise from +x, y up.

use crate::core::config::{AngleWindow, PathAngles};
use crate::core::types::Hand;
use crate::gesture::Posture;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Pattern the player must currently execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackPath {
    #[default]
    None,
    LeftHook,
    RightHook,
    Uppercut,
    CrossFinisher,
}

impl AttackPath {
    /// Every path a player-attack turn can request
    pub const OFFENSIVE: [AttackPath; 4] = [
        AttackPath::LeftHook,
        AttackPath::RightHook,
        AttackPath::Uppercut,
        AttackPath::CrossFinisher,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AttackPath::None => "none",
            AttackPath::LeftHook => "left hook",
            AttackPath::RightHook => "right hook",
            AttackPath::Uppercut => "uppercut",
            AttackPath::CrossFinisher => "cross finisher",
        }
    }
}

/// Pattern the opponent is about to throw at the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IncomingAttack {
    #[default]
    None,
    Left,
    Right,
    Up,
}

impl IncomingAttack {
    /// Every attack an enemy turn can throw
    pub const THROWABLE: [IncomingAttack; 3] =
        [IncomingAttack::Left, IncomingAttack::Right, IncomingAttack::Up];

    pub fn name(&self) -> &'static str {
        match self {
            IncomingAttack::None => "none",
            IncomingAttack::Left => "left",
            IncomingAttack::Right => "right",
            IncomingAttack::Up => "up",
        }
    }

    /// Whether the posture at impact stops this attack
    ///
    /// Side attacks need the guard on that side. An overhead attack needs a
    /// full guard, or can be ducked.
    pub fn is_defended_by(&self, posture: &Posture) -> bool {
        match self {
            IncomingAttack::None => true,
            IncomingAttack::Left => posture.blocking_left,
            IncomingAttack::Right => posture.blocking_right,
            IncomingAttack::Up => posture.blocking_both() || posture.crouching,
        }
    }
}

/// Quality of a landed attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitGrade {
    Good,
    Perfect,
    Finisher,
}

/// Where a direction falls relative to an angle window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleMatch {
    Perfect,
    Good,
    Outside,
}

/// Angle of a direction vector in degrees, in (-180, 180]
pub fn slash_angle(direction: Vec2) -> f32 {
    direction.y.atan2(direction.x).to_degrees()
}

/// Smallest absolute difference between two angles, in [0, 180]
pub fn angular_distance(a: f32, b: f32) -> f32 {
    let diff = (a - b).rem_euclid(360.0);
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

impl AngleWindow {
    pub fn classify(&self, direction: Vec2) -> AngleMatch {
        if direction == Vec2::ZERO {
            return AngleMatch::Outside;
        }
        let off = angular_distance(slash_angle(direction), self.reference);
        if off <= self.perfect_half_width {
            AngleMatch::Perfect
        } else if off <= self.good_half_width {
            AngleMatch::Good
        } else {
            AngleMatch::Outside
        }
    }
}

/// Required sign of motion along each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignGate {
    Rightward,
    Leftward,
    Upward,
    DownRight,
    DownLeft,
}

impl SignGate {
    pub fn passes(&self, direction: Vec2) -> bool {
        match self {
            SignGate::Rightward => direction.x > 0.0,
            SignGate::Leftward => direction.x < 0.0,
            SignGate::Upward => direction.y > 0.0,
            SignGate::DownRight => direction.x > 0.0 && direction.y < 0.0,
            SignGate::DownLeft => direction.x < 0.0 && direction.y < 0.0,
        }
    }
}

/// Result of checking one slash against one requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashMatch {
    WrongHand,
    WrongDirection,
    /// Right hand and sign, but outside the good window
    OffAngle,
    Hit(HitGrade),
}

/// Gate a slash must pass to land
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlashRequirement {
    pub hand: Option<Hand>,
    pub sign: SignGate,
    pub angles: AngleWindow,
}

impl SlashRequirement {
    pub fn evaluate(&self, hand: Hand, direction: Vec2) -> SlashMatch {
        if self.hand.is_some_and(|required| required != hand) {
            return SlashMatch::WrongHand;
        }
        if !self.sign.passes(direction) {
            return SlashMatch::WrongDirection;
        }
        match self.angles.classify(direction) {
            AngleMatch::Perfect => SlashMatch::Hit(HitGrade::Perfect),
            AngleMatch::Good => SlashMatch::Hit(HitGrade::Good),
            AngleMatch::Outside => SlashMatch::OffAngle,
        }
    }
}

/// Requirement for a single-slash path; `None` for `None` and the finisher
pub fn requirement(path: AttackPath, angles: &PathAngles) -> Option<SlashRequirement> {
    match path {
        AttackPath::LeftHook => Some(SlashRequirement {
            hand: Some(Hand::Left),
            sign: SignGate::Rightward,
            angles: angles.left_hook,
        }),
        AttackPath::RightHook => Some(SlashRequirement {
            hand: Some(Hand::Right),
            sign: SignGate::Leftward,
            angles: angles.right_hook,
        }),
        AttackPath::Uppercut => Some(SlashRequirement {
            hand: None,
            sign: SignGate::Upward,
            angles: angles.uppercut,
        }),
        AttackPath::None | AttackPath::CrossFinisher => None,
    }
}

/// The two halves of the cross finisher, keyed by the half they land
///
/// A down-and-right slash lands the left half, down-and-left the right half,
/// whichever hand throws it.
pub fn finisher_halves(angles: &PathAngles) -> [(Hand, SlashRequirement); 2] {
    [
        (
            Hand::Left,
            SlashRequirement {
                hand: None,
                sign: SignGate::DownRight,
                angles: angles.cross_left,
            },
        ),
        (
            Hand::Right,
            SlashRequirement {
                hand: None,
                sign: SignGate::DownLeft,
                angles: angles.cross_right,
            },
        ),
    ]
}

/// Whether a slash cleanly lands some path other than `expected`
///
/// Used to tell a wrong attack apart from noise.
pub fn lands_other_path(
    expected: AttackPath,
    hand: Hand,
    direction: Vec2,
    angles: &PathAngles,
) -> Option<AttackPath> {
    AttackPath::OFFENSIVE
        .into_iter()
        .filter(|path| *path != expected)
        .find(|path| match path {
            AttackPath::CrossFinisher => finisher_halves(angles)
                .iter()
                .any(|(_, req)| matches!(req.evaluate(hand, direction), SlashMatch::Hit(_))),
            _ => requirement(*path, angles)
                .is_some_and(|req| matches!(req.evaluate(hand, direction), SlashMatch::Hit(_))),
        })
}
