//! Scripted sparring partner
//!
//! Stands in for the camera and pose tracker when there is no player. It
//! watches the presentation events like a player watches the screen, plans
//! arm and head motion, and renders one [`BodyPose`] per frame. With
//! probability `accuracy` it answers each turn correctly; otherwise it
//! throws the wrong attack, flails a jab, or does nothing.
//!
//! All positions are in inches, y up, with the nose at the origin's column.

use crate::combat::attack::{AttackPath, IncomingAttack};
use crate::combat::presentation::PresentationEvent;
use crate::core::types::{Hand, Timestamp};
use crate::gesture::BodyPose;
use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

const NOSE: Vec2 = Vec2::new(0.0, 60.0);
const CROUCHED_NOSE: Vec2 = Vec2::new(0.0, 49.0);
const FOREARM: Vec2 = Vec2::new(0.0, 8.0);
const LEFT_REST: Vec2 = Vec2::new(-8.0, 35.0);
const RIGHT_REST: Vec2 = Vec2::new(8.0, 35.0);
const LEFT_GUARD: Vec2 = Vec2::new(-12.0, 64.0);
const RIGHT_GUARD: Vec2 = Vec2::new(12.0, 64.0);

/// Seconds between seeing a prompt and starting to move
const REACTION_DELAY: f64 = 0.5;
const SWING_TIME: f64 = 0.25;
const JAB_TIME: f64 = 0.08;
const RAISE_TIME: f64 = 0.2;
/// Slow enough that returning to rest never reads as a gesture
const RECOVERY_TIME: f64 = 1.2;
const FINISHER_GAP: f64 = 0.5;
/// Guard is held this long past the expected impact
const HOLD_MARGIN: f64 = 0.25;
/// Maximum angular error of a swing, in degrees
const SWING_JITTER: f32 = 25.0;

trait Blend: Copy {
    fn blend(self, other: Self, t: f32) -> Self;
}

impl Blend for Vec2 {
    fn blend(self, other: Self, t: f32) -> Self {
        self.lerp(other, t)
    }
}

/// Wrist and elbow of one arm
#[derive(Debug, Clone, Copy, PartialEq)]
struct Arm {
    wrist: Vec2,
    elbow: Vec2,
}

impl Arm {
    fn at(wrist: Vec2) -> Self {
        Self {
            wrist,
            elbow: wrist - FOREARM,
        }
    }

    fn shifted(self, delta: Vec2) -> Self {
        Self {
            wrist: self.wrist + delta,
            elbow: self.elbow + delta,
        }
    }
}

impl Blend for Arm {
    fn blend(self, other: Self, t: f32) -> Self {
        Self {
            wrist: self.wrist.lerp(other.wrist, t),
            elbow: self.elbow.lerp(other.elbow, t),
        }
    }
}

/// Piecewise-linear motion between keyframes; holds the last key afterwards
#[derive(Debug, Clone)]
struct Track<T> {
    rest: T,
    keys: VecDeque<(Timestamp, T)>,
}

impl<T: Blend> Track<T> {
    fn new(rest: T) -> Self {
        Self {
            rest,
            keys: VecDeque::new(),
        }
    }

    fn sample(&mut self, now: Timestamp) -> T {
        while self.keys.len() >= 2 && self.keys[1].0 <= now {
            self.keys.pop_front();
        }
        match (self.keys.front(), self.keys.get(1)) {
            (None, _) => self.rest,
            (Some(&(_, only)), None) => only,
            (Some(&(from_at, from)), Some(&(to_at, to))) => {
                if now <= from_at {
                    return from;
                }
                let t = ((now - from_at) / (to_at - from_at)) as f32;
                from.blend(to, t.clamp(0.0, 1.0))
            }
        }
    }

    /// Time the last planned motion ends
    fn free_at(&self) -> Timestamp {
        self.keys.back().map_or(f64::NEG_INFINITY, |(at, _)| *at)
    }

    fn last(&self) -> T {
        self.keys.back().map_or(self.rest, |(_, value)| *value)
    }

    fn move_to(&mut self, start: Timestamp, duration: f64, target: T) {
        let from = self.last();
        self.keys.push_back((start, from));
        self.keys.push_back((start + duration, target));
    }

    fn hold_until(&mut self, at: Timestamp) {
        let value = self.last();
        self.keys.push_back((at, value));
    }

    fn recover(&mut self, start: Timestamp) {
        let rest = self.rest;
        self.move_to(start, RECOVERY_TIME, rest);
    }
}

pub struct SparringPartner<R> {
    rng: R,
    accuracy: f64,
    pixels_per_inch: f32,
    left: Track<Arm>,
    right: Track<Arm>,
    head: Track<Vec2>,
}

impl<R: Rng> SparringPartner<R> {
    /// `accuracy` is clamped to [0, 1]
    pub fn new(rng: R, accuracy: f64, pixels_per_inch: f32) -> Self {
        Self {
            rng,
            accuracy: accuracy.clamp(0.0, 1.0),
            pixels_per_inch,
            left: Track::new(Arm::at(LEFT_REST)),
            right: Track::new(Arm::at(RIGHT_REST)),
            head: Track::new(NOSE),
        }
    }

    /// React to a presentation event seen at `now`
    pub fn react(&mut self, event: &PresentationEvent, now: Timestamp) {
        match *event {
            PresentationEvent::ShowAttackPath { path, .. } => self.answer_attack(path, now),
            PresentationEvent::ShowIncomingAttack { attack, duration } => {
                self.answer_incoming(attack, now, now + duration)
            }
            _ => {}
        }
    }

    /// Render the pose at `now`, in pixels
    pub fn pose(&mut self, now: Timestamp) -> BodyPose {
        let scale = self.pixels_per_inch;
        let left = self.left.sample(now);
        let right = self.right.sample(now);
        let nose = self.head.sample(now);
        BodyPose {
            left_wrist: Some(left.wrist * scale),
            left_elbow: Some(left.elbow * scale),
            right_wrist: Some(right.wrist * scale),
            right_elbow: Some(right.elbow * scale),
            nose: Some(nose * scale),
            pixels_per_inch: scale,
        }
    }

    fn answer_attack(&mut self, path: AttackPath, now: Timestamp) {
        let attempt = if self.rng.gen_bool(self.accuracy) {
            Some(path)
        } else if self.rng.gen_bool(0.5) {
            let others: Vec<AttackPath> = AttackPath::OFFENSIVE
                .into_iter()
                .filter(|p| *p != path)
                .collect();
            others.choose(&mut self.rng).copied()
        } else {
            None
        };

        let Some(attempt) = attempt else {
            tracing::debug!("Partner lets the {} go by", path.name());
            return;
        };
        tracing::debug!("Partner throws a {} (asked for {})", attempt.name(), path.name());

        let start = (now + REACTION_DELAY)
            .max(self.left.free_at())
            .max(self.right.free_at());
        match attempt {
            AttackPath::LeftHook => self.swing(Hand::Left, start, Vec2::new(25.0, 0.0)),
            AttackPath::RightHook => self.swing(Hand::Right, start, Vec2::new(-25.0, 0.0)),
            AttackPath::Uppercut => self.swing(Hand::Right, start, Vec2::new(0.0, 22.0)),
            AttackPath::CrossFinisher => {
                self.swing(Hand::Left, start, Vec2::new(18.0, -18.0));
                self.swing(Hand::Right, start + FINISHER_GAP, Vec2::new(-18.0, -18.0));
            }
            AttackPath::None => {}
        }
    }

    fn answer_incoming(&mut self, attack: IncomingAttack, now: Timestamp, impact: Timestamp) {
        let start = now + REACTION_DELAY;
        let until = impact + HOLD_MARGIN;

        if !self.rng.gen_bool(self.accuracy) {
            if self.rng.gen_bool(0.5) {
                self.jab(Hand::Left, start);
            }
            return;
        }

        match attack {
            IncomingAttack::Left => self.raise(Hand::Left, start, until),
            IncomingAttack::Right => self.raise(Hand::Right, start, until),
            IncomingAttack::Up if self.rng.gen_bool(0.5) => self.crouch(start, until),
            IncomingAttack::Up => {
                self.raise(Hand::Left, start, until);
                self.raise(Hand::Right, start, until);
            }
            IncomingAttack::None => {}
        }
    }

    fn arm(&mut self, hand: Hand) -> &mut Track<Arm> {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    fn swing(&mut self, hand: Hand, not_before: Timestamp, reach: Vec2) {
        let jitter = self.rng.gen_range(-SWING_JITTER..=SWING_JITTER).to_radians();
        let delta = Vec2::from_angle(jitter).rotate(reach);

        let track = self.arm(hand);
        let start = not_before.max(track.free_at());
        let target = track.last().shifted(delta);
        track.move_to(start, SWING_TIME, target);
        track.recover(start + SWING_TIME);
    }

    /// Straight punch: the wrist drives past the elbow, the elbow stays put
    fn jab(&mut self, hand: Hand, not_before: Timestamp) {
        let track = self.arm(hand);
        let start = not_before.max(track.free_at());
        let from = track.last();
        let target = Arm {
            wrist: from.elbow - FOREARM,
            elbow: from.elbow,
        };
        track.move_to(start, JAB_TIME, target);
        track.recover(start + JAB_TIME + HOLD_MARGIN);
    }

    fn raise(&mut self, hand: Hand, not_before: Timestamp, until: Timestamp) {
        let guard = match hand {
            Hand::Left => LEFT_GUARD,
            Hand::Right => RIGHT_GUARD,
        };
        let track = self.arm(hand);
        let start = not_before.max(track.free_at());
        let release = until.max(start + RAISE_TIME);
        track.move_to(start, RAISE_TIME, Arm::at(guard));
        track.hold_until(release);
        track.recover(release);
    }

    fn crouch(&mut self, not_before: Timestamp, until: Timestamp) {
        let start = not_before.max(self.head.free_at());
        let release = until.max(start + RAISE_TIME);
        self.head.move_to(start, RAISE_TIME, CROUCHED_NOSE);
        self.head.hold_until(release);
        self.head.recover(release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn partner(accuracy: f64) -> SparringPartner<ChaCha8Rng> {
        SparringPartner::new(ChaCha8Rng::seed_from_u64(5), accuracy, 4.0)
    }

    #[test]
    fn test_rest_pose_is_scaled() {
        let mut p = partner(1.0);
        let pose = p.pose(0.0);
        assert_eq!(pose.nose, Some(NOSE * 4.0));
        assert_eq!(pose.left_wrist, Some(LEFT_REST * 4.0));
        assert_eq!(pose.left_elbow, Some((LEFT_REST - FOREARM) * 4.0));
        assert_eq!(pose.pixels_per_inch, 4.0);
    }

    #[test]
    fn test_left_hook_swings_rightward_then_returns() {
        let mut p = partner(1.0);
        p.react(
            &PresentationEvent::ShowAttackPath {
                path: AttackPath::LeftHook,
                duration: 3.0,
            },
            0.0,
        );
        let before = p.pose(0.5).left_wrist.unwrap();
        let extended = p.pose(0.75).left_wrist.unwrap();
        assert!(extended.x - before.x > 60.0);

        let back = p.pose(3.0).left_wrist.unwrap();
        assert_eq!(back, LEFT_REST * 4.0);
    }

    #[test]
    fn test_guard_held_through_impact() {
        let mut p = partner(1.0);
        p.react(
            &PresentationEvent::ShowIncomingAttack {
                attack: IncomingAttack::Right,
                duration: 2.0,
            },
            0.0,
        );
        let at_impact = p.pose(2.0);
        let wrist = at_impact.right_wrist.unwrap();
        let nose = at_impact.nose.unwrap();
        assert!(wrist.y > nose.y);
        assert!(wrist.x > nose.x);
    }

    #[test]
    fn test_inaccurate_partner_never_guards() {
        let mut p = partner(0.0);
        p.react(
            &PresentationEvent::ShowIncomingAttack {
                attack: IncomingAttack::Left,
                duration: 2.0,
            },
            0.0,
        );
        let pose = p.pose(2.0);
        assert!(pose.left_wrist.unwrap().y < pose.nose.unwrap().y);
    }

    #[test]
    fn test_track_holds_last_key() {
        let mut track = Track::new(Vec2::ZERO);
        track.move_to(1.0, 1.0, Vec2::new(10.0, 0.0));
        assert_eq!(track.sample(0.5), Vec2::ZERO);
        assert_eq!(track.sample(1.5), Vec2::new(5.0, 0.0));
        assert_eq!(track.sample(5.0), Vec2::new(10.0, 0.0));
        assert_eq!(track.free_at(), 2.0);
    }
}
