//! Jab detection
//!
//! Tracks the wrist relative to its elbow. A jab is a fast change of that
//! relative position over (almost) the full detection window, ending with the
//! fist still close to the elbow. Measuring against the elbow cancels out the
//! player stepping or leaning while punching.

use super::{
    still_cooling_down, Detection, Gesture, GestureDetector, HandGesture, LandmarkFrame,
    RejectReason, SkipReason, SlidingWindow, MIN_WINDOW_COVERAGE,
};
use crate::core::config::JabConfig;
use crate::core::error::Result;
use crate::core::types::{Hand, Timestamp};
use glam::Vec2;

/// Per-hand jab classifier
#[derive(Debug, Clone)]
pub struct JabClassifier {
    hand: Hand,
    config: JabConfig,
    history: SlidingWindow<Vec2>,
    suspended_until: Option<Timestamp>,
}

impl JabClassifier {
    pub fn new(hand: Hand, config: JabConfig) -> Result<Self> {
        config.validate()?;
        let history = SlidingWindow::new(config.window)?;
        Ok(Self {
            hand,
            config,
            history,
            suspended_until: None,
        })
    }

    pub fn config(&self) -> &JabConfig {
        &self.config
    }

    pub fn sample_count(&self) -> usize {
        self.history.count()
    }

    pub fn cooling_down_until(&self) -> Option<Timestamp> {
        self.suspended_until
    }
}

impl GestureDetector for JabClassifier {
    fn hand(&self) -> Hand {
        self.hand
    }

    fn observe(&mut self, frame: &LandmarkFrame, now: Timestamp) -> Result<Detection> {
        if still_cooling_down(&mut self.suspended_until, now) {
            return Ok(Detection::Skipped(SkipReason::CoolingDown));
        }

        let (Some(wrist), Some(relative)) = (frame.wrist, frame.wrist_from_elbow()) else {
            return Ok(Detection::Skipped(SkipReason::LandmarkUnavailable));
        };
        if !frame.has_scale() {
            return Ok(Detection::Skipped(SkipReason::LandmarkUnavailable));
        }

        self.history.add(relative, now);
        if self.history.count() < 2 {
            return Ok(Detection::Rejected(RejectReason::InsufficientSamples));
        }

        let elapsed = self.history.elapsed()?;
        if elapsed < MIN_WINDOW_COVERAGE * self.config.window || elapsed <= 0.0 {
            return Ok(Detection::Rejected(RejectReason::WindowTooShort { elapsed }));
        }

        let oldest = self.history.earliest()?.value;
        let newest = self.history.latest()?.value;
        let speed = oldest.distance(newest) / elapsed as f32 / frame.pixels_per_inch;
        if speed < self.config.speed_threshold {
            return Ok(Detection::Rejected(RejectReason::TooSlow { speed }));
        }

        let distance = relative.length() / frame.pixels_per_inch;
        if distance > self.config.max_distance_from_elbow {
            return Ok(Detection::Rejected(RejectReason::TooFarFromElbow { distance }));
        }

        self.history.clear();
        self.suspended_until = Some(now + self.config.cooldown);
        tracing::debug!(
            "{} jab at ({:.1}, {:.1}), {:.1} in/s",
            self.hand.name(),
            wrist.x,
            wrist.y,
            speed
        );

        Ok(Detection::Detected(HandGesture {
            hand: self.hand,
            gesture: Gesture::Jab { position: wrist },
            at: now,
        }))
    }

    fn reset(&mut self) {
        self.history.clear();
        self.suspended_until = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(wrist: Vec2, elbow: Vec2) -> LandmarkFrame {
        LandmarkFrame {
            wrist: Some(wrist),
            elbow: Some(elbow),
            nose: None,
            pixels_per_inch: 1.0,
        }
    }

    fn classifier() -> JabClassifier {
        JabClassifier::new(Hand::Left, JabConfig::default()).unwrap()
    }

    #[test]
    fn test_missing_landmark_skips_without_sampling() {
        let mut jab = classifier();
        let mut f = frame(Vec2::ZERO, Vec2::ZERO);
        f.elbow = None;

        let result = jab.observe(&f, 0.0).unwrap();
        assert_eq!(result, Detection::Skipped(SkipReason::LandmarkUnavailable));
        assert_eq!(jab.sample_count(), 0);
    }

    #[test]
    fn test_short_window_rejected() {
        // Fast enough, but only 0.05s of a 0.2s window
        let mut jab = classifier();
        jab.observe(&frame(Vec2::new(-5.0, 0.0), Vec2::ZERO), 0.0).unwrap();
        let result = jab.observe(&frame(Vec2::new(5.0, 0.0), Vec2::ZERO), 0.05).unwrap();
        assert!(matches!(
            result,
            Detection::Rejected(RejectReason::WindowTooShort { .. })
        ));
    }

    #[test]
    fn test_fast_punch_over_full_window_detected() {
        // 13.3 inches in 0.19s = 70 in/s
        let mut jab = classifier();
        jab.observe(&frame(Vec2::new(-8.0, 0.0), Vec2::ZERO), 0.0).unwrap();
        let result = jab
            .observe(&frame(Vec2::new(5.3, 0.0), Vec2::ZERO), 0.19)
            .unwrap();

        let gesture = result.gesture().expect("jab should be detected");
        assert_eq!(gesture.hand, Hand::Left);
        assert_eq!(gesture.gesture, Gesture::Jab { position: Vec2::new(5.3, 0.0) });
        assert_eq!(jab.sample_count(), 0);
        assert_eq!(jab.cooling_down_until(), Some(0.19 + 0.5));
    }

    #[test]
    fn test_slow_motion_rejected() {
        let mut jab = classifier();
        jab.observe(&frame(Vec2::new(0.0, 0.0), Vec2::ZERO), 0.0).unwrap();
        let result = jab.observe(&frame(Vec2::new(2.0, 0.0), Vec2::ZERO), 0.19).unwrap();
        assert!(matches!(result, Detection::Rejected(RejectReason::TooSlow { .. })));
    }

    #[test]
    fn test_wide_swing_rejected() {
        // Fast, but the fist ends 20 inches from the elbow
        let mut jab = classifier();
        jab.observe(&frame(Vec2::new(0.0, 0.0), Vec2::ZERO), 0.0).unwrap();
        let result = jab.observe(&frame(Vec2::new(20.0, 0.0), Vec2::ZERO), 0.19).unwrap();
        assert!(matches!(
            result,
            Detection::Rejected(RejectReason::TooFarFromElbow { .. })
        ));
    }

    #[test]
    fn test_scale_converts_pixels_to_inches() {
        // 133 px at 10 px/in is the same 70 in/s punch
        let mut jab = classifier();
        let mut start = frame(Vec2::new(-80.0, 0.0), Vec2::ZERO);
        start.pixels_per_inch = 10.0;
        let mut end = frame(Vec2::new(53.0, 0.0), Vec2::ZERO);
        end.pixels_per_inch = 10.0;

        jab.observe(&start, 0.0).unwrap();
        assert!(jab.observe(&end, 0.19).unwrap().gesture().is_some());
    }

    #[test]
    fn test_cooldown_suspends_detection() {
        let mut jab = classifier();
        jab.observe(&frame(Vec2::new(-8.0, 0.0), Vec2::ZERO), 0.0).unwrap();
        assert!(jab.observe(&frame(Vec2::new(5.3, 0.0), Vec2::ZERO), 0.19).unwrap().gesture().is_some());

        let during = jab.observe(&frame(Vec2::new(-8.0, 0.0), Vec2::ZERO), 0.3).unwrap();
        assert_eq!(during, Detection::Skipped(SkipReason::CoolingDown));
        assert_eq!(jab.sample_count(), 0);

        // After the cooldown the window has to fill again
        let after = jab.observe(&frame(Vec2::new(-8.0, 0.0), Vec2::ZERO), 0.7).unwrap();
        assert_eq!(after, Detection::Rejected(RejectReason::InsufficientSamples));
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = JabConfig {
            cooldown: 0.0,
            ..JabConfig::default()
        };
        assert!(JabClassifier::new(Hand::Right, config).is_err());

        let config = JabConfig {
            cooldown: f64::NAN,
            ..JabConfig::default()
        };
        assert!(JabClassifier::new(Hand::Right, config).is_err());
    }
}
