//! Per-hand detector task

use super::FrameTick;
use crate::core::config::CombatConfig;
use crate::core::error::Result;
use crate::core::types::{Hand, Timestamp};
use crate::gesture::{GestureDetector, HandGesture, JabClassifier, PositionFeed, SlashClassifier};
use tokio::sync::{mpsc, watch};

/// Every classifier for one hand
#[derive(Debug, Clone)]
pub struct HandDetectors {
    hand: Hand,
    jab: JabClassifier,
    slash: SlashClassifier,
}

impl HandDetectors {
    pub fn new(hand: Hand, config: &CombatConfig) -> Result<Self> {
        Ok(Self {
            hand,
            jab: JabClassifier::new(hand, config.jab.clone())?,
            slash: SlashClassifier::new(hand, config.slash.clone())?,
        })
    }

    pub fn hand(&self) -> Hand {
        self.hand
    }

    /// Evaluate every classifier once on this tick's frame
    pub fn observe(&mut self, feed: &impl PositionFeed, now: Timestamp) -> Result<Vec<HandGesture>> {
        let frame = feed.frame(self.hand);
        let mut found = Vec::new();
        for detector in [&mut self.jab as &mut dyn GestureDetector, &mut self.slash] {
            if let Some(gesture) = detector.observe(&frame, now)?.gesture() {
                found.push(gesture);
            }
        }
        Ok(found)
    }

    pub fn reset(&mut self) {
        self.jab.reset();
        self.slash.reset();
    }
}

/// Classify every new frame and post the gestures to the match loop
///
/// Returns when shutdown is signalled, the frame source is dropped, or the
/// match loop stops receiving.
pub async fn run_hand_detector(
    mut detectors: HandDetectors,
    mut frames: watch::Receiver<FrameTick>,
    gestures: mpsc::Sender<HandGesture>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let hand = detectors.hand();
    tracing::debug!("{} hand detector started", hand.name());

    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }

            changed = frames.changed() => {
                if changed.is_err() {
                    tracing::debug!("{} hand detector: frame source closed", hand.name());
                    break;
                }
                let tick = *frames.borrow_and_update();
                for gesture in detectors.observe(&tick.pose, tick.at)? {
                    if gestures.send(gesture).await.is_err() {
                        tracing::debug!("{} hand detector: match loop gone", hand.name());
                        return Ok(());
                    }
                }
            }
        }
    }

    tracing::debug!("{} hand detector stopped", hand.name());
    Ok(())
}
