//! Match loop task
//!
//! Owns the battle. Frames and gestures are handled strictly one at a time,
//! so the battle never sees concurrent input. Queued gestures are always
//! handled before a newer frame.

use super::{FrameTick, MatchStatus};
use crate::combat::presentation::PresentationSink;
use crate::combat::resolution::Battle;
use crate::gesture::{HandGesture, PostureDetector};
use rand::Rng;
use tokio::sync::{mpsc, watch};

pub struct MatchLoop<R, S> {
    battle: Battle<R, S>,
    posture: PostureDetector,
}

impl<R: Rng, S: PresentationSink> MatchLoop<R, S> {
    pub fn new(battle: Battle<R, S>, posture: PostureDetector) -> Self {
        Self { battle, posture }
    }

    /// Run until shutdown or until the frame source is dropped
    ///
    /// The current frame starts the match. Gestures still queued when the
    /// loop stops are dropped unprocessed. Returns the stopped battle.
    pub async fn run(
        mut self,
        mut frames: watch::Receiver<FrameTick>,
        mut gestures: mpsc::Receiver<HandGesture>,
        mut shutdown: watch::Receiver<bool>,
        status: watch::Sender<MatchStatus>,
    ) -> Battle<R, S> {
        let first = *frames.borrow_and_update();
        self.posture.update(&first.pose);
        self.battle.start(first.at);
        status.send_replace(MatchStatus::of(self.battle.state()));

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }

                Some(gesture) = gestures.recv() => {
                    self.battle.on_gesture(gesture, gesture.at);
                }

                changed = frames.changed() => {
                    if changed.is_err() {
                        tracing::debug!("Frame source closed, ending match");
                        break;
                    }
                    // Gestures already queued happened before this frame
                    while let Ok(gesture) = gestures.try_recv() {
                        self.battle.on_gesture(gesture, gesture.at);
                    }
                    let tick = *frames.borrow_and_update();
                    let posture = self.posture.update(&tick.pose);
                    self.battle.tick(tick.at, &posture);
                }
            }

            status.send_replace(MatchStatus::of(self.battle.state()));
        }

        self.battle.stop();
        status.send_replace(MatchStatus::of(self.battle.state()));

        gestures.close();
        let mut dropped = 0;
        while gestures.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!("Dropped {} gestures received after shutdown", dropped);
        }
        tracing::info!(
            "Match stopped after {} turns",
            self.battle.state().turns_played
        );
        self.battle
    }
}
