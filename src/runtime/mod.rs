//! Async runtime plumbing
//!
//! One detector task per hand waits for the next frame on a `watch` channel
//! and posts gestures on an `mpsc` queue. A single match loop task owns the
//! battle and serializes frames and gestures into it. A shared `watch<bool>`
//! stops everything.

pub mod detector;
pub mod match_loop;
pub mod partner;

pub use detector::{run_hand_detector, HandDetectors};
pub use match_loop::MatchLoop;
pub use partner::SparringPartner;

use crate::combat::presentation::PresentationSink;
use crate::combat::resolution::Battle;
use crate::combat::selector::PatternSelector;
use crate::combat::state::{MatchState, TurnPhase};
use crate::core::config::CombatConfig;
use crate::core::error::{Result, SparringError};
use crate::core::types::{Hand, Timestamp};
use crate::gesture::{BodyPose, PostureDetector};
use rand::Rng;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Gestures buffered between the detectors and the match loop
const GESTURE_QUEUE: usize = 32;

/// One tick of tracked pose
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTick {
    pub at: Timestamp,
    pub pose: BodyPose,
}

/// Snapshot of the match published after every processed input
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MatchStatus {
    pub turns_played: u32,
    pub combo: u32,
    pub player_health: f32,
    pub opponent_health: f32,
    pub phase: TurnPhase,
}

impl MatchStatus {
    pub fn of(state: &MatchState) -> Self {
        Self {
            turns_played: state.turns_played,
            combo: state.combo,
            player_health: state.player.health,
            opponent_health: state.opponent.health,
            phase: state.phase,
        }
    }
}

/// Handle on a running match
pub struct MatchHandle<R, S> {
    frames: watch::Sender<FrameTick>,
    shutdown: watch::Sender<bool>,
    status: watch::Receiver<MatchStatus>,
    match_task: JoinHandle<Battle<R, S>>,
    detector_tasks: Vec<JoinHandle<Result<()>>>,
}

/// Spawn the detector tasks and the match loop on the current runtime
///
/// `first` starts the match (and sets the standing posture baseline).
pub fn spawn_match<R, S>(
    config: CombatConfig,
    selector: PatternSelector<R>,
    sink: S,
    first: FrameTick,
) -> Result<MatchHandle<R, S>>
where
    R: Rng + Send + 'static,
    S: PresentationSink + Send + 'static,
{
    let detectors = Hand::BOTH
        .into_iter()
        .map(|hand| HandDetectors::new(hand, &config))
        .collect::<Result<Vec<_>>>()?;
    let posture = PostureDetector::new(config.posture.clone());
    let battle = Battle::new(config, selector, sink)?;

    let (frames_tx, frames_rx) = watch::channel(first);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (status_tx, status_rx) = watch::channel(MatchStatus::of(battle.state()));
    let (gesture_tx, gesture_rx) = mpsc::channel(GESTURE_QUEUE);

    let detector_tasks = detectors
        .into_iter()
        .map(|detectors| {
            tokio::spawn(run_hand_detector(
                detectors,
                frames_rx.clone(),
                gesture_tx.clone(),
                shutdown_rx.clone(),
            ))
        })
        .collect();
    drop(gesture_tx);

    let match_task = tokio::spawn(MatchLoop::new(battle, posture).run(
        frames_rx,
        gesture_rx,
        shutdown_rx,
        status_tx,
    ));

    Ok(MatchHandle {
        frames: frames_tx,
        shutdown: shutdown_tx,
        status: status_rx,
        match_task,
        detector_tasks,
    })
}

impl<R, S> MatchHandle<R, S> {
    /// Publish the next frame; only the newest unread frame is kept
    pub fn push_frame(&self, tick: FrameTick) {
        self.frames.send_replace(tick);
    }

    pub fn status(&self) -> MatchStatus {
        *self.status.borrow()
    }

    /// Signal shutdown, wait for every task and hand back the battle
    pub async fn shutdown(self) -> Result<Battle<R, S>> {
        self.shutdown.send_replace(true);

        for task in self.detector_tasks {
            task.await.map_err(|e| SparringError::TaskFailed(e.to_string()))??;
        }
        self.match_task
            .await
            .map_err(|e| SparringError::TaskFailed(e.to_string()))
    }
}
