//! Presentation notifications
//!
//! The core never renders or plays anything. It emits discrete events to a
//! sink owned by the host, which maps them onto indicators, sounds and
//! particles.

use crate::combat::attack::{AttackPath, IncomingAttack};
use crate::combat::state::Side;
use crate::core::types::Hand;
use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Hit,
    Miss,
}

impl SoundCue {
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::Hit => "hit",
            SoundCue::Miss => "miss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleCue {
    Hit,
    Miss,
}

impl ParticleCue {
    pub fn name(&self) -> &'static str {
        match self {
            ParticleCue::Hit => "hit_effect",
            ParticleCue::Miss => "miss_effect",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PresentationEvent {
    ShowAttackPath { path: AttackPath, duration: f64 },
    HideAttackPath { path: AttackPath },
    /// One half of the cross finisher landed
    HideFinisherHalf { hand: Hand },
    HideAllAttackPaths,
    ShowIncomingAttack { attack: IncomingAttack, duration: f64 },
    HideIncomingAttack { attack: IncomingAttack },
    ComboChanged { combo: u32, success: bool },
    HealthChanged { side: Side, health: f32, max: f32 },
    Defeated { side: Side },
    PlaySound { cue: SoundCue },
    PlayParticle { cue: ParticleCue },
    JabMarker { hand: Hand, position: Vec2, duration: f64 },
}

/// Receiver of presentation events
pub trait PresentationSink {
    fn emit(&mut self, event: PresentationEvent);
}

impl<F: FnMut(PresentationEvent)> PresentationSink for F {
    fn emit(&mut self, event: PresentationEvent) {
        self(event)
    }
}

/// Sink that records every event, for hosts that poll and for tests
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<PresentationEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<PresentationEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn contains(&self, event: &PresentationEvent) -> bool {
        self.events.contains(event)
    }

    pub fn sounds(&self) -> impl Iterator<Item = SoundCue> + '_ {
        self.events.iter().filter_map(|e| match e {
            PresentationEvent::PlaySound { cue } => Some(*cue),
            _ => None,
        })
    }
}

impl PresentationSink for EventLog {
    fn emit(&mut self, event: PresentationEvent) {
        self.events.push(event);
    }
}
