//! Turn-based combat core
//!
//! Pattern selection, hit resolution and the turn/health model. Gestures come
//! in from [`crate::gesture`]; presentation events go out through a
//! [`PresentationSink`].

pub mod attack;
pub mod presentation;
pub mod resolution;
pub mod selector;
pub mod state;

pub use attack::{AttackPath, HitGrade, IncomingAttack};
pub use presentation::{EventLog, PresentationEvent, PresentationSink};
pub use resolution::{Battle, CrossFinisherProgress, MissReason, Resolution, TurnOutcome};
pub use selector::{PatternSelector, SelectionContext, TurnPlan};
pub use state::{Combatant, MatchState, Side, TurnKind, TurnPhase};
