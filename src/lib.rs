//! Sparring - combat core for a motion-controlled boxing game
//!
//! Landmark positions from a pose tracker go in; discrete gestures, turn
//! outcomes and presentation events come out. Rendering, audio and pose
//! estimation belong to the host.

pub mod combat;
pub mod core;
pub mod gesture;
pub mod runtime;
