//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Match clock time in seconds (monotonic, host supplied)
pub type Timestamp = f64;

/// Which hand a landmark, detector or gesture belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const BOTH: [Hand; 2] = [Hand::Left, Hand::Right];

    pub fn name(&self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
        }
    }
}
