//! Turn and health model
//!
//! Plain match state shared by the pattern selector and the battle. Only the
//! battle mutates it. Health never ends the match: a combatant brought to zero
//! is reported as defeated and restored to full.

use crate::combat::attack::{AttackPath, IncomingAttack};
use crate::core::config::HealthConfig;
use crate::core::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Which combatant a health change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    Survived,
    /// Health hit zero and was reset to max
    Defeated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub health: f32,
    pub max_health: f32,
    /// How many times this combatant has been knocked down
    pub defeats: u32,
}

impl Combatant {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            defeats: 0,
        }
    }

    /// Apply damage (clamped at zero); a knockdown resets to full health
    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        self.health = (self.health - amount.max(0.0)).max(0.0);
        if self.health > 0.0 {
            return DamageOutcome::Survived;
        }
        self.defeats += 1;
        self.health = self.max_health;
        DamageOutcome::Defeated
    }
}

/// What the battle is currently waiting for
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum TurnPhase {
    #[default]
    Idle,
    AwaitingPlayerAttack {
        path: AttackPath,
        deadline: Timestamp,
    },
    AwaitingEnemyAttackResolution {
        attack: IncomingAttack,
        deadline: Timestamp,
    },
}

impl TurnPhase {
    pub fn deadline(&self) -> Option<Timestamp> {
        match self {
            TurnPhase::Idle => None,
            TurnPhase::AwaitingPlayerAttack { deadline, .. }
            | TurnPhase::AwaitingEnemyAttackResolution { deadline, .. } => Some(*deadline),
        }
    }

    pub fn expected_path(&self) -> AttackPath {
        match self {
            TurnPhase::AwaitingPlayerAttack { path, .. } => *path,
            _ => AttackPath::None,
        }
    }

    pub fn incoming_attack(&self) -> IncomingAttack {
        match self {
            TurnPhase::AwaitingEnemyAttackResolution { attack, .. } => *attack,
            _ => IncomingAttack::None,
        }
    }
}

/// Kind of the turn that just finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnKind {
    PlayerAttack,
    EnemyAttack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub player: Combatant,
    pub opponent: Combatant,
    pub combo: u32,
    pub phase: TurnPhase,
    pub previous_turn: Option<TurnKind>,
    /// Last path requested of the player, kept across enemy turns
    pub last_path: AttackPath,
    pub turns_played: u32,
}

impl MatchState {
    pub fn new(health: &HealthConfig) -> Self {
        Self {
            player: Combatant::new(health.player_max),
            opponent: Combatant::new(health.opponent_max),
            combo: 0,
            phase: TurnPhase::Idle,
            previous_turn: None,
            last_path: AttackPath::None,
            turns_played: 0,
        }
    }

    pub fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    /// Extend the combo; returns the new count
    pub fn extend_combo(&mut self) -> u32 {
        self.combo += 1;
        self.combo
    }

    pub fn break_combo(&mut self) {
        self.combo = 0;
    }
}
