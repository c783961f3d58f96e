//! Attack pattern selection
//!
//! Invoked once at the start of every turn. A percentile roll decides between
//! a player-attack turn and an enemy-attack turn; the roll is overridden when
//! the opponent is desperate, when the previous turn was already an enemy
//! attack, or when enemy attacks are disabled.

use crate::combat::attack::{AttackPath, IncomingAttack};
use crate::combat::state::TurnKind;
use crate::core::config::TurnConfig;
use rand::seq::SliceRandom;
use rand::Rng;

/// What the next turn asks of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPlan {
    PlayerAttack(AttackPath),
    EnemyAttack(IncomingAttack),
}

impl TurnPlan {
    pub fn kind(&self) -> TurnKind {
        match self {
            TurnPlan::PlayerAttack(_) => TurnKind::PlayerAttack,
            TurnPlan::EnemyAttack(_) => TurnKind::EnemyAttack,
        }
    }
}

/// Inputs to a single selection
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext {
    pub opponent_health: f32,
    pub previous_turn: Option<TurnKind>,
    pub previous_path: AttackPath,
}

/// Pick a value from `candidates` that is not in `excluded`
///
/// Draws uniformly and redraws on an excluded value, at most `max_retries`
/// times; after that it falls back to a uniform pick among the eligible
/// values. Returns `None` only when every candidate is excluded.
pub fn pick_excluding<T, R>(
    rng: &mut R,
    candidates: &[T],
    excluded: &[T],
    max_retries: u32,
) -> Option<T>
where
    T: Copy + PartialEq,
    R: Rng + ?Sized,
{
    for _ in 0..=max_retries {
        let pick = *candidates.choose(rng)?;
        if !excluded.contains(&pick) {
            return Some(pick);
        }
    }

    let eligible: Vec<T> = candidates
        .iter()
        .copied()
        .filter(|c| !excluded.contains(c))
        .collect();
    if !eligible.is_empty() {
        tracing::warn!("Pattern redraw limit reached, picking from eligible set");
    }
    eligible.choose(rng).copied()
}

#[derive(Debug, Clone)]
pub struct PatternSelector<R> {
    rng: R,
    config: TurnConfig,
}

impl<R: Rng> PatternSelector<R> {
    pub fn new(rng: R, config: TurnConfig) -> Self {
        Self { rng, config }
    }

    pub fn config(&self) -> &TurnConfig {
        &self.config
    }

    pub fn is_desperate(&self, opponent_health: f32) -> bool {
        opponent_health < self.config.desperation_threshold
    }

    pub fn select(&mut self, ctx: SelectionContext) -> TurnPlan {
        let roll: u32 = self.rng.gen_range(0..100);
        let desperate = self.is_desperate(ctx.opponent_health);

        let player_turn = !self.config.enemy_attacks_enabled
            || desperate
            || ctx.previous_turn == Some(TurnKind::EnemyAttack)
            || roll < self.config.player_attack_chance;

        let plan = if player_turn {
            TurnPlan::PlayerAttack(self.choose_path(ctx.previous_path, desperate))
        } else {
            TurnPlan::EnemyAttack(self.choose_incoming())
        };
        tracing::debug!(
            "Turn selected: {:?} (roll {}, opponent at {:.1})",
            plan,
            roll,
            ctx.opponent_health
        );
        plan
    }

    /// Random offensive path, never repeating `previous` unless desperate
    pub fn choose_path(&mut self, previous: AttackPath, desperate: bool) -> AttackPath {
        if desperate {
            return AttackPath::CrossFinisher;
        }
        pick_excluding(
            &mut self.rng,
            &AttackPath::OFFENSIVE,
            &[previous],
            self.config.max_path_retries,
        )
        .unwrap_or(AttackPath::LeftHook)
    }

    pub fn choose_incoming(&mut self) -> IncomingAttack {
        IncomingAttack::THROWABLE
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(IncomingAttack::Up)
    }
}
