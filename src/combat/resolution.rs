//! Hit resolution state machine
//!
//! The battle holds the currently expected attack, grades incoming gestures
//! against it, keeps the combo, applies damage and starts the next turn.
//! Every input is answered with a [`Resolution`] so callers can tell a
//! gesture that was ignored from one that ended the turn.
//!
//! Timers (turn deadline, enemy attack delay, cross finisher buffer) are
//! deadlines checked on [`Battle::tick`] and on gesture arrival. The battle
//! clock only moves forward: an input older than the latest one seen is
//! resolved at the latest time, and a gesture from before the current turn
//! started is dropped.

use crate::combat::attack::{
    finisher_halves, lands_other_path, requirement, AttackPath, HitGrade, IncomingAttack,
    SlashMatch,
};
use crate::combat::presentation::{ParticleCue, PresentationEvent, PresentationSink, SoundCue};
use crate::combat::selector::{PatternSelector, SelectionContext, TurnPlan};
use crate::combat::state::{DamageOutcome, MatchState, Side, TurnKind, TurnPhase};
use crate::core::config::CombatConfig;
use crate::core::error::Result;
use crate::core::types::{Hand, Timestamp};
use crate::gesture::{Gesture, HandGesture, Posture};
use glam::Vec2;
use rand::Rng;

/// Progress on the two halves of a cross finisher
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CrossFinisherProgress {
    pub left_landed: bool,
    pub right_landed: bool,
    /// Shared countdown, refreshed by every landed half
    pub expires_at: Option<Timestamp>,
}

impl CrossFinisherProgress {
    /// Exactly one half landed
    pub fn is_partial(&self) -> bool {
        self.left_landed != self.right_landed
    }

    pub fn is_complete(&self) -> bool {
        self.left_landed && self.right_landed
    }

    pub fn expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }

    fn land(&mut self, half: Hand, now: Timestamp, buffer: f64) {
        match half {
            Hand::Left => self.left_landed = true,
            Hand::Right => self.right_landed = true,
        }
        self.expires_at = Some(now + buffer);
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissReason {
    /// Turn deadline passed
    Timeout,
    /// The slash cleanly landed a different path
    WrongPath(AttackPath),
}

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnOutcome {
    Hit {
        path: AttackPath,
        grade: HitGrade,
        damage: f32,
        combo: u32,
    },
    Missed {
        path: AttackPath,
        reason: MissReason,
    },
    Defended {
        attack: IncomingAttack,
        combo: u32,
    },
    Struck {
        attack: IncomingAttack,
        damage: f32,
    },
}

impl TurnOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TurnOutcome::Hit { .. } | TurnOutcome::Defended { .. })
    }
}

/// Answer to a gesture or a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Nothing changed; still waiting on the same turn
    Waiting,
    /// Half of a cross finisher landed; waiting for the other half
    Progress,
    /// A cross finisher half expired alone; combo broken, turn continues
    FinisherBroken,
    /// The turn ended and the next one has started
    Resolved(TurnOutcome),
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn outcome(&self) -> Option<TurnOutcome> {
        match self {
            Resolution::Resolved(outcome) => Some(*outcome),
            _ => None,
        }
    }
}

/// The combat orchestrator for one match
pub struct Battle<R, S> {
    config: CombatConfig,
    selector: PatternSelector<R>,
    sink: S,
    state: MatchState,
    finisher: CrossFinisherProgress,
    /// Latest time seen on any input
    clock: Timestamp,
    turn_started_at: Timestamp,
}

impl<R: Rng, S: PresentationSink> Battle<R, S> {
    pub fn new(config: CombatConfig, selector: PatternSelector<R>, sink: S) -> Result<Self> {
        config.validate()?;
        let state = MatchState::new(&config.health);
        Ok(Self {
            config,
            selector,
            sink,
            state,
            finisher: CrossFinisherProgress::default(),
            clock: 0.0,
            turn_started_at: 0.0,
        })
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn phase(&self) -> TurnPhase {
        self.state.phase
    }

    pub fn combo(&self) -> u32 {
        self.state.combo
    }

    pub fn finisher(&self) -> CrossFinisherProgress {
        self.finisher
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn is_running(&self) -> bool {
        self.state.phase != TurnPhase::Idle
    }

    /// Publish the initial state and select the first turn
    pub fn start(&mut self, now: Timestamp) {
        if self.is_running() {
            tracing::warn!("Battle already running, ignoring start");
            return;
        }
        self.clock = now;
        self.emit(PresentationEvent::ComboChanged {
            combo: self.state.combo,
            success: true,
        });
        self.publish_health(Side::Player);
        self.publish_health(Side::Opponent);
        self.begin_next_turn(now);
    }

    /// Cancel the current turn; later gestures and ticks are ignored
    pub fn stop(&mut self) {
        if let TurnPhase::AwaitingEnemyAttackResolution { attack, .. } = self.state.phase {
            self.emit(PresentationEvent::HideIncomingAttack { attack });
        }
        self.state.phase = TurnPhase::Idle;
        self.finisher.reset();
        self.emit(PresentationEvent::HideAllAttackPaths);
    }

    /// Handle one classified gesture
    pub fn on_gesture(&mut self, gesture: HandGesture, now: Timestamp) -> Resolution {
        if !self.is_running() {
            return Resolution::Waiting;
        }
        if now < self.turn_started_at {
            tracing::debug!(
                "Dropping {} gesture from {:.2}s, turn started at {:.2}s",
                gesture.hand.name(),
                now,
                self.turn_started_at
            );
            return Resolution::Waiting;
        }
        let now = self.advance_clock(now);

        if let Gesture::Jab { position } = gesture.gesture {
            self.emit(PresentationEvent::JabMarker {
                hand: gesture.hand,
                position,
                duration: self.config.jab.cooldown,
            });
        }

        let TurnPhase::AwaitingPlayerAttack { path, deadline } = self.state.phase else {
            return Resolution::Waiting;
        };
        if now > deadline {
            return Resolution::Resolved(self.miss(path, MissReason::Timeout, now));
        }

        let Gesture::Slash { direction } = gesture.gesture else {
            return Resolution::Waiting;
        };
        if path == AttackPath::CrossFinisher {
            return self.finisher_slash(gesture.hand, direction, now);
        }

        let Some(req) = requirement(path, &self.config.paths) else {
            return Resolution::Waiting;
        };
        match req.evaluate(gesture.hand, direction) {
            SlashMatch::Hit(grade) => Resolution::Resolved(self.land_hit(path, grade, now)),
            SlashMatch::WrongDirection => self.wrong_path_or_wait(path, gesture.hand, direction, now),
            other => {
                tracing::debug!("{} slash ignored for {}: {:?}", gesture.hand.name(), path.name(), other);
                Resolution::Waiting
            }
        }
    }

    /// Advance timers; `posture` is the player's stance at this tick
    pub fn tick(&mut self, now: Timestamp, posture: &Posture) -> Resolution {
        let now = self.advance_clock(now);
        match self.state.phase {
            TurnPhase::Idle => Resolution::Waiting,
            TurnPhase::AwaitingPlayerAttack { path, deadline } => {
                if now > deadline {
                    return Resolution::Resolved(self.miss(path, MissReason::Timeout, now));
                }
                if self.finisher.is_partial() && self.finisher.expired(now) {
                    self.break_finisher(now, deadline);
                    return Resolution::FinisherBroken;
                }
                Resolution::Waiting
            }
            TurnPhase::AwaitingEnemyAttackResolution { attack, deadline } => {
                if now < deadline {
                    return Resolution::Waiting;
                }
                Resolution::Resolved(self.resolve_enemy_attack(attack, posture, now))
            }
        }
    }

    fn advance_clock(&mut self, now: Timestamp) -> Timestamp {
        self.clock = self.clock.max(now);
        self.clock
    }

    fn finisher_slash(&mut self, hand: Hand, direction: Vec2, now: Timestamp) -> Resolution {
        if self.finisher.is_partial() && self.finisher.expired(now) {
            let deadline = self.state.phase.deadline().unwrap_or(now);
            self.break_finisher(now, deadline);
            return Resolution::FinisherBroken;
        }

        let buffer = self.config.turns.cross_finisher_buffer;
        let mut landed = false;
        for (half, req) in finisher_halves(&self.config.paths) {
            if let SlashMatch::Hit(_) = req.evaluate(hand, direction) {
                self.finisher.land(half, now, buffer);
                self.emit(PresentationEvent::HideFinisherHalf { hand: half });
                landed = true;
            }
        }

        if self.finisher.is_complete() {
            return Resolution::Resolved(self.land_hit(
                AttackPath::CrossFinisher,
                HitGrade::Finisher,
                now,
            ));
        }
        if landed {
            tracing::debug!("Cross finisher half landed: {:?}", self.finisher);
            return Resolution::Progress;
        }
        self.wrong_path_or_wait(AttackPath::CrossFinisher, hand, direction, now)
    }

    fn wrong_path_or_wait(
        &mut self,
        path: AttackPath,
        hand: Hand,
        direction: Vec2,
        now: Timestamp,
    ) -> Resolution {
        match lands_other_path(path, hand, direction, &self.config.paths) {
            Some(other) => Resolution::Resolved(self.miss(path, MissReason::WrongPath(other), now)),
            None => Resolution::Waiting,
        }
    }

    fn land_hit(&mut self, path: AttackPath, grade: HitGrade, now: Timestamp) -> TurnOutcome {
        let combo = self.state.extend_combo();
        let scoring = &self.config.scoring;
        let base = match grade {
            HitGrade::Good => scoring.good_damage,
            HitGrade::Perfect => scoring.perfect_damage,
            HitGrade::Finisher => scoring.finisher_damage,
        };
        let damage = base + combo as f32 * scoring.combo_multiplier - scoring.combo_multiplier;
        tracing::debug!("{} landed ({:?}) for {:.1}, combo {}", path.name(), grade, damage, combo);

        self.finisher.reset();
        self.emit(PresentationEvent::HideAllAttackPaths);
        self.emit(PresentationEvent::ComboChanged {
            combo,
            success: true,
        });
        self.emit(PresentationEvent::PlaySound { cue: SoundCue::Hit });
        self.emit(PresentationEvent::PlayParticle { cue: ParticleCue::Hit });
        self.apply_damage(Side::Opponent, damage);

        self.finish_turn(TurnKind::PlayerAttack, now);
        TurnOutcome::Hit {
            path,
            grade,
            damage,
            combo,
        }
    }

    fn miss(&mut self, path: AttackPath, reason: MissReason, now: Timestamp) -> TurnOutcome {
        tracing::debug!("{} missed: {:?}", path.name(), reason);
        self.finisher.reset();
        self.emit(PresentationEvent::HideAttackPath { path });
        self.fail_feedback();
        self.finish_turn(TurnKind::PlayerAttack, now);
        TurnOutcome::Missed { path, reason }
    }

    fn break_finisher(&mut self, now: Timestamp, deadline: Timestamp) {
        tracing::debug!("Cross finisher expired with one half landed");
        self.finisher.reset();
        self.fail_feedback();
        self.emit(PresentationEvent::ShowAttackPath {
            path: AttackPath::CrossFinisher,
            duration: (deadline - now).max(0.0),
        });
    }

    fn resolve_enemy_attack(
        &mut self,
        attack: IncomingAttack,
        posture: &Posture,
        now: Timestamp,
    ) -> TurnOutcome {
        self.emit(PresentationEvent::HideIncomingAttack { attack });

        let outcome = if attack.is_defended_by(posture) {
            let combo = self.state.extend_combo();
            tracing::debug!("Enemy {} attack defended, combo {}", attack.name(), combo);
            self.emit(PresentationEvent::HideAllAttackPaths);
            self.emit(PresentationEvent::ComboChanged {
                combo,
                success: true,
            });
            self.emit(PresentationEvent::PlaySound { cue: SoundCue::Miss });
            self.emit(PresentationEvent::PlayParticle { cue: ParticleCue::Miss });
            TurnOutcome::Defended { attack, combo }
        } else {
            let damage = self.config.scoring.enemy_attack_damage;
            tracing::debug!("Enemy {} attack landed for {:.1}", attack.name(), damage);
            self.state.break_combo();
            self.emit(PresentationEvent::ComboChanged {
                combo: 0,
                success: false,
            });
            self.emit(PresentationEvent::PlaySound { cue: SoundCue::Hit });
            self.emit(PresentationEvent::PlayParticle { cue: ParticleCue::Hit });
            self.apply_damage(Side::Player, damage);
            TurnOutcome::Struck { attack, damage }
        };

        self.finish_turn(TurnKind::EnemyAttack, now);
        outcome
    }

    fn fail_feedback(&mut self) {
        self.state.break_combo();
        self.emit(PresentationEvent::ComboChanged {
            combo: 0,
            success: false,
        });
        self.emit(PresentationEvent::PlaySound { cue: SoundCue::Miss });
        self.emit(PresentationEvent::PlayParticle { cue: ParticleCue::Miss });
    }

    fn apply_damage(&mut self, side: Side, amount: f32) {
        if self.state.combatant_mut(side).apply_damage(amount) == DamageOutcome::Defeated {
            tracing::info!("{:?} defeated, health restored", side);
            self.emit(PresentationEvent::Defeated { side });
        }
        self.publish_health(side);
    }

    fn publish_health(&mut self, side: Side) {
        let combatant = self.state.combatant_mut(side);
        let event = PresentationEvent::HealthChanged {
            side,
            health: combatant.health,
            max: combatant.max_health,
        };
        self.emit(event);
    }

    fn finish_turn(&mut self, kind: TurnKind, now: Timestamp) {
        self.state.previous_turn = Some(kind);
        self.state.turns_played += 1;
        self.begin_next_turn(now);
    }

    fn begin_next_turn(&mut self, now: Timestamp) {
        let plan = self.selector.select(SelectionContext {
            opponent_health: self.state.opponent.health,
            previous_turn: self.state.previous_turn,
            previous_path: self.state.last_path,
        });
        self.turn_started_at = now;

        match plan {
            TurnPlan::PlayerAttack(path) => {
                let duration = self.config.turns.reaction_time;
                self.state.last_path = path;
                self.state.phase = TurnPhase::AwaitingPlayerAttack {
                    path,
                    deadline: now + duration,
                };
                self.emit(PresentationEvent::ShowAttackPath { path, duration });
            }
            TurnPlan::EnemyAttack(attack) => {
                let duration = self.config.turns.enemy_attack_delay;
                self.state.phase = TurnPhase::AwaitingEnemyAttackResolution {
                    attack,
                    deadline: now + duration,
                };
                self.emit(PresentationEvent::ShowIncomingAttack { attack, duration });
            }
        }
    }

    fn emit(&mut self, event: PresentationEvent) {
        self.sink.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::presentation::EventLog;
    use crate::core::config::TurnConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn player_only_config() -> CombatConfig {
        let mut config = CombatConfig::default();
        config.turns = TurnConfig {
            enemy_attacks_enabled: false,
            ..TurnConfig::default()
        };
        config
    }

    fn battle(config: CombatConfig) -> Battle<ChaCha8Rng, EventLog> {
        let selector = PatternSelector::new(ChaCha8Rng::seed_from_u64(3), config.turns.clone());
        Battle::new(config, selector, EventLog::new()).unwrap()
    }

    fn slash(hand: Hand, x: f32, y: f32, at: Timestamp) -> HandGesture {
        HandGesture {
            hand,
            gesture: Gesture::Slash {
                direction: Vec2::new(x, y),
            },
            at,
        }
    }

    fn force_path(b: &mut Battle<ChaCha8Rng, EventLog>, path: AttackPath, deadline: Timestamp) {
        b.state.phase = TurnPhase::AwaitingPlayerAttack { path, deadline };
        b.state.last_path = path;
    }

    #[test]
    fn test_start_selects_a_turn() {
        let mut b = battle(player_only_config());
        assert!(!b.is_running());
        b.start(0.0);
        assert!(matches!(b.phase(), TurnPhase::AwaitingPlayerAttack { deadline, .. } if deadline == 3.0));
        assert!(b
            .sink()
            .events
            .iter()
            .any(|e| matches!(e, PresentationEvent::ShowAttackPath { duration, .. } if *duration == 3.0)));
    }

    #[test]
    fn test_perfect_left_hook_scores() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        force_path(&mut b, AttackPath::LeftHook, 3.0);

        let result = b.on_gesture(slash(Hand::Left, 10.0, 0.5, 1.0), 1.0);
        assert_eq!(
            result.outcome(),
            Some(TurnOutcome::Hit {
                path: AttackPath::LeftHook,
                grade: HitGrade::Perfect,
                damage: 15.0,
                combo: 1,
            })
        );
        assert_eq!(b.state().opponent.health, 85.0);
        assert_eq!(b.combo(), 1);
        // Next turn never repeats the path
        assert_ne!(b.phase().expected_path(), AttackPath::LeftHook);
    }

    #[test]
    fn test_combo_scales_damage() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        b.state.combo = 2;
        force_path(&mut b, AttackPath::Uppercut, 3.0);

        // Good grade: 40 degrees off vertical
        let result = b.on_gesture(slash(Hand::Right, 6.4, 7.7, 1.0), 1.0);
        // 10 + 3 * 2 - 2
        assert!(matches!(
            result.outcome(),
            Some(TurnOutcome::Hit { grade: HitGrade::Good, combo: 3, damage, .. }) if damage == 14.0
        ));
    }

    #[test]
    fn test_wrong_hand_is_ignored() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        b.state.combo = 4;
        force_path(&mut b, AttackPath::LeftHook, 3.0);

        let result = b.on_gesture(slash(Hand::Right, 10.0, 0.0, 1.0), 1.0);
        assert_eq!(result, Resolution::Waiting);
        assert_eq!(b.combo(), 4);
        assert_eq!(b.phase().expected_path(), AttackPath::LeftHook);
    }

    #[test]
    fn test_off_angle_is_ignored() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        b.state.combo = 1;
        force_path(&mut b, AttackPath::LeftHook, 3.0);

        // Rightward but mostly vertical (~84 degrees)
        let result = b.on_gesture(slash(Hand::Left, 1.0, -9.5, 1.0), 1.0);
        assert_eq!(result, Resolution::Waiting);
        assert_eq!(b.combo(), 1);
    }

    #[test]
    fn test_wrong_path_is_a_miss() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        b.state.combo = 3;
        force_path(&mut b, AttackPath::RightHook, 3.0);

        // Right hand uppercut instead of a right hook
        let result = b.on_gesture(slash(Hand::Right, 0.0, 10.0, 1.0), 1.0);
        assert_eq!(
            result.outcome(),
            Some(TurnOutcome::Missed {
                path: AttackPath::RightHook,
                reason: MissReason::WrongPath(AttackPath::Uppercut),
            })
        );
        assert_eq!(b.combo(), 0);
    }

    #[test]
    fn test_deadline_without_gesture_is_implicit_miss() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        b.state.combo = 5;
        force_path(&mut b, AttackPath::Uppercut, 3.0);

        assert_eq!(b.tick(2.9, &Posture::default()), Resolution::Waiting);
        let result = b.tick(3.1, &Posture::default());
        assert_eq!(
            result.outcome(),
            Some(TurnOutcome::Missed {
                path: AttackPath::Uppercut,
                reason: MissReason::Timeout,
            })
        );
        assert_eq!(b.combo(), 0);
        assert!(matches!(b.phase(), TurnPhase::AwaitingPlayerAttack { deadline, .. } if deadline > 3.1));
    }

    #[test]
    fn test_late_gesture_is_implicit_miss() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        force_path(&mut b, AttackPath::LeftHook, 3.0);
        let result = b.on_gesture(slash(Hand::Left, 10.0, 0.0, 3.5), 3.5);
        assert!(matches!(
            result.outcome(),
            Some(TurnOutcome::Missed { reason: MissReason::Timeout, .. })
        ));
    }

    #[test]
    fn test_gesture_from_before_turn_start_is_dropped() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        force_path(&mut b, AttackPath::LeftHook, 3.0);
        b.tick(3.5, &Posture::default());
        let phase = b.phase();
        let combo = b.combo();
        let events = b.sink().events.len();

        // A correct answer to the turn that already timed out
        let result = b.on_gesture(slash(Hand::Left, 10.0, 0.0, 2.9), 2.9);
        assert_eq!(result, Resolution::Waiting);
        assert_eq!(b.phase(), phase);
        assert_eq!(b.combo(), combo);
        assert_eq!(b.sink().events.len(), events);
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        force_path(&mut b, AttackPath::LeftHook, 3.0);
        b.tick(1.0, &Posture::default());

        // Older than the last tick but inside the turn: resolved at 1.0
        let result = b.on_gesture(slash(Hand::Left, 10.0, 0.0, 0.5), 0.5);
        assert!(result.outcome().is_some_and(|o| o.is_success()));
        assert!(matches!(b.phase(), TurnPhase::AwaitingPlayerAttack { deadline, .. } if deadline == 4.0));
    }

    #[test]
    fn test_jab_is_shown_but_never_scores() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        force_path(&mut b, AttackPath::LeftHook, 3.0);
        let jab = HandGesture {
            hand: Hand::Left,
            gesture: Gesture::Jab {
                position: Vec2::new(4.0, 2.0),
            },
            at: 1.0,
        };
        assert_eq!(b.on_gesture(jab, 1.0), Resolution::Waiting);
        assert!(b.sink().contains(&PresentationEvent::JabMarker {
            hand: Hand::Left,
            position: Vec2::new(4.0, 2.0),
            duration: 0.5,
        }));
    }

    #[test]
    fn test_cross_finisher_within_buffer() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        force_path(&mut b, AttackPath::CrossFinisher, 10.0);

        assert_eq!(b.on_gesture(slash(Hand::Left, 7.0, -7.0, 1.0), 1.0), Resolution::Progress);
        assert!(b.finisher().left_landed);
        assert_eq!(b.tick(1.5, &Posture::default()), Resolution::Waiting);

        let result = b.on_gesture(slash(Hand::Right, -7.0, -7.0, 1.99), 1.99);
        assert!(matches!(
            result.outcome(),
            Some(TurnOutcome::Hit { grade: HitGrade::Finisher, damage, .. }) if damage == 25.0
        ));
        assert_eq!(b.finisher(), CrossFinisherProgress::default());
    }

    #[test]
    fn test_cross_finisher_half_expires() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        b.state.combo = 2;
        force_path(&mut b, AttackPath::CrossFinisher, 10.0);

        b.on_gesture(slash(Hand::Left, 7.0, -7.0, 1.0), 1.0);
        let result = b.on_gesture(slash(Hand::Right, -7.0, -7.0, 2.01), 2.01);
        assert_eq!(result, Resolution::FinisherBroken);
        assert_eq!(b.finisher(), CrossFinisherProgress::default());
        assert_eq!(b.combo(), 0);
        // Still the same turn
        assert_eq!(b.phase().expected_path(), AttackPath::CrossFinisher);
    }

    #[test]
    fn test_cross_finisher_expiry_on_tick() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        force_path(&mut b, AttackPath::CrossFinisher, 10.0);

        b.on_gesture(slash(Hand::Right, -7.0, -7.0, 1.0), 1.0);
        assert_eq!(b.tick(2.5, &Posture::default()), Resolution::FinisherBroken);
        assert!(b.sink().contains(&PresentationEvent::ShowAttackPath {
            path: AttackPath::CrossFinisher,
            duration: 7.5,
        }));
    }

    #[test]
    fn test_enemy_attack_defended_and_struck() {
        let mut config = CombatConfig::default();
        config.turns.player_attack_chance = 0;
        let mut b = battle(config);
        b.start(0.0);
        b.state.phase = TurnPhase::AwaitingEnemyAttackResolution {
            attack: IncomingAttack::Up,
            deadline: 2.0,
        };
        b.state.combo = 1;

        assert_eq!(b.tick(1.0, &Posture::default()), Resolution::Waiting);
        let guard = Posture {
            blocking_left: true,
            blocking_right: true,
            crouching: false,
        };
        let result = b.tick(2.0, &guard);
        assert_eq!(
            result.outcome(),
            Some(TurnOutcome::Defended {
                attack: IncomingAttack::Up,
                combo: 2,
            })
        );
        // Enemy turns never come back to back
        assert!(matches!(b.phase(), TurnPhase::AwaitingPlayerAttack { .. }));

        b.state.phase = TurnPhase::AwaitingEnemyAttackResolution {
            attack: IncomingAttack::Left,
            deadline: 4.0,
        };
        let result = b.tick(4.0, &Posture::default());
        assert!(matches!(result.outcome(), Some(TurnOutcome::Struck { .. })));
        assert_eq!(b.combo(), 0);
        assert_eq!(b.state().player.health, 2.0);
    }

    #[test]
    fn test_opponent_defeat_resets_health() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        b.state.opponent.health = 5.0;
        force_path(&mut b, AttackPath::LeftHook, 3.0);

        b.on_gesture(slash(Hand::Left, 10.0, 0.0, 1.0), 1.0);
        assert_eq!(b.state().opponent.health, 100.0);
        assert_eq!(b.state().opponent.defeats, 1);
        assert!(b.sink().contains(&PresentationEvent::Defeated {
            side: Side::Opponent
        }));
    }

    #[test]
    fn test_stopped_battle_ignores_input() {
        let mut b = battle(player_only_config());
        b.start(0.0);
        force_path(&mut b, AttackPath::LeftHook, 3.0);
        b.stop();
        assert_eq!(b.on_gesture(slash(Hand::Left, 10.0, 0.0, 1.0), 1.0), Resolution::Waiting);
        assert_eq!(b.tick(10.0, &Posture::default()), Resolution::Waiting);
        assert_eq!(b.phase(), TurnPhase::Idle);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = CombatConfig::default();
        config.jab.window = -1.0;
        let selector = PatternSelector::new(ChaCha8Rng::seed_from_u64(0), config.turns.clone());
        assert!(Battle::new(config, selector, EventLog::new()).is_err());
    }
}
