//! Combat configuration loaded from TOML
//!
//! Every tunable number of a match lives here: detector windows and
//! thresholds, turn pacing, damage values and per-path hit angles.
//! Configuration is static for the lifetime of a match and is validated
//! once, up front. An invalid config is the only fatal condition in the core.

use crate::core::error::{Result, SparringError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default location of the shipped configuration
pub const DEFAULT_CONFIG_PATH: &str = "data/combat.toml";

/// Jab detector tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JabConfig {
    /// Time window (seconds) over which wrist samples are kept
    pub window: f64,
    /// Minimum wrist speed relative to the elbow, in inches/second
    pub speed_threshold: f32,
    /// Detections are suspended for this long (seconds) after a jab
    pub cooldown: f64,
    /// Wrist must end within this distance of the elbow (inches)
    ///
    /// A wide swing travels fast too; this keeps it from reading as a jab.
    pub max_distance_from_elbow: f32,
}

impl Default for JabConfig {
    fn default() -> Self {
        Self {
            window: 0.2,
            speed_threshold: 60.0,
            cooldown: 0.5,
            max_distance_from_elbow: 10.0,
        }
    }
}

/// Slash detector tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlashConfig {
    /// Time window (seconds) over which wrist samples are kept
    pub window: f64,
    /// Minimum swing speed, in inches/second
    pub speed_threshold: f32,
    /// Detections are suspended for this long (seconds) after a slash
    pub cooldown: f64,
}

impl Default for SlashConfig {
    fn default() -> Self {
        Self {
            window: 0.25,
            speed_threshold: 45.0,
            cooldown: 0.4,
        }
    }
}

/// Defensive posture tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostureConfig {
    /// Nose drop below the standing baseline (inches) that starts a crouch
    pub crouch_drop: f32,
    /// Nose drop (inches) above which a crouch is released
    ///
    /// Must be smaller than `crouch_drop` so the latch has hysteresis.
    pub crouch_release: f32,
}

impl Default for PostureConfig {
    fn default() -> Self {
        Self {
            crouch_drop: 6.0,
            crouch_release: 3.0,
        }
    }
}

/// Turn pacing and pattern selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    /// Percent chance (0-100) that a turn is a player-attack turn
    pub player_attack_chance: u32,
    /// When false every turn is a player-attack turn
    pub enemy_attacks_enabled: bool,
    /// Opponent health below which only cross finishers are requested
    pub desperation_threshold: f32,
    /// Seconds the player has to land the requested attack path
    pub reaction_time: f64,
    /// Seconds between announcing an enemy attack and it landing
    pub enemy_attack_delay: f64,
    /// Seconds both halves of a cross finisher must land within
    pub cross_finisher_buffer: f64,
    /// Redraws allowed when avoiding an immediately repeated path
    pub max_path_retries: u32,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            player_attack_chance: 70,
            enemy_attacks_enabled: true,
            desperation_threshold: 20.0,
            reaction_time: 3.0,
            enemy_attack_delay: 2.0,
            cross_finisher_buffer: 1.0,
            max_path_retries: 16,
        }
    }
}

/// Damage values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub good_damage: f32,
    pub perfect_damage: f32,
    pub finisher_damage: f32,
    /// Extra damage per combo step beyond the first
    pub combo_multiplier: f32,
    /// Damage the player takes from an undefended enemy attack
    pub enemy_attack_damage: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            good_damage: 10.0,
            perfect_damage: 15.0,
            finisher_damage: 25.0,
            combo_multiplier: 2.0,
            enemy_attack_damage: 1.0,
        }
    }
}

/// Starting (and reset) health for both combatants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub player_max: f32,
    pub opponent_max: f32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            player_max: 3.0,
            opponent_max: 100.0,
        }
    }
}

/// Angular window for one slash direction, in degrees
///
/// Angles are measured counter-clockwise from +x with y pointing up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleWindow {
    pub reference: f32,
    pub good_half_width: f32,
    pub perfect_half_width: f32,
}

impl AngleWindow {
    pub fn new(reference: f32, good_half_width: f32, perfect_half_width: f32) -> Self {
        Self {
            reference,
            good_half_width,
            perfect_half_width,
        }
    }
}

/// Hit angles for every slash the battle grades
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathAngles {
    pub left_hook: AngleWindow,
    pub right_hook: AngleWindow,
    pub uppercut: AngleWindow,
    /// Down-and-right half of the cross finisher
    pub cross_left: AngleWindow,
    /// Down-and-left half of the cross finisher
    pub cross_right: AngleWindow,
}

impl Default for PathAngles {
    fn default() -> Self {
        Self {
            left_hook: AngleWindow::new(0.0, 60.0, 20.0),
            right_hook: AngleWindow::new(180.0, 60.0, 20.0),
            uppercut: AngleWindow::new(90.0, 60.0, 20.0),
            cross_left: AngleWindow::new(-45.0, 45.0, 15.0),
            cross_right: AngleWindow::new(-135.0, 45.0, 15.0),
        }
    }
}

/// Complete match configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatConfig {
    #[serde(default)]
    pub jab: JabConfig,
    #[serde(default)]
    pub slash: SlashConfig,
    #[serde(default)]
    pub posture: PostureConfig,
    #[serde(default)]
    pub turns: TurnConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub paths: PathAngles,
}

impl CombatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: CombatConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        self.jab.validate()?;
        self.slash.validate()?;

        if !positive(self.posture.crouch_drop.into())
            || !non_negative(self.posture.crouch_release.into())
        {
            return Err(invalid("posture distances must be positive".into()));
        }
        if self.posture.crouch_release >= self.posture.crouch_drop {
            return Err(invalid(format!(
                "crouch_release ({}) must be < crouch_drop ({})",
                self.posture.crouch_release, self.posture.crouch_drop
            )));
        }

        let turns = &self.turns;
        if turns.player_attack_chance > 100 {
            return Err(invalid(format!(
                "player_attack_chance ({}) must be within 0..=100",
                turns.player_attack_chance
            )));
        }
        if !positive(turns.reaction_time)
            || !positive(turns.enemy_attack_delay)
            || !positive(turns.cross_finisher_buffer)
        {
            return Err(invalid("turn durations must be positive".into()));
        }
        if !turns.desperation_threshold.is_finite() {
            return Err(invalid(format!(
                "desperation_threshold ({}) must be finite",
                turns.desperation_threshold
            )));
        }

        let scoring = &self.scoring;
        if [
            scoring.good_damage,
            scoring.perfect_damage,
            scoring.finisher_damage,
            scoring.combo_multiplier,
            scoring.enemy_attack_damage,
        ]
        .into_iter()
        .any(|damage| !non_negative(damage.into()))
        {
            return Err(invalid("damage values must not be negative".into()));
        }

        if !positive(self.health.player_max.into()) || !positive(self.health.opponent_max.into()) {
            return Err(invalid("max health must be positive".into()));
        }

        for (name, window) in [
            ("left_hook", &self.paths.left_hook),
            ("right_hook", &self.paths.right_hook),
            ("uppercut", &self.paths.uppercut),
            ("cross_left", &self.paths.cross_left),
            ("cross_right", &self.paths.cross_right),
        ] {
            if !window.reference.is_finite() {
                return Err(invalid(format!(
                    "{name}: reference angle ({}) must be finite",
                    window.reference
                )));
            }
            if !positive(window.good_half_width.into()) || window.good_half_width > 180.0 {
                return Err(invalid(format!(
                    "{name}: good_half_width ({}) must be within (0, 180]",
                    window.good_half_width
                )));
            }
            if !non_negative(window.perfect_half_width.into())
                || window.perfect_half_width > window.good_half_width
            {
                return Err(invalid(format!(
                    "{name}: perfect_half_width ({}) must be within [0, good_half_width]",
                    window.perfect_half_width
                )));
            }
        }

        Ok(())
    }
}

impl JabConfig {
    pub fn validate(&self) -> Result<()> {
        if !positive(self.window) || !positive(self.cooldown) {
            return Err(invalid("jab window and cooldown must be positive".into()));
        }
        if !positive(self.speed_threshold.into()) || !positive(self.max_distance_from_elbow.into())
        {
            return Err(invalid(
                "jab speed_threshold and max_distance_from_elbow must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl SlashConfig {
    pub fn validate(&self) -> Result<()> {
        if !positive(self.window)
            || !positive(self.cooldown)
            || !positive(self.speed_threshold.into())
        {
            return Err(invalid(
                "slash window, cooldown and speed_threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Finite and strictly above zero; NaN and infinities fail
fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn invalid(message: String) -> SparringError {
    SparringError::InvalidConfiguration(message)
}

/// Load and validate a config from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<CombatConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    CombatConfig::from_toml_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CombatConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_shipped_config() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/combat.toml");
        let config = load_config(path).expect("Should load shipped config");
        assert_eq!(config.turns.player_attack_chance, 70);
        assert_eq!(config.jab.speed_threshold, 60.0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = CombatConfig::from_toml_str("[jab]\ncooldown = 0.75\n").unwrap();
        assert_eq!(config.jab.cooldown, 0.75);
        assert_eq!(config.jab.window, 0.2);
        assert_eq!(config.scoring.good_damage, 10.0);
    }

    #[test]
    fn test_non_positive_window_rejected() {
        let result = CombatConfig::from_toml_str("[jab]\nwindow = 0.0\n");
        assert!(matches!(result, Err(SparringError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_negative_cooldown_rejected() {
        let mut config = CombatConfig::default();
        config.slash.cooldown = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_perfect_wider_than_good_rejected() {
        let mut config = CombatConfig::default();
        config.paths.uppercut.perfect_half_width = 90.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chance_above_hundred_rejected() {
        let mut config = CombatConfig::default();
        config.turns.player_attack_chance = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_durations_rejected() {
        let result = CombatConfig::from_toml_str("[jab]\ncooldown = nan\n");
        assert!(matches!(result, Err(SparringError::InvalidConfiguration(_))));

        let result = CombatConfig::from_toml_str("[turns]\nreaction_time = nan\n");
        assert!(matches!(result, Err(SparringError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_infinite_values_rejected() {
        let result = CombatConfig::from_toml_str("[slash]\nwindow = inf\n");
        assert!(matches!(result, Err(SparringError::InvalidConfiguration(_))));

        let mut config = CombatConfig::default();
        config.turns.desperation_threshold = f32::INFINITY;
        assert!(config.validate().is_err());

        let mut config = CombatConfig::default();
        config.scoring.finisher_damage = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = CombatConfig::default();
        config.paths.left_hook.reference = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = CombatConfig::from_toml_str("[jab\nwindow = ");
        assert!(matches!(result, Err(SparringError::ConfigParse(_))));
    }
}
