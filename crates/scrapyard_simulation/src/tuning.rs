//! Tuning документ: все настраиваемые параметры одним JSON
//!
//! Отсутствующие поля берут значения по умолчанию (`#[serde(default)]` на
//! каждом уровне). После загрузки документ валидируется; runtime код
//! дальше не проверяет tuning повторно.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::boss::BossConfig;
use crate::enemy::EnemyConfig;
use crate::melee::MeleeConfig;
use crate::player::PlayerTuning;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub standard_enemy: EnemyConfig,
    pub canned_soda: EnemyConfig,
    pub melee: MeleeConfig,
    pub boss: BossConfig,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: PlayerTuning::default(),
            standard_enemy: EnemyConfig::standard(),
            canned_soda: EnemyConfig::canned_soda(),
            melee: MeleeConfig::default(),
            boss: BossConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field}: min {min} > max {max}")]
    InvertedRange { field: &'static str, min: f32, max: f32 },
    #[error("{field}: must be > 0 (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field}: must be >= 0 (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("{field}: must be in [0, 1] (got {value})")]
    OutOfUnitRange { field: &'static str, value: f32 },
}

fn check_range(field: &'static str, min: f32, max: f32) -> Result<(), TuningError> {
    if min > max {
        return Err(TuningError::InvertedRange { field, min, max });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if !(value > 0.0) {
        return Err(TuningError::NonPositive { field, value });
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    if !(value >= 0.0) {
        return Err(TuningError::Negative { field, value });
    }
    Ok(())
}

fn check_unit(field: &'static str, value: f32) -> Result<(), TuningError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(TuningError::OutOfUnitRange { field, value });
    }
    Ok(())
}

fn validate_enemy(prefix: EnemyFields, config: &EnemyConfig) -> Result<(), TuningError> {
    check_non_negative(prefix.move_speed, config.patrol.move_speed)?;
    check_non_negative(prefix.flip_cooldown, config.patrol.flip_cooldown)?;
    check_positive(prefix.stun_duration, config.contact.stun_duration)?;
    check_non_negative(prefix.execute_range, config.execute.execute_range)?;
    check_range(
        prefix.side_speed,
        config.drop_throw.side_speed_min,
        config.drop_throw.side_speed_max,
    )?;
    check_range(prefix.up_speed, config.drop_throw.up_speed_min, config.drop_throw.up_speed_max)?;
    Ok(())
}

/// Имена полей для сообщений (у двух пресетов разные префиксы)
#[derive(Clone, Copy)]
struct EnemyFields {
    move_speed: &'static str,
    flip_cooldown: &'static str,
    stun_duration: &'static str,
    execute_range: &'static str,
    side_speed: &'static str,
    up_speed: &'static str,
}

const STANDARD_FIELDS: EnemyFields = EnemyFields {
    move_speed: "standard_enemy.patrol.move_speed",
    flip_cooldown: "standard_enemy.patrol.flip_cooldown",
    stun_duration: "standard_enemy.contact.stun_duration",
    execute_range: "standard_enemy.execute.execute_range",
    side_speed: "standard_enemy.drop_throw.side_speed",
    up_speed: "standard_enemy.drop_throw.up_speed",
};

const CANNED_SODA_FIELDS: EnemyFields = EnemyFields {
    move_speed: "canned_soda.patrol.move_speed",
    flip_cooldown: "canned_soda.patrol.flip_cooldown",
    stun_duration: "canned_soda.contact.stun_duration",
    execute_range: "canned_soda.execute.execute_range",
    side_speed: "canned_soda.drop_throw.side_speed",
    up_speed: "canned_soda.drop_throw.up_speed",
};

impl Tuning {
    /// Parse + validate
    pub fn from_json(text: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(text)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Первая найденная ошибка (порядок: player, враги, melee, boss)
    pub fn validate(&self) -> Result<(), TuningError> {
        let player = &self.player;
        check_positive("player.locomotion.move_speed", player.locomotion.move_speed)?;
        check_non_negative("player.locomotion.coyote_time", player.locomotion.coyote_time)?;
        check_non_negative("player.locomotion.jump_buffer_time", player.locomotion.jump_buffer_time)?;
        check_positive("player.stun.default_stun_time", player.stun.default_stun_time)?;
        check_non_negative("player.stun.invuln_after_stun", player.stun.invuln_after_stun)?;

        validate_enemy(STANDARD_FIELDS, &self.standard_enemy)?;
        validate_enemy(CANNED_SODA_FIELDS, &self.canned_soda)?;

        let melee = &self.melee;
        check_positive("melee.detect_radius", melee.detect_radius)?;
        check_positive("melee.attack_range", melee.attack_range)?;
        check_non_negative("melee.attack_cooldown", melee.attack_cooldown)?;
        check_non_negative("melee.windup", melee.windup)?;
        check_positive("melee.active", melee.active)?;
        check_non_negative("melee.recover", melee.recover)?;
        check_positive("melee.player_stun_time", melee.player_stun_time)?;

        let boss = &self.boss;
        check_positive("boss.max_hp", boss.max_hp as f32)?;
        check_unit("boss.furious_threshold", boss.furious_threshold)?;
        check_range("boss.idle", boss.idle_min, boss.idle_max)?;
        check_non_negative("boss.idle_min", boss.idle_min)?;
        check_positive("boss.attack_duration", boss.attack_duration)?;
        check_range("boss.debris_speed", boss.debris_speed_min, boss.debris_speed_max)?;
        check_positive("boss.debris_speed_max", boss.debris_speed_max)?;
        check_range("boss.flight_time", boss.flight_time_min, boss.flight_time_max)?;
        check_positive("boss.flight_time_min", boss.flight_time_min)?;
        check_non_negative("boss.aim_noise_angle", boss.aim_noise_angle)?;
        check_positive("boss.debris_life", boss.debris_life)?;
        check_unit("boss.spawn_chance", boss.spawn_chance)?;
        check_positive("boss.player_stun_time", boss.player_stun_time)?;

        Ok(())
    }
}
