//! Stun компоненты: PlayerStun (stun + окно неуязвимости), EnemyStun (без окна)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Параметры stun игрока
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct StunConfig {
    /// Используется если запрошенная длительность <= 0
    pub default_stun_time: f32,
    /// Неуязвимость после окончания stun
    pub invuln_after_stun: f32,
    /// Fallback для нулевых компонент запрошенного knockback
    pub default_knockback: Vec2,
    /// Длительность hurt flash (для VFX наблюдателей)
    pub hurt_flash_time: f32,
}

impl Default for StunConfig {
    fn default() -> Self {
        Self {
            default_stun_time: 0.6,
            invuln_after_stun: 0.5,
            default_knockback: Vec2::new(8.0, 6.0),
            hurt_flash_time: 0.15,
        }
    }
}

/// Результат успешного ApplyStun
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedStun {
    pub duration: f32,
    pub knockback: Vec2,
    pub invulnerable_for: f32,
}

/// Результат выхода из stun
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recovery {
    pub elapsed: f32,
    pub planned: f32,
}

/// Stun игрока
///
/// Invariants:
/// - `re_stun_timer` наружу отдаётся как `max(0, timer)`
/// - пока `re_stun_timer > 0` новый stun отклоняется (в т.ч. во время stun)
/// - `re_stun_timer = stun_timer + invuln_after_stun` в момент применения
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PlayerStun {
    pub config: StunConfig,
    is_stunned: bool,
    stun_timer: f32,
    re_stun_timer: f32,
    planned_duration: f32,
    elapsed: f32,
}

impl Default for PlayerStun {
    fn default() -> Self {
        Self::new(StunConfig::default())
    }
}

impl PlayerStun {
    pub fn new(config: StunConfig) -> Self {
        Self {
            config,
            is_stunned: false,
            stun_timer: 0.0,
            re_stun_timer: 0.0,
            planned_duration: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn is_stunned(&self) -> bool {
        self.is_stunned
    }

    pub fn can_be_stunned(&self) -> bool {
        self.re_stun_timer <= 0.0
    }

    /// Оставшаяся неуязвимость, никогда не отрицательная
    pub fn restun_cooldown(&self) -> f32 {
        self.re_stun_timer.max(0.0)
    }

    pub fn stun_remaining(&self) -> f32 {
        if self.is_stunned {
            self.stun_timer.max(0.0)
        } else {
            0.0
        }
    }

    pub fn planned_duration(&self) -> f32 {
        self.planned_duration
    }

    /// Нулевые компоненты knockback заменяются дефолтными
    pub fn resolve_knockback(&self, knockback: Vec2) -> Vec2 {
        Vec2::new(
            if knockback.x != 0.0 { knockback.x } else { self.config.default_knockback.x },
            if knockback.y != 0.0 { knockback.y } else { self.config.default_knockback.y },
        )
    }

    /// ApplyStun(duration, knockback). `None` если игрок неуязвим.
    pub fn apply(&mut self, duration: f32, knockback: Vec2) -> Option<AppliedStun> {
        if !self.can_be_stunned() {
            return None;
        }

        self.is_stunned = true;
        self.planned_duration = if duration > 0.0 { duration } else { self.config.default_stun_time };
        self.stun_timer = self.planned_duration;
        self.re_stun_timer = self.stun_timer + self.config.invuln_after_stun;
        self.elapsed = 0.0;

        Some(AppliedStun {
            duration: self.planned_duration,
            knockback: self.resolve_knockback(knockback),
            invulnerable_for: self.re_stun_timer,
        })
    }

    /// ApplyStun(duration, dir_sign): knockback = (sign * default.x, default.y)
    pub fn apply_directional(&mut self, duration: f32, dir_sign: f32) -> Option<AppliedStun> {
        let sign = if dir_sign < 0.0 { -1.0 } else { 1.0 };
        let knockback = Vec2::new(sign * self.config.default_knockback.x, self.config.default_knockback.y);
        self.apply(duration, knockback)
    }

    /// Тик таймеров. Возвращает `Some` ровно в тик выхода из stun.
    pub fn tick(&mut self, delta: f32) -> Option<Recovery> {
        if self.re_stun_timer > 0.0 {
            self.re_stun_timer -= delta;
        }

        if !self.is_stunned {
            return None;
        }

        self.elapsed += delta;
        self.stun_timer -= delta;
        if self.stun_timer <= 0.0 {
            self.is_stunned = false;
            return Some(Recovery {
                elapsed: self.elapsed,
                planned: self.planned_duration,
            });
        }
        None
    }
}

/// Stun врага: только таймер, без окна неуязвимости (повторные stomp допустимы)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct EnemyStun {
    is_stunned: bool,
    stun_timer: f32,
    planned_duration: f32,
    elapsed: f32,
}

impl EnemyStun {
    pub fn is_stunned(&self) -> bool {
        self.is_stunned
    }

    pub fn remaining(&self) -> f32 {
        if self.is_stunned {
            self.stun_timer.max(0.0)
        } else {
            0.0
        }
    }

    /// Повторный stun перезапускает таймер. Возвращает true если это вход в stun.
    pub fn apply(&mut self, duration: f32) -> bool {
        let entered = !self.is_stunned;
        self.is_stunned = true;
        self.stun_timer = duration.max(0.0);
        self.planned_duration = self.stun_timer;
        if entered {
            self.elapsed = 0.0;
        }
        entered
    }

    pub fn tick(&mut self, delta: f32) -> Option<Recovery> {
        if !self.is_stunned {
            return None;
        }
        self.elapsed += delta;
        self.stun_timer -= delta;
        if self.stun_timer <= 0.0 {
            self.is_stunned = false;
            return Some(Recovery {
                elapsed: self.elapsed,
                planned: self.planned_duration,
            });
        }
        None
    }
}
