//! Melee tuning

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Имена animator state-ов для melee врага
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeAnimStates {
    pub idle: String,
    pub run: String,
    pub attack: String,
    pub stunned: String,
    pub cross_fade: f32,
}

impl Default for MeleeAnimStates {
    fn default() -> Self {
        Self {
            idle: "Idle".into(),
            run: "Run".into(),
            attack: "Attack".into(),
            stunned: "Stunned".into(),
            cross_fade: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeConfig {
    pub chase_speed: f32,
    pub detect_radius: f32,
    pub attack_range: f32,
    pub vertical_tolerance: f32,
    pub attack_cooldown: f32,

    /// true → фазы удара двигают SwingSignal маркеры из анимации
    pub use_events: bool,
    pub windup: f32,
    pub active: f32,
    pub recover: f32,

    /// < 0 → attack_range / 2
    pub detection_forward: f32,
    pub require_front: bool,
    pub require_cooldown_ok: bool,
    pub lock_facing_during_attack: bool,
    pub freeze_body_during_attack: bool,

    /// Смещение attack origin от центра (x зеркалится по facing)
    pub attack_origin_offset: Vec2,
    /// Смещение hitbox от центра (x зеркалится по facing)
    pub hitbox_offset: Vec2,
    pub hitbox_half_extents: Vec2,

    pub player_stun_time: f32,
    pub hit_knockback: Vec2,

    pub anim: MeleeAnimStates,
}

impl Default for MeleeConfig {
    fn default() -> Self {
        Self {
            chase_speed: 3.2,
            detect_radius: 6.0,
            attack_range: 1.4,
            vertical_tolerance: 0.7,
            attack_cooldown: 0.6,
            use_events: false,
            windup: 0.25,
            active: 0.18,
            recover: 0.32,
            detection_forward: -1.0,
            require_front: true,
            require_cooldown_ok: true,
            lock_facing_during_attack: true,
            freeze_body_during_attack: true,
            attack_origin_offset: Vec2::ZERO,
            hitbox_offset: Vec2::new(0.7, 0.0),
            hitbox_half_extents: Vec2::new(0.45, 0.4),
            player_stun_time: 0.8,
            hit_knockback: Vec2::new(8.0, 6.0),
            anim: MeleeAnimStates::default(),
        }
    }
}

impl MeleeConfig {
    pub fn swing_duration(&self) -> f32 {
        self.windup + self.active + self.recover
    }

    pub fn leave_radius(&self) -> f32 {
        self.detect_radius * 1.2
    }

    pub fn detection_forward_distance(&self) -> f32 {
        if self.detection_forward >= 0.0 {
            self.detection_forward
        } else {
            self.attack_range * 0.5
        }
    }
}
