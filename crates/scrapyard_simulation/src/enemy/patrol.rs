//! Patrol capability: ходьба туда-обратно, развороты у стен и краёв,
//! anti-stuck, cooldown-ы разворота и post-hit.
//!
//! Общая для всех наземных врагов; melee brain использует только таймеры
//! и latch, движением управляет сам.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Facing;
use crate::physics::PatrolSensor;

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    pub move_speed: f32,
    pub edge_check_distance: f32,
    pub wall_check_distance: f32,
    /// |vx| выше порога → анимация бега
    pub run_threshold: f32,
    pub flip_cooldown: f32,
    pub stuck_flip_time: f32,
    pub stuck_speed_eps: f32,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            move_speed: 2.5,
            edge_check_distance: 0.28,
            wall_check_distance: 0.14,
            run_threshold: 0.05,
            flip_cooldown: 0.3,
            stuck_flip_time: 0.6,
            stuck_speed_eps: 0.02,
        }
    }
}

/// Patrol state
///
/// Invariants:
/// - разворот (кроме flip-away) только при `flip_timer <= 0`
/// - пока `blocked_until_exit` задан, обычные развороты и anti-stuck запрещены
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Patrol {
    pub config: PatrolConfig,
    flip_timer: f32,
    post_hit_timer: f32,
    stuck_timer: f32,
    blocked_until_exit: Option<Entity>,
}

impl Patrol {
    pub fn new(config: PatrolConfig) -> Self {
        Self { config, ..default() }
    }

    pub fn flip_timer(&self) -> f32 {
        self.flip_timer
    }

    pub fn flip_ready(&self) -> bool {
        self.flip_timer <= 0.0
    }

    pub fn in_post_hit(&self) -> bool {
        self.post_hit_timer > 0.0
    }

    /// Может ли враг сейчас ранить игрока касанием
    pub fn can_hurt(&self, stunned: bool) -> bool {
        !stunned && !self.in_post_hit()
    }

    pub fn start_post_hit(&mut self, cooldown: f32) {
        self.post_hit_timer = cooldown;
    }

    pub fn blocked_until_exit(&self) -> Option<Entity> {
        self.blocked_until_exit
    }

    pub fn arm_exit_block(&mut self, collider: Entity) {
        self.blocked_until_exit = Some(collider);
    }

    /// Снимает latch только если вышли из того же коллайдера
    pub fn release_exit_block(&mut self, collider: Entity) -> bool {
        if self.blocked_until_exit == Some(collider) {
            self.blocked_until_exit = None;
            return true;
        }
        false
    }

    pub fn clear_exit_block(&mut self) {
        self.blocked_until_exit = None;
    }

    pub fn tick_cooldowns(&mut self, delta: f32) {
        if self.post_hit_timer > 0.0 {
            self.post_hit_timer -= delta;
        }
        if self.flip_timer > 0.0 {
            self.flip_timer -= delta;
        }
    }

    fn flip(&mut self, facing: &mut Facing) {
        facing.flip();
        self.flip_timer = self.config.flip_cooldown;
    }

    /// Anti-stuck: |vx| < eps (не stun, не post-hit) дольше stuck_flip_time → разворот
    pub fn update_stuck(&mut self, velocity_x: f32, stunned: bool, facing: &mut Facing, delta: f32) -> bool {
        if velocity_x.abs() >= self.config.stuck_speed_eps || stunned || self.in_post_hit() {
            self.stuck_timer = 0.0;
            return false;
        }

        self.stuck_timer += delta;
        if self.stuck_timer >= self.config.stuck_flip_time && self.flip_ready() && self.blocked_until_exit.is_none() {
            self.flip(facing);
            self.stuck_timer = 0.0;
            return true;
        }
        false
    }

    /// Разворот от стены / края платформы
    pub fn decide_turn(&mut self, sensor: &PatrolSensor, facing: &mut Facing) -> bool {
        if self.blocked_until_exit.is_some() || !self.flip_ready() || self.in_post_hit() {
            return false;
        }
        if sensor.wants_turn() {
            self.flip(facing);
            return true;
        }
        false
    }

    /// Отскок от игрока: facing = -dir_to_player, vx = -dir * max(speed, impulse)
    pub fn flip_away(&mut self, dir_to_player: f32, impulse_x: f32, facing: &mut Facing, velocity: &mut Vec2) -> bool {
        if !self.flip_ready() {
            return false;
        }
        *facing = Facing::from_dx(-dir_to_player);
        velocity.x = facing.sign() * self.config.move_speed.max(impulse_x);
        self.flip_timer = self.config.flip_cooldown;
        true
    }
}
