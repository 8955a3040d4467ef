//! Player locomotion: ускорение по горизонтали, прыжок с coyote time и
//! буфером, гравитация с fall multiplier и jump cut.
//!
//! Логика разбита на две чистые фазы (удобно тестировать без ECS):
//! - `update_timers` — grounded/coyote/buffer/edge флаги
//! - `integrate` — новая velocity за fixed tick

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::player::input::PlayerInput;

/// Что делать с горизонтальной скоростью пока движение заблокировано
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum StunnedHorizontal {
    /// Input = 0, скорость гасится обычным decel
    #[default]
    Decelerate,
    SnapToZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub move_speed: f32,
    pub ground_accel: f32,
    pub ground_decel: f32,
    /// Разворот на земле (input против текущей скорости)
    pub turn_accel: f32,
    pub air_accel: f32,
    pub air_decel: f32,
    pub jump_speed: f32,
    /// Отрицательная (m/s²)
    pub gravity: f32,
    pub fall_multiplier: f32,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    /// Дистанция box cast вниз
    pub ground_check: f32,
    /// Однокадровая потеря контакта не сбрасывает grounded
    pub ground_grace: f32,
    pub blocked_horizontal: StunnedHorizontal,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            move_speed: 45.0,
            ground_accel: 600.0,
            ground_decel: 600.0,
            turn_accel: 900.0,
            air_accel: 280.0,
            air_decel: 240.0,
            jump_speed: 20.0,
            gravity: -30.0,
            fall_multiplier: 3.0,
            coyote_time: 0.1,
            jump_buffer_time: 0.1,
            ground_check: 0.1,
            ground_grace: 0.08,
            blocked_horizontal: StunnedHorizontal::Decelerate,
        }
    }
}

/// Причины блокировки движения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum BlockReason {
    Stun,
    Build,
    Landing,
}

impl BlockReason {
    fn index(self) -> usize {
        match self {
            BlockReason::Stun => 0,
            BlockReason::Build => 1,
            BlockReason::Landing => 2,
        }
    }
}

/// Счётчики блокировок по причинам
///
/// Unblock одной причины не снимает блок другой (stun не отпускает build).
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct MovementBlocks {
    counts: [u32; 3],
}

impl MovementBlocks {
    pub fn block(&mut self, reason: BlockReason) {
        self.counts[reason.index()] += 1;
    }

    pub fn unblock(&mut self, reason: BlockReason) {
        let count = &mut self.counts[reason.index()];
        *count = count.saturating_sub(1);
    }

    /// Снять все блоки одной причины
    pub fn clear(&mut self, reason: BlockReason) {
        self.counts[reason.index()] = 0;
    }

    pub fn is_blocked_by(&self, reason: BlockReason) -> bool {
        self.counts[reason.index()] > 0
    }

    pub fn is_blocked(&self) -> bool {
        self.counts.iter().any(|c| *c > 0)
    }
}

/// Состояние locomotion игрока
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PlayerLocomotion {
    pub config: LocomotionConfig,
    /// Эффективный horizontal input этого тика (0 если заблокировано)
    pub input_x: f32,
    pub grounded_raw: bool,
    grace_timer: f32,
    coyote_timer: f32,
    jump_buffer_timer: f32,
    jump_requested: bool,
    jump_cut: bool,
    can_move: bool,
}

impl PlayerLocomotion {
    pub fn new(config: LocomotionConfig) -> Self {
        Self {
            config,
            can_move: true,
            ..default()
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded_raw || self.grace_timer > 0.0
    }

    pub fn coyote_timer(&self) -> f32 {
        self.coyote_timer
    }

    pub fn jump_buffer_timer(&self) -> f32 {
        self.jump_buffer_timer
    }

    pub fn jump_requested(&self) -> bool {
        self.jump_requested
    }

    pub fn jump_cut_pending(&self) -> bool {
        self.jump_cut
    }

    /// Фаза 1: grounded, coyote, jump buffer, edge флаги input.
    /// `can_move == false` (stun или внешний блок) гасит input, буфер и pending jump.
    pub fn update_timers(&mut self, input: &PlayerInput, ground_contact: bool, can_move: bool, delta: f32) {
        self.can_move = can_move;

        self.grounded_raw = ground_contact;
        if ground_contact {
            self.grace_timer = self.config.ground_grace;
        } else {
            self.grace_timer = (self.grace_timer - delta).max(0.0);
        }

        self.input_x = if can_move { input.axis() } else { 0.0 };

        if self.is_grounded() {
            self.coyote_timer = self.config.coyote_time;
        } else {
            self.coyote_timer -= delta;
        }

        if !can_move {
            self.jump_buffer_timer = 0.0;
            self.jump_requested = false;
            self.jump_cut = false;
            return;
        }

        if input.jump_pressed {
            self.jump_buffer_timer = self.config.jump_buffer_time;
        } else {
            self.jump_buffer_timer -= delta;
        }
        if input.jump_released {
            self.jump_cut = true;
        }

        if self.jump_buffer_timer > 0.0 && self.coyote_timer > 0.0 {
            // Оба таймера расходуются атомарно
            self.jump_requested = true;
            self.jump_buffer_timer = 0.0;
            self.coyote_timer = 0.0;
        }
    }

    /// Stun пришёл после `update_timers` этого тика: input и pending jump
    /// этого тика больше не действуют, knockback остаётся в velocity.
    pub fn cancel_for_stun(&mut self) {
        self.can_move = false;
        self.input_x = 0.0;
        self.jump_buffer_timer = 0.0;
        self.jump_requested = false;
        self.jump_cut = false;
    }

    /// Фаза 2: новая velocity за fixed tick
    pub fn integrate(&mut self, velocity: Vec2, delta: f32) -> Vec2 {
        let config = &self.config;
        let mut velocity = velocity;

        if !self.can_move && config.blocked_horizontal == StunnedHorizontal::SnapToZero {
            velocity.x = 0.0;
        } else {
            let has_input = self.input_x.abs() > 0.01;
            let turning = has_input && velocity.x.abs() > 0.01 && self.input_x.signum() != velocity.x.signum();

            let accel = if self.is_grounded() {
                if turning {
                    config.turn_accel
                } else if has_input {
                    config.ground_accel
                } else {
                    config.ground_decel
                }
            } else if has_input {
                config.air_accel
            } else {
                config.air_decel
            };

            velocity.x = move_towards(velocity.x, self.input_x * config.move_speed, accel * delta);
        }

        if self.jump_requested {
            velocity.y = config.jump_speed;
            self.jump_requested = false;
            self.jump_cut = false;
        }

        velocity.y += config.gravity * delta;
        if velocity.y < 0.0 {
            velocity.y += config.gravity * (config.fall_multiplier - 1.0) * delta;
        }

        // Jump cut срабатывает один раз и только на подъёме
        if self.jump_cut {
            if velocity.y > 0.0 {
                velocity.y *= 0.5;
            }
            self.jump_cut = false;
        }

        velocity
    }
}

pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn grounded_locomotion() -> PlayerLocomotion {
        let mut locomotion = PlayerLocomotion::new(LocomotionConfig::default());
        locomotion.update_timers(&PlayerInput::default(), true, true, DT);
        locomotion
    }

    #[test]
    fn test_move_towards() {
        assert_eq!(move_towards(0.0, 10.0, 3.0), 3.0);
        assert_eq!(move_towards(9.0, 10.0, 3.0), 10.0);
        assert_eq!(move_towards(0.0, -10.0, 3.0), -3.0);
    }

    #[test]
    fn test_ground_accel_rate() {
        let mut locomotion = grounded_locomotion();
        let input = PlayerInput { axis_x: 1.0, ..default() };
        locomotion.update_timers(&input, true, true, DT);

        let velocity = locomotion.integrate(Vec2::ZERO, DT);
        // 600 * 1/60 = 10
        assert!((velocity.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_turn_accel_used_when_reversing() {
        let mut locomotion = grounded_locomotion();
        let input = PlayerInput { axis_x: -1.0, ..default() };
        locomotion.update_timers(&input, true, true, DT);

        let velocity = locomotion.integrate(Vec2::new(20.0, 0.0), DT);
        // 900 * 1/60 = 15
        assert!((velocity.x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_jump_consumes_both_timers() {
        let mut locomotion = grounded_locomotion();
        let input = PlayerInput { jump_pressed: true, ..default() };
        locomotion.update_timers(&input, true, true, DT);

        assert!(locomotion.jump_requested());
        assert_eq!(locomotion.coyote_timer(), 0.0);
        assert_eq!(locomotion.jump_buffer_timer(), 0.0);

        let velocity = locomotion.integrate(Vec2::ZERO, DT);
        assert!((velocity.y - (20.0 - 30.0 * DT)).abs() < 1e-4);
        assert!(!locomotion.jump_requested());
    }

    #[test]
    fn test_jump_buffer_fires_on_landing() {
        let mut locomotion = PlayerLocomotion::new(LocomotionConfig::default());
        // В воздухе, coyote давно истёк
        for _ in 0..20 {
            locomotion.update_timers(&PlayerInput::default(), false, true, DT);
        }
        let press = PlayerInput { jump_pressed: true, ..default() };
        locomotion.update_timers(&press, false, true, DT);
        assert!(!locomotion.jump_requested());

        // Через 3 тика (0.05s < буфер 0.1s) касаемся земли
        locomotion.update_timers(&PlayerInput::default(), false, true, DT);
        locomotion.update_timers(&PlayerInput::default(), false, true, DT);
        locomotion.update_timers(&PlayerInput::default(), true, true, DT);
        assert!(locomotion.jump_requested());
    }

    #[test]
    fn test_coyote_allows_late_jump() {
        let mut locomotion = grounded_locomotion();
        // Ушли с края 3 тика назад (grace 0.08 + coyote 0.1)
        for _ in 0..3 {
            locomotion.update_timers(&PlayerInput::default(), false, true, DT);
        }
        let press = PlayerInput { jump_pressed: true, ..default() };
        locomotion.update_timers(&press, false, true, DT);
        assert!(locomotion.jump_requested());
    }

    #[test]
    fn test_ground_grace_tolerates_single_frame_loss() {
        let mut locomotion = grounded_locomotion();
        locomotion.update_timers(&PlayerInput::default(), false, true, DT);
        assert!(locomotion.is_grounded());
        assert!(!locomotion.grounded_raw);
    }

    #[test]
    fn test_fall_multiplier() {
        let mut locomotion = PlayerLocomotion::new(LocomotionConfig::default());
        for _ in 0..20 {
            locomotion.update_timers(&PlayerInput::default(), false, true, DT);
        }
        let velocity = locomotion.integrate(Vec2::new(0.0, -1.0), DT);
        // -1 - 30*dt - 30*2*dt
        assert!((velocity.y - (-1.0 - 90.0 * DT)).abs() < 1e-4);
    }

    #[test]
    fn test_jump_cut_halves_once() {
        let mut locomotion = PlayerLocomotion::new(LocomotionConfig::default());
        for _ in 0..20 {
            locomotion.update_timers(&PlayerInput::default(), false, true, DT);
        }
        let release = PlayerInput { jump_released: true, ..default() };
        locomotion.update_timers(&release, false, true, DT);

        let velocity = locomotion.integrate(Vec2::new(0.0, 10.0), DT);
        assert!((velocity.y - (10.0 - 30.0 * DT) * 0.5).abs() < 1e-4);
        assert!(!locomotion.jump_cut_pending());

        // Следующий тик без повторного halving
        locomotion.update_timers(&PlayerInput::default(), false, true, DT);
        let next = locomotion.integrate(velocity, DT);
        assert!((next.y - (velocity.y - 30.0 * DT)).abs() < 1e-4);
    }

    #[test]
    fn test_blocked_clears_input_and_buffer() {
        let mut locomotion = grounded_locomotion();
        let input = PlayerInput {
            axis_x: 1.0,
            jump_pressed: true,
            jump_released: true,
            ..default()
        };
        locomotion.update_timers(&input, true, false, DT);

        assert_eq!(locomotion.input_x, 0.0);
        assert_eq!(locomotion.jump_buffer_timer(), 0.0);
        assert!(!locomotion.jump_requested());
        assert!(!locomotion.jump_cut_pending());

        // Decelerate: 8 → 0 за один тик (decel 10/tick), гравитация работает
        let velocity = locomotion.integrate(Vec2::new(8.0, 0.0), DT);
        assert_eq!(velocity.x, 0.0);
        assert!(velocity.y < 0.0);
    }

    #[test]
    fn test_cancel_for_stun_drops_pending_jump() {
        let mut locomotion = grounded_locomotion();
        let input = PlayerInput {
            axis_x: 1.0,
            jump_pressed: true,
            ..default()
        };
        locomotion.update_timers(&input, true, true, DT);
        assert!(locomotion.jump_requested());

        locomotion.cancel_for_stun();
        assert!(!locomotion.jump_requested());
        assert_eq!(locomotion.input_x, 0.0);

        // Knockback гасится только decel, input против него не разгоняет
        let velocity = locomotion.integrate(Vec2::new(-8.0, 6.0), DT);
        assert!(velocity.x <= 0.0);
        assert!((velocity.y - (6.0 - 30.0 * DT)).abs() < 1e-4);
    }

    #[test]
    fn test_snap_to_zero_when_blocked() {
        let config = LocomotionConfig {
            blocked_horizontal: StunnedHorizontal::SnapToZero,
            air_decel: 1.0,
            ..default()
        };
        let mut locomotion = PlayerLocomotion::new(config);
        locomotion.update_timers(&PlayerInput::default(), false, false, DT);
        let velocity = locomotion.integrate(Vec2::new(30.0, 0.0), DT);
        assert_eq!(velocity.x, 0.0);
    }

    #[test]
    fn test_movement_blocks_per_reason() {
        let mut blocks = MovementBlocks::default();
        blocks.block(BlockReason::Build);
        blocks.block(BlockReason::Stun);
        blocks.unblock(BlockReason::Stun);

        assert!(blocks.is_blocked());
        assert!(blocks.is_blocked_by(BlockReason::Build));

        blocks.unblock(BlockReason::Build);
        blocks.unblock(BlockReason::Build); // saturating
        assert!(!blocks.is_blocked());
    }
}
