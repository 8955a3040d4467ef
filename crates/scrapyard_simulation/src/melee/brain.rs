//! Melee brain (Tetrapakstein): Idle / Chase / Attack / Cooldown / Stunned
//!
//! Чистая логика без ECS: система кормит `MeleeSenses`, читает обратно
//! вошедшие состояния, facing и флаги swing-а.

use bevy::prelude::*;

use crate::animation::SwingMarker;
use crate::melee::config::MeleeConfig;
use crate::physics::Aabb2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum MeleeState {
    #[default]
    Idle,
    Chase,
    Attack,
    Cooldown,
    Stunned,
}

/// Почему атака не началась (отладка)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum WhyNotAttacking {
    #[default]
    Ok,
    NotInFront,
    OutsideBox,
    Cooldown,
    Unknown,
}

/// Результат проверки "можно бить"
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackCheck {
    pub can_attack: bool,
    pub in_front: bool,
    pub overlap: bool,
    pub detection_box: Aabb2,
    pub why: WhyNotAttacking,
}

/// Один замах
///
/// Invariants:
/// - `attack_facing` фиксируется на старте и не меняется до конца
/// - `hit_this_swing` → больше попаданий в этом замахе нет
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct AttackSwing {
    pub in_progress: bool,
    /// Hitbox включён
    pub active: bool,
    pub hit_this_swing: bool,
    pub attack_facing: f32,
    /// Оставшееся время timed swing
    pub phase_timer: f32,
}

impl Default for AttackSwing {
    fn default() -> Self {
        Self {
            in_progress: false,
            active: false,
            hit_this_swing: false,
            attack_facing: 1.0,
            phase_timer: 0.0,
        }
    }
}

/// Что brain видит в этом тике
#[derive(Debug, Clone, Copy)]
pub struct MeleeSenses {
    pub position: Vec2,
    pub player_position: Vec2,
    pub player_bounds: Aabb2,
    pub stunned: bool,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct MeleeBrain {
    pub config: MeleeConfig,
    state: MeleeState,
    /// Куда смотрит (±1), следит за игроком вне атаки
    direction: f32,
    cooldown_timer: f32,
    swing: AttackSwing,
    was_stunned: bool,
    frozen: bool,
    why_not: WhyNotAttacking,
    /// Состояния, в которые вошли за текущий тик (для animation requests)
    #[reflect(ignore)]
    entered: Vec<MeleeState>,
}

impl Default for MeleeBrain {
    fn default() -> Self {
        Self::new(MeleeConfig::default())
    }
}

impl MeleeBrain {
    pub fn new(config: MeleeConfig) -> Self {
        Self {
            config,
            state: MeleeState::Idle,
            direction: -1.0,
            cooldown_timer: 0.0,
            swing: AttackSwing::default(),
            was_stunned: false,
            frozen: false,
            why_not: WhyNotAttacking::Ok,
            entered: Vec::new(),
        }
    }

    pub fn state(&self) -> MeleeState {
        self.state
    }

    pub fn swing(&self) -> &AttackSwing {
        &self.swing
    }

    pub fn cooldown_timer(&self) -> f32 {
        self.cooldown_timer
    }

    pub fn why_not(&self) -> WhyNotAttacking {
        self.why_not
    }

    /// Горизонталь заморожена на время замаха
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn take_entered_states(&mut self) -> Vec<MeleeState> {
        std::mem::take(&mut self.entered)
    }

    /// Facing, который видят hitbox, attack origin и спрайт
    pub fn current_facing(&self) -> f32 {
        if self.state == MeleeState::Attack && self.config.lock_facing_during_attack {
            self.swing.attack_facing
        } else {
            self.direction
        }
    }

    fn mirrored(offset: Vec2, facing: f32) -> Vec2 {
        Vec2::new(offset.x.abs() * facing, offset.y)
    }

    pub fn attack_origin(&self, position: Vec2) -> Vec2 {
        position + Self::mirrored(self.config.attack_origin_offset, self.current_facing())
    }

    pub fn hitbox(&self, position: Vec2) -> Aabb2 {
        Aabb2::from_center(
            position + Self::mirrored(self.config.hitbox_offset, self.current_facing()),
            self.config.hitbox_half_extents,
        )
    }

    pub fn evaluate_attack(&self, origin: Vec2, player_position: Vec2, player_bounds: &Aabb2) -> AttackCheck {
        let dir = self.direction;
        let center = origin + Vec2::new(dir * self.config.detection_forward_distance(), 0.0);
        let detection_box = Aabb2::from_center(
            center,
            Vec2::new(self.config.attack_range * 0.5, self.config.vertical_tolerance),
        );

        let in_front = (player_position.x - origin.x) * dir > 0.0;
        let overlap = detection_box.overlaps(player_bounds);
        let cooldown_ok = !self.config.require_cooldown_ok || self.cooldown_timer <= 0.0;
        let can_attack = (!self.config.require_front || in_front) && overlap && cooldown_ok;

        let why = if can_attack {
            WhyNotAttacking::Ok
        } else if self.config.require_front && !in_front {
            WhyNotAttacking::NotInFront
        } else if !overlap {
            WhyNotAttacking::OutsideBox
        } else if !cooldown_ok {
            WhyNotAttacking::Cooldown
        } else {
            WhyNotAttacking::Unknown
        };

        AttackCheck {
            can_attack,
            in_front,
            overlap,
            detection_box,
            why,
        }
    }

    fn set_state(&mut self, state: MeleeState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.entered.push(state);
    }

    fn begin_attack(&mut self) {
        self.swing.in_progress = true;
        self.swing.active = false;
        self.swing.hit_this_swing = false;
        self.swing.attack_facing = self.direction;
        self.frozen = self.config.freeze_body_during_attack;
        if !self.config.use_events {
            self.swing.phase_timer = self.config.swing_duration();
        }
        self.set_state(MeleeState::Attack);
    }

    fn cancel_attack(&mut self) {
        self.swing.in_progress = false;
        self.swing.active = false;
        self.swing.hit_this_swing = false;
        self.frozen = false;
    }

    fn end_attack(&mut self) {
        self.swing.active = false;
        self.swing.in_progress = false;
        self.swing.hit_this_swing = false;
        self.cooldown_timer = self.config.attack_cooldown;
        self.frozen = false;
        self.set_state(MeleeState::Cooldown);
    }

    /// Вход в stun: swing отменяется сразу (в том же тике)
    pub fn enter_stun(&mut self) {
        if !self.was_stunned {
            self.cancel_attack();
        }
        self.was_stunned = true;
        self.set_state(MeleeState::Stunned);
    }

    /// Маркеры из анимации (только event-driven swing)
    pub fn on_swing_marker(&mut self, marker: SwingMarker) {
        match marker {
            SwingMarker::HitOn => {
                if self.config.use_events && self.swing.in_progress {
                    self.swing.active = true;
                }
            }
            SwingMarker::HitOff => {
                if self.config.use_events {
                    self.swing.active = false;
                }
            }
            SwingMarker::End => {
                if self.swing.in_progress {
                    self.end_attack();
                }
            }
        }
    }

    /// Попадание зарегистрировано (hit check сам проверяет facing / invuln)
    pub fn register_hit(&mut self) {
        self.swing.hit_this_swing = true;
    }

    pub fn can_hit(&self) -> bool {
        self.swing.active && !self.swing.hit_this_swing
    }

    pub fn tick(&mut self, senses: &MeleeSenses, delta: f32) {
        let origin = self.attack_origin(senses.position);
        let dx = senses.player_position.x - origin.x;
        let distance = senses.player_position.distance(origin);

        if !(self.state == MeleeState::Attack && self.config.lock_facing_during_attack) {
            self.direction = if dx >= 0.0 { 1.0 } else { -1.0 };
        }

        if senses.stunned {
            self.enter_stun();
            return;
        } else if self.was_stunned {
            self.was_stunned = false;
            self.cooldown_timer = 0.0;
            self.set_state(if distance <= self.config.detect_radius {
                MeleeState::Chase
            } else {
                MeleeState::Idle
            });
        }

        match self.state {
            MeleeState::Idle => {
                if distance <= self.config.detect_radius {
                    self.set_state(MeleeState::Chase);
                }
            }
            MeleeState::Chase => {
                if distance > self.config.leave_radius() {
                    self.set_state(MeleeState::Idle);
                    return;
                }
                let check = self.evaluate_attack(origin, senses.player_position, &senses.player_bounds);
                self.why_not = check.why;
                if check.can_attack && !self.swing.in_progress && self.cooldown_timer <= 0.0 {
                    self.begin_attack();
                }
            }
            MeleeState::Attack => {
                if self.config.use_events {
                    return;
                }
                self.swing.phase_timer -= delta;
                let remaining = self.swing.phase_timer.clamp(0.0, self.config.swing_duration());
                self.swing.active =
                    remaining <= self.config.active + self.config.recover && remaining > self.config.recover;
                if remaining <= 0.0 {
                    self.end_attack();
                }
            }
            MeleeState::Cooldown => {
                if distance > self.config.leave_radius() {
                    self.set_state(MeleeState::Idle);
                    return;
                }
                self.cooldown_timer -= delta;
                if self.cooldown_timer <= 0.0 {
                    let check = self.evaluate_attack(origin, senses.player_position, &senses.player_bounds);
                    self.why_not = check.why;
                    if check.can_attack && !self.swing.in_progress {
                        self.begin_attack();
                    } else {
                        self.set_state(MeleeState::Chase);
                    }
                }
            }
            MeleeState::Stunned => {}
        }
    }

    /// Горизонтальная скорость по состоянию
    pub fn desired_velocity_x(&self, stunned: bool) -> f32 {
        if stunned {
            return 0.0;
        }
        match self.state {
            MeleeState::Chase | MeleeState::Cooldown => self.direction * self.config.chase_speed,
            _ => 0.0,
        }
    }
}
