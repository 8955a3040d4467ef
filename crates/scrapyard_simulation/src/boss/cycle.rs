//! Boss Concreto: макро-цикл Idle(timer) → Attack(duration) → Idle
//!
//! Чистая логика без ECS: `tick` и `receive_damage` возвращают список
//! `BossEffect`, система превращает их в анимации, debris и события.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::animation::AnimatorSlot;
use crate::components::Health;
use crate::DeterministicRng;

/// Шанс "Bored" вместо "Idle" на входе в Idle
pub const BORED_CHANCE: f32 = 0.2;
/// Множитель idle таймера в furious
pub const FURIOUS_IDLE_SCALE: f32 = 0.8;
/// Order cue не позже чем за столько секунд до атаки
pub const MIN_ORDER_LEAD: f32 = 0.1;

/// Имена триггеров обоих аниматоров
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTriggers {
    pub excavator_idle: String,
    pub excavator_attack: String,
    pub concreto_idle: String,
    pub concreto_talking: String,
    pub concreto_order: String,
    pub concreto_hurt: String,
    pub concreto_furious: String,
    pub concreto_bored: String,
}

impl Default for BossTriggers {
    fn default() -> Self {
        Self {
            excavator_idle: "Idle".into(),
            excavator_attack: "Attack".into(),
            concreto_idle: "Idle".into(),
            concreto_talking: "Talking".into(),
            concreto_order: "Order".into(),
            concreto_hurt: "Hurt".into(),
            concreto_furious: "Furious".into(),
            concreto_bored: "Bored".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    // Health
    pub max_hp: u32,
    pub furious_threshold: f32,

    // Цикл
    pub idle_min: f32,
    pub idle_max: f32,
    pub pre_order_lead_time: f32,
    pub attack_duration: f32,
    pub volleys_per_attack: u32,

    // Debris (баллистика)
    pub debris_per_volley: u32,
    pub debris_speed_min: f32,
    pub debris_speed_max: f32,
    pub flight_time_min: f32,
    pub flight_time_max: f32,
    /// ±градусы
    pub aim_noise_angle: f32,
    pub debris_life: f32,
    pub debris_half_extents: Vec2,
    pub debris_gravity_scale: f32,
    /// Throw point относительно позиции босса
    pub throw_point_offset: Vec2,

    // Попадание в землю → spawn врага
    pub spawn_chance: f32,
    pub spawn_offset: Vec2,

    // Попадание в игрока → stun
    pub player_stun_time: f32,
    pub player_knockback: Vec2,

    pub body_half_extents: Vec2,
    pub triggers: BossTriggers,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            max_hp: 200,
            furious_threshold: 0.35,
            idle_min: 1.0,
            idle_max: 1.8,
            pre_order_lead_time: 3.0,
            attack_duration: 0.35,
            volleys_per_attack: 1,
            debris_per_volley: 1,
            debris_speed_min: 8.0,
            debris_speed_max: 12.0,
            flight_time_min: 0.55,
            flight_time_max: 1.10,
            aim_noise_angle: 6.0,
            debris_life: 6.0,
            debris_half_extents: Vec2::splat(0.25),
            debris_gravity_scale: 1.0,
            throw_point_offset: Vec2::new(-1.0, 2.0),
            spawn_chance: 0.35,
            spawn_offset: Vec2::new(0.0, 0.1),
            player_stun_time: 5.0,
            player_knockback: Vec2::new(6.0, 8.0),
            body_half_extents: Vec2::new(1.5, 1.5),
            triggers: BossTriggers::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum BossState {
    #[default]
    Idle,
    Attack,
    /// Терминальное
    Dead,
}

/// Что системе сделать по итогам tick / урона
#[derive(Debug, Clone, PartialEq)]
pub enum BossEffect {
    Trigger { slot: AnimatorSlot, name: String },
    SpawnVolleys { volleys: u32, debris_per_volley: u32 },
    HealthChanged { fraction: f32 },
    Died,
}

impl BossEffect {
    fn trigger(slot: AnimatorSlot, name: &str) -> Self {
        Self::Trigger {
            slot,
            name: name.to_string(),
        }
    }
}

/// Состояние цикла босса
///
/// Invariants:
/// - furious включается максимум один раз
/// - Dead терминальный: tick и урон больше ничего не делают
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct BossCycle {
    pub config: BossConfig,
    state: BossState,
    state_timer: f32,
    furious: bool,
    order_fired: bool,
    /// Первый tick входит в Idle (таймер + триггеры)
    started: bool,
}

impl Default for BossCycle {
    fn default() -> Self {
        Self::new(BossConfig::default())
    }
}

impl BossCycle {
    pub fn new(config: BossConfig) -> Self {
        Self {
            config,
            state: BossState::Idle,
            state_timer: 0.0,
            furious: false,
            order_fired: false,
            started: false,
        }
    }

    pub fn state(&self) -> BossState {
        self.state
    }

    pub fn is_furious(&self) -> bool {
        self.furious
    }

    pub fn is_dead(&self) -> bool {
        self.state == BossState::Dead
    }

    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn order_fired(&self) -> bool {
        self.order_fired
    }

    /// Залпов на одну атаку (furious +1)
    pub fn volleys_per_attack(&self) -> u32 {
        (self.config.volleys_per_attack + u32::from(self.furious)).max(1)
    }

    /// Диапазон idle таймера с учётом furious
    pub fn idle_range(&self) -> (f32, f32) {
        let scale = if self.furious { FURIOUS_IDLE_SCALE } else { 1.0 };
        (self.config.idle_min * scale, self.config.idle_max * scale)
    }

    fn enter_idle(&mut self, rng: &mut DeterministicRng, effects: &mut Vec<BossEffect>) {
        self.state = BossState::Idle;
        let (min, max) = self.idle_range();
        self.state_timer = rng.range(min, max);
        self.order_fired = false;

        let triggers = &self.config.triggers;
        effects.push(BossEffect::trigger(AnimatorSlot::Excavator, &triggers.excavator_idle));
        let concreto = if rng.chance(BORED_CHANCE) {
            &triggers.concreto_bored
        } else {
            &triggers.concreto_idle
        };
        effects.push(BossEffect::trigger(AnimatorSlot::Body, concreto));
    }

    fn enter_attack(&mut self, effects: &mut Vec<BossEffect>) {
        self.state = BossState::Attack;
        self.state_timer = self.config.attack_duration;

        let triggers = &self.config.triggers;
        effects.push(BossEffect::trigger(AnimatorSlot::Excavator, &triggers.excavator_attack));
        effects.push(BossEffect::trigger(AnimatorSlot::Body, &triggers.concreto_talking));
        effects.push(BossEffect::SpawnVolleys {
            volleys: self.volleys_per_attack(),
            debris_per_volley: self.config.debris_per_volley.max(1),
        });
    }

    pub fn tick(&mut self, delta: f32, rng: &mut DeterministicRng) -> Vec<BossEffect> {
        let mut effects = Vec::new();
        if self.is_dead() {
            return effects;
        }
        if !self.started {
            self.started = true;
            self.enter_idle(rng, &mut effects);
            return effects;
        }

        match self.state {
            BossState::Idle => {
                self.state_timer -= delta;
                if !self.order_fired && self.state_timer <= self.config.pre_order_lead_time.max(MIN_ORDER_LEAD) {
                    self.order_fired = true;
                    effects.push(BossEffect::trigger(AnimatorSlot::Body, &self.config.triggers.concreto_order));
                }
                if self.state_timer <= 0.0 {
                    self.enter_attack(&mut effects);
                }
            }
            BossState::Attack => {
                self.state_timer -= delta;
                if self.state_timer <= 0.0 {
                    self.enter_idle(rng, &mut effects);
                }
            }
            BossState::Dead => {}
        }

        effects
    }

    /// Урон |amount|, furious на пороге (один раз), смерть на 0 HP
    pub fn receive_damage(&mut self, health: &mut Health, amount: i32) -> Vec<BossEffect> {
        let mut effects = Vec::new();
        if self.is_dead() {
            return effects;
        }

        health.take_damage(amount.unsigned_abs());
        let fraction = health.fraction();
        effects.push(BossEffect::HealthChanged { fraction });
        effects.push(BossEffect::trigger(AnimatorSlot::Body, &self.config.triggers.concreto_hurt));

        if !self.furious && fraction <= self.config.furious_threshold {
            self.furious = true;
            effects.push(BossEffect::trigger(AnimatorSlot::Body, &self.config.triggers.concreto_furious));
        }

        if !health.is_alive() {
            self.state = BossState::Dead;
            let triggers = &self.config.triggers;
            effects.push(BossEffect::trigger(AnimatorSlot::Body, &triggers.concreto_bored));
            effects.push(BossEffect::trigger(AnimatorSlot::Excavator, &triggers.excavator_idle));
            effects.push(BossEffect::Died);
        }

        effects
    }
}
