//! Kinematic body adapter
//!
//! Velocity пишут gameplay системы (locomotion, patrol, stun knockback),
//! backend (headless integrator или Rapier bridge) переносит её в Transform.
//! Сенсоры (ground/wall/edge) и contact события тоже идут через backend.

use bevy::prelude::*;

use crate::components::Facing;
use crate::physics::layers::CollisionLayers;

/// Физическое тело актора (2D, axis-aligned box)
///
/// Invariants:
/// - `simulated == false` → backend не двигает тело и не генерирует контакты
/// - `colliders_enabled == false` → тело невидимо для queries и контактов
/// - `freeze_x` → горизонтальная скорость принудительно 0 (attack freeze)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Transform, CollisionLayers, Facing)]
pub struct KinematicBody {
    /// Линейная скорость (m/s)
    pub velocity: Vec2,
    /// Половина размера коллайдера
    pub half_extents: Vec2,
    /// Множитель мировой гравитации (0 = гравитацию считает владелец, например locomotion)
    pub gravity_scale: f32,
    pub simulated: bool,
    pub colliders_enabled: bool,
    pub freeze_x: bool,
    /// Угловая скорость (rad/s), только визуальный spin для loot
    pub angular_velocity: f32,
}

impl Default for KinematicBody {
    fn default() -> Self {
        Self::new(Vec2::splat(0.5))
    }
}

impl KinematicBody {
    pub fn new(half_extents: Vec2) -> Self {
        Self {
            velocity: Vec2::ZERO,
            half_extents,
            gravity_scale: 1.0,
            simulated: true,
            colliders_enabled: true,
            freeze_x: false,
            angular_velocity: 0.0,
        }
    }

    pub fn with_gravity_scale(mut self, gravity_scale: f32) -> Self {
        self.gravity_scale = gravity_scale;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Участвует ли тело в физике (queries, контакты, интеграция)
    pub fn is_active(&self) -> bool {
        self.simulated && self.colliders_enabled
    }

    /// Отключает коллайдеры и симуляцию, обнуляет скорость (execute-kill, смерть босса)
    pub fn shut_down(&mut self) {
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
        self.colliders_enabled = false;
        self.simulated = false;
    }

    pub fn bounds(&self, position: Vec2) -> Aabb2 {
        Aabb2::from_center(position, self.half_extents)
    }
}

/// Axis-aligned bounding box в мировых координатах
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Aabb2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb2 {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    pub fn top(&self) -> f32 {
        self.max.y
    }

    pub fn bottom(&self) -> f32 {
        self.min.y
    }

    /// Строгое пересечение (касание краями не считается)
    pub fn overlaps(&self, other: &Aabb2) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Пересечение или зазор не больше `skin` по обеим осям
    pub fn touches(&self, other: &Aabb2, skin: f32) -> bool {
        self.min.x <= other.max.x + skin
            && self.max.x + skin >= other.min.x
            && self.min.y <= other.max.y + skin
            && self.max.y + skin >= other.min.y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Minkowski-расширение (для box cast через ray cast)
    pub fn expanded(&self, half_extents: Vec2) -> Aabb2 {
        Aabb2 {
            min: self.min - half_extents,
            max: self.max + half_extents,
        }
    }

    /// Slab ray test. Возвращает (distance, normal); старт внутри box → (0, -dir)
    pub fn ray_intersection(&self, origin: Vec2, dir: Vec2, max_distance: f32) -> Option<(f32, Vec2)> {
        if self.contains_point(origin) {
            return Some((0.0, -dir));
        }

        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;
        let mut normal = Vec2::ZERO;

        for axis in 0..2 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            let mut axis_normal = Vec2::ZERO;
            axis_normal[axis] = -d.signum();
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            if t0 > t_min {
                t_min = t0;
                normal = axis_normal;
            }
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some((t_min, normal))
    }
}

/// Статическая геометрия уровня (пол, стены, платформы)
///
/// Без KinematicBody: backend никогда не двигает её.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(Transform, CollisionLayers)]
pub struct StaticSolid {
    pub half_extents: Vec2,
}

impl StaticSolid {
    pub fn new(half_extents: Vec2) -> Self {
        Self { half_extents }
    }
}
