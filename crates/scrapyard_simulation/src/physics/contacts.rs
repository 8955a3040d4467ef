//! Collision contact events (backend → gameplay)

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum ContactPhase {
    Enter,
    Stay,
    Exit,
}

/// Контакт двух тел с точки зрения `entity`
///
/// Для каждой пары backend пишет два события (по одному на сторону).
/// Нормали направлены от `entity` к `other`: враг, на которого прыгнули
/// сверху, видит `normal.y > 0`.
#[derive(Event, Debug, Clone)]
pub struct ContactEvent {
    pub entity: Entity,
    pub other: Entity,
    pub phase: ContactPhase,
    pub normals: Vec<Vec2>,
    pub points: Vec<Vec2>,
    /// other.velocity - entity.velocity (до разрешения коллизии)
    pub relative_velocity: Vec2,
    /// Скорость `other` до разрешения коллизии
    pub other_velocity: Vec2,
}

impl ContactEvent {
    /// Средняя нормаль по всем точкам контакта; `None` если точек нет
    pub fn average_normal(&self) -> Option<Vec2> {
        if self.normals.is_empty() {
            return None;
        }
        let sum: Vec2 = self.normals.iter().copied().sum();
        Some(sum / self.normals.len() as f32)
    }

    pub fn first_point(&self) -> Option<Vec2> {
        self.points.first().copied()
    }

    /// То же событие с точки зрения `other`
    pub fn mirrored(&self) -> ContactEvent {
        ContactEvent {
            entity: self.other,
            other: self.entity,
            phase: self.phase,
            normals: self.normals.iter().map(|n| -*n).collect(),
            points: self.points.clone(),
            relative_velocity: -self.relative_velocity,
            other_velocity: self.other_velocity - self.relative_velocity,
        }
    }
}
