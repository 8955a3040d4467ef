//! Stun события

use bevy::prelude::*;

/// Как считать knockback для запроса
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StunKnockback {
    /// Явный вектор (нулевые компоненты → default knockback цели)
    Vector(Vec2),
    /// Знак направления: (sign * default.x, default.y)
    Direction(f32),
}

/// Запрос stun от любого источника урона (контакт, удар, debris)
///
/// Разрешается против того stun компонента, который есть у цели
/// (`PlayerStun` или `EnemyStun`).
#[derive(Event, Debug, Clone, Copy)]
pub struct StunRequest {
    pub target: Entity,
    pub duration: f32,
    pub knockback: StunKnockback,
}

impl StunRequest {
    pub fn new(target: Entity, duration: f32, knockback: Vec2) -> Self {
        Self {
            target,
            duration,
            knockback: StunKnockback::Vector(knockback),
        }
    }

    pub fn directional(target: Entity, duration: f32, dir_sign: f32) -> Self {
        Self {
            target,
            duration,
            knockback: StunKnockback::Direction(dir_sign),
        }
    }
}

/// Вход в stun (fire-and-forget, наблюдателей может не быть)
///
/// VFX: hurt flash на `hurt_flash` секунд, stun indicator включается.
#[derive(Event, Debug, Clone, Copy)]
pub struct StunEntered {
    pub entity: Entity,
    pub duration: f32,
    pub knockback: Vec2,
    pub hurt_flash: f32,
    /// Окно неуязвимости (0 для врагов)
    pub invulnerable_for: f32,
}

/// Выход из stun (движение снова разрешено, stun indicator выключается)
#[derive(Event, Debug, Clone, Copy)]
pub struct StunRecovered {
    pub entity: Entity,
    pub elapsed: f32,
    pub planned: f32,
}
