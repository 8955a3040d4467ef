//! Collision layers (bitmask)
//!
//! Значения совпадают с Rapier `Group` битами (GROUP_1 = 1 и т.д.), поэтому
//! bridge конвертирует их напрямую через `Group::from_bits_truncate`.

use bevy::prelude::*;

pub const GROUND: u32 = 1 << 0; // Пол, платформы
pub const WALL: u32 = 1 << 1; // Стены (wall-ahead сенсор)
pub const PLAYER: u32 = 1 << 2;
pub const ENEMY: u32 = 1 << 3;
pub const PROJECTILE: u32 = 1 << 4; // Debris босса
pub const PICKUP: u32 = 1 << 5; // Loot, предметы на земле
pub const BOSS: u32 = 1 << 6;

/// Всё, на чём можно стоять или во что упираться
pub const SOLID: u32 = GROUND | WALL;

/// Membership + filter, семантика Rapier: пара взаимодействует только если
/// каждая сторона входит в filter другой.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct CollisionLayers {
    pub membership: u32,
    pub filter: u32,
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::new(GROUND, u32::MAX)
    }
}

impl CollisionLayers {
    pub const fn new(membership: u32, filter: u32) -> Self {
        Self { membership, filter }
    }

    pub fn player() -> Self {
        Self::new(PLAYER, SOLID | ENEMY | PROJECTILE | BOSS)
    }

    pub fn enemy() -> Self {
        Self::new(ENEMY, SOLID | PLAYER)
    }

    /// Debris никогда не сталкивается с коллайдерами босса
    pub fn debris() -> Self {
        Self::new(PROJECTILE, GROUND | PLAYER)
    }

    pub fn pickup() -> Self {
        Self::new(PICKUP, SOLID)
    }

    pub fn boss() -> Self {
        Self::new(BOSS, PLAYER)
    }

    pub fn ground() -> Self {
        Self::new(GROUND, u32::MAX)
    }

    pub fn wall() -> Self {
        Self::new(WALL, u32::MAX)
    }

    pub fn interacts_with(&self, other: &CollisionLayers) -> bool {
        (self.filter & other.membership) != 0 && (other.filter & self.membership) != 0
    }

    /// Попадает ли entity в маску запроса (ray/box cast)
    pub fn matches_mask(&self, mask: u32) -> bool {
        (self.membership & mask) != 0
    }
}
