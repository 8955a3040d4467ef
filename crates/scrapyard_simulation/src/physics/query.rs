//! Physics query surface
//!
//! Gameplay sensing не знает какой backend под ним: headless index или
//! Rapier query pipeline. Оба реализуют `PhysicsQuery`.

use bevy::prelude::*;

/// Результат ray/box cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub distance: f32,
    pub point: Vec2,
    pub normal: Vec2,
}

pub trait PhysicsQuery {
    /// Ray cast против коллайдеров из `mask`. `exclude` — собственное тело.
    /// Сенсоры/триггеры не участвуют.
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: u32,
        exclude: Option<Entity>,
    ) -> Option<RayHit>;

    /// Box cast (sweep) коробкой `half_extents` из `center` вдоль `direction`
    fn cast_box(
        &self,
        center: Vec2,
        half_extents: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: u32,
        exclude: Option<Entity>,
    ) -> Option<RayHit>;

    /// Все коллайдеры из `mask`, пересекающие box
    fn overlap_box(&self, center: Vec2, half_extents: Vec2, mask: u32, exclude: Option<Entity>) -> Vec<Entity>;
}
