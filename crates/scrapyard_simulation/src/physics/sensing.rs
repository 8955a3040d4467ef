//! Сенсоры тел: grounded (box cast вниз), край платформы, стена впереди
//!
//! Чистые функции поверх `PhysicsQuery` + компоненты, куда backend-системы
//! складывают результат в `SimulationSet::Sense`. Gameplay читает только
//! компоненты.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::components::{Facing, Inert};
use crate::physics::body::KinematicBody;
use crate::physics::layers;
use crate::physics::query::PhysicsQuery;

/// Отступ точек сенсоров от края коллайдера
pub const SENSOR_SKIN: f32 = 0.02;

/// Ground contact для locomotion (сырой, без grace timer)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct GroundSensor {
    pub check_distance: f32,
    pub mask: u32,
    pub contact: bool,
}

impl Default for GroundSensor {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl GroundSensor {
    pub fn new(check_distance: f32) -> Self {
        Self {
            check_distance,
            mask: layers::SOLID,
            contact: false,
        }
    }
}

/// Результат patrol sensing (foot-down, forward-foot-down, forward-side)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PatrolSensor {
    pub edge_check_distance: f32,
    pub wall_check_distance: f32,
    pub grounded: bool,
    pub no_ground_ahead: bool,
    pub wall_ahead: bool,
}

impl PatrolSensor {
    pub fn new(edge_check_distance: f32, wall_check_distance: f32) -> Self {
        Self {
            edge_check_distance,
            wall_check_distance,
            ..default()
        }
    }

    /// Нужно ли развернуться (без учёта cooldown-ов)
    pub fn wants_turn(&self) -> bool {
        self.wall_ahead || (self.grounded && self.no_ground_ahead)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatrolReadings {
    pub grounded: bool,
    pub no_ground_ahead: bool,
    pub wall_ahead: bool,
}

/// Box cast вниз от подошвы
pub fn sense_ground<Q: PhysicsQuery + ?Sized>(
    query: &Q,
    entity: Entity,
    position: Vec2,
    body: &KinematicBody,
    check_distance: f32,
    mask: u32,
) -> bool {
    let bounds = body.bounds(position);
    let probe_half = Vec2::new(body.half_extents.x * 0.9, SENSOR_SKIN * 0.5);
    let probe_center = Vec2::new(position.x, bounds.bottom() + SENSOR_SKIN);

    query
        .cast_box(
            probe_center,
            probe_half,
            Vec2::NEG_Y,
            check_distance + SENSOR_SKIN,
            mask,
            Some(entity),
        )
        .is_some()
}

/// Три луча patrol врага: под ногами, под передним краем, вперёд на уровне центра
pub fn sense_patrol<Q: PhysicsQuery + ?Sized>(
    query: &Q,
    entity: Entity,
    position: Vec2,
    body: &KinematicBody,
    facing: Facing,
    edge_check_distance: f32,
    wall_check_distance: f32,
) -> PatrolReadings {
    let bounds = body.bounds(position);
    let center = bounds.center();
    let dir = facing.sign();

    let foot = Vec2::new(center.x, bounds.bottom() + SENSOR_SKIN);
    let grounded = query
        .cast_ray(foot, Vec2::NEG_Y, edge_check_distance, layers::GROUND, Some(entity))
        .is_some();

    let x_front = center.x + dir * (body.half_extents.x + SENSOR_SKIN);
    let foot_front = Vec2::new(x_front, bounds.bottom() + SENSOR_SKIN);
    let no_ground_ahead = query
        .cast_ray(foot_front, Vec2::NEG_Y, edge_check_distance, layers::GROUND, Some(entity))
        .is_none();

    let side_from = Vec2::new(x_front, center.y);
    let wall_ahead = query
        .cast_ray(side_from, Vec2::new(dir, 0.0), wall_check_distance, layers::WALL, Some(entity))
        .is_some();

    PatrolReadings {
        grounded,
        no_ground_ahead,
        wall_ahead,
    }
}

/// Все сенсоры, которые backend обновляет каждый тик
#[derive(SystemParam)]
pub struct SensorQueries<'w, 's> {
    pub ground: Query<
        'w,
        's,
        (Entity, &'static Transform, &'static KinematicBody, &'static mut GroundSensor),
        Without<Inert>,
    >,
    pub patrol: Query<
        'w,
        's,
        (
            Entity,
            &'static Transform,
            &'static KinematicBody,
            &'static Facing,
            &'static mut PatrolSensor,
        ),
        (Without<Inert>, Without<GroundSensor>),
    >,
}

/// Общий проход сенсоров для любого backend
pub fn update_sensors<Q: PhysicsQuery + ?Sized>(query: &Q, sensors: &mut SensorQueries) {
    for (entity, transform, body, mut sensor) in sensors.ground.iter_mut() {
        if !body.is_active() {
            sensor.contact = false;
            continue;
        }
        sensor.contact = sense_ground(
            query,
            entity,
            transform.translation.truncate(),
            body,
            sensor.check_distance,
            sensor.mask,
        );
    }

    for (entity, transform, body, facing, mut sensor) in sensors.patrol.iter_mut() {
        if !body.is_active() {
            continue;
        }
        let readings = sense_patrol(
            query,
            entity,
            transform.translation.truncate(),
            body,
            *facing,
            sensor.edge_check_distance,
            sensor.wall_check_distance,
        );
        sensor.grounded = readings.grounded;
        sensor.no_ground_ahead = readings.no_ground_ahead;
        sensor.wall_ahead = readings.wall_ahead;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::Aabb2;
    use crate::physics::query::RayHit;

    /// Мир из статических AABB без ECS
    struct BoxWorld {
        solids: Vec<(Entity, Aabb2, u32)>,
    }

    impl PhysicsQuery for BoxWorld {
        fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32, mask: u32, exclude: Option<Entity>) -> Option<RayHit> {
            self.solids
                .iter()
                .filter(|(e, _, m)| (m & mask) != 0 && Some(*e) != exclude)
                .filter_map(|(e, aabb, _)| {
                    aabb.ray_intersection(origin, direction, max_distance).map(|(distance, normal)| RayHit {
                        entity: *e,
                        distance,
                        point: origin + direction * distance,
                        normal,
                    })
                })
                .min_by(|a, b| a.distance.total_cmp(&b.distance))
        }

        fn cast_box(&self, center: Vec2, half_extents: Vec2, direction: Vec2, max_distance: f32, mask: u32, exclude: Option<Entity>) -> Option<RayHit> {
            let expanded = BoxWorld {
                solids: self
                    .solids
                    .iter()
                    .map(|(e, aabb, m)| (*e, aabb.expanded(half_extents), *m))
                    .collect(),
            };
            expanded.cast_ray(center, direction, max_distance, mask, exclude)
        }

        fn overlap_box(&self, _center: Vec2, _half_extents: Vec2, _mask: u32, _exclude: Option<Entity>) -> Vec<Entity> {
            Vec::new()
        }
    }

    fn arena() -> BoxWorld {
        BoxWorld {
            solids: vec![
                // Платформа x ∈ [-5, 5], верх y = 0
                (
                    Entity::from_raw(100),
                    Aabb2::from_center(Vec2::new(0.0, -0.5), Vec2::new(5.0, 0.5)),
                    layers::GROUND,
                ),
                // Стена справа x ∈ [3, 4]
                (
                    Entity::from_raw(101),
                    Aabb2::from_center(Vec2::new(3.5, 2.0), Vec2::new(0.5, 2.0)),
                    layers::WALL,
                ),
            ],
        }
    }

    #[test]
    fn test_grounded_standing_on_platform() {
        let world = arena();
        let body = KinematicBody::new(Vec2::new(0.3, 0.4));
        let me = Entity::from_raw(1);

        assert!(sense_ground(&world, me, Vec2::new(0.0, 0.4), &body, 0.1, layers::SOLID));
        assert!(!sense_ground(&world, me, Vec2::new(0.0, 1.0), &body, 0.1, layers::SOLID));
    }

    #[test]
    fn test_edge_ahead_detected() {
        let world = arena();
        let body = KinematicBody::new(Vec2::new(0.3, 0.4));
        // Стоим у левого края, смотрим влево
        let readings = sense_patrol(&world, Entity::from_raw(1), Vec2::new(-4.8, 0.4), &body, Facing::LEFT, 0.28, 0.14);

        assert!(readings.grounded);
        assert!(readings.no_ground_ahead);
        assert!(!readings.wall_ahead);
    }

    #[test]
    fn test_wall_ahead_detected() {
        let world = arena();
        let body = KinematicBody::new(Vec2::new(0.3, 0.4));
        // Правый край тела на 2.9, стена с 3.0
        let readings = sense_patrol(&world, Entity::from_raw(1), Vec2::new(2.6, 0.4), &body, Facing::RIGHT, 0.28, 0.14);

        assert!(readings.grounded);
        assert!(!readings.no_ground_ahead);
        assert!(readings.wall_ahead);
    }
}
