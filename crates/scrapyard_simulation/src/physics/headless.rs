//! Headless physics backend
//!
//! Не физический движок: статичные AABB + per-axis интегратор + AABB
//! контакты. Нужен чтобы гонять gameplay детерминированно без Rapier
//! (headless binary, integration/determinism тесты).
//!
//! Тик:
//! 1. Sense: `rebuild_collider_index` → `headless_sensing`
//! 2. Physics: `headless_physics_step` (интеграция + Enter/Stay/Exit контакты)

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::physics::body::{Aabb2, KinematicBody, StaticSolid};
use crate::physics::contacts::{ContactEvent, ContactPhase};
use crate::physics::layers::CollisionLayers;
use crate::physics::query::{PhysicsQuery, RayHit};
use crate::physics::sensing::{update_sensors, SensorQueries};
use crate::physics::WORLD_GRAVITY;
use crate::SimulationSet;

/// Зазор, при котором тела ещё считаются касающимися
pub const CONTACT_SKIN: f32 = 0.02;

/// Глубина, начиная с которой тела считаются уже пересекающимися на старте шага
/// (такие пары не блокируют движение, иначе тело "телепортируется")
const START_PENETRATION_EPS: f32 = 0.01;

#[derive(Debug, Clone, Copy)]
pub struct ColliderEntry {
    pub entity: Entity,
    pub bounds: Aabb2,
    pub layers: CollisionLayers,
    pub dynamic: bool,
}

/// Контакт пары (a < b) с точки зрения `a`
#[derive(Debug, Clone)]
struct PairContact {
    normal: Vec2,
    point: Vec2,
    velocity_a: Vec2,
    velocity_b: Vec2,
}

/// Headless мир: индекс коллайдеров для queries + активные контактные пары
#[derive(Resource, Debug)]
pub struct HeadlessPhysics {
    pub gravity: Vec2,
    colliders: Vec<ColliderEntry>,
    active_pairs: BTreeMap<(Entity, Entity), PairContact>,
}

impl Default for HeadlessPhysics {
    fn default() -> Self {
        Self::new(WORLD_GRAVITY)
    }
}

impl HeadlessPhysics {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            colliders: Vec::new(),
            active_pairs: BTreeMap::new(),
        }
    }

    pub fn colliders(&self) -> &[ColliderEntry] {
        &self.colliders
    }

    /// Пересобирает индекс (отсортирован по Entity для детерминизма)
    pub fn set_colliders(&mut self, mut colliders: Vec<ColliderEntry>) {
        colliders.sort_by_key(|c| c.entity);
        self.colliders = colliders;
    }

    pub fn active_pair_count(&self) -> usize {
        self.active_pairs.len()
    }

    fn candidates(&self, mask: u32, exclude: Option<Entity>) -> impl Iterator<Item = &ColliderEntry> {
        self.colliders
            .iter()
            .filter(move |c| c.layers.matches_mask(mask) && Some(c.entity) != exclude)
    }
}

impl PhysicsQuery for HeadlessPhysics {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: u32,
        exclude: Option<Entity>,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }

        self.candidates(mask, exclude)
            .filter_map(|c| {
                c.bounds
                    .ray_intersection(origin, direction, max_distance)
                    .map(|(distance, normal)| RayHit {
                        entity: c.entity,
                        distance,
                        point: origin + direction * distance,
                        normal,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn cast_box(
        &self,
        center: Vec2,
        half_extents: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: u32,
        exclude: Option<Entity>,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }

        self.candidates(mask, exclude)
            .filter_map(|c| {
                c.bounds
                    .expanded(half_extents)
                    .ray_intersection(center, direction, max_distance)
                    .map(|(distance, normal)| RayHit {
                        entity: c.entity,
                        distance,
                        point: center + direction * distance - normal * half_extents,
                        normal,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn overlap_box(&self, center: Vec2, half_extents: Vec2, mask: u32, exclude: Option<Entity>) -> Vec<Entity> {
        let probe = Aabb2::from_center(center, half_extents);
        self.candidates(mask, exclude)
            .filter(|c| c.bounds.overlaps(&probe))
            .map(|c| c.entity)
            .collect()
    }
}

/// Система: пересобрать индекс коллайдеров (статика + активные тела)
pub fn rebuild_collider_index(
    mut physics: ResMut<HeadlessPhysics>,
    statics: Query<(Entity, &Transform, &StaticSolid, &CollisionLayers), Without<KinematicBody>>,
    bodies: Query<(Entity, &Transform, &KinematicBody, &CollisionLayers)>,
) {
    let mut colliders: Vec<ColliderEntry> = statics
        .iter()
        .map(|(entity, transform, solid, layers)| ColliderEntry {
            entity,
            bounds: Aabb2::from_center(transform.translation.truncate(), solid.half_extents),
            layers: *layers,
            dynamic: false,
        })
        .collect();

    colliders.extend(
        bodies
            .iter()
            .filter(|(_, _, body, _)| body.is_active())
            .map(|(entity, transform, body, layers)| ColliderEntry {
                entity,
                bounds: body.bounds(transform.translation.truncate()),
                layers: *layers,
                dynamic: true,
            }),
    );

    physics.set_colliders(colliders);
}

/// Система: сенсоры поверх headless индекса
pub fn headless_sensing(physics: Res<HeadlessPhysics>, mut sensors: SensorQueries) {
    update_sensors(&*physics, &mut sensors);
}

/// Тело в процессе шага
#[derive(Debug, Clone, Copy)]
struct Mover {
    entity: Entity,
    position: Vec2,
    half_extents: Vec2,
    velocity_before: Vec2,
    layers: CollisionLayers,
    collides: bool,
}

impl Mover {
    fn bounds(&self) -> Aabb2 {
        Aabb2::from_center(self.position, self.half_extents)
    }
}

/// Двигает `position` по одной оси, упираясь в блокеры. Возвращает true если упёрлись.
fn sweep_axis(position: &mut Vec2, half_extents: Vec2, delta: f32, axis: usize, blockers: &[Aabb2]) -> bool {
    if delta == 0.0 {
        return false;
    }

    let start = Aabb2::from_center(*position, half_extents);
    let start_core = Aabb2::from_center(
        *position,
        (half_extents - Vec2::splat(START_PENETRATION_EPS)).max(Vec2::ZERO),
    );

    let mut target = *position;
    target[axis] += delta;
    let mut blocked = false;

    for blocker in blockers {
        if start_core.overlaps(blocker) {
            continue;
        }
        let moved = Aabb2::from_center(target, half_extents);
        // Сметённый объём: объединение start и moved по оси движения
        let swept = Aabb2 {
            min: start.min.min(moved.min),
            max: start.max.max(moved.max),
        };
        if !swept.overlaps(blocker) {
            continue;
        }

        if delta > 0.0 {
            target[axis] = target[axis].min(blocker.min[axis] - half_extents[axis]);
        } else {
            target[axis] = target[axis].max(blocker.max[axis] + half_extents[axis]);
        }
        blocked = true;
    }

    *position = target;
    blocked
}

/// Нормаль от `a` к `b` по оси наименьшего перекрытия + точка контакта
fn contact_geometry(a: &Aabb2, b: &Aabb2) -> (Vec2, Vec2) {
    let delta = b.center() - a.center();
    let overlap = a.half_extents() + b.half_extents() - delta.abs();

    let normal = if overlap.y < overlap.x {
        Vec2::new(0.0, if delta.y >= 0.0 { 1.0 } else { -1.0 })
    } else {
        Vec2::new(if delta.x >= 0.0 { 1.0 } else { -1.0 }, 0.0)
    };

    let lo = a.min.max(b.min);
    let hi = a.max.min(b.max);
    let point = (lo + hi) * 0.5;

    (normal, point)
}

/// Система: шаг интегратора + генерация контактов
///
/// Тела обрабатываются в порядке Entity (детерминизм), каждое видит уже
/// сдвинутые позиции предыдущих.
pub fn headless_physics_step(
    mut physics: ResMut<HeadlessPhysics>,
    time: Res<Time<Fixed>>,
    mut bodies: Query<(Entity, &mut Transform, &mut KinematicBody, &CollisionLayers)>,
    statics: Query<(Entity, &Transform, &StaticSolid, &CollisionLayers), Without<KinematicBody>>,
    mut contact_events: EventWriter<ContactEvent>,
) {
    let delta = time.delta_secs();
    let gravity = physics.gravity;

    let static_entries: Vec<(Entity, Aabb2, CollisionLayers)> = statics
        .iter()
        .map(|(entity, transform, solid, layers)| {
            (entity, Aabb2::from_center(transform.translation.truncate(), solid.half_extents), *layers)
        })
        .collect();

    let mut movers: Vec<Mover> = bodies
        .iter()
        .filter(|(_, _, body, _)| body.simulated)
        .map(|(entity, transform, body, layers)| Mover {
            entity,
            position: transform.translation.truncate(),
            half_extents: body.half_extents,
            velocity_before: body.velocity,
            layers: *layers,
            collides: body.colliders_enabled,
        })
        .collect();
    movers.sort_by_key(|m| m.entity);

    // 1. Интеграция
    for index in 0..movers.len() {
        let mover = movers[index];
        let Ok((_, mut transform, mut body, _)) = bodies.get_mut(mover.entity) else {
            continue;
        };

        let mut velocity = body.velocity + gravity * body.gravity_scale * delta;
        if body.freeze_x {
            velocity.x = 0.0;
        }

        let blockers: Vec<Aabb2> = if mover.collides {
            static_entries
                .iter()
                .filter(|(_, _, layers)| mover.layers.interacts_with(layers))
                .map(|(_, bounds, _)| *bounds)
                .chain(
                    movers
                        .iter()
                        .filter(|other| other.entity != mover.entity && other.collides)
                        .filter(|other| mover.layers.interacts_with(&other.layers))
                        .map(|other| other.bounds()),
                )
                .collect()
        } else {
            Vec::new()
        };

        let mut position = mover.position;
        if sweep_axis(&mut position, mover.half_extents, velocity.x * delta, 0, &blockers) {
            velocity.x = 0.0;
        }
        if sweep_axis(&mut position, mover.half_extents, velocity.y * delta, 1, &blockers) {
            velocity.y = 0.0;
        }

        body.velocity = velocity;
        transform.translation.x = position.x;
        transform.translation.y = position.y;
        if body.angular_velocity != 0.0 {
            transform.rotate_z(body.angular_velocity * delta);
        }

        movers[index].position = position;
    }

    // 2. Контакты (касание с зазором CONTACT_SKIN)
    let mut touching: BTreeMap<(Entity, Entity), PairContact> = BTreeMap::new();
    let colliding: Vec<&Mover> = movers.iter().filter(|m| m.collides).collect();

    for (i, a) in colliding.iter().enumerate() {
        let a_bounds = a.bounds();

        for (entity, bounds, layers) in &static_entries {
            if !a.layers.interacts_with(layers) || !a_bounds.touches(bounds, CONTACT_SKIN) {
                continue;
            }
            let (normal, point) = contact_geometry(&a_bounds, bounds);
            insert_pair(&mut touching, a.entity, *entity, normal, point, a.velocity_before, Vec2::ZERO);
        }

        for b in colliding.iter().skip(i + 1) {
            if !a.layers.interacts_with(&b.layers) {
                continue;
            }
            let b_bounds = b.bounds();
            if !a_bounds.touches(&b_bounds, CONTACT_SKIN) {
                continue;
            }
            let (normal, point) = contact_geometry(&a_bounds, &b_bounds);
            insert_pair(&mut touching, a.entity, b.entity, normal, point, a.velocity_before, b.velocity_before);
        }
    }

    // 3. Enter / Stay / Exit
    for ((a, b), contact) in &touching {
        let phase = if physics.active_pairs.contains_key(&(*a, *b)) {
            ContactPhase::Stay
        } else {
            ContactPhase::Enter
        };
        let event = ContactEvent {
            entity: *a,
            other: *b,
            phase,
            normals: vec![contact.normal],
            points: vec![contact.point],
            relative_velocity: contact.velocity_b - contact.velocity_a,
            other_velocity: contact.velocity_b,
        };
        let mirrored = event.mirrored();
        contact_events.write(event);
        contact_events.write(mirrored);
    }

    for ((a, b), contact) in &physics.active_pairs {
        if touching.contains_key(&(*a, *b)) {
            continue;
        }
        let event = ContactEvent {
            entity: *a,
            other: *b,
            phase: ContactPhase::Exit,
            normals: Vec::new(),
            points: Vec::new(),
            relative_velocity: contact.velocity_b - contact.velocity_a,
            other_velocity: contact.velocity_b,
        };
        let mirrored = event.mirrored();
        contact_events.write(event);
        contact_events.write(mirrored);
    }

    physics.active_pairs = touching;
}

/// Кладёт контакт в map с ключом (min, max), нормаль переворачивается под ключ
fn insert_pair(
    touching: &mut BTreeMap<(Entity, Entity), PairContact>,
    a: Entity,
    b: Entity,
    normal: Vec2,
    point: Vec2,
    velocity_a: Vec2,
    velocity_b: Vec2,
) {
    let contact = if a < b {
        PairContact { normal, point, velocity_a, velocity_b }
    } else {
        PairContact {
            normal: -normal,
            point,
            velocity_a: velocity_b,
            velocity_b: velocity_a,
        }
    };
    touching.insert((a.min(b), a.max(b)), contact);
}

/// Plugin headless backend
pub struct HeadlessPhysicsPlugin;

impl Plugin for HeadlessPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HeadlessPhysics>()
            .add_event::<ContactEvent>()
            .add_systems(
                FixedUpdate,
                (rebuild_collider_index, headless_sensing)
                    .chain()
                    .in_set(SimulationSet::Sense),
            )
            .add_systems(FixedUpdate, headless_physics_step.in_set(SimulationSet::Physics));
    }
}
