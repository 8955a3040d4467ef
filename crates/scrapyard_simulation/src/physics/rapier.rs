//! Rapier bridge (bevy_rapier2d)
//!
//! Вместо headless backend, когда хост гоняет настоящую физику:
//! - `KinematicBody.velocity` ↔ `Velocity.linvel` (write перед шагом, read после)
//! - `create_rapier_app` собирает App с этим backend
//! - сенсоры через Rapier query pipeline (`PhysicsQuery for RapierContext`)
//! - `CollisionEvent` + contact manifolds → наши `ContactEvent` (Enter/Stay/Exit)
//!
//! Rapier шаг должен быть в FixedUpdate (`RapierPhysicsPlugin::in_fixed_schedule`).

use std::collections::BTreeSet;

use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::parry::shape::Cuboid;
use bevy_rapier2d::prelude::*;

use crate::physics::body::{KinematicBody, StaticSolid};
use crate::physics::contacts::{ContactEvent, ContactPhase};
use crate::physics::layers::CollisionLayers;
use crate::physics::query::{PhysicsQuery, RayHit};
use crate::physics::sensing::{update_sensors, SensorQueries};
use crate::SimulationSet;

fn rapier_groups(layers: &CollisionLayers) -> CollisionGroups {
    CollisionGroups::new(
        Group::from_bits_truncate(layers.membership),
        Group::from_bits_truncate(layers.filter),
    )
}

fn query_filter(mask: u32, exclude: Option<Entity>) -> QueryFilter<'static> {
    let mut filter = QueryFilter::default()
        .exclude_sensors()
        .groups(CollisionGroups::new(Group::ALL, Group::from_bits_truncate(mask)));
    if let Some(entity) = exclude {
        filter = filter.exclude_rigid_body(entity);
    }
    filter
}

impl PhysicsQuery for RapierContext<'_> {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: u32,
        exclude: Option<Entity>,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        RapierContext::cast_ray(self, origin, direction, max_distance, true, query_filter(mask, exclude)).map(
            |(entity, toi)| RayHit {
                entity,
                distance: toi,
                point: origin + direction * toi,
                // Для простого ray нормаль аппроксимируем -direction
                normal: -direction,
            },
        )
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
        let shape = Cuboid::new(half_extents.into());

        self.cast_shape(
            center,
            0.0,
            direction,
            &shape,
            ShapeCastOptions {
                max_time_of_impact: max_distance,
                stop_at_penetration: false,
                ..default()
            },
            query_filter(mask, exclude),
        )
        .map(|(entity, hit)| {
            let normal = hit.details.map(|d| d.normal1).unwrap_or(-direction);
            RayHit {
                entity,
                distance: hit.time_of_impact,
                point: center + direction * hit.time_of_impact,
                normal,
            }
        })
    }

    fn overlap_box(&self, center: Vec2, half_extents: Vec2, mask: u32, exclude: Option<Entity>) -> Vec<Entity> {
        let shape = Cuboid::new(half_extents.into());
        let mut hits = Vec::new();
        self.intersect_shape(center, 0.0, &shape, query_filter(mask, exclude), |entity| {
            hits.push(entity);
            true
        });
        hits.sort();
        hits
    }
}

/// Активные контактные пары (a < b), чтобы слать Stay каждый тик
#[derive(Resource, Debug, Default)]
pub struct RapierContacts {
    active: BTreeSet<(Entity, Entity)>,
}

/// Система: Rapier компоненты для новых тел и статики
pub fn attach_rapier_colliders(
    mut commands: Commands,
    new_bodies: Query<(Entity, &KinematicBody, &CollisionLayers), Added<KinematicBody>>,
    new_statics: Query<(Entity, &StaticSolid, &CollisionLayers), Added<StaticSolid>>,
) {
    for (entity, body, layers) in new_bodies.iter() {
        commands.entity(entity).insert((
            RigidBody::Dynamic,
            Collider::cuboid(body.half_extents.x, body.half_extents.y),
            Velocity::linear(body.velocity),
            GravityScale(body.gravity_scale),
            LockedAxes::ROTATION_LOCKED,
            rapier_groups(layers),
            ActiveEvents::COLLISION_EVENTS,
        ));
    }

    for (entity, solid, layers) in new_statics.iter() {
        commands.entity(entity).insert((
            RigidBody::Fixed,
            Collider::cuboid(solid.half_extents.x, solid.half_extents.y),
            rapier_groups(layers),
        ));
    }
}

/// Система: Rapier velocity → KinematicBody (после шага)
pub fn rapier_read_back(mut bodies: Query<(&mut KinematicBody, &Velocity)>) {
    for (mut body, velocity) in bodies.iter_mut() {
        if body.simulated {
            body.velocity = velocity.linvel;
        }
    }
}

/// Система: сенсоры через Rapier query pipeline
pub fn rapier_sensing(rapier_context: ReadRapierContext, mut sensors: SensorQueries) {
    let Ok(context) = rapier_context.single() else {
        return;
    };
    update_sensors(&context, &mut sensors);
}

/// Система: Rapier CollisionEvent → ContactEvent
///
/// Идёт до `rapier_read_back`: в `KinematicBody` ещё velocity, записанная
/// перед шагом (как `velocity_before` у headless backend).
pub fn rapier_contact_events(
    rapier_context: ReadRapierContext,
    mut collision_events: EventReader<CollisionEvent>,
    mut contacts: ResMut<RapierContacts>,
    bodies: Query<&KinematicBody>,
    mut contact_events: EventWriter<ContactEvent>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    let mut entered = BTreeSet::new();
    let mut exited = BTreeSet::new();
    for event in collision_events.read() {
        match event {
            CollisionEvent::Started(a, b, _) => {
                entered.insert(((*a).min(*b), (*a).max(*b)));
            }
            CollisionEvent::Stopped(a, b, _) => {
                exited.insert(((*a).min(*b), (*a).max(*b)));
            }
        }
    }

    let velocity_of = |entity: Entity| bodies.get(entity).map(|b| b.velocity).unwrap_or(Vec2::ZERO);

    for &(a, b) in &exited {
        contacts.active.remove(&(a, b));
        let event = ContactEvent {
            entity: a,
            other: b,
            phase: ContactPhase::Exit,
            normals: Vec::new(),
            points: Vec::new(),
            relative_velocity: velocity_of(b) - velocity_of(a),
            other_velocity: velocity_of(b),
        };
        let mirrored = event.mirrored();
        contact_events.write(event);
        contact_events.write(mirrored);
    }

    let mut pairs: Vec<((Entity, Entity), ContactPhase)> = contacts
        .active
        .iter()
        .filter(|pair| !entered.contains(*pair))
        .map(|pair| (*pair, ContactPhase::Stay))
        .collect();
    pairs.extend(
        entered
            .iter()
            .filter(|pair| !exited.contains(*pair))
            .map(|pair| (*pair, ContactPhase::Enter)),
    );

    for ((a, b), phase) in pairs {
        contacts.active.insert((a, b));

        let mut normals = Vec::new();
        let mut points = Vec::new();
        if let Some(pair) = context.contact_pair(a, b) {
            // Нормаль manifold направлена от collider1 к collider2
            let flip = if pair.collider1() == Some(a) { 1.0 } else { -1.0 };
            for manifold in pair.manifolds() {
                let normal = manifold.normal() * flip;
                for contact in manifold.solver_contacts() {
                    normals.push(normal);
                    points.push(contact.point());
                }
                // Контакт без solver точек (тело уснуло): нормаль всё равно нужна
                if manifold.num_solver_contacts() == 0 && manifold.num_points() > 0 {
                    normals.push(normal);
                }
            }
        }

        let event = ContactEvent {
            entity: a,
            other: b,
            phase,
            normals,
            points,
            relative_velocity: velocity_of(b) - velocity_of(a),
            other_velocity: velocity_of(b),
        };
        let mirrored = event.mirrored();
        contact_events.write(event);
        contact_events.write(mirrored);
    }
}

/// Система: KinematicBody → Rapier (перед шагом)
pub fn rapier_write_velocity(
    mut commands: Commands,
    mut bodies: Query<(Entity, &KinematicBody, &mut Velocity, &mut GravityScale, &mut LockedAxes)>,
) {
    for (entity, body, mut velocity, mut gravity_scale, mut locked) in bodies.iter_mut() {
        velocity.linvel = body.velocity;
        velocity.angvel = body.angular_velocity;
        gravity_scale.0 = body.gravity_scale;

        let axes = if body.freeze_x {
            LockedAxes::ROTATION_LOCKED | LockedAxes::TRANSLATION_LOCKED_X
        } else {
            LockedAxes::ROTATION_LOCKED
        };
        if *locked != axes {
            *locked = axes;
        }

        if !body.simulated {
            commands.entity(entity).insert(RigidBodyDisabled);
        }
        if !body.colliders_enabled {
            commands.entity(entity).insert(ColliderDisabled);
        }
    }
}

/// Plugin Rapier bridge (альтернатива `HeadlessPhysicsPlugin`)
pub struct RapierBridgePlugin;

impl Plugin for RapierBridgePlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<RapierPhysicsPlugin<NoUserData>>() {
            app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule());
        }

        app.init_resource::<RapierContacts>()
            .add_event::<ContactEvent>()
            .add_systems(
                FixedUpdate,
                (attach_rapier_colliders, rapier_contact_events, rapier_read_back, rapier_sensing)
                    .chain()
                    .in_set(SimulationSet::Sense),
            )
            .add_systems(FixedUpdate, rapier_write_velocity.in_set(SimulationSet::Physics));
    }
}
