//! Melee враг Tetrapakstein
//!
//! Patrol capability (stun, stomp) + `MeleeBrain`:
//! Idle → Chase → Attack → Cooldown → (Attack | Chase), Stunned вытесняет всё.
//! Урон наносит только замах (hitbox), боковой контакт телом не ранит.

use bevy::prelude::*;

pub mod brain;
pub mod config;
pub mod systems;

#[cfg(test)]
mod brain_tests;

pub use brain::{AttackCheck, AttackSwing, MeleeBrain, MeleeSenses, MeleeState, WhyNotAttacking};
pub use config::{MeleeAnimStates, MeleeConfig};
pub use systems::*;

use crate::animation::AnimationTracker;
use crate::components::{Enemy, Facing};
use crate::enemy::{ContactPolicy, ContactResponder, EnemyConfig, Patrol};
use crate::physics::{CollisionLayers, KinematicBody, PatrolSensor};
use crate::stun::EnemyStun;
use crate::{ResolveSet, SimulationSet};

/// Spawn Tetrapakstein: stomp-only контакты, движением управляет brain
pub fn spawn_melee_enemy(
    commands: &mut Commands,
    position: Vec2,
    enemy: &EnemyConfig,
    melee: &MeleeConfig,
) -> Entity {
    commands
        .spawn((
            Enemy,
            Transform::from_translation(position.extend(0.0)),
            KinematicBody::new(enemy.half_extents),
            CollisionLayers::enemy(),
            Facing::LEFT,
            PatrolSensor::new(enemy.patrol.edge_check_distance, enemy.patrol.wall_check_distance),
            Patrol::new(enemy.patrol),
            ContactResponder {
                config: enemy.contact,
                policy: ContactPolicy::StompOnly,
            },
            EnemyStun::default(),
            MeleeBrain::new(melee.clone()),
            AnimationTracker::default(),
        ))
        .id()
}

pub struct MeleePlugin;

impl Plugin for MeleePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (apply_swing_signals, melee_brain_tick)
                .chain()
                .in_set(SimulationSet::Decide),
        )
        .add_systems(
            FixedUpdate,
            melee_hit_check
                .after(crate::enemy::contact::resolve_enemy_contacts)
                .in_set(ResolveSet::Contacts),
        )
        .add_systems(FixedUpdate, melee_stun_reactions.in_set(ResolveSet::Reactions));
    }
}
