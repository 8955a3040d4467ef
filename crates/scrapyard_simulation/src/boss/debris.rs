//! Debris босса: баллистический снаряд
//!
//! Попадание в игрока → stun (если не неуязвим), в землю → шанс spawn
//! standard врага. В обоих случаях снаряд исчезает; не дольше `life` секунд.

use bevy::prelude::*;

use crate::combat::DespawnAfter;
use crate::components::Player;
use crate::enemy::EnemySpawnRequest;
use crate::physics::layers::GROUND;
use crate::physics::{CollisionLayers, ContactEvent, ContactPhase, KinematicBody};
use crate::stun::{PlayerStun, StunRequest};
use crate::DeterministicRng;

use super::cycle::BossConfig;

/// Снаряд (параметры копируются из `BossConfig` на спавне)
///
/// Инвариант: `resolved` → больше никаких реакций, entity уже уходит.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Debris {
    pub owner: Entity,
    pub resolved: bool,
    pub spawn_chance: f32,
    pub spawn_offset: Vec2,
    pub player_stun_time: f32,
    pub player_knockback: Vec2,
}

impl Debris {
    pub fn new(owner: Entity, config: &BossConfig) -> Self {
        Self {
            owner,
            resolved: false,
            spawn_chance: config.spawn_chance,
            spawn_offset: config.spawn_offset,
            player_stun_time: config.player_stun_time,
            player_knockback: config.player_knockback,
        }
    }
}

pub fn spawn_debris(
    commands: &mut Commands,
    owner: Entity,
    position: Vec2,
    velocity: Vec2,
    config: &BossConfig,
) -> Entity {
    commands
        .spawn((
            Debris::new(owner, config),
            Transform::from_translation(position.extend(0.0)),
            KinematicBody::new(config.debris_half_extents)
                .with_gravity_scale(config.debris_gravity_scale)
                .with_velocity(velocity),
            CollisionLayers::debris(),
            DespawnAfter::new(config.debris_life),
        ))
        .id()
}

/// Система: контакты debris (Resolve / Contacts)
pub fn resolve_debris_contacts(
    mut commands: Commands,
    mut contacts: EventReader<ContactEvent>,
    mut debris: Query<(&mut Debris, &Transform)>,
    players: Query<Option<&PlayerStun>, With<Player>>,
    layers: Query<&CollisionLayers>,
    mut rng: ResMut<DeterministicRng>,
    mut stun_requests: EventWriter<StunRequest>,
    mut spawn_requests: EventWriter<EnemySpawnRequest>,
) {
    for contact in contacts.read() {
        if contact.phase != ContactPhase::Enter {
            continue;
        }
        let Ok((mut projectile, transform)) = debris.get_mut(contact.entity) else {
            continue;
        };
        if projectile.resolved {
            continue;
        }

        if let Ok(stun) = players.get(contact.other) {
            if stun.is_some_and(|stun| stun.can_be_stunned()) {
                stun_requests.write(StunRequest::new(
                    contact.other,
                    projectile.player_stun_time,
                    projectile.player_knockback,
                ));
                crate::log(&format!("🪨 Debris {:?}: hit player → stun", contact.entity));
            }
        } else if layers
            .get(contact.other)
            .is_ok_and(|other| other.matches_mask(GROUND))
        {
            if rng.chance(projectile.spawn_chance) {
                let impact = contact
                    .first_point()
                    .unwrap_or_else(|| transform.translation.truncate());
                spawn_requests.write(EnemySpawnRequest::standard(impact + projectile.spawn_offset));
                crate::log(&format!("🪨 Debris {:?}: hit ground → spawn enemy", contact.entity));
            }
        } else {
            continue;
        }

        projectile.resolved = true;
        if let Ok(mut entity_commands) = commands.get_entity(contact.entity) {
            entity_commands.despawn();
        }
    }
}
