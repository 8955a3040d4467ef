//! Boss domain: Concreto на экскаваторе
//!
//! Цикл Idle → Attack → Idle (`cycle`), каждая атака бросает залпы debris
//! по баллистике в текущую позицию игрока (`ballistic`, `debris`).
//! Урон приходит событием `BossDamage` (источник решает хост).

use bevy::prelude::*;

pub mod ballistic;
pub mod cycle;
pub mod debris;

pub use ballistic::{
    compute_ballistic_v0, rotate_deg, solve_ballistic, solve_launch_velocity, BallisticShot, BallisticSolution,
    MAX_CORRECTION_ITERATIONS,
};
pub use cycle::{BossConfig, BossCycle, BossEffect, BossState, BossTriggers};
pub use debris::{resolve_debris_contacts, spawn_debris, Debris};

use crate::animation::AnimationRequest;
use crate::components::{Health, Inert, Player};
use crate::physics::{CollisionLayers, HeadlessPhysics, KinematicBody, WORLD_GRAVITY};
use crate::{DeterministicRng, ResolveSet, SimulationSet};

/// Урон боссу (знак игнорируется, считается |amount|)
#[derive(Event, Debug, Clone, Copy)]
pub struct BossDamage {
    pub boss: Entity,
    pub amount: i32,
}

/// HP bar: current / max в [0, 1]
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct BossHealthChanged {
    pub boss: Entity,
    pub fraction: f32,
}

/// Spawn босса: тело не двигается (gravity 0), коллайдеры только для игрока
pub fn spawn_boss(commands: &mut Commands, position: Vec2, config: BossConfig) -> Entity {
    commands
        .spawn((
            Transform::from_translation(position.extend(0.0)),
            Health::new(config.max_hp),
            KinematicBody::new(config.body_half_extents).with_gravity_scale(0.0),
            CollisionLayers::boss(),
            BossCycle::new(config),
        ))
        .id()
}

/// Куда бросать debris (нет цели → залпы пропускаются)
#[derive(Debug, Clone, Copy)]
struct ThrowTarget {
    position: Option<Vec2>,
    gravity: f32,
}

/// Исполняет `BossEffect`: анимации, debris, HP bar
#[allow(clippy::too_many_arguments)]
fn apply_effects(
    boss: Entity,
    position: Vec2,
    cycle: &BossCycle,
    effects: Vec<BossEffect>,
    throw_target: ThrowTarget,
    commands: &mut Commands,
    rng: &mut DeterministicRng,
    animation_requests: &mut EventWriter<AnimationRequest>,
    health_events: &mut EventWriter<BossHealthChanged>,
) {
    for effect in effects {
        match effect {
            BossEffect::Trigger { slot, name } => {
                animation_requests.write(AnimationRequest::trigger(boss, name).on(slot));
            }
            BossEffect::SpawnVolleys {
                volleys,
                debris_per_volley,
            } => {
                let Some(target) = throw_target.position else {
                    continue;
                };
                let config = &cycle.config;
                let origin = position + config.throw_point_offset;
                let shot = BallisticShot {
                    origin,
                    target,
                    gravity: throw_target.gravity * config.debris_gravity_scale,
                    flight_time_min: config.flight_time_min,
                    flight_time_max: config.flight_time_max,
                    speed_min: config.debris_speed_min,
                    speed_max: config.debris_speed_max,
                    aim_noise_deg: config.aim_noise_angle,
                };
                for _ in 0..volleys * debris_per_volley {
                    let solution = solve_launch_velocity(&shot, rng);
                    let projectile = spawn_debris(commands, boss, origin, solution.velocity, config);
                    crate::log(&format!(
                        "🏗️ Boss {:?}: debris {:?} v0=({:.2}, {:.2}) T={:.2} corrections={}",
                        boss, projectile, solution.velocity.x, solution.velocity.y, solution.flight_time,
                        solution.corrections
                    ));
                }
            }
            BossEffect::HealthChanged { fraction } => {
                health_events.write(BossHealthChanged { boss, fraction });
            }
            BossEffect::Died => {
                crate::log(&format!("💀 Boss {:?}: dead", boss));
            }
        }
    }
}

/// Система: tick цикла + залпы (Decide)
#[allow(clippy::too_many_arguments)]
pub fn boss_cycle_tick(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut rng: ResMut<DeterministicRng>,
    physics: Option<Res<HeadlessPhysics>>,
    mut bosses: Query<(Entity, &Transform, &mut BossCycle), Without<Inert>>,
    players: Query<&Transform, (With<Player>, Without<Inert>)>,
    mut animation_requests: EventWriter<AnimationRequest>,
    mut health_events: EventWriter<BossHealthChanged>,
    mut warned_no_player: Local<bool>,
) {
    let delta = time.delta_secs();
    let gravity = physics.map(|physics| physics.gravity).unwrap_or(WORLD_GRAVITY).y.abs();
    let target = players.iter().next().map(|transform| transform.translation.truncate());

    for (entity, transform, mut cycle) in bosses.iter_mut() {
        let previous = cycle.state();
        let effects = cycle.tick(delta, &mut rng);
        if previous != cycle.state() {
            crate::log(&format!("🏗️ Boss {:?}: {:?} → {:?}", entity, previous, cycle.state()));
        }

        let throws = effects.iter().any(|effect| matches!(effect, BossEffect::SpawnVolleys { .. }));
        if throws && target.is_none() && !*warned_no_player {
            crate::log_warning("Boss: no player in world, volleys skipped");
            *warned_no_player = true;
        }

        apply_effects(
            entity,
            transform.translation.truncate(),
            &cycle,
            effects,
            ThrowTarget {
                position: target,
                gravity,
            },
            &mut commands,
            &mut rng,
            &mut animation_requests,
            &mut health_events,
        );
    }
}

/// Система: BossDamage → HP, furious, смерть (Resolve / Contacts)
pub fn apply_boss_damage(
    mut commands: Commands,
    mut damage_events: EventReader<BossDamage>,
    mut bosses: Query<(&Transform, &mut BossCycle, &mut Health, &mut KinematicBody)>,
    mut rng: ResMut<DeterministicRng>,
    mut animation_requests: EventWriter<AnimationRequest>,
    mut health_events: EventWriter<BossHealthChanged>,
) {
    for damage in damage_events.read() {
        let Ok((transform, mut cycle, mut health, mut body)) = bosses.get_mut(damage.boss) else {
            continue;
        };
        if cycle.is_dead() {
            crate::log(&format!("Boss {:?}: damage after death ignored", damage.boss));
            continue;
        }

        let effects = cycle.receive_damage(&mut health, damage.amount);
        crate::log(&format!(
            "💥 Boss {:?}: -{} HP ({}/{}){}",
            damage.boss,
            damage.amount.unsigned_abs(),
            health.current,
            health.max,
            if cycle.is_furious() { " FURIOUS" } else { "" }
        ));
        if cycle.is_dead() {
            body.shut_down();
        }

        apply_effects(
            damage.boss,
            transform.translation.truncate(),
            &cycle,
            effects,
            ThrowTarget {
                position: None,
                gravity: 0.0,
            },
            &mut commands,
            &mut rng,
            &mut animation_requests,
            &mut health_events,
        );
    }
}

pub struct BossPlugin;

impl Plugin for BossPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<BossDamage>()
            .add_event::<BossHealthChanged>()
            .add_systems(FixedUpdate, boss_cycle_tick.in_set(SimulationSet::Decide))
            .add_systems(
                FixedUpdate,
                (apply_boss_damage, resolve_debris_contacts).in_set(ResolveSet::Contacts),
            );
    }
}
