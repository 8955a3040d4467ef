//! Patrol ECS systems
//!
//! - `tick_patrol` (Timers): post-hit / flip cooldown, anti-stuck
//! - `patrol_move` (Decide): разворот по сенсорам + скорость
//! - `patrol_animation` (Decide): IsRunning / Stunned bools

use bevy::prelude::*;

use crate::animation::{AnimationRequest, AnimationTracker};
use crate::components::{Enemy, Facing, Inert};
use crate::enemy::patrol::Patrol;
use crate::melee::MeleeBrain;
use crate::physics::{KinematicBody, PatrolSensor};
use crate::stun::EnemyStun;

/// Система: таймеры patrol + anti-stuck
///
/// Melee brain сам управляет facing, anti-stuck ему не нужен.
pub fn tick_patrol(
    time: Res<Time<Fixed>>,
    mut enemies: Query<
        (Entity, &mut Patrol, &mut Facing, &KinematicBody, &EnemyStun, Has<MeleeBrain>),
        (With<Enemy>, Without<Inert>),
    >,
) {
    let delta = time.delta_secs();

    for (entity, mut patrol, mut facing, body, stun, has_brain) in enemies.iter_mut() {
        patrol.tick_cooldowns(delta);
        if has_brain || !body.is_active() {
            continue;
        }
        if patrol.update_stuck(body.velocity.x, stun.is_stunned(), &mut facing, delta) {
            crate::log(&format!("Patrol {:?}: stuck, flipped to {}", entity, facing.sign()));
        }
    }
}

/// Система: сенсоры → разворот → vx = dir * speed
#[allow(clippy::type_complexity)]
pub fn patrol_move(
    mut enemies: Query<
        (Entity, &mut Patrol, &PatrolSensor, &mut Facing, &mut KinematicBody, &EnemyStun),
        (With<Enemy>, Without<MeleeBrain>, Without<Inert>),
    >,
) {
    for (entity, mut patrol, sensor, mut facing, mut body, stun) in enemies.iter_mut() {
        if !body.simulated {
            continue;
        }
        if stun.is_stunned() {
            body.velocity.x = 0.0;
            continue;
        }

        if patrol.decide_turn(sensor, &mut facing) {
            crate::log(&format!(
                "Patrol {:?}: turn (wall={}, edge={})",
                entity,
                sensor.wall_ahead,
                sensor.grounded && sensor.no_ground_ahead
            ));
        }
        body.velocity.x = facing.sign() * patrol.config.move_speed;
    }
}

/// Система: animator bools (только при изменении)
pub fn patrol_animation(
    mut enemies: Query<
        (Entity, &Patrol, &KinematicBody, &EnemyStun, &mut AnimationTracker),
        (With<Enemy>, Without<Inert>),
    >,
    mut animation_requests: EventWriter<AnimationRequest>,
) {
    for (entity, patrol, body, stun, mut tracker) in enemies.iter_mut() {
        if !body.simulated {
            continue;
        }
        let running = !stun.is_stunned() && body.velocity.x.abs() > patrol.config.run_threshold;

        if let Some(command) = tracker.set_bool("IsRunning", running) {
            animation_requests.write(AnimationRequest::new(entity, command));
        }
        if let Some(command) = tracker.set_bool("Stunned", stun.is_stunned()) {
            animation_requests.write(AnimationRequest::new(entity, command));
        }
    }
}
