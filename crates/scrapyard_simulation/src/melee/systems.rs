//! Melee ECS systems
//!
//! Decide: `melee_brain_tick` (brain + facing + velocity + анимация),
//! `apply_swing_signals`. Resolve: `melee_hit_check` (Contacts),
//! `melee_stun_reactions` (Reactions, отмена замаха в том же тике).

use bevy::prelude::*;

use crate::animation::{AnimationRequest, AnimationTracker, SwingSignal};
use crate::components::{Enemy, Facing, Inert, Player};
use crate::melee::brain::{MeleeBrain, MeleeSenses, MeleeState};
use crate::physics::KinematicBody;
use crate::stun::{EnemyStun, PlayerStun, StunEntered, StunRequest};

fn emit_state_animations(
    entity: Entity,
    brain: &mut MeleeBrain,
    tracker: &mut AnimationTracker,
    animation_requests: &mut EventWriter<AnimationRequest>,
) {
    for state in brain.take_entered_states() {
        let anim = &brain.config.anim;
        let command = match state {
            MeleeState::Idle => tracker.play_once(&anim.idle, anim.cross_fade),
            MeleeState::Chase | MeleeState::Cooldown => tracker.play_once(&anim.run, anim.cross_fade),
            MeleeState::Stunned => tracker.play_once(&anim.stunned, anim.cross_fade),
            MeleeState::Attack => tracker.force_restart(&anim.attack),
        };
        if let Some(command) = command {
            animation_requests.write(AnimationRequest::new(entity, command));
        }
    }
}

/// Система: brain tick → facing, freeze, velocity, анимация
#[allow(clippy::type_complexity)]
pub fn melee_brain_tick(
    time: Res<Time<Fixed>>,
    mut enemies: Query<
        (
            Entity,
            &Transform,
            &mut MeleeBrain,
            &mut Facing,
            &mut KinematicBody,
            &EnemyStun,
            &mut AnimationTracker,
        ),
        (With<Enemy>, Without<Player>, Without<Inert>),
    >,
    players: Query<(&Transform, &KinematicBody), (With<Player>, Without<Enemy>, Without<Inert>)>,
    mut animation_requests: EventWriter<AnimationRequest>,
    mut warned_no_player: Local<bool>,
) {
    let delta = time.delta_secs();

    let Some((player_transform, player_body)) = players.iter().next() else {
        if !enemies.is_empty() && !*warned_no_player {
            crate::log_warning("MeleeBrain: no player in world, melee enemies idle");
            *warned_no_player = true;
        }
        return;
    };
    let player_position = player_transform.translation.truncate();
    let senses_template = MeleeSenses {
        position: Vec2::ZERO,
        player_position,
        player_bounds: player_body.bounds(player_position),
        stunned: false,
    };

    for (entity, transform, mut brain, mut facing, mut body, stun, mut tracker) in enemies.iter_mut() {
        if !body.simulated {
            continue;
        }
        let previous = brain.state();
        brain.tick(
            &MeleeSenses {
                position: transform.translation.truncate(),
                stunned: stun.is_stunned(),
                ..senses_template
            },
            delta,
        );

        if previous != brain.state() {
            crate::log(&format!("🧃 Melee {:?}: {:?} → {:?}", entity, previous, brain.state()));
        }

        *facing = Facing::from_dx(brain.current_facing());
        body.freeze_x = brain.is_frozen();
        body.velocity.x = brain.desired_velocity_x(stun.is_stunned());

        emit_state_animations(entity, &mut brain, &mut tracker, &mut animation_requests);
    }
}

/// Система: маркеры анимации атаки (HitOn / HitOff / End)
pub fn apply_swing_signals(
    mut signals: EventReader<SwingSignal>,
    mut enemies: Query<(&mut MeleeBrain, &mut KinematicBody, &mut AnimationTracker), Without<Inert>>,
    mut animation_requests: EventWriter<AnimationRequest>,
) {
    for signal in signals.read() {
        let Ok((mut brain, mut body, mut tracker)) = enemies.get_mut(signal.entity) else {
            continue;
        };
        brain.on_swing_marker(signal.marker);
        body.freeze_x = brain.is_frozen();
        emit_state_animations(signal.entity, &mut brain, &mut tracker, &mut animation_requests);
    }
}

/// Система: hitbox замаха vs игрок (один hit на замах)
pub fn melee_hit_check(
    mut enemies: Query<(Entity, &Transform, &mut MeleeBrain), (With<Enemy>, Without<Inert>)>,
    players: Query<(Entity, &Transform, &KinematicBody, &PlayerStun), (With<Player>, Without<Inert>)>,
    mut stun_requests: EventWriter<StunRequest>,
) {
    for (entity, transform, mut brain) in enemies.iter_mut() {
        if !brain.can_hit() {
            continue;
        }
        let position = transform.translation.truncate();
        let hitbox = brain.hitbox(position);
        let attack_facing = brain.swing().attack_facing;

        for (player, player_transform, player_body, player_stun) in players.iter() {
            let player_position = player_transform.translation.truncate();
            if !player_body.is_active() || !hitbox.overlaps(&player_body.bounds(player_position)) {
                continue;
            }
            if !player_stun.can_be_stunned() {
                continue;
            }
            let side = if player_position.x - position.x >= 0.0 { 1.0 } else { -1.0 };
            if side != attack_facing {
                continue;
            }

            crate::log(&format!("🥊 Melee {:?}: HIT player {:?}", entity, player));
            stun_requests.write(StunRequest::new(
                player,
                brain.config.player_stun_time,
                Vec2::new(attack_facing * brain.config.hit_knockback.x, brain.config.hit_knockback.y),
            ));
            brain.register_hit();
            break;
        }
    }
}

/// Система: stun → отмена замаха (hitbox off, freeze снят) в том же тике
pub fn melee_stun_reactions(
    mut stun_events: EventReader<StunEntered>,
    mut enemies: Query<(&mut MeleeBrain, &mut KinematicBody, &mut AnimationTracker), Without<Inert>>,
    mut animation_requests: EventWriter<AnimationRequest>,
) {
    for event in stun_events.read() {
        let Ok((mut brain, mut body, mut tracker)) = enemies.get_mut(event.entity) else {
            continue;
        };
        brain.enter_stun();
        body.freeze_x = false;
        body.velocity.x = 0.0;
        emit_state_animations(event.entity, &mut brain, &mut tracker, &mut animation_requests);
    }
}
