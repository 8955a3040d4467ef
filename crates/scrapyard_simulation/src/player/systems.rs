//! Player ECS systems

use bevy::prelude::*;

use crate::animation::{AnimationRequest, AnimationTracker};
use crate::components::{Facing, Inert, Player};
use crate::physics::{GroundSensor, KinematicBody};
use crate::player::input::PlayerInput;
use crate::player::locomotion::{BlockReason, MovementBlocks, PlayerLocomotion};
use crate::player::presentation::PlayerPresentation;
use crate::stun::PlayerStun;

/// Система: grounded / coyote / jump buffer (Timers)
pub fn tick_player_locomotion(
    time: Res<Time<Fixed>>,
    mut players: Query<
        (&mut PlayerLocomotion, &PlayerInput, &GroundSensor, &MovementBlocks, Option<&PlayerStun>),
        (With<Player>, Without<Inert>),
    >,
) {
    let delta = time.delta_secs();

    for (mut locomotion, input, sensor, blocks, stun) in players.iter_mut() {
        let stunned = stun.is_some_and(|s| s.is_stunned());
        let can_move = !stunned && !blocks.is_blocked();
        locomotion.update_timers(input, sensor.contact, can_move, delta);
    }
}

/// Система: landing lock + animator параметры (Decide)
pub fn update_player_presentation(
    time: Res<Time<Fixed>>,
    mut players: Query<
        (
            Entity,
            &mut PlayerPresentation,
            &PlayerLocomotion,
            &KinematicBody,
            &PlayerInput,
            &mut MovementBlocks,
            &mut AnimationTracker,
        ),
        (With<Player>, Without<Inert>),
    >,
    mut animation_requests: EventWriter<AnimationRequest>,
) {
    let delta = time.delta_secs();

    for (entity, mut presentation, locomotion, body, input, mut blocks, mut tracker) in players.iter_mut() {
        let changes = presentation.update(
            locomotion.grounded_raw,
            locomotion.is_grounded(),
            body.velocity.y,
            input.axis().abs(),
            delta,
        );

        if changes.landed {
            animation_requests.write(AnimationRequest::trigger(entity, "Land"));
        }
        if changes.landing_lock_started {
            blocks.block(BlockReason::Landing);
        }
        if changes.landing_lock_released {
            blocks.unblock(BlockReason::Landing);
        }

        if let Some(command) = tracker.set_bool("IsGrounded", locomotion.is_grounded()) {
            animation_requests.write(AnimationRequest::new(entity, command));
        }
        if let Some(running) = changes.running {
            if let Some(command) = tracker.set_bool("IsRunning", running) {
                animation_requests.write(AnimationRequest::new(entity, command));
            }
        }
    }
}

/// Система: velocity от locomotion (Integrate)
///
/// Stun knockback уже записан в body на Resolve; здесь он гасится обычным
/// decel (или SnapToZero), гравитация работает всегда.
pub fn apply_player_locomotion(
    time: Res<Time<Fixed>>,
    mut players: Query<(&mut PlayerLocomotion, &mut KinematicBody, &mut Facing), (With<Player>, Without<Inert>)>,
) {
    let delta = time.delta_secs();

    for (mut locomotion, mut body, mut facing) in players.iter_mut() {
        if !body.simulated {
            continue;
        }
        body.velocity = locomotion.integrate(body.velocity, delta);

        if locomotion.input_x.abs() > 0.01 {
            *facing = Facing::from_dx(locomotion.input_x);
        }
    }
}

/// Система: сброс edge флагов input в конце тика
pub fn clear_input_edges(mut inputs: Query<&mut PlayerInput>) {
    for mut input in inputs.iter_mut() {
        input.clear_edges();
    }
}
