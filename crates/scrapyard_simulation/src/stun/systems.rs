//! Stun systems: таймеры (Timers) и разрешение StunRequest (Resolve)

use bevy::prelude::*;

use crate::components::Inert;
use crate::physics::KinematicBody;
use crate::player::{BlockReason, MovementBlocks, PlayerLocomotion};
use crate::stun::components::{EnemyStun, PlayerStun};
use crate::stun::events::{StunEntered, StunKnockback, StunRecovered, StunRequest};

/// Система: тик stun игрока, выход из stun снимает блок движения
pub fn tick_player_stun(
    time: Res<Time<Fixed>>,
    mut players: Query<(Entity, &mut PlayerStun, Option<&mut MovementBlocks>), Without<Inert>>,
    mut recovered_events: EventWriter<StunRecovered>,
) {
    let delta = time.delta_secs();

    for (entity, mut stun, blocks) in players.iter_mut() {
        let Some(recovery) = stun.tick(delta) else {
            continue;
        };

        if let Some(mut blocks) = blocks {
            blocks.unblock(BlockReason::Stun);
        }

        crate::log(&format!(
            "💫 PlayerStun: {:?} recovered after {:.3}s (planned {:.3}s)",
            entity, recovery.elapsed, recovery.planned
        ));
        recovered_events.write(StunRecovered {
            entity,
            elapsed: recovery.elapsed,
            planned: recovery.planned,
        });
    }
}

/// Система: тик stun врагов
pub fn tick_enemy_stun(
    time: Res<Time<Fixed>>,
    mut enemies: Query<(Entity, &mut EnemyStun), Without<Inert>>,
    mut recovered_events: EventWriter<StunRecovered>,
) {
    let delta = time.delta_secs();

    for (entity, mut stun) in enemies.iter_mut() {
        if let Some(recovery) = stun.tick(delta) {
            recovered_events.write(StunRecovered {
                entity,
                elapsed: recovery.elapsed,
                planned: recovery.planned,
            });
        }
    }
}

/// Система: StunRequest → PlayerStun / EnemyStun
///
/// Игрок: отказ во время неуязвимости (debug log), иначе knockback сразу в
/// velocity, отмена input/jump текущего тика и блок движения до recovery.
/// Враг: перезапуск таймера, knockback только если задан явно.
pub fn apply_stun_requests(
    mut requests: EventReader<StunRequest>,
    mut players: Query<
        (
            &mut PlayerStun,
            &mut KinematicBody,
            Option<&mut MovementBlocks>,
            Option<&mut PlayerLocomotion>,
        ),
        Without<Inert>,
    >,
    mut enemies: Query<(&mut EnemyStun, &mut KinematicBody), (Without<PlayerStun>, Without<Inert>)>,
    mut entered_events: EventWriter<StunEntered>,
) {
    for request in requests.read() {
        if let Ok((mut stun, mut body, blocks, locomotion)) = players.get_mut(request.target) {
            let applied = match request.knockback {
                StunKnockback::Vector(knockback) => stun.apply(request.duration, knockback),
                StunKnockback::Direction(sign) => stun.apply_directional(request.duration, sign),
            };

            let Some(applied) = applied else {
                crate::log(&format!(
                    "PlayerStun: ignored for {:?} (invuln {:.2}s)",
                    request.target,
                    stun.restun_cooldown()
                ));
                continue;
            };

            body.velocity = applied.knockback;
            if let Some(mut blocks) = blocks {
                blocks.block(BlockReason::Stun);
            }
            // Input этого тика уже прочитан на Timers
            if let Some(mut locomotion) = locomotion {
                locomotion.cancel_for_stun();
            }

            crate::log(&format!(
                "💥 PlayerStun: HURT {:?} dur={:.2} kb={:?} invulnNext={:.2}",
                request.target, applied.duration, applied.knockback, applied.invulnerable_for
            ));
            entered_events.write(StunEntered {
                entity: request.target,
                duration: applied.duration,
                knockback: applied.knockback,
                hurt_flash: stun.config.hurt_flash_time,
                invulnerable_for: applied.invulnerable_for,
            });
            continue;
        }

        if let Ok((mut stun, mut body)) = enemies.get_mut(request.target) {
            stun.apply(request.duration);

            let knockback = match request.knockback {
                StunKnockback::Vector(knockback) => knockback,
                StunKnockback::Direction(sign) => Vec2::new(sign.signum(), 0.0),
            };
            if knockback != Vec2::ZERO {
                body.velocity = knockback;
            }

            entered_events.write(StunEntered {
                entity: request.target,
                duration: request.duration,
                knockback,
                hurt_flash: 0.0,
                invulnerable_for: 0.0,
            });
        }
    }
}
