//! Execute-kill: добивание оглушённого врага + loot drop
//!
//! Игрок жмёт interact рядом со stunned врагом → `Execute` анимация игрока
//! и `ExecuteKillRequest`. Сам kill идемпотентен (маркер `Executed`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::animation::AnimationRequest;
use crate::combat::DespawnAfter;
use crate::components::{Enemy, Inert, Player};
use crate::inventory::{ItemKind, ItemPickup};
use crate::physics::{CollisionLayers, KinematicBody};
use crate::player::PlayerInput;
use crate::stun::EnemyStun;
use crate::DeterministicRng;

/// Сколько раз пробуем вытянуть непустой слот drop table
pub const DROP_PICK_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecuteConfig {
    pub execute_range: f32,
    pub drop_offset: Vec2,
    pub destroy_delay: f32,
}

impl Default for ExecuteConfig {
    fn default() -> Self {
        Self {
            execute_range: 1.1,
            drop_offset: Vec2::new(0.0, 0.5),
            destroy_delay: 0.5,
        }
    }
}

/// Враг можно добить, пока он в stun
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct ExecuteOnStun {
    pub config: ExecuteConfig,
}

/// Бросок loot (скорости в m/s, spin в deg/s)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct DropThrowConfig {
    pub side_speed_min: f32,
    pub side_speed_max: f32,
    pub up_speed_min: f32,
    pub up_speed_max: f32,
    pub torque_min: f32,
    pub torque_max: f32,
    pub gravity_scale: f32,
    pub bias_away_from_player: bool,
    pub half_extents: Vec2,
}

impl Default for DropThrowConfig {
    fn default() -> Self {
        Self {
            side_speed_min: 1.5,
            side_speed_max: 3.5,
            up_speed_min: 4.0,
            up_speed_max: 7.0,
            torque_min: -20.0,
            torque_max: 20.0,
            gravity_scale: 1.0,
            bias_away_from_player: true,
            half_extents: Vec2::splat(0.2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub struct DropEntry {
    pub kind: ItemKind,
    pub amount: u32,
}

/// Drop table: `None` слоты = "ничего не выпало"
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct DropTable {
    pub entries: Vec<Option<DropEntry>>,
    pub throw: DropThrowConfig,
}

impl DropTable {
    pub fn single(kind: ItemKind, amount: u32) -> Self {
        Self {
            entries: vec![Some(DropEntry { kind, amount })],
            ..default()
        }
    }

    /// Best-effort: до DROP_PICK_ATTEMPTS случайных слотов, пустой результат допустим
    pub fn pick(&self, rng: &mut DeterministicRng) -> Option<DropEntry> {
        for _ in 0..DROP_PICK_ATTEMPTS {
            let index = rng.index(self.entries.len())?;
            if let Some(entry) = self.entries[index] {
                return Some(entry);
            }
        }
        None
    }
}

/// Запрос на execute-kill (от interact или от хоста)
#[derive(Event, Debug, Clone, Copy)]
pub struct ExecuteKillRequest {
    pub enemy: Entity,
    pub drop: Option<DropEntry>,
    pub drop_offset: Vec2,
    pub destroy_delay: f32,
}

/// Враг добит (drop — entity брошенного loot)
#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyExecuted {
    pub enemy: Entity,
    pub drop: Option<Entity>,
}

/// Маркер: execute-kill уже применён
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Executed;

/// Система: interact рядом со stunned врагом (Decide)
pub fn execute_on_interact(
    players: Query<(Entity, &Transform, &PlayerInput), (With<Player>, Without<Inert>)>,
    enemies: Query<
        (Entity, &Transform, &EnemyStun, &ExecuteOnStun, Option<&DropTable>),
        (With<Enemy>, Without<Executed>, Without<Inert>),
    >,
    mut rng: ResMut<DeterministicRng>,
    mut animation_requests: EventWriter<AnimationRequest>,
    mut kill_requests: EventWriter<ExecuteKillRequest>,
) {
    for (player, player_transform, input) in players.iter() {
        if !input.interact_pressed {
            continue;
        }
        let player_position = player_transform.translation.truncate();

        for (enemy, enemy_transform, stun, execute, drop_table) in enemies.iter() {
            if !stun.is_stunned() {
                continue;
            }
            let distance = player_position.distance(enemy_transform.translation.truncate());
            crate::log(&format!(
                "[Execute] press, dist={:.2} need<={:.2}",
                distance, execute.config.execute_range
            ));
            if distance > execute.config.execute_range {
                crate::log("[Execute] Too far");
                continue;
            }

            animation_requests.write(AnimationRequest::trigger(player, "Execute"));
            kill_requests.write(ExecuteKillRequest {
                enemy,
                drop: drop_table.and_then(|table| table.pick(&mut rng)),
                drop_offset: execute.config.drop_offset,
                destroy_delay: execute.config.destroy_delay,
            });
        }
    }
}

/// Система: применение execute-kill (Resolve / Reactions)
///
/// Коллайдеры и симуляция выключаются, loot бросается от игрока,
/// `Die` trigger, деспавн через `destroy_delay`.
#[allow(clippy::type_complexity)]
pub fn apply_execute_kills(
    mut commands: Commands,
    mut requests: EventReader<ExecuteKillRequest>,
    mut enemies: Query<
        (&Transform, &mut KinematicBody, Option<&DropTable>, Has<Executed>),
        (With<Enemy>, Without<Player>),
    >,
    players: Query<&Transform, With<Player>>,
    mut rng: ResMut<DeterministicRng>,
    mut animation_requests: EventWriter<AnimationRequest>,
    mut executed_events: EventWriter<EnemyExecuted>,
    mut handled: Local<Vec<Entity>>,
) {
    handled.clear();

    for request in requests.read() {
        let Ok((transform, mut body, drop_table, already_executed)) = enemies.get_mut(request.enemy) else {
            continue;
        };
        if already_executed || handled.contains(&request.enemy) {
            crate::log(&format!("[Execute] {:?} already executed, ignored", request.enemy));
            continue;
        }
        handled.push(request.enemy);

        let position = transform.translation.truncate();
        body.shut_down();

        let drop = request.drop.map(|entry| {
            let throw = drop_table.map(|table| table.throw).unwrap_or_default();
            let side_sign = match players.iter().next() {
                Some(player) if throw.bias_away_from_player => {
                    let dx = position.x - player.translation.x;
                    if dx >= 0.0 { 1.0 } else { -1.0 }
                }
                _ => rng.sign(),
            };
            let velocity = Vec2::new(
                side_sign * rng.range(throw.side_speed_min, throw.side_speed_max),
                rng.range(throw.up_speed_min, throw.up_speed_max),
            );
            let spin = rng.range(throw.torque_min, throw.torque_max).to_radians();

            let mut drop_body = KinematicBody::new(throw.half_extents)
                .with_gravity_scale(throw.gravity_scale)
                .with_velocity(velocity);
            drop_body.angular_velocity = spin;

            commands
                .spawn((
                    ItemPickup::new(entry.kind, entry.amount),
                    Transform::from_translation((position + request.drop_offset).extend(0.0)),
                    drop_body,
                    CollisionLayers::pickup(),
                ))
                .id()
        });

        commands
            .entity(request.enemy)
            .insert((Executed, DespawnAfter::new(request.destroy_delay)));
        animation_requests.write(AnimationRequest::trigger(request.enemy, "Die"));

        crate::log(&format!("☠️ Execute-kill {:?} (drop {:?})", request.enemy, drop));
        executed_events.write(EnemyExecuted {
            enemy: request.enemy,
            drop,
        });
    }
}
