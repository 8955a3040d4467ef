//! Enemy domain: patrol враги (standard / canned soda)
//!
//! Patrol — общая capability (`Patrol` + `PatrolSensor` + `EnemyStun`),
//! поведение "просто патруль" = отсутствие другого brain (`MeleeBrain`).
//!
//! Контакты с игроком: stomp / side-hit (`contact`), добивание (`execute`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod contact;
pub mod execute;
pub mod patrol;
pub mod systems;

pub use contact::{classify_contact, ContactClassification, ContactConfig, ContactGeometry, ContactPolicy, ContactResponder};
pub use execute::{
    DropEntry, DropTable, DropThrowConfig, EnemyExecuted, ExecuteConfig, ExecuteKillRequest, ExecuteOnStun, Executed,
};
pub use patrol::{Patrol, PatrolConfig};
pub use systems::*;

use crate::animation::AnimationTracker;
use crate::components::{Enemy, Facing};
use crate::physics::{CollisionLayers, KinematicBody, PatrolSensor};
use crate::stun::EnemyStun;
use crate::tuning::Tuning;
use crate::{ResolveSet, SimulationSet};

/// Полный тюнинг patrol врага
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub half_extents: Vec2,
    pub patrol: PatrolConfig,
    pub contact: ContactConfig,
    pub execute: ExecuteConfig,
    pub drop_throw: DropThrowConfig,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl EnemyConfig {
    pub fn standard() -> Self {
        Self {
            half_extents: Vec2::new(0.4, 0.4),
            patrol: PatrolConfig::default(),
            contact: ContactConfig::default(),
            execute: ExecuteConfig::default(),
            drop_throw: DropThrowConfig::default(),
        }
    }

    /// Банка газировки: быстрее, дольше в stun, сильнее подкидывает
    pub fn canned_soda() -> Self {
        let mut config = Self::standard();
        config.patrol.move_speed = 3.0;
        config.contact.stun_duration = 1.4;
        config.contact.bounce_speed = 14.0;
        config.contact.stomp_vy_threshold = -1.5;
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum EnemyPreset {
    #[default]
    Standard,
    CannedSoda,
}

/// Запрос на спавн patrol врага (debris босса, скрипты уровня)
#[derive(Event, Debug, Clone, Copy)]
pub struct EnemySpawnRequest {
    pub position: Vec2,
    pub preset: EnemyPreset,
    pub facing: Facing,
}

impl EnemySpawnRequest {
    pub fn standard(position: Vec2) -> Self {
        Self {
            position,
            preset: EnemyPreset::Standard,
            facing: Facing::LEFT,
        }
    }
}

/// Spawn patrol врага со всеми capability компонентами
pub fn spawn_patrol_enemy(
    commands: &mut Commands,
    position: Vec2,
    config: &EnemyConfig,
    facing: Facing,
    drops: DropTable,
) -> Entity {
    commands
        .spawn((
            Enemy,
            Transform::from_translation(position.extend(0.0)),
            KinematicBody::new(config.half_extents),
            CollisionLayers::enemy(),
            facing,
            PatrolSensor::new(config.patrol.edge_check_distance, config.patrol.wall_check_distance),
            Patrol::new(config.patrol),
            ContactResponder {
                config: config.contact,
                policy: ContactPolicy::StompAndSideHit,
            },
            EnemyStun::default(),
            ExecuteOnStun { config: config.execute },
            DropTable {
                throw: config.drop_throw,
                ..drops
            },
            AnimationTracker::default(),
        ))
        .id()
}

/// Система: EnemySpawnRequest → spawn по пресету из Tuning
pub fn process_enemy_spawn_requests(
    mut commands: Commands,
    mut requests: EventReader<EnemySpawnRequest>,
    tuning: Res<Tuning>,
) {
    for request in requests.read() {
        let config = match request.preset {
            EnemyPreset::Standard => &tuning.standard_enemy,
            EnemyPreset::CannedSoda => &tuning.canned_soda,
        };
        let entity = spawn_patrol_enemy(
            &mut commands,
            request.position,
            config,
            request.facing,
            DropTable::single(crate::inventory::ItemKind::Plastic, 1),
        );
        crate::log(&format!("🥫 Spawned {:?} enemy {:?} at {:?}", request.preset, entity, request.position));
    }
}

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EnemySpawnRequest>()
            .add_event::<ExecuteKillRequest>()
            .add_event::<EnemyExecuted>()
            .add_systems(FixedUpdate, tick_patrol.in_set(SimulationSet::Timers))
            .add_systems(
                FixedUpdate,
                (patrol_move, patrol_animation, execute::execute_on_interact)
                    .chain()
                    .in_set(SimulationSet::Decide),
            )
            .add_systems(FixedUpdate, contact::resolve_enemy_contacts.in_set(ResolveSet::Contacts))
            .add_systems(
                FixedUpdate,
                (execute::apply_execute_kills, process_enemy_spawn_requests).in_set(ResolveSet::Reactions),
            );
    }
}
