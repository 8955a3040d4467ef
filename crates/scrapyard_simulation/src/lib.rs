//! Scrapyard Simulation Core
//!
//! ECS-симуляция боёвки 2D side-scroller на Bevy 0.16:
//! - player locomotion + stun / неуязвимость
//! - patrol враги (stomp / side-hit контакты, execute-kill)
//! - melee враг Tetrapakstein (Idle/Chase/Attack/Cooldown/Stunned)
//! - босс Concreto (Idle/Attack цикл, баллистический debris)
//! - inventory / pickup / build
//!
//! Хост владеет рендером, анимациями и (опционально) физикой. Core общается
//! с ним через компоненты (`KinematicBody`, `PlayerInput`) и события
//! (`AnimationRequest`, `ContactEvent`, `SwingSignal`, ...).

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod animation;
pub mod boss;
pub mod combat;
pub mod components;
pub mod enemy;
pub mod inventory;
pub mod logger;
pub mod melee;
pub mod physics;
pub mod player;
pub mod stun;
pub mod tuning;

// Re-export базовых типов для удобства
pub use animation::{AnimCommand, AnimationPlugin, AnimationRequest, AnimatorSlot, SwingMarker, SwingSignal};
pub use boss::{spawn_boss, BossConfig, BossCycle, BossDamage, BossHealthChanged, BossPlugin, BossState, Debris};
pub use combat::{CombatPlugin, DespawnAfter};
pub use components::*;
pub use enemy::{
    spawn_patrol_enemy, ContactClassification, EnemyConfig, EnemyPlugin, EnemySpawnRequest, ExecuteKillRequest,
    Patrol,
};
pub use inventory::{Inventory, InventoryChanged, InventoryPlugin, ItemCost, ItemKind};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, log_with_level, set_log_level, set_logger,
    set_logger_if_needed, ConsoleLogger, LogLevel, LogPrinter,
};
pub use melee::{spawn_melee_enemy, MeleeBrain, MeleeConfig, MeleePlugin, MeleeState};
pub use physics::{
    CollisionLayers, ContactEvent, ContactPhase, HeadlessPhysics, HeadlessPhysicsPlugin, KinematicBody,
    RapierBridgePlugin, StaticSolid,
};
pub use player::{spawn_player, PlayerInput, PlayerLocomotion, PlayerPlugin, PlayerTuning};
pub use stun::{EnemyStun, PlayerStun, StunEntered, StunPlugin, StunRecovered, StunRequest};
pub use tuning::{Tuning, TuningError};

/// Фазы fixed tick (строго последовательно)
///
/// Sense → Timers → Decide → Resolve → Integrate → Physics
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Backend: индекс коллайдеров, сенсоры, (Rapier) контакты
    Sense,
    /// Таймеры: stun, cooldown-ы, coyote/buffer
    Timers,
    /// State machines: patrol, melee brain, boss cycle
    Decide,
    /// Контакты, удары, stun requests
    Resolve,
    /// Velocity от gameplay (locomotion)
    Integrate,
    /// Backend: интеграция, контакты (headless) / sync в Rapier
    Physics,
}

/// Порядок внутри Resolve: источники урона → применение stun → реакции на stun
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveSet {
    Contacts,
    ApplyStun,
    Reactions,
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Physics backend добавляется отдельно: `HeadlessPhysicsPlugin` или
/// `RapierBridgePlugin`.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG (seed по умолчанию)
            .insert_resource(DeterministicRng::new(42))
            // Tuning по умолчанию (хост может заменить загруженным из JSON)
            .init_resource::<Tuning>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Sense,
                    SimulationSet::Timers,
                    SimulationSet::Decide,
                    SimulationSet::Resolve,
                    SimulationSet::Integrate,
                    SimulationSet::Physics,
                )
                    .chain(),
            )
            .configure_sets(
                FixedUpdate,
                (ResolveSet::Contacts, ResolveSet::ApplyStun, ResolveSet::Reactions)
                    .chain()
                    .in_set(SimulationSet::Resolve),
            )
            .add_systems(FixedUpdate, mark_bodyless_actors_inert.in_set(SimulationSet::Sense))
            // Подсистемы
            .add_plugins((
                AnimationPlugin,
                StunPlugin,
                PlayerPlugin,
                EnemyPlugin,
                MeleePlugin,
                BossPlugin,
                InventoryPlugin,
                CombatPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Единственный источник случайности: aim noise, idle таймеры босса,
/// spawn chance, бросок loot.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Uniform [min, max]; перепутанные границы меняются местами
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        if lo == hi {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// true с вероятностью `probability`
    pub fn chance(&mut self, probability: f32) -> bool {
        self.rng.gen::<f32>() < probability
    }

    /// -1.0 или 1.0
    pub fn sign(&mut self) -> f32 {
        if self.rng.gen_bool(0.5) {
            1.0
        } else {
            -1.0
        }
    }

    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.rng.gen_range(0..len))
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// MinimalPlugins + ручной шаг времени: каждый `app.update()` = ровно один
/// fixed tick (1/60 s), независимо от wall clock.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .add_plugins((SimulationPlugin, HeadlessPhysicsPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// То же, но физика через Rapier (`RapierBridgePlugin`)
///
/// TransformPlugin нужен Rapier для sync GlobalTransform.
pub fn create_rapier_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins((MinimalPlugins, TransformPlugin))
        .add_plugins((SimulationPlugin, RapierBridgePlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0));

    app.finish();
    app.cleanup();
    app
}

/// Система: актор без тела → Inert (warning один раз)
pub fn mark_bodyless_actors_inert(
    mut commands: Commands,
    actors: Query<Entity, (Or<(With<Player>, With<Enemy>)>, Without<KinematicBody>, Without<Inert>)>,
) {
    for entity in actors.iter() {
        mark_inert(&mut commands, entity, "no KinematicBody");
    }
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
