//! Player domain — locomotion, input, presentation (landing lock)
//!
//! Stun игрока живёт в `stun` (его же дёргают враги), здесь только
//! реакция движения на него через `MovementBlocks`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod input;
pub mod locomotion;
pub mod presentation;
pub mod systems;

pub use input::PlayerInput;
pub use locomotion::{BlockReason, LocomotionConfig, MovementBlocks, PlayerLocomotion, StunnedHorizontal};
pub use presentation::{PlayerPresentation, PresentationConfig};
pub use systems::*;

use crate::animation::AnimationTracker;
use crate::components::{Facing, Player};
use crate::physics::{CollisionLayers, GroundSensor, KinematicBody};
use crate::stun::{PlayerStun, StunConfig};
use crate::SimulationSet;

/// Всё что нужно для spawn игрока
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub half_extents: Vec2,
    pub locomotion: LocomotionConfig,
    pub stun: StunConfig,
    pub presentation: PresentationConfig,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            half_extents: Vec2::new(0.3, 0.5),
            locomotion: LocomotionConfig::default(),
            stun: StunConfig::default(),
            presentation: PresentationConfig::default(),
        }
    }
}

/// Spawn игрока. Гравитацию считает locomotion, поэтому gravity_scale = 0.
pub fn spawn_player(commands: &mut Commands, position: Vec2, tuning: &PlayerTuning) -> Entity {
    commands
        .spawn((
            Player,
            Transform::from_translation(position.extend(0.0)),
            KinematicBody::new(tuning.half_extents).with_gravity_scale(0.0),
            CollisionLayers::player(),
            Facing::RIGHT,
            GroundSensor::new(tuning.locomotion.ground_check),
            PlayerInput::default(),
            PlayerLocomotion::new(tuning.locomotion),
            PlayerPresentation::new(tuning.presentation),
            PlayerStun::new(tuning.stun),
            MovementBlocks::default(),
            AnimationTracker::default(),
        ))
        .id()
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, tick_player_locomotion.in_set(SimulationSet::Timers))
            .add_systems(FixedUpdate, update_player_presentation.in_set(SimulationSet::Decide))
            .add_systems(
                FixedUpdate,
                (apply_player_locomotion, clear_input_edges)
                    .chain()
                    .in_set(SimulationSet::Integrate),
            );
    }
}
