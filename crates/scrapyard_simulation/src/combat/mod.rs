//! Combat glue: общие для всех доменов lifecycle системы
//!
//! Stun и урон живут в своих модулях (`stun`, `enemy`, `melee`, `boss`),
//! здесь только уборка entity после смерти / по таймеру.

use bevy::prelude::*;

pub mod lifecycle;

pub use lifecycle::{despawn_after_timeout, DespawnAfter};

use crate::SimulationSet;

/// Combat Plugin
///
/// despawn_after_timeout идёт после физики: entity, умершие в этом тике,
/// успевают отдать последние contact события.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, despawn_after_timeout.after(SimulationSet::Physics));
    }
}
