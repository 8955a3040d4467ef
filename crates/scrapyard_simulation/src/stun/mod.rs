//! Stun / invulnerability domain
//!
//! Игрок: таймер stun + окно неуязвимости после него (re-stun timer).
//! Враги: только таймер stun, повторные stomp допустимы.
//!
//! Любой источник урона шлёт `StunRequest`, наблюдатели (VFX, melee brain,
//! movement) слушают `StunEntered` / `StunRecovered`.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;


pub use components::{AppliedStun, EnemyStun, PlayerStun, Recovery, StunConfig};
pub use events::{StunEntered, StunKnockback, StunRecovered, StunRequest};
pub use systems::*;

use crate::{ResolveSet, SimulationSet};

pub struct StunPlugin;

impl Plugin for StunPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<StunRequest>()
            .add_event::<StunEntered>()
            .add_event::<StunRecovered>()
            .add_systems(
                FixedUpdate,
                (tick_player_stun, tick_enemy_stun).in_set(SimulationSet::Timers),
            )
            .add_systems(FixedUpdate, apply_stun_requests.in_set(ResolveSet::ApplyStun));
    }
}
