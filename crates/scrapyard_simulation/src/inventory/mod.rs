//! Inventory & build collaborator
//!
//! - `Inventory` resource (counts, atomic bulk consume)
//! - pickups на земле (loot с execute-kill тоже pickup)
//! - build session: блокирует движение игрока до Place / Cancel

use bevy::prelude::*;

pub mod build;
pub mod events;
pub mod pickup;
pub mod store;

pub use build::{BuildRecipe, BuildSession, BuildSpot};
pub use events::*;
pub use pickup::{flush_inventory_changes, process_pickup_requests, ItemPickup};
pub use store::{Inventory, ItemCost, ItemKind};

use crate::SimulationSet;

pub struct InventoryPlugin;

impl Plugin for InventoryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Inventory>()
            .init_resource::<BuildSession>()
            .add_event::<InventoryChanged>()
            .add_event::<PickupRequest>()
            .add_event::<ItemPicked>()
            .add_event::<PickupMessage>()
            .add_event::<BeginBuild>()
            .add_event::<CancelBuild>()
            .add_event::<PlaceBuild>()
            .add_event::<StructurePlaced>()
            .add_systems(
                FixedUpdate,
                (process_pickup_requests, build::process_build_requests, flush_inventory_changes)
                    .chain()
                    .in_set(SimulationSet::Decide),
            );
    }
}
