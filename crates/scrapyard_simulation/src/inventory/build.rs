//! Build session: игрок выбирает рецепт, ставит на свободный spot

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Player;
use crate::inventory::events::{BeginBuild, CancelBuild, PlaceBuild, StructurePlaced};
use crate::inventory::store::{Inventory, ItemCost};
use crate::player::{BlockReason, MovementBlocks};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRecipe {
    pub id: String,
    pub costs: Vec<ItemCost>,
}

/// Место под постройку
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct BuildSpot {
    pub occupied: bool,
    /// Смещение точки установки от Transform spot-а
    pub place_offset: Vec2,
}

impl BuildSpot {
    pub fn place_point(&self, spot_position: Vec2) -> Vec2 {
        spot_position + self.place_offset
    }
}

/// Активная build session (не больше одной)
#[derive(Resource, Debug, Default)]
pub struct BuildSession {
    active: Option<BuildRecipe>,
}

impl BuildSession {
    pub fn active(&self) -> Option<&BuildRecipe> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

fn set_build_block(players: &mut Query<&mut MovementBlocks, With<Player>>, blocked: bool) {
    for mut blocks in players.iter_mut() {
        if blocked {
            blocks.block(BlockReason::Build);
        } else {
            blocks.unblock(BlockReason::Build);
        }
    }
}

/// Система: Begin / Cancel / Place
pub fn process_build_requests(
    mut session: ResMut<BuildSession>,
    mut inventory: ResMut<Inventory>,
    mut begin_events: EventReader<BeginBuild>,
    mut cancel_events: EventReader<CancelBuild>,
    mut place_events: EventReader<PlaceBuild>,
    mut spots: Query<(&Transform, &mut BuildSpot)>,
    mut players: Query<&mut MovementBlocks, With<Player>>,
    mut placed_events: EventWriter<StructurePlaced>,
) {
    for begin in begin_events.read() {
        if !session.is_active() {
            set_build_block(&mut players, true);
        }
        crate::log(&format!("🔨 Build: begin '{}'", begin.recipe.id));
        session.active = Some(begin.recipe.clone());
    }

    for _ in cancel_events.read() {
        if session.active.take().is_some() {
            set_build_block(&mut players, false);
            crate::log("🔨 Build: cancelled");
        }
    }

    for place in place_events.read() {
        let Some(recipe) = session.active.as_ref() else {
            crate::log_warning("Build: place without active session");
            continue;
        };
        let Ok((transform, mut spot)) = spots.get_mut(place.spot) else {
            continue;
        };
        if spot.occupied {
            crate::log(&format!("Build: spot {:?} occupied", place.spot));
            continue;
        }
        if !inventory.try_consume_bulk(&recipe.costs) {
            crate::log(&format!("Build: not enough materials for '{}'", recipe.id));
            continue;
        }

        spot.occupied = true;
        let position = spot.place_point(transform.translation.truncate());
        crate::log(&format!("🏗️ Build: '{}' placed at {:?}", recipe.id, position));
        placed_events.write(StructurePlaced {
            recipe_id: recipe.id.clone(),
            spot: place.spot,
            position,
        });

        session.active = None;
        set_build_block(&mut players, false);
    }
}
