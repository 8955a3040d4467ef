//! Inventory / pickup / build события
//!
//! **Pickup:** `PickupRequest` → `ItemPicked` или `PickupMessage`
//! **Build:** `BeginBuild` → (`PlaceBuild` → `StructurePlaced`) | `CancelBuild`

use bevy::prelude::*;

use crate::inventory::store::ItemKind;
use crate::inventory::build::BuildRecipe;

/// Счётчик типа изменился (HUD слушает)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryChanged {
    pub kind: ItemKind,
    pub count: u32,
    pub total: u32,
}

/// Игрок кликнул по предмету
#[derive(Event, Debug, Clone, Copy)]
pub struct PickupRequest {
    pub item: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPicked {
    pub kind: ItemKind,
    pub amount: u32,
}

/// Текст для игрока ("Too far", "Cannot pickup")
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct PickupMessage {
    pub text: String,
}

/// Начать build session (блокирует движение игрока)
#[derive(Event, Debug, Clone)]
pub struct BeginBuild {
    pub recipe: BuildRecipe,
}

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct CancelBuild;

/// Поставить текущий рецепт на spot
#[derive(Event, Debug, Clone, Copy)]
pub struct PlaceBuild {
    pub spot: Entity,
}

/// Постройка поставлена (хост инстанцирует prefab по `recipe_id`)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct StructurePlaced {
    pub recipe_id: String,
    pub spot: Entity,
    pub position: Vec2,
}
