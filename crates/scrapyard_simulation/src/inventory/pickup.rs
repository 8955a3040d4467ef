//! Pickup: предметы на земле, подбор по запросу

use bevy::prelude::*;

use crate::components::Player;
use crate::inventory::events::{InventoryChanged, ItemPicked, PickupMessage, PickupRequest};
use crate::inventory::store::{Inventory, ItemKind};

/// Предмет, который можно подобрать (loot с врагов тоже)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct ItemPickup {
    pub kind: ItemKind,
    pub amount: u32,
    pub range: f32,
}

impl ItemPickup {
    pub const DEFAULT_RANGE: f32 = 3.0;

    pub fn new(kind: ItemKind, amount: u32) -> Self {
        Self {
            kind,
            amount,
            range: Self::DEFAULT_RANGE,
        }
    }
}

/// Система: PickupRequest → inventory (дистанция до игрока ≤ range)
pub fn process_pickup_requests(
    mut commands: Commands,
    mut requests: EventReader<PickupRequest>,
    mut inventory: ResMut<Inventory>,
    players: Query<&Transform, With<Player>>,
    items: Query<(&Transform, &ItemPickup)>,
    mut picked_events: EventWriter<ItemPicked>,
    mut messages: EventWriter<PickupMessage>,
) {
    for request in requests.read() {
        let Ok((item_transform, item)) = items.get(request.item) else {
            continue;
        };
        let Some(player_transform) = players.iter().next() else {
            crate::log_warning("Pickup: no player in world, request ignored");
            continue;
        };

        let distance = player_transform
            .translation
            .truncate()
            .distance(item_transform.translation.truncate());
        if distance > item.range {
            messages.write(PickupMessage { text: "Too far".into() });
            continue;
        }

        if !inventory.add(item.kind, item.amount) {
            messages.write(PickupMessage {
                text: "Cannot pickup".into(),
            });
            continue;
        }

        crate::log(&format!("🧺 Picked {}x {:?}", item.amount, item.kind));
        picked_events.write(ItemPicked {
            kind: item.kind,
            amount: item.amount,
        });
        if let Ok(mut entity) = commands.get_entity(request.item) {
            entity.despawn();
        }
    }
}

/// Система: накопленные изменения inventory → события
pub fn flush_inventory_changes(mut inventory: ResMut<Inventory>, mut changed_events: EventWriter<InventoryChanged>) {
    for change in inventory.take_changes() {
        changed_events.write(change);
    }
}
