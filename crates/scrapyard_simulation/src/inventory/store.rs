//! Inventory resource: счётчики по типу предмета + общий total

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::inventory::events::InventoryChanged;

/// Тип мусора (материал для построек)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
pub enum ItemKind {
    Plastic,
    Paper,
    Glass,
    Organic,
    Metal,
}

impl ItemKind {
    pub const ALL: [ItemKind; 5] = [
        ItemKind::Plastic,
        ItemKind::Paper,
        ItemKind::Glass,
        ItemKind::Organic,
        ItemKind::Metal,
    ];
}

/// Стоимость: `amount` штук `kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub struct ItemCost {
    pub kind: ItemKind,
    pub amount: u32,
}

impl ItemCost {
    pub fn new(kind: ItemKind, amount: u32) -> Self {
        Self { kind, amount }
    }
}

/// Inventory (singleton resource)
///
/// Каждое изменение копится в `pending`, система `flush_inventory_changes`
/// превращает их в `InventoryChanged` события.
#[derive(Resource, Debug, Default)]
pub struct Inventory {
    counts: HashMap<ItemKind, u32>,
    total: u32,
    pending: Vec<InventoryChanged>,
}

impl Inventory {
    pub fn count(&self, kind: ItemKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn has_at_least(&self, kind: ItemKind, amount: u32) -> bool {
        self.count(kind) >= amount
    }

    /// false при amount == 0
    pub fn add(&mut self, kind: ItemKind, amount: u32) -> bool {
        if amount == 0 {
            return false;
        }
        let count = self.counts.entry(kind).or_insert(0);
        *count += amount;
        self.total += amount;
        self.record(kind);
        true
    }

    pub fn try_consume(&mut self, kind: ItemKind, amount: u32) -> bool {
        if amount == 0 || !self.has_at_least(kind, amount) {
            return false;
        }
        if let Some(count) = self.counts.get_mut(&kind) {
            *count -= amount;
        }
        self.total -= amount;
        self.record(kind);
        true
    }

    /// All-or-nothing: сначала проверка всех стоимостей (суммарно по типу),
    /// потом списание
    pub fn try_consume_bulk(&mut self, costs: &[ItemCost]) -> bool {
        let mut required: HashMap<ItemKind, u32> = HashMap::new();
        for cost in costs {
            *required.entry(cost.kind).or_insert(0) += cost.amount;
        }
        if required.iter().any(|(kind, amount)| !self.has_at_least(*kind, *amount)) {
            return false;
        }

        for cost in costs {
            if cost.amount > 0 {
                self.try_consume(cost.kind, cost.amount);
            }
        }
        true
    }

    pub fn take_changes(&mut self) -> Vec<InventoryChanged> {
        std::mem::take(&mut self.pending)
    }

    fn record(&mut self, kind: ItemKind) {
        self.pending.push(InventoryChanged {
            kind,
            count: self.count(kind),
            total: self.total,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_requires_positive_amount() {
        let mut inventory = Inventory::default();

        assert!(!inventory.add(ItemKind::Plastic, 0));
        assert!(inventory.add(ItemKind::Plastic, 3));
        assert!(inventory.add(ItemKind::Metal, 1));

        assert_eq!(inventory.count(ItemKind::Plastic), 3);
        assert_eq!(inventory.total(), 4);
        assert_eq!(inventory.take_changes().len(), 2);
        assert!(inventory.take_changes().is_empty());
    }

    #[test]
    fn test_try_consume() {
        let mut inventory = Inventory::default();
        inventory.add(ItemKind::Glass, 2);

        assert!(!inventory.try_consume(ItemKind::Glass, 3));
        assert!(!inventory.try_consume(ItemKind::Glass, 0));
        assert!(inventory.try_consume(ItemKind::Glass, 2));
        assert_eq!(inventory.count(ItemKind::Glass), 0);
        assert_eq!(inventory.total(), 0);
    }

    #[test]
    fn test_bulk_consume_is_atomic() {
        let mut inventory = Inventory::default();
        inventory.add(ItemKind::Plastic, 5);
        inventory.add(ItemKind::Paper, 1);
        inventory.take_changes();

        let costs = [ItemCost::new(ItemKind::Plastic, 3), ItemCost::new(ItemKind::Paper, 2)];
        assert!(!inventory.try_consume_bulk(&costs));
        assert_eq!(inventory.count(ItemKind::Plastic), 5);
        assert_eq!(inventory.count(ItemKind::Paper), 1);
        assert!(inventory.take_changes().is_empty());

        inventory.add(ItemKind::Paper, 1);
        assert!(inventory.try_consume_bulk(&costs));
        assert_eq!(inventory.count(ItemKind::Plastic), 2);
        assert_eq!(inventory.count(ItemKind::Paper), 0);
        assert_eq!(inventory.total(), 2);
    }

    #[test]
    fn test_bulk_consume_sums_duplicate_kinds() {
        let mut inventory = Inventory::default();
        inventory.add(ItemKind::Metal, 4);

        let costs = [ItemCost::new(ItemKind::Metal, 3), ItemCost::new(ItemKind::Metal, 3)];
        assert!(!inventory.try_consume_bulk(&costs));
        assert_eq!(inventory.count(ItemKind::Metal), 4);
    }
}
