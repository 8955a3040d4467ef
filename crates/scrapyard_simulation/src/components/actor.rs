//! Базовые компоненты акторов: Player/Enemy маркеры, Facing, Health, Inert

use bevy::prelude::*;

/// Marker component для player-controlled entity
///
/// В arena обычно ровно один. Системы врагов ищут его через `With<Player>`.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Marker для врагов (patrol, melee, debris-spawned)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Enemy;

/// Направление взгляда актора: -1 (влево) или +1 (вправо)
///
/// Инвариант: `sign` всегда ±1. Владелец — state machine актора
/// (patrol / melee brain / locomotion), остальные только читают.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Facing {
    sign: i8,
}

impl Default for Facing {
    fn default() -> Self {
        Self::LEFT
    }
}

impl Facing {
    pub const LEFT: Self = Self { sign: -1 };
    pub const RIGHT: Self = Self { sign: 1 };

    /// 0 трактуется как "вправо" (так же как `dx >= 0`)
    pub fn from_dx(dx: f32) -> Self {
        if dx >= 0.0 {
            Self::RIGHT
        } else {
            Self::LEFT
        }
    }

    pub fn sign(&self) -> f32 {
        self.sign as f32
    }

    pub fn is_right(&self) -> bool {
        self.sign > 0
    }

    pub fn flipped(&self) -> Self {
        Self { sign: -self.sign }
    }

    pub fn flip(&mut self) {
        self.sign = -self.sign;
    }
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.max);
    }

    /// current / max в [0, 1] (для HP bar)
    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        (self.current as f32 / self.max as f32).clamp(0.0, 1.0)
    }
}

/// Актор без обязательной зависимости (нет body, нет игрока в мире)
///
/// Вешается один раз вместе с warning в лог, после чего per-tick системы
/// пропускают entity через `Without<Inert>`. Соседние акторы не затронуты.
#[derive(Component, Debug, Clone)]
pub struct Inert {
    pub reason: String,
}

impl Inert {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Помечает entity как Inert и пишет warning ровно один раз
pub fn mark_inert(commands: &mut Commands, entity: Entity, reason: &str) {
    crate::log_warning(&format!("⚠️ {:?} inert: {}", entity, reason));
    if let Ok(mut entity_commands) = commands.get_entity(entity) {
        entity_commands.insert(Inert::new(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100);
        assert_eq!(health.current, 100);

        health.take_damage(30);
        assert_eq!(health.current, 70);
        assert!(health.is_alive());

        health.take_damage(100); // Saturating sub
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_health_heal() {
        let mut health = Health::new(100);
        health.take_damage(50);
        health.heal(30);
        assert_eq!(health.current, 80);

        health.heal(100); // Clamped to max
        assert_eq!(health.current, 100);
    }

    #[test]
    fn test_health_fraction() {
        let mut health = Health::new(200);
        health.take_damage(130);
        assert!((health.fraction() - 0.35).abs() < 1e-6);
        assert_eq!(Health { current: 0, max: 0 }.fraction(), 0.0);
    }

    #[test]
    fn test_facing() {
        assert_eq!(Facing::from_dx(0.0), Facing::RIGHT);
        assert_eq!(Facing::from_dx(-0.1), Facing::LEFT);
        assert_eq!(Facing::default().sign(), -1.0);

        let mut facing = Facing::RIGHT;
        facing.flip();
        assert_eq!(facing, Facing::LEFT);
        assert_eq!(facing.flipped(), Facing::RIGHT);
    }
}
