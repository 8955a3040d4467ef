//! Physics adapter
//!
//! Gameplay системы видят физику только через:
//! - `KinematicBody` (velocity, флаги simulated/colliders, freeze_x)
//! - сенсоры `GroundSensor` / `PatrolSensor` (заполняет backend в Sense)
//! - `ContactEvent` (Enter/Stay/Exit, нормали, относительная скорость)
//!
//! Два backend: headless (тесты, headless binary) и Rapier bridge.

pub mod body;
pub mod contacts;
pub mod headless;
pub mod layers;
pub mod query;
pub mod rapier;
pub mod sensing;

use bevy::math::Vec2;

pub use body::{Aabb2, KinematicBody, StaticSolid};
pub use contacts::{ContactEvent, ContactPhase};
pub use headless::{HeadlessPhysics, HeadlessPhysicsPlugin};
pub use layers::CollisionLayers;
pub use query::{PhysicsQuery, RayHit};
pub use rapier::RapierBridgePlugin;
pub use sensing::{GroundSensor, PatrolSensor, SENSOR_SKIN};

/// Мировая гравитация (совпадает с дефолтом Rapier)
pub const WORLD_GRAVITY: Vec2 = Vec2::new(0.0, -9.81);
