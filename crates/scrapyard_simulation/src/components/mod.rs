//! ECS Components общие для всех доменов
//!
//! Организация:
//! - actor: маркеры сторон (Player, Enemy), Facing, Health, Inert
//!
//! Доменные компоненты (stun, patrol, melee brain, boss cycle) живут в своих
//! модулях рядом с системами.

pub mod actor;

pub use actor::*;
