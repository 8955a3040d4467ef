//! Контакт игрок ↔ patrol враг: stomp сверху или удар сбоку
//!
//! Классификация — чистая функция (`classify_contact`), система только
//! достаёт геометрию из `ContactEvent` и раздаёт `StunRequest`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Enemy, Facing, Inert, Player};
use crate::enemy::patrol::Patrol;
use crate::physics::{ContactEvent, ContactPhase, KinematicBody};
use crate::stun::{EnemyStun, PlayerStun, StunRequest};

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Игрок должен падать быстрее (vy <= порога)
    pub stomp_vy_threshold: f32,
    /// Допуск: низ игрока выше (верх врага - margin)
    pub top_hit_margin: f32,
    pub stun_duration: f32,
    /// vy игрока после stomp
    pub bounce_speed: f32,
    pub player_stun_time: f32,
    pub post_hit_cooldown: f32,
    pub post_hit_impulse_x: f32,
    /// Минимальная |relative vx| для отскока при side-hit
    pub min_rel_speed_to_flip: f32,
    pub side_knockback: Vec2,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            stomp_vy_threshold: -2.0,
            top_hit_margin: 0.06,
            stun_duration: 1.2,
            bounce_speed: 10.0,
            player_stun_time: 0.8,
            post_hit_cooldown: 0.35,
            post_hit_impulse_x: 3.5,
            min_rel_speed_to_flip: 0.2,
            side_knockback: Vec2::new(8.0, 6.0),
        }
    }
}

/// Какие контакты обрабатывает враг
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum ContactPolicy {
    #[default]
    StompAndSideHit,
    /// Только stomp (melee враг бьёт своей атакой, а не телом)
    StompOnly,
}

/// Контактный профиль врага
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct ContactResponder {
    pub config: ContactConfig,
    pub policy: ContactPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ContactClassification {
    Stomp,
    SideHit,
    None,
}

/// Геометрия одного контакта (с точки зрения врага)
#[derive(Debug, Clone, Copy)]
pub struct ContactGeometry {
    pub enemy_top: f32,
    pub enemy_center_x: f32,
    pub player_bottom: f32,
    pub player_center_x: f32,
    /// vy игрока до разрешения коллизии
    pub player_vy: f32,
    /// Средняя нормаль (враг → игрок), `None` если точек контакта нет
    pub average_normal: Option<Vec2>,
}

/// Stomp: игрок выше верха, падает, нормаль смотрит вверх.
/// Side-hit: горизонтальная нормаль и игрок ниже верха; без точек контакта
/// решает смещение центров.
pub fn classify_contact(geometry: &ContactGeometry, config: &ContactConfig) -> ContactClassification {
    let above = geometry.player_bottom >= geometry.enemy_top - config.top_hit_margin;
    let falling = geometry.player_vy <= config.stomp_vy_threshold;
    let normal = geometry.average_normal.unwrap_or(Vec2::ZERO);

    if above && falling && normal.y > 0.25 {
        return ContactClassification::Stomp;
    }

    let below_top = geometry.player_bottom < geometry.enemy_top - 0.02;
    let side_hit = match geometry.average_normal {
        Some(normal) => normal.x.abs() > 0.5 && below_top,
        None => (geometry.player_center_x - geometry.enemy_center_x).abs() > 0.05 && below_top,
    };

    if side_hit {
        ContactClassification::SideHit
    } else {
        ContactClassification::None
    }
}

/// Система: контакты врагов с игроком (Resolve / Contacts)
///
/// Stomp → stun врагу + bounce игроку (всегда, независимо от cooldown-ов).
/// Side-hit (только Enter) → stun игроку, отскок врага, latch до Exit.
#[allow(clippy::type_complexity)]
pub fn resolve_enemy_contacts(
    mut contacts: EventReader<ContactEvent>,
    mut enemies: Query<
        (
            &Transform,
            &mut KinematicBody,
            &mut Patrol,
            &mut Facing,
            &EnemyStun,
            &ContactResponder,
        ),
        (With<Enemy>, Without<Player>, Without<Inert>),
    >,
    mut players: Query<(&Transform, &mut KinematicBody, &PlayerStun), (With<Player>, Without<Enemy>)>,
    mut stun_requests: EventWriter<StunRequest>,
) {
    for event in contacts.read() {
        let Ok((enemy_transform, mut enemy_body, mut patrol, mut facing, enemy_stun, responder)) =
            enemies.get_mut(event.entity)
        else {
            continue;
        };
        let Ok((player_transform, mut player_body, player_stun)) = players.get_mut(event.other) else {
            continue;
        };
        if !enemy_body.is_active() {
            continue;
        }

        if event.phase == ContactPhase::Exit {
            if patrol.release_exit_block(event.other) {
                crate::log(&format!("Patrol {:?}: exit latch released", event.entity));
            }
            continue;
        }

        let config = &responder.config;
        let enemy_position = enemy_transform.translation.truncate();
        let player_position = player_transform.translation.truncate();
        let geometry = ContactGeometry {
            enemy_top: enemy_position.y + enemy_body.half_extents.y,
            enemy_center_x: enemy_position.x,
            player_bottom: player_position.y - player_body.half_extents.y,
            player_center_x: player_position.x,
            player_vy: event.other_velocity.y,
            average_normal: event.average_normal(),
        };

        match classify_contact(&geometry, config) {
            ContactClassification::Stomp => {
                crate::log(&format!("🦶 Stomp: {:?} stunned for {:.2}s", event.entity, config.stun_duration));
                stun_requests.write(StunRequest::new(event.entity, config.stun_duration, Vec2::ZERO));
                player_body.velocity.y = config.bounce_speed;
                patrol.clear_exit_block();
            }
            ContactClassification::SideHit => {
                if responder.policy == ContactPolicy::StompOnly || event.phase != ContactPhase::Enter {
                    continue;
                }
                if !patrol.flip_ready() || event.relative_velocity.x.abs() < config.min_rel_speed_to_flip {
                    continue;
                }

                let dir_to_player = if player_position.x - enemy_position.x >= 0.0 { 1.0 } else { -1.0 };

                if patrol.can_hurt(enemy_stun.is_stunned()) && player_stun.can_be_stunned() {
                    crate::log(&format!("💥 Side-hit: {:?} hurts player {:?}", event.entity, event.other));
                    stun_requests.write(StunRequest::new(
                        event.other,
                        config.player_stun_time,
                        Vec2::new(dir_to_player * config.side_knockback.x, config.side_knockback.y),
                    ));
                    patrol.start_post_hit(config.post_hit_cooldown);
                }

                patrol.flip_away(dir_to_player, config.post_hit_impulse_x, &mut facing, &mut enemy_body.velocity);
                patrol.arm_exit_block(event.other);
            }
            ContactClassification::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(player_bottom: f32, player_x: f32, vy: f32, normal: Option<Vec2>) -> ContactGeometry {
        ContactGeometry {
            enemy_top: 1.0,
            enemy_center_x: 0.0,
            player_bottom,
            player_center_x: player_x,
            player_vy: vy,
            average_normal: normal,
        }
    }

    #[test]
    fn test_stomp_from_above() {
        let config = ContactConfig::default();
        let g = geometry(1.0, 0.1, -5.0, Some(Vec2::Y));
        assert_eq!(classify_contact(&g, &config), ContactClassification::Stomp);
    }

    #[test]
    fn test_stomp_margin() {
        let config = ContactConfig::default();
        // Чуть ниже верха, но в пределах margin 0.06
        let g = geometry(0.95, 0.0, -3.0, Some(Vec2::Y));
        assert_eq!(classify_contact(&g, &config), ContactClassification::Stomp);
    }

    #[test]
    fn test_slow_fall_is_not_stomp() {
        let config = ContactConfig::default();
        let g = geometry(1.0, 0.0, -1.0, Some(Vec2::Y));
        assert_eq!(classify_contact(&g, &config), ContactClassification::None);
    }

    #[test]
    fn test_side_hit_horizontal_normal() {
        let config = ContactConfig::default();
        let g = geometry(0.2, 0.7, 0.0, Some(Vec2::X));
        assert_eq!(classify_contact(&g, &config), ContactClassification::SideHit);
    }

    #[test]
    fn test_side_hit_fallback_without_points() {
        let config = ContactConfig::default();
        let g = geometry(0.2, 0.7, 0.0, None);
        assert_eq!(classify_contact(&g, &config), ContactClassification::SideHit);

        // Центры совпадают → не side-hit
        let g = geometry(0.2, 0.01, 0.0, None);
        assert_eq!(classify_contact(&g, &config), ContactClassification::None);
    }

    #[test]
    fn test_standing_on_top_is_nothing() {
        let config = ContactConfig::default();
        let g = geometry(1.0, 0.0, 0.0, Some(Vec2::Y));
        assert_eq!(classify_contact(&g, &config), ContactClassification::None);
    }
}
