//! Tests for MeleeBrain state machine.

use bevy::prelude::*;

use super::brain::{MeleeBrain, MeleeSenses, MeleeState, WhyNotAttacking};
use super::config::MeleeConfig;
use crate::animation::SwingMarker;
use crate::physics::Aabb2;

const DT: f32 = 1.0 / 60.0;

fn senses(player_x: f32, stunned: bool) -> MeleeSenses {
    let player_position = Vec2::new(player_x, 0.0);
    MeleeSenses {
        position: Vec2::ZERO,
        player_position,
        player_bounds: Aabb2::from_center(player_position, Vec2::new(0.3, 0.5)),
        stunned,
    }
}

/// Idle → Chase → Attack (игрок вплотную справа)
fn brain_in_attack(config: MeleeConfig) -> MeleeBrain {
    let mut brain = MeleeBrain::new(config);
    brain.tick(&senses(1.0, false), DT);
    assert_eq!(brain.state(), MeleeState::Chase);
    brain.tick(&senses(1.0, false), DT);
    assert_eq!(brain.state(), MeleeState::Attack);
    brain
}

#[test]
fn test_idle_to_chase_within_detect_radius() {
    let mut brain = MeleeBrain::default();

    brain.tick(&senses(6.5, false), DT);
    assert_eq!(brain.state(), MeleeState::Idle);

    brain.tick(&senses(6.0, false), DT);
    assert_eq!(brain.state(), MeleeState::Chase);
    assert_eq!(brain.take_entered_states(), vec![MeleeState::Chase]);
}

#[test]
fn test_chase_hysteresis_boundary() {
    let mut brain = MeleeBrain::default();
    brain.tick(&senses(5.0, false), DT);
    assert_eq!(brain.state(), MeleeState::Chase);

    // Ровно detect_radius * 1.2 — ещё Chase
    let edge = brain.config.detect_radius * 1.2;
    brain.tick(&senses(edge, false), DT);
    assert_eq!(brain.state(), MeleeState::Chase);

    brain.tick(&senses(edge + 0.01, false), DT);
    assert_eq!(brain.state(), MeleeState::Idle);
}

#[test]
fn test_chase_moves_towards_player() {
    let mut brain = MeleeBrain::default();
    brain.tick(&senses(-4.0, false), DT);

    assert_eq!(brain.state(), MeleeState::Chase);
    assert_eq!(brain.current_facing(), -1.0);
    assert_eq!(brain.desired_velocity_x(false), -3.2);
    assert_eq!(brain.desired_velocity_x(true), 0.0);
}

#[test]
fn test_timed_swing_phases() {
    let mut brain = brain_in_attack(MeleeConfig::default());
    assert!(brain.swing().in_progress);
    assert!(!brain.swing().active);
    assert!(brain.is_frozen());
    assert_eq!(brain.desired_velocity_x(false), 0.0);

    let mut active_ticks = 0;
    for _ in 0..60 {
        brain.tick(&senses(1.0, false), DT);
        if brain.swing().active {
            active_ticks += 1;
        }
        if brain.state() != MeleeState::Attack {
            break;
        }
    }

    // active окно 0.18s ≈ 10-11 тиков
    assert!((9..=12).contains(&active_ticks), "active ticks = {}", active_ticks);
    assert_eq!(brain.state(), MeleeState::Cooldown);
    assert!((brain.cooldown_timer() - 0.6).abs() < 1e-6);
    assert!(!brain.swing().in_progress);
    assert!(!brain.is_frozen());
}

#[test]
fn test_single_hit_per_swing() {
    let mut brain = brain_in_attack(MeleeConfig::default());

    while !brain.swing().active {
        brain.tick(&senses(1.0, false), DT);
    }
    assert!(brain.can_hit());
    brain.register_hit();
    assert!(!brain.can_hit());

    // Оставшаяся часть active окна — без повторного попадания
    brain.tick(&senses(1.0, false), DT);
    assert!(!brain.can_hit());
}

#[test]
fn test_facing_locked_during_attack() {
    let mut brain = brain_in_attack(MeleeConfig::default());
    assert_eq!(brain.swing().attack_facing, 1.0);

    // Игрок перепрыгнул за спину
    brain.tick(&senses(-1.0, false), DT);
    assert_eq!(brain.state(), MeleeState::Attack);
    assert_eq!(brain.current_facing(), 1.0);
    assert!(brain.hitbox(Vec2::ZERO).center().x > 0.0);

    while brain.state() == MeleeState::Attack {
        brain.tick(&senses(-1.0, false), DT);
    }
    // Следующий тик после замаха снова смотрит на игрока
    brain.tick(&senses(-1.0, false), DT);
    assert_eq!(brain.current_facing(), -1.0);
}

#[test]
fn test_facing_unlocked_when_lock_disabled() {
    let config = MeleeConfig {
        lock_facing_during_attack: false,
        ..default()
    };
    let mut brain = brain_in_attack(config);

    brain.tick(&senses(-1.0, false), DT);
    assert_eq!(brain.current_facing(), -1.0);
    // attack_facing всё равно зафиксирован
    assert_eq!(brain.swing().attack_facing, 1.0);
}

#[test]
fn test_stun_cancels_swing_and_recovers_by_distance() {
    let mut brain = brain_in_attack(MeleeConfig::default());
    brain.take_entered_states();

    brain.enter_stun();
    assert_eq!(brain.state(), MeleeState::Stunned);
    assert!(!brain.swing().in_progress);
    assert!(!brain.swing().active);
    assert!(!brain.is_frozen());
    assert_eq!(brain.take_entered_states(), vec![MeleeState::Stunned]);

    // Пока stunned — стоим
    brain.tick(&senses(1.0, true), DT);
    assert_eq!(brain.state(), MeleeState::Stunned);

    // Recovery рядом → Chase, cooldown обнулён, не возвращаемся в Attack
    brain.tick(&senses(1.0, false), DT);
    assert!(matches!(brain.state(), MeleeState::Chase | MeleeState::Attack));
    assert_eq!(brain.take_entered_states()[0], MeleeState::Chase);

    // Recovery далеко → Idle
    let mut far = MeleeBrain::default();
    far.tick(&senses(1.0, true), DT);
    far.tick(&senses(20.0, false), DT);
    assert_eq!(far.state(), MeleeState::Idle);
}

#[test]
fn test_why_not_attacking() {
    let brain = MeleeBrain::default();
    let player_right = senses(1.0, false);
    let origin = Vec2::ZERO;

    // Новый brain смотрит влево
    let check = brain.evaluate_attack(origin, player_right.player_position, &player_right.player_bounds);
    assert!(!check.can_attack);
    assert_eq!(check.why, WhyNotAttacking::NotInFront);

    let far_left = senses(-3.0, false);
    let check = brain.evaluate_attack(origin, far_left.player_position, &far_left.player_bounds);
    assert_eq!(check.why, WhyNotAttacking::OutsideBox);

    let near_left = senses(-1.0, false);
    let check = brain.evaluate_attack(origin, near_left.player_position, &near_left.player_bounds);
    assert!(check.can_attack);
    assert_eq!(check.detection_box.center(), Vec2::new(-0.7, 0.0));
    assert_eq!(check.detection_box.half_extents(), Vec2::new(0.7, 0.7));
}

#[test]
fn test_cooldown_reason_after_swing() {
    let mut brain = brain_in_attack(MeleeConfig::default());
    while brain.state() == MeleeState::Attack {
        brain.tick(&senses(1.0, false), DT);
    }

    let s = senses(1.0, false);
    let check = brain.evaluate_attack(Vec2::ZERO, s.player_position, &s.player_bounds);
    assert_eq!(check.why, WhyNotAttacking::Cooldown);
}

#[test]
fn test_cooldown_leads_to_next_attack_or_chase() {
    let mut brain = brain_in_attack(MeleeConfig::default());
    while brain.state() == MeleeState::Attack {
        brain.tick(&senses(1.0, false), DT);
    }
    assert_eq!(brain.state(), MeleeState::Cooldown);

    // Игрок отошёл за пределы бокса, но в радиусе → после cooldown Chase
    for _ in 0..60 {
        brain.tick(&senses(4.0, false), DT);
        if brain.state() != MeleeState::Cooldown {
            break;
        }
    }
    assert_eq!(brain.state(), MeleeState::Chase);
}

#[test]
fn test_event_driven_swing() {
    let config = MeleeConfig {
        use_events: true,
        ..default()
    };
    let mut brain = brain_in_attack(config);

    // Без маркеров swing не двигается
    for _ in 0..120 {
        brain.tick(&senses(1.0, false), DT);
    }
    assert_eq!(brain.state(), MeleeState::Attack);
    assert!(!brain.swing().active);

    brain.on_swing_marker(SwingMarker::HitOn);
    assert!(brain.can_hit());
    brain.on_swing_marker(SwingMarker::HitOff);
    assert!(!brain.swing().active);

    brain.on_swing_marker(SwingMarker::End);
    assert_eq!(brain.state(), MeleeState::Cooldown);

    // HitOn вне замаха игнорируется
    brain.on_swing_marker(SwingMarker::HitOn);
    assert!(!brain.swing().active);
}
