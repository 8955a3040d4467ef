//! Баллистика debris: closed-form v0 под время полёта + коррекция скорости
//!
//! v0 = ((p1 - p0).x / T, ((p1 - p0).y + g·T²/2) / T), g > 0 (модуль гравитации)

use bevy::prelude::*;

use crate::DeterministicRng;

/// Максимум итераций коррекции T
pub const MAX_CORRECTION_ITERATIONS: u32 = 8;
pub const MIN_FLIGHT_TIME: f32 = 0.25;
pub const MAX_FLIGHT_TIME: f32 = 3.0;
/// Debris всегда летит вверх хотя бы с такой vy
pub const MIN_LAUNCH_VY: f32 = 2.0;

const SLOW_FACTOR: f32 = 0.88;
const FAST_FACTOR: f32 = 1.12;

/// Параметры броска (эфемерные)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallisticShot {
    pub origin: Vec2,
    pub target: Vec2,
    /// Модуль гравитации (уже с учётом gravity scale)
    pub gravity: f32,
    pub flight_time_min: f32,
    pub flight_time_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    /// ±градусы
    pub aim_noise_deg: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallisticSolution {
    pub velocity: Vec2,
    pub flight_time: f32,
    pub corrections: u32,
}

pub fn compute_ballistic_v0(origin: Vec2, target: Vec2, flight_time: f32, gravity: f32) -> Vec2 {
    let delta = target - origin;
    Vec2::new(
        delta.x / flight_time,
        (delta.y + 0.5 * gravity * flight_time * flight_time) / flight_time,
    )
}

/// Поворот вектора на `degrees` против часовой
pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Детерминированная часть: T и угол шума уже выбраны
///
/// Не сходится за MAX_CORRECTION_ITERATIONS → берём последнее значение,
/// финальный clamp всё равно гарантирует |v| ∈ [speed_min, speed_max].
pub fn solve_ballistic(
    origin: Vec2,
    target: Vec2,
    flight_time: f32,
    gravity: f32,
    speed_min: f32,
    speed_max: f32,
    noise_deg: f32,
) -> BallisticSolution {
    let (speed_min, speed_max) = if speed_min <= speed_max {
        (speed_min, speed_max)
    } else {
        (speed_max, speed_min)
    };
    let speed_min = speed_min.max(0.0);
    let gravity = gravity.abs();

    let mut t = flight_time.clamp(MIN_FLIGHT_TIME, MAX_FLIGHT_TIME);
    let mut v0 = compute_ballistic_v0(origin, target, t, gravity);

    let mut corrections = 0;
    while corrections < MAX_CORRECTION_ITERATIONS {
        let speed = v0.length();
        if speed >= speed_min && speed <= speed_max {
            break;
        }
        t *= if speed < speed_min { SLOW_FACTOR } else { FAST_FACTOR };
        v0 = compute_ballistic_v0(origin, target, t, gravity);
        corrections += 1;
    }

    if noise_deg != 0.0 {
        v0 = rotate_deg(v0, noise_deg);
    }
    if v0.y < MIN_LAUNCH_VY {
        v0.y = MIN_LAUNCH_VY;
    }
    if speed_max > 0.0 {
        v0 = v0.clamp_length(speed_min, speed_max);
    }

    BallisticSolution {
        velocity: v0,
        flight_time: t,
        corrections,
    }
}

/// Полный solve: T ~ U[flight_min, flight_max], шум ~ U[-noise, noise]
pub fn solve_launch_velocity(shot: &BallisticShot, rng: &mut DeterministicRng) -> BallisticSolution {
    let flight_time = rng.range(shot.flight_time_min, shot.flight_time_max);
    let noise = if shot.aim_noise_deg > 0.0 {
        rng.range(-shot.aim_noise_deg, shot.aim_noise_deg)
    } else {
        0.0
    };
    solve_ballistic(
        shot.origin,
        shot.target,
        flight_time,
        shot.gravity,
        shot.speed_min,
        shot.speed_max,
        noise,
    )
}
