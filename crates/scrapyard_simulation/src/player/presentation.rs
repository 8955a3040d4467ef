//! Player presentation: landing lock + параметры аниматора
//!
//! Приземление после заметного полёта кратко блокирует движение
//! (`BlockReason::Landing`) и дёргает trigger `Land`. IsRunning переключается
//! с гистерезисом по input и минимальным временем в состоянии.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub landing_hold: f32,
    pub min_air_time: f32,
    /// Приземлением считается только касание при vy <= этого значения
    pub land_y_vel_max: f32,
    pub run_on_input: f32,
    pub run_off_input: f32,
    pub min_run_time: f32,
    pub min_idle_time: f32,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            landing_hold: 0.12,
            min_air_time: 0.03,
            land_y_vel_max: -0.02,
            run_on_input: 0.55,
            run_off_input: 0.35,
            min_run_time: 0.18,
            min_idle_time: 0.18,
        }
    }
}

/// Изменения за тик, которые система превращает в события/блоки
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PresentationChanges {
    pub landed: bool,
    pub landing_lock_started: bool,
    pub landing_lock_released: bool,
    pub running: Option<bool>,
}

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PlayerPresentation {
    pub config: PresentationConfig,
    was_grounded_raw: bool,
    landing_lock: bool,
    air_timer: f32,
    land_timer: f32,
    running: bool,
    run_state_timer: f32,
}

impl PlayerPresentation {
    pub fn new(config: PresentationConfig) -> Self {
        Self { config, ..default() }
    }

    pub fn landing_lock(&self) -> bool {
        self.landing_lock
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn update(
        &mut self,
        grounded_raw: bool,
        grounded_stable: bool,
        velocity_y: f32,
        input_abs: f32,
        delta: f32,
    ) -> PresentationChanges {
        let mut changes = PresentationChanges::default();

        if !grounded_raw {
            self.air_timer += delta;
            self.land_timer = 0.0;
            if self.landing_lock {
                self.landing_lock = false;
                changes.landing_lock_released = true;
            }
        } else {
            let landed_now =
                !self.was_grounded_raw && self.air_timer > self.config.min_air_time && velocity_y <= self.config.land_y_vel_max;
            if landed_now {
                changes.landed = true;
                self.land_timer = self.config.landing_hold;
                if !self.landing_lock {
                    self.landing_lock = true;
                    changes.landing_lock_started = true;
                }
            }

            if self.land_timer > 0.0 {
                self.land_timer -= delta;
            } else if self.landing_lock {
                self.landing_lock = false;
                changes.landing_lock_released = true;
            }

            self.air_timer = 0.0;
        }

        let can_run = grounded_stable && !self.landing_lock;
        if !self.running {
            if can_run && input_abs >= self.config.run_on_input && self.run_state_timer <= 0.0 {
                self.running = true;
                self.run_state_timer = self.config.min_run_time;
                changes.running = Some(true);
            } else {
                self.run_state_timer = (self.run_state_timer - delta).max(0.0);
            }
        } else if (!can_run || input_abs <= self.config.run_off_input) && self.run_state_timer <= 0.0 {
            self.running = false;
            self.run_state_timer = self.config.min_idle_time;
            changes.running = Some(false);
        } else {
            self.run_state_timer = (self.run_state_timer - delta).max(0.0);
        }

        self.was_grounded_raw = grounded_raw;
        changes
    }
}
