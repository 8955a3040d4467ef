//! Player input (заполняется хостом каждый кадр)
//!
//! `*_pressed` / `*_released` — edge флаги, живут один тик и сбрасываются
//! в конце Integrate (`clear_input_edges`). Для headless тестов — mock input
//! через этот компонент.

use bevy::prelude::*;

#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PlayerInput {
    /// Горизонтальная ось [-1, 1]
    pub axis_x: f32,
    pub jump_pressed: bool,
    pub jump_released: bool,
    /// Execute / взаимодействие
    pub interact_pressed: bool,
}

impl PlayerInput {
    pub fn axis(&self) -> f32 {
        self.axis_x.clamp(-1.0, 1.0)
    }

    pub fn clear_edges(&mut self) {
        self.jump_pressed = false;
        self.jump_released = false;
        self.interact_pressed = false;
    }
}
