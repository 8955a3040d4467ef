//! Animation bridge
//!
//! Core не проигрывает анимации: он шлёт `AnimationRequest` (cross-fade,
//! restart, trigger, bool) хосту и принимает обратно маркеры удара
//! (`SwingSignal`) для event-driven атак.

use bevy::prelude::*;

/// Какой аниматор на entity (у босса их два: экскаватор и Concreto)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum AnimatorSlot {
    #[default]
    Body,
    Excavator,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub enum AnimCommand {
    CrossFade { state: String, duration: f32 },
    /// Проиграть state с нуля даже если он уже играет
    Restart { state: String },
    /// Reset + Set trigger
    Trigger { name: String },
    SetBool { name: String, value: bool },
}

/// Fire-and-forget запрос к animation driver хоста
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AnimationRequest {
    pub entity: Entity,
    pub slot: AnimatorSlot,
    pub command: AnimCommand,
}

impl AnimationRequest {
    pub fn new(entity: Entity, command: AnimCommand) -> Self {
        Self {
            entity,
            slot: AnimatorSlot::Body,
            command,
        }
    }

    pub fn trigger(entity: Entity, name: impl Into<String>) -> Self {
        Self::new(entity, AnimCommand::Trigger { name: name.into() })
    }

    pub fn on(mut self, slot: AnimatorSlot) -> Self {
        self.slot = slot;
        self
    }

    pub fn trigger_name(&self) -> Option<&str> {
        match &self.command {
            AnimCommand::Trigger { name } => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Маркеры из анимации атаки (animation events хоста)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum SwingMarker {
    HitOn,
    HitOff,
    End,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SwingSignal {
    pub entity: Entity,
    pub marker: SwingMarker,
}

/// Что сейчас играет + последние отправленные bool-параметры
///
/// PlayOnce: cross-fade только если state отличается от играющего.
#[derive(Component, Debug, Clone, Default)]
pub struct AnimationTracker {
    playing: Option<String>,
    bools: Vec<(String, bool)>,
}

impl AnimationTracker {
    pub fn playing(&self) -> Option<&str> {
        self.playing.as_deref()
    }

    pub fn play_once(&mut self, state: &str, cross_fade: f32) -> Option<AnimCommand> {
        if state.is_empty() || self.playing.as_deref() == Some(state) {
            return None;
        }
        self.playing = Some(state.to_string());
        Some(AnimCommand::CrossFade {
            state: state.to_string(),
            duration: cross_fade,
        })
    }

    pub fn force_restart(&mut self, state: &str) -> Option<AnimCommand> {
        if state.is_empty() {
            return None;
        }
        self.playing = Some(state.to_string());
        Some(AnimCommand::Restart {
            state: state.to_string(),
        })
    }

    /// `Some` только при изменении значения (или первой отправке)
    pub fn set_bool(&mut self, name: &str, value: bool) -> Option<AnimCommand> {
        match self.bools.iter_mut().find(|(n, _)| n == name) {
            Some((_, current)) if *current == value => None,
            Some((_, current)) => {
                *current = value;
                Some(AnimCommand::SetBool {
                    name: name.to_string(),
                    value,
                })
            }
            None => {
                self.bools.push((name.to_string(), value));
                Some(AnimCommand::SetBool {
                    name: name.to_string(),
                    value,
                })
            }
        }
    }
}

pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AnimationRequest>().add_event::<SwingSignal>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_once_dedupes() {
        let mut tracker = AnimationTracker::default();

        assert!(tracker.play_once("Run", 0.05).is_some());
        assert!(tracker.play_once("Run", 0.05).is_none());
        assert!(tracker.play_once("Idle", 0.05).is_some());
        assert_eq!(tracker.playing(), Some("Idle"));
    }

    #[test]
    fn test_force_restart_always_emits() {
        let mut tracker = AnimationTracker::default();

        assert_eq!(
            tracker.force_restart("Attack"),
            Some(AnimCommand::Restart { state: "Attack".into() })
        );
        assert!(tracker.force_restart("Attack").is_some());
        // После restart PlayOnce того же state молчит
        assert!(tracker.play_once("Attack", 0.05).is_none());
    }

    #[test]
    fn test_set_bool_on_change_only() {
        let mut tracker = AnimationTracker::default();

        assert!(tracker.set_bool("IsRunning", false).is_some());
        assert!(tracker.set_bool("IsRunning", false).is_none());
        assert!(tracker.set_bool("IsRunning", true).is_some());
        assert!(tracker.set_bool("Stunned", true).is_some());
    }
}
