//! Lifecycle: отложенный деспавн (трупы после execute, debris по life timer)

use bevy::prelude::*;

/// Компонент: деспавн entity через `remaining` секунд fixed времени
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct DespawnAfter {
    pub remaining: f32,
}

impl DespawnAfter {
    pub fn new(delay: f32) -> Self {
        Self {
            remaining: delay.max(0.0),
        }
    }
}

/// Система: тик DespawnAfter, деспавн по истечении
pub fn despawn_after_timeout(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut query: Query<(Entity, &mut DespawnAfter)>,
) {
    let delta = time.delta_secs();

    for (entity, mut despawn_after) in query.iter_mut() {
        despawn_after.remaining -= delta;
        if despawn_after.remaining <= 0.0 {
            crate::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            if let Ok(mut entity_commands) = commands.get_entity(entity) {
                entity_commands.despawn();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_despawn_after_delay() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
                1.0 / 60.0,
            )))
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .add_systems(FixedUpdate, despawn_after_timeout);

        let entity = app.world_mut().spawn(DespawnAfter::new(0.5)).id();

        for _ in 0..10 {
            app.update();
        }
        assert!(app.world().get_entity(entity).is_ok());

        for _ in 0..40 {
            app.update();
        }
        assert!(app.world().get_entity(entity).is_err());
    }
}
