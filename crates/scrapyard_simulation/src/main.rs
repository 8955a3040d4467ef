//! Headless арена Scrapyard
//!
//! Пол + стены, игрок, patrol враги, Tetrapakstein и босс Concreto.
//! Запуск: `scrapyard_simulation [--rapier] [seed] [tuning.json]`

use bevy::prelude::*;
use scrapyard_simulation::enemy::DropTable;
use scrapyard_simulation::{
    create_headless_app, create_rapier_app, log, log_error, spawn_boss, spawn_melee_enemy, spawn_patrol_enemy,
    spawn_player, BossCycle, CollisionLayers, Debris, Enemy, Facing, Health, Inventory, ItemKind, Player,
    PlayerStun, StaticSolid, Tuning,
};

const TICKS: u32 = 1800; // 30 секунд при 60Hz

fn spawn_solid(commands: &mut Commands, center: Vec2, half_extents: Vec2, layers: CollisionLayers) {
    commands.spawn((
        StaticSolid::new(half_extents),
        Transform::from_translation(center.extend(0.0)),
        layers,
    ));
}

fn setup_arena(mut commands: Commands, tuning: Res<Tuning>) {
    // Пол 40m, верх на y = 0
    spawn_solid(&mut commands, Vec2::new(0.0, -0.5), Vec2::new(20.0, 0.5), CollisionLayers::ground());
    spawn_solid(&mut commands, Vec2::new(-20.5, 5.0), Vec2::new(0.5, 5.0), CollisionLayers::wall());
    spawn_solid(&mut commands, Vec2::new(20.5, 5.0), Vec2::new(0.5, 5.0), CollisionLayers::wall());

    spawn_player(&mut commands, Vec2::new(-8.0, 0.5), &tuning.player);

    spawn_patrol_enemy(
        &mut commands,
        Vec2::new(-3.0, 0.4),
        &tuning.standard_enemy,
        Facing::LEFT,
        DropTable::single(ItemKind::Plastic, 1),
    );
    spawn_patrol_enemy(
        &mut commands,
        Vec2::new(2.0, 0.4),
        &tuning.canned_soda,
        Facing::RIGHT,
        DropTable::single(ItemKind::Metal, 1),
    );
    spawn_melee_enemy(&mut commands, Vec2::new(6.0, 0.4), &tuning.standard_enemy, &tuning.melee);
    spawn_boss(&mut commands, Vec2::new(15.0, 1.5), tuning.boss.clone());

    log("🏟️ Arena ready");
}

fn load_tuning(path: &str) -> Option<Tuning> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            log_error(&format!("Cannot read tuning {}: {}", path, err));
            return None;
        }
    };
    match Tuning::from_json(&text) {
        Ok(tuning) => Some(tuning),
        Err(err) => {
            log_error(&format!("Invalid tuning {}: {}", path, err));
            None
        }
    }
}

fn report(world: &mut World, tick: u32) {
    let enemies = world.query_filtered::<Entity, With<Enemy>>().iter(world).count();
    let debris = world.query::<&Debris>().iter(world).count();
    let boss = world
        .query::<(&BossCycle, &Health)>()
        .iter(world)
        .next()
        .map(|(cycle, health)| format!("{:?} {}/{}", cycle.state(), health.current, health.max))
        .unwrap_or_else(|| "none".to_string());
    let player = world
        .query_filtered::<(&Transform, &PlayerStun), With<Player>>()
        .iter(world)
        .next()
        .map(|(transform, stun)| {
            format!(
                "({:.2}, {:.2}) stunned={}",
                transform.translation.x,
                transform.translation.y,
                stun.is_stunned()
            )
        })
        .unwrap_or_else(|| "none".to_string());
    let items = world.resource::<Inventory>().total();

    println!(
        "Tick {:>4}: enemies={} debris={} boss=[{}] player={} items={}",
        tick, enemies, debris, boss, player, items
    );
}

fn main() {
    let (flags, positional): (Vec<String>, Vec<String>) =
        std::env::args().skip(1).partition(|arg| arg.starts_with("--"));
    let rapier = flags.iter().any(|flag| flag == "--rapier");
    let mut args = positional.into_iter();
    let seed = args.next().and_then(|arg| arg.parse::<u64>().ok()).unwrap_or(42);
    let tuning = args.next().and_then(|path| load_tuning(&path)).unwrap_or_default();

    println!(
        "Starting Scrapyard headless simulation (seed: {}, physics: {})",
        seed,
        if rapier { "rapier" } else { "headless" }
    );

    let mut app = if rapier { create_rapier_app(seed) } else { create_headless_app(seed) };
    app.insert_resource(tuning).add_systems(Startup, setup_arena);

    for tick in 0..TICKS {
        app.update();

        if tick % 120 == 0 {
            report(app.world_mut(), tick);
        }
    }

    report(app.world_mut(), TICKS);
    println!("Simulation complete!");
}
