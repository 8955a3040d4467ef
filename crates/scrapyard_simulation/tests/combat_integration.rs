//! Combat integration tests
//!
//! Полный headless App (SimulationPlugin + HeadlessPhysicsPlugin), 60Hz
//! ручной шаг. Первый `app.update()` — нулевой delta (только spawn).
//!
//! Проверяем:
//! - stomp сверху глушит patrol врага и подкидывает игрока
//! - melee замах попадает ровно один раз
//! - execute-kill идемпотентен, loot подбирается в inventory
//! - boss: furious на 130 уроне, смерть терминальна
//! - build: атомарный bulk consume + блок движения
//! - stun в тике удара важнее input / прыжка этого тика
//! - side-hit: stun игрока, отскок врага, latch до Exit
//! - debris: попадание в игрока, spawn врага по spawn_chance

use bevy::prelude::*;
use scrapyard_simulation::boss::spawn_debris;
use scrapyard_simulation::enemy::{DropTable, EnemyExecuted};
use scrapyard_simulation::inventory::{
    BeginBuild, BuildRecipe, BuildSession, BuildSpot, ItemPicked, PickupRequest, PlaceBuild,
};
use scrapyard_simulation::player::{BlockReason, MovementBlocks};
use scrapyard_simulation::*;

/// Собирает события в resource (читается после `app.update()`)
#[derive(Resource)]
struct Collected<E: Event>(Vec<E>);

impl<E: Event> Default for Collected<E> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

fn collect<E: Event + Clone>(mut reader: EventReader<E>, mut collected: ResMut<Collected<E>>) {
    collected.0.extend(reader.read().cloned());
}

fn collect_events<E: Event + Clone>(app: &mut App) {
    app.init_resource::<Collected<E>>().add_systems(Last, collect::<E>);
}

fn collected<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world().resource::<Collected<E>>().0.clone()
}

fn spawn_ground(commands: &mut Commands) -> Entity {
    // Верх пола на y = 0
    commands
        .spawn((
            StaticSolid::new(Vec2::new(30.0, 0.5)),
            Transform::from_translation(Vec3::new(0.0, -0.5, 0.0)),
            CollisionLayers::ground(),
        ))
        .id()
}

/// Spawn через Commands + flush, чтобы entity существовала до первого update
fn spawn_with(app: &mut App, spawn: impl FnOnce(&mut Commands) -> Entity) -> Entity {
    let world = app.world_mut();
    let entity = spawn(&mut world.commands());
    world.flush();
    entity
}

fn create_arena_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    spawn_with(&mut app, spawn_ground);
    app
}

fn position(app: &App, entity: Entity) -> Vec2 {
    app.world()
        .get::<Transform>(entity)
        .map(|transform| transform.translation.truncate())
        .unwrap_or_default()
}

#[test]
fn test_stomp_stuns_enemy_and_bounces_player() {
    let mut app = create_arena_app(1);
    let tuning = Tuning::default();

    let enemy = spawn_with(&mut app, |commands| {
        spawn_patrol_enemy(
            commands,
            Vec2::new(0.0, 0.4),
            &tuning.standard_enemy,
            Facing::LEFT,
            DropTable::default(),
        )
    });
    // Низ игрока на 0.2 выше верха врага
    let player = spawn_with(&mut app, |commands| spawn_player(commands, Vec2::new(0.0, 1.5), &tuning.player));
    app.update();

    let mut max_player_vy = f32::MIN;
    let mut stunned = false;
    for _ in 0..30 {
        app.update();
        stunned |= app.world().get::<EnemyStun>(enemy).is_some_and(|stun| stun.is_stunned());
        if let Some(body) = app.world().get::<KinematicBody>(player) {
            max_player_vy = max_player_vy.max(body.velocity.y);
        }
        if stunned {
            break;
        }
    }

    assert!(stunned, "stomp должен оглушить врага");
    app.update();
    let body = app.world().get::<KinematicBody>(player).expect("player body");
    max_player_vy = max_player_vy.max(body.velocity.y);
    assert!(max_player_vy > 5.0, "bounce vy = {}", max_player_vy);

    // Игрока stomp не ранит
    let player_stun = app.world().get::<PlayerStun>(player).expect("player stun");
    assert!(!player_stun.is_stunned());
}

#[test]
fn test_melee_swing_hits_once() {
    let mut app = create_arena_app(2);
    collect_events::<StunEntered>(&mut app);
    let tuning = Tuning::default();

    let player = spawn_with(&mut app, |commands| spawn_player(commands, Vec2::new(1.0, 0.5), &tuning.player));
    let melee = spawn_with(&mut app, |commands| {
        spawn_melee_enemy(
            commands,
            Vec2::new(0.0, 0.4),
            &tuning.standard_enemy,
            &tuning.melee,
        )
    });
    app.update();

    let mut saw_attack = false;
    // ~1.2s: один замах, второй не успевает выйти из неуязвимости игрока
    for _ in 0..72 {
        app.update();
        if let Some(brain) = app.world().get::<MeleeBrain>(melee) {
            saw_attack |= brain.state() == MeleeState::Attack;
        }
    }

    assert!(saw_attack, "melee враг должен атаковать игрока вплотную");
    let player_hits = collected::<StunEntered>(&app)
        .into_iter()
        .filter(|event| event.entity == player)
        .count();
    assert_eq!(player_hits, 1);

    // Knockback от врага (враг слева → вправо)
    let first_hit = collected::<StunEntered>(&app)
        .into_iter()
        .find(|event| event.entity == player)
        .expect("hit event");
    assert!(first_hit.knockback.x > 0.0);
}

#[test]
fn test_execute_kill_is_idempotent_and_drops_loot() {
    let mut app = create_arena_app(3);
    collect_events::<EnemyExecuted>(&mut app);
    collect_events::<ItemPicked>(&mut app);
    let tuning = Tuning::default();

    let player = spawn_with(&mut app, |commands| spawn_player(commands, Vec2::new(-1.0, 0.5), &tuning.player));
    let enemy = spawn_with(&mut app, |commands| {
        spawn_patrol_enemy(
            commands,
            Vec2::new(0.0, 0.4),
            &tuning.standard_enemy,
            Facing::LEFT,
            DropTable::single(ItemKind::Glass, 2),
        )
    });
    app.update();

    let request = ExecuteKillRequest {
        enemy,
        drop: DropTable::single(ItemKind::Glass, 2).entries[0],
        drop_offset: Vec2::new(0.0, 0.5),
        destroy_delay: 0.5,
    };
    // Два запроса в одном тике + повтор в следующем
    app.world_mut().send_event(request);
    app.world_mut().send_event(request);
    app.update();
    app.world_mut().send_event(request);
    app.update();

    let executed = collected::<EnemyExecuted>(&app);
    assert_eq!(executed.len(), 1);
    let body = app.world().get::<KinematicBody>(enemy).expect("тело ещё не удалено");
    assert!(!body.is_active());

    // Loot летит от игрока (игрок слева)
    let drop = executed[0].drop.expect("drop spawned");
    let drop_body = app.world().get::<KinematicBody>(drop).expect("drop body");
    assert!(drop_body.velocity.x > 0.0);

    app.world_mut().send_event(PickupRequest { item: drop });
    app.update();
    assert_eq!(collected::<ItemPicked>(&app).len(), 1);
    assert_eq!(app.world().resource::<Inventory>().count(ItemKind::Glass), 2);
    assert!(app.world().get_entity(drop).is_err());

    // Труп исчезает через destroy_delay
    for _ in 0..40 {
        app.update();
    }
    assert!(app.world().get_entity(enemy).is_err());
    assert!(position(&app, player).x < 0.0);
}

#[test]
fn test_boss_furious_then_terminal_death() {
    let mut app = create_arena_app(4);
    collect_events::<BossHealthChanged>(&mut app);
    collect_events::<AnimationRequest>(&mut app);

    let boss = spawn_with(&mut app, |commands| spawn_boss(commands, Vec2::new(10.0, 1.5), BossConfig::default()));
    app.update();
    app.update();

    app.world_mut().send_event(BossDamage { boss, amount: 130 });
    app.update();

    let cycle = app.world().get::<BossCycle>(boss).expect("boss cycle");
    assert!(cycle.is_furious());
    assert_eq!(cycle.volleys_per_attack(), 2);
    let (idle_min, idle_max) = cycle.idle_range();
    assert!((idle_min - 0.8).abs() < 1e-5 && (idle_max - 1.44).abs() < 1e-5);
    assert_eq!(app.world().get::<Health>(boss).map(|health| health.current), Some(70));

    let health_events = collected::<BossHealthChanged>(&app);
    assert_eq!(health_events.len(), 1);
    assert!((health_events[0].fraction - 0.35).abs() < 1e-6);

    let furious_triggers = collected::<AnimationRequest>(&app)
        .iter()
        .filter(|request| request.entity == boss && request.trigger_name() == Some("Furious"))
        .count();
    assert_eq!(furious_triggers, 1);

    // Добиваем (отрицательный amount = модуль)
    app.world_mut().send_event(BossDamage { boss, amount: -500 });
    app.update();
    let cycle = app.world().get::<BossCycle>(boss).expect("boss cycle");
    assert_eq!(cycle.state(), BossState::Dead);
    let body = app.world().get::<KinematicBody>(boss).expect("boss body");
    assert!(!body.simulated && !body.colliders_enabled);

    // Урон после смерти игнорируется, цикл стоит
    let requests_before = collected::<AnimationRequest>(&app).len();
    app.world_mut().send_event(BossDamage { boss, amount: 10 });
    for _ in 0..180 {
        app.update();
    }
    assert_eq!(collected::<BossHealthChanged>(&app).len(), 2);
    assert_eq!(collected::<AnimationRequest>(&app).len(), requests_before);
    assert_eq!(app.world().get::<BossCycle>(boss).map(|cycle| cycle.state()), Some(BossState::Dead));
}

#[test]
fn test_boss_debris_speed_and_lifetime() {
    let mut app = create_arena_app(5);
    let tuning = Tuning::default();

    spawn_with(&mut app, |commands| spawn_player(commands, Vec2::new(-4.0, 0.5), &tuning.player));
    spawn_with(&mut app, |commands| spawn_boss(commands, Vec2::new(8.0, 1.5), tuning.boss.clone()));
    app.update();

    // Idle ≤ 1.8s → первый залп до 120 тиков
    let mut first_debris = None;
    for _ in 0..150 {
        app.update();
        let mut query = app.world_mut().query::<(Entity, &Debris, &KinematicBody)>();
        if let Some((entity, _, body)) = query.iter(app.world()).next() {
            let speed = body.velocity.length();
            // Физика уже сделала один шаг гравитации
            assert!(speed > 7.5 && speed < 12.5, "debris speed {}", speed);
            first_debris = Some(entity);
            break;
        }
    }
    let first_debris = first_debris.expect("boss должен бросить debris");

    // Земля, игрок или life timer (6s) — снаряд исчезает
    for _ in 0..400 {
        app.update();
    }
    assert!(app.world().get_entity(first_debris).is_err());
}

#[test]
fn test_build_consumes_atomically() {
    let mut app = create_arena_app(6);
    let tuning = Tuning::default();

    let player = spawn_with(&mut app, |commands| spawn_player(commands, Vec2::new(0.0, 0.5), &tuning.player));
    let spot = app
        .world_mut()
        .spawn((Transform::from_translation(Vec3::new(3.0, 0.0, 0.0)), BuildSpot::default()))
        .id();
    app.update();

    {
        let mut inventory = app.world_mut().resource_mut::<Inventory>();
        inventory.add(ItemKind::Plastic, 3);
        inventory.add(ItemKind::Metal, 1);
    }

    let recipe = BuildRecipe {
        id: "turret".into(),
        costs: vec![ItemCost::new(ItemKind::Plastic, 2), ItemCost::new(ItemKind::Metal, 2)],
    };
    app.world_mut().send_event(BeginBuild { recipe });
    app.update();
    assert!(app
        .world()
        .get::<MovementBlocks>(player)
        .is_some_and(|blocks| blocks.is_blocked_by(BlockReason::Build)));

    // Металла не хватает → ничего не списано
    app.world_mut().send_event(PlaceBuild { spot });
    app.update();
    assert_eq!(app.world().resource::<Inventory>().count(ItemKind::Plastic), 3);
    assert!(!app.world().get::<BuildSpot>(spot).is_some_and(|spot| spot.occupied));
    assert!(app.world().resource::<BuildSession>().is_active());

    app.world_mut().resource_mut::<Inventory>().add(ItemKind::Metal, 1);
    app.world_mut().send_event(PlaceBuild { spot });
    app.update();

    let inventory = app.world().resource::<Inventory>();
    assert_eq!(inventory.count(ItemKind::Plastic), 1);
    assert_eq!(inventory.count(ItemKind::Metal), 0);
    assert!(app.world().get::<BuildSpot>(spot).is_some_and(|spot| spot.occupied));
    assert!(!app.world().resource::<BuildSession>().is_active());
    assert!(!app
        .world()
        .get::<MovementBlocks>(player)
        .is_some_and(|blocks| blocks.is_blocked()));
}

#[test]
fn test_stun_knockback_wins_over_running_input() {
    let mut app = create_arena_app(7);
    let tuning = Tuning::default();

    // В воздухе: decel 4/тик, knockback не гасится до нуля за один тик
    let player = spawn_with(&mut app, |commands| spawn_player(commands, Vec2::new(0.0, 3.0), &tuning.player));
    app.update();

    if let Some(mut input) = app.world_mut().get_mut::<PlayerInput>(player) {
        input.axis_x = 1.0;
    }
    if let Some(mut body) = app.world_mut().get_mut::<KinematicBody>(player) {
        body.velocity = Vec2::new(45.0, 0.0);
    }
    app.world_mut()
        .send_event(StunRequest::new(player, 0.8, Vec2::new(-8.0, 6.0)));
    app.update();

    let stun = app.world().get::<PlayerStun>(player).expect("player stun");
    assert!(stun.is_stunned());
    let body = app.world().get::<KinematicBody>(player).expect("player body");
    assert!(body.velocity.x < -3.0, "knockback перезаписан input-ом: {:?}", body.velocity);
    assert!((body.velocity.y - 5.5).abs() < 1e-3, "vy {}", body.velocity.y);
}

#[test]
fn test_jump_on_stun_tick_is_dropped() {
    let mut app = create_arena_app(8);
    let tuning = Tuning::default();

    let player = spawn_with(&mut app, |commands| spawn_player(commands, Vec2::new(0.0, 0.5), &tuning.player));
    app.update();
    for _ in 0..3 {
        app.update();
    }
    assert!(app
        .world()
        .get::<PlayerLocomotion>(player)
        .is_some_and(|locomotion| locomotion.is_grounded()));

    if let Some(mut input) = app.world_mut().get_mut::<PlayerInput>(player) {
        input.jump_pressed = true;
    }
    app.world_mut()
        .send_event(StunRequest::new(player, 0.8, Vec2::new(-8.0, 6.0)));
    app.update();

    let body = app.world().get::<KinematicBody>(player).expect("player body");
    assert!(body.velocity.y < 10.0, "прыжок во время stun: vy {}", body.velocity.y);
    let locomotion = app.world().get::<PlayerLocomotion>(player).expect("locomotion");
    assert!(!locomotion.jump_requested());
    assert!(app.world().get::<PlayerStun>(player).is_some_and(|stun| stun.is_stunned()));
}

fn side_contact(enemy: Entity, player: Entity, phase: ContactPhase) -> ContactEvent {
    let (normals, points) = if phase == ContactPhase::Exit {
        (Vec::new(), Vec::new())
    } else {
        (vec![Vec2::X], vec![Vec2::new(0.4, 0.4)])
    };
    ContactEvent {
        entity: enemy,
        other: player,
        phase,
        normals,
        points,
        relative_velocity: Vec2::new(-3.0, 0.0),
        other_velocity: Vec2::ZERO,
    }
}

#[test]
fn test_side_hit_stuns_player_and_latches_until_exit() {
    let mut app = create_arena_app(9);
    collect_events::<StunEntered>(&mut app);
    let tuning = Tuning::default();

    let enemy = spawn_with(&mut app, |commands| {
        spawn_patrol_enemy(
            commands,
            Vec2::new(0.0, 0.4),
            &tuning.standard_enemy,
            Facing::RIGHT,
            DropTable::default(),
        )
    });
    // Справа от врага, физически не касаются
    let player = spawn_with(&mut app, |commands| spawn_player(commands, Vec2::new(3.0, 0.5), &tuning.player));
    app.update();
    app.update();

    app.world_mut()
        .send_event(side_contact(enemy, player, ContactPhase::Enter));
    app.update();

    let player_hits = |app: &App| {
        collected::<StunEntered>(app)
            .into_iter()
            .filter(|event| event.entity == player)
            .count()
    };
    assert_eq!(player_hits(&app), 1);
    assert!(app.world().get::<PlayerStun>(player).is_some_and(|stun| stun.is_stunned()));
    assert_eq!(app.world().get::<Facing>(enemy).copied(), Some(Facing::LEFT));
    let patrol = app.world().get::<Patrol>(enemy).expect("patrol");
    assert!(patrol.in_post_hit());
    assert_eq!(patrol.blocked_until_exit(), Some(player));

    // Exit того же коллайдера снимает latch
    app.world_mut()
        .send_event(side_contact(enemy, player, ContactPhase::Exit));
    app.update();
    let patrol = app.world().get::<Patrol>(enemy).expect("patrol");
    assert_eq!(patrol.blocked_until_exit(), None);

    // Cooldown-ы врага прошли, игрок ещё оглушён → не ранит повторно
    for _ in 0..25 {
        app.update();
    }
    let patrol = app.world().get::<Patrol>(enemy).expect("patrol");
    assert!(patrol.flip_ready() && !patrol.in_post_hit());
    assert!(!app.world().get::<PlayerStun>(player).is_some_and(|stun| stun.can_be_stunned()));

    app.world_mut()
        .send_event(side_contact(enemy, player, ContactPhase::Enter));
    app.update();
    assert_eq!(player_hits(&app), 1);
    let patrol = app.world().get::<Patrol>(enemy).expect("patrol");
    assert!(!patrol.in_post_hit());
    assert_eq!(patrol.blocked_until_exit(), Some(player));
}

#[test]
fn test_debris_hit_stuns_player() {
    let mut app = create_arena_app(10);
    collect_events::<StunEntered>(&mut app);
    let tuning = Tuning::default();
    let config = BossConfig::default();

    let player = spawn_with(&mut app, |commands| spawn_player(commands, Vec2::new(0.0, 0.5), &tuning.player));
    let debris = spawn_with(&mut app, |commands| {
        spawn_debris(commands, Entity::PLACEHOLDER, Vec2::new(0.0, 2.0), Vec2::new(0.0, -3.0), &config)
    });
    app.update();

    for _ in 0..60 {
        app.update();
        if app.world().get_entity(debris).is_err() {
            break;
        }
    }
    assert!(app.world().get_entity(debris).is_err(), "debris исчезает после попадания");

    let hit = collected::<StunEntered>(&app)
        .into_iter()
        .find(|event| event.entity == player)
        .expect("игрок оглушён debris");
    assert_eq!(hit.knockback, config.player_knockback);
    assert!((hit.duration - config.player_stun_time).abs() < 1e-6);

    let world = app.world_mut();
    assert_eq!(world.query_filtered::<Entity, With<Enemy>>().iter(world).count(), 0);
}

/// Debris падает на пол; сколько врагов появилось
fn enemies_after_ground_hit(spawn_chance: f32) -> usize {
    let mut app = create_arena_app(12);
    let config = BossConfig {
        spawn_chance,
        ..BossConfig::default()
    };

    let debris = spawn_with(&mut app, |commands| {
        spawn_debris(commands, Entity::PLACEHOLDER, Vec2::new(5.0, 1.0), Vec2::ZERO, &config)
    });
    app.update();
    for _ in 0..60 {
        app.update();
    }
    assert!(app.world().get_entity(debris).is_err(), "debris исчезает на земле");

    let world = app.world_mut();
    world.query_filtered::<Entity, With<Enemy>>().iter(world).count()
}

#[test]
fn test_debris_ground_hit_respects_spawn_chance() {
    assert_eq!(enemies_after_ground_hit(1.0), 1);
    assert_eq!(enemies_after_ground_hit(0.0), 0);
}
