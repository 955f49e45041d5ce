//! Tick-level properties of the world simulation.

use std::f64::consts::PI;
use std::time::Duration;

use devour_protocol::ClientId;
use devour_world::{Bounds, Fruit, Player, Simulation, WorldConfig, WorldState};

// =========================================================================
// Helpers
// =========================================================================

const TICK: Duration = Duration::from_millis(16);

/// Resolves collisions without moving anyone.
const STILL: Duration = Duration::ZERO;

fn cid(id: &str) -> ClientId {
    ClientId::from(id)
}

fn config_without_fruit() -> WorldConfig {
    WorldConfig {
        initial_fruit_count: 0,
        ..WorldConfig::default()
    }
}

fn player_with_radius(x: f64, y: f64, radius: f64, config: &WorldConfig) -> Player {
    Player {
        radius,
        ..Player::new(x, y, config)
    }
}

fn in_bounds(p: &Player, bounds: Bounds) -> bool {
    bounds.contains_circle(p.x, p.y, p.radius)
}

// =========================================================================
// Initialization
// =========================================================================

#[test]
fn test_init_world_fifty_fruit_within_margin() {
    let config = WorldConfig::default();
    let mut sim = Simulation::new(config.clone(), Some(11));

    let world = sim.init_world();

    assert_eq!(world.fruit_count(), 50);
    let r = config.fruit_radius;
    for fruit in world.fruits().values() {
        assert!(fruit.x >= r && fruit.x <= config.bounds.width - r);
        assert!(fruit.y >= r && fruit.y <= config.bounds.height - r);
    }
}

// =========================================================================
// Motion
// =========================================================================

#[test]
fn test_heading_ninety_degrees_moves_along_y() {
    let config = config_without_fruit();
    let mut sim = Simulation::new(config.clone(), Some(1));
    let mut world = sim.init_world();
    let mut player = Player::new(600.0, 600.0, &config);
    player.set_heading_degrees(90.0);
    world.insert_player(cid("a"), player);

    sim.step(&mut world, TICK);

    let p = world.player(&cid("a")).unwrap();
    assert!((p.y - (600.0 + 120.0 * 0.016)).abs() < 1e-9, "y = {}", p.y);
    assert!((p.x - 600.0).abs() < 1e-9, "x = {}", p.x);
}

#[test]
fn test_players_stay_inside_bounds_every_tick() {
    let config = WorldConfig {
        bounds: Bounds::new(800.0, 600.0),
        initial_fruit_count: 10,
        ..WorldConfig::default()
    };
    let mut sim = Simulation::new(config.clone(), Some(5));
    let mut world = sim.init_world();
    for (i, degrees) in [0.0, 45.0, 135.0, 200.0, 270.0, 315.0].iter().enumerate() {
        let mut p = sim.spawn_player();
        p.set_heading_degrees(*degrees);
        world.insert_player(cid(&format!("p{i}")), p);
    }

    for _ in 0..600 {
        sim.step(&mut world, TICK);
        for p in world.players().values() {
            assert!(in_bounds(p, config.bounds), "escaped: {p:?}");
        }
    }
}

#[test]
fn test_growth_at_wall_keeps_circle_inside() {
    let config = config_without_fruit();
    let mut sim = Simulation::new(config.clone(), Some(1));
    let mut world = sim.init_world();
    let mut p = Player::new(40.0, 600.0, &config);
    p.angle = PI;
    world.insert_player(cid("a"), p);
    world.insert_fruit(Fruit::new(60.0, 600.0));

    let report = sim.step(&mut world, TICK);

    assert_eq!(report.fruits_eaten, 1);
    let p = world.player(&cid("a")).unwrap();
    assert_eq!(p.radius, 41.0);
    assert_eq!(p.x, 41.0);
    assert!(in_bounds(p, config.bounds), "escaped: {p:?}");
}

#[test]
fn test_eating_player_at_wall_keeps_circle_inside() {
    let config = config_without_fruit();
    let mut sim = Simulation::new(config.clone(), Some(1));
    let mut world = sim.init_world();
    world.insert_player(cid("big"), player_with_radius(60.0, 500.0, 60.0, &config));
    world.insert_player(cid("small"), player_with_radius(100.0, 500.0, 30.0, &config));

    let report = sim.step(&mut world, STILL);

    assert_eq!(report.players_eaten, 1);
    let big = world.player(&cid("big")).unwrap();
    assert_eq!(big.radius, 63.0);
    assert_eq!(big.x, 63.0);
    assert!(in_bounds(big, config.bounds), "escaped: {big:?}");
}

#[test]
fn test_large_step_clamps_to_corner() {
    let config = config_without_fruit();
    let mut sim = Simulation::new(config.clone(), Some(1));
    let mut world = sim.init_world();
    let mut p = Player::new(600.0, 600.0, &config);
    p.angle = -3.0 * PI / 4.0;
    world.insert_player(cid("a"), p);

    sim.step(&mut world, Duration::from_secs(60));

    let p = world.player(&cid("a")).unwrap();
    assert_eq!((p.x, p.y), (p.radius, p.radius));
}

// =========================================================================
// Fruit consumption
// =========================================================================

#[test]
fn test_fruit_population_never_drifts() {
    let config = WorldConfig {
        bounds: Bounds::new(300.0, 300.0),
        initial_fruit_count: 80,
        ..WorldConfig::default()
    };
    let mut sim = Simulation::new(config, Some(21));
    let mut world = sim.init_world();
    for i in 0..4 {
        let p = sim.spawn_player();
        world.insert_player(cid(&format!("p{i}")), p);
    }

    let mut total_eaten = 0;
    for _ in 0..500 {
        let before = world.fruit_count();
        let report = sim.step(&mut world, TICK);
        assert_eq!(report.fruits_spawned, report.fruits_eaten);
        assert_eq!(world.fruit_count(), before + report.fruits_spawned - report.fruits_eaten);
        assert_eq!(world.fruit_count(), 80);
        total_eaten += report.fruits_eaten;
    }
    assert!(total_eaten > 0, "a crowded small world should see fruit eaten");
}

#[test]
fn test_replacements_can_be_eaten_later_in_the_tick() {
    // Three equal players cover the whole 100x100 world, so each one eats
    // every fruit the one before it left behind.
    let config = WorldConfig {
        bounds: Bounds::new(100.0, 100.0),
        fruit_growth_increment: 0.0,
        ..config_without_fruit()
    };
    let mut sim = Simulation::new(config.clone(), Some(4));
    let mut world = sim.init_world();
    for id in ["a", "b", "c"] {
        world.insert_player(cid(id), player_with_radius(50.0, 50.0, 48.0, &config));
    }
    world.insert_fruit(Fruit::new(20.0, 20.0));
    world.insert_fruit(Fruit::new(80.0, 70.0));

    let report = sim.step(&mut world, STILL);

    assert_eq!(report.fruits_eaten, 6);
    assert!(report.fruits_eaten > 2, "more than the standing population");
    assert_eq!(report.fruits_spawned, report.fruits_eaten);
    assert_eq!(report.players_eaten, 0);
    assert_eq!(world.fruit_count(), 2);
}

#[test]
fn test_eating_fruit_grows_and_slows() {
    let config = config_without_fruit();
    let mut sim = Simulation::new(config.clone(), Some(1));
    let mut world = sim.init_world();
    world.insert_player(cid("a"), Player::new(600.0, 600.0, &config));
    let first = world.insert_fruit(Fruit::new(630.0, 600.0));
    let second = world.insert_fruit(Fruit::new(600.0, 570.0));

    let report = sim.step(&mut world, TICK);

    assert_eq!(report.fruits_eaten, 2);
    assert!(world.fruits().get(&first).is_none());
    assert!(world.fruits().get(&second).is_none());
    assert_eq!(world.fruit_count(), 2, "one replacement per fruit eaten");

    let p = world.player(&cid("a")).unwrap();
    assert_eq!(p.radius, config.player_init_radius + 2.0 * config.fruit_growth_increment);
    let expected_speed = config.player_init_speed - 2.0 * config.fruit_speed_decrement;
    assert!((p.speed - expected_speed).abs() < 1e-9);
}

#[test]
fn test_eating_fruit_never_drops_below_min_speed() {
    let config = config_without_fruit();
    let mut sim = Simulation::new(config.clone(), Some(1));
    let mut world = sim.init_world();
    let mut p = player_with_radius(600.0, 600.0, 40.0, &config);
    p.speed = config.player_min_speed;
    world.insert_player(cid("a"), p);
    world.insert_fruit(Fruit::new(600.0, 600.0));

    sim.step(&mut world, STILL);

    let p = world.player(&cid("a")).unwrap();
    assert_eq!(p.speed, config.player_min_speed);
    assert_eq!(p.radius, 40.0 + config.fruit_growth_increment);
}

#[test]
fn test_offline_player_does_not_eat_fruit() {
    let config = config_without_fruit();
    let mut sim = Simulation::new(config.clone(), Some(1));
    let mut world = sim.init_world();
    let mut p = Player::new(600.0, 600.0, &config);
    p.online = false;
    world.insert_player(cid("a"), p);
    world.insert_fruit(Fruit::new(600.0, 600.0));

    let report = sim.step(&mut world, TICK);

    assert_eq!(report.fruits_eaten, 0);
    assert_eq!(world.player(&cid("a")).unwrap().radius, config.player_init_radius);
}

// =========================================================================
// Player consumption
// =========================================================================

#[test]
fn test_larger_player_eats_smaller() {
    let config = config_without_fruit();
    let mut sim = Simulation::new(config.clone(), Some(3));
    let mut world = sim.init_world();
    world.insert_player(cid("big"), player_with_radius(500.0, 500.0, 60.0, &config));
    world.insert_player(cid("small"), player_with_radius(550.0, 500.0, 30.0, &config));

    let report = sim.step(&mut world, STILL);

    assert_eq!(report.players_eaten, 1);
    let big = world.player(&cid("big")).unwrap();
    assert!((big.radius - (60.0 + 30.0 / 10.0)).abs() < 1e-12);
    assert!((big.speed - (config.player_init_speed - 30.0 / 20.0)).abs() < 1e-12);

    let small = world.player(&cid("small")).unwrap();
    assert_eq!(small.radius, config.player_init_radius);
    assert!(in_bounds(small, config.bounds));
    assert_eq!(world.player_count(), 2, "eaten players stay in the room");
}

#[test]
fn test_player_consumption_floors_speed() {
    let config = config_without_fruit();
    let mut sim = Simulation::new(config.clone(), Some(3));
    let mut world = sim.init_world();
    let mut big = player_with_radius(500.0, 500.0, 60.0, &config);
    big.speed = config.player_min_speed + 1.0;
    world.insert_player(cid("big"), big);
    world.insert_player(cid("small"), player_with_radius(520.0, 500.0, 30.0, &config));

    sim.step(&mut world, STILL);

    let big = world.player(&cid("big")).unwrap();
    assert_eq!(big.speed, config.player_min_speed, "1.5 off a 1.0 margin floors");
}

#[test]
fn test_equal_radii_never_consume() {
    let config = config_without_fruit();
    let mut sim = Simulation::new(config.clone(), Some(3));
    let mut world = sim.init_world();
    world.insert_player(cid("a"), player_with_radius(500.0, 500.0, 40.0, &config));
    world.insert_player(cid("b"), player_with_radius(510.0, 500.0, 40.0, &config));

    let report = sim.step(&mut world, STILL);

    assert_eq!(report.players_eaten, 0);
    let a = world.player(&cid("a")).unwrap();
    let b = world.player(&cid("b")).unwrap();
    assert_eq!((a.x, a.radius), (500.0, 40.0));
    assert_eq!((b.x, b.radius), (510.0, 40.0));
}

#[test]
fn test_consumption_is_symmetric_in_key_order() {
    // Whichever key sorts first, the larger player is the one that eats.
    for (big_key, small_key) in [("a", "b"), ("b", "a")] {
        let config = config_without_fruit();
        let mut sim = Simulation::new(config.clone(), Some(3));
        let mut world = sim.init_world();
        world.insert_player(cid(big_key), player_with_radius(500.0, 500.0, 50.0, &config));
        world.insert_player(cid(small_key), player_with_radius(520.0, 500.0, 45.0, &config));

        sim.step(&mut world, STILL);

        assert!((world.player(&cid(big_key)).unwrap().radius - 54.5).abs() < 1e-12);
        assert_eq!(world.player(&cid(small_key)).unwrap().radius, config.player_init_radius);
    }
}

#[test]
fn test_offline_player_can_be_eaten_by_default() {
    let config = config_without_fruit();
    let mut sim = Simulation::new(config.clone(), Some(3));
    let mut world = sim.init_world();
    world.insert_player(cid("big"), player_with_radius(500.0, 500.0, 60.0, &config));
    let mut away = player_with_radius(540.0, 500.0, 30.0, &config);
    away.online = false;
    world.insert_player(cid("away"), away);

    let report = sim.step(&mut world, STILL);

    assert_eq!(report.players_eaten, 1);
    let away = world.player(&cid("away")).unwrap();
    assert_eq!(away.radius, config.player_init_radius);
    assert!(!away.online, "being eaten does not change the online flag");
}

#[test]
fn test_offline_player_inert_when_collisions_disabled() {
    let config = WorldConfig {
        offline_players_collide: false,
        ..config_without_fruit()
    };
    let mut sim = Simulation::new(config.clone(), Some(3));
    let mut world = sim.init_world();
    world.insert_player(cid("big"), player_with_radius(500.0, 500.0, 60.0, &config));
    let mut away = player_with_radius(540.0, 500.0, 30.0, &config);
    away.online = false;
    world.insert_player(cid("away"), away);

    let report = sim.step(&mut world, STILL);

    assert_eq!(report.players_eaten, 0);
    assert_eq!(world.player(&cid("away")).unwrap().radius, 30.0);
}

#[test]
fn test_offline_larger_player_does_not_eat() {
    let config = config_without_fruit();
    let mut sim = Simulation::new(config.clone(), Some(3));
    let mut world = sim.init_world();
    let mut big = player_with_radius(500.0, 500.0, 60.0, &config);
    big.online = false;
    world.insert_player(cid("big"), big);
    world.insert_player(cid("small"), player_with_radius(540.0, 500.0, 30.0, &config));

    let report = sim.step(&mut world, STILL);

    assert_eq!(report.players_eaten, 0);
    assert_eq!(world.player(&cid("big")).unwrap().radius, 60.0);
}

#[test]
fn test_eaten_player_may_still_eat_in_same_tick() {
    // In an 82x82 world every respawn lands within a few units of the
    // centre, so all circles overlap. Resolution order is a, b, c:
    //   a (36) eats b (35)            → a = 39.5, b reset to 40
    //   b (40) eats a (39.5)          → b = 43.95, a reset to 40
    //   b (43.95) eats c (39.8)       → b = 47.93, c reset to 40
    //   c (40) is not larger than anyone.
    let config = WorldConfig {
        bounds: Bounds::new(82.0, 82.0),
        ..config_without_fruit()
    };
    let mut sim = Simulation::new(config.clone(), Some(8));
    let mut world = WorldState::new(config.bounds);
    world.insert_player(cid("a"), player_with_radius(41.0, 41.0, 36.0, &config));
    world.insert_player(cid("b"), player_with_radius(41.0, 41.0, 35.0, &config));
    world.insert_player(cid("c"), player_with_radius(41.0, 41.0, 39.8, &config));

    let report = sim.step(&mut world, STILL);

    assert_eq!(report.players_eaten, 3);
    assert_eq!(world.player(&cid("a")).unwrap().radius, config.player_init_radius);
    assert!((world.player(&cid("b")).unwrap().radius - 47.93).abs() < 1e-9);
    assert_eq!(world.player(&cid("c")).unwrap().radius, config.player_init_radius);
}
