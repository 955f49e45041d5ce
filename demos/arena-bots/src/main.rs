//! Headless arena: a handful of bots wander one room until time runs out.
//!
//! ```text
//! RUST_LOG=info,devour_room=debug cargo run -p arena-bots
//! ```

use std::time::Duration;

use devour::prelude::*;
use rand::Rng;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{debug, info};

const BOT_COUNT: usize = 6;
const RUN_FOR: Duration = Duration::from_secs(20);
const STEER_EVERY: Duration = Duration::from_millis(750);
const REPORT_EVERY: Duration = Duration::from_secs(2);

/// The bot that drops its connection halfway and comes back later.
const FLAKY_BOT: usize = 0;

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn room_options() -> JoinOptions {
    let options = json!({
        "tickIntervalMs": 16,
        "worldWidth": 900,
        "worldHeight": 900,
        "initialFruitCount": 60,
        "reconnectionGraceSeconds": 5,
        "rngSeed": 2024,
    });
    match options {
        serde_json::Value::Object(map) => map,
        _ => JoinOptions::new(),
    }
}

fn log_snapshot(snapshot: &WorldSnapshot) {
    let world = &snapshot.world;
    let leader = world
        .players()
        .iter()
        .max_by(|(_, a), (_, b)| a.radius.total_cmp(&b.radius));

    match leader {
        Some((id, player)) => info!(
            tick = snapshot.tick,
            players = world.player_count(),
            online = world.online_count(),
            fruits = world.fruit_count(),
            leader = %id,
            leader_radius = format!("{:.1}", player.radius),
            leader_speed = format!("{:.1}", player.speed),
            "arena"
        ),
        None => info!(tick = snapshot.tick, fruits = world.fruit_count(), "arena is empty"),
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), DevourError> {
    devour::telemetry::init_tracing("info");

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Outbound>();
    tokio::spawn(async move {
        while let Some(outbound) = outbound_rx.recv().await {
            debug!(client_id = %outbound.client_id, message = ?outbound.message, "outbound");
        }
    });

    let mut rooms = RoomManager::new(outbound_tx);
    let options = room_options();
    let bots: Vec<ClientId> = (0..BOT_COUNT).map(|n| ClientId::new(format!("bot-{n}"))).collect();

    let mut arena = None;
    for bot in &bots {
        let (room_id, _) = rooms.join_or_create(bot.clone(), &options).await?;
        arena = Some(room_id);
    }
    let Some(room) = arena.and_then(|room_id| rooms.room(room_id).cloned()) else {
        return Ok(());
    };
    info!(room_id = %room.room_id(), bots = BOT_COUNT, "arena started");

    let flaky = bots[FLAKY_BOT].clone();
    let started = Instant::now();
    let mut steer = time::interval(STEER_EVERY);
    let mut report = time::interval(REPORT_EVERY);
    let mut flaky_offline = false;

    while started.elapsed() < RUN_FOR {
        tokio::select! {
            _ = steer.tick() => {
                for bot in &bots {
                    let angle: f64 = rand::rng().random_range(0.0..360.0);
                    let payload = format!(r#"{{"op":"angle","angle":{angle}}}"#);
                    rooms.route_payload(bot.clone(), payload.as_bytes()).await?;
                }
                rooms.route_message(bots[1].clone(), ClientMessage::Ping).await?;
            }
            _ = report.tick() => {
                log_snapshot(&room.snapshot());

                let elapsed = started.elapsed();
                if !flaky_offline && elapsed >= RUN_FOR / 3 && elapsed < RUN_FOR / 2 {
                    rooms.leave(flaky.clone(), false).await?;
                    flaky_offline = true;
                    info!(client_id = %flaky, "bot dropped its connection");
                } else if flaky_offline && elapsed >= RUN_FOR / 2 {
                    let (_, outcome) = rooms.join_or_create(flaky.clone(), &options).await?;
                    flaky_offline = false;
                    info!(client_id = %flaky, ?outcome, "bot came back");
                }
            }
        }
    }

    let info = room.info().await?;
    info!(
        ticks = info.tick,
        overruns = info.tick_metrics.total_overruns,
        avg_tick_us = info.tick_metrics.avg_tick_time.as_micros() as u64,
        max_tick_us = info.tick_metrics.max_tick_time.as_micros() as u64,
        "run finished"
    );

    for bot in &bots {
        rooms.leave(bot.clone(), true).await?;
    }
    room.wait_disposed().await;
    let reaped = rooms.reap_disposed();
    info!(reaped, rooms = rooms.room_count(), "arena closed");
    Ok(())
}
