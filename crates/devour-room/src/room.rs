//! Room actor: an isolated Tokio task that owns one world.
//!
//! Each room runs in its own task and talks to the outside world through
//! channels. Commands arrive on an mpsc channel, grace expiries on a
//! second one, and ticks come from the room's scheduler. One `select!`
//! loop handles all three, so every mutation of the world is serialized.

use devour_protocol::{ClientId, ClientMessage, Codec, JoinOptions, JsonCodec, RoomId, ServerMessage};
use devour_session::{GraceExpired, ReconnectionManager};
use devour_tick::{TickInfo, TickMetrics, TickScheduler};
use devour_world::{Simulation, TickReport, WorldState};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, trace};

use crate::{RoomConfig, RoomError, RoomState};

/// A message for one client, handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub client_id: ClientId,
    pub message: ServerMessage,
}

/// Channel the transport drains to deliver [`Outbound`] messages.
pub type OutboundSender = mpsc::UnboundedSender<Outbound>;

/// The world as of the latest tick or mutation.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    /// Ticks completed when this snapshot was taken.
    pub tick: u64,
    pub world: WorldState,
}

/// What a join did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A new player was spawned.
    Joined,
    /// An offline player came back within its grace period.
    Reconnected,
    /// The player was already online. Nothing changed.
    AlreadyPresent,
}

/// What a leave did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The player was removed from the world.
    Removed,
    /// The player is offline and kept until its grace period runs out.
    GracePeriod,
    /// No such player. Nothing changed.
    NotPresent,
}

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        client_id: ClientId,
        options: JoinOptions,
        reply: oneshot::Sender<JoinOutcome>,
    },

    Leave {
        client_id: ClientId,
        consented: bool,
        reply: oneshot::Sender<LeaveOutcome>,
    },

    /// Deliver a decoded message from a client (fire-and-forget).
    Message {
        client_id: ClientId,
        message: ClientMessage,
    },

    Info {
        reply: oneshot::Sender<RoomInfo>,
    },

    /// Dispose the room regardless of who is still in it.
    Dispose,
}

/// Room metadata (not the world itself).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub state: RoomState,
    /// Players in the world, online or not.
    pub player_count: usize,
    pub online_count: usize,
    /// Players waiting out a grace period.
    pub pending_reconnections: usize,
    pub fruit_count: usize,
    pub max_clients: usize,
    /// Ticks completed so far.
    pub tick: u64,
    /// What happened on the latest tick.
    pub last_report: TickReport,
    pub tick_metrics: TickMetrics,
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone. Every gameplay no-op (duplicate join, unknown client,
/// unknown op) resolves to `Ok`; only a stopped actor yields
/// [`RoomError::Unavailable`].
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
    state: watch::Receiver<RoomState>,
    snapshots: watch::Receiver<WorldSnapshot>,
}

impl RoomHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Adds a client to the room, or brings an offline player back online.
    /// `options` are logged but do not reconfigure a running room.
    pub async fn join(&self, client_id: ClientId, options: &JoinOptions) -> Result<JoinOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            client_id,
            options: options.clone(),
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Removes a client. Without consent the player stays in the world,
    /// offline, for the reconnection grace period.
    pub async fn leave(&self, client_id: ClientId, consented: bool) -> Result<LeaveOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave {
            client_id,
            consented,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Sends a client message to the room (fire-and-forget).
    pub async fn send_message(&self, client_id: ClientId, message: ClientMessage) -> Result<(), RoomError> {
        self.send(RoomCommand::Message { client_id, message }).await
    }

    /// Decodes a raw `{ op, angle? }` payload and delivers it. Payloads
    /// that do not decode are dropped.
    pub async fn send_payload(&self, client_id: ClientId, payload: &[u8]) -> Result<(), RoomError> {
        match JsonCodec.decode::<ClientMessage>(payload) {
            Ok(message) => self.send_message(client_id, message).await,
            Err(e) => {
                debug!(room_id = %self.room_id, client_id = %client_id, error = %e, "dropping malformed payload");
                Ok(())
            }
        }
    }

    /// Requests the current room info.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Info { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Tells the room to dispose itself.
    pub async fn dispose(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Dispose).await
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> WorldSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified after every tick and mutation.
    pub fn subscribe_snapshots(&self) -> watch::Receiver<WorldSnapshot> {
        self.snapshots.clone()
    }

    /// The room's current lifecycle state.
    pub fn state(&self) -> RoomState {
        *self.state.borrow()
    }

    /// Resolves once the room has been disposed.
    pub async fn wait_disposed(&self) {
        let mut state = self.state.clone();
        // The sender is dropped only after `Disposed` is published.
        let _ = state.wait_for(|s| *s == RoomState::Disposed).await;
    }

    async fn send(&self, command: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    config: RoomConfig,
    world: WorldState,
    simulation: Simulation,
    scheduler: TickScheduler,
    reconnection: ReconnectionManager,
    last_report: TickReport,
    outbound: OutboundSender,
    receiver: mpsc::Receiver<RoomCommand>,
    expiries: mpsc::UnboundedReceiver<GraceExpired>,
    state: watch::Sender<RoomState>,
    snapshots: watch::Sender<WorldSnapshot>,
}

impl RoomActor {
    /// Runs the actor loop until the room is disposed.
    async fn run(mut self) {
        self.transition(RoomState::Active);
        info!(
            room_id = %self.room_id,
            fruits = self.world.fruit_count(),
            tick_ms = self.config.tick_interval_ms,
            "room active"
        );

        while self.current_state().is_active() {
            tokio::select! {
                command = self.receiver.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        debug!(room_id = %self.room_id, "all handles dropped");
                        self.transition(RoomState::Disposing);
                    }
                },
                Some(expired) = self.expiries.recv() => self.handle_expiry(expired),
                tick = self.scheduler.wait_for_tick() => self.handle_tick(tick),
            }
        }

        let cancelled = self.reconnection.cancel_all();
        self.transition(RoomState::Disposed);
        info!(
            room_id = %self.room_id,
            ticks = self.scheduler.tick_count(),
            cancelled_grace_periods = cancelled,
            "room disposed"
        );
    }

    fn handle_command(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::Join {
                client_id,
                options,
                reply,
            } => {
                let outcome = self.handle_join(client_id, &options);
                self.publish_snapshot();
                let _ = reply.send(outcome);
            }
            RoomCommand::Leave {
                client_id,
                consented,
                reply,
            } => {
                let outcome = self.handle_leave(client_id, consented);
                self.publish_snapshot();
                let _ = reply.send(outcome);
            }
            RoomCommand::Message { client_id, message } => {
                self.handle_message(client_id, message);
                self.publish_snapshot();
            }
            RoomCommand::Info { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::Dispose => {
                info!(room_id = %self.room_id, players = self.world.player_count(), "disposal requested");
                self.transition(RoomState::Disposing);
            }
        }
    }

    fn handle_join(&mut self, client_id: ClientId, options: &JoinOptions) -> JoinOutcome {
        debug!(room_id = %self.room_id, client_id = %client_id, ?options, "join requested");
        if let Some(player) = self.world.player_mut(&client_id) {
            if self.reconnection.cancel(&client_id).is_ok() {
                player.online = true;
                info!(room_id = %self.room_id, client_id = %client_id, "player reconnected");
                return JoinOutcome::Reconnected;
            }
            debug!(room_id = %self.room_id, client_id = %client_id, "duplicate join ignored");
            return JoinOutcome::AlreadyPresent;
        }

        let player = self.simulation.spawn_player();
        debug!(
            room_id = %self.room_id,
            client_id = %client_id,
            x = player.x,
            y = player.y,
            "spawning player"
        );
        self.world.insert_player(client_id.clone(), player);
        info!(
            room_id = %self.room_id,
            client_id = %client_id,
            players = self.world.player_count(),
            "player joined"
        );
        JoinOutcome::Joined
    }

    fn handle_leave(&mut self, client_id: ClientId, consented: bool) -> LeaveOutcome {
        let Some(player) = self.world.player_mut(&client_id) else {
            debug!(room_id = %self.room_id, client_id = %client_id, "leave for unknown client ignored");
            return LeaveOutcome::NotPresent;
        };
        player.online = false;

        if consented {
            let _ = self.reconnection.cancel(&client_id);
            self.remove_player(&client_id, "left");
            return LeaveOutcome::Removed;
        }

        let grace = self.config.reconnection_grace();
        self.reconnection.start_grace_period(client_id.clone(), grace);
        info!(room_id = %self.room_id, client_id = %client_id, "player disconnected");
        LeaveOutcome::GracePeriod
    }

    fn handle_message(&mut self, client_id: ClientId, message: ClientMessage) {
        let Some(player) = self.world.player_mut(&client_id) else {
            debug!(room_id = %self.room_id, client_id = %client_id, "message from unknown client dropped");
            return;
        };
        if let Err(e) = message.validate() {
            debug!(room_id = %self.room_id, client_id = %client_id, error = %e, "invalid message dropped");
            return;
        }

        match message {
            ClientMessage::Angle { angle } => {
                player.set_heading_degrees(angle);
                trace!(room_id = %self.room_id, client_id = %client_id, angle, "heading changed");
            }
            ClientMessage::Ping => self.send_to(client_id, ServerMessage::Pong),
            ClientMessage::Unknown => {
                debug!(room_id = %self.room_id, client_id = %client_id, "unknown op ignored");
            }
        }
    }

    fn handle_expiry(&mut self, expired: GraceExpired) {
        if self.reconnection.confirm_expiry(&expired).is_err() {
            return;
        }
        let still_offline = self
            .world
            .player(&expired.client_id)
            .is_some_and(|player| !player.online);
        if still_offline {
            self.remove_player(&expired.client_id, "grace expired");
            self.publish_snapshot();
        } else {
            debug!(
                room_id = %self.room_id,
                client_id = %expired.client_id,
                "expired client no longer offline"
            );
        }
    }

    fn handle_tick(&mut self, tick: TickInfo) {
        self.last_report = self.simulation.step(&mut self.world, tick.dt);
        self.scheduler.record_tick_end();
        self.publish_snapshot();
    }

    fn remove_player(&mut self, client_id: &ClientId, reason: &'static str) {
        self.world.remove_player(client_id);
        info!(
            room_id = %self.room_id,
            client_id = %client_id,
            reason,
            players = self.world.player_count(),
            "player removed"
        );

        if self.config.auto_dispose && self.world.player_count() == 0 {
            info!(room_id = %self.room_id, "room empty, disposing");
            self.transition(RoomState::Disposing);
        }
    }

    /// Sends a message to a single client. Silently drops it if the
    /// transport is gone.
    fn send_to(&self, client_id: ClientId, message: ServerMessage) {
        let _ = self.outbound.send(Outbound { client_id, message });
    }

    fn publish_snapshot(&self) {
        self.snapshots.send_replace(WorldSnapshot {
            tick: self.scheduler.tick_count(),
            world: self.world.clone(),
        });
    }

    fn current_state(&self) -> RoomState {
        *self.state.borrow()
    }

    fn transition(&self, target: RoomState) {
        let current = self.current_state();
        if !current.can_transition_to(target) {
            debug!(room_id = %self.room_id, from = %current, to = %target, "ignoring state transition");
            return;
        }
        self.state.send_replace(target);
        debug!(room_id = %self.room_id, from = %current, to = %target, "room state changed");
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id,
            state: self.current_state(),
            player_count: self.world.player_count(),
            online_count: self.world.online_count(),
            pending_reconnections: self.reconnection.len(),
            fruit_count: self.world.fruit_count(),
            max_clients: self.config.max_clients,
            tick: self.scheduler.tick_count(),
            last_report: self.last_report,
            tick_metrics: self.scheduler.metrics().clone(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// `config` should already be validated. `channel_size` bounds the command
/// queue; senders wait when it is full.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: RoomConfig,
    outbound: OutboundSender,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let (expiry_tx, expiry_rx) = mpsc::unbounded_channel();

    let mut simulation = Simulation::new(config.world(), config.rng_seed);
    let world = simulation.init_world();
    let scheduler = TickScheduler::new(config.tick());

    let (state_tx, state_rx) = watch::channel(RoomState::Created);
    let (snapshot_tx, snapshot_rx) = watch::channel(WorldSnapshot {
        tick: 0,
        world: world.clone(),
    });

    let actor = RoomActor {
        room_id,
        config,
        world,
        simulation,
        scheduler,
        reconnection: ReconnectionManager::new(expiry_tx),
        last_report: TickReport::default(),
        outbound,
        receiver: rx,
        expiries: expiry_rx,
        state: state_tx,
        snapshots: snapshot_tx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
        state: state_rx,
        snapshots: snapshot_rx,
    }
}
