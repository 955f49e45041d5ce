//! Room manager: creates, tracks, and routes clients to rooms.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use devour_protocol::{ClientId, ClientMessage, JoinOptions, RoomId};
use tracing::{debug, info};

use crate::room::spawn_room;
use crate::{JoinOutcome, LeaveOutcome, OutboundSender, RoomConfig, RoomError, RoomHandle, RoomInfo, RoomState};

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Manages all live rooms and tracks which client is in which room.
///
/// Rooms share nothing with each other; the manager only holds their
/// handles. All outbound messages from every room go to the one
/// transport sender given at construction.
pub struct RoomManager {
    rooms: HashMap<RoomId, RoomHandle>,

    /// A client is in at most one room at a time. A client in its grace
    /// period stays mapped so a rejoin finds the same room.
    client_rooms: HashMap<ClientId, RoomId>,

    outbound: OutboundSender,
}

impl RoomManager {
    pub fn new(outbound: OutboundSender) -> Self {
        Self {
            rooms: HashMap::new(),
            client_rooms: HashMap::new(),
            outbound,
        }
    }

    /// Creates a room from a client option map.
    ///
    /// # Errors
    /// Returns [`RoomError::InvalidOptions`] if the options do not parse.
    pub fn create_room(&mut self, options: &JoinOptions) -> Result<RoomHandle, RoomError> {
        let config = RoomConfig::from_options(options)?;
        Ok(self.create_room_with_config(config))
    }

    /// Creates a room from an explicit config.
    pub fn create_room_with_config(&mut self, config: RoomConfig) -> RoomHandle {
        let room_id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
        let config = config.validated();
        info!(
            %room_id,
            world_width = config.world_width,
            world_height = config.world_height,
            fruits = config.initial_fruit_count,
            "room created"
        );
        let handle = spawn_room(room_id, config, self.outbound.clone(), DEFAULT_CHANNEL_SIZE);
        self.rooms.insert(room_id, handle.clone());
        handle
    }

    pub fn room(&self, room_id: RoomId) -> Option<&RoomHandle> {
        self.rooms.get(&room_id)
    }

    /// Adds a client to a specific room.
    ///
    /// # Errors
    /// Returns [`RoomError::AlreadyInRoom`] if the client is mapped to a
    /// different room, [`RoomError::NotFound`] for an unknown room.
    pub async fn join_room(
        &mut self,
        client_id: ClientId,
        room_id: RoomId,
        options: &JoinOptions,
    ) -> Result<JoinOutcome, RoomError> {
        if let Some(current) = self.client_rooms.get(&client_id).copied() {
            if current != room_id && self.is_live(current) {
                return Err(RoomError::AlreadyInRoom(client_id, current));
            }
        }

        let handle = self.rooms.get(&room_id).ok_or(RoomError::NotFound(room_id))?;
        let outcome = handle.join(client_id.clone(), options).await?;
        self.client_rooms.insert(client_id, room_id);
        Ok(outcome)
    }

    /// Places a client in a room: the room it is already mapped to (which
    /// is how a disconnected client reconnects), else the first live room
    /// with space, else a new room built from `options`.
    pub async fn join_or_create(
        &mut self,
        client_id: ClientId,
        options: &JoinOptions,
    ) -> Result<(RoomId, JoinOutcome), RoomError> {
        if let Some(room_id) = self.client_rooms.get(&client_id).copied() {
            if let Some(handle) = self.rooms.get(&room_id) {
                match handle.join(client_id.clone(), options).await {
                    Ok(outcome) => return Ok((room_id, outcome)),
                    Err(RoomError::Unavailable(_)) => {
                        debug!(%room_id, client_id = %client_id, "mapped room gone, finding another");
                    }
                    Err(e) => return Err(e),
                }
            }
            self.client_rooms.remove(&client_id);
        }

        // If a room disposes between info() and join(), keep searching.
        for handle in self.rooms.values() {
            let Ok(info) = handle.info().await else {
                continue;
            };
            if info.state.is_active() && info.player_count < info.max_clients {
                if let Ok(outcome) = handle.join(client_id.clone(), options).await {
                    self.client_rooms.insert(client_id, info.room_id);
                    return Ok((info.room_id, outcome));
                }
            }
        }

        let handle = self.create_room(options)?;
        let room_id = handle.room_id();
        let outcome = handle.join(client_id.clone(), options).await?;
        self.client_rooms.insert(client_id, room_id);
        Ok((room_id, outcome))
    }

    /// Removes a client from its room. An unplaced client is a no-op.
    pub async fn leave(&mut self, client_id: ClientId, consented: bool) -> Result<LeaveOutcome, RoomError> {
        let Some(room_id) = self.client_rooms.get(&client_id).copied() else {
            return Ok(LeaveOutcome::NotPresent);
        };
        let Some(handle) = self.rooms.get(&room_id) else {
            self.client_rooms.remove(&client_id);
            return Ok(LeaveOutcome::NotPresent);
        };

        let outcome = match handle.leave(client_id.clone(), consented).await {
            Ok(outcome) => outcome,
            Err(RoomError::Unavailable(_)) => LeaveOutcome::NotPresent,
            Err(e) => return Err(e),
        };
        if outcome != LeaveOutcome::GracePeriod {
            self.client_rooms.remove(&client_id);
        }
        Ok(outcome)
    }

    /// Routes a decoded message from a client to its room. Messages from
    /// unplaced clients are dropped.
    pub async fn route_message(&self, client_id: ClientId, message: ClientMessage) -> Result<(), RoomError> {
        match self.handle_for(&client_id) {
            Some(handle) => handle.send_message(client_id, message).await,
            None => {
                debug!(client_id = %client_id, "message from unplaced client dropped");
                Ok(())
            }
        }
    }

    /// Routes a raw payload from a client to its room.
    pub async fn route_payload(&self, client_id: ClientId, payload: &[u8]) -> Result<(), RoomError> {
        match self.handle_for(&client_id) {
            Some(handle) => handle.send_payload(client_id, payload).await,
            None => {
                debug!(client_id = %client_id, "payload from unplaced client dropped");
                Ok(())
            }
        }
    }

    pub async fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, RoomError> {
        let handle = self.rooms.get(&room_id).ok_or(RoomError::NotFound(room_id))?;
        handle.info().await
    }

    /// Disposes a room, waits for it to stop, and forgets its clients.
    pub async fn destroy_room(&mut self, room_id: RoomId) -> Result<(), RoomError> {
        let handle = self.rooms.remove(&room_id).ok_or(RoomError::NotFound(room_id))?;

        // Already stopped is fine.
        let _ = handle.dispose().await;
        handle.wait_disposed().await;

        self.client_rooms.retain(|_, rid| *rid != room_id);
        info!(%room_id, "room destroyed");
        Ok(())
    }

    /// Forgets every room that has disposed itself. Returns how many were
    /// removed.
    pub fn reap_disposed(&mut self) -> usize {
        let before = self.rooms.len();
        self.rooms.retain(|_, handle| handle.state() != RoomState::Disposed);
        let rooms = &self.rooms;
        self.client_rooms.retain(|_, rid| rooms.contains_key(rid));

        let reaped = before - self.rooms.len();
        if reaped > 0 {
            debug!(reaped, remaining = self.rooms.len(), "reaped disposed rooms");
        }
        reaped
    }

    /// The room a client is currently placed in, if any.
    pub fn client_room(&self, client_id: &ClientId) -> Option<RoomId> {
        self.client_rooms.get(client_id).copied()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().copied().collect()
    }

    fn handle_for(&self, client_id: &ClientId) -> Option<&RoomHandle> {
        self.client_rooms
            .get(client_id)
            .and_then(|room_id| self.rooms.get(room_id))
    }

    fn is_live(&self, room_id: RoomId) -> bool {
        self.rooms
            .get(&room_id)
            .is_some_and(|handle| !handle.state().is_closing())
    }
}
