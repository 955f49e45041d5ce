//! The authoritative state of one room's world.

use std::collections::BTreeMap;

use devour_protocol::{ClientId, FruitId};
use serde::Serialize;

use crate::{Bounds, Fruit, Player};

/// Players, fruit, and bounds of one room.
///
/// Both collections are ordered maps whose only mutation verbs are insert
/// and remove. Iteration order is the key order, so a tick visits players
/// in client-id order and fruit in spawn order.
///
/// The fruit-id counter lives here rather than in any global: ids are
/// unique per room and allocated under the same ownership as every other
/// mutation.
#[derive(Debug, Clone, Serialize)]
pub struct WorldState {
    bounds: Bounds,
    players: BTreeMap<ClientId, Player>,
    fruits: BTreeMap<FruitId, Fruit>,
    #[serde(skip)]
    next_fruit_id: u64,
}

impl WorldState {
    /// An empty world.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            players: BTreeMap::new(),
            fruits: BTreeMap::new(),
            next_fruit_id: 0,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    // -- players ----------------------------------------------------------

    pub fn players(&self) -> &BTreeMap<ClientId, Player> {
        &self.players
    }

    pub fn player(&self, id: &ClientId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &ClientId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    pub fn contains_player(&self, id: &ClientId) -> bool {
        self.players.contains_key(id)
    }

    /// Inserts a player unless one already exists under `id`.
    ///
    /// Returns `false` (and leaves the existing player untouched) on a
    /// duplicate.
    pub fn insert_player(&mut self, id: ClientId, player: Player) -> bool {
        match self.players.entry(id) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(player);
                true
            }
        }
    }

    pub fn remove_player(&mut self, id: &ClientId) -> Option<Player> {
        self.players.remove(id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn online_count(&self) -> usize {
        self.players.values().filter(|p| p.online).count()
    }

    // -- fruit ------------------------------------------------------------

    pub fn fruits(&self) -> &BTreeMap<FruitId, Fruit> {
        &self.fruits
    }

    /// Inserts a fruit under the next spawn-order id and returns the id.
    pub fn insert_fruit(&mut self, fruit: Fruit) -> FruitId {
        let id = FruitId(self.next_fruit_id);
        self.next_fruit_id += 1;
        self.fruits.insert(id, fruit);
        id
    }

    pub fn remove_fruit(&mut self, id: FruitId) -> Option<Fruit> {
        self.fruits.remove(&id)
    }

    pub fn fruit_count(&self) -> usize {
        self.fruits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorldConfig;

    fn world() -> WorldState {
        WorldState::new(Bounds::new(500.0, 500.0))
    }

    #[test]
    fn test_insert_player_rejects_duplicate() {
        let config = WorldConfig::default();
        let mut w = world();
        assert!(w.insert_player("a".into(), Player::new(100.0, 100.0, &config)));
        assert!(!w.insert_player("a".into(), Player::new(200.0, 200.0, &config)));
        assert_eq!(w.player(&"a".into()).unwrap().x, 100.0);
        assert_eq!(w.player_count(), 1);
    }

    #[test]
    fn test_online_count_ignores_offline() {
        let config = WorldConfig::default();
        let mut w = world();
        w.insert_player("a".into(), Player::new(100.0, 100.0, &config));
        w.insert_player("b".into(), Player::new(200.0, 200.0, &config));
        w.player_mut(&"b".into()).unwrap().online = false;
        assert_eq!(w.player_count(), 2);
        assert_eq!(w.online_count(), 1);
    }

    #[test]
    fn test_fruit_ids_never_reused() {
        let mut w = world();
        let a = w.insert_fruit(Fruit::new(10.0, 10.0));
        w.remove_fruit(a);
        let b = w.insert_fruit(Fruit::new(20.0, 20.0));
        assert_ne!(a, b);
        assert!(b > a);
        assert_eq!(w.fruit_count(), 1);
    }

    #[test]
    fn test_serializes_with_string_keys() {
        let config = WorldConfig::default();
        let mut w = world();
        w.insert_player("p1".into(), Player::new(100.0, 100.0, &config));
        w.insert_fruit(Fruit::new(10.0, 10.0));

        let json = serde_json::to_value(&w).unwrap();
        assert!(json["players"]["p1"].is_object());
        assert!(json["fruits"]["fr_0"].is_object());
        assert!(json.get("next_fruit_id").is_none());
    }
}
