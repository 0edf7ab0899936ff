use super::room::{ConnectionId, EventSender, JoinedPlayer, Room, RoomConfig};
use crate::error::GameError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Every live room in the process, keyed by the id clients connect with.
#[derive(Debug, Default)]
pub struct RoomRegistry {
  rooms: DashMap<String, Arc<Room>>,
  config: RoomConfig,
}

impl RoomRegistry {
  pub fn new(config: RoomConfig) -> Self {
    Self {
      rooms: DashMap::new(),
      config,
    }
  }

  fn room(&self, room_id: &str) -> Arc<Room> {
    match self.rooms.entry(room_id.to_string()) {
      Entry::Occupied(entry) => entry.get().clone(),
      Entry::Vacant(entry) => {
        let room = Arc::new(Room::new(room_id, self.config));
        entry.insert(room.clone());
        tracing::info!(room_id, "room created");
        room
      }
    }
  }

  /// Finds or creates the room and seats the connection in it. A room that
  /// was retired between lookup and join is swapped for a fresh one.
  pub async fn join(
    &self,
    room_id: &str,
    sender: EventSender,
  ) -> Result<(Arc<Room>, JoinedPlayer), GameError> {
    loop {
      let room = self.room(room_id);
      match room.join(sender.clone()).await {
        Ok(joined) => return Ok((room, joined)),
        Err(GameError::RoomClosed) => self.retire(&room),
        Err(error) => return Err(error),
      }
    }
  }

  pub async fn leave(&self, room: &Arc<Room>, connection_id: ConnectionId) {
    if room.leave(connection_id).await {
      self.retire(room);
    }
  }

  fn retire(&self, room: &Arc<Room>) {
    let removed = self
      .rooms
      .remove_if(room.id(), |_, current| Arc::ptr_eq(current, room));
    if removed.is_some() {
      tracing::info!(room_id = room.id(), "room removed");
    }
  }

  #[cfg(test)]
  pub fn get(&self, room_id: &str) -> Option<Arc<Room>> {
    self.rooms.get(room_id).map(|entry| entry.value().clone())
  }

  pub fn len(&self) -> usize {
    self.rooms.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::game::room::Phase;
  use tokio::sync::mpsc;

  #[tokio::test]
  async fn first_join_creates_room() {
    let registry = RoomRegistry::default();
    let (sender, _receiver) = mpsc::unbounded_channel();

    let (room, joined) = registry.join("r1", sender).await.unwrap();

    assert_eq!(room.id(), "r1");
    assert_eq!(joined.slot, 0);
    assert_eq!(registry.len(), 1);
    assert!(Arc::ptr_eq(&registry.get("r1").unwrap(), &room));
  }

  #[tokio::test]
  async fn rooms_are_isolated_by_id() {
    let registry = RoomRegistry::default();
    let (first, _first_rx) = mpsc::unbounded_channel();
    let (second, _second_rx) = mpsc::unbounded_channel();

    let (room_a, _) = registry.join("a", first).await.unwrap();
    let (room_b, joined) = registry.join("b", second).await.unwrap();

    assert!(!Arc::ptr_eq(&room_a, &room_b));
    assert_eq!(joined.slot, 0);
    assert_eq!(registry.len(), 2);
  }

  #[tokio::test]
  async fn third_join_is_room_full() {
    let registry = RoomRegistry::default();
    let mut receivers = Vec::new();
    for _ in 0..2 {
      let (sender, receiver) = mpsc::unbounded_channel();
      receivers.push(receiver);
      registry.join("r1", sender).await.unwrap();
    }
    let (sender, _receiver) = mpsc::unbounded_channel();

    let error = registry.join("r1", sender).await.unwrap_err();

    assert_eq!(error, GameError::RoomFull);
    assert_eq!(registry.len(), 1);
  }

  #[tokio::test]
  async fn room_is_removed_only_after_last_player_leaves() {
    let registry = RoomRegistry::default();
    let (first_tx, _first_rx) = mpsc::unbounded_channel();
    let (second_tx, _second_rx) = mpsc::unbounded_channel();
    let (room, first) = registry.join("r1", first_tx).await.unwrap();
    let (_, second) = registry.join("r1", second_tx).await.unwrap();

    registry.leave(&room, first.connection_id).await;
    assert!(registry.get("r1").is_some());
    assert_eq!(room.phase().await, Phase::Waiting);

    registry.leave(&room, second.connection_id).await;
    assert!(registry.get("r1").is_none());
    assert_eq!(registry.len(), 0);
  }

  #[tokio::test]
  async fn retired_room_is_replaced_on_next_join() {
    let registry = RoomRegistry::default();
    let (first_tx, _first_rx) = mpsc::unbounded_channel();
    let (old_room, first) = registry.join("r1", first_tx).await.unwrap();
    assert!(old_room.leave(first.connection_id).await);

    let (second_tx, _second_rx) = mpsc::unbounded_channel();
    let (new_room, joined) = registry.join("r1", second_tx).await.unwrap();

    assert!(!Arc::ptr_eq(&old_room, &new_room));
    assert_eq!(joined.slot, 0);
    assert!(Arc::ptr_eq(&registry.get("r1").unwrap(), &new_room));
  }
}
