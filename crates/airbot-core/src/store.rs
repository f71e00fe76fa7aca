//! Authoritative mapping from room id to its latest reading.

use tokio::sync::RwLock;

use crate::model::{RoomMap, RoomReading};

/// Owns the room map behind a read/write lock. Readers always see a whole
/// snapshot: `replace_all` swaps the entire map under the write lock, so
/// a concurrent `get_all` observes either the old or the new state, never
/// a mix of both.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: RwLock<RoomMap>,
}

impl RoomStore {
    pub fn new(initial: RoomMap) -> Self {
        Self {
            rooms: RwLock::new(initial),
        }
    }

    /// Snapshot of the current mapping. Never fails.
    pub async fn get_all(&self) -> RoomMap {
        self.rooms.read().await.clone()
    }

    /// Upsert a single reading by room id.
    pub async fn apply(&self, id: String, reading: RoomReading) {
        self.rooms.write().await.insert(id, reading);
    }

    /// Swap the entire mapping in one step.
    pub async fn replace_all(&self, rooms: RoomMap) {
        *self.rooms.write().await = rooms;
    }

    /// Mutate the whole map under a single write lock, so one poll's worth
    /// of updates becomes visible at once.
    pub async fn update_with(&self, update: impl FnOnce(&mut RoomMap)) {
        let mut rooms = self.rooms.write().await;
        update(&mut rooms);
    }
}
