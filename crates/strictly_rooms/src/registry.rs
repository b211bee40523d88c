//! Registry of hosted rooms.

use crate::config::RoomConfig;
use crate::error::{RoomError, RoomErrorKind};
use crate::message::RoomId;
use crate::outbound::Outbound;
use crate::room::{RoomHandle, spawn_room};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

/// Hosts every active room; clones share the same map.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<RoomId, RoomHandle>>>,
    config: RoomConfig,
    outbound: Arc<dyn Outbound>,
}

impl std::fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RoomRegistry {
    /// Creates an empty registry; every room shares `config` and `outbound`.
    #[instrument(skip(outbound))]
    pub fn new(config: RoomConfig, outbound: Arc<dyn Outbound>) -> Self {
        info!("Creating room registry");
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            config,
            outbound,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<RoomId, RoomHandle>>, RoomError> {
        self.rooms
            .lock()
            .map_err(|_| RoomError::new(RoomErrorKind::Poisoned))
    }

    /// Creates a room with a fresh session.
    ///
    /// A stale entry whose task already stopped is replaced.
    #[instrument(skip(self))]
    pub fn create_room(&self, id: RoomId) -> Result<RoomHandle, RoomError> {
        let mut rooms = self.lock()?;
        if rooms.get(&id).is_some_and(|room| !room.is_closed()) {
            warn!(room = %id, "Room already exists");
            return Err(RoomError::new(RoomErrorKind::AlreadyExists(id.to_string())));
        }

        let handle = spawn_room(id.clone(), self.config.clone(), Arc::clone(&self.outbound));
        rooms.insert(id, handle.clone());
        Ok(handle)
    }

    /// Gets a running room.
    #[instrument(skip(self))]
    pub fn room(&self, id: &RoomId) -> Result<RoomHandle, RoomError> {
        let rooms = self.lock()?;
        match rooms.get(id) {
            Some(room) if !room.is_closed() => Ok(room.clone()),
            _ => {
                debug!(room = %id, "Room not found");
                Err(RoomError::new(RoomErrorKind::NotFound(id.to_string())))
            }
        }
    }

    /// Tears a room down and forgets it.
    #[instrument(skip(self))]
    pub fn close_room(&self, id: &RoomId) -> Result<(), RoomError> {
        let room = self
            .lock()?
            .remove(id)
            .ok_or_else(|| RoomError::new(RoomErrorKind::NotFound(id.to_string())))?;
        info!(room = %id, "Closing room");
        room.close()
    }

    /// Ids of the hosted rooms, sorted.
    #[instrument(skip(self))]
    pub fn room_ids(&self) -> Result<Vec<RoomId>, RoomError> {
        let mut ids: Vec<_> = self.lock()?.keys().cloned().collect();
        ids.sort();
        debug!(count = ids.len(), "Listed rooms");
        Ok(ids)
    }
}
