//! Chunk storage seam.
//!
//! The populator never owns storage. When a write crosses into a
//! neighbouring chunk it asks a [`ChunkStore`] for that chunk *without*
//! triggering population, so generation can never recurse.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::chunk::{Chunk, ChunkCoord};

/// Shared handle to a loaded chunk.
pub type ChunkHandle = Arc<Mutex<Chunk>>;

/// The chunk-storage collaborator.
pub trait ChunkStore: Send + Sync {
    /// Returns the chunk at `coord`, creating an empty unpopulated one if it
    /// is not loaded. Must not run the populator.
    ///
    /// `None` means the store refuses the coordinate (outside the world,
    /// shutting down); the caller skips the write.
    fn load_or_create_no_populate(&self, coord: ChunkCoord) -> Option<ChunkHandle>;

    /// Makes a populated chunk reachable at its coordinate.
    ///
    /// A placeholder already loaded there keeps its handle: its contents
    /// are replaced, except blocks gameplay has edited or protected.
    fn publish(&self, chunk: Chunk) -> ChunkHandle;
}

/// In-memory chunk store.
///
/// Thread-safe for concurrent access from generation workers.
#[derive(Default)]
pub struct MemoryChunkStore {
    chunks: RwLock<HashMap<ChunkCoord, ChunkHandle>>,
}

impl MemoryChunkStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the chunk if loaded.
    #[must_use]
    pub fn get(&self, coord: ChunkCoord) -> Option<ChunkHandle> {
        self.chunks.read().get(&coord).cloned()
    }

    /// Inserts or replaces a chunk, returning its handle.
    pub fn insert(&self, chunk: Chunk) -> ChunkHandle {
        let coord = chunk.coord;
        let handle = Arc::new(Mutex::new(chunk));
        self.chunks.write().insert(coord, Arc::clone(&handle));
        handle
    }

    /// Returns the number of loaded chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    /// Returns true if nothing is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.read().is_empty()
    }
}

impl ChunkStore for MemoryChunkStore {
    fn load_or_create_no_populate(&self, coord: ChunkCoord) -> Option<ChunkHandle> {
        if let Some(handle) = self.chunks.read().get(&coord) {
            return Some(Arc::clone(handle));
        }
        let mut chunks = self.chunks.write();
        let handle = chunks
            .entry(coord)
            .or_insert_with(|| Arc::new(Mutex::new(Chunk::new(coord))));
        Some(Arc::clone(handle))
    }

    fn publish(&self, mut chunk: Chunk) -> ChunkHandle {
        let coord = chunk.coord;
        let handle = Arc::clone(
            self.chunks
                .write()
                .entry(coord)
                .or_insert_with(|| Arc::new(Mutex::new(Chunk::new(coord)))),
        );

        // Store lock released before the chunk lock is taken
        let mut slot = handle.lock();
        for (fresh, old) in chunk.blocks_mut().iter_mut().zip(slot.blocks()) {
            if old.is_locked() {
                *fresh = *old;
            }
        }
        *slot = chunk;
        drop(slot);
        handle
    }
}
