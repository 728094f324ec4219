//! Rolling history
//!
//! Fixed-capacity ring buffer of fused snapshots for trend and analytics
//! consumers. Slots are allocated once; a monotonically advancing write cursor
//! modulo capacity selects the slot to overwrite, so the buffer never grows.
//!
//! Writers build the complete entry before taking the write lock, so readers
//! only ever observe whole entries.

use crate::types::HistoryEntry;
use parking_lot::RwLock;

#[derive(Debug)]
struct Ring {
    slots: Vec<Option<HistoryEntry>>,
    /// Total number of appends since creation
    cursor: u64,
}

impl Ring {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn len(&self) -> usize {
        (self.cursor.min(self.capacity() as u64)) as usize
    }

    /// Slot index of the oldest live entry
    fn head(&self) -> usize {
        if self.cursor <= self.capacity() as u64 {
            0
        } else {
            (self.cursor % self.capacity() as u64) as usize
        }
    }
}

/// Thread-safe fixed-capacity history ring
#[derive(Debug)]
pub struct HistoryStore {
    ring: RwLock<Ring>,
}

impl HistoryStore {
    /// Create a store holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: RwLock::new(Ring {
                slots: vec![None; capacity.max(1)],
                cursor: 0,
            }),
        }
    }

    /// Append an entry, overwriting the oldest once full
    pub fn append(&self, entry: HistoryEntry) {
        let mut ring = self.ring.write();
        let index = (ring.cursor % ring.capacity() as u64) as usize;
        ring.slots[index] = Some(entry);
        ring.cursor += 1;
    }

    /// Current contents, oldest first
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        let ring = self.ring.read();
        let head = ring.head();
        let len = ring.len();
        let capacity = ring.capacity();
        (0..len)
            .filter_map(|offset| ring.slots[(head + offset) % capacity].clone())
            .collect()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<HistoryEntry> {
        let ring = self.ring.read();
        if ring.cursor == 0 {
            return None;
        }
        let index = ((ring.cursor - 1) % ring.capacity() as u64) as usize;
        ring.slots[index].clone()
    }

    pub fn len(&self) -> usize {
        self.ring.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.ring.read().capacity()
    }

    /// Number of entries ever appended, including overwritten ones
    pub fn total_appended(&self) -> u64 {
        self.ring.read().cursor
    }
}
