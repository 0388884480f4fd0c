use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TTFlag {
    Exact,
    LowerBound, // Fail-high, the true value is at least `score`
    UpperBound, // Fail-low, the true value is at most `score`
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TTEntry {
    pub depth: u32,
    pub score: i32,
    pub flag: TTFlag,
    /// Marks on the board when the entry was stored. Two positions with
    /// colliding hashes but different mark counts are told apart by this.
    pub marks: usize,
}

/// Position memo keyed by Zobrist hash.
///
/// `capacity` is a soft ceiling: once reached, new positions are dropped
/// until a sweep frees room, while existing keys can still be refreshed.
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<u64, TTEntry>,
    capacity: usize,
}

impl TranspositionTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(1 << 20)),
            capacity,
        }
    }

    pub fn probe(&self, key: u64, marks: usize) -> Option<TTEntry> {
        self.entries
            .get(&key)
            .filter(|entry| entry.marks == marks)
            .copied()
    }

    pub fn store(&mut self, key: u64, entry: TTEntry) {
        let full = self.capacity > 0 && self.entries.len() >= self.capacity;
        match self.entries.entry(key) {
            Entry::Occupied(mut slot) => {
                let stored = slot.get_mut();
                // Different mark count means a collision: the newcomer wins.
                if stored.marks != entry.marks || entry.depth >= stored.depth {
                    *stored = entry;
                }
            }
            Entry::Vacant(slot) => {
                if !full {
                    slot.insert(entry);
                }
            }
        }
    }

    /// Drops entries no future search can reach from the committed line:
    /// positions on the line itself and anything with fewer marks than the
    /// committed root. Stops removing as soon as `cancel` is raised.
    /// Returns the number of entries removed.
    pub fn sweep(&mut self, path: &[u64], root_marks: usize, cancel: &AtomicBool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            if cancel.load(Ordering::Relaxed) {
                return true;
            }
            entry.marks >= root_marks && !path.contains(key)
        });
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(depth: u32, score: i32, marks: usize) -> TTEntry {
        TTEntry {
            depth,
            score,
            flag: TTFlag::Exact,
            marks,
        }
    }

    #[test]
    fn test_probe_requires_matching_marks() {
        let mut tt = TranspositionTable::new(16);
        tt.store(42, entry(3, 10, 5));
        assert_eq!(tt.probe(42, 5), Some(entry(3, 10, 5)));
        assert_eq!(tt.probe(42, 6), None);
        assert_eq!(tt.probe(7, 5), None);
    }

    #[test]
    fn test_deeper_or_equal_replaces() {
        let mut tt = TranspositionTable::new(16);
        tt.store(1, entry(4, 10, 2));
        tt.store(1, entry(2, 99, 2));
        assert_eq!(tt.probe(1, 2).map(|e| e.score), Some(10));
        tt.store(1, entry(4, 20, 2));
        assert_eq!(tt.probe(1, 2).map(|e| e.score), Some(20));
        // Collision with another mark count always replaces.
        tt.store(1, entry(1, 30, 3));
        assert_eq!(tt.probe(1, 3).map(|e| e.score), Some(30));
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn test_capacity_is_soft_ceiling() {
        let mut tt = TranspositionTable::new(2);
        tt.store(1, entry(1, 1, 1));
        tt.store(2, entry(1, 2, 1));
        tt.store(3, entry(1, 3, 1));
        assert_eq!(tt.len(), 2);
        assert_eq!(tt.probe(3, 1), None);
        tt.store(2, entry(2, 5, 1));
        assert_eq!(tt.probe(2, 1).map(|e| e.score), Some(5));
    }

    #[test]
    fn test_sweep_removes_unreachable_entries() {
        let mut tt = TranspositionTable::new(64);
        tt.store(10, entry(1, 0, 1));
        tt.store(11, entry(1, 0, 2));
        tt.store(12, entry(1, 0, 3));
        tt.store(13, entry(1, 0, 4));
        tt.store(14, entry(1, 0, 4));

        let cancel = AtomicBool::new(false);
        let removed = tt.sweep(&[0, 13], 3, &cancel);
        assert_eq!(removed, 3);
        assert!(tt.probe(12, 3).is_some());
        assert!(tt.probe(14, 4).is_some());
        assert!(tt.probe(13, 4).is_none());
    }

    #[test]
    fn test_cancelled_sweep_keeps_everything() {
        let mut tt = TranspositionTable::new(64);
        for key in 0..10 {
            tt.store(key, entry(1, 0, 1));
        }
        let cancel = AtomicBool::new(true);
        assert_eq!(tt.sweep(&[], 5, &cancel), 0);
        assert_eq!(tt.len(), 10);
    }
}
