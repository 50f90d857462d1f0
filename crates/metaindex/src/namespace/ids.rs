//! Node id allocation.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::NodeId;

/// Hands out process-unique node ids from an atomic counter.
///
/// Ids start at 1. Allocation does not need the tree lock, so under
/// contention the id order may differ from tree insertion order.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused id.
    #[inline]
    pub fn allocate(&self) -> NodeId {
        NodeId::new(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn ids_start_at_one_and_increase() {
        let ids = IdAllocator::new();
        assert_eq!(ids.allocate(), NodeId::new(1));
        assert_eq!(ids.allocate(), NodeId::new(2));
    }

    #[test]
    fn concurrent_allocation_is_unique() {
        let ids = Arc::new(IdAllocator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = ids.clone();
                thread::spawn(move || (0..1000).map(|_| ids.allocate()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 8000);
        assert_eq!(ids.allocate(), NodeId::new(8001));
    }
}
