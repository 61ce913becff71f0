//! Lock-free named counters for allocator events

use std::sync::atomic::{AtomicU64, Ordering};

/// Events tracked by the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    VolatileAllocations,
    VolatileBytes,
    PersistentAllocations,
    PagesCreated,
    LargePagesCreated,
    PagesRecycled,
    LargePagesEvicted,
}

impl CounterKind {
    pub const ALL: [CounterKind; 7] = [
        CounterKind::VolatileAllocations,
        CounterKind::VolatileBytes,
        CounterKind::PersistentAllocations,
        CounterKind::PagesCreated,
        CounterKind::LargePagesCreated,
        CounterKind::PagesRecycled,
        CounterKind::LargePagesEvicted,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CounterKind::VolatileAllocations => "volatile_allocations",
            CounterKind::VolatileBytes => "volatile_bytes",
            CounterKind::PersistentAllocations => "persistent_allocations",
            CounterKind::PagesCreated => "pages_created",
            CounterKind::LargePagesCreated => "large_pages_created",
            CounterKind::PagesRecycled => "pages_recycled",
            CounterKind::LargePagesEvicted => "large_pages_evicted",
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

/// Counters shared between threads.
///
/// Updates use relaxed ordering: values are statistics, not synchronization.
pub struct Counters {
    values: [AtomicU64; CounterKind::ALL.len()],
}

impl Counters {
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    #[inline]
    pub fn increment(&self, kind: CounterKind, value: u64) {
        self.values[kind.slot()].fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self, kind: CounterKind) -> u64 {
        self.values[kind.slot()].load(Ordering::Relaxed)
    }

    pub fn reset_all(&self) {
        for value in &self.values {
            value.store(0, Ordering::Relaxed);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CounterKind, u64)> + '_ {
        CounterKind::ALL.iter().map(move |&kind| (kind, self.get(kind)))
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}
