//! Heap Metrics - allocation counters and per-frame usage history
//!
//! Provides zero-cost abstractions for metrics collection that completely
//! vanish in production builds via feature flags.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use cbheap_metrics::{CounterKind, Counters, FrameHistory};
//!
//! let counters = Counters::new();
//! counters.increment(CounterKind::PagesCreated, 1);
//!
//! let mut history = FrameHistory::new(60); // Track last 60 frames
//! history.push(4096);
//! println!("avg bytes/frame: {}", history.average());
//! ```
//!
//! In production builds (without `metrics` feature), all instrumentation
//! is compiled out to zero overhead.

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod history;

#[cfg(feature = "metrics")]
pub use counter::{CounterKind, Counters};
#[cfg(feature = "metrics")]
pub use history::FrameHistory;

/// Whether this build collects metrics.
pub const ENABLED: bool = cfg!(feature = "metrics");

// ============================================================================
// Macros for conditional compilation
// ============================================================================

/// Execute code only when metrics are enabled
#[macro_export]
macro_rules! metrics {
    ($($tt:tt)*) => {
        #[cfg(feature = "metrics")]
        {
            $($tt)*
        }
    };
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
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

#[cfg(not(feature = "metrics"))]
impl CounterKind {
    pub const ALL: [CounterKind; 0] = [];
    pub fn name(self) -> &'static str { "" }
}

#[cfg(not(feature = "metrics"))]
#[derive(Default)]
pub struct Counters;

#[cfg(not(feature = "metrics"))]
impl Counters {
    pub fn new() -> Self { Self }
    pub fn increment(&self, _kind: CounterKind, _value: u64) {}
    pub fn get(&self, _kind: CounterKind) -> u64 { 0 }
    pub fn reset_all(&self) {}
    pub fn iter(&self) -> impl Iterator<Item = (CounterKind, u64)> + '_ { std::iter::empty() }
}

#[cfg(not(feature = "metrics"))]
pub struct FrameHistory;

#[cfg(not(feature = "metrics"))]
impl FrameHistory {
    pub fn new(_capacity: usize) -> Self { Self }
    pub fn push(&mut self, _sample: u64) {}
    pub fn len(&self) -> usize { 0 }
    pub fn is_empty(&self) -> bool { true }
    pub fn average(&self) -> u64 { 0 }
    pub fn peak(&self) -> u64 { 0 }
    pub fn last(&self) -> Option<u64> { None }
}
