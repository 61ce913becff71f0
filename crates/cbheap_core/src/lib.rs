//! Constant Buffer Heap Core
//!
//! Frame-synchronized upload memory for a rendering pipeline:
//! - Volatile constant buffers recycled once the GPU retires their frame
//! - Persistent constant buffers with caller-owned lifetime
//! - Frame lifecycle tracking across host and device timelines
//! - A host-memory device for tests and simulation

pub mod align;
pub mod buffer;
pub mod config;
pub mod device;
pub mod error;
pub mod frame;
pub mod heap;
pub mod host;
pub mod pool;
pub mod stats;

pub use buffer::{PersistentConstBuffer, VolatileConstBuffer};
pub use config::{FrameCounterMode, HeapConfig};
pub use device::{GpuAddress, MappedAllocation, OwnedResource, ResourceHandle, UploadDevice};
pub use error::{ConfigError, DeviceError, HeapError};
pub use frame::{FrameListener, FrameTracker};
pub use heap::ConstantBufferHeap;
pub use host::{HostDevice, HostStats};
pub use stats::HeapStats;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
