//! Host-memory upload device
//!
//! Stands in for a graphics API: resources are aligned heap blocks and GPU
//! addresses come from a synthetic, monotonically growing virtual address
//! space. Used by tests and by the runtime's simulated frame loop.

use crate::align::snap_upward;
use crate::device::{GpuAddress, MappedAllocation, ResourceHandle, UploadDevice};
use crate::error::DeviceError;
use std::alloc::{self, Layout};
use std::collections::{BTreeMap, HashMap};
use std::ptr::NonNull;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Base of the synthetic GPU virtual address space.
const GPU_VA_BASE: u64 = 0x1_0000_0000;
/// Placement granularity of resources in the synthetic address space.
const GPU_VA_GRANULARITY: usize = 64 * 1024;
/// Alignment of the CPU-side blocks.
const BLOCK_ALIGNMENT: usize = 256;

/// Resource bookkeeping snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
    pub created: u64,
    pub released: u64,
    pub double_releases: u64,
    pub live: usize,
    pub live_bytes: usize,
}

struct HostBlock {
    ptr: NonNull<u8>,
    layout: Layout,
    gpu: GpuAddress,
    size: usize,
    mapped: bool,
}

// SAFETY: the block is plain heap memory; access to the bookkeeping is
// guarded by the device mutex.
unsafe impl Send for HostBlock {}

impl HostBlock {
    fn free(self) {
        unsafe {
            // SAFETY: `ptr` was returned by `alloc_zeroed(layout)` and is freed once.
            alloc::dealloc(self.ptr.as_ptr(), self.layout);
        }
    }
}

struct HostState {
    next_id: u64,
    next_gpu: u64,
    blocks: HashMap<ResourceHandle, HostBlock>,
    by_gpu: BTreeMap<u64, ResourceHandle>,
    stats: HostStats,
}

pub struct HostDevice {
    budget: Option<usize>,
    state: Mutex<HostState>,
}

impl HostDevice {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Device that refuses allocations once `bytes` are live.
    pub fn with_budget(bytes: usize) -> Self {
        Self::build(Some(bytes))
    }

    fn build(budget: Option<usize>) -> Self {
        Self {
            budget,
            state: Mutex::new(HostState {
                next_id: 1,
                next_gpu: GPU_VA_BASE,
                blocks: HashMap::new(),
                by_gpu: BTreeMap::new(),
                stats: HostStats::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn stats(&self) -> HostStats {
        self.lock().stats
    }

    pub fn is_mapped(&self, handle: ResourceHandle) -> bool {
        self.lock().blocks.get(&handle).is_some_and(|b| b.mapped)
    }

    pub fn is_live(&self, handle: ResourceHandle) -> bool {
        self.lock().blocks.contains_key(&handle)
    }

    /// Bytes the GPU would fetch from `address`, or `None` if the range is
    /// not inside a live resource.
    pub fn read_gpu(&self, address: GpuAddress, len: usize) -> Option<Vec<u8>> {
        let state = self.lock();
        let (&base, handle) = state.by_gpu.range(..=address.raw()).next_back()?;
        let block = state.blocks.get(handle)?;
        let offset = (address.raw() - base) as usize;
        if offset.checked_add(len)? > block.size {
            return None;
        }
        let mut out = vec![0u8; len];
        unsafe {
            // SAFETY: range checked against the block size; only these bytes are touched.
            std::ptr::copy_nonoverlapping(block.ptr.as_ptr().add(offset), out.as_mut_ptr(), len);
        }
        Some(out)
    }
}

impl Default for HostDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadDevice for HostDevice {
    fn create_mappable_resource(&self, size: usize) -> Result<MappedAllocation, DeviceError> {
        let mut state = self.lock();
        if let Some(budget) = self.budget {
            let available = budget.saturating_sub(state.stats.live_bytes);
            if size > available {
                return Err(DeviceError::OutOfMemory {
                    requested: size,
                    available,
                });
            }
        }

        let layout = Layout::from_size_align(size.max(1), BLOCK_ALIGNMENT).map_err(|e| {
            DeviceError::Rejected {
                size,
                reason: e.to_string(),
            }
        })?;
        let ptr = NonNull::new(unsafe {
            // SAFETY: layout size is non-zero.
            alloc::alloc_zeroed(layout)
        })
        .ok_or(DeviceError::OutOfMemory {
            requested: size,
            available: 0,
        })?;

        let handle = ResourceHandle::from_raw(state.next_id);
        state.next_id += 1;
        let gpu = GpuAddress::new(state.next_gpu);
        state.next_gpu += snap_upward(size.max(1), GPU_VA_GRANULARITY) as u64;

        state.blocks.insert(
            handle,
            HostBlock {
                ptr,
                layout,
                gpu,
                size,
                mapped: true,
            },
        );
        state.by_gpu.insert(gpu.raw(), handle);
        state.stats.created += 1;
        state.stats.live += 1;
        state.stats.live_bytes += size;

        Ok(MappedAllocation {
            handle,
            cpu: ptr,
            gpu,
            size,
        })
    }

    fn release_resource(&self, handle: ResourceHandle) {
        let mut state = self.lock();
        match state.blocks.remove(&handle) {
            Some(block) => {
                state.by_gpu.remove(&block.gpu.raw());
                state.stats.released += 1;
                state.stats.live -= 1;
                state.stats.live_bytes -= block.size;
                block.free();
            }
            None => {
                state.stats.double_releases += 1;
                tracing::error!(resource = handle.id(), "release of unknown or already released resource");
            }
        }
    }

    fn unmap_resource(&self, handle: ResourceHandle) {
        if let Some(block) = self.lock().blocks.get_mut(&handle) {
            block.mapped = false;
        }
    }
}

impl Drop for HostDevice {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if !state.blocks.is_empty() {
            tracing::warn!(leaked = state.blocks.len(), "host device dropped with live resources");
        }
        for (_, block) in state.blocks.drain() {
            block.free();
        }
    }
}
