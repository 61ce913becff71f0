//! Resource-creation seam
//!
//! The heap never talks to a graphics API directly. It asks an
//! `UploadDevice` for CPU-mappable, GPU-readable linear resources and
//! hands them back when a page or persistent buffer dies.

use crate::error::DeviceError;
use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

/// Opaque id of a device resource.
///
/// Copying a handle never claims ownership; only `OwnedResource` releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(u64);

impl ResourceHandle {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// GPU virtual address inside an upload resource.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpuAddress(u64);

impl GpuAddress {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(&self) -> u64 {
        self.0
    }

    #[inline]
    pub fn offset(&self, bytes: usize) -> Self {
        Self(self.0 + bytes as u64)
    }
}

impl fmt::Debug for GpuAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GpuAddress({:#x})", self.0)
    }
}

/// A freshly created resource, mapped for CPU writes.
#[derive(Debug)]
pub struct MappedAllocation {
    pub handle: ResourceHandle,
    pub cpu: NonNull<u8>,
    pub gpu: GpuAddress,
    pub size: usize,
}

/// Resource-creation service backing the heap.
pub trait UploadDevice: Send + Sync {
    /// Allocate a CPU-visible, GPU-readable linear resource of `size` bytes,
    /// mapped for writing.
    fn create_mappable_resource(&self, size: usize) -> Result<MappedAllocation, DeviceError>;

    /// Destroy a resource. Called exactly once per created resource.
    fn release_resource(&self, handle: ResourceHandle);

    /// Close the CPU mapping of a resource that stays alive.
    fn unmap_resource(&self, _handle: ResourceHandle) {}
}

/// Sole owner of one device resource; releases it on drop.
pub struct OwnedResource {
    device: Arc<dyn UploadDevice>,
    allocation: MappedAllocation,
}

// SAFETY: the CPU pointer addresses device memory that lives until
// `release_resource`, which only this owner calls. Writes through it are
// serialized by whoever holds the `OwnedResource` mutably.
unsafe impl Send for OwnedResource {}
unsafe impl Sync for OwnedResource {}

impl OwnedResource {
    pub fn create(device: &Arc<dyn UploadDevice>, size: usize) -> Result<Self, DeviceError> {
        let allocation = device.create_mappable_resource(size)?;
        Ok(Self {
            device: Arc::clone(device),
            allocation,
        })
    }

    #[inline]
    pub fn handle(&self) -> ResourceHandle {
        self.allocation.handle
    }

    #[inline]
    pub fn gpu_address(&self) -> GpuAddress {
        self.allocation.gpu
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.allocation.size
    }

    /// Copy `data` into the mapped memory at `offset`.
    ///
    /// # Safety
    /// The resource must still be mapped and nothing else may be writing
    /// the range `offset..offset + data.len()`.
    pub(crate) unsafe fn write(&self, offset: usize, data: &[u8]) {
        debug_assert!(offset + data.len() <= self.allocation.size);
        std::ptr::copy_nonoverlapping(
            data.as_ptr(),
            self.allocation.cpu.as_ptr().add(offset),
            data.len(),
        );
    }

    /// Keep the mapping open for the duration of the returned guard.
    pub(crate) fn scoped_mapping(&self) -> ScopedMapping<'_> {
        ScopedMapping { resource: self }
    }
}

impl fmt::Debug for OwnedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedResource")
            .field("handle", &self.allocation.handle)
            .field("gpu", &self.allocation.gpu)
            .field("size", &self.allocation.size)
            .finish()
    }
}

impl Drop for OwnedResource {
    fn drop(&mut self) {
        self.device.release_resource(self.allocation.handle);
    }
}

/// Write access to a resource's mapping; unmaps when dropped.
pub(crate) struct ScopedMapping<'a> {
    resource: &'a OwnedResource,
}

impl ScopedMapping<'_> {
    pub(crate) fn write(&mut self, data: &[u8]) {
        assert!(data.len() <= self.resource.size());
        unsafe {
            // SAFETY: the guard exists only while the fresh resource is mapped
            // and exclusively held by the persistent allocation path.
            self.resource.write(0, data);
        }
    }
}

impl Drop for ScopedMapping<'_> {
    fn drop(&mut self) {
        self.resource.device.unmap_resource(self.resource.handle());
    }
}
