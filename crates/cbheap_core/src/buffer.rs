//! Constant buffer descriptors handed to the render pipeline

use crate::device::{GpuAddress, OwnedResource, ResourceHandle};

/// A per-frame constant buffer carved out of a heap page.
///
/// The descriptor only names the page's resource; the heap keeps owning
/// it. The data stays valid until the GPU retires the frame it was
/// allocated in, after which the page may be rewound and overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolatileConstBuffer {
    resource: ResourceHandle,
    gpu_address: GpuAddress,
    size: usize,
    reserved_size: usize,
}

impl VolatileConstBuffer {
    pub(crate) fn new(
        resource: ResourceHandle,
        gpu_address: GpuAddress,
        size: usize,
        reserved_size: usize,
    ) -> Self {
        Self {
            resource,
            gpu_address,
            size,
            reserved_size,
        }
    }

    #[inline]
    pub fn resource(&self) -> ResourceHandle {
        self.resource
    }

    #[inline]
    pub fn gpu_address(&self) -> GpuAddress {
        self.gpu_address
    }

    /// Bytes the caller uploaded.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Bytes reserved in the page (size rounded to the alignment grid).
    #[inline]
    pub fn reserved_size(&self) -> usize {
        self.reserved_size
    }
}

/// A constant buffer with its own dedicated resource.
///
/// Dropping it releases the resource; the heap never recycles it.
#[derive(Debug)]
pub struct PersistentConstBuffer {
    resource: OwnedResource,
    size: usize,
}

impl PersistentConstBuffer {
    pub(crate) fn new(resource: OwnedResource, size: usize) -> Self {
        Self { resource, size }
    }

    #[inline]
    pub fn resource(&self) -> ResourceHandle {
        self.resource.handle()
    }

    #[inline]
    pub fn gpu_address(&self) -> GpuAddress {
        self.resource.gpu_address()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Persistent resources are sized exactly to the request.
    #[inline]
    pub fn reserved_size(&self) -> usize {
        self.resource.size()
    }
}
