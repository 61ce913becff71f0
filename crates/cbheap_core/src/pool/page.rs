use crate::device::{GpuAddress, OwnedResource, ResourceHandle};
use crate::frame::FrameTracker;

/// One upload resource consumed front to back.
///
/// Allocations only ever append; the whole page is rewound at once when
/// the GPU has retired the last frame that wrote into it.
#[derive(Debug)]
pub struct Page {
    resource: OwnedResource,
    consumed: usize,
    owner_frame: u64,
}

impl Page {
    pub fn new(resource: OwnedResource, owner_frame: u64) -> Self {
        Self {
            resource,
            consumed: 0,
            owner_frame,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.resource.size()
    }

    #[inline]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.consumed
    }

    #[inline]
    pub fn owner_frame(&self) -> u64 {
        self.owner_frame
    }

    #[inline]
    pub fn handle(&self) -> ResourceHandle {
        self.resource.handle()
    }

    #[inline]
    pub fn fits(&self, size: usize) -> bool {
        size <= self.remaining()
    }

    #[inline]
    pub fn is_reclaimable(&self, frames: &FrameTracker) -> bool {
        frames.is_reclaimable(self.owner_frame)
    }

    /// Rewind the page if the GPU is done with it. Returns whether it was reset.
    pub fn mark_empty_if_recycled(&mut self, frames: &FrameTracker) -> bool {
        if self.is_reclaimable(frames) {
            self.consumed = 0;
            true
        } else {
            false
        }
    }

    /// Reserve `size` bytes for `frame`, returning their offset.
    pub fn bump(&mut self, size: usize, frame: u64) -> Option<usize> {
        if !self.fits(size) {
            return None;
        }
        let offset = self.consumed;
        self.consumed += size;
        self.owner_frame = frame;
        Some(offset)
    }

    /// Copy `data` into a range previously handed out by `bump`.
    pub fn write(&mut self, offset: usize, data: &[u8]) {
        assert!(
            offset + data.len() <= self.consumed,
            "write outside of the reserved range"
        );
        unsafe {
            // SAFETY: the range lies within bytes reserved by `bump`, which
            // are never handed out twice before the page is rewound, and we
            // hold the page mutably.
            self.resource.write(offset, data);
        }
    }

    #[inline]
    pub fn gpu_address_at(&self, offset: usize) -> GpuAddress {
        self.resource.gpu_address().offset(offset)
    }
}
