//! Frame-synchronized constant buffer heap
//!
//! Volatile allocations are bump-allocated out of upload pages that are
//! recycled once the GPU has retired every frame that wrote into them.
//! Requests up to one page go through the standard ring; bigger ones get
//! their own ring of exactly sized large pages, trimmed back to a soft cap
//! as frames retire.
//!
//! Recycling is lazy: a page is only rewound when an allocation visits it.
//! All pool state sits behind one mutex; persistent allocations bypass it.

use crate::align::snap_upward;
use crate::buffer::{PersistentConstBuffer, VolatileConstBuffer};
use crate::config::HeapConfig;
use crate::device::{OwnedResource, UploadDevice};
use crate::error::HeapError;
use crate::frame::{FrameListener, FrameTracker};
use crate::pool::{Page, PageRing};
use crate::stats::HeapStats;
use bytemuck::Pod;
use cbheap_metrics::{CounterKind, Counters, FrameHistory};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Completed host frames kept for the per-frame usage history.
const HISTORY_FRAMES: usize = 120;

struct HeapState {
    pages: PageRing,
    large_pages: PageRing,
    frames: FrameTracker,
    frame_bytes: u64,
    history: FrameHistory,
}

pub struct ConstantBufferHeap {
    device: Arc<dyn UploadDevice>,
    config: HeapConfig,
    state: Mutex<HeapState>,
    counters: Counters,
}

impl ConstantBufferHeap {
    /// Create a heap with one standard page ready for the first frame.
    pub fn new(device: Arc<dyn UploadDevice>, config: HeapConfig) -> Result<Self, HeapError> {
        config.validate()?;

        let frames = FrameTracker::new(config.frame_counter_mode);
        let first = OwnedResource::create(&device, config.page_size)?;
        let mut pages = PageRing::new();
        pages.push_front(Page::new(first, frames.current_frame()));

        tracing::info!(
            page_size = config.page_size,
            alignment = config.alignment,
            max_permanent_large_pages = config.max_permanent_large_pages,
            mode = ?config.frame_counter_mode,
            "constant buffer heap created"
        );

        let counters = Counters::new();
        counters.increment(CounterKind::PagesCreated, 1);

        Ok(Self {
            device,
            config,
            state: Mutex::new(HeapState {
                pages,
                large_pages: PageRing::new(),
                frames,
                frame_bytes: 0,
                history: FrameHistory::new(HISTORY_FRAMES),
            }),
            counters,
        })
    }

    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    fn lock_state(&self) -> MutexGuard<'_, HeapState> {
        // Pool state stays structurally valid if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy `data` into upload memory valid for the current frame.
    pub fn allocate_volatile(&self, data: &[u8]) -> Result<VolatileConstBuffer, HeapError> {
        // Zero-byte requests still get a distinct slot.
        let target = snap_upward(data.len().max(1), self.config.alignment);

        let mut guard = self.lock_state();
        let state = &mut *guard;
        let frame = state.frames.current_frame();

        let page = self.select_page(state, target)?;
        let offset = page
            .bump(target, frame)
            .expect("selected page has room for the request");
        page.write(offset, data);
        let buffer =
            VolatileConstBuffer::new(page.handle(), page.gpu_address_at(offset), data.len(), target);

        state.frame_bytes += target as u64;
        self.counters.increment(CounterKind::VolatileAllocations, 1);
        self.counters.increment(CounterKind::VolatileBytes, target as u64);

        tracing::trace!(
            frame,
            size = data.len(),
            reserved = target,
            gpu = ?buffer.gpu_address(),
            "volatile constant buffer"
        );
        Ok(buffer)
    }

    /// Upload a plain-old-data value as a volatile constant buffer.
    pub fn allocate_volatile_pod<T: Pod>(&self, value: &T) -> Result<VolatileConstBuffer, HeapError> {
        self.allocate_volatile(bytemuck::bytes_of(value))
    }

    /// Copy `data` into a dedicated resource owned by the returned buffer.
    pub fn allocate_persistent(&self, data: &[u8]) -> Result<PersistentConstBuffer, HeapError> {
        let resource = OwnedResource::create(&self.device, data.len().max(1))?;
        resource.scoped_mapping().write(data);

        self.counters.increment(CounterKind::PersistentAllocations, 1);
        tracing::debug!(
            size = data.len(),
            resource = resource.handle().id(),
            "persistent constant buffer"
        );
        Ok(PersistentConstBuffer::new(resource, data.len()))
    }

    pub fn allocate_persistent_pod<T: Pod>(&self, value: &T) -> Result<PersistentConstBuffer, HeapError> {
        self.allocate_persistent(bytemuck::bytes_of(value))
    }

    /// Pick the page the next `size` bytes come from, creating one if needed.
    fn select_page<'s>(&self, state: &'s mut HeapState, size: usize) -> Result<&'s mut Page, HeapError> {
        let frames = &state.frames;
        let head_fits = match state.pages.front_mut() {
            Some(head) => {
                head.mark_empty_if_recycled(frames);
                head.fits(size)
            }
            None => false,
        };

        if head_fits {
            Ok(state.pages.front_mut().expect("standard ring is never empty"))
        } else if size > self.config.page_size {
            self.select_large_page(state, size)
        } else {
            self.next_standard_page(state)
        }
    }

    fn next_standard_page<'s>(&self, state: &'s mut HeapState) -> Result<&'s mut Page, HeapError> {
        state.pages.rotate_front();

        let frames = &state.frames;
        let recycled = state
            .pages
            .front_mut()
            .is_some_and(|page| page.mark_empty_if_recycled(frames));

        if recycled {
            self.counters.increment(CounterKind::PagesRecycled, 1);
        } else {
            let page = self.create_page(self.config.page_size, frames.current_frame())?;
            state.pages.push_front(page);
            self.counters.increment(CounterKind::PagesCreated, 1);
            tracing::debug!(
                pages = state.pages.len(),
                frame = state.frames.current_frame(),
                "standard ring grew"
            );
        }

        Ok(state.pages.front_mut().expect("standard ring is never empty"))
    }

    fn select_large_page<'s>(&self, state: &'s mut HeapState, size: usize) -> Result<&'s mut Page, HeapError> {
        let frames = &state.frames;
        let found = state.large_pages.find_rotating(|page| {
            page.mark_empty_if_recycled(frames);
            page.fits(size)
        });

        if found {
            self.counters.increment(CounterKind::PagesRecycled, 1);
        } else {
            let page = self.create_page(size, frames.current_frame())?;
            state.large_pages.push_front(page);
            self.counters.increment(CounterKind::LargePagesCreated, 1);
            tracing::debug!(
                size,
                large_pages = state.large_pages.len(),
                frame = state.frames.current_frame(),
                "large page created"
            );
        }

        Ok(state.large_pages.front_mut().expect("large ring holds the selected page"))
    }

    fn create_page(&self, fitting_size: usize, frame: u64) -> Result<Page, HeapError> {
        let size = snap_upward(fitting_size, self.config.alignment);
        let resource = OwnedResource::create(&self.device, size)?;
        Ok(Page::new(resource, frame))
    }

    pub fn stats(&self) -> HeapStats {
        let state = self.lock_state();
        HeapStats {
            current_frame: state.frames.current_frame(),
            last_finished_frame: state.frames.last_finished_frame(),
            standard_pages: state.pages.len(),
            large_pages: state.large_pages.len(),
            standard_bytes: state.pages.reserved_bytes(),
            large_bytes: state.large_pages.reserved_bytes(),
            frame_bytes_average: state.history.average(),
            frame_bytes_peak: state.history.peak(),
            counters: self.counters.iter().map(|(kind, v)| (kind.name(), v)).collect(),
        }
    }
}

impl FrameListener for ConstantBufferHeap {
    fn on_frame_begin_host(&self, frame_id: u64) {
        let state = self.lock_state();
        if let Some(limit) = self.config.page_growth_warning {
            if state.pages.len() > limit {
                tracing::warn!(
                    frame = frame_id,
                    pages = state.pages.len(),
                    limit,
                    bytes = state.pages.reserved_bytes(),
                    "standard constant buffer ring is over budget"
                );
            }
        }
    }

    fn on_frame_complete_host(&self, frame_id: u64) {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        state.frames.complete_host(frame_id);
        cbheap_metrics::metrics! {
            state.history.push(state.frame_bytes);
        }
        state.frame_bytes = 0;
    }

    fn on_frame_begin_device(&self, frame_id: u64) {
        tracing::trace!(frame = frame_id, "device frame begin");
    }

    fn on_frame_complete_device(&self, frame_id: u64) {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        state.frames.complete_device(frame_id);

        let cap = self.config.max_permanent_large_pages;
        while state.large_pages.len() > cap {
            let Some(victim) = state.large_pages.evict_first_reclaimable(&state.frames) else {
                break;
            };
            self.counters.increment(CounterKind::LargePagesEvicted, 1);
            tracing::debug!(
                size = victim.capacity(),
                owner_frame = victim.owner_frame(),
                remaining = state.large_pages.len(),
                "large page evicted"
            );
        }
    }
}

impl Drop for ConstantBufferHeap {
    fn drop(&mut self) {
        let state = self.lock_state();
        tracing::debug!(
            standard_pages = state.pages.len(),
            large_pages = state.large_pages.len(),
            frames_in_flight = state.frames.frames_in_flight(),
            "constant buffer heap released"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameCounterMode;
    use crate::device::GpuAddress;
    use crate::error::DeviceError;
    use crate::host::HostDevice;

    const PAGE: usize = 1024;
    const ALIGN: usize = 256;

    fn small_config() -> HeapConfig {
        HeapConfig {
            page_size: PAGE,
            alignment: ALIGN,
            max_permanent_large_pages: 2,
            ..HeapConfig::default()
        }
    }

    fn heap_with(config: HeapConfig) -> (Arc<HostDevice>, ConstantBufferHeap) {
        let device = Arc::new(HostDevice::new());
        let heap = ConstantBufferHeap::new(device.clone(), config).unwrap();
        (device, heap)
    }

    fn pattern(len: usize, seed: u8) -> Vec<u8> {
        (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
    }

    fn read_back(device: &HostDevice, buffer: &VolatileConstBuffer) -> Vec<u8> {
        device
            .read_gpu(buffer.gpu_address(), buffer.size())
            .expect("buffer lies in a live resource")
    }

    fn end_host_frame(heap: &ConstantBufferHeap, frame: u64) {
        heap.on_frame_complete_host(frame);
    }

    fn retire_device_frame(heap: &ConstantBufferHeap, frame: u64) {
        heap.on_frame_begin_device(frame);
        heap.on_frame_complete_device(frame);
    }

    #[test]
    fn test_volatile_round_trip_sizes() {
        let (device, heap) = heap_with(small_config());
        for (i, &len) in [0, 1, ALIGN - 1, ALIGN, PAGE - 1, PAGE, PAGE + 1].iter().enumerate() {
            let data = pattern(len, i as u8);
            let buffer = heap.allocate_volatile(&data).unwrap();
            assert_eq!(buffer.size(), len);
            assert_eq!(buffer.reserved_size(), snap_upward(len.max(1), ALIGN));
            assert_eq!(buffer.gpu_address().raw() % ALIGN as u64, 0);
            assert_eq!(read_back(&device, &buffer), data, "len {len}");
        }
        let stats = heap.stats();
        assert_eq!(stats.large_pages, 1, "only PAGE + 1 is oversized");
    }

    #[test]
    fn test_exact_page_size_stays_in_standard_ring() {
        let (_device, heap) = heap_with(small_config());
        heap.allocate_volatile(&[1; PAGE]).unwrap();
        let stats = heap.stats();
        assert_eq!(stats.standard_pages, 1);
        assert_eq!(stats.large_pages, 0);

        heap.allocate_volatile(&[1; PAGE + 1]).unwrap();
        assert_eq!(heap.stats().large_pages, 1);
    }

    #[test]
    fn test_zero_byte_requests_get_distinct_slots() {
        let (_device, heap) = heap_with(small_config());
        let a = heap.allocate_volatile(&[]).unwrap();
        let b = heap.allocate_volatile(&[]).unwrap();
        assert_eq!(a.size(), 0);
        assert_eq!(a.reserved_size(), ALIGN);
        assert_ne!(a.gpu_address(), b.gpu_address());
    }

    #[test]
    fn test_consumed_never_exceeds_capacity() {
        let (_device, heap) = heap_with(small_config());
        for i in 0..200usize {
            let len = (i * 97) % (PAGE + 300);
            heap.allocate_volatile(&pattern(len, i as u8)).unwrap();
        }
        let state = heap.lock_state();
        for page in state.pages.iter().chain(state.large_pages.iter()) {
            assert!(page.consumed() <= page.capacity());
        }
    }

    #[test]
    fn test_in_flight_page_is_never_overwritten() {
        let (device, heap) = heap_with(small_config());
        let original = pattern(100, 0xAB);
        let first = heap.allocate_volatile(&original).unwrap();

        // Host runs ahead five frames; the GPU never reports back.
        for frame in 0..5 {
            end_host_frame(&heap, frame);
        }
        for i in 0..20 {
            heap.allocate_volatile(&pattern(512, i)).unwrap();
        }

        assert_eq!(read_back(&device, &first), original);
        assert!(device.is_live(first.resource()));
        assert!(heap.stats().standard_pages > 1, "fresh pages were created instead");
    }

    #[test]
    fn test_retired_head_page_is_rewound() {
        let (_device, heap) = heap_with(small_config());
        let first = heap.allocate_volatile(&[1; 200]).unwrap();
        for _ in 0..3 {
            heap.allocate_volatile(&[2; 200]).unwrap();
        }
        assert_eq!(heap.lock_state().pages.front().unwrap().consumed(), PAGE);

        end_host_frame(&heap, 0);
        retire_device_frame(&heap, 0);

        let again = heap.allocate_volatile(&[3; 200]).unwrap();
        assert_eq!(again.resource(), first.resource());
        assert_eq!(again.gpu_address(), first.gpu_address());
        let state = heap.lock_state();
        assert_eq!(state.pages.len(), 1);
        assert_eq!(state.pages.front().unwrap().consumed(), ALIGN);
        assert_eq!(state.pages.front().unwrap().owner_frame(), 1);
    }

    #[test]
    fn test_standard_ring_recycles_instead_of_growing() {
        let (_device, heap) = heap_with(small_config());
        let first = heap.allocate_volatile(&[0; ALIGN]).unwrap();
        for _ in 0..4 {
            heap.allocate_volatile(&[0; ALIGN]).unwrap();
        }
        assert_eq!(heap.stats().standard_pages, 2);

        end_host_frame(&heap, 0);
        retire_device_frame(&heap, 0);

        // Frame 1 fills the head page, then rotates onto the retired one.
        let mut last = None;
        for _ in 0..5 {
            last = Some(heap.allocate_volatile(&[1; ALIGN]).unwrap());
        }
        assert_eq!(heap.stats().standard_pages, 2);
        assert_eq!(last.unwrap().resource(), first.resource());
    }

    #[test]
    fn test_large_ring_reuses_space_before_creating() {
        let (device, heap) = heap_with(small_config());
        let big = heap.allocate_volatile(&[7; 3000]).unwrap();
        assert_eq!(big.reserved_size(), 3072);
        end_host_frame(&heap, 0);
        retire_device_frame(&heap, 0);

        let a = heap.allocate_volatile(&[1; 1100]).unwrap();
        let b = heap.allocate_volatile(&[2; 1100]).unwrap();
        assert_eq!(a.resource(), big.resource());
        assert_eq!(b.resource(), big.resource());
        assert_eq!(heap.stats().large_pages, 1);

        // 512 bytes left in the large page: the next one needs a new page.
        let c = heap.allocate_volatile(&[3; 1100]).unwrap();
        assert_ne!(c.resource(), big.resource());
        assert_eq!(heap.stats().large_pages, 2);
        assert_eq!(read_back(&device, &a), vec![1; 1100]);
        assert_eq!(read_back(&device, &c), vec![3; 1100]);
    }

    #[test]
    fn test_large_pages_evicted_down_to_cap() {
        let (device, heap) = heap_with(small_config());
        for i in 0..5 {
            heap.allocate_volatile(&[i; 1500]).unwrap();
        }
        assert_eq!(heap.stats().large_pages, 5);
        end_host_frame(&heap, 0);
        assert_eq!(heap.stats().large_pages, 5);

        retire_device_frame(&heap, 0);
        assert_eq!(heap.stats().large_pages, 2);
        // 1 standard page + 2 surviving large pages.
        assert_eq!(device.stats().live, 3);
        assert_eq!(device.stats().double_releases, 0);
    }

    #[test]
    fn test_in_flight_large_pages_survive_eviction() {
        let (_device, heap) = heap_with(small_config());
        for i in 0..3 {
            heap.allocate_volatile(&[i; 1500]).unwrap();
        }
        end_host_frame(&heap, 0);
        for i in 0..3 {
            heap.allocate_volatile(&[i; 1500]).unwrap();
        }
        end_host_frame(&heap, 1);
        assert_eq!(heap.stats().large_pages, 6);

        // Only frame 0's pages may go; frame 1's stay even over the cap.
        retire_device_frame(&heap, 0);
        assert_eq!(heap.stats().large_pages, 3);
        assert!(heap
            .lock_state()
            .large_pages
            .iter()
            .all(|page| page.owner_frame() == 1));

        retire_device_frame(&heap, 1);
        assert_eq!(heap.stats().large_pages, 2);
    }

    #[test]
    fn test_large_ring_bounded_after_quiet_frames() {
        let (_device, heap) = heap_with(small_config());
        for frame in 0..4u64 {
            for i in 0..4 {
                heap.allocate_volatile(&[i; PAGE * 2]).unwrap();
            }
            end_host_frame(&heap, frame);
            if frame >= 1 {
                retire_device_frame(&heap, frame - 1);
            }
        }
        // Frames without oversized uploads let the ring settle.
        for frame in 4..8u64 {
            heap.allocate_volatile(&[0; 64]).unwrap();
            end_host_frame(&heap, frame);
            retire_device_frame(&heap, frame - 1);
        }
        assert!(heap.stats().large_pages <= 2);
    }

    #[test]
    fn test_persistent_buffer_owns_its_resource() {
        let (device, heap) = heap_with(small_config());
        let before = device.stats();

        let data = pattern(300, 5);
        let buffer = heap.allocate_persistent(&data).unwrap();
        assert_eq!(buffer.size(), 300);
        assert_eq!(buffer.reserved_size(), 300);
        assert!(!device.is_mapped(buffer.resource()), "mapping closed after upload");
        assert_eq!(device.read_gpu(buffer.gpu_address(), 300), Some(data));
        assert_eq!(device.stats().created, before.created + 1);

        let handle = buffer.resource();
        drop(buffer);
        let after = device.stats();
        assert!(!device.is_live(handle));
        assert_eq!(after.released, before.released + 1);
        assert_eq!(after.double_releases, 0);
        assert_eq!(after.live, before.live);
    }

    #[test]
    fn test_persistent_pod_and_zero_size() {
        #[repr(C)]
        #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
        struct Light {
            color: [f32; 4],
            intensity: f32,
            _pad: [f32; 3],
        }

        let (device, heap) = heap_with(small_config());
        let light = Light {
            color: [1.0, 0.5, 0.25, 1.0],
            intensity: 3.0,
            _pad: [0.0; 3],
        };
        let buffer = heap.allocate_persistent_pod(&light).unwrap();
        assert_eq!(
            device.read_gpu(buffer.gpu_address(), buffer.size()),
            Some(bytemuck::bytes_of(&light).to_vec())
        );

        let empty = heap.allocate_persistent(&[]).unwrap();
        assert_eq!(empty.size(), 0);
        assert_eq!(empty.reserved_size(), 1);
    }

    #[test]
    fn test_device_failure_is_propagated() {
        let device = Arc::new(HostDevice::with_budget(PAGE * 2));
        let heap = ConstantBufferHeap::new(device.clone(), small_config()).unwrap();

        let kept = heap.allocate_volatile(&[9; PAGE]).unwrap();
        heap.allocate_volatile(&[8; PAGE]).unwrap();
        let err = heap.allocate_volatile(&[7; 16]).unwrap_err();
        assert!(matches!(
            err,
            HeapError::Device(DeviceError::OutOfMemory { requested: PAGE, .. })
        ));
        assert!(matches!(
            heap.allocate_volatile(&[7; PAGE * 3]),
            Err(HeapError::Device(_))
        ));
        assert!(matches!(heap.allocate_persistent(&[1; 8]), Err(HeapError::Device(_))));
        assert_eq!(read_back(&device, &kept), vec![9; PAGE]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let device = Arc::new(HostDevice::new());
        let config = HeapConfig {
            alignment: 100,
            ..HeapConfig::default()
        };
        assert!(matches!(
            ConstantBufferHeap::new(device.clone(), config),
            Err(HeapError::Config(_))
        ));
        assert_eq!(device.stats().created, 0);
    }

    #[test]
    fn test_authoritative_completion_retires_skipped_frames() {
        let config = HeapConfig {
            frame_counter_mode: FrameCounterMode::Authoritative,
            ..small_config()
        };
        let (_device, heap) = heap_with(config);
        heap.allocate_volatile(&[1; PAGE]).unwrap();
        for frame in 0..3 {
            end_host_frame(&heap, frame);
        }

        // Completions for frames 0 and 1 were never delivered.
        retire_device_frame(&heap, 2);
        assert_eq!(heap.stats().last_finished_frame, Some(2));
        heap.allocate_volatile(&[2; PAGE]).unwrap();
        assert_eq!(heap.stats().standard_pages, 1);
    }

    #[test]
    fn test_sequential_completion_counts_one_frame_per_notification() {
        let (_device, heap) = heap_with(small_config());
        for frame in 0..3 {
            heap.allocate_volatile(&[1; PAGE]).unwrap();
            end_host_frame(&heap, frame);
        }
        assert_eq!(heap.stats().standard_pages, 3);

        retire_device_frame(&heap, 2);
        assert_eq!(heap.stats().last_finished_frame, Some(0));
    }

    #[test]
    fn test_listener_hooks_through_trait_object() {
        let (_device, heap) = heap_with(small_config());
        let listeners: Vec<&dyn FrameListener> = vec![&heap];
        for frame in 0..3u64 {
            for listener in &listeners {
                listener.on_frame_begin_host(frame);
            }
            heap.allocate_volatile(&[0; 64]).unwrap();
            for listener in &listeners {
                listener.on_frame_complete_host(frame);
                listener.on_frame_begin_device(frame);
                listener.on_frame_complete_device(frame);
            }
        }
        let stats = heap.stats();
        assert_eq!(stats.current_frame, 3);
        assert_eq!(stats.last_finished_frame, Some(2));
        assert_eq!(stats.standard_pages, 1);
    }

    #[test]
    fn test_concurrent_allocations_are_disjoint() {
        let (device, heap) = heap_with(small_config());
        let threads = 8u8;
        let per_thread = 100usize;

        let mut all: Vec<(VolatileConstBuffer, Vec<u8>)> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|t| {
                    let heap = &heap;
                    s.spawn(move || {
                        (0..per_thread)
                            .map(|i| {
                                let len = if i % 25 == 0 { 1500 } else { 16 + (i * 37) % 600 };
                                let data = pattern(len, t.wrapping_mul(17).wrapping_add(i as u8));
                                (heap.allocate_volatile(&data).unwrap(), data)
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(all.len(), threads as usize * per_thread);
        for (buffer, data) in &all {
            assert_eq!(&read_back(&device, buffer), data);
        }

        all.sort_by_key(|(buffer, _)| buffer.gpu_address());
        for pair in all.windows(2) {
            let (a, b) = (&pair[0].0, &pair[1].0);
            let end: GpuAddress = a.gpu_address().offset(a.reserved_size());
            assert!(end <= b.gpu_address(), "{a:?} overlaps {b:?}");
        }
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_counters_track_page_activity() {
        let (_device, heap) = heap_with(small_config());
        for _ in 0..5 {
            heap.allocate_volatile(&[0; ALIGN]).unwrap();
        }
        heap.allocate_volatile(&[0; PAGE * 2]).unwrap();
        heap.allocate_persistent(&[0; 4]).unwrap();
        end_host_frame(&heap, 0);

        let stats = heap.stats();
        assert_eq!(stats.counter("volatile_allocations"), 6);
        assert_eq!(stats.counter("pages_created"), 2);
        assert_eq!(stats.counter("large_pages_created"), 1);
        assert_eq!(stats.counter("persistent_allocations"), 1);
        assert_eq!(stats.frame_bytes_peak, (5 * ALIGN + PAGE * 2) as u64);
    }
}
