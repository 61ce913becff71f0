//! Frame lifecycle tracking
//!
//! Two counters decide when upload memory may be overwritten:
//! `current` is the frame the CPU is recording (advanced on host
//! completion) and `finished` is how many frames the GPU has retired
//! (advanced on device completion). A page stamped with frame `f` is
//! reclaimable once `f < finished`, i.e. `f <= last_finished_frame()`.

use crate::config::FrameCounterMode;

#[derive(Debug, Clone)]
pub struct FrameTracker {
    mode: FrameCounterMode,
    current: u64,
    finished: u64,
}

impl FrameTracker {
    pub fn new(mode: FrameCounterMode) -> Self {
        Self {
            mode,
            current: 0,
            finished: 0,
        }
    }

    /// Frame id stamped onto pages allocated from right now.
    #[inline]
    pub fn current_frame(&self) -> u64 {
        self.current
    }

    /// Most recent frame the GPU has finished, if any.
    #[inline]
    pub fn last_finished_frame(&self) -> Option<u64> {
        self.finished.checked_sub(1)
    }

    /// Number of frames recorded but not yet retired by the GPU.
    #[inline]
    pub fn frames_in_flight(&self) -> u64 {
        self.current - self.finished
    }

    #[inline]
    pub fn is_reclaimable(&self, owner_frame: u64) -> bool {
        owner_frame < self.finished
    }

    /// The CPU finished submitting `frame_id`.
    pub fn complete_host(&mut self, frame_id: u64) {
        if frame_id != self.current {
            tracing::warn!(
                expected = self.current,
                reported = frame_id,
                "host frame completion out of sequence"
            );
        }
        self.current += 1;
    }

    /// The GPU retired `frame_id`.
    ///
    /// # Panics
    /// If the device timeline would overtake the host timeline.
    pub fn complete_device(&mut self, frame_id: u64) {
        let next = match self.mode {
            FrameCounterMode::Sequential => {
                if frame_id != self.finished {
                    tracing::warn!(
                        expected = self.finished,
                        reported = frame_id,
                        "device frame completion out of sequence, counting it as the next frame"
                    );
                }
                self.finished + 1
            }
            FrameCounterMode::Authoritative => {
                if frame_id < self.finished {
                    tracing::warn!(
                        finished = self.finished,
                        reported = frame_id,
                        "stale device frame completion ignored"
                    );
                    return;
                }
                if frame_id > self.finished {
                    tracing::warn!(
                        skipped = frame_id - self.finished,
                        reported = frame_id,
                        "device frame completions skipped"
                    );
                }
                frame_id + 1
            }
        };

        assert!(
            next <= self.current,
            "device completed frame {} before the host submitted it (host is at frame {})",
            next - 1,
            self.current
        );
        self.finished = next;
    }
}

/// Receiver of the renderer's per-frame lifecycle notifications.
///
/// Within each timeline the hooks arrive once per frame, begin before
/// complete. Device completion for a frame always trails its host
/// completion.
pub trait FrameListener {
    fn on_frame_begin_host(&self, frame_id: u64);
    fn on_frame_complete_host(&self, frame_id: u64);
    fn on_frame_begin_device(&self, frame_id: u64);
    fn on_frame_complete_device(&self, frame_id: u64);
}
