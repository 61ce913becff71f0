/// Point-in-time view of a `ConstantBufferHeap`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeapStats {
    pub current_frame: u64,
    pub last_finished_frame: Option<u64>,
    pub standard_pages: usize,
    pub large_pages: usize,
    pub standard_bytes: usize,
    pub large_bytes: usize,
    /// Average aligned bytes allocated per completed host frame (metrics builds only).
    pub frame_bytes_average: u64,
    /// Peak aligned bytes allocated in one host frame (metrics builds only).
    pub frame_bytes_peak: u64,
    /// Event counters (metrics builds only).
    pub counters: Vec<(&'static str, u64)>,
}

impl HeapStats {
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .iter()
            .find(|(n, _)| *n == name)
            .map_or(0, |&(_, v)| v)
    }

    pub fn reserved_bytes(&self) -> usize {
        self.standard_bytes + self.large_bytes
    }
}
