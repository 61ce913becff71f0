use thiserror::Error;

/// Failures reported by the resource-creation service.
///
/// The heap treats every one of these as fatal for the request: there is
/// no fallback memory source and no retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("out of upload memory: requested {requested} bytes, {available} available")]
    OutOfMemory { requested: usize, available: usize },

    #[error("device rejected a {size} byte resource: {reason}")]
    Rejected { size: usize, reason: String },
}

/// Invalid heap configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("alignment {0} is not a power of two")]
    AlignmentNotPowerOfTwo(usize),

    #[error("page size must be non-zero")]
    ZeroPageSize,

    #[error("page size {page_size} is not a multiple of the alignment {alignment}")]
    UnalignedPageSize { page_size: usize, alignment: usize },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by `ConstantBufferHeap`.
#[derive(Debug, Error)]
pub enum HeapError {
    #[error("resource creation failed: {0}")]
    Device(#[from] DeviceError),

    #[error("invalid heap configuration: {0}")]
    Config(#[from] ConfigError),
}
