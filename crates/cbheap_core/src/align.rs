//! Grid alignment helpers

/// Round `value` up to the next multiple of `grid`.
///
/// `grid` must be a power of two; anything else is a programming error.
#[inline]
pub fn snap_upward(value: usize, grid: usize) -> usize {
    assert!(
        grid.is_power_of_two(),
        "alignment grid must be a power of two, got {grid}"
    );
    let mask = grid - 1;
    (value + mask) & !mask
}

#[inline]
pub fn is_aligned(value: usize, grid: usize) -> bool {
    debug_assert!(grid.is_power_of_two());
    value & (grid - 1) == 0
}
