//! Numeric conversion helpers used across the project.
//!
//! Party sizes and path indices are `usize`, while positions and depths are
//! `f32`. These helpers keep the casts in one place and flag unexpected
//! magnitudes with debug assertions.

/// Largest integer that `f32` represents exactly.
const F32_EXACT_LIMIT: usize = 1 << f32::MANTISSA_DIGITS;

/// Convert a small count or index into `f32`.
#[expect(
    clippy::cast_precision_loss,
    reason = "Party sizes and sort positions stay far below 2^24."
)]
#[must_use]
pub fn count_to_f32(value: usize) -> f32 {
    debug_assert!(
        value <= F32_EXACT_LIMIT,
        "count {value} is not exactly representable as f32"
    );
    value as f32
}

/// Convert a millisecond setting into a [`std::time::Duration`].
#[must_use]
pub const fn millis(value: u64) -> std::time::Duration {
    std::time::Duration::from_millis(value)
}
