//! Project progress bounds and clamping.
//!
//! Progress is a percentage. Every write path (API handler, client slider)
//! goes through [`clamp_progress`] so out-of-range input can never reach the
//! database, which carries a matching CHECK constraint as a last line of
//! defense.

/// Minimum progress value (percent).
pub const PROGRESS_MIN: i32 = 0;

/// Maximum progress value (percent).
pub const PROGRESS_MAX: i32 = 100;

/// Clamp a progress value into the valid `[PROGRESS_MIN, PROGRESS_MAX]` range.
pub fn clamp_progress(value: i32) -> i32 {
    value.clamp(PROGRESS_MIN, PROGRESS_MAX)
}
