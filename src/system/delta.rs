//! Rates derived from two cumulative counter samples.

use std::time::Duration;

use super::counters::CpuTimes;

/// Divisor of the coarse cumulative process CPU time.
pub const COARSE_TICK_DIVISOR: f64 = 100.0;

/// Busy share of the interval between `previous` and `current`, in percent.
///
/// Returns exactly `0.0` when the total tick delta is zero. That value means
/// "no history yet" (or an idle counter source), not a measured 0% load.
/// Counters that went backwards are treated as zero delta, and the result is
/// clamped to `0.0..=100.0`.
pub fn cpu_usage(current: &CpuTimes, previous: &CpuTimes) -> f64 {
    let total_delta = current.total_ticks().saturating_sub(previous.total_ticks());
    if total_delta == 0 {
        return 0.0;
    }
    let idle_delta = current.idle_ticks().saturating_sub(previous.idle_ticks());
    let busy_delta = total_delta.saturating_sub(idle_delta);

    (busy_delta as f64 * 100.0 / total_delta as f64).clamp(0.0, 100.0)
}

/// Per-process load over `elapsed`, in percent of one core.
///
/// A process running on several cores can exceed 100.
pub fn process_cpu_percent(ticks_delta: u64, clock_ticks_per_second: u64, elapsed: Duration) -> f64 {
    let seconds = elapsed.as_secs_f64();
    if clock_ticks_per_second == 0 || seconds <= 0.0 {
        return 0.0;
    }
    let cpu_seconds = ticks_delta as f64 / clock_ticks_per_second as f64;
    (cpu_seconds / seconds * 100.0).max(0.0)
}

/// User plus kernel ticks scaled down by a fixed 100. Grows for the whole life
/// of a process; shown as cumulative time, never as a load.
pub fn coarse_cpu_time(ticks: u64) -> f64 {
    ticks as f64 / COARSE_TICK_DIVISOR
}
