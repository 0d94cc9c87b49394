use serde::Serialize;

use super::counters::CpuTimes;
use super::process::ProcessInfo;

/// Load of one core, labelled with the kernel's index from its `cpuN` line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CoreUsage {
    pub index: usize,
    pub usage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuStats {
    /// Aggregate load in percent; `0.0` on the first tick.
    pub usage: f64,
    /// One entry per online core, ordered by core index. Offline cores leave
    /// gaps in the indices.
    pub per_core: Vec<CoreUsage>,
    /// Raw aggregate counters this tick's usage was computed from.
    pub total: CpuTimes,
}

/// Memory counters in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub total: u64,
    pub free: u64,
    pub available: u64,
    pub buffers: u64,
    pub cached: u64,
    pub shared: u64,
    pub used: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

impl MemoryStats {
    /// `total - free - buffers - cached`, floored at zero.
    pub fn derive_used(&self) -> u64 {
        self.total
            .saturating_sub(self.free)
            .saturating_sub(self.buffers)
            .saturating_sub(self.cached)
    }

    /// True when the reclaimable counters add up to more than the total,
    /// which only happens when the file changed mid-read.
    pub fn is_inconsistent(&self) -> bool {
        self.free
            .saturating_add(self.buffers)
            .saturating_add(self.cached)
            > self.total
    }

    pub fn used_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.used as f64 / self.total as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn swap_used(&self) -> u64 {
        self.swap_total.saturating_sub(self.swap_free)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemSnapshot {
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub processes: Vec<ProcessInfo>,
    pub process_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn used_subtracts_reclaimable_memory() {
        let stats = MemoryStats {
            total: 1000,
            free: 300,
            buffers: 50,
            cached: 150,
            ..MemoryStats::default()
        };
        assert_eq!(stats.derive_used(), 500);
        assert!(!stats.is_inconsistent());
    }

    #[test]
    fn inconsistent_sample_clamps_used_to_zero() {
        let stats = MemoryStats {
            total: 100,
            free: 80,
            buffers: 10,
            cached: 20,
            ..MemoryStats::default()
        };
        assert_eq!(stats.derive_used(), 0);
        assert!(stats.is_inconsistent());
    }

    #[test]
    fn used_percent_handles_zero_total() {
        assert_eq!(MemoryStats::default().used_percent(), 0.0);
        let stats = MemoryStats {
            total: 200,
            used: 50,
            ..MemoryStats::default()
        };
        assert_eq!(stats.used_percent(), 25.0);
    }
}
