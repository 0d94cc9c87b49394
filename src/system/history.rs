use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::delta::process_cpu_percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ProcessSample {
    start_time: u64,
    ticks: u64,
}

/// Last tick counter seen for every live process, for per-process rates.
#[derive(Debug, Default)]
pub struct ProcessCpuTable {
    entries: HashMap<u32, ProcessSample>,
}

impl ProcessCpuTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `ticks` for `pid` and returns its load since the previous call.
    ///
    /// A pid seen for the first time, or reused by a new process (different
    /// start time), reports `0.0`.
    pub fn observe(
        &mut self,
        pid: u32,
        start_time: u64,
        ticks: u64,
        elapsed: Duration,
        clock_ticks_per_second: u64,
    ) -> f64 {
        let current = ProcessSample { start_time, ticks };
        match self.entries.insert(pid, current) {
            Some(previous) if previous.start_time == start_time => process_cpu_percent(
                ticks.saturating_sub(previous.ticks),
                clock_ticks_per_second,
                elapsed,
            ),
            _ => 0.0,
        }
    }

    /// Drops every pid not in `alive`.
    pub fn retain_alive(&mut self, alive: &HashSet<u32>) {
        self.entries.retain(|pid, _| alive.contains(pid));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.entries.contains_key(&pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn first_observation_is_zero() {
        let mut table = ProcessCpuTable::new();
        assert_eq!(table.observe(1, 10, 500, SECOND, 100), 0.0);
        assert!(table.contains(1));
    }

    #[test]
    fn second_observation_reports_rate() {
        let mut table = ProcessCpuTable::new();
        table.observe(1, 10, 500, SECOND, 100);
        assert_eq!(table.observe(1, 10, 530, SECOND, 100), 30.0);
    }

    #[test]
    fn reused_pid_resets_baseline() {
        let mut table = ProcessCpuTable::new();
        table.observe(1, 10, 50_000, SECOND, 100);
        assert_eq!(table.observe(1, 99, 20, SECOND, 100), 0.0);
        assert_eq!(table.observe(1, 99, 70, SECOND, 100), 50.0);
    }

    #[test]
    fn retain_alive_evicts_exited_pids() {
        let mut table = ProcessCpuTable::new();
        table.observe(1, 0, 100, SECOND, 100);
        table.observe(2, 0, 200, SECOND, 100);
        table.observe(3, 0, 300, SECOND, 100);

        let alive: HashSet<u32> = [1, 3].into_iter().collect();
        table.retain_alive(&alive);

        assert_eq!(table.len(), 2);
        assert!(table.contains(1));
        assert!(!table.contains(2));
        assert!(table.contains(3));
    }
}
