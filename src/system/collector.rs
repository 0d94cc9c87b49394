use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use super::counters::{CpuCounters, CpuTimes, read_cpu_counters, read_memory_counters};
use super::delta::{coarse_cpu_time, cpu_usage};
use super::history::ProcessCpuTable;
use super::platform;
use super::process::{ProcessInfo, ProcessRecord, enumerate};
use super::snapshot::{CoreUsage, CpuStats, MemoryStats, SystemSnapshot};
use super::source::{ProcFs, ProcSource};

/// Samples the counters once per tick and keeps the single previous sample
/// needed to turn them into rates.
pub struct Collector<S = ProcFs> {
    source: S,
    previous_total: Option<CpuTimes>,
    previous_cores: HashMap<usize, CpuTimes>,
    process_cpu: ProcessCpuTable,
    last_sample: Option<Instant>,
    clock_ticks: u64,
    page_size: u64,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    pub fn new() -> Self {
        Collector::with_source(ProcFs::new())
    }
}

impl<S: ProcSource> Collector<S> {
    pub fn with_source(source: S) -> Self {
        Collector {
            source,
            previous_total: None,
            previous_cores: HashMap::new(),
            process_cpu: ProcessCpuTable::new(),
            last_sample: None,
            clock_ticks: platform::clock_ticks_per_second(),
            page_size: platform::page_size(),
        }
    }

    /// Overrides the host's tick rate and page size.
    pub fn with_host_constants(mut self, clock_ticks: u64, page_size: u64) -> Self {
        self.clock_ticks = clock_ticks;
        self.page_size = page_size;
        self
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Number of processes with a stored CPU baseline.
    pub fn tracked_processes(&self) -> usize {
        self.process_cpu.len()
    }

    pub fn collect(&mut self) -> SystemSnapshot {
        self.collect_at(Instant::now())
    }

    /// [`collect`](Self::collect) with the sample time supplied by the caller.
    pub fn collect_at(&mut self, now: Instant) -> SystemSnapshot {
        let _collect_span = tracing::debug_span!("collector.collect").entered();

        let elapsed = self
            .last_sample
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);

        let counters = read_cpu_counters(&self.source);
        let cpu = self.cpu_stats(&counters);
        let memory = self.memory_stats();
        let processes = self.process_stats(elapsed);

        let snapshot = SystemSnapshot {
            cpu,
            memory,
            process_count: processes.len(),
            processes,
        };

        // Baselines move only once the snapshot is complete. An all-zero
        // record means the source was unreadable and is not a baseline.
        self.previous_total = Some(counters.aggregate).filter(|t| t.total_ticks() > 0);
        self.previous_cores = counters
            .cores
            .iter()
            .filter(|core| core.times.total_ticks() > 0)
            .map(|core| (core.index, core.times))
            .collect();
        self.last_sample = Some(now);

        tracing::debug!(
            usage = snapshot.cpu.usage,
            cores = snapshot.cpu.per_core.len(),
            processes = snapshot.processes.len(),
            "collected snapshot"
        );
        snapshot
    }

    fn cpu_stats(&self, counters: &CpuCounters) -> CpuStats {
        let usage = self
            .previous_total
            .map(|previous| cpu_usage(&counters.aggregate, &previous))
            .unwrap_or(0.0);

        let per_core = counters
            .cores
            .iter()
            .map(|core| CoreUsage {
                index: core.index,
                usage: self
                    .previous_cores
                    .get(&core.index)
                    .map(|previous| cpu_usage(&core.times, previous))
                    .unwrap_or(0.0),
            })
            .collect();

        CpuStats {
            usage,
            per_core,
            total: counters.aggregate,
        }
    }

    fn memory_stats(&self) -> MemoryStats {
        let mut memory = read_memory_counters(&self.source);
        if memory.is_inconsistent() {
            tracing::warn!(
                total = memory.total,
                free = memory.free,
                buffers = memory.buffers,
                cached = memory.cached,
                "free + buffers + cached exceeds total; clamping used to zero"
            );
        }
        memory.used = memory.derive_used();
        memory
    }

    fn process_stats(&mut self, elapsed: Duration) -> Vec<ProcessInfo> {
        let records = enumerate(&self.source);
        let mut alive = HashSet::with_capacity(records.len());

        let processes: Vec<ProcessInfo> = records
            .into_iter()
            .map(|record| {
                alive.insert(record.stat.pid);
                self.process_info(record, elapsed)
            })
            .collect();

        self.process_cpu.retain_alive(&alive);
        processes
    }

    fn process_info(&mut self, record: ProcessRecord, elapsed: Duration) -> ProcessInfo {
        let cpu_ticks = record.cpu_ticks();
        let cpu_percent = self.process_cpu.observe(
            record.stat.pid,
            record.stat.start_time,
            cpu_ticks,
            elapsed,
            self.clock_ticks,
        );
        let resident_pages = u64::try_from(record.stat.rss_pages).unwrap_or(0);

        ProcessInfo {
            pid: record.stat.pid,
            ppid: record.stat.ppid,
            name: record.stat.name,
            state: record.stat.state,
            priority: record.stat.priority,
            nice: record.stat.nice,
            threads: record.stat.threads,
            memory_bytes: record.stat.vsize,
            resident_bytes: resident_pages.saturating_mul(self.page_size),
            cpu_ticks,
            cpu_time: coarse_cpu_time(cpu_ticks),
            cpu_percent,
            command: record.command,
            kernel_thread: record.kernel_thread,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::process::fixtures::stat_line;
    use crate::system::source::InMemorySource;

    fn cpu_line(label: &str, user: u64, system: u64, idle: u64) -> String {
        format!("{label} {user} 0 {system} {idle} 0 0 0 0 0 0")
    }

    fn core_usages(snapshot: &SystemSnapshot) -> Vec<(usize, f64)> {
        snapshot
            .cpu
            .per_core
            .iter()
            .map(|core| (core.index, core.usage))
            .collect()
    }

    fn collector_with(stat: &str) -> Collector<InMemorySource> {
        let mut source = InMemorySource::new();
        source.set_file("stat", stat);
        Collector::with_source(source).with_host_constants(100, 4096)
    }

    #[test]
    fn first_tick_reports_sentinel_zero() {
        let mut collector = collector_with(&cpu_line("cpu", 100, 50, 850));
        let snapshot = collector.collect();
        assert_eq!(snapshot.cpu.usage, 0.0);
        assert_eq!(snapshot.cpu.total.user, 100);
    }

    #[test]
    fn per_core_usage_uses_each_cores_own_baseline() {
        let tick1 = [
            cpu_line("cpu", 110, 0, 190),
            cpu_line("cpu0", 100, 0, 100),
            cpu_line("cpu1", 10, 0, 90),
        ]
        .join("\n");
        let tick2 = [
            cpu_line("cpu", 220, 0, 280),
            cpu_line("cpu0", 200, 0, 100),
            cpu_line("cpu1", 20, 0, 180),
        ]
        .join("\n");

        let mut collector = collector_with(&tick1);
        let start = Instant::now();
        let first = collector.collect_at(start);
        assert_eq!(core_usages(&first), vec![(0, 0.0), (1, 0.0)]);

        collector.source_mut().set_file("stat", tick2);
        let second = collector.collect_at(start + Duration::from_secs(1));
        assert_eq!(core_usages(&second), vec![(0, 100.0), (1, 10.0)]);
        assert_eq!(second.cpu.usage, 55.0);
    }

    #[test]
    fn new_core_without_baseline_reports_zero() {
        let mut collector = collector_with(&cpu_line("cpu0", 1, 0, 1));
        collector.collect();
        let both = [cpu_line("cpu0", 2, 0, 1), cpu_line("cpu1", 5, 0, 5)].join("\n");
        collector.source_mut().set_file("stat", both);

        let snapshot = collector.collect();
        assert_eq!(core_usages(&snapshot), vec![(0, 100.0), (1, 0.0)]);
    }

    #[test]
    fn offline_core_keeps_kernel_indices() {
        let tick1 = [cpu_line("cpu0", 10, 0, 10), cpu_line("cpu2", 10, 0, 10)].join("\n");
        let tick2 = [cpu_line("cpu0", 20, 0, 10), cpu_line("cpu2", 15, 0, 15)].join("\n");

        let mut collector = collector_with(&tick1);
        collector.collect();
        collector.source_mut().set_file("stat", tick2);

        let snapshot = collector.collect();
        assert_eq!(core_usages(&snapshot), vec![(0, 100.0), (2, 50.0)]);
    }

    #[test]
    fn unreadable_stat_is_not_a_baseline() {
        let mut collector = collector_with(&cpu_line("cpu", 100, 50, 850));
        collector.collect();
        collector.source_mut().remove_file("stat");
        let outage = collector.collect();
        assert_eq!(outage.cpu.usage, 0.0);
        assert!(outage.cpu.per_core.is_empty());

        collector
            .source_mut()
            .set_file("stat", cpu_line("cpu", 200, 100, 1700));
        assert_eq!(collector.collect().cpu.usage, 0.0);
        collector
            .source_mut()
            .set_file("stat", cpu_line("cpu", 300, 150, 2550));
        assert_eq!(collector.collect().cpu.usage, 15.0);
    }

    #[test]
    fn memory_used_is_derived() {
        let mut collector = collector_with("");
        collector.source_mut().set_file(
            "meminfo",
            "MemTotal: 1000 kB\nMemFree: 300 kB\nBuffers: 50 kB\nCached: 150 kB\n",
        );
        let memory = collector.collect().memory;
        assert_eq!(memory.used, 500 * 1024);
    }

    #[test]
    fn process_rate_and_eviction() {
        let mut collector = collector_with(&cpu_line("cpu", 1, 1, 1));
        collector
            .source_mut()
            .set_process(10, &stat_line(10, "worker", 100, 50, 1 << 20), b"worker\0-v\0");
        collector
            .source_mut()
            .set_process(11, &stat_line(11, "idle", 5, 5, 1 << 10), b"idle\0");

        let start = Instant::now();
        let first = collector.collect_at(start);
        assert!(first.processes.iter().all(|p| p.cpu_percent == 0.0));
        assert_eq!(collector.tracked_processes(), 2);

        collector
            .source_mut()
            .set_process(10, &stat_line(10, "worker", 175, 75, 1 << 20), b"worker\0-v\0");
        collector.source_mut().remove_process(11);

        let second = collector.collect_at(start + Duration::from_secs(2));
        assert_eq!(second.processes.len(), 1);
        let worker = &second.processes[0];
        assert_eq!(worker.cpu_ticks, 250);
        assert_eq!(worker.cpu_time, 2.5);
        assert_eq!(worker.cpu_percent, 50.0);
        assert_eq!(worker.memory_bytes, 1 << 20);
        assert_eq!(worker.resident_bytes, 256 * 4096);
        assert_eq!(worker.command, "worker -v ");
        assert_eq!(collector.tracked_processes(), 1);
    }
}
