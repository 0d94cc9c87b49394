//! Parsers for the system-wide counter files, `/proc/stat` and `/proc/meminfo`.
//!
//! Parsing is lenient: a bad line degrades to zeros or is skipped, and an
//! unreadable file yields an all-zero result.

use serde::Serialize;

use super::snapshot::MemoryStats;
use super::source::ProcSource;

/// Minimum number of numeric fields a `cpu` line must carry.
pub const CPU_FIELDS: usize = 8;

const KIB: u64 = 1024;

/// Cumulative ticks since boot for one CPU, or for all of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
    pub guest: u64,
}

impl CpuTimes {
    pub fn idle_ticks(&self) -> u64 {
        self.idle.saturating_add(self.iowait)
    }

    // guest is already included in user by the kernel.
    pub fn busy_ticks(&self) -> u64 {
        [
            self.user,
            self.nice,
            self.system,
            self.irq,
            self.softirq,
            self.steal,
        ]
        .into_iter()
        .fold(0u64, u64::saturating_add)
    }

    pub fn total_ticks(&self) -> u64 {
        self.idle_ticks().saturating_add(self.busy_ticks())
    }
}

/// Counters of a single core, keyed by the index in its `cpuN` label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoreTimes {
    pub index: usize,
    pub times: CpuTimes,
}

/// One read of `/proc/stat`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuCounters {
    pub aggregate: CpuTimes,
    pub cores: Vec<CoreTimes>,
}

pub fn read_cpu_counters(source: &impl ProcSource) -> CpuCounters {
    match source.read_to_string("stat") {
        Ok(contents) => parse_cpu_counters(&contents),
        Err(err) => {
            tracing::debug!(error = %err, "cpu counters unavailable");
            CpuCounters::default()
        }
    }
}

/// Memory counters in bytes. `used` is left at zero for the caller to derive.
pub fn read_memory_counters(source: &impl ProcSource) -> MemoryStats {
    match source.read_to_string("meminfo") {
        Ok(contents) => parse_meminfo(&contents),
        Err(err) => {
            tracing::debug!(error = %err, "memory counters unavailable");
            MemoryStats::default()
        }
    }
}

pub fn parse_cpu_counters(contents: &str) -> CpuCounters {
    let mut counters = CpuCounters::default();

    for line in contents.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else {
            continue;
        };
        let Some(suffix) = label.strip_prefix("cpu") else {
            continue;
        };
        let values: Vec<&str> = fields.collect();
        let times = parse_cpu_times(&values);

        if suffix.is_empty() {
            counters.aggregate = times;
        } else {
            let index = suffix.parse().unwrap_or(counters.cores.len());
            counters.cores.push(CoreTimes { index, times });
        }
    }

    counters.cores.sort_by_key(|core| core.index);
    counters
}

/// Parses the numeric columns after a `cpu` label. Fewer than
/// [`CPU_FIELDS`] columns, or a garbled one among them, gives a zero record.
pub fn parse_cpu_times(fields: &[&str]) -> CpuTimes {
    if fields.len() < CPU_FIELDS {
        tracing::trace!(fields = fields.len(), "short cpu line");
        return CpuTimes::default();
    }

    let mut values = [0u64; CPU_FIELDS];
    for (slot, raw) in values.iter_mut().zip(fields) {
        match raw.parse() {
            Ok(value) => *slot = value,
            Err(_) => {
                tracing::trace!(field = *raw, "unparsable cpu field");
                return CpuTimes::default();
            }
        }
    }
    let [user, nice, system, idle, iowait, irq, softirq, steal] = values;

    CpuTimes {
        user,
        nice,
        system,
        idle,
        iowait,
        irq,
        softirq,
        steal,
        guest: fields
            .get(CPU_FIELDS)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
    }
}

pub fn parse_meminfo(contents: &str) -> MemoryStats {
    let mut stats = MemoryStats::default();

    for line in contents.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let Some(Ok(kib)) = rest.split_whitespace().next().map(str::parse::<u64>) else {
            continue;
        };
        let bytes = kib.saturating_mul(KIB);

        match key.trim() {
            "MemTotal" => stats.total = bytes,
            "MemFree" => stats.free = bytes,
            "MemAvailable" => stats.available = bytes,
            "Buffers" => stats.buffers = bytes,
            "Cached" => stats.cached = bytes,
            "Shmem" => stats.shared = bytes,
            "SwapTotal" => stats.swap_total = bytes,
            "SwapFree" => stats.swap_free = bytes,
            _ => {}
        }
    }

    stats
}
