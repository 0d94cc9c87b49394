//! Per-process records read from `/proc/<pid>/stat` and `/proc/<pid>/cmdline`.

use serde::Serialize;
use thiserror::Error;

use super::source::ProcSource;

/// A stat line with fewer fields than this is treated as unreadable.
pub const MIN_STAT_FIELDS: usize = 24;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub ppid: u32,
    pub name: String,
    pub state: String,
    pub priority: i64,
    pub nice: i64,
    pub threads: i64,
    /// Virtual size in bytes.
    pub memory_bytes: u64,
    pub resident_bytes: u64,
    /// User plus kernel ticks since the process started.
    pub cpu_ticks: u64,
    /// `cpu_ticks / 100`; cumulative, not a load.
    pub cpu_time: f64,
    /// Load over the last tick, in percent of one core.
    pub cpu_percent: f64,
    pub command: String,
    pub kernel_thread: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("stat has no parenthesized name")]
    MissingName,
    #[error("stat has {0} fields, need at least {MIN_STAT_FIELDS}")]
    TooFewFields(usize),
    #[error("invalid {field} field: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

/// Fields of `/proc/<pid>/stat` the dashboard uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessStat {
    pub pid: u32,
    pub name: String,
    pub state: String,
    pub ppid: u32,
    pub utime: u64,
    pub stime: u64,
    pub priority: i64,
    pub nice: i64,
    pub threads: i64,
    pub start_time: u64,
    pub vsize: u64,
    pub rss_pages: i64,
}

/// A process as read from the source, before any cross-tick rate is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub stat: ProcessStat,
    pub command: String,
    pub kernel_thread: bool,
}

impl ProcessRecord {
    pub fn cpu_ticks(&self) -> u64 {
        self.stat.utime.saturating_add(self.stat.stime)
    }
}

/// Parses one stat line: `pid (name) state ppid ...`.
///
/// The name may itself contain spaces and parentheses, so it spans from the
/// first `(` to the last `)`.
pub fn parse_process_stat(contents: &str) -> Result<ProcessStat, ParseError> {
    let contents = contents.trim();
    let open = contents.find('(').ok_or(ParseError::MissingName)?;
    let close = contents.rfind(')').ok_or(ParseError::MissingName)?;
    if close < open {
        return Err(ParseError::MissingName);
    }

    // Fields after the name, so index 0 is field 3 (state).
    let rest: Vec<&str> = contents[close + 1..].split_whitespace().collect();
    let field_count = rest.len() + 2;
    if field_count < MIN_STAT_FIELDS {
        return Err(ParseError::TooFewFields(field_count));
    }

    fn parse<T: std::str::FromStr>(
        rest: &[&str],
        idx: usize,
        field: &'static str,
    ) -> Result<T, ParseError> {
        let raw = rest[idx];
        raw.parse().map_err(|_| ParseError::InvalidField {
            field,
            value: raw.to_string(),
        })
    }

    let pid_raw = contents[..open].trim();
    let pid = pid_raw.parse().map_err(|_| ParseError::InvalidField {
        field: "pid",
        value: pid_raw.to_string(),
    })?;

    Ok(ProcessStat {
        pid,
        name: contents[open + 1..close].to_string(),
        state: rest[0].to_string(),
        ppid: parse(&rest, 1, "ppid")?,
        utime: parse(&rest, 11, "utime")?,
        stime: parse(&rest, 12, "stime")?,
        priority: parse(&rest, 15, "priority")?,
        nice: parse(&rest, 16, "nice")?,
        threads: parse(&rest, 17, "num_threads")?,
        start_time: parse(&rest, 19, "starttime")?,
        vsize: parse(&rest, 20, "vsize")?,
        rss_pages: parse(&rest, 21, "rss")?,
    })
}

/// Joins NUL-separated arguments with spaces. Every NUL becomes a space,
/// including the trailing terminator. Empty input falls back to `(name)`.
pub fn reconstruct_command(raw: &[u8], name: &str) -> String {
    if raw.is_empty() {
        return format!("({name})");
    }
    String::from_utf8_lossy(raw).replace('\0', " ")
}

/// PIDs under the proc root, ascending. Non-numeric entries are skipped.
pub fn list_pids(source: &impl ProcSource) -> Vec<u32> {
    let names = match source.list_dir("") {
        Ok(names) => names,
        Err(err) => {
            tracing::debug!(error = %err, "process list unavailable");
            return Vec::new();
        }
    };

    let mut pids: Vec<u32> = names.iter().filter_map(|n| n.parse().ok()).collect();
    pids.sort_unstable();
    pids.dedup();
    pids
}

/// Reads one process. `None` when it exited since it was listed or its stat
/// line is malformed.
pub fn read_process(source: &impl ProcSource, pid: u32) -> Option<ProcessRecord> {
    // The short name is an arbitrary byte string, so the line may not be UTF-8.
    let raw_stat = source.read_bytes(&format!("{pid}/stat")).ok()?;
    let contents = String::from_utf8_lossy(&raw_stat);
    let stat = match parse_process_stat(&contents) {
        Ok(stat) => stat,
        Err(err) => {
            tracing::trace!(pid, error = %err, "skipping process");
            return None;
        }
    };

    let raw_cmdline = source
        .read_bytes(&format!("{pid}/cmdline"))
        .unwrap_or_default();
    let kernel_thread = raw_cmdline.is_empty();
    let command = reconstruct_command(&raw_cmdline, &stat.name);

    Some(ProcessRecord {
        stat,
        command,
        kernel_thread,
    })
}

/// Every readable process visible at call time.
pub fn enumerate(source: &impl ProcSource) -> Vec<ProcessRecord> {
    list_pids(source)
        .into_iter()
        .filter_map(|pid| read_process(source, pid))
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A `/proc/<pid>/stat` line with the given tick counters and sizes.
    pub fn stat_line(pid: u32, name: &str, utime: u64, stime: u64, vsize: u64) -> String {
        format!(
            "{pid} ({name}) S 1 {pid} {pid} 0 -1 4194560 1000 0 0 0 {utime} {stime} 0 0 20 0 1 0 500 {vsize} 256 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 3 0 0 0 0 0"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::stat_line;
    use super::*;
    use crate::system::source::InMemorySource;

    #[test]
    fn parses_stat_fields() {
        let stat = parse_process_stat(&stat_line(1234, "bash", 150, 40, 8_192_000)).unwrap();
        assert_eq!(stat.pid, 1234);
        assert_eq!(stat.name, "bash");
        assert_eq!(stat.state, "S");
        assert_eq!(stat.ppid, 1);
        assert_eq!(stat.utime, 150);
        assert_eq!(stat.stime, 40);
        assert_eq!(stat.priority, 20);
        assert_eq!(stat.nice, 0);
        assert_eq!(stat.threads, 1);
        assert_eq!(stat.start_time, 500);
        assert_eq!(stat.vsize, 8_192_000);
        assert_eq!(stat.rss_pages, 256);
    }

    #[test]
    fn name_with_spaces_and_parens_survives() {
        let stat = parse_process_stat(&stat_line(9, "Web (Content) 1", 1, 1, 1)).unwrap();
        assert_eq!(stat.name, "Web (Content) 1");
        assert_eq!(stat.state, "S");
        assert_eq!(stat.vsize, 1);
    }

    #[test]
    fn short_stat_is_rejected() {
        let err = parse_process_stat("12 (sh) S 1 12 12 0 -1 0 0").unwrap_err();
        assert_eq!(err, ParseError::TooFewFields(10));
    }

    #[test]
    fn exactly_twenty_four_fields_is_enough() {
        let line = "5 (w) R 1 5 5 0 -1 0 0 0 0 0 7 3 0 0 20 0 1 0 99 4096 2";
        assert_eq!(line.split_whitespace().count(), 24);
        let stat = parse_process_stat(line).unwrap();
        assert_eq!(stat.utime, 7);
        assert_eq!(stat.rss_pages, 2);
    }

    #[test]
    fn garbled_numeric_field_is_rejected() {
        let line = stat_line(3, "x", 1, 1, 1).replace(" 20 0 1 ", " high 0 1 ");
        assert!(matches!(
            parse_process_stat(&line),
            Err(ParseError::InvalidField {
                field: "priority",
                ..
            })
        ));
    }

    #[test]
    fn command_line_nuls_become_spaces() {
        assert_eq!(
            reconstruct_command(b"/bin/foo\0--flag\0val\0", "foo"),
            "/bin/foo --flag val "
        );
    }

    #[test]
    fn empty_command_line_falls_back_to_name() {
        assert_eq!(reconstruct_command(b"", "kworker/0:1"), "(kworker/0:1)");
    }

    #[test]
    fn list_pids_ignores_non_numeric_entries() {
        let mut source = InMemorySource::new();
        source.set_file("stat", "cpu 0");
        source.set_file("self/stat", "");
        source.set_process(300, &stat_line(300, "a", 0, 0, 0), b"a\0");
        source.set_process(2, &stat_line(2, "kthreadd", 0, 0, 0), b"");

        assert_eq!(list_pids(&source), vec![2, 300]);
    }

    #[test]
    fn malformed_process_is_excluded_without_affecting_others() {
        let mut source = InMemorySource::new();
        source.set_process(1, &stat_line(1, "init", 5, 5, 1024), b"/sbin/init\0");
        source.set_process(2, "2 (broken) S 0 0", b"");
        source.set_process(3, &stat_line(3, "kthreadd", 0, 0, 0), b"");

        let records = enumerate(&source);
        let pids: Vec<u32> = records.iter().map(|r| r.stat.pid).collect();
        assert_eq!(pids, vec![1, 3]);
        assert!(!records[0].kernel_thread);
        assert_eq!(records[0].command, "/sbin/init ");
        assert!(records[1].kernel_thread);
        assert_eq!(records[1].command, "(kthreadd)");
    }

    #[test]
    fn non_utf8_short_name_is_kept() {
        let mut stat = b"7 (caf\xe9) ".to_vec();
        stat.extend_from_slice(
            b"S 1 7 7 0 -1 4194560 10 0 0 0 3 2 0 0 20 0 1 0 500 2048 4 0 0 0",
        );
        let mut source = InMemorySource::new();
        source.set_file("7/stat", stat);
        source.set_file("7/cmdline", b"caf\xe9\0".to_vec());

        let records = enumerate(&source);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.stat.pid, 7);
        assert_eq!(record.stat.name, "caf\u{fffd}");
        assert_eq!(record.cpu_ticks(), 5);
        assert_eq!(record.command, "caf\u{fffd} ");
    }

    #[test]
    fn vanished_process_is_silently_skipped() {
        let source = InMemorySource::new();
        assert!(read_process(&source, 4242).is_none());
    }
}
