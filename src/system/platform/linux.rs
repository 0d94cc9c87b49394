use super::HostConstants;

pub struct Platform;

fn sysconf(name: libc::c_int) -> Option<u64> {
    // SAFETY: sysconf only reads a system limit and has no preconditions.
    let value = unsafe { libc::sysconf(name) };
    // -1 on error or for an indeterminate limit.
    u64::try_from(value).ok().filter(|v| *v > 0)
}

impl HostConstants for Platform {
    fn clock_ticks_per_second() -> Option<u64> {
        sysconf(libc::_SC_CLK_TCK)
    }

    fn page_size() -> Option<u64> {
        sysconf(libc::_SC_PAGESIZE)
    }
}
