use super::HostConstants;

pub struct Platform;

// Non-Linux hosts have no /proc; the defaults only keep the crate building.
impl HostConstants for Platform {
    fn clock_ticks_per_second() -> Option<u64> {
        None
    }

    fn page_size() -> Option<u64> {
        None
    }
}
