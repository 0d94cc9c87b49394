/// Kernel tick rate `/proc` counters are expressed in, when the host can't say.
pub const DEFAULT_CLOCK_TICKS: u64 = 100;
pub const DEFAULT_PAGE_SIZE: u64 = 4096;

pub trait HostConstants {
    fn clock_ticks_per_second() -> Option<u64>;
    fn page_size() -> Option<u64>;
}

#[cfg(not(target_os = "linux"))]
mod fallback;
#[cfg(target_os = "linux")]
mod linux;

#[cfg(not(target_os = "linux"))]
use fallback as platform_impl;
#[cfg(target_os = "linux")]
use linux as platform_impl;

pub fn clock_ticks_per_second() -> u64 {
    platform_impl::Platform::clock_ticks_per_second().unwrap_or(DEFAULT_CLOCK_TICKS)
}

pub fn page_size() -> u64 {
    platform_impl::Platform::page_size().unwrap_or(DEFAULT_PAGE_SIZE)
}
