pub mod collector;
pub mod counters;
pub mod delta;
pub mod history;
pub mod platform;
pub mod process;
pub mod snapshot;
pub mod source;
