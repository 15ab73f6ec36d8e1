mod leadership_monitor;
pub use leadership_monitor::*;
