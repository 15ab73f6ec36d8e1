pub mod backoff;
pub mod util;

pub use backoff::*;
