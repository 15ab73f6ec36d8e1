mod cache;
pub use cache::*;

#[cfg(test)]
mod cache_test;
