//! Crate-wide tunables that are not worth a configuration knob.

/// Buffer of a leadership-change subscription channel handed out by
/// [`crate::LeadershipMonitor::register`].
pub(crate) const LEADERSHIP_EVENT_BUFFER: usize = 1024;

/// Buffer of the per-shard routing channel inside the dissemination pool.
pub(crate) const SHARD_EVENT_BUFFER: usize = 256;
