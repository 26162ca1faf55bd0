use std::time::Duration;

/// Replay entries folded between cooperative yields.
pub const DEFAULT_YIELD_EVERY: usize = 50;
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

pub const DEFAULT_BACKOFF_INITIAL: Duration = Duration::from_secs(1);
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(10);

/// Path of the live log endpoint on the simulation host.
pub const LIVE_LOGS_PATH: &str = "/logs";

/// Read size for local replay files.
pub const FILE_CHUNK_SIZE: usize = 8 * 1024;
