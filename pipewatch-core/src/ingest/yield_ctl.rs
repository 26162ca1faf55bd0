/// Inserts scheduling breakpoints into bulk replay.
///
/// Ordering is untouched; only the granularity at which the session gives the
/// scheduler a turn changes.
#[derive(Debug, Clone)]
pub struct YieldController {
    every: usize,
    since_yield: usize,
    boundaries: usize,
}

impl YieldController {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            since_yield: 0,
            boundaries: 0,
        }
    }

    /// Count one processed entry. Returns `true` on a yield boundary.
    pub fn tick(&mut self) -> bool {
        self.since_yield += 1;
        if self.since_yield < self.every {
            return false;
        }
        self.since_yield = 0;
        self.boundaries += 1;
        true
    }

    /// Hand one scheduling turn back to the runtime.
    pub async fn pause(&self) {
        tokio::task::yield_now().await;
    }

    pub fn boundaries(&self) -> usize {
        self.boundaries
    }
}
