use pipewatch_core::ingest::{CancelHandle, SeriesModel, SessionStatus};
use pipewatch_core::render::Sink;

/// Remembers every notification. Optionally cancels the session once the
/// model holds a given number of points.
#[derive(Default)]
pub struct RecordingSink {
    pub redraws: usize,
    pub statuses: Vec<SessionStatus>,
    cancel_at: Option<(usize, CancelHandle)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_after_points(points: usize, handle: CancelHandle) -> Self {
        Self {
            cancel_at: Some((points, handle)),
            ..Self::default()
        }
    }

    pub fn count_status(&self, pred: impl Fn(&SessionStatus) -> bool) -> usize {
        self.statuses.iter().filter(|s| pred(s)).count()
    }
}

impl Sink for RecordingSink {
    fn redraw(&mut self, model: &SeriesModel) {
        self.redraws += 1;

        if let Some((limit, handle)) = &self.cancel_at {
            let points: usize = model.series().iter().map(|s| s.points().len()).sum();
            if points >= *limit {
                handle.cancel();
            }
        }
    }

    fn status(&mut self, status: &SessionStatus) {
        self.statuses.push(status.clone());
    }
}
