use crate::ingest::{SeriesModel, SessionStatus};
use crate::render::Sink;
use std::io::Write;

/// Line-oriented output for pipes and log files.
pub struct PlainSink<W> {
    out: W,
}

impl<W: Write> PlainSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for PlainSink<W> {
    fn redraw(&mut self, model: &SeriesModel) {
        let _ = writeln!(self.out, "{}", render_summary(model));
    }

    fn status(&mut self, status: &SessionStatus) {
        let _ = writeln!(self.out, "# {status}");
    }
}

/// `label=score` for every series, in creation order.
pub fn render_summary(model: &SeriesModel) -> String {
    if model.is_empty() {
        return "scores: <none>".to_string();
    }

    let scores: Vec<String> = model
        .series()
        .iter()
        .map(|s| {
            let score = s.latest().map(|p| p.score).unwrap_or_default();
            format!("{}={}", s.label(), score)
        })
        .collect();

    format!("scores: {}", scores.join(" "))
}
