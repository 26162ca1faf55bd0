use crate::ingest::{SeriesModel, SessionStatus};
use crate::render::Sink;
use crate::render::sparkline::sparkline;
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Full-screen terminal view, redrawn in place.
pub struct Dashboard {
    sparkline_width: usize,
    status: Option<SessionStatus>,
    last_frame: String,
}

impl Dashboard {
    pub fn new(sparkline_width: usize) -> Self {
        Self {
            sparkline_width,
            status: None,
            last_frame: String::new(),
        }
    }

    fn draw(&self) {
        let mut out = io::stdout().lock();
        let _ = write!(out, "\x1b[2J\x1b[H{}", self.last_frame);
        if let Some(status) = &self.status {
            let _ = writeln!(out, "\n{}", status.dimmed());
        }
        let _ = out.flush();
    }
}

impl Sink for Dashboard {
    fn redraw(&mut self, model: &SeriesModel) {
        self.last_frame = render_dashboard(model, self.sparkline_width);
        self.draw();
    }

    fn status(&mut self, status: &SessionStatus) {
        self.status = Some(status.clone());
        self.draw();
    }
}

pub fn render_dashboard(model: &SeriesModel, sparkline_width: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Pipe Scores ({} players)\n\
         ========================\n\n",
        model.len()
    ));

    if model.is_empty() {
        out.push_str("  <no score updates yet>\n");
        return out;
    }

    let label_width = model
        .series()
        .iter()
        .map(|s| s.label().chars().count())
        .max()
        .unwrap_or(0);

    for series in model.series() {
        let color = series.color();
        let label = format!("{:<label_width$}", series.label());
        let (time, score) = series
            .latest()
            .map(|p| (p.time, p.score))
            .unwrap_or_default();

        out.push_str(&format!(
            "  {}  {:>8}  t={:<9.2} n={:<6} {}\n",
            label.truecolor(color.r, color.g, color.b),
            score,
            time,
            series.points().len(),
            sparkline(series.points(), sparkline_width).truecolor(color.r, color.g, color.b),
        ));
    }

    out
}
