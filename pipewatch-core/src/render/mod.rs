//! Sinks: where the folded model goes to be looked at.
//!
//! The folding loop owns the model and hands sinks a shared reference on every
//! redraw, so a sink can read but never mutate.

mod dashboard;
mod plain;
mod sparkline;


pub use dashboard::{Dashboard, render_dashboard};
pub use plain::{PlainSink, render_summary};
pub use sparkline::sparkline;

use crate::ingest::{SeriesModel, SessionStatus};
use std::io::{self, IsTerminal};

pub trait Sink {
    /// The model changed; draw it again.
    fn redraw(&mut self, model: &SeriesModel);

    /// Connection or stream state changed.
    fn status(&mut self, status: &SessionStatus);
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn redraw(&mut self, model: &SeriesModel) {
        (**self).redraw(model)
    }

    fn status(&mut self, status: &SessionStatus) {
        (**self).status(status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Dashboard,
    Plain,
}

pub fn default_render_mode() -> RenderMode {
    if io::stdout().is_terminal() {
        RenderMode::Dashboard
    } else {
        RenderMode::Plain
    }
}

pub fn make_sink(mode: RenderMode, sparkline_width: usize) -> Box<dyn Sink> {
    match mode {
        RenderMode::Dashboard => Box::new(Dashboard::new(sparkline_width)),
        RenderMode::Plain => Box::new(PlainSink::new(io::stdout())),
    }
}
