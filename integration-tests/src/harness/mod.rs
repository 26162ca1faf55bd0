mod entries;
pub mod live_server;
pub mod replay_server;
mod sink;
pub mod tracing;

pub use entries::{pretty_frame, score_entry, score_line, scores_body};
pub use live_server::LiveServer;
pub use replay_server::{ReplayServer, Response};
pub use sink::RecordingSink;
pub use self::tracing::{CapturedEvent, captured_events, init_test_tracing};
