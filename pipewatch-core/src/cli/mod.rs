pub mod conf;
pub mod watch;
