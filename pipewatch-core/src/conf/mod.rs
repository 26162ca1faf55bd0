mod error;
mod startup;
mod tuning;

#[cfg(test)]
mod tests;

pub use error::ConfigError;
pub use startup::*;
pub use tuning::*;
