#![forbid(unsafe_code)]

pub mod error;
pub mod messages;
pub mod model;
pub mod quiz;
pub mod shuffle;
pub mod spoken;
pub mod time;

pub use error::Error;
pub use time::Clock;
