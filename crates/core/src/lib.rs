#![forbid(unsafe_code)]

pub mod aggregate;
pub mod error;
pub mod model;
pub mod time;

pub use error::FormatError;
pub use time::Clock;
