#![forbid(unsafe_code)]

pub mod analytics;
pub mod error;
pub mod model;
pub mod readiness;
pub mod scheduler;
pub mod state;
pub mod time;

pub use error::Error;
pub use state::{StateError, StudyEvent, StudyState, apply_event};
pub use time::Clock;
