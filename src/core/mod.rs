pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{Scheduler, SimClock, TaskHandle};
pub use config::SimConfig;
pub use error::{Result, SimError};
