//! Event stream shared by every match component

pub mod bus;
pub mod types;

pub use bus::{EventBus, SubscriptionId, SubscriptionSet};
pub use types::{BattleLogEntry, EventKind, RoundOutcome, SimEvent};
