//! Battle system - rounds of team combat with between-round progression
//!
//! Each tick: scheduled tasks -> AI decisions -> per-unit combat and movement
//!
//! Rosters persist across rounds. Defeated units are revived in place at
//! the next round start, so identity and progression last the whole match.

pub mod ai;
pub mod report;
pub mod rounds;
pub mod simulation;
pub mod spawner;
pub mod teams;

pub use ai::{AiReport, CombatAi};
pub use report::{MatchSummary, UnitSummary};
pub use rounds::{Round, RoundScheduler, RoundStatus};
pub use simulation::{Battle, BattleTask};
pub use spawner::Spawner;
pub use teams::{BattleStatus, Team, TeamRegistry};
