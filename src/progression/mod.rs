//! Experience, levels and between-round skill allocation

pub mod allocation;
pub mod experience;

pub use allocation::{AllocationRequest, SkillAllocationCoordinator, SkillSelectionUi};
pub use experience::ProgressionService;
