//! Skill-point allocation gate between rounds
//!
//! After a player-won round every unit holding skill points is handled in
//! id order. Auto-controlled sides spend on random ranks straight away.
//! Manual sides are queued and shown to the selection UI one at a time.
//! The next round is held back until the queue drains.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::config::ControlConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{ControlMode, SkillType, UnitId};
use crate::events::SimEvent;
use crate::unit::UnitStore;

/// One unit awaiting a manual skill selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationRequest {
    pub unit: UnitId,
    pub points: u32,
}

/// External selection UI
///
/// Shown one request at a time. Points are spent through
/// `Battle::allocate_skill_point` and the request is finished with
/// `Battle::close_selection`.
pub trait SkillSelectionUi {
    fn show_selection_for(&mut self, request: &AllocationRequest);
}

#[derive(Default)]
pub struct SkillAllocationCoordinator {
    queue: VecDeque<AllocationRequest>,
    current: Option<AllocationRequest>,
    round: Option<u32>,
    ui: Option<Box<dyn SkillSelectionUi>>,
}

impl SkillAllocationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach_ui(&mut self, ui: Box<dyn SkillSelectionUi>) {
        self.ui = Some(ui);
    }

    pub fn detach_ui(&mut self) -> Option<Box<dyn SkillSelectionUi>> {
        self.ui.take()
    }

    /// True while an allocation phase holds the next round back
    pub fn is_gating(&self) -> bool {
        self.round.is_some()
    }

    /// Request currently shown to the UI
    pub fn current(&self) -> Option<&AllocationRequest> {
        self.current.as_ref()
    }

    /// Requests still waiting behind the current one
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Open an allocation phase for `round`
    ///
    /// Returns the events to publish, ending with
    /// `SkillAllocationCompleted` when nothing needs a manual selection.
    pub fn begin<R: Rng + ?Sized>(
        &mut self,
        round: u32,
        units: &mut UnitStore,
        control: &ControlConfig,
        rng: &mut R,
    ) -> Vec<SimEvent> {
        let mut events = Vec::new();
        self.queue.clear();
        self.current = None;

        for id in units.ids() {
            let Some(unit) = units.get(id) else { continue };
            let points = unit.state.skill_points;
            if points == 0 {
                continue;
            }
            match control.mode(unit.side) {
                ControlMode::Auto => events.extend(spend_randomly(units, id, rng)),
                ControlMode::Manual => self.queue.push_back(AllocationRequest { unit: id, points }),
            }
        }

        if self.queue.is_empty() {
            tracing::info!(round, "No manual skill selections, allocation complete");
            events.push(SimEvent::SkillAllocationCompleted { round });
            return events;
        }

        tracing::info!(round, pending = self.queue.len(), "Skill allocation started");
        self.round = Some(round);
        events.push(SimEvent::SkillAllocationStarted {
            round,
            pending: self.queue.len(),
        });
        events.extend(self.open_next(units));
        events
    }

    /// Spend one point of the open selection
    pub fn allocate(&mut self, units: &mut UnitStore, unit: UnitId, skill: SkillType) -> Result<SimEvent> {
        let current = self.current.as_mut().ok_or(SimError::NoActiveSelection)?;
        if current.unit != unit {
            return Err(SimError::SelectionMismatch {
                expected: current.unit,
                got: unit,
            });
        }
        let record = units.get_mut(unit).ok_or(SimError::UnitNotFound(unit))?;
        let rank = record
            .state
            .spend_skill_point(&record.config, skill)
            .ok_or(SimError::NoSkillPoints(unit))?;
        current.points = record.state.skill_points;

        tracing::debug!(unit = %unit, ?skill, rank, "Skill point allocated");
        Ok(SimEvent::SkillPointAllocated { unit, skill, rank })
    }

    /// Finish the open selection and show the next one
    ///
    /// Unspent points stay on the unit.
    pub fn close_selection(&mut self, units: &UnitStore, unit: UnitId) -> Result<Vec<SimEvent>> {
        let current = self.current.ok_or(SimError::NoActiveSelection)?;
        if current.unit != unit {
            return Err(SimError::SelectionMismatch {
                expected: current.unit,
                got: unit,
            });
        }
        self.current = None;
        Ok(self.open_next(units))
    }

    /// Spend the open selection's points at random and close it
    pub fn auto_resolve_current<R: Rng + ?Sized>(
        &mut self,
        units: &mut UnitStore,
        rng: &mut R,
    ) -> Result<Vec<SimEvent>> {
        let current = self.current.ok_or(SimError::NoActiveSelection)?;
        let mut events = spend_randomly(units, current.unit, rng);
        events.extend(self.close_selection(units, current.unit)?);
        Ok(events)
    }

    /// Drop the phase without completing it
    pub fn cancel(&mut self) {
        self.queue.clear();
        self.current = None;
        self.round = None;
    }

    fn open_next(&mut self, units: &UnitStore) -> Vec<SimEvent> {
        while let Some(request) = self.queue.pop_front() {
            let Some(unit) = units.get(request.unit) else {
                continue;
            };
            let request = AllocationRequest {
                unit: request.unit,
                points: unit.state.skill_points,
            };
            if request.points == 0 {
                continue;
            }

            tracing::debug!(unit = %request.unit, points = request.points, "Showing skill selection");
            self.current = Some(request);
            if let Some(ui) = self.ui.as_mut() {
                ui.show_selection_for(&request);
            }
            return vec![SimEvent::SkillSelectionRequested {
                unit: request.unit,
                points: request.points,
            }];
        }

        match self.round.take() {
            Some(round) => {
                tracing::info!(round, "Skill allocation complete");
                vec![SimEvent::SkillAllocationCompleted { round }]
            }
            None => Vec::new(),
        }
    }
}

impl std::fmt::Debug for SkillAllocationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillAllocationCoordinator")
            .field("queue", &self.queue)
            .field("current", &self.current)
            .field("round", &self.round)
            .field("ui_attached", &self.ui.is_some())
            .finish()
    }
}

/// Spend every point of `unit` on uniformly random ranks
pub fn spend_randomly<R: Rng + ?Sized>(units: &mut UnitStore, unit: UnitId, rng: &mut R) -> Vec<SimEvent> {
    let mut events = Vec::new();
    let Some(record) = units.get_mut(unit) else {
        return events;
    };
    while record.state.skill_points > 0 {
        let Some(&skill) = SkillType::ALL.choose(rng) else {
            break;
        };
        match record.state.spend_skill_point(&record.config, skill) {
            Some(rank) => events.push(SimEvent::SkillPointAllocated { unit, skill, rank }),
            None => break,
        }
    }
    events
}
