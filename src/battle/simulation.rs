//! Match orchestrator
//!
//! Each step: clock -> scheduled tasks -> AI pass -> unit updates (id order)
//!
//! `Battle` owns every component and routes events between them. Events
//! are queued and flushed in FIFO order: each one is logged, published on
//! the bus, then handed to the core reactions (progression, win check,
//! round flow). Reactions only queue further events, so delivery is never
//! re-entrant.

use std::collections::VecDeque;

use rand::SeedableRng;

use crate::battle::ai::CombatAi;
use crate::battle::rounds::{RoundScheduler, RoundStatus};
use crate::battle::spawner::Spawner;
use crate::battle::teams::{BattleStatus, TeamRegistry};
use crate::core::clock::{Scheduler, SimClock, TaskHandle};
use crate::core::config::SimConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{Side, SimRng, SkillType, Tick, UnitId, Vec2};
use crate::events::{BattleLogEntry, EventBus, EventKind, RoundOutcome, SimEvent, SubscriptionId};
use crate::navigation::{GridPathfinder, Pathfinder, TargetingGateway};
use crate::progression::{ProgressionService, SkillAllocationCoordinator, SkillSelectionUi};
use crate::unit::combat::{apply_strike, facing_toward, plan_combat_step, CombatRanges, CombatStep};
use crate::unit::controller::MotionStatus;
use crate::unit::{Unit, UnitMode, UnitStore};

/// Scheduled continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleTask {
    StartRound(u32),
    /// Both teams walk toward the opposing anchor
    AdvanceTeams,
    CompleteRound(RoundOutcome),
    BeginSkillAllocation(u32),
    RestartMatch,
    /// Auto-resolve a manual selection left open too long
    SelectionTimeout(UnitId),
}

pub struct Battle {
    config: SimConfig,
    clock: SimClock,
    scheduler: Scheduler<BattleTask>,
    rng: SimRng,
    bus: EventBus,
    gateway: TargetingGateway,
    units: UnitStore,
    teams: TeamRegistry,
    rounds: RoundScheduler,
    progression: ProgressionService,
    allocation: SkillAllocationCoordinator,
    ai: CombatAi,
    spawner: Spawner,
    pending_events: VecDeque<SimEvent>,
    log: Vec<BattleLogEntry>,
    selection_timer: Option<TaskHandle>,
    generation: u64,
    started: bool,
    game_over: bool,
}

impl Battle {
    /// Wire a match from a validated config and a pathfinding collaborator
    pub fn new(config: SimConfig, pathfinder: Box<dyn Pathfinder>) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => SimRng::seed_from_u64(seed),
            None => SimRng::from_entropy(),
        };
        let clock = SimClock::new(config.timing.tick_rate);
        let ai = CombatAi::new(clock.ticks_for(config.timing.ai_update_interval));
        let teams = TeamRegistry::new(
            config.teams.spawn_anchor(Side::Player),
            config.teams.spawn_anchor(Side::Enemy),
            config.teams.max_team_size,
        );

        Ok(Self {
            clock,
            scheduler: Scheduler::new(),
            rng,
            bus: EventBus::new(),
            gateway: TargetingGateway::new(pathfinder),
            units: UnitStore::new(),
            teams,
            rounds: RoundScheduler::new(&config.teams, &config.escalation),
            progression: ProgressionService::new(),
            allocation: SkillAllocationCoordinator::new(),
            ai,
            spawner: Spawner::new(&config),
            pending_events: VecDeque::new(),
            log: Vec::new(),
            selection_timer: None,
            generation: 0,
            started: false,
            game_over: false,
            config,
        })
    }

    /// Match on the grid pathfinder described by the config's arena
    pub fn with_arena(config: SimConfig) -> Result<Self> {
        let grid = GridPathfinder::from_arena(&config.arena);
        Self::new(config, Box::new(grid))
    }

    // === ACCESSORS ===

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.clock.seconds()
    }

    pub fn units(&self) -> &UnitStore {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    pub fn teams(&self) -> &TeamRegistry {
        &self.teams
    }

    pub fn rounds(&self) -> &RoundScheduler {
        &self.rounds
    }

    pub fn round_number(&self) -> u32 {
        self.rounds.number()
    }

    pub fn round_status(&self) -> RoundStatus {
        self.rounds.status()
    }

    pub fn rounds_won(&self) -> u32 {
        self.rounds.rounds_won()
    }

    pub fn allocation(&self) -> &SkillAllocationCoordinator {
        &self.allocation
    }

    pub fn progression(&self) -> &ProgressionService {
        &self.progression
    }

    pub fn gateway(&self) -> &TargetingGateway {
        &self.gateway
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn log(&self) -> &[BattleLogEntry] {
        &self.log
    }

    /// Hand over the event log accumulated so far
    pub fn take_log(&mut self) -> Vec<BattleLogEntry> {
        std::mem::take(&mut self.log)
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&SimEvent) + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    pub fn attach_selection_ui(&mut self, ui: Box<dyn SkillSelectionUi>) {
        self.allocation.attach_ui(ui);
    }

    // === LIFECYCLE ===

    /// Schedule round 1. Calling it again does nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        let round = self.rounds.schedule_next();
        self.schedule(self.config.timing.round_start_delay, BattleTask::StartRound(round));
        tracing::info!(round, "Match started");
    }

    /// Advance the simulation by one tick
    pub fn step(&mut self) {
        let now = self.clock.advance();

        let generation = self.generation;
        for (handle, task) in self.scheduler.drain_due(now) {
            // Tasks drained alongside a teardown belong to the old match
            if self.generation != generation {
                break;
            }
            if self.selection_timer == Some(handle) {
                self.selection_timer = None;
            }
            self.run_task(task);
            self.flush();
        }

        self.ai.maybe_run(
            now,
            &mut self.units,
            &self.teams,
            &mut self.gateway,
            &self.config.combat,
            &mut self.rng,
        );

        for id in self.units.ids() {
            self.update_unit(id, now);
            self.flush();
        }
    }

    /// Step for `seconds` of match time
    pub fn run_for(&mut self, seconds: f32) {
        for _ in 0..self.clock.ticks_for(seconds) {
            self.step();
        }
    }

    /// Step until `done` holds or `max_ticks` pass. Returns whether `done` held.
    pub fn run_until<F>(&mut self, max_ticks: Tick, mut done: F) -> bool
    where
        F: FnMut(&Battle) -> bool,
    {
        for _ in 0..max_ticks {
            if done(self) {
                return true;
            }
            self.step();
        }
        done(self)
    }

    /// Cancel pending work and remove every unit
    pub fn teardown(&mut self) {
        let canceled = self.scheduler.cancel_all();
        self.generation += 1;
        self.selection_timer = None;
        self.allocation.cancel();
        for id in self.teams.clear() {
            if let Some(unit) = self.units.remove(id) {
                self.spawner.release_name(unit.side, &unit.name);
            }
        }
        self.units.clear();
        self.pending_events.clear();
        tracing::info!(canceled, "Match torn down");
    }

    /// Tear down and start again from round 1
    pub fn restart(&mut self) {
        self.teardown();
        self.spawner.reset_names();
        self.rounds.reset();
        self.game_over = false;
        // Log covers the current match only
        self.log.clear();
        self.emit(SimEvent::MatchRestarted);
        let round = self.rounds.schedule_next();
        self.schedule(self.config.timing.round_start_delay, BattleTask::StartRound(round));
        self.flush();
        tracing::info!("Match restarted");
    }

    // === COMMANDS ===

    /// Spawn one unit outside the round flow
    pub fn spawn_unit(&mut self, side: Side) -> Result<UnitId> {
        let id = self.spawn_and_announce(side)?;
        self.flush();
        Ok(id)
    }

    /// Move a unit, for setups and tooling
    pub fn place_unit(&mut self, id: UnitId, position: Vec2) -> Result<()> {
        let unit = self.units.get_mut(id).ok_or(SimError::UnitNotFound(id))?;
        unit.position = position;
        unit.controller.stop();
        Ok(())
    }

    /// Redirect a living unit under manual control
    ///
    /// Clears its engagement and keeps the AI away until it arrives.
    /// `Ok(false)` if no path exists; the unit is left as it was.
    pub fn command_move(&mut self, id: UnitId, destination: Vec2) -> Result<bool> {
        let unit = self.units.get(id).ok_or(SimError::UnitNotFound(id))?;
        if !unit.is_alive() {
            return Err(SimError::UnitDead(id));
        }
        let Some(path) = self.gateway.path_to(unit.position, destination) else {
            return Ok(false);
        };

        let unit = self.units.get_mut(id).ok_or(SimError::UnitNotFound(id))?;
        unit.controller.set_manual(true);
        unit.controller.transition(UnitMode::Scouting);
        let moving = unit.controller.start_motion(path);
        if !moving {
            unit.controller.set_manual(false);
            unit.controller.transition(UnitMode::Idle);
        }
        tracing::debug!(unit = %id, ?destination, moving, "Manual move");
        Ok(moving)
    }

    /// Spend one point of the open skill selection
    pub fn allocate_skill_point(&mut self, unit: UnitId, skill: SkillType) -> Result<u32> {
        let event = self.allocation.allocate(&mut self.units, unit, skill)?;
        let rank = match event {
            SimEvent::SkillPointAllocated { rank, .. } => rank,
            _ => 0,
        };
        self.emit(event);
        self.flush();
        Ok(rank)
    }

    /// Close the open skill selection. Unspent points carry over.
    pub fn close_selection(&mut self, unit: UnitId) -> Result<()> {
        let events = self.allocation.close_selection(&self.units, unit)?;
        if let Some(handle) = self.selection_timer.take() {
            self.scheduler.cancel(handle);
        }
        self.emit_all(events);
        self.flush();
        Ok(())
    }

    // === EVENTS ===

    fn emit(&mut self, event: SimEvent) {
        self.pending_events.push_back(event);
    }

    fn emit_all(&mut self, events: impl IntoIterator<Item = SimEvent>) {
        self.pending_events.extend(events);
    }

    fn flush(&mut self) {
        while let Some(event) = self.pending_events.pop_front() {
            self.log.push(BattleLogEntry {
                tick: self.clock.now(),
                event: event.clone(),
            });
            self.bus.publish(&event);
            self.route(&event);
        }
    }

    fn route(&mut self, event: &SimEvent) {
        match event {
            SimEvent::UnitDamaged { .. } => {
                let follow_up = self.progression.handle(&mut self.units, event);
                self.emit_all(follow_up);
            }
            SimEvent::UnitDeath { .. } => {
                let follow_up = self.progression.handle(&mut self.units, event);
                self.emit_all(follow_up);
                self.check_win();
            }
            SimEvent::SkillSelectionRequested { unit, .. } => self.arm_selection_timeout(*unit),
            SimEvent::SkillAllocationCompleted { round } => self.on_allocation_completed(*round),
            _ => {}
        }
    }

    fn schedule(&mut self, seconds: f32, task: BattleTask) -> TaskHandle {
        let delay = self.clock.ticks_for(seconds);
        self.scheduler.schedule_after(self.clock.now(), delay, task)
    }

    // === ROUND FLOW ===

    fn run_task(&mut self, task: BattleTask) {
        tracing::trace!(?task, "Running task");
        match task {
            BattleTask::StartRound(round) => self.start_round(round),
            BattleTask::AdvanceTeams => self.advance_teams(),
            BattleTask::CompleteRound(outcome) => self.complete_round(outcome),
            BattleTask::BeginSkillAllocation(round) => self.begin_allocation(round),
            BattleTask::RestartMatch => self.restart(),
            BattleTask::SelectionTimeout(unit) => self.on_selection_timeout(unit),
        }
    }

    fn start_round(&mut self, round: u32) {
        self.rounds.activate(round);
        let (allies_target, enemies_target) = self.rounds.targets(round);
        tracing::info!(round, allies_target, enemies_target, "Round started");
        self.emit(SimEvent::RoundStarted {
            round,
            allies_target,
            enemies_target,
        });

        for (side, target) in [(Side::Player, allies_target), (Side::Enemy, enemies_target)] {
            let revived = self.teams.revive_team(side, &mut self.units);
            self.emit_all(revived);

            let shortfall = target.saturating_sub(self.teams.roster(side).len());
            for _ in 0..shortfall {
                if let Err(err) = self.spawn_and_announce(side) {
                    tracing::warn!(round, side = side.name(), error = %err, "Spawn failed, round proceeds short");
                    break;
                }
            }
        }

        self.schedule(self.config.timing.battle_settle_delay, BattleTask::AdvanceTeams);
        // A side that could not field anyone decides the round at once
        self.check_win();
    }

    fn spawn_and_announce(&mut self, side: Side) -> Result<UnitId> {
        let id = self.spawner.spawn_unit(
            side,
            &self.config,
            &mut self.teams,
            &mut self.units,
            &mut self.gateway,
            &mut self.rng,
        )?;
        if let Some(unit) = self.units.get(id) {
            let event = SimEvent::UnitSpawned {
                unit: id,
                side,
                name: unit.name.clone(),
                position: unit.position,
            };
            self.emit(event);
        }
        Ok(id)
    }

    fn advance_teams(&mut self) {
        if self.rounds.status() != RoundStatus::Active {
            return;
        }
        for side in Side::ALL {
            let Some(target) = self.teams.team(side.opponent()).anchor else {
                continue;
            };
            self.teams.move_team_to(
                side,
                target,
                self.config.combat.team_spread_radius,
                &mut self.units,
                &mut self.gateway,
                &mut self.rng,
            );
        }
    }

    fn check_win(&mut self) {
        if self.rounds.status() != RoundStatus::Active {
            return;
        }
        let BattleStatus::Decided(outcome) = self.teams.check_battle_status(&self.units) else {
            return;
        };
        if self.rounds.begin_resolving() {
            tracing::info!(round = self.rounds.number(), ?outcome, "Round decided");
            self.schedule(self.config.timing.round_over_delay, BattleTask::CompleteRound(outcome));
        }
    }

    fn complete_round(&mut self, outcome: RoundOutcome) {
        let Some(round) = self.rounds.complete(outcome) else {
            return;
        };
        self.emit(SimEvent::RoundCompleted { round, outcome });

        if outcome.player_won() {
            self.teams.celebrate_victory(Side::Player, &mut self.units, self.clock.now());
            self.log_round_summary(round);
            for id in self.units.ids() {
                if let Some(unit) = self.units.get_mut(id) {
                    unit.state.reset_battle_stats();
                }
            }
            if self.clock.ticks_for(self.config.timing.allocation_delay) == 0 {
                self.begin_allocation(round);
            } else {
                self.schedule(
                    self.config.timing.allocation_delay,
                    BattleTask::BeginSkillAllocation(round),
                );
            }
        } else {
            let rounds_won = self.rounds.rounds_won();
            tracing::info!(round, rounds_won, ?outcome, "Game over");
            self.game_over = true;
            self.emit(SimEvent::GameOver { rounds_won });
            if self.config.control.restart_on_defeat {
                self.schedule(self.config.timing.restart_delay, BattleTask::RestartMatch);
            }
        }
    }

    fn log_round_summary(&self, round: u32) {
        for &id in self.teams.roster(Side::Player) {
            if let Some(unit) = self.units.get(id) {
                tracing::info!(
                    round,
                    unit = %id,
                    name = %unit.name,
                    level = unit.state.level,
                    damage_dealt = unit.state.battle.damage_dealt,
                    kills = unit.state.battle.kills,
                    alive = unit.is_alive(),
                    "Round summary"
                );
            }
        }
    }

    fn begin_allocation(&mut self, round: u32) {
        let events = self
            .allocation
            .begin(round, &mut self.units, &self.config.control, &mut self.rng);
        self.emit_all(events);
    }

    fn on_allocation_completed(&mut self, round: u32) {
        if let Some(handle) = self.selection_timer.take() {
            self.scheduler.cancel(handle);
        }
        let next = self.rounds.schedule_next();
        tracing::info!(completed = round, next, "Next round scheduled");
        self.schedule(self.config.timing.round_transition_delay, BattleTask::StartRound(next));
    }

    fn arm_selection_timeout(&mut self, unit: UnitId) {
        let Some(timeout) = self.config.timing.selection_timeout else {
            return;
        };
        if let Some(handle) = self.selection_timer.take() {
            self.scheduler.cancel(handle);
        }
        self.selection_timer = Some(self.schedule(timeout, BattleTask::SelectionTimeout(unit)));
    }

    fn on_selection_timeout(&mut self, unit: UnitId) {
        if self.allocation.current().map(|r| r.unit) != Some(unit) {
            return;
        }
        tracing::warn!(unit = %unit, "Skill selection timed out, spending points");
        match self.allocation.auto_resolve_current(&mut self.units, &mut self.rng) {
            Ok(events) => self.emit_all(events),
            Err(err) => tracing::warn!(error = %err, "Could not resolve timed-out selection"),
        }
    }

    // === UNIT UPDATE ===

    fn update_unit(&mut self, id: UnitId, now: Tick) {
        let Some(unit) = self.units.get(id) else {
            return;
        };
        if !unit.is_alive() || unit.controller.is_staggered(now) {
            return;
        }

        match unit.controller.mode() {
            UnitMode::Combat => self.update_combat(id, now),
            UnitMode::Scouting | UnitMode::Preparing => {
                if self.advance_motion(id) != Some(MotionStatus::Moving) {
                    if let Some(unit) = self.units.get_mut(id) {
                        unit.controller.set_manual(false);
                        unit.controller.transition(UnitMode::Idle);
                    }
                }
            }
            UnitMode::Victory { since } => {
                let duration = self.clock.ticks_for(self.config.timing.victory_duration);
                if now.saturating_sub(since) >= duration {
                    self.start_preparing(id);
                }
            }
            UnitMode::Idle | UnitMode::Dead => {}
        }
    }

    fn update_combat(&mut self, id: UnitId, now: Tick) {
        let cooldown = self.clock.ticks_for(self.config.combat.attack_cooldown);
        let ranges = CombatRanges {
            attack_range: self.config.combat.attack_range,
            detection_range: self.config.combat.detection_range,
        };

        let Some(unit) = self.units.get(id) else {
            return;
        };
        let position = unit.position;
        let target = unit
            .controller
            .target()
            .and_then(|t| self.units.get(t))
            .map(Unit::view);
        let step = plan_combat_step(position, target, unit.controller.cooldown_ready(now, cooldown), ranges);

        match step {
            CombatStep::Disengage => {
                if let Some(unit) = self.units.get_mut(id) {
                    unit.controller.transition(UnitMode::Idle);
                }
            }
            CombatStep::Wait => {
                if self.advance_motion(id) == Some(MotionStatus::Arrived) {
                    if let Some(unit) = self.units.get_mut(id) {
                        unit.controller.stop();
                    }
                }
            }
            CombatStep::Attack { target } => self.attack(id, target, now),
            CombatStep::Chase { destination } => self.chase(id, destination),
        }
    }

    fn attack(&mut self, id: UnitId, target: UnitId, now: Tick) {
        let stagger = self.clock.ticks_for(self.config.combat.stagger_duration);

        let Some(target_pos) = self.units.get(target).map(|t| t.position) else {
            return;
        };
        let Some(attacker) = self.units.get_mut(id) else {
            return;
        };
        attacker.facing = facing_toward(attacker.position, target_pos, attacker.facing);
        attacker.controller.stop();
        attacker.controller.record_attack(now);
        let output = attacker.state.damage_output;

        let Some(victim) = self.units.get_mut(target) else {
            return;
        };
        let Some(strike) = apply_strike(output, &mut victim.state) else {
            return;
        };
        if stagger > 0 {
            victim.controller.stagger(now + stagger);
        }
        let mut death = None;
        if strike.killed && victim.controller.mark_death_published() {
            victim.controller.transition(UnitMode::Dead);
            death = Some(SimEvent::UnitDeath {
                victim: target,
                killer: Some(id),
            });
        }

        tracing::debug!(
            attacker = %id,
            victim = %target,
            damage = strike.damage,
            remaining = strike.remaining_health,
            "Hit"
        );
        self.emit(SimEvent::UnitDamaged {
            attacker: id,
            victim: target,
            amount: strike.damage,
            remaining_health: strike.remaining_health,
        });

        if let Some(attacker) = self.units.get_mut(id) {
            attacker.state.record_hit(strike.damage);
            if strike.killed {
                attacker.state.record_kill();
                // Engagement ends with the target
                attacker.controller.transition(UnitMode::Idle);
            }
        }
        if let Some(death) = death {
            tracing::info!(victim = %target, killer = %id, "Unit died");
            self.emit(death);
        }
    }

    fn chase(&mut self, id: UnitId, destination: Vec2) {
        let repath = self.config.combat.repath_distance;
        let Some(unit) = self.units.get(id) else {
            return;
        };
        let position = unit.position;
        let stale = unit
            .controller
            .motion()
            .map_or(true, |m| m.goal().distance(destination) > repath);

        if stale {
            let path = self.gateway.path_to(position, destination);
            let Some(unit) = self.units.get_mut(id) else {
                return;
            };
            match path {
                Some(path) => {
                    unit.controller.start_motion(path);
                }
                // Hold position this tick
                None => unit.controller.stop(),
            }
        }

        if let Some(unit) = self.units.get_mut(id) {
            unit.facing = facing_toward(position, destination, unit.facing);
        }
        self.advance_motion(id);
    }

    /// Step the unit along its path. `None` if it has no active motion.
    fn advance_motion(&mut self, id: UnitId) -> Option<MotionStatus> {
        let dt = self.config.timing.tick_seconds();
        let threshold = self.config.combat.destination_reached_threshold;
        let unit = self.units.get_mut(id)?;
        let step = unit.state.movement_speed * dt;
        let start = unit.position;

        let mut position = start;
        let status = unit.controller.motion_mut()?.advance(&mut position, step, threshold);
        unit.position = position;
        unit.facing = facing_toward(start, position, unit.facing);
        if status == MotionStatus::Arrived {
            unit.controller.stop();
        }
        Some(status)
    }

    fn start_preparing(&mut self, id: UnitId) {
        let radius = self.config.combat.preparation_distance;
        let Some(position) = self.units.get(id).map(|u| u.position) else {
            return;
        };
        let path = self
            .gateway
            .random_point_near(position, radius, &mut self.rng)
            .and_then(|point| self.gateway.path_to(position, point));

        let Some(unit) = self.units.get_mut(id) else {
            return;
        };
        match path {
            Some(path) => {
                unit.controller.transition(UnitMode::Preparing);
                if !unit.controller.start_motion(path) {
                    unit.controller.transition(UnitMode::Idle);
                }
            }
            None => {
                unit.controller.transition(UnitMode::Idle);
            }
        }
    }
}

impl std::fmt::Debug for Battle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Battle")
            .field("tick", &self.clock.now())
            .field("round", &self.rounds.current())
            .field("units", &self.units.len())
            .field("pending_tasks", &self.scheduler.len())
            .field("game_over", &self.game_over)
            .finish_non_exhaustive()
    }
}
