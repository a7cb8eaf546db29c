//! The coupling loop.

use crate::adapter_error::AdapterError;
use crate::checkpoint::CheckpointManager;
use crate::config::AdapterConfig;
use crate::middleware::{Action, CouplingMiddleware};
use crate::registry::Registry;
use crate::solver::{HostSolver, IncrementInfo, SolverTime};

use super::report::RunSummary;
use super::state::{CouplingState, IterationOutcome};
use super::time_step::{StepPlan, TimeStepPolicy};

/// Counters at the start of the open coupling window, restored with it.
#[derive(Clone, Copy, Debug, Default)]
struct WindowStart {
    increment: usize,
    accepted: usize,
}

/// Drives host solver and middleware through implicit partitioned coupling.
#[derive(Debug)]
pub struct CouplingOrchestrator<S, M> {
    solver: S,
    middleware: M,
    registry: Registry,
    checkpoints: CheckpointManager,
    policy: TimeStepPolicy,
    output_interval: usize,
    state: CouplingState,
    initialized: bool,
    negotiated: f64,
    increment: usize,
    attempt: usize,
    accepted: usize,
    sub_iterations: usize,
    rejected: usize,
    /// Accepted increments at the last solver output.
    output_mark: usize,
    /// Coupling windows opened with a checkpoint so far.
    window: usize,
    window_start: WindowStart,
    /// A checkpointed window is open and its increments are still tentative.
    window_open: bool,
}

impl<S: HostSolver, M: CouplingMiddleware> CouplingOrchestrator<S, M> {
    /// Builds the registry (regions, meshes, channels) for `config`.
    pub fn new(config: &AdapterConfig, solver: S, mut middleware: M) -> Result<Self, AdapterError> {
        let registry = Registry::build(config, &solver, &mut middleware)?;
        let policy = TimeStepPolicy::new(solver.analysis(), config.subcycling);
        Ok(Self {
            solver,
            middleware,
            registry,
            checkpoints: CheckpointManager::new(),
            policy,
            output_interval: config.output_interval,
            state: CouplingState::AwaitingStep,
            initialized: false,
            negotiated: 0.0,
            increment: 0,
            attempt: 0,
            accepted: 0,
            sub_iterations: 0,
            rejected: 0,
            output_mark: 0,
            window: 0,
            window_start: WindowStart::default(),
            window_open: false,
        })
    }

    /// Host solver.
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Mutable host solver.
    pub fn solver_mut(&mut self) -> &mut S {
        &mut self.solver
    }

    /// Middleware.
    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    /// Mutable middleware.
    pub fn middleware_mut(&mut self) -> &mut M {
        &mut self.middleware
    }

    /// Interfaces.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Checkpoint owner.
    pub fn checkpoints(&self) -> &CheckpointManager {
        &self.checkpoints
    }

    /// Current state.
    pub fn state(&self) -> CouplingState {
        self.state
    }

    /// Step size last handed out by the middleware.
    pub fn negotiated_step(&self) -> f64 {
        self.negotiated
    }

    /// Current increment number (1-based, 0 before the first step).
    pub fn increment(&self) -> usize {
        self.increment
    }

    /// Coupling windows opened with a checkpoint so far.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Hands back solver and middleware.
    pub fn into_parts(self) -> (S, M) {
        (self.solver, self.middleware)
    }

    /// Starts coupling and exchanges initial data.
    pub fn initialize(&mut self) -> Result<(), AdapterError> {
        if self.initialized {
            return Err(AdapterError::Middleware("coupling already initialized".into()));
        }
        self.negotiated = self.middleware.initialize()?;
        if self.middleware.is_action_required(Action::WriteInitialData) {
            self.registry.write_all(&self.solver, &mut self.middleware)?;
            self.middleware.fulfilled_action(Action::WriteInitialData)?;
        }
        self.middleware.initialize_data()?;
        if self.middleware.is_read_data_available() {
            self.registry.read_all(&mut self.solver, &mut self.middleware)?;
        }
        self.initialized = true;
        self.state = CouplingState::AwaitingStep;
        log::info!(
            "coupling initialized for `{}`, first coupling step {:.6e}",
            self.registry.participant(),
            self.negotiated
        );
        Ok(())
    }

    /// True while the middleware has windows left and the host step has room.
    pub fn is_ongoing(&self) -> bool {
        !self.state.is_terminal() && self.middleware.is_coupling_ongoing()
    }

    fn open_step(&mut self) -> Result<StepPlan, AdapterError> {
        let max = self.solver.max_increments();
        if self.increment >= max {
            return Err(AdapterError::MaxIncrementsExceeded(max));
        }
        self.increment += 1;
        let plan = self.policy.plan(
            &self.solver.time(),
            self.solver.preferred_increment(),
            self.negotiated,
        );
        self.solver.set_time(plan.time());
        if self
            .middleware
            .is_action_required(Action::WriteIterationCheckpoint)
        {
            self.window += 1;
            self.window_start = WindowStart {
                increment: self.increment - 1,
                accepted: self.accepted,
            };
            self.window_open = true;
            self.attempt = 1;
            self.checkpoints.save(&self.solver, self.window);
            self.middleware
                .fulfilled_action(Action::WriteIterationCheckpoint)?;
        } else if !self.window_open {
            self.attempt = 1;
        }
        Ok(plan)
    }

    /// Rewinds solver and counters to the start of the rejected window.
    fn repeat_step(&mut self) -> Result<StepPlan, AdapterError> {
        self.checkpoints.restore(&mut self.solver, self.window)?;
        self.increment = self.window_start.increment + 1;
        self.accepted = self.window_start.accepted;
        self.attempt += 1;
        let plan = self.policy.plan(
            &self.solver.time(),
            self.solver.preferred_increment(),
            self.negotiated,
        );
        self.solver.set_time(plan.time());
        Ok(plan)
    }

    /// True once the middleware has moved past the current window.
    fn window_complete(&self) -> bool {
        !self.window_open
            || self
                .middleware
                .is_action_required(Action::WriteIterationCheckpoint)
            || !self.middleware.is_coupling_ongoing()
    }

    /// One outer pass: one sub-iteration of the current or a new step.
    pub fn step(&mut self) -> Result<IterationOutcome, AdapterError> {
        if !self.initialized {
            return Err(AdapterError::Middleware("coupling not initialized".into()));
        }
        let plan = if self.state.opens_step() {
            self.open_step()?
        } else {
            self.repeat_step()?
        };
        self.sub_iterations += 1;
        self.state = CouplingState::Iterating;
        log::info!(
            "increment {} attempt {}: increment size {:.6e}, sum of previous increments {:.6e}, \
             actual step time {:.6e}",
            self.increment,
            self.attempt,
            plan.solver_dt,
            plan.theta * plan.period,
            plan.time().end_of_increment()
        );

        if self.middleware.is_read_data_available() {
            self.registry.read_all(&mut self.solver, &mut self.middleware)?;
        }
        let info = IncrementInfo {
            increment: self.increment,
            attempt: self.attempt,
            time: plan.time(),
        };
        self.solver
            .solve_increment(&info)
            .map_err(|e| AdapterError::Divergence {
                increment: self.increment,
                attempt: self.attempt,
                reason: e.reason,
            })?;
        if self.middleware.is_write_data_required(plan.solver_dt) {
            self.registry.write_all(&self.solver, &mut self.middleware)?;
        }
        self.negotiated = self.middleware.advance(plan.solver_dt)?;

        if self
            .middleware
            .is_action_required(Action::ReadIterationCheckpoint)
        {
            self.middleware
                .fulfilled_action(Action::ReadIterationCheckpoint)?;
            self.rejected += 1;
            log::debug!(
                "increment {} attempt {} not converged, repeating",
                self.increment,
                self.attempt
            );
            return Ok(IterationOutcome::Rejected);
        }

        self.solver.set_time(SolverTime {
            theta: plan.theta + plan.dtheta,
            ..plan.time()
        });
        self.accepted += 1;
        self.state = CouplingState::Converged;
        // increments of an open window may still be rolled back
        if self.window_complete() {
            self.window_open = false;
            let due = self.accepted - self.output_mark;
            if self.output_interval > 0 && due >= self.output_interval {
                self.solver.write_output(self.increment)?;
                self.output_mark = self.accepted;
            }
        }
        Ok(IterationOutcome::Accepted)
    }

    /// Flushes pending output, releases interfaces and finalizes the middleware.
    pub fn finalize(&mut self) -> Result<(), AdapterError> {
        if self.state.is_terminal() {
            return Ok(());
        }
        if self.accepted > self.output_mark {
            self.solver.write_output(self.increment)?;
            self.output_mark = self.accepted;
        }
        self.registry.release();
        self.checkpoints.clear();
        self.middleware.finalize()?;
        self.state = CouplingState::Finished;
        log::info!("coupling finalized: {}", self.summary());
        Ok(())
    }

    /// Counters so far.
    pub fn summary(&self) -> RunSummary {
        let time = self.solver.time();
        RunSummary {
            accepted_increments: self.accepted,
            sub_iterations: self.sub_iterations,
            rejected_iterations: self.rejected,
            final_theta: time.theta,
            final_time: time.elapsed(),
            state: self.state,
        }
    }

    fn run_inner(&mut self) -> Result<(), AdapterError> {
        if !self.initialized {
            self.initialize()?;
        }
        while self.is_ongoing() {
            if self.state.opens_step() && self.policy.step_complete(&self.solver.time()) {
                log::warn!(
                    "host step complete after increment {} while coupling is still ongoing",
                    self.increment
                );
                break;
            }
            self.step()?;
        }
        self.finalize()
    }

    /// Runs the coupling loop to completion.
    ///
    /// # Errors
    /// Configuration and divergence errors abort the run after the
    /// increment state is logged and solver output is flushed.
    pub fn run(&mut self) -> Result<RunSummary, AdapterError> {
        match self.run_inner() {
            Ok(()) => Ok(self.summary()),
            Err(err) => {
                log::error!("{err}");
                let time = self.solver.time();
                log::error!(
                    "increment {} attempt {}: theta {:.6e}, dtheta {:.6e}, step period {:.6e}",
                    self.increment,
                    self.attempt,
                    time.theta,
                    time.dtheta,
                    time.period
                );
                if let Err(out) = self.solver.write_output(self.increment) {
                    log::error!("writing output after failure: {out}");
                }
                Err(err)
            }
        }
    }
}
