//! Step-size negotiation between host solver and middleware.
//!
//! The host works in normalized step time: `theta` is the completed fraction
//! of its step period, `dtheta` the fraction of the next increment. The
//! middleware hands out physical step sizes. A step passed to `advance`
//! never exceeds the negotiated one.

use crate::solver::{AnalysisKind, SolverTime};

const FRACTION_EPS: f64 = 1e-12;

/// What bounded the planned increment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepLimit {
    /// Fixed steady-state increment.
    SteadyState,
    /// The solver's own increment.
    Solver,
    /// The negotiated coupling step.
    Coupling,
    /// The end of the host step period.
    StepEnd,
}

/// Increment chosen for the next sub-iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepPlan {
    /// Completed fraction the increment starts from.
    pub theta: f64,
    /// Normalized increment.
    pub dtheta: f64,
    /// Host step period.
    pub period: f64,
    /// Physical step passed to `advance`.
    pub solver_dt: f64,
    /// Binding bound.
    pub limit: StepLimit,
}

impl StepPlan {
    /// Time state the solver should run with.
    pub fn time(&self) -> SolverTime {
        SolverTime {
            theta: self.theta,
            dtheta: self.dtheta,
            period: self.period,
        }
    }
}

/// Steady/transient step policy with optional subcycling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeStepPolicy {
    analysis: AnalysisKind,
    subcycling: bool,
}

impl TimeStepPolicy {
    /// Policy for `analysis`; `subcycling` keeps solver steps below the coupling step.
    pub fn new(analysis: AnalysisKind, subcycling: bool) -> Self {
        Self {
            analysis,
            subcycling,
        }
    }

    /// Analysis procedure.
    pub fn analysis(&self) -> AnalysisKind {
        self.analysis
    }

    /// True when the host step period has no room for another increment.
    pub fn step_complete(&self, time: &SolverTime) -> bool {
        match self.analysis {
            AnalysisKind::SteadyState => false,
            AnalysisKind::Transient => 1.0 - time.theta <= FRACTION_EPS,
        }
    }

    /// Plans the next increment.
    ///
    /// `preferred` is the solver's normalized increment, `negotiated` the
    /// physical step the middleware allows.
    pub fn plan(&self, time: &SolverTime, preferred: f64, negotiated: f64) -> StepPlan {
        match self.analysis {
            AnalysisKind::SteadyState => {
                if (negotiated - 1.0).abs() > FRACTION_EPS {
                    log::warn!(
                        "steady-state analysis advances by 1, coupling step is {negotiated}"
                    );
                }
                StepPlan {
                    theta: 0.0,
                    dtheta: 1.0,
                    period: 1.0,
                    solver_dt: 1.0,
                    limit: StepLimit::SteadyState,
                }
            }
            AnalysisKind::Transient => self.plan_transient(time, preferred, negotiated),
        }
    }

    fn plan_transient(&self, time: &SolverTime, preferred: f64, negotiated: f64) -> StepPlan {
        let coupling = negotiated / time.period;
        let (mut dtheta, mut limit) = if preferred > coupling + FRACTION_EPS {
            log::info!(
                "solver increment {:.6e} reduced to the coupling step {negotiated:.6e}",
                preferred * time.period
            );
            (coupling, StepLimit::Coupling)
        } else if preferred < coupling - FRACTION_EPS {
            if self.subcycling {
                (preferred, StepLimit::Solver)
            } else {
                log::warn!(
                    "solver increment {:.6e} is smaller than the coupling step {negotiated:.6e} \
                     but subcycling is disabled; using the coupling step",
                    preferred * time.period
                );
                (coupling, StepLimit::Coupling)
            }
        } else {
            (coupling.min(preferred), StepLimit::Coupling)
        };
        let left = 1.0 - time.theta;
        if dtheta > left {
            dtheta = left;
            limit = StepLimit::StepEnd;
        }
        StepPlan {
            theta: time.theta,
            dtheta,
            period: time.period,
            solver_dt: dtheta * time.period,
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(period: f64) -> SolverTime {
        SolverTime::new(period, 0.0)
    }

    #[test]
    fn coupling_step_bounds_a_larger_solver_step() {
        let policy = TimeStepPolicy::new(AnalysisKind::Transient, true);
        let plan = policy.plan(&start(1.0), 0.05, 0.02);
        assert!((plan.dtheta - 0.02).abs() < 1e-15);
        assert!((plan.solver_dt - 0.02).abs() < 1e-15);
        assert_eq!(plan.limit, StepLimit::Coupling);
    }

    #[test]
    fn normalized_step_scales_with_period() {
        let policy = TimeStepPolicy::new(AnalysisKind::Transient, true);
        let plan = policy.plan(&start(10.0), 0.05, 0.2);
        assert!((plan.dtheta - 0.02).abs() < 1e-15);
        assert!((plan.solver_dt - 0.2).abs() < 1e-12);
    }

    #[test]
    fn subcycling_keeps_smaller_solver_step() {
        let on = TimeStepPolicy::new(AnalysisKind::Transient, true);
        let off = TimeStepPolicy::new(AnalysisKind::Transient, false);
        let t = start(1.0);
        assert_eq!(on.plan(&t, 0.01, 0.02).limit, StepLimit::Solver);
        assert!((on.plan(&t, 0.01, 0.02).solver_dt - 0.01).abs() < 1e-15);
        assert!((off.plan(&t, 0.01, 0.02).solver_dt - 0.02).abs() < 1e-15);
    }

    #[test]
    fn step_end_caps_the_increment() {
        let policy = TimeStepPolicy::new(AnalysisKind::Transient, true);
        let t = SolverTime {
            theta: 0.99,
            dtheta: 0.02,
            period: 1.0,
        };
        let plan = policy.plan(&t, 0.05, 0.02);
        assert_eq!(plan.limit, StepLimit::StepEnd);
        assert!((plan.dtheta - 0.01).abs() < 1e-12);
        assert!(!policy.step_complete(&t));
    }

    #[test]
    fn steady_state_takes_one_unit_step() {
        let policy = TimeStepPolicy::new(AnalysisKind::SteadyState, true);
        let plan = policy.plan(&start(3.0), 0.1, 1.0);
        assert_eq!(plan.dtheta, 1.0);
        assert_eq!(plan.theta, 0.0);
        assert_eq!(plan.period, 1.0);
        assert_eq!(plan.solver_dt, 1.0);
    }
}
