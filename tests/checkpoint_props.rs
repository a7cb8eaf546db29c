mod util;
use util::*;

use cht_adapter::adapter_error::AdapterError;
use cht_adapter::checkpoint::CheckpointManager;
use cht_adapter::solver::{AnalysisKind, HostSolver, SolverTime};
use proptest::prelude::*;

fn state_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e6f64..1.0e6, 4 * DOFS)
}

fn bits(v: &[f64]) -> Vec<u64> {
    v.iter().map(|x| x.to_bits()).collect()
}

proptest! {
    #[test]
    fn save_mutate_restore_is_bit_exact(
        saved in state_strategy(),
        mutated in state_strategy(),
        theta in 0.0f64..1.0,
        dtheta in 1.0e-6f64..1.0,
    ) {
        let mut solver = ToySolver::single_tet(AnalysisKind::Transient);
        solver.state = saved.clone();
        solver.time = SolverTime { theta, dtheta, period: 2.0 };
        let mut checkpoints = CheckpointManager::new();
        checkpoints.save(&solver, 3);

        solver.state = mutated;
        solver.time = SolverTime { theta: 0.5, dtheta: 0.25, period: 2.0 };
        checkpoints.restore(&mut solver, 3).unwrap();

        prop_assert_eq!(bits(solver.primary_state()), bits(&saved));
        prop_assert_eq!(solver.time().theta.to_bits(), theta.to_bits());
        prop_assert_eq!(solver.time().dtheta.to_bits(), dtheta.to_bits());
        prop_assert_eq!(solver.time().period, 2.0);
    }

    #[test]
    fn restore_is_idempotent(saved in state_strategy(), mutated in state_strategy()) {
        let mut solver = ToySolver::single_tet(AnalysisKind::Transient);
        solver.state = saved;
        let mut checkpoints = CheckpointManager::new();
        checkpoints.save(&solver, 1);

        solver.state = mutated.clone();
        checkpoints.restore(&mut solver, 1).unwrap();
        let once = bits(&solver.state);
        solver.state = mutated;
        checkpoints.restore(&mut solver, 1).unwrap();
        checkpoints.restore(&mut solver, 1).unwrap();
        prop_assert_eq!(bits(&solver.state), once);
    }

    #[test]
    fn snapshot_never_aliases_live_state(saved in state_strategy(), delta in 1.0f64..10.0) {
        let mut solver = ToySolver::single_tet(AnalysisKind::Transient);
        solver.state = saved.clone();
        let mut checkpoints = CheckpointManager::new();
        checkpoints.save(&solver, 1);
        for x in solver.primary_state_mut() {
            *x += delta;
        }
        let snap = checkpoints.snapshot().unwrap();
        prop_assert_eq!(bits(&snap.state), bits(&saved));
    }
}

#[test]
fn restore_without_snapshot_is_an_error() {
    let mut solver = ToySolver::single_tet(AnalysisKind::Transient);
    let mut checkpoints = CheckpointManager::new();
    assert_eq!(
        checkpoints.restore(&mut solver, 1),
        Err(AdapterError::CheckpointMissing { window: 1 })
    );
}

#[test]
fn snapshot_of_another_window_is_not_restored() {
    let mut solver = ToySolver::single_tet(AnalysisKind::Transient);
    let mut checkpoints = CheckpointManager::new();
    checkpoints.save(&solver, 1);
    checkpoints.save(&solver, 2);
    assert_eq!(checkpoints.saves(), 2);
    assert_eq!(checkpoints.snapshot().map(|s| s.window), Some(2));
    assert!(checkpoints.restore(&mut solver, 1).is_err());
    checkpoints.restore(&mut solver, 2).unwrap();
    checkpoints.clear();
    assert!(checkpoints.restore(&mut solver, 2).is_err());
}
