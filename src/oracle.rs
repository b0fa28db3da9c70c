//! The boundary to the satisfiability engine. The crate does no search of its own.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use varisat::{Lit, Solver, Var};

use crate::theory::Theory;

/// Truth values for every variable of a [`Theory`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    /// Build from a solver model. Variables the model does not mention are false.
    pub fn from_model(var_count: usize, model: &[Lit]) -> Self {
        let mut values = vec![false; var_count];
        for lit in model {
            if let Some(value) = values.get_mut(lit.index()) {
                *value = lit.is_positive();
            }
        }
        Self { values }
    }

    pub(crate) fn from_values(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// [`None`] if `var` is not part of the assigned theory.
    pub fn value(&self, var: Var) -> Option<bool> {
        self.values.get(var.index()).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// What an oracle concluded about a theory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Satisfiable(Assignment),
    Unsatisfiable,
    /// Timed out, cancelled, or failed; worth retrying with a larger budget.
    Unknown(String),
}

/// Shared flag for cancelling a running solve from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Limits on how long an oracle may take.
///
/// A budget bounds how long the caller waits, not how long the oracle keeps working. See
/// [`VarisatOracle`] for what happens to an abandoned solve.
#[derive(Clone, Debug, Default)]
pub struct Budget {
    pub timeout: Option<Duration>,
    pub cancel: Option<CancelToken>,
}

impl Budget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn interrupted(&self, deadline: Option<Instant>) -> Option<String> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Some("cancelled".to_owned());
        }
        match deadline {
            Some(deadline) if Instant::now() >= deadline => Some(format!("timed out after {:?}", self.timeout.unwrap_or_default())),
            _ => None,
        }
    }
}

/// A satisfiability decision procedure.
pub trait TheoryOracle {
    /// Decide `theory`. Must return [`Verdict::Unknown`] rather than block past `budget`.
    ///
    /// Implementations that cannot interrupt their solver may keep computing after returning.
    fn solve(&self, theory: &Theory, budget: &Budget) -> Verdict;
}

/// Decides theories with [`varisat`] on a worker thread.
///
/// On timeout or cancellation the verdict is returned immediately. varisat cannot be interrupted,
/// so the worker keeps its CPU until the search ends and its result is then discarded. Repeated
/// timed-out solves on hard theories therefore pile up busy threads; [`running_workers`] reports
/// how many are still alive, shared across clones of the same oracle.
///
/// [`running_workers`]: VarisatOracle::running_workers
#[derive(Clone, Debug)]
pub struct VarisatOracle {
    poll_interval: Duration,
    workers: Arc<AtomicUsize>,
}

impl Default for VarisatOracle {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            workers: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// Counts a worker as running until dropped, panics included.
struct WorkerGuard(Arc<AtomicUsize>);

impl WorkerGuard {
    fn enter(workers: &Arc<AtomicUsize>) -> Self {
        workers.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(workers))
    }
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl VarisatOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// How often the budget is checked while the solver runs.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Worker threads of this oracle that have not finished, including abandoned ones.
    pub fn running_workers(&self) -> usize {
        self.workers.load(Ordering::SeqCst)
    }
}

impl TheoryOracle for VarisatOracle {
    fn solve(&self, theory: &Theory, budget: &Budget) -> Verdict {
        let deadline = budget.timeout.map(|timeout| Instant::now() + timeout);
        if let Some(reason) = budget.interrupted(deadline) {
            return Verdict::Unknown(reason);
        }

        let formula = theory.to_formula();
        let var_count = theory.var_count();
        debug!("handing {} clauses over {} variables to varisat", theory.len(), var_count);

        let (sender, receiver) = mpsc::channel();
        let started = Instant::now();
        let guard = WorkerGuard::enter(&self.workers);
        thread::spawn(move || {
            let mut solver = Solver::new();
            solver.add_formula(&formula);
            let verdict = match solver.solve() {
                Ok(true) => match solver.model() {
                    Some(model) => Verdict::Satisfiable(Assignment::from_model(var_count, &model)),
                    None => Verdict::Unknown("solver reported satisfiable without a model".to_owned()),
                },
                Ok(false) => Verdict::Unsatisfiable,
                Err(err) => Verdict::Unknown(err.to_string()),
            };
            drop(guard);
            // the receiver is gone if the caller gave up
            let _ = sender.send(verdict);
        });

        loop {
            match receiver.recv_timeout(self.poll_interval) {
                Ok(verdict) => {
                    info!("varisat finished in {:?}: {}", started.elapsed(), match &verdict {
                        Verdict::Satisfiable(_) => "satisfiable",
                        Verdict::Unsatisfiable => "unsatisfiable",
                        Verdict::Unknown(_) => "unknown",
                    });
                    return verdict;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if let Some(reason) = budget.interrupted(deadline) {
                        info!("abandoning varisat after {:?}: {}", started.elapsed(), reason);
                        return Verdict::Unknown(reason);
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    warn!("varisat worker exited without a verdict");
                    return Verdict::Unknown("solver thread panicked".to_owned());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use test_log::test;
    use varisat::Var;

    use crate::theory::Theory;

    use super::{Budget, CancelToken, TheoryOracle, VarisatOracle, Verdict};

    fn lit(i: usize, positive: bool) -> varisat::Lit {
        Var::from_index(i).lit(positive)
    }

    #[test]
    fn satisfiable() {
        let mut theory = Theory::new();
        theory.add_clause(vec![lit(0, true), lit(1, true)]);
        theory.add_clause(vec![lit(0, false), lit(1, true)]);

        match VarisatOracle::new().solve(&theory, &Budget::unlimited()) {
            Verdict::Satisfiable(assignment) => {
                assert_eq!(assignment.len(), 2);
                assert_eq!(assignment.value(Var::from_index(1)), Some(true));
                assert_eq!(assignment.value(Var::from_index(2)), None);
            }
            other => panic!("unexpected verdict {other:?}"),
        }
    }

    #[test]
    fn unsatisfiable() {
        let mut theory = Theory::new();
        theory.add_clause(vec![lit(0, true)]);
        theory.add_clause(vec![lit(0, false)]);

        assert_eq!(VarisatOracle::new().solve(&theory, &Budget::unlimited()), Verdict::Unsatisfiable);
    }

    #[test]
    fn cancelled_before_start() {
        let mut theory = Theory::new();
        theory.add_clause(vec![lit(0, true)]);
        let cancel = CancelToken::new();
        cancel.cancel();

        let verdict = VarisatOracle::new().solve(&theory, &Budget::unlimited().with_cancel(cancel));
        assert_eq!(verdict, Verdict::Unknown("cancelled".to_owned()));
    }

    #[test]
    fn zero_timeout_is_unknown() {
        let mut theory = Theory::new();
        theory.add_clause(vec![lit(0, true)]);

        let verdict = VarisatOracle::new().solve(&theory, &Budget::unlimited().with_timeout(Duration::ZERO));
        assert!(matches!(verdict, Verdict::Unknown(_)));
    }

    #[test]
    fn finished_workers_are_released() {
        let mut theory = Theory::new();
        theory.add_clause(vec![lit(0, true), lit(1, true)]);
        let oracle = VarisatOracle::new();
        let shared = oracle.clone();

        assert!(matches!(oracle.solve(&theory, &Budget::unlimited()), Verdict::Satisfiable(_)));
        assert_eq!(oracle.running_workers(), 0);

        // refused before any worker is spawned
        let verdict = oracle.solve(&theory, &Budget::unlimited().with_timeout(Duration::ZERO));
        assert!(matches!(verdict, Verdict::Unknown(_)));
        assert_eq!(shared.running_workers(), 0);
    }

    #[test]
    fn reserved_variables_are_assigned() {
        let mut theory = Theory::new();
        theory.add_clause(vec![lit(0, true)]);
        theory.reserve_vars(3);

        match VarisatOracle::new().solve(&theory, &Budget::unlimited()) {
            Verdict::Satisfiable(assignment) => {
                assert_eq!(assignment.len(), 3);
                assert_eq!(assignment.value(Var::from_index(0)), Some(true));
                assert!(assignment.value(Var::from_index(2)).is_some());
            }
            other => panic!("unexpected verdict {other:?}"),
        }
    }
}
