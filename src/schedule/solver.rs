use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use good_lp::{constraint, variable, Expression, ProblemVariables, Solution, SolverModel, Variable};

/// Outcome of a solve attempt, matching the status vocabulary `spec.md` §4.5
/// asks the solver adapter to report: `optimal` is the only status the LP
/// scheduler accepts; everything else falls through to the baseline
/// schedule.
#[derive(Debug, PartialEq, Eq)]
pub enum SolverStatus {
    Optimal,
    Infeasible,
    Unbounded,
    TimeLimit,
    Error,
}

/// Small adapter over `good_lp` isolating the rest of the scheduler from any
/// specific LP implementation (spec.md §9 "Solver interface" design note):
/// `add_variable`, `add_le_constraint`/`add_ge_constraint`/`add_eq_constraint`,
/// and `solve(time_limit) -> status` plus per-variable values. Variables are
/// continuous and non-negative by construction; `add_variable` additionally
/// accepts an upper bound.
pub struct LpProblem {
    vars: ProblemVariables,
    constraints: Vec<good_lp::Constraint>,
}

impl Default for LpProblem {
    fn default() -> Self {
        Self::new()
    }
}

impl LpProblem {
    pub fn new() -> Self {
        LpProblem {
            vars: ProblemVariables::new(),
            constraints: Vec::new(),
        }
    }

    pub fn add_variable(&mut self, upper_bound: f64) -> Variable {
        self.vars.add(variable().min(0.0).max(upper_bound))
    }

    pub fn add_le_constraint(&mut self, expr: Expression, rhs: f64) {
        self.constraints.push(constraint!(expr <= rhs));
    }

    pub fn add_ge_constraint(&mut self, expr: Expression, rhs: f64) {
        self.constraints.push(constraint!(expr >= rhs));
    }

    pub fn add_eq_constraint(&mut self, expr: Expression, rhs: f64) {
        self.constraints.push(constraint!(expr == rhs));
    }

    /// Solves the problem with a hard wall-clock time limit (spec.md §4.5:
    /// "60-second time limit"), returning the status plus the value of every
    /// `watch` variable. The solve runs on a worker thread so a solver that
    /// refuses to return inside `time_limit` is reported as `TimeLimit`
    /// rather than blocking the caller indefinitely; the worker thread is
    /// abandoned in that case (its result, if it ever arrives, is dropped).
    pub fn solve(self, objective: Expression, watch: Vec<Variable>, time_limit: Duration) -> (SolverStatus, HashMap<Variable, f64>) {
        let vars = self.vars;
        let constraints = self.constraints;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut model = vars.minimise(objective).using(good_lp::default_solver);
            for c in constraints {
                model = model.with(c);
            }
            let result = model.solve().map(|solution| {
                watch.iter().map(|v| (*v, solution.value(*v))).collect::<HashMap<_, _>>()
            });
            let _ = tx.send(result);
        });

        match rx.recv_timeout(time_limit) {
            Ok(Ok(values)) => (SolverStatus::Optimal, values),
            Ok(Err(good_lp::ResolutionError::Infeasible)) => (SolverStatus::Infeasible, HashMap::new()),
            Ok(Err(good_lp::ResolutionError::Unbounded)) => (SolverStatus::Unbounded, HashMap::new()),
            Ok(Err(_)) => (SolverStatus::Error, HashMap::new()),
            Err(_) => (SolverStatus::TimeLimit, HashMap::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_equality() {
        assert_eq!(SolverStatus::Optimal, SolverStatus::Optimal);
        assert_ne!(SolverStatus::Optimal, SolverStatus::Infeasible);
    }

    #[test]
    fn solves_trivial_problem() {
        let mut problem = LpProblem::new();
        let x = problem.add_variable(10.0);
        problem.add_ge_constraint(Expression::from(x), 3.0);
        let (status, values) = problem.solve(Expression::from(x), vec![x], Duration::from_secs(5));
        assert_eq!(status, SolverStatus::Optimal);
        assert!((values[&x] - 3.0).abs() < 1e-6);
    }
}
