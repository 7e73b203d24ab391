//! # Nonlinear Isoconversional Method (Vyazovkin)
//!
//! ## Aim
//! Model-free activation-energy estimation that avoids the linearization
//! bias of the regression methods. For every conversion-grid index n the
//! scalar Ea minimizing
//!
//! ```text
//! Phi(Ea) = sum over ordered pairs (i, j), i != j, of
//!           [ b_j * I(Ea, T_i[n]) ] / [ b_i * I(Ea, T_j[n]) ]
//! ```
//!
//! is sought with a derivative-free minimizer. In the linear-heating
//! variant I is the Senum-Yang temperature integral approximation; in the
//! isothermal variant the b factors drop out and I is replaced by the
//! quadrature of the isothermal time kernel over [0, t_i[n]].
//!
//! ## Behavior
//! - One independent minimization per grid index, seeded from the
//!   caller-supplied initial guesses (typically a linear method's
//!   profile); the indices run on the rayon pool and results are
//!   assembled in grid order.
//! - Non-convergence at one index is captured in that index's estimate
//!   and never aborts the remaining indices.
//! - Unrecognized variant or optimizer names are configuration errors,
//!   not silent fallbacks.
//! - When all experiments share the same heating rate or temperature the
//!   ratio terms degenerate toward 1 and the objective surface is flat:
//!   such a design cannot distinguish activation energies. This is a
//!   property of the input, not a failure of the method.
//!
//! An optional trace callback observes every objective evaluation
//! (grid index, trial Ea, objective value); `log::debug!` records the
//! same data.

use crate::Kinetics::errors::KineticsError;
use crate::Kinetics::experiments::ExperimentSet;
use crate::Kinetics::temperature_integral::{adaptive_simpson, senum_yang, time_kernel, R_GAS};
use argmin::core::{
    CostFunction, Error as ArgminError, Executor, State, TerminationReason, TerminationStatus,
};
use argmin::solver::goldensectionsearch::GoldenSectionSearch;
use argmin::solver::neldermead::NelderMead;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Callback observing every objective evaluation: (grid index, trial Ea,
/// objective value).
pub type ObjectiveTrace<'a> = &'a (dyn Fn(usize, f64, f64) + Sync);

/// Variant of the pairwise objective.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VyazovkinKind {
    /// Linear heating, Senum-Yang temperature integrals
    LinearHeating,
    /// Isothermal, quadrature of the time kernel
    Isothermal,
}

impl FromStr for VyazovkinKind {
    type Err = KineticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // "First" is the historical name of the linear-heating variant
            "First" | "LinearHeating" => Ok(VyazovkinKind::LinearHeating),
            "Isothermal" => Ok(VyazovkinKind::Isothermal),
            other => Err(KineticsError::invalid(format!(
                "unknown Vyazovkin variant '{}'",
                other
            ))),
        }
    }
}

/// Derivative-free minimizer selection.
#[derive(Debug, Clone, Copy, PartialEq)]
enum OptimizerKind {
    NelderMead,
    GoldenSection,
}

impl FromStr for OptimizerKind {
    type Err = KineticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NelderMead" | "Nelder-Mead" => Ok(OptimizerKind::NelderMead),
            "GoldenSection" => Ok(OptimizerKind::GoldenSection),
            other => Err(KineticsError::invalid(format!(
                "unknown optimizer '{}'",
                other
            ))),
        }
    }
}

/// Per-grid-index result of the nonlinear estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VyazovkinEstimate {
    /// Converged activation energy (J/mol); NaN when the minimizer failed
    pub activation_energy: f64,
    /// Objective value at the reported activation energy
    pub objective: f64,
    /// Whether the minimizer reported convergence
    pub converged: bool,
    /// Iterations spent by the minimizer
    pub iterations: u64,
    /// Termination description of the minimizer
    pub message: String,
}

/// Pairwise ratio-sum objective at one grid index and trial Ea.
///
/// The summation runs over ordered pairs of experiment indices and its
/// value does not depend on the order of experiments in the set.
pub fn vyazovkin_objective(
    set: &ExperimentSet,
    index: usize,
    e_a: f64,
    kind: VyazovkinKind,
) -> Result<f64, KineticsError> {
    if index >= set.grid().len() {
        return Err(KineticsError::invalid(format!(
            "grid index {} out of range, grid has {} points",
            index,
            set.grid().len()
        )));
    }
    let m = set.len();
    match kind {
        VyazovkinKind::LinearHeating => {
            let rates = set.heating_rates()?;
            let mut integrals = Vec::with_capacity(m);
            for i in 0..m {
                let x = e_a / (R_GAS * set.series(i)[index]);
                integrals.push(senum_yang(x)?);
            }
            let mut total = 0.0;
            for i in 0..m {
                for j in 0..m {
                    if i == j {
                        continue;
                    }
                    total += (rates[j] * integrals[i]) / (rates[i] * integrals[j]);
                }
            }
            Ok(total)
        }
        VyazovkinKind::Isothermal => {
            let temps = set.temperatures()?;
            let mut integrals = Vec::with_capacity(m);
            for i in 0..m {
                let t_end = set.series(i)[index];
                let j_i = adaptive_simpson(&|t| time_kernel(t, e_a, temps[i]), 0.0, t_end, 1e-10);
                if j_i == 0.0 {
                    return Err(KineticsError::singular(format!(
                        "isothermal time integral vanished for experiment {}",
                        i
                    )));
                }
                integrals.push(j_i);
            }
            let mut total = 0.0;
            for i in 0..m {
                for j in 0..m {
                    if i == j {
                        continue;
                    }
                    total += integrals[i] / integrals[j];
                }
            }
            Ok(total)
        }
    }
}

struct VyazovkinCost<'a> {
    set: &'a ExperimentSet,
    index: usize,
    kind: VyazovkinKind,
    trace: Option<ObjectiveTrace<'a>>,
}

impl VyazovkinCost<'_> {
    fn evaluate(&self, e_a: f64) -> Result<f64, ArgminError> {
        let value = vyazovkin_objective(self.set, self.index, e_a, self.kind)?;
        if let Some(trace) = self.trace {
            trace(self.index, e_a, value);
        }
        debug!(
            "vyazovkin index {}: Ea = {:.4e}, objective = {:.6e}",
            self.index, e_a, value
        );
        Ok(value)
    }
}

impl CostFunction for VyazovkinCost<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, ArgminError> {
        self.evaluate(param[0])
    }
}

struct VyazovkinCostScalar<'a>(VyazovkinCost<'a>);

impl CostFunction for VyazovkinCostScalar<'_> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, ArgminError> {
        self.0.evaluate(*param)
    }
}

/// Nonlinear isoconversional method (Vyazovkin's method).
///
/// `initial_guesses` supplies one seed Ea per conversion-grid index, e.g.
/// the profile obtained from a linear method. `kind` selects the variant
/// (`"First"`/`"LinearHeating"` or `"Isothermal"`), `optimizer` the
/// derivative-free minimizer (`"NelderMead"` or `"GoldenSection"`).
pub fn nonlinear(
    set: &ExperimentSet,
    initial_guesses: &[f64],
    kind: &str,
    optimizer: &str,
    trace: Option<ObjectiveTrace<'_>>,
) -> Result<Vec<VyazovkinEstimate>, KineticsError> {
    let kind = VyazovkinKind::from_str(kind)?;
    let optimizer = OptimizerKind::from_str(optimizer)?;
    match kind {
        VyazovkinKind::LinearHeating if set.is_isothermal() => {
            return Err(KineticsError::invalid(
                "linear-heating variant requires a linear-heating experiment set".to_string(),
            ));
        }
        VyazovkinKind::Isothermal if !set.is_isothermal() => {
            return Err(KineticsError::invalid(
                "isothermal variant requires an isothermal experiment set".to_string(),
            ));
        }
        _ => {}
    }
    if set.len() < 2 {
        return Err(KineticsError::singular(format!(
            "pairwise summation requires at least 2 experiments, got {}",
            set.len()
        )));
    }
    if initial_guesses.len() != set.grid().len() {
        return Err(KineticsError::invalid(format!(
            "{} initial guesses supplied for a grid of {} points",
            initial_guesses.len(),
            set.grid().len()
        )));
    }
    for (n, seed) in initial_guesses.iter().enumerate() {
        if !seed.is_finite() || *seed <= 0.0 {
            return Err(KineticsError::invalid(format!(
                "initial guess at index {} must be positive, got {}",
                n, seed
            )));
        }
    }
    let estimates = (0..set.grid().len())
        .into_par_iter()
        .map(|n| minimize_index(set, n, initial_guesses[n], kind, optimizer, trace))
        .collect();
    Ok(estimates)
}

fn minimize_index(
    set: &ExperimentSet,
    index: usize,
    seed: f64,
    kind: VyazovkinKind,
    optimizer: OptimizerKind,
    trace: Option<ObjectiveTrace<'_>>,
) -> VyazovkinEstimate {
    let cost = VyazovkinCost {
        set,
        index,
        kind,
        trace,
    };
    let outcome = match optimizer {
        OptimizerKind::NelderMead => run_nelder_mead(cost, seed),
        OptimizerKind::GoldenSection => run_golden_section(cost, seed),
    };
    outcome.unwrap_or_else(|e| VyazovkinEstimate {
        activation_energy: f64::NAN,
        objective: f64::NAN,
        converged: false,
        iterations: 0,
        message: format!("minimization failed: {}", e),
    })
}

fn run_nelder_mead(
    cost: VyazovkinCost<'_>,
    seed: f64,
) -> Result<VyazovkinEstimate, ArgminError> {
    let simplex = vec![vec![seed], vec![seed * 1.05]];
    let solver = NelderMead::new(simplex).with_sd_tolerance(1e-10)?;
    let res = Executor::new(cost, solver)
        .configure(|state| state.max_iters(500))
        .run()?;
    let state = res.state();
    let best = state
        .get_best_param()
        .map(|p| p[0])
        .unwrap_or(f64::NAN);
    Ok(VyazovkinEstimate {
        activation_energy: best,
        objective: state.get_best_cost(),
        converged: matches!(
            state.get_termination_status(),
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        ),
        iterations: state.get_iter(),
        message: format!("{}", state.get_termination_status()),
    })
}

fn run_golden_section(
    cost: VyazovkinCost<'_>,
    seed: f64,
) -> Result<VyazovkinEstimate, ArgminError> {
    let cost = VyazovkinCostScalar(cost);
    let solver = GoldenSectionSearch::new(seed / 3.0, seed * 3.0)?.with_tolerance(1e-6)?;
    let res = Executor::new(cost, solver)
        .configure(|state| state.param(seed).max_iters(500))
        .run()?;
    let state = res.state();
    let best = state.get_best_param().copied().unwrap_or(f64::NAN);
    Ok(VyazovkinEstimate {
        activation_energy: best,
        objective: state.get_best_cost(),
        converged: matches!(
            state.get_termination_status(),
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        ),
        iterations: state.get_iter(),
        message: format!("{}", state.get_termination_status()),
    })
}
