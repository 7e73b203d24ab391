//! # Composite Reaction Simulation
//!
//! ## Aim
//! Simulation of composite (multi-step) solid-state reactions under
//! linear heating. An ordered sequence of elementary steps, each with its
//! own Arrhenius pair and differential-form kinetic model, is combined
//! into one coupled ODE system in temperature and integrated with a stiff
//! implicit solver.
//!
//! ## Main Components
//! - `composite_rate_constants()`: Arrhenius rate constants A_k/b *
//!   exp(-E_k/(R*T)) per step, pure and stateless
//! - `CompositeStep` / `CompositeReactionScheme`: immutable description
//!   of the steps
//! - `composite_system()`: symbolic right-hand side of the coupled system
//!   over variables a0..a_{k-1} plus the total conversion (mean of the
//!   step rates)
//! - `CompositeReactionIVP`: integration driver with the usual workflow
//!   `new() -> set_problem() -> set_scheme() -> integrate()`
//!
//! ## Termination modes
//! - **Conversion-bound** (no final temperature): accumulate while the
//!   total conversion stays below 1; the step that crosses 1 is discarded,
//!   not appended.
//! - **Temperature-bound** (final temperature given): accumulate while
//!   the current temperature stays below it.
//!
//! Solver failure mid-run ends the loop early and returns whatever was
//! accumulated - a recoverable partial trajectory, not an error.
//!
//! ## Tips
//! - BDF is the default choice; high activation energies make the system
//!   stiff. RK45 is cheaper for shallow schemes.
//! - The integration advances in windows of `step_size` kelvin; window
//!   boundaries are the natural cancellation points.

use crate::Kinetics::errors::KineticsError;
use crate::Kinetics::kinetic_models::KineticModel;
use crate::Kinetics::temperature_integral::R_GAS;
use RustedSciThe::numerical::ODE_api2::{SolverParam, SolverType, UniversalODESolver};
use RustedSciThe::symbolic::symbolic_engine::Expr;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;

/// Rate constants of a composite non-isothermal scheme at one
/// temperature: A_k/rate * exp(-E_k/(R*T)) for every (A_k, E_k) pair.
pub fn composite_rate_constants(
    rate: f64,
    temp: f64,
    steps: &[(f64, f64)],
) -> Result<Vec<f64>, KineticsError> {
    if rate == 0.0 {
        return Err(KineticsError::singular(
            "heating rate of zero divides the rate constants".to_string(),
        ));
    }
    if !rate.is_finite() || rate < 0.0 {
        return Err(KineticsError::invalid(format!(
            "heating rate must be positive, got {}",
            rate
        )));
    }
    if !temp.is_finite() || temp <= 0.0 {
        return Err(KineticsError::invalid(format!(
            "temperature must be positive, got {}",
            temp
        )));
    }
    steps
        .iter()
        .enumerate()
        .map(|(k, (a_factor, e_a))| {
            if *a_factor <= 0.0 {
                return Err(KineticsError::invalid(format!(
                    "pre-exponential factor of step {} must be positive, got {}",
                    k, a_factor
                )));
            }
            if *e_a < 0.0 {
                return Err(KineticsError::invalid(format!(
                    "activation energy of step {} must be non-negative, got {}",
                    k, e_a
                )));
            }
            Ok(a_factor / rate * (-e_a / (R_GAS * temp)).exp())
        })
        .collect()
}

/// One elementary step of a composite scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeStep {
    /// Pre-exponential factor (1/time)
    pub a_factor: f64,
    /// Activation energy (J/mol)
    pub e_a: f64,
    /// Differential-form kinetic model of the step
    pub model: KineticModel,
}

/// Ordered sequence of elementary steps; immutable input of the
/// multi-step simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeReactionScheme {
    steps: Vec<CompositeStep>,
}

impl CompositeReactionScheme {
    pub fn new(steps: Vec<CompositeStep>) -> Result<Self, KineticsError> {
        if steps.is_empty() {
            return Err(KineticsError::invalid(
                "composite scheme must contain at least one step".to_string(),
            ));
        }
        for (k, step) in steps.iter().enumerate() {
            if !step.a_factor.is_finite() || step.a_factor <= 0.0 {
                return Err(KineticsError::invalid(format!(
                    "pre-exponential factor of step {} must be positive, got {}",
                    k, step.a_factor
                )));
            }
            if !step.e_a.is_finite() || step.e_a < 0.0 {
                return Err(KineticsError::invalid(format!(
                    "activation energy of step {} must be non-negative, got {}",
                    k, step.e_a
                )));
            }
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[CompositeStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Flat (A, Ea) pairs, the input format of `composite_rate_constants`.
    pub fn arrhenius_pairs(&self) -> Vec<(f64, f64)> {
        self.steps.iter().map(|s| (s.a_factor, s.e_a)).collect()
    }
}

/// Builds the symbolic right-hand side of a parallel composite scheme over
/// the temperature variable `T`.
///
/// State variables are a0..a_{k-1} (conversion of each step) and a_total;
/// each step evolves as da_k/dT = A_k/rate * exp(-E_k/(R*T)) * f_k(a_k)
/// and the total conversion accumulates the mean of the step rates.
/// Returns the equation system and the state-variable names, in matching
/// order.
pub fn composite_system(
    scheme: &CompositeReactionScheme,
    rate: f64,
) -> Result<(Vec<Expr>, Vec<String>), KineticsError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(KineticsError::invalid(format!(
            "heating rate must be positive, got {}",
            rate
        )));
    }
    let temp = Expr::Var("T".to_owned());
    let mut eq_system = Vec::with_capacity(scheme.len() + 1);
    let mut values = Vec::with_capacity(scheme.len() + 1);
    for (k, step) in scheme.steps().iter().enumerate() {
        let var = format!("a{}", k);
        let arrhenius = Expr::Const(step.a_factor / rate)
            * Expr::Exp(Box::new(
                -Expr::Const(step.e_a) / (Expr::Const(R_GAS) * temp.clone()),
            ));
        eq_system.push(arrhenius * step.model.differential_expr(&var));
        values.push(var);
    }
    let total = eq_system
        .iter()
        .skip(1)
        .cloned()
        .fold(eq_system[0].clone(), |acc, rhs| acc + rhs)
        / Expr::Const(scheme.len() as f64);
    eq_system.push(total);
    values.push("a_total".to_owned());
    Ok((eq_system, values))
}

/// Trajectory of a composite integration: temperatures visited and the
/// total conversion at each of them, aligned index for index.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeTrajectory {
    pub temperatures: Vec<f64>,
    pub conversions: Vec<f64>,
    /// false when the solver failed mid-run or the window guard tripped;
    /// the accumulated prefix of the trajectory is still valid
    pub complete: bool,
}

/// Integration driver for composite kinetic schemes.
///
/// # Usage Pattern
/// 1. `new()` - create with a solver type
/// 2. `set_problem()` - initial temperature, window size, optional final
///    temperature (its presence selects temperature-bound termination)
/// 3. `set_scheme()` - build the system from a `CompositeReactionScheme`,
///    or `set_system()` for a hand-written symbolic system whose last
///    state variable is the total conversion
/// 4. `integrate()` - run the window loop
pub struct CompositeReactionIVP {
    /// Numerical solver parameters (step size, tolerance, etc.)
    solver_params: HashMap<String, SolverParam>,
    /// Type of numerical solver to use
    solvertype: SolverType,
    /// Initial temperature [K]
    t_start: f64,
    /// Temperature window size [K]
    step_size: f64,
    /// Final temperature [K]; None selects conversion-bound termination
    t_end: Option<f64>,
    /// Right-hand side of the state system over "T"
    eq_system: Vec<Expr>,
    /// State variable names, last one is the total conversion
    values: Vec<String>,
    /// Guard against unbounded conversion-bound loops
    max_windows: usize,
}

impl CompositeReactionIVP {
    pub fn new(solvertype: SolverType) -> Self {
        let map_of_params = HashMap::from([
            ("step_size".to_owned(), SolverParam::Float(1e-3)),
            ("tolerance".to_owned(), SolverParam::Float(1e-6)),
            ("max_iterations".to_owned(), SolverParam::Int(100000)),
            ("rtol".to_owned(), SolverParam::Float(1e-6)),
            ("atol".to_owned(), SolverParam::Float(1e-8)),
            ("max_step".to_owned(), SolverParam::Float(0.1)),
            ("first_step".to_owned(), SolverParam::OptionalFloat(None)),
            ("vectorized".to_owned(), SolverParam::Bool(false)),
            ("jac_sparsity".to_owned(), SolverParam::OptionalMatrix(None)),
            ("parallel".to_owned(), SolverParam::Bool(false)),
        ]);
        Self {
            solver_params: map_of_params,
            solvertype,
            t_start: 0.0,
            step_size: 1.0,
            t_end: None,
            eq_system: Vec::new(),
            values: Vec::new(),
            max_windows: 100_000,
        }
    }

    pub fn set_solver_params(&mut self, params: HashMap<String, SolverParam>) {
        self.solver_params = params;
    }

    pub fn set_max_windows(&mut self, max_windows: usize) {
        self.max_windows = max_windows;
    }

    /// Sets the thermal program of the integration.
    ///
    /// # Arguments
    /// * `t_start` - Initial temperature [K] (must be > 0)
    /// * `step_size` - Temperature window [K] (must be > 0)
    /// * `t_end` - Optional final temperature [K]; must exceed `t_start`.
    ///   When given, integration is temperature-bound; when absent it runs
    ///   until the total conversion reaches 1.
    pub fn set_problem(
        &mut self,
        t_start: f64,
        step_size: f64,
        t_end: Option<f64>,
    ) -> Result<(), KineticsError> {
        if !t_start.is_finite() || t_start <= 0.0 {
            return Err(KineticsError::invalid(format!(
                "initial temperature must be positive, got {}",
                t_start
            )));
        }
        if !step_size.is_finite() || step_size <= 0.0 {
            return Err(KineticsError::invalid(format!(
                "temperature step must be positive, got {}",
                step_size
            )));
        }
        if let Some(t1) = t_end {
            if !t1.is_finite() || t1 <= t_start {
                return Err(KineticsError::invalid(format!(
                    "final temperature {} must exceed the initial temperature {}",
                    t1, t_start
                )));
            }
        }
        self.t_start = t_start;
        self.step_size = step_size;
        self.t_end = t_end;
        Ok(())
    }

    /// Builds the state system from a composite scheme under heating rate
    /// `rate`.
    pub fn set_scheme(
        &mut self,
        scheme: &CompositeReactionScheme,
        rate: f64,
    ) -> Result<(), KineticsError> {
        let (eq_system, values) = composite_system(scheme, rate)?;
        self.eq_system = eq_system;
        self.values = values;
        Ok(())
    }

    /// Installs a caller-supplied symbolic system. The last state variable
    /// must be the total conversion; it drives conversion-bound
    /// termination.
    pub fn set_system(
        &mut self,
        eq_system: Vec<Expr>,
        values: Vec<String>,
    ) -> Result<(), KineticsError> {
        if eq_system.is_empty() {
            return Err(KineticsError::invalid(
                "ODE system must not be empty".to_string(),
            ));
        }
        if eq_system.len() != values.len() {
            return Err(KineticsError::invalid(format!(
                "{} equations supplied for {} state variables",
                eq_system.len(),
                values.len()
            )));
        }
        self.eq_system = eq_system;
        self.values = values;
        Ok(())
    }

    /// Validates that the problem and the system are both set.
    pub fn check_task(&self) -> Result<(), KineticsError> {
        if self.t_start <= 0.0 {
            return Err(KineticsError::invalid(
                "initial temperature not set or invalid".to_string(),
            ));
        }
        if self.step_size <= 0.0 {
            return Err(KineticsError::invalid(
                "temperature step not set or invalid".to_string(),
            ));
        }
        if self.eq_system.is_empty() {
            return Err(KineticsError::invalid(
                "ODE system not set".to_string(),
            ));
        }
        Ok(())
    }

    /// Integrates the system forward in temperature windows.
    ///
    /// Each window runs the configured solver over [T, T + step_size] from
    /// the previous end state. A point is appended only while the active
    /// stopping predicate holds; the first point that violates it is
    /// discarded and the loop ends. Solver failure ends the loop early
    /// with the partial trajectory and `complete = false`.
    pub fn integrate(&self) -> Result<CompositeTrajectory, KineticsError> {
        self.check_task()?;
        let n_vars = self.values.len();
        // small non-zero initial conversion avoids the endpoint
        // singularities of the nucleation and diffusion models
        let mut state = DVector::from_element(n_vars, 1e-5);
        let mut t_current = self.t_start;
        let mut temperatures: Vec<f64> = Vec::new();
        let mut conversions: Vec<f64> = Vec::new();
        let mut complete = true;
        let mut windows = 0usize;

        loop {
            if windows >= self.max_windows {
                warn!(
                    "window guard of {} reached at T = {}, stopping with partial trajectory",
                    self.max_windows, t_current
                );
                complete = false;
                break;
            }
            windows += 1;
            let t_next = t_current + self.step_size;

            let mut ode = UniversalODESolver::new(
                self.eq_system.clone(),
                self.values.clone(),
                "T".to_owned(),
                self.solvertype.clone(),
                t_current,
                state.clone(),
                t_next,
            );
            ode.set_parameters(self.solver_params.clone());
            ode.initialize();
            ode.solve();

            let (_t_res, y_res) = ode.get_result();
            let new_state = match y_res.as_ref().and_then(|y| last_state(y, n_vars)) {
                Some(s) => s,
                None => {
                    warn!(
                        "solver returned no usable state at T = {}, stopping with partial trajectory",
                        t_next
                    );
                    complete = false;
                    break;
                }
            };
            if new_state.iter().any(|v| !v.is_finite()) {
                warn!(
                    "solver produced a non-finite state at T = {}, stopping with partial trajectory",
                    t_next
                );
                complete = false;
                break;
            }
            state = new_state;
            t_current = t_next;
            let total = state[n_vars - 1];
            debug!("T = {:.3}, total conversion = {:.6}", t_current, total);

            match self.t_end {
                // work until the total conversion reaches 1
                None => {
                    if total < 1.0 {
                        temperatures.push(t_current);
                        conversions.push(total);
                    } else {
                        break;
                    }
                }
                // work until the given final temperature (long graph style)
                Some(t1) => {
                    if t_current < t1 {
                        temperatures.push(t_current);
                        conversions.push(total);
                    } else {
                        break;
                    }
                }
            }
        }

        Ok(CompositeTrajectory {
            temperatures,
            conversions,
            complete,
        })
    }
}

/// Last integration point of the solver output. The solution matrix is
/// points x variables; the transposed layout is accepted as well.
fn last_state(y: &DMatrix<f64>, n_vars: usize) -> Option<DVector<f64>> {
    if y.nrows() == 0 || y.ncols() == 0 {
        return None;
    }
    if y.ncols() == n_vars {
        let vals: Vec<f64> = y.row(y.nrows() - 1).iter().copied().collect();
        Some(DVector::from_vec(vals))
    } else if y.nrows() == n_vars {
        Some(y.column(y.ncols() - 1).into_owned())
    } else {
        None
    }
}

/////////////////////////////////////////TESTS/////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rate_constants_reproduce_arrhenius_exactly() {
        let k = composite_rate_constants(1.0, 300.0, &[(1e8, 50_000.0)]).unwrap();
        assert_eq!(k.len(), 1);
        assert_eq!(k[0], 1e8 * (-50_000.0 / (8.314 * 300.0)).exp());
    }

    #[test]
    fn rate_constants_scale_with_heating_rate() {
        let steps = [(9e8, 58_500.0), (5e8, 125_400.0)];
        let k1 = composite_rate_constants(2.0, 450.0, &steps).unwrap();
        let k2 = composite_rate_constants(4.0, 450.0, &steps).unwrap();
        for (a, b) in k1.iter().zip(k2.iter()) {
            assert_relative_eq!(*a, 2.0 * b, max_relative = 1e-12);
        }
    }

    #[test]
    fn rate_constants_validate_input() {
        assert!(matches!(
            composite_rate_constants(0.0, 300.0, &[(1e8, 50_000.0)]),
            Err(KineticsError::NumericalSingularity(_))
        ));
        assert!(composite_rate_constants(1.0, -300.0, &[(1e8, 50_000.0)]).is_err());
        assert!(composite_rate_constants(1.0, 300.0, &[(0.0, 50_000.0)]).is_err());
    }

    #[test]
    fn scheme_validates_steps() {
        assert!(CompositeReactionScheme::new(vec![]).is_err());
        assert!(CompositeReactionScheme::new(vec![CompositeStep {
            a_factor: -1.0,
            e_a: 50_000.0,
            model: KineticModel::F1,
        }])
        .is_err());
        let scheme = CompositeReactionScheme::new(vec![CompositeStep {
            a_factor: 1e8,
            e_a: 50_000.0,
            model: KineticModel::F1,
        }])
        .unwrap();
        assert_eq!(scheme.arrhenius_pairs(), vec![(1e8, 50_000.0)]);
    }

    #[test]
    fn system_has_one_equation_per_step_plus_total() {
        let scheme = CompositeReactionScheme::new(vec![
            CompositeStep {
                a_factor: 1e8,
                e_a: 80_000.0,
                model: KineticModel::F1,
            },
            CompositeStep {
                a_factor: 5e8,
                e_a: 90_000.0,
                model: KineticModel::F1,
            },
        ])
        .unwrap();
        let (eq_system, values) = composite_system(&scheme, 10.0).unwrap();
        assert_eq!(eq_system.len(), 3);
        assert_eq!(values, vec!["a0", "a1", "a_total"]);
    }

    fn two_step_scheme() -> CompositeReactionScheme {
        CompositeReactionScheme::new(vec![
            CompositeStep {
                a_factor: 1e8,
                e_a: 80_000.0,
                model: KineticModel::F1,
            },
            CompositeStep {
                a_factor: 5e8,
                e_a: 90_000.0,
                model: KineticModel::F1,
            },
        ])
        .unwrap()
    }

    #[test]
    fn conversion_bound_mode_never_emits_conversion_of_one() {
        let scheme = two_step_scheme();
        let mut ivp = CompositeReactionIVP::new(SolverType::BDF);
        ivp.set_problem(400.0, 1.0, None).unwrap();
        ivp.set_scheme(&scheme, 10.0).unwrap();
        let trajectory = ivp.integrate().unwrap();
        assert!(trajectory.complete);
        assert!(!trajectory.conversions.is_empty());
        assert_eq!(trajectory.temperatures.len(), trajectory.conversions.len());
        for a in &trajectory.conversions {
            assert!(*a < 1.0, "conversion {} leaked past the bound", a);
        }
        // trajectory climbs in both coordinates
        for pair in trajectory.temperatures.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        for pair in trajectory.conversions.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn temperature_bound_mode_stops_strictly_below_final_temperature() {
        let scheme = two_step_scheme();
        let mut ivp = CompositeReactionIVP::new(SolverType::BDF);
        ivp.set_problem(400.0, 1.0, Some(450.5)).unwrap();
        ivp.set_scheme(&scheme, 10.0).unwrap();
        let trajectory = ivp.integrate().unwrap();
        assert!(trajectory.complete);
        assert!(!trajectory.temperatures.is_empty());
        let last = *trajectory.temperatures.last().unwrap();
        assert!(last < 450.5);
        assert_relative_eq!(trajectory.temperatures[0], 401.0, max_relative = 1e-12);
    }

    #[test]
    fn problem_validation() {
        let mut ivp = CompositeReactionIVP::new(SolverType::BDF);
        assert!(ivp.set_problem(-400.0, 1.0, None).is_err());
        assert!(ivp.set_problem(400.0, 0.0, None).is_err());
        assert!(ivp.set_problem(400.0, 1.0, Some(300.0)).is_err());
        assert!(ivp.set_problem(400.0, 1.0, Some(700.0)).is_ok());
        // integrating without a system is a configuration error
        assert!(ivp.integrate().is_err());
    }

    #[test]
    fn window_guard_returns_partial_trajectory() {
        let scheme = two_step_scheme();
        let mut ivp = CompositeReactionIVP::new(SolverType::BDF);
        ivp.set_problem(400.0, 1.0, None).unwrap();
        ivp.set_scheme(&scheme, 10.0).unwrap();
        ivp.set_max_windows(5);
        let trajectory = ivp.integrate().unwrap();
        assert!(!trajectory.complete);
        assert_eq!(trajectory.temperatures.len(), 5);
    }
}
