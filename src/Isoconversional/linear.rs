//! # Linear Isoconversional Methods
//!
//! ## Aim
//! Recover an activation-energy profile Ea(a) from a set of experiments
//! by ordinary least squares, one regression per conversion-grid index.
//!
//! ## Methods
//! - `ii_standard()`: isothermal, integral. Per grid index n the points
//!   are y_i = -ln(t_i[n]) against x_i = 1/T_i; Ea = -slope*R.
//! - `ni_ofw()`: non-isothermal, integral (Ozawa-Flynn-Wall). Per grid
//!   index n the points are y_i = ln(b_i) against x_i = 1/T_i[n];
//!   Ea = -slope*R/0.457 (Doyle's approximation baked into the method).
//!
//! Both methods also exist as `*_lazy` iterator producers; the plain
//! functions materialize them through `Utils::sequence::collect_lazy`.
//! Estimates are recomputed on every call, nothing is cached.
//!
//! ## Preconditions
//! At least two experiments with distinct x-values per regression;
//! anything less is a `NumericalSingularity` (zero variance in x), raised
//! immediately rather than reported as a degenerate slope.

use crate::Kinetics::errors::KineticsError;
use crate::Kinetics::experiments::ExperimentSet;
use crate::Kinetics::temperature_integral::R_GAS;
use crate::Utils::sequence::collect_lazy;
use log::debug;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Doyle approximation correction of the Ozawa-Flynn-Wall slope
const DOYLE_CORRECTION: f64 = 0.457;

/// Per-grid-index result of a linear isoconversional regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearEstimate {
    /// Activation energy (J/mol) derived from the regression slope
    pub activation_energy: f64,
    /// Regression intercept
    pub intercept: f64,
    /// Pearson correlation coefficient
    pub correlation: f64,
    /// Two-sided p-value of the slope (NaN with only 2 experiments)
    pub p_value: f64,
    /// Standard error of the slope estimate
    pub std_err: f64,
}

/// Full diagnostics of a simple linear regression y = slope*x + intercept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinRegression {
    pub slope: f64,
    pub intercept: f64,
    pub r_value: f64,
    pub p_value: f64,
    pub std_err: f64,
}

/// Ordinary least squares fit of y against x with the diagnostics of the
/// classic `linregress` contract.
///
/// Fewer than two points, or zero variance in x, is a degenerate
/// regression and fails with `NumericalSingularity`.
pub fn linregress(x: &[f64], y: &[f64]) -> Result<LinRegression, KineticsError> {
    if x.len() != y.len() {
        return Err(KineticsError::invalid(format!(
            "regression inputs differ in length: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 2 {
        return Err(KineticsError::singular(format!(
            "regression requires at least 2 points, got {}",
            n
        )));
    }
    let nf = n as f64;
    let mx = x.iter().sum::<f64>() / nf;
    let my = y.iter().sum::<f64>() / nf;
    let ssxm = x.iter().map(|v| (v - mx) * (v - mx)).sum::<f64>() / nf;
    let ssym = y.iter().map(|v| (v - my) * (v - my)).sum::<f64>() / nf;
    let ssxym = x
        .iter()
        .zip(y.iter())
        .map(|(xv, yv)| (xv - mx) * (yv - my))
        .sum::<f64>()
        / nf;
    if ssxm == 0.0 {
        return Err(KineticsError::singular(
            "regression x-values are all identical (zero variance)".to_string(),
        ));
    }
    let slope = ssxym / ssxm;
    let intercept = my - slope * mx;
    let r_value = if ssym == 0.0 {
        0.0
    } else {
        let r = ssxym / (ssxm * ssym).sqrt();
        r.clamp(-1.0, 1.0)
    };
    let df = nf - 2.0;
    let (p_value, std_err) = if df <= 0.0 {
        // two points define the line exactly, no residual degrees of freedom
        (f64::NAN, 0.0)
    } else if (1.0 - r_value * r_value).abs() < f64::EPSILON {
        (0.0, 0.0)
    } else {
        let t_stat = r_value * (df / (1.0 - r_value * r_value)).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df)
            .map_err(|e| KineticsError::singular(format!("t-distribution setup failed: {}", e)))?;
        let p = 2.0 * (1.0 - dist.cdf(t_stat.abs()));
        let std_err = (ssym / ssxm * (1.0 - r_value * r_value) / df).sqrt();
        (p, std_err)
    };
    Ok(LinRegression {
        slope,
        intercept,
        r_value,
        p_value,
        std_err,
    })
}

fn require_two_experiments(set: &ExperimentSet) -> Result<(), KineticsError> {
    if set.len() < 2 {
        return Err(KineticsError::singular(format!(
            "isoconversional regression requires at least 2 experiments, got {}",
            set.len()
        )));
    }
    Ok(())
}

/// Isothermal, integral: standard isoconversional method.
///
/// Lazy producer; one estimate per conversion-grid index, in grid order.
pub fn ii_standard_lazy<'a>(
    set: &'a ExperimentSet,
) -> Result<impl Iterator<Item = Result<LinearEstimate, KineticsError>> + 'a, KineticsError> {
    require_two_experiments(set)?;
    let temps = set.temperatures()?;
    let x: Vec<f64> = temps.iter().map(|t| 1.0 / t).collect();
    // x does not change with the grid index, check the variance once up front
    if x.iter().all(|v| *v == x[0]) {
        return Err(KineticsError::singular(
            "all experiments share the same temperature, regression is singular".to_string(),
        ));
    }
    Ok((0..set.grid().len()).map(move |n| {
        let y: Vec<f64> = (0..set.len()).map(|i| -set.series(i)[n].ln()).collect();
        let reg = linregress(&x, &y)?;
        debug!(
            "ii_standard index {}: slope = {:.6e}, r = {:.4}",
            n, reg.slope, reg.r_value
        );
        Ok(LinearEstimate {
            activation_energy: -reg.slope * R_GAS,
            intercept: reg.intercept,
            correlation: reg.r_value,
            p_value: reg.p_value,
            std_err: reg.std_err,
        })
    }))
}

/// Isothermal, integral: standard isoconversional method, materialized.
pub fn ii_standard(set: &ExperimentSet) -> Result<Vec<LinearEstimate>, KineticsError> {
    collect_lazy(ii_standard_lazy(set)?)
}

/// Non-isothermal, integral: Ozawa-Flynn-Wall method (Doyle's
/// approximation).
///
/// Lazy producer; one estimate per conversion-grid index, in grid order.
pub fn ni_ofw_lazy<'a>(
    set: &'a ExperimentSet,
) -> Result<impl Iterator<Item = Result<LinearEstimate, KineticsError>> + 'a, KineticsError> {
    require_two_experiments(set)?;
    let rates = set.heating_rates()?;
    let y: Vec<f64> = rates.iter().map(|b| b.ln()).collect();
    Ok((0..set.grid().len()).map(move |n| {
        let x: Vec<f64> = (0..set.len()).map(|i| 1.0 / set.series(i)[n]).collect();
        let reg = linregress(&x, &y)?;
        debug!(
            "ni_ofw index {}: slope = {:.6e}, r = {:.4}",
            n, reg.slope, reg.r_value
        );
        Ok(LinearEstimate {
            activation_energy: -reg.slope * R_GAS / DOYLE_CORRECTION,
            intercept: reg.intercept,
            correlation: reg.r_value,
            p_value: reg.p_value,
            std_err: reg.std_err,
        })
    }))
}

/// Non-isothermal, integral: Ozawa-Flynn-Wall method, materialized.
pub fn ni_ofw(set: &ExperimentSet) -> Result<Vec<LinearEstimate>, KineticsError> {
    collect_lazy(ni_ofw_lazy(set)?)
}

/////////////////////////////////////////TESTS/////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kinetics::experiments::{ConversionGrid, Experiment, ExperimentSet};
    use crate::Kinetics::kinetic_models::KineticModel;
    use crate::Simulation::single_step::isothermal_curve;
    use approx::assert_relative_eq;

    #[test]
    fn linregress_recovers_exact_line() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v - 1.5).collect();
        let reg = linregress(&x, &y).unwrap();
        assert_relative_eq!(reg.slope, 3.0, max_relative = 1e-12);
        assert_relative_eq!(reg.intercept, -1.5, max_relative = 1e-12);
        assert_relative_eq!(reg.r_value, 1.0, max_relative = 1e-12);
        assert!(reg.p_value < 1e-10);
    }

    #[test]
    fn linregress_rejects_constant_x() {
        let x = [2.0, 2.0, 2.0];
        let y = [1.0, 2.0, 3.0];
        assert!(matches!(
            linregress(&x, &y),
            Err(KineticsError::NumericalSingularity(_))
        ));
    }

    #[test]
    fn single_experiment_is_a_singularity() {
        let grid = ConversionGrid::new(vec![0.2, 0.5]).unwrap();
        let set = ExperimentSet::new(
            grid,
            vec![Experiment::isothermal(330.0, vec![10.0, 40.0]).unwrap()],
        )
        .unwrap();
        assert!(matches!(
            ii_standard(&set),
            Err(KineticsError::NumericalSingularity(_))
        ));
    }

    #[test]
    fn identical_temperatures_are_a_singularity() {
        let grid = ConversionGrid::new(vec![0.2, 0.5]).unwrap();
        let set = ExperimentSet::new(
            grid,
            vec![
                Experiment::isothermal(330.0, vec![10.0, 40.0]).unwrap(),
                Experiment::isothermal(330.0, vec![8.0, 30.0]).unwrap(),
            ],
        )
        .unwrap();
        assert!(matches!(
            ii_standard(&set),
            Err(KineticsError::NumericalSingularity(_))
        ));
    }

    #[test]
    fn forward_inverse_round_trip_recovers_activation_energy() {
        // simulate noise-free isothermal curves, then re-estimate Ea
        let model = KineticModel::F1;
        let a_factor = 1e13;
        let e_a = 100_000.0;
        let alphas: Vec<f64> = (1..10).map(|k| k as f64 * 0.1).collect();
        let temps = [335.0, 345.0, 355.0, 365.0];

        let grid = ConversionGrid::new(alphas.clone()).unwrap();
        let mut experiments = Vec::new();
        for t in temps {
            let times = isothermal_curve(&model, a_factor, e_a, &alphas, t).unwrap();
            experiments.push(Experiment::isothermal(t, times).unwrap());
        }
        let set = ExperimentSet::new(grid, experiments).unwrap();

        let estimates = ii_standard(&set).unwrap();
        assert_eq!(estimates.len(), alphas.len());
        for est in estimates {
            assert_relative_eq!(est.activation_energy, e_a, max_relative = 0.01);
            assert!(est.correlation < -0.999);
            assert!(est.p_value < 1e-6);
        }
    }

    #[test]
    fn ofw_recovers_activation_energy_from_doyle_consistent_data() {
        // temperatures built so that ln(b) = C_n - 0.457*Ea/(R*T) exactly
        let e_a = 120_000.0;
        let rates: [f64; 4] = [2.0, 4.0, 8.0, 16.0];
        let alphas = [0.2, 0.4, 0.6];
        let grid = ConversionGrid::new(alphas.to_vec()).unwrap();

        let mut experiments = Vec::new();
        for b in rates {
            let temps: Vec<f64> = (0..alphas.len())
                .map(|n| {
                    let c_n = 16.0 - 0.3 * n as f64;
                    DOYLE_CORRECTION * e_a / (R_GAS * (c_n - b.ln()))
                })
                .collect();
            experiments.push(Experiment::linear_heating(b, temps).unwrap());
        }
        let set = ExperimentSet::new(grid, experiments).unwrap();

        for est in ni_ofw(&set).unwrap() {
            assert_relative_eq!(est.activation_energy, e_a, max_relative = 1e-8);
        }
    }
}
