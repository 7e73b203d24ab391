//! # Experimental Data Model
//!
//! ## Aim
//! Structures describing thermoanalytical runs for isoconversional
//! analysis. A set of experiments shares one conversion grid: index n of
//! every observation series corresponds to the same conversion fraction
//! across all runs, so cross-experiment comparison at index n means "same
//! conversion", not "same time". The alignment is the caller's duty; the
//! toolbox never resamples.
//!
//! ## Main structures
//! - `ConversionGrid`: ordered conversion fractions, each in (0, 1)
//! - `Condition`: the single scalar identifying a run - an isothermal
//!   temperature or a linear heating rate
//! - `Experiment`: one run, condition plus grid-aligned observations
//!   (times for isothermal runs, temperatures for linear heating)
//! - `ExperimentSet`: ordered runs over one grid, all of one condition
//!   kind; the unit of input of every isoconversional estimator
//!
//! All structures are immutable after construction and all invariants are
//! checked by the constructors.

use crate::Kinetics::errors::KineticsError;
use serde::{Deserialize, Serialize};

/// Ordered sequence of conversion-fraction values shared by a set of
/// experiments. Every value must lie strictly inside (0, 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionGrid {
    alphas: Vec<f64>,
}

impl ConversionGrid {
    pub fn new(alphas: Vec<f64>) -> Result<Self, KineticsError> {
        if alphas.is_empty() {
            return Err(KineticsError::invalid(
                "conversion grid must not be empty".to_string(),
            ));
        }
        for (n, a) in alphas.iter().enumerate() {
            if !a.is_finite() || *a <= 0.0 || *a >= 1.0 {
                return Err(KineticsError::invalid(format!(
                    "conversion fraction at index {} must lie in (0, 1), got {}",
                    n, a
                )));
            }
        }
        Ok(Self { alphas })
    }

    pub fn len(&self) -> usize {
        self.alphas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alphas.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.alphas
    }
}

/// Scalar condition identifying a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Constant absolute temperature (K); observations are times
    Isothermal { temperature: f64 },
    /// Linear heating rate (K per unit time); observations are temperatures
    LinearHeating { rate: f64 },
}

impl Condition {
    fn validate(&self) -> Result<(), KineticsError> {
        match self {
            Condition::Isothermal { temperature } => {
                if !temperature.is_finite() || *temperature <= 0.0 {
                    return Err(KineticsError::invalid(format!(
                        "isothermal temperature must be positive, got {}",
                        temperature
                    )));
                }
            }
            Condition::LinearHeating { rate } => {
                if !rate.is_finite() || *rate <= 0.0 {
                    return Err(KineticsError::invalid(format!(
                        "heating rate must be positive, got {}",
                        rate
                    )));
                }
            }
        }
        Ok(())
    }
}

/// One experimental run: a condition plus an observation series aligned to
/// the conversion grid of the set the run belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    condition: Condition,
    observations: Vec<f64>,
}

impl Experiment {
    /// Isothermal run at `temperature` with grid-aligned reaction times.
    pub fn isothermal(temperature: f64, times: Vec<f64>) -> Result<Self, KineticsError> {
        Self::new(Condition::Isothermal { temperature }, times)
    }

    /// Linear-heating run at `rate` with grid-aligned temperatures.
    pub fn linear_heating(rate: f64, temperatures: Vec<f64>) -> Result<Self, KineticsError> {
        Self::new(Condition::LinearHeating { rate }, temperatures)
    }

    pub fn new(condition: Condition, observations: Vec<f64>) -> Result<Self, KineticsError> {
        condition.validate()?;
        if observations.is_empty() {
            return Err(KineticsError::invalid(
                "experiment must contain at least one observation".to_string(),
            ));
        }
        for (n, obs) in observations.iter().enumerate() {
            if !obs.is_finite() || *obs <= 0.0 {
                return Err(KineticsError::invalid(format!(
                    "observation at index {} must be positive and finite, got {}",
                    n, obs
                )));
            }
        }
        Ok(Self {
            condition,
            observations,
        })
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn observations(&self) -> &[f64] {
        &self.observations
    }
}

/// Ordered sequence of experiments over one conversion grid. Order matters
/// only in that pairwise methods form permutation pairs over the set's
/// indices; the objective value itself is order-independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSet {
    grid: ConversionGrid,
    experiments: Vec<Experiment>,
}

impl ExperimentSet {
    pub fn new(grid: ConversionGrid, experiments: Vec<Experiment>) -> Result<Self, KineticsError> {
        if experiments.is_empty() {
            return Err(KineticsError::invalid(
                "experiment set must not be empty".to_string(),
            ));
        }
        let isothermal = matches!(experiments[0].condition, Condition::Isothermal { .. });
        for (i, exp) in experiments.iter().enumerate() {
            if exp.observations.len() != grid.len() {
                return Err(KineticsError::invalid(format!(
                    "experiment {} has {} observations but the grid has {} points",
                    i,
                    exp.observations.len(),
                    grid.len()
                )));
            }
            let same_kind = matches!(exp.condition, Condition::Isothermal { .. }) == isothermal;
            if !same_kind {
                return Err(KineticsError::invalid(format!(
                    "experiment {} mixes condition kinds within one set",
                    i
                )));
            }
        }
        Ok(Self { grid, experiments })
    }

    pub fn grid(&self) -> &ConversionGrid {
        &self.grid
    }

    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }

    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    pub fn is_isothermal(&self) -> bool {
        matches!(
            self.experiments[0].condition,
            Condition::Isothermal { .. }
        )
    }

    /// Observation series of experiment `i`.
    pub fn series(&self, i: usize) -> &[f64] {
        self.experiments[i].observations()
    }

    /// Isothermal temperatures of all experiments, in set order.
    pub fn temperatures(&self) -> Result<Vec<f64>, KineticsError> {
        self.experiments
            .iter()
            .map(|e| match e.condition {
                Condition::Isothermal { temperature } => Ok(temperature),
                Condition::LinearHeating { .. } => Err(KineticsError::invalid(
                    "expected an isothermal experiment set".to_string(),
                )),
            })
            .collect()
    }

    /// Linear heating rates of all experiments, in set order.
    pub fn heating_rates(&self) -> Result<Vec<f64>, KineticsError> {
        self.experiments
            .iter()
            .map(|e| match e.condition {
                Condition::LinearHeating { rate } => Ok(rate),
                Condition::Isothermal { .. } => Err(KineticsError::invalid(
                    "expected a linear-heating experiment set".to_string(),
                )),
            })
            .collect()
    }
}

/////////////////////////////////////////TESTS/////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_rejects_out_of_range_fractions() {
        assert!(ConversionGrid::new(vec![]).is_err());
        assert!(ConversionGrid::new(vec![0.0, 0.5]).is_err());
        assert!(ConversionGrid::new(vec![0.5, 1.0]).is_err());
        assert!(ConversionGrid::new(vec![0.1, 0.5, 0.9]).is_ok());
    }

    #[test]
    fn experiment_validates_condition_and_observations() {
        assert!(Experiment::isothermal(-300.0, vec![1.0]).is_err());
        assert!(Experiment::linear_heating(0.0, vec![400.0]).is_err());
        assert!(Experiment::isothermal(300.0, vec![]).is_err());
        assert!(Experiment::isothermal(300.0, vec![1.0, -2.0]).is_err());
        assert!(Experiment::isothermal(300.0, vec![1.0, 2.0]).is_ok());
    }

    #[test]
    fn set_rejects_misaligned_series_and_mixed_kinds() {
        let grid = ConversionGrid::new(vec![0.2, 0.4, 0.6]).unwrap();
        let short = Experiment::isothermal(320.0, vec![1.0, 2.0]).unwrap();
        assert!(ExperimentSet::new(grid.clone(), vec![short]).is_err());

        let iso = Experiment::isothermal(320.0, vec![1.0, 2.0, 3.0]).unwrap();
        let heat = Experiment::linear_heating(5.0, vec![400.0, 410.0, 420.0]).unwrap();
        assert!(ExperimentSet::new(grid, vec![iso, heat]).is_err());
    }

    #[test]
    fn accessors_check_the_condition_kind() {
        let grid = ConversionGrid::new(vec![0.3, 0.6]).unwrap();
        let set = ExperimentSet::new(
            grid,
            vec![
                Experiment::isothermal(320.0, vec![1.0, 2.0]).unwrap(),
                Experiment::isothermal(340.0, vec![0.5, 1.1]).unwrap(),
            ],
        )
        .unwrap();
        assert!(set.is_isothermal());
        assert_eq!(set.temperatures().unwrap(), vec![320.0, 340.0]);
        assert!(set.heating_rates().is_err());
        assert_eq!(set.series(1), &[0.5, 1.1]);
    }
}
