//! # Kinetic Model Catalog
//!
//! ## Aim
//! Catalog of solid-state reaction models used by the isoconversional
//! estimators and the simulation engine. Every model is carried in both
//! canonical forms,
//!
//! ```text
//! integral:      g(a) = k*t
//! differential:  da/dt = k * f(a),     f(a) = 1 / g'(a)
//! ```
//!
//! and additionally as a symbolic expression of its differential form for
//! assembling ODE right-hand sides.
//!
//! ## Available models
//! - **Power law**: P2, P3, P4, PN (parameterized exponent)
//! - **Nucleation & growth (Avrami-Erofeev)**: A2, A3, A4, AN (parameterized)
//! - **Prout-Tompkins**: B1
//! - **Contracting geometry**: R2 (area), R3 (volume)
//! - **Diffusion**: D1 (1D), D2 (2D), D3 (3D, Jander), D4 (Ginstling-Brounshtein)
//! - **Reaction order**: F1, F2, F3
//!
//! ## Parameter Requirements
//! - Parameter-free: P2, P3, P4, A2, A3, A4, B1, R2, R3, D1, D2, D3, D4, F1, F2, F3
//! - Parameterized: PN and AN take one exponent parameter n (n > 0)
//!
//! ## Tips
//! - Callers request the form they need explicitly; there is no dispatch
//!   on naming conventions. Unknown model names and wrong parameter counts
//!   are rejected at construction.
//! - All forms are defined on the open interval 0 < a < 1; several models
//!   are singular at the endpoints, so evaluation outside the interval is
//!   an error rather than a NaN.

use crate::Kinetics::errors::KineticsError;
use RustedSciThe::symbolic::symbolic_engine::Expr;
use std::collections::HashMap;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use tabled::{Table, Tabled};

#[allow(non_upper_case_globals)]
pub const one: Expr = Expr::Const(1.0);
#[allow(non_upper_case_globals)]
pub const two: Expr = Expr::Const(2.0);
#[allow(non_upper_case_globals)]
pub const three: Expr = Expr::Const(3.0);
#[allow(non_upper_case_globals)]
pub const four: Expr = Expr::Const(4.0);
#[allow(non_upper_case_globals)]
pub const half: Expr = Expr::Const(0.5);
#[allow(non_upper_case_globals)]
pub const neg: Expr = Expr::Const(-1.0);

/// Enumeration of the available kinetic model names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum KineticModelNames {
    P2,
    P3,
    P4,
    PN,
    A2,
    A3,
    A4,
    AN,
    B1,
    R2,
    R3,
    D1,
    D2,
    D3,
    D4,
    F1,
    F2,
    F3,
}

impl KineticModelNames {
    pub fn integral_formula(&self) -> String {
        match self {
            KineticModelNames::P2 => "a^(1/2)".to_string(),
            KineticModelNames::P3 => "a^(1/3)".to_string(),
            KineticModelNames::P4 => "a^(1/4)".to_string(),
            KineticModelNames::PN => "a^(1/n)".to_string(),
            KineticModelNames::A2 => "(-ln(1-a))^(1/2)".to_string(),
            KineticModelNames::A3 => "(-ln(1-a))^(1/3)".to_string(),
            KineticModelNames::A4 => "(-ln(1-a))^(1/4)".to_string(),
            KineticModelNames::AN => "(-ln(1-a))^(1/n)".to_string(),
            KineticModelNames::B1 => "ln(a/(1-a))".to_string(),
            KineticModelNames::R2 => "1-(1-a)^(1/2)".to_string(),
            KineticModelNames::R3 => "1-(1-a)^(1/3)".to_string(),
            KineticModelNames::D1 => "a^2".to_string(),
            KineticModelNames::D2 => "(1-a)*ln(1-a)+a".to_string(),
            KineticModelNames::D3 => "(1-(1-a)^(1/3))^2".to_string(),
            KineticModelNames::D4 => "1-2a/3-(1-a)^(2/3)".to_string(),
            KineticModelNames::F1 => "-ln(1-a)".to_string(),
            KineticModelNames::F2 => "(1-a)^(-1)-1".to_string(),
            KineticModelNames::F3 => "0.5*((1-a)^(-2)-1)".to_string(),
        }
    }

    pub fn differential_formula(&self) -> String {
        match self {
            KineticModelNames::P2 => "2*a^(1/2)".to_string(),
            KineticModelNames::P3 => "3*a^(2/3)".to_string(),
            KineticModelNames::P4 => "4*a^(3/4)".to_string(),
            KineticModelNames::PN => "n*a^(1-1/n)".to_string(),
            KineticModelNames::A2 => "2*(1-a)*(-ln(1-a))^(1/2)".to_string(),
            KineticModelNames::A3 => "3*(1-a)*(-ln(1-a))^(2/3)".to_string(),
            KineticModelNames::A4 => "4*(1-a)*(-ln(1-a))^(3/4)".to_string(),
            KineticModelNames::AN => "n*(1-a)*(-ln(1-a))^(1-1/n)".to_string(),
            KineticModelNames::B1 => "a*(1-a)".to_string(),
            KineticModelNames::R2 => "2*(1-a)^(1/2)".to_string(),
            KineticModelNames::R3 => "3*(1-a)^(2/3)".to_string(),
            KineticModelNames::D1 => "(1/2)*a^(-1)".to_string(),
            KineticModelNames::D2 => "(-ln(1-a))^(-1)".to_string(),
            KineticModelNames::D3 => "(3/2)*(1-a)^(2/3)*(1-(1-a)^(1/3))^(-1)".to_string(),
            KineticModelNames::D4 => "(3/2)*((1-a)^(-1/3)-1)^(-1)".to_string(),
            KineticModelNames::F1 => "1-a".to_string(),
            KineticModelNames::F2 => "(1-a)^2".to_string(),
            KineticModelNames::F3 => "(1-a)^3".to_string(),
        }
    }

    pub fn pretty_print() {
        #[derive(Tabled)]
        struct ModelRow {
            code: String,
            integral: String,
            differential: String,
        }

        let data: Vec<ModelRow> = KineticModelNames::iter()
            .map(|model| ModelRow {
                code: format!("{:?}", model),
                integral: model.integral_formula(),
                differential: model.differential_formula(),
            })
            .collect();

        let mut binding = Table::new(data);
        let table = binding.with(tabled::settings::Style::rounded());
        println!("{}", table);
    }
}

impl FromStr for KineticModelNames {
    type Err = KineticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P2" => Ok(KineticModelNames::P2),
            "P3" => Ok(KineticModelNames::P3),
            "P4" => Ok(KineticModelNames::P4),
            "PN" => Ok(KineticModelNames::PN),
            "A2" => Ok(KineticModelNames::A2),
            "A3" => Ok(KineticModelNames::A3),
            "A4" => Ok(KineticModelNames::A4),
            "AN" => Ok(KineticModelNames::AN),
            "B1" => Ok(KineticModelNames::B1),
            "R2" => Ok(KineticModelNames::R2),
            "R3" => Ok(KineticModelNames::R3),
            "D1" => Ok(KineticModelNames::D1),
            "D2" => Ok(KineticModelNames::D2),
            "D3" => Ok(KineticModelNames::D3),
            "D4" => Ok(KineticModelNames::D4),
            "F1" => Ok(KineticModelNames::F1),
            "F2" => Ok(KineticModelNames::F2),
            "F3" => Ok(KineticModelNames::F3),
            other => Err(KineticsError::invalid(format!(
                "unknown kinetic model name '{}'",
                other
            ))),
        }
    }
}

/// Concrete kinetic model instance, carrying parameter values for the
/// parameterized families.
#[derive(Debug, Clone, PartialEq)]
pub enum KineticModel {
    P2,
    P3,
    P4,
    PN(f64),
    A2,
    A3,
    A4,
    AN(f64),
    B1,
    R2,
    R3,
    D1,
    D2,
    D3,
    D4,
    F1,
    F2,
    F3,
}

impl KineticModel {
    pub fn from_name_and_params(
        name: KineticModelNames,
        params: Vec<f64>,
    ) -> Result<Self, KineticsError> {
        let parameter_free = |model: KineticModel| {
            if params.is_empty() {
                Ok(model)
            } else {
                Err(KineticsError::invalid(format!(
                    "{:?} model takes no parameters, got {}",
                    name,
                    params.len()
                )))
            }
        };
        match name {
            KineticModelNames::P2 => parameter_free(KineticModel::P2),
            KineticModelNames::P3 => parameter_free(KineticModel::P3),
            KineticModelNames::P4 => parameter_free(KineticModel::P4),
            KineticModelNames::A2 => parameter_free(KineticModel::A2),
            KineticModelNames::A3 => parameter_free(KineticModel::A3),
            KineticModelNames::A4 => parameter_free(KineticModel::A4),
            KineticModelNames::B1 => parameter_free(KineticModel::B1),
            KineticModelNames::R2 => parameter_free(KineticModel::R2),
            KineticModelNames::R3 => parameter_free(KineticModel::R3),
            KineticModelNames::D1 => parameter_free(KineticModel::D1),
            KineticModelNames::D2 => parameter_free(KineticModel::D2),
            KineticModelNames::D3 => parameter_free(KineticModel::D3),
            KineticModelNames::D4 => parameter_free(KineticModel::D4),
            KineticModelNames::F1 => parameter_free(KineticModel::F1),
            KineticModelNames::F2 => parameter_free(KineticModel::F2),
            KineticModelNames::F3 => parameter_free(KineticModel::F3),
            KineticModelNames::PN => {
                if params.len() != 1 {
                    return Err(KineticsError::invalid(
                        "PN model requires 1 parameter (n)".to_string(),
                    ));
                }
                if params[0] <= 0.0 {
                    return Err(KineticsError::invalid(format!(
                        "PN exponent must be positive, got {}",
                        params[0]
                    )));
                }
                Ok(KineticModel::PN(params[0]))
            }
            KineticModelNames::AN => {
                if params.len() != 1 {
                    return Err(KineticsError::invalid(
                        "AN model requires 1 parameter (n)".to_string(),
                    ));
                }
                if params[0] <= 0.0 {
                    return Err(KineticsError::invalid(format!(
                        "AN exponent must be positive, got {}",
                        params[0]
                    )));
                }
                Ok(KineticModel::AN(params[0]))
            }
        }
    }

    /// Model instance from a catalog name string.
    pub fn from_name(name: &str, params: Vec<f64>) -> Result<Self, KineticsError> {
        Self::from_name_and_params(KineticModelNames::from_str(name)?, params)
    }

    pub fn name(&self) -> KineticModelNames {
        match self {
            KineticModel::P2 => KineticModelNames::P2,
            KineticModel::P3 => KineticModelNames::P3,
            KineticModel::P4 => KineticModelNames::P4,
            KineticModel::PN(_) => KineticModelNames::PN,
            KineticModel::A2 => KineticModelNames::A2,
            KineticModel::A3 => KineticModelNames::A3,
            KineticModel::A4 => KineticModelNames::A4,
            KineticModel::AN(_) => KineticModelNames::AN,
            KineticModel::B1 => KineticModelNames::B1,
            KineticModel::R2 => KineticModelNames::R2,
            KineticModel::R3 => KineticModelNames::R3,
            KineticModel::D1 => KineticModelNames::D1,
            KineticModel::D2 => KineticModelNames::D2,
            KineticModel::D3 => KineticModelNames::D3,
            KineticModel::D4 => KineticModelNames::D4,
            KineticModel::F1 => KineticModelNames::F1,
            KineticModel::F2 => KineticModelNames::F2,
            KineticModel::F3 => KineticModelNames::F3,
        }
    }

    fn check_alpha(alpha: f64) -> Result<(), KineticsError> {
        if !alpha.is_finite() || alpha <= 0.0 || alpha >= 1.0 {
            return Err(KineticsError::invalid(format!(
                "conversion fraction must lie in (0, 1), got {}",
                alpha
            )));
        }
        Ok(())
    }

    /// Integral form g(a).
    pub fn integral(&self, alpha: f64) -> Result<f64, KineticsError> {
        Self::check_alpha(alpha)?;
        let a = alpha;
        let g = match self {
            KineticModel::P2 => a.powf(1.0 / 2.0),
            KineticModel::P3 => a.powf(1.0 / 3.0),
            KineticModel::P4 => a.powf(1.0 / 4.0),
            KineticModel::PN(n) => a.powf(1.0 / n),
            KineticModel::A2 => (-(1.0 - a).ln()).powf(1.0 / 2.0),
            KineticModel::A3 => (-(1.0 - a).ln()).powf(1.0 / 3.0),
            KineticModel::A4 => (-(1.0 - a).ln()).powf(1.0 / 4.0),
            KineticModel::AN(n) => (-(1.0 - a).ln()).powf(1.0 / n),
            KineticModel::B1 => (a / (1.0 - a)).ln(),
            KineticModel::R2 => 1.0 - (1.0 - a).powf(1.0 / 2.0),
            KineticModel::R3 => 1.0 - (1.0 - a).powf(1.0 / 3.0),
            KineticModel::D1 => a * a,
            KineticModel::D2 => (1.0 - a) * (1.0 - a).ln() + a,
            KineticModel::D3 => (1.0 - (1.0 - a).powf(1.0 / 3.0)).powi(2),
            KineticModel::D4 => 1.0 - 2.0 * a / 3.0 - (1.0 - a).powf(2.0 / 3.0),
            KineticModel::F1 => -(1.0 - a).ln(),
            KineticModel::F2 => (1.0 - a).recip() - 1.0,
            KineticModel::F3 => 0.5 * ((1.0 - a).powi(-2) - 1.0),
        };
        Ok(g)
    }

    /// Differential form f(a) = 1/g'(a).
    pub fn differential(&self, alpha: f64) -> Result<f64, KineticsError> {
        Self::check_alpha(alpha)?;
        let a = alpha;
        let f = match self {
            KineticModel::P2 => 2.0 * a.powf(1.0 / 2.0),
            KineticModel::P3 => 3.0 * a.powf(2.0 / 3.0),
            KineticModel::P4 => 4.0 * a.powf(3.0 / 4.0),
            KineticModel::PN(n) => n * a.powf(1.0 - 1.0 / n),
            KineticModel::A2 => 2.0 * (1.0 - a) * (-(1.0 - a).ln()).powf(1.0 / 2.0),
            KineticModel::A3 => 3.0 * (1.0 - a) * (-(1.0 - a).ln()).powf(2.0 / 3.0),
            KineticModel::A4 => 4.0 * (1.0 - a) * (-(1.0 - a).ln()).powf(3.0 / 4.0),
            KineticModel::AN(n) => n * (1.0 - a) * (-(1.0 - a).ln()).powf(1.0 - 1.0 / n),
            KineticModel::B1 => a * (1.0 - a),
            KineticModel::R2 => 2.0 * (1.0 - a).powf(1.0 / 2.0),
            KineticModel::R3 => 3.0 * (1.0 - a).powf(2.0 / 3.0),
            KineticModel::D1 => 0.5 * a.recip(),
            KineticModel::D2 => (-(1.0 - a).ln()).recip(),
            KineticModel::D3 => {
                1.5 * (1.0 - a).powf(2.0 / 3.0) / (1.0 - (1.0 - a).powf(1.0 / 3.0))
            }
            KineticModel::D4 => 1.5 / ((1.0 - a).powf(-1.0 / 3.0) - 1.0),
            KineticModel::F1 => 1.0 - a,
            KineticModel::F2 => (1.0 - a).powi(2),
            KineticModel::F3 => (1.0 - a).powi(3),
        };
        Ok(f)
    }

    /// Symbolic differential form f(a) over the variable `var`, for
    /// assembling ODE right-hand sides.
    pub fn differential_expr(&self, var: &str) -> Expr {
        let a = Expr::Var(var.to_owned());
        match self {
            KineticModel::P2 => two * Expr::Pow(Box::new(a), Box::new(half)),
            KineticModel::P3 => {
                three * Expr::Pow(Box::new(a), Box::new(Expr::Const(2.0 / 3.0)))
            }
            KineticModel::P4 => {
                four * Expr::Pow(Box::new(a), Box::new(Expr::Const(3.0 / 4.0)))
            }
            KineticModel::PN(n) => {
                Expr::Const(*n) * Expr::Pow(Box::new(a), Box::new(Expr::Const(1.0 - 1.0 / n)))
            }
            KineticModel::A2 => {
                two * (one - a.clone())
                    * Expr::Pow(Box::new(-Expr::ln(one - a)), Box::new(half))
            }
            KineticModel::A3 => {
                three
                    * (one - a.clone())
                    * Expr::Pow(Box::new(-Expr::ln(one - a)), Box::new(Expr::Const(2.0 / 3.0)))
            }
            KineticModel::A4 => {
                four * (one - a.clone())
                    * Expr::Pow(Box::new(-Expr::ln(one - a)), Box::new(Expr::Const(3.0 / 4.0)))
            }
            KineticModel::AN(n) => {
                Expr::Const(*n)
                    * (one - a.clone())
                    * Expr::Pow(
                        Box::new(-Expr::ln(one - a)),
                        Box::new(Expr::Const(1.0 - 1.0 / n)),
                    )
            }
            KineticModel::B1 => a.clone() * (one - a),
            KineticModel::R2 => two * Expr::Pow(Box::new(one - a), Box::new(half)),
            KineticModel::R3 => {
                three * Expr::Pow(Box::new(one - a), Box::new(Expr::Const(2.0 / 3.0)))
            }
            KineticModel::D1 => half * Expr::Pow(Box::new(a), Box::new(neg)),
            KineticModel::D2 => Expr::Pow(Box::new(-Expr::ln(one - a)), Box::new(neg)),
            KineticModel::D3 => {
                Expr::Const(1.5)
                    * Expr::Pow(Box::new(one - a.clone()), Box::new(Expr::Const(2.0 / 3.0)))
                    * Expr::Pow(
                        Box::new(
                            one - Expr::Pow(Box::new(one - a), Box::new(Expr::Const(1.0 / 3.0))),
                        ),
                        Box::new(neg),
                    )
            }
            KineticModel::D4 => {
                Expr::Const(1.5)
                    * Expr::Pow(
                        Box::new(
                            Expr::Pow(Box::new(one - a), Box::new(Expr::Const(-1.0 / 3.0))) - one,
                        ),
                        Box::new(neg),
                    )
            }
            KineticModel::F1 => one - a,
            KineticModel::F2 => Expr::Pow(Box::new(one - a), Box::new(two)),
            KineticModel::F3 => Expr::Pow(Box::new(one - a), Box::new(three)),
        }
    }
}

/// Explicit name -> model mapping over the parameter-free catalog.
///
/// Parameterized instances (PN, AN with a chosen exponent) can be
/// registered on top with `insert`. Lookup of an unknown name is an
/// `InvalidArgument` error, not a silent fallback.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: HashMap<String, KineticModel>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        let mut models = HashMap::new();
        for name in KineticModelNames::iter() {
            if let Ok(model) = KineticModel::from_name_and_params(name, vec![]) {
                models.insert(format!("{:?}", name), model);
            }
        }
        Self { models }
    }

    pub fn get(&self, name: &str) -> Result<&KineticModel, KineticsError> {
        self.models.get(name).ok_or_else(|| {
            KineticsError::invalid(format!("model '{}' is not in the catalog", name))
        })
    }

    pub fn insert(&mut self, name: &str, model: KineticModel) {
        self.models.insert(name.to_owned(), model);
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/////////////////////////////////////////TESTS/////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn all_models() -> Vec<KineticModel> {
        let mut models: Vec<KineticModel> = KineticModelNames::iter()
            .filter(|n| !matches!(n, KineticModelNames::PN | KineticModelNames::AN))
            .map(|n| KineticModel::from_name_and_params(n, vec![]).unwrap())
            .collect();
        models.push(KineticModel::PN(2.5));
        models.push(KineticModel::AN(1.5));
        models
    }

    #[test]
    fn parameter_validation() {
        assert!(KineticModel::from_name_and_params(KineticModelNames::PN, vec![]).is_err());
        assert!(KineticModel::from_name_and_params(KineticModelNames::AN, vec![1.0, 2.0]).is_err());
        assert!(KineticModel::from_name_and_params(KineticModelNames::PN, vec![-2.0]).is_err());
        assert!(KineticModel::from_name_and_params(KineticModelNames::F1, vec![1.0]).is_err());
        assert!(KineticModel::from_name_and_params(KineticModelNames::F1, vec![]).is_ok());
    }

    #[test]
    fn unknown_name_is_invalid_argument() {
        assert!(matches!(
            KineticModel::from_name("iF1", vec![]),
            Err(KineticsError::InvalidArgument(_))
        ));
        assert!(KineticModel::from_name("F1", vec![]).is_ok());
    }

    #[test]
    fn evaluation_rejects_out_of_range_alpha() {
        let model = KineticModel::F1;
        assert!(model.integral(0.0).is_err());
        assert!(model.integral(1.0).is_err());
        assert!(model.differential(-0.5).is_err());
        assert!(model.integral(0.5).is_ok());
    }

    #[test]
    fn differential_is_reciprocal_slope_of_integral() {
        // f(a) = 1/g'(a) for every model; g' by central difference
        let h = 1e-6;
        for model in all_models() {
            for a in [0.15, 0.4, 0.75] {
                let slope =
                    (model.integral(a + h).unwrap() - model.integral(a - h).unwrap()) / (2.0 * h);
                let f = model.differential(a).unwrap();
                assert_relative_eq!(
                    f,
                    slope.recip(),
                    max_relative = 1e-4,
                );
            }
        }
    }

    #[test]
    fn symbolic_differential_matches_numeric() {
        for model in all_models() {
            let expr = model.differential_expr("a");
            let fun = expr.lambdify1D();
            for a in [0.2, 0.6] {
                assert_relative_eq!(
                    fun(a),
                    model.differential(a).unwrap(),
                    max_relative = 1e-10,
                );
            }
        }
    }

    #[test]
    fn formulas_are_mapped_for_every_name() {
        for name in KineticModelNames::iter() {
            assert!(!name.integral_formula().is_empty());
            assert!(!name.differential_formula().is_empty());
            assert!(name.integral_formula().contains('a'));
        }
    }

    #[test]
    fn catalog_lookup() {
        let mut catalog = ModelCatalog::new();
        assert!(catalog.get("F1").is_ok());
        assert!(catalog.get("PN").is_err());
        catalog.insert("PN25", KineticModel::PN(2.5));
        assert!(catalog.get("PN25").is_ok());
        assert_eq!(catalog.get("F1").unwrap().name(), KineticModelNames::F1);
    }
}
