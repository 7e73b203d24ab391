//! # Temperature Integral Module
//!
//! ## Aim
//! Evaluation of the temperature integral of non-isothermal kinetics,
//!
//! ```text
//! p(x) = ∫ₓ^∞ exp(-u)/u² du,      x = E/(R*T)
//! ```
//!
//! both exactly (adaptive quadrature) and through the Senum-Yang rational
//! approximation, plus the isothermal time kernel exp(-E/(R*T)) used as an
//! integrand by the isothermal Vyazovkin variant.
//!
//! ## Main functions
//! - `exact_integral()`: E/R * p(x) by adaptive Simpson quadrature
//! - `senum_yang()`: closed-form p(x) approximation, O(1) and smooth,
//!   the workhorse of every downstream optimization loop
//! - `time_kernel()`: exp(-E/(R*T)), integrand for isothermal analysis
//!
//! ## Tips
//! - `senum_yang` is accurate to well under 1% for x in [5, 60], the range
//!   covered by realistic activation energies and temperatures. Prefer it
//!   over `exact_integral` inside optimization loops.
//! - Both evaluations are singular at x = 0 (T -> infinity); that is
//!   reported as `NumericalSingularity`, never evaluated through.

use crate::Kinetics::errors::KineticsError;

/// Universal gas constant in J/(mol·K)
pub const R_GAS: f64 = 8.314;

/// Senum-Yang temperature integral approximation. x = E/(R*T).
///
/// p(x) ≈ exp(-x)/x * (x³+18x²+86x+96)/(x⁴+20x³+120x²+240x+120)
pub fn senum_yang(x: f64) -> Result<f64, KineticsError> {
    if x <= 0.0 {
        return Err(KineticsError::singular(format!(
            "Senum-Yang approximation is undefined for x = {}, requires x > 0",
            x
        )));
    }
    let t1 = (-x).exp() / x;
    let num = x.powi(3) + 18.0 * x.powi(2) + 86.0 * x + 96.0;
    let den = x.powi(4) + 20.0 * x.powi(3) + 120.0 * x.powi(2) + 240.0 * x + 120.0;
    Ok(t1 * num / den)
}

/// Evaluates the temperature integral E/R * p(x) with numerical quadrature.
///
/// The substitution u = x/s maps the infinite domain onto s in (0, 1]:
///
/// ```text
/// E/R * ∫ₓ^∞ exp(-u)/u² du = T * ∫₀¹ exp(-x/s) ds
/// ```
///
/// # Arguments
/// * `e_a` - Activation energy (J/mol), must be non-negative
/// * `temp` - Absolute temperature (K), must be positive
pub fn exact_integral(e_a: f64, temp: f64) -> Result<f64, KineticsError> {
    if temp <= 0.0 {
        return Err(KineticsError::invalid(format!(
            "temperature must be positive, got {}",
            temp
        )));
    }
    if e_a < 0.0 {
        return Err(KineticsError::invalid(format!(
            "activation energy must be non-negative, got {}",
            e_a
        )));
    }
    let x = e_a / (R_GAS * temp);
    if x == 0.0 {
        return Err(KineticsError::singular(
            "temperature integral is singular at x = 0".to_string(),
        ));
    }
    let integrand = |s: f64| if s <= 0.0 { 0.0 } else { (-x / s).exp() };
    Ok(temp * adaptive_simpson(&integrand, 0.0, 1.0, 1e-10))
}

/// Isothermal rate kernel exp(-E/(R*T)).
///
/// Written as a function of time so it can be handed directly to the
/// quadrature as the integrand of ∫₀ᵗ exp(-E/(R*T)) dt'; the kernel itself
/// does not depend on `_t` under isothermal conditions.
pub fn time_kernel(_t: f64, e_a: f64, temp: f64) -> f64 {
    (-e_a / (R_GAS * temp)).exp()
}

/// Adaptive Simpson quadrature of `f` over [a, b].
///
/// The refinement criterion is relative (|S_fine - S_coarse| against the
/// magnitude of the running estimate) so that integrals spanning many
/// orders of magnitude, like exp(-x/s) for large x, converge to the same
/// relative accuracy as O(1) integrals.
pub fn adaptive_simpson(f: &dyn Fn(f64) -> f64, a: f64, b: f64, rel_tol: f64) -> f64 {
    let fa = f(a);
    let fb = f(b);
    let m = 0.5 * (a + b);
    let fm = f(m);
    let whole = simpson_rule(a, b, fa, fm, fb);
    simpson_recurse(f, a, b, fa, fm, fb, whole, rel_tol, 50)
}

fn simpson_rule(a: f64, b: f64, fa: f64, fm: f64, fb: f64) -> f64 {
    (b - a) / 6.0 * (fa + 4.0 * fm + fb)
}

#[allow(clippy::too_many_arguments)]
fn simpson_recurse(
    f: &dyn Fn(f64) -> f64,
    a: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    whole: f64,
    rel_tol: f64,
    depth: usize,
) -> f64 {
    let m = 0.5 * (a + b);
    let lm = 0.5 * (a + m);
    let rm = 0.5 * (m + b);
    let flm = f(lm);
    let frm = f(rm);
    let left = simpson_rule(a, m, fa, flm, fm);
    let right = simpson_rule(m, b, fm, frm, fb);
    let delta = left + right - whole;
    // 15 = (2^4 - 1), the Richardson factor for Simpson's rule
    if depth == 0 || delta.abs() <= 15.0 * rel_tol * (left + right).abs() {
        return left + right + delta / 15.0;
    }
    simpson_recurse(f, a, m, fa, flm, fm, left, rel_tol, depth - 1)
        + simpson_recurse(f, m, b, fm, frm, fb, right, rel_tol, depth - 1)
}

/////////////////////////////////////////TESTS/////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn senum_yang_positive_finite_and_decreasing() {
        let mut prev = f64::INFINITY;
        let mut x = 5.0;
        while x <= 60.0 {
            let p = senum_yang(x).unwrap();
            assert!(p.is_finite() && p > 0.0, "p({}) = {}", x, p);
            assert!(p < prev, "p(x) must decrease, p({}) = {}", x, p);
            prev = p;
            x += 0.5;
        }
    }

    #[test]
    fn senum_yang_rejects_zero_and_negative() {
        assert!(matches!(
            senum_yang(0.0),
            Err(KineticsError::NumericalSingularity(_))
        ));
        assert!(senum_yang(-3.0).is_err());
    }

    #[test]
    fn quadrature_agrees_with_senum_yang_within_one_percent() {
        let e_a = 100_000.0;
        for x in [5.0, 8.0, 12.0, 20.0, 30.0, 45.0, 60.0] {
            let temp = e_a / (R_GAS * x);
            let exact = exact_integral(e_a, temp).unwrap();
            let approx_value = e_a / R_GAS * senum_yang(x).unwrap();
            assert_relative_eq!(exact, approx_value, max_relative = 0.01);
        }
    }

    #[test]
    fn exact_integral_validates_input() {
        assert!(exact_integral(100_000.0, -1.0).is_err());
        assert!(exact_integral(-5.0, 300.0).is_err());
        assert!(matches!(
            exact_integral(0.0, 300.0),
            Err(KineticsError::NumericalSingularity(_))
        ));
    }

    #[test]
    fn time_kernel_is_constant_in_time() {
        let k0 = time_kernel(0.0, 80_000.0, 500.0);
        let k1 = time_kernel(123.0, 80_000.0, 500.0);
        assert_eq!(k0, k1);
        assert_relative_eq!(k0, (-80_000.0 / (R_GAS * 500.0)).exp());
    }

    #[test]
    fn adaptive_simpson_integrates_polynomial_exactly() {
        // ∫₀¹ x³ dx = 1/4, Simpson is exact for cubics
        let value = adaptive_simpson(&|x| x * x * x, 0.0, 1.0, 1e-12);
        assert_relative_eq!(value, 0.25, max_relative = 1e-12);
    }

    #[test]
    fn adaptive_simpson_handles_sharp_exponential() {
        // ∫₀¹ exp(-50/s) ds concentrates all mass near s = 1
        let x = 50.0;
        let value = adaptive_simpson(&|s| if s <= 0.0 { 0.0 } else { (-x / s).exp() }, 0.0, 1.0, 1e-10);
        let reference = senum_yang(x).unwrap() * x;
        assert_relative_eq!(value, reference, max_relative = 0.01);
    }
}
