/// Crate-wide error type for the kinetic toolbox. Invalid user input
/// (unknown model/strategy names, non-positive temperatures and rates,
/// mismatched array lengths) and numerical singularities (degenerate
/// regressions, the temperature integral at x = 0) are raised immediately
/// at the point of detection; optimizer non-convergence and integration
/// failures are never errors, they are reported inside the per-unit
/// results of the modules that produce them.
pub mod errors;
/// Experimental data model for isoconversional analysis: the shared
/// conversion grid, single runs (isothermal or linear heating) and
/// ordered sets of runs aligned to the same grid. All invariants
/// (conversion fractions in (0,1), positive conditions, series aligned to
/// the grid, one condition kind per set) are enforced at construction so
/// the estimators can consume the data without re-validation.
pub mod experiments;
/// Catalog of solid-state kinetic models in integral form g(a) and
/// differential form f(a): power law (P2, P3, P4, PN), Avrami-Erofeev
/// nucleation/growth (A2, A3, A4, AN), Prout-Tompkins (B1), contracting
/// geometry (R2, R3), diffusion (D1-D4) and reaction order (F1-F3).
/// Every model also exposes its differential form as a symbolic
/// expression for building ODE right-hand sides.
pub mod kinetic_models;
/// The temperature integral and its approximations: exact evaluation by
/// adaptive quadrature, the Senum-Yang closed-form approximation used as
/// the workhorse of every optimization loop, and the isothermal time
/// kernel exp(-E/(R*T)).
pub mod temperature_integral;
