/// Linear isoconversional estimators: the standard isothermal integral
/// method and the non-isothermal Ozawa-Flynn-Wall method. Both fit an
/// ordinary least squares line per conversion-grid index and report the
/// full regression diagnostics (slope-derived activation energy,
/// intercept, correlation coefficient, p-value, standard error).
pub mod linear;
/// Nonlinear isoconversional estimation (Vyazovkin's method): per grid
/// index, a derivative-free minimization of a pairwise ratio-sum
/// objective over all ordered experiment pairs, in a linear-heating
/// variant (Senum-Yang temperature integrals) and an isothermal variant
/// (quadrature of the time kernel).
pub mod vyazovkin;
