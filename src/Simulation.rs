/// Forward simulation of single-step reactions: closed-form isothermal
/// curves (time per conversion level) and non-isothermal curves obtained
/// by minimizing the psi objective over temperature, one independent
/// optimization per conversion level.
pub mod single_step;
/// Composite (multi-step) reaction simulation: Arrhenius rate constants
/// for an ordered sequence of steps and a BDF integration loop over
/// temperature windows with conversion-bound or temperature-bound
/// stopping, returning aligned temperature/conversion trajectories.
#[allow(non_snake_case)]
pub mod composite_IVP;
