/// Console logger initialization on top of simplelog.
pub mod logging;
/// Materialization of lazy estimate producers into concrete vectors with
/// fail-fast error propagation.
pub mod sequence;
