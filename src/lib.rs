#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod Isoconversional;
#[allow(non_snake_case)]
pub mod Kinetics;
#[allow(non_snake_case)]
pub mod Simulation;
#[allow(non_snake_case)]
pub mod Utils;
