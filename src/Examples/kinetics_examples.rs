pub fn kin_examples(kintask: usize) {
    //

    match kintask {
        0 => {
            // MODEL CATALOG
            use crate::Kinetics::kinetic_models::{KineticModel, KineticModelNames, ModelCatalog};
            KineticModelNames::pretty_print();
            let catalog = ModelCatalog::new();
            println!("catalog models: {:?}", catalog.names());
            let model = catalog.get("A2").unwrap();
            println!("A2: g(0.5) = {:?}, f(0.5) = {:?}", model.integral(0.5), model.differential(0.5));
            let pn = KineticModel::PN(2.5);
            println!("PN(2.5): g(0.5) = {:?}", pn.integral(0.5));
        }
        1 => {
            // ISOTHERMAL ROUND TRIP: simulate curves, re-estimate Ea
            use crate::Isoconversional::linear::ii_standard;
            use crate::Kinetics::experiments::{ConversionGrid, Experiment, ExperimentSet};
            use crate::Kinetics::kinetic_models::KineticModel;
            use crate::Simulation::single_step::isothermal_curve;

            let model = KineticModel::F1;
            let (a_factor, e_a) = (1e13, 100_000.0);
            let alphas: Vec<f64> = (1..10).map(|k| k as f64 * 0.1).collect();
            let grid = ConversionGrid::new(alphas.clone()).unwrap();
            let mut experiments = Vec::new();
            for t in [340.0, 345.0, 350.0, 355.0, 360.0] {
                let times = isothermal_curve(&model, a_factor, e_a, &alphas, t).unwrap();
                experiments.push(Experiment::isothermal(t, times).unwrap());
            }
            let set = ExperimentSet::new(grid, experiments).unwrap();
            for (n, est) in ii_standard(&set).unwrap().iter().enumerate() {
                println!(
                    "alpha = {:.2}: Ea = {:.1} J/mol, r = {:.5}, stderr = {:.3e}",
                    alphas[n], est.activation_energy, est.correlation, est.std_err
                );
                assert!((est.activation_energy - e_a).abs() / e_a < 0.01);
            }
        }
        2 => {
            // VYAZOVKIN'S METHOD seeded from OFW
            use crate::Isoconversional::linear::ni_ofw;
            use crate::Isoconversional::vyazovkin::nonlinear;
            use crate::Kinetics::experiments::{ConversionGrid, Experiment, ExperimentSet};
            use crate::Kinetics::kinetic_models::KineticModel;
            use crate::Simulation::single_step::nonisothermal_curve;

            let model = KineticModel::A2;
            let (a_factor, e_a) = (1e12, 150_000.0);
            let alphas = vec![0.2, 0.4, 0.6, 0.8];
            let grid = ConversionGrid::new(alphas.clone()).unwrap();
            let mut experiments = Vec::new();
            for b in [2.0, 4.0, 8.0, 16.0] {
                let temps: Vec<f64> =
                    nonisothermal_curve(&model, a_factor, e_a, &alphas, b, 600.0, "NelderMead")
                        .unwrap()
                        .iter()
                        .map(|s| s.temperature)
                        .collect();
                experiments.push(Experiment::linear_heating(b, temps).unwrap());
            }
            let set = ExperimentSet::new(grid, experiments).unwrap();

            let seeds: Vec<f64> = ni_ofw(&set)
                .unwrap()
                .iter()
                .map(|est| est.activation_energy)
                .collect();
            println!("OFW seeds: {:?}", seeds);
            for est in nonlinear(&set, &seeds, "LinearHeating", "NelderMead", None).unwrap() {
                println!(
                    "Ea = {:.1} J/mol, objective = {:.6}, converged = {}",
                    est.activation_energy, est.objective, est.converged
                );
            }
        }
        3 => {
            // COMPOSITE TWO-STEP SIMULATION
            use crate::Kinetics::kinetic_models::KineticModel;
            use crate::Simulation::composite_IVP::{
                composite_rate_constants, CompositeReactionIVP, CompositeReactionScheme,
                CompositeStep,
            };
            use RustedSciThe::numerical::ODE_api2::SolverType;

            let scheme = CompositeReactionScheme::new(vec![
                CompositeStep {
                    a_factor: 900.0 * 60.0,
                    e_a: 58_500.0,
                    model: KineticModel::F1,
                },
                CompositeStep {
                    a_factor: 5e8 * 60.0,
                    e_a: 125_400.0,
                    model: KineticModel::F1,
                },
            ])
            .unwrap();
            let k = composite_rate_constants(2.0, 450.0, &scheme.arrhenius_pairs()).unwrap();
            println!("rate constants at 450 K: {:?}", k);

            let mut ivp = CompositeReactionIVP::new(SolverType::BDF);
            ivp.set_problem(400.0, 1.0, Some(700.0)).unwrap();
            ivp.set_scheme(&scheme, 2.0).unwrap();
            let trajectory = ivp.integrate().unwrap();
            println!(
                "{} points, last T = {:?}, last alpha = {:?}",
                trajectory.temperatures.len(),
                trajectory.temperatures.last(),
                trajectory.conversions.last()
            );
        }
        _ => {
            println!("no such task");
        }
    }
}
