use std::time::Instant;

use crate::simulation::driver::Driver;
use crate::simulation::error::SimError;
use crate::simulation::forces::{Acceleration, NewtonianGravity, NewtonianGravityBarnesHut, ParallelNewtonianGravity};
use crate::simulation::integrator::{Euler, IntegrationStrategy, RungeKutta4};
use crate::simulation::states::{Body, NVec3, System};

/// Helper to build a deterministic system of size `n`, no rand needed
fn make_system(n: usize) -> Result<System, SimError> {
    let bodies = (0..n)
        .map(|i| {
            let i_f = i as f64;
            let x = NVec3::new(
                (i_f * 0.37).sin() * 5.0 + i_f * 1e-3,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            );
            Body::new(format!("b{i}"), 1.0, Some(0.01), x, NVec3::zeros())
        })
        .collect::<Result<Vec<_>, _>>()?;

    System::new(bodies, 0.1)
}

/// Time one derivative evaluation per force model across a range of N
pub fn bench_gravity() -> Result<(), SimError> {
    let ns = [200, 400, 800, 1600, 3200];

    println!("N,direct_ms,parallel_ms,bh_ms");

    for n in ns {
        let models: [Box<dyn Acceleration + Send + Sync>; 3] = [
            Box::new(NewtonianGravity),
            Box::new(ParallelNewtonianGravity),
            Box::new(NewtonianGravityBarnesHut::new(0.7)?),
        ];

        let mut timings = Vec::with_capacity(models.len());
        for model in models {
            let mut sys = make_system(n)?;
            sys.set_force_model(model);
            let state = sys.current_state()?;

            // Warm up
            sys.state_derivatives(&state, 0.0)?;

            let t0 = Instant::now();
            sys.state_derivatives(&state, 0.0)?;
            timings.push(t0.elapsed().as_secs_f64() * 1000.0);
        }

        println!("{},{:.6},{:.6},{:.6}", n, timings[0], timings[1], timings[2]);
    }
    Ok(())
}

/// Time one full step of each strategy with the direct force model
pub fn bench_strategies() -> Result<(), SimError> {
    let ns = [100, 200, 400, 800];
    let steps = 3;
    let dt = 1e-3;

    println!("N,euler_ms,rk4_ms");

    for n in ns {
        let strategies: [Box<dyn IntegrationStrategy + Send + Sync>; 2] = [Box::new(Euler), Box::new(RungeKutta4)];

        let mut timings = Vec::with_capacity(strategies.len());
        for strategy in strategies {
            let mut sys = make_system(n)?;
            let mut driver = Driver::from_boxed(strategy);

            // Warm-up
            driver.step(&mut sys, dt)?;

            let t0 = Instant::now();
            driver.evolve(&mut sys, dt, steps)?;
            timings.push(t0.elapsed().as_secs_f64() * 1000.0 / steps as f64);
        }

        println!("{},{:.6},{:.6}", n, timings[0], timings[1]);
    }
    Ok(())
}
