use orbsim::{load_scenario, Scenario};
use orbsim::{bench_gravity, bench_strategies};

use anyhow::{Context, Result};
use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Integrate an N-body system from a scenario file")]
struct Args {
    /// Scenario file, looked up as given and then under `scenarios/`
    #[arg(short, default_value = "two_body.yaml")]
    file_name: String,

    /// Override the number of steps
    #[arg(long)]
    steps: Option<usize>,

    /// Override the step size
    #[arg(long)]
    dt: Option<f64>,

    /// Print a CSV trajectory row per body every N steps
    #[arg(long)]
    every: Option<usize>,

    /// Run the timing helpers instead of a scenario
    #[arg(long)]
    bench: bool,
}

fn scenario_path(file_name: &str) -> PathBuf {
    let given = PathBuf::from(file_name);
    if given.exists() {
        return given;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.bench {
        bench_gravity()?;
        bench_strategies()?;
        return Ok(());
    }

    let path = scenario_path(&args.file_name);
    let mut cfg = load_scenario(&path)?;
    if let Some(steps) = args.steps {
        cfg.parameters.steps = steps;
    }
    if let Some(dt) = args.dt {
        cfg.parameters.dt = dt;
    }

    let Scenario {
        parameters,
        mut system,
        mut driver,
        ..
    } = Scenario::build_scenario(&cfg).with_context(|| format!("invalid scenario {}", path.display()))?;

    println!(
        "{}: {} bodies, {} strategy, {} forces, dt = {}, {} steps",
        path.display(),
        system.len(),
        driver.strategy_name(),
        system.force_model_name(),
        parameters.dt,
        parameters.steps
    );

    let p0 = system.total_momentum()?;
    let e0 = system.total_energy()?;

    if let Some(every) = args.every.filter(|&n| n > 0) {
        println!("step,t,name,x,y,z");
        driver.evolve_with(&mut system, parameters.dt, parameters.steps, |d, sys| {
            if d.steps_taken() % every == 0 {
                for b in sys.bodies() {
                    if let Ok(s) = b.current_state() {
                        println!("{},{},{},{},{},{}", d.steps_taken(), d.time(), b.name(), s[0], s[1], s[2]);
                    }
                }
            }
        })?;
    } else {
        driver.evolve(&mut system, parameters.dt, parameters.steps)?;
    }

    println!("t = {}", driver.time());
    for b in system.bodies() {
        let s = b.current_state()?;
        println!(
            "{:>12}  r = ({:.6e}, {:.6e}, {:.6e})  v = ({:.6e}, {:.6e}, {:.6e})",
            b.name(),
            s[0],
            s[1],
            s[2],
            s[3],
            s[4],
            s[5]
        );
    }

    let p1 = system.total_momentum()?;
    let e1 = system.total_energy()?;
    println!("momentum drift |dp| = {:.3e}", (p1 - p0).norm());
    println!("energy drift   dE/E = {:.3e}", (e1 - e0) / e0.abs().max(f64::MIN_POSITIVE));

    Ok(())
}
