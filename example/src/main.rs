use clap::{Parser, ValueEnum};
use foc_sim::{PlantModel, Sample, SimulationConfig};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Run a closed-loop FOC speed-control scenario and log its trajectory.
#[derive(Parser, Debug)]
#[command(name = "foc-sim-example")]
#[command(version)]
#[command(about = "Closed-loop FOC simulation of a permanent-magnet motor")]
struct Args {
    /// Simulation config (TOML). The reference BLDC scenario is used if omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the plant model.
    #[arg(short, long, value_enum)]
    model: Option<Model>,

    /// Override the simulated duration [s].
    #[arg(long)]
    t_end: Option<f64>,

    /// Interval between logged samples [s].
    #[arg(long, default_value_t = 0.05)]
    report_every: f64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Plant model names, spelled as in the config file.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Model {
    Pmsm,
    Blac,
    Bldc,
}

impl From<Model> for PlantModel {
    fn from(model: Model) -> Self {
        match model {
            Model::Pmsm => PlantModel::Pmsm,
            Model::Blac => PlantModel::Blac,
            Model::Bldc => PlantModel::Bldc,
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    if let Err(e) = run(&args) {
        error!("simulation failed: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), foc_sim::ConfigError> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(model) = args.model {
        config.plant.model = model.into();
    }
    if let Some(t_end) = args.t_end {
        config.t_end = t_end;
    }
    config.validate()?;

    let mut sim = config.build()?;
    let trace = sim.run(&config.profile, config.t_end);

    let stride = ((args.report_every / config.ts).round() as usize).max(1);
    for sample in trace.iter().step_by(stride) {
        report(sample);
    }
    if let Some(end) = trace.last() {
        report(end);
    }

    Ok(())
}

fn report(s: &Sample) {
    info!(
        "t={:.4}s rpm_ref={:.1} rpm={:.3} Te={:.3}N·m Tload={:.1}N·m Id={:.4}A Iq={:.4}A",
        s.t, s.rpm_ref, s.rpm, s.torque, s.t_load, s.i_d, s.i_q
    );
}
