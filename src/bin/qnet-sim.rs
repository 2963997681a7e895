use qnet_sim::cli::{self, FormatArg};
use qnet_sim::control::PacedSimulation;
use qnet_sim::engine::SimulationEngine;
use qnet_sim::error::Result;
use qnet_sim::output::{self, Formatter, HumanFormatter, JsonFormatter, SummaryFormatter};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::parse_args()?;
    let config = cli::build_config(&args)?;
    let engine = SimulationEngine::new(config)?;

    let stats = if args.paced {
        let sim = PacedSimulation::spawn(engine, false);
        let (_, stats) = sim.join();
        stats
    } else {
        let mut engine = engine;
        engine.run()
    };

    let formatter = formatter_for(&args.format);
    print!("{}", formatter.write(&stats));

    // Recording failures must never look like a failed simulation.
    if let Some(path) = &args.report {
        if let Err(err) = output::write_report(path, &stats) {
            eprintln!("Warning: {}", err);
        }
    }
    if let Some(path) = &args.history {
        if let Err(err) = output::append_history(path, &stats) {
            eprintln!("Warning: {}", err);
        }
    }

    Ok(())
}

fn formatter_for(format: &FormatArg) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Summary => Box::new(SummaryFormatter),
        FormatArg::Json => Box::new(JsonFormatter),
    }
}
