//! ECOGRID - CLI Entry Point

use clap::{Parser, Subcommand};
use ecogrid::{
    AnalysisRunner, AnalysisSettings, Config, RunSettings, Scenario, SimulationEngine,
    SnapshotLog,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "ecogrid")]
#[command(version)]
#[command(about = "Turn-based predator-prey simulation on a 10x10 grid")]
struct Cli {
    /// Configuration file (YAML); defaults are used when it does not exist
    #[arg(short, long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single simulation
    Run {
        /// Starting scenario (balanced, predators-dom, preys-dom)
        #[arg(short, long, default_value = "balanced")]
        scenario: Scenario,

        /// Maximum number of turns
        #[arg(short, long, default_value = "20")]
        turns: u32,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Add the apex species
        #[arg(long)]
        third_species: bool,

        /// Enable breeding-threshold mutations
        #[arg(long)]
        mutations: bool,

        /// Write every turn snapshot to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Compare all scenarios over many runs
    Analyze {
        /// Maximum number of turns per run
        #[arg(short, long, default_value = "50")]
        turns: u32,

        /// Runs per scenario (defaults to the configured value)
        #[arg(short, long)]
        runs: Option<usize>,

        /// Base seed; run i uses seed + i
        #[arg(long)]
        seed: Option<u64>,

        /// Add the apex species
        #[arg(long)]
        third_species: bool,

        /// Enable breeding-threshold mutations
        #[arg(long)]
        mutations: bool,

        /// Write the report to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.log_level.as_str()),
    )
    .init();

    match cli.command {
        Commands::Run {
            scenario,
            turns,
            seed,
            third_species,
            mutations,
            output,
            quiet,
        } => {
            let settings = RunSettings::new(turns, scenario)
                .with_third_species(third_species)
                .with_mutations(mutations);
            run_simulation(config, settings, seed, output, quiet)
        }

        Commands::Analyze {
            turns,
            runs,
            seed,
            third_species,
            mutations,
            output,
        } => {
            let mut settings = AnalysisSettings::from_config(&config, turns)
                .with_third_species(third_species)
                .with_mutations(mutations)
                .with_base_seed(seed.unwrap_or_else(rand::random));
            if let Some(runs) = runs {
                settings.runs = runs;
            }
            run_analysis(config, settings, output)
        }

        Commands::Init { output } => generate_config(output),
    }
}

fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        println!("Loading config from: {:?}", path);
        Ok(Config::from_file(path)?)
    } else {
        Ok(Config::default())
    }
}

fn run_simulation(
    config: Config,
    settings: RunSettings,
    seed: Option<u64>,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let stats_interval = config.logging.stats_interval.max(1);

    let mut engine = match seed {
        Some(s) => SimulationEngine::new_with_seed(config, s),
        None => SimulationEngine::new(config),
    };
    engine.initialize(settings)?;

    println!("Starting simulation");
    println!("  Scenario: {}", settings.scenario);
    println!("  Seed: {}", engine.seed());
    println!("  Max turns: {}", settings.max_turns);
    println!();

    let mut log = SnapshotLog::new(settings.scenario);
    log.record(engine.snapshot()?);

    let start = Instant::now();
    loop {
        let proceed = engine.execute_turn()?;
        let snapshot = engine.snapshot()?;

        if !quiet && snapshot.turn() % stats_interval == 0 {
            println!("{}", snapshot);
        }
        log.record(snapshot);

        if !proceed {
            break;
        }
    }
    let elapsed = start.elapsed();

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.3}s", elapsed.as_secs_f64());
    println!("Turns: {}", engine.current_turn());
    println!(
        "Final population - Preys: {} | Predators: {} | Apex: {}",
        engine.prey_count(),
        engine.predator_count(),
        engine.apex_count()
    );
    println!("Extinction: {}", engine.has_extinction());
    if let Some(last) = log.last() {
        println!();
        println!("{}", last.render_grid());
    }

    if let Some(path) = output {
        log.save(&path)?;
        println!("Snapshots ({}): {:?}", log.run_id, path);
    }

    Ok(())
}

fn run_analysis(
    config: Config,
    settings: AnalysisSettings,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Comparative Analysis ===");
    println!("Runs per scenario: {}", settings.runs);
    println!("Max turns: {}", settings.max_turns);
    println!("Base seed: {}", settings.base_seed);
    println!();

    let start = Instant::now();
    let report = AnalysisRunner::new(config, settings).run_full()?;

    println!("{}", report);
    println!("Time: {:.2}s", start.elapsed().as_secs_f64());

    if let Some(path) = output {
        report.save(&path)?;
        println!("Report: {:?}", path);
    }

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
