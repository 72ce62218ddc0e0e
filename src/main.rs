//! Sonar Bot entry point
//!
//! Runs trials headless and reports outcomes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use sonar_bot::nn::{Activation, NeuralNetwork};
use sonar_bot::persistence::NetworkStore;
use sonar_bot::sim::{AgentKind, SimulationRunner, survey};
use sonar_bot::{Scoreboard, Settings, SimError};

#[derive(Parser, Debug)]
#[command(name = "sonar-bot", version, about = "Run sonar bots through noise stages")]
struct Cli {
    /// Settings file (defaults are used when it is missing)
    #[arg(long, global = true, default_value = "settings.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run consecutive trials and print the outcome tally.
    Run {
        /// Network values document (overrides settings).
        #[arg(long)]
        values: Option<PathBuf>,
        /// Network id inside the document (overrides settings).
        #[arg(long)]
        id: Option<String>,
        /// First seed.
        #[arg(long)]
        seed: Option<u32>,
        /// Number of stages.
        #[arg(long)]
        stages: Option<u32>,
        /// Node activation (sigmoid, sigmoid-estimate, binary, linear).
        #[arg(long)]
        activation: Option<Activation>,
        /// Drive forward without a network.
        #[arg(long)]
        blind: bool,
    },
    /// Write freshly initialised network values under an id.
    Init {
        #[arg(long)]
        values: Option<PathBuf>,
        #[arg(long)]
        id: Option<String>,
        /// Layer sizes, comma separated (e.g. 18,8,4).
        #[arg(long, value_delimiter = ',')]
        shape: Option<Vec<usize>>,
        /// RNG seed for the weights.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Report which stages are navigable.
    Survey {
        #[arg(long)]
        seed: Option<u32>,
        #[arg(long)]
        stages: Option<u32>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut settings = Settings::load(&cli.settings);

    match cli.command {
        Command::Run {
            values,
            id,
            seed,
            stages,
            activation,
            blind,
        } => {
            apply_overrides(&mut settings, values, id, seed, stages);
            if let Some(activation) = activation {
                settings.network.activation = activation;
            }
            run(&settings, blind)
        }
        Command::Init {
            values,
            id,
            shape,
            seed,
        } => {
            apply_overrides(&mut settings, values, id, None, None);
            if let Some(shape) = shape {
                settings.network.shape = shape;
            }
            init(&settings, seed)
        }
        Command::Survey { seed, stages } => {
            apply_overrides(&mut settings, None, None, seed, stages);
            run_survey(&settings);
            Ok(())
        }
    }
}

fn apply_overrides(
    settings: &mut Settings,
    values: Option<PathBuf>,
    id: Option<String>,
    seed: Option<u32>,
    stages: Option<u32>,
) {
    if let Some(values) = values {
        settings.network.values_path = values;
    }
    if let Some(id) = id {
        settings.network.id = id;
    }
    if let Some(seed) = seed {
        settings.trials.first_seed = seed;
    }
    if let Some(stages) = stages {
        settings.trials.stage_count = stages;
    }
}

fn run(settings: &Settings, blind: bool) -> Result<()> {
    let kind = if blind {
        AgentKind::Blind
    } else {
        let net = &settings.network;
        let store = NetworkStore::open(&net.values_path)
            .with_context(|| format!("loading network values from {}", net.values_path.display()))?;
        let mut network = NeuralNetwork::new(&net.shape)?.with_activation(net.activation);
        network
            .load_values(store.read_values(&net.id)?)
            .with_context(|| format!("loading network {:?}", net.id))?;
        AgentKind::Network(network)
    };

    log::info!(
        "Running {} bot on seeds {:?}",
        kind.as_str(),
        settings.seeds()
    );
    let mut runner = SimulationRunner::from_settings(settings, kind)?;
    let mut board = Scoreboard::new();
    for seed in settings.seeds() {
        let report = runner.run_trial(seed)?;
        if let Some(rank) = board.record(&report) {
            log::debug!("Seed {} escape ranks #{}", seed, rank);
        }
    }

    let tally = board.tally;
    println!(
        "{} trials: {} escaped, {} collided, {} timed out, {} impossible ({:.1}% escape rate)",
        tally.total(),
        tally.escaped,
        tally.collided,
        tally.timed_out,
        tally.impossible,
        tally.escape_rate() * 100.0
    );
    for (i, entry) in board.escapes.iter().enumerate() {
        println!("#{:<2} seed {:>6}  {:>8} steps", i + 1, entry.seed, entry.steps);
    }
    Ok(())
}

fn init(settings: &Settings, seed: u64) -> Result<()> {
    let net = &settings.network;
    let mut store = match NetworkStore::open(&net.values_path) {
        Ok(store) => store,
        Err(e @ SimError::StorageUnavailable { .. }) => {
            log::warn!("Starting a new values document ({})", e);
            NetworkStore::new(&net.values_path)
        }
        Err(e) => return Err(e.into()),
    };

    let mut network = NeuralNetwork::new(&net.shape)?;
    network.randomize(&mut Pcg32::seed_from_u64(seed));
    store.insert_network(net.id.clone(), &network);
    store.write_data()?;
    println!(
        "Wrote network {:?} with shape {:?} to {}",
        net.id,
        net.shape,
        net.values_path.display()
    );
    Ok(())
}

fn run_survey(settings: &Settings) {
    let mut stage = settings.build_stage();
    let results = survey(&mut stage, settings.seeds());
    let navigable = results.iter().filter(|(_, ok)| *ok).count();
    for (seed, ok) in &results {
        println!("{:>6}  {}", seed, if *ok { "navigable" } else { "impossible" });
    }
    if !results.is_empty() {
        println!(
            "{}/{} navigable ({:.1}%)",
            navigable,
            results.len(),
            navigable as f64 * 100.0 / results.len() as f64
        );
    }
}
