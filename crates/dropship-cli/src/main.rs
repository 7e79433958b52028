mod simulate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dropship_engine::{
    catalog::rank_signals, find_profitable_programs, print_on_demand_designs, programs_for_niche,
    StaticCatalog, TrendSource,
};
use serde::Serialize;

use crate::simulate::{load_settings_or_default, run_simulation, SimulationOptions};

#[derive(Debug, Parser)]
#[command(name = "dropship-cli")]
#[command(about = "Dropship automation simulator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run automation cycles offline and print the resulting analytics
    Simulate {
        /// Number of automation cycles to run
        #[arg(long, default_value_t = 3)]
        cycles: u32,
        /// Monitor ticks to run after the cycles
        #[arg(long, default_value_t = 4)]
        ticks: u32,
        /// Seed for reproducible metrics
        #[arg(long)]
        seed: Option<u64>,
        /// Publish attempts per content piece before it is marked failed
        #[arg(long, default_value_t = 3)]
        max_attempts: u32,
        /// YAML file with automation settings
        #[arg(long, env = "DROPSHIP_SETTINGS_PATH")]
        settings: Option<PathBuf>,
    },
    /// List profitable affiliate programs, best first
    Affiliates {
        /// Only programs matching this niche (e.g. `beauty`, `tech`)
        #[arg(long)]
        niche: Option<String>,
    },
    /// List trending videos, highest profit potential first
    Trends,
    /// List product niches by profitability
    Niches,
    /// Print-on-demand design concepts for each trending video
    Designs,
}

#[derive(Debug, Serialize)]
struct TrendDesigns {
    trend: String,
    designs: Vec<String>,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Simulate {
            cycles,
            ticks,
            seed,
            max_attempts,
            settings,
        }) => {
            let settings = load_settings_or_default(settings.as_deref())?;
            let options = SimulationOptions {
                cycles,
                ticks,
                seed,
                max_attempts,
            };
            let report = run_simulation(settings, &options).await;
            print_json(&report)?;
        }
        Some(Commands::Affiliates { niche }) => {
            let programs = match niche.as_deref() {
                Some(niche) => programs_for_niche(niche),
                None => find_profitable_programs(),
            };
            print_json(&programs)?;
        }
        Some(Commands::Trends) => {
            let mut signals = StaticCatalog.trending()?;
            rank_signals(&mut signals);
            print_json(&signals)?;
        }
        Some(Commands::Niches) => print_json(&StaticCatalog.niches()?)?,
        Some(Commands::Designs) => {
            let mut signals = StaticCatalog.trending()?;
            rank_signals(&mut signals);
            let designs: Vec<TrendDesigns> = signals
                .iter()
                .map(|signal| TrendDesigns {
                    trend: signal.title.clone(),
                    designs: print_on_demand_designs(signal),
                })
                .collect();
            print_json(&designs)?;
        }
        None => println!("dropship-cli ready; run with --help for commands"),
    }

    Ok(())
}
