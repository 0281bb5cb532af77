//! Contact Grapher - infection spread over a contact graph

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_grapher::{
    colouring::ColourMapper,
    conditions::{Connectivity, SimulationConditions},
    frame::{self, ColourMode, Frame},
    generator::ContactLevel,
    layout::Layout,
    loader,
    renderer::Renderer,
    simulation::{Simulation, DEFAULT_TICKS},
};

#[derive(Parser)]
#[command(
    name = "contact-grapher",
    about = "Simulate and visualize infection spread across a contact graph",
    version
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Colour people from CSV files by how far they are from an infection
    Degrees {
        /// CSV of people: identifier, name, age, severity
        #[arg(long, default_value = "data/persons.csv")]
        people: PathBuf,

        /// CSV of contacts: id1, id2, weight
        #[arg(long, default_value = "data/connections.csv")]
        contacts: PathBuf,

        /// Identifiers of the infected people
        #[arg(short, long, num_args = 1.., required = true)]
        infected: Vec<String>,

        /// Write the frame as JSON
        #[arg(long)]
        export: Option<PathBuf>,

        /// Don't open a window
        #[arg(long)]
        headless: bool,
    },

    /// Generate a population and simulate infection week by week
    Simulate {
        /// Number of people, 11 to 60
        #[arg(short, long, default_value = "20")]
        population: usize,

        /// high, medium or low
        #[arg(short, long, default_value = "medium")]
        contact_level: ContactLevel,

        /// Number of people infected at the start
        #[arg(short, long, default_value = "1")]
        infected: usize,

        /// yes for one group, no for two isolated groups
        #[arg(long, default_value = "yes")]
        connected: Connectivity,

        /// Number of weeks to simulate
        #[arg(short, long, default_value_t = DEFAULT_TICKS)]
        ticks: usize,

        /// Colour by degrees apart instead of infection status
        #[arg(long)]
        with_degrees: bool,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Write every frame as JSON
        #[arg(long)]
        export: Option<PathBuf>,

        /// Don't open a window
        #[arg(long)]
        headless: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(log_filter(cli.verbose))
        .init();

    match cli.command {
        Commands::Degrees {
            people,
            contacts,
            infected,
            export,
            headless,
        } => {
            let frames = run_degrees(&people, &contacts, &infected)?;
            finish(frames, export, headless, "Contact Grapher - degrees apart")
        }
        Commands::Simulate {
            population,
            contact_level,
            infected,
            connected,
            ticks,
            with_degrees,
            seed,
            export,
            headless,
        } => {
            let conditions = SimulationConditions::new(population, contact_level, infected, connected)?;
            let mut builder = Simulation::builder().ticks(ticks).with_degrees(with_degrees);
            if let Some(seed) = seed {
                builder = builder.seed(seed);
            }
            let mut simulation = builder.build_from_conditions(&conditions)?;
            let frames = simulation.run();

            let graph = simulation.graph();
            println!(
                "{} of {} people infected after {} weeks",
                graph.infected_count(),
                graph.len(),
                ticks
            );
            finish(frames, export, headless, "Contact Grapher - simulation")
        }
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`
fn log_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn run_degrees(
    people: &Path,
    contacts: &Path,
    infected: &[String],
) -> anyhow::Result<Vec<Frame>> {
    let mut graph = loader::load_graph_csv(people, contacts)
        .with_context(|| format!("loading {} and {}", people.display(), contacts.display()))?;
    graph.set_infected(infected)?;
    graph.recalculate_degrees();

    for person in graph.people() {
        match person.degrees_apart {
            Some(d) => println!("{:<8} {:<8} {}", person.identifier, person.name, d),
            None => println!("{:<8} {:<8} unreachable", person.identifier, person.name),
        }
    }

    let positions = Layout::default().compute(&graph);
    let frame = Frame::capture(&graph, 0, ColourMode::Degrees, &positions, &mut ColourMapper::new());
    Ok(vec![frame])
}

fn finish(
    frames: Vec<Frame>,
    export: Option<PathBuf>,
    headless: bool,
    title: &str,
) -> anyhow::Result<()> {
    if let Some(path) = export {
        frame::export_json(&frames, &path)
            .with_context(|| format!("exporting frames to {}", path.display()))?;
        info!(path = %path.display(), frames = frames.len(), "exported frames");
    }

    if !headless {
        Renderer::new(frames).title(title).create_window()?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_log_filter_prefers_rust_log() {
        std::env::set_var("RUST_LOG", "warn");
        assert_eq!(log_filter(true).to_string(), "warn");

        std::env::remove_var("RUST_LOG");
        assert_eq!(log_filter(true).to_string(), "debug");
        assert_eq!(log_filter(false).to_string(), "info");
    }
}
