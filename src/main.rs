use anyhow::{Context, Result};
use butterfly_guidance::annotations::AnnotationsType;
use butterfly_guidance::{OverviewType, RouteApi, Scenario};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "butterfly-guidance")]
#[command(about = "Turn-by-turn route assembly from unpacked search results", long_about = None)]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the routes of a scenario file and print the response as JSON
    Route {
        /// Scenario file (facade data, search results, optional parameters)
        scenario: PathBuf,
        /// Only totals and geometry, no steps
        #[arg(long)]
        no_steps: bool,
        /// Annotation series: `true` for all, or e.g. `speed,duration,nodes`
        #[arg(long)]
        annotations: Option<AnnotationsType>,
        /// Overview geometry: simplified, full or false
        #[arg(long)]
        overview: Option<OverviewType>,
        /// Pretty-print the response
        #[arg(long)]
        pretty: bool,
    },
    /// Print what a scenario file contains
    Inspect {
        /// Scenario file
        scenario: PathBuf,
    },
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Commands::Route {
            scenario,
            no_steps,
            annotations,
            overview,
            pretty,
        } => {
            let start = Instant::now();
            let loaded = Scenario::from_path(&scenario)?;

            let mut parameters = loaded.parameters();
            if no_steps {
                parameters.steps = false;
            }
            if let Some(selected) = annotations {
                parameters.annotations = !selected.is_empty();
                parameters.annotations_type = selected;
            }
            if let Some(overview) = overview {
                parameters.overview = overview;
            }

            let response = RouteApi::new(&loaded.facade, &parameters)
                .make_response(&loaded.many_routes())
                .with_context(|| format!("Failed to assemble routes of {}", scenario.display()))?;

            info!(
                routes = response.routes.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Route response assembled"
            );

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            if pretty {
                serde_json::to_writer_pretty(&mut out, &response)?;
            } else {
                serde_json::to_writer(&mut out, &response)?;
            }
            writeln!(out)?;
        }
        Commands::Inspect { scenario } => {
            let loaded = Scenario::from_path(&scenario)?;
            let legs: usize = loaded.routes.iter().map(|r| r.leg_count()).sum();
            let segments: usize = loaded
                .routes
                .iter()
                .flat_map(|r| r.legs.iter())
                .map(|leg| leg.path.len())
                .sum();

            println!("Scenario: {}", scenario.display());
            println!("  Routes:          {}", loaded.routes.len());
            println!("  Legs:            {}", legs);
            println!("  Path segments:   {}", segments);
            println!("  Overrides:       {}", loaded.facade.override_count());
            println!("  Parameters:      {:?}", loaded.parameters());
        }
    }

    Ok(())
}
