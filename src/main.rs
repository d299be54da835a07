use std::fs::{self, File};
use std::io::{self, BufWriter, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use comfy_table::Table;
use tracing::info;

use milk_run::config::{RoutingProfile, ServiceConfig};
use milk_run::export::{RouteSummary, RouteTable};
use milk_run::haversine::HaversineMatrix;
use milk_run::ors::OrsClient;
use milk_run::osrm::{OsrmClient, OsrmConfig};
use milk_run::solver::FirstSolutionStrategy;
use milk_run::traits::DistanceMatrixProvider;
use milk_run::{parse_addresses, FailureKind, RouteError, RoutePlanner, SolveOptions};

#[derive(Parser)]
#[clap(author, version, about = "Optimize a single-vehicle delivery route", long_about = None)]
struct Cli {
    /// File with one address per line, depot first (reads stdin if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write the route table as CSV to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Where road distances come from
    #[arg(short, long, value_enum, default_value_t = MatrixSource::Ors)]
    matrix: MatrixSource,

    /// OSRM base URL (with --matrix osrm)
    #[arg(long, default_value = "http://localhost:5000")]
    osrm_url: String,

    /// Routing profile, e.g. driving-car or driving-hgv (overrides ORS_PROFILE)
    #[arg(short, long)]
    profile: Option<String>,

    #[arg(long, value_enum, default_value_t = Strategy::PathCheapestArc)]
    strategy: Strategy,

    /// Skip the local search phase
    #[arg(long)]
    no_improve: bool,

    /// Maximum local search passes
    #[arg(long, default_value_t = 1000)]
    iterations: usize,

    /// Local search time limit in seconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// Print the result as JSON instead of a table
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum MatrixSource {
    Ors,
    Osrm,
    Haversine,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    PathCheapestArc,
    CheapestInsertion,
}

fn read_input(input: Option<&PathBuf>) -> anyhow::Result<String> {
    match input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("reading stdin")?;
            Ok(text)
        }
    }
}

fn hint(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Credentials => "verify your OpenRouteService API key (ORS_API_KEY)",
        FailureKind::Addresses => "check address formatting and that every address is routable",
        FailureKind::ServiceUnavailable => {
            "check your internet connection or try fewer addresses (API limits)"
        }
        FailureKind::Solver => "the distance matrix could not be optimized",
    }
}

fn failure_message(err: &RouteError) -> String {
    format!("route optimization failed: {} ({})", err, hint(err.kind()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(io::stderr)
        .init();

    dotenvy::dotenv().ok();

    let addresses = parse_addresses(&read_input(cli.input.as_ref())?);

    let mut config = ServiceConfig::from_env()?;
    if let Some(profile) = &cli.profile {
        config.profile = profile.parse::<RoutingProfile>()?;
    }
    let ors = OrsClient::new(config)?;

    let matrix_provider: Box<dyn DistanceMatrixProvider> = match cli.matrix {
        MatrixSource::Ors => Box::new(ors.clone()),
        MatrixSource::Osrm => Box::new(OsrmClient::new(OsrmConfig {
            base_url: cli.osrm_url.clone(),
            ..OsrmConfig::default()
        })?),
        MatrixSource::Haversine => Box::new(HaversineMatrix::default()),
    };

    let options = SolveOptions {
        first_solution: match cli.strategy {
            Strategy::PathCheapestArc => FirstSolutionStrategy::PathCheapestArc,
            Strategy::CheapestInsertion => FirstSolutionStrategy::CheapestInsertion,
        },
        improve: !cli.no_improve,
        local_search_iterations: cli.iterations,
        time_limit: cli.time_limit.map(Duration::from_secs),
    };

    info!("optimizing {} addresses", addresses.len());
    let planner = RoutePlanner::new(&ors, matrix_provider, options);
    let result = match planner.plan(&addresses) {
        Ok(result) => result,
        Err(err) => anyhow::bail!(failure_message(&err)),
    };

    let table = RouteTable::from_result(&result);
    let summary = RouteSummary::from_result(&result);

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "summary": summary,
                "route": table.rows,
                "coordinates": result.lat_lon_points(),
                "stats": result.stats,
            }))?
        );
    } else {
        let mut display = Table::new();
        display.set_header(vec!["Stop", "Address", "Type"]);
        for row in &table.rows {
            display.add_row(vec![row.stop.to_string(), row.address.clone(), row.kind.to_string()]);
        }
        println!("{summary}");
        println!("{display}");
    }

    if let Some(path) = &cli.output {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        table.write_csv(BufWriter::new(file))?;
        info!("exported route to {}", path.display());
    }

    Ok(())
}
