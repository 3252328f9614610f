//! Terminal front-end for the bus lookup server.
//!
//! Walks the same region → stop → bus flow as the web page and prints the
//! arrival board, marking times that roll over to tomorrow.

use std::error::Error;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bus_lookup::client::{ApiClient, ApiConfig, Event, Panel, Session, dispatch};
use bus_lookup::domain::Coordinates;
use bus_lookup::schedule::render_text;
use bus_lookup::suggest::filter_suggestions;

#[derive(Parser)]
#[command(name = "bus-board")]
#[command(about = "Look up bus arrivals from a bus-lookup server", long_about = None)]
struct Cli {
    /// Base URL of the bus-lookup server
    #[arg(long, env = "BUS_API_URL", default_value = "http://127.0.0.1:3000")]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List regions
    Regions {
        /// Only regions starting with this text
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// List the stops of a region
    Stops {
        region: String,

        /// Only stops starting with this text
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// List the buses serving a stop
    Buses { region: String, stop: String },
    /// Show upcoming arrivals of a bus at a stop
    Board {
        region: String,
        stop: String,
        bus: String,
    },
    /// Find the stop nearest to a position and list its buses
    Nearest {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
}

/// Print the panel if it holds a message or board. Returns false on error.
fn print_panel(session: &Session) -> bool {
    match session.panel() {
        Panel::Board(boards) => {
            print!("{}", render_text(boards));
            true
        }
        Panel::NoData => {
            println!("No data for the selected bus.");
            true
        }
        Panel::LocationDenied => {
            println!("Location unavailable. Choose a region and stop instead.");
            true
        }
        Panel::Error(message) => {
            eprintln!("{message}");
            false
        }
        Panel::Empty | Panel::Loading | Panel::Locating => true,
    }
}

fn print_list<S: AsRef<str>>(items: &[S]) {
    for item in items {
        println!("{}", item.as_ref());
    }
}

/// Choose a region, then a stop, loading stops and buses on the way.
async fn select_stop(session: &mut Session, api: &ApiClient, region: String, stop: String) {
    dispatch(session, api, Event::RegionChosen(region)).await;
    if session.stop_enabled() {
        dispatch(session, api, Event::StopChosen(stop)).await;
    }
}

async fn run(cli: Cli) -> Result<bool, Box<dyn Error>> {
    let api = ApiClient::new(ApiConfig::new(cli.api_url).with_timeout(cli.timeout_secs))?;
    let mut session = Session::new();

    match cli.command {
        Commands::Regions { query } => {
            dispatch(&mut session, &api, Event::Started).await;
            print_list(&filter_suggestions(&query, session.regions()));
        }
        Commands::Stops { region, query } => {
            dispatch(&mut session, &api, Event::RegionChosen(region)).await;
            print_list(&filter_suggestions(&query, session.stops()));
        }
        Commands::Buses { region, stop } => {
            select_stop(&mut session, &api, region, stop).await;
            if let Some(buses) = session.buses() {
                print_list(buses);
            }
        }
        Commands::Board { region, stop, bus } => {
            select_stop(&mut session, &api, region, stop).await;
            if session.buses().is_some() {
                dispatch(&mut session, &api, Event::BusChosen(bus)).await;
            }
        }
        Commands::Nearest { lat, lon } => {
            let event = match (lat, lon) {
                (Some(lat), Some(lon)) => Event::LocateRequested(Coordinates::new(lat, lon)?),
                _ => Event::LocationDenied,
            };
            dispatch(&mut session, &api, event).await;

            let stop = &session.stop_input().value;
            if !stop.is_empty() {
                println!("{}, {}", stop, session.region_input().value);
                if let Some(buses) = session.buses() {
                    println!("Buses: {}", buses.join(" "));
                }
            }
        }
    }

    Ok(print_panel(&session))
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bus_lookup=warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
