//! Tycoon CLI - airline game automation
//!
//! Usage:
//!   tycoon routes <HUB>                 Extract and cache stats of every route of a hub
//!   tycoon seats <HUB> <DESTS>          Run the seat configurator over a circuit
//!   tycoon schedule <HUB> <DESTS>       Open, schedule and reconfigure routes
//!   tycoon buy <HUB>                    Buy new aircraft into a hub
//!   tycoon report <HUB> <DEST>          Show cached seat configurations
//!   tycoon init                         Write a default tycoon.toml

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use tycoon_browser::configurator::find_seat_configs;
use tycoon_browser::{fleet, game, planning, BrowserConfig, BrowserSession, CircuitLeg, PageDriver};
use tycoon_core::config::CONFIG_FILE;
use tycoon_core::rank::{nth_best, WaveReport};
use tycoon_core::{Aircraft, Credentials, Metric, Route, TycoonConfig, WaveStat};
use tycoon_store::{RouteStore, SeatConfigStore};

#[derive(Parser)]
#[command(name = "tycoon")]
#[command(author, version, about = "Airline game route and seat automation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Cache directory (overrides `data_dir` from the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Show the browser window
    #[arg(long, global = true)]
    no_headless: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and cache route stats for every line of a hub
    Routes {
        /// Hub airport code, e.g. CGK
        hub: String,

        /// Re-extract routes that are already cached
        #[arg(short, long)]
        force: bool,
    },

    /// Run the seat configurator over a circuit of cached routes
    Seats {
        /// Hub airport code
        hub: String,

        /// Comma separated destination codes, e.g. TFS,ZRH,AGP
        destinations: String,

        #[command(flatten)]
        aircraft: AircraftArgs,
    },

    /// Open routes if needed, schedule flights and reconfigure seats
    Schedule {
        /// Hub airport code
        hub: String,

        /// Comma separated destination codes
        destinations: String,

        #[command(flatten)]
        aircraft: AircraftArgs,

        #[command(flatten)]
        pick: PickArgs,
    },

    /// Buy new aircraft into a hub
    Buy {
        /// Hub airport code
        hub: String,

        #[command(flatten)]
        aircraft: AircraftArgs,

        /// Number of aircraft (defaults to `buy_count` from the config file)
        #[arg(short, long)]
        number: Option<u32>,
    },

    /// Print cached seat configurations of a route without a browser
    Report {
        /// Hub airport code
        hub: String,

        /// Destination code
        destination: String,

        #[command(flatten)]
        aircraft: AircraftArgs,

        #[command(flatten)]
        pick: PickArgs,
    },

    /// Write a default configuration file
    Init,
}

#[derive(clap::Args)]
struct AircraftArgs {
    /// Aircraft maker as named in the game, e.g. Ilyushin
    #[arg(short = 'm', long)]
    maker: Option<String>,

    /// Aircraft model of the maker, e.g. 96-300
    #[arg(short = 'a', long)]
    model: Option<String>,
}

impl AircraftArgs {
    fn resolve(self, config: &TycoonConfig) -> Aircraft {
        let defaults = config.default_aircraft();
        Aircraft::new(
            self.maker.unwrap_or(defaults.maker),
            self.model.unwrap_or(defaults.model),
        )
    }
}

#[derive(clap::Args)]
struct PickArgs {
    /// Rank of the seat configuration to use (defaults to `nth_best` from the config file)
    #[arg(short, long)]
    nth: Option<usize>,

    /// Metric the seat configurations are ranked by
    #[arg(long, value_enum, default_value_t = CliMetric::TotalTurnover)]
    metric: CliMetric,
}

/// CLI-friendly metric enum
#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "snake_case")]
enum CliMetric {
    Roi,
    TotalTurnover,
    TurnoverPerWave,
    TurnoverDays,
}

impl From<CliMetric> for Metric {
    fn from(m: CliMetric) -> Self {
        match m {
            CliMetric::Roi => Metric::Roi,
            CliMetric::TotalTurnover => Metric::TotalTurnover,
            CliMetric::TurnoverPerWave => Metric::TurnoverPerWave,
            CliMetric::TurnoverDays => Metric::TurnoverDays,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Commands::Init = cli.command {
        return cmd_init(&cli.config);
    }

    let mut config = TycoonConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    match cli.command {
        Commands::Report {
            hub,
            destination,
            aircraft,
            pick,
        } => cmd_report(&config, &hub, &destination, aircraft.resolve(&config), pick),
        command => {
            let session = BrowserSession::launch_with_config(BrowserConfig::from_defaults(
                &config.browser,
                !cli.no_headless,
            ))
            .await
            .context("Failed to start the browser")?;

            let result = run_online(&session, &config, command).await;
            if let Err(e) = session.close().await {
                warn!("Failed to close the browser: {}", e);
            }
            result
        }
    }
}

async fn run_online(driver: &dyn PageDriver, config: &TycoonConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Routes { hub, force } => cmd_routes(driver, config, &hub, force).await,
        Commands::Seats {
            hub,
            destinations,
            aircraft,
        } => {
            let aircraft = aircraft.resolve(config);
            cmd_seats(driver, config, &hub, &split_destinations(&destinations), &aircraft).await
        }
        Commands::Schedule {
            hub,
            destinations,
            aircraft,
            pick,
        } => {
            let aircraft = aircraft.resolve(config);
            cmd_schedule(driver, config, &hub, &split_destinations(&destinations), &aircraft, pick)
                .await
        }
        Commands::Buy {
            hub,
            aircraft,
            number,
        } => {
            let aircraft = aircraft.resolve(config);
            let number = number.unwrap_or(config.defaults.buy_count);
            login(driver, config).await?;
            fleet::buy_aircraft(driver, config, &hub, &aircraft, number).await?;
            println!("Bought {} {} for hub {}", number, aircraft, hub);
            Ok(())
        }
        Commands::Report { .. } | Commands::Init => Ok(()),
    }
}

fn split_destinations(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|d| d.trim().to_uppercase())
        .filter(|d| !d.is_empty())
        .collect()
}

/// Cache key of a circuit's seat configurations
fn circuit_key(destinations: &[String]) -> String {
    destinations.join("-")
}

async fn login(driver: &dyn PageDriver, config: &TycoonConfig) -> Result<()> {
    let credentials = Credentials::from_env(&config.game)?;
    game::login(driver, config, &credentials)
        .await
        .context("Login failed")
}

fn cmd_init(path: &Path) -> Result<()> {
    if path.exists() {
        println!("{} already exists, leaving it untouched", path.display());
        return Ok(());
    }
    TycoonConfig::write_default(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

async fn cmd_routes(driver: &dyn PageDriver, config: &TycoonConfig, hub: &str, force: bool) -> Result<()> {
    let store = RouteStore::new(&config.data_dir);
    login(driver, config).await?;
    let hub_id = game::find_hub_id(driver, config, hub).await?;

    let destinations = game::list_destinations(driver, config, hub, hub_id).await?;
    println!("All routes from hub {}: {}", hub, destinations.join(","));

    let cached = store.cached_routes(hub)?;
    for destination in &destinations {
        if cached.contains(destination) && !force {
            info!("{} - {} already extracted", hub, destination);
            continue;
        }
        let route = Route::new(hub, destination);
        let stats = game::extract_route_stats(driver, config, &route).await?;
        let path = store.save(hub, destination, &stats)?;
        println!("{}: {:?} -> {}", route, stats, path.display());
    }
    Ok(())
}

async fn cmd_seats(
    driver: &dyn PageDriver,
    config: &TycoonConfig,
    hub: &str,
    destinations: &[String],
    aircraft: &Aircraft,
) -> Result<()> {
    let routes = RouteStore::new(&config.data_dir);
    let circuit = destinations
        .iter()
        .map(|destination| -> Result<CircuitLeg> {
            Ok(CircuitLeg {
                route: Route::new(hub, destination),
                stats: routes.load(hub, destination).with_context(|| {
                    format!("Run `tycoon routes {}` first to cache {} - {}", hub, hub, destination)
                })?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let waves = find_seat_configs(driver, config, aircraft, &circuit).await?;
    SeatConfigStore::new(&config.data_dir).save(hub, &circuit_key(destinations), aircraft, &waves)?;
    print!("{}", WaveReport::new(&waves));
    Ok(())
}

async fn cmd_schedule(
    driver: &dyn PageDriver,
    config: &TycoonConfig,
    hub: &str,
    destinations: &[String],
    aircraft: &Aircraft,
    pick: PickArgs,
) -> Result<()> {
    let routes = RouteStore::new(&config.data_dir);
    let seats = SeatConfigStore::new(&config.data_dir);
    let metric = Metric::from(pick.metric);
    let nth = pick.nth.unwrap_or(config.defaults.nth_best);

    login(driver, config).await?;
    let hub_id = game::find_hub_id(driver, config, hub).await?;

    for destination in destinations {
        let route = Route::new(hub, destination);
        info!("Working on route {}", route);

        let stats = if routes.exists(hub, destination) {
            routes.load(hub, destination)?
        } else {
            game::open_route(driver, config, hub_id, &route).await?;
            let stats = game::extract_route_stats(driver, config, &route).await?;
            routes.save(hub, destination, &stats)?;
            stats
        };

        let waves = match seats.load_cached(hub, destination, aircraft)? {
            Some(waves) => waves,
            None => {
                let leg = CircuitLeg {
                    route: route.clone(),
                    stats,
                };
                let waves = find_seat_configs(driver, config, aircraft, &[leg]).await?;
                seats.save(hub, destination, aircraft, &waves)?;
                waves
            }
        };

        let assigned = planning::assigned_flight_count(driver, config, &route).await?;
        let wave = nth_best(&waves, metric, nth)
            .with_context(|| format!("No seat configuration ranked {} by {}", nth, metric))?;
        print_pick(wave, nth, metric);

        let count = planning::flights_to_schedule(wave, assigned);
        println!(
            "Excluding {} already assigned, scheduling {} flight(s)",
            assigned, count
        );
        planning::schedule_flights(driver, config, hub_id, &route, aircraft, count).await?;

        let reconfigured = planning::reconfigure_seats(driver, config, &route, wave).await?;
        println!("Reconfigured {} aircraft on {}", reconfigured, route);
    }
    Ok(())
}

fn cmd_report(
    config: &TycoonConfig,
    hub: &str,
    destination: &str,
    aircraft: Aircraft,
    pick: PickArgs,
) -> Result<()> {
    let waves = SeatConfigStore::new(&config.data_dir).load(hub, destination, &aircraft)?;
    let metric = Metric::from(pick.metric);
    let nth = pick.nth.unwrap_or(config.defaults.nth_best);

    println!("{} - {} ({})", hub, destination, aircraft);
    print!("{}", WaveReport::new(&waves));
    let wave = nth_best(&waves, metric, nth)?;
    print_pick(wave, nth, metric);
    Ok(())
}

fn print_pick(wave: &WaveStat, nth: usize, metric: Metric) {
    println!(
        "Pick #{} by {}: wave {} ({} economy, {} business, {} first, {} cargo)",
        nth, metric, wave.no, wave.economy, wave.business, wave.first, wave.cargo
    );
}
