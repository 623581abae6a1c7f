//! Parkit CLI
//!
//! Records vehicle entries and exits against the configured database.
//!
//! ```sh
//! # Park a car
//! parkit enter AB-123-CD car
//!
//! # Leave and get billed
//! parkit exit AB-123-CD
//!
//! # Free spots, plus the running fare of one vehicle
//! parkit status --vehicle AB-123-CD
//!
//! # Validate config without touching the database
//! parkit --check
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info};

use parkit::config::AppConfig;
use parkit::domain::RepositoryProvider;
use parkit::infrastructure::database::migrator::Migrator;
use parkit::{init_database, init_tracing, ParkingService, ParkingType, SeaOrmRepositoryProvider};

/// Parkit: parking session and fare engine.
#[derive(Parser, Debug)]
#[command(
    name = "parkit",
    version,
    about = "Parking spot allocation and fare billing",
    long_about = "Parkit allocates parking spots by vehicle category, issues tickets \
                  on entry and bills them on exit.\n\n\
                  Default config: ~/.config/parkit/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "PARKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Park a vehicle and print its ticket.
    Enter {
        vehicle: String,
        /// Spot category (car or bike).
        category: ParkingType,
    },
    /// Release a vehicle and print the billed ticket.
    Exit { vehicle: String },
    /// Show free spots per category.
    Status {
        /// Also show the open ticket and running fare of this vehicle.
        #[arg(long)]
        vehicle: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(parkit::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_tracing(&config.logging)?;
    info!("Configuration loaded from {}", config_path.display());

    let fares = config.fare_schedule()?;

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        for category in ParkingType::ALL {
            match fares.hourly_rate(category) {
                Ok(rate) => println!("   Rate {:<6} : {}/h", category, rate),
                Err(_) => println!("   Rate {:<6} : not configured", category),
            }
        }
        return Ok(());
    }

    let Some(command) = cli.command else {
        eprintln!("No command given, see --help");
        return Ok(());
    };

    // ── Database ───────────────────────────────────────────────
    let db = init_database(&config.database).await?;
    if !cli.no_migrate {
        if let Err(e) = Migrator::up(&db, None).await {
            error!("Failed to run migrations: {}", e);
            return Err(e.into());
        }
    }

    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db));
    let service = ParkingService::new(repos, fares);

    match command {
        Command::Enter { vehicle, category } => {
            let ticket = service.enter(&vehicle, category).await?;
            println!("Ticket {}", ticket.id);
            println!("   Vehicle : {}", ticket.vehicle_registration);
            println!("   Spot    : {} ({})", ticket.spot.id, ticket.spot.category);
            println!("   Entry   : {}", ticket.entry_time);
        }
        Command::Exit { vehicle } => {
            let ticket = service.exit(&vehicle).await?;
            println!("Ticket {}", ticket.id);
            println!("   Vehicle : {}", ticket.vehicle_registration);
            println!("   Spot    : {} ({})", ticket.spot.id, ticket.spot.category);
            println!("   Entry   : {}", ticket.entry_time);
            if let Some(exit_time) = ticket.exit_time {
                println!("   Exit    : {}", exit_time);
            }
            println!("   Price   : {}", ticket.price);
        }
        Command::Status { vehicle } => {
            for category in ParkingType::ALL {
                let free = service.available_spots(category).await?;
                println!("{:<6} {} free", category, free);
            }
            if let Some(vehicle) = vehicle {
                match service.current_ticket(&vehicle).await? {
                    Some(ticket) => {
                        let fare = service.preview_fare(&vehicle).await?;
                        println!(
                            "{} parked at spot {} since {}",
                            ticket.vehicle_registration, ticket.spot.id, ticket.entry_time
                        );
                        println!(
                            "   {} min, {} billed h, due now: {}",
                            fare.duration_minutes, fare.billed_hours, fare.total
                        );
                    }
                    None => println!("{} is not parked", vehicle.trim()),
                }
            }
        }
    }

    Ok(())
}
