use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use db_infra::config::settings::{DEFAULT_READY_TIMEOUT_MS, DEFAULT_SETTLE_MS};
use db_infra::{
    orchestrate_provision, validate_descriptor, ExistenceCheck, ProvisionError, ProvisionOutcome,
    ProvisionSettings, Provisioner, ReadinessStrategy, TiberiusServer,
};
use schema::ScriptSource;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_ALREADY_EXISTS: i32 = 3;

#[derive(Clone, Copy, ValueEnum)]
enum Readiness {
    Fixed,
    Poll,
}

#[derive(Parser)]
#[command(name = "sqlprov")]
#[command(about = "Create a SQL Server database and apply its schema script")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check connection string syntax without connecting
    Validate {
        #[arg(short, long)]
        connection: String,
    },
    /// Report whether the database named in the connection string exists
    Exists {
        #[arg(short, long)]
        connection: String,
    },
    /// Create the database and apply the schema script
    Create(CreateArgs),
}

#[derive(Args)]
struct CreateArgs {
    /// Connection string naming the server, the new database and credentials
    #[arg(short, long)]
    connection: String,

    /// Schema script to apply instead of the embedded one
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Directory for the .mdf/.ldf files (relative to the executable unless absolute)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Catalog used to issue CREATE DATABASE
    #[arg(long)]
    admin_catalog: Option<String>,

    /// How to wait for the new database before applying the schema
    #[arg(long, value_enum)]
    readiness: Option<Readiness>,

    /// Fixed settling delay in milliseconds
    #[arg(long)]
    settle_ms: Option<u64>,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("db_infra=info,tiberius=warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_env_filter(filter)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also arrive here and are not failures
            let _ = e.print();
            std::process::exit(if e.use_stderr() { EXIT_USAGE } else { 0 });
        }
    };

    let settings = match ProvisionSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(EXIT_USAGE);
        }
    };

    match cli.command {
        Command::Validate { connection } => validate(&connection),
        Command::Exists { connection } => exists(settings, &connection).await,
        Command::Create(args) => create(settings, args).await,
    }
}

fn validate(connection: &str) {
    match validate_descriptor(connection) {
        Ok(descriptor) => {
            println!("Connection string is valid");
            if let Some(catalog) = descriptor.catalog() {
                println!("Target database: {catalog}");
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(EXIT_FAILURE);
        }
    }
}

async fn exists(settings: ProvisionSettings, connection: &str) {
    let descriptor = match validate_descriptor(connection) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    let provisioner = Provisioner::new(TiberiusServer, settings);
    match provisioner.check_exists(&descriptor).await {
        ExistenceCheck::Exists => println!("exists"),
        ExistenceCheck::Absent => println!("absent"),
        ExistenceCheck::CheckFailed(reason) => {
            println!("check failed: {reason}");
            std::process::exit(EXIT_FAILURE);
        }
    }
}

async fn create(settings: ProvisionSettings, args: CreateArgs) {
    let settings = apply_overrides(settings, &args);

    let script = match ScriptSource::from_option(args.script.as_deref()).load() {
        Ok(script) => script,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    let print_progress = |_code: i32, message: &str| println!("{message}");

    match orchestrate_provision(settings, &args.connection, &script, &print_progress).await {
        Ok(ProvisionOutcome::Created { .. }) => {}
        Ok(ProvisionOutcome::Skipped { reason }) => {
            println!("Nothing to do: {reason}");
        }
        Err(ProvisionError::AlreadyExists { .. }) => {
            eprintln!("Error - Database already exists");
            std::process::exit(EXIT_ALREADY_EXISTS);
        }
        Err(e @ ProvisionError::InvalidDescriptor { .. }) => {
            eprintln!("{e}");
            std::process::exit(EXIT_FAILURE);
        }
        Err(e) => {
            eprintln!("Error occurred - {e}");
            std::process::exit(EXIT_FAILURE);
        }
    }
}

/// Command-line flags win over `SQLPROV_*` environment settings.
fn apply_overrides(mut settings: ProvisionSettings, args: &CreateArgs) -> ProvisionSettings {
    if let Some(dir) = &args.data_dir {
        settings.data_dir = dir.clone();
    }
    if let Some(catalog) = &args.admin_catalog {
        settings.admin_catalog = catalog.clone();
    }

    settings.readiness = match (args.readiness, args.settle_ms) {
        (Some(Readiness::Poll), _) => match settings.readiness {
            poll @ ReadinessStrategy::Poll { .. } => poll,
            ReadinessStrategy::FixedDelay(_) => {
                ReadinessStrategy::poll(Duration::from_millis(DEFAULT_READY_TIMEOUT_MS))
            }
        },
        (_, Some(ms)) => ReadinessStrategy::FixedDelay(Duration::from_millis(ms)),
        (Some(Readiness::Fixed), None) => match settings.readiness {
            fixed @ ReadinessStrategy::FixedDelay(_) => fixed,
            ReadinessStrategy::Poll { .. } => {
                ReadinessStrategy::FixedDelay(Duration::from_millis(DEFAULT_SETTLE_MS))
            }
        },
        (None, None) => settings.readiness,
    };

    settings
}
