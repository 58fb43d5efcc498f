use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use stellar_tasks::{HorizonClient, Rejection, ResponseEnvelope, Settings, Tasks};

#[derive(Parser)]
#[command(name = "stellar-tasks", version, about = "Run one ledger task against Horizon")]
struct Cli {
    /// Path to the TOML settings file
    #[arg(short, long, env = "STELLAR_TASKS_CONFIG", default_value = "config/default.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a random keypair locally
    GenerateKeypair,
    /// Fund a new account from the issuer
    CreateAccount {
        /// Account id (G...) to create
        public_key: String,
    },
    /// Make the receiver trust the configured asset
    Trustlines,
    /// Offer the configured asset for lumens from the issuer
    Offers,
    /// Pay the receiver in the configured asset, spending the sender's lumens
    PathPayment,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let cli = Cli::parse();

    if let Command::GenerateKeypair = cli.command {
        return print_outcome(stellar_tasks::tasks::generate_keypair());
    }

    let settings = Settings::load(&cli.config)?;
    info!(
        "using horizon {} on {}",
        settings.horizon_url(),
        settings.network
    );
    let client = HorizonClient::new(&settings)?;
    let tasks = Tasks::new(settings, client);

    let outcome = match cli.command {
        Command::GenerateKeypair => tasks.generate_keypair().await,
        Command::CreateAccount { public_key } => tasks.create_account(&public_key).await,
        Command::Trustlines => tasks.trustlines().await,
        Command::Offers => tasks.offers().await,
        Command::PathPayment => tasks.path_payment().await,
    };

    print_outcome(outcome)
}

fn print_outcome(
    outcome: Result<ResponseEnvelope, Rejection>,
) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        Ok(envelope) => {
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            Ok(())
        }
        Err(rejection) => {
            eprintln!("{}", serde_json::to_string_pretty(&rejection)?);
            std::process::exit(1);
        }
    }
}
