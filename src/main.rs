use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "proctor",
    about = "Continuous health-exam scheduler with bounded in-memory history",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the daemon (exam scheduler + query API)
    Serve {
        /// Bind address
        #[arg(long, default_value = "0.0.0.0:8090")]
        bind: String,

        /// Path to the battery configuration file
        #[arg(long, default_value = "battery.toml")]
        config: String,
    },

    /// Validate a battery configuration without scheduling anything
    Validate {
        /// Path to the battery configuration file
        #[arg(long, default_value = "battery.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, config } => {
            tracing::info!(%bind, %config, "Starting proctor daemon");
            proctor::serve(&bind, &config).await?;
        }
        Commands::Validate { config } => {
            let battery = proctor::battery::Battery::from_path(&config)?;
            let registry = proctor::checks::CheckRegistry::from_battery(&battery)?;
            match proctor::scheduler::preflight(&battery, &registry) {
                Ok(()) => {
                    println!(
                        "Battery '{}' is runnable: {} exams, {} notifiers.",
                        config,
                        battery.exams.len(),
                        battery.notifiers.len()
                    );
                }
                Err(e) => {
                    eprintln!("Preflight failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
