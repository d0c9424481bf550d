use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "mv-harness")]
#[command(about = "Materialized view consistency harness", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision a cluster and run the scenario suite against it
    Run {
        /// Path to the configuration file
        #[arg(short, long)]
        config: String,

        /// Run only this scenario (all of its parameter cases)
        #[arg(short, long)]
        scenario: Option<String>,

        /// Use an already running cluster and leave it running
        #[arg(long, default_value = "false")]
        skip_provision: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Manage the database container
    Cluster {
        #[command(subcommand)]
        action: ClusterAction,
    },

    /// List the scenario cases
    List {
        /// Node count recorded with each case
        #[arg(long, default_value = "1")]
        nodes: u32,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check a configuration file without touching the cluster
    ValidateConfig {
        /// Path to the configuration file
        #[arg(short, long)]
        config: String,
    },
}

#[derive(Subcommand)]
enum ClusterAction {
    /// Remove leftovers, start a container and wait for CQL
    Up {
        /// Path to the configuration file
        #[arg(short, long)]
        config: String,
    },

    /// Remove every container of the configured image
    Down {
        /// Path to the configuration file
        #[arg(short, long)]
        config: String,
    },

    /// Wait until the configured contact point accepts CQL sessions
    Wait {
        /// Path to the configuration file
        #[arg(short, long)]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    // Priority: RUST_LOG env var > verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            config,
            scenario,
            skip_provision,
            format,
        } => {
            commands::run::run(
                &config,
                scenario.as_deref(),
                skip_provision,
                commands::OutputFormat::from(format.as_str()),
            )
            .await?;
        }
        Commands::Cluster { action } => match action {
            ClusterAction::Up { config } => {
                commands::cluster::up(&config).await?;
            }
            ClusterAction::Down { config } => {
                commands::cluster::down(&config).await?;
            }
            ClusterAction::Wait { config } => {
                commands::cluster::wait(&config).await?;
            }
        },
        Commands::List { nodes, format } => {
            commands::list::run(nodes, commands::OutputFormat::from(format.as_str()))?;
        }
        Commands::ValidateConfig { config } => {
            commands::validate_config::run(&config)?;
        }
    }

    Ok(())
}
