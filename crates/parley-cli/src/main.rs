mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// parley -- typed chat command dispatch.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the demo commands against stdin/stdout
    Console {
        /// Path to a parley.toml (defaults to ./parley.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Command prefix; repeat for several (overrides the config file)
        #[arg(long = "prefix")]
        prefixes: Vec<String>,

        /// Author name attached to console messages
        #[arg(long, default_value = "console")]
        user: String,

        /// Authors allowed to run restricted commands such as `ban`
        #[arg(long = "admin")]
        admins: Vec<String>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Path to a parley.toml (defaults to ./parley.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with replies on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Console {
            config,
            prefixes,
            user,
            admins,
        } => commands::console::run(config.as_deref(), prefixes, &user, admins).await,
        Commands::Config { config } => commands::config::show(config.as_deref()),
    }
}
