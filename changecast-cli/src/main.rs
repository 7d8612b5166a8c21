use anyhow::{Context, Result};
use changecast_core::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use commands::generate::{GenerateArgs, LayoutArg, PublishTarget};
use commands::{generate, history, serve, since};

#[derive(Parser)]
#[command(name = "changecast")]
#[command(version, about = "Changelogs from GitHub commit history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a changelog for a repository
    Generate {
        /// Repository URL (prompts with recent repositories when omitted)
        repo: Option<String>,

        /// Number of days to look back (defaults to the time since the last changelog)
        #[arg(short, long)]
        days: Option<u32>,

        /// Changelog layout
        #[arg(short, long, value_enum, default_value_t = LayoutArg::Internal)]
        layout: LayoutArg,

        /// Skip the AI summarizer and use the standard layout
        #[arg(long)]
        no_ai: bool,

        /// Open the changelog in $EDITOR before publishing
        #[arg(short, long)]
        edit: bool,

        /// Where to publish the result
        #[arg(short, long, value_enum, default_value_t = PublishTarget::None)]
        publish: PublishTarget,

        /// Output path when publishing to a file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Changelog server URL when publishing to a server
        #[arg(long)]
        server: Option<String>,

        /// Release tag when publishing a GitHub release
        #[arg(long)]
        tag: Option<String>,
    },

    /// Show recently used repositories, or past runs for one repository
    History {
        /// Repository URL
        repo: Option<String>,

        /// Number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show when the last changelog was generated and what landed since
    Since {
        /// Repository URL
        repo: String,
    },

    /// Run the local changelog publishing server
    Serve {
        /// Port for the server
        #[arg(short, long, default_value = "3040")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Generate {
            repo,
            days,
            layout,
            no_ai,
            edit,
            publish,
            output,
            server,
            tag,
        } => {
            let args = GenerateArgs {
                repo,
                days,
                layout: layout.into(),
                no_ai,
                edit,
                publish,
                output,
                server,
                tag,
            };
            generate::run(args, &config).await?;
        }
        Commands::History { repo, limit } => {
            history::run(repo, limit, &config)?;
        }
        Commands::Since { repo } => {
            since::run(repo, &config).await?;
        }
        Commands::Serve { port } => {
            serve::run(port).await?;
        }
    }

    Ok(())
}
