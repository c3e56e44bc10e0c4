//! Command-line interface.

mod commands;
mod helpers;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "storyreplies")]
#[command(about = "Extract story replies from OCR text and compute answer statistics")]
#[command(version)]
pub struct Cli {
    /// Config file (JSON). Defaults to auto-discovery.
    #[arg(long, global = true, env = "STORYREPLIES_CONFIG")]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze OCR output for a single story
    Analyze {
        /// OCR text file, a JSON RawText document (*.json), or "-" for stdin
        input: String,

        /// Story id (defaults to the file stem for plain text input)
        #[arg(long)]
        story_id: Option<String>,

        /// OCR confidence in [0, 1] (plain text input defaults to 1.0)
        #[arg(long)]
        confidence: Option<f64>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze a JSON-lines file of OCR records
    Batch {
        /// File with one {"key"?, "story_id"?, "text", "confidence"} object per line
        input: PathBuf,

        /// Stories processed at once
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,

        /// Print the batch summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show effective configuration
    Config,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = load_settings_with_options(LoadOptions {
        config_path: cli.config.clone(),
    })
    .await
    .map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Analyze {
            input,
            story_id,
            confidence,
            json,
        } => commands::cmd_analyze(&settings, &input, story_id, confidence, json).await,
        Commands::Batch {
            input,
            concurrency,
            json,
        } => commands::cmd_batch(&settings, &input, concurrency, json).await,
        Commands::Config => commands::cmd_config(&settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "storyreplies",
            "analyze",
            "story.txt",
            "--story-id",
            "s1",
            "--confidence",
            "0.4",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                input,
                story_id,
                confidence,
                json,
            } => {
                assert_eq!(input, "story.txt");
                assert_eq!(story_id.as_deref(), Some("s1"));
                assert_eq!(confidence, Some(0.4));
                assert!(!json);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_batch_with_global_flags() {
        let cli = Cli::try_parse_from(["storyreplies", "batch", "in.jsonl", "-j", "8", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Batch { concurrency, .. } => assert_eq!(concurrency, Some(8)),
            _ => panic!("expected batch"),
        }
    }
}
