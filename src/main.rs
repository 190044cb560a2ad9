use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use png_params::{apply_upload_metadata, cli, embed, extract, png};

#[derive(Parser)]
#[command(name = "png-params")]
#[command(about = "Embed and read generation metadata in PNG files")]
struct Cli {
    /// Log debug details (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a copy of a PNG with a `parameters` metadata chunk after IHDR
    Embed {
        /// Path to input PNG file
        #[arg(short, long)]
        input: PathBuf,

        /// Path for the output file
        #[arg(short, long)]
        output: PathBuf,

        /// Metadata as a JSON string
        #[arg(short, long, conflicts_with = "metadata_file")]
        metadata: Option<String>,

        /// Read the metadata JSON from a file instead
        #[arg(long)]
        metadata_file: Option<PathBuf>,
    },

    /// Print the embedded metadata as JSON
    Extract {
        /// Path to PNG file
        #[arg(short, long)]
        input: PathBuf,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// List the chunks of a PNG file with their CRC state
    Inspect {
        /// Path to PNG file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Run the upload hook in place on an already stored file
    Attach {
        /// Path to the stored upload
        #[arg(short, long)]
        input: PathBuf,

        /// Metadata JSON sent with the upload
        #[arg(short, long)]
        metadata: Option<String>,
    },
}

fn read_metadata(metadata: Option<String>, metadata_file: Option<PathBuf>) -> anyhow::Result<Value> {
    let json = match (metadata, metadata_file) {
        (Some(json), _) => json,
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read metadata file {}", path.display()))?,
        (None, None) => bail!("Either --metadata or --metadata-file is required"),
    };
    serde_json::from_str(&json).context("Metadata is not valid JSON")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Embed { input, output, metadata, metadata_file } => {
            let metadata = read_metadata(metadata, metadata_file)?;
            let data = fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;

            let result = embed(&data, Some(&metadata));
            fs::write(&output, &result)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            match result {
                Cow::Owned(embedded) => println!(
                    "Embedded metadata: {} -> {} ({} bytes added)",
                    input.display(),
                    output.display(),
                    embedded.len() - data.len()
                ),
                Cow::Borrowed(_) => println!(
                    "Unchanged: {} copied to {} without metadata",
                    input.display(),
                    output.display()
                ),
            }
        }

        Commands::Extract { input, pretty } => {
            let data = fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;

            let Some(metadata) = extract(&data) else {
                eprintln!("No metadata found in {}", input.display());
                std::process::exit(1);
            };

            let json = if pretty {
                serde_json::to_string_pretty(&metadata)?
            } else {
                serde_json::to_string(&metadata)?
            };
            println!("{json}");
        }

        Commands::Inspect { input } => {
            let data = fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let summary = png::summarize(&data)
                .with_context(|| format!("Cannot inspect {}", input.display()))?;
            print!("{}", cli::render_summary(&summary));
        }

        Commands::Attach { input, metadata } => {
            let outcome = apply_upload_metadata(&input, metadata.as_deref())
                .with_context(|| format!("Failed to update {}", input.display()))?;
            println!("{}", cli::describe_outcome(&outcome));
        }
    }

    Ok(())
}
