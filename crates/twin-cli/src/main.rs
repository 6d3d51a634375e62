//! Twinval - digital twin conformance checks
//!
//! The `twinval` command validates live asset records from an asset
//! directory against a declarative schema file.
//!
//! ## Commands
//!
//! - `validate`: run a schema against the directory and print every issue
//! - `check-schema`: load and structurally check a schema file
//! - `latest`: show the latest timeseries sample for a realtime stream

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use twin_directory::{AssetDirectory, DirectoryConfig, HttpAssetDirectory};
use twin_schema::{load_schema_file, SchemaDocument};
use twin_validator::{init_tracing, AssetValidator, ValidationReport};

#[derive(Parser)]
#[command(name = "twinval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate digital twin assets against a schema", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate assets in the directory against a schema file
    Validate {
        /// Path to the schema file (JSON)
        #[arg(short, long)]
        schema: PathBuf,

        #[command(flatten)]
        directory: DirectoryArgs,

        /// Output format for the findings
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Exit with status 1 when any issue is found
        #[arg(long)]
        fail_on_issues: bool,
    },

    /// Load and structurally check a schema file
    CheckSchema {
        /// Path to the schema file (JSON)
        path: PathBuf,
    },

    /// Show the latest timeseries value of a realtime stream
    Latest {
        /// Stream id
        #[arg(long)]
        id: String,

        /// Stream source
        #[arg(long)]
        source: String,

        /// Measurement name
        #[arg(short, long)]
        measurement: Option<String>,

        #[command(flatten)]
        directory: DirectoryArgs,
    },
}

#[derive(clap::Args)]
struct DirectoryArgs {
    /// Asset directory API base URL
    #[arg(long, env = "TWIN_DIRECTORY_URL")]
    url: Option<String>,

    /// Bearer token for the asset directory
    #[arg(long, env = "TWIN_DIRECTORY_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

impl DirectoryArgs {
    fn config(&self) -> DirectoryConfig {
        let mut config = DirectoryConfig::from_env();
        if let Some(url) = &self.url {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(token) = &self.token {
            config = config.with_token(token);
        }
        config
    }

    fn connect(&self) -> Result<HttpAssetDirectory> {
        let config = self.config();
        info!(base_url = %config.base_url, "Using asset directory");
        HttpAssetDirectory::new(config).context("Failed to create asset directory client")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One issue per line
    Text,
    /// Full run report as JSON
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Validate {
            schema,
            directory,
            format,
            fail_on_issues,
        } => {
            let client = directory.connect()?;
            let report = cmd_validate(client, &schema, format, &mut stdout).await?;
            if fail_on_issues && !report.passed() {
                stdout.flush()?;
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::CheckSchema { path } => cmd_check_schema(&path, &mut stdout),
        Commands::Latest {
            id,
            source,
            measurement,
            directory,
        } => {
            let client = directory.connect()?;
            cmd_latest(&client, &id, &source, measurement.as_deref(), &mut stdout).await
        }
    }
}

fn load_schema(path: &Path) -> Result<SchemaDocument> {
    load_schema_file(path).with_context(|| format!("Failed to load schema {:?}", path))
}

async fn cmd_validate<D: AssetDirectory>(
    directory: D,
    schema_path: &Path,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<ValidationReport> {
    let document = load_schema(schema_path)?;
    let validator = AssetValidator::new(directory);
    let report = validator
        .run(&document)
        .await
        .context("Validation run aborted")?;

    match format {
        OutputFormat::Text => {
            for line in report.lines() {
                writeln!(out, "{}", line)?;
            }
        }
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
    }

    info!(
        run_id = %report.run_id,
        assets_visited = report.assets_visited,
        issues = report.issues.len(),
        duration_ms = report.duration_ms(),
        "Run complete"
    );
    Ok(report)
}

fn cmd_check_schema(path: &Path, out: &mut impl Write) -> Result<()> {
    let document = load_schema(path)?;
    let digest = document.digest()?;

    writeln!(out, "Schema: {}", path.display())?;
    writeln!(out, "Digest: {}", digest)?;
    writeln!(out, "Root source: {}", document.root.source)?;
    writeln!(out, "Root properties: {}", document.root.properties.len())?;
    let links: Vec<&str> = document.root.required_link_types().collect();
    if !links.is_empty() {
        writeln!(out, "Root links: {}", links.join(", "))?;
    }
    if !document.definitions.is_empty() {
        let names: Vec<&str> = document.definitions.keys().map(String::as_str).collect();
        writeln!(out, "Definitions: {}", names.join(", "))?;
    }

    Ok(())
}

async fn cmd_latest<D: AssetDirectory>(
    directory: &D,
    id: &str,
    source: &str,
    measurement: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let value = directory
        .get_latest_timeseries_value(id, source, measurement)
        .await
        .context("Failed to fetch latest timeseries value")?;

    match value {
        Some(sample) => {
            writeln!(out, "Timestamp: {}", sample.timestamp.to_rfc3339())?;
            writeln!(out, "Value: {}", sample.value)?;
        }
        None => writeln!(out, "No timeseries data for {} - {}", source, id)?,
    }

    Ok(())
}
