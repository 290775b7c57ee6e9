//! wharf-cli - Command-line interface for the wharf archive manager
//!
//! Every operation works on the single archive of one server:
//! creating or replacing it, inspecting it, checksumming it and deleting it.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wharf_core::{Archiver, Config, ServerId};

mod report;

use report::StatReport;

/// wharf - per-server backup archive manager
///
/// Each server's data directory is kept as one `<server id>.tar.gz` archive
/// in the archive directory.
#[derive(Parser)]
#[command(name = "wharf")]
#[command(author, version, about = "Per-server backup archive manager", long_about = None)]
struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "WHARF_CONFIG")]
    config: Option<PathBuf>,

    /// Override the archive directory
    #[arg(long, global = true, env = "WHARF_ARCHIVE_DIR")]
    archive_dir: Option<PathBuf>,

    /// Override the root of the server data directories
    #[arg(long, global = true, env = "WHARF_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the archive path of a server
    Path {
        /// Server identity
        server: String,
    },

    /// Print whether a server's archive exists
    Exists {
        /// Server identity
        server: String,
    },

    /// Show size and modification time of a server's archive
    Stat {
        /// Server identity
        server: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Create or replace a server's archive
    Archive {
        /// Server identity
        server: String,
    },

    /// Delete a server's archive if it exists
    Delete {
        /// Server identity
        server: String,
    },

    /// Print the SHA-256 checksum of a server's archive
    Checksum {
        /// Server identity
        server: String,
    },

    /// Check a server's archive against an expected SHA-256 checksum
    Verify {
        /// Server identity
        server: String,

        /// Expected checksum (hex)
        expected: String,
    },

    /// Show or create the configuration file
    Config {
        /// Show the effective configuration
        #[arg(long, conflicts_with_all = ["path", "init"])]
        show: bool,

        /// Show configuration file path
        #[arg(long, conflicts_with_all = ["show", "init"])]
        path: bool,

        /// Write the default configuration file
        #[arg(long, conflicts_with_all = ["show", "path"])]
        init: bool,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let result = run();

    match result {
        Ok(_) => process::exit(0),
        Err(e) => {
            error!("Error: {:#}", e);

            let exit_code = map_error_to_exit_code(&e);
            process::exit(exit_code);
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match &cli.command {
        Commands::Path { server } => {
            println!("{}", archiver(&cli, server)?.archive_path().display());
        }

        Commands::Exists { server } => {
            println!("{}", archiver(&cli, server)?.exists()?);
        }

        Commands::Stat { server, json } => {
            let archiver = archiver(&cli, server)?;
            let stat = archiver.stat()?;
            let report = StatReport::new(&archiver.archive_path(), &stat);
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.to_text());
            }
        }

        Commands::Archive { server } => {
            let archiver = archiver(&cli, server)?;
            archiver.archive()?;
            let checksum = archiver.checksum()?;
            info!("Archived {} to {:?}", server, archiver.archive_path());
            println!("{}  {}", checksum, archiver.archive_path().display());
        }

        Commands::Delete { server } => {
            archiver(&cli, server)?.delete_if_exists()?;
        }

        Commands::Checksum { server } => {
            println!("{}", archiver(&cli, server)?.checksum()?);
        }

        Commands::Verify { server, expected } => {
            let archiver = archiver(&cli, server)?;
            if !archiver.verify_checksum(expected)? {
                bail!(
                    "checksum mismatch for {}: expected {}",
                    archiver.archive_path().display(),
                    expected
                );
            }
            println!("OK");
        }

        Commands::Config { show, path, init } => {
            run_config(&cli, *show, *path, *init)?;
        }
    }

    Ok(())
}

/// Configuration from file (if any) with command-line overrides applied
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    if let Some(dir) = &cli.archive_dir {
        config.archive.archive_directory = dir.clone();
    }
    if let Some(dir) = &cli.data_dir {
        config.archive.data_directory = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

fn archiver(cli: &Cli, server: &str) -> Result<Archiver> {
    let server = ServerId::new(server)?;
    let config = load_config(cli)?;
    Ok(config.archiver_for(&server)?)
}

fn run_config(cli: &Cli, show: bool, path: bool, init: bool) -> Result<()> {
    let config_file = match &cli.config {
        Some(file) => file.clone(),
        None => Config::config_path()?,
    };

    if show {
        let config = load_config(cli)?;
        println!("{}", toml::to_string_pretty(&config)?);
    } else if path {
        println!("{}", config_file.display());
    } else if init {
        if config_file.exists() {
            bail!(
                "configuration file already exists: {}",
                config_file.display()
            );
        }
        if let Some(parent) = config_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&config_file, Config::default_config_content())
            .with_context(|| format!("failed to write {}", config_file.display()))?;
        info!("Wrote default configuration to {:?}", config_file);
        println!("{}", config_file.display());
    } else {
        eprintln!("Please specify --show, --path, or --init");
    }

    Ok(())
}

/// Map errors to exit codes:
/// - 0: Success
/// - 1: General error
/// - 2: IO error or missing archive
/// - 3: Invalid input (bad identity, path traversal)
/// - 4: Compression failure
fn map_error_to_exit_code(err: &anyhow::Error) -> i32 {
    if let Some(wharf_err) = err.downcast_ref::<wharf_core::Error>() {
        match wharf_err {
            wharf_core::Error::Io(_) => 2,
            wharf_core::Error::NotFound(_) => 2,
            wharf_core::Error::PathTraversal { .. } => 3,
            wharf_core::Error::InvalidIdentity(_) => 3,
            wharf_core::Error::Compression(_) => 4,
            wharf_core::Error::Config(_) => 1,
        }
    } else if err.is::<std::io::Error>() {
        2
    } else {
        1
    }
}
