use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};

mod config;
use config::{BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_OUTPUT_DIR, SyncConfig};

mod downloader;
mod error;
mod logging;
mod manifest;
use manifest::{ManifestSource, Version};

mod report;
use report::{console, notes, state};

mod utils;

#[cfg(test)]
mod test_support;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "relsync")]
#[command(about = "Download and verify every platform artifact of the latest release")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[arg(short, long, global = true, help = "debug logging")]
    verbose: bool,
}

#[derive(Args)]
struct SourceArgs {
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL, help = "release bucket")]
    base_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and verify the latest release, then record it
    Sync {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
        #[arg(long, default_value = ".", help = "where .version, .build_date and .checksums go")]
        state_dir: PathBuf,
        #[arg(long, help = "changelog to take release notes from")]
        changelog: Option<PathBuf>,
        #[arg(long, default_value = "RELEASE_NOTES.md")]
        notes: PathBuf,
        #[arg(long, default_value_t = 5, help = "changelog entries in the notes")]
        entries: usize,
        #[arg(long, help = "hide progress bars")]
        no_progress: bool,
    },
    /// Show the latest version and its manifest
    Latest {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Re-check downloaded artifacts without touching them
    Verify {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, help = "defaults to the latest version")]
        version: Option<String>,
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
}

struct SyncArgs {
    config: SyncConfig,
    state_dir: PathBuf,
    changelog: Option<PathBuf>,
    notes: PathBuf,
    entries: usize,
}

/// `Ok(false)` when some platform failed; state and notes are skipped then.
async fn run_sync(args: SyncArgs) -> Result<bool, BoxError> {
    let client = args.config.build_client()?;
    let run = downloader::download(&args.config, client).await?;
    if !run.result.is_success() {
        return Ok(false);
    }

    let checksums = run.result.checksum_lines();
    console::print_step("Saving version info");
    state::save_version_info(&args.state_dir, &run.version, &run.manifest, &checksums).await?;
    console::print_success(&format!(
        "Wrote {}, {} and {} to {}",
        state::VERSION_FILE,
        state::BUILD_DATE_FILE,
        state::CHECKSUMS_FILE,
        args.state_dir.display()
    ));

    if let Some(path) = &args.changelog {
        let entries = report::changelog::read_changelog(path).await?;
        let recent = report::changelog::recent(&entries, args.entries);
        let document = notes::format_release_notes(&run.version, &checksums, recent);
        tokio::fs::write(&args.notes, document).await?;
        console::print_success(&format!(
            "Release notes with {} entries written to {}",
            recent.len(),
            args.notes.display()
        ));
    }

    console::print_step("Done");
    console::print_success(&format!(
        "All files saved to {}",
        args.config.output_dir.join(run.version.as_str()).display()
    ));
    Ok(true)
}

async fn run_latest(config: SyncConfig) -> Result<ExitCode, BoxError> {
    let source = ManifestSource::new(config.build_client()?, &config.base_url);
    downloader::discover(&source).await?;
    Ok(ExitCode::SUCCESS)
}

async fn run_verify(config: SyncConfig, version: Option<String>) -> Result<ExitCode, BoxError> {
    let client = config.build_client()?;
    let (_, result) = downloader::verify(&config, client, version.map(Version::new)).await?;
    Ok(exit_code(result.is_success()))
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run(command: Option<Commands>) -> Result<ExitCode, BoxError> {
    match command {
        Some(Commands::Sync {
            source,
            output_dir,
            state_dir,
            changelog,
            notes,
            entries,
            no_progress,
        }) => {
            let config = SyncConfig::default()
                .with_base_url(source.base_url)
                .with_output_dir(output_dir)
                .with_progress(!no_progress);
            let synced = run_sync(SyncArgs {
                config,
                state_dir,
                changelog,
                notes,
                entries,
            })
            .await?;
            Ok(exit_code(synced))
        }

        Some(Commands::Latest { source }) => {
            run_latest(SyncConfig::default().with_base_url(source.base_url)).await
        }

        Some(Commands::Verify {
            source,
            version,
            output_dir,
        }) => {
            let config = SyncConfig::default()
                .with_base_url(source.base_url)
                .with_output_dir(output_dir);
            run_verify(config, version).await
        }

        None => {
            println!("Use --help for available commands");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Dropping the command future aborts every download still in flight
    tokio::select! {
        result = run(cli.command) => match result {
            Ok(code) => code,
            Err(err) => {
                error!(error = %err, "run failed");
                console::print_error(&err.to_string());
                ExitCode::FAILURE
            }
        },
        _ = interrupted() => {
            console::print_error("Interrupted by user");
            ExitCode::from(INTERRUPTED)
        }
    }
}
