use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use webmethods_asset_puller::{
    AssetKind, AssetManifest, Config, PullError, PullReport, Puller, assets::PersistOutcome,
    logging::{self, Console},
};

/// Exit status when `--strict` is set and any workflow or category failed
const PARTIAL_FAILURE: u8 = 5;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// webMethods.io Integration Asset Puller: export a project's workflows, flows, listeners and messaging for version control
#[derive(Parser)]
#[command(name = "wmpull", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source settings from
    #[arg(short, long, global = true, default_value = ".env")]
    env: PathBuf,

    /// JSON config file [default: ./config.json when present]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// File to append log output to, in addition to stdout
    #[arg(long, global = true, default_value = "webmethods_asset_puller.log")]
    log_file: PathBuf,

    /// Log to stdout only
    #[arg(long, global = true, conflicts_with = "log_file")]
    no_log_file: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every asset of the project into {output}/downloaded_assets
    Pull {
        /// Output root, overrides WM_OUTPUT_ROOT / github_repo_path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pause between workflow downloads in milliseconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        delay_ms: Option<u64>,

        /// Exit with a non-zero status if any workflow or category failed
        #[arg(long)]
        strict: bool,
    },

    /// Test the connection and credential by fetching the asset manifest
    Auth,

    /// Print the project's asset manifest as JSON
    List {
        /// Write the manifest to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let dotenv = dotenvy::from_filename(&cli.env);

    // keep stdout clean when it carries the manifest
    let console = match &cli.command {
        Commands::List { output: None } => Console::Stderr,
        _ => Console::Stdout,
    };
    let log_file = (!cli.no_log_file).then_some(cli.log_file.as_path());
    if let Err(e) = logging::init(cli.debug, console, log_file) {
        eprintln!("Failed to open log file {}: {}", cli.log_file.display(), e);
        return ExitCode::FAILURE;
    }

    match dotenv {
        Ok(path) => log::debug!("Sourced {}", path.display()),
        Err(e) if e.not_found() => log::debug!("No {} file found", cli.env.display()),
        Err(e) => {
            log::error!("Failed to source {}: {}", cli.env.display(), e);
            return ExitCode::from(2);
        }
    }

    match run(cli.command, cli.config).await {
        Ok(code) => code,
        Err(report) => {
            log::error!("{}", report);
            let code = report
                .downcast_ref::<PullError>()
                .map(PullError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run(command: Commands, config_path: Option<PathBuf>) -> Result<ExitCode> {
    let config = Config::load(config_path.as_deref()).map_err(PullError::from)?;

    match command {
        Commands::Pull {
            output,
            delay_ms,
            strict,
        } => {
            let config = Config {
                output_root: output.unwrap_or(config.output_root),
                download_delay: delay_ms
                    .map(Duration::from_millis)
                    .unwrap_or(config.download_delay),
                ..config
            };
            let puller = Puller::new(config)?;
            log::info!(
                "Writing assets to {}",
                puller.layout().root().display().bright_black()
            );

            let report = puller.run().await?;
            print_summary(&report);

            if strict && !report.is_clean() {
                return Ok(ExitCode::from(PARTIAL_FAILURE));
            }
        }
        Commands::Auth => {
            log::info!("Testing authorization");
            let puller = Puller::new(config)?;
            let manifest = puller.fetch_manifest().await.map_err(PullError::from)?;
            log::info!(
                "{} Authorized for project {} ({} asset(s) visible)",
                "✓".green(),
                puller.config().project_name.cyan(),
                manifest.count()
            );
            print_manifest_summary(&manifest);
        }
        Commands::List { output } => {
            let puller = Puller::new(config)?;
            let manifest = puller.fetch_manifest().await.map_err(PullError::from)?;
            let json = serde_json::to_string_pretty(&manifest)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    log::info!("Manifest written to {}", path.display().bright_black());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_summary(report: &PullReport) {
    let saved = report.downloaded().count();
    let failed: Vec<_> = report.failed_workflows().collect();
    log::info!(
        "Workflows: {} saved, {} failed",
        saved.green(),
        match failed.len() {
            0 => failed.len().green().to_string(),
            n => n.red().to_string(),
        }
    );
    for err in failed {
        log::warn!("  {} {}", "✗".red(), err.workflow_id());
    }

    for (kind, result) in report.categories() {
        let status = match result {
            Ok(PersistOutcome::Written { path, count }) => format!(
                "{} record(s) → {}",
                count,
                path.display().bright_black()
            ),
            Ok(PersistOutcome::Skipped) => "nothing to save".bright_black().to_string(),
            Err(_) => "failed".red().to_string(),
        };
        log::info!("{}: {}", label(kind), status);
    }
}

fn print_manifest_summary(manifest: &AssetManifest) {
    log::info!(
        "{}: {}, {}: {}, {}: {}, {}: {}",
        label(AssetKind::Workflows),
        manifest.workflows.len(),
        label(AssetKind::Flows),
        manifest.flows.len(),
        label(AssetKind::Listeners),
        manifest.listeners.len(),
        label(AssetKind::Messaging),
        manifest.messaging.len()
    );

    for record in manifest.flows.iter().chain(&manifest.messaging) {
        log::debug!("  {}", record.name().unwrap_or("<unnamed>"));
    }

    for provider in &manifest.listeners {
        let states = provider.listeners();
        log::info!(
            "  {} ({}): {} listener(s)",
            provider.provider_name().unwrap_or("<unknown provider>").cyan(),
            provider.adapter_id().unwrap_or("-").bright_black(),
            states.len()
        );
        for state in states {
            let name = state.name().unwrap_or("<unnamed>");
            log::info!(
                "    {} {} / {}",
                name,
                state.status().unwrap_or("-"),
                state.runtime_state().unwrap_or("-")
            );
            if let Some(error) = state.last_error() {
                log::warn!("    {} last error: {}", name, error.red());
            }
        }
    }
}

fn label(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Workflows => "Workflows",
        AssetKind::Flows => "Flows",
        AssetKind::Listeners => "Listeners",
        AssetKind::Messaging => "Messaging",
    }
}
