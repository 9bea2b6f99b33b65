//! commitai - CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use commitai::{
    Config, ConsoleNotifier, DiffScope, Notice, Notifier, Overrides, Pipeline, PipelineError,
    PipelineOptions, PipelineState, ProviderKind, SystemGit, Workspace, build_generator,
    run_and_notify,
};

/// Generate a commit message for pending changes and commit with it.
#[derive(Parser, Debug)]
#[command(name = "commitai")]
#[command(about = "Generate a commit message for pending changes and commit with it")]
#[command(version)]
struct Cli {
    /// Directory inside the git working tree (defaults to the current directory)
    #[arg(short = 'C', long)]
    workdir: Option<PathBuf>,

    /// Which changes to describe: staged (index vs HEAD) or head (working tree vs HEAD)
    #[arg(long, value_enum)]
    scope: Option<DiffScope>,

    /// Text-generation provider (default: gemini). Endpoints answering with
    /// `{"candidates":[{"output":...}]}` use the PaLM schema: pass `--provider palm`
    #[arg(long, value_enum)]
    provider: Option<ProviderKind>,

    /// Model name for the provider
    #[arg(long)]
    model: Option<String>,

    /// Base URL of the generation endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Config file (defaults to .commitai.toml at the repository root)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the generated message without committing
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            config_path: self.config.clone(),
            provider: self.provider,
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout,
            scope: self.scope,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries the notice
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let notifier = ConsoleNotifier;

    // Step 1: Resolve the working tree
    let workspace = match Workspace::resolve(cli.workdir.as_deref()) {
        Ok(workspace) => workspace,
        Err(e) => return finish(PipelineState::Failed(e), &notifier),
    };

    // Step 2: Check for git before anything touches the repository
    let git = match SystemGit::locate() {
        Ok(git) => git,
        Err(e) => {
            return finish(
                PipelineState::Failed(PipelineError::DiffCommandFailed(e)),
                &notifier,
            );
        }
    };

    // Step 3: Configuration and the generation client
    let (config, generator) = match setup(&cli, &workspace) {
        Ok(parts) => parts,
        Err(e) => {
            notifier.notify(&Notice::error(format!("{e:#}")));
            return ExitCode::FAILURE;
        }
    };
    debug!(
        provider = %config.generator.provider,
        model = %config.generator.model,
        scope = %config.scope,
        "Resolved configuration"
    );

    // Step 4: Run the pipeline
    let pipeline = Pipeline::new(
        Box::new(git),
        generator,
        workspace,
        PipelineOptions {
            scope: config.scope,
            dry_run: cli.dry_run,
        },
    );
    let state = run_and_notify(&pipeline, &notifier).await;
    ExitCode::from(state.exit_code())
}

fn setup(cli: &Cli, workspace: &Workspace) -> Result<(Config, Box<dyn commitai::TextGenerator>)> {
    let config =
        Config::load(workspace, &cli.overrides()).context("Failed to load configuration")?;
    let generator =
        build_generator(&config.generator).context("Failed to set up the generation client")?;
    Ok((config, generator))
}

/// Notify for a state reached outside the pipeline and turn it into an exit code.
fn finish(state: PipelineState, notifier: &dyn Notifier) -> ExitCode {
    if let Some(notice) = state.notice() {
        notifier.notify(&notice);
    }
    ExitCode::from(state.exit_code())
}
