use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use builder::config::Config;
use builder::session::{run_script, Intent, IntentOutcome, Session};
use builder::theme::{Theme, ThemeStore};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::io::BufReader;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "builder",
    about = "Edit a resume from scripted intents, preview it and export it as PDF",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply intents (JSON lines) from a script or stdin (default command)
    Run(RunArgs),
    /// Print the preview presentation of a state file as JSON
    Preview(StateArgs),
    /// Render a state file to resume_YYYY-MM-DD.pdf in the export directory
    Export(StateArgs),
    /// Show or change the persisted theme
    Theme(ThemeArgs),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Read intents from this file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct StateArgs {
    /// Override the configured state file
    #[arg(long)]
    state: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ThemeArgs {
    theme: Option<ThemeArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

pub(crate) async fn run(config: Config) -> Result<()> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Run(RunArgs::default()));

    match command {
        Command::Run(args) => run_session(&config, args).await,
        Command::Preview(args) => preview(&config, args),
        Command::Export(args) => export(&config, args).await,
        Command::Theme(args) => theme(&config, args),
    }
}

fn restored_session(config: &Config, state: Option<PathBuf>) -> Result<Session> {
    let mut config = config.clone();
    if let Some(state) = state {
        config.state_path = state;
    }
    let mut session = Session::new(&config);
    let found = session
        .restore()
        .with_context(|| format!("Failed to load {}", config.state_path.display()))?;
    if !found {
        info!("No state file at {}; starting empty", config.state_path.display());
    }
    Ok(session)
}

async fn run_session(config: &Config, args: RunArgs) -> Result<()> {
    let mut session = restored_session(config, None)?;
    let stdout = tokio::io::stdout();

    match args.script {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            run_script(&mut session, BufReader::new(file), stdout).await?;
        }
        None => {
            run_script(&mut session, BufReader::new(tokio::io::stdin()), stdout).await?;
        }
    }
    Ok(())
}

fn preview(config: &Config, args: StateArgs) -> Result<()> {
    let session = restored_session(config, args.state)?;
    let presentation = session.preview().presentation();
    println!("{}", serde_json::to_string_pretty(&presentation)?);
    Ok(())
}

async fn export(config: &Config, args: StateArgs) -> Result<()> {
    let mut session = restored_session(config, args.state)?;

    let started = session.apply(Intent::Export);
    if let IntentOutcome::Failed { notice } = started {
        bail!("Export refused: {}", notice["error"]["message"]);
    }

    match session.finish_export().await {
        Some(IntentOutcome::ExportFinished { receipt }) => {
            println!("{}", serde_json::to_string_pretty(&receipt)?);
            Ok(())
        }
        Some(IntentOutcome::Failed { notice }) => {
            bail!("Export failed: {}", notice["error"]["message"])
        }
        other => bail!("Unexpected export outcome: {other:?}"),
    }
}

fn theme(config: &Config, args: ThemeArgs) -> Result<()> {
    let store = ThemeStore::new(config.theme_path.clone());
    if let Some(theme) = args.theme {
        store
            .save(theme.into())
            .with_context(|| format!("Failed to write {}", store.path().display()))?;
    }
    let current = store.load();
    println!("{}", serde_json::to_string(&current)?);
    Ok(())
}
