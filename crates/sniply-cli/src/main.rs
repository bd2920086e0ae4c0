//! Sniply CLI - headless, scripted timeline editing

mod script;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use sniply_lib::core::{
    render::{ExportPreset, ManifestEncoder},
    settings::{AppSettings, SettingsManager},
};
use sniply_lib::ActiveProject;

use crate::script::{load_script, ScriptRunner};

#[derive(Parser, Debug)]
#[command(name = "sniply-cli")]
#[command(about = "Headless timeline editing for Sniply projects")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the per-user settings)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Also write daily-rotated logs into this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty project document
    New {
        project: PathBuf,
        #[arg(long)]
        name: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print a project summary as JSON
    Info { project: PathBuf },
    /// Print the flattened, ordered export segments as JSON
    Segments { project: PathBuf },
    /// Replay an edit script against a project and save it
    Apply {
        project: PathBuf,
        script: PathBuf,
        /// Skip actions the timeline rejects instead of aborting
        #[arg(long)]
        keep_going: bool,
        /// Run the script without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Write the render manifest for a project
    Export {
        project: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
        /// youtube1080p, instagram, tiktok, hd720p or sd480p
        #[arg(long, value_parser = parse_preset)]
        preset: Option<ExportPreset>,
    },
    /// Print the effective settings as JSON
    Settings {
        /// Write the defaults to the settings file
        #[arg(long)]
        reset: bool,
    },
}

fn parse_preset(value: &str) -> Result<ExportPreset, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unknown preset '{value}'"))
}

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

fn init_logging(log_dir: Option<&Path>) {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = log_dir.and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        let file_appender = tracing_appender::rolling::daily(dir, "sniply.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = LOG_GUARD.set(guard);
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
    });

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer);

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn settings_manager(path: Option<&Path>) -> Option<SettingsManager> {
    match path {
        Some(path) => Some(SettingsManager::at_path(path.to_path_buf())),
        None => SettingsManager::for_user(),
    }
}

fn load_settings(path: Option<&Path>) -> AppSettings {
    settings_manager(path)
        .map(|manager| manager.load())
        .unwrap_or_default()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn project_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .map(|n| n.split('.').next().unwrap_or_default().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}

fn project_info(project: &ActiveProject) -> serde_json::Value {
    let state = project.session.state();
    let tracks: serde_json::Map<String, serde_json::Value> = state
        .scene
        .tracks_by_kind()
        .iter()
        .map(|(kind, rows)| {
            let counts: Vec<usize> = rows.iter().map(|row| row.len()).collect();
            (kind.to_string(), serde_json::json!(counts))
        })
        .collect();

    serde_json::json!({
        "name": state.meta.name,
        "modifiedAt": state.meta.modified_at,
        "durationSec": state.scene.duration(),
        "clips": state.scene.clip_count(),
        "tracks": tracks,
        "transitions": state.scene.transitions().len(),
        "assets": state.assets.len(),
        "selection": state.selection.ids(),
        "playhead": state.playhead,
    })
}

fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.settings.as_deref());

    match cli.command {
        Commands::New {
            project,
            name,
            force,
        } => {
            if project.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", project.display());
            }
            let name = name.unwrap_or_else(|| project_name(&project));
            let created = ActiveProject::create(&name, project, settings.editor)?;
            print_json(&project_info(&created))?;
        }
        Commands::Info { project } => {
            let project = ActiveProject::open(project, settings.editor)?;
            print_json(&project_info(&project))?;
        }
        Commands::Segments { project } => {
            let project = ActiveProject::open(project, settings.editor)?;
            print_json(&project.session.export_segments())?;
        }
        Commands::Apply {
            project,
            script,
            keep_going,
            dry_run,
        } => {
            let actions = load_script(&script)
                .with_context(|| format!("Failed to read script {}", script.display()))?;
            let mut project = ActiveProject::open(project, settings.editor)?;

            let skipped = ScriptRunner::new(&mut project.session, keep_going).run(&actions)?;
            if dry_run {
                info!("Dry run, not saving");
            } else {
                project.save()?;
            }

            let mut summary = project_info(&project);
            summary["skipped"] = serde_json::json!(skipped);
            summary["undoDepth"] = serde_json::json!(project.session.executor().undo_count());
            print_json(&summary)?;
        }
        Commands::Export {
            project,
            out,
            preset,
        } => {
            let preset = preset.unwrap_or(settings.export.default_preset);
            let project = ActiveProject::open(project, settings.editor)?;
            let bytes = project.session.export(&ManifestEncoder, preset)?;
            sniply_lib::core::fs::write_atomic(&out, &bytes)?;
            info!("Wrote {} manifest to {}", preset.label(), out.display());
        }
        Commands::Settings { reset } => {
            let settings = match (reset, settings_manager(cli.settings.as_deref())) {
                (true, Some(manager)) => {
                    let defaults = manager.reset()?;
                    manager.save(&defaults)?
                }
                (true, None) => bail!("No settings location available on this platform"),
                (false, _) => settings,
            };
            print_json(&settings)?;
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_dir.as_deref());

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
