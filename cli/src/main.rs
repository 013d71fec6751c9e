use std::fs;
use std::io::{self, Read};

use blockcanvas::Editor;
use blockcanvas::align::AlignKind;
use blockcanvas::config::{ConfigError, EditorConfig};
use blockcanvas::distribute::Axis;
use blockcanvas::hierarchy::NestingPolicy;
use blockcanvas::snap::snap_to_grid;
use blockcanvas::state::StateError;
use clap::{Parser, Subcommand};
use serde_json::Value;
use uuid::Uuid;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid document: {0}")]
    State(#[from] StateError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("block {0} not found")]
    UnknownBlock(Uuid),
    #[error("invalid log level `{0}`")]
    LogLevel(String),
}

#[derive(Parser, Debug)]
#[command(name = "blockcanvas-cli", about = "Layout and hierarchy tools for block editor documents")]
struct Cli {
    #[arg(long, default_value = "-", help = "Input document path, or - for stdin")]
    input: String,

    #[arg(long, help = "Write the result here instead of stdout")]
    output: Option<String>,

    #[arg(long, env = "BLOCKCANVAS_LOG", default_value = "warn")]
    log_level: String,

    #[arg(long, help = "Overrides BLOCKCANVAS_GRID_SIZE")]
    grid_size: Option<f64>,

    #[arg(long, help = "Overrides BLOCKCANVAS_SNAP_THRESHOLD")]
    snap_threshold: Option<f64>,

    #[arg(long, help = "Overrides BLOCKCANVAS_NESTING_POLICY")]
    nesting_policy: Option<NestingPolicy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the geometric hierarchy as JSON.
    Tree,
    /// Print hierarchy conflicts as JSON.
    Conflicts,
    /// Align blocks and print the updated document.
    Align {
        kind: AlignKind,
        #[arg(required = true)]
        ids: Vec<Uuid>,
    },
    /// Distribute blocks evenly and print the updated document.
    Distribute {
        axis: Axis,
        #[arg(required = true)]
        ids: Vec<Uuid>,
    },
    /// Snap a point to the configured grid.
    SnapGrid {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Import then re-export, filling missing and dropping orphaned layout.
    Normalize,
}

impl Command {
    fn needs_input(&self) -> bool {
        !matches!(self, Self::SnapGrid { .. })
    }
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let input = if cli.command.needs_input() { read_input(&cli.input)? } else { String::new() };
    let rendered = run(&cli, &input)?;
    write_output(cli.output.as_deref(), &rendered)
}

fn init_tracing(raw: &str) -> Result<(), CliError> {
    let level: tracing::Level = raw.parse().map_err(|_| CliError::LogLevel(raw.to_owned()))?;
    tracing_subscriber::fmt().with_max_level(level).with_writer(io::stderr).init();
    Ok(())
}

fn config_for(cli: &Cli) -> Result<EditorConfig, CliError> {
    let mut config = EditorConfig::from_env()?;
    if let Some(grid) = cli.grid_size {
        config.snap.grid_size = grid;
    }
    if let Some(threshold) = cli.snap_threshold {
        config.snap.threshold = threshold;
    }
    if let Some(policy) = cli.nesting_policy {
        config.nesting_policy = policy;
    }
    Ok(config)
}

/// Execute one command against `input` and return the text to emit.
fn run(cli: &Cli, input: &str) -> Result<String, CliError> {
    let config = config_for(cli)?;

    match &cli.command {
        Command::SnapGrid { x, y } => {
            let (sx, sy) = snap_to_grid(*x, *y, config.snap.grid_size);
            render(&serde_json::json!({ "x": sx, "y": sy }))
        }
        Command::Tree => {
            let editor = load(config, input)?;
            render(&serde_json::to_value(editor.build_block_tree())?)
        }
        Command::Conflicts => {
            let editor = load(config, input)?;
            render(&serde_json::to_value(editor.detect_hierarchy_conflicts())?)
        }
        Command::Align { kind, ids } => {
            let mut editor = load(config, input)?;
            select(&mut editor, ids)?;
            editor.align_selected_blocks(*kind);
            Ok(editor.export_json()?)
        }
        Command::Distribute { axis, ids } => {
            let mut editor = load(config, input)?;
            select(&mut editor, ids)?;
            editor.distribute_selected_blocks(*axis);
            Ok(editor.export_json()?)
        }
        Command::Normalize => Ok(load(config, input)?.export_json()?),
    }
}

fn load(config: EditorConfig, input: &str) -> Result<Editor, CliError> {
    let mut editor = Editor::with_config(config);
    editor.import_json(input)?;
    Ok(editor)
}

fn select(editor: &mut Editor, ids: &[Uuid]) -> Result<(), CliError> {
    editor.clear_selection();
    for id in ids {
        if editor.selected_block_ids().contains(id) {
            continue;
        }
        if !editor.toggle_selection(*id) {
            return Err(CliError::UnknownBlock(*id));
        }
    }
    Ok(())
}

fn read_input(path: &str) -> Result<String, CliError> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::Read { path: "stdin".to_owned(), source })?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_owned(), source })
}

fn write_output(path: Option<&str>, rendered: &str) -> Result<(), CliError> {
    match path {
        Some(path) => fs::write(path, rendered).map_err(|source| CliError::Write { path: path.to_owned(), source }),
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}

fn render(value: &Value) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}
