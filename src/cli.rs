//! Replay command line tool.
//!
//! Loads a JSON array of actions, applies them to a fresh document,
//! optionally undoes the last few, reports the result and optionally saves
//! the painting.

use anyhow::{bail, Context};
use paintkit_settings::{default_config_path, Config};
use paintkit_store::{Action, PaintDocument};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const USAGE: &str = "\
Usage: paintkit <actions.json> [options]

Options:
  --config <file>   Config file (.json or .toml), default: platform config dir
  --out <file>      Save the resulting painting to <file>
  --undo <n>        Undo the last <n> actions after replay
  --summary         Print a JSON summary instead of the feature listing
  --help            Show this message";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub actions: PathBuf,
    pub config: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub undo: usize,
    pub summary: bool,
}

impl CliArgs {
    /// Parses arguments, program name excluded. `Ok(None)` means help was requested.
    pub fn parse(args: &[String]) -> anyhow::Result<Option<Self>> {
        let mut actions = None;
        let mut config = None;
        let mut out = None;
        let mut undo = 0;
        let mut summary = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--help" | "-h" => return Ok(None),
                "--config" => {
                    i += 1;
                    config = Some(PathBuf::from(value_of(args, i, "--config")?));
                }
                "--out" => {
                    i += 1;
                    out = Some(PathBuf::from(value_of(args, i, "--out")?));
                }
                "--undo" => {
                    i += 1;
                    let raw = value_of(args, i, "--undo")?;
                    undo = raw
                        .parse()
                        .with_context(|| format!("Invalid --undo count '{}'", raw))?;
                }
                "--summary" => summary = true,
                flag if flag.starts_with("--") => bail!("Unknown option '{}'", flag),
                path => {
                    if actions.is_some() {
                        bail!("Unexpected argument '{}'", path);
                    }
                    actions = Some(PathBuf::from(path));
                }
            }
            i += 1;
        }

        match actions {
            Some(actions) => Ok(Some(Self {
                actions,
                config,
                out,
                undo,
                summary,
            })),
            None => bail!("Missing actions file"),
        }
    }

    /// Config from `--config`, or the default location if it exists.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load_from_file(path),
            None => Config::load_or_default(&default_config_path()),
        };
        config.context("Failed to load configuration")
    }
}

fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> anyhow::Result<&'a str> {
    match args.get(i) {
        Some(value) => Ok(value),
        None => bail!("Option {} needs a value", flag),
    }
}

/// Outcome of a replay run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub applied: usize,
    pub rejected: usize,
    pub undone: usize,
    pub features: usize,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub brush_color: String,
}

/// Reads a JSON array of actions.
pub fn load_actions(path: &Path) -> anyhow::Result<Vec<Action>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read actions file {}", path.display()))?;
    serde_json::from_str(&content).context("Failed to parse actions file")
}

/// Applies `actions` to `doc`, then undoes `undo` steps.
///
/// Actions whose preconditions fail are skipped with a warning.
pub fn replay(doc: &mut PaintDocument, actions: Vec<Action>, undo: usize) -> anyhow::Result<ReplaySummary> {
    let mut applied = 0;
    let mut rejected = 0;
    for (i, action) in actions.into_iter().enumerate() {
        let name = action.name();
        match doc.apply_action(action) {
            Ok(changes) => {
                applied += 1;
                info!(
                    index = i,
                    action = name,
                    added = changes.added.len(),
                    removed = changes.removed.len(),
                    "applied"
                );
            }
            Err(err) => {
                rejected += 1;
                warn!(index = i, action = name, %err, "action rejected");
            }
        }
    }

    let mut undone = 0;
    while undone < undo && doc.undo()? {
        undone += 1;
    }

    Ok(ReplaySummary {
        applied,
        rejected,
        undone,
        features: doc.store().len(),
        undo_depth: doc.history().undo_depth(),
        redo_depth: doc.history().redo_depth(),
        brush_color: doc.brush_color().to_string(),
    })
}

/// Runs the tool end to end with already loaded config.
pub fn run(args: &CliArgs, config: &Config) -> anyhow::Result<(PaintDocument, ReplaySummary)> {
    let actions = load_actions(&args.actions)?;
    let mut doc = PaintDocument::with_options(config.store_options(), config.history);
    if let Some(stem) = args.actions.file_stem().and_then(|s| s.to_str()) {
        doc.name = stem.to_string();
    }

    let summary = replay(&mut doc, actions, args.undo)?;
    doc.store()
        .check_consistency()
        .context("Store inconsistent after replay")?;

    if let Some(out) = &args.out {
        doc.save_to_file(out)?;
    }
    Ok((doc, summary))
}

/// Human readable listing of the document's features.
pub fn feature_listing(doc: &PaintDocument) -> String {
    let mut lines = Vec::new();
    for feature in doc.store().features() {
        let b = feature.bbox();
        lines.push(format!(
            "{}  color={}  area={:.3}  bbox=({:.3}, {:.3}, {:.3}, {:.3})  holes={}",
            feature.id(),
            feature.color(),
            feature.geometry().area(),
            b.min_x,
            b.min_y,
            b.max_x,
            b.max_y,
            feature.geometry().holes().len()
        ));
    }
    lines.join("\n")
}
