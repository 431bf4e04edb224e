//! CLI interface for learn-engine

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::config::{self, EngineConfig};
use crate::error::Refusal;
use crate::hooks::{HookFn, HookPoint};
use crate::learning::presentation::Presentation;
use crate::learning::script::{load_script, run_script};
use crate::learning::{FinishedSession, Session, Step};
use crate::node::{FrameView, Node};
use crate::types::{AnswerValue, Stage};

#[derive(Parser)]
#[command(name = "learn-engine")]
#[command(about = "Adaptive micro-lesson player with Support Lock remediation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true, env = "LEARN_ENGINE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a node interactively in the terminal
    Play {
        /// Node document (JSON)
        node: PathBuf,
        /// Write the finished-session record here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a JSON action script against a node
    Replay {
        /// Node document (JSON)
        node: PathBuf,
        /// Action script (JSON list)
        script: PathBuf,
        /// Write the finished-session record here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Load and validate a node document
    Validate {
        /// Node document (JSON)
        node: PathBuf,
    },
    /// Show or initialize configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

/// Resolve configuration for this invocation
pub fn load_config(cli: &Cli) -> Result<EngineConfig> {
    match &cli.config {
        Some(path) if path.exists() => EngineConfig::load_from(path),
        Some(_) => Ok(EngineConfig::default()),
        None => EngineConfig::load(),
    }
}

/// Run the parsed command
pub fn run(cli: Cli, config: EngineConfig) -> Result<()> {
    match cli.command {
        Commands::Play { node, output } => play(&node, output.as_deref(), &config),
        Commands::Replay { node, script, output } => {
            replay(&node, &script, output.as_deref(), &config)
        }
        Commands::Validate { node } => validate(&node),
        Commands::Config { show, init } => {
            let path = match cli.config {
                Some(path) => path,
                None => config::config_path()?,
            };
            if init {
                EngineConfig::default().save_to(&path)?;
                println!("Wrote default configuration to {}", path.display());
            }
            if show || !init {
                println!("# {}", path.display());
                let contents =
                    toml::to_string_pretty(&config).context("Failed to serialize config")?;
                print!("{}", contents);
            }
            Ok(())
        }
    }
}

fn play(node_path: &Path, output: Option<&Path>, config: &EngineConfig) -> Result<()> {
    let node = Node::from_file(node_path)?;
    let mut session = Session::with_config(node, config.session.clone())?;

    let on_pause: HookFn = Arc::new(|_| {
        println!("Paused. Press Enter when you're ready to continue.");
        Ok(None)
    });
    session.hooks_mut().register(HookPoint::OnPause, "cli_pause", 0, on_pause);
    session.announce_start();

    println!("{}", session.node().skill_goal);
    println!("Enter to continue, type an answer, :back, :pause, :quit\n");

    let mut editor = rustyline::DefaultEditor::new()?;

    while !session.is_finished() {
        let view = Presentation::of(&session);
        render(&view);

        let expects_answer = view
            .frame
            .as_ref()
            .map(|f| f.requires_answer())
            .unwrap_or(false);
        let prompt = if view.can_answer && expects_answer {
            "answer> "
        } else {
            "> "
        };

        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Session left unfinished.");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        if !line.is_empty() {
            let _ = editor.add_history_entry(line.as_str());
        }

        let result = match line.as_str() {
            ":quit" | ":q" => {
                println!("Session left unfinished.");
                return Ok(());
            }
            ":back" => session.go_back(),
            ":pause" => {
                session.pause();
                continue;
            }
            "" => session.advance(),
            input => {
                let value = session
                    .visible_frame()
                    .and_then(|frame| frame.as_answerable().map(|a| a.parse_answer(input)))
                    .unwrap_or_else(|| AnswerValue::from(input));
                session.answer(value)
            }
        };

        match result {
            Ok(Step::Answered(outcome)) if outcome.show_result => {
                if outcome.is_correct {
                    println!("  ✓ Nice work.");
                } else {
                    println!("  Answer saved.");
                }
            }
            Ok(step) => debug!("Step: {:?}", step),
            Err(Refusal::AnswerRequired { .. }) => println!("  Answer to continue."),
            Err(refusal) => println!("  {}", refusal),
        }
    }

    match session.finished() {
        Some(finished) => write_finished(finished, output),
        None => Ok(()),
    }
}

fn replay(
    node_path: &Path,
    script_path: &Path,
    output: Option<&Path>,
    config: &EngineConfig,
) -> Result<()> {
    let node = Node::from_file(node_path)?;
    let actions = load_script(script_path)?;
    let mut session = Session::with_config(node, config.session.clone())?;
    session.announce_start();

    match run_script(&mut session, &actions)? {
        Some(finished) => write_finished(&finished, output),
        None => {
            let view = Presentation::of(&session);
            println!(
                "Script ended before the session finished ({} frame {}, {}% traversed).",
                view.stage, view.frame_index, view.session_progress
            );
            Ok(())
        }
    }
}

fn validate(node_path: &Path) -> Result<()> {
    let node = Node::from_file(node_path)?;
    let session = Session::new(node)?;
    let store = session.store();

    println!("{}", crate::info());
    println!("Node: {} ({})", session.node().id, session.node().skill_goal);
    for stage in Stage::ALL {
        let answerable = store
            .frames_for_stage(stage)
            .filter(|f| f.requires_answer())
            .count();
        println!(
            "  {:<10} {:>3} frames ({} answerable)",
            stage.label(),
            store.stage_len(stage),
            answerable
        );
    }
    println!("  {:<10} {:>3} frames", "Total", store.total_frames());
    Ok(())
}

fn render(view: &Presentation) {
    println!(
        "── {} · frame {}/{} · {}% of node ──",
        view.stage_label,
        view.frame_index + 1,
        view.stage_frame_count,
        view.session_progress
    );

    if let Some(lock) = &view.support_lock {
        if let Some(text) = &lock.acknowledgment {
            debug!("Support lock phase {} ({})", lock.phase, text);
        }
    }

    let Some(frame) = &view.frame else {
        return;
    };

    match frame.view() {
        FrameView::Content(content) => {
            if let Some(title) = content.title() {
                println!("{}", title);
            }
            if let Some(body) = content.body() {
                println!("{}", body);
            }
            if let Some(formula) = content.formula() {
                println!("  {}", formula);
            }
            if let Some(url) = content.image_url() {
                println!("  [image: {}]", url);
            }
        }
        FrameView::Answerable(question) => {
            if let Some(text) = question.question() {
                println!("{}", text);
            }
            for (index, option) in question.options().iter().enumerate() {
                println!("  [{}] {}", index, option);
            }
            if view.show_result {
                if let Some(response) = &view.response {
                    println!("  Your answer: {}", response.user_answer);
                }
                if let Some(explanation) = question.explanation() {
                    println!("  {}", explanation);
                }
            } else if let Some(hint) = question.hint() {
                println!("  Hint: {}", hint);
            }
        }
    }
}

fn write_finished(finished: &FinishedSession, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(finished).context("Failed to serialize session")?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Session record written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
