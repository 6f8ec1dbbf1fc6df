/// Clap argument definitions
mod args;

/// Attachment management
mod attachment;

/// Config command handler
mod config;

/// `list` and `outline` commands
mod course;

/// Navigate and edit a course with a TUI
mod nav;

/// `progress`, `complete` and `bookmark` commands
mod progress;

/// Shared CLI utilities
mod util;

use clap::Parser;
use std::path::PathBuf;

use syllabus_core::config::Config;
use syllabus_core::fs::RealFileSystem;
use syllabus_core::store::{FileProgressStore, FolderAttachmentStore, FolderCourseStore};

/// Course store used by the CLI
pub type CliCourseStore = FolderCourseStore<RealFileSystem>;

/// Progress store used by the CLI
pub type CliProgressStore = FileProgressStore<RealFileSystem>;

/// Attachment store used by the CLI
pub type CliAttachmentStore = FolderAttachmentStore<RealFileSystem>;

/// Every store a command may need, rooted according to the config.
pub struct Stores {
    pub courses: CliCourseStore,
    pub progress: CliProgressStore,
    pub attachments: CliAttachmentStore,
}

impl Stores {
    pub fn new(config: &Config) -> Self {
        Self {
            courses: FolderCourseStore::new(RealFileSystem, config.courses_dir.clone()),
            progress: FileProgressStore::new(RealFileSystem, config.progress_dir()),
            attachments: FolderAttachmentStore::new(RealFileSystem, config.attachments_dir()),
        }
    }
}

pub use args::Cli;
use args::Commands;

/// Main entry point for the CLI
pub fn run_cli() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Error loading config: {}", e);
            Config::default()
        }
    };
    if let Some(dir) = cli.courses_dir.clone() {
        config.courses_dir = dir;
    }
    let stores = Stores::new(&config);

    // Execute commands and track success
    let success = match cli.command {
        Commands::Init { dir } => handle_init(dir.or(cli.courses_dir)),

        Commands::Config => config::show_config(&config),

        Commands::List => course::handle_list(&stores),

        Commands::Outline { course, all, json } => {
            course::handle_outline(&stores, &course, all, json)
        }

        Commands::Progress { course } => progress::handle_progress(&stores, &course),

        Commands::Complete {
            course,
            lesson,
            undo,
        } => progress::handle_complete(&stores, &course, &lesson, undo),

        Commands::Bookmark { command } => progress::handle_bookmark_command(&stores, command),

        Commands::Attachment { command } => {
            attachment::handle_attachment_command(&stores, command)
        }

        Commands::Nav { course } => nav::handle_nav(&stores, &config, &course),
    };

    if !success {
        std::process::exit(1);
    }
}

/// Handle the init command
/// Returns true on success, false on error
fn handle_init(dir: Option<PathBuf>) -> bool {
    let dir = dir.unwrap_or_else(|| Config::default().courses_dir);

    match Config::init(dir.clone()) {
        Ok(config) => {
            println!("✓ Initialized syllabus configuration");
            println!("  Courses directory: {}", dir.display());
            println!("  Data directory: {}", config.data_dir().display());
            if let Some(config_path) = Config::config_path() {
                println!("  Config file: {}", config_path.display());
            }
        }
        Err(e) => {
            eprintln!("✗ Error initializing config: {}", e);
            return false;
        }
    }

    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("✗ Could not create {}: {}", dir.display(), e);
        return false;
    }
    true
}
