//! Command-line argument structures and enums

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "syllabus")]
#[command(version)]
#[command(about = "Author and navigate hierarchical course outlines", long_about = None)]
pub struct Cli {
    /// Override the courses directory
    #[arg(short, long, global = true)]
    pub courses_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize syllabus configuration
    Init {
        /// Courses directory (default: ~/courses)
        #[arg(short = 'd', long)]
        dir: Option<PathBuf>,
    },

    /// Show current configuration
    Config,

    /// List courses
    #[command(alias = "ls")]
    List,

    /// Print the outline of a course
    Outline {
        /// Course id
        course: String,

        /// Include sublessons, not just chapters
        #[arg(short, long)]
        all: bool,

        /// Print the flattened outline as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show progress through a course
    Progress {
        /// Course id
        course: String,
    },

    /// Mark a lesson completed
    Complete {
        /// Course id
        course: String,

        /// Lesson number as shown by `outline --all` (e.g. 2.1)
        lesson: String,

        /// Mark as not completed instead
        #[arg(long)]
        undo: bool,
    },

    /// Manage bookmarks
    #[command(alias = "b")]
    Bookmark {
        #[command(subcommand)]
        command: BookmarkCommands,
    },

    /// Manage chapter attachments
    #[command(alias = "att")]
    Attachment {
        #[command(subcommand)]
        command: AttachmentCommands,
    },

    /// Navigate and edit a course outline with an interactive TUI
    Nav {
        /// Course id
        course: String,
    },
}

#[derive(Subcommand)]
pub enum BookmarkCommands {
    /// Bookmark a lesson (updates the note if it is already bookmarked)
    Add {
        /// Course id
        course: String,

        /// Lesson number (e.g. 1.2)
        lesson: String,

        /// Note to keep with the bookmark
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Remove a bookmark
    #[command(alias = "rm")]
    Remove {
        /// Course id
        course: String,

        /// Lesson number (e.g. 1.2)
        lesson: String,
    },

    /// List bookmarks
    #[command(alias = "ls")]
    List {
        /// Course id
        course: String,
    },
}

#[derive(Subcommand)]
pub enum AttachmentCommands {
    /// List attachments of a chapter
    #[command(alias = "ls")]
    List {
        /// Course id
        course: String,

        /// Chapter number (1-based)
        chapter: usize,
    },

    /// Attach a file to a chapter
    #[command(alias = "add")]
    Upload {
        /// Course id
        course: String,

        /// Chapter number (1-based)
        chapter: usize,

        /// File to attach
        file: PathBuf,
    },

    /// Delete an attachment by id
    #[command(alias = "rm")]
    Delete {
        /// Course id
        course: String,

        /// Attachment id (see `attachment list`)
        id: String,
    },
}
