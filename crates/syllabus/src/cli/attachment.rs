//! Attachment command handlers

use std::path::Path;

use syllabus_core::attachment::AttachmentUpload;
use syllabus_core::fs::{FileSystem, RealFileSystem};
use syllabus_core::store::AttachmentStore;

use crate::cli::Stores;
use crate::cli::args::AttachmentCommands;
use crate::cli::util::{chapter_folder_index, format_size, load_course};

/// Handle attachment subcommands
pub fn handle_attachment_command(stores: &Stores, command: AttachmentCommands) -> bool {
    match command {
        AttachmentCommands::List { course, chapter } => handle_list(stores, &course, chapter),
        AttachmentCommands::Upload {
            course,
            chapter,
            file,
        } => handle_upload(stores, &course, chapter, &file),
        AttachmentCommands::Delete { course, id } => handle_delete(stores, &course, &id),
    }
}

fn handle_list(stores: &Stores, course_id: &str, chapter: usize) -> bool {
    let Some(loaded) = load_course(stores, course_id) else {
        return false;
    };
    let Some(folder_index) = chapter_folder_index(&loaded.tree, chapter) else {
        return false;
    };

    match stores.attachments.list(&loaded.course.id, folder_index) {
        Ok(attachments) if attachments.is_empty() => {
            println!("No attachments in chapter {}", chapter);
            true
        }
        Ok(attachments) => {
            for a in attachments {
                println!(
                    "{}  {}  {}  {}  {}",
                    a.id,
                    a.original_name,
                    a.mime_type,
                    format_size(a.size),
                    a.uploaded_at
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M")
                );
            }
            true
        }
        Err(e) => {
            eprintln!("✗ Error listing attachments: {}", e);
            false
        }
    }
}

fn handle_upload(stores: &Stores, course_id: &str, chapter: usize, file: &Path) -> bool {
    let Some(loaded) = load_course(stores, course_id) else {
        return false;
    };
    let Some(folder_index) = chapter_folder_index(&loaded.tree, chapter) else {
        return false;
    };

    let data = match RealFileSystem.read_binary(file) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("✗ Could not read {}: {}", file.display(), e);
            return false;
        }
    };
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());

    match stores
        .attachments
        .upload(&loaded.course.id, folder_index, AttachmentUpload::new(name, data))
    {
        Ok(attachment) => {
            println!(
                "✓ Attached '{}' to chapter {} ({}, {})",
                attachment.original_name,
                chapter,
                attachment.mime_type,
                format_size(attachment.size)
            );
            println!("  Id: {}", attachment.id);
            true
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            false
        }
    }
}

fn handle_delete(stores: &Stores, course_id: &str, id: &str) -> bool {
    let Some(loaded) = load_course(stores, course_id) else {
        return false;
    };
    match stores.attachments.delete(&loaded.course.id, id) {
        Ok(()) => {
            println!("✓ Deleted attachment {}", id);
            true
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            false
        }
    }
}
