//! Folder stores against the real filesystem

use std::fs;
use std::path::Path;

use syllabus_core::config::Config;
use syllabus_core::fs::RealFileSystem;
use syllabus_core::outline::{Direction, FolderPath, OutlinePath};
use syllabus_core::store::{CourseStore, FileProgressStore, FolderCourseStore, ProgressStore};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "aws/course.json", r#"{"id":"aws-101","title":"AWS 101","difficulty":"advanced"}"#);
    write(
        root,
        "aws/lessons/01-iam/lesson.json",
        r#"{"title":"IAM","order":1,"folder_index":0,"objectives":["policies"]}"#,
    );
    write(root, "aws/lessons/01-iam/content.md", "Users and roles.");
    write(root, "aws/lessons/01-iam/diagram.png", "not really a png");
    write(
        root,
        "aws/lessons/02-s3/lesson.json",
        r#"{"title":"S3","order":2,"folder_index":1}"#,
    );
    write(root, "aws/lessons/02-s3/content.md", "Buckets.");
    write(
        root,
        "aws/lessons/02-s3/sublessons/01-versioning/lesson.json",
        r#"{"title":"Versioning","order":1,"folder_index":2}"#,
    );
    write(root, "aws/lessons/02-s3/sublessons/01-versioning/content.md", "Keep history.");
    dir
}

#[test]
fn save_outline_swaps_directories_on_disk() {
    let dir = setup();
    let store = FolderCourseStore::new(RealFileSystem, dir.path());

    let summaries = store.list().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].lesson_count, 3);

    let tree = store.load("aws-101").unwrap().outline().unwrap();
    let tree = tree
        .move_sibling(&OutlinePath::from(vec![1]), Direction::Up)
        .unwrap();
    store.save_outline("aws-101", &tree).unwrap();

    let lessons = dir.path().join("aws/lessons");
    assert!(lessons.join("01-s3/sublessons/01-versioning/content.md").is_file());
    assert!(lessons.join("02-iam/diagram.png").is_file());
    assert!(!dir.path().join("aws/lessons.old").exists());
    assert!(!dir.path().join("aws/lessons.staging").exists());

    let meta = fs::read_to_string(lessons.join("02-iam/lesson.json")).unwrap();
    let meta: serde_json::Value = serde_json::from_str(&meta).unwrap();
    assert_eq!(meta["order"], 2);
    assert_eq!(meta["objectives"][0], "policies");

    let reloaded = store.load("aws-101").unwrap().outline().unwrap();
    assert_eq!(reloaded.to_snapshot(), tree.to_snapshot());
}

#[test]
fn save_content_addresses_lesson_by_folder_path() {
    let dir = setup();
    let store = FolderCourseStore::new(RealFileSystem, dir.path());

    store
        .save_content("aws-101", &FolderPath::from(vec![1u32, 2]), "Object versions.")
        .unwrap();

    let lesson = dir.path().join("aws/lessons/02-s3/sublessons/01-versioning");
    assert_eq!(
        fs::read_to_string(lesson.join("content.md")).unwrap(),
        "Object versions."
    );
    assert_eq!(
        fs::read_to_string(lesson.join("content.md.bak")).unwrap(),
        "Keep history."
    );
}

#[test]
fn progress_and_config_live_under_data_dir() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::new(dir.path().join("courses"));
    config.data_dir = Some(dir.path().join("data"));

    let config_path = dir.path().join("config.toml");
    config.save_to(&RealFileSystem, &config_path).unwrap();
    let config = Config::load_from(&RealFileSystem, &config_path).unwrap();

    let progress = FileProgressStore::new(RealFileSystem, config.progress_dir());
    progress.set_completed("aws-101", 0, true, 3).unwrap();
    progress.add_bookmark("aws-101", 2, "versioning gotchas").unwrap();

    assert!(dir.path().join("data/progress/aws-101.progress.json").is_file());
    let record = progress.load("aws-101").unwrap();
    assert_eq!(record.progress, 33);
    assert_eq!(record.bookmarks[0].lesson_index, 2);
}
