//! Courses stored as a directory tree.
//!
//! ```text
//! <root>/
//!   <course>/
//!     course.json
//!     lessons/
//!       01-getting-started/
//!         lesson.json        (title, order, folder_index; optional)
//!         content.md         (optional, missing = empty)
//!         sublessons/
//!           01-install/ ...  (same layout, two levels below lessons/ at most)
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyllabusError};
use crate::fs::FileSystem;
use crate::outline::{FolderIndex, FolderPath, LessonSnapshot, MAX_DEPTH, Node, OutlineTree};

use super::{CourseSnapshot, CourseStore, CourseSummary, Difficulty};

/// Directory name that holds the authoring template, never listed as a course
pub const COURSE_TEMPLATE_DIR: &str = "COURSE-TEMPLATE";

const COURSE_FILE: &str = "course.json";
const LESSONS_DIR: &str = "lessons";
const STAGING_DIR: &str = "lessons.staging";
const RETIRED_DIR: &str = "lessons.old";
const SUBLESSONS_DIR: &str = "sublessons";
const LESSON_FILE: &str = "lesson.json";
const CONTENT_FILE: &str = "content.md";
const BACKUP_FILE: &str = "content.md.bak";
const PLACEHOLDER_ID: &str = "GENERATE-UUID";

#[derive(Debug, Default, Deserialize)]
struct CourseFile {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    author: Option<AuthorField>,
    #[serde(default)]
    metadata: MetadataFile,
    // older courses keep these at the top level
    #[serde(default)]
    difficulty: String,
    #[serde(default)]
    estimated_hours: u32,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    categories: CategoriesFile,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthorField {
    Name(String),
    Object {
        #[serde(default)]
        name: String,
    },
}

#[derive(Debug, Default, Deserialize)]
struct MetadataFile {
    #[serde(default)]
    difficulty: String,
    #[serde(default)]
    estimated_hours: u32,
    #[serde(default)]
    last_updated: String,
}

#[derive(Debug, Default, Deserialize)]
struct CategoriesFile {
    #[serde(default)]
    primary: String,
    #[serde(default)]
    secondary: Vec<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct LessonFile {
    #[serde(default)]
    title: String,
    #[serde(default)]
    order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    folder_index: Option<u32>,
    /// Fields this store does not interpret (quiz flags, objectives, ...)
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// A lesson directory as found on disk
#[derive(Debug)]
struct ScannedLesson {
    dir: PathBuf,
    title: String,
    content: String,
    order: u32,
    stored_index: Option<FolderIndex>,
    folder_index: FolderIndex,
    extra: serde_json::Map<String, serde_json::Value>,
    children: Vec<ScannedLesson>,
}

impl ScannedLesson {
    fn to_snapshot(&self) -> LessonSnapshot {
        LessonSnapshot {
            title: self.title.clone(),
            content: self.content.clone(),
            order: self.order,
            folder_index: self.folder_index,
            has_sublessons: !self.children.is_empty(),
            sublessons: self.children.iter().map(|c| c.to_snapshot()).collect(),
        }
    }
}

/// Course store over a directory of course folders.
pub struct FolderCourseStore<FS: FileSystem> {
    fs: FS,
    root: PathBuf,
}

impl<FS: FileSystem> FolderCourseStore<FS> {
    /// Store rooted at `root`
    pub fn new(fs: FS, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    /// Directory holding one folder per course
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of the course with `course_id`
    pub fn course_dir(&self, course_id: &str) -> Result<PathBuf> {
        for dir in self.course_dirs()? {
            match self.read_course_file(&dir) {
                Ok(file) if course_id_of(&file, &dir) == course_id => return Ok(dir),
                Ok(_) => {}
                Err(e) => log::debug!("Skipping {}: {}", dir.display(), e),
            }
        }
        Err(SyllabusError::CourseNotFound(course_id.to_string()))
    }

    fn course_dirs(&self) -> Result<Vec<PathBuf>> {
        let dirs = self
            .fs
            .list_dirs(&self.root)
            .map_err(|source| SyllabusError::FileRead {
                path: self.root.clone(),
                source,
            })?;
        Ok(dirs
            .into_iter()
            .filter(|dir| dir_name(dir) != COURSE_TEMPLATE_DIR)
            .collect())
    }

    fn read_course_file(&self, dir: &Path) -> Result<CourseFile> {
        let path = dir.join(COURSE_FILE);
        let text = self
            .fs
            .read_to_string(&path)
            .map_err(|source| SyllabusError::FileRead {
                path: path.clone(),
                source,
            })?;
        serde_json::from_str(&text).map_err(|source| SyllabusError::JsonFile { path, source })
    }

    fn read_course(&self, dir: &Path) -> Result<CourseSnapshot> {
        let file = self.read_course_file(dir)?;
        let lessons = self.scan_course(dir)?;
        Ok(build_snapshot(file, dir, &lessons))
    }

    /// Lessons of a course with folder indices assigned
    fn scan_course(&self, course_dir: &Path) -> Result<Vec<ScannedLesson>> {
        let mut lessons = self.scan_group(&self.lessons_dir(course_dir), 0)?;
        let mut next = max_stored_index(&lessons).map_or(0, |max| max.0 + 1);
        assign_folder_indices(&mut lessons, &mut next);
        Ok(lessons)
    }

    fn scan_group(&self, dir: &Path, depth: usize) -> Result<Vec<ScannedLesson>> {
        if !self.fs.is_dir(dir) {
            return Ok(Vec::new());
        }
        let entries = self
            .fs
            .list_dirs(dir)
            .map_err(|source| SyllabusError::FileRead {
                path: dir.to_path_buf(),
                source,
            })?;
        let mut lessons = Vec::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            match self.scan_lesson(entry, position, depth) {
                Ok(lesson) => lessons.push(lesson),
                Err(e) => log::warn!("Skipping lesson {}: {}", entry.display(), e),
            }
        }
        Ok(lessons)
    }

    fn scan_lesson(&self, dir: &Path, position: usize, depth: usize) -> Result<ScannedLesson> {
        let meta_path = dir.join(LESSON_FILE);
        let meta: LessonFile = if self.fs.exists(&meta_path) {
            let text = self
                .fs
                .read_to_string(&meta_path)
                .map_err(|source| SyllabusError::FileRead {
                    path: meta_path.clone(),
                    source,
                })?;
            serde_json::from_str(&text).map_err(|source| SyllabusError::JsonFile {
                path: meta_path.clone(),
                source,
            })?
        } else {
            LessonFile::default()
        };

        let content = self
            .fs
            .read_to_string(&dir.join(CONTENT_FILE))
            .unwrap_or_default();
        let name = dir_name(dir);
        let order = if meta.order > 0 {
            meta.order
        } else {
            order_prefix(&name).unwrap_or(position as u32 + 1)
        };
        let title = if meta.title.trim().is_empty() {
            name
        } else {
            meta.title
        };

        let sublessons = dir.join(SUBLESSONS_DIR);
        let children = if depth < MAX_DEPTH {
            self.scan_group(&sublessons, depth + 1)?
        } else {
            if self.fs.is_dir(&sublessons) {
                log::warn!(
                    "Ignoring {}: lessons nest at most {} levels",
                    sublessons.display(),
                    MAX_DEPTH + 1
                );
            }
            Vec::new()
        };

        Ok(ScannedLesson {
            dir: dir.to_path_buf(),
            title,
            content,
            order,
            stored_index: meta.folder_index.map(FolderIndex),
            folder_index: FolderIndex(0),
            extra: meta.extra,
            children,
        })
    }

    fn write_group(
        &self,
        dir: &Path,
        group: &[Arc<Node>],
        previous: &HashMap<FolderIndex, &ScannedLesson>,
    ) -> Result<()> {
        for node in group {
            let lesson_dir = dir.join(lesson_dir_name(node));
            let old = previous.get(&node.folder_index);
            let meta = LessonFile {
                title: node.title.clone(),
                order: node.order,
                folder_index: Some(node.folder_index.0),
                extra: old.map(|o| o.extra.clone()).unwrap_or_default(),
            };
            let meta_path = lesson_dir.join(LESSON_FILE);
            let json = serde_json::to_string_pretty(&meta)?;
            self.write_text(&meta_path, &json)?;
            self.write_text(&lesson_dir.join(CONTENT_FILE), &node.content)?;
            if let Some(old) = old {
                self.carry_files(&old.dir, &lesson_dir)?;
            }
            if node.has_children() {
                self.write_group(&lesson_dir.join(SUBLESSONS_DIR), &node.children, previous)?;
            }
        }
        Ok(())
    }

    /// Copy files this store does not manage (quiz.json, images, backups)
    fn carry_files(&self, from: &Path, to: &Path) -> Result<()> {
        let files = self
            .fs
            .list_files(from)
            .map_err(|source| SyllabusError::FileRead {
                path: from.to_path_buf(),
                source,
            })?;
        for file in files {
            let name = dir_name(&file);
            if name == LESSON_FILE || name == CONTENT_FILE {
                continue;
            }
            let data = self
                .fs
                .read_binary(&file)
                .map_err(|source| SyllabusError::FileRead {
                    path: file.clone(),
                    source,
                })?;
            let target = to.join(&name);
            self.fs
                .write_binary(&target, &data)
                .map_err(|source| SyllabusError::FileWrite {
                    path: target,
                    source,
                })?;
        }
        Ok(())
    }

    /// `lessons/`, or the retired copy an interrupted save left behind
    fn lessons_dir(&self, course_dir: &Path) -> PathBuf {
        let lessons = course_dir.join(LESSONS_DIR);
        let retired = course_dir.join(RETIRED_DIR);
        if !self.fs.is_dir(&lessons) && self.fs.is_dir(&retired) {
            retired
        } else {
            lessons
        }
    }

    /// Put back `lessons/` if a previous swap stopped halfway
    fn restore_retired(&self, course_dir: &Path) -> Result<()> {
        let lessons = course_dir.join(LESSONS_DIR);
        let retired = course_dir.join(RETIRED_DIR);
        if !self.fs.is_dir(&lessons) && self.fs.is_dir(&retired) {
            log::warn!(
                "Restoring {} left by an interrupted save",
                retired.display()
            );
            self.rename(&retired, &lessons)?;
        }
        Ok(())
    }

    /// Replace `lessons/` with the staged copy.
    ///
    /// The old directory is only removed once the staged copy is in place; if
    /// that step fails it is renamed back.
    fn swap_in(&self, course_dir: &Path, staging: &Path) -> Result<()> {
        let lessons = course_dir.join(LESSONS_DIR);
        let retired = course_dir.join(RETIRED_DIR);
        let had_lessons = self.fs.is_dir(&lessons);
        if had_lessons {
            if self.fs.is_dir(&retired) {
                self.remove_dir(&retired)?;
            }
            self.rename(&lessons, &retired)?;
        }
        if let Err(e) = self.rename(staging, &lessons) {
            if had_lessons && let Err(restore) = self.rename(&retired, &lessons) {
                log::error!(
                    "Could not restore {} after a failed save: {}",
                    lessons.display(),
                    restore
                );
            }
            return Err(e);
        }
        if had_lessons && let Err(e) = self.remove_dir(&retired) {
            log::warn!("Could not remove {}: {}", retired.display(), e);
        }
        Ok(())
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        self.fs
            .write_file(path, content)
            .map_err(|source| SyllabusError::FileWrite {
                path: path.to_path_buf(),
                source,
            })
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        self.fs
            .remove_dir_all(path)
            .map_err(|source| SyllabusError::FileWrite {
                path: path.to_path_buf(),
                source,
            })
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.fs
            .rename(from, to)
            .map_err(|source| SyllabusError::FileWrite {
                path: to.to_path_buf(),
                source,
            })
    }
}

impl<FS: FileSystem> CourseStore for FolderCourseStore<FS> {
    fn list(&self) -> Result<Vec<CourseSummary>> {
        let mut courses: IndexMap<String, CourseSummary> = IndexMap::new();
        for dir in self.course_dirs()? {
            let course = match self.read_course(&dir) {
                Ok(course) => course,
                Err(e) => {
                    log::warn!("Failed to load course {}: {}", dir.display(), e);
                    continue;
                }
            };
            if courses.contains_key(&course.id) {
                log::warn!(
                    "Course id '{}' in {} is already taken; skipping",
                    course.id,
                    dir.display()
                );
                continue;
            }
            courses.insert(course.id.clone(), summarize(&course));
        }
        Ok(courses.into_values().collect())
    }

    fn load(&self, course_id: &str) -> Result<CourseSnapshot> {
        let dir = self.course_dir(course_id)?;
        self.read_course(&dir)
    }

    fn save_content(&self, course_id: &str, folder_path: &FolderPath, content: &str) -> Result<()> {
        let course_dir = self.course_dir(course_id)?;
        let lessons = self.scan_course(&course_dir)?;
        let dir = find_dir(&lessons, folder_path)
            .ok_or_else(|| SyllabusError::FolderPathNotFound(folder_path.clone()))?;

        let content_path = dir.join(CONTENT_FILE);
        if self.fs.exists(&content_path) {
            let previous = self
                .fs
                .read_to_string(&content_path)
                .map_err(|source| SyllabusError::FileRead {
                    path: content_path.clone(),
                    source,
                })?;
            self.write_text(&dir.join(BACKUP_FILE), &previous)?;
        }
        self.write_text(&content_path, content)?;
        log::debug!("Saved content of {} in course '{}'", folder_path, course_id);
        Ok(())
    }

    fn save_outline(&self, course_id: &str, tree: &OutlineTree) -> Result<()> {
        let course_dir = self.course_dir(course_id)?;
        self.restore_retired(&course_dir)?;
        let existing = self.scan_course(&course_dir)?;
        let mut previous = HashMap::new();
        index_by_folder(&existing, &mut previous);

        let staging = course_dir.join(STAGING_DIR);
        if self.fs.is_dir(&staging) {
            self.remove_dir(&staging)?;
        }
        self.fs
            .create_dir_all(&staging)
            .map_err(|source| SyllabusError::FileWrite {
                path: staging.clone(),
                source,
            })?;
        self.write_group(&staging, tree.roots(), &previous)?;
        self.swap_in(&course_dir, &staging)?;
        log::debug!(
            "Saved outline of course '{}' ({} lessons)",
            course_id,
            tree.len()
        );
        Ok(())
    }
}

fn course_id_of(file: &CourseFile, dir: &Path) -> String {
    let id = file.id.trim();
    if id.is_empty() || id == PLACEHOLDER_ID {
        dir_name(dir)
    } else {
        id.to_string()
    }
}

fn build_snapshot(file: CourseFile, dir: &Path, lessons: &[ScannedLesson]) -> CourseSnapshot {
    let id = course_id_of(&file, dir);
    let difficulty = if file.metadata.difficulty.is_empty() {
        &file.difficulty
    } else {
        &file.metadata.difficulty
    };
    let estimated_hours = if file.metadata.estimated_hours == 0 {
        file.estimated_hours
    } else {
        file.metadata.estimated_hours
    };
    let author = match file.author {
        Some(AuthorField::Name(name)) | Some(AuthorField::Object { name }) => name,
        None => String::new(),
    };
    let mut tags = file.tags;
    if !file.categories.primary.is_empty() {
        tags.push(file.categories.primary);
    }
    tags.extend(file.categories.secondary);
    let last_updated = NaiveDate::parse_from_str(&file.metadata.last_updated, "%Y-%m-%d").ok();
    let title = if file.title.is_empty() {
        dir_name(dir)
    } else {
        file.title
    };

    CourseSnapshot {
        id,
        title,
        subtitle: file.subtitle,
        description: file.description,
        author,
        difficulty: Difficulty::parse_lenient(difficulty),
        estimated_hours,
        tags,
        last_updated,
        lessons: lessons.iter().map(|l| l.to_snapshot()).collect(),
    }
}

fn summarize(course: &CourseSnapshot) -> CourseSummary {
    fn count(lessons: &[LessonSnapshot]) -> usize {
        lessons.iter().map(|l| 1 + count(&l.sublessons)).sum()
    }
    CourseSummary {
        id: course.id.clone(),
        title: course.title.clone(),
        description: course.description.clone(),
        difficulty: course.difficulty,
        chapter_count: course.lessons.len(),
        lesson_count: count(&course.lessons),
    }
}

fn max_stored_index(lessons: &[ScannedLesson]) -> Option<FolderIndex> {
    lessons
        .iter()
        .flat_map(|l| l.stored_index.into_iter().chain(max_stored_index(&l.children)))
        .max()
}

/// Keep stored indices; hand out fresh ones in pre-order for the rest
fn assign_folder_indices(lessons: &mut [ScannedLesson], next: &mut u32) {
    for lesson in lessons {
        lesson.folder_index = match lesson.stored_index {
            Some(index) => index,
            None => {
                let index = FolderIndex(*next);
                *next += 1;
                index
            }
        };
        assign_folder_indices(&mut lesson.children, next);
    }
}

fn index_by_folder<'a>(
    lessons: &'a [ScannedLesson],
    into: &mut HashMap<FolderIndex, &'a ScannedLesson>,
) {
    for lesson in lessons {
        into.insert(lesson.folder_index, lesson);
        index_by_folder(&lesson.children, into);
    }
}

fn find_dir<'a>(lessons: &'a [ScannedLesson], folder_path: &FolderPath) -> Option<&'a Path> {
    let mut group = lessons;
    let mut found = None;
    for folder_index in folder_path.as_slice() {
        let lesson = group.iter().find(|l| l.folder_index == *folder_index)?;
        found = Some(lesson.dir.as_path());
        group = &lesson.children;
    }
    found
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `11-sqs-and-sns` -> 11
fn order_prefix(name: &str) -> Option<u32> {
    let (prefix, _) = name.split_once('-')?;
    prefix.parse().ok()
}

fn lesson_dir_name(node: &Node) -> String {
    format!("{:02}-{}", node.order, slugify(&node.title))
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug: String = slug.trim_end_matches('-').chars().take(48).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "lesson".to_string()
    } else {
        slug.to_string()
    }
}
