//! Markdown/MDX loader for course and book directories
//!
//! A course directory holds one `.md` or `.mdx` file per lesson. A book
//! directory may instead group its chapters into part sub-directories. An
//! `index.md`, `index.mdx` or `README.md` at either level supplies a title
//! and is not itself a lesson.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;
use tracing::debug;

use super::model::{Course, Lesson, TocEntry};

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^title:[ \t]*["']?(.*?)["']?[ \t]*$"#).unwrap());

static ORDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^order:[ \t]*(-?\d+)[ \t]*$").unwrap());

/// Anything that is not a letter, digit, whitespace, `_` or `-`
static SLUG_STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s_-]").unwrap());

const INDEX_FILES: [&str; 4] = ["index.md", "index.mdx", "README.md", "readme.md"];

/// What a single lesson file yields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonContent {
    /// `title:` from frontmatter
    pub frontmatter_title: Option<String>,
    /// `order:` from frontmatter
    pub order: Option<i64>,
    /// Text of the first level 1 heading
    pub first_heading: Option<String>,
    /// Approximate word count (code counts a third)
    pub word_count: usize,
    /// Level 2 and 3 headings
    pub toc: Vec<TocEntry>,
}

impl LessonContent {
    /// Best available title
    pub fn title(&self) -> Option<&str> {
        self.frontmatter_title.as_deref().or(self.first_heading.as_deref())
    }

    /// Reading time at 200 words per minute, never below one minute
    pub fn reading_time_minutes(&self) -> u32 {
        (self.word_count / 200).max(1) as u32
    }
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
}

/// Turn heading text into a URL-safe anchor id
///
/// Lower-cases, drops punctuation, and turns each whitespace character into
/// `-`. Letters outside ASCII (kana, kanji, accented Latin) are kept.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    SLUG_STRIP_RE
        .replace_all(&lowered, "")
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

fn unique_id(base: String, seen: &mut HashSet<String>) -> String {
    let mut id = base.clone();
    let mut n = 0;
    while seen.contains(&id) {
        n += 1;
        id = format!("{}-{}", base, n);
    }
    seen.insert(id.clone());
    id
}

/// Extract the level 2 and 3 headings of a lesson
pub fn extract_toc(markdown: &str) -> Vec<TocEntry> {
    parse_lesson_content(markdown).toc
}

/// Parse a lesson's markdown for title, ordering, length and headings
pub fn parse_lesson_content(markdown: &str) -> LessonContent {
    let mut content = LessonContent::default();
    let mut seen_ids = HashSet::new();

    let mut in_metadata = false;
    let mut metadata = String::new();
    let mut in_code_block = false;
    let mut code_words = 0;

    // (level, explicit id, text) of the heading being read
    let mut heading: Option<(u8, Option<String>, String)> = None;

    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Start(Tag::MetadataBlock(_)) => in_metadata = true,
            Event::End(TagEnd::MetadataBlock(_)) => in_metadata = false,

            Event::Start(Tag::Heading { level, id, .. }) => {
                heading = Some((heading_level_to_u8(level), id.map(|s| s.to_string()), String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                let Some((level, explicit_id, text)) = heading.take() else {
                    continue;
                };
                let text = text.trim().to_string();
                if text.is_empty() {
                    continue;
                }
                if level == 1 && content.first_heading.is_none() {
                    content.first_heading = Some(text.clone());
                }
                if level == 2 || level == 3 {
                    let id = unique_id(explicit_id.unwrap_or_else(|| slugify(&text)), &mut seen_ids);
                    content.toc.push(TocEntry { level, text, id });
                }
            }

            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,

            Event::Text(text) => {
                if in_metadata {
                    metadata.push_str(&text);
                } else if in_code_block {
                    code_words += text.split_whitespace().count();
                } else {
                    content.word_count += text.split_whitespace().count();
                    if let Some((_, _, heading_text)) = heading.as_mut() {
                        heading_text.push_str(&text);
                    }
                }
            }
            Event::Code(code) => {
                content.word_count += code.split_whitespace().count();
                if let Some((_, _, heading_text)) = heading.as_mut() {
                    heading_text.push_str(&code);
                }
            }

            _ => {}
        }
    }

    content.word_count += code_words / 3;
    content.frontmatter_title = TITLE_RE
        .captures(&metadata)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty());
    content.order = ORDER_RE
        .captures(&metadata)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok());

    content
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md" || ext == "mdx")
}

fn is_index(path: &Path) -> bool {
    path.file_name().is_some_and(|name| INDEX_FILES.iter().any(|index| name == *index))
}

fn file_stem(path: &Path) -> String {
    path.file_stem().map_or_else(String::new, |s| s.to_string_lossy().to_string())
}

/// Title from a directory's index file, if it has one
fn directory_title(dir: &Path) -> Option<String> {
    INDEX_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .and_then(|path| fs::read_to_string(path).ok())
        .and_then(|markdown| parse_lesson_content(&markdown).title().map(str::to_string))
}

/// Parse one lesson file
pub fn parse_lesson_file(path: &Path, part: Option<&str>) -> Result<Lesson> {
    let markdown = fs::read_to_string(path)
        .with_context(|| format!("Failed to read lesson file: {}", path.display()))?;

    let content = parse_lesson_content(&markdown);
    let slug = file_stem(path);
    let title = content.title().map_or_else(|| slug.clone(), str::to_string);

    Ok(Lesson {
        title,
        part: part.map(str::to_string),
        order: content.order,
        reading_time_minutes: content.reading_time_minutes(),
        toc: content.toc,
        slug,
    })
}

/// Lessons with an explicit order come first, then by slug
fn sort_lessons(lessons: &mut [Lesson]) {
    lessons.sort_by(|a, b| {
        a.order
            .is_none()
            .cmp(&b.order.is_none())
            .then_with(|| a.order.cmp(&b.order))
            .then_with(|| a.slug.cmp(&b.slug))
    });
}

/// Markdown files and visible sub-directories of `dir`, each sorted by name
fn list_dir(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if path.is_dir() {
            subdirs.push(path);
        } else if is_markdown(&path) && !is_index(&path) {
            files.push(path);
        }
    }

    files.sort();
    subdirs.sort();
    Ok((files, subdirs))
}

/// Load a course or book directory
pub fn load_course(dir: &Path) -> Result<Course> {
    let id = dir
        .file_name()
        .map_or_else(|| "unknown".to_string(), |s| s.to_string_lossy().to_string());
    let title = directory_title(dir).unwrap_or_else(|| id.clone());
    let mut course = Course::new(id, title);

    let (files, subdirs) = list_dir(dir)?;

    // Completion is keyed by slug, so a slug may name only one file per course
    let mut slug_sources: HashMap<String, PathBuf> = HashMap::new();
    let mut claim_slugs = |paths: &[PathBuf]| -> Result<()> {
        for path in paths {
            if let Some(previous) = slug_sources.insert(file_stem(path), path.clone()) {
                bail!(
                    "Duplicate lesson slug {:?} in {} and {}",
                    file_stem(path),
                    previous.display(),
                    path.display()
                );
            }
        }
        Ok(())
    };

    claim_slugs(&files)?;
    let mut top_level = files
        .iter()
        .map(|path| parse_lesson_file(path, None))
        .collect::<Result<Vec<_>>>()?;
    sort_lessons(&mut top_level);
    course.lessons.extend(top_level);

    for part_dir in subdirs {
        let part = file_stem(&part_dir);
        let (part_files, _) = list_dir(&part_dir)?;
        claim_slugs(&part_files)?;
        let mut lessons = part_files
            .iter()
            .map(|path| parse_lesson_file(path, Some(&part)))
            .collect::<Result<Vec<_>>>()?;
        sort_lessons(&mut lessons);
        course.lessons.extend(lessons);
    }

    debug!(course_id = %course.id, lessons = course.lesson_count(), "Loaded course");
    Ok(course)
}

/// Load every course directory under `root`, skipping ones with no lessons
pub fn load_courses(root: &Path) -> Result<Vec<Course>> {
    let (_, dirs) = list_dir(root)?;
    let mut courses = Vec::new();
    for dir in dirs {
        let course = load_course(&dir)?;
        if course.lesson_count() > 0 {
            courses.push(course);
        }
    }
    Ok(courses)
}
