use crate::book::is_document_id;
use crate::file_ordering::sort_walk_order;
use crate::language::Language;
use crate::latex::{escape, unlistable_char, LICENSE_FRAGMENT};
use anyhow::{anyhow, Context, Result};
use globset::GlobSet;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One source file, typeset as one section of the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Path relative to the directory the book was built from
    pub relative_path: PathBuf,
    /// LaTeX-escaped relative path, used as the section heading
    pub title: String,
    pub language: Language,
    /// Absolute path to the file on disk
    pub source_path: PathBuf,
    /// Unique, LaTeX-safe name used for the fragment file and its label
    pub fragment_id: String,
}

impl Section {
    pub fn new<P: Into<PathBuf>>(root: &Path, relative_path: P) -> Section {
        let relative_path: PathBuf = relative_path.into();
        let display = display_path(&relative_path);
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Section {
            title: escape(&display),
            language: Language::classify(&file_name),
            source_path: root.join(&relative_path),
            fragment_id: fragment_id(&display),
            relative_path,
        }
    }

    /// File name of the rendered fragment inside the workspace
    pub fn fragment_file(&self) -> String {
        format!("{}.tex", self.fragment_id)
    }
}

/// Which files of a directory become sections.
#[derive(Debug, Clone, Default)]
pub struct SectionFilter {
    /// Files matching any of these globs (relative to the root) are skipped
    pub exclude: GlobSet,
    /// Honour `.gitignore` / `.ignore` files and skip hidden files
    pub respect_ignore_files: bool,
}

/// Walk `root` and build the ordered list of sections.
///
/// Files that aren't valid UTF-8 are treated as binary and skipped, as are files
/// whose names LaTeX can't take as a listing path. `.git` directories are never
/// walked.
pub fn build_sections(root: &Path, filter: &SectionFilter) -> Result<Vec<Section>> {
    if !root.is_dir() {
        return Err(anyhow!("Source path {} isn't a directory!", root.display()));
    }
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to canonicalize {}", root.display()))?;
    if let Some(c) = unlistable_char(&root) {
        return Err(anyhow!(
            "Source path {} contains `{c}`, which LaTeX can't read in a file name",
            root.display()
        ));
    }

    let mut files: Vec<PathBuf> = Vec::default();
    let walk = WalkBuilder::new(&root)
        .standard_filters(filter.respect_ignore_files)
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();
    for entry in walk {
        let entry = entry.with_context(|| "Failed to walk source directory")?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let relative = entry.path().strip_prefix(&root).with_context(|| {
            format!(
                "Failed to remove root {} from path {}",
                root.display(),
                entry.path().display()
            )
        })?;
        if filter.exclude.is_match(relative) {
            log::debug!("excluding {}", relative.display());
            continue;
        }
        if let Some(c) = unlistable_char(relative) {
            log::warn!(
                "skipping {}: LaTeX can't read `{c}` in a file name",
                relative.display()
            );
            continue;
        }
        if std::fs::read_to_string(entry.path()).is_err() {
            log::warn!("skipping binary or unreadable file {}", relative.display());
            continue;
        }
        files.push(relative.to_path_buf());
    }

    sort_walk_order(&mut files);

    let mut sections: Vec<Section> = files.into_iter().map(|f| Section::new(&root, f)).collect();
    dedupe_fragment_ids(&mut sections);
    log::info!(
        "found {} source files under {}",
        sections.len(),
        root.display()
    );
    Ok(sections)
}

/// Forward-slashed display form of a relative path
fn display_path(path: &Path) -> String {
    path.iter()
        .map(|c| c.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// `arch/x86/boot.c` -> `arch_x86_boot_c`
pub fn fragment_id(path: &str) -> String {
    let id: String = path
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if id.is_empty() {
        "section".to_string()
    } else {
        id
    }
}

/// Fragment names the pipeline writes for itself
fn is_reserved(id: &str) -> bool {
    is_document_id(id) || id == LICENSE_FRAGMENT
}

fn dedupe_fragment_ids(sections: &mut [Section]) {
    let mut seen: HashSet<String> = HashSet::default();
    let taken = |seen: &HashSet<String>, id: &str| seen.contains(id) || is_reserved(id);
    for section in sections.iter_mut() {
        if !taken(&seen, &section.fragment_id) {
            seen.insert(section.fragment_id.clone());
            continue;
        }
        let mut n = 2;
        let id = loop {
            let candidate = format!("{}_{n}", section.fragment_id);
            if !taken(&seen, &candidate) {
                break candidate;
            }
            n += 1;
        };
        seen.insert(id.clone());
        section.fragment_id = id;
    }
}
