//! Auto-detection of project defaults for the config wizard.
//!
//! Probes a source directory to suggest a title, a contents label, and a license
//! file to append.

use std::path::{Path, PathBuf};

/// Detected default values for a source directory.
#[derive(Debug, Default)]
pub struct DetectedDefaults {
    pub title: Option<String>,
    pub contents: Option<String>,
    pub license: Option<PathBuf>,
}

/// Detect sensible defaults from a source directory.
pub fn detect_defaults(directory: &Path) -> DetectedDefaults {
    DetectedDefaults {
        title: detect_title(directory),
        contents: detect_contents(directory),
        license: detect_license_file(directory),
    }
}

/// Detect title from directory name.
///
/// Transforms the directory name into a readable title by replacing
/// hyphens and underscores with spaces and applying title case.
fn detect_title(directory: &Path) -> Option<String> {
    let canonical = directory.canonicalize().ok()?;
    let dir_name = canonical.file_name()?.to_str()?;
    title_from_name(dir_name)
}

fn title_from_name(dir_name: &str) -> Option<String> {
    let title = dir_name
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// The last two path components, e.g. `arch/x86`, as printed in the contents chapter.
fn detect_contents(directory: &Path) -> Option<String> {
    let canonical = directory.canonicalize().ok()?;
    let names: Vec<String> = canonical
        .iter()
        .rev()
        .take(2)
        .filter_map(|c| c.to_str())
        .filter(|c| *c != "/")
        .map(ToString::to_string)
        .collect();
    if names.is_empty() {
        return None;
    }
    Some(names.into_iter().rev().collect::<Vec<_>>().join("/"))
}

/// Find a license file at the top of the directory, then one level up.
fn detect_license_file(directory: &Path) -> Option<PathBuf> {
    let license_files = [
        "COPYING",
        "LICENSE",
        "LICENSE.md",
        "LICENSE.txt",
        "LICENCE",
        "LICENCE.md",
    ];

    let canonical = directory.canonicalize().ok()?;
    let candidates = std::iter::once(canonical.as_path()).chain(canonical.parent());
    for dir in candidates {
        for filename in license_files {
            let path = dir.join(filename);
            if path.is_file() {
                return Some(path);
            }
        }
    }

    None
}
