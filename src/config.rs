//! `codebook.toml` configuration.
//!
//! The `book` subcommand builds the same [`Configuration`] from its flags, so
//! both entry points share one pipeline.

use crate::latex::{unlistable_char, Compiler, RenderOptions};
use crate::section::SectionFilter;
use crate::toc::PageLookup;
use anyhow::{anyhow, Context, Result};
use globset::{Glob, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "codebook.toml";

/// Complete configuration for a codebook project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub book: BookConfig,
    #[serde(default)]
    pub latex: LatexConfig,
}

/// What goes into the book and where the PDFs end up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookConfig {
    /// Directory whose files become the sections of the book
    pub directory: PathBuf,
    pub title: String,
    /// Release date string; defaults to today's date
    #[serde(default)]
    pub release: Option<String>,
    /// Label for the contents chapter; defaults to the directory's name
    #[serde(default)]
    pub contents: Option<String>,
    /// Globs (relative to `directory`) of files to leave out
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Honour `.gitignore` files and skip hidden files
    #[serde(default)]
    pub respect_ignore_files: bool,
    /// Number of volumes to split the book into; 1 doesn't split
    #[serde(default = "default_volumes")]
    pub volumes: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// A license file appended as the last chapter
    #[serde(default)]
    pub license: Option<PathBuf>,
}

/// How the book is typeset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatexConfig {
    #[serde(default = "default_engine")]
    pub engine: String,
    #[serde(default)]
    pub color: bool,
    /// Engine passes for the whole book; splitting adds one more
    #[serde(default = "default_passes")]
    pub passes: usize,
    /// Seconds each engine pass may take; 0 waits forever
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub page_lookup: PageLookup,
    /// Directory with templates overriding the built-in ones
    #[serde(default)]
    pub templates: Option<PathBuf>,
}

fn default_volumes() -> usize {
    1
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_engine() -> String {
    "pdflatex".to_string()
}
fn default_passes() -> usize {
    2
}
fn default_timeout_secs() -> u64 {
    600
}

impl Default for LatexConfig {
    fn default() -> Self {
        LatexConfig {
            engine: default_engine(),
            color: false,
            passes: default_passes(),
            timeout_secs: default_timeout_secs(),
            page_lookup: PageLookup::default(),
            templates: None,
        }
    }
}

impl Configuration {
    pub fn load(path: &Path) -> Result<Configuration> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to load {} contents", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

impl BookConfig {
    pub fn release_or_today(&self) -> String {
        self.release.clone().unwrap_or_else(today)
    }

    pub fn contents_or_directory_name(&self) -> String {
        if let Some(contents) = &self.contents {
            return contents.clone();
        }
        self.directory
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| self.directory.display().to_string())
    }

    pub fn section_filter(&self) -> Result<SectionFilter> {
        let mut exclude = GlobSetBuilder::new();
        for glob in self.exclude.iter() {
            exclude.add(
                Glob::new(glob).with_context(|| format!("Failed to parse glob `{glob}`"))?,
            );
        }
        Ok(SectionFilter {
            exclude: exclude
                .build()
                .with_context(|| "Failed to build exclude globs")?,
            respect_ignore_files: self.respect_ignore_files,
        })
    }

    pub fn render_options(&self, latex: &LatexConfig) -> Result<RenderOptions> {
        let license = match &self.license {
            Some(license) => {
                let license = license.canonicalize().with_context(|| {
                    format!("License file {} can't be found", license.display())
                })?;
                if let Some(c) = unlistable_char(&license) {
                    return Err(anyhow!(
                        "License path {} contains `{c}`, which LaTeX can't read in a file name",
                        license.display()
                    ));
                }
                Some(license)
            }
            None => None,
        };
        Ok(RenderOptions {
            color: latex.color,
            license,
        })
    }
}

impl LatexConfig {
    pub fn compiler(&self) -> Compiler {
        Compiler {
            engine: self.engine.clone(),
            passes: self.passes.max(1),
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
        }
    }
}

/// Today's date the way it's printed on a title page, e.g. `March 2, 2005`
pub fn today() -> String {
    chrono::Local::now().format("%B %-d, %Y").to_string()
}
