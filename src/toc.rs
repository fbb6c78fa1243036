//! Recovering the page each section starts on from the compiler's output.
//!
//! Two sources are supported:
//!
//! - the table of contents (`.toc`), where the Nth section entry belongs to the Nth
//!   section of the book. Chapter entries and the license chapter are skipped. This
//!   binding is positional, so the entry count has to match the section count
//!   exactly or the lookup fails.
//! - the auxiliary file (`.aux`), where every section carries a
//!   `codebook:<fragment id>` label. Pages are bound by identifier and don't depend
//!   on the order or number of other entries.

use crate::section::Section;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// `\contentsline {section}{\numberline {1.2}boot/a20.c}{17}{section.1.2}%`
static SECTION_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\\contentsline\s*\{section\}\{(?P<label>.*)\}\{(?P<page>\d+)\}(?:\{[^{}]*\})?%?\s*$")
        .expect("section entry regex is valid")
});

/// `\contentsline {chapter}{...}` and `\contentsline {part}{...}`
static CHAPTER_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\\contentsline\s*\{(?:chapter|part)\}").expect("chapter entry regex is valid")
});

/// `\newlabel{codebook:boot_a20_c}{{1.2}{17}{boot/a20.c}{section.1.2}{}}`
static SECTION_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\\newlabel\{codebook:(?P<id>[^}]+)\}\{\{[^}]*\}\{(?P<page>\d+)\}")
        .expect("section label regex is valid")
});

const LICENSE_MARKER: &str = "LICENSE";

/// Where page numbers are looked up
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PageLookup {
    /// Bind table of contents entries to sections by position
    #[default]
    Toc,
    /// Bind `\label`s in the auxiliary file to sections by identifier
    Labels,
}

impl PageLookup {
    pub fn all() -> &'static [PageLookup] {
        &[PageLookup::Toc, PageLookup::Labels]
    }

    /// Extension of the compiler artifact this lookup reads
    pub fn artifact_extension(&self) -> &'static str {
        match self {
            PageLookup::Toc => "toc",
            PageLookup::Labels => "aux",
        }
    }

    pub fn parse(&self, text: &str, sections: &[Section]) -> Result<PageMap, PageLookupError> {
        match self {
            PageLookup::Toc => parse_toc(text, sections),
            PageLookup::Labels => parse_labels(text, sections),
        }
    }
}

impl fmt::Display for PageLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageLookup::Toc => write!(f, "toc"),
            PageLookup::Labels => write!(f, "labels"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageLookupError {
    #[error("the table of contents has no section entries; inspect the whole-book compile")]
    NoEntries,
    #[error(
        "the table of contents has {entries} section entries but the book has {sections} sections; \
         inspect the whole-book compile or use the `labels` page lookup"
    )]
    CountMismatch { entries: usize, sections: usize },
    #[error("no page label found for section `{0}`")]
    MissingLabel(String),
}

/// The page one section starts on
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PageEntry {
    /// 1-based page number
    pub page: u32,
    /// Index into the book's section list
    pub section: usize,
}

/// Section start pages, one entry per section, in section order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageMap {
    entries: Vec<PageEntry>,
}

impl PageMap {
    /// Build a map from `pages[i]` being the page of section `i`
    pub fn from_pages<I: IntoIterator<Item = u32>>(pages: I) -> PageMap {
        PageMap {
            entries: pages
                .into_iter()
                .enumerate()
                .map(|(section, page)| PageEntry { page, section })
                .collect(),
        }
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[PageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_page(&self) -> Option<u32> {
        self.entries.iter().map(|e| e.page).max()
    }

    /// Entries in ascending page order, ties kept in section order
    pub fn by_page(&self) -> Vec<PageEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|e| e.page);
        entries
    }
}

/// Bind section entries of a `.toc` file to sections by position.
pub fn parse_toc(toc: &str, sections: &[Section]) -> Result<PageMap, PageLookupError> {
    let mut pages: Vec<u32> = Vec::with_capacity(sections.len());
    for line in toc.lines() {
        let line = line.trim();
        if CHAPTER_ENTRY.is_match(line) || line.contains(LICENSE_MARKER) {
            continue;
        }
        let Some(captures) = SECTION_ENTRY.captures(line) else {
            continue;
        };
        let Ok(page) = captures["page"].parse::<u32>() else {
            log::warn!("ignoring table of contents entry with unusable page: {line}");
            continue;
        };
        log::trace!("toc entry {} -> page {page}", &captures["label"]);
        pages.push(page);
    }

    if pages.is_empty() {
        return Err(PageLookupError::NoEntries);
    }
    if pages.len() != sections.len() {
        return Err(PageLookupError::CountMismatch {
            entries: pages.len(),
            sections: sections.len(),
        });
    }

    Ok(PageMap::from_pages(pages))
}

/// Bind `codebook:` labels of a `.aux` file to sections by fragment identifier.
pub fn parse_labels(aux: &str, sections: &[Section]) -> Result<PageMap, PageLookupError> {
    let mut labels: HashMap<&str, u32> = HashMap::default();
    for line in aux.lines() {
        let Some(captures) = SECTION_LABEL.captures(line.trim()) else {
            continue;
        };
        let (Some(id), Some(page)) = (captures.name("id"), captures.name("page")) else {
            continue;
        };
        if let Ok(page) = page.as_str().parse::<u32>() {
            labels.insert(id.as_str(), page);
        }
    }

    if labels.is_empty() {
        return Err(PageLookupError::NoEntries);
    }

    let pages = sections
        .iter()
        .map(|section| {
            labels
                .get(section.fragment_id.as_str())
                .copied()
                .ok_or_else(|| PageLookupError::MissingLabel(section.fragment_id.clone()))
        })
        .collect::<Result<Vec<u32>, PageLookupError>>()?;

    Ok(PageMap::from_pages(pages))
}
