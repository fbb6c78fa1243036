use super::{escape, tex_path, Templates};
use crate::book::Volume;
use crate::language::Language;
use std::path::{Path, PathBuf};

/// Rendering switches that aren't part of the book itself
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Colour listings instead of monochrome
    pub color: bool,
    /// A license file to append as a final `LICENSE` chapter
    pub license: Option<PathBuf>,
}

impl RenderOptions {
    fn listing_style(&self) -> &'static str {
        if self.color {
            "codebookcolor"
        } else {
            "codebookmono"
        }
    }
}

/// A file the main document `\input`s
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub file_name: String,
    pub contents: String,
}

/// Everything that has to be written to the workspace to compile one document
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub document_id: String,
    pub main: String,
    pub fragments: Vec<Fragment>,
}

impl RenderedDocument {
    pub fn main_file(&self) -> String {
        format!("{}.tex", self.document_id)
    }
}

/// Fragment the license chapter is written to
pub const LICENSE_FRAGMENT: &str = "codebook_license";

/// Render a volume (or a whole book wrapped as one) into its main document and
/// one fragment per section.
pub fn render_volume(
    volume: &Volume,
    options: &RenderOptions,
    templates: &Templates,
) -> RenderedDocument {
    let mut fragments: Vec<Fragment> = Vec::with_capacity(volume.sections.len() + 1);
    let mut inputs: Vec<String> = Vec::with_capacity(volume.sections.len());

    for section in volume.sections.iter() {
        let path = tex_path(&section.source_path);
        let contents = templates.section.render(&[
            ("title", section.title.as_str()),
            ("id", section.fragment_id.as_str()),
            ("language", section.language.listings_name()),
            ("path", path.as_str()),
        ]);
        inputs.push(format!("\\input{{{}}}", section.fragment_id));
        fragments.push(Fragment {
            file_name: section.fragment_file(),
            contents,
        });
    }

    let license_input = match &options.license {
        Some(license) => {
            let path = tex_path(license);
            fragments.push(Fragment {
                file_name: format!("{LICENSE_FRAGMENT}.tex"),
                contents: templates.license.render(&[("path", path.as_str())]),
            });
            format!("\\input{{{LICENSE_FRAGMENT}}}")
        }
        None => String::new(),
    };

    let title = escape(&volume.title);
    let preamble = templates.preamble.render(&[("title", title.as_str())]);
    let sections = inputs.join("\n");
    let release = escape(&volume.release);
    let contents = escape(&volume.contents);
    let main = templates.book.render(&[
        ("preamble", preamble.as_str()),
        ("listing_style", options.listing_style()),
        ("title", title.as_str()),
        ("release", release.as_str()),
        ("contents", contents.as_str()),
        ("sections", sections.as_str()),
        ("license", license_input.as_str()),
    ]);

    RenderedDocument {
        document_id: volume.document_id.clone(),
        main,
        fragments,
    }
}

/// Render a single file as a standalone document.
///
/// `title` is the unescaped heading, usually the path of the file relative to
/// some parent directory.
pub fn render_chapter(
    title: &str,
    source_path: &Path,
    language: Language,
    options: &RenderOptions,
    templates: &Templates,
) -> String {
    let title = escape(title);
    let preamble = templates.preamble.render(&[("title", title.as_str())]);
    let path = tex_path(source_path);
    templates.chapter.render(&[
        ("preamble", preamble.as_str()),
        ("listing_style", options.listing_style()),
        ("title", title.as_str()),
        ("language", language.listings_name()),
        ("path", path.as_str()),
    ])
}
