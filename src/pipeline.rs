//! The book and chapter pipelines.
//!
//! A book is rendered and compiled whole inside one workspace. When more than one
//! volume is requested, the whole-book compile is only used for its page numbers:
//! the sections are partitioned and every volume is rendered and compiled again as
//! a standalone document in the same workspace. Only the final PDFs leave the
//! workspace.

use crate::book::{Book, BookBuilder, Volume};
use crate::config::Configuration;
use crate::language::Language;
use crate::latex::{
    render_chapter, render_volume, unlistable_char, Compiler, RenderOptions, Templates,
};
use crate::partition::partition;
use crate::section::{build_sections, fragment_id};
use crate::toc::PageLookup;
use crate::workspace::Workspace;
use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Build the book described by `config`, returning the paths of the PDFs written.
pub fn run_book(config: &Configuration) -> Result<Vec<PathBuf>> {
    let Configuration { book: book_config, latex } = config;

    let templates = Templates::load(latex.templates.as_deref())
        .with_context(|| "Failed to load templates")?;
    let options = book_config.render_options(latex)?;
    let filter = book_config.section_filter()?;

    let sections = build_sections(&book_config.directory, &filter).with_context(|| {
        format!(
            "Failed to collect source files from {}",
            book_config.directory.display()
        )
    })?;
    if sections.is_empty() {
        return Err(anyhow!(
            "No source files found in {}",
            book_config.directory.display()
        ));
    }

    let book = BookBuilder::default()
        .title(book_config.title.clone())
        .release(book_config.release_or_today())
        .contents(book_config.contents_or_directory_name())
        .sections(sections)
        .build()
        .with_context(|| "Failed to build book")?;

    let job = BookJob {
        compiler: latex.compiler(),
        templates: &templates,
        options: &options,
        page_lookup: latex.page_lookup,
    };
    job.run(&book, book_config.volumes, &book_config.output_dir)
}

struct BookJob<'a> {
    compiler: Compiler,
    templates: &'a Templates,
    options: &'a RenderOptions,
    page_lookup: PageLookup,
}

impl BookJob<'_> {
    fn run(&self, book: &Book, num_volumes: usize, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let workspace = Workspace::create()?;
        let whole = Volume::whole(book);
        let splitting = num_volumes >= 2;

        self.write_volume(&workspace, &whole, true)?;
        // page numbers have to be stable before they are read back
        let passes = if splitting {
            self.compiler.passes + 1
        } else {
            self.compiler.passes
        };
        self.compile(&workspace, &whole, passes)?;

        if !splitting {
            let pdf = workspace.export(&whole.pdf_file(), output_dir)?;
            return Ok(vec![pdf]);
        }

        let artifact = format!(
            "{}.{}",
            whole.document_id,
            self.page_lookup.artifact_extension()
        );
        let text = workspace
            .read_to_string(&artifact)
            .with_context(|| "The whole-book compile produced no page information")?;
        let pages = self
            .page_lookup
            .parse(&text, &book.sections)
            .with_context(|| format!("Failed to read section pages from {artifact}"))?;
        let volumes = partition(book, &pages, num_volumes)
            .with_context(|| format!("Failed to split the book into {num_volumes} volumes"))?;

        let mut outputs: Vec<PathBuf> = Vec::with_capacity(volumes.len());
        for volume in volumes.iter() {
            log::info!(
                "volume {}: {} sections",
                volume.index,
                volume.sections.len()
            );
            // section fragments are already in the workspace
            self.write_volume(&workspace, volume, false)?;
            self.compile(&workspace, volume, self.compiler.passes + 1)?;
            outputs.push(workspace.export(&volume.pdf_file(), output_dir)?);
        }

        Ok(outputs)
    }

    fn write_volume(&self, workspace: &Workspace, volume: &Volume, fragments: bool) -> Result<()> {
        let document = render_volume(volume, self.options, self.templates);

        if fragments {
            let progress = ProgressBar::new(document.fragments.len() as u64);
            progress.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .expect("can parse progress style")
                    .progress_chars("#>-"),
            );
            progress.set_message("Rendering sections...");
            for fragment in document.fragments.iter() {
                log::trace!("rendering {}", fragment.file_name);
                workspace.write(&fragment.file_name, &fragment.contents)?;
                progress.inc(1);
            }
            progress.finish_and_clear();
        }

        workspace.write(&document.main_file(), &document.main)?;
        Ok(())
    }

    fn compile(&self, workspace: &Workspace, volume: &Volume, passes: usize) -> Result<()> {
        let spinner = ProgressBar::new_spinner();
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(format!("Compiling {} ({passes} passes)...", volume.title));

        let result = self
            .compiler
            .compile(workspace, &volume.document_id, passes)
            .with_context(|| format!("Failed to compile {}", volume.title));
        spinner.finish_and_clear();
        let compiled = result?;
        log::debug!("compiled {}", compiled.pdf.display());
        Ok(())
    }
}

/// Options for typesetting a single file
#[derive(Debug, Clone)]
pub struct ChapterJob {
    pub file: PathBuf,
    /// Titles are relative to this directory when given, else the file name
    pub parent: Option<PathBuf>,
    pub keep_tex: bool,
    pub output_dir: PathBuf,
    pub options: RenderOptions,
    pub compiler: Compiler,
    pub templates: Option<PathBuf>,
}

/// Typeset a single file, returning the paths written (the PDF, then the `.tex`
/// when it was kept).
pub fn run_chapter(job: &ChapterJob) -> Result<Vec<PathBuf>> {
    let templates = Templates::load(job.templates.as_deref())
        .with_context(|| "Failed to load templates")?;
    let file = job
        .file
        .canonicalize()
        .with_context(|| format!("Source file {} can't be found", job.file.display()))?;
    if !file.is_file() {
        return Err(anyhow!("{} isn't a file!", file.display()));
    }
    if let Some(c) = unlistable_char(&file) {
        return Err(anyhow!(
            "{} contains `{c}`, which LaTeX can't read in a file name",
            file.display()
        ));
    }

    let title = chapter_title(&file, job.parent.as_deref())?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let document_id = fragment_id(&title);

    let tex = render_chapter(
        &title,
        &file,
        Language::classify(&file_name),
        &job.options,
        &templates,
    );

    let workspace = Workspace::create()?;
    let tex_file = format!("{document_id}.tex");
    workspace.write(&tex_file, &tex)?;
    let compiled = job
        .compiler
        .compile(&workspace, &document_id, 1)
        .with_context(|| format!("Failed to compile {title}"))?;

    let pdf_file = format!("{}.pdf", compiled.document_id);
    let mut outputs = vec![workspace.export(&pdf_file, &job.output_dir)?];
    if job.keep_tex {
        outputs.push(workspace.export(&tex_file, &job.output_dir)?);
    }
    Ok(outputs)
}

fn chapter_title(file: &Path, parent: Option<&Path>) -> Result<String> {
    let title = match parent {
        Some(parent) => {
            let parent = parent
                .canonicalize()
                .with_context(|| format!("Parent directory {} can't be found", parent.display()))?;
            let relative = file.strip_prefix(&parent).with_context(|| {
                format!("{} isn't inside {}", file.display(), parent.display())
            })?;
            relative
                .iter()
                .map(|c| c.to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        }
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| anyhow!("{} has no file name", file.display()))?,
    };
    Ok(title)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn chapter_titles_are_relative_to_the_parent() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let root = dir.path().canonicalize().expect("can canonicalize");
        std::fs::create_dir_all(root.join("kernel")).expect("can create dir");
        let file = root.join("kernel").join("sched.c");
        std::fs::write(&file, "int x;\n").expect("can write file");

        assert_eq!(
            chapter_title(&file, Some(&root)).expect("has a title"),
            "kernel/sched.c"
        );
        assert_eq!(chapter_title(&file, None).expect("has a title"), "sched.c");
    }

    #[test]
    fn chapter_paths_must_be_listable() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let file = dir.path().join("#sched.c#");
        std::fs::write(&file, "int x;\n").expect("can write file");
        let job = ChapterJob {
            file,
            parent: None,
            keep_tex: false,
            output_dir: dir.path().to_path_buf(),
            options: RenderOptions::default(),
            compiler: Compiler::default(),
            templates: None,
        };
        let err = run_chapter(&job).expect_err("file can't be listed");
        assert!(err.to_string().contains('#'));
    }

    #[test]
    fn chapter_outside_parent_is_an_error() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let other = tempfile::tempdir().expect("can create temp dir");
        let file = dir.path().canonicalize().expect("can canonicalize").join("a.c");
        assert!(chapter_title(&file, Some(other.path())).is_err());
    }
}
