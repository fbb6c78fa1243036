use crate::toc::PageLookup;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct LatexArgs {
    /// Colour the listings instead of rendering them in monochrome
    #[clap(long)]
    pub color: bool,
    /// LaTeX engine to run
    #[clap(long, default_value = "pdflatex", env = "CODEBOOK_ENGINE")]
    pub engine: String,
    /// Seconds each engine pass may run before it is killed (0 waits forever)
    #[clap(long, default_value_t = 600)]
    pub timeout: u64,
    /// Directory of templates overriding the built-in ones
    #[clap(long)]
    pub templates: Option<PathBuf>,
    /// Directory the PDFs are written to
    #[clap(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct BookArgs {
    /// Directory whose files become the book
    pub directory: PathBuf,
    /// Title for the book
    #[clap(short, long)]
    pub title: String,
    /// Release date string (defaults to today)
    #[clap(short, long)]
    pub release: Option<String>,
    /// Label for the table of contents chapter (defaults to the directory name)
    #[clap(short, long)]
    pub contents: Option<String>,
    /// Split the book into this many page-balanced volumes
    #[clap(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub volumes: u32,
    /// Glob of files to leave out; may be repeated
    #[clap(long)]
    pub exclude: Vec<String>,
    /// Honour .gitignore files and skip hidden files
    #[clap(long)]
    pub gitignore: bool,
    /// License file appended as the final chapter
    #[clap(long)]
    pub license: Option<PathBuf>,
    /// Engine passes for the whole book (splitting adds one)
    #[clap(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    pub passes: u32,
    /// How section page numbers are read back for splitting
    #[clap(long, value_enum, default_value_t = PageLookup::Toc)]
    pub page_lookup: PageLookup,
    #[clap(flatten)]
    pub latex: LatexArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ChapterArgs {
    /// The file to typeset
    pub file: PathBuf,
    /// Base directory the title is made relative to
    #[clap(short, long)]
    pub parent: Option<PathBuf>,
    /// Also keep the generated .tex next to the PDF
    #[clap(long)]
    pub keep_tex: bool,
    #[clap(flatten)]
    pub latex: LatexArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Typesets a directory as a book, optionally split into volumes
    Book(BookArgs),
    /// Typesets a single file
    Chapter(ChapterArgs),
    /// Generates a codebook.toml config file
    Config,
    /// Typesets the book described by a codebook.toml config file
    Render {
        /// Path to the configuration file
        #[clap(long, default_value = crate::config::CONFIG_FILE)]
        config: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// More logging; repeat for more detail
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[clap(subcommand)]
    pub command: Commands,
}
