use anyhow::Result;
use cli::{BookArgs, ChapterArgs, Cli, LatexArgs};
use config::{BookConfig, Configuration, LatexConfig};
use latex::{Compiler, RenderOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod book;
mod cli;
mod config;
mod config_wizard;
mod detection;
mod file_ordering;
mod language;
mod latex;
mod partition;
mod pipeline;
mod section;
mod toc;
mod workspace;

fn main() -> ExitCode {
    if let Err(e) = try_main() {
        eprintln!("{}: {e:#}", console::style("Error").red());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CODEBOOK_LOG").unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn try_main() -> Result<()> {
    use clap::Parser;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        cli::Commands::Book(args) => {
            let config = book_configuration(args);
            let outputs = pipeline::run_book(&config)?;
            report(&outputs);
            Ok(())
        }
        cli::Commands::Chapter(args) => {
            let outputs = pipeline::run_chapter(&chapter_job(args))?;
            report(&outputs);
            Ok(())
        }
        cli::Commands::Config => config_wizard::run(),
        cli::Commands::Render { config } => {
            println!("Loading configuration...");
            let config = Configuration::load(&config)?;
            let outputs = pipeline::run_book(&config)?;
            report(&outputs);
            Ok(())
        }
    }
}

fn book_configuration(args: BookArgs) -> Configuration {
    let BookArgs {
        directory,
        title,
        release,
        contents,
        volumes,
        exclude,
        gitignore,
        license,
        passes,
        page_lookup,
        latex:
            LatexArgs {
                color,
                engine,
                timeout,
                templates,
                output_dir,
            },
    } = args;

    Configuration {
        book: BookConfig {
            directory,
            title,
            release,
            contents,
            exclude,
            respect_ignore_files: gitignore,
            volumes: volumes as usize,
            output_dir,
            license,
        },
        latex: LatexConfig {
            engine,
            color,
            passes: passes as usize,
            timeout_secs: timeout,
            page_lookup,
            templates,
        },
    }
}

fn chapter_job(args: ChapterArgs) -> pipeline::ChapterJob {
    let ChapterArgs {
        file,
        parent,
        keep_tex,
        latex,
    } = args;

    pipeline::ChapterJob {
        file,
        parent,
        keep_tex,
        output_dir: latex.output_dir,
        options: RenderOptions {
            color: latex.color,
            license: None,
        },
        compiler: Compiler {
            engine: latex.engine,
            passes: 1,
            timeout: (latex.timeout > 0).then(|| Duration::from_secs(latex.timeout)),
        },
        templates: latex.templates,
    }
}

fn report(outputs: &[PathBuf]) {
    for output in outputs {
        let size = std::fs::metadata(output)
            .map(|m| {
                byte_unit::Byte::from_u64(m.len())
                    .get_appropriate_unit(byte_unit::UnitType::Binary)
                    .to_string()
            })
            .unwrap_or_default();
        println!("{}  {}", output.display(), console::style(size).dim());
    }
}
