//! Interactive configuration wizard for creating `codebook.toml`.
//!
//! The wizard collects the book's metadata, which files to leave out, how many
//! volumes to split into, and how LaTeX should be run.

use crate::config::{today, BookConfig, Configuration, LatexConfig, CONFIG_FILE};
use crate::detection::{detect_defaults, DetectedDefaults};
use crate::toc::PageLookup;
use anyhow::{anyhow, Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect, Input};
use globset::Glob;
use std::path::PathBuf;

/// Run the interactive configuration wizard.
///
/// Prompts for the book and LaTeX settings, then writes `codebook.toml` to the
/// current directory.
pub fn run() -> Result<()> {
    let theme = ColorfulTheme {
        ..ColorfulTheme::default()
    };

    // get the directory first so we can detect defaults
    let directory = Input::with_theme(&theme)
        .with_prompt("Source directory")
        .default(".".to_string())
        .interact()
        .with_context(|| "Failed to obtain source directory")?;
    let directory = PathBuf::from(directory);
    if !directory.is_dir() {
        return Err(anyhow!("Path '{}' isn't a directory!", directory.display()));
    }

    let DetectedDefaults {
        title: detected_title,
        contents: detected_contents,
        license: detected_license,
    } = detect_defaults(&directory);

    let title: String = Input::with_theme(&theme)
        .with_prompt("Book title")
        .with_initial_text(detected_title.unwrap_or_default())
        .allow_empty(false)
        .interact()
        .with_context(|| "Failed to obtain title")?;

    let release: String = Input::with_theme(&theme)
        .with_prompt("Release date")
        .default(today())
        .interact()
        .with_context(|| "Failed to obtain release date")?;

    let contents: String = Input::with_theme(&theme)
        .with_prompt("Contents label")
        .with_initial_text(detected_contents.unwrap_or_default())
        .allow_empty(false)
        .interact()
        .with_context(|| "Failed to obtain contents label")?;

    let mut exclude: Vec<String> = Vec::default();
    if Confirm::with_theme(&theme)
        .with_prompt("Do you wish to leave some files out of the book?")
        .default(false)
        .interact()?
    {
        'exclude: loop {
            if !exclude.is_empty() {
                println!("Excluded globs: [{}]", exclude.join("], ["));
            }
            let glob: String = Input::with_theme(&theme)
                .with_prompt("Glob syntax of files to leave out (leave blank to move on)")
                .allow_empty(true)
                .interact()?;
            if glob.trim().is_empty() {
                break 'exclude;
            }

            // validate now rather than when rendering
            Glob::new(glob.trim()).with_context(|| "Failed to parse glob!")?;
            exclude.push(glob.trim().to_string());
        }
    }

    let respect_ignore_files = Confirm::with_theme(&theme)
        .with_prompt("Skip files ignored by .gitignore and hidden files?")
        .default(false)
        .interact()?;

    let license = match detected_license {
        Some(license) => {
            let append = Confirm::with_theme(&theme)
                .with_prompt(format!(
                    "Append {} as a LICENSE chapter?",
                    license.display()
                ))
                .default(true)
                .interact()?;
            append.then_some(license)
        }
        None => None,
    };

    let volumes: usize = Input::with_theme(&theme)
        .with_prompt("Number of volumes (1 keeps the book whole)")
        .default(1)
        .validate_with(|input: &usize| {
            if *input > 0 {
                Ok(())
            } else {
                Err("There must be at least one volume")
            }
        })
        .interact()?;

    let page_lookup = if volumes > 1 {
        let options: Vec<String> = PageLookup::all().iter().map(|o| o.to_string()).collect();
        let index = FuzzySelect::with_theme(&theme)
            .with_prompt("How should section pages be read back for splitting?")
            .items(&options)
            .default(0)
            .interact()?;
        PageLookup::all()[index]
    } else {
        PageLookup::default()
    };

    let color = Confirm::with_theme(&theme)
        .with_prompt("Colour syntax highlighting?")
        .default(false)
        .interact()?;

    let engine: String = Input::with_theme(&theme)
        .with_prompt("LaTeX engine")
        .default(LatexConfig::default().engine)
        .interact()?;

    let output_dir: String = Input::with_theme(&theme)
        .with_prompt("Output directory")
        .default(".".to_string())
        .interact()?;

    let config = Configuration {
        book: BookConfig {
            directory,
            title,
            release: Some(release),
            contents: Some(contents),
            exclude,
            respect_ignore_files,
            volumes,
            output_dir: PathBuf::from(output_dir),
            license,
        },
        latex: LatexConfig {
            engine,
            color,
            page_lookup,
            ..LatexConfig::default()
        },
    };

    let config =
        toml::to_string_pretty(&config).with_context(|| "Failed to convert configuration to TOML")?;

    let config_path = PathBuf::from(CONFIG_FILE);
    if config_path.exists()
        && !Confirm::with_theme(&theme)
            .with_prompt(format!("{CONFIG_FILE} already exists, do you want to override it?"))
            .interact()?
    {
        println!("Configuration:");
        println!("{}", config);
    } else {
        std::fs::write(&config_path, config)
            .with_context(|| "Failed to write configuration file")?;
        println!("{CONFIG_FILE} written!");
    }

    Ok(())
}
