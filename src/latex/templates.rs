//! LaTeX templates with `<<name>>` placeholders.
//!
//! Placeholders use angle brackets because braces are everywhere in LaTeX. Each
//! template has a fixed set of placeholders it may use; anything else is rejected
//! when the template is loaded, so a typo in a custom template fails before any
//! compiler is run.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<([A-Za-z_]+)>>").expect("placeholder regex is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template `{template}` uses unknown placeholder `<<{placeholder}>>`")]
    UnknownPlaceholder {
        template: &'static str,
        placeholder: String,
    },
    #[error("template `{template}` has an unterminated placeholder")]
    Unterminated { template: &'static str },
}

#[derive(Copy, Clone, Debug)]
struct Kind {
    file_name: &'static str,
    placeholders: &'static [&'static str],
    default: &'static str,
}

const PREAMBLE: Kind = Kind {
    file_name: "preamble.tex",
    placeholders: &["title"],
    default: include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/assets/templates/preamble.tex"
    )),
};
const BOOK: Kind = Kind {
    file_name: "book.tex",
    placeholders: &[
        "preamble",
        "listing_style",
        "title",
        "release",
        "contents",
        "sections",
        "license",
    ],
    default: include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/assets/templates/book.tex"
    )),
};
const SECTION: Kind = Kind {
    file_name: "section.tex",
    placeholders: &["title", "id", "language", "path"],
    default: include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/assets/templates/section.tex"
    )),
};
const LICENSE: Kind = Kind {
    file_name: "license.tex",
    placeholders: &["path"],
    default: include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/assets/templates/license.tex"
    )),
};
const CHAPTER: Kind = Kind {
    file_name: "chapter.tex",
    placeholders: &["preamble", "listing_style", "title", "language", "path"],
    default: include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/assets/templates/chapter.tex"
    )),
};

/// A validated template
#[derive(Debug, Clone)]
pub struct Template {
    name: &'static str,
    source: String,
}

impl Template {
    fn new(kind: Kind, source: String) -> Result<Template, TemplateError> {
        for capture in PLACEHOLDER.captures_iter(&source) {
            let placeholder = &capture[1];
            if !kind.placeholders.contains(&placeholder) {
                return Err(TemplateError::UnknownPlaceholder {
                    template: kind.file_name,
                    placeholder: placeholder.to_string(),
                });
            }
        }
        // anything left that opens a placeholder but never matched the pattern
        if PLACEHOLDER.replace_all(&source, "").contains("<<") {
            return Err(TemplateError::Unterminated {
                template: kind.file_name,
            });
        }

        Ok(Template {
            name: kind.file_name,
            source,
        })
    }

    /// Substitute every placeholder. Placeholders without a value expand to nothing.
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        log::trace!("rendering {}", self.name);
        PLACEHOLDER
            .replace_all(&self.source, |caps: &regex::Captures| {
                values
                    .iter()
                    .find(|(key, _)| *key == &caps[1])
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

/// The full set of templates a book or chapter is rendered with
#[derive(Debug, Clone)]
pub struct Templates {
    pub preamble: Template,
    pub book: Template,
    pub section: Template,
    pub license: Template,
    pub chapter: Template,
}

impl Templates {
    /// Load the templates, taking any file present in `dir` over the built-in one.
    pub fn load(dir: Option<&Path>) -> Result<Templates> {
        let load = |kind: Kind| -> Result<Template> {
            let source = match dir.map(|d| d.join(kind.file_name)) {
                Some(path) if path.is_file() => {
                    log::debug!("using custom template {}", path.display());
                    std::fs::read_to_string(&path).with_context(|| {
                        format!("Failed to read template {}", path.display())
                    })?
                }
                _ => kind.default.to_string(),
            };
            Template::new(kind, source)
                .with_context(|| format!("Invalid template `{}`", kind.file_name))
        };

        Ok(Templates {
            preamble: load(PREAMBLE)?,
            book: load(BOOK)?,
            section: load(SECTION)?,
            license: load(LICENSE)?,
            chapter: load(CHAPTER)?,
        })
    }
}

impl Default for Templates {
    fn default() -> Self {
        let builtin = |kind: Kind| Template {
            name: kind.file_name,
            source: kind.default.to_string(),
        };
        Templates {
            preamble: builtin(PREAMBLE),
            book: builtin(BOOK),
            section: builtin(SECTION),
            license: builtin(LICENSE),
            chapter: builtin(CHAPTER),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtin_templates_are_valid() {
        for kind in [PREAMBLE, BOOK, SECTION, LICENSE, CHAPTER] {
            Template::new(kind, kind.default.to_string()).expect("builtin template is valid");
        }
    }

    #[test]
    fn listings_read_sources_as_utf8() {
        let preamble = Templates::default().preamble.render(&[("title", "x")]);
        assert!(preamble.contains(r"\usepackage{listingsutf8}"));
        assert!(preamble.contains("inputencoding=utf8/latin1"));
        assert!(!preamble.contains("inputencoding=latin1"));
    }

    #[test]
    fn renders_placeholders() {
        let template = Template::new(SECTION, r"\section{<<title>>}\label{x:<<id>>}".to_string())
            .expect("valid template");
        assert_eq!(
            template.render(&[("title", "main.c"), ("id", "main_c")]),
            r"\section{main.c}\label{x:main_c}"
        );
    }

    #[test]
    fn missing_values_expand_to_nothing() {
        let template =
            Template::new(LICENSE, "a<<path>>b".to_string()).expect("valid template");
        assert_eq!(template.render(&[]), "ab");
    }

    #[test]
    fn rejects_unknown_placeholders() {
        let err = Template::new(SECTION, "<<colour>>".to_string()).expect_err("should fail");
        assert_eq!(
            err,
            TemplateError::UnknownPlaceholder {
                template: "section.tex",
                placeholder: "colour".to_string(),
            }
        );
    }

    #[test]
    fn rejects_unterminated_placeholders() {
        let err = Template::new(SECTION, "<<title".to_string()).expect_err("should fail");
        assert_eq!(
            err,
            TemplateError::Unterminated {
                template: "section.tex"
            }
        );
    }

    #[test]
    fn custom_templates_override_builtins() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        std::fs::write(dir.path().join("license.tex"), "LICENSE <<path>>")
            .expect("can write template");
        let templates = Templates::load(Some(dir.path())).expect("can load templates");
        assert_eq!(templates.license.render(&[("path", "COPYING")]), "LICENSE COPYING");
        assert_eq!(templates.section.name, "section.tex");
    }

    #[test]
    fn invalid_custom_template_is_an_error() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        std::fs::write(dir.path().join("book.tex"), "<<nope>>").expect("can write template");
        assert!(Templates::load(Some(dir.path())).is_err());
    }
}
