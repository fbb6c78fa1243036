//! Mapping from file names to the language names understood by the LaTeX
//! `listings` package.

use std::fmt;
use std::path::Path;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Language {
    Make,
    C,
    Cpp,
    Assembler,
    Sh,
    Bash,
    Python,
    Perl,
    Java,
    Ruby,
    Lua,
    Awk,
    TeX,
    Html,
    Xml,
    Sql,
}

impl Language {
    /// Classify a file by its name.
    ///
    /// Anything unrecognised falls back to `make`, which at least highlights `#` comments.
    pub fn classify(file_name: &str) -> Language {
        match file_name {
            "Makefile" | "Kconfig" => return Language::Make,
            _ => {}
        }

        let extension = match Path::new(file_name).extension().and_then(|e| e.to_str()) {
            Some(ext) => ext,
            None => return Language::Make,
        };

        // `.S` and `.s` are both assembler, everything else is case-insensitive
        if extension == "S" || extension == "s" {
            return Language::Assembler;
        }

        match extension.to_ascii_lowercase().as_str() {
            "mk" => Language::Make,
            "c" | "h" => Language::C,
            "cc" | "cpp" | "cxx" | "hh" | "hpp" | "hxx" => Language::Cpp,
            "asm" => Language::Assembler,
            "sh" => Language::Sh,
            "bash" => Language::Bash,
            "py" => Language::Python,
            "pl" | "pm" => Language::Perl,
            "java" => Language::Java,
            "rb" => Language::Ruby,
            "lua" => Language::Lua,
            "awk" => Language::Awk,
            "tex" | "sty" => Language::TeX,
            "html" | "htm" => Language::Html,
            "xml" => Language::Xml,
            "sql" => Language::Sql,
            _ => Language::Make,
        }
    }

    /// The `language=` value passed to `\lstinputlisting`
    pub fn listings_name(&self) -> &'static str {
        match self {
            Language::Make => "make",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Assembler => "{[x86masm]Assembler}",
            Language::Sh => "sh",
            Language::Bash => "bash",
            Language::Python => "Python",
            Language::Perl => "Perl",
            Language::Java => "Java",
            Language::Ruby => "Ruby",
            Language::Lua => "Lua",
            Language::Awk => "Awk",
            Language::TeX => "TeX",
            Language::Html => "HTML",
            Language::Xml => "XML",
            Language::Sql => "SQL",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.listings_name())
    }
}
