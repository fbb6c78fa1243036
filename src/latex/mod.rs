mod compiler;
pub use compiler::*;

mod render;
pub use render::*;

mod templates;
pub use templates::*;

use std::path::Path;

/// Escape text so LaTeX typesets it literally.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str(r"\textbackslash{}"),
            '~' => escaped.push_str(r"\textasciitilde{}"),
            '^' => escaped.push_str(r"\textasciicircum{}"),
            '_' | '{' | '}' | '$' | '&' | '#' | '%' => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// A path as LaTeX expects it in `\input` / `\lstinputlisting`
pub fn tex_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

/// Characters that keep their special meaning inside a file name argument
const UNLISTABLE: &[char] = &['%', '#', '~', '{', '}', '$', '&', '^'];

/// The first character of `path` that `\lstinputlisting` can't be given, if any
pub fn unlistable_char(path: &Path) -> Option<char> {
    tex_path(path).chars().find(|c| UNLISTABLE.contains(c))
}
