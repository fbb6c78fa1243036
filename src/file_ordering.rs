//! Walk ordering for the sections of a book.
//!
//! Sections appear in the order a top-down directory walk produces when every
//! directory listing is sorted by name: the files of a directory first, then each
//! subdirectory in turn. The order must be total and stable, since the whole book
//! and each of its volumes are compiled from the same list and page numbers are
//! matched back to it.

use std::cmp::Ordering;
use std::path::{Component, Path};

/// Compare two paths relative to the same root using files-before-directories
/// ordering at each level.
pub fn compare_walk_order(a: &Path, b: &Path) -> Ordering {
    let a: Vec<Component> = a.components().collect();
    let b: Vec<Component> = b.components().collect();
    compare_components(&a, &b)
}

fn compare_components(a: &[Component], b: &[Component]) -> Ordering {
    match (a.split_first(), b.split_first()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some((head_a, rest_a)), Some((head_b, rest_b))) => {
            // a component with nothing after it is a file at this level
            match (rest_a.is_empty(), rest_b.is_empty()) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }

            match head_a.as_os_str().cmp(head_b.as_os_str()) {
                Ordering::Equal => compare_components(rest_a, rest_b),
                o => o,
            }
        }
    }
}

/// Sort relative paths into walk order in place.
pub fn sort_walk_order<P: AsRef<Path>>(paths: &mut [P]) {
    paths.sort_by(|a, b| compare_walk_order(a.as_ref(), b.as_ref()));
}
