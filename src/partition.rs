//! Splitting a compiled book into page-balanced volumes.
//!
//! Every volume covers roughly `last_page / num_volumes` pages of the whole book.
//! Sections are bucketed greedily by the page they start on, so a volume may hold
//! more or fewer sections than its neighbours; only the page span is balanced.
//! Pages past the last full split land in the final volume.

use crate::book::{Book, Volume};
use crate::toc::PageMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PartitionError {
    #[error("no section pages were found, can't split the book")]
    EmptyPageMap,
    #[error("the page map has {pages} entries but the book has {sections} sections")]
    SectionCountMismatch { pages: usize, sections: usize },
    #[error("can't split {last_page} pages into {volumes} volumes; request fewer volumes")]
    TooManyVolumes { volumes: usize, last_page: u32 },
}

/// Split `book` into `num_volumes` volumes using the start pages in `pages`.
///
/// Fewer than two volumes returns the whole book as one volume without looking
/// at `pages`.
pub fn partition(
    book: &Book,
    pages: &PageMap,
    num_volumes: usize,
) -> Result<Vec<Volume>, PartitionError> {
    if num_volumes < 2 {
        return Ok(vec![Volume::whole(book)]);
    }

    if pages.is_empty() {
        return Err(PartitionError::EmptyPageMap);
    }
    let last_page = pages.last_page().ok_or(PartitionError::EmptyPageMap)?;
    if pages.len() != book.sections.len() {
        return Err(PartitionError::SectionCountMismatch {
            pages: pages.len(),
            sections: book.sections.len(),
        });
    }

    let split_size = last_page as usize / num_volumes;
    if split_size == 0 {
        return Err(PartitionError::TooManyVolumes {
            volumes: num_volumes,
            last_page,
        });
    }

    let mut volumes: Vec<Volume> = (0..num_volumes)
        .map(|i| Volume::part_of(book, i))
        .collect();
    for entry in pages.by_page() {
        let index = volume_index(entry.page, split_size, num_volumes);
        volumes[index]
            .sections
            .push(book.sections[entry.section].clone());
    }

    for volume in volumes.iter() {
        if volume.sections.is_empty() {
            log::warn!("volume {} has no sections", volume.index);
        } else {
            log::debug!(
                "volume {} has {} sections",
                volume.index,
                volume.sections.len()
            );
        }
    }

    Ok(volumes)
}

/// `page / split_size`, clamped to the last volume
fn volume_index(page: u32, split_size: usize, num_volumes: usize) -> usize {
    (page as usize / split_size).min(num_volumes - 1)
}
