use crate::section::Section;
use derive_builder::Builder;

/// Document identifier of a book compiled as a single volume
pub const BOOK_DOCUMENT_ID: &str = "book";

/// Everything we need to know to typeset a source tree as a book
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(setter(into))]
pub struct Book {
    pub title: String,
    /// Free-form release date printed on the title page
    pub release: String,
    /// Label of the directory the sections were taken from, used as the chapter title
    pub contents: String,
    /// All sections, in walk order
    #[builder(default)]
    pub sections: Vec<Section>,
}

/// An independently compiled part of a book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub index: usize,
    pub title: String,
    pub release: String,
    pub contents: String,
    /// Names the compiled artifacts, `<document_id>.tex` / `<document_id>.pdf`
    pub document_id: String,
    pub sections: Vec<Section>,
}

impl Volume {
    /// The whole book as a single volume, title unchanged
    pub fn whole(book: &Book) -> Volume {
        Volume {
            index: 0,
            title: book.title.clone(),
            release: book.release.clone(),
            contents: book.contents.clone(),
            document_id: BOOK_DOCUMENT_ID.to_string(),
            sections: book.sections.clone(),
        }
    }

    /// Empty volume `index` of a split book
    pub fn part_of(book: &Book, index: usize) -> Volume {
        Volume {
            index,
            title: format!("{} Volume {index}", book.title),
            release: book.release.clone(),
            contents: book.contents.clone(),
            document_id: format!("{BOOK_DOCUMENT_ID}_volume_{index}"),
            sections: Vec::default(),
        }
    }

    pub fn pdf_file(&self) -> String {
        format!("{}.pdf", self.document_id)
    }
}

/// Whether `id` is the main document of a whole book or of one of its volumes
pub fn is_document_id(id: &str) -> bool {
    if id == BOOK_DOCUMENT_ID {
        return true;
    }
    id.strip_prefix(BOOK_DOCUMENT_ID)
        .and_then(|rest| rest.strip_prefix("_volume_"))
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}
