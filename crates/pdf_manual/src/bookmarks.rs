//! PDF outline (bookmark) embedding built on top of `lopdf`.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::model::OutlineEntry;

/// Errors that can occur while embedding bookmarks into a rendered PDF.
#[derive(Debug, thiserror::Error)]
pub enum BookmarkError {
    /// The PDF bytes could not be parsed or written by `lopdf`.
    #[error("failed to process PDF bytes: {0}")]
    Parse(#[from] lopdf::Error),
    /// The trailer has no catalog reference.
    #[error("PDF catalog entry is missing")]
    MissingCatalog,
    /// The catalog object is not a dictionary.
    #[error("PDF catalog entry is not a dictionary")]
    InvalidCatalog,
    /// An outline entry points at a page the PDF does not have.
    #[error("outline entry '{title}' refers to missing page {page_number}")]
    MissingPage {
        /// Title of the outline entry.
        title: String,
        /// Requested 1-based page number.
        page_number: usize,
    },
}

impl From<std::io::Error> for BookmarkError {
    fn from(err: std::io::Error) -> Self {
        Self::Parse(err.into())
    }
}

/// Adds a flat `/Outlines` tree to `pdf_bytes`.
///
/// `pages[i]` is the 1-based first page of `outline[i]`; entries without a
/// page are skipped. Each bookmark targets `/Dest [page /Fit]`.
pub fn apply_outline(
    pdf_bytes: &[u8],
    outline: &[OutlineEntry],
    pages: &[Option<usize>],
) -> Result<Vec<u8>, BookmarkError> {
    let mut document = Document::load_mem(pdf_bytes)?;

    let page_ids = document.get_pages();
    let items = collect_items(&mut document, outline, pages, &page_ids)?;

    if items.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let outlines_id = document.new_object_id();
    link_items(outlines_id, &mut document, &items);
    insert_outlines_root(outlines_id, &mut document, &items)?;

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

struct OutlineItem {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
    name: Option<String>,
}

fn collect_items(
    document: &mut Document,
    outline: &[OutlineEntry],
    pages: &[Option<usize>],
    page_ids: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineItem>, BookmarkError> {
    let mut items = Vec::new();

    for (entry, page) in outline.iter().zip(pages) {
        let Some(page_number) = *page else {
            continue;
        };
        let page_ref = u32::try_from(page_number)
            .ok()
            .and_then(|number| page_ids.get(&number).copied())
            .ok_or_else(|| BookmarkError::MissingPage {
                title: entry.title.clone(),
                page_number,
            })?;

        items.push(OutlineItem {
            object_id: document.new_object_id(),
            page_ref,
            title: entry.title.clone(),
            name: entry.identifier.clone(),
        });
    }

    Ok(items)
}

fn link_items(outlines_id: ObjectId, document: &mut Document, items: &[OutlineItem]) {
    for (index, item) in items.iter().enumerate() {
        let mut dictionary = Dictionary::new();
        dictionary.set("Title", Object::string_literal(item.title.as_str()));
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(item.page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));

        if let Some(name) = &item.name {
            dictionary.set("NM", Object::string_literal(name.as_str()));
        }
        if let Some(prev) = index.checked_sub(1).map(|i| &items[i]) {
            dictionary.set("Prev", Object::Reference(prev.object_id));
        }
        if let Some(next) = items.get(index + 1) {
            dictionary.set("Next", Object::Reference(next.object_id));
        }

        document
            .objects
            .insert(item.object_id, Object::Dictionary(dictionary));
    }
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    items: &[OutlineItem],
) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name("Outlines".into()));
    dictionary.set("Count", Object::Integer(items.len() as i64));
    if let Some(first) = items.first() {
        dictionary.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = items.last() {
        dictionary.set("Last", Object::Reference(last.object_id));
    }
    document
        .objects
        .insert(outlines_id, Object::Dictionary(dictionary));

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?;
    catalog.set("Outlines", Object::Reference(outlines_id));

    Ok(())
}
