//! Assembling the final PDF from an attachment and generated pages using lopdf
//!
//! The page order comes from [`AssemblyPolicy::plan`]; this module only
//! carries it out on real documents. Source documents are cloned, never
//! modified.

use std::path::Path;
use lopdf::{Dictionary, Document, Object, ObjectId};
use log::{debug, info};
use crate::assemble::{AssemblyPolicy, PageRef};
use crate::error::Result;
use super::document::{read_document, save_document, stamp_info};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Deepest page tree walked when resolving inherited attributes
const MAX_TREE_DEPTH: usize = 64;

/// Merge an attachment with generated pages into a new document
///
/// # Example
///
/// ```no_run
/// use pdf_directory::assemble::AssemblyPolicy;
/// use pdf_directory::pdf::merge_documents;
/// use lopdf::Document;
///
/// let attachment = Document::load("cover.pdf").unwrap();
/// let generated = Document::load("listing.pdf").unwrap();
/// let mut merged = merge_documents(&attachment, &generated, &AssemblyPolicy::default()).unwrap();
/// merged.save("directory.pdf").unwrap();
/// ```
pub fn merge_documents(
    attachment: &Document,
    generated: &Document,
    policy: &AssemblyPolicy,
) -> Result<Document> {
    let mut attachment = attachment.clone();
    let mut generated = generated.clone();

    // Renumber so the two object spaces do not collide
    attachment.renumber_objects_with(1);
    generated.renumber_objects_with(attachment.max_id + 1);

    let attachment_pages = page_ids(&mut attachment)?;
    let generated_pages = page_ids(&mut generated)?;

    let plan = policy.plan(attachment_pages.len(), generated_pages.len());
    let dropped = policy.dropped(attachment_pages.len());
    if dropped > 0 {
        info!(
            "Leaving out {} of {} attachment pages",
            dropped,
            attachment_pages.len()
        );
    }

    let page_order: Vec<ObjectId> = plan
        .iter()
        .map(|page| match *page {
            PageRef::Attachment(i) => attachment_pages[i],
            PageRef::Generated(i) => generated_pages[i],
        })
        .collect();

    let max_id = generated.max_id.max(attachment.max_id);
    let mut merged = Document::with_version("1.5");
    merged.objects.extend(attachment.objects);
    merged.objects.extend(generated.objects);
    merged.max_id = max_id;

    let pages_id = merged.new_object_id();
    let kids: Vec<Object> = page_order.iter().map(|&id| Object::Reference(id)).collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_order.len() as i64));
    pages_object.set("Kids", Object::Array(kids));
    merged.objects.insert(pages_id, Object::Dictionary(pages_object));

    let catalog_id = merged.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    merged.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_order {
        merged.get_dictionary_mut(page_id)?
            .set("Parent", Object::Reference(pages_id));
    }

    // The source catalogs and page trees are no longer reachable
    let pruned = merged.prune_objects();
    debug!("Pruned {} unreachable objects", pruned.len());

    Ok(merged)
}

/// Page ids in page order, with inherited attributes copied onto each page
fn page_ids(doc: &mut Document) -> Result<Vec<ObjectId>> {
    let ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for &id in &ids {
        push_down_inherited(doc, id)?;
    }
    Ok(ids)
}

/// Copy attributes the page inherits from its page tree onto the page itself
///
/// Pages are moved under a new parent, so anything they inherited from the
/// old tree would otherwise be lost.
fn push_down_inherited(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        for key in INHERITABLE {
            if page.has(key) {
                continue;
            }

            let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
            let mut depth = 0;
            while let Some(parent_id) = parent {
                if depth == MAX_TREE_DEPTH {
                    break;
                }
                let node = doc.get_dictionary(parent_id)?;
                if let Ok(value) = node.get(key) {
                    inherited.push((key, value.clone()));
                    break;
                }
                parent = node.get(b"Parent").and_then(Object::as_reference).ok();
                depth += 1;
            }
        }
    }

    if !inherited.is_empty() {
        let page = doc.get_dictionary_mut(page_id)?;
        for (key, value) in inherited {
            page.set(key.to_vec(), value);
        }
    }

    Ok(())
}

/// Merge two PDF files and write the result
///
/// Returns the number of pages written.
pub fn assemble_files(
    attachment_path: &Path,
    generated_path: &Path,
    output_path: &Path,
    policy: &AssemblyPolicy,
) -> Result<usize> {
    let attachment = read_document(attachment_path)?;
    let generated = read_document(generated_path)?;

    let mut merged = merge_documents(&attachment, &generated, policy)?;
    stamp_info(&mut merged, None);
    let page_count = merged.get_pages().len();
    save_document(&mut merged, output_path)?;

    Ok(page_count)
}
