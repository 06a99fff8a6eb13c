//! XMP metadata cleaner for PDF documents
//! Author: kartik4091
//! Created: 2025-06-05

use std::collections::BTreeSet;

use lopdf::{Document, Object, ObjectId};

/// Removes every embedded XMP packet: the catalog's /Metadata stream and any
/// page, image or XObject level /Metadata entries.
pub struct XmpCleaner;

impl XmpCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Returns the number of metadata streams deleted
    pub fn clean(&self, doc: &mut Document) -> usize {
        let mut referenced: BTreeSet<ObjectId> = BTreeSet::new();

        for object in doc.objects.values_mut() {
            let dict = match object {
                Object::Dictionary(dict) => dict,
                Object::Stream(stream) => &mut stream.dict,
                _ => continue,
            };
            if let Some(Object::Reference(id)) = dict.remove(b"Metadata") {
                referenced.insert(id);
            }
        }

        let typed: Vec<ObjectId> = doc
            .objects
            .iter()
            .filter(|(_, object)| is_metadata_stream(object))
            .map(|(id, _)| *id)
            .collect();
        referenced.extend(typed);

        referenced
            .into_iter()
            .filter(|id| doc.objects.remove(id).is_some())
            .count()
    }
}

impl Default for XmpCleaner {
    fn default() -> Self {
        Self::new()
    }
}

fn is_metadata_stream(object: &Object) -> bool {
    match object {
        Object::Stream(stream) => stream
            .dict
            .get(b"Type")
            .and_then(Object::as_name)
            .map_or(false, |name| name == b"Metadata"),
        _ => false,
    }
}
