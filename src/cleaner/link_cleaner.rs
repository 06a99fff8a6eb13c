//! Link annotation target filtering

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use tracing::{debug, info};

use super::pattern::TokenPattern;

pub const MAILTO: &str = "mailto:";
pub const REDACTED_MAILTO: &str = "mailto:(redacted)";

/// Rewrites a link target: `mailto:` links mentioning a sensitive word are replaced
/// wholesale, everything else passes through.
pub fn filter_link<'a>(href: &'a str, pattern: &TokenPattern) -> &'a str {
    if href.starts_with(MAILTO) && pattern.mentions(href) {
        REDACTED_MAILTO
    } else {
        href
    }
}

/// Applies [`filter_link`] to the URI action of every link annotation
pub struct LinkCleaner<'a> {
    pattern: &'a TokenPattern,
}

impl<'a> LinkCleaner<'a> {
    pub fn new(pattern: &'a TokenPattern) -> Self {
        Self { pattern }
    }

    /// Returns the number of link targets rewritten
    pub fn clean(&self, doc: &mut Document) -> usize {
        if self.pattern.is_empty() {
            return 0;
        }

        let mut rewritten = 0;
        for target in self.uri_actions(doc) {
            let action = match target {
                ActionRef::Indirect(id) => doc.get_object_mut(id).and_then(Object::as_dict_mut).ok(),
                ActionRef::InAnnotation(annot) => annotation_mut(doc, annot)
                    .and_then(|annot| annot.get_mut(b"A").ok())
                    .and_then(|action| action.as_dict_mut().ok()),
            };
            let Some(action) = action else { continue };
            let Ok(uri) = action.get(b"URI").and_then(Object::as_str) else {
                continue;
            };

            let href = String::from_utf8_lossy(uri).into_owned();
            let filtered = filter_link(&href, self.pattern);
            if filtered != href {
                debug!("Redacted mailto link target");
                action.set(
                    "URI",
                    Object::String(filtered.as_bytes().to_vec(), StringFormat::Literal),
                );
                rewritten += 1;
            }
        }

        info!("LinkCleaner: Redacted {} link targets", rewritten);
        rewritten
    }

    /// Where each link's action dictionary lives
    fn uri_actions(&self, doc: &Document) -> Vec<ActionRef> {
        let mut targets = Vec::new();
        for page_id in doc.get_pages().into_values() {
            for (annot_ref, annot) in annotations(doc, page_id) {
                let is_link = annot
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .map_or(false, |s| s == b"Link");
                if !is_link {
                    continue;
                }
                match annot.get(b"A") {
                    Ok(Object::Reference(action_id)) => targets.push(ActionRef::Indirect(*action_id)),
                    Ok(Object::Dictionary(_)) => targets.push(ActionRef::InAnnotation(annot_ref)),
                    _ => {}
                }
            }
        }
        targets
    }
}

/// Holder of an `/Annots` array: the page itself, or an array object it references
#[derive(Debug, Clone, Copy)]
enum AnnotsOwner {
    Page(ObjectId),
    Array(ObjectId),
}

/// Where an annotation dictionary lives
#[derive(Debug, Clone, Copy)]
enum AnnotRef {
    Object(ObjectId),
    Inline { owner: AnnotsOwner, index: usize },
}

enum ActionRef {
    Indirect(ObjectId),
    InAnnotation(AnnotRef),
}

/// Annotation dictionaries of a page, indirect or written directly into /Annots
fn annotations(doc: &Document, page_id: ObjectId) -> Vec<(AnnotRef, &Dictionary)> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    let (owner, items) = match page.get(b"Annots") {
        Ok(Object::Reference(id)) => match doc.get_object(*id).and_then(Object::as_array) {
            Ok(items) => (AnnotsOwner::Array(*id), items),
            Err(_) => return Vec::new(),
        },
        Ok(Object::Array(items)) => (AnnotsOwner::Page(page_id), items),
        _ => return Vec::new(),
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Object::Reference(id) => doc
                .get_dictionary(*id)
                .ok()
                .map(|annot| (AnnotRef::Object(*id), annot)),
            Object::Dictionary(annot) => Some((AnnotRef::Inline { owner, index }, annot)),
            _ => None,
        })
        .collect()
}

fn annotation_mut(doc: &mut Document, annot: AnnotRef) -> Option<&mut Dictionary> {
    match annot {
        AnnotRef::Object(id) => doc.get_object_mut(id).and_then(Object::as_dict_mut).ok(),
        AnnotRef::Inline { owner, index } => {
            let items = match owner {
                AnnotsOwner::Page(id) => doc
                    .get_object_mut(id)
                    .and_then(Object::as_dict_mut)
                    .and_then(|page| page.get_mut(b"Annots"))
                    .and_then(Object::as_array_mut)
                    .ok()?,
                AnnotsOwner::Array(id) => doc.get_object_mut(id).and_then(Object::as_array_mut).ok()?,
            };
            items.get_mut(index)?.as_dict_mut().ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_mailto_with_word_is_replaced() {
        let pattern = TokenPattern::new(["smkent"]).unwrap();
        assert_eq!(filter_link("mailto:smkent@example.com", &pattern), REDACTED_MAILTO);
    }

    #[test]
    fn test_other_links_pass_through() {
        let pattern = TokenPattern::new(["smkent"]).unwrap();
        assert_eq!(
            filter_link("https://example.com/smkent", &pattern),
            "https://example.com/smkent"
        );
        assert_eq!(filter_link("mailto:hr@example.com", &pattern), "mailto:hr@example.com");
    }

    /// Page whose /Annots holds `annots`, optionally through an indirect array
    fn page_with_annots(annots: Vec<Object>, indirect_array: bool) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let annots: Object = if indirect_array {
            Object::Reference(doc.add_object(Object::Array(annots)))
        } else {
            Object::Array(annots)
        };
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Annots" => annots,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn inline_link(uri: &str) -> Object {
        Object::Dictionary(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "A" => dictionary! { "S" => "URI", "URI" => Object::string_literal(uri) },
        })
    }

    fn uris(doc: &Document) -> Vec<String> {
        let page_id = *doc.get_pages().values().next().unwrap();
        annotations(doc, page_id)
            .into_iter()
            .filter_map(|(_, annot)| annot.get(b"A").and_then(Object::as_dict).ok())
            .filter_map(|action| action.get(b"URI").and_then(Object::as_str).ok())
            .map(|uri| String::from_utf8_lossy(uri).into_owned())
            .collect()
    }

    #[test]
    fn test_inline_annotations_are_rewritten() {
        let pattern = TokenPattern::new(["alice"]).unwrap();
        for indirect_array in [false, true] {
            let mut doc = page_with_annots(
                vec![
                    inline_link("mailto:alice@example.com"),
                    inline_link("https://example.com/alice"),
                ],
                indirect_array,
            );

            assert_eq!(LinkCleaner::new(&pattern).clean(&mut doc), 1);
            assert_eq!(
                uris(&doc),
                vec![REDACTED_MAILTO.to_string(), "https://example.com/alice".to_string()]
            );
        }
    }

    #[test]
    fn test_indirect_and_inline_annotations_mix() {
        let pattern = TokenPattern::new(["alice"]).unwrap();
        let mut doc = page_with_annots(Vec::new(), false);
        let annot_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "A" => dictionary! { "S" => "URI", "URI" => Object::string_literal("mailto:alice@a.example") },
        });
        let page_id = *doc.get_pages().values().next().unwrap();
        doc.get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set(
                "Annots",
                vec![Object::Reference(annot_id), inline_link("mailto:alice@b.example")],
            );

        assert_eq!(LinkCleaner::new(&pattern).clean(&mut doc), 2);
        assert_eq!(uris(&doc), vec![REDACTED_MAILTO, REDACTED_MAILTO]);
    }
}
