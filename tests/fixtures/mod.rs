//! Shared PDF fixtures, built with lopdf so every test starts from a known structure
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

pub const EVIDENCE_LINES: [&str; 3] = [
    "Contact alice@example.com about the posting",
    "Recruiter: Bob Smith",
    "Salary range not listed for alice",
];

pub struct TestFixtures;

impl TestFixtures {
    /// One page per entry of `pages`, each line drawn with a `Tj`
    pub fn text_pdf(pages: &[&[&str]]) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for lines in pages {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), Object::Integer(12)]),
                Operation::new("TL", vec![Object::Integer(14)]),
                Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
            ];
            for line in *lines {
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    /// Single page labelled `label`, for ordering checks
    pub fn labelled_pdf(label: &str) -> Document {
        Self::text_pdf(&[&[label]])
    }

    /// Evidence that leaks "alice" everywhere a redactor has to look: page text,
    /// a mailto link, the Info dictionary, an XMP packet and the trailer ID
    pub fn evidence_pdf() -> Document {
        let mut doc = Self::text_pdf(&[&EVIDENCE_LINES]);
        let page_id = Self::first_page(&doc);

        let link_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => vec![
                Object::Integer(72),
                Object::Integer(700),
                Object::Integer(300),
                Object::Integer(720),
            ],
            "A" => dictionary! {
                "S" => "URI",
                "URI" => Object::string_literal("mailto:alice@example.com"),
            },
        });
        let other_link_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => vec![
                Object::Integer(72),
                Object::Integer(680),
                Object::Integer(300),
                Object::Integer(700),
            ],
            "A" => dictionary! {
                "S" => "URI",
                "URI" => Object::string_literal("https://jobs.example.com/posting/42"),
            },
        });
        if let Ok(page) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
            page.set(
                "Annots",
                vec![Object::Reference(link_id), Object::Reference(other_link_id)],
            );
        }

        let info_id = doc.add_object(dictionary! {
            "Producer" => Object::string_literal("Microsoft Word for alice"),
            "Author" => Object::string_literal("alice"),
            "Title" => Object::string_literal("Job posting"),
            "CreationDate" => Object::string_literal("D:20190101000000Z"),
        });
        doc.trailer.set("Info", info_id);

        let xmp_id = doc.add_object(Stream::new(
            dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
            b"<x:xmpmeta><dc:creator>alice</dc:creator></x:xmpmeta>".to_vec(),
        ));
        let catalog_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        if let Ok(catalog) = doc.get_object_mut(catalog_id).and_then(Object::as_dict_mut) {
            catalog.set("Metadata", xmp_id);
        }

        let id = Object::String(b"alice-original-id".to_vec(), StringFormat::Hexadecimal);
        doc.trailer.set("ID", vec![id.clone(), id]);
        doc
    }

    /// Evidence as word processors tend to emit it: the address kerned across
    /// `TJ` elements and the link annotation written inline in /Annots
    pub fn kerned_evidence_pdf() -> Document {
        let mut doc = Self::text_pdf(&[&["Recruiter: Bob Smith"]]);
        let page_id = Self::first_page(&doc);

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
                Operation::new(
                    "TJ",
                    vec![Object::Array(vec![
                        Object::string_literal("Contact ali"),
                        Object::Integer(-15),
                        Object::string_literal("ce@example.com"),
                        Object::Integer(-250),
                        Object::string_literal("today"),
                    ])],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let link = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "A" => dictionary! {
                "S" => "URI",
                "URI" => Object::string_literal("mailto:alice@example.com"),
            },
        };
        if let Ok(page) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
            page.set("Contents", content_id);
            page.set("Annots", vec![Object::Dictionary(link)]);
        }
        doc
    }

    /// Every shown string of the first page, `Tj` operands and `TJ` elements alike
    pub fn shown_strings(doc: &Document) -> Vec<String> {
        let content = Content::decode(&doc.get_page_content(Self::first_page(doc)).unwrap()).unwrap();
        let mut out = Vec::new();
        for operand in content.operations.iter().flat_map(|op| op.operands.iter()) {
            match operand {
                Object::String(bytes, _) => out.push(String::from_utf8_lossy(bytes).into_owned()),
                Object::Array(items) => out.extend(
                    items
                        .iter()
                        .filter_map(|item| item.as_str().ok())
                        .map(|s| String::from_utf8_lossy(s).into_owned()),
                ),
                _ => {}
            }
        }
        out
    }

    pub fn write(mut doc: Document, path: &Path) -> PathBuf {
        doc.save(path).unwrap();
        path.to_path_buf()
    }

    pub fn first_page(doc: &Document) -> ObjectId {
        *doc.get_pages().values().next().unwrap()
    }

    /// Shown strings of each page, in page order
    pub fn page_texts(doc: &Document) -> Vec<Vec<String>> {
        doc.get_pages()
            .into_values()
            .map(|page_id| {
                let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
                content
                    .operations
                    .iter()
                    .filter(|op| op.operator == "Tj")
                    .filter_map(|op| op.operands.first())
                    .filter_map(|operand| operand.as_str().ok())
                    .map(|s| String::from_utf8_lossy(s).into_owned())
                    .collect()
            })
            .collect()
    }

    /// First shown string of each page
    pub fn page_labels(doc: &Document) -> Vec<String> {
        Self::page_texts(doc)
            .into_iter()
            .map(|texts| texts.into_iter().next().unwrap_or_default())
            .collect()
    }

    pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }
}
