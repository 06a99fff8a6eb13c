//! PDF concatenation
//! Author: kartik4091
//! Created: 2025-06-05

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, instrument};

use crate::error::{Error, Result};
use crate::utils::process::{expect_output, run_tool};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Concatenates documents into `output`, preserving input order and the page
/// order within each input
pub trait Merger: Send + Sync {
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<()>;
}

/// In-process merger built on lopdf
#[derive(Debug, Clone, Default)]
pub struct LopdfMerger;

impl LopdfMerger {
    pub fn new() -> Self {
        Self
    }

    /// Builds one document from `documents` with a fresh catalog and page tree
    pub fn merge_documents(&self, documents: Vec<Document>) -> Result<Document> {
        if documents.is_empty() {
            return Err(Error::MergeError("no documents to merge".into()));
        }

        let mut merged = Document::with_version("1.5");
        let mut next_id = 1;
        let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();

        for mut doc in documents {
            doc.renumber_objects_with(next_id);
            next_id = doc.max_id + 1;

            let mut skipped: BTreeSet<ObjectId> = BTreeSet::new();
            if let Ok(Object::Reference(info)) = doc.trailer.get(b"Info") {
                skipped.insert(*info);
            }

            for page_id in doc.get_pages().into_values() {
                pages.push((page_id, flatten_page(&doc, page_id)?));
                skipped.insert(page_id);
            }

            for (id, object) in doc.objects {
                if skipped.contains(&id) || is_tree_node(&object) {
                    continue;
                }
                merged.objects.insert(id, object);
            }
        }

        merged.max_id = next_id - 1;
        let pages_id = merged.new_object_id();
        let kids: Vec<Object> = pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
        let count = kids.len() as i64;

        for (id, mut page) in pages {
            page.set("Parent", pages_id);
            merged.objects.insert(id, Object::Dictionary(page));
        }

        merged.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = merged.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        merged.trailer.set("Root", catalog_id);

        debug!("Merged page tree holds {} pages", count);
        Ok(merged)
    }
}

impl Merger for LopdfMerger {
    #[instrument(skip(self, inputs), fields(inputs = inputs.len()))]
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let documents = inputs
            .iter()
            .map(|path| {
                Document::load(path)
                    .map_err(|e| Error::MergeError(format!("{}: {}", path.display(), e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut merged = self.merge_documents(documents)?;
        merged
            .save(output)
            .map_err(|e| Error::MergeError(format!("{}: {}", output.display(), e)))?;

        info!("Merged {} documents into {}", inputs.len(), output.display());
        Ok(())
    }
}

/// Concatenates with `pdftk <inputs...> cat output <out>`
#[derive(Debug, Clone)]
pub struct PdftkMerger {
    program: PathBuf,
}

impl PdftkMerger {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdftkMerger {
    fn default() -> Self {
        Self::new("pdftk")
    }
}

impl Merger for PdftkMerger {
    #[instrument(skip(self, inputs), fields(inputs = inputs.len()))]
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        if inputs.is_empty() {
            return Err(Error::MergeError("no documents to merge".into()));
        }

        let mut args: Vec<&OsStr> = inputs.iter().map(|p| p.as_os_str()).collect();
        args.extend([OsStr::new("cat"), OsStr::new("output"), output.as_os_str()]);
        run_tool(&self.program, args)?;
        expect_output(&self.program, output)
    }
}

/// Copies inherited attributes from the page's ancestors onto the page itself
fn flatten_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut page = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::MergeError(format!("page {:?}: {}", page_id, e)))?
        .clone();

    let mut visited = BTreeSet::from([page_id]);
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    while let Some(parent_id) = parent {
        if !visited.insert(parent_id) {
            break;
        }
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    Ok(page)
}

fn is_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => dict
            .get(b"Type")
            .and_then(Object::as_name)
            .map_or(false, |name| name == b"Catalog" || name == b"Pages"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::Stream;

    /// One page per label, each page showing its label; MediaBox and
    /// Resources live on the Pages node so pages must inherit them
    fn labelled(labels: &[&str]) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids = Vec::new();
        for label in labels {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), Object::Integer(12)]),
                    Operation::new("Tj", vec![Object::string_literal(*label)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => kids.len() as i64,
                "Kids" => kids,
                "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn page_labels(doc: &Document) -> Vec<String> {
        doc.get_pages()
            .into_values()
            .map(|id| {
                let content = Content::decode(&doc.get_page_content(id).unwrap()).unwrap();
                content
                    .operations
                    .iter()
                    .find(|op| op.operator == "Tj")
                    .and_then(|op| op.operands[0].as_str().ok())
                    .map(|s| String::from_utf8_lossy(s).into_owned())
                    .unwrap_or_default()
            })
            .collect()
    }

    #[test]
    fn test_merge_preserves_document_and_page_order() {
        let merged = LopdfMerger::new()
            .merge_documents(vec![
                labelled(&["form-1", "form-2"]),
                labelled(&["addendum"]),
                labelled(&["A"]),
                labelled(&["B-1", "B-2"]),
            ])
            .unwrap();

        assert_eq!(
            page_labels(&merged),
            ["form-1", "form-2", "addendum", "A", "B-1", "B-2"]
        );
    }

    #[test]
    fn test_merged_pages_carry_inherited_attributes() {
        let merged = LopdfMerger::new()
            .merge_documents(vec![labelled(&["one"]), labelled(&["two"])])
            .unwrap();

        for page_id in merged.get_pages().into_values() {
            let page = merged.get_dictionary(page_id).unwrap();
            assert!(page.has(b"MediaBox"));
            assert!(page.has(b"Resources"));
        }
    }

    #[test]
    fn test_merge_round_trips_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut inputs = Vec::new();
        for (i, label) in ["first", "second"].iter().enumerate() {
            let path = dir.path().join(format!("{i}.pdf"));
            labelled(&[label]).save(&path).unwrap();
            inputs.push(path);
        }

        let output = dir.path().join("merged.pdf");
        LopdfMerger::new().merge(&inputs, &output).unwrap();

        let merged = Document::load(&output).unwrap();
        assert_eq!(page_labels(&merged), ["first", "second"]);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let err = LopdfMerger::new().merge_documents(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::MergeError(_)));
    }
}
