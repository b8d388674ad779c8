// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — page counting and page-level merging of existing PDF documents
// using the `lopdf` crate.

use std::path::Path;

use lopdf::{Document, Object, ObjectId};
use pdf2ocr_core::error::{Pdf2OcrError, Result};
use tracing::{debug, instrument, warn};

use crate::traits::PageCounter;

/// Reads and combines existing PDF files.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let document = Document::load(path_ref).map_err(|err| {
            Pdf2OcrError::PageCount(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            Pdf2OcrError::Layout(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    // -- Combination ----------------------------------------------------------

    /// Append the pages of every document in `others` after this document's
    /// pages, returning the combined PDF bytes.
    #[instrument(skip_all, fields(additional_count = others.len()))]
    pub fn merge(&self, others: &[&[u8]]) -> Result<Vec<u8>> {
        let mut merged = self.document.clone();

        for (index, other_bytes) in others.iter().enumerate() {
            let other_doc = Document::load_mem(other_bytes).map_err(|err| {
                Pdf2OcrError::Layout(format!("failed to load page PDF #{}: {}", index + 2, err))
            })?;

            let other_pages = other_doc.get_pages();
            let mut page_numbers: Vec<u32> = other_pages.keys().copied().collect();
            page_numbers.sort_unstable();

            for page_num in page_numbers {
                let page_id = other_pages[&page_num];
                clone_page_into(&other_doc, &mut merged, page_id)?;
            }
        }

        let mut output = Vec::new();
        merged.save_to(&mut output).map_err(|err| {
            Pdf2OcrError::Layout(format!("failed to serialise merged PDF: {}", err))
        })?;

        debug!(output_bytes = output.len(), "Merge complete");
        Ok(output)
    }
}

/// [`PageCounter`] backed by lopdf's page tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfPageCounter;

impl PageCounter for LopdfPageCounter {
    fn page_count(&self, document: &Path) -> Result<u32> {
        let reader = PdfReader::open(document)?;
        u32::try_from(reader.page_count())
            .map_err(|_| Pdf2OcrError::PageCount("page count exceeds u32".into()))
    }
}

/// Clone a single page object (and its referenced resources) from `source` into
/// `target`, appending it as the last page.
fn clone_page_into(source: &Document, target: &mut Document, page_id: ObjectId) -> Result<()> {
    let page_object = source.get_object(page_id).map_err(|err| {
        Pdf2OcrError::Layout(format!("cannot read page object {:?}: {}", page_id, err))
    })?;

    let cloned = deep_clone_object(source, target, page_object)?;
    let cloned_id = target.add_object(cloned);

    let pages_id = target
        .catalog()
        .map_err(|err| Pdf2OcrError::Layout(format!("no catalog: {}", err)))
        .and_then(|catalog| {
            catalog
                .get(b"Pages")
                .map_err(|err| Pdf2OcrError::Layout(format!("no /Pages: {}", err)))
                .and_then(|pages_ref| match pages_ref {
                    Object::Reference(id) => Ok(*id),
                    _ => Err(Pdf2OcrError::Layout("/Pages is not a reference".to_string())),
                })
        })?;

    if let Ok(Object::Dictionary(pages_dict)) = target.get_object_mut(pages_id) {
        if let Ok(Object::Array(kids)) = pages_dict.get_mut(b"Kids") {
            kids.push(Object::Reference(cloned_id));
        }
        if let Ok(count_obj) = pages_dict.get_mut(b"Count")
            && let Object::Integer(count) = count_obj
        {
            *count += 1;
        }
    }

    if let Ok(Object::Dictionary(page_dict)) = target.get_object_mut(cloned_id) {
        page_dict.set("Parent", Object::Reference(pages_id));
    }

    Ok(())
}

/// Deep-clone a lopdf object into `target`, following references. `/Parent`
/// is skipped; [`clone_page_into`] patches it.
fn deep_clone_object(source: &Document, target: &mut Document, object: &Object) -> Result<Object> {
    match object {
        Object::Dictionary(dict) => {
            let mut new_dict = lopdf::Dictionary::new();
            for (key, value) in dict.iter() {
                if key == b"Parent" {
                    continue;
                }
                new_dict.set(key.clone(), deep_clone_object(source, target, value)?);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(arr) => arr
            .iter()
            .map(|item| deep_clone_object(source, target, item))
            .collect::<Result<Vec<_>>>()
            .map(Object::Array),
        Object::Reference(ref_id) => match source.get_object(*ref_id) {
            Ok(referenced) => {
                let cloned = deep_clone_object(source, target, referenced)?;
                Ok(Object::Reference(target.add_object(cloned)))
            }
            Err(err) => {
                warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                Ok(Object::Null)
            }
        },
        Object::Stream(stream) => {
            let mut new_dict = lopdf::Dictionary::new();
            for (key, value) in stream.dict.iter() {
                if key == b"Parent" {
                    continue;
                }
                new_dict.set(key.clone(), deep_clone_object(source, target, value)?);
            }
            Ok(Object::Stream(lopdf::Stream::new(
                new_dict,
                stream.content.clone(),
            )))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::writer::PdfWriter;

    fn text_pdf(pages: &[&str]) -> Vec<u8> {
        let pages: Vec<String> = pages.iter().map(|p| p.to_string()).collect();
        PdfWriter::new().create_from_pages(&pages, "test").expect("pdf")
    }

    #[test]
    fn counts_pages_of_generated_pdf() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("three.pdf");
        std::fs::write(&path, text_pdf(&["one", "two", "three"])).expect("write");
        assert_eq!(LopdfPageCounter.page_count(&path).expect("count"), 3);
    }

    #[test]
    fn missing_file_is_a_page_count_error() {
        let err = LopdfPageCounter
            .page_count(Path::new("/no/such/file.pdf"))
            .expect_err("should fail");
        assert_eq!(err.origin(), "PageCount");
    }

    #[test]
    fn merge_appends_pages_in_order() {
        let first = text_pdf(&["a"]);
        let second = text_pdf(&["b", "c"]);
        let reader = PdfReader::from_bytes(&first).expect("load");
        let merged = reader.merge(&[&second]).expect("merge");
        let merged = PdfReader::from_bytes(&merged).expect("reload");
        assert_eq!(merged.page_count(), 3);
    }
}
