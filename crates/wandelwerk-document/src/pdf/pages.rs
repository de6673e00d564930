// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF page pipeline — merge, split, and rotate existing PDF documents using
// the `lopdf` crate. Every operation loads a document, applies one structural
// transform, and re-serialises.

use lopdf::{Document, Object, ObjectId, dictionary};
use tracing::{debug, info, instrument, warn};
use wandelwerk_core::error::{Result, WandelwerkError};
use wandelwerk_core::types::{ResultFile, RotationAngle, SplitMode};

/// An opened PDF document ready for page-level operations.
pub struct PdfPages {
    document: Document,
}

impl PdfPages {
    // -- Construction ---------------------------------------------------------

    /// Load a PDF from raw bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data)
            .map_err(|err| WandelwerkError::Pdf(format!("failed to load PDF: {}", err)))?;

        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    // -- Split ----------------------------------------------------------------

    /// Split the document into single-page documents.
    ///
    /// `SplitMode::All` emits one output per source page; `SplitMode::Range`
    /// emits outputs for an inclusive 1-indexed range, clamped to the
    /// document. A range that is empty after clamping yields no outputs.
    /// Each output is named `page_{n}.pdf` after its source page.
    #[instrument(skip(self), fields(mode = ?mode))]
    pub fn split(&self, mode: SplitMode) -> Result<Vec<ResultFile>> {
        let total = self.page_count() as u32;
        if total == 0 {
            return Ok(Vec::new());
        }

        let (start, end) = match mode {
            SplitMode::All => (1, total),
            SplitMode::Range(range) => range.clamped(total),
        };

        info!(start, end, total, "Splitting PDF");

        let mut outputs = Vec::new();
        for page_number in start..=end {
            let bytes = self.extract_page(page_number)?;
            outputs.push(ResultFile::new(
                format!("page_{}.pdf", page_number),
                "application/pdf",
                bytes,
            ));
        }

        debug!(outputs = outputs.len(), "Split complete");
        Ok(outputs)
    }

    // -- Rotate ---------------------------------------------------------------

    /// Set an absolute rotation on every page.
    ///
    /// The angle is normalised modulo 360 when written, uniformly for all
    /// inputs, so rotating by 360 leaves the effective rotation unchanged.
    #[instrument(skip(self), fields(degrees = angle.degrees()))]
    pub fn rotate(&self, angle: RotationAngle) -> Result<Vec<u8>> {
        let mut doc = self.document.clone();
        let rotation = angle.degrees().rem_euclid(360);

        let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
        info!(rotation, pages = page_ids.len(), "Rotating PDF pages");

        for page_id in page_ids {
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
                dict.set("Rotate", Object::Integer(rotation));
            }
        }

        serialize(doc)
    }

    // -- Helpers --------------------------------------------------------------

    /// Extract a single page (1-indexed) into a new standalone PDF.
    fn extract_page(&self, page_number: u32) -> Result<Vec<u8>> {
        let pages = self.document.get_pages();
        let page_id = *pages.get(&page_number).ok_or_else(|| {
            WandelwerkError::Pdf(format!(
                "page {} not found (document has {} pages)",
                page_number,
                pages.len()
            ))
        })?;

        let (mut target, pages_id) = new_empty_document();
        append_page(&self.document, &mut target, pages_id, page_id)?;
        serialize(target)
    }
}

/// Concatenate the pages of two or more PDF documents into one.
///
/// Pages appear in input order, then page order within each input — merging
/// an m-page document with an n-page document yields exactly m + n pages.
#[instrument(skip_all, fields(input_count = inputs.len()))]
pub fn merge_documents(inputs: &[&[u8]]) -> Result<Vec<u8>> {
    if inputs.len() < 2 {
        return Err(WandelwerkError::Pdf(format!(
            "merge requires at least two documents, got {}",
            inputs.len()
        )));
    }

    let (mut target, pages_id) = new_empty_document();

    for (index, bytes) in inputs.iter().enumerate() {
        let source = Document::load_mem(bytes).map_err(|err| {
            WandelwerkError::Pdf(format!("failed to load input #{}: {}", index + 1, err))
        })?;

        // `get_pages` keys are 1-indexed page numbers in reading order.
        for (_, page_id) in source.get_pages() {
            append_page(&source, &mut target, pages_id, page_id)?;
        }
    }

    info!(
        inputs = inputs.len(),
        pages = target.get_pages().len(),
        "Merge complete"
    );
    serialize(target)
}

// -- Document scaffolding -----------------------------------------------------

/// Create a document with an empty page tree and a catalog pointing at it.
///
/// Returns the document and the object id of its /Pages node, ready for
/// [`append_page`] calls.
fn new_empty_document() -> (Document, ObjectId) {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => 0,
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    (doc, pages_id)
}

/// Clone one page (content streams and resources included) from `source` into
/// `target`, appending it as the last page of `target`'s page tree.
fn append_page(
    source: &Document,
    target: &mut Document,
    target_pages_id: ObjectId,
    page_id: ObjectId,
) -> Result<()> {
    let page_object = source
        .get_object(page_id)
        .map_err(|err| WandelwerkError::Pdf(format!("cannot read page {:?}: {}", page_id, err)))?;

    let cloned = clone_value(source, target, page_object)?;
    let new_page_id = target.add_object(cloned);

    // Point the cloned page at the target's page tree.
    if let Ok(Object::Dictionary(page_dict)) = target.get_object_mut(new_page_id) {
        page_dict.set("Parent", Object::Reference(target_pages_id));
    }

    // Register it in /Kids and bump /Count.
    if let Ok(Object::Dictionary(pages_dict)) = target.get_object_mut(target_pages_id) {
        if let Ok(Object::Array(kids)) = pages_dict.get_mut(b"Kids") {
            kids.push(Object::Reference(new_page_id));
        }
        if let Ok(Object::Integer(count)) = pages_dict.get_mut(b"Count") {
            *count += 1;
        }
    }

    Ok(())
}

/// Deep-clone a PDF object from `source` into `target`.
///
/// References are resolved in the source, cloned, and re-registered in the
/// target. /Parent keys are skipped — they form the only cycle in a page
/// graph and are patched by [`append_page`]. Dangling references degrade to
/// Null rather than failing the whole operation.
fn clone_value(source: &Document, target: &mut Document, object: &Object) -> Result<Object> {
    match object {
        Object::Dictionary(dict) => {
            let mut new_dict = lopdf::Dictionary::new();
            for (key, value) in dict.iter() {
                if key == b"Parent" {
                    continue;
                }
                new_dict.set(key.clone(), clone_value(source, target, value)?);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(array) => {
            let mut new_array = Vec::with_capacity(array.len());
            for item in array {
                new_array.push(clone_value(source, target, item)?);
            }
            Ok(Object::Array(new_array))
        }
        Object::Reference(ref_id) => match source.get_object(*ref_id) {
            Ok(referenced) => {
                let cloned = clone_value(source, target, referenced)?;
                let new_id = target.add_object(cloned);
                Ok(Object::Reference(new_id))
            }
            Err(err) => {
                warn!(?ref_id, %err, "cannot resolve reference, using Null");
                Ok(Object::Null)
            }
        },
        Object::Stream(stream) => {
            let mut new_dict = lopdf::Dictionary::new();
            for (key, value) in stream.dict.iter() {
                if key == b"Parent" {
                    continue;
                }
                new_dict.set(key.clone(), clone_value(source, target, value)?);
            }
            Ok(Object::Stream(lopdf::Stream::new(
                new_dict,
                stream.content.clone(),
            )))
        }
        // Boolean, Integer, Real, String, Name, Null are trivially cloneable.
        other => Ok(other.clone()),
    }
}

/// Serialise a document to bytes.
pub(crate) fn serialize(mut doc: Document) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|err| WandelwerkError::Pdf(format!("failed to serialise PDF: {}", err)))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wandelwerk_core::types::PageRange;

    /// Build a PDF whose pages are distinguishable by their MediaBox widths.
    fn sample_pdf(page_widths: &[i64]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");

        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();

        for width in page_widths {
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![0.into(), 0.into(), (*width).into(), 800.into()],
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_widths.len() as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut output = Vec::new();
        doc.save_to(&mut output).expect("sample PDF must serialise");
        output
    }

    fn numeric(object: &Object) -> f64 {
        match object {
            Object::Integer(value) => *value as f64,
            Object::Real(value) => *value as f64,
            other => panic!("expected a number, got {:?}", other),
        }
    }

    /// MediaBox width of a page (1-indexed) in a serialised PDF.
    fn media_width(bytes: &[u8], page_number: u32) -> f64 {
        let doc = Document::load_mem(bytes).expect("output must reload");
        let pages = doc.get_pages();
        let page_id = pages[&page_number];
        let dict = doc
            .get_object(page_id)
            .and_then(|obj| obj.as_dict())
            .expect("page dictionary");
        let media_box = dict
            .get(b"MediaBox")
            .and_then(|obj| obj.as_array())
            .expect("MediaBox array");
        numeric(&media_box[2])
    }

    fn rotation_of(bytes: &[u8], page_number: u32) -> i64 {
        let doc = Document::load_mem(bytes).expect("output must reload");
        let pages = doc.get_pages();
        let dict = doc
            .get_object(pages[&page_number])
            .and_then(|obj| obj.as_dict())
            .expect("page dictionary");
        match dict.get(b"Rotate") {
            Ok(Object::Integer(value)) => *value,
            _ => 0,
        }
    }

    #[test]
    fn merge_concatenates_in_input_order() {
        let doc_a = sample_pdf(&[100, 200]);
        let doc_b = sample_pdf(&[300, 400, 500]);

        let merged = merge_documents(&[&doc_a, &doc_b]).unwrap();
        let reloaded = PdfPages::from_bytes(&merged).unwrap();

        assert_eq!(reloaded.page_count(), 5);
        for (page, expected) in [(1, 100.0), (2, 200.0), (3, 300.0), (4, 400.0), (5, 500.0)] {
            assert_eq!(media_width(&merged, page), expected);
        }
    }

    #[test]
    fn merge_requires_two_inputs() {
        let doc = sample_pdf(&[100]);
        assert!(merge_documents(&[&doc]).is_err());
        assert!(merge_documents(&[]).is_err());
    }

    #[test]
    fn split_all_yields_one_document_per_page() {
        let source = sample_pdf(&[100, 200, 300]);
        let pages = PdfPages::from_bytes(&source).unwrap();

        let outputs = pages.split(SplitMode::All).unwrap();
        assert_eq!(outputs.len(), 3);

        for (index, expected) in [100.0, 200.0, 300.0].iter().enumerate() {
            let output = &outputs[index];
            assert_eq!(output.name, format!("page_{}.pdf", index + 1));
            let reloaded = PdfPages::from_bytes(&output.data).unwrap();
            assert_eq!(reloaded.page_count(), 1);
            assert_eq!(media_width(&output.data, 1), *expected);
        }
    }

    #[test]
    fn split_range_extracts_the_requested_pages() {
        let source = sample_pdf(&[100, 200, 300, 400, 500]);
        let pages = PdfPages::from_bytes(&source).unwrap();

        let outputs = pages
            .split(SplitMode::Range(PageRange { start: 2, end: 3 }))
            .unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].name, "page_2.pdf");
        assert_eq!(media_width(&outputs[0].data, 1), 200.0);
        assert_eq!(outputs[1].name, "page_3.pdf");
        assert_eq!(media_width(&outputs[1].data, 1), 300.0);
    }

    #[test]
    fn split_range_clamps_to_document_bounds() {
        let source = sample_pdf(&[100, 200, 300]);
        let pages = PdfPages::from_bytes(&source).unwrap();

        let outputs = pages
            .split(SplitMode::Range(PageRange { start: 0, end: 99 }))
            .unwrap();
        assert_eq!(outputs.len(), 3);
    }

    #[test]
    fn split_inverted_range_yields_nothing() {
        let source = sample_pdf(&[100, 200, 300]);
        let pages = PdfPages::from_bytes(&source).unwrap();

        let outputs = pages
            .split(SplitMode::Range(PageRange { start: 3, end: 1 }))
            .unwrap();
        assert!(outputs.is_empty());
    }

    #[test]
    fn rotate_sets_absolute_rotation_on_every_page() {
        let source = sample_pdf(&[100, 200]);
        let pages = PdfPages::from_bytes(&source).unwrap();

        let rotated = pages.rotate(RotationAngle::Deg90).unwrap();
        assert_eq!(rotation_of(&rotated, 1), 90);
        assert_eq!(rotation_of(&rotated, 2), 90);
    }

    #[test]
    fn rotate_by_360_is_a_semantic_noop() {
        let source = sample_pdf(&[100, 200]);
        let pages = PdfPages::from_bytes(&source).unwrap();

        let rotated = pages.rotate(RotationAngle::Deg360).unwrap();
        let reloaded = PdfPages::from_bytes(&rotated).unwrap();

        assert_eq!(reloaded.page_count(), 2);
        // Effective rotation matches the original (none).
        assert_eq!(rotation_of(&rotated, 1).rem_euclid(360), 0);
        assert_eq!(rotation_of(&rotated, 2).rem_euclid(360), 0);
        // Page content untouched.
        assert_eq!(media_width(&rotated, 1), 100.0);
        assert_eq!(media_width(&rotated, 2), 200.0);
    }
}
