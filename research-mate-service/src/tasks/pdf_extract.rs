use crate::error::{AnalysisError, Result};
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{info, warn};

/// Extract the text layer of a PDF, page by page, on the blocking pool.
pub async fn extract_text(content: Vec<u8>) -> Result<String> {
    tokio::task::spawn_blocking(move || extract_text_from_pdf(&content))
        .await
        .map_err(|e| AnalysisError::Extraction(format!("extraction task failed: {}", e)))?
}

/// Concatenate the text of every page in page order.
///
/// The parsed document only lives inside this call. Malformed input, a panic
/// inside the PDF parser, or an empty text layer (scanned images) all yield
/// [`AnalysisError::Extraction`].
pub fn extract_text_from_pdf(content: &[u8]) -> Result<String> {
    info!("Extracting text from PDF ({} bytes)", content.len());

    // pdf-extract can panic on broken fonts/glyph tables
    let pages = match catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(content)
    })) {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            warn!("PDF could not be parsed: {}", e);
            return Err(AnalysisError::Extraction(format!(
                "the file is not a readable PDF ({})",
                e
            )));
        }
        Err(_) => {
            warn!("PDF parser panicked, likely malformed fonts");
            return Err(AnalysisError::Extraction(
                "the PDF could not be parsed (malformed content)".to_string(),
            ));
        }
    };

    let page_count = pages.len();
    let text: String = pages.concat();

    if text.trim().is_empty() {
        warn!("No extractable text in {} page(s)", page_count);
        return Err(AnalysisError::Extraction(
            "no extractable text found; scanned or image-only PDFs are not supported".to_string(),
        ));
    }

    info!(
        "Extracted {} characters from {} page(s)",
        text.len(),
        page_count
    );
    Ok(text)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    /// Build a PDF with one page per entry; an empty entry gives a page with
    /// no text operators.
    pub(crate) fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = if text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(page_id.into());
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

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_pages_are_concatenated_in_order() {
        let pdf = build_pdf(&["Introduction", "Methods", "Results"]);
        let text = extract_text_from_pdf(&pdf).unwrap();

        let intro = text.find("Introduction").expect("page 1 text");
        let methods = text.find("Methods").expect("page 2 text");
        let results = text.find("Results").expect("page 3 text");
        assert!(intro < methods && methods < results);
    }

    #[test]
    fn test_not_a_pdf() {
        let result = extract_text_from_pdf(b"this is plainly not a pdf");
        assert!(matches!(result, Err(AnalysisError::Extraction(_))));
    }

    #[test]
    fn test_empty_text_layer_is_a_failure() {
        let pdf = build_pdf(&["", ""]);
        let result = extract_text_from_pdf(&pdf);
        assert!(matches!(result, Err(AnalysisError::Extraction(_))));
    }

    #[tokio::test]
    async fn test_extract_on_blocking_pool() {
        let pdf = build_pdf(&["Hello Paper"]);
        let text = extract_text(pdf).await.unwrap();
        assert!(text.contains("Hello"));
    }
}
