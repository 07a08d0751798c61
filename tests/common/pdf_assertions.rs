use lopdf::{Dictionary, Document as LopdfDocument, Object};
use std::collections::BTreeSet;

/// Extract all text content from a PDF document
pub fn extract_text(doc: &LopdfDocument) -> String {
    let mut text = String::new();
    let pages = doc.get_pages();
    for page_num in 1..=pages.len() {
        if let Ok(page_text) = doc.extract_text(&[page_num as u32]) {
            text.push_str(&page_text);
            text.push('\n');
        }
    }
    text
}

/// Text of a single page (1-based).
pub fn page_text(doc: &LopdfDocument, page_num: u32) -> String {
    doc.extract_text(&[page_num]).unwrap_or_default()
}

fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj.as_reference() {
        Ok(id) => doc.get_dictionary(id).ok(),
        Err(_) => obj.as_dict().ok(),
    }
}

/// Extract the base font names referenced by page resources
pub fn extract_font_names(doc: &LopdfDocument) -> Vec<String> {
    let mut fonts = BTreeSet::new();
    for page_id in doc.get_pages().values() {
        let Ok(page) = doc.get_dictionary(*page_id) else { continue };
        let Some(resources) = page.get(b"Resources").ok().and_then(|r| resolve_dict(doc, r)) else {
            continue;
        };
        let Some(font_dict) = resources.get(b"Font").ok().and_then(|f| resolve_dict(doc, f)) else {
            continue;
        };
        for (_name, font) in font_dict.iter() {
            if let Some(base) = resolve_dict(doc, font).and_then(|d| d.get(b"BaseFont").ok()) {
                if let Ok(name) = base.as_name() {
                    fonts.insert(String::from_utf8_lossy(name).to_string());
                }
            }
        }
    }
    fonts.into_iter().collect()
}

#[derive(Debug)]
pub struct LinkAnnotation {
    pub page: u32,
    pub rect: Option<[f32; 4]>,
    pub uri: Option<String>,
}

/// Extract link annotations from PDF pages
pub fn extract_link_annotations(doc: &LopdfDocument) -> Vec<LinkAnnotation> {
    let mut annotations = Vec::new();
    for (page_num, page_id) in doc.get_pages() {
        let Ok(page) = doc.get_dictionary(page_id) else { continue };
        let Ok(annots) = page.get(b"Annots").and_then(|a| a.as_array()) else {
            continue;
        };
        for annot in annots {
            let Some(dict) = resolve_dict(doc, annot) else { continue };
            let is_link = dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .is_ok_and(|name| name == b"Link");
            if !is_link {
                continue;
            }
            let uri = dict
                .get(b"A")
                .ok()
                .and_then(|a| resolve_dict(doc, a))
                .and_then(|action| action.get(b"URI").ok())
                .and_then(|uri| uri.as_str().ok())
                .map(|bytes| String::from_utf8_lossy(bytes).to_string());
            let rect = dict.get(b"Rect").and_then(|r| r.as_array()).ok().and_then(|arr| {
                let values: Vec<f32> = arr.iter().filter_map(|v| v.as_float().ok()).collect();
                <[f32; 4]>::try_from(values).ok()
            });
            annotations.push(LinkAnnotation {
                page: page_num,
                rect,
                uri,
            });
        }
    }
    annotations
}

/// Get page dimensions (width, height) in points
pub fn get_page_dimensions(doc: &LopdfDocument, page_num: u32) -> Option<(f32, f32)> {
    let page_id = doc.get_pages().get(&page_num).copied()?;
    let page = doc.get_dictionary(page_id).ok()?;
    let arr = page.get(b"MediaBox").ok()?.as_array().ok()?;
    if arr.len() < 4 {
        return None;
    }
    let width = arr[2].as_float().ok()? - arr[0].as_float().ok()?;
    let height = arr[3].as_float().ok()? - arr[1].as_float().ok()?;
    Some((width, height))
}

/// A text entry of the trailer's `/Info` dictionary.
pub fn info_entry(doc: &LopdfDocument, key: &[u8]) -> Option<String> {
    let info = resolve_dict(doc, doc.trailer.get(b"Info").ok()?)?;
    let bytes = info.get(key).ok()?.as_str().ok()?;
    Some(String::from_utf8_lossy(bytes).to_string())
}

// ============================================================================
// Fluent Assertion Macros
// ============================================================================

/// Assert that PDF contains specific text
#[macro_export]
macro_rules! assert_pdf_contains_text {
    ($pdf:expr, $text:expr) => {
        let extracted = $crate::common::pdf_assertions::extract_text(&$pdf.doc);
        assert!(
            extracted.contains($text),
            "PDF should contain '{}', but extracted text was:\n{}",
            $text,
            extracted
        );
    };
}

/// Assert that PDF does NOT contain specific text
#[macro_export]
macro_rules! assert_pdf_not_contains_text {
    ($pdf:expr, $text:expr) => {
        let extracted = $crate::common::pdf_assertions::extract_text(&$pdf.doc);
        assert!(
            !extracted.contains($text),
            "PDF should NOT contain '{}', but it was found in:\n{}",
            $text,
            extracted
        );
    };
}

/// Assert the number of pages in a PDF
#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $count,
            "Expected {} pages, got {}",
            $count,
            $pdf.page_count()
        );
    };
}

/// Assert minimum number of pages
#[macro_export]
macro_rules! assert_pdf_min_pages {
    ($pdf:expr, $min:expr) => {
        assert!(
            $pdf.page_count() >= $min,
            "Expected at least {} pages, got {}",
            $min,
            $pdf.page_count()
        );
    };
}

/// Assert that PDF contains a font matching a pattern
#[macro_export]
macro_rules! assert_pdf_has_font {
    ($pdf:expr, $pattern:expr) => {
        let fonts = $crate::common::pdf_assertions::extract_font_names(&$pdf.doc);
        assert!(
            fonts.iter().any(|f| f.contains($pattern)),
            "PDF should contain font matching '{}', fonts found: {:?}",
            $pattern,
            fonts
        );
    };
}

/// Assert the number of link annotations
#[macro_export]
macro_rules! assert_pdf_link_count {
    ($pdf:expr, $count:expr) => {
        let links = $crate::common::pdf_assertions::extract_link_annotations(&$pdf.doc);
        assert_eq!(links.len(), $count, "Expected {} links, got {:?}", $count, links);
    };
}

/// Assert page dimensions within tolerance
#[macro_export]
macro_rules! assert_pdf_page_size {
    ($pdf:expr, $page:expr, $width:expr, $height:expr) => {
        let dims = $crate::common::pdf_assertions::get_page_dimensions(&$pdf.doc, $page);
        assert!(dims.is_some(), "Could not get dimensions for page {}", $page);
        let (w, h) = dims.unwrap();
        assert!(
            (w - $width).abs() < 1.0,
            "Page {} width expected ~{}, got {}",
            $page,
            $width,
            w
        );
        assert!(
            (h - $height).abs() < 1.0,
            "Page {} height expected ~{}, got {}",
            $page,
            $height,
            h
        );
    };
}
