//! Whole-document OCR with scripted stages.

mod common;

use tempfile::TempDir;

use common::{write_blank_pdf, FakeOcr, FakeRasterizer};
use pdfsift::pdf::PdfDocument;
use pdfsift::services::{ocr_all_pages, PageOcrOutcome};

#[test]
fn test_every_page_is_ocrd_and_failures_do_not_stop_the_batch() {
    let temp = TempDir::new().unwrap();
    let pdf = write_blank_pdf(temp.path(), "scan.pdf", 3);
    let doc = PdfDocument::open(&pdf).unwrap();

    let raster = FakeRasterizer::failing_on(&[2]);
    let ocr = FakeOcr::default()
        .with_page(1, &["first", "page"])
        .failing_on(3, "engine gave up");
    let out = temp.path().join("images");

    let results = ocr_all_pages(&doc, &raster, &ocr, &out, 150);

    assert_eq!(raster.calls(), vec![1, 2, 3]);
    let keys: Vec<&str> = results.keys().map(String::as_str).collect();
    assert_eq!(keys, ["page_1.jpg", "page_2.jpg", "page_3.jpg"]);

    match &results["page_1.jpg"] {
        PageOcrOutcome::Fragments(fragments) => {
            let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
            assert_eq!(texts, ["first", "page"]);
        }
        other => panic!("expected fragments, got {other:?}"),
    }
    assert!(results["page_2.jpg"].is_failed());
    match &results["page_3.jpg"] {
        PageOcrOutcome::Failed { error } => assert!(error.contains("engine gave up")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(out.join("page_1.jpg").exists());
}
