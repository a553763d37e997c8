//! Unit tests for scan labels

use chartdeck::models::{ScanLabel, ScanLabelError};

#[test]
fn default_label_names_default_pdf() {
    let label = ScanLabel::default();
    assert_eq!(label.as_str(), "default");
    assert_eq!(label.pdf_file_name(), "charts_default.pdf");
}

#[test]
fn accepts_simple_labels() {
    for raw in ["bct4", "ep9", "my-scan_2"] {
        let label = ScanLabel::parse(raw).unwrap();
        assert_eq!(label.pdf_file_name(), format!("charts_{}.pdf", raw));
    }
}

#[test]
fn rejects_labels_unsafe_for_file_names() {
    assert_eq!(ScanLabel::parse(""), Err(ScanLabelError::Empty));
    for raw in ["../etc", "a/b", "with space", "x.pdf"] {
        assert!(
            matches!(ScanLabel::parse(raw), Err(ScanLabelError::InvalidCharacters(_))),
            "{raw} should be rejected"
        );
    }
}
