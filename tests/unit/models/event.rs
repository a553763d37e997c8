//! Unit tests for build events

use chartdeck::models::{ChartEvent, Symbol, SymbolOutcome};
use std::path::PathBuf;

fn progress(symbol: &str, outcome: SymbolOutcome) -> ChartEvent {
    ChartEvent::Progress {
        index: 1,
        total: 1,
        symbol: Symbol::parse(symbol).unwrap(),
        outcome,
    }
}

#[test]
fn renders_status_lines() {
    assert_eq!(
        progress("AAPL", SymbolOutcome::Added).to_string(),
        "Added chart for AAPL"
    );
    assert_eq!(
        progress(
            "MSFT",
            SymbolOutcome::Failed {
                reason: "500 Internal Server Error".to_string()
            }
        )
        .to_string(),
        "Failed to download MSFT: 500 Internal Server Error"
    );
}

#[test]
fn only_completed_and_fatal_are_terminal() {
    assert!(!progress("AAPL", SymbolOutcome::Added).is_terminal());
    assert!(ChartEvent::Completed {
        path: PathBuf::from("charts_default.pdf"),
        pages: 0,
        charts: 0
    }
    .is_terminal());
    assert!(ChartEvent::Fatal {
        error: "disk full".to_string()
    }
    .is_terminal());
}

#[test]
fn symbol_named_like_a_pdf_stays_a_progress_event() {
    let event = progress(
        "X.pdf",
        SymbolOutcome::Failed {
            reason: "see report.pdf".to_string(),
        },
    );
    assert!(event.to_string().ends_with(".pdf"));
    assert!(!event.is_terminal());
}
