use std::fs;

use crate::extractor::{ExtractError, ExtractionSpec, PostProcess, extract};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{}", name))
        .expect("Failed to read test fixture")
}

fn selectors(list: &[&str], pattern: Option<&str>) -> ExtractionSpec {
    ExtractionSpec::Selectors {
        selectors: list.iter().map(|s| s.to_string()).collect(),
        pattern: pattern.map(str::to_string),
    }
}

#[test]
fn test_single_selector_quote() {
    let html = r#"<div class="quote"><span class="text">Quote</span></div>"#;
    let table = extract(html, &selectors(&[".text"], None), PostProcess::default()).unwrap();

    assert_eq!(table.columns(), &[".text"]);
    assert_eq!(table.rows(), &[vec!["Quote"]]);
}

#[test]
fn test_selectors_align_by_position() {
    let html = fixture("quotes.html");
    let table = extract(
        &html,
        &selectors(&[".author", ".tag"], None),
        PostProcess::default(),
    )
    .unwrap();

    // 3 authors, 3 tags: zipped by index, not by quote
    assert_eq!(table.len(), 3);
    assert_eq!(table.rows()[0], vec!["Albert Einstein", "change"]);
    assert_eq!(table.rows()[2], vec!["Albert Einstein", "choices"]);
}

#[test]
fn test_shorter_selector_pads_with_empty() {
    let html = fixture("quotes.html");
    let table = extract(
        &html,
        &selectors(&[".text", "footer"], None),
        PostProcess::default(),
    )
    .unwrap();

    assert_eq!(table.len(), 3);
    assert!(table.rows()[0][1].starts_with("Posted"));
    assert_eq!(table.rows()[1][1], "");
    assert_eq!(table.rows()[2][1], "");
    assert!(table.rows().iter().all(|r| r.len() == table.columns().len()));
}

#[test]
fn test_empty_text_falls_back_to_attributes() {
    let html = fixture("quotes.html");
    let table = extract(&html, &selectors(&["img.banner"], None), PostProcess::default()).unwrap();
    assert_eq!(table.rows(), &[vec!["/static/banner.png"]]);
}

#[test]
fn test_selector_regex_filters_each_element() {
    let html = fixture("quotes.html");
    let table = extract(
        &html,
        &selectors(&[".author"], Some(r"Einstein")),
        PostProcess::default(),
    )
    .unwrap();

    assert_eq!(
        table.rows(),
        &[vec!["Einstein"], vec![""], vec!["Einstein"]]
    );
}

#[test]
fn test_clean_whitespace_flag() {
    let html = fixture("quotes.html");
    let raw = extract(&html, &selectors(&[".text"], None), PostProcess::default()).unwrap();
    assert!(raw.rows()[1][0].contains('\n'));

    let clean = extract(
        &html,
        &selectors(&[".text"], None),
        PostProcess {
            clean_whitespace: true,
            unique_only: false,
        },
    )
    .unwrap();
    assert_eq!(
        clean.rows()[1][0],
        "“It is our choices that show what we truly are, far more than our abilities.”"
    );
}

#[test]
fn test_unique_only_dedups_rows() {
    let html = fixture("quotes.html");
    let flags = PostProcess {
        clean_whitespace: false,
        unique_only: true,
    };
    let table = extract(&html, &selectors(&[".author"], None), flags).unwrap();
    assert_eq!(
        table.rows(),
        &[vec!["Albert Einstein"], vec!["J.K. Rowling"]]
    );
}

#[test]
fn test_long_selector_label_is_truncated() {
    let html = fixture("quotes.html");
    let table = extract(
        &html,
        &selectors(&["div.quote > small.author"], None),
        PostProcess::default(),
    )
    .unwrap();
    assert_eq!(table.columns(), &["div.quote > small.au..."]);
}

#[test]
fn test_regex_only_matches_whole_body() {
    let spec = ExtractionSpec::Regex {
        pattern: r"\d{4}-\d{2}-\d{2}".to_string(),
    };
    let table = extract(
        "Posted 2024-01-05 and 2024-02-10",
        &spec,
        PostProcess::default(),
    )
    .unwrap();

    assert_eq!(table.columns(), &["regex_match"]);
    assert_eq!(table.rows(), &[vec!["2024-01-05"], vec!["2024-02-10"]]);
}

#[test]
fn test_regex_only_sees_markup() {
    let html = fixture("quotes.html");
    let spec = ExtractionSpec::Regex {
        pattern: r#"href="(/tag/[a-z]+/)""#.to_string(),
    };
    let table = extract(&html, &spec, PostProcess::default()).unwrap();
    assert_eq!(
        table.rows(),
        &[
            vec!["/tag/change/"],
            vec!["/tag/thinking/"],
            vec!["/tag/choices/"]
        ]
    );
}

#[test]
fn test_no_matches_keeps_columns() {
    let table = extract(
        "<p>nothing</p>",
        &selectors(&[".missing", "h1"], None),
        PostProcess::default(),
    )
    .unwrap();
    assert!(table.is_empty());
    assert_eq!(table.columns(), &[".missing", "h1"]);
}

#[test]
fn test_single_page_email_harvest() {
    let html = fixture("contact.html");
    let table = extract(&html, &ExtractionSpec::AutoFind, PostProcess::default()).unwrap();
    assert_eq!(table.columns(), &["email"]);
    assert_eq!(
        table.rows(),
        &[vec!["sales@example.com"], vec!["press@example.com"]]
    );
}

#[test]
fn test_invalid_regex_is_extraction_error() {
    let spec = ExtractionSpec::Regex {
        pattern: "([".to_string(),
    };
    let err = extract("body", &spec, PostProcess::default()).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidPattern(_)));
}

#[test]
fn test_invalid_selector_is_extraction_error() {
    let err = extract(
        "<p>x</p>",
        &selectors(&["p", "::<>"], None),
        PostProcess::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ExtractError::InvalidSelector { .. }));
}

#[test]
fn test_malformed_html() {
    let html = "<html><body><p class='x'>Unclosed tags<div class='x'>More content";
    let table = extract(html, &selectors(&[".x"], None), PostProcess::default()).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[1], vec!["More content"]);
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use crate::extractor::cleaner::{clean_whitespace, dedup_rows};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_clean_whitespace_idempotent(text in "\\PC*") {
            let once = clean_whitespace(&text);
            prop_assert_eq!(clean_whitespace(&once), once);
        }

        #[test]
        fn test_dedup_idempotent(rows in prop::collection::vec(prop::collection::vec("[ab]{0,2}", 2), 0..20)) {
            let once = dedup_rows(rows);
            prop_assert_eq!(dedup_rows(once.clone()), once);
        }

        #[test]
        fn test_rows_match_columns(html in ".*", sel in "[a-z]{1,3}") {
            let spec = selectors(&[sel.as_str(), "p"], None);
            if let Ok(table) = extract(&html, &spec, PostProcess::default()) {
                prop_assert!(table.rows().iter().all(|r| r.len() == table.columns().len()));
            }
        }
    }
}
