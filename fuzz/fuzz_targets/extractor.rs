#![no_main]

use libfuzzer_sys::fuzz_target;

use harvest::extractor::{ExtractionSpec, PostProcess, extract};

fuzz_target!(|data: &[u8]| {
    let body = String::from_utf8_lossy(data);

    let specs = [
        ExtractionSpec::Selectors {
            selectors: vec!["a".to_string(), "div > span.text".to_string()],
            pattern: Some(r"(\w+)@".to_string()),
        },
        ExtractionSpec::Regex {
            pattern: "preset:email".to_string(),
        },
        ExtractionSpec::AutoFind,
    ];
    let flags = PostProcess {
        clean_whitespace: true,
        unique_only: true,
    };

    // extraction must never panic and must keep every row as wide as the header
    for spec in &specs {
        if let Ok(table) = extract(&body, spec, flags) {
            let width = table.columns().len();
            assert!(table.rows().iter().all(|row| row.len() == width));
        }
    }
});
