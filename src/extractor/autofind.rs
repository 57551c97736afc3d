//! Contact page discovery and email harvesting.
//!
//! The home page is fetched once; its raw body is scanned for addresses and
//! its anchors for links that look like contact, support or about pages.
//! Every distinct candidate is then fetched in turn. A candidate that fails
//! to load is logged and skipped; only a failed home page aborts the run.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::extractor::{model::ResultTable, pattern::EMAIL_REGEX, selectors::element_text};
use crate::fetcher::{FetchError, FetchRequest, PageFetcher};

pub const CONTACT_KEYWORDS: [&str; 7] = [
    "contact",
    "support",
    "about",
    "customer-service",
    "inquiry",
    "contact-us",
    "contactus",
];

pub const AUTOFIND_COLUMNS: [&str; 3] = ["source_url", "link_text", "email"];
pub const HOMEPAGE_LABEL: &str = "homepage";

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("Failed to parse anchor selector"));

static MAILTO_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href^="mailto:"]"#).expect("Failed to parse mailto selector")
});

/// A link on the home page that probably leads to contact details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactCandidate {
    pub url: Url,
    pub link_text: String,
}

#[derive(Debug, Clone)]
pub struct AutoFindOutcome {
    pub table: ResultTable,
    pub candidates: usize,
}

/// Every email-looking substring of the raw body, in order.
pub fn body_emails(body: &str) -> Vec<String> {
    EMAIL_REGEX
        .find_iter(body)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Addresses from `mailto:` anchors, with any `?subject=` style query cut.
pub fn mailto_addresses(body: &str) -> Vec<String> {
    let document = Html::parse_document(body);
    document
        .select(&MAILTO_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| href.split_once(':').map(|(_, rest)| rest))
        .map(|rest| rest.split('?').next().unwrap_or_default().trim().to_string())
        .filter(|address| !address.is_empty())
        .collect()
}

/// Emails in the body text, falling back to mailto links when there are none.
pub fn page_emails(body: &str) -> Vec<String> {
    let emails = body_emails(body);
    if emails.is_empty() {
        mailto_addresses(body)
    } else {
        emails
    }
}

/// Anchors whose lower-cased href mentions a contact keyword, resolved
/// against `base` and deduplicated by absolute URL in first-seen order.
pub fn find_contact_links(body: &str, base: &Url) -> Vec<ContactCandidate> {
    let document = Html::parse_document(body);
    let mut seen: HashSet<Url> = HashSet::new();
    let mut candidates = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        let lowered = href.to_lowercase();
        if !CONTACT_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            continue;
        }

        let Ok(url) = base.join(href) else {
            debug!(href, "skipping unresolvable contact link");
            continue;
        };
        if !seen.insert(url.clone()) {
            continue;
        }

        let text = element_text(anchor);
        let link_text = if text.is_empty() { href.to_string() } else { text };
        candidates.push(ContactCandidate { url, link_text });
    }

    candidates
}

/// Rows deduplicated by `(source url, email)`.
struct EmailRows {
    seen: HashSet<(String, String)>,
    rows: Vec<Vec<String>>,
}

impl EmailRows {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, source: &str, label: &str, email: String) {
        if self.seen.insert((source.to_string(), email.clone())) {
            self.rows
                .push(vec![source.to_string(), label.to_string(), email]);
        }
    }

    fn into_table(self) -> ResultTable {
        let columns = AUTOFIND_COLUMNS.iter().map(|c| c.to_string()).collect();
        ResultTable::new(columns, self.rows)
    }
}

/// Run the whole crawl. Candidates are fetched one at a time with the same
/// method, headers and body as the home page. Home page rows are labelled
/// with `home_url` as the caller typed it.
#[instrument(skip_all, fields(home = %request.url))]
pub async fn auto_find<F>(
    fetcher: &F,
    request: &FetchRequest,
    home_url: &str,
) -> Result<AutoFindOutcome, FetchError>
where
    F: PageFetcher + ?Sized,
{
    let home = fetcher.fetch(&request.for_url(request.url.clone())).await?;

    let mut rows = EmailRows::new();
    for email in body_emails(&home.body) {
        rows.push(home_url, HOMEPAGE_LABEL, email);
    }

    let candidates = find_contact_links(&home.body, &request.url);
    debug!(count = candidates.len(), "contact candidates found");

    for candidate in &candidates {
        let page = match fetcher.fetch(&request.for_url(candidate.url.clone())).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %candidate.url, error = %e, "skipping contact candidate");
                continue;
            }
        };

        for email in page_emails(&page.body) {
            rows.push(candidate.url.as_str(), &candidate.link_text, email);
        }
    }

    Ok(AutoFindOutcome {
        table: rows.into_table(),
        candidates: candidates.len(),
    })
}
