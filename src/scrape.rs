//! Per-page field scraping for job postings on form providers
//!
//! Complements structured-data extraction for pages that carry none: hosted
//! form providers (Google Forms, Tally, Typeform) render postings as plain
//! documents, so the best available record is the page title plus a
//! truncated visible-text summary. The provider is identified from the URL.

use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};
use serde::Serialize;
use url::Url;

const DESCRIPTION_LIMIT: usize = 1000;

/// A scraped job record with best-effort fields
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub title: String,
    pub company: Option<String>,
    pub description: String,
    pub url: String,
    pub source: String,
}

/// Form providers we recognize, plus a generic fallback
#[derive(Debug, Clone, PartialEq, Eq)]
enum Provider {
    GForms,
    Tally,
    Typeform,
    Generic(String),
}

impl Provider {
    fn detect(url: &Url) -> Self {
        let url_str = url.as_str();
        if url_str.contains("docs.google.com/forms") {
            Provider::GForms
        } else if url_str.contains("tally.so") {
            Provider::Tally
        } else if url_str.contains("typeform.com") {
            Provider::Typeform
        } else {
            Provider::Generic(url.host_str().unwrap_or_default().to_string())
        }
    }

    fn source_label(&self) -> String {
        match self {
            Provider::GForms => "GForms".to_string(),
            Provider::Tally => "Tally".to_string(),
            Provider::Typeform => "Typeform".to_string(),
            Provider::Generic(host) => host.clone(),
        }
    }

    fn fallback_title(&self) -> &'static str {
        match self {
            Provider::GForms => "Form (Google Forms)",
            Provider::Tally => "Form (Tally)",
            Provider::Typeform => "Form (Typeform)",
            Provider::Generic(_) => "Job posting",
        }
    }

    /// Boilerplate the provider appends to `<title>`
    fn title_suffix(&self) -> Option<&'static str> {
        match self {
            Provider::GForms => Some(" - Google Forms"),
            _ => None,
        }
    }
}

/// Scrapes best-effort job fields from a parsed page
pub fn scrape_page(document: &Html, url: &Url) -> JobRecord {
    let provider = Provider::detect(url);

    let title = page_title(document, provider.title_suffix())
        .unwrap_or_else(|| provider.fallback_title().to_string());

    JobRecord {
        title,
        company: None,
        description: visible_text(document, DESCRIPTION_LIMIT),
        url: url.as_str().to_string(),
        source: provider.source_label(),
    }
}

fn page_title(document: &Html, suffix_to_remove: Option<&str>) -> Option<String> {
    let selector = Selector::parse("title").expect("valid selector");
    let title_el = document.select(&selector).next()?;
    let text: String = title_el.text().collect();
    let mut title = text.trim();

    if let Some(suffix) = suffix_to_remove {
        title = title.strip_suffix(suffix).unwrap_or(title).trim_end();
    }

    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Collects the page's visible text, whitespace-collapsed and truncated.
///
/// Script, style and noscript subtrees are skipped; truncation respects
/// char boundaries.
fn visible_text(document: &Html, limit: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    collect_text(*document.root_element(), &mut parts);

    let joined = parts.join(" ");
    let collapsed: String = joined.split_whitespace().collect::<Vec<_>>().join(" ");

    match collapsed.char_indices().nth(limit) {
        Some((idx, _)) => collapsed[..idx].to_string(),
        None => collapsed,
    }
}

fn collect_text(node: NodeRef<Node>, parts: &mut Vec<String>) {
    if let Some(element) = node.value().as_element() {
        let name = element.name();
        if name == "script" || name == "style" || name == "noscript" {
            return;
        }
    }

    if let Some(text) = node.value().as_text() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed.to_string());
        }
    }

    for child in node.children() {
        collect_text(child, parts);
    }
}
