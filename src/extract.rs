//! Structured data extraction: JSON-LD and HTML microdata
//!
//! JSON-LD blocks are taken verbatim from `<script type="application/ld+json">`
//! elements. A block that fails to parse as JSON is kept as a raw string
//! rather than dropped; malformed markup on real pages is common and the
//! downstream consumer decides what to do with it.
//!
//! Microdata extraction walks top-level `itemscope` elements (those without
//! an `itemscope` ancestor) and flattens their `itemprop` descendants into
//! one object per item. Repeated property names collect into a list.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured data found in a single page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredData {
    /// One value per JSON-LD script block, in document order
    pub json_ld: Vec<Value>,

    /// One object per top-level microdata item, in document order
    pub microdata: Vec<Value>,
}

impl StructuredData {
    /// Whether the page contained no structured data at all
    pub fn is_empty(&self) -> bool {
        self.json_ld.is_empty() && self.microdata.is_empty()
    }
}

/// Extracts all structured data from a parsed document
pub fn extract(document: &Html) -> StructuredData {
    StructuredData {
        json_ld: extract_json_ld(document),
        microdata: extract_microdata(document),
    }
}

fn extract_json_ld(document: &Html) -> Vec<Value> {
    let selector =
        Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector");

    let mut blocks = Vec::new();
    for script in document.select(&selector) {
        let text: String = script.text().collect();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(text) {
            Ok(value) => blocks.push(value),
            // Keep unparseable blocks as raw strings
            Err(_) => blocks.push(Value::String(text.to_string())),
        }
    }

    blocks
}

fn extract_microdata(document: &Html) -> Vec<Value> {
    let scope_selector = Selector::parse("[itemscope]").expect("valid selector");
    let prop_selector = Selector::parse("[itemprop]").expect("valid selector");

    let mut items = Vec::new();
    for scope in document.select(&scope_selector) {
        if !is_top_level_scope(&scope) {
            continue;
        }

        let mut item = Map::new();
        if let Some(itemtype) = scope.value().attr("itemtype") {
            item.insert("type".to_string(), Value::String(itemtype.to_string()));
        }

        for prop in scope.select(&prop_selector) {
            // Nested scopes start their own item; their itemprop attribute
            // names the slot in the parent, which we leave to the nested walk
            if prop.value().attr("itemscope").is_some() {
                continue;
            }

            let Some(name) = prop.value().attr("itemprop") else {
                continue;
            };

            let value = property_value(&prop);
            insert_property(&mut item, name, value);
        }

        items.push(Value::Object(item));
    }

    items
}

/// True if no ancestor of this element carries `itemscope`
fn is_top_level_scope(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .all(|ancestor| ancestor.value().attr("itemscope").is_none())
}

/// The value of an itemprop element: the `content` attribute when present
/// (the only carrier for `<meta>`), otherwise the trimmed text content
fn property_value(element: &ElementRef) -> String {
    if let Some(content) = element.value().attr("content") {
        return content.to_string();
    }
    let text: String = element.text().collect();
    text.trim().to_string()
}

/// Inserts a property, promoting a repeated name from scalar to list
fn insert_property(item: &mut Map<String, Value>, name: &str, value: String) {
    let value = Value::String(value);
    match item.get_mut(name) {
        None => {
            item.insert(name.to_string(), value);
        }
        Some(Value::Array(list)) => {
            list.push(value);
        }
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_no_structured_data() {
        let doc = parse("<html><body><p>Plain page</p></body></html>");
        let data = extract(&doc);
        assert!(data.is_empty());
    }

    #[test]
    fn test_json_ld_single_block() {
        let doc = parse(
            r#"<html><head>
            <script type="application/ld+json">{"@type": "JobPosting", "title": "PM"}</script>
            </head></html>"#,
        );
        let data = extract(&doc);
        assert_eq!(data.json_ld.len(), 1);
        assert_eq!(data.json_ld[0], json!({"@type": "JobPosting", "title": "PM"}));
    }

    #[test]
    fn test_json_ld_multiple_blocks_in_order() {
        let doc = parse(
            r#"<html>
            <script type="application/ld+json">{"a": 1}</script>
            <script type="application/ld+json">{"b": 2}</script>
            </html>"#,
        );
        let data = extract(&doc);
        assert_eq!(data.json_ld, vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn test_json_ld_malformed_kept_as_string() {
        let doc = parse(
            r#"<html><script type="application/ld+json">{not valid json</script></html>"#,
        );
        let data = extract(&doc);
        assert_eq!(data.json_ld, vec![json!("{not valid json")]);
    }

    #[test]
    fn test_json_ld_empty_block_skipped() {
        let doc = parse(
            r#"<html><script type="application/ld+json">   </script></html>"#,
        );
        let data = extract(&doc);
        assert!(data.json_ld.is_empty());
    }

    #[test]
    fn test_json_ld_array_value() {
        let doc = parse(
            r#"<html><script type="application/ld+json">[{"x": 1}, {"y": 2}]</script></html>"#,
        );
        let data = extract(&doc);
        assert_eq!(data.json_ld.len(), 1);
        assert!(data.json_ld[0].is_array());
    }

    #[test]
    fn test_other_script_types_ignored() {
        let doc = parse(r#"<html><script type="text/javascript">var x = {};</script></html>"#);
        let data = extract(&doc);
        assert!(data.json_ld.is_empty());
    }

    #[test]
    fn test_microdata_basic_item() {
        let doc = parse(
            r#"<div itemscope itemtype="https://schema.org/JobPosting">
                <span itemprop="title">Product Manager</span>
                <span itemprop="hiringOrganization">Acme</span>
            </div>"#,
        );
        let data = extract(&doc);
        assert_eq!(
            data.microdata,
            vec![json!({
                "type": "https://schema.org/JobPosting",
                "title": "Product Manager",
                "hiringOrganization": "Acme"
            })]
        );
    }

    #[test]
    fn test_microdata_item_without_type() {
        let doc = parse(r#"<div itemscope><span itemprop="name">X</span></div>"#);
        let data = extract(&doc);
        assert_eq!(data.microdata, vec![json!({"name": "X"})]);
    }

    #[test]
    fn test_microdata_meta_content_attribute() {
        let doc = parse(
            r#"<div itemscope>
                <meta itemprop="datePosted" content="2024-05-01">
                <span itemprop="salary" content="90000">ninety thousand</span>
            </div>"#,
        );
        let data = extract(&doc);
        assert_eq!(
            data.microdata,
            vec![json!({"datePosted": "2024-05-01", "salary": "90000"})]
        );
    }

    #[test]
    fn test_microdata_repeated_property_becomes_list() {
        let doc = parse(
            r#"<div itemscope>
                <span itemprop="skill">roadmaps</span>
                <span itemprop="skill">analytics</span>
                <span itemprop="skill">sql</span>
            </div>"#,
        );
        let data = extract(&doc);
        assert_eq!(
            data.microdata,
            vec![json!({"skill": ["roadmaps", "analytics", "sql"]})]
        );
    }

    #[test]
    fn test_microdata_nested_scope_not_top_level() {
        let doc = parse(
            r#"<div itemscope itemtype="https://schema.org/JobPosting">
                <span itemprop="title">PM</span>
                <div itemprop="hiringOrganization" itemscope itemtype="https://schema.org/Organization">
                    <span itemprop="name">Acme</span>
                </div>
            </div>"#,
        );
        let data = extract(&doc);
        // Only the outer scope yields an item; the nested scope's plain
        // properties are absorbed into it
        assert_eq!(data.microdata.len(), 1);
        let item = &data.microdata[0];
        assert_eq!(item["title"], "PM");
        assert_eq!(item["name"], "Acme");
        // The nested scope element itself is not a scalar property
        assert!(item.get("hiringOrganization").is_none());
    }

    #[test]
    fn test_microdata_sibling_scopes_are_separate_items() {
        let doc = parse(
            r#"<div itemscope><span itemprop="a">1</span></div>
               <div itemscope><span itemprop="a">2</span></div>"#,
        );
        let data = extract(&doc);
        assert_eq!(data.microdata.len(), 2);
    }

    #[test]
    fn test_microdata_whitespace_trimmed() {
        let doc = parse(r#"<div itemscope><span itemprop="name">  Jane  </span></div>"#);
        let data = extract(&doc);
        assert_eq!(data.microdata, vec![json!({"name": "Jane"})]);
    }

    #[test]
    fn test_both_formats_on_one_page() {
        let doc = parse(
            r#"<html>
            <script type="application/ld+json">{"@type": "WebPage"}</script>
            <div itemscope><span itemprop="name">X</span></div>
            </html>"#,
        );
        let data = extract(&doc);
        assert_eq!(data.json_ld.len(), 1);
        assert_eq!(data.microdata.len(), 1);
        assert!(!data.is_empty());
    }
}
