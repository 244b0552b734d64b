use lazy_static::lazy_static;
use regex::Regex;
use select::document::Document;
use select::node::Node;
use select::predicate::{Class, Name, Predicate};

use crate::error::CatalogError;
use crate::model::{AttributeRecord, AttributeValue, Brand, CategoryTree, ModelStub};

lazy_static! {
    static ref POPULARITY: Regex = Regex::new(r".+popularity").unwrap();
}

/// Builds the attribute record of a model from its detail page.
///
/// Only a missing spotlight block is fatal. Spec tables are read best effort:
/// absent label or value cells leave the matching fields empty.
pub fn extract(
    document: &Document,
    brand: &Brand,
    stub: &ModelStub,
) -> Result<AttributeRecord, CatalogError> {
    let url = stub.detail_url.as_str();

    let spotlight = document
        .find(Name("ul").and(Class("specs-spotlight-features")))
        .next()
        .ok_or_else(|| CatalogError::extraction(url, "spotlight block is missing"))?;
    let popularity = spotlight
        .find(is_popularity)
        .next()
        .ok_or_else(|| CatalogError::extraction(url, "popularity item is missing"))?;
    let hits = popularity
        .find(Name("span"))
        .next()
        .map(|span| span.text())
        .ok_or_else(|| CatalogError::extraction(url, "hit counter is missing"))?;
    let trend = popularity
        .find(Name("strong"))
        .next()
        .map(|strong| strong.text().trim().to_string())
        .ok_or_else(|| CatalogError::extraction(url, "trend rate is missing"))?;

    Ok(AttributeRecord {
        model_name: stub.display_name.clone(),
        model_page_url: stub.detail_url.clone(),
        brand: brand.display_name.clone(),
        hits: Some(hits),
        trend: Some(trend),
        category_tree: category_tree(document),
        fetch_failed: false,
        error_message: None,
        discovered_at: Some(stub.discovered_at),
    })
}

fn is_popularity(node: &Node) -> bool {
    node.name() == Some("li")
        && node
            .attr("class")
            .map_or(false, |class| class.split_whitespace().any(|c| POPULARITY.is_match(c)))
}

fn category_tree(document: &Document) -> CategoryTree {
    let mut tree = CategoryTree::new();

    for table in document.find(Name("table")) {
        // rows without a header belong to the last header seen in this table
        let mut category = String::new();

        for row in table.find(Name("tr")) {
            if let Some(th) = row.find(Name("th")).next() {
                category = th.text().trim().to_string();
                tree.entry(category.clone()).or_default();
            }

            let label = row.find(Name("td").and(Class("ttl"))).next();
            let value = row.find(Name("td").and(Class("nfo"))).next();
            if label.is_none() && value.is_none() {
                continue;
            }

            let sub_category = label
                .map(|l| l.text().trim().to_string())
                .unwrap_or_default();
            let leaf = AttributeValue {
                value: value.map(|v| v.text()),
                value_metadata: value.and_then(|v| v.attr("data-spec")).map(String::from),
                sub_category_metadata: label
                    .and_then(|l| l.find(Name("a")).next())
                    .and_then(|a| a.attr("href"))
                    .and_then(term_token),
            };

            tree.entry(category.clone())
                .or_default()
                .insert(sub_category, leaf);
        }
    }

    tree
}

/// `glossary.php3?term=sim` -> `sim`
fn term_token(href: &str) -> Option<String> {
    match href.split_once("term=") {
        Some((_, token)) if !token.contains("term=") => Some(token.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    const SPOTLIGHT: &str = r#"
        <ul class="specs-spotlight-features">
          <li class="light pattern help help-popularity"><i class="head-icon icon-popularity"></i><strong class="accent">12%</strong><span>406,456 hits</span></li>
          <li class="light pattern help help-fans"><strong>76</strong><span>Become a fan</span></li>
        </ul>"#;

    fn brand() -> Brand {
        Brand {
            listing_url: "https://www.gsmarena.com/acer-phones-59.php".into(),
            display_name: "Acer".into(),
            advertised_model_count: 59,
        }
    }

    fn stub() -> ModelStub {
        ModelStub {
            detail_url: "https://www.gsmarena.com/acer_liquid_z6-8306.php".into(),
            display_name: "Liquid Z6".into(),
            discovered_at: Utc::now(),
        }
    }

    fn page(tables: &str) -> Document {
        Document::from(format!("<html><body>{SPOTLIGHT}{tables}</body></html>").as_str())
    }

    #[test]
    fn spotlight_metrics() {
        let record = extract(&page(""), &brand(), &stub()).unwrap();
        assert_eq!(record.hits.as_deref(), Some("406,456 hits"));
        assert_eq!(record.trend.as_deref(), Some("12%"));
        assert_eq!(record.brand, "Acer");
        assert_eq!(record.model_name, "Liquid Z6");
        assert!(!record.fetch_failed);
        assert!(record.category_tree.is_empty());
    }

    #[test]
    fn missing_spotlight_is_fatal() {
        let document = Document::from("<table><tr><th>Network</th></tr></table>");
        let err = extract(&document, &brand(), &stub()).unwrap_err();
        assert!(matches!(err, CatalogError::Extraction { .. }));
    }

    #[test]
    fn rows_inherit_the_last_header() {
        let document = page(
            r#"<table>
                 <tr><th>Network</th></tr>
                 <tr><td class="ttl">2G bands</td><td class="nfo">GSM</td></tr>
                 <tr><td class="ttl">3G bands</td><td class="nfo">HSDPA</td></tr>
               </table>"#,
        );
        let tree = extract(&document, &brand(), &stub()).unwrap().category_tree;

        assert_eq!(tree.len(), 1);
        let network = &tree["Network"];
        assert_eq!(network.len(), 2);
        assert_eq!(network["2G bands"].value.as_deref(), Some("GSM"));
        assert_eq!(network["3G bands"].value.as_deref(), Some("HSDPA"));
    }

    #[test]
    fn metadata_tokens() {
        let document = page(
            r#"<table>
                 <tr>
                   <th rowspan="2">Body</th>
                   <td class="ttl"><a href="glossary.php3?term=sim">SIM</a></td>
                   <td class="nfo" data-spec="sim">Nano-SIM</td>
                 </tr>
                 <tr>
                   <td class="ttl"><a href="weight.php3">Weight</a></td>
                   <td class="nfo">155 g</td>
                 </tr>
               </table>"#,
        );
        let tree = extract(&document, &brand(), &stub()).unwrap().category_tree;

        assert_eq!(
            tree["Body"]["SIM"],
            AttributeValue {
                value: Some("Nano-SIM".into()),
                value_metadata: Some("sim".into()),
                sub_category_metadata: Some("sim".into()),
            }
        );
        assert_eq!(
            tree["Body"]["Weight"],
            AttributeValue {
                value: Some("155 g".into()),
                value_metadata: None,
                sub_category_metadata: None,
            }
        );
    }

    #[test]
    fn absent_cells_and_duplicates() {
        let document = page(
            r#"<table>
                 <tr><td class="ttl">Orphan</td><td class="nfo">x</td></tr>
                 <tr><th>Misc</th><td class="ttl">Colors</td><td class="nfo">Black</td></tr>
                 <tr><td class="nfo">no label</td></tr>
                 <tr><td class="ttl">Price</td></tr>
                 <tr><td class="ttl">Colors</td><td class="nfo">White</td></tr>
               </table>
               <table>
                 <tr><td class="ttl">Fresh table</td><td class="nfo">y</td></tr>
               </table>"#,
        );
        let tree = extract(&document, &brand(), &stub()).unwrap().category_tree;

        assert_eq!(tree[""]["Orphan"].value.as_deref(), Some("x"));
        assert_eq!(tree[""]["Fresh table"].value.as_deref(), Some("y"));
        assert_eq!(tree["Misc"][""].value.as_deref(), Some("no label"));
        assert_eq!(tree["Misc"]["Price"].value, None);
        assert_eq!(tree["Misc"]["Colors"].value.as_deref(), Some("White"));
    }

    #[test]
    fn names_are_trimmed_and_header_rows_add_no_leaf() {
        let document = page(
            "<table>
               <tr><th>\n  Display </th></tr>
               <tr><td class=\"ttl\"> Size\n</td><td class=\"nfo\"> 6.1 inches </td></tr>
             </table>
             <table><tr><th>Sound</th></tr></table>",
        );
        let tree = extract(&document, &brand(), &stub()).unwrap().category_tree;

        assert_eq!(tree["Display"]["Size"].value.as_deref(), Some(" 6.1 inches "));
        assert_eq!(tree["Display"].len(), 1);
        assert!(tree["Sound"].is_empty());
    }

    #[test]
    fn term_token_needs_exactly_one_marker() {
        assert_eq!(term_token("glossary.php3?term=nfc").as_deref(), Some("nfc"));
        assert_eq!(term_token("glossary.php3"), None);
        assert_eq!(term_token("a?term=b&term=c"), None);
    }
}
