use chrono::Utc;
use futures::stream::{self, Stream, StreamExt};
use select::document::Document;
use select::predicate::{Attr, Class, Name, Predicate};
use spex_crawler::Fetch;
use url::Url;

use crate::error::CatalogError;
use crate::model::ModelStub;
use crate::page::{absolute, fetch_document};

/// One page of a brand listing.
#[derive(Debug)]
pub enum ListingPage {
    /// Items of a page that was already fetched and parsed
    Parsed(Vec<Result<ModelStub, CatalogError>>),
    /// A page that will be fetched when the walk reaches it
    Pending(String),
}

/// Links of the pagination bar, absolute, deduplicated, in page order.
///
/// `page_url` itself is never part of the result.
pub fn pagination_links(
    document: &Document,
    base: &Url,
    page_url: &str,
) -> Result<Vec<String>, CatalogError> {
    let mut links: Vec<String> = vec![];
    for a in document.find(Name("div").and(Class("nav-pages")).descendant(Name("a"))) {
        let Some(href) = a.attr("href") else {
            continue;
        };
        let link = absolute(base, href, page_url)?;
        if link != page_url && !links.contains(&link) {
            links.push(link);
        }
    }
    Ok(links)
}

/// Model stubs of one listing page, in document order.
///
/// Fails only when the listing container itself is missing. A list item
/// without a link or a name yields an error item instead of a stub.
pub fn parse_stubs(
    document: &Document,
    base: &Url,
    page_url: &str,
) -> Result<Vec<Result<ModelStub, CatalogError>>, CatalogError> {
    let body = document
        .find(Attr("id", "review-body"))
        .next()
        .ok_or_else(|| CatalogError::parse(page_url, "no listing container"))?;

    let stubs = body
        .find(Name("li"))
        .map(|item| {
            let href = item
                .find(Name("a"))
                .next()
                .and_then(|a| a.attr("href"))
                .ok_or_else(|| CatalogError::parse(page_url, "list item without link"))?;
            let name = item
                .find(Name("strong"))
                .next()
                .map(|strong| strong.text().trim().to_string())
                .ok_or_else(|| CatalogError::parse(page_url, "list item without model name"))?;

            Ok(ModelStub {
                detail_url: absolute(base, href, page_url)?,
                display_name: name,
                discovered_at: Utc::now(),
            })
        })
        .collect();

    Ok(stubs)
}

/// Lazily walks listing pages, yielding stubs page after page.
///
/// Pending pages are fetched only once the walk reaches them. A page that
/// cannot be fetched or parsed yields a single error item and the walk goes
/// on with the next page.
pub fn model_stubs<'a, F: Fetch>(
    fetcher: &'a F,
    pages: Vec<ListingPage>,
    base: &'a Url,
) -> impl Stream<Item = Result<ModelStub, CatalogError>> + 'a {
    stream::iter(pages)
        .then(move |page| async move {
            match page {
                ListingPage::Parsed(stubs) => stubs,
                ListingPage::Pending(url) => {
                    let document = match fetch_document(fetcher, &url).await {
                        Ok(document) => document,
                        Err(e) => return vec![Err(CatalogError::from(e))],
                    };
                    parse_stubs(&document, base, &url).unwrap_or_else(|e| vec![Err(e)])
                }
            }
        })
        .flat_map(stream::iter)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div id="review-body">
          <ul>
            <li><a href="acer_liquid_z6-8306.php"><img src="z6.jpg"><strong><span>Liquid Z6</span></strong></a></li>
            <li><a href="acer_liquid_z6_plus-8305.php"><strong><span>Liquid Z6 Plus</span></strong></a></li>
            <li><strong>Orphan</strong></li>
          </ul>
        </div>
        <div class="nav-pages">
          <strong>1</strong>
          <a href="acer-phones-f-59-0-p2.php">2</a>
          <a href="acer-phones-f-59-0-p3.php">3</a>
          <a class="prevnextbutton" href="acer-phones-f-59-0-p2.php" title="Next page">&#9658;</a>
        </div>"#;

    fn base() -> Url {
        Url::parse("https://www.gsmarena.com/").unwrap()
    }

    #[test]
    fn stubs_in_document_order() {
        let stubs = parse_stubs(&Document::from(PAGE), &base(), "p1").unwrap();
        assert_eq!(stubs.len(), 3);

        let first = stubs[0].as_ref().unwrap();
        assert_eq!(first.display_name, "Liquid Z6");
        assert_eq!(
            first.detail_url,
            "https://www.gsmarena.com/acer_liquid_z6-8306.php"
        );
        assert_eq!(stubs[1].as_ref().unwrap().display_name, "Liquid Z6 Plus");
        assert!(matches!(stubs[2], Err(CatalogError::Parse { .. })));
    }

    #[test]
    fn missing_listing_container() {
        let err = parse_stubs(&Document::from("<p>nothing</p>"), &base(), "p1").unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn pagination_is_absolute_and_deduplicated() {
        let links = pagination_links(&Document::from(PAGE), &base(), "p1").unwrap();
        assert_eq!(
            links,
            vec![
                "https://www.gsmarena.com/acer-phones-f-59-0-p2.php",
                "https://www.gsmarena.com/acer-phones-f-59-0-p3.php",
            ]
        );
    }

    #[test]
    fn no_pagination_bar() {
        let html = r#"<div id="review-body"><ul></ul></div>"#;
        let links = pagination_links(&Document::from(html), &base(), "p1").unwrap();
        assert!(links.is_empty());
    }
}
