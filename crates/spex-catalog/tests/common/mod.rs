#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use spex_catalog::spex_crawler::{Fetch, FetchError};
use spex_catalog::Brand;
use url::Url;

pub const BASE: &str = "https://catalog.test/";

pub fn base() -> Url {
    Url::parse(BASE).unwrap()
}

pub fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

/// Serves canned pages and remembers every request.
#[derive(Debug, Default)]
pub struct FakeSite {
    pages: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&mut self, path: &str, html: impl Into<String>) -> &mut Self {
        self.pages.insert(url(path), html.into());
        self
    }

    pub fn remove(&mut self, path: &str) -> &mut Self {
        self.pages.remove(&url(path));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn forget_requests(&self) {
        self.requests.borrow_mut().clear();
    }

    /// Adds a brand whose models are spread over pages of `page_sizes`
    /// items, and returns it as the brand index would advertise it.
    pub fn brand(&mut self, name: &str, page_sizes: &[usize]) -> Brand {
        let slug = name.to_lowercase();
        let page_paths = (1..=page_sizes.len())
            .map(|n| match n {
                1 => format!("{slug}-phones-1.php"),
                n => format!("{slug}-phones-f-1-0-p{n}.php"),
            })
            .collect::<Vec<_>>();
        let pagination = if page_sizes.len() > 1 {
            page_paths.clone()
        } else {
            vec![]
        };

        let mut index = 0;
        for (path, size) in page_paths.iter().zip(page_sizes) {
            let models = (index..index + size)
                .map(|i| format!("{name} M{i}"))
                .collect::<Vec<_>>();
            index += size;
            for model in &models {
                self.page(&model_path(model), detail_page(model));
            }
            self.page(path, listing_page(&models, &pagination));
        }

        Brand {
            listing_url: url(&page_paths[0]),
            display_name: name.to_string(),
            advertised_model_count: index,
        }
    }
}

impl Fetch for FakeSite {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

pub fn model_path(model: &str) -> String {
    format!("{}.php", model.to_lowercase().replace(' ', "_"))
}

pub fn listing_page(models: &[String], pagination: &[String]) -> String {
    let items = models
        .iter()
        .map(|m| {
            format!(
                r#"<li><a href="{}"><img src="x.jpg"><strong><span>{m}</span></strong></a></li>"#,
                model_path(m)
            )
        })
        .collect::<String>();
    let pages = pagination
        .iter()
        .enumerate()
        .map(|(i, p)| format!(r#"<a href="{p}">{}</a>"#, i + 1))
        .collect::<String>();
    format!(
        r#"<html><body>
             <div id="review-body"><div class="makers"><ul>{items}</ul></div></div>
             <div class="nav-pages">{pages}</div>
           </body></html>"#
    )
}

pub fn detail_page(model: &str) -> String {
    format!(
        r#"<html><body>
             <h1 class="specs-phone-name-title">{model}</h1>
             <ul class="specs-spotlight-features">
               <li class="light pattern help help-popularity"><i class="head-icon icon-popularity"></i><strong class="accent">7%</strong><span>1,000 hits</span></li>
             </ul>
             <div id="specs-list">
               <table>
                 <tr><th rowspan="2">Network</th><td class="ttl"><a href="network-bands.php3">Technology</a></td><td class="nfo" data-spec="nettech">GSM / LTE</td></tr>
                 <tr><td class="ttl"><a href="glossary.php3?term=2g">2G bands</a></td><td class="nfo" data-spec="net2g">GSM 900</td></tr>
               </table>
               <table>
                 <tr><th>Misc</th><td class="ttl">Models</td><td class="nfo">{model}</td></tr>
               </table>
             </div>
           </body></html>"#
    )
}
