//! Rendered-page source abstraction and its HTTP implementation
//!
//! The navigator consumes a `PageFetch` seam: something that turns a listing
//! address into table rows plus an optional next-page address. The bundled
//! implementation fetches over HTTP and parses the markup; tests substitute
//! scripted sources.

use crate::config::SourceConfig;
use crate::{SourceError, SourceResult};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

/// One rendered listing page, reduced to parseable content
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Table rows as ordered text cells, header rows excluded
    pub rows: Vec<Vec<String>>,

    /// Address of the next page, when an enabled next-page control resolved
    pub next_page: Option<Url>,
}

/// A source of rendered listing pages
///
/// Implementations must bound every wait internally; `fetch_listing` either
/// returns within the configured timeout or fails with a classifiable error.
#[allow(async_fn_in_trait)]
pub trait PageFetch {
    /// Loads and renders the listing page at `url`
    async fn fetch_listing(&self, url: &Url) -> SourceResult<ListingPage>;
}

/// The exclusive navigation session backing one harvest run
///
/// At most one session is open per run; it is acquired at run start and
/// released when dropped, on every exit path.
pub struct HttpSession {
    client: Client,
}

impl HttpSession {
    /// Acquires a session against the listing source
    ///
    /// Failure here is fatal for the whole run: without a session no unit
    /// can be traversed.
    pub fn connect(source: &SourceConfig, page_timeout: Duration) -> SourceResult<Self> {
        let client = Client::builder()
            .user_agent(&source.user_agent)
            .timeout(page_timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| SourceError::SessionUnavailable(e.to_string()))?;

        tracing::debug!("Navigation session acquired");
        Ok(Self { client })
    }
}

impl PageFetch for HttpSession {
    async fn fetch_listing(&self, url: &Url) -> SourceResult<ListingPage> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    SourceError::Request {
                        url: url.to_string(),
                        source: e,
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| SourceError::Stale {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(parse_listing(&body, url))
    }
}

/// Parses a rendered listing page into rows and a next-page address
///
/// Malformed markup is a normal case: unparseable fragments simply
/// contribute no rows.
pub fn parse_listing(html: &str, page_url: &Url) -> ListingPage {
    let document = Html::parse_document(html);

    ListingPage {
        rows: extract_rows(&document),
        next_page: find_next_page(&document, page_url),
    }
}

/// Extracts all data rows from all tables, skipping header rows
fn extract_rows(document: &Html) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    let (Ok(table_sel), Ok(tr_sel), Ok(th_sel), Ok(td_sel)) = (
        Selector::parse("table"),
        Selector::parse("tr"),
        Selector::parse("th"),
        Selector::parse("td"),
    ) else {
        return rows;
    };

    for table in document.select(&table_sel) {
        for tr in table.select(&tr_sel) {
            if tr.select(&th_sel).next().is_some() {
                continue;
            }

            let cells: Vec<String> = tr.select(&td_sel).map(|td| cell_text(&td)).collect();
            if !cells.is_empty() {
                rows.push(cells);
            }
        }
    }

    rows
}

/// Flattens an element's text content, collapsing whitespace
fn cell_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Next-page locators tried in priority order
const NEXT_LOCATORS: [&str; 2] = ["a.next[href]", "a[rel='next'][href]"];

/// Probes the fixed list of next-page locators
///
/// The first locator resolving to an enabled control wins. Pagination
/// anchors are matched last, by their "»" or "التالي" label.
fn find_next_page(document: &Html, page_url: &Url) -> Option<Url> {
    for locator in NEXT_LOCATORS {
        let Ok(selector) = Selector::parse(locator) else {
            continue;
        };
        for element in document.select(&selector) {
            if is_enabled(&element) {
                if let Some(url) = resolve_control(&element, page_url) {
                    return Some(url);
                }
            }
        }
    }

    let pagination_sel = Selector::parse(".pagination a[href]").ok()?;
    for element in document.select(&pagination_sel) {
        let label = cell_text(&element);
        if (label == "»" || label.contains("التالي")) && is_enabled(&element) {
            if let Some(url) = resolve_control(&element, page_url) {
                return Some(url);
            }
        }
    }

    None
}

/// A control is enabled unless its class list says otherwise
fn is_enabled(element: &ElementRef) -> bool {
    element
        .value()
        .attr("class")
        .map(|classes| !classes.split_whitespace().any(|c| c == "disabled"))
        .unwrap_or(true)
}

/// Resolves a control's href against the page address
fn resolve_control(element: &ElementRef, page_url: &Url) -> Option<Url> {
    let href = element.value().attr("href")?.trim();

    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    let resolved = page_url.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    // A control pointing back at the current page could loop forever
    if resolved == *page_url {
        return None;
    }

    Some(resolved)
}
