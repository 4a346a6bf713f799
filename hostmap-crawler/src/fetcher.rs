use crate::error::Result;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// References extracted from one HTML page, already resolved to absolute
/// URLs with fragments stripped. Links drive the frontier; resources feed
/// the host graph. The two never mix.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    /// `a[href]` navigation targets.
    pub links: Vec<Url>,
    /// Embedded scripts, images, frames and stylesheets.
    pub resources: Vec<Url>,
}

/// What came back for a fetched URL.
#[derive(Debug)]
pub enum Fetch {
    /// A 200 HTML page, parsed.
    Html(FetchedPage),
    /// Success status but not an HTML content type.
    NonHtml(Option<String>),
    /// Any non-200 status.
    BadStatus(u16),
}

/// Thin wrapper around a reqwest client with the crawl's fetch policy:
/// short timeout, bounded redirects, no retries. A single slow host must
/// never stall the frontier.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("hostmap/0.2 (dependency mapper)")
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }

    /// Fetch one URL. Status and content-type gates are outcomes, not
    /// errors; only transport failures surface as `Err`.
    pub async fn fetch(&self, url: &Url) -> Result<Fetch> {
        debug!("Fetching {}", url);
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Ok(Fetch::BadStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let is_html = content_type
            .as_ref()
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false);
        if !is_html {
            return Ok(Fetch::NonHtml(content_type));
        }

        let body = response.text().await?;
        Ok(Fetch::Html(extract_references(&body, url)))
    }
}

/// Pull navigation links and resource references out of an HTML document.
/// Malformed or unresolvable references are skipped one by one; the rest
/// of the page still gets processed.
fn extract_references(html: &str, base: &Url) -> FetchedPage {
    let document = Html::parse_document(html);

    let link_selector = Selector::parse("a[href]").unwrap();
    let mut links = Vec::new();
    for element in document.select(&link_selector) {
        if let Some(href) = element.value().attr("href")
            && let Some(resolved) = resolve_reference(base, href)
        {
            links.push(resolved);
        }
    }

    // src-carrying embeds, plus stylesheets which reference through href.
    let src_selector = Selector::parse("script[src], img[src], iframe[src]").unwrap();
    let stylesheet_selector = Selector::parse(r#"link[rel="stylesheet"][href]"#).unwrap();

    let mut resources = Vec::new();
    for element in document.select(&src_selector) {
        if let Some(src) = element.value().attr("src")
            && let Some(resolved) = resolve_reference(base, src)
        {
            resources.push(resolved);
        }
    }
    for element in document.select(&stylesheet_selector) {
        if let Some(href) = element.value().attr("href")
            && let Some(resolved) = resolve_reference(base, href)
        {
            resources.push(resolved);
        }
    }

    FetchedPage { links, resources }
}

/// Resolve a raw href/src against the page URL. Non-web schemes, bare
/// fragments and unparseable values yield `None`.
fn resolve_reference(base: &Url, reference: &str) -> Option<Url> {
    let reference = reference.trim();
    if reference.is_empty()
        || reference.starts_with("javascript:")
        || reference.starts_with("mailto:")
        || reference.starts_with("tel:")
        || reference.starts_with("data:")
        || reference.starts_with('#')
    {
        return None;
    }

    let mut resolved = base.join(reference).ok()?;
    resolved.set_fragment(None);

    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}
