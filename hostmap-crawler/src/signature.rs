use url::Url;

/// Deduplication signature for a URL: host plus the first path segment.
///
/// Everything under the same prefix collapses to one frontier entry, so
/// `https://a.test/x?q=1` and `https://a.test/x/deeper#frag` both map to
/// `a.test/x`. Returns `None` for URLs without a host.
pub fn page_signature(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let first_segment = url
        .path()
        .trim_matches('/')
        .split('/')
        .next()
        .unwrap_or("");
    Some(format!("{}/{}", host, first_segment))
}

/// Registrable-domain label of a host, public-suffix aware.
///
/// "www.example.co.uk" yields "example". Used only for quota bucketing,
/// never for deduplication. IP addresses and hosts without a registrable
/// domain yield `None`.
pub fn root_domain(host: &str) -> Option<String> {
    if host.parse::<std::net::IpAddr>().is_ok() {
        return None;
    }
    let registrable = psl::domain_str(host)?;
    registrable
        .split('.')
        .next()
        .filter(|label| !label.is_empty())
        .map(|label| label.to_ascii_lowercase())
}

/// Case-insensitive suffix match against the ignored-extension list.
pub fn has_ignored_extension(url: &str, ignored: &[String]) -> bool {
    let lowered = url.to_ascii_lowercase();
    ignored.iter().any(|ext| lowered.ends_with(ext.as_str()))
}
