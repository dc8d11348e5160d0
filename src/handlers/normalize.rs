use url::Url;

/// Query parameters that carry sharing or tracking state and never identify content.
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "igshid", "ref", "ref_src", "ref_url", "s", "t", "si", "feature", "share",
];

/// Generic URL cleanup shared by every handler.
///
/// Forces https, drops tracking parameters, the fragment and a trailing slash.
/// Input that is not an http(s) URL is returned unchanged.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url.trim()) else {
        return url.to_string();
    };

    match parsed.scheme() {
        "https" => {}
        "http" => {
            let _ = parsed.set_scheme("https");
        }
        _ => return url.to_string(),
    }

    // The url crate already lowercases the host; default ports need clearing after the scheme swap.
    if parsed.port() == Some(80) || parsed.port() == Some(443) {
        let _ = parsed.set_port(None);
    }

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(kept);
    }

    parsed.set_fragment(None);

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    parsed.to_string()
}

/// Lowercased host of an http(s) URL, without a leading `www.`.
#[must_use]
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

fn is_tracking_param(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    lower.starts_with("utm_") || TRACKING_PARAMS.contains(&lower.as_str())
}
