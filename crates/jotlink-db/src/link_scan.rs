//! URL sniffing over note content.
//!
//! Create/update mutations scan content for a URL and, when one is found,
//! schedule a deferred link-preview extraction job for it.

use once_cell::sync::Lazy;
use regex::Regex;

/// Whitespace-delimited `http(s)://` substring. First match wins.
static HTTP_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("valid URL regex"));

/// Return the first HTTP(S) URL found in `content` in left-to-right scan
/// order, or `None` when the content contains no URL.
///
/// Not necessarily the only URL present; only the first is extracted.
pub fn first_http_url(content: &str) -> Option<&str> {
    HTTP_URL.find(content).map(|m| m.as_str())
}
