//! URL helpers shared by the export readers and the workbook writer.
//!
//! Pages are compared by a scheme-less key so `http://` and `https://`
//! variants of the same address collapse into one page, and displayed
//! with the canonical `https://` scheme.
use std::sync::LazyLock;

use regex::Regex;
use url::{Position, Url};

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://\S+").expect("valid url regex"));

// Assets are sometimes reported as text/html (soft 404s), so the extension wins.
static ASSET_EXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\.(?:jpg|jpeg|png|gif|svg|webp|ico|bmp|tiff|pdf|doc|docx|xls|xlsx|ppt|pptx|css|js|json|xml|txt|csv|woff|woff2|ttf|eot|otf|mp4|mp3|wav|avi|mov|webm|zip|gz|tar|rar)(?:\?.*)?$",
    )
    .expect("valid asset regex")
});

/// True for absolute `http(s)://` URLs.
pub fn is_url(value: &str) -> bool {
    URL_RE.is_match(value.trim())
}

/// Scheme-less comparison key: `http://Example.com/a` and `https://example.com/a`
/// both map to `example.com/a`.
pub fn comparison_key(url: &str) -> String {
    let trimmed = url.trim();
    match Url::parse(trimmed) {
        Ok(parsed) if parsed.has_host() => parsed[Position::BeforeUsername..].to_string(),
        _ => strip_scheme(trimmed).to_string(),
    }
}

/// Display form of a page URL, preferring `https://`.
pub fn display_url(url: &str) -> String {
    let trimmed = url.trim();
    match trimmed.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("http://") => {
            format!("https://{}", &trimmed[7..])
        }
        _ => trimmed.to_string(),
    }
}

/// Host of a URL, if it parses.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Path of a URL without surrounding slashes (`""` for the site root).
pub fn path_of(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(parsed) => parsed.path().trim_matches('/').to_string(),
        Err(_) => {
            let rest = strip_scheme(url.trim());
            let path = rest.split_once('/').map(|(_, p)| p).unwrap_or("");
            let path = path.split(['?', '#']).next().unwrap_or("");
            path.trim_matches('/').to_string()
        }
    }
}

pub fn is_asset(url: &str) -> bool {
    ASSET_EXT_RE.is_match(url.trim())
}

fn strip_scheme(url: &str) -> &str {
    match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_variants_share_a_key() {
        assert_eq!(
            comparison_key("http://example.com/a"),
            comparison_key("https://example.com/a")
        );
        assert_eq!(
            comparison_key("HTTP://Example.com/a"),
            comparison_key("https://example.com/a")
        );
        assert_ne!(
            comparison_key("https://example.com/a"),
            comparison_key("https://example.com/b")
        );
    }

    #[test]
    fn root_with_and_without_slash_match() {
        assert_eq!(
            comparison_key("https://example.com"),
            comparison_key("http://example.com/")
        );
    }

    #[test]
    fn display_prefers_https() {
        assert_eq!(display_url("http://example.com/a"), "https://example.com/a");
        assert_eq!(display_url(" https://example.com/a "), "https://example.com/a");
        assert_eq!(display_url("HTTP://example.com"), "https://example.com");
    }

    #[test]
    fn url_detection() {
        assert!(is_url("https://example.com"));
        assert!(is_url("http://example.com/x?y=1"));
        assert!(!is_url(""));
        assert!(!is_url("example.com/a"));
        assert!(!is_url("ftp://example.com"));
    }

    #[test]
    fn asset_detection() {
        assert!(is_asset("https://example.com/logo.PNG"));
        assert!(is_asset("https://example.com/app.js?v=3"));
        assert!(!is_asset("https://example.com/blog/post"));
        assert!(!is_asset("https://example.com/about.html"));
    }

    #[test]
    fn path_extraction() {
        assert_eq!(path_of("https://example.com/"), "");
        assert_eq!(path_of("https://example.com/blog/post/"), "blog/post");
        assert_eq!(host_of("https://example.com/x").as_deref(), Some("example.com"));
    }
}
