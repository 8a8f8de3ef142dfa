//! Browser: search_web, open_url

use crate::actions::params::{SearchParams, UrlParams};
use crate::command::desktop::Desktop;
use crate::core::error::{HandlerError, HandlerResult};

pub fn search_web(desktop: &dyn Desktop, search_url: &str, params: &SearchParams) -> HandlerResult {
    let query = params.query.trim();
    let url = search_link(search_url, query);

    desktop
        .open_url(&url)
        .map_err(|e| HandlerError::io("Failed to open browser", e))?;

    Ok(format!("Searching for: {}", query))
}

pub fn open_url(desktop: &dyn Desktop, params: &UrlParams) -> HandlerResult {
    let url = normalize_url(&params.url);

    desktop
        .open_url(&url)
        .map_err(|e| HandlerError::io(format!("Failed to open {}", url), e))?;

    Ok(format!("Opening: {}", url))
}

pub fn search_link(search_url: &str, query: &str) -> String {
    format!("{}{}", search_url, urlencoding::encode(query))
}

/// Bare hosts like `example.com` get an https scheme
fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains("://") || raw.starts_with("mailto:") || raw.starts_with("file:") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_link_encodes_query() {
        assert_eq!(
            search_link("https://www.google.com/search?q=", "rust & tokio"),
            "https://www.google.com/search?q=rust%20%26%20tokio"
        );
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url(" http://a.b "), "http://a.b");
        assert_eq!(normalize_url("mailto:x@y.z"), "mailto:x@y.z");
    }
}
