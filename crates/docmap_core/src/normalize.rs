use url::Url;

/// Canonical form used for visited/pending deduplication.
///
/// Lower-cases scheme and host, drops default ports, fragments and trailing
/// slashes (the root path becomes empty). The query string is kept. Input
/// that does not parse as an absolute URL is returned trimmed.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };
    let Some(host) = url.host_str() else {
        return trimmed.to_string();
    };

    let mut out = String::with_capacity(trimmed.len());
    out.push_str(&url.scheme().to_ascii_lowercase());
    out.push_str("://");
    out.push_str(&host.to_ascii_lowercase());
    // `port()` is already None when the port is the scheme default.
    if let Some(port) = url.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }
    out.push_str(url.path().trim_end_matches('/'));
    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::normalize_url;

    #[test]
    fn host_case_default_port_and_trailing_slash_collapse() {
        let expected = "https://docs.example.com/guide";
        assert_eq!(normalize_url("https://docs.example.com/guide"), expected);
        assert_eq!(normalize_url("HTTPS://DOCS.Example.COM/guide/"), expected);
        assert_eq!(normalize_url("https://docs.example.com:443/guide"), expected);
        assert_eq!(normalize_url("  https://docs.example.com/guide#intro "), expected);
    }

    #[test]
    fn root_path_becomes_empty() {
        assert_eq!(normalize_url("https://example.com/"), "https://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn non_default_port_and_query_are_kept() {
        assert_eq!(
            normalize_url("http://example.com:8080/a/?q=1"),
            "http://example.com:8080/a?q=1"
        );
    }

    #[test]
    fn path_case_is_preserved() {
        assert_eq!(
            normalize_url("https://example.com/Guide/Intro"),
            "https://example.com/Guide/Intro"
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "https://Docs.Example.com:443/a/b/",
            "http://example.com:80",
            "http://example.com:8080/x//?y=2#frag",
            "https://example.com/?",
            "mailto:someone@example.com",
            "not a url at all ",
            "",
        ];
        for sample in samples {
            let once = normalize_url(sample);
            assert_eq!(normalize_url(&once), once, "sample {sample:?}");
        }
    }
}
