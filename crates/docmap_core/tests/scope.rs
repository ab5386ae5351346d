use docmap_core::{is_in_scope, ScopeFilter};

#[test]
fn exact_host_is_in_scope() {
    let allowed = ["docs.example.com"];
    assert!(is_in_scope("https://docs.example.com/x", &allowed));
    assert!(is_in_scope("http://docs.example.com/", &allowed));
}

#[test]
fn subdomains_and_parents_are_out_of_scope() {
    let allowed = ["docs.example.com"];
    assert!(!is_in_scope("https://sub.docs.example.com/x", &allowed));
    assert!(!is_in_scope("https://example.com/x", &allowed));
    assert!(!is_in_scope("https://docs.example.com.evil.net/x", &allowed));
}

#[test]
fn port_does_not_affect_host_match() {
    let filter = ScopeFilter::new(["docs.example.com"]);
    assert!(filter.is_in_scope("https://docs.example.com:8443/x"));
    assert!(!filter.is_in_scope("https://sub.docs.example.com:8443/x"));
}

#[test]
fn host_comparison_ignores_case() {
    let filter = ScopeFilter::new(["Docs.Example.com"]);
    assert!(filter.is_in_scope("https://DOCS.example.COM/Guide"));
}

#[test]
fn non_http_schemes_are_out_of_scope() {
    let filter = ScopeFilter::new(["docs.example.com"]);
    assert!(!filter.is_in_scope("ftp://docs.example.com/file"));
    assert!(!filter.is_in_scope("mailto:help@docs.example.com"));
    assert!(!filter.is_in_scope("file:///etc/passwd"));
}

#[test]
fn malformed_urls_fail_closed() {
    let filter = ScopeFilter::new(["docs.example.com"]);
    assert!(!filter.is_in_scope(""));
    assert!(!filter.is_in_scope("docs.example.com/x"));
    assert!(!filter.is_in_scope("https://"));
    assert!(!filter.is_in_scope("/relative/path"));
}

#[test]
fn empty_allowed_set_admits_nothing() {
    let filter = ScopeFilter::new(Vec::<String>::new());
    assert!(filter.is_empty());
    assert!(!filter.is_in_scope("https://docs.example.com/"));
}
