use std::time::{Duration, Instant};

use docmap_core::ErrorKind;
use docmap_engine::{FailureKind, FetchSettings, Fetcher, ReqwestFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetcher_returns_html_bytes_and_metadata() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/doc",
        ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
    )
    .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let url = format!("{}/doc", server.uri());

    let output = fetcher.fetch(&url).await.expect("fetch ok");
    assert_eq!(output.metadata.original_url, url);
    assert_eq!(output.metadata.final_url, url);
    assert_eq!(output.metadata.byte_len, 15);
    assert!(output
        .metadata
        .content_type
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(output.bytes, b"<html>ok</html>");
}

#[tokio::test]
async fn fetcher_reports_redirect_target_as_final_url() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/old",
        ResponseTemplate::new(301).insert_header("Location", "/new/"),
    )
    .await;
    serve(
        &server,
        "/new/",
        ResponseTemplate::new(200).set_body_raw("<p>moved</p>", "text/html"),
    )
    .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let output = fetcher
        .fetch(&format!("{}/old", server.uri()))
        .await
        .expect("fetch ok");
    assert_eq!(output.metadata.final_url, format!("{}/new/", server.uri()));
}

#[tokio::test]
async fn fetcher_stops_at_redirects_leaving_allowed_domains() {
    let server = MockServer::start().await;
    let foreign = format!("{}/landing", server.uri().replace("127.0.0.1", "localhost"));
    serve(
        &server,
        "/go",
        ResponseTemplate::new(302).insert_header("Location", foreign.as_str()),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<h1>x</h1>", "text/html"))
        .expect(0)
        .mount(&server)
        .await;

    let settings = FetchSettings {
        allowed_domains: vec!["127.0.0.1".into()],
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings).unwrap();
    let url = format!("{}/go", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::RedirectOutOfScope {
            status: 302,
            location: foreign
        }
    );
    let page_error = err.to_page_error(&url);
    assert_eq!(page_error.kind, ErrorKind::Http);
    assert_eq!(page_error.status, Some(302));
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    serve(&server, "/missing", ResponseTemplate::new(404)).await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let url = format!("{}/missing", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));

    let page_error = err.to_page_error(&url);
    assert_eq!(page_error.kind, ErrorKind::Http);
    assert_eq!(page_error.status, Some(404));
    assert_eq!(page_error.url, url);
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/slow",
        ResponseTemplate::new(200)
            .set_delay(Duration::from_millis(500))
            .set_body_raw("slow", "text/html"),
    )
    .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings).unwrap();
    let url = format!("{}/slow", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
    assert_eq!(err.to_page_error(&url).kind, ErrorKind::Network);
}

#[tokio::test]
async fn fetcher_rejects_non_html_content() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/data.json",
        ResponseTemplate::new(200).set_body_raw("{}", "application/json"),
    )
    .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let url = format!("{}/data.json", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedContentType {
            content_type: "application/json".into()
        }
    );
    assert_eq!(err.to_page_error(&url).kind, ErrorKind::ContentType);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/large",
        ResponseTemplate::new(200).set_body_raw("01234567890", "text/html"),
    )
    .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings).unwrap();
    let url = format!("{}/large", server.uri());

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn fetcher_fails_on_refused_connection() {
    let server = MockServer::start().await;
    let url = format!("{}/gone", server.uri());
    drop(server);

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.to_page_error(&url).kind, ErrorKind::Network);
}

#[tokio::test]
async fn consecutive_fetches_respect_request_delay() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/a",
        ResponseTemplate::new(200).set_body_raw("<p>a</p>", "text/html"),
    )
    .await;

    let settings = FetchSettings {
        request_delay: Duration::from_millis(200),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings).unwrap();
    let url = format!("{}/a", server.uri());

    let start = Instant::now();
    fetcher.fetch(&url).await.unwrap();
    fetcher.fetch(&url).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(200));
}
