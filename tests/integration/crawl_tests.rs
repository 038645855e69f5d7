//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the HTTP fetcher and the full crawl cycle end-to-end.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use trawler::config::{load_config, FetcherConfig, SettingsBuilder};
use trawler::crawler::{crawl, Fetcher, HttpFetcher};
use trawler::{CrawlError, CrawlEvent, Scraper};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(format!("<html><body>{}</body></html>", body))
}

async fn mount_page(server: &MockServer, page: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(response)
        .mount(server)
        .await;
}

fn fetcher_config() -> FetcherConfig {
    FetcherConfig {
        user_agent: "TrawlerTest/1.0".to_string(),
        ..FetcherConfig::default()
    }
}

/// A small site: home links to an about page, a login page and a broken page
async fn small_site() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<h1>Home</h1>
            <a href="/about">About</a>
            <a href="/login">Log in</a>
            <a href="/broken">Broken</a>
            <a href="/about#team">About again</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html(r#"<p>About us</p><a href="/">Home</a><a href="/deeper">Deeper</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(html("<p>secret</p>"))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/deeper"))
        .respond_with(html("<p>too deep</p>"))
        .expect(0)
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn test_http_fetcher_returns_body() {
    let server = MockServer::start().await;
    mount_page(&server, "/page", html("<p>hello</p>")).await;

    let fetcher = HttpFetcher::new(&fetcher_config()).unwrap();
    let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
    let body = fetcher.fetch(&url).await.unwrap();

    assert_eq!(body, "<html><body><p>hello</p></body></html>");
}

#[tokio::test]
async fn test_http_fetcher_error_status() {
    let server = MockServer::start().await;
    mount_page(&server, "/error", ResponseTemplate::new(500)).await;

    let fetcher = HttpFetcher::new(&fetcher_config()).unwrap();

    let url = Url::parse(&format!("{}/error", server.uri())).unwrap();
    assert_eq!(
        fetcher.fetch(&url).await,
        Err(CrawlError::HttpStatus { code: 500 })
    );

    let missing = Url::parse(&format!("{}/missing", server.uri())).unwrap();
    assert_eq!(
        fetcher.fetch(&missing).await,
        Err(CrawlError::HttpStatus { code: 404 })
    );
}

#[tokio::test]
async fn test_http_fetcher_content_cap() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/big",
        ResponseTemplate::new(200).set_body_string("x".repeat(4096)),
    )
    .await;

    let config = FetcherConfig {
        max_content_bytes: 1024,
        ..fetcher_config()
    };
    let fetcher = HttpFetcher::new(&config).unwrap();
    let url = Url::parse(&format!("{}/big", server.uri())).unwrap();

    assert_eq!(
        fetcher.fetch(&url).await,
        Err(CrawlError::ContentTooLarge { limit: 1024 })
    );
}

#[tokio::test]
async fn test_http_fetcher_follows_redirects() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/old",
        ResponseTemplate::new(301).insert_header("location", "/new"),
    )
    .await;
    mount_page(&server, "/new", html("<p>moved</p>")).await;

    let fetcher = HttpFetcher::new(&fetcher_config()).unwrap();
    let url = Url::parse(&format!("{}/old", server.uri())).unwrap();
    let body = fetcher.fetch(&url).await.unwrap();

    assert!(body.contains("moved"));
}

#[tokio::test]
async fn test_latin1_page_is_scraped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/menu",
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/html; charset=iso-8859-1")
            .set_body_bytes(b"<html><body><p>Caf\xe9 menu</p></body></html>".to_vec()),
    )
    .await;

    let settings = SettingsBuilder::new()
        .delay_millis(0)
        .async_mode(false)
        .build()
        .unwrap();
    let scraper = Scraper::new(settings, &fetcher_config()).unwrap();
    let result = scraper.run([format!("{}/menu", server.uri())]).await;

    assert!(result.failures.is_empty(), "{:?}", result.failures);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].data, "Café menu");
}

#[tokio::test]
async fn test_malformed_utf8_page_is_parse_failure() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/garbled",
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/html; charset=utf-8")
            .set_body_bytes(b"<p>Caf\xe9</p>".to_vec()),
    )
    .await;

    let fetcher = HttpFetcher::new(&fetcher_config()).unwrap();
    let url = Url::parse(&format!("{}/garbled", server.uri())).unwrap();

    assert!(matches!(
        fetcher.fetch(&url).await,
        Err(CrawlError::Parse(_))
    ));
}

#[tokio::test]
async fn test_http_fetcher_timeout_is_network_error() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/slow",
        html("<p>late</p>").set_delay(Duration::from_secs(3)),
    )
    .await;

    let config = FetcherConfig {
        request_timeout_secs: 1,
        ..fetcher_config()
    };
    let fetcher = HttpFetcher::new(&config).unwrap();
    let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();

    assert!(matches!(
        fetcher.fetch(&url).await,
        Err(CrawlError::Network(_))
    ));
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = small_site().await;
    let base_url = server.uri();

    let settings = SettingsBuilder::new()
        .max_depth(1)
        .parallels(3)
        .delay_millis(0)
        .async_mode(false)
        .handle_links(true)
        .build()
        .unwrap();
    let scraper = Scraper::new(settings, &fetcher_config()).unwrap();

    let result = scraper.run([base_url.clone()]).await;

    let home = format!("{}/", base_url);
    let about = format!("{}/about", base_url);
    let broken = format!("{}/broken", base_url);
    let login = format!("{}/login", base_url);

    let urls: Vec<_> = result.records.iter().map(|r| r.source_url.clone()).collect();
    assert_eq!(urls, vec![home.clone(), about.clone()]);

    let home_record = result.record_for(&home).unwrap();
    assert_eq!(home_record.depth, 0);
    assert!(home_record.data.starts_with("Home About"));
    assert_eq!(home_record.links, vec![about.clone(), login.clone(), broken.clone()]);

    assert_eq!(result.failures.len(), 1);
    assert_eq!(
        result.failure_for(&broken).map(|f| &f.reason),
        Some(&CrawlError::HttpStatus { code: 500 })
    );

    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].url, login);
    assert!(!result.cancelled);

    let stats = result.stats();
    assert_eq!(stats.scraped, 2);
    assert_eq!(stats.unique_domains, 1);
    // Mock expectations (no /login or /deeper fetch) are verified on drop
}

#[tokio::test]
async fn test_streaming_crawl_ends_after_completion() {
    let server = small_site().await;

    let settings = SettingsBuilder::new()
        .max_depth(1)
        .delay_millis(0)
        .async_mode(true)
        .handle_links(true)
        .build()
        .unwrap();
    let scraper = Scraper::new(settings, &fetcher_config()).unwrap();

    let mut stream = scraper.stream([server.uri()]);
    let mut records = 0;
    let mut failures = 0;
    let mut skipped = 0;
    while let Some(event) = stream.next().await {
        match event {
            CrawlEvent::Record(_) => records += 1,
            CrawlEvent::Failure(_) => failures += 1,
            CrawlEvent::Skipped(_) => skipped += 1,
            CrawlEvent::Cancelled => panic!("run was not cancelled"),
        }
    }
    assert_eq!((records, failures, skipped), (2, 1, 1));

    let result = stream.finish().await.unwrap();
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].depth, 0);
    assert_eq!(result.records[1].depth, 1);
}

#[tokio::test]
async fn test_start_uses_configured_mode() {
    let server = small_site().await;

    let settings = SettingsBuilder::new()
        .max_depth(1)
        .delay_millis(0)
        .handle_links(true)
        .build()
        .unwrap();
    assert!(settings.async_mode);
    let scraper = Scraper::new(settings, &fetcher_config()).unwrap();

    let output = scraper.start([server.uri()], CancellationToken::new()).await;
    let result = output.into_result().await.unwrap();
    assert_eq!(result.records.len(), 2);
}

#[tokio::test]
async fn test_cancellation_returns_partial_result() {
    let server = MockServer::start().await;
    mount_page(&server, "/fast", html("<p>fast</p>")).await;
    mount_page(
        &server,
        "/slow",
        html("<p>slow</p>").set_delay(Duration::from_secs(30)),
    )
    .await;

    let settings = SettingsBuilder::new()
        .parallels(2)
        .delay_millis(0)
        .async_mode(false)
        .build()
        .unwrap();
    let scraper = Scraper::new(settings, &fetcher_config())
        .unwrap()
        .with_cancel_grace(Duration::from_millis(100));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let result = scraper
        .run_with_cancellation(
            [
                format!("{}/fast", server.uri()),
                format!("{}/slow", server.uri()),
            ],
            cancel,
        )
        .await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(result.cancelled);
    assert_eq!(result.records.len(), 1);
    assert_eq!(
        result.failure_for(&format!("{}/slow", server.uri())).map(|f| &f.reason),
        Some(&CrawlError::Cancelled)
    );
}

#[tokio::test]
async fn test_dropping_stream_stops_run() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/slow",
        html("<p>slow</p>").set_delay(Duration::from_secs(30)),
    )
    .await;

    let settings = SettingsBuilder::new()
        .delay_millis(0)
        .async_mode(true)
        .build()
        .unwrap();
    let scraper = Scraper::new(settings, &fetcher_config())
        .unwrap()
        .with_cancel_grace(Duration::from_millis(50));

    let stream = scraper.stream([format!("{}/slow", server.uri())]);
    let token = stream.cancellation_token();
    drop(stream);

    assert!(token.is_cancelled());
}

#[tokio::test]
async fn test_crawl_from_config_file() {
    let server = small_site().await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
seeds = ["{}"]

[scraper]
max-depth = 1
parallels = 2
delay-millis = 0
async = false
handle-links = true
max-scraped-data-length = 4

[fetcher]
user-agent = "TrawlerTest/1.0"
"#,
        server.uri()
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    let result = crawl(config).await.unwrap();

    assert_eq!(result.records.len(), 2);
    assert!(result.records.iter().all(|r| r.data.chars().count() <= 4));
    assert_eq!(result.records[0].data, "Home");
}

#[tokio::test]
async fn test_custom_fetcher_through_public_api() {
    struct Static;

    #[async_trait::async_trait]
    impl Fetcher for Static {
        async fn fetch(&self, _url: &Url) -> Result<String, CrawlError> {
            Ok("<title>Static</title><p>same everywhere</p>".to_string())
        }
    }

    let settings = SettingsBuilder::new()
        .delay_millis(0)
        .async_mode(false)
        .build()
        .unwrap();
    let scraper = Scraper::with_fetcher(settings, Arc::new(Static)).unwrap();
    let result = scraper
        .run(["https://one.test/", "https://two.test/"])
        .await;

    assert_eq!(result.records.len(), 2);
    assert!(result
        .records
        .iter()
        .all(|r| r.title.as_deref() == Some("Static")));
}
