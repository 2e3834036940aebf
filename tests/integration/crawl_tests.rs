//! Integration tests for the scraper pipeline
//!
//! These tests use wiremock to stand in for the catalog site and test the
//! resolver, listing crawl, book processing and full runs end-to-end.

use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tululu_catalog::catalog::{BookRecord, BookReference, PageRange, ParsedBook, RangeBound};
use tululu_catalog::config::{Config, CrawlerConfig};
use tululu_catalog::crawler::{
    CatalogCrawler, Coordinator, PageRangeResolver, ResourceClient, ResourceDownloader,
};
use tululu_catalog::url::{CatalogEndpoints, MAX_FILENAME_BYTES};
use tululu_catalog::CatalogError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, destination: &Path) -> Config {
    let mut config = Config::default();
    config.catalog.base_url = base_url.to_string();
    config.crawler.cooldown_secs = 0;
    config.output.destination_folder = destination.to_path_buf();
    config
}

fn client() -> ResourceClient {
    ResourceClient::new(&CrawlerConfig::default()).expect("Failed to build client")
}

fn endpoints(server: &MockServer) -> CatalogEndpoints {
    CatalogEndpoints::new(&server.uri(), 55).expect("Failed to build endpoints")
}

fn crawler(server: &MockServer) -> CatalogCrawler {
    CatalogCrawler::new(client(), endpoints(server), Duration::ZERO)
}

fn listing_html(ids: &[u32], last_page: u32) -> String {
    let tables: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<table class="d_book"><tr><td><a href="/b{id}/"><img src="/shots/{id}.jpg"></a></td></tr>
                   <tr><td><a href="/b{id}/">Book {id}</a></td></tr></table>"#
            )
        })
        .collect();
    let pagination: String = (2..=last_page)
        .map(|page| format!(r#"<a class="npage" href="/l55/{page}/">{page}</a>"#))
        .collect();
    format!(
        r#"<html><body><div id="content"><h1>Научная фантастика</h1>{}
           <p class="center"><span class="npage_select"><b>1</b></span>{}</p></div></body></html>"#,
        tables, pagination
    )
}

fn book_html(id: u32, heading: &str) -> String {
    format!(
        r#"<html><body><div id="content">
            <h1>{heading}</h1>
            <div class="bookimage"><a href="/b{id}/"><img src="/shots/{id}.jpg"></a></div>
            <div class="texts"><b>Гость</b><span class="black">Комментарий к {id}</span></div>
            <span class="d_book">Жанр книги: <a href="/l55/">Научная фантастика</a></span>
        </div></body></html>"#
    )
}

async fn mount_listing(server: &MockServer, page: u32, ids: &[u32], last_page: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/l55/{}/", page)))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(ids, last_page)))
        .mount(server)
        .await;
}

async fn mount_redirect(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/"))
        .mount(server)
        .await;
}

/// Mounts a complete book: detail page, text and cover
async fn mount_book(server: &MockServer, id: u32) {
    mount_book_page(server, id, &format!("Книга {} :: Автор {}", id, id)).await;
    mount_text(server, id).await;
    mount_image(server, id).await;
}

async fn mount_book_page(server: &MockServer, id: u32, heading: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/b{}/", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(book_html(id, heading)))
        .mount(server)
        .await;
}

async fn mount_text(server: &MockServer, id: u32) {
    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .and(query_param("id", id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("Текст книги {}", id)))
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, id: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/shots/{}.jpg", id)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF, id as u8]))
        .mount(server)
        .await;
}

/// Base URL of a local port that nothing listens on
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

fn read_catalog(path: &Path) -> Vec<BookRecord> {
    let bytes = std::fs::read(path).expect("Catalog file missing");
    serde_json::from_slice(&bytes).expect("Catalog is not valid JSON")
}

fn assert_non_empty_file(path: &str) {
    let metadata = std::fs::metadata(path).unwrap_or_else(|_| panic!("{} does not exist", path));
    assert!(metadata.len() > 0, "{} is empty", path);
}

#[tokio::test]
async fn test_crawl_collects_references_across_pages_in_order() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[10, 11], 2).await;
    mount_listing(&server, 2, &[20, 21, 22], 2).await;

    let result = crawler(&server).crawl(&PageRange::explicit(1, 3)).await;

    let ids: Vec<_> = result.references.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![10, 11, 20, 21, 22]);
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(result.pages_crawled, 2);
    assert_eq!(
        result.references[0].detail_url.as_str(),
        format!("{}/b10/", server.uri())
    );
}

#[tokio::test]
async fn test_crawl_vacuous_range_makes_no_requests() {
    let server = MockServer::start().await;
    let crawler = crawler(&server);

    for range in [PageRange::explicit(3, 3), PageRange::explicit(5, 2)] {
        let result = crawler.crawl(&range).await;
        assert!(result.references.is_empty());
        assert!(result.errors.is_empty());
    }

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_crawl_redirect_with_explicit_end_records_error_and_continues() {
    let server = MockServer::start().await;
    mount_redirect(&server, "/l55/1/").await;
    mount_listing(&server, 2, &[7], 2).await;

    let result = crawler(&server).crawl(&PageRange::explicit(1, 3)).await;

    assert_eq!(result.references.len(), 1);
    assert_eq!(result.references[0].id, 7);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("Listing page 1"));
}

#[tokio::test]
async fn test_crawl_redirect_with_resolved_end_stops_quietly() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1, 2], 3).await;
    mount_redirect(&server, "/l55/2/").await;
    Mock::given(method("GET"))
        .and(path("/l55/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[3], 3)))
        .expect(0)
        .mount(&server)
        .await;

    let result = crawler(&server)
        .crawl(&PageRange::through_last_page(1, 3))
        .await;

    let ids: Vec<_> = result.references.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
}

#[tokio::test]
async fn test_crawl_http_error_records_page_and_continues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/l55/1/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_listing(&server, 2, &[4, 5], 2).await;

    let result = crawler(&server).crawl(&PageRange::explicit(1, 3)).await;

    assert_eq!(result.references.len(), 2);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("Listing page 1"));
    assert!(result.errors[0].contains("500"));
}

#[tokio::test]
async fn test_crawl_connection_errors_are_recorded() {
    let endpoints = CatalogEndpoints::new(&closed_port_url(), 55).unwrap();

    let crawler = CatalogCrawler::new(client(), endpoints, Duration::ZERO);
    let result = crawler.crawl(&PageRange::explicit(1, 3)).await;

    assert!(result.references.is_empty());
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors[0].contains("Listing page 1"));
    assert!(result.errors[1].contains("Listing page 2"));
}

#[tokio::test(start_paused = true)]
async fn test_crawl_cools_down_after_each_connection_error() {
    let cooldown = Duration::from_secs(3600);
    let endpoints = CatalogEndpoints::new(&closed_port_url(), 55).unwrap();
    let crawler = CatalogCrawler::new(client(), endpoints, cooldown);

    let started = tokio::time::Instant::now();
    let result = crawler.crawl(&PageRange::explicit(1, 3)).await;

    assert_eq!(result.errors.len(), 2);
    assert!(started.elapsed() >= cooldown * 2);
}

#[tokio::test(start_paused = true)]
async fn test_book_connection_error_cools_down() {
    let dir = TempDir::new().unwrap();
    let base_url = closed_port_url();
    let mut config = create_test_config(&base_url, dir.path());
    config.crawler.cooldown_secs = 3600;

    let mut coordinator = Coordinator::new(config).unwrap();
    let reference = BookReference {
        id: 7,
        detail_url: CatalogEndpoints::new(&base_url, 55)
            .unwrap()
            .book_page(7)
            .unwrap(),
    };

    let started = tokio::time::Instant::now();
    coordinator.process_book(&reference).await;

    assert!(started.elapsed() >= Duration::from_secs(3600));
    assert!(coordinator.catalog().is_empty());
    assert_eq!(coordinator.errors().len(), 1);
    assert!(coordinator.errors().drain()[0].contains("Book 7"));
}

#[tokio::test]
async fn test_resolver_keeps_explicit_end() {
    let server = MockServer::start().await;
    let resolver = PageRangeResolver::new(client(), endpoints(&server));

    let range = resolver.resolve(Some(2), Some(6)).await.unwrap();

    assert_eq!(range, PageRange::explicit(2, 6));
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_resolver_reads_last_page_from_pagination() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1], 4).await;
    let resolver = PageRangeResolver::new(client(), endpoints(&server));

    for explicit_end in [None, Some(0)] {
        let range = resolver.resolve(None, explicit_end).await.unwrap();
        assert_eq!(range.start, 1);
        assert_eq!(range.end, 5);
        assert_eq!(range.bound, RangeBound::Resolved);
    }
}

#[tokio::test]
async fn test_resolver_redirect_is_fatal() {
    let server = MockServer::start().await;
    mount_redirect(&server, "/l55/1/").await;
    let resolver = PageRangeResolver::new(client(), endpoints(&server));

    let err = resolver.resolve(None, None).await.unwrap_err();

    match err {
        CatalogError::ResolverFatal(inner) => assert!(inner.is_redirect()),
        other => panic!("expected ResolverFatal, got {:?}", other),
    }
}

#[tokio::test]
async fn test_book_redirect_is_recorded_once_and_skipped() {
    let server = MockServer::start().await;
    mount_redirect(&server, "/b239/").await;
    let dir = TempDir::new().unwrap();

    let mut coordinator = Coordinator::new(create_test_config(&server.uri(), dir.path())).unwrap();
    let reference = BookReference {
        id: 239,
        detail_url: endpoints(&server).book_page(239).unwrap(),
    };
    coordinator.process_book(&reference).await;

    assert!(coordinator.catalog().is_empty());
    assert_eq!(coordinator.errors().len(), 1);
    assert!(coordinator.errors().drain()[0].contains("239"));
}

#[tokio::test]
async fn test_book_without_separator_is_dropped_and_others_kept() {
    let server = MockServer::start().await;
    mount_book(&server, 1).await;
    mount_book_page(&server, 2, "Книга без автора").await;
    mount_book(&server, 3).await;
    let dir = TempDir::new().unwrap();

    let mut coordinator = Coordinator::new(create_test_config(&server.uri(), dir.path())).unwrap();
    let report = coordinator.run_book_ids(1..=3).await.unwrap();

    let catalog = read_catalog(&report.catalog_path);
    let titles: Vec<_> = catalog.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Книга 1", "Книга 3"]);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("Book 2"));
    assert!(report.errors[0].contains("separator"));
}

#[tokio::test]
async fn test_text_redirect_keeps_image_download() {
    let server = MockServer::start().await;
    mount_book_page(&server, 5, "Книга 5 :: Автор 5").await;
    mount_redirect(&server, "/txt.php").await;
    mount_image(&server, 5).await;
    let dir = TempDir::new().unwrap();

    let mut coordinator = Coordinator::new(create_test_config(&server.uri(), dir.path())).unwrap();
    let report = coordinator.run_book_ids(5..=5).await.unwrap();

    let catalog = read_catalog(&report.catalog_path);
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].local_text_path, None);
    let image_path = catalog[0].local_image_path.as_deref().expect("image path unset");
    assert_non_empty_file(image_path);
    assert!(image_path.ends_with("5.jpg"));

    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("Book 5: text download"));
}

#[tokio::test]
async fn test_skip_images_downloads_only_text() {
    let server = MockServer::start().await;
    mount_book_page(&server, 8, "Книга 8 :: Автор 8").await;
    mount_text(&server, 8).await;
    Mock::given(method("GET"))
        .and(path("/shots/8.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
        .expect(0)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let mut config = create_test_config(&server.uri(), dir.path());
    config.output.skip_images = true;
    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run_book_ids(8..=8).await.unwrap();

    let catalog = read_catalog(&report.catalog_path);
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].local_image_path, None);
    let text_path = catalog[0].local_text_path.as_deref().expect("text path unset");
    assert!(text_path.ends_with("Книга 8.txt"));
    assert_eq!(
        std::fs::read_to_string(text_path).unwrap(),
        "Текст книги 8"
    );
    assert!(!dir.path().join("images").exists());
}

#[tokio::test]
async fn test_long_title_text_name_fits_filesystem_limit() {
    let server = MockServer::start().await;
    mount_text(&server, 12).await;
    let dir = TempDir::new().unwrap();
    let books_dir = dir.path().join("books");
    std::fs::create_dir_all(&books_dir).unwrap();

    let downloader = ResourceDownloader::new(
        client(),
        endpoints(&server),
        books_dir,
        dir.path().join("images"),
    );
    let book = ParsedBook {
        title: "Ж".repeat(127),
        author: "Автор".to_string(),
        image_url: url::Url::parse(&format!("{}/shots/12.jpg", server.uri())).unwrap(),
        comments: vec![],
        genres: vec![],
    };

    let path = downloader
        .download_text(&book, 12, false)
        .await
        .unwrap()
        .expect("text was skipped");

    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.len() <= MAX_FILENAME_BYTES);
    assert!(name.starts_with("ЖЖЖ"));
    assert!(name.ends_with(".txt"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "Текст книги 12");
}

#[tokio::test]
async fn test_long_title_book_keeps_text_path() {
    let server = MockServer::start().await;
    mount_book_page(&server, 13, &format!("{} :: Автор", "Щ".repeat(200))).await;
    mount_text(&server, 13).await;
    mount_image(&server, 13).await;
    let dir = TempDir::new().unwrap();

    let mut coordinator = Coordinator::new(create_test_config(&server.uri(), dir.path())).unwrap();
    let report = coordinator.run_book_ids(13..=13).await.unwrap();

    assert!(report.errors.is_empty(), "errors: {:?}", report.errors);
    let catalog = read_catalog(&report.catalog_path);
    let text_path = catalog[0].local_text_path.as_deref().expect("text path unset");
    assert_non_empty_file(text_path);
}

#[tokio::test]
async fn test_full_run_writes_catalog() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &[1, 2], 2).await;
    mount_listing(&server, 2, &[3], 2).await;
    for id in 1..=3 {
        mount_book(&server, id).await;
    }
    let dir = TempDir::new().unwrap();

    let mut coordinator = Coordinator::new(create_test_config(&server.uri(), dir.path())).unwrap();
    let report = coordinator.run().await.expect("Run failed");

    assert!(report.errors.is_empty(), "errors: {:?}", report.errors);
    assert_eq!(report.statistics.pages_crawled, 2);
    assert_eq!(report.statistics.books_found, 3);
    assert_eq!(report.statistics.books_saved, 3);
    assert_eq!(report.statistics.texts_downloaded, 3);
    assert_eq!(report.statistics.images_downloaded, 3);
    assert_eq!(report.catalog_path, dir.path().join("books_catalog.json"));

    let catalog = read_catalog(&report.catalog_path);
    let authors: Vec<_> = catalog.iter().map(|r| r.author.as_str()).collect();
    assert_eq!(authors, vec!["Автор 1", "Автор 2", "Автор 3"]);
    assert_eq!(catalog[0].comments, vec!["Комментарий к 1"]);
    assert_eq!(catalog[0].genres, vec!["Научная фантастика"]);
    assert_eq!(catalog[0].image_url, format!("{}/shots/1.jpg", server.uri()));

    for record in &catalog {
        assert_non_empty_file(record.local_text_path.as_deref().unwrap());
        assert_non_empty_file(record.local_image_path.as_deref().unwrap());
    }

    let raw = std::fs::read_to_string(&report.catalog_path).unwrap();
    assert!(raw.contains("Научная фантастика"));
    assert!(raw.contains("\"localTextPath\""));
}

#[tokio::test]
async fn test_unresolvable_range_writes_no_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/l55/1/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let mut coordinator = Coordinator::new(create_test_config(&server.uri(), dir.path())).unwrap();
    let result = coordinator.run().await;

    assert!(matches!(result, Err(CatalogError::ResolverFatal(_))));
    assert!(!dir.path().join("books_catalog.json").exists());
}

#[tokio::test]
async fn test_explicit_range_run_with_failing_page() {
    let server = MockServer::start().await;
    mount_listing(&server, 2, &[4], 9).await;
    mount_redirect(&server, "/l55/3/").await;
    mount_book(&server, 4).await;
    let dir = TempDir::new().unwrap();

    let mut config = create_test_config(&server.uri(), dir.path());
    config.crawler.start_page = 2;
    config.crawler.end_page = Some(4);
    config.output.catalog_path = Some(dir.path().join("out").join("catalog.json"));
    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.statistics.books_saved, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("Listing page 3"));
    assert_eq!(read_catalog(&dir.path().join("out").join("catalog.json")).len(), 1);
}
