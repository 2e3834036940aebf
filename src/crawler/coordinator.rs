//! Run coordinator - main pipeline orchestration logic
//!
//! This module contains the main loop that coordinates a run:
//! - Resolving the page range
//! - Crawling listing pages for book references
//! - Parsing each book and downloading its resources
//! - Assembling and writing the catalog
//!
//! Per-page and per-book failures are recorded in the [`ErrorSink`] and the
//! loop moves on; only a failed page-range resolution ends the run early.

use crate::catalog::{
    BookRecord, BookReference, CatalogAssembler, DownloadOutcome, ErrorSink, PageRange,
};
use crate::config::Config;
use crate::crawler::book::BookRecordBuilder;
use crate::crawler::downloader::ResourceDownloader;
use crate::crawler::fetcher::ResourceClient;
use crate::crawler::listing::CatalogCrawler;
use crate::crawler::resolver::PageRangeResolver;
use crate::output::{RunReport, RunStatistics};
use crate::url::CatalogEndpoints;
use crate::CatalogError;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Main run coordinator structure
pub struct Coordinator {
    config: Config,
    endpoints: CatalogEndpoints,
    resolver: PageRangeResolver,
    crawler: CatalogCrawler,
    builder: BookRecordBuilder,
    downloader: ResourceDownloader,
    catalog: CatalogAssembler,
    errors: ErrorSink,
    statistics: RunStatistics,
    cooldown: Duration,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CatalogError)` - The base URL or HTTP client was invalid
    pub fn new(config: Config) -> Result<Self, CatalogError> {
        let client = ResourceClient::new(&config.crawler)?;
        Self::with_client(config, client)
    }

    /// Creates a coordinator that issues requests through `client`
    pub fn with_client(config: Config, client: ResourceClient) -> Result<Self, CatalogError> {
        let endpoints =
            CatalogEndpoints::new(&config.catalog.base_url, config.catalog.category_id)?;
        let cooldown = Duration::from_secs(config.crawler.cooldown_secs);

        Ok(Self {
            resolver: PageRangeResolver::new(client.clone(), endpoints.clone()),
            crawler: CatalogCrawler::new(client.clone(), endpoints.clone(), cooldown),
            builder: BookRecordBuilder::new(client.clone()),
            downloader: ResourceDownloader::new(
                client,
                endpoints.clone(),
                config.output.books_dir(),
                config.output.images_dir(),
            ),
            endpoints,
            config,
            catalog: CatalogAssembler::new(),
            errors: ErrorSink::new(),
            statistics: RunStatistics::default(),
            cooldown,
        })
    }

    /// Resolves the page range from the configured start and end pages
    pub async fn resolve_range(&self) -> Result<PageRange, CatalogError> {
        self.resolver
            .resolve(
                Some(self.config.crawler.start_page),
                self.config.crawler.end_page,
            )
            .await
    }

    /// Runs a full catalog crawl
    ///
    /// 1. Resolve the page range (fatal on failure)
    /// 2. Crawl listing pages for book references
    /// 3. Parse and download every referenced book
    /// 4. Write the catalog
    pub async fn run(&mut self) -> Result<RunReport, CatalogError> {
        let range = self.resolve_range().await?;
        self.prepare_folders()?;

        if range.is_empty() {
            tracing::info!(
                "Page range {}..{} is empty, nothing to crawl",
                range.start,
                range.end
            );
        } else {
            tracing::info!("Crawling listing pages {}..{}", range.start, range.end);
        }
        let crawl = self.crawler.crawl(&range).await;

        self.statistics.pages_crawled = crawl.pages_crawled;
        self.statistics.books_found = crawl.references.len() as u32;
        self.errors.extend(crawl.errors);

        for reference in &crawl.references {
            self.process_book(reference).await;
        }

        self.finish().await
    }

    /// Processes detail pages for a range of book ids, without a listing crawl
    pub async fn run_book_ids(
        &mut self,
        ids: RangeInclusive<u32>,
    ) -> Result<RunReport, CatalogError> {
        self.prepare_folders()?;
        tracing::info!("Processing books {}..={}", ids.start(), ids.end());

        for id in ids {
            self.statistics.books_found += 1;

            let reference = match self.endpoints.book_page(id) {
                Ok(detail_url) => BookReference { id, detail_url },
                Err(e) => {
                    self.errors
                        .record(format!("Book {}: invalid detail URL: {}", id, e));
                    continue;
                }
            };
            self.process_book(&reference).await;
        }

        self.finish().await
    }

    /// Parses one book, downloads its resources and appends it to the catalog
    ///
    /// A failed detail page drops the book. Text and image downloads are
    /// independent: a failure in one is recorded and leaves only that path
    /// unset.
    pub async fn process_book(&mut self, reference: &BookReference) {
        let book = match self.builder.build(reference).await {
            Ok(book) => book,
            Err(e) => {
                self.record_failure(reference.id, "detail page", &e).await;
                return;
            }
        };

        tracing::info!(
            "Book {}: {} [{}]",
            reference.id,
            book.title,
            book.genres.join(", ")
        );

        let mut outcome = DownloadOutcome::default();

        match self
            .downloader
            .download_text(&book, reference.id, self.config.output.skip_text)
            .await
        {
            Ok(Some(path)) => {
                outcome = outcome.with_text(&path);
                self.statistics.texts_downloaded += 1;
            }
            Ok(None) => {}
            Err(e) => self.record_failure(reference.id, "text download", &e).await,
        }

        match self
            .downloader
            .download_image(&book, self.config.output.skip_images)
            .await
        {
            Ok(Some(path)) => {
                outcome = outcome.with_image(&path);
                self.statistics.images_downloaded += 1;
            }
            Ok(None) => {}
            Err(e) => self.record_failure(reference.id, "image download", &e).await,
        }

        self.catalog.append(BookRecord::assemble(book, outcome));
        self.statistics.books_saved += 1;
    }

    /// Catalog assembled so far
    pub fn catalog(&self) -> &CatalogAssembler {
        &self.catalog
    }

    /// Failures recorded so far
    pub fn errors(&self) -> &ErrorSink {
        &self.errors
    }

    pub fn statistics(&self) -> &RunStatistics {
        &self.statistics
    }

    async fn record_failure(&mut self, book_id: u32, stage: &str, error: &CatalogError) {
        self.errors
            .record(format!("Book {}: {} failed: {}", book_id, stage, error));

        if error.is_connection() {
            tracing::debug!("Cooling down for {:?}", self.cooldown);
            tokio::time::sleep(self.cooldown).await;
        }
    }

    /// Creates the download folders that this run writes to
    fn prepare_folders(&self) -> Result<(), CatalogError> {
        if !self.config.output.skip_text {
            std::fs::create_dir_all(self.config.output.books_dir())?;
        }
        if !self.config.output.skip_images {
            std::fs::create_dir_all(self.config.output.images_dir())?;
        }
        Ok(())
    }

    /// Writes the catalog and builds the run report
    async fn finish(&mut self) -> Result<RunReport, CatalogError> {
        let catalog_path = self.config.output.catalog_file();
        self.catalog.write_to(&catalog_path).await?;

        tracing::info!(
            "Run completed: {} of {} books saved, {} failures",
            self.statistics.books_saved,
            self.statistics.books_found,
            self.errors.len()
        );

        Ok(RunReport {
            statistics: self.statistics.clone(),
            errors: self.errors.drain().to_vec(),
            catalog_path,
        })
    }
}

/// Runs a complete catalog crawl
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(RunReport)` - The run completed; the catalog holds every book that
///   was parsed, and the report lists every failure
/// * `Err(CatalogError)` - The page range could not be resolved, or the
///   catalog could not be written
///
/// # Example
///
/// ```no_run
/// use tululu_catalog::config::Config;
/// use tululu_catalog::crawler::run_catalog;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_catalog(Config::default()).await?;
/// println!("{} books saved", report.statistics.books_saved);
/// # Ok(())
/// # }
/// ```
pub async fn run_catalog(config: Config) -> Result<RunReport, CatalogError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}

/// Runs the pipeline over an inclusive range of book ids
pub async fn run_book_ids(
    config: Config,
    ids: RangeInclusive<u32>,
) -> Result<RunReport, CatalogError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run_book_ids(ids).await
}
