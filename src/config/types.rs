use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Tululu-Catalog
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote catalog location
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Root URL of the library site
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Category whose listing pages are crawled (`/l{category-id}/{page}/`)
    #[serde(rename = "category-id", default = "default_category_id")]
    pub category_id: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            category_id: default_category_id(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// First listing page to crawl
    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,

    /// Exclusive end page; absent or 0 resolves it from the catalog
    #[serde(rename = "end-page", default)]
    pub end_page: Option<u32>,

    /// Pause after a connection failure (seconds)
    #[serde(rename = "cooldown-secs", default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_page: default_start_page(),
            end_page: None,
            cooldown_secs: default_cooldown_secs(),
            request_timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root folder for downloaded files and the catalog
    #[serde(rename = "destination-folder", default = "default_destination")]
    pub destination_folder: PathBuf,

    /// Catalog file; defaults to `books_catalog.json` under the destination
    #[serde(rename = "catalog-path", default)]
    pub catalog_path: Option<PathBuf>,

    /// Subfolder for book texts
    #[serde(rename = "books-folder", default = "default_books_folder")]
    pub books_folder: String,

    /// Subfolder for cover images
    #[serde(rename = "images-folder", default = "default_images_folder")]
    pub images_folder: String,

    #[serde(rename = "skip-images", default)]
    pub skip_images: bool,

    #[serde(rename = "skip-text", default)]
    pub skip_text: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            destination_folder: default_destination(),
            catalog_path: None,
            books_folder: default_books_folder(),
            images_folder: default_images_folder(),
            skip_images: false,
            skip_text: false,
        }
    }
}

impl OutputConfig {
    /// Folder receiving `.txt` files
    pub fn books_dir(&self) -> PathBuf {
        self.destination_folder.join(&self.books_folder)
    }

    /// Folder receiving cover images
    pub fn images_dir(&self) -> PathBuf {
        self.destination_folder.join(&self.images_folder)
    }

    /// Location of the JSON catalog
    pub fn catalog_file(&self) -> PathBuf {
        match &self.catalog_path {
            Some(path) => path.clone(),
            None => self.destination_folder.join(DEFAULT_CATALOG_FILE),
        }
    }
}

/// File name used when no catalog path is configured
pub const DEFAULT_CATALOG_FILE: &str = "books_catalog.json";

fn default_base_url() -> String {
    "https://tululu.org/".to_string()
}

fn default_category_id() -> u32 {
    55
}

fn default_start_page() -> u32 {
    1
}

fn default_cooldown_secs() -> u64 {
    2
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("tululu-catalog/{}", env!("CARGO_PKG_VERSION"))
}

fn default_destination() -> PathBuf {
    PathBuf::from(".")
}

fn default_books_folder() -> String {
    "books".to_string()
}

fn default_images_folder() -> String {
    "images".to_string()
}
