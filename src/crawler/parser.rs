//! HTML parser for listing and detail pages
//!
//! This module handles parsing catalog HTML to extract:
//! - Book links from listing tables
//! - The last page number from pagination controls
//! - Title, author, cover, comments and genres from detail pages

use crate::catalog::{BookReference, ParsedBook};
use crate::url::book_id_from_url;
use crate::CatalogError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Separator between title and author in a detail page heading
pub const TITLE_AUTHOR_SEPARATOR: &str = "::";

/// Book links extracted from one listing page
#[derive(Debug, Clone, Default)]
pub struct ParsedListing {
    /// One reference per usable listing table, in document order
    pub references: Vec<BookReference>,

    /// Listing tables that did not yield a reference
    pub problems: Vec<String>,

    /// Number of listing tables on the page
    pub table_count: usize,
}

/// Extracts book references from a listing page
///
/// # Extraction Rules
///
/// - Every `table` inside `div#content` is one book entry
/// - The first `a[href]` in the table is the book's detail link
/// - The link is resolved against `page_url`
/// - The book id is the trailing numeric path segment (`/b239/` → 239)
///
/// # Example
///
/// ```
/// use tululu_catalog::crawler::parse_listing_page;
/// use url::Url;
///
/// let html = r#"<div id="content"><table><tr><td><a href="/b7/">Book</a></td></tr></table></div>"#;
/// let page_url = Url::parse("https://tululu.org/l55/1/").unwrap();
/// let listing = parse_listing_page(html, &page_url);
/// assert_eq!(listing.references[0].id, 7);
/// ```
pub fn parse_listing_page(html: &str, page_url: &Url) -> ParsedListing {
    let document = Html::parse_document(html);
    let mut listing = ParsedListing::default();

    let (Some(table_selector), Some(link_selector)) =
        (selector("div#content table"), selector("a[href]"))
    else {
        return listing;
    };

    for (index, table) in document.select(&table_selector).enumerate() {
        listing.table_count += 1;

        let Some(href) = table
            .select(&link_selector)
            .next()
            .and_then(|link| link.value().attr("href"))
        else {
            listing
                .problems
                .push(format!("table {} on {} has no book link", index + 1, page_url));
            continue;
        };

        let detail_url = match page_url.join(href.trim()) {
            Ok(url) => url,
            Err(e) => {
                listing.problems.push(format!(
                    "table {} on {} has an invalid link '{}': {}",
                    index + 1,
                    page_url,
                    href,
                    e
                ));
                continue;
            }
        };

        match book_id_from_url(&detail_url) {
            Some(id) => listing.references.push(BookReference { id, detail_url }),
            None => listing.problems.push(format!(
                "table {} on {} links to {} which has no book id",
                index + 1,
                page_url,
                detail_url
            )),
        }
    }

    listing
}

/// Reads the highest page number from the pagination controls
///
/// Pagination links are `a.npage` elements; the last one with a numeric
/// label is the last page. Returns `None` when there are no numeric
/// controls.
pub fn last_page_number(html: &str) -> Option<u32> {
    let document = Html::parse_document(html);
    let page_selector = selector("a.npage")?;

    document
        .select(&page_selector)
        .filter_map(|link| element_text(&link).parse::<u32>().ok())
        .last()
}

/// Extracts book fields from a detail page
///
/// # Arguments
///
/// * `html` - The detail page HTML
/// * `page_url` - The URL the page was served from, used to resolve the cover
///
/// # Returns
///
/// * `Ok(ParsedBook)` - All required elements were found
/// * `Err(CatalogError::Parse)` - The content container, heading, separator,
///   cover image or genre container is missing, or title/author is empty
pub fn parse_book_page(html: &str, page_url: &Url) -> Result<ParsedBook, CatalogError> {
    let document = Html::parse_document(html);
    let parse_error = |message: &str| CatalogError::Parse {
        url: page_url.to_string(),
        message: message.to_string(),
    };

    let content = select_first(document.root_element(), "div#content")
        .ok_or_else(|| parse_error("content container not found"))?;

    let heading = select_first(content, "h1").ok_or_else(|| parse_error("title heading not found"))?;
    let heading_text = heading.text().collect::<String>();
    let (title, author) = heading_text
        .split_once(TITLE_AUTHOR_SEPARATOR)
        .ok_or_else(|| parse_error("title/author separator '::' not found"))?;
    let (title, author) = (title.trim(), author.trim());

    if title.is_empty() {
        return Err(parse_error("title is empty"));
    }
    if author.is_empty() {
        return Err(parse_error("author is empty"));
    }

    let image_src = select_first(content, "img[src]")
        .and_then(|img| img.value().attr("src"))
        .ok_or_else(|| parse_error("cover image not found"))?;
    let image_url = page_url.join(image_src.trim()).map_err(|e| CatalogError::Parse {
        url: page_url.to_string(),
        message: format!("invalid cover image URL '{}': {}", image_src, e),
    })?;

    let comments = extract_comments(&document);

    let genre_container = select_first(document.root_element(), "span.d_book")
        .ok_or_else(|| parse_error("genre container not found"))?;
    let genres = select_all_text(genre_container, "a");

    Ok(ParsedBook {
        title: title.to_string(),
        author: author.to_string(),
        image_url,
        comments,
        genres,
    })
}

/// Collects comment texts: the `span` of every `div.texts`
fn extract_comments(document: &Html) -> Vec<String> {
    let (Some(container_selector), Some(span_selector)) = (selector("div.texts"), selector("span"))
    else {
        return Vec::new();
    };

    document
        .select(&container_selector)
        .filter_map(|container| container.select(&span_selector).next())
        .map(|span| span.text().collect::<String>())
        .collect()
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = selector(css)?;
    scope.select(&selector).next()
}

fn select_all_text(scope: ElementRef<'_>, css: &str) -> Vec<String> {
    let Some(selector) = selector(css) else {
        return Vec::new();
    };
    scope.select(&selector).map(|el| element_text(&el)).collect()
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
