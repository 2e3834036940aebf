use url::Url;

/// URL builder for the catalog's fixed endpoints
///
/// | Resource | Path |
/// |----------|------|
/// | Listing page | `/l{category}/{page}/` |
/// | Book detail | `/b{id}/` |
/// | Book text | `/txt.php?id={id}` |
#[derive(Debug, Clone)]
pub struct CatalogEndpoints {
    base: Url,
    category_id: u32,
}

impl CatalogEndpoints {
    /// Creates endpoints rooted at `base_url`
    ///
    /// A missing trailing slash is added so that relative joins stay under
    /// the base path.
    ///
    /// # Examples
    ///
    /// ```
    /// use tululu_catalog::url::CatalogEndpoints;
    ///
    /// let endpoints = CatalogEndpoints::new("https://tululu.org", 55).unwrap();
    /// assert_eq!(
    ///     endpoints.listing_page(2).unwrap().as_str(),
    ///     "https://tululu.org/l55/2/"
    /// );
    /// ```
    pub fn new(base_url: &str, category_id: u32) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base, category_id })
    }

    /// URL of a catalog listing page
    pub fn listing_page(&self, page: u32) -> Result<Url, url::ParseError> {
        self.base
            .join(&format!("l{}/{}/", self.category_id, page))
    }

    /// URL of a book's detail page
    pub fn book_page(&self, book_id: u32) -> Result<Url, url::ParseError> {
        self.base.join(&format!("b{}/", book_id))
    }

    /// URL of the plain-text download for a book
    pub fn text_resource(&self, book_id: u32) -> Result<Url, url::ParseError> {
        let mut url = self.base.join("txt.php")?;
        url.query_pairs_mut()
            .append_pair("id", &book_id.to_string());
        Ok(url)
    }
}

/// Extracts the book id from a detail URL's trailing path segment
///
/// The segment may carry a non-numeric prefix (`b239` → 239).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use tululu_catalog::url::book_id_from_url;
///
/// let url = Url::parse("https://tululu.org/b239/").unwrap();
/// assert_eq!(book_id_from_url(&url), Some(239));
/// ```
pub fn book_id_from_url(url: &Url) -> Option<u32> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let digits = segment.trim_start_matches(|c: char| !c.is_ascii_digit());

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}
