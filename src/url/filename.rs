use percent_encoding::percent_decode_str;
use url::Url;

/// Longest file name most filesystems accept, in bytes
pub const MAX_FILENAME_BYTES: usize = 255;

/// Longest suffix after the last dot that [`fit_filename`] keeps intact
const MAX_EXTENSION_BYTES: usize = 16;

/// Characters that are rejected by at least one common filesystem
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Makes a string safe to use as a single file name
///
/// Reserved and control characters are removed, surrounding whitespace and
/// trailing dots are trimmed, and the result is truncated to 255 bytes on a
/// character boundary. Non-ASCII letters are kept.
///
/// # Examples
///
/// ```
/// use tululu_catalog::url::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Что делать?"), "Что делать");
/// assert_eq!(sanitize_filename("a/b:c"), "abc");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !RESERVED_CHARS.contains(c))
        .collect();

    let trimmed = cleaned
        .trim()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace());

    truncate_on_char_boundary(trimmed, MAX_FILENAME_BYTES).to_string()
}

/// Shortens a file name to at most `max_bytes`, keeping its extension
///
/// Callers that append their own suffix (such as a temporary `.part`)
/// pass the limit minus that suffix. A short extension after the last dot
/// is preserved and the stem is cut on a character boundary.
///
/// # Examples
///
/// ```
/// use tululu_catalog::url::fit_filename;
///
/// assert_eq!(fit_filename("обложка.jpg", 10), "обл.jpg");
/// assert_eq!(fit_filename("short.txt", 250), "short.txt");
/// ```
pub fn fit_filename(name: &str, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name.to_string();
    }

    match name.rfind('.') {
        Some(dot)
            if dot > 0
                && name.len() - dot <= MAX_EXTENSION_BYTES
                && name.len() - dot < max_bytes =>
        {
            let (stem, extension) = name.split_at(dot);
            let stem = truncate_on_char_boundary(stem, max_bytes - extension.len());
            format!("{}{}", stem, extension)
        }
        _ => truncate_on_char_boundary(name, max_bytes).to_string(),
    }
}

fn truncate_on_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }

    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    &text[..cut]
}

/// Derives a local file name from a resource URL
///
/// Uses the percent-decoded last path segment. Returns `None` when the URL
/// has no usable segment.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use tululu_catalog::url::image_filename;
///
/// let url = Url::parse("https://tululu.org/shots/%D0%BA%D0%BE%D1%82.jpg").unwrap();
/// assert_eq!(image_filename(&url), Some("кот.jpg".to_string()));
/// ```
pub fn image_filename(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    let name = sanitize_filename(&decoded);

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
