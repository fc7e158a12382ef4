//! Utility functions and helpers.

pub mod hash;
pub mod http;

use url::Url;

use crate::error::Result;

/// Derive the stored filename for a watched URL.
///
/// The filename is the last path segment of the URL, with `.html`
/// appended unless the segment already carries a `.pdf` or `.html`
/// extension. Distinct URLs sharing a final segment therefore map to
/// the same filename and silently overwrite each other's state; the
/// URL list is assumed to keep final segments unique.
pub fn filename_for_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw)?;
    let segment = url
        .path_segments()
        .and_then(|segments| segments.last())
        .unwrap_or_default();
    let lower = segment.to_ascii_lowercase();
    if lower.ends_with(".pdf") || lower.ends_with(".html") {
        Ok(segment.to_string())
    } else {
        Ok(format!("{segment}.html"))
    }
}

/// Today's date as a `YYYY-MM-DD` stamp, in local time.
pub fn today_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_for_url() {
        assert_eq!(filename_for_url("http://x/a.html").unwrap(), "a.html");
        assert_eq!(
            filename_for_url("https://example.com/docs/report.pdf").unwrap(),
            "report.pdf"
        );
        assert_eq!(
            filename_for_url("https://example.com/docs/Report.PDF").unwrap(),
            "Report.PDF"
        );
        assert_eq!(
            filename_for_url("https://example.com/notices/spring").unwrap(),
            "spring.html"
        );
    }

    #[test]
    fn test_filename_ignores_query() {
        assert_eq!(
            filename_for_url("https://example.com/page?id=3").unwrap(),
            "page.html"
        );
    }

    #[test]
    fn test_filename_trailing_slash() {
        // A trailing slash yields an empty segment; the suffix rule
        // still applies and the collision caveat covers the rest.
        assert_eq!(filename_for_url("https://example.com/dir/").unwrap(), ".html");
    }

    #[test]
    fn test_filename_rejects_invalid_url() {
        assert!(filename_for_url("not a url").is_err());
    }

    #[test]
    fn test_today_stamp_shape() {
        let stamp = today_stamp();
        assert_eq!(stamp.len(), 10);
        assert_eq!(stamp.as_bytes()[4], b'-');
        assert_eq!(stamp.as_bytes()[7], b'-');
    }
}
