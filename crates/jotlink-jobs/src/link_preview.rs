//! Link-preview metadata extraction.
//!
//! Given a URL scheduled at note create/update time, fetch the page's HTML
//! and scrape display metadata with tolerant pattern matching: no full HTML
//! parse, case-insensitive, first match wins, and a missing tag yields an
//! absent field rather than an error. Video-sharing hosts get a dedicated
//! path that prefers Open Graph tags (falling back to Twitter-card tags) and
//! a hardcoded platform favicon.
//!
//! The whole job is best-effort: fetch failures, non-success statuses, and
//! pages with no usable title are logged and swallowed. Metadata is written
//! back onto the note only when a non-empty title was found, overwriting any
//! prior metadata (the handler is idempotent, so at-least-once delivery is
//! safe).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use jotlink_core::{defaults, Error, JobType, LinkMetadata, NoteRepository, Result};

use crate::handler::{JobContext, JobHandler, JobResult};

static OG_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]*property=["']og:title["'][^>]*content=["']([^"']+)["']"#).unwrap()
});
static TWITTER_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]*name=["']twitter:title["'][^>]*content=["']([^"']+)["']"#).unwrap()
});
static OG_DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]*property=["']og:description["'][^>]*content=["']([^"']+)["']"#)
        .unwrap()
});
static TWITTER_DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]*name=["']twitter:description["'][^>]*content=["']([^"']+)["']"#)
        .unwrap()
});
static OG_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]*property=["']og:image["'][^>]*content=["']([^"']+)["']"#).unwrap()
});
static HTML_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").unwrap());
static META_DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]*name=["']description["'][^>]*content=["']([^"']+)["']"#).unwrap()
});
static ICON_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<link[^>]*rel=["'](?:icon|shortcut icon)["'][^>]*href=["']([^"']+)["']"#)
        .unwrap()
});

fn first_capture<'h>(re: &Regex, html: &'h str) -> Option<&'h str> {
    re.captures(html).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// True when the URL points at a known video-sharing host.
fn is_video_host(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

/// Resolve a possibly-relative icon href against the page's scheme+host.
///
/// Resolution is against the origin, never the request path, so
/// `favicon.ico` on `https://example.com/deep/page` still lands at
/// `https://example.com/favicon.ico`.
fn resolve_icon(page_url: &str, icon: &str) -> Option<String> {
    if icon.starts_with("http") {
        return Some(icon.to_string());
    }
    let page = Url::parse(page_url).ok()?;
    let origin = Url::parse(&page.origin().ascii_serialization()).ok()?;
    origin.join(icon).ok().map(|u| u.to_string())
}

fn extract_video(url: &str, html: &str) -> Option<LinkMetadata> {
    let title = first_capture(&OG_TITLE, html)
        .or_else(|| first_capture(&TWITTER_TITLE, html))
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    let description = first_capture(&OG_DESCRIPTION, html)
        .or_else(|| first_capture(&TWITTER_DESCRIPTION, html))
        .map(|d| d.trim().to_string());
    let image = first_capture(&OG_IMAGE, html).map(str::to_string);

    Some(LinkMetadata {
        url: url.to_string(),
        title: title.to_string(),
        description,
        // No fetch needed; the platform favicon is known.
        icon: Some(defaults::YOUTUBE_FAVICON.to_string()),
        image,
    })
}

fn extract_generic(url: &str, html: &str) -> Option<LinkMetadata> {
    let title = first_capture(&HTML_TITLE, html)
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    let description = first_capture(&META_DESCRIPTION, html).map(|d| d.trim().to_string());
    let icon = first_capture(&ICON_LINK, html).and_then(|href| resolve_icon(url, href));
    let image = first_capture(&OG_IMAGE, html).map(str::to_string);

    Some(LinkMetadata {
        url: url.to_string(),
        title: title.to_string(),
        description,
        icon,
        image,
    })
}

/// Extract link metadata from a fetched HTML document.
///
/// Returns `None` when no non-empty title could be found, in which case the
/// note must not be touched.
pub fn extract_metadata(url: &str, html: &str) -> Option<LinkMetadata> {
    if is_video_host(url) {
        extract_video(url, html)
    } else {
        extract_generic(url, html)
    }
}

/// Handler for `link_preview` jobs.
pub struct LinkPreviewHandler {
    notes: Arc<dyn NoteRepository>,
    client: Client,
}

impl LinkPreviewHandler {
    /// Create a new handler writing through the given note repository.
    pub fn new(notes: Arc<dyn NoteRepository>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::FETCH_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self { notes, client }
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Request(format!(
                "fetch of {} returned {}",
                url,
                response.status()
            )));
        }
        Ok(response.text().await?)
    }

    /// Fetch the URL and write extracted metadata onto the note.
    async fn run(&self, note_id: Uuid, url: &str) -> Result<()> {
        let html = self.fetch_html(url).await?;

        let Some(metadata) = extract_metadata(url, &html) else {
            debug!(
                subsystem = "jobs",
                component = "link_preview",
                note_id = %note_id,
                url = %url,
                "No title found, leaving note untouched"
            );
            return Ok(());
        };

        self.notes.update_link_metadata(note_id, &metadata).await?;

        debug!(
            subsystem = "jobs",
            component = "link_preview",
            note_id = %note_id,
            url = %url,
            title = %metadata.title,
            "Link metadata stored"
        );
        Ok(())
    }
}

#[async_trait]
impl JobHandler for LinkPreviewHandler {
    fn job_type(&self) -> JobType {
        JobType::LinkPreview
    }

    async fn execute(&self, ctx: JobContext) -> JobResult {
        let Some(note_id) = ctx.note_id() else {
            return JobResult::Failed("link_preview job has no note id".to_string());
        };
        let Some(url) = ctx.payload_str("url") else {
            return JobResult::Failed("link_preview job has no url payload".to_string());
        };

        // Best-effort enhancement: any failure (network, non-200, note gone
        // before we got here) is logged and the job still completes.
        if let Err(e) = self.run(note_id, url).await {
            warn!(
                subsystem = "jobs",
                component = "link_preview",
                note_id = %note_id,
                url = %url,
                error = %e,
                "Link metadata extraction failed"
            );
        }
        JobResult::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_title_only_page() {
        let html = "<html><head><title>Example Page</title></head><body></body></html>";
        let meta = extract_metadata("https://example.com/page", html).unwrap();
        assert_eq!(meta.url, "https://example.com/page");
        assert_eq!(meta.title, "Example Page");
        assert_eq!(meta.description, None);
        assert_eq!(meta.icon, None);
        assert_eq!(meta.image, None);
    }

    #[test]
    fn test_generic_full_page() {
        let html = concat!(
            "<html><head>",
            "<title> Example Page </title>",
            r#"<meta name="description" content="A fine page">"#,
            r#"<link rel="icon" href="https://example.com/fav.png">"#,
            r#"<meta property="og:image" content="https://example.com/og.png">"#,
            "</head></html>"
        );
        let meta = extract_metadata("https://example.com/page", html).unwrap();
        assert_eq!(meta.title, "Example Page");
        assert_eq!(meta.description.as_deref(), Some("A fine page"));
        assert_eq!(meta.icon.as_deref(), Some("https://example.com/fav.png"));
        assert_eq!(meta.image.as_deref(), Some("https://example.com/og.png"));
    }

    #[test]
    fn test_no_title_yields_none() {
        let html = r#"<html><head><meta name="description" content="desc"></head></html>"#;
        assert!(extract_metadata("https://example.com", html).is_none());

        let blank = "<html><head><title>   </title></head></html>";
        assert!(extract_metadata("https://example.com", blank).is_none());
    }

    #[test]
    fn test_relative_icon_resolves_against_origin() {
        let html = concat!(
            "<title>Deep</title>",
            r#"<link rel="shortcut icon" href="/favicon.ico">"#
        );
        let meta = extract_metadata("https://example.com/a/b/page.html", html).unwrap();
        assert_eq!(meta.icon.as_deref(), Some("https://example.com/favicon.ico"));

        // Bare relative href also lands at the origin, not under /a/b/.
        let html2 = concat!("<title>Deep</title>", r#"<link rel="icon" href="fav.ico">"#);
        let meta2 = extract_metadata("https://example.com/a/b/page.html", html2).unwrap();
        assert_eq!(meta2.icon.as_deref(), Some("https://example.com/fav.ico"));
    }

    #[test]
    fn test_youtube_og_title_and_hardcoded_favicon() {
        let html = concat!(
            "<html><head>",
            "<title>ignored document title</title>",
            r#"<meta property="og:title" content="Cool Video">"#,
            r#"<link rel="icon" href="https://youtube.example/scraped.ico">"#,
            r#"<meta property="og:image" content="https://i.ytimg.com/vi/abc123/hq.jpg">"#,
            "</head></html>"
        );
        let meta = extract_metadata("https://youtu.be/abc123", html).unwrap();
        assert_eq!(meta.title, "Cool Video");
        // The scraped <link rel="icon"> is ignored on the video path.
        assert_eq!(meta.icon.as_deref(), Some(defaults::YOUTUBE_FAVICON));
        assert_eq!(
            meta.image.as_deref(),
            Some("https://i.ytimg.com/vi/abc123/hq.jpg")
        );
    }

    #[test]
    fn test_youtube_twitter_fallbacks() {
        let html = concat!(
            r#"<meta name="twitter:title" content="Fallback Title">"#,
            r#"<meta name="twitter:description" content="Fallback desc">"#
        );
        let meta = extract_metadata("https://www.youtube.com/watch?v=abc", html).unwrap();
        assert_eq!(meta.title, "Fallback Title");
        assert_eq!(meta.description.as_deref(), Some("Fallback desc"));
        assert_eq!(meta.image, None);
    }

    #[test]
    fn test_youtube_without_any_title_yields_none() {
        let html = "<html><head><title>Watch</title></head></html>";
        // The video path never falls back to the document <title>.
        assert!(extract_metadata("https://youtu.be/abc123", html).is_none());
    }

    #[test]
    fn test_extraction_is_case_insensitive() {
        let html = concat!(
            "<TITLE>Shouty Page</TITLE>",
            r#"<META NAME="description" CONTENT="Loud desc">"#
        );
        let meta = extract_metadata("https://example.com", html).unwrap();
        assert_eq!(meta.title, "Shouty Page");
        assert_eq!(meta.description.as_deref(), Some("Loud desc"));
    }

    #[test]
    fn test_first_match_wins() {
        let html = concat!(
            "<title>First</title>",
            "<title>Second</title>",
            r#"<meta property="og:image" content="https://a.example/1.png">"#,
            r#"<meta property="og:image" content="https://a.example/2.png">"#
        );
        let meta = extract_metadata("https://example.com", html).unwrap();
        assert_eq!(meta.title, "First");
        assert_eq!(meta.image.as_deref(), Some("https://a.example/1.png"));
    }

    #[test]
    fn test_single_quoted_attributes() {
        let html = "<meta property='og:title' content='Quoted Video'/>";
        let meta = extract_metadata("https://youtu.be/q", html).unwrap();
        assert_eq!(meta.title, "Quoted Video");
    }
}
