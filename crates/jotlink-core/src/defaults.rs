//! Centralized default values shared across jotlink crates.

/// Default polling interval for the job worker (milliseconds).
pub const JOB_POLL_INTERVAL_MS: u64 = 500;

/// Default maximum retries for failed jobs.
pub const JOB_MAX_RETRIES: i32 = 3;

/// Timeout for outbound link-preview HTML fetches (seconds).
///
/// The deferred fetch is best-effort; the timeout bounds the worst-case
/// latency of a single job rather than protecting any user-facing request.
pub const FETCH_TIMEOUT_SECS: u64 = 10;

/// Timeout for chat-completion requests (seconds).
pub const CHAT_TIMEOUT_SECS: u64 = 60;

/// Default OpenAI-compatible API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const CHAT_MODEL: &str = "gpt-4.1-nano";

/// Lifetime of a signed upload URL (seconds).
pub const UPLOAD_URL_TTL_SECS: i64 = 3600;

/// Lifetime of a signed read URL resolved onto note views (seconds).
pub const READ_URL_TTL_SECS: i64 = 3600;

/// Favicon used for video-sharing links instead of scraping one.
pub const YOUTUBE_FAVICON: &str = "https://www.youtube.com/favicon.ico";
