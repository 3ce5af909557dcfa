//! Horoscope document fetching
//!
//! This module turns a `(Source, Style, RelativeDay, Sign)` request into a
//! [`Document`] by building a source-specific URL, issuing a bounded HTTP GET
//! and extracting the horoscope text and page date from the source's HTML
//! layout. Each source implements the [`UrlBuilder`] and [`PageParser`]
//! capabilities separately; the two are composed by lookup, not inheritance.

pub mod astrology_com;
pub mod astrostyle;
pub mod horoscope_com;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::data::{RelativeDay, Sign, Source, Style};

/// Connection timeout for a single fetch attempt
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total request timeout for a single fetch attempt
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of attempts per fetch call
const MAX_ATTEMPTS: u32 = 3;

/// A horoscope page reduced to its two interesting parts
///
/// Ephemeral: a `Document` is only ever folded into the cache store, never
/// persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The absolute date the page claims to be for
    pub date: NaiveDate,
    /// The horoscope text
    pub text: String,
}

/// Errors that can occur while fetching a horoscope document
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (timeout, connection refused, DNS, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The source answered with a non-2xx status
    #[error("unexpected HTTP status: {0}")]
    Status(u16),

    /// An expected element was missing from the page
    #[error("expected element not found: {0}")]
    ElementNotFound(&'static str),

    /// The page date could not be parsed
    #[error("could not parse page date: {0:?}")]
    BadDate(String),
}

/// URL construction rule for one source
pub trait UrlBuilder {
    /// Builds the URL for a horoscope page
    ///
    /// # Arguments
    /// * `style` - Style to fetch (already clamped to one the source supports)
    /// * `day` - Relative day slot being fetched
    /// * `sign` - Zodiac sign
    /// * `on` - The absolute date `day` resolves to; sources keyed on the
    ///   day of the week need it
    fn build_url(&self, style: Style, day: RelativeDay, sign: Sign, on: NaiveDate) -> String;
}

/// HTML extraction rule for one source
pub trait PageParser {
    /// Extracts the horoscope text and page date from a response body
    ///
    /// # Arguments
    /// * `html` - The response body
    /// * `on` - The absolute date the requested day resolves to
    fn parse_page(&self, html: &str, on: NaiveDate) -> Result<Document, FetchError>;
}

/// The full set of per-source rules, composed from the two capabilities
pub trait ProviderRules: UrlBuilder + PageParser + Send + Sync {}

impl<T: UrlBuilder + PageParser + Send + Sync> ProviderRules for T {}

/// Returns the rules for a source
pub fn rules(source: Source) -> &'static dyn ProviderRules {
    match source {
        Source::AstrologyCom => &astrology_com::AstrologyCom,
        Source::Astrostyle => &astrostyle::Astrostyle,
        Source::HoroscopeCom => &horoscope_com::HoroscopeCom,
    }
}

/// Seam between the synchronizer and the network
///
/// Production code uses [`HttpFetcher`]; tests substitute a scripted
/// implementation.
#[async_trait]
pub trait HoroscopeFetcher: Send + Sync {
    /// Fetches one horoscope document
    ///
    /// # Arguments
    /// * `source` - Source to fetch from
    /// * `style` - Requested style; unsupported styles fall back to the
    ///   source's default
    /// * `day` - Relative day slot
    /// * `sign` - Zodiac sign
    /// * `today` - Reference date used to resolve `day`
    async fn fetch_document(
        &self,
        source: Source,
        style: Style,
        day: RelativeDay,
        sign: Sign,
        today: NaiveDate,
    ) -> Result<Document, FetchError>;
}

/// HTTP-backed fetcher with bounded timeouts and per-call retry
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    response_cache: Option<ResponseCache>,
    /// When set, replaces the scheme and host of every built URL
    base_url: Option<String>,
}

impl HttpFetcher {
    /// Creates a fetcher with the default timeouts and no response cache
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            response_cache: None,
            base_url: None,
        })
    }

    /// Attaches a response cache so that each URL is fetched at most once
    /// between upstream publication times
    pub fn with_response_cache(mut self, cache: ResponseCache) -> Self {
        self.response_cache = Some(cache);
        self
    }

    /// Creates a fetcher from an existing HTTP client (for testing)
    #[cfg(test)]
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            response_cache: None,
            base_url: None,
        }
    }

    /// Redirects every request to the given base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = Some(base.into());
        self
    }

    /// Applies the base URL override, keeping the path and query
    fn rewrite_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) => {
                let path = url.splitn(4, '/').nth(3).unwrap_or("");
                format!("{}/{}", base.trim_end_matches('/'), path)
            }
            None => url.to_string(),
        }
    }

    /// Retrieves a page body, consulting the response cache first
    async fn get_page(&self, url: &str) -> Result<String, FetchError> {
        let url = self.rewrite_url(url);
        let url = url.as_str();

        if let Some(cache) = &self.response_cache {
            if let Some(body) = cache.get(url) {
                debug!(url, "response cache hit");
                return Ok(body);
            }
        }

        debug!(url, "fetching");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text().await?;

        if let Some(cache) = &self.response_cache {
            cache.put(url, &body);
        }
        Ok(body)
    }

    /// Fetches and parses once, without retry
    async fn fetch_once(
        &self,
        source: Source,
        style: Style,
        day: RelativeDay,
        sign: Sign,
        on: NaiveDate,
    ) -> Result<Document, FetchError> {
        let rules = rules(source);
        let url = rules.build_url(style, day, sign, on);
        let body = self.get_page(&url).await?;
        rules.parse_page(&body, on)
    }

    /// Eagerly warms every Source x Style x RelativeDay x Sign URL
    ///
    /// Requests run concurrently with a bounded fan-out; individual failures
    /// are logged and do not abort the others. Only useful when a response
    /// cache is attached.
    pub async fn precache(&self, today: NaiveDate, concurrency: usize) {
        let mut urls = Vec::new();
        for source in Source::ALL {
            for &style in source.styles() {
                for day in RelativeDay::ALL {
                    let on = day.resolve(today);
                    for sign in Sign::ALL {
                        urls.push(rules(source).build_url(style, day, sign, on));
                    }
                }
            }
        }
        self.warm_urls(urls, concurrency).await;
    }

    /// Fetches every URL in the list, logging and swallowing failures
    async fn warm_urls(&self, urls: Vec<String>, concurrency: usize) {
        use futures::stream::{self, StreamExt};

        stream::iter(urls)
            .map(|url| async move {
                if let Err(e) = self.get_page(&url).await {
                    warn!(url, error = %e, "precache fetch failed");
                }
            })
            .buffer_unordered(concurrency.max(1))
            .collect::<Vec<()>>()
            .await;
    }
}

#[async_trait]
impl HoroscopeFetcher for HttpFetcher {
    async fn fetch_document(
        &self,
        source: Source,
        style: Style,
        day: RelativeDay,
        sign: Sign,
        today: NaiveDate,
    ) -> Result<Document, FetchError> {
        let style = source.supported_style(style);
        let on = day.resolve(today);

        let mut last_err = None;
        for attempt in 1..=MAX_ATTEMPTS {
            debug!(
                source = source.display_name(),
                sign = sign.name(),
                day = day.name(),
                attempt,
                "fetch attempt"
            );
            match self.fetch_once(source, style, day, sign, on).await {
                Ok(doc) => return Ok(doc),
                Err(e) => {
                    debug!(error = %e, "bad fetch");
                    last_err = Some(e);
                }
            }
        }
        // MAX_ATTEMPTS >= 1, so last_err is always set here
        Err(last_err.unwrap_or(FetchError::ElementNotFound("body")))
    }
}

/// Parses a page date with a source-specific format
pub(crate) fn parse_page_date(raw: &str, format: &str) -> Result<NaiveDate, FetchError> {
    NaiveDate::parse_from_str(raw.trim(), format)
        .map_err(|_| FetchError::BadDate(raw.trim().to_string()))
}
