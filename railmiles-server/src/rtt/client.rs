//! RTT HTTP client.
//!
//! Service discovery uses the authenticated JSON API; mileage comes from
//! scraping the public detailed service page, which is the only place RTT
//! publishes it.

use std::future::Future;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::NaiveDate;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::debug;

use crate::domain::{Crs, ServiceUid};

use super::Timetable;
use super::convert::convert_search_response;
use super::error::RttError;
use super::scrape::extract_waypoints;
use super::types::{CandidateService, SearchResponse, Waypoint};

/// Default base URL for the RTT JSON API.
const DEFAULT_API_BASE_URL: &str = "https://api.rtt.io";

/// Default base URL for the RTT website.
const DEFAULT_WEB_BASE_URL: &str = "https://www.realtimetrains.co.uk";

/// Configuration for the RTT client.
#[derive(Debug, Clone)]
pub struct RttConfig {
    /// API username for basic authentication
    pub username: String,
    /// API password for basic authentication
    pub password: String,
    /// Base URL for the JSON API
    pub api_base_url: String,
    /// Base URL for the website (service detail pages)
    pub web_base_url: String,
    /// Timeout for a service search
    pub search_timeout: Duration,
    /// Timeout for fetching a service detail page
    pub page_timeout: Duration,
}

impl RttConfig {
    /// Create a new config with the given API credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            web_base_url: DEFAULT_WEB_BASE_URL.to_string(),
            search_timeout: Duration::from_secs(5),
            page_timeout: Duration::from_secs(10),
        }
    }

    /// Set custom base URLs (for testing).
    pub fn with_base_urls(mut self, api: impl Into<String>, web: impl Into<String>) -> Self {
        self.api_base_url = api.into();
        self.web_base_url = web.into();
        self
    }

    /// Set request timeouts.
    pub fn with_timeouts(mut self, search: Duration, page: Duration) -> Self {
        self.search_timeout = search;
        self.page_timeout = page;
        self
    }
}

/// RTT client.
#[derive(Debug, Clone)]
pub struct RttClient {
    http: reqwest::Client,
    auth: HeaderValue,
    api_base_url: String,
    web_base_url: String,
    search_timeout: Duration,
    page_timeout: Duration,
}

impl RttClient {
    /// Create a new RTT client with the given configuration.
    pub fn new(config: RttConfig) -> Result<Self, RttError> {
        let credentials = BASE64.encode(format!("{}:{}", config.username, config.password));
        let mut auth = HeaderValue::from_str(&format!("Basic {credentials}"))
            .map_err(|_| RttError::Config("credentials are not valid header text".to_string()))?;
        auth.set_sensitive(true);

        let http = reqwest::Client::builder()
            .user_agent(concat!("railmiles/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            auth,
            api_base_url: config.api_base_url,
            web_base_url: config.web_base_url,
            search_timeout: config.search_timeout,
            page_timeout: config.page_timeout,
        })
    }

    /// Search for services calling at `from` then `to` on `date`.
    pub async fn search_services(
        &self,
        from: &Crs,
        to: &Crs,
        date: NaiveDate,
    ) -> Result<Vec<CandidateService>, RttError> {
        let url = format!(
            "{}/api/v1/json/search/{}/to/{}/{}",
            self.api_base_url,
            from.as_str(),
            to.as_str(),
            date.format("%Y/%m/%d"),
        );
        debug!(%url, "searching services");

        let body = with_timeout("service search", self.search_timeout, async {
            let response = self
                .http
                .get(&url)
                .header(AUTHORIZATION, self.auth.clone())
                .send()
                .await?;
            let response = check_status(response).await?;
            Ok::<_, RttError>(response.text().await?)
        })
        .await?;

        let response: SearchResponse =
            serde_json::from_str(&body).map_err(|e| RttError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        Ok(convert_search_response(response))
    }

    /// Fetch the detailed page of a service and extract its waypoints.
    pub async fn service_waypoints(
        &self,
        uid: &ServiceUid,
        date: NaiveDate,
    ) -> Result<Vec<Waypoint>, RttError> {
        let url = format!(
            "{}/service/gb-nr:{}/{}/detailed",
            self.web_base_url,
            uid.as_str(),
            date.format("%Y-%m-%d"),
        );
        debug!(%url, "fetching service page");

        let html = with_timeout("service page fetch", self.page_timeout, async {
            let response = self.http.get(&url).send().await?;
            let response = check_status(response).await?;
            Ok::<_, RttError>(response.text().await?)
        })
        .await?;

        Ok(extract_waypoints(&html))
    }
}

impl Timetable for RttClient {
    async fn search(
        &self,
        from: &Crs,
        to: &Crs,
        date: NaiveDate,
    ) -> Result<Vec<CandidateService>, RttError> {
        self.search_services(from, to, date).await
    }

    async fn waypoints(&self, uid: &ServiceUid, date: NaiveDate) -> Result<Vec<Waypoint>, RttError> {
        self.service_waypoints(uid, date).await
    }
}

/// Run `fut`, abandoning it after `after`.
async fn with_timeout<T>(
    what: &'static str,
    after: Duration,
    fut: impl Future<Output = Result<T, RttError>>,
) -> Result<T, RttError> {
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| RttError::Timeout { what, after })?
}

/// Map error statuses to `RttError`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RttError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(RttError::Unauthorized);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(RttError::RateLimited);
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(RttError::NotFound);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RttError::Api {
            status: status.as_u16(),
            message: body.chars().take(500).collect(),
        });
    }

    Ok(response)
}
