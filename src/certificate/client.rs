//! Certificate lookup API client.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::config::Config;
use crate::error::UpstreamError;
use crate::metrics;

/// Pass-through client for the third-party certificate lookup API.
#[derive(Debug, Clone)]
pub struct CertificateClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL of the lookup API.
    base: Option<String>,
    /// Tab (sheet) identifier.
    tab: Option<String>,
    /// Column searched for the certificate number.
    search_key: Option<String>,
}

impl CertificateClient {
    /// Create a client from config.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base: config.cert_api_base.clone(),
            tab: config.cert_api_tab.clone(),
            search_key: config.cert_api_search_key.clone(),
        })
    }

    /// Build the search URL for a certificate number.
    ///
    /// `{base}/search?sheet={tab}&{search_key}={number}`. Each component is
    /// percent-encoded, with spaces as `%20` rather than `+`.
    pub fn lookup_url(&self, number: &str) -> Result<Url, UpstreamError> {
        let base = self
            .base
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("CERT_API_BASE"))?;
        let tab = self
            .tab
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("CERT_API_TAB"))?;
        let search_key = self
            .search_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("CERT_API_SEARCH_KEY"))?;

        let mut url = Url::parse(base)?;
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidBase(base.to_string()))?
            .pop_if_empty()
            .push("search");
        url.query_pairs_mut()
            .append_pair("sheet", tab)
            .append_pair(search_key, number);

        // A literal '+' is already escaped as %2B, so any remaining '+' is a space.
        let query = url.query().map(|q| q.replace('+', "%20"));
        url.set_query(query.as_deref());

        Ok(url)
    }

    /// Look up a certificate and return the upstream JSON unchanged.
    #[instrument(skip(self))]
    pub async fn lookup(&self, number: &str) -> Result<Value, UpstreamError> {
        let url = self.lookup_url(number)?;
        let _timer = metrics::timer_upstream_lookup();

        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| UpstreamError::Parse(e.to_string()))?;

        debug!(bytes = body.len(), "Certificate lookup succeeded");
        Ok(value)
    }
}
