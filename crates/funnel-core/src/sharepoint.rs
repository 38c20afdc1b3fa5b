//! SharePoint REST transport for list item queries
//!
//! Provides:
//! - `ListSource`, the seam between the search service and the wire
//! - `SharePointClient`, a reqwest-backed implementation issuing OData
//!   `items` requests with `odata=nometadata` responses

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::header::{ACCEPT, HeaderValue};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::item::{ListItemsResponse, RawListItem};
use crate::lists::SalesFunnelList;
use crate::odata::ListQuery;

/// Accept header requesting bare JSON without OData metadata
pub const ACCEPT_NOMETADATA: &str = "application/json;odata=nometadata";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Something that can run a filtered items query against one list
#[async_trait]
pub trait ListSource: Send + Sync {
    /// Site the lists live on, used to build item links
    fn site_url(&self) -> &str;

    /// Fetch up to `top` items of `list` matching `filter`, newest first
    async fn fetch_items(
        &self,
        list: SalesFunnelList,
        filter: &str,
        top: u32,
    ) -> Result<Vec<RawListItem>>;
}

/// Client for the SharePoint list REST API
#[derive(Clone)]
pub struct SharePointClient {
    http_client: HttpClient,
    site_url: String,
    access_token: Option<String>,
}

impl std::fmt::Debug for SharePointClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharePointClient")
            .field("site_url", &self.site_url)
            .field("access_token", &self.access_token.is_some())
            .finish()
    }
}

/// Builder for creating a SharePointClient
#[derive(Default)]
pub struct SharePointClientBuilder {
    site_url: Option<String>,
    access_token: Option<String>,
    http_client: Option<HttpClient>,
    timeout_secs: Option<u64>,
}

impl SharePointClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the site URL hosting the lists
    pub fn site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = Some(url.into());
        self
    }

    /// Set a bearer token sent with every request
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Reuse an HTTP client already authenticated by the host
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the request timeout; ignored when an HTTP client is supplied
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the SharePointClient
    pub fn build(self) -> Result<SharePointClient> {
        let site_url = self
            .site_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or(Error::MissingSiteUrl)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => HttpClient::builder()
                .timeout(Duration::from_secs(
                    self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
                ))
                .build()
                .map_err(Error::NetworkError)?,
        };

        Ok(SharePointClient {
            http_client,
            site_url,
            access_token: self.access_token,
        })
    }
}

impl SharePointClient {
    pub fn builder() -> SharePointClientBuilder {
        SharePointClientBuilder::new()
    }

    /// Create a client from configuration, with the host's site as fallback
    pub fn from_config(config: &Config, host_site_url: Option<&str>) -> anyhow::Result<Self> {
        let site_url = config.web_part.resolved_site_url(host_site_url)?;
        let mut builder = Self::builder()
            .site_url(site_url)
            .timeout_secs(config.search.timeout_secs);

        if let Some(token) = config.web_part.resolved_access_token()? {
            builder = builder.access_token(token);
        }

        Ok(builder.build()?)
    }
}

#[async_trait]
impl ListSource for SharePointClient {
    fn site_url(&self) -> &str {
        &self.site_url
    }

    async fn fetch_items(
        &self,
        list: SalesFunnelList,
        filter: &str,
        top: u32,
    ) -> Result<Vec<RawListItem>> {
        let url = ListQuery::new(list, filter).with_top(top).url(&self.site_url);

        debug!(list = %list, top, "Sending list items request");

        let mut request = self
            .http_client
            .get(&url)
            .header(ACCEPT, HeaderValue::from_static(ACCEPT_NOMETADATA))
            .header("odata-version", "");
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(Error::NetworkError)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ListUnavailable {
                list: list.to_string(),
                status: status.as_u16(),
            });
        }

        let body: ListItemsResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("list '{}': {}", list, e)))?;

        Ok(body.value)
    }
}
