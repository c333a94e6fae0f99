//! HTTP access to service listing endpoints

use std::collections::HashSet;
use std::fs;

use reqwest::{Certificate, Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::clouds::Cloud;
use super::identity::Session;
use crate::errors::{CheckError, Result};
use crate::services::ServiceRecord;

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Build the HTTP client honouring the cloud's TLS settings.
pub fn http_client(cloud: &Cloud) -> Result<Client> {
    let mut builder = Client::builder().user_agent(format!(
        "openstack-service-check/{}",
        env!("CARGO_PKG_VERSION")
    ));

    if cloud.verify == Some(false) {
        warn!("TLS certificate verification is disabled for this cloud");
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(cacert) = &cloud.cacert {
        let pem = fs::read(cacert).map_err(|e| CheckError::io(cacert, e))?;
        builder = builder.add_root_certificate(Certificate::from_pem(&pem)?);
    }

    Ok(builder.build()?)
}

/// Authenticated client bound to one service endpoint.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    token: String,
    endpoint: String,
}

impl ServiceClient {
    pub fn new(http: Client, token: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            token: token.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Resolve the endpoint for `R` from the session catalog.
    pub fn for_record<R: ServiceRecord>(http: Client, session: &Session) -> Result<Self> {
        let endpoint = session.endpoint_for(R::LISTING.service_types)?;
        Ok(Self::new(http, session.token.clone(), endpoint))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// List every record, following page links until the listing ends.
    pub async fn list<R: ServiceRecord>(&self) -> Result<Vec<R>> {
        let listing = R::LISTING;
        let mut url = listing.url(&self.endpoint);
        let mut records = Vec::new();
        let mut visited = HashSet::new();

        loop {
            visited.insert(url.clone());

            let Some(mut body) = self.fetch_page(&url, listing.microversion).await? else {
                break;
            };

            let page: Vec<R> = match body.get_mut(listing.collection).map(Value::take) {
                None | Some(Value::Null) => Vec::new(),
                Some(items) => serde_json::from_value(items)?,
            };
            debug!("Page {} held {} {}", url, page.len(), listing.collection);

            if page.is_empty() {
                break;
            }
            records.extend(page);

            match listing.pagination.next_url(&body) {
                Some(next) if !visited.contains(&next) => url = next,
                Some(next) => {
                    warn!("Page link {} was already listed, stopping", next);
                    break;
                }
                None => break,
            }
        }

        Ok(records)
    }

    /// GET one page. `None` means the server reported no content.
    async fn fetch_page(
        &self,
        url: &str,
        microversion: Option<(&str, &str)>,
    ) -> Result<Option<Value>> {
        let mut request = self
            .http
            .get(url)
            .header(AUTH_TOKEN_HEADER, &self.token)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some((name, value)) = microversion {
            request = request.header(name, value);
        }

        debug!("GET {}", url);
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            debug!("GET {} -> {} (empty listing)", url, status);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(self.status_error(response, url).await);
        }

        let text = response.text().await?;
        debug!("GET {} -> {} ({} bytes)", url, status, text.len());

        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    async fn status_error(&self, response: Response, url: &str) -> CheckError {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let message = match status.as_u16() {
            400 => format!("Bad request for {}: {}", url, error_body),
            401 => format!("Unauthorized for {}: {}", url, error_body),
            403 => format!("Forbidden for {}: {}", url, error_body),
            404 => format!("Listing endpoint {} not found: {}", url, error_body),
            406 => format!("Microversion not acceptable for {}: {}", url, error_body),
            500..=599 => format!("Server error for {}: {}", url, error_body),
            _ => format!("Unexpected response {} for {}: {}", status, url, error_body),
        };

        CheckError::Transport(message)
    }
}
