//! Backend client: fetches list pages through the home-automation service API.
//!
//! Every list kind maps to one service call:
//! `POST {base_url}/api/services/{domain}/{service}?return_response`
//! with a JSON body naming the player entity and paging. The service answers
//! with `{ "service_response": { "items": [...], "date_last_refreshed": <epoch> } }`.

use std::time::Duration;

use futures_util::future::LocalBoxFuture;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use media_proto::config::BackendConfig;
use media_proto::protocol::{ListKind, MediaItem};

use crate::fetch::{FetchError, FetchRequest, FetchedPage, ListFetcher};

#[derive(Debug, Deserialize)]
struct ServiceEnvelope {
    service_response: ServicePayload,
}

#[derive(Debug, Deserialize)]
struct ServicePayload {
    #[serde(default)]
    items: Vec<MediaItem>,
    /// Epoch seconds, possibly fractional.
    #[serde(default)]
    date_last_refreshed: Option<f64>,
}

pub struct HttpListFetcher {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    domain: String,
    entity_id: String,
}

impl HttpListFetcher {
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.resolved_token(),
            domain: config.domain.clone(),
            entity_id: config.entity_id.clone(),
        })
    }

    fn service_url(&self, kind: ListKind) -> String {
        format!(
            "{}/api/services/{}/{}?return_response",
            self.base_url,
            self.domain,
            kind.service()
        )
    }

    fn request_body(&self, request: &FetchRequest) -> serde_json::Value {
        let mut body = json!({
            "entity_id": self.entity_id,
            "limit_total": request.paging.limit,
            "offset": request.paging.offset,
        });
        if let (Some(scope), ListKind::CategoryPlaylists) = (&request.scope, request.kind) {
            body["category_id"] = json!(scope);
        }
        body
    }

    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        let url = self.service_url(request.kind);
        debug!("POST {}", url);

        let mut builder = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&self.request_body(request));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail = detail.trim();
            return Err(FetchError::Domain(if detail.is_empty() {
                format!("backend returned status: {}", status)
            } else {
                format!("backend returned status: {} ({})", status, detail)
            }));
        }

        let envelope: ServiceEnvelope = response
            .json()
            .await
            .map_err(|e| FetchError::Domain(format!("unexpected response: {}", e)))?;

        Ok(FetchedPage {
            items: envelope.service_response.items,
            server_timestamp: envelope
                .service_response
                .date_last_refreshed
                .map(|ts| ts as i64)
                .filter(|ts| *ts > 0),
        })
    }
}

impl ListFetcher for HttpListFetcher {
    fn fetch_list(&self, request: FetchRequest) -> LocalBoxFuture<'_, Result<FetchedPage, FetchError>> {
        Box::pin(async move { self.fetch(&request).await })
    }
}
