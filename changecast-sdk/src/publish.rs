use changecast_core::{ChangelogDocument, Error, Result};
use chrono::Utc;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

const SERVICE: &str = "changelog server";

/// Client for a running `changecast serve` endpoint.
#[derive(Debug, Clone)]
pub struct PublishClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct PublishRequest<'a> {
    title: &'a str,
    content: &'a str,
    date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishReceipt {
    pub id: String,
}

impl PublishClient {
    /// Create a new publishing client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the changelog server (e.g., "http://localhost:3040")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Publish a changelog; the server answers 201 Created on success
    pub async fn publish(&self, document: &ChangelogDocument) -> Result<PublishReceipt> {
        let request = PublishRequest {
            title: &document.title,
            content: &document.content,
            date: Utc::now().to_rfc3339(),
        };

        let response = self
            .client
            .post(format!("{}/changelogs", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::NoResponse {
                service: SERVICE.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Publish(format!("{} returned {}: {}", SERVICE, status, body)));
        }

        let receipt: PublishReceipt = response
            .json()
            .await
            .map_err(|e| Error::Publish(format!("unexpected response: {}", e)))?;

        info!("Published \"{}\" as {}", document.title, receipt.id);
        Ok(receipt)
    }

    /// Check server health
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await;

        Ok(matches!(response, Ok(r) if r.status().is_success()))
    }
}
