//! # Dataplane Client
//!
//! The dataplane is the workflow's metadata store: operators persist their
//! results there, keyed by asset, operator name and workflow execution.
//!
//! ## Request:
//! `POST {endpoint}/metadata/{asset_id}`
//! ```json
//! {"OperatorName": "WordFrequency", "WorkflowId": "w1", "Results": {"Results": {"hello": 2}}}
//! ```
//!
//! ## Response:
//! A JSON document; the store succeeded only if it carries `"Status": "Success"`.
//! Interpreting the response is left to the caller, so this client returns it
//! as-is.

use crate::config::ClientConfig;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;

/// Persists operator results as asset metadata.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Store `payload` for the asset and return the store's response document.
    async fn store_asset_metadata(
        &self,
        asset_id: &str,
        operator_name: &str,
        workflow_id: &str,
        payload: &Value,
    ) -> anyhow::Result<Value>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct StoreMetadataRequest<'a> {
    operator_name: &'a str,
    workflow_id: &'a str,
    results: &'a Value,
}

/// HTTP client for the dataplane API.
#[derive(Clone)]
pub struct DataplaneClient {
    endpoint: String,
    http: Client,
}

impl DataplaneClient {
    pub fn new(endpoint: impl Into<String>, http: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }

    /// Build a client for `endpoint` using the shared client configuration.
    pub fn from_config(endpoint: &str, client_config: &ClientConfig) -> anyhow::Result<Self> {
        Ok(Self::new(endpoint, client_config.build_http_client()?))
    }

    fn metadata_url(&self, asset_id: &str) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.endpoint)
            .with_context(|| format!("invalid dataplane endpoint '{}'", self.endpoint))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("dataplane endpoint cannot be a base URL"))?
            .pop_if_empty()
            .push("metadata")
            .push(asset_id);
        Ok(url)
    }
}

#[async_trait]
impl MetadataStore for DataplaneClient {
    async fn store_asset_metadata(
        &self,
        asset_id: &str,
        operator_name: &str,
        workflow_id: &str,
        payload: &Value,
    ) -> anyhow::Result<Value> {
        let url = self.metadata_url(asset_id)?;
        let request = StoreMetadataRequest {
            operator_name,
            workflow_id,
            results: payload,
        };

        tracing::debug!(url = %url, operator = operator_name, "Storing asset metadata");

        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .context("dataplane request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("HTTP error: {} - {}", status, detail));
        }

        let body: Value = response
            .json()
            .await
            .context("dataplane returned an invalid JSON body")?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_url() {
        let client = DataplaneClient::new("https://dataplane.example.com/api", Client::new());
        let url = client.metadata_url("asset 1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://dataplane.example.com/api/metadata/asset%201"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let results = json!({"Results": {"hello": 2}});
        let request = StoreMetadataRequest {
            operator_name: "WordFrequency",
            workflow_id: "wf-1",
            results: &results,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "OperatorName": "WordFrequency",
                "WorkflowId": "wf-1",
                "Results": {"Results": {"hello": 2}}
            })
        );
    }
}
