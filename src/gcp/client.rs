//! Cloud Run client
//!
//! Combines authentication and HTTP functionality into a client for the
//! Cloud Run Admin API (v1), which serves Services through the
//! `projects.locations.services` surface and Jobs through the Knative-style
//! `namespaces.jobs` surface.

use super::auth::GcpCredentials;
use super::http::{ApiError, GcpHttpClient};
use crate::config::ClientOptions;
use crate::run::api::{Connector, RunApi};
use crate::run::manifest::ResourceDocument;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Cloud Run Admin API client
#[derive(Clone)]
pub struct RunClient {
    credentials: GcpCredentials,
    http: GcpHttpClient,
    endpoint: String,
}

impl RunClient {
    /// Create a client talking to the regional endpoint, unless the options
    /// override it
    pub async fn new(region: &str, options: &ClientOptions) -> Result<Self, ApiError> {
        let credentials = match &options.access_token {
            Some(token) => GcpCredentials::from_access_token(token.clone()),
            None => GcpCredentials::new().await?,
        };

        Self::with_credentials(credentials, region, options)
    }

    pub fn with_credentials(
        credentials: GcpCredentials,
        region: &str,
        options: &ClientOptions,
    ) -> Result<Self, ApiError> {
        let endpoint = options.endpoint_for(region);
        let parsed = Url::parse(&endpoint).map_err(|e| ApiError::Endpoint(format!("{endpoint}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::Endpoint(endpoint));
        }

        let http = GcpHttpClient::new(&options.user_agent)?;

        Ok(Self {
            credentials,
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build a `v1/...` URL (projects.locations.services)
    pub fn services_url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.endpoint, path)
    }

    /// Build an `apis/run.googleapis.com/v1/...` URL (namespaces.jobs)
    pub fn jobs_url(&self, path: &str) -> String {
        format!("{}/apis/run.googleapis.com/v1/{}", self.endpoint, path)
    }

    async fn get(&self, url: &str) -> Result<Value, ApiError> {
        let token = self.credentials.get_token().await?;
        self.http.get(url, &token).await
    }

    async fn post(&self, url: &str, body: &ResourceDocument) -> Result<Value, ApiError> {
        let token = self.credentials.get_token().await?;
        self.http.post(url, &token, body).await
    }

    async fn put(&self, url: &str, body: &ResourceDocument) -> Result<Value, ApiError> {
        let token = self.credentials.get_token().await?;
        self.http.put(url, &token, body).await
    }

    async fn delete(&self, url: &str) -> Result<Value, ApiError> {
        let token = self.credentials.get_token().await?;
        self.http.delete(url, &token).await
    }
}

#[async_trait]
impl RunApi for RunClient {
    async fn get_service(&self, name: &str) -> Result<Value, ApiError> {
        self.get(&self.services_url(name)).await
    }

    async fn create_service(&self, parent: &str, body: &ResourceDocument) -> Result<Value, ApiError> {
        self.post(&self.services_url(&format!("{}/services", parent)), body)
            .await
    }

    async fn replace_service(&self, name: &str, body: &ResourceDocument) -> Result<Value, ApiError> {
        self.put(&self.services_url(name), body).await
    }

    async fn delete_service(&self, name: &str) -> Result<Value, ApiError> {
        self.delete(&self.services_url(name)).await
    }

    async fn get_job(&self, name: &str) -> Result<Value, ApiError> {
        self.get(&self.jobs_url(name)).await
    }

    async fn create_job(&self, parent: &str, body: &ResourceDocument) -> Result<Value, ApiError> {
        self.post(&self.jobs_url(&format!("{}/jobs", parent)), body)
            .await
    }

    async fn replace_job(&self, name: &str, body: &ResourceDocument) -> Result<Value, ApiError> {
        self.put(&self.jobs_url(name), body).await
    }
}

/// Builds [`RunClient`]s from Application Default Credentials or a static token
#[derive(Debug, Clone, Copy, Default)]
pub struct GcpConnector;

#[async_trait]
impl Connector for GcpConnector {
    async fn connect(&self, region: &str, options: &ClientOptions) -> Result<Arc<dyn RunApi>, ApiError> {
        let client = RunClient::new(region, options).await?;
        tracing::debug!("Cloud Run client ready for {}", client.endpoint());
        let client: Arc<dyn RunApi> = Arc::new(client);
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(endpoint: Option<&str>) -> ClientOptions {
        ClientOptions {
            endpoint: endpoint.map(|s| s.to_string()),
            access_token: Some("token".to_string()),
            ..ClientOptions::default()
        }
    }

    #[test]
    fn test_regional_endpoint_urls() {
        let client = RunClient::with_credentials(
            GcpCredentials::from_access_token("token"),
            "us-central1",
            &options(None),
        )
        .unwrap();

        assert_eq!(
            client.services_url("projects/p/locations/us-central1/services/web"),
            "https://us-central1-run.googleapis.com/v1/projects/p/locations/us-central1/services/web"
        );
        assert_eq!(
            client.jobs_url("namespaces/p/jobs/batch"),
            "https://us-central1-run.googleapis.com/apis/run.googleapis.com/v1/namespaces/p/jobs/batch"
        );
    }

    #[test]
    fn test_endpoint_override_strips_trailing_slash() {
        let client = RunClient::with_credentials(
            GcpCredentials::from_access_token("token"),
            "us-central1",
            &options(Some("http://127.0.0.1:8080/")),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let result = RunClient::with_credentials(
            GcpCredentials::from_access_token("token"),
            "us-central1",
            &options(Some("not a url")),
        );
        assert!(matches!(result, Err(ApiError::Endpoint(_))));
    }
}
