//! Remote API seams used by the deployer

use super::manifest::ResourceDocument;
use crate::config::ClientOptions;
use crate::gcp::http::ApiError;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Cloud Run operations the deployer issues
///
/// Names are full resource paths as rendered by
/// [`RunResourceName`](super::name::RunResourceName).
#[async_trait]
pub trait RunApi: Send + Sync {
    async fn get_service(&self, name: &str) -> Result<Value, ApiError>;

    async fn create_service(&self, parent: &str, body: &ResourceDocument) -> Result<Value, ApiError>;

    async fn replace_service(&self, name: &str, body: &ResourceDocument) -> Result<Value, ApiError>;

    async fn delete_service(&self, name: &str) -> Result<Value, ApiError>;

    async fn get_job(&self, name: &str) -> Result<Value, ApiError>;

    async fn create_job(&self, parent: &str, body: &ResourceDocument) -> Result<Value, ApiError>;

    async fn replace_job(&self, name: &str, body: &ResourceDocument) -> Result<Value, ApiError>;
}

/// Constructs [`RunApi`] clients
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, region: &str, options: &ClientOptions) -> Result<Arc<dyn RunApi>, ApiError>;
}

/// Run `call` until it finishes or `cancel` fires
pub async fn cancellable<T, F>(cancel: &CancellationToken, call: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ApiError::Cancelled),
        result = call => result,
    }
}
