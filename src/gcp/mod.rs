//! GCP API interaction module
//!
//! This module provides the plumbing for talking to Google Cloud Platform
//! APIs: authentication, the HTTP layer, and the Cloud Run client.
//!
//! # Module Structure
//!
//! - [`auth`] - GCP authentication using Application Default Credentials
//! - [`client`] - Cloud Run Admin API client
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use crdeploy::config::ClientOptions;
//! use crdeploy::gcp::client::RunClient;
//! use crdeploy::run::api::RunApi;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = RunClient::new("us-central1", &ClientOptions::default()).await?;
//!     let service = client
//!         .get_service("projects/my-project/locations/us-central1/services/web")
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
