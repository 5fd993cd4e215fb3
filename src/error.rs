//! Deployer error types
//!
//! Every failure the deployer reports carries a short human message plus a
//! stable [`ErrorCode`] so callers can branch on the condition without
//! matching on text.

use crate::gcp::http::ApiError;
use std::fmt;
use thiserror::Error;

/// Machine-readable error codes reported alongside each failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DeployGetCloudRunClientErr,
    DeployReadManifestErr,
    DeployUnsupportedKindErr,
    DeployCloudRunGetServiceErr,
    DeployCloudRunUpdateServiceErr,
    DeployCloudRunDeleteServiceErr,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DeployGetCloudRunClientErr => "DEPLOY_GET_CLOUD_RUN_CLIENT_ERR",
            ErrorCode::DeployReadManifestErr => "DEPLOY_READ_MANIFEST_ERR",
            ErrorCode::DeployUnsupportedKindErr => "DEPLOY_UNSUPPORTED_KIND_ERR",
            ErrorCode::DeployCloudRunGetServiceErr => "DEPLOY_CLOUD_RUN_GET_SERVICE_ERR",
            ErrorCode::DeployCloudRunUpdateServiceErr => "DEPLOY_CLOUD_RUN_UPDATE_SERVICE_ERR",
            ErrorCode::DeployCloudRunDeleteServiceErr => "DEPLOY_CLOUD_RUN_DELETE_SERVICE_ERR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the Cloud Run deployer
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("unable to create Cloud Run Client: {0}")]
    ClientConstruction(#[source] ApiError),

    #[error("unable to unmarshal Cloud Run config: {0}")]
    ManifestRead(String),

    #[error("unsupported Kind for Cloud Run Deployer: {api_version}/{kind}")]
    UnsupportedKind { api_version: String, kind: String },

    /// No project override and no namespace in the manifest
    #[error("{0}")]
    ProjectUndetermined(&'static str),

    #[error("error checking Cloud Run State: {0}")]
    GetState(#[source] ApiError),

    #[error("error deploying Cloud Run {kind}: {source}")]
    CreateOrUpdate {
        kind: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("unexpected manifest for Cloud Run: expected a single Service manifest, got {0}")]
    ManifestCount(usize),

    #[error("unable to delete Cloud Run Service: {0}")]
    Delete(#[source] ApiError),
}

impl DeployError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DeployError::ClientConstruction(_) => ErrorCode::DeployGetCloudRunClientErr,
            DeployError::ManifestRead(_)
            | DeployError::ProjectUndetermined(_)
            | DeployError::ManifestCount(_) => ErrorCode::DeployReadManifestErr,
            DeployError::UnsupportedKind { .. } => ErrorCode::DeployUnsupportedKindErr,
            DeployError::GetState(_) => ErrorCode::DeployCloudRunGetServiceErr,
            DeployError::CreateOrUpdate { .. } => ErrorCode::DeployCloudRunUpdateServiceErr,
            DeployError::Delete(_) => ErrorCode::DeployCloudRunDeleteServiceErr,
        }
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
