//! Deploy Cloud Run Services and Jobs from Knative-style manifests.
//!
//! The [`Deployer`](run::Deployer) reads each manifest, decides whether it is
//! a Service or a Job, and creates or replaces the matching Cloud Run
//! resource. Its identity is then handed to the log, accessor and status
//! collaborators.

pub mod config;
pub mod error;
pub mod gcp;
pub mod run;

pub use error::{DeployError, ErrorCode};
