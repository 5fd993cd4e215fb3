//! Cloud Run reconciliation
//!
//! # Architecture
//!
//! - [`manifest`] - Service/Job documents and kind classification
//! - [`labels`] - run id label flattening
//! - [`name`] - canonical resource identities
//! - [`api`] - remote API and client-construction traits
//! - [`trackers`] - log, accessor and status collaborators
//! - [`deployer`] - get-then-create-or-replace reconciliation and deletion

pub mod api;
pub mod deployer;
pub mod labels;
pub mod manifest;
pub mod name;
pub mod trackers;

pub use deployer::Deployer;
pub use manifest::{ResourceDocument, RunManifest};
pub use name::{RunResourceName, RunTarget};
