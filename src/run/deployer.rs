//! Cloud Run deployer
//!
//! Reconciles Service and Job manifests against Cloud Run: each manifest is
//! classified, pinned to a project, relabelled, and then either created or
//! replaced depending on whether the resource already exists.

use super::api::{cancellable, Connector, RunApi};
use super::manifest::{ResourceDocument, RunManifest};
use super::name::{RunResourceName, RunTarget};
use super::trackers::{LogAggregator, RunAccessor, StatusMonitor};
use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::gcp::client::GcpConnector;
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const NO_PROJECT_TO_DEPLOY: &str = "unable to detect project for Cloud Run: \
     no Google Cloud project found in Cloud Run manifest or deployer config";

const NO_PROJECT_TO_DELETE: &str = "unable to determine Google Cloud Project: \
     no Google Cloud project found in Cloud Run manifest or deployer config";

/// Deploys Services and Jobs to Cloud Run
pub struct Deployer {
    config: DeployConfig,
    connector: Arc<dyn Connector>,
    logger: LogAggregator,
    accessor: RunAccessor,
    monitor: StatusMonitor,
}

impl Deployer {
    /// Create a deployer that authenticates through [`GcpConnector`]
    pub fn new(config: DeployConfig, run_id: &str) -> Self {
        Self::with_connector(config, run_id, Arc::new(GcpConnector))
    }

    pub fn with_connector(config: DeployConfig, run_id: &str, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            logger: LogAggregator::new(run_id),
            accessor: RunAccessor::new(run_id),
            monitor: StatusMonitor::new(),
        }
    }

    pub fn config_name(&self) -> &str {
        &self.config.config_name
    }

    /// Files that would trigger a redeploy. Cloud Run manifests carry none.
    pub fn dependencies(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    pub fn logger(&self) -> &LogAggregator {
        &self.logger
    }

    pub fn accessor(&self) -> &RunAccessor {
        &self.accessor
    }

    pub fn monitor(&self) -> &StatusMonitor {
        &self.monitor
    }

    /// Deploy `manifests` in order, stopping at the first failure
    pub async fn deploy(
        &mut self,
        cancel: &CancellationToken,
        out: &mut dyn Write,
        manifests: &[Vec<u8>],
    ) -> Result<()> {
        if manifests.is_empty() {
            return Ok(());
        }

        tracing::info!(
            config = %self.config.config_name,
            "deploying {} manifest(s) to Cloud Run in {}",
            manifests.len(),
            self.config.region
        );

        let client = self.connect(cancel).await?;
        for manifest in manifests {
            self.deploy_manifest(cancel, out, client.as_ref(), manifest)
                .await?;
        }
        Ok(())
    }

    /// Delete the Service described by the single manifest in `manifests`
    pub async fn cleanup(
        &self,
        cancel: &CancellationToken,
        out: &mut dyn Write,
        dry_run: bool,
        manifests: &[Vec<u8>],
    ) -> Result<()> {
        let [manifest] = manifests else {
            return Err(DeployError::ManifestCount(manifests.len()));
        };

        let service = ResourceDocument::from_slice(manifest)?;
        let project = if !self.config.project.is_empty() {
            self.config.project.clone()
        } else if !service.namespace().is_empty() {
            service.namespace().to_string()
        } else {
            return Err(DeployError::ProjectUndetermined(NO_PROJECT_TO_DELETE));
        };

        let name = RunResourceName::service(project, &self.config.region, service.name());
        if dry_run {
            let _ = writeln!(out, "{}", name.to_string().yellow());
            return Ok(());
        }

        let client = self.connect(cancel).await?;
        tracing::info!("deleting {}", name);
        cancellable(cancel, client.delete_service(&name.to_string()))
            .await
            .map_err(DeployError::Delete)?;
        Ok(())
    }

    async fn connect(&self, cancel: &CancellationToken) -> Result<Arc<dyn RunApi>> {
        let connect = self
            .connector
            .connect(&self.config.region, &self.config.client_options);
        cancellable(cancel, connect)
            .await
            .map_err(DeployError::ClientConstruction)
    }

    async fn deploy_manifest(
        &mut self,
        cancel: &CancellationToken,
        out: &mut dyn Write,
        client: &dyn RunApi,
        manifest: &[u8],
    ) -> Result<()> {
        let name = match RunManifest::parse(manifest)? {
            RunManifest::Service(service) => {
                let name = self.deploy_service(cancel, out, client, service).await?;
                // Jobs run to completion, so only services can be port-forwarded
                self.accessor.add_resource(name.clone());
                name
            },
            RunManifest::Job(job) => self.deploy_job(cancel, out, client, job).await?,
        };

        self.monitor.add_resource(name);
        Ok(())
    }

    async fn deploy_service(
        &mut self,
        cancel: &CancellationToken,
        out: &mut dyn Write,
        client: &dyn RunApi,
        mut service: ResourceDocument,
    ) -> Result<RunResourceName> {
        self.prepare(&mut service)?;
        let name = RunResourceName::service(service.namespace(), &self.config.region, service.name());

        let _ = writeln!(out, "Deploying Cloud Run service:\n\t {}", service.name());
        // Registered before the write so logs can attach even if it fails
        self.logger.add_resource(name.clone());

        reconcile(cancel, client, &name, &service).await?;
        Ok(name)
    }

    async fn deploy_job(
        &mut self,
        cancel: &CancellationToken,
        out: &mut dyn Write,
        client: &dyn RunApi,
        mut job: ResourceDocument,
    ) -> Result<RunResourceName> {
        self.prepare(&mut job)?;
        let name = RunResourceName::job(job.namespace(), &self.config.region, job.name());

        let _ = writeln!(out, "Deploying Cloud Run job:\n\t {}", job.name());

        reconcile(cancel, client, &name, &job).await?;
        Ok(name)
    }

    /// Pin the document to a project and flatten its labels
    fn prepare(&self, doc: &mut ResourceDocument) -> Result<()> {
        if doc.name().is_empty() {
            return Err(DeployError::ManifestRead(
                "metadata.name is required".to_string(),
            ));
        }

        if !self.config.project.is_empty() {
            doc.metadata.namespace = self.config.project.clone();
        } else if doc.namespace().is_empty() {
            return Err(DeployError::ProjectUndetermined(NO_PROJECT_TO_DEPLOY));
        }

        doc.translate_labels();
        Ok(())
    }
}

/// Replace `name` if it exists, create it otherwise
async fn reconcile(
    cancel: &CancellationToken,
    client: &dyn RunApi,
    name: &RunResourceName,
    doc: &ResourceDocument,
) -> Result<()> {
    let path = name.to_string();

    let probe = match name.target() {
        RunTarget::Service(_) => client.get_service(&path),
        RunTarget::Job(_) => client.get_job(&path),
    };

    let written = match cancellable(cancel, probe).await {
        Ok(_) => {
            tracing::info!("{} exists, replacing", path);
            let replace = match name.target() {
                RunTarget::Service(_) => client.replace_service(&path, doc),
                RunTarget::Job(_) => client.replace_job(&path, doc),
            };
            cancellable(cancel, replace).await
        },
        Err(err) if err.is_not_found() => {
            let parent = name.parent();
            tracing::info!("{} not found, creating under {}", path, parent);
            let create = match name.target() {
                RunTarget::Service(_) => client.create_service(&parent, doc),
                RunTarget::Job(_) => client.create_job(&parent, doc),
            };
            cancellable(cancel, create).await
        },
        Err(err) => return Err(DeployError::GetState(err)),
    };

    written.map(|_| ()).map_err(|source| DeployError::CreateOrUpdate {
        kind: name.kind(),
        source,
    })
}
