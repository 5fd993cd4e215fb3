//! Cloud Run manifests
//!
//! Manifests are YAML or JSON documents in the Knative resource shape. Only
//! the fields the deployer reads or rewrites are typed; everything else is
//! carried through untouched so a replace sends the full document.

use super::labels::translate_run_id;
use crate::error::{DeployError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const SERVICE_API_VERSION: &str = "serving.knative.dev/v1";
pub const SERVICE_KIND: &str = "Service";
pub const JOB_API_VERSION: &str = "run.googleapis.com/v1";
pub const JOB_KIND: &str = "Job";

/// apiVersion/kind header shared by every manifest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Project id (or number) the resource lives in
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateSpec>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Revision template (services) or execution template (jobs)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMeta>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A Cloud Run Service or Job document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDocument {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<ResourceSpec>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceDocument {
    pub fn from_slice(manifest: &[u8]) -> Result<Self> {
        serde_yaml::from_slice(manifest).map_err(|e| DeployError::ManifestRead(e.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn template_labels(&self) -> Option<&BTreeMap<String, String>> {
        self.spec
            .as_ref()?
            .template
            .as_ref()?
            .metadata
            .as_ref()?
            .labels
            .as_ref()
    }

    /// Flatten the run id label at the top level and on the template
    pub fn translate_labels(&mut self) {
        if let Some(labels) = self.metadata.labels.as_mut() {
            translate_run_id(labels);
        }
        if let Some(labels) = self
            .spec
            .as_mut()
            .and_then(|spec| spec.template.as_mut())
            .and_then(|template| template.metadata.as_mut())
            .and_then(|metadata| metadata.labels.as_mut())
        {
            translate_run_id(labels);
        }
    }
}

/// A manifest the deployer knows how to reconcile
#[derive(Debug, Clone, PartialEq)]
pub enum RunManifest {
    Service(ResourceDocument),
    Job(ResourceDocument),
}

impl RunManifest {
    /// Classify `manifest` by apiVersion/kind and parse it into the matching
    /// variant
    pub fn parse(manifest: &[u8]) -> Result<Self> {
        let type_meta: TypeMeta = serde_yaml::from_slice(manifest)
            .map_err(|e| DeployError::ManifestRead(e.to_string()))?;

        match (type_meta.api_version.as_str(), type_meta.kind.as_str()) {
            (SERVICE_API_VERSION, SERVICE_KIND) => {
                ResourceDocument::from_slice(manifest).map(RunManifest::Service)
            },
            (JOB_API_VERSION, JOB_KIND) => ResourceDocument::from_slice(manifest).map(RunManifest::Job),
            _ => Err(DeployError::UnsupportedKind {
                api_version: type_meta.api_version,
                kind: type_meta.kind,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    const SERVICE: &str = r#"
apiVersion: serving.knative.dev/v1
kind: Service
metadata:
  name: web
  namespace: proj1
  labels:
    skaffold.dev/run-id: abc
    app: web
  annotations:
    run.googleapis.com/ingress: all
spec:
  template:
    metadata:
      labels:
        skaffold.dev/run-id: abc
    spec:
      containers:
      - image: gcr.io/proj1/web:latest
"#;

    #[test]
    fn test_parse_service() {
        let RunManifest::Service(doc) = RunManifest::parse(SERVICE.as_bytes()).unwrap() else {
            panic!("expected a service");
        };
        assert_eq!(doc.name(), "web");
        assert_eq!(doc.namespace(), "proj1");
        assert!(doc.metadata.extra.contains_key("annotations"));
    }

    #[test]
    fn test_parse_job_from_json() {
        let json = r#"{"apiVersion": "run.googleapis.com/v1", "kind": "Job", "metadata": {"name": "batch"}}"#;
        let RunManifest::Job(doc) = RunManifest::parse(json.as_bytes()).unwrap() else {
            panic!("expected a job");
        };
        assert_eq!(doc.name(), "batch");
        assert_eq!(doc.namespace(), "");
        assert!(doc.spec.is_none());
    }

    #[test]
    fn test_unsupported_kind_is_not_a_parse_error() {
        let manifest = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n";
        let err = RunManifest::parse(manifest.as_bytes()).unwrap_err();
        match &err {
            DeployError::UnsupportedKind { api_version, kind } => {
                assert_eq!(api_version, "apps/v1");
                assert_eq!(kind, "Deployment");
            },
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.code(), ErrorCode::DeployUnsupportedKindErr);
    }

    #[test]
    fn test_service_kind_with_job_api_version_is_unsupported() {
        let manifest = "apiVersion: run.googleapis.com/v1\nkind: Service\n";
        assert!(matches!(
            RunManifest::parse(manifest.as_bytes()),
            Err(DeployError::UnsupportedKind { .. })
        ));
    }

    #[test]
    fn test_malformed_manifest_is_a_read_error() {
        let err = RunManifest::parse(b"apiVersion: [unterminated").unwrap_err();
        assert!(matches!(err, DeployError::ManifestRead(_)));
        assert_eq!(err.code(), ErrorCode::DeployReadManifestErr);
    }

    #[test]
    fn test_translate_labels_at_both_levels() {
        let mut doc = ResourceDocument::from_slice(SERVICE.as_bytes()).unwrap();
        doc.translate_labels();

        let top = doc.metadata.labels.as_ref().unwrap();
        assert_eq!(top.get("run-id").map(String::as_str), Some("abc"));
        assert_eq!(top.get("app").map(String::as_str), Some("web"));
        assert!(!top.contains_key("skaffold.dev/run-id"));

        let template = doc.template_labels().unwrap();
        assert_eq!(template.get("run-id").map(String::as_str), Some("abc"));
        assert!(!template.contains_key("skaffold.dev/run-id"));
    }

    #[test]
    fn test_translate_labels_without_template() {
        let manifest = "apiVersion: serving.knative.dev/v1\nkind: Service\nmetadata:\n  name: web\nspec:\n  template: {}\n";
        let mut doc = ResourceDocument::from_slice(manifest.as_bytes()).unwrap();
        doc.translate_labels();
        assert!(doc.metadata.labels.is_none());
        assert!(doc.template_labels().is_none());
    }

    #[test]
    fn test_unknown_fields_survive_serialization() {
        let doc = ResourceDocument::from_slice(SERVICE.as_bytes()).unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value["metadata"]["annotations"]["run.googleapis.com/ingress"],
            "all"
        );
        assert_eq!(
            value["spec"]["template"]["spec"]["containers"][0]["image"],
            "gcr.io/proj1/web:latest"
        );
        assert_eq!(value["apiVersion"], "serving.knative.dev/v1");
    }
}
