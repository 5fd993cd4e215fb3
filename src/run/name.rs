//! Cloud Run resource identities

use std::fmt;

/// What a [`RunResourceName`] points at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RunTarget {
    Service(String),
    Job(String),
}

/// Identity of a deployed Cloud Run Service or Job
///
/// `Display` renders the path the Cloud Run API expects:
/// `projects/{project}/locations/{region}/services/{service}` for services and
/// `namespaces/{project}/jobs/{job}` for jobs. Jobs are addressed through the
/// namespaced API, which has no region segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunResourceName {
    project: String,
    region: String,
    target: RunTarget,
}

impl RunResourceName {
    pub fn service(project: impl Into<String>, region: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            region: region.into(),
            target: RunTarget::Service(name.into()),
        }
    }

    pub fn job(project: impl Into<String>, region: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            region: region.into(),
            target: RunTarget::Job(name.into()),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn target(&self) -> &RunTarget {
        &self.target
    }

    /// Service name, if this identity names a service
    pub fn service_name(&self) -> Option<&str> {
        match &self.target {
            RunTarget::Service(name) => Some(name),
            RunTarget::Job(_) => None,
        }
    }

    /// Job name, if this identity names a job
    pub fn job_name(&self) -> Option<&str> {
        match &self.target {
            RunTarget::Job(name) => Some(name),
            RunTarget::Service(_) => None,
        }
    }

    /// Resource kind, as it appears in manifests
    pub fn kind(&self) -> &'static str {
        match &self.target {
            RunTarget::Service(_) => "Service",
            RunTarget::Job(_) => "Job",
        }
    }

    /// Parent collection a new resource of this kind is created under
    pub fn parent(&self) -> String {
        match &self.target {
            RunTarget::Service(_) => format!("projects/{}/locations/{}", self.project, self.region),
            RunTarget::Job(_) => format!("namespaces/{}", self.project),
        }
    }
}

impl fmt::Display for RunResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            RunTarget::Service(name) => write!(f, "{}/services/{}", self.parent(), name),
            RunTarget::Job(name) => write!(f, "{}/jobs/{}", self.parent(), name),
        }
    }
}
