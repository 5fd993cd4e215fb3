//! Property-based tests using proptest
//!
//! These tests verify label translation and resource name rendering
//! using randomized inputs.

use crdeploy::run::labels::{translate_run_id, GCP_RUN_ID_LABEL, RUN_ID_LABEL};
use crdeploy::run::{ResourceDocument, RunResourceName};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Generate label maps that never contain either run id key
fn arb_other_labels() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z][a-z0-9_-]{0,20}", "[a-z0-9_-]{0,30}", 0..10)
        .prop_filter("run id keys are generated separately", |labels| {
            !labels.contains_key(RUN_ID_LABEL) && !labels.contains_key(GCP_RUN_ID_LABEL)
        })
}

/// Generate GCP-style names (lowercase, digits, hyphens)
fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,28}[a-z0-9]"
}

proptest! {
    /// The run id value moves to the flat key, everything else is untouched
    #[test]
    fn translation_preserves_value(
        others in arb_other_labels(),
        run_id in "[a-z0-9-]{1,36}"
    ) {
        let mut labels = others.clone();
        labels.insert(RUN_ID_LABEL.to_string(), run_id.clone());

        prop_assert!(translate_run_id(&mut labels));
        prop_assert!(!labels.contains_key(RUN_ID_LABEL));
        prop_assert_eq!(labels.get(GCP_RUN_ID_LABEL), Some(&run_id));

        labels.remove(GCP_RUN_ID_LABEL);
        prop_assert_eq!(labels, others);
    }

    /// Translating twice is the same as translating once
    #[test]
    fn translation_is_idempotent(
        others in arb_other_labels(),
        run_id in proptest::option::of("[a-z0-9-]{1,36}")
    ) {
        let mut labels = others;
        if let Some(run_id) = run_id {
            labels.insert(RUN_ID_LABEL.to_string(), run_id);
        }

        let mut once = labels.clone();
        translate_run_id(&mut once);
        let mut twice = once.clone();
        prop_assert!(!translate_run_id(&mut twice));
        prop_assert_eq!(once, twice);
    }

    /// Maps without the domain-qualified key are never changed
    #[test]
    fn translation_ignores_unrelated_maps(others in arb_other_labels()) {
        let mut labels = others.clone();
        prop_assert!(!translate_run_id(&mut labels));
        prop_assert_eq!(labels, others);
    }

    /// Document translation handles the top level and template independently
    #[test]
    fn document_translation_covers_template(
        name in arb_name(),
        run_id in "[a-z0-9-]{1,36}",
        with_template in any::<bool>()
    ) {
        let template = if with_template {
            format!("spec:\n  template:\n    metadata:\n      labels:\n        {RUN_ID_LABEL}: \"{run_id}\"\n")
        } else {
            String::new()
        };
        let manifest = format!(
            "apiVersion: serving.knative.dev/v1\nkind: Service\nmetadata:\n  name: \"{name}\"\n  labels:\n    {RUN_ID_LABEL}: \"{run_id}\"\n{template}"
        );

        let mut doc = ResourceDocument::from_slice(manifest.as_bytes()).unwrap();
        doc.translate_labels();

        let top = doc.metadata.labels.as_ref().unwrap();
        prop_assert_eq!(top.get(GCP_RUN_ID_LABEL), Some(&run_id));
        prop_assert!(!top.contains_key(RUN_ID_LABEL));

        match doc.template_labels() {
            Some(labels) => {
                prop_assert!(with_template);
                prop_assert_eq!(labels.get(GCP_RUN_ID_LABEL), Some(&run_id));
                prop_assert!(!labels.contains_key(RUN_ID_LABEL));
            },
            None => prop_assert!(!with_template),
        }
    }

    /// Service paths always carry the region, job paths never do
    #[test]
    fn resource_paths_by_kind(
        project in arb_name(),
        region in "[a-z]+-[a-z]+[0-9]",
        name in arb_name()
    ) {
        let service = RunResourceName::service(&project, &region, &name);
        prop_assert_eq!(
            service.to_string(),
            format!("projects/{project}/locations/{region}/services/{name}")
        );
        prop_assert!(service.to_string().starts_with(&service.parent()));

        let job = RunResourceName::job(&project, &region, &name);
        prop_assert_eq!(job.to_string(), format!("namespaces/{project}/jobs/{name}"));
        let region_segment = format!("/{region}/");
        prop_assert!(!job.to_string().contains(&region_segment));
    }
}
