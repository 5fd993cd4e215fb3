//! Label rewriting for Cloud Run
//!
//! GCP label keys may not contain a domain, so the run identifier label is
//! flattened before the document is sent.

use std::collections::BTreeMap;

/// Domain-qualified run identifier label attached by the labeller
pub const RUN_ID_LABEL: &str = "skaffold.dev/run-id";

/// Key the run identifier is stored under on Cloud Run
pub const GCP_RUN_ID_LABEL: &str = "run-id";

/// Move the value of [`RUN_ID_LABEL`] to [`GCP_RUN_ID_LABEL`].
///
/// Returns true when a label was rewritten. Calling it again is a no-op.
pub fn translate_run_id(labels: &mut BTreeMap<String, String>) -> bool {
    match labels.remove(RUN_ID_LABEL) {
        Some(run_id) => {
            labels.insert(GCP_RUN_ID_LABEL.to_string(), run_id);
            true
        },
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_translate_moves_value() {
        let mut map = labels(&[(RUN_ID_LABEL, "abc"), ("app", "web")]);
        assert!(translate_run_id(&mut map));
        assert_eq!(map, labels(&[("run-id", "abc"), ("app", "web")]));
    }

    #[test]
    fn test_translate_without_label_is_noop() {
        let mut map = labels(&[("app", "web")]);
        assert!(!translate_run_id(&mut map));
        assert_eq!(map, labels(&[("app", "web")]));
    }

    #[test]
    fn test_translate_overwrites_existing_flat_key() {
        let mut map = labels(&[(RUN_ID_LABEL, "new"), ("run-id", "old")]);
        translate_run_id(&mut map);
        assert_eq!(map, labels(&[("run-id", "new")]));
    }
}
