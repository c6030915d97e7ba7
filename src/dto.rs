use crate::error::ServiceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Similarity at or above which two records count as duplicates.
pub const DEFAULT_THRESHOLD: f64 = 0.9;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataFile {
    pub bucket: String,
    pub key: String,
}

/// Invocation event for a detection run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectConfig {
    pub data: DataFile,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Report duplicates without writing a pruned batch.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_dry_run() -> bool {
    true
}

impl DetectConfig {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(ServiceError::bad_request(format!(
                "threshold must be between 0 and 1, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// One row of scraped content as exported by the storage layer.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Record {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DuplicatePair<'a> {
    pub original: &'a Record,
    pub duplicate: &'a Record,
    pub similarity: f64,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    pub bucket: String,
    pub report_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pruned_key: Option<String>,
    pub records: usize,
    pub duplicates: usize,
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Status;
    use serde_json::json;

    #[test]
    fn config_defaults_to_dry_run_at_default_threshold() {
        let config: DetectConfig = serde_json::from_value(json!({
            "data": { "bucket": "sapa/input", "key": "posts.csv" }
        }))
        .unwrap();
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);
        assert!(config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_reads_camel_case_fields() {
        let config: DetectConfig = serde_json::from_value(json!({
            "data": { "bucket": "sapa/input", "key": "posts.csv" },
            "threshold": 0.75,
            "dryRun": false
        }))
        .unwrap();
        assert_eq!(config.threshold, 0.75);
        assert!(!config.dry_run);
    }

    #[test]
    fn threshold_outside_unit_interval_is_a_bad_request() {
        for threshold in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let config = DetectConfig {
                data: DataFile {
                    bucket: "sapa/input".into(),
                    key: "posts.csv".into(),
                },
                threshold,
                dry_run: true,
            };
            let err = config.validate().unwrap_err();
            assert_eq!(err.status, Status::BadRequest);
        }
    }

    #[test]
    fn summary_omits_pruned_key_on_dry_run() {
        let summary = DetectionSummary {
            bucket: "sapa/output".into(),
            report_key: "posts.pairs.csv".into(),
            pruned_key: None,
            records: 3,
            duplicates: 1,
            dry_run: true,
        };
        let value = serde_json::to_value(summary).unwrap();
        assert_eq!(
            value,
            json!({
                "bucket": "sapa/output",
                "reportKey": "posts.pairs.csv",
                "records": 3,
                "duplicates": 1,
                "dryRun": true
            })
        );
    }
}
