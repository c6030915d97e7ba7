use crate::error::ServiceError;
use futures::stream::TryStreamExt;
use rusoto_core::Region;
use rusoto_s3::{GetObjectRequest, PutObjectRequest, S3Client, S3};
use std::env;
use std::str::FromStr;

pub fn get_env_var(name: &str) -> Result<String, ServiceError> {
    env::var(name).map_err(|_| {
        ServiceError::internal_server_error(format!("Environment variable '{}' not found", name))
    })
}

pub fn get_region() -> Result<Region, ServiceError> {
    let val = get_env_var("REGION")?;
    Region::from_str(val.as_str()).map_err(|_| {
        ServiceError::internal_server_error(format!("Unable to parse region {}", val))
    })
}

/// Results are written next to the input, under `/output` instead of `/input`.
pub fn output_bucket(bucket: &str) -> String {
    bucket.replace("/input", "/output")
}

/// Replaces the extension of the last path segment of `key` with `suffix`.
pub fn derived_key(key: &str, suffix: &str) -> String {
    let name_start = key.rfind('/').map_or(0, |i| i + 1);
    let stem = match key[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &key[..name_start + dot],
        _ => key,
    };
    format!("{stem}{suffix}")
}

pub async fn download_object_from_s3(
    client: &S3Client,
    bucket: String,
    key: String,
) -> Result<Vec<u8>, ServiceError> {
    let request = GetObjectRequest {
        bucket,
        key,
        ..Default::default()
    };
    let mut object = client
        .get_object(request)
        .await
        .map_err(ServiceError::internal_server_error)?;
    let body = object
        .body
        .take()
        .ok_or_else(|| ServiceError::internal_server_error("Unable to extract body"))?;
    body.map_ok(|b| b.to_vec())
        .try_concat()
        .await
        .map_err(ServiceError::internal_server_error)
}

pub async fn upload_csv_to_s3(
    client: &S3Client,
    object: Vec<u8>,
    bucket: String,
    key: String,
) -> Result<(), ServiceError> {
    let request = PutObjectRequest {
        bucket,
        key,
        body: Some(object.into()),
        content_type: Some(String::from("text/csv")),
        ..Default::default()
    };
    client
        .put_object(request)
        .await
        .map(|_| ())
        .map_err(ServiceError::internal_server_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_bucket_swaps_input_segment() {
        assert_eq!(output_bucket("sapa-trenggalek/input"), "sapa-trenggalek/output");
        assert_eq!(output_bucket("sapa-trenggalek"), "sapa-trenggalek");
    }

    #[test]
    fn derived_key_replaces_extension() {
        assert_eq!(derived_key("batches/2026-10-17.csv", ".pairs.csv"), "batches/2026-10-17.pairs.csv");
        assert_eq!(derived_key("posts", ".pruned.csv"), "posts.pruned.csv");
    }

    #[test]
    fn derived_key_ignores_dots_in_directories_and_hidden_names() {
        assert_eq!(derived_key("v1.2/posts", ".pairs.csv"), "v1.2/posts.pairs.csv");
        assert_eq!(derived_key("batches/.hidden", ".pairs.csv"), "batches/.hidden.pairs.csv");
    }

    #[test]
    fn missing_env_var_is_internal_error() {
        let err = get_env_var("SAPA_DEDUP_SURELY_UNSET_VARIABLE").unwrap_err();
        assert!(!err.is_client_error());
        assert!(err.msg.contains("SAPA_DEDUP_SURELY_UNSET_VARIABLE"));
    }
}
