use csv::{Reader, Writer};
use rusoto_s3::S3Client;
use rustc_hash::FxHashSet;
use sapa_dedup_service::dto::{DataFile, DuplicatePair, Record};
use sapa_dedup_service::error::ServiceError;
use sapa_dedup_service::util::{derived_key, download_object_from_s3, upload_csv_to_s3};

pub const REPORT_SUFFIX: &str = ".pairs.csv";
pub const PRUNED_SUFFIX: &str = ".pruned.csv";

const REQUIRED_COLUMNS: [&str; 3] = ["id", "content", "created_at"];
const MISSING_COLUMNS: &str = "file must contain columns 'id', 'content' and 'created_at'";

pub async fn pull_records(client: &S3Client, data: &DataFile) -> Result<Vec<Record>, ServiceError> {
    let bytes = download_object_from_s3(client, data.bucket.clone(), data.key.clone()).await?;
    parse_records(&bytes)
}

pub fn parse_records(bytes: &[u8]) -> Result<Vec<Record>, ServiceError> {
    let mut reader = Reader::from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(ServiceError::bad_request)?
        .clone();
    if !REQUIRED_COLUMNS
        .iter()
        .all(|column| headers.iter().any(|header| header == *column))
    {
        return Err(ServiceError::bad_request(MISSING_COLUMNS));
    }
    reader
        .records()
        .map(|record| match record {
            Ok(rec) => rec
                .deserialize(Some(&headers))
                .map_err(|_| ServiceError::bad_request(MISSING_COLUMNS)),
            Err(err) => Err(ServiceError::bad_request(err)),
        })
        .collect()
}

/// Stable, so records sharing a timestamp keep their file order.
pub fn order_oldest_first(records: &mut [Record]) {
    records.sort_by_key(|record| record.created_at);
}

pub fn encode_report(pairs: &[DuplicatePair<'_>]) -> Result<Vec<u8>, ServiceError> {
    let mut writer = Writer::from_writer(vec![]);
    writer
        .write_record(["original_id", "duplicate_id", "similarity"])
        .map_err(ServiceError::internal_server_error)?;
    for pair in pairs {
        writer
            .write_record([
                pair.original.id.as_str(),
                pair.duplicate.id.as_str(),
                format!("{:.4}", pair.similarity).as_str(),
            ])
            .map_err(ServiceError::internal_server_error)?;
    }
    writer
        .into_inner()
        .map_err(ServiceError::internal_server_error)
}

/// Records that survive deletion of every reported duplicate, in batch order.
///
/// Duplicates are matched by identity within `records`, not by id, so a row
/// sharing its id with a duplicate is kept.
pub fn pruned_records<'a>(records: &'a [Record], pairs: &[DuplicatePair<'_>]) -> Vec<&'a Record> {
    let duplicates: FxHashSet<*const Record> = pairs
        .iter()
        .map(|p| p.duplicate as *const Record)
        .collect();
    records
        .iter()
        .filter(|record| !duplicates.contains(&(*record as *const Record)))
        .collect()
}

pub fn encode_records(records: &[&Record]) -> Result<Vec<u8>, ServiceError> {
    let mut writer = Writer::from_writer(vec![]);
    for record in records {
        writer
            .serialize(record)
            .map_err(ServiceError::internal_server_error)?;
    }
    writer
        .into_inner()
        .map_err(ServiceError::internal_server_error)
}

pub async fn push_report(
    client: &S3Client,
    bucket: String,
    key: &str,
    pairs: &[DuplicatePair<'_>],
) -> Result<String, ServiceError> {
    let object = encode_report(pairs)?;
    let report_key = derived_key(key, REPORT_SUFFIX);
    upload_csv_to_s3(client, object, bucket, report_key.clone()).await?;
    Ok(report_key)
}

pub async fn push_pruned(
    client: &S3Client,
    bucket: String,
    key: &str,
    records: &[Record],
    pairs: &[DuplicatePair<'_>],
) -> Result<String, ServiceError> {
    let object = encode_records(&pruned_records(records, pairs))?;
    let pruned_key = derived_key(key, PRUNED_SUFFIX);
    upload_csv_to_s3(client, object, bucket, pruned_key.clone()).await?;
    Ok(pruned_key)
}
