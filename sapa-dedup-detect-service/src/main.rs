mod detector;
mod distance;
mod util;

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use lazy_static::lazy_static;
use rusoto_core::{Client, Region};
use rusoto_s3::S3Client;
use sapa_dedup_service::dto::{DetectConfig, DetectionSummary};
use sapa_dedup_service::error::ServiceError;
use sapa_dedup_service::response::make_response_payload;
use sapa_dedup_service::util::{get_region, output_bucket};
use serde_json::Value;
use std::time::Instant;
use tracing::{error, info, warn, Instrument};
use tracing_subscriber::EnvFilter;

lazy_static! {
    // AWS Region, resolved once per container
    static ref REGION: Result<Region, ServiceError> = get_region();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .without_time()
        .init();
    run(service_fn(process)).await?;
    Ok(())
}

async fn process(event: LambdaEvent<DetectConfig>) -> Result<Value, Error> {
    let (config, context) = event.into_parts();
    let span = tracing::info_span!("dedup", request_id = %context.request_id);
    let result = dedup(config).instrument(span).await;
    if let Err(err) = &result {
        if err.is_client_error() {
            warn!(msg = %err.msg, "rejected detection request");
        } else {
            error!(msg = %err.msg, "detection failed");
        }
    }
    make_response_payload(result)
}

async fn dedup(config: DetectConfig) -> Result<Value, ServiceError> {
    config.validate()?;
    let client = S3Client::new_with_client(Client::shared(), REGION.clone()?);

    let start = Instant::now();
    let mut records = util::pull_records(&client, &config.data).await?;
    info!(
        records = records.len(),
        secs = start.elapsed().as_secs_f64(),
        "batch downloaded"
    );

    let start = Instant::now();
    util::order_oldest_first(&mut records);
    let pairs = detector::detect_duplicates(&records, config.threshold);
    info!(
        duplicates = pairs.len(),
        threshold = config.threshold,
        secs = start.elapsed().as_secs_f64(),
        "detection completed"
    );

    let bucket = output_bucket(&config.data.bucket);
    let report_key = util::push_report(&client, bucket.clone(), &config.data.key, &pairs).await?;
    let pruned_key = if config.dry_run {
        info!("dry run, batch left untouched");
        None
    } else {
        let key =
            util::push_pruned(&client, bucket.clone(), &config.data.key, &records, &pairs).await?;
        info!(key = %key, "pruned batch written");
        Some(key)
    };

    let summary = DetectionSummary {
        bucket,
        report_key,
        pruned_key,
        records: records.len(),
        duplicates: pairs.len(),
        dry_run: config.dry_run,
    };
    Ok(serde_json::to_value(summary)?)
}
