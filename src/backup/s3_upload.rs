// logbackuptool/src/backup/s3_upload.rs
use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3 as s3;
use s3::error::DisplayErrorContext;
use s3::primitives::ByteStream;
use s3::types::StorageClass;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::TransportConfig;
use crate::errors::{AppError, Result};

/// One object to write to the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub bucket: String,
    pub key: String,
    pub path: PathBuf,
    pub storage_class: String,
    pub metadata: HashMap<String, String>,
}

/// Remote object store the pipeline archives into.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Verifies the bucket exists and is reachable with the current credentials.
    async fn check_bucket(&self, bucket: &str) -> Result<()>;

    async fn put_object(&self, request: &UploadRequest) -> Result<()>;
}

pub struct S3ObjectStore {
    client: s3::Client,
}

impl S3ObjectStore {
    /// Builds an S3 client from the standard AWS config chain plus overrides.
    pub async fn connect(transport: &TransportConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &transport.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &transport.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint) = &transport.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let mut timeouts = TimeoutConfig::builder();
        if let Some(read_timeout) = transport.read_timeout {
            timeouts = timeouts.read_timeout(read_timeout);
        }
        if let Some(connect_timeout) = transport.connect_timeout {
            timeouts = timeouts.connect_timeout(connect_timeout);
        }
        loader = loader.timeout_config(timeouts.build());

        if transport.no_verify_ssl {
            warn!("--no-verify-ssl is not supported by this S3 transport; certificates will be verified");
        }
        if let Some(ca_bundle) = &transport.ca_bundle {
            warn!(
                "--ca-bundle {} is not supported by this S3 transport; using system roots",
                ca_bundle.display()
            );
        }

        let sdk_config = loader.load().await;
        if sdk_config.region().is_none() {
            return Err(AppError::Config(
                "AWS region is not set. Please specify --region or set AWS_DEFAULT_REGION environment variable"
                    .to_string(),
            ));
        }

        // Path-style addressing keeps S3-compatible endpoints (LocalStack, MinIO) working.
        let s3_config = s3::config::Builder::from(&sdk_config)
            .force_path_style(transport.endpoint_url.is_some())
            .build();

        info!("AWS S3 client initialized successfully");
        Ok(S3ObjectStore {
            client: s3::Client::from_conf(s3_config),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn check_bucket(&self, bucket: &str) -> Result<()> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| {
                AppError::S3Sdk(format!(
                    "cannot access S3 bucket {}: {}",
                    bucket,
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    async fn put_object(&self, request: &UploadRequest) -> Result<()> {
        let upload_error = |reason: String| AppError::Upload {
            path: request.path.display().to_string(),
            key: request.key.clone(),
            reason,
        };

        let body = ByteStream::from_path(&request.path)
            .await
            .map_err(|e| upload_error(format!("failed to open file: {}", e)))?;

        self.client
            .put_object()
            .bucket(&request.bucket)
            .key(&request.key)
            .body(body)
            .storage_class(StorageClass::from(request.storage_class.as_str()))
            .set_metadata(Some(request.metadata.clone()))
            .send()
            .await
            .map_err(|e| upload_error(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}
