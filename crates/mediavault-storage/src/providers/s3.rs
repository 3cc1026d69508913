//! S3-compatible blob store provider.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use bytes::Bytes;
use tracing::{debug, info};

use mediavault_core::config::storage::S3StorageConfig;
use mediavault_core::error::{AppError, ErrorKind};
use mediavault_core::result::AppResult;
use mediavault_core::traits::BlobStore;

/// Blob store backed by an S3-compatible object store.
///
/// One shared bucket partitioned by storage-path prefix; no cross-tenant
/// locking is needed because generated paths never collide.
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    region: String,
    public_base_url: String,
}

impl S3BlobStore {
    /// Create a new S3 blob store from configuration.
    ///
    /// Uses the ambient AWS credential chain unless an access key is
    /// configured explicitly. A non-empty endpoint switches to
    /// path-style addressing for MinIO-style services.
    pub async fn new(config: &S3StorageConfig) -> Self {
        info!(
            region = %config.region,
            bucket = %config.bucket,
            endpoint = %config.endpoint,
            "Initializing S3 blob store"
        );

        let base = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&base);
        if !config.access_key.is_empty() {
            builder = builder.credentials_provider(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "mediavault-config",
            ));
        }
        if !config.endpoint.is_empty() {
            builder = builder
                .endpoint_url(config.endpoint.clone())
                .force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn ensure_bucket(&self) -> AppResult<()> {
        let mut request = self.client.create_bucket().bucket(&self.bucket);

        // us-east-1 rejects an explicit location constraint.
        if self.region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                info!(bucket = %self.bucket, "Created storage bucket");
                Ok(())
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_bucket_already_owned_by_you()
                    || service_err.is_bucket_already_exists()
                {
                    // Pre-existing bucket or a racing creator; both fine.
                    debug!(bucket = %self.bucket, "Storage bucket already exists");
                    Ok(())
                } else {
                    Err(AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to ensure bucket '{}'", self.bucket),
                        service_err,
                    ))
                }
            }
        }
    }

    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> AppResult<()> {
        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .if_none_match("*")
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!(bucket = %self.bucket, path, "Uploaded object");
                Ok(())
            }
            Err(err) => {
                // Paths are unique per upload, so an existing object at
                // the same key means something is badly wrong.
                if let SdkError::ServiceError(ref ctx) = err {
                    if ctx.raw().status().as_u16() == 412 {
                        return Err(AppError::conflict(format!(
                            "Object already exists at '{path}'"
                        )));
                    }
                }
                Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to upload object '{path}'"),
                    err,
                ))
            }
        }
    }

    fn public_url(&self, path: &str) -> Option<String> {
        if !self.public_base_url.is_empty() {
            return Some(format!("{}/{path}", self.public_base_url));
        }
        if self.bucket.is_empty() {
            return None;
        }
        Some(format!(
            "https://{}.s3.{}.amazonaws.com/{path}",
            self.bucket, self.region
        ))
    }

    async fn health_check(&self) -> AppResult<bool> {
        match self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }
}
