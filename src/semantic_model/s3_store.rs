use super::store::{StageFile, StageStore, StageStoreError};
use crate::config::S3Config;
use async_trait::async_trait;
use aws_sdk_s3::{config::BehaviorVersion, primitives::ByteStream, Client};
use log::info;

/// Stage backed by an S3 bucket, e.g. the location of an external stage
pub struct S3StageStore {
    tenant: String,
    s3_client: Client,
    bucket_name: String,
}

impl S3StageStore {
    pub async fn new(config: S3Config) -> Self {
        let shared_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let s3_client = Client::new(&shared_config);
        S3StageStore {
            tenant: config.tenant,
            s3_client,
            bucket_name: config.bucket_name,
        }
    }

    pub fn key(&self, file: &StageFile) -> String {
        object_key(&self.tenant, file)
    }
}

fn object_key(tenant: &str, file: &StageFile) -> String {
    format!("{}/{}", tenant, file)
}

#[async_trait]
impl StageStore for S3StageStore {
    async fn put(&self, file: &StageFile, content: &[u8]) -> Result<(), StageStoreError> {
        let key = self.key(file);
        self.s3_client
            .put_object()
            .bucket(self.bucket_name.clone())
            .key(&key)
            .content_type("text/plain")
            .body(ByteStream::from(content.to_vec()))
            .send()
            .await
            .map_err(|e| StageStoreError::S3(e.to_string()))?;

        info!("Uploaded {} to s3://{}/{}", file, self.bucket_name, key);
        Ok(())
    }

    async fn get(&self, file: &StageFile) -> Result<Vec<u8>, StageStoreError> {
        let result = self
            .s3_client
            .get_object()
            .bucket(self.bucket_name.clone())
            .key(self.key(file))
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                    StageStoreError::FileNotFound(file.to_string())
                } else {
                    StageStoreError::S3(e.to_string())
                }
            })?;

        let body = result
            .body
            .collect()
            .await
            .map_err(|e| StageStoreError::S3(e.to_string()))?;

        Ok(body.to_vec())
    }
}
