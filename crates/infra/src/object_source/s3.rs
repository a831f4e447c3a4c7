//! S3 object source backed by the `object_store` crate.
//!
//! One client is built per bucket on first use and reused afterwards.
//! Credentials come from the standard AWS environment variables; the region is
//! fixed by configuration.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use tracing::debug;

use super::{FetchError, ObjectSource};

pub struct S3ObjectSource {
    region: String,
    clients: RwLock<HashMap<String, Arc<AmazonS3>>>,
}

impl S3ObjectSource {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            clients: RwLock::new(HashMap::new()),
        }
    }

    fn client(&self, bucket: &str) -> Result<Arc<AmazonS3>, FetchError> {
        if let Some(client) = self.clients.read().ok().and_then(|c| c.get(bucket).cloned()) {
            return Ok(client);
        }

        debug!(bucket, region = %self.region, "building s3 client");
        let client = AmazonS3Builder::from_env()
            .with_region(&self.region)
            .with_bucket_name(bucket)
            .build()
            .map(Arc::new)
            .map_err(|e| FetchError::Unavailable(e.to_string()))?;

        if let Ok(mut clients) = self.clients.write() {
            clients.insert(bucket.to_string(), client.clone());
        }
        Ok(client)
    }
}

#[async_trait::async_trait]
impl ObjectSource for S3ObjectSource {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<String, FetchError> {
        let client = self.client(bucket)?;
        let location = ObjectPath::from(key);

        let result = client.get(&location).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => FetchError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            other => FetchError::Unavailable(other.to_string()),
        })?;
        let body = result
            .bytes()
            .await
            .map_err(|e| FetchError::Unavailable(e.to_string()))?;

        String::from_utf8(body.to_vec()).map_err(|_| FetchError::Encoding { key: key.to_string() })
    }
}
