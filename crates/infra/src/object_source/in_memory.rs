use std::collections::HashMap;
use std::sync::RwLock;

use super::{FetchError, ObjectSource};

/// In-memory object storage for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryObjectSource {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl InMemoryObjectSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, bucket: impl Into<String>, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        if let Ok(mut objects) = self.objects.write() {
            objects.insert((bucket.into(), key.into()), body.into());
        }
    }
}

#[async_trait::async_trait]
impl ObjectSource for InMemoryObjectSource {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<String, FetchError> {
        let body = {
            let objects = self
                .objects
                .read()
                .map_err(|_| FetchError::Unavailable("in-memory object lock poisoned".into()))?;
            objects
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
                .ok_or_else(|| FetchError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })?
        };

        String::from_utf8(body).map_err(|_| FetchError::Encoding { key: key.to_string() })
    }
}
