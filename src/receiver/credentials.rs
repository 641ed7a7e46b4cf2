use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobLocation {
    pub bucket: String,
    pub key: String,
}

impl fmt::Display for BlobLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("failed to fetch {location}: {source}")]
    Fetch {
        location: BlobLocation,
        #[source]
        source: BoxError,
    },
    #[error("{location} is empty")]
    Empty { location: BlobLocation },
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get_object(&self, location: &BlobLocation) -> Result<Vec<u8>, RetrievalError>;
}

pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn get_object(&self, location: &BlobLocation) -> Result<Vec<u8>, RetrievalError> {
        let fetch_error = |source: BoxError| RetrievalError::Fetch {
            location: location.clone(),
            source,
        };

        let output = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| fetch_error(Box::new(e)))?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| fetch_error(Box::new(e)))?;

        Ok(bytes.into_bytes().to_vec())
    }
}

/// Private key material; never printed.
pub struct DeployKey(Vec<u8>);

impl DeployKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for DeployKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeployKey(<{} bytes redacted>)", self.0.len())
    }
}

pub async fn fetch_deploy_key<S>(store: &S, location: &BlobLocation) -> Result<DeployKey, RetrievalError>
where
    S: BlobStore + ?Sized,
{
    let bytes = store.get_object(location).await?;
    if bytes.is_empty() {
        return Err(RetrievalError::Empty {
            location: location.clone(),
        });
    }

    tracing::info!(location = %location, "deploy key fetched");
    Ok(DeployKey(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MemoryStore(HashMap<(String, String), Vec<u8>>);

    impl MemoryStore {
        fn with(bucket: &str, key: &str, bytes: &[u8]) -> Self {
            let mut objects = HashMap::new();
            objects.insert((bucket.to_string(), key.to_string()), bytes.to_vec());
            Self(objects)
        }
    }

    #[async_trait]
    impl BlobStore for MemoryStore {
        async fn get_object(&self, location: &BlobLocation) -> Result<Vec<u8>, RetrievalError> {
            self.0
                .get(&(location.bucket.clone(), location.key.clone()))
                .cloned()
                .ok_or_else(|| RetrievalError::Fetch {
                    location: location.clone(),
                    source: "NoSuchKey".into(),
                })
        }
    }

    fn location(key: &str) -> BlobLocation {
        BlobLocation {
            bucket: "vbot-secrets".to_string(),
            key: key.to_string(),
        }
    }

    #[tokio::test]
    async fn loads_existing_key() {
        let store = MemoryStore::with("vbot-secrets", "deploy/id_rsa", b"-----BEGIN KEY-----");
        let key = fetch_deploy_key(&store, &location("deploy/id_rsa"))
            .await
            .expect("key");

        assert_eq!(key.as_bytes(), b"-----BEGIN KEY-----");
        assert!(!format!("{:?}", key).contains("BEGIN"));
    }

    #[tokio::test]
    async fn missing_object_is_an_error_naming_the_location() {
        let store = MemoryStore::with("vbot-secrets", "deploy/id_rsa", b"key");
        let err = fetch_deploy_key(&store, &location("deploy/missing"))
            .await
            .unwrap_err();

        assert!(matches!(err, RetrievalError::Fetch { .. }));
        assert!(err.to_string().contains("s3://vbot-secrets/deploy/missing"));
    }

    #[tokio::test]
    async fn empty_object_is_rejected() {
        let store = MemoryStore::with("vbot-secrets", "deploy/id_rsa", b"");
        let err = fetch_deploy_key(&store, &location("deploy/id_rsa"))
            .await
            .unwrap_err();

        assert!(matches!(err, RetrievalError::Empty { .. }));
    }
}
