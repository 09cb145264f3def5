use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};

use super::{ObjectStore, ObjectStoreError};

/// Hosted bucket storage backend.
///
/// Talks to a managed storage HTTP API (one bucket per deployment) with a
/// static service key. Object keys map 1:1 onto bucket object names.
pub struct HostedStore {
    base_url: String,
    bucket: String,
    client: Client,
    service_key: String,
}

impl HostedStore {
    pub fn new(base_url: &str, bucket: &str, service_key: &str) -> Result<Self, anyhow::Error> {
        let client = Client::builder().build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            client,
            service_key: service_key.to_string(),
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, self.bucket, key)
    }

    fn backend_error(action: &str, status: StatusCode, body: String) -> ObjectStoreError {
        let detail = if body.is_empty() {
            status.to_string()
        } else {
            format!("{status}: {body}")
        };
        ObjectStoreError::Backend(format!("{action} failed: {detail}"))
    }
}

#[async_trait]
impl ObjectStore for HostedStore {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<(), ObjectStoreError> {
        let resp = self
            .client
            .post(self.object_url(key))
            .bearer_auth(&self.service_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(data)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Self::backend_error("upload", status, body));
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        let resp = self
            .client
            .get(self.object_url(key))
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ObjectStoreError::NotFound(key.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Self::backend_error("download", status, body));
        }

        resp.bytes()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        let resp = self
            .client
            .delete(self.object_url(key))
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        let status = resp.status();
        // Deleting a missing object is a no-op, matching the local backend.
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            let body = resp.text().await.unwrap_or_default();
            return Err(Self::backend_error("delete", status, body));
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError> {
        let resp = self
            .client
            .head(self.object_url(key))
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Self::backend_error("stat", status, body));
        }
        Ok(true)
    }
}
